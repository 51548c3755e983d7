use std::{fmt::Display, str::FromStr};

use artesala_common::EuroCents;
use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------   BookingStatus     ---------------------------------------------------------
/// Lifecycle of a booking. `Pending` holds the calendar slots while the customer is at the gateway; the
/// reconciliation flow moves it to `Paid` or `Cancelled`. Both of those are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum BookingStatus {
    /// Created at checkout initiation; the slots are held but the charge has not been confirmed.
    Pending,
    /// An authorised payment notification has been matched to this booking.
    Paid,
    /// The payment was declined, or the hold was abandoned and expired.
    Cancelled,
}

impl Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "Pending"),
            BookingStatus::Paid => write!(f, "Paid"),
            BookingStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid booking status: {0}")]
pub struct StatusConversionError(String);

impl FromStr for BookingStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(StatusConversionError(s.to_string())),
        }
    }
}

impl From<String> for BookingStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid booking status in database: {value}. Defaulting to Pending");
            BookingStatus::Pending
        })
    }
}

//--------------------------------------        OrderId        --------------------------------------------------------
/// The merchant order number generated at checkout and echoed back by the gateway. This is the booking's external
/// payment reference, and it is unique: the idempotency of the whole flow hangs on that constraint.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------        Room       -----------------------------------------------------------
/// Static reference data: a bookable room and its hourly rate.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub hourly_rate: EuroCents,
}

//--------------------------------------        Booking       --------------------------------------------------------
/// One customer's payment transaction, as stored.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub payment_ref: OrderId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub note: Option<String>,
    pub total: EuroCents,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      NewBooking       -------------------------------------------------------
/// Insert payload for a booking header together with the slots it reserves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub payment_ref: OrderId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub note: Option<String>,
    /// The charged (or to-be-charged) total, in minor units.
    pub total: EuroCents,
    pub slots: Vec<NewTimeSlot>,
}

impl NewBooking {
    pub fn new(payment_ref: OrderId, name: String, email: String, total: EuroCents) -> Self {
        Self { payment_ref, name, email, phone: None, note: None, total, slots: Vec::new() }
    }

    pub fn with_slot(mut self, room_id: i64, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Self {
        self.slots.push(NewTimeSlot { room_id, starts_at, ends_at });
        self
    }
}

//--------------------------------------      TimeSlot       ---------------------------------------------------------
/// One contiguous reserved interval in one room, belonging to exactly one booking. Never updated in place;
/// cancellation deletes the row.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: i64,
    pub booking_id: i64,
    pub room_id: i64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTimeSlot {
    pub room_id: i64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl NewTimeSlot {
    pub fn duration_minutes(&self) -> i64 {
        (self.ends_at - self.starts_at).num_minutes()
    }
}
