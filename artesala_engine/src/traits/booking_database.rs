use chrono::Duration;
use thiserror::Error;

use crate::db_types::{Booking, NewBooking, OrderId, Room, TimeSlot};

/// Persistence contract for the booking engine.
///
/// Every mutating operation is a single atomic transaction in the backend. Concurrent redeliveries of the same
/// notification are resolved by the UNIQUE constraint on the payment reference, never by in-process locking.
#[allow(async_fn_in_trait)]
pub trait BookingDatabase: Clone {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Point lookup of a room and its hourly rate.
    async fn fetch_room(&self, room_id: i64) -> Result<Option<Room>, BookingEngineError>;

    /// Returns the booking carrying the given external payment reference, if any.
    async fn fetch_booking_by_payment_ref(&self, payment_ref: &OrderId) -> Result<Option<Booking>, BookingEngineError>;

    /// Returns the time slots belonging to a booking.
    async fn fetch_slots_for_booking(&self, booking_id: i64) -> Result<Vec<TimeSlot>, BookingEngineError>;

    /// Most recent bookings first, for the admin surface.
    async fn fetch_recent_bookings(&self, limit: i64) -> Result<Vec<Booking>, BookingEngineError>;

    /// Inserts a `Pending` booking and its slots in one transaction, holding the calendar while the customer is at
    /// the gateway. A slot collision aborts the whole insert with [`BookingEngineError::SlotConflict`].
    async fn hold_booking(&self, booking: NewBooking) -> Result<Booking, BookingEngineError>;

    /// Records an authorised payment in one transaction. Idempotent:
    ///
    /// * a `Pending` booking with this payment reference is promoted to `Paid` (its slots are already held);
    /// * a `Paid` booking means the notification is a redelivery, and the existing record is returned with `false`;
    ///   callers must treat this as success;
    /// * a `Cancelled` booking (the hold expired before the notification landed, but the card was charged) is
    ///   revived: its slots are re-reserved and it is promoted to `Paid`. If the interval has since been rebooked,
    ///   the revival fails with [`BookingEngineError::SlotConflict`];
    /// * otherwise a fresh `Paid` header plus its slot rows are inserted. A concurrent duplicate surfaces as a
    ///   unique violation on the payment reference and is folded into the redelivery case. A slot conflict rolls
    ///   the header back and is returned as [`BookingEngineError::SlotConflict`] so the gateway retries.
    ///
    /// Returns the booking and whether this call changed anything.
    async fn confirm_booking(&self, booking: NewBooking) -> Result<(Booking, bool), BookingEngineError>;

    /// Marks a `Pending` booking `Cancelled` and deletes its slot rows, releasing the calendar. A no-op (returning
    /// `None`) when the reference is unknown or the booking is already terminal.
    async fn cancel_booking(&self, payment_ref: &OrderId) -> Result<Option<Booking>, BookingEngineError>;

    /// Cancels every `Pending` booking older than `older_than`, releasing their slots. Returns the cancelled
    /// bookings.
    async fn expire_abandoned_bookings(&self, older_than: Duration) -> Result<Vec<Booking>, BookingEngineError>;
}

#[derive(Debug, Error)]
pub enum BookingEngineError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("A booking already exists for payment reference {0}")]
    BookingAlreadyExists(OrderId),
    #[error("The requested time slots overlap an existing reservation")]
    SlotConflict,
    #[error("No booking exists for payment reference {0}")]
    BookingNotFound(OrderId),
    #[error("Room {0} does not exist")]
    RoomNotFound(i64),
    #[error("Illegal booking status change: {0}")]
    IllegalStatusChange(String),
}

impl From<sqlx::Error> for BookingEngineError {
    fn from(e: sqlx::Error) -> Self {
        BookingEngineError::DatabaseError(e.to_string())
    }
}
