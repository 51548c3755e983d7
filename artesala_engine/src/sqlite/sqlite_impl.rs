//! `SqliteDatabase` is the concrete SQLite implementation of the booking-engine backend.
//!
//! Every mutating trait method opens one transaction, so a failure part-way through (most importantly, a slot
//! conflict after the booking header went in) rolls the whole operation back and leaves no orphan rows.
use std::fmt::Debug;

use chrono::Duration;
use log::*;
use sqlx::SqlitePool;

use super::db::{bookings, new_pool, rooms, slots};
use crate::{
    db_types::{Booking, BookingStatus, NewBooking, OrderId, Room, TimeSlot},
    traits::{BookingDatabase, BookingEngineError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str) -> Result<Self, BookingEngineError> {
        let pool = new_pool(url).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Rooms are operator-maintained reference data, so this lives outside the [`BookingDatabase`] contract.
    pub async fn upsert_room(
        &self,
        room_id: i64,
        name: &str,
        hourly_rate: artesala_common::EuroCents,
    ) -> Result<Room, BookingEngineError> {
        let mut conn = self.pool.acquire().await?;
        let room = rooms::upsert_room(room_id, name, hourly_rate, &mut conn).await?;
        Ok(room)
    }
}

impl BookingDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch_room(&self, room_id: i64) -> Result<Option<Room>, BookingEngineError> {
        let mut conn = self.pool.acquire().await?;
        let room = rooms::fetch_room(room_id, &mut conn).await?;
        Ok(room)
    }

    async fn fetch_booking_by_payment_ref(&self, payment_ref: &OrderId) -> Result<Option<Booking>, BookingEngineError> {
        let mut conn = self.pool.acquire().await?;
        let booking = bookings::fetch_booking_by_payment_ref(payment_ref, &mut conn).await?;
        Ok(booking)
    }

    async fn fetch_slots_for_booking(&self, booking_id: i64) -> Result<Vec<TimeSlot>, BookingEngineError> {
        let mut conn = self.pool.acquire().await?;
        let result = slots::fetch_slots_for_booking(booking_id, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_recent_bookings(&self, limit: i64) -> Result<Vec<Booking>, BookingEngineError> {
        let mut conn = self.pool.acquire().await?;
        let result = bookings::fetch_recent_bookings(limit, &mut conn).await?;
        Ok(result)
    }

    async fn hold_booking(&self, booking: NewBooking) -> Result<Booking, BookingEngineError> {
        let mut tx = self.pool.begin().await?;
        let header = bookings::insert_booking(&booking, BookingStatus::Pending, &mut tx).await?;
        slots::insert_slots(header.id, &booking.slots, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Hold placed for booking [{}] ({} slots)", header.payment_ref, booking.slots.len());
        Ok(header)
    }

    async fn confirm_booking(&self, booking: NewBooking) -> Result<(Booking, bool), BookingEngineError> {
        let mut tx = self.pool.begin().await?;
        if let Some(existing) = bookings::fetch_booking_by_payment_ref(&booking.payment_ref, &mut tx).await? {
            return match existing.status {
                BookingStatus::Pending => {
                    let paid = bookings::mark_paid(existing.id, booking.total, &mut tx).await?;
                    tx.commit().await?;
                    debug!("🗃️ Pending booking [{}] promoted to Paid", paid.payment_ref);
                    Ok((paid, true))
                },
                BookingStatus::Paid => {
                    debug!(
                        "🗃️ Booking [{}] is already Paid; treating notification as a redelivery",
                        existing.payment_ref
                    );
                    Ok((existing, false))
                },
                BookingStatus::Cancelled => {
                    // The hold was released (expiry, or an earlier decline) before this confirmation landed,
                    // but the customer has been charged. Re-reserve the slots and record the payment; if the
                    // interval has been rebooked in the meantime, the conflict rolls everything back.
                    slots::insert_slots(existing.id, &booking.slots, &mut tx).await?;
                    let paid = bookings::mark_paid(existing.id, booking.total, &mut tx).await?;
                    tx.commit().await?;
                    info!("🗃️ Cancelled booking [{}] revived as Paid", paid.payment_ref);
                    Ok((paid, true))
                },
            };
        }
        // No booking on record at all (the notify-only flow): record the paid booking from scratch.
        let header = match bookings::insert_booking(&booking, BookingStatus::Paid, &mut tx).await {
            Ok(header) => header,
            Err(BookingEngineError::BookingAlreadyExists(payment_ref)) => {
                // Lost the race against a concurrent redelivery; whoever won has recorded the booking.
                drop(tx);
                let mut conn = self.pool.acquire().await?;
                let existing = bookings::fetch_booking_by_payment_ref(&payment_ref, &mut conn)
                    .await?
                    .ok_or(BookingEngineError::BookingNotFound(payment_ref))?;
                return Ok((existing, false));
            },
            Err(e) => return Err(e),
        };
        // A slot conflict here drops the transaction and rolls the header back with it.
        slots::insert_slots(header.id, &booking.slots, &mut tx).await?;
        tx.commit().await?;
        Ok((header, true))
    }

    async fn cancel_booking(&self, payment_ref: &OrderId) -> Result<Option<Booking>, BookingEngineError> {
        let mut tx = self.pool.begin().await?;
        match bookings::fetch_booking_by_payment_ref(payment_ref, &mut tx).await? {
            Some(booking) if booking.status == BookingStatus::Pending => {
                let released = slots::delete_slots_for_booking(booking.id, &mut tx).await?;
                let cancelled = bookings::update_status(booking.id, BookingStatus::Cancelled, &mut tx).await?;
                tx.commit().await?;
                debug!("🗃️ Booking [{}] cancelled, {released} slot(s) released", cancelled.payment_ref);
                Ok(Some(cancelled))
            },
            Some(booking) => {
                trace!("🗃️ Cancel requested for [{}] but it is already {}", booking.payment_ref, booking.status);
                Ok(None)
            },
            None => Ok(None),
        }
    }

    async fn expire_abandoned_bookings(&self, older_than: Duration) -> Result<Vec<Booking>, BookingEngineError> {
        let mut tx = self.pool.begin().await?;
        let stale = bookings::fetch_stale_pending_bookings(older_than, &mut tx).await?;
        let mut expired = Vec::with_capacity(stale.len());
        for booking in stale {
            slots::delete_slots_for_booking(booking.id, &mut tx).await?;
            let cancelled = bookings::update_status(booking.id, BookingStatus::Cancelled, &mut tx).await?;
            expired.push(cancelled);
        }
        tx.commit().await?;
        Ok(expired)
    }
}
