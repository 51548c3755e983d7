use std::fmt::Debug;

use chrono::Duration;
use log::*;

use crate::{
    db_types::{Booking, NewBooking, OrderId, Room, TimeSlot},
    helpers::amount::{amounts_match, expected_total},
    traits::{BookingDatabase, BookingEngineError},
};

/// `BookingFlowApi` is the primary API for the reservation and payment-reconciliation flows. Both notification
/// triggers — the asynchronous gateway webhook and the best-effort redirect fallback — funnel into the same
/// [`Self::process_authorised_payment`] call, so redelivery and resubmission are indistinguishable from the
/// database's point of view.
pub struct BookingFlowApi<B> {
    db: B,
}

impl<B> Debug for BookingFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BookingFlowApi")
    }
}

impl<B> BookingFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> BookingFlowApi<B>
where B: BookingDatabase
{
    /// Place a `Pending` hold on the requested slots before redirecting the customer to the gateway.
    pub async fn initiate_checkout(&self, booking: NewBooking) -> Result<Booking, BookingEngineError> {
        let held = self.db.hold_booking(booking).await?;
        info!("🔄️ Hold [{}] placed for {} ({})", held.payment_ref, held.name, held.total);
        Ok(held)
    }

    /// Record an authorised payment notification. Idempotent: redeliveries return the already-recorded booking and
    /// must be acknowledged to the gateway as success.
    ///
    /// The amount check is advisory (the card has been charged either way); `booking.total` must carry the
    /// gateway-reported amount, which is what gets persisted.
    pub async fn process_authorised_payment(&self, booking: NewBooking) -> Result<(Booking, bool), BookingEngineError> {
        self.reconcile_amount(&booking).await;
        let order = booking.payment_ref.clone();
        let (recorded, newly_recorded) = self.db.confirm_booking(booking).await?;
        if newly_recorded {
            info!("🔄️ Booking [{order}] recorded as Paid, total {}", recorded.total);
        } else {
            info!("🔄️ Duplicate notification for [{order}] ignored; booking already {}", recorded.status);
        }
        Ok((recorded, newly_recorded))
    }

    /// Handle a declined notification: release the held slots, if any. Declines for unknown references are no-ops,
    /// not errors.
    pub async fn process_declined_payment(&self, payment_ref: &OrderId) -> Result<Option<Booking>, BookingEngineError> {
        let released = self.db.cancel_booking(payment_ref).await?;
        match &released {
            Some(b) => info!("🔄️ Declined payment [{}]; hold cancelled and slots released", b.payment_ref),
            None => info!("🔄️ Declined payment [{payment_ref}] with no live hold; nothing to release"),
        }
        Ok(released)
    }

    /// Cancel abandoned holds older than the configured timeout, freeing their calendar slots.
    pub async fn expire_abandoned_holds(&self, older_than: Duration) -> Result<Vec<Booking>, BookingEngineError> {
        self.db.expire_abandoned_bookings(older_than).await
    }

    pub async fn room(&self, room_id: i64) -> Result<Room, BookingEngineError> {
        self.db.fetch_room(room_id).await?.ok_or(BookingEngineError::RoomNotFound(room_id))
    }

    pub async fn recent_bookings(&self, limit: i64) -> Result<Vec<Booking>, BookingEngineError> {
        self.db.fetch_recent_bookings(limit).await
    }

    pub async fn booking_with_slots(
        &self,
        payment_ref: &OrderId,
    ) -> Result<(Booking, Vec<TimeSlot>), BookingEngineError> {
        let booking = self
            .db
            .fetch_booking_by_payment_ref(payment_ref)
            .await?
            .ok_or_else(|| BookingEngineError::BookingNotFound(payment_ref.clone()))?;
        let slots = self.db.fetch_slots_for_booking(booking.id).await?;
        Ok((booking, slots))
    }

    /// Compare the gateway-reported total against the recomputed expected charge. Logs, never fails: a mismatch is
    /// an operator follow-up, not a reason to drop a booking the customer has paid for.
    async fn reconcile_amount(&self, booking: &NewBooking) {
        let Some(room_id) = booking.slots.first().map(|s| s.room_id) else {
            return;
        };
        match self.db.fetch_room(room_id).await {
            Ok(Some(room)) => {
                let expected = expected_total(room.hourly_rate, &booking.slots);
                if !amounts_match(expected, booking.total) {
                    warn!(
                        "🔄️💲️ Amount mismatch for [{}]: expected {expected} from {} slot(s) at {}/h, gateway \
                         reported {}. Persisting the gateway amount; flag for manual review.",
                        booking.payment_ref,
                        booking.slots.len(),
                        room.hourly_rate,
                        booking.total
                    );
                }
            },
            Ok(None) => {
                warn!("🔄️💲️ Cannot verify amount for [{}]: room {room_id} is unknown", booking.payment_ref);
            },
            Err(e) => {
                warn!("🔄️💲️ Cannot verify amount for [{}]: {e}", booking.payment_ref);
            },
        }
    }
}
