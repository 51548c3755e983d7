//! Amount reconciliation.
//!
//! The expected charge is recomputed from the booked intervals and the room's hourly rate, entirely in integer
//! cents. The comparison against the gateway-reported amount is advisory: the customer's card has already been
//! charged, so a mismatch is logged for manual review and the gateway amount is persisted as the source of truth.

use artesala_common::EuroCents;

use crate::db_types::NewTimeSlot;

/// Discrepancies up to one cent are rounding noise, not a reportable mismatch.
pub const AMOUNT_TOLERANCE_CENTS: i64 = 1;

/// Σ(slot duration) × hourly rate, rounded half-up to the nearest cent.
pub fn expected_total(hourly_rate: EuroCents, slots: &[NewTimeSlot]) -> EuroCents {
    let minutes: i64 = slots.iter().map(NewTimeSlot::duration_minutes).sum();
    EuroCents::from((hourly_rate.value() * minutes + 30) / 60)
}

/// Whether the reported charge agrees with the expected one, within tolerance.
pub fn amounts_match(expected: EuroCents, reported: EuroCents) -> bool {
    (expected - reported).value().abs() <= AMOUNT_TOLERANCE_CENTS
}
