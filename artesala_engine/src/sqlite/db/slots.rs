use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewTimeSlot, TimeSlot},
    traits::BookingEngineError,
};

/// The message raised by the `time_slots_no_overlap` trigger.
const OVERLAP_TRIGGER_MESSAGE: &str = "overlapping time slot";

/// Inserts the slot rows for a booking. Any overlap with an existing reservation for the same room fires the
/// database trigger, which maps to [`BookingEngineError::SlotConflict`] and aborts the caller's transaction.
pub async fn insert_slots(
    booking_id: i64,
    slots: &[NewTimeSlot],
    conn: &mut SqliteConnection,
) -> Result<Vec<TimeSlot>, BookingEngineError> {
    let mut inserted = Vec::with_capacity(slots.len());
    for slot in slots {
        let row: TimeSlot = sqlx::query_as(
            r#"
                INSERT INTO time_slots (booking_id, room_id, starts_at, ends_at)
                VALUES ($1, $2, $3, $4)
                RETURNING *;
            "#,
        )
        .bind(booking_id)
        .bind(slot.room_id)
        .bind(slot.starts_at)
        .bind(slot.ends_at)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(err) if err.message().contains(OVERLAP_TRIGGER_MESSAGE) => {
                BookingEngineError::SlotConflict
            },
            _ => BookingEngineError::from(e),
        })?;
        inserted.push(row);
    }
    debug!("🗃️ {} slot(s) reserved for booking id {booking_id}", inserted.len());
    Ok(inserted)
}

pub async fn fetch_slots_for_booking(
    booking_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<TimeSlot>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM time_slots WHERE booking_id = $1 ORDER BY starts_at")
        .bind(booking_id)
        .fetch_all(conn)
        .await
}

/// Deletes a booking's slot rows, releasing the calendar. Returns the number of rows removed.
pub async fn delete_slots_for_booking(booking_id: i64, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM time_slots WHERE booking_id = $1").bind(booking_id).execute(conn).await?;
    Ok(result.rows_affected())
}
