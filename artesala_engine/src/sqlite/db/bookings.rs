use chrono::{Duration, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Booking, BookingStatus, NewBooking, OrderId},
    traits::BookingEngineError,
};

/// Inserts a booking header with the given status. The UNIQUE constraint on `payment_ref` is the idempotency guard:
/// a violation maps to [`BookingEngineError::BookingAlreadyExists`], which callers treat as "already processed", not
/// as a failure.
pub async fn insert_booking(
    booking: &NewBooking,
    status: BookingStatus,
    conn: &mut SqliteConnection,
) -> Result<Booking, BookingEngineError> {
    let payment_ref = booking.payment_ref.clone();
    let now = Utc::now();
    let booking: Booking = sqlx::query_as(
        r#"
            INSERT INTO bookings (payment_ref, name, email, phone, note, total, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING *;
        "#,
    )
    .bind(&booking.payment_ref)
    .bind(&booking.name)
    .bind(&booking.email)
    .bind(&booking.phone)
    .bind(&booking.note)
    .bind(booking.total)
    .bind(status)
    .bind(now)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => {
            BookingEngineError::BookingAlreadyExists(payment_ref)
        },
        _ => BookingEngineError::from(e),
    })?;
    debug!("🗃️ Booking [{}] inserted with id {}", booking.payment_ref, booking.id);
    Ok(booking)
}

pub async fn fetch_booking_by_payment_ref(
    payment_ref: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Booking>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM bookings WHERE payment_ref = $1")
        .bind(payment_ref.as_str())
        .fetch_optional(conn)
        .await
}

pub async fn fetch_recent_bookings(limit: i64, conn: &mut SqliteConnection) -> Result<Vec<Booking>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM bookings ORDER BY created_at DESC, id DESC LIMIT $1")
        .bind(limit)
        .fetch_all(conn)
        .await
}

/// Transitions a booking to a new status. The caller is responsible for only requesting legal transitions;
/// this function merely refuses to touch a row that no longer exists.
pub async fn update_status(
    id: i64,
    status: BookingStatus,
    conn: &mut SqliteConnection,
) -> Result<Booking, BookingEngineError> {
    let booking: Option<Booking> =
        sqlx::query_as("UPDATE bookings SET status = $1, updated_at = $2 WHERE id = $3 RETURNING *")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(conn)
            .await?;
    booking.ok_or_else(|| BookingEngineError::DatabaseError(format!("booking id {id} vanished mid-update")))
}

/// Promotes a booking to `Paid`, overwriting the stored total with the amount the gateway actually charged.
pub async fn mark_paid(
    id: i64,
    charged_total: artesala_common::EuroCents,
    conn: &mut SqliteConnection,
) -> Result<Booking, BookingEngineError> {
    let booking: Option<Booking> = sqlx::query_as(
        "UPDATE bookings SET status = 'Paid', total = $1, updated_at = $2 WHERE id = $3 RETURNING *",
    )
    .bind(charged_total)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(conn)
    .await?;
    booking.ok_or_else(|| BookingEngineError::DatabaseError(format!("booking id {id} vanished mid-update")))
}

/// All `Pending` bookings created before the cutoff, i.e. abandoned holds due for expiry.
pub async fn fetch_stale_pending_bookings(
    older_than: Duration,
    conn: &mut SqliteConnection,
) -> Result<Vec<Booking>, sqlx::Error> {
    let cutoff = Utc::now() - older_than;
    sqlx::query_as("SELECT * FROM bookings WHERE status = 'Pending' AND created_at < $1")
        .bind(cutoff)
        .fetch_all(conn)
        .await
}
