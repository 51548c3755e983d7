use artesala_common::EuroCents;
use sqlx::SqliteConnection;

use crate::db_types::Room;

pub async fn fetch_room(room_id: i64, conn: &mut SqliteConnection) -> Result<Option<Room>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM rooms WHERE id = $1").bind(room_id).fetch_optional(conn).await
}

/// Creates or replaces a room definition. Rooms are reference data maintained by the operator (and test setup);
/// the reconciliation flow only ever reads them.
pub async fn upsert_room(
    room_id: i64,
    name: &str,
    hourly_rate: EuroCents,
    conn: &mut SqliteConnection,
) -> Result<Room, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO rooms (id, name, hourly_rate) VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET name = excluded.name, hourly_rate = excluded.hourly_rate
            RETURNING *;
        "#,
    )
    .bind(room_id)
    .bind(name)
    .bind(hourly_rate)
    .fetch_one(conn)
    .await
}
