use artesala_common::{EuroCents, Secret};
use artesala_engine::{
    db_types::{Booking, BookingStatus, NewBooking, OrderId, Room, TimeSlot},
    traits::{BookingDatabase, BookingEngineError},
};
use chrono::{Duration, Utc};
use mockall::mock;

use crate::config::ServerConfig;

/// Base64 of a 24-byte 3DES key. Only ever used against the mock backend.
pub const TEST_KEY: &str = "c3FpemVkIGFydGVzYWxhIHRlc3Qga2V5";

mock! {
    pub BookingBackend {}
    impl BookingDatabase for BookingBackend {
        fn url(&self) -> &str;
        async fn fetch_room(&self, room_id: i64) -> Result<Option<Room>, BookingEngineError>;
        async fn fetch_booking_by_payment_ref(&self, payment_ref: &OrderId) -> Result<Option<Booking>, BookingEngineError>;
        async fn fetch_slots_for_booking(&self, booking_id: i64) -> Result<Vec<TimeSlot>, BookingEngineError>;
        async fn fetch_recent_bookings(&self, limit: i64) -> Result<Vec<Booking>, BookingEngineError>;
        async fn hold_booking(&self, booking: NewBooking) -> Result<Booking, BookingEngineError>;
        async fn confirm_booking(&self, booking: NewBooking) -> Result<(Booking, bool), BookingEngineError>;
        async fn cancel_booking(&self, payment_ref: &OrderId) -> Result<Option<Booking>, BookingEngineError>;
        async fn expire_abandoned_bookings(&self, older_than: Duration) -> Result<Vec<Booking>, BookingEngineError>;
    }
    impl Clone for BookingBackend {
        fn clone(&self) -> Self;
    }
}

pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::new("127.0.0.1", 0);
    config.admin_email = "admin@artesala.org".to_string();
    config.base_url = "http://localhost:8480".to_string();
    config.redsys.secret_key = Secret::new(TEST_KEY.to_string());
    config
}

pub fn sample_booking(order: &str, status: BookingStatus, total_cents: i64) -> Booking {
    Booking {
        id: 1,
        payment_ref: OrderId::from(order.to_string()),
        name: "Ana".to_string(),
        email: "ana@example.com".to_string(),
        phone: None,
        note: None,
        total: EuroCents::from(total_cents),
        status,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn sample_room(id: i64, rate_euros: i64) -> Room {
    Room { id, name: format!("Sala {id}"), hourly_rate: EuroCents::from_euros(rate_euros) }
}
