use artesala_engine::{db_types::Booking, BookingFlowApi, SqliteDatabase};
use chrono::Duration;
use log::*;
use tokio::task::JoinHandle;

/// Starts the abandoned-hold expiry worker. Do not await the returned JoinHandle, as it will run indefinitely.
pub fn start_expiry_worker(db: SqliteDatabase, pending_timeout: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(std::time::Duration::from_secs(60));
        let api = BookingFlowApi::new(db);
        info!("🕰️ Abandoned-hold expiry worker started (holds lapse after {} hrs)", pending_timeout.num_hours());
        loop {
            timer.tick().await;
            trace!("🕰️ Running abandoned-hold expiry job");
            match api.expire_abandoned_holds(pending_timeout).await {
                Ok(expired) if expired.is_empty() => {},
                Ok(expired) => {
                    info!("🕰️ {} abandoned hold(s) expired, slots released", expired.len());
                    debug!("🕰️ Expired holds: {}", booking_list(&expired));
                },
                Err(e) => {
                    error!("🕰️ Error running abandoned-hold expiry job: {e}");
                },
            }
        }
    })
}

fn booking_list(bookings: &[Booking]) -> String {
    bookings
        .iter()
        .map(|b| format!("[{}] order: {} email: {}", b.id, b.payment_ref, b.email))
        .collect::<Vec<String>>()
        .join(", ")
}
