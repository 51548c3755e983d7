use artesala_engine::db_types::{Booking, TimeSlot};
use redsys_tools::SlotSelection;
use serde::{Deserialize, Serialize};

/// The customer block of a checkout request, as submitted by the booking UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub room_id: i64,
    pub slots: Vec<SlotSelection>,
    pub customer: CustomerDetails,
}

/// Admin view of one booking and the slots it reserves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDetail {
    pub booking: Booking,
    pub slots: Vec<TimeSlot>,
}
