//! Tolerant decoding of the merchant-data blob.
//!
//! The blob is written by our own checkout endpoint, but historical front-end builds delivered it in several forms:
//! a JSON object, a JSON string that itself contains JSON, or Base64 of JSON — sometimes nested. Decoding unwraps
//! those layers up to a fixed depth and then validates the shape explicitly. Anything that does not reach a
//! recognized shape is reported as [`DecodedMerchantData::Unrecognized`]; partial data is never padded out into a
//! half-empty struct.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::signature::decode_any_base64;

const MAX_DECODE_DEPTH: usize = 4;
const MAX_BLOB_BYTES: usize = 16 * 1024;

/// One calendar interval the customer selected at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSelection {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// The booking details carried end-to-end through the payment flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantData {
    #[serde(alias = "salaId")]
    pub room_id: i64,
    #[serde(alias = "selectedSlots", default)]
    pub slots: Vec<SlotSelection>,
    #[serde(alias = "nombre", default)]
    pub name: String,
    #[serde(alias = "correo", default)]
    pub email: String,
    #[serde(alias = "telefono", default)]
    pub phone: Option<String>,
    #[serde(alias = "info_adicional", default)]
    pub note: Option<String>,
}

/// Outcome of the decode pipeline. `Unrecognized` is not an error: the caller acknowledges the gateway and skips
/// persistence, since redelivery would never make the data valid.
#[derive(Debug, Clone)]
pub enum DecodedMerchantData {
    Recognized(MerchantData),
    Unrecognized,
}

impl DecodedMerchantData {
    /// Decode the raw blob from the notification envelope, unwrapping JSON-string and Base64 layers as needed.
    pub fn decode(raw: Option<&str>) -> Self {
        let mut blob = match raw {
            Some(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => return Self::Unrecognized,
        };
        for _ in 0..MAX_DECODE_DEPTH {
            if blob.len() > MAX_BLOB_BYTES {
                debug!("Merchant data blob exceeds {MAX_BLOB_BYTES} bytes, giving up");
                return Self::Unrecognized;
            }
            match serde_json::from_str::<Value>(&blob) {
                Ok(value @ Value::Object(_)) => return Self::validate(value),
                // A JSON string literal wrapping another encoding layer.
                Ok(Value::String(inner)) => blob = inner,
                _ => match decode_any_base64(&blob).and_then(|b| String::from_utf8(b).ok()) {
                    Some(inner) => blob = inner,
                    None => {
                        debug!("Merchant data is neither JSON nor Base64, giving up");
                        return Self::Unrecognized;
                    },
                },
            }
        }
        debug!("Merchant data still not decoded after {MAX_DECODE_DEPTH} layers, giving up");
        Self::Unrecognized
    }

    fn validate(value: Value) -> Self {
        match serde_json::from_value::<MerchantData>(value) {
            Ok(data) if data.recognized() => Self::Recognized(data),
            Ok(_) => {
                debug!("Merchant data parsed but is missing required booking fields");
                Self::Unrecognized
            },
            Err(e) => {
                debug!("Merchant data does not match any known shape: {e}");
                Self::Unrecognized
            },
        }
    }
}

impl MerchantData {
    /// A blob counts as recognized only when it can actually drive a booking: a room, at least one slot, and enough
    /// customer identity to contact them.
    fn recognized(&self) -> bool {
        self.room_id > 0
            && !self.slots.is_empty()
            && !self.name.trim().is_empty()
            && !self.email.trim().is_empty()
            && self.slots.iter().all(|s| s.start < s.end)
    }
}
