//! Decoding of the asynchronous Redsys payment notification.
//!
//! The gateway POSTs (or, in the synchronous redirect fallback, GETs) a form with three fields:
//! `Ds_SignatureVersion`, `Ds_MerchantParameters` (Base64 of a JSON object) and `Ds_Signature`. The JSON field
//! names and value types drift between integration profiles — amounts and response codes arrive as strings or
//! numbers, and the merchant-data key has several spellings — so extraction is done against a `serde_json::Value`
//! rather than a rigid struct.

use std::fmt::Display;

use artesala_common::EuroCents;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{signature::decode_any_base64, RedsysError};

/// The raw notification form as it arrives from the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationForm {
    #[serde(rename = "Ds_SignatureVersion", default)]
    pub signature_version: String,
    #[serde(rename = "Ds_MerchantParameters", default)]
    pub merchant_parameters: String,
    #[serde(rename = "Ds_Signature", default)]
    pub signature: String,
}

/// Key aliases under which different Redsys integration profiles deliver the merchant-data blob.
const MERCHANT_DATA_KEYS: [&str; 3] = ["Ds_MerchantData", "DS_MERCHANTDATA", "Ds_Merchant_MerchantData"];

/// The decoded notification envelope. Transient: constructed per request and discarded after processing.
#[derive(Debug, Clone)]
pub struct PaymentNotification {
    /// The merchant order number this notification settles.
    pub order: String,
    /// The gateway response code. 0-99 means the charge was authorised.
    pub response: ResponseCode,
    /// The amount actually charged, in minor units.
    pub amount: EuroCents,
    /// The authorisation code assigned by the issuer, when present.
    pub authorisation_code: Option<String>,
    /// The opaque merchant-data blob echoed back from checkout, still encoded.
    pub merchant_data: Option<String>,
}

impl PaymentNotification {
    /// Decode the `Ds_MerchantParameters` blob into an envelope.
    ///
    /// Fails only when the blob is not Base64(JSON-object) or carries no order number; everything else is optional
    /// here and validated downstream.
    pub fn from_merchant_parameters(params_b64: &str) -> Result<Self, RedsysError> {
        let raw = decode_any_base64(params_b64)
            .ok_or_else(|| RedsysError::MalformedParameters("not valid Base64".to_string()))?;
        let json = String::from_utf8(raw)
            .map_err(|e| RedsysError::MalformedParameters(format!("payload is not UTF-8: {e}")))?;
        let params: Value = serde_json::from_str(&json).map_err(|e| RedsysError::JsonError(e.to_string()))?;
        let order = field_as_string(&params, &["Ds_Order", "DS_ORDER", "Ds_Merchant_Order"])
            .ok_or_else(|| RedsysError::MalformedParameters("no order number in notification".to_string()))?;
        let response =
            ResponseCode::parse(&field_as_string(&params, &["Ds_Response", "DS_RESPONSE"]).unwrap_or_default());
        // Absent on some decline profiles; zero keeps the decline path moving.
        let amount = match field_as_string(&params, &["Ds_Amount", "DS_AMOUNT"]) {
            Some(s) => s.parse::<EuroCents>().map_err(|e| RedsysError::InvalidCurrencyAmount(e.to_string()))?,
            None => EuroCents::from(0),
        };
        let authorisation_code =
            field_as_string(&params, &["Ds_AuthorisationCode", "DS_AUTHORISATIONCODE"]).filter(|s| !s.trim().is_empty());
        let merchant_data = field_as_string(&params, &MERCHANT_DATA_KEYS).filter(|s| !s.is_empty());
        Ok(Self { order, response, amount, authorisation_code, merchant_data })
    }
}

/// Read a field under any of its known aliases, stringifying bare JSON numbers.
fn field_as_string(params: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| params.get(k)).and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

//--------------------------------------     ResponseCode       -------------------------------------------------------
/// The gateway's numeric authorisation result. Codes 0-99 are authorised; everything else, including values that do
/// not parse as a number at all, is a decline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseCode(Option<u32>);

impl ResponseCode {
    pub fn parse(s: &str) -> Self {
        Self(s.trim().parse::<u32>().ok())
    }

    pub fn is_authorised(&self) -> bool {
        matches!(self.0, Some(code) if code <= 99)
    }
}

impl Display for ResponseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(code) => write!(f, "{code:04}"),
            None => f.write_str("????"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn response_code_classification() {
        assert!(ResponseCode::parse("0").is_authorised());
        assert!(ResponseCode::parse("0000").is_authorised());
        assert!(ResponseCode::parse("99").is_authorised());
        assert!(!ResponseCode::parse("100").is_authorised());
        assert!(!ResponseCode::parse("101").is_authorised());
        assert!(!ResponseCode::parse("9915").is_authorised());
        assert!(!ResponseCode::parse("").is_authorised());
        assert!(!ResponseCode::parse("declined").is_authorised());
    }

    #[test]
    fn decode_typical_notification() {
        let params = serde_json::json!({
            "Ds_Date": "30/08/2026",
            "Ds_Order": "000123456789",
            "Ds_Response": "0000",
            "Ds_Amount": "3000",
            "Ds_AuthorisationCode": "481562",
            "Ds_MerchantData": "{\"salaId\":2}",
        });
        let b64 = base64::encode(params.to_string());
        let n = PaymentNotification::from_merchant_parameters(&b64).unwrap();
        assert_eq!(n.order, "000123456789");
        assert!(n.response.is_authorised());
        assert_eq!(n.amount.value(), 3000);
        assert_eq!(n.authorisation_code.as_deref(), Some("481562"));
        assert!(n.merchant_data.is_some());
    }

    #[test]
    fn decode_tolerates_numeric_fields_and_url_safe_base64() {
        let params = serde_json::json!({
            "Ds_Order": 123456,
            "Ds_Response": 101,
            "Ds_Amount": 2500,
        });
        let b64 = base64::encode(params.to_string()).replace('+', "-").replace('/', "_");
        let n = PaymentNotification::from_merchant_parameters(&b64).unwrap();
        assert_eq!(n.order, "123456");
        assert!(!n.response.is_authorised());
        assert_eq!(n.amount.value(), 2500);
        assert!(n.merchant_data.is_none());
    }

    #[test]
    fn decode_rejects_missing_order() {
        let b64 = base64::encode(serde_json::json!({ "Ds_Response": "0000" }).to_string());
        assert!(PaymentNotification::from_merchant_parameters(&b64).is_err());
    }
}
