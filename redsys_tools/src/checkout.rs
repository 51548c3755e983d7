//! Building and signing the outbound payment-initiation request.
//!
//! Redsys is redirect-based: the server assembles a `Ds_Merchant_*` parameter set, Base64-encodes it, signs it with
//! the same key-derivation scheme used for notifications, and hands the result to the browser, which auto-submits a
//! form to the gateway.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{signature::expected_signature, RedsysConfig, RedsysError};

pub const SIGNATURE_VERSION: &str = "HMAC_SHA256_V1";

/// A standard (non-preauthorisation, non-refund) payment.
const TRANSACTION_TYPE_CHARGE: &str = "0";

/// Generate a merchant order number: 12 digits, well inside the gateway's 4-12 digit requirement.
///
/// Truncated-millisecond timestamp plus a random suffix, so two checkouts in the same millisecond still get
/// distinct numbers.
pub fn generate_order_id() -> String {
    let ts = Utc::now().timestamp_millis().unsigned_abs() % 100_000_000;
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("{ts:08}{suffix:04}")
}

/// The signed form the checkout UI auto-submits to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectForm {
    pub url: String,
    #[serde(rename = "Ds_SignatureVersion")]
    pub signature_version: String,
    #[serde(rename = "Ds_MerchantParameters")]
    pub merchant_parameters: String,
    #[serde(rename = "Ds_Signature")]
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MerchantParameters {
    #[serde(rename = "Ds_Merchant_Amount")]
    amount: String,
    #[serde(rename = "Ds_Merchant_Currency")]
    currency: String,
    #[serde(rename = "Ds_Merchant_Order")]
    order: String,
    #[serde(rename = "Ds_Merchant_MerchantCode")]
    merchant_code: String,
    #[serde(rename = "Ds_Merchant_Terminal")]
    terminal: String,
    #[serde(rename = "Ds_Merchant_TransactionType")]
    transaction_type: String,
    #[serde(rename = "Ds_Merchant_ProductDescription")]
    product_description: String,
    #[serde(rename = "Ds_Merchant_Titular")]
    titular: String,
    #[serde(rename = "Ds_Merchant_MerchantURL")]
    merchant_url: String,
    #[serde(rename = "Ds_Merchant_UrlOK")]
    url_ok: String,
    #[serde(rename = "Ds_Merchant_UrlKO")]
    url_ko: String,
    #[serde(rename = "Ds_Merchant_MerchantData")]
    merchant_data: String,
}

#[derive(Debug, Clone, Default)]
pub struct CheckoutRequestBuilder {
    order: Option<String>,
    amount_minor_units: Option<String>,
    description: Option<String>,
    titular: Option<String>,
    merchant_data: Option<String>,
    notification_url: Option<String>,
    url_ok: Option<String>,
    url_ko: Option<String>,
}

impl CheckoutRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// The amount to charge, already expressed in minor units (e.g. "3000" for €30.00).
    pub fn amount_minor_units(mut self, amount: impl Into<String>) -> Self {
        self.amount_minor_units = Some(amount.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The cardholder name shown on the gateway's payment page.
    pub fn titular(mut self, titular: impl Into<String>) -> Self {
        self.titular = Some(titular.into());
        self
    }

    /// The opaque blob echoed back verbatim in the notification.
    pub fn merchant_data(mut self, data: impl Into<String>) -> Self {
        self.merchant_data = Some(data.into());
        self
    }

    /// Derive the notification and return URLs from the public base URL of this deployment.
    pub fn return_urls(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.notification_url = Some(format!("{base}/redsys/notification"));
        self.url_ok = Some(format!("{base}/pago/ok"));
        self.url_ko = Some(format!("{base}/pago/ko"));
        self
    }

    /// Assemble, encode and sign the redirect form.
    pub fn build(self, config: &RedsysConfig) -> Result<RedirectForm, RedsysError> {
        let order = self.order.unwrap_or_else(generate_order_id);
        let params = MerchantParameters {
            amount: self.amount_minor_units.unwrap_or_else(|| "0".to_string()),
            currency: config.currency.clone(),
            order: order.clone(),
            merchant_code: config.merchant_code.clone(),
            terminal: config.terminal.clone(),
            transaction_type: TRANSACTION_TYPE_CHARGE.to_string(),
            product_description: self.description.unwrap_or_else(|| "Reserva ArteSala".to_string()),
            titular: self.titular.unwrap_or_else(|| "Cliente ArteSala".to_string()),
            merchant_url: self.notification_url.unwrap_or_default(),
            url_ok: self.url_ok.unwrap_or_default(),
            url_ko: self.url_ko.unwrap_or_default(),
            merchant_data: self.merchant_data.unwrap_or_default(),
        };
        let json = serde_json::to_string(&params).map_err(|e| RedsysError::JsonError(e.to_string()))?;
        let merchant_parameters = base64::encode(json);
        let signature = expected_signature(config.secret_key.reveal(), &order, &merchant_parameters)?;
        Ok(RedirectForm {
            url: config.gateway_url.clone(),
            signature_version: SIGNATURE_VERSION.to_string(),
            merchant_parameters,
            signature,
        })
    }
}
