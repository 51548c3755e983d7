use artesala_common::{Secret, SETTLEMENT_CURRENCY_CODE};
use log::*;

/// The Redsys test environment processing URL. The production URL must be supplied via `REDSYS_URL`.
const DEFAULT_REDSYS_URL: &str = "https://sis-t.redsys.es:25443/sis/realizarPago";

#[derive(Debug, Clone, Default)]
pub struct RedsysConfig {
    /// The FUC merchant code assigned by the acquiring bank.
    pub merchant_code: String,
    /// The terminal number, usually "1".
    pub terminal: String,
    /// ISO-4217 numeric currency code. "978" for Euro.
    pub currency: String,
    /// The Base64-encoded 3DES merchant key issued by Redsys.
    pub secret_key: Secret<String>,
    /// The gateway URL the customer's browser is redirected to.
    pub gateway_url: String,
}

impl RedsysConfig {
    pub fn new_from_env_or_default() -> Self {
        let merchant_code = std::env::var("REDSYS_MERCHANT_CODE").unwrap_or_else(|_| {
            warn!("REDSYS_MERCHANT_CODE not set, using a placeholder that the gateway will reject");
            "999008881".to_string()
        });
        let terminal = std::env::var("REDSYS_TERMINAL").unwrap_or_else(|_| {
            warn!("REDSYS_TERMINAL not set, using 1 as default");
            "1".to_string()
        });
        let currency = std::env::var("REDSYS_CURRENCY").unwrap_or_else(|_| SETTLEMENT_CURRENCY_CODE.to_string());
        let secret_key = Secret::new(std::env::var("REDSYS_SECRET_KEY").unwrap_or_else(|_| {
            warn!("REDSYS_SECRET_KEY not set, signature checks will fail against the real gateway");
            // 24 zero bytes, Base64. Only useful for local testing.
            "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".to_string()
        }));
        let gateway_url = std::env::var("REDSYS_URL").unwrap_or_else(|_| {
            warn!("REDSYS_URL not set, using the Redsys *test* environment");
            DEFAULT_REDSYS_URL.to_string()
        });
        Self { merchant_code, terminal, currency, secret_key, gateway_url }
    }
}
