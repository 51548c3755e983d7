mod euro;
mod secret;

pub use euro::{EuroCents, EuroConversionError, SETTLEMENT_CURRENCY_CODE};
pub use secret::Secret;
