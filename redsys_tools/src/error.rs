use thiserror::Error;

#[derive(Debug, Error)]
pub enum RedsysError {
    #[error("Invalid merchant secret key: {0}")]
    InvalidSecretKey(String),
    #[error("The signature on the notification does not match the expected value for order {0}")]
    SignatureMismatch(String),
    #[error("The signature is not valid Base64 in any accepted alphabet: {0}")]
    MalformedSignature(String),
    #[error("Could not decode Ds_MerchantParameters: {0}")]
    MalformedParameters(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Invalid currency amount: {0}")]
    InvalidCurrencyAmount(String),
}
