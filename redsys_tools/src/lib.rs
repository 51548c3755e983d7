//! Redsys integration library for the ArteSala payment server.
//!
//! This crate contains everything needed to talk to the Redsys card gateway, and nothing else: building and signing
//! the checkout redirect form, decoding the asynchronous payment notification, verifying its `HMAC_SHA256_V1`
//! signature, and tolerantly parsing the merchant-data blob that carries the booking details through the payment flow.
//!
//! Everything in here is pure and gateway-facing. Database persistence lives in `artesala_engine`, and the HTTP
//! surface lives in `artesala_server`.
mod checkout;
mod config;
mod error;
mod merchant_data;
mod notification;
mod signature;

pub use checkout::{generate_order_id, CheckoutRequestBuilder, RedirectForm, SIGNATURE_VERSION};
pub use config::RedsysConfig;
pub use error::RedsysError;
pub use merchant_data::{DecodedMerchantData, MerchantData, SlotSelection};
pub use notification::{NotificationForm, PaymentNotification, ResponseCode};
pub use signature::{expected_signature, verify_signature};
