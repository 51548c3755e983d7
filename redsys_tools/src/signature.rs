//! Redsys `HMAC_SHA256_V1` signature scheme.
//!
//! Redsys derives a one-off key per order: the order number is zero-padded to the 3DES block size and encrypted under
//! the shared merchant key with 3DES-CBC and an all-zero IV. The resulting ciphertext keys an HMAC-SHA256 over the
//! Base64-encoded `Ds_MerchantParameters` string. The gateway may echo the signature back in URL-safe Base64, so
//! verification must canonicalize the alphabet before comparing.

use cbc::cipher::{block_padding::ZeroPadding, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::RedsysError;

type TdesCbcEnc = cbc::Encryptor<des::TdesEde3>;
type HmacSha256 = Hmac<Sha256>;

const TDES_BLOCK_SIZE: usize = 8;

/// Derive the per-order HMAC key by encrypting the order number under the merchant secret.
fn derive_order_key(secret_key_b64: &str, order: &str) -> Result<Vec<u8>, RedsysError> {
    let key = base64::decode(secret_key_b64)
        .map_err(|e| RedsysError::InvalidSecretKey(format!("merchant key is not valid Base64: {e}")))?;
    let cipher = TdesCbcEnc::new_from_slices(&key, &[0u8; TDES_BLOCK_SIZE])
        .map_err(|e| RedsysError::InvalidSecretKey(format!("merchant key has the wrong length: {e}")))?;
    Ok(cipher.encrypt_padded_vec_mut::<ZeroPadding>(order.as_bytes()))
}

/// Compute the expected signature for the given order and parameter blob, as standard Base64.
///
/// For a fixed key, order and blob the result is deterministic; there is no nonce or timestamp in the scheme.
pub fn expected_signature(secret_key_b64: &str, order: &str, params_b64: &str) -> Result<String, RedsysError> {
    let mac = expected_mac(secret_key_b64, order, params_b64)?;
    Ok(base64::encode(mac.finalize().into_bytes()))
}

/// Verify a gateway-supplied signature against the recomputed value.
///
/// The received signature is accepted in standard or URL-safe Base64, padded or not. The comparison itself is
/// performed on the raw MAC bytes in constant time.
pub fn verify_signature(
    secret_key_b64: &str,
    order: &str,
    params_b64: &str,
    received: &str,
) -> Result<(), RedsysError> {
    let received_bytes = decode_any_base64(received)
        .ok_or_else(|| RedsysError::MalformedSignature(received.to_string()))?;
    let mac = expected_mac(secret_key_b64, order, params_b64)?;
    mac.verify_slice(&received_bytes).map_err(|_| RedsysError::SignatureMismatch(order.to_string()))
}

fn expected_mac(secret_key_b64: &str, order: &str, params_b64: &str) -> Result<HmacSha256, RedsysError> {
    let order_key = derive_order_key(secret_key_b64, order)?;
    let mut mac = HmacSha256::new_from_slice(&order_key)
        .map_err(|e| RedsysError::InvalidSecretKey(format!("derived key rejected by HMAC: {e}")))?;
    mac.update(params_b64.as_bytes());
    Ok(mac)
}

/// Decode Base64 in whichever alphabet the gateway used. Redsys mixes standard and URL-safe encodings between the
/// POST notification and the browser-redirect flows.
pub(crate) fn decode_any_base64(input: &str) -> Option<Vec<u8>> {
    let trimmed = input.trim().trim_end_matches('=');
    base64::decode_config(trimmed, base64::STANDARD_NO_PAD)
        .or_else(|_| base64::decode_config(trimmed, base64::URL_SAFE_NO_PAD))
        .ok()
}
