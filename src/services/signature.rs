use base64::{engine::general_purpose::STANDARD, Engine};
use cbc::cipher::{block_padding::NoPadding, BlockEncryptMut, InvalidLength, KeyIvInit};
use des::{TdesEde2, TdesEde3};
use ring::hmac;

use crate::error::{Result, TpvError};

type TdesEde2CbcEnc = cbc::Encryptor<TdesEde2>;
type TdesEde3CbcEnc = cbc::Encryptor<TdesEde3>;

const BLOCK_LEN: usize = 8;

// The bank's reference implementation encrypts with an all-zero IV.
const ZERO_IV: [u8; BLOCK_LEN] = [0; BLOCK_LEN];
const ORDER_SUFFIX: [u8; 4] = [0; 4];

/// Per-order HMAC-SHA256 key.
#[derive(Debug)]
pub struct SigningKey {
    key: hmac::Key,
}

impl SigningKey {
    /// Computes the HMAC-SHA256 digest of `content`
    pub fn sign(&self, content: &[u8]) -> Vec<u8> {
        hmac::sign(&self.key, content).as_ref().to_vec()
    }

    /// Checks `tag` against the digest of `content` in constant time
    pub fn verify(&self, content: &[u8], tag: &[u8]) -> bool {
        hmac::verify(&self.key, content, tag).is_ok()
    }
}

/// Derives the signing key of one order from the merchant secret.
///
/// The secret is base64 of a two-key (16 bytes) or three-key (24 bytes)
/// triple DES key. `order || 0x00000000` is encrypted in CBC mode and the
/// whole ciphertext becomes the HMAC key.
pub fn derive_key(secret: &str, order: &str) -> Result<SigningKey> {
    let key = encrypt_order(secret, order)?;
    Ok(SigningKey {
        key: hmac::Key::new(hmac::HMAC_SHA256, &key),
    })
}

fn encrypt_order(secret: &str, order: &str) -> Result<Vec<u8>> {
    let secret = STANDARD
        .decode(secret)
        .map_err(|e| TpvError::Crypto(format!("Cannot decode secret: {}", e)))?;

    let mut block = Vec::with_capacity(order.len() + ORDER_SUFFIX.len());
    block.extend_from_slice(order.as_bytes());
    block.extend_from_slice(&ORDER_SUFFIX);

    if block.len() % BLOCK_LEN != 0 {
        return Err(TpvError::Crypto(format!(
            "Order {:?} is not aligned to the {}-byte cipher block",
            order, BLOCK_LEN
        )));
    }

    let len = block.len();
    let invalid_key = |_: InvalidLength| TpvError::Crypto("Failed to initialize cipher".to_string());
    let encrypted = match secret.len() {
        24 => TdesEde3CbcEnc::new_from_slices(&secret, &ZERO_IV)
            .map_err(invalid_key)?
            .encrypt_padded_mut::<NoPadding>(&mut block, len),
        16 => TdesEde2CbcEnc::new_from_slices(&secret, &ZERO_IV)
            .map_err(invalid_key)?
            .encrypt_padded_mut::<NoPadding>(&mut block, len),
        other => {
            return Err(TpvError::Crypto(format!(
                "Invalid secret length {} (expected 16 or 24 bytes)",
                other
            )))
        }
    };
    encrypted.map_err(|_| TpvError::Crypto("Cipher input is not block aligned".to_string()))?;

    Ok(block)
}
