//! Encryption for private cookies.
//!
//! Values are sealed with AES-128-GCM-SIV using the key from the global configuration
//! and encoded as URL-safe base64, so they can be stored directly in a cookie.
use aes::Aes128;
use aes_gcm_siv::{
    aead::{Aead, KeyInit},
    Aes128GcmSiv, AesGcmSiv, Key, Nonce,
};
use base64::{engine::general_purpose, Engine as _};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::get_config;

const NONCE_LEN: usize = 96 / 8;

#[derive(Error, Debug)]
pub enum Error {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("aes error: {0}")]
    AesError(aes_gcm_siv::Error),
}

impl From<aes_gcm_siv::Error> for Error {
    fn from(error: aes_gcm_siv::Error) -> Error {
        Error::AesError(error)
    }
}

#[derive(Serialize, Deserialize)]
struct Sealed {
    #[serde(rename = "c")]
    ciphertext: Vec<u8>,

    #[serde(rename = "n")]
    nonce: Vec<u8>,
}

/// Symmetric cipher bound to a key.
pub struct Cipher {
    cipher: Aes128GcmSiv,
}

impl Cipher {
    /// Create a cipher using the provided key.
    pub fn new(key: &Key<AesGcmSiv<Aes128>>) -> Self {
        Self {
            cipher: Aes128GcmSiv::new(key),
        }
    }

    /// Cipher using the key from the global configuration.
    pub fn global() -> Self {
        Self::new(&get_config().general.aes_key)
    }

    /// Encrypt bytes and encode the result as base64 text.
    pub fn seal(&self, data: &[u8]) -> Result<String, Error> {
        let nonce = rand::thread_rng().gen::<[u8; NONCE_LEN]>();
        let ciphertext = self.cipher.encrypt(Nonce::from_slice(&nonce), data)?;

        let sealed = serde_json::to_vec(&Sealed {
            ciphertext,
            nonce: nonce.to_vec(),
        })?;

        Ok(general_purpose::URL_SAFE_NO_PAD.encode(sealed))
    }

    /// Decode and decrypt text produced by [`Cipher::seal`].
    pub fn open(&self, data: &str) -> Result<Vec<u8>, Error> {
        let decoded = general_purpose::URL_SAFE_NO_PAD.decode(data)?;
        let sealed: Sealed = serde_json::from_slice(&decoded)?;

        if sealed.nonce.len() != NONCE_LEN {
            return Err(Error::AesError(aes_gcm_siv::Error));
        }

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&sealed.nonce), sealed.ciphertext.as_ref())?;

        Ok(plaintext)
    }
}

/// Encrypt some bytes using the global configured encryption key.
///
/// # Example
///
/// ```
/// use rwf_layout::crypto::{encrypt, decrypt};
///
/// let ciphertext = encrypt(b"hello world").expect("encryption failed");
/// assert_eq!(decrypt(&ciphertext).unwrap(), b"hello world");
/// ```
pub fn encrypt(data: &[u8]) -> Result<String, Error> {
    Cipher::global().seal(data)
}

/// Decrypt text encrypted with [`encrypt`].
pub fn decrypt(data: &str) -> Result<Vec<u8>, Error> {
    Cipher::global().open(data)
}
