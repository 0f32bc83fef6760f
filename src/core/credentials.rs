//! Encrypted at-rest storage for the GitHub access token
//!
//! The token is sealed with AES-256-GCM under a key from a `KeyProvider` and
//! written to a `SecretSlot` as `nonce (12 bytes) || ciphertext+tag`. Every
//! `save` draws a fresh random nonce.
//!
//! Reading never fails: a missing, truncated, tampered or undecryptable blob
//! is reported as "no credential", which is the normal unauthenticated
//! condition. Only `save` reports errors.
//!
//! Decrypted values are cached per vault instance to minimize keychain
//! prompts and disk reads.

use std::sync::RwLock;

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use secrecy::{ExposeSecret, SecretString};

use crate::core::keys::KeyProvider;
use crate::core::slot::SecretSlot;
use crate::error::{GhviewError, Result};

/// AES-GCM nonce length
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length
const TAG_LEN: usize = 16;

/// Encrypted single-secret store
pub struct CredentialVault {
    slot: Box<dyn SecretSlot>,
    keys: Box<dyn KeyProvider>,
    // Option<Option<T>>:
    //   - None = not yet read from the slot
    //   - Some(None) = read, but no credential exists
    //   - Some(Some(value)) = read and cached
    cache: RwLock<Option<Option<SecretString>>>,
}

impl CredentialVault {
    /// Create a vault over a slot and a key source
    pub fn new(slot: impl SecretSlot + 'static, keys: impl KeyProvider + 'static) -> Self {
        Self::from_parts(Box::new(slot), Box::new(keys))
    }

    /// Create a vault from already boxed parts chosen at runtime
    pub fn from_parts(slot: Box<dyn SecretSlot>, keys: Box<dyn KeyProvider>) -> Self {
        Self {
            slot,
            keys,
            cache: RwLock::new(None),
        }
    }

    /// Encrypt and persist the secret, replacing any previous one
    pub fn save(&self, secret: &str) -> Result<()> {
        if secret.is_empty() {
            return Err(GhviewError::InvalidInput(
                "Refusing to store an empty token".to_string(),
            ));
        }

        let result = self.seal(secret).and_then(|blob| {
            self.slot
                .write(&blob)
                .map_err(|e| GhviewError::Storage(e.to_string()))
        });

        if let Ok(mut cache) = self.cache.write() {
            *cache = match result {
                Ok(()) => Some(Some(SecretString::from(secret.to_string()))),
                // The slot may still hold the previous value; re-read next time
                Err(_) => None,
            };
        }

        result
    }

    /// Retrieve the stored secret, or `None` when there is no usable one
    pub fn load(&self) -> Option<SecretString> {
        if let Ok(cache) = self.cache.read() {
            if let Some(cached_value) = cache.as_ref() {
                return cached_value.clone();
            }
        }

        let result = self.read_from_slot();

        if let Ok(mut cache) = self.cache.write() {
            *cache = Some(result.clone());
        }

        result
    }

    /// Erase the stored secret
    ///
    /// Never fails. If the slot cannot be removed it is overwritten with an
    /// empty blob, and this vault reports no credential from now on either way.
    pub fn clear(&self) {
        if let Err(e) = self.slot.remove() {
            tracing::warn!("Failed to remove credential slot: {}", e);
            if let Err(e) = self.slot.write(&[]) {
                tracing::warn!("Failed to blank credential slot: {}", e);
            }
        }

        // Clear cache immediately
        if let Ok(mut cache) = self.cache.write() {
            *cache = Some(None);
        }
    }

    /// Whether a non-empty secret is currently stored
    pub fn has_secret(&self) -> bool {
        self.load().is_some()
    }

    fn seal(&self, secret: &str) -> Result<Vec<u8>> {
        let cipher = Aes256Gcm::new(&self.keys.key()?);
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = cipher
            .encrypt(&nonce, secret.as_bytes())
            .map_err(|_| GhviewError::Encryption("AES-GCM encryption failed".to_string()))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    fn open(&self, blob: &[u8]) -> Result<SecretString> {
        if blob.len() < NONCE_LEN + TAG_LEN {
            return Err(GhviewError::Encryption(format!(
                "Stored credential is truncated ({} bytes)",
                blob.len()
            )));
        }

        let (nonce, ciphertext) = blob.split_at(NONCE_LEN);
        let cipher = Aes256Gcm::new(&self.keys.key()?);

        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| {
                GhviewError::Encryption("Stored credential failed authentication".to_string())
            })?;

        let secret = String::from_utf8(plaintext).map_err(|_| {
            GhviewError::Encryption("Stored credential is not valid UTF-8".to_string())
        })?;

        Ok(SecretString::from(secret))
    }

    fn read_from_slot(&self) -> Option<SecretString> {
        let blob = match self.slot.read() {
            Ok(Some(blob)) if !blob.is_empty() => blob,
            Ok(_) => return None,
            Err(e) => {
                tracing::warn!("Failed to read credential slot: {}", e);
                return None;
            }
        };

        match self.open(&blob) {
            Ok(secret) if !secret.expose_secret().is_empty() => Some(secret),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Discarding stored credential: {}", e);
                None
            }
        }
    }

    /// Get a masked version of a token for display (shows first 4 and last 4 chars)
    pub fn mask_token(token: &SecretString) -> String {
        let exposed = token.expose_secret();
        let chars: Vec<char> = exposed.chars().collect();
        if chars.len() <= 8 {
            "*".repeat(chars.len())
        } else {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{}...{}", head, tail)
        }
    }
}
