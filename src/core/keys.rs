//! Sources for the vault's symmetric key
//!
//! The preferred source is the system keyring (macOS Keychain, Linux Secret
//! Service), where a random AES-256 key is generated on first use and kept
//! from then on. The key bytes are read into process memory to encrypt, so
//! the keyring protects the key at rest but not from the running process.
//!
//! `EphemeralKeyProvider` is the fallback for hosts without a keyring: the
//! key exists only in memory, so a blob written by an earlier process can no
//! longer be decrypted and loads as absent.

use aes_gcm::aead::{KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key};
use keyring::Entry;
use once_cell::sync::OnceCell;

use crate::error::{GhviewError, Result};

/// Keyring service name shared by all ghview entries
pub const SERVICE_NAME: &str = "ghview";

/// Keyring entry holding the vault key
const VAULT_KEY_ENTRY: &str = "vault_key";

/// Supplies the AES-256-GCM key used by the credential vault
pub trait KeyProvider: Send + Sync {
    fn key(&self) -> Result<Key<Aes256Gcm>>;
}

/// Key stored in the system keyring, generated on first use
pub struct KeyringKeyProvider {
    service: String,
    entry: String,
    // Cached to minimize keychain prompts
    cache: OnceCell<Key<Aes256Gcm>>,
}

impl KeyringKeyProvider {
    pub fn new() -> Self {
        Self::with_entry(SERVICE_NAME, VAULT_KEY_ENTRY)
    }

    /// Use a custom service/entry pair
    pub fn with_entry(service: impl Into<String>, entry: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            entry: entry.into(),
            cache: OnceCell::new(),
        }
    }

    fn fetch_or_create(&self) -> Result<Key<Aes256Gcm>> {
        let entry = Entry::new(&self.service, &self.entry)?;

        match entry.get_secret() {
            Ok(bytes) if bytes.len() == 32 => Ok(*Key::<Aes256Gcm>::from_slice(&bytes)),
            Ok(bytes) => Err(GhviewError::Credential(format!(
                "Stored vault key has {} bytes, expected 32",
                bytes.len()
            ))),
            Err(keyring::Error::NoEntry) => {
                tracing::info!("Generating a new credential vault key");
                let key = Aes256Gcm::generate_key(OsRng);
                entry.set_secret(key.as_slice())?;
                Ok(key)
            }
            Err(e) => Err(GhviewError::Credential(format!(
                "Cannot access system keychain. Make sure your keyring is unlocked. ({})",
                e
            ))),
        }
    }
}

impl Default for KeyringKeyProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyProvider for KeyringKeyProvider {
    fn key(&self) -> Result<Key<Aes256Gcm>> {
        self.cache.get_or_try_init(|| self.fetch_or_create()).copied()
    }
}

/// Key generated once and held only in process memory
pub struct EphemeralKeyProvider {
    key: Key<Aes256Gcm>,
}

impl EphemeralKeyProvider {
    pub fn new() -> Self {
        Self {
            key: Aes256Gcm::generate_key(OsRng),
        }
    }

    /// Provider with a fixed key
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { key: bytes.into() }
    }
}

impl Default for EphemeralKeyProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyProvider for EphemeralKeyProvider {
    fn key(&self) -> Result<Key<Aes256Gcm>> {
        Ok(self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ephemeral_keys_differ() {
        let a = EphemeralKeyProvider::new().key().unwrap();
        let b = EphemeralKeyProvider::new().key().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_fixed_key_is_stable() {
        let provider = EphemeralKeyProvider::from_bytes([7u8; 32]);
        assert_eq!(provider.key().unwrap(), provider.key().unwrap());
        assert_eq!(provider.key().unwrap().as_slice(), &[7u8; 32]);
    }
}
