//! Persistence for the encrypted credential blob
//!
//! A slot holds exactly one opaque byte blob. The vault decides what goes in
//! it; the slot only knows how to read, replace and remove it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// File name of the credential slot inside the data directory
pub const CREDENTIAL_SLOT_FILE: &str = "access_token.bin";

/// A single named storage slot
pub trait SecretSlot: Send + Sync {
    /// Read the stored blob, `None` if the slot is empty
    fn read(&self) -> io::Result<Option<Vec<u8>>>;

    /// Replace the stored blob
    fn write(&self, blob: &[u8]) -> io::Result<()>;

    /// Remove the stored blob; removing an empty slot is not an error
    fn remove(&self) -> io::Result<()>;
}

/// Slot backed by a file with owner-only permissions
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    /// Slot stored at `path`; parent directories are created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Credential slot inside a data directory
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(CREDENTIAL_SLOT_FILE))
    }

    /// Location of the slot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SecretSlot for FileSlot {
    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, blob: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write then rename so a crash never leaves a half-written blob
        let temp = self.temp_path();
        fs::write(&temp, blob)?;

        #[cfg(unix)]
        fs::set_permissions(&temp, fs::Permissions::from_mode(0o600))?;

        fs::rename(&temp, &self.path)
    }

    fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()), // Already deleted
            Err(e) => Err(e),
        }
    }
}

/// Slot that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemorySlot {
    blob: RwLock<Option<Vec<u8>>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretSlot for MemorySlot {
    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        self.blob
            .read()
            .map(|blob| blob.clone())
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory slot poisoned"))
    }

    fn write(&self, blob: &[u8]) -> io::Result<()> {
        let mut slot = self
            .blob
            .write()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory slot poisoned"))?;
        *slot = Some(blob.to_vec());
        Ok(())
    }

    fn remove(&self) -> io::Result<()> {
        let mut slot = self
            .blob
            .write()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory slot poisoned"))?;
        *slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_slot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::in_dir(&dir.path().join("nested"));

        assert_eq!(slot.read().unwrap(), None);
        slot.write(b"first").unwrap();
        slot.write(b"second").unwrap();
        assert_eq!(slot.read().unwrap(), Some(b"second".to_vec()));

        slot.remove().unwrap();
        slot.remove().unwrap();
        assert_eq!(slot.read().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_slot_is_owner_only() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::in_dir(dir.path());
        slot.write(b"blob").unwrap();

        let mode = fs::metadata(slot.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_memory_slot_round_trip() {
        let slot = MemorySlot::new();
        slot.write(b"blob").unwrap();
        assert_eq!(slot.read().unwrap(), Some(b"blob".to_vec()));
        slot.remove().unwrap();
        assert_eq!(slot.read().unwrap(), None);
    }
}
