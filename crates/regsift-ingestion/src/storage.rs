//! Artifact storage for downloaded attachments.
//!
//! Artifacts are addressed by key `{document_id}_{sequence}.pdf`, so repeated
//! runs overwrite rather than collide. The trait keeps extraction logic
//! testable without touching the real filesystem.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use regsift_common::error::RegsiftError;

/// Deterministic storage key for one attachment (sequence starts at 1).
pub fn artifact_key(document_id: &str, sequence: usize) -> String {
    format!("{document_id}_{sequence}.pdf")
}

pub trait ArtifactStore: Send + Sync {
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), RegsiftError>;
    fn read(&self, key: &str) -> Result<Vec<u8>, RegsiftError>;
}

/// Filesystem-backed store rooted at the configured output directory.
pub struct FsArtifactStore {
    dir: PathBuf,
}

impl FsArtifactStore {
    /// Creates the directory if it does not exist yet.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, RegsiftError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl ArtifactStore for FsArtifactStore {
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), RegsiftError> {
        std::fs::write(self.path_for(key), bytes)?;
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Vec<u8>, RegsiftError> {
        Ok(std::fs::read(self.path_for(key))?)
    }
}

/// In-memory store used by tests.
#[derive(Default)]
pub struct MemoryArtifactStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .lock()
            .expect("store lock poisoned")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), RegsiftError> {
        self.entries
            .lock()
            .expect("store lock poisoned")
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Vec<u8>, RegsiftError> {
        self.entries
            .lock()
            .expect("store lock poisoned")
            .get(key)
            .cloned()
            .ok_or_else(|| {
                RegsiftError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no artifact stored under {key}"),
                ))
            })
    }
}
