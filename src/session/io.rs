//! Persistence of the bearer token.
//!
//! The token is the only client-side state that outlives a process. It is
//! written to a small JSON envelope carrying a format version and a SHA-256
//! checksum; an envelope that fails either check is treated as absent and
//! removed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Fixed storage key for the token.
pub const TOKEN_KEY: &str = "token";

/// Current version of the token file format.
pub const TOKEN_FILE_VERSION: u32 = 1;

/// Errors raised by a [`TokenStore`].
#[derive(Debug, Error)]
pub enum TokenStoreError {
    /// Reading, writing or removing the token file failed.
    #[error("failed to access token file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The envelope could not be serialized.
    #[error("failed to encode token file: {0}")]
    Encode(#[from] serde_json::Error),
    /// No platform data directory is available.
    #[error("could not determine a data directory for the token file")]
    NoDataDir,
}

/// Persistent storage for a single bearer token.
pub trait TokenStore: Send + Sync {
    /// Read the persisted token, if any.
    fn load(&self) -> Result<Option<String>, TokenStoreError>;
    /// Replace the persisted token.
    fn save(&self, token: &str) -> Result<(), TokenStoreError>;
    /// Remove the persisted token. Removing an absent token succeeds.
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// On-disk envelope for the token.
#[derive(Debug, Serialize, Deserialize)]
struct TokenEnvelope {
    version: u32,
    key: String,
    saved_at: DateTime<Utc>,
    checksum: String,
    token: String,
}

fn checksum(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(TOKEN_KEY.as_bytes());
    hasher.update(b":");
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Token store backed by a file in the platform data directory.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store the token at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default platform-specific token path.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::NoDataDir`] when no home directory can be
    /// determined.
    pub fn default_path() -> Result<PathBuf, TokenStoreError> {
        let dirs = ProjectDirs::from("com", "coachdash", "coachdash").ok_or(TokenStoreError::NoDataDir)?;
        Ok(dirs.data_dir().join(TOKEN_KEY))
    }

    /// Location of the token file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> TokenStoreError {
        TokenStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Parse and verify an envelope, returning the token when it is intact.
    fn verify(content: &str) -> Result<String, String> {
        let envelope: TokenEnvelope =
            serde_json::from_str(content).map_err(|e| format!("unreadable envelope: {e}"))?;
        if envelope.version != TOKEN_FILE_VERSION {
            return Err(format!(
                "unsupported version {} (expected {TOKEN_FILE_VERSION})",
                envelope.version
            ));
        }
        if envelope.key != TOKEN_KEY {
            return Err(format!("unexpected key {:?}", envelope.key));
        }
        if envelope.token.is_empty() {
            return Err("empty token".to_string());
        }
        if checksum(&envelope.token) != envelope.checksum {
            return Err("checksum mismatch".to_string());
        }
        Ok(envelope.token)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        match Self::verify(&content) {
            Ok(token) => Ok(Some(token)),
            Err(reason) => {
                log::warn!(
                    "Discarding token file {}: {reason}",
                    self.path.display()
                );
                self.clear()?;
                Ok(None)
            }
        }
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let envelope = TokenEnvelope {
            version: TOKEN_FILE_VERSION,
            key: TOKEN_KEY.to_string(),
            saved_at: Utc::now(),
            checksum: checksum(token),
            token: token.to_string(),
        };
        let json = serde_json::to_string_pretty(&envelope)?;

        // Write next to the target and rename so a crash never leaves half a token.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600)).map_err(|e| self.io_error(e))?;
        }
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        log::debug!("Token saved to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                log::debug!("Token removed from {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// In-memory token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }

    /// Current content, without going through the trait.
    #[must_use]
    pub fn peek(&self) -> Option<String> {
        self.slot.lock().clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        *self.slot.lock() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.slot.lock() = None;
        Ok(())
    }
}
