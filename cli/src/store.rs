//! File-based session storage for the CLI
//!
//! Each `condo` invocation is one execution context; the session issued by
//! `condo login` is kept here so the next invocation can re-derive it.
//!
//! # File Location
//!
//! - Windows: `~/.condo/session.toml`
//! - Linux/macOS: `~/.config/condo/session.toml`
//!
//! # Security
//!
//! - File permissions set to 0600 (owner read/write only) on Unix
//! - Only the issued token pair is stored, never the password
//!
//! # File Format
//!
//! ```toml
//! [instances.default]
//! access_token = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9..."
//! refresh_token = "v1.Mr5..."
//! expires_at = 1767225599
//! user_id = "6f1c..."
//! email = "sindico@vila.com"
//! ```

use condo_link::{CondoLinkError, Identity, Result, Session, SessionStore};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File-based session store
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    file_path: PathBuf,

    /// In-memory cache of the file contents
    cache: HashMap<String, StoredSession>,

    /// The file on disk could not be parsed; the next write replaces it
    corrupted: bool,
}

/// On-disk shape of one session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct StoredSession {
    access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    /// Unix seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<i64>,
    user_id: String,
    #[serde(default)]
    email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default)]
    instances: HashMap<String, StoredSession>,
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            expires_at: session.expires_at,
            user_id: session.user.id.clone(),
            email: session.user.email.clone(),
        }
    }
}

impl StoredSession {
    fn to_session(&self) -> Session {
        Session {
            access_token: self.access_token.clone(),
            token_type: "bearer".to_string(),
            expires_in: None,
            expires_at: self.expires_at,
            refresh_token: self.refresh_token.clone(),
            user: Identity::new(self.user_id.clone(), self.email.clone()),
        }
    }
}

impl FileSessionStore {
    /// Default session file path
    /// - Windows: `~/.condo/session.toml`
    /// - Linux/macOS: `~/.config/condo/session.toml`
    pub fn default_path() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".condo").join("session.toml")
            } else {
                PathBuf::from(".condo").join("session.toml")
            }
        }

        #[cfg(not(target_os = "windows"))]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("condo").join("session.toml")
            } else if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("condo").join("session.toml")
            } else {
                PathBuf::from(".condo").join("session.toml")
            }
        }
    }

    /// Open the store at the default location
    pub fn new() -> Result<Self> {
        Self::with_path(Self::default_path())
    }

    /// Open the store at a custom location
    pub fn with_path(file_path: PathBuf) -> Result<Self> {
        let mut store = Self {
            file_path,
            cache: HashMap::new(),
            corrupted: false,
        };
        store.load_from_disk()?;
        Ok(store)
    }

    fn load_from_disk(&mut self) -> Result<()> {
        if !self.file_path.exists() {
            self.cache.clear();
            return Ok(());
        }

        let contents = fs::read_to_string(&self.file_path).map_err(|e| {
            CondoLinkError::StorageError(format!(
                "Cannot read session file '{}': {}",
                self.file_path.display(),
                e
            ))
        })?;

        match toml::from_str::<SessionFile>(&contents) {
            Ok(file) => {
                self.cache = file.instances;
                self.corrupted = false;
            },
            Err(e) => {
                let error_msg = e.to_string();
                let simple_error = error_msg
                    .lines()
                    .find(|line| line.contains("missing field"))
                    .unwrap_or("invalid TOML format")
                    .trim()
                    .to_string();
                warn!(
                    "[STORE] Ignoring corrupted session file '{}': {}. Run `condo login` again.",
                    self.file_path.display(),
                    simple_error
                );
                self.cache.clear();
                self.corrupted = true;
            },
        }
        Ok(())
    }

    fn save_to_disk(&self) -> Result<()> {
        let file = SessionFile {
            instances: self.cache.clone(),
        };

        let contents = toml::to_string_pretty(&file).map_err(|e| {
            CondoLinkError::StorageError(format!("Failed to serialize session: {}", e))
        })?;

        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CondoLinkError::StorageError(format!(
                    "Failed to create session directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let write_error = |e: std::io::Error| {
            CondoLinkError::StorageError(format!(
                "Failed to write session file at '{}': {}",
                self.file_path.display(),
                e
            ))
        };

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        // 0600 from creation: owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.file_path).map_err(write_error)?;

        // A file that already existed keeps its old mode on open
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| {
                    CondoLinkError::StorageError(format!(
                        "Failed to set file permissions for '{}': {}",
                        self.file_path.display(),
                        e
                    ))
                })?;
        }

        file.write_all(contents.as_bytes()).map_err(write_error)?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, instance: &str) -> Result<Option<Session>> {
        Ok(self.cache.get(instance).map(StoredSession::to_session))
    }

    fn save(&mut self, instance: &str, session: &Session) -> Result<()> {
        self.cache.insert(instance.to_string(), StoredSession::from(session));
        self.save_to_disk()?;
        self.corrupted = false;
        Ok(())
    }

    fn clear(&mut self, instance: &str) -> Result<()> {
        let removed = self.cache.remove(instance).is_some();
        if removed || self.corrupted {
            self.save_to_disk()?;
            self.corrupted = false;
        }
        Ok(())
    }
}
