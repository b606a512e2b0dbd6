/// Startup configuration
///
/// Everything here is fixed for the lifetime of the process. The defaults
/// are the built-in constants; an optional JSON file in the working
/// directory can override them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::state::DEFAULT_DB_PATH;

/// Optional override file, relative to the working directory
pub const CONFIG_FILE: &str = "disease_portal.json";

/// Login cookie lifetime of the original portal
pub const DEFAULT_SESSION_TTL_DAYS: u32 = 30;

/// One entry of the user registry as written in the config
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEntry {
    pub username: String,
    pub password: String,
    /// Display name shown after login
    pub name: String,
}

impl UserEntry {
    pub fn new(username: &str, password: &str, name: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Debug for UserEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserEntry")
            .field("username", &self.username)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite catalog file
    pub db_path: PathBuf,
    pub session_ttl_days: u32,
    pub users: Vec<UserEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            session_ttl_days: DEFAULT_SESSION_TTL_DAYS,
            users: vec![
                UserEntry::new("user1", "password123", "John Doe"),
                UserEntry::new("user2", "password456", "Jane Smith"),
            ],
        }
    }
}

impl AppConfig {
    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load `path` if it exists, otherwise fall back to the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        info!(path = %path.display(), users = config.users.len(), "config loaded");
        Ok(config)
    }
}
