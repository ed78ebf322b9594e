//! Minimal runtime configuration helpers.
//! Everything comes from the environment (optionally seeded from a `.env` file
//! by the binary); the session token falls back to a token file.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, io};

use crate::client::DEFAULT_SERVER;
use crate::session::Credentials;
use crate::transport::TransportConfig;

pub const DEFAULT_TOKEN_FILE: &str = "token.txt";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub username: Option<String>,
    pub password: Option<String>,
    pub server: String,
    /// Device to act on when none is given on the command line.
    pub device: Option<String>,
    /// Session token from a previous run, if any.
    pub token: Option<String>,
    /// Where refreshed tokens are written after a re-login.
    pub token_file: PathBuf,
    /// Whole-request deadline; `None` when set to 0.
    pub timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let token_file = non_empty("COMFORT_CLOUD_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE));

        // Prefer env var; fallback to the token file
        let token = match non_empty("COMFORT_CLOUD_TOKEN") {
            Some(t) => Some(t),
            None => read_token_file(&token_file).map_err(|e| format!("failed to read {}: {}", token_file.display(), e))?,
        };

        let timeout_secs = match non_empty("COMFORT_CLOUD_TIMEOUT_SECS") {
            Some(s) => s
                .parse::<u64>()
                .map_err(|_| "COMFORT_CLOUD_TIMEOUT_SECS must be a whole number of seconds".to_string())?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Config {
            username: non_empty("COMFORT_CLOUD_USERNAME"),
            password: lookup("COMFORT_CLOUD_PASSWORD").filter(|v| !v.is_empty()),
            server: non_empty("COMFORT_CLOUD_SERVER").unwrap_or_else(|| DEFAULT_SERVER.to_string()),
            device: non_empty("COMFORT_CLOUD_DEVICE"),
            token,
            token_file,
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        })
    }

    pub fn credentials(&self) -> Option<Credentials> {
        Credentials::from_parts(self.username.as_deref(), self.password.as_deref())
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig { timeout: self.timeout }
    }

    /// Write a refreshed token so the next run can skip the login.
    pub fn persist_token(&self, token: &str) -> io::Result<()> {
        fs::write(&self.token_file, format!("{}\n", token))
    }
}

fn read_token_file(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(s) if !s.trim().is_empty() => Ok(Some(s.trim().to_string())),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
