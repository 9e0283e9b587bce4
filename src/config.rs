//! Configuration management for playlog.
//!
//! Credentials come from one of two places:
//! 1. A JSON credentials file passed with `--credentials` (highest priority)
//! 2. Environment variables, optionally sourced from a `.env` file in the
//!    local data directory
//!
//! Everything else the pipeline needs (loopback address, redirect URI,
//! scopes, provider endpoints) is fixed at compile time.

use std::{
    env,
    path::{Path, PathBuf},
};

use crate::{error::ConfigError, types::Credentials};

/// Address the callback listener binds to.
pub const BIND_ADDRESS: &str = "0.0.0.0:9090";

/// Redirect URI registered with the provider. Must point at [`BIND_ADDRESS`].
pub const REDIRECT_URI: &str = "http://127.0.0.1:9090/";

/// Path the redirect lands on.
pub const REDIRECT_PATH: &str = "/";

pub const AUTH_SCOPE: &str = "user-read-email user-read-recently-played";

/// Largest page the recently-played endpoint accepts.
pub const HISTORY_PAGE_SIZE: u32 = 50;

/// How far back the `after` cursor reaches, counted from the start of today.
pub const HISTORY_WINDOW_DAYS: i64 = 30;

pub const ENV_CLIENT_ID: &str = "PLAYLOG_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "PLAYLOG_CLIENT_SECRET";
pub const ENV_DATABASE_URL: &str = "PLAYLOG_DATABASE_URL";

/// Provider endpoints. Defaults to the public Spotify hosts.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub authorize_url: String,
    pub token_url: String,
    pub api_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            authorize_url: "https://accounts.spotify.com/authorize".to_string(),
            token_url: "https://accounts.spotify.com/api/token".to_string(),
            api_url: "https://api.spotify.com/v1".to_string(),
        }
    }
}

impl Endpoints {
    /// Endpoints that all live under one base URL, used to point the client
    /// at a local stand-in.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            authorize_url: format!("{base}/authorize"),
            token_url: format!("{base}/api/token"),
            api_url: format!("{base}/v1"),
        }
    }

    pub fn recently_played_url(&self) -> String {
        format!("{}/me/player/recently-played", self.api_url)
    }

    pub fn profile_url(&self) -> String {
        format!("{}/me", self.api_url)
    }
}

/// Returns the application's directory inside the local data directory.
///
/// - Linux: `~/.local/share/playlog`
/// - macOS: `~/Library/Application Support/playlog`
/// - Windows: `%LOCALAPPDATA%/playlog`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("playlog");
    path
}

/// Loads environment variables from `<data_dir>/.env`.
///
/// Creates the data directory if needed. A missing `.env` file is fine,
/// the variables may already be set in the process environment.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Resolves credentials from `file` when given, otherwise from the environment.
pub async fn load_credentials(file: Option<&Path>) -> Result<Credentials, ConfigError> {
    match file {
        Some(path) => credentials_from_file(path).await,
        None => credentials_from_env(),
    }
}

pub fn credentials_from_env() -> Result<Credentials, ConfigError> {
    Ok(Credentials {
        client_id: required_var(ENV_CLIENT_ID)?,
        client_secret: required_var(ENV_CLIENT_SECRET)?,
        database_url: required_var(ENV_DATABASE_URL)?,
    })
}

/// Reads a `{client_id, client_secret, database_url}` JSON document.
pub async fn credentials_from_file(path: &Path) -> Result<Credentials, ConfigError> {
    let content = async_fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}
