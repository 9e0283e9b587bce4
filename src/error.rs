//! Error types for every stage of the pipeline.
//!
//! Each stage owns its own enum so the CLI can tell a security failure in
//! the callback apart from a rejected token exchange or a storage conflict.

use thiserror::Error;

/// Failures while loading credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration value: {0}")]
    Missing(&'static str),

    #[error("cannot read credentials file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid credentials file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Outcomes of the loopback callback that did not yield a code.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// The redirect carried no usable `state` parameter.
    #[error("redirect request without a state parameter")]
    MalformedRequest,

    /// The `state` parameter did not match the one we issued.
    #[error("state parameter mismatch, possible forged redirect")]
    StateMismatch,

    /// State matched but the provider sent no code.
    #[error("authorization denied by provider: {0}")]
    ProviderDenied(String),

    #[error("cannot bind callback listener: {0}")]
    Bind(#[from] std::io::Error),

    /// The listener stopped without reaching a verdict.
    #[error("callback listener closed before a redirect arrived")]
    Closed,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Callback(#[from] CallbackError),

    #[error("timed out waiting for the authorization redirect")]
    Timeout,

    #[error("cannot build authorization URL: {0}")]
    AuthorizeUrl(String),
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token endpoint rejected the exchange with status {0}")]
    ExchangeRejected(u16),

    #[error("malformed token response: {0}")]
    MalformedResponse(String),

    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// A row with the same primary key already exists.
    #[error("duplicate primary key: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum SyncError {
    /// History retrieval failed. Recovered by the sync engine.
    #[error("fetching recently played failed: {0}")]
    FetchFailed(String),

    /// The batch hit an existing primary key; nothing was written.
    #[error("insert conflict, batch rolled back: {0}")]
    InsertConflict(String),

    #[error(transparent)]
    Storage(StoreError),
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => SyncError::InsertConflict(msg),
            other => SyncError::Storage(other),
        }
    }
}
