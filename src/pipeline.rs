//! The authorization → token exchange → sync sequence.
//!
//! Each stage runs only when the previous one succeeded.

use reqwest::Client;
use thiserror::Error;

use crate::{
    config::Endpoints,
    error::{AuthError, SyncError, TokenError},
    management::{FeedArchive, SyncEngine},
    spotify::{
        auth::{AuthorizeOptions, acquire_authorization_code},
        profile::fetch_profile,
        token::exchange_code_for_token,
    },
    storage::TrackStore,
    types::{Credentials, UserAuth, UserProfile},
    warning,
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unable to get authorization code: {0}")]
    Auth(#[from] AuthError),

    #[error("unable to get access token: {0}")]
    Token(#[from] TokenError),

    #[error("sync failed: {0}")]
    Sync(#[from] SyncError),
}

pub struct Pipeline {
    client: Client,
    endpoints: Endpoints,
    credentials: Credentials,
    archive: Option<FeedArchive>,
}

impl Pipeline {
    pub fn new(client: Client, endpoints: Endpoints, credentials: Credentials) -> Self {
        Self {
            client,
            endpoints,
            credentials,
            archive: None,
        }
    }

    /// Keep every fetched feed page in `archive`.
    pub fn with_archive(mut self, archive: FeedArchive) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Browser authorization followed by the code exchange.
    pub async fn authorize(&self, options: &AuthorizeOptions) -> Result<UserAuth, PipelineError> {
        let code = acquire_authorization_code(&self.credentials, &self.endpoints, options).await?;
        self.exchange(&code).await
    }

    pub async fn exchange(&self, code: &str) -> Result<UserAuth, PipelineError> {
        Ok(exchange_code_for_token(&self.client, &self.endpoints, &self.credentials, code).await?)
    }

    /// The signed-in user's profile, or `None` with a warning when it cannot
    /// be fetched. Never stops the run.
    pub async fn profile(&self, auth: &UserAuth) -> Option<UserProfile> {
        match fetch_profile(&self.client, &self.endpoints, &auth.access_token).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                warning!("Could not fetch profile: {}", e);
                None
            }
        }
    }

    pub async fn sync<S>(&self, auth: &UserAuth, store: &S) -> Result<usize, PipelineError>
    where
        S: TrackStore + ?Sized,
    {
        let engine = SyncEngine::new(self.client.clone(), self.endpoints.clone())
            .with_archive(self.archive.clone());
        Ok(engine.sync_recently_played(auth, store).await?)
    }

    /// Exchange `code`, look up the profile and sync. Neither the profile nor
    /// the history endpoint is contacted when the exchange fails.
    pub async fn run_with_code<S>(
        &self,
        code: &str,
        store: &S,
    ) -> Result<(UserAuth, usize), PipelineError>
    where
        S: TrackStore + ?Sized,
    {
        let auth = self.exchange(code).await?;
        self.profile(&auth).await;
        let inserted = self.sync(&auth, store).await?;
        Ok((auth, inserted))
    }
}
