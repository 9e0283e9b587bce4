//! # Spotify Integration Module
//!
//! The provider-facing half of playlog:
//!
//! - [`auth`] - authorization code flow: state generation, authorization
//!   URL, browser launch and the wait on the loopback listener
//! - [`token`] - server-to-server code exchange with client credentials
//! - [`history`] - the recently-played feed (one page)
//! - [`profile`] - the signed-in user's profile, best effort
//!
//! ```text
//! acquire_authorization_code ──► exchange_code_for_token ──► fetch_recently_played
//!        (browser + :9090)             (POST /api/token)        (GET /me/player/recently-played)
//! ```
//!
//! All requests are issued sequentially through a shared [`reqwest::Client`].
//! Endpoint URLs come from [`crate::config::Endpoints`].

pub mod auth;
pub mod history;
pub mod profile;
pub mod token;
