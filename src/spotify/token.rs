use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{Client, StatusCode, header::AUTHORIZATION};

use crate::{
    config::{self, Endpoints},
    error::TokenError,
    types::{Credentials, TokenResponse, UserAuth},
};

/// `Basic` authorization header value for the client credentials.
pub fn basic_auth_header(credentials: &Credentials) -> String {
    let pair = format!("{}:{}", credentials.client_id, credentials.client_secret);
    format!("Basic {}", STANDARD.encode(pair))
}

/// Exchanges an authorization code for an access/refresh token pair.
///
/// Performs a single form-encoded POST against the token endpoint,
/// authenticated with the client credentials. There is no retry.
///
/// # Errors
///
/// - [`TokenError::ExchangeRejected`] for any status other than 200
/// - [`TokenError::MalformedResponse`] when `access_token`, `expires_in` or
///   `refresh_token` is missing from the body
/// - [`TokenError::Transport`] for network failures
pub async fn exchange_code_for_token(
    client: &Client,
    endpoints: &Endpoints,
    credentials: &Credentials,
    code: &str,
) -> Result<UserAuth, TokenError> {
    let res = client
        .post(&endpoints.token_url)
        .header(AUTHORIZATION, basic_auth_header(credentials))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", config::REDIRECT_URI),
        ])
        .send()
        .await?;

    let status = res.status();
    if status != StatusCode::OK {
        return Err(TokenError::ExchangeRejected(status.as_u16()));
    }

    let body = res.text().await?;
    decode_token_response(&body, Utc::now())
}

/// Decodes a token response body, computing `expires_at` from `now`.
pub fn decode_token_response(body: &str, now: DateTime<Utc>) -> Result<UserAuth, TokenError> {
    let token: TokenResponse =
        serde_json::from_str(body).map_err(|e| TokenError::MalformedResponse(e.to_string()))?;

    let expires_at = i64::try_from(token.expires_in)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| {
            TokenError::MalformedResponse(format!("expires_in out of range: {}", token.expires_in))
        })?;

    Ok(UserAuth {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_in: token.expires_in,
        expires_at,
    })
}
