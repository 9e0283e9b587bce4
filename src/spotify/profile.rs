use reqwest::{Client, StatusCode};

use crate::{config::Endpoints, error::SyncError, types::UserProfile};

/// Fetches the signed-in user's profile from `GET /me`.
///
/// The profile is informational only; callers report a failure and carry on.
pub async fn fetch_profile(
    client: &Client,
    endpoints: &Endpoints,
    access_token: &str,
) -> Result<UserProfile, SyncError> {
    let res = client
        .get(endpoints.profile_url())
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| SyncError::FetchFailed(e.to_string()))?;

    let status = res.status();
    if status != StatusCode::OK {
        return Err(SyncError::FetchFailed(format!(
            "status {} on profile request",
            status.as_u16()
        )));
    }

    res.json::<UserProfile>()
        .await
        .map_err(|e| SyncError::FetchFailed(format!("cannot decode profile: {e}")))
}
