use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::{
    config::{self, Endpoints},
    error::SyncError,
    types::{PlayHistoryItem, RecentlyPlayedResponse, UserAuth},
    warning,
};

/// A feed page: the items that decoded, plus the document as received.
#[derive(Debug, Clone)]
pub struct HistoryPage {
    pub items: Vec<PlayHistoryItem>,
    pub raw: Value,
}

/// Fetches one page of the user's recently played tracks.
///
/// Only the first page is read; `next` and `cursors` are ignored. A non-200
/// status is reported as a warning and whatever items the body still decodes
/// to are returned (an error body decodes to no items). Items are decoded one
/// by one, see [`decode_items`].
///
/// # Errors
///
/// [`SyncError::FetchFailed`] when the request cannot be sent or the body is
/// not a recently-played document at all.
pub async fn fetch_recently_played(
    client: &Client,
    endpoints: &Endpoints,
    auth: &UserAuth,
    after_ms: i64,
) -> Result<HistoryPage, SyncError> {
    let res = client
        .get(endpoints.recently_played_url())
        .bearer_auth(&auth.access_token)
        .query(&[
            ("limit", config::HISTORY_PAGE_SIZE.to_string()),
            ("after", after_ms.to_string()),
        ])
        .send()
        .await
        .map_err(|e| SyncError::FetchFailed(e.to_string()))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| SyncError::FetchFailed(e.to_string()))?;

    let decoded = serde_json::from_str::<Value>(&body).and_then(|raw| {
        serde_json::from_value::<RecentlyPlayedResponse>(raw.clone()).map(|page| (raw, page))
    });

    let (raw, page) = if status != StatusCode::OK {
        warning!("Status code {} on recently played request.", status.as_u16());
        decoded.map_err(|_| SyncError::FetchFailed(format!("status {}", status.as_u16())))?
    } else {
        decoded.map_err(|e| SyncError::FetchFailed(format!("cannot decode response: {e}")))?
    };

    Ok(HistoryPage {
        items: decode_items(&page.items),
        raw,
    })
}

/// Decodes feed items individually, skipping the ones that do not fit
/// [`PlayHistoryItem`] with a warning.
pub fn decode_items(raw: &[Value]) -> Vec<PlayHistoryItem> {
    raw.iter()
        .enumerate()
        .filter_map(
            |(index, item)| match serde_json::from_value::<PlayHistoryItem>(item.clone()) {
                Ok(item) => Some(item),
                Err(e) => {
                    warning!("Skipping feed item {}: {}", index, e);
                    None
                }
            },
        )
        .collect()
}
