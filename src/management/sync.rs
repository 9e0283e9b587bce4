use std::time::Duration;

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;

use super::FeedArchive;
use crate::{
    config::Endpoints,
    error::SyncError,
    spotify::history,
    storage::TrackStore,
    types::{PlayHistoryItem, PlayedTrackRecord, UserAuth},
    utils, warning,
};

/// Maps one feed item to a storage row.
pub fn map_item(item: &PlayHistoryItem) -> Result<PlayedTrackRecord, chrono::ParseError> {
    let played_at = utils::parse_played_at(&item.played_at)?;

    Ok(PlayedTrackRecord {
        timestamp: utils::to_epoch_millis(played_at),
        track_id: item.track.id.clone(),
        name: item.track.name.clone(),
        artist: utils::join_artists(&item.track.artists),
        album: item.track.album.name.clone(),
        played_at,
        popularity: item.track.popularity,
        explicit: item.track.explicit,
    })
}

/// Maps feed items, skipping any whose `played_at` cannot be parsed.
pub fn map_items(items: &[PlayHistoryItem]) -> Vec<PlayedTrackRecord> {
    items
        .iter()
        .filter_map(|item| match map_item(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warning!(
                    "Skipping '{}': unreadable played_at '{}' ({})",
                    item.track.name,
                    item.played_at,
                    e
                );
                None
            }
        })
        .collect()
}

/// Inserts the records whose timestamp is not stored yet.
///
/// Nothing is written when every record is already present. The read of
/// existing timestamps and the insert are not one transaction.
pub async fn store_new_records<S>(
    store: &S,
    mut records: Vec<PlayedTrackRecord>,
) -> Result<usize, SyncError>
where
    S: TrackStore + ?Sized,
{
    let existing = store.stored_timestamps().await?;
    utils::retain_new_records(&mut records, &existing);

    if records.is_empty() {
        return Ok(0);
    }

    Ok(store.insert_all(&records).await?)
}

/// Pulls the recently played feed into a [`TrackStore`].
pub struct SyncEngine {
    client: Client,
    endpoints: Endpoints,
    archive: Option<FeedArchive>,
}

impl SyncEngine {
    pub fn new(client: Client, endpoints: Endpoints) -> Self {
        Self {
            client,
            endpoints,
            archive: None,
        }
    }

    /// Also keep each fetched page in `archive`.
    pub fn with_archive(mut self, archive: Option<FeedArchive>) -> Self {
        self.archive = archive;
        self
    }

    /// Fetches the feed and inserts the entries not stored yet.
    ///
    /// A failed fetch is not fatal: it is reported as a warning and the
    /// sync continues with no items. Neither is a failed archive write.
    /// Returns the number of inserted rows.
    pub async fn sync_recently_played<S>(
        &self,
        auth: &UserAuth,
        store: &S,
    ) -> Result<usize, SyncError>
    where
        S: TrackStore + ?Sized,
    {
        self.sync_after(auth, store, utils::history_after_cursor_now())
            .await
    }

    /// Same as [`Self::sync_recently_played`] with an explicit `after` cursor.
    pub async fn sync_after<S>(
        &self,
        auth: &UserAuth,
        store: &S,
        after_ms: i64,
    ) -> Result<usize, SyncError>
    where
        S: TrackStore + ?Sized,
    {
        let pb = ProgressBar::new_spinner();
        pb.set_message("Fetching recently played tracks...");
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }

        let fetched =
            history::fetch_recently_played(&self.client, &self.endpoints, auth, after_ms).await;
        pb.finish_and_clear();

        let items = match fetched {
            Ok(page) => {
                if let Some(archive) = &self.archive {
                    if let Err(e) = archive.write(&page.raw, Utc::now()).await {
                        warning!("Failed to archive recently played data: {}", e);
                    }
                }
                page.items
            }
            Err(SyncError::FetchFailed(reason)) => {
                warning!("Could not fetch recently played tracks: {}", reason);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        store_new_records(store, map_items(&items)).await
    }
}
