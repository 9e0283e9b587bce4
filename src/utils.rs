use std::collections::HashSet;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use rand::Rng;

use crate::{
    config,
    types::{PlayedTrackRecord, TrackArtist},
};

/// Number of random bytes behind each anti-forgery state.
const STATE_ENTROPY_BYTES: usize = 16;

/// Generates a URL-safe anti-forgery token for one authorization attempt.
pub fn generate_state() -> String {
    let mut bytes = [0u8; STATE_ENTROPY_BYTES];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Parses the provider's ISO-8601 `played_at` value.
///
/// A trailing `Z` or `z` is read as a `+00:00` offset.
pub fn parse_played_at(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let normalized = match value.strip_suffix(['Z', 'z']) {
        Some(stripped) => format!("{stripped}+00:00"),
        None => value.to_string(),
    };

    DateTime::parse_from_rfc3339(&normalized).map(|dt| dt.with_timezone(&Utc))
}

pub fn to_epoch_millis(date: DateTime<Utc>) -> i64 {
    date.timestamp_millis()
}

pub fn join_artists(artists: &[TrackArtist]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The `after` cursor for the history request: midnight of `today` in `tz`,
/// minus the history window, as epoch milliseconds.
pub fn history_after_cursor<Tz: TimeZone>(today: NaiveDate, tz: &Tz) -> i64 {
    let start = (today - Duration::days(config::HISTORY_WINDOW_DAYS)).and_time(NaiveTime::MIN);

    match tz.from_local_datetime(&start).earliest() {
        Some(local) => local.timestamp_millis(),
        // midnight skipped by a DST jump
        None => start.and_utc().timestamp_millis(),
    }
}

pub fn history_after_cursor_now() -> i64 {
    history_after_cursor(Local::now().date_naive(), &Local)
}

/// Keeps records whose timestamp is neither in `existing` nor already
/// taken by an earlier record in the batch.
pub fn retain_new_records(records: &mut Vec<PlayedTrackRecord>, existing: &HashSet<i64>) {
    let mut seen = HashSet::new();
    records.retain(|r| !existing.contains(&r.timestamp) && seen.insert(r.timestamp));
}
