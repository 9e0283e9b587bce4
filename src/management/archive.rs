use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{config, utils};

/// Keeps every fetched feed page as `<dir>/<epoch_ms>.json`.
#[derive(Debug, Clone)]
pub struct FeedArchive {
    dir: PathBuf,
}

impl FeedArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FeedArchive { dir: dir.into() }
    }

    pub fn default_dir() -> PathBuf {
        config::data_dir().join("recently_played_data")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `raw` as pretty JSON named after `fetched_at` and returns the path.
    pub async fn write(&self, raw: &Value, fetched_at: DateTime<Utc>) -> Result<PathBuf, String> {
        async_fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| e.to_string())?;

        let path = self
            .dir
            .join(format!("{}.json", utils::to_epoch_millis(fetched_at)));
        let json = serde_json::to_string_pretty(raw).map_err(|e| e.to_string())?;
        async_fs::write(&path, json).await.map_err(|e| e.to_string())?;
        Ok(path)
    }
}

impl Default for FeedArchive {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn file_is_named_after_fetch_time() {
        let dir = std::env::temp_dir().join(format!("playlog-archive-{}", std::process::id()));
        let archive = FeedArchive::new(&dir);
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

        let path = archive.write(&json!({ "items": [] }), at).await.unwrap();

        assert_eq!(path, dir.join("1704110400000.json"));
        let back: Value =
            serde_json::from_str(&async_fs::read_to_string(&path).await.unwrap()).unwrap();
        assert_eq!(back, json!({ "items": [] }));
    }
}
