use std::path::{Path, PathBuf};

use crate::{config, types::UserAuth};

/// Writes the token pair to disk as a side artifact of a run.
///
/// The file is never read back by the pipeline; each run authorizes anew.
pub struct TokenManager {
    auth: UserAuth,
}

impl TokenManager {
    pub fn new(auth: UserAuth) -> Self {
        TokenManager { auth }
    }

    pub async fn persist(&self) -> Result<PathBuf, String> {
        let path = Self::token_path();
        self.persist_to(&path).await?;
        Ok(path)
    }

    pub async fn persist_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.auth).map_err(|e| e.to_string())?;
        async_fs::write(path, json).await.map_err(|e| e.to_string())
    }

    pub fn token_path() -> PathBuf {
        config::data_dir().join("cache/token.json")
    }

    pub fn current(&self) -> &UserAuth {
        &self.auth
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[tokio::test]
    async fn persisted_file_has_token_fields() {
        let auth = UserAuth {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            expires_in: 3600,
            expires_at: Utc.with_ymd_and_hms(2024, 1, 1, 13, 0, 0).unwrap(),
        };
        let path = std::env::temp_dir()
            .join(format!("playlog-token-{}", std::process::id()))
            .join("token.json");

        TokenManager::new(auth.clone()).persist_to(&path).await.unwrap();

        let content = async_fs::read_to_string(&path).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["access_token"], "access");
        assert_eq!(value["refresh_token"], "refresh");
        assert_eq!(value["expires_in"], 3600);
        assert!(value["expires_at"].is_string());

        let back: UserAuth = serde_json::from_str(&content).unwrap();
        assert_eq!(back, auth);
    }
}
