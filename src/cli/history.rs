use std::path::PathBuf;

use tabled::Table;

use crate::{error, info, storage::SqliteStore, types::HistoryTableRow};

use super::load_credentials;

pub async fn history(credentials: Option<PathBuf>, limit: u32) {
    let credentials = load_credentials(credentials.as_ref()).await;

    let store = match SqliteStore::connect(&credentials.database_url).await {
        Ok(store) => store,
        Err(e) => error!("Cannot open database. Err: {}", e),
    };

    let rows = match store.recent(limit).await {
        Ok(rows) => rows,
        Err(e) => error!("Cannot read play history. Err: {}", e),
    };

    if rows.is_empty() {
        info!("No plays stored yet. Run playlog sync.");
        return;
    }

    let table_rows: Vec<HistoryTableRow> = rows
        .into_iter()
        .map(|r| HistoryTableRow {
            played_at: r.played_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            name: r.name,
            artist: r.artist,
            album: r.album,
        })
        .collect();

    println!("{}", Table::new(table_rows));
}
