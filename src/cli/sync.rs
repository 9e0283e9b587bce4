use reqwest::Client;

use crate::{
    config::Endpoints, error, info, management::FeedArchive, pipeline::Pipeline,
    storage::SqliteStore, success,
};

use super::{RunOptions, auth::authorize, load_credentials};

pub async fn sync(opts: &RunOptions) {
    let credentials = load_credentials(opts.credentials.as_ref()).await;

    // open the database first so a bad URL fails before the browser dance
    let store = match SqliteStore::connect(&credentials.database_url).await {
        Ok(store) => store,
        Err(e) => error!("Cannot open database. Err: {}", e),
    };

    let mut pipeline = Pipeline::new(Client::new(), Endpoints::default(), credentials);
    if !opts.no_archive {
        pipeline = pipeline.with_archive(FeedArchive::default());
    }
    let auth = authorize(&pipeline, opts).await;

    if let Some(profile) = pipeline.profile(&auth).await {
        info!(
            "Signed in as {}",
            profile.display_name.as_deref().unwrap_or(&profile.id)
        );
    }

    match pipeline.sync(&auth, &store).await {
        Ok(0) => info!("No new tracks since the last sync."),
        Ok(inserted) => success!("Stored {} new track(s).", inserted),
        Err(e) => error!("{}", e),
    }
}
