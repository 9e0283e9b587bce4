use reqwest::Client;

use crate::{
    config::Endpoints,
    error,
    management::TokenManager,
    pipeline::Pipeline,
    success,
    types::UserAuth,
    warning,
};

use super::{RunOptions, load_credentials};

pub async fn auth(opts: &RunOptions) {
    let credentials = load_credentials(opts.credentials.as_ref()).await;
    let pipeline = Pipeline::new(Client::new(), Endpoints::default(), credentials);

    authorize(&pipeline, opts).await;
    success!("Authentication successful!");
}

/// Authorizes, exchanges the code and writes the token file. Exits the
/// process when either stage fails.
pub(super) async fn authorize(pipeline: &Pipeline, opts: &RunOptions) -> UserAuth {
    let options = opts.authorize_options().await;
    let auth = match pipeline.authorize(&options).await {
        Ok(auth) => auth,
        Err(e) => error!("{}", e),
    };

    let manager = TokenManager::new(auth);
    let persisted = match &opts.token_file {
        Some(path) => manager.persist_to(path).await.map(|_| path.clone()),
        None => manager.persist().await,
    };
    if let Err(e) = persisted {
        warning!("Failed to save token file: {}", e);
    }

    manager.current().clone()
}
