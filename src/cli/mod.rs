//! # CLI Module
//!
//! Command implementations for playlog. Each command resolves credentials,
//! drives the relevant stages of [`crate::pipeline::Pipeline`] and turns
//! failures into a console message plus a non-zero exit status.
//!
//! - [`sync`] - authorize, exchange the code, pull the recently played feed
//!   into the database
//! - [`auth`] - authorize and exchange only, writing the token file
//! - [`history`] - list the newest stored plays
//!
//! ```bash
//! playlog sync                       # full run
//! playlog sync --no-browser          # print the URL instead of opening it
//! playlog history --limit 50         # what is in the database
//! ```

mod auth;
mod history;
mod sync;

use std::{path::PathBuf, time::Duration};

use crate::{
    api::CallbackPages, config, error, spotify::auth::AuthorizeOptions, types::Credentials,
};

pub use auth::auth;
pub use history::history;
pub use sync::sync;

/// Options shared by commands that run the authorization flow.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub credentials: Option<PathBuf>,
    pub templates: Option<PathBuf>,
    pub token_file: Option<PathBuf>,
    /// Seconds to wait for the redirect; 0 waits forever.
    pub timeout_secs: u64,
    pub no_browser: bool,
    /// Skip writing the raw feed page to the archive directory.
    pub no_archive: bool,
}

impl RunOptions {
    async fn authorize_options(&self) -> AuthorizeOptions {
        let pages = match &self.templates {
            Some(dir) => match CallbackPages::load(dir).await {
                Ok(pages) => pages,
                Err(e) => error!("Cannot load templates from {}: {}", dir.display(), e),
            },
            None => CallbackPages::default(),
        };

        AuthorizeOptions {
            pages,
            timeout: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
            open_browser: !self.no_browser,
            ..AuthorizeOptions::default()
        }
    }
}

async fn load_credentials(file: Option<&PathBuf>) -> Credentials {
    match config::load_credentials(file.map(|p| p.as_path())).await {
        Ok(creds) => creds,
        Err(e) => error!("Cannot load credentials. Err: {}", e),
    }
}
