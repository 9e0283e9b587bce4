use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Url;

use crate::{
    api::{CallbackPages, DEFAULT_MAX_MALFORMED},
    config::{self, Endpoints},
    error::AuthError,
    info,
    server::CallbackListener,
    types::Credentials,
    utils, warning,
};

/// Knobs for one authorization attempt.
#[derive(Debug, Clone)]
pub struct AuthorizeOptions {
    pub bind_address: String,
    pub pages: CallbackPages,
    /// `None` waits for the redirect indefinitely.
    pub timeout: Option<Duration>,
    pub open_browser: bool,
    pub max_malformed: u32,
}

impl Default for AuthorizeOptions {
    fn default() -> Self {
        Self {
            bind_address: config::BIND_ADDRESS.to_string(),
            pages: CallbackPages::default(),
            timeout: Some(Duration::from_secs(300)),
            open_browser: true,
            max_malformed: DEFAULT_MAX_MALFORMED,
        }
    }
}

/// Builds the provider authorization URL for `state`.
pub fn authorize_url(
    endpoints: &Endpoints,
    client_id: &str,
    state: &str,
) -> Result<Url, AuthError> {
    Url::parse_with_params(
        &endpoints.authorize_url,
        &[
            ("client_id", client_id),
            ("response_type", "code"),
            ("redirect_uri", config::REDIRECT_URI),
            ("state", state),
            ("scope", config::AUTH_SCOPE),
        ],
    )
    .map_err(|e| AuthError::AuthorizeUrl(e.to_string()))
}

/// Runs the browser half of the authorization code flow and returns the code.
///
/// A fresh anti-forgery state is generated for every call. The callback
/// listener is bound before the browser is pointed at the provider, and a
/// browser that fails to open only produces a warning with the URL to
/// visit by hand.
///
/// # Errors
///
/// - [`AuthError::Callback`] when the redirect is rejected or the listener
///   cannot bind
/// - [`AuthError::Timeout`] when `options.timeout` elapses first
pub async fn acquire_authorization_code(
    credentials: &Credentials,
    endpoints: &Endpoints,
    options: &AuthorizeOptions,
) -> Result<String, AuthError> {
    let state = utils::generate_state();
    let auth_url = authorize_url(endpoints, &credentials.client_id, &state)?;

    let listener = CallbackListener::bind(&options.bind_address, &state)
        .await?
        .with_pages(options.pages.clone())
        .with_max_malformed(options.max_malformed);

    if !options.open_browser {
        info!("Open the following URL to authorize playlog:\n{}", auth_url);
    } else if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        );
    }

    let pb = ProgressBar::new_spinner();
    pb.set_message("Waiting for authorization...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let wait = listener.await_one_redirect();
    let result = match options.timeout {
        Some(limit) => match tokio::time::timeout(limit, wait).await {
            Ok(outcome) => outcome.map_err(AuthError::from),
            Err(_) => Err(AuthError::Timeout),
        },
        None => wait.await.map_err(AuthError::from),
    };

    pb.finish_and_clear();
    result
}
