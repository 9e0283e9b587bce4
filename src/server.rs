use std::{net::SocketAddr, sync::Arc};

use axum::{Router, routing::get};
use tokio::{net::TcpListener, sync::oneshot};

use crate::{
    api::{self, CallbackPages, CallbackState, DEFAULT_MAX_MALFORMED},
    config,
    error::CallbackError,
};

/// A single-shot HTTP listener for the OAuth redirect.
///
/// Binding happens in [`CallbackListener::bind`], before any browser is
/// opened, so the redirect can never arrive ahead of the listener. The
/// server is torn down as soon as one request settles the outcome.
pub struct CallbackListener {
    listener: TcpListener,
    expected_state: String,
    pages: CallbackPages,
    max_malformed: u32,
}

impl CallbackListener {
    pub async fn bind(addr: &str, expected_state: &str) -> Result<Self, CallbackError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            expected_state: expected_state.to_string(),
            pages: CallbackPages::default(),
            max_malformed: DEFAULT_MAX_MALFORMED,
        })
    }

    pub fn with_pages(mut self, pages: CallbackPages) -> Self {
        self.pages = pages;
        self
    }

    /// Number of stateless requests after which the listener gives up with
    /// [`CallbackError::MalformedRequest`].
    pub fn with_max_malformed(mut self, max_malformed: u32) -> Self {
        self.max_malformed = max_malformed;
        self
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves redirects until one of them settles the outcome, then stops.
    pub async fn await_one_redirect(self) -> Result<String, CallbackError> {
        let Self {
            listener,
            expected_state,
            pages,
            max_malformed,
        } = self;

        let (outcome_tx, outcome_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let state = Arc::new(CallbackState::new(
            expected_state,
            pages,
            max_malformed,
            outcome_tx,
        ));
        let app = Router::new()
            .route(config::REDIRECT_PATH, get(api::callback))
            .with_state(state);

        // Dropping `shutdown_tx` (including when this future is cancelled)
        // also stops the server.
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        let outcome = outcome_rx.await.unwrap_or(Err(CallbackError::Closed));

        let _ = shutdown_tx.send(());
        let _ = server.await;

        outcome
    }
}

/// Binds `bind_address` and waits for one redirect carrying `expected_state`.
pub async fn await_one_redirect(
    bind_address: &str,
    expected_state: &str,
) -> Result<String, CallbackError> {
    CallbackListener::bind(bind_address, expected_state)
        .await?
        .await_one_redirect()
        .await
}
