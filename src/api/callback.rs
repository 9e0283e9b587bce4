use std::{collections::HashMap, io, path::Path, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use tokio::sync::{Mutex, oneshot};

use crate::{error::CallbackError, warning};

/// Result delivered to the waiting caller once the listener is done.
pub type CallbackOutcome = Result<String, CallbackError>;

/// Default number of stateless requests tolerated before giving up.
pub const DEFAULT_MAX_MALFORMED: u32 = 3;

/// How a single redirect request is judged against the expected state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// No usable `state`. Does not consume the listener on its own.
    Malformed,
    Mismatch,
    Denied(String),
    Accepted(String),
}

impl Verdict {
    pub fn status(&self) -> StatusCode {
        match self {
            Verdict::Malformed | Verdict::Mismatch => StatusCode::BAD_REQUEST,
            Verdict::Denied(_) => StatusCode::UNAUTHORIZED,
            Verdict::Accepted(_) => StatusCode::OK,
        }
    }
}

/// Judges a redirect's query parameters. `state` is compared byte for byte.
pub fn evaluate(params: &HashMap<String, String>, expected_state: &str) -> Verdict {
    let state = match params.get("state") {
        Some(s) if !s.is_empty() => s,
        _ => return Verdict::Malformed,
    };

    if state.as_bytes() != expected_state.as_bytes() {
        return Verdict::Mismatch;
    }

    match params.get("code") {
        Some(code) if !code.is_empty() => Verdict::Accepted(code.clone()),
        _ => Verdict::Denied(
            params
                .get("error")
                .filter(|e| !e.is_empty())
                .cloned()
                .unwrap_or_else(|| "no code returned".to_string()),
        ),
    }
}

/// Collapses query pairs into a map, keeping the first value of a
/// repeated key.
pub fn first_values(pairs: Vec<(String, String)>) -> HashMap<String, String> {
    let mut params = HashMap::with_capacity(pairs.len());
    for (key, value) in pairs {
        params.entry(key).or_insert(value);
    }
    params
}

/// HTML bodies served for the terminal outcomes.
#[derive(Debug, Clone)]
pub struct CallbackPages {
    pub success: String,
    pub error: String,
}

impl Default for CallbackPages {
    fn default() -> Self {
        Self {
            success: include_str!("../../templates/index.html").to_string(),
            error: include_str!("../../templates/error.html").to_string(),
        }
    }
}

impl CallbackPages {
    /// Reads `index.html` and `error.html` from `dir`.
    pub async fn load(dir: &Path) -> io::Result<Self> {
        Ok(Self {
            success: async_fs::read_to_string(dir.join("index.html")).await?,
            error: async_fs::read_to_string(dir.join("error.html")).await?,
        })
    }
}

enum Phase {
    Waiting {
        malformed: u32,
        outcome_tx: oneshot::Sender<CallbackOutcome>,
    },
    Done,
}

/// Shared state behind the redirect route.
pub struct CallbackState {
    expected_state: String,
    pages: CallbackPages,
    max_malformed: u32,
    phase: Mutex<Phase>,
}

impl CallbackState {
    pub fn new(
        expected_state: String,
        pages: CallbackPages,
        max_malformed: u32,
        outcome_tx: oneshot::Sender<CallbackOutcome>,
    ) -> Self {
        Self {
            expected_state,
            pages,
            max_malformed: max_malformed.max(1),
            phase: Mutex::new(Phase::Waiting {
                malformed: 0,
                outcome_tx,
            }),
        }
    }

    /// Advances the state machine. Returns false when a previous request
    /// already settled the outcome.
    async fn advance(&self, verdict: &Verdict) -> bool {
        let mut phase = self.phase.lock().await;

        let outcome = match (&mut *phase, verdict) {
            (Phase::Done, _) => return false,
            (Phase::Waiting { malformed, .. }, Verdict::Malformed) => {
                *malformed += 1;
                if *malformed < self.max_malformed {
                    return true;
                }
                Err(CallbackError::MalformedRequest)
            }
            (Phase::Waiting { .. }, Verdict::Mismatch) => Err(CallbackError::StateMismatch),
            (Phase::Waiting { .. }, Verdict::Denied(reason)) => {
                Err(CallbackError::ProviderDenied(reason.clone()))
            }
            (Phase::Waiting { .. }, Verdict::Accepted(code)) => Ok(code.clone()),
        };

        if let Phase::Waiting { outcome_tx, .. } = std::mem::replace(&mut *phase, Phase::Done) {
            let _ = outcome_tx.send(outcome);
        }
        true
    }
}

pub async fn callback(
    Query(pairs): Query<Vec<(String, String)>>,
    State(state): State<Arc<CallbackState>>,
) -> (StatusCode, Html<String>) {
    let verdict = evaluate(&first_values(pairs), &state.expected_state);

    match &verdict {
        Verdict::Malformed => warning!("Ignoring redirect request without a state parameter."),
        Verdict::Mismatch => warning!("Redirect state does not match, rejecting."),
        Verdict::Denied(reason) => warning!("Authorization code request error: {}", reason),
        Verdict::Accepted(_) => {}
    }

    if !state.advance(&verdict).await {
        return (StatusCode::BAD_REQUEST, Html(state.pages.error.clone()));
    }

    let body = match verdict {
        Verdict::Accepted(_) => state.pages.success.clone(),
        _ => state.pages.error.clone(),
    };
    (verdict.status(), Html(body))
}
