//! # API Module
//!
//! HTTP handlers for the loopback callback listener.
//!
//! The provider redirects the browser to `http://127.0.0.1:9090/` with
//! `state`, `code` and `error` query parameters. [`callback`] judges each
//! request with [`evaluate`] and reports the first terminal verdict through
//! a one-shot channel owned by [`CallbackState`]:
//!
//! | request                         | status | outcome                  |
//! |---------------------------------|--------|--------------------------|
//! | `state` missing or empty        | 400    | keep waiting (bounded)   |
//! | `state` differs                 | 400    | `StateMismatch`          |
//! | `state` matches, no `code`      | 401    | `ProviderDenied(error)`  |
//! | `state` matches, `code` present | 200    | the code                 |
//!
//! When a key repeats, its first value counts. Requests to any other path
//! get axum's default 404 and never touch the state machine.

mod callback;

pub use callback::{
    CallbackOutcome, CallbackPages, CallbackState, DEFAULT_MAX_MALFORMED, Verdict, callback,
    evaluate, first_values,
};
