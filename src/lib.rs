//! playlog library
//!
//! Keeps a local history of a Spotify user's recently played tracks. A run
//! authorizes through the OAuth2 authorization code flow (with a one-shot
//! loopback listener catching the browser redirect), exchanges the code for
//! tokens and inserts the feed entries that are not stored yet.
//!
//! # Modules
//!
//! - `api` - handler and verdict logic for the OAuth redirect
//! - `cli` - command-line command implementations
//! - `config` - credentials, environment and fixed endpoints
//! - `error` - error types for each stage
//! - `management` - token file persistence and the sync engine
//! - `pipeline` - the authorize → exchange → sync sequence
//! - `server` - the single-shot callback listener
//! - `spotify` - provider requests (authorize URL, token, history)
//! - `storage` - the `TrackStore` trait and its SQLite implementation
//! - `types` - records and wire types
//! - `utils` - state generation, timestamp and cursor helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod pipeline;
pub mod server;
pub mod spotify;
pub mod storage;
pub mod types;
pub mod utils;

/// Prints an informational line prefixed with a blue `o`.
///
/// Takes the same arguments as `println!`.
///
/// ```
/// info!("Open the following URL to authorize playlog:\n{}", url);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a line prefixed with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red `!` line to stderr and exits with status 1.
///
/// Every failed command ends here, so the exit status is the same for
/// configuration, authorization, token and storage failures. Only call it
/// from the `cli` layer; library code returns errors instead.
///
/// ```
/// error!("Cannot open database. Err: {}", e);
/// // not reached
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a yellow `!` line for problems the run recovers from, such as a
/// browser that will not open or a failed history fetch.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
