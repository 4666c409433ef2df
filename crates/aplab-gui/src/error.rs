// ── GUI transport error types ──
//
// Errors from the browser-session layer. Lock contention is kept
// distinguishable from launch/navigation failures -- callers retry a
// `LockTimeout` at a higher level, while an `ElementMissing` after a
// successful navigation signals a GUI/firmware mismatch and is fatal.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the GUI transport crate.
#[derive(Debug, Error)]
pub enum GuiError {
    // ── Locking ──────────────────────────────────────────────────────
    #[error("Could not acquire lock {path} within {timeout_secs}s")]
    LockTimeout { path: PathBuf, timeout_secs: u64 },

    #[error("Lock file error at {path}: {source}")]
    LockFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Session lifecycle ────────────────────────────────────────────
    #[error("Failed to launch browser session: {reason}")]
    SessionLaunch { reason: String },

    #[error("WebDriver process error: {0}")]
    Driver(#[from] std::io::Error),

    #[error("Browser session is no longer running; restart it before reuse")]
    SessionGone,

    // ── Navigation ───────────────────────────────────────────────────
    #[error("URL unreachable after {tries} tries: {url}")]
    Unreachable { url: String, tries: usize },

    #[error("Page reached but required element '{element}' not found")]
    ElementMissing { element: String },

    // ── Page interaction ─────────────────────────────────────────────
    #[error("Element '{element}' has unsupported type '{kind}'")]
    UnsupportedElement { element: String, kind: String },

    #[error("Element '{element}' is not a submit button")]
    NotAButton { element: String },

    #[error("Cannot set element '{element}': {reason}")]
    BadInput { element: String, reason: String },

    // ── WebDriver protocol ───────────────────────────────────────────
    #[error("WebDriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),
}

impl From<fantoccini::error::NewSessionError> for GuiError {
    fn from(err: fantoccini::error::NewSessionError) -> Self {
        GuiError::SessionLaunch {
            reason: err.to_string(),
        }
    }
}
