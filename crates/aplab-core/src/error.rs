// ── Core error types ──
//
// User-facing errors from aplab-core. Consumers never see raw WebDriver
// failures -- the `From<GuiError>` impl translates transport-layer
// errors into domain-appropriate variants, keeping lock timeouts and
// GUI/firmware mismatches distinguishable from generic failures.

use thiserror::Error;

use aplab_gui::GuiError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum ApError {
    // ── Settings errors ──────────────────────────────────────────────
    #[error("'{key}' is an invalid settings key")]
    InvalidSettingsKey { key: String },

    #[error("The following keys were passed twice: {keys:?}")]
    DuplicateSettingsKeys { keys: Vec<String> },

    #[error("{value} is not supported on the {interface} interface")]
    UnsupportedValue { value: String, interface: String },

    #[error("Unknown interface: {interface}")]
    UnknownInterface { interface: String },

    // ── Capability errors ────────────────────────────────────────────
    #[error("Operation not supported by this AP: {operation}")]
    NotSupported { operation: String },

    #[error("Invalid retail AP brand and model combination: {brand} {model}")]
    UnsupportedModel { brand: String, model: String },

    // ── Resource contention ──────────────────────────────────────────
    #[error("Could not lock AP within {timeout_secs}s")]
    LockTimeout { timeout_secs: u64 },

    // ── GUI automation ───────────────────────────────────────────────
    #[error("Page reached but required element '{element}' not found")]
    GuiMismatch { element: String },

    #[error("GUI automation failed: {message}")]
    Gui { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<GuiError> for ApError {
    fn from(err: GuiError) -> Self {
        match err {
            GuiError::LockTimeout { timeout_secs, .. } => ApError::LockTimeout { timeout_secs },
            GuiError::ElementMissing { element } => ApError::GuiMismatch { element },
            other => ApError::Gui {
                message: other.to_string(),
            },
        }
    }
}
