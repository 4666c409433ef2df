//! CLI error types with miette diagnostics.
//!
//! Maps `ApError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use aplab_config::ConfigError;
use aplab_core::ApError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CREDENTIALS: i32 = 3;
    pub const UNSUPPORTED: i32 = 4;
    pub const GUI_MISMATCH: i32 = 5;
    pub const LOCK_TIMEOUT: i32 = 6;
    pub const DRIFT: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Locking ──────────────────────────────────────────────────────
    #[error("Timed out after {seconds}s waiting to reserve the AP")]
    #[diagnostic(
        code(aplab::lock_timeout),
        help(
            "Another session holds the reservation or browser lock.\n\
             Check for stale lock files under the system temp directory,\n\
             or raise lock_timeout in your profile."
        )
    )]
    LockTimeout { seconds: u64 },

    // ── GUI ──────────────────────────────────────────────────────────
    #[error("GUI element '{element}' was not found on the page")]
    #[diagnostic(
        code(aplab::gui_mismatch),
        help(
            "The AP firmware may have changed its page layout.\n\
             Check the firmware version with: aplab info"
        )
    )]
    GuiMismatch { element: String },

    #[error("Browser session failed: {message}")]
    #[diagnostic(
        code(aplab::gui),
        help("Check that chromedriver is installed and the AP is reachable.")
    )]
    Gui { message: String },

    // ── Values ───────────────────────────────────────────────────────
    #[error("Value '{value}' is not supported on interface '{interface}'")]
    #[diagnostic(
        code(aplab::unsupported_value),
        help("Run: aplab info to see the channels and modes this model supports")
    )]
    UnsupportedValue { value: String, interface: String },

    #[error("Unknown interface '{interface}'")]
    #[diagnostic(
        code(aplab::unknown_interface),
        help("Run: aplab info to see this model's interface names")
    )]
    UnknownInterface { interface: String },

    #[error("Invalid settings key: '{key}'")]
    #[diagnostic(
        code(aplab::invalid_key),
        help("Run: aplab read to see the keys this model exposes")
    )]
    InvalidKey { key: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(aplab::validation))]
    Validation { field: String, reason: String },

    // ── Capability ───────────────────────────────────────────────────
    #[error("Operation '{operation}' is not supported by this AP")]
    #[diagnostic(code(aplab::not_supported))]
    NotSupported { operation: String },

    #[error("No driver for {brand} {model}")]
    #[diagnostic(
        code(aplab::unsupported_model),
        help("Supported models: Netgear RAXE500")
    )]
    UnsupportedModel { brand: String, model: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(aplab::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Add one to the config file at the path printed by: aplab config path"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No admin password configured for profile '{profile}'")]
    #[diagnostic(
        code(aplab::no_credentials),
        help(
            "Store one with: aplab config set-password --profile {profile}\n\
             Or set admin_password_env in the profile."
        )
    )]
    NoCredentials { profile: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(aplab::config))]
    Config { message: String },

    // ── Validation outcome ───────────────────────────────────────────
    #[error("AP drifted from the desired settings")]
    #[diagnostic(
        code(aplab::drift),
        help(
            "Stored settings were resynchronized to the device.\n\
             Rerun your setters to push the desired state again."
        )
    )]
    Drift,

    // ── Confirmation ─────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(aplab::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    RequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(aplab::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::LockTimeout { .. } => exit_code::LOCK_TIMEOUT,
            Self::Drift => exit_code::DRIFT,
            Self::NoCredentials { .. } => exit_code::CREDENTIALS,
            Self::GuiMismatch { .. } => exit_code::GUI_MISMATCH,
            Self::NotSupported { .. } | Self::UnsupportedModel { .. } => exit_code::UNSUPPORTED,
            Self::Validation { .. }
            | Self::UnsupportedValue { .. }
            | Self::UnknownInterface { .. }
            | Self::InvalidKey { .. }
            | Self::RequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ApError → CliError mapping ───────────────────────────────────────

impl From<ApError> for CliError {
    fn from(err: ApError) -> Self {
        match err {
            ApError::LockTimeout { timeout_secs } => CliError::LockTimeout {
                seconds: timeout_secs,
            },

            ApError::GuiMismatch { element } => CliError::GuiMismatch { element },

            ApError::Gui { message } => CliError::Gui { message },

            ApError::InvalidSettingsKey { key } => CliError::InvalidKey { key },

            ApError::DuplicateSettingsKeys { keys } => CliError::Validation {
                field: "settings".into(),
                reason: format!("duplicate keys: {keys:?}"),
            },

            ApError::UnsupportedValue { value, interface } => {
                CliError::UnsupportedValue { value, interface }
            }

            ApError::UnknownInterface { interface } => CliError::UnknownInterface { interface },

            ApError::NotSupported { operation } => CliError::NotSupported { operation },

            ApError::UnsupportedModel { brand, model } => {
                CliError::UnsupportedModel { brand, model }
            }

            ApError::Config { message } => CliError::Config { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },

            ConfigError::NoSuchProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                available: String::new(),
            },

            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },

            ConfigError::Io(err) => CliError::Io(err),

            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
