//! File-locked browser automation for retail AP web GUIs.
//!
//! Lab hosts share two scarce resources: the physical AP itself and the
//! single WebDriver binary used to drive its configuration pages. This
//! crate owns both mutual-exclusion mechanisms and the page-interaction
//! primitives built on top of them:
//!
//! - **[`FileLock`]** -- advisory flock with bounded, backoff-polled
//!   acquisition. Used for the long-lived AP reservation
//!   (`/tmp/{brand}_{model}_{ip}.lock`) and the per-session browser lock.
//! - **[`BrowserSession`]** -- an exclusive WebDriver session that holds
//!   the session lock for its whole lifetime. Supports in-place
//!   [`restart()`](BrowserSession::restart) after a wedged browser
//!   without losing the lock, and redirect-aware
//!   [`visit_persistent()`](BrowserSession::visit_persistent) navigation.
//! - Element helpers keyed by HTML `name`: typed reads/writes over text
//!   inputs, checkboxes, radio groups, and dropdowns.
//!
//! Higher layers (`aplab-core` drivers) never touch fantoccini directly;
//! everything goes through this crate's session type.

pub mod error;
pub mod lock;
pub mod session;

pub use error::GuiError;
pub use lock::{FileLock, reservation_lock_path, session_lock_path};
pub use session::{
    BROWSER_WAIT_EXTRA_LONG, BROWSER_WAIT_LONG, BROWSER_WAIT_MED, BROWSER_WAIT_SHORT,
    BrowserConfig, BrowserSession, GuiValue, SelectMethod,
};
