//! Settings reconciliation and drivers for retail Wi-Fi access points.
//!
//! Lab test suites configure retail APs through their vendor web GUIs,
//! which are slow (seconds per page) and fragile (field order matters,
//! redirects happen, radios drop clients mid-apply). This crate owns the
//! logic that keeps those interactions minimal and safe:
//!
//! - **Settings model** ([`settings`]) -- a fixed-schema tree of desired
//!   AP state with a recursive diff-merge: unknown keys fail, unchanged
//!   values are skipped, and the merge reports whether anything changed
//!   and whether a radio on/off toggle was among the changes.
//!
//! - **[`CapabilityTable`]** -- immutable per-model enumeration of legal
//!   channels and bandwidth modes, consulted before values reach the GUI.
//!
//! - **[`RetailAp`]** -- the reconciler trait. Drivers supply
//!   `read_settings` / `apply_settings`; the provided methods
//!   (`set_channel`, `set_security`, `update_settings`, ...) merge
//!   partial updates and contact the AP only when the merge produced a
//!   real difference. After a push the device is authoritative:
//!   `validate_settings` re-reads and resynchronizes.
//!
//! - **Drivers** ([`drivers`]) -- concrete GUI drivers built on
//!   `aplab-gui`'s file-locked browser session, currently the Netgear
//!   tri-band family, plus the `(brand, model)`-keyed factory.

pub mod ap;
pub mod capability;
pub mod config;
pub mod drivers;
pub mod error;
pub mod settings;

// ── Primary re-exports ──────────────────────────────────────────────
pub use ap::{ApplyFlags, RetailAp};
pub use capability::{CapabilityTable, CapabilityTableBuilder};
pub use config::ApConfig;
pub use drivers::{NetgearTriBandAp, create, destroy};
pub use error::ApError;
pub use settings::{MergeOutcome, SettingNode, SettingValue, SettingsTree, SettingsUpdate};
