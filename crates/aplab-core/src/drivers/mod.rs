// ── AP driver registry ──
//
// One driver family per supported GUI generation. The factory keys on
// (brand, model) exactly like the lab config files do, so an
// unsupported combination fails before any lock or browser work.

pub mod netgear_tri_band;

pub use netgear_tri_band::{ModelProfile, NetgearTriBandAp};

use crate::ap::RetailAp;
use crate::config::ApConfig;
use crate::error::ApError;

/// Construct a driver for the AP described by `config`.
///
/// Connecting reserves the AP (if `lock_ap` is set), scrapes firmware
/// and current settings, and pushes the config's initial settings.
pub async fn create(config: ApConfig) -> Result<NetgearTriBandAp, ApError> {
    match (config.brand.as_str(), config.model.as_str()) {
        ("Netgear", "RAXE500") => NetgearTriBandAp::connect(config).await,
        _ => Err(ApError::UnsupportedModel {
            brand: config.brand,
            model: config.model,
        }),
    }
}

/// Tear down a driver, releasing its AP reservation.
pub async fn destroy(ap: &mut impl RetailAp) -> Result<(), ApError> {
    ap.teardown().await
}
