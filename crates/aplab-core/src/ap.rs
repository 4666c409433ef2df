// ── RetailAp trait: the settings reconciler ──
//
// Drivers implement the device-specific pieces (read a settings
// snapshot from the GUI, push the stored settings back out); the
// provided methods implement the shared reconciliation logic: merge a
// partial update into the desired-state tree and contact the AP only
// when something actually changed. GUI pushes take seconds and can drop
// client connections mid-apply.

use tracing::{error, warn};

use crate::capability::CapabilityTable;
use crate::error::ApError;
use crate::settings::{SettingValue, SettingsTree, SettingsUpdate};

/// Flags forwarded to a driver's apply pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyFlags {
    /// A radio on/off toggle was part of the merge. Some models need an
    /// extra advanced-page visit before other settings can be applied.
    pub status_toggled: bool,
}

/// A configurable retail access point.
///
/// Required methods are the device-specific surface; everything else is
/// provided on top of them. Stored settings are the caller's desired
/// state -- after every apply, [`RetailAp::validate_settings`] re-reads
/// the device and resynchronizes to what the AP actually reports, since
/// the device is the source of truth after a push.
#[allow(async_fn_in_trait)]
pub trait RetailAp {
    /// The capability table for this AP model.
    fn capabilities(&self) -> &CapabilityTable;

    /// Desired settings tree.
    fn settings(&self) -> &SettingsTree;

    fn settings_mut(&mut self) -> &mut SettingsTree;

    /// Scrape the AP's current configuration and resynchronize the
    /// stored settings to it. Returns the snapshot that was read.
    async fn read_settings(&mut self) -> Result<SettingsTree, ApError>;

    /// Push the stored settings to the AP in the model's GUI-safe order.
    async fn apply_settings(&mut self, flags: ApplyFlags) -> Result<(), ApError>;

    /// Device-specific reset, if any. Called during controller destroy.
    async fn reset(&mut self) -> Result<(), ApError> {
        Ok(())
    }

    /// Release long-lived resources (the AP reservation lock).
    async fn teardown(&mut self) -> Result<(), ApError> {
        Ok(())
    }

    /// Whether this model supports fixed-rate configuration.
    fn supports_rate_control(&self) -> bool {
        false
    }

    /// Configure a fixed PHY rate. Only meaningful when
    /// [`RetailAp::supports_rate_control`] returns true.
    async fn set_rate(
        &mut self,
        _interface: &str,
        _mode: &str,
        _num_streams: u8,
        _rate: &str,
    ) -> Result<(), ApError> {
        Err(ApError::NotSupported {
            operation: "set_rate".into(),
        })
    }

    // ── Reconciliation (provided) ────────────────────────────────────

    /// Merge a partial update into the stored settings and, if anything
    /// changed, push the result to the AP.
    ///
    /// Unknown keys and keys passed twice fail before the device is
    /// contacted; an update equal to the current state returns without
    /// any GUI interaction.
    async fn update_settings(&mut self, update: SettingsUpdate) -> Result<(), ApError> {
        let updates = update.into_tree()?;
        let outcome = self.settings_mut().merge_from(&updates)?;
        if outcome.changed {
            self.apply_settings(ApplyFlags {
                status_toggled: outcome.status_toggled,
            })
            .await?;
        }
        Ok(())
    }

    /// Set the AP region.
    ///
    /// Changing region can shrink the legal channel set, so a region
    /// change that differs from the current one warns about possible
    /// wireless-settings invalidation.
    async fn set_region(&mut self, region: &str) -> Result<(), ApError> {
        if self
            .settings()
            .value("region")
            .is_some_and(|current| current != &SettingValue::from(region))
        {
            warn!("updating region may overwrite wireless settings");
        }
        self.update_settings(SettingsUpdate::new().set("region", region))
            .await
    }

    /// Turn one interface's radio on or off.
    async fn set_radio_on_off(&mut self, interface: &str, enabled: bool) -> Result<(), ApError> {
        self.update_settings(SettingsUpdate::interface_value(
            interface,
            "status",
            i64::from(enabled),
        ))
        .await
    }

    /// Set one interface's SSID.
    async fn set_ssid(&mut self, interface: &str, ssid: &str) -> Result<(), ApError> {
        self.update_settings(SettingsUpdate::interface_value(interface, "ssid", ssid))
            .await
    }

    /// Set one interface's channel.
    ///
    /// Out-of-capability channels are logged, not rejected, and the
    /// update proceeds; drivers with stricter GUIs override this.
    async fn set_channel(
        &mut self,
        interface: &str,
        channel: impl Into<SettingValue> + Send,
    ) -> Result<(), ApError> {
        let channel = channel.into();
        if !self.capabilities().supports_channel(interface, &channel) {
            error!("channel {channel} is not supported on the {interface} interface");
        }
        self.update_settings(SettingsUpdate::interface_value(interface, "channel", channel))
            .await
    }

    /// Set one interface's bandwidth/mode string.
    ///
    /// Accepts "bw40"/"40" shorthand, normalized through the capability
    /// table's default mode. Unsupported modes log and proceed.
    async fn set_bandwidth(&mut self, interface: &str, bandwidth: &str) -> Result<(), ApError> {
        let bandwidth = self.capabilities().normalize_bandwidth(bandwidth);
        if !self.capabilities().supports_mode(interface, &bandwidth) {
            error!("{bandwidth} mode is not supported on the {interface} interface");
        }
        self.update_settings(SettingsUpdate::interface_value(
            interface, "bandwidth", bandwidth,
        ))
        .await
    }

    /// Set channel and bandwidth in a single apply pass.
    async fn set_channel_and_bandwidth(
        &mut self,
        interface: &str,
        channel: impl Into<SettingValue> + Send,
        bandwidth: &str,
    ) -> Result<(), ApError> {
        let channel = channel.into();
        let bandwidth = self.capabilities().normalize_bandwidth(bandwidth);
        if !self.capabilities().supports_mode(interface, &bandwidth) {
            error!("{bandwidth} mode is not supported on the {interface} interface");
        }
        if !self.capabilities().supports_channel(interface, &channel) {
            error!("channel {channel} is not supported on the {interface} interface");
        }
        let mut section = SettingsTree::new();
        section.insert_value("bandwidth", bandwidth);
        section.insert_value("channel", channel);
        self.update_settings(SettingsUpdate::new().set_section(interface, section))
            .await
    }

    /// Set one interface's transmit power.
    async fn set_power(&mut self, interface: &str, power: &str) -> Result<(), ApError> {
        let has_power_setting = self
            .settings()
            .section(interface)
            .is_some_and(|s| s.contains_key("power"));
        if !has_power_setting {
            error!("cannot configure power on the {interface} interface");
        }
        self.update_settings(SettingsUpdate::interface_value(interface, "power", power))
            .await
    }

    /// Set one interface's security mode, and password where the mode
    /// takes one.
    async fn set_security(
        &mut self,
        interface: &str,
        security_type: &str,
        password: Option<&str>,
    ) -> Result<(), ApError> {
        let mut section = SettingsTree::new();
        section.insert_value("security_type", security_type);
        if let Some(password) = password {
            section.insert_value("password", password);
        }
        self.update_settings(SettingsUpdate::new().set_section(interface, section))
            .await
    }

    /// Re-read the AP and compare against the stored settings.
    ///
    /// Called after configuration to confirm the push took. Mismatches
    /// are logged, not raised, and the stored settings end up
    /// resynchronized to the device (via [`RetailAp::read_settings`]).
    /// Returns whether the device matched.
    async fn validate_settings(&mut self) -> Result<bool, ApError> {
        let assumed = self.settings().clone();
        let actual = self.read_settings().await?;
        if assumed != actual {
            warn!("discrepancy in AP settings, some settings may have been overwritten");
            return Ok(false);
        }
        Ok(true)
    }
}
