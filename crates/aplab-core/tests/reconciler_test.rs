#![allow(clippy::unwrap_used)]
// Reconciler behavior tests against an in-memory fake AP.
//
// The fake counts apply passes instead of driving a browser, which is
// exactly what the reconciliation contract is about: no-op updates must
// never reach the device, real changes must reach it exactly once.

use aplab_core::{
    ApError, ApplyFlags, CapabilityTable, RetailAp, SettingValue, SettingsTree, SettingsUpdate,
};

// ── Fake AP ─────────────────────────────────────────────────────────

struct FakeAp {
    capabilities: CapabilityTable,
    settings: SettingsTree,
    /// What the "device" currently reports; read_settings returns this.
    device_settings: SettingsTree,
    apply_calls: usize,
    last_flags: Option<ApplyFlags>,
}

impl FakeAp {
    fn new() -> Self {
        let capabilities = CapabilityTable::builder("HE")
            .interface(
                "2G",
                vec![1i64.into(), 6i64.into(), 11i64.into()],
                vec!["HE20", "HE40"],
            )
            .build();

        let mut band = SettingsTree::new();
        band.insert_value("status", 1i64);
        band.insert_value("channel", 1i64);
        band.insert_value("bandwidth", "HE20");
        band.insert_value("ssid", "lab-ap");
        band.insert_value("security_type", "WPA2-PSK");
        band.insert_value("password", "password123");

        let mut settings = SettingsTree::new();
        settings.insert_value("region", "North America");
        settings.insert_section("2G", band);

        Self {
            capabilities,
            device_settings: settings.clone(),
            settings,
            apply_calls: 0,
            last_flags: None,
        }
    }
}

impl RetailAp for FakeAp {
    fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    fn settings(&self) -> &SettingsTree {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut SettingsTree {
        &mut self.settings
    }

    async fn read_settings(&mut self) -> Result<SettingsTree, ApError> {
        // The device is authoritative: reading resynchronizes.
        self.settings = self.device_settings.clone();
        Ok(self.device_settings.clone())
    }

    async fn apply_settings(&mut self, flags: ApplyFlags) -> Result<(), ApError> {
        self.apply_calls += 1;
        self.last_flags = Some(flags);
        self.device_settings = self.settings.clone();
        Ok(())
    }
}

fn channel_of(ap: &FakeAp) -> &SettingValue {
    ap.settings().section_value("2G", "channel").unwrap()
}

// ── No-op and minimal-diff behavior ─────────────────────────────────

#[tokio::test]
async fn noop_update_never_contacts_the_ap() {
    let mut ap = FakeAp::new();
    let current = ap.settings().clone();

    ap.update_settings(SettingsUpdate::from_tree(current))
        .await
        .unwrap();

    assert_eq!(ap.apply_calls, 0);
}

#[tokio::test]
async fn single_leaf_update_applies_once() {
    let mut ap = FakeAp::new();

    ap.update_settings(SettingsUpdate::interface_value("2G", "channel", 6i64))
        .await
        .unwrap();

    assert_eq!(ap.apply_calls, 1);
    assert_eq!(channel_of(&ap), &SettingValue::Int(6));
}

#[tokio::test]
async fn repeated_identical_update_applies_only_once() {
    let mut ap = FakeAp::new();

    ap.update_settings(SettingsUpdate::interface_value("2G", "channel", 6i64))
        .await
        .unwrap();
    ap.update_settings(SettingsUpdate::interface_value("2G", "channel", 6i64))
        .await
        .unwrap();

    assert_eq!(ap.apply_calls, 1);
}

// ── Key validation ──────────────────────────────────────────────────

#[tokio::test]
async fn unknown_key_fails_without_contacting_the_ap() {
    let mut ap = FakeAp::new();
    let mut update = SettingsTree::new();
    update.insert_value("nonexistent_key", 1i64);

    let err = ap
        .update_settings(SettingsUpdate::from_tree(update))
        .await
        .unwrap_err();

    assert!(matches!(err, ApError::InvalidSettingsKey { .. }));
    assert_eq!(ap.apply_calls, 0);
}

#[tokio::test]
async fn duplicate_key_fails_regardless_of_value_equality() {
    let mut ap = FakeAp::new();
    let mut dict = SettingsTree::new();
    dict.insert_value("region", "Europe");

    let err = ap
        .update_settings(SettingsUpdate::from_tree(dict).set("region", "Japan"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApError::DuplicateSettingsKeys { .. }));
    assert_eq!(ap.apply_calls, 0);
    // Desired state untouched by the failed update.
    assert_eq!(
        ap.settings().value("region"),
        Some(&SettingValue::Str("North America".into()))
    );
}

// ── Status toggle propagation ───────────────────────────────────────

#[tokio::test]
async fn radio_toggle_sets_status_flag_on_apply() {
    let mut ap = FakeAp::new();

    ap.set_radio_on_off("2G", false).await.unwrap();

    assert_eq!(ap.apply_calls, 1);
    assert!(ap.last_flags.unwrap().status_toggled);
}

#[tokio::test]
async fn non_status_change_leaves_status_flag_clear() {
    let mut ap = FakeAp::new();

    ap.set_ssid("2G", "other-ap").await.unwrap();

    assert_eq!(ap.apply_calls, 1);
    assert!(!ap.last_flags.unwrap().status_toggled);
}

// ── Convenience setters end-to-end ──────────────────────────────────

#[tokio::test]
async fn channel_then_bandwidth_applies_twice_and_converges() {
    let mut ap = FakeAp::new();

    ap.set_channel("2G", 6i64).await.unwrap();
    ap.set_bandwidth("2G", "HE40").await.unwrap();

    assert_eq!(ap.apply_calls, 2);
    assert_eq!(channel_of(&ap), &SettingValue::Int(6));
    assert_eq!(
        ap.settings().section_value("2G", "bandwidth"),
        Some(&SettingValue::Str("HE40".into()))
    );
}

#[tokio::test]
async fn combined_channel_and_bandwidth_applies_once() {
    let mut ap = FakeAp::new();

    ap.set_channel_and_bandwidth("2G", 11i64, "HE40").await.unwrap();

    assert_eq!(ap.apply_calls, 1);
    assert_eq!(channel_of(&ap), &SettingValue::Int(11));
}

#[tokio::test]
async fn out_of_capability_channel_is_advisory_in_base_reconciler() {
    let mut ap = FakeAp::new();

    // Channel 99 is not in [1, 6, 11]; the base reconciler logs the
    // violation but still applies, matching the documented looseness.
    ap.set_channel("2G", 99i64).await.unwrap();

    assert_eq!(ap.apply_calls, 1);
    assert_eq!(channel_of(&ap), &SettingValue::Int(99));
}

#[tokio::test]
async fn bandwidth_shorthand_is_normalized() {
    let mut ap = FakeAp::new();

    ap.set_bandwidth("2G", "bw40").await.unwrap();

    assert_eq!(
        ap.settings().section_value("2G", "bandwidth"),
        Some(&SettingValue::Str("HE40".into()))
    );
}

#[tokio::test]
async fn set_security_with_password_updates_both_fields() {
    let mut ap = FakeAp::new();

    ap.set_security("2G", "WPA3-PSK", Some("newpass"))
        .await
        .unwrap();

    assert_eq!(ap.apply_calls, 1);
    assert_eq!(
        ap.settings().section_value("2G", "security_type"),
        Some(&SettingValue::Str("WPA3-PSK".into()))
    );
    assert_eq!(
        ap.settings().section_value("2G", "password"),
        Some(&SettingValue::Str("newpass".into()))
    );
}

#[tokio::test]
async fn set_power_on_interface_without_power_key_fails() {
    let mut ap = FakeAp::new();

    let err = ap.set_power("2G", "25%").await.unwrap_err();

    assert!(matches!(err, ApError::InvalidSettingsKey { .. }));
    assert_eq!(ap.apply_calls, 0);
}

// ── Rate control capability flag ────────────────────────────────────

#[tokio::test]
async fn rate_control_unsupported_by_default() {
    let mut ap = FakeAp::new();
    assert!(!ap.supports_rate_control());

    let err = ap.set_rate("2G", "VHT", 2, "MCS7").await.unwrap_err();
    assert!(matches!(err, ApError::NotSupported { .. }));
}

// ── Validation and resynchronization ────────────────────────────────

#[tokio::test]
async fn validate_settings_detects_and_absorbs_device_drift() {
    let mut ap = FakeAp::new();

    // Device drifts behind our back (e.g. region change clamped the
    // channel).
    ap.device_settings
        .section_mut("2G")
        .unwrap()
        .insert_value("channel", 11i64);

    let matched = ap.validate_settings().await.unwrap();
    assert!(!matched);
    // Stored settings resynchronized to the device.
    assert_eq!(channel_of(&ap), &SettingValue::Int(11));

    // A second validation now passes.
    assert!(ap.validate_settings().await.unwrap());
}

#[tokio::test]
async fn validate_settings_passes_after_apply() {
    let mut ap = FakeAp::new();

    ap.set_channel("2G", 6i64).await.unwrap();

    assert!(ap.validate_settings().await.unwrap());
}
