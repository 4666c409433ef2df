// ── AP capability table ──
//
// Per-interface enumeration of legal channels and bandwidth modes for
// one AP model. Immutable after construction; settings are validated
// against it before they reach the GUI.

use std::collections::BTreeMap;

use crate::settings::SettingValue;

/// Legal channels, modes, and the default mode token for one AP model.
///
/// Channel tokens are [`SettingValue`]s because some bands use plain
/// integers (1, 6, 11) while others use tagged strings ("6g37").
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityTable {
    interfaces: Vec<String>,
    channels: BTreeMap<String, Vec<SettingValue>>,
    modes: BTreeMap<String, Vec<String>>,
    default_mode: String,
}

impl CapabilityTable {
    pub fn builder(default_mode: impl Into<String>) -> CapabilityTableBuilder {
        CapabilityTableBuilder {
            interfaces: Vec::new(),
            channels: BTreeMap::new(),
            modes: BTreeMap::new(),
            default_mode: default_mode.into(),
        }
    }

    /// Interface names in declaration order (e.g. "2G", "5G_1", "6G").
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn has_interface(&self, interface: &str) -> bool {
        self.interfaces.iter().any(|i| i == interface)
    }

    /// The mode family prepended to bare bandwidth tokens ("HE", "VHT").
    pub fn default_mode(&self) -> &str {
        &self.default_mode
    }

    pub fn channels(&self, interface: &str) -> &[SettingValue] {
        self.channels.get(interface).map_or(&[], Vec::as_slice)
    }

    pub fn modes(&self, interface: &str) -> &[String] {
        self.modes.get(interface).map_or(&[], Vec::as_slice)
    }

    pub fn supports_channel(&self, interface: &str, channel: &SettingValue) -> bool {
        self.channels(interface).contains(channel)
    }

    pub fn supports_mode(&self, interface: &str, mode: &str) -> bool {
        self.modes(interface).iter().any(|m| m == mode)
    }

    /// Reverse lookup: which band owns this channel on this AP.
    pub fn band_for_channel(&self, channel: &SettingValue) -> Option<&str> {
        self.interfaces
            .iter()
            .find(|iface| self.supports_channel(iface, channel))
            .map(String::as_str)
    }

    /// Normalize bandwidth shorthand into a full mode string.
    ///
    /// "bw40" becomes "{default_mode}40" and a bare width like "40"
    /// becomes "{default_mode}40"; full mode strings pass through.
    pub fn normalize_bandwidth(&self, bandwidth: &str) -> String {
        if bandwidth.contains("bw") {
            bandwidth.replace("bw", &self.default_mode)
        } else if bandwidth.chars().all(|c| c.is_ascii_digit()) {
            format!("{}{bandwidth}", self.default_mode)
        } else {
            bandwidth.to_owned()
        }
    }
}

/// Builder for [`CapabilityTable`]; one `interface()` call per band.
#[derive(Debug)]
pub struct CapabilityTableBuilder {
    interfaces: Vec<String>,
    channels: BTreeMap<String, Vec<SettingValue>>,
    modes: BTreeMap<String, Vec<String>>,
    default_mode: String,
}

impl CapabilityTableBuilder {
    pub fn interface(
        mut self,
        name: impl Into<String>,
        channels: Vec<SettingValue>,
        modes: Vec<&str>,
    ) -> Self {
        let name = name.into();
        self.interfaces.push(name.clone());
        self.channels.insert(name.clone(), channels);
        self.modes
            .insert(name, modes.into_iter().map(str::to_owned).collect());
        self
    }

    pub fn build(self) -> CapabilityTable {
        CapabilityTable {
            interfaces: self.interfaces,
            channels: self.channels,
            modes: self.modes,
            default_mode: self.default_mode,
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> CapabilityTable {
        CapabilityTable::builder("HE")
            .interface(
                "2G",
                vec![1i64.into(), 6i64.into(), 11i64.into()],
                vec!["HE20", "HE40"],
            )
            .interface(
                "5G_1",
                vec![36i64.into(), 149i64.into()],
                vec!["HE20", "HE40", "HE80"],
            )
            .build()
    }

    #[test]
    fn channel_membership() {
        let caps = table();
        assert!(caps.supports_channel("2G", &SettingValue::Int(6)));
        assert!(!caps.supports_channel("2G", &SettingValue::Int(99)));
        assert!(!caps.supports_channel("6G", &SettingValue::Int(6)));
    }

    #[test]
    fn mode_membership() {
        let caps = table();
        assert!(caps.supports_mode("2G", "HE40"));
        assert!(!caps.supports_mode("2G", "HE80"));
    }

    #[test]
    fn band_reverse_lookup() {
        let caps = table();
        assert_eq!(caps.band_for_channel(&SettingValue::Int(149)), Some("5G_1"));
        assert_eq!(caps.band_for_channel(&SettingValue::Int(6)), Some("2G"));
        assert_eq!(caps.band_for_channel(&SettingValue::Int(99)), None);
    }

    #[test]
    fn bandwidth_normalization() {
        let caps = table();
        assert_eq!(caps.normalize_bandwidth("bw40"), "HE40");
        assert_eq!(caps.normalize_bandwidth("40"), "HE40");
        assert_eq!(caps.normalize_bandwidth("VHT80"), "VHT80");
    }

    #[test]
    fn interface_order_preserved() {
        let caps = table();
        assert_eq!(caps.interfaces(), &["2G".to_owned(), "5G_1".to_owned()]);
    }
}
