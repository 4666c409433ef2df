// ── Netgear tri-band driver (RAXE500 family) ──
//
// Drives the WLG_wireless_tri_band GUI generation: three radios
// (2G / 5G_1 / 6G), an 11ax master toggle, and radio on/off checkboxes
// living on a separate "advanced" page. Field application order is
// deliberate and must not be reshuffled -- this GUI resets dependent
// fields (channel lists, passphrase boxes) when an upstream field
// changes, so region and the 11ax toggle go first, then bandwidth,
// then security, then SSID and channel.

use regex::Regex;
use tracing::{info, warn};

use aplab_gui::{
    BROWSER_WAIT_EXTRA_LONG, BROWSER_WAIT_MED, BROWSER_WAIT_SHORT, BrowserSession, FileLock,
    GuiValue, SelectMethod, reservation_lock_path,
};

use crate::ap::{ApplyFlags, RetailAp};
use crate::capability::CapabilityTable;
use crate::config::ApConfig;
use crate::error::ApError;
use crate::settings::{SettingValue, SettingsTree, SettingsUpdate};

/// Overall bound on winning the browser-session lock. Configuration
/// runs are long; a callbox-style 15 minute wait beats flaking a test.
const SESSION_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(900);

const VISIT_TRIES: usize = 10;
const APPLY_BUTTON: &str = "Apply";

// ── GUI field model ─────────────────────────────────────────────────

/// Per-interface settings that map to GUI elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceField {
    Status,
    Ssid,
    Channel,
    Bandwidth,
    SecurityType,
    Password,
}

/// One entry of the ordered GUI field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey {
    Region,
    EnableAx,
    Interface(&'static str, InterfaceField),
}

/// Static description of one supported model's GUI.
#[derive(Debug, Clone)]
pub struct ModelProfile {
    pub config_page: &'static str,
    pub advanced_page: &'static str,
    pub firmware_page: &'static str,
    pub capabilities: CapabilityTable,
    /// GUI fields in application order. Do not reorder.
    pub fields: Vec<(FieldKey, &'static str)>,
    region_codes: Vec<(&'static str, &'static str)>,
    /// GUI option value -> mode string, indexed by the 11ax toggle.
    bw_mode_values: [Vec<(&'static str, &'static str)>; 2],
    /// (interface, mode) -> visible dropdown text.
    bw_mode_text: Vec<(&'static str, &'static str, &'static str)>,
}

impl ModelProfile {
    /// Profile for a supported Netgear model, if any.
    pub fn for_model(model: &str) -> Option<Self> {
        match model {
            "RAXE500" => Some(Self::raxe500()),
            _ => None,
        }
    }

    fn raxe500() -> Self {
        let mut six_g_channels: Vec<SettingValue> = Vec::new();
        for ch in (37..222).step_by(16) {
            six_g_channels.push(format!("6g{ch}").into());
        }
        let high_band_modes = vec![
            "VHT20", "VHT40", "VHT80", "VHT160", "HE20", "HE40", "HE80", "HE160",
        ];
        let capabilities = CapabilityTable::builder("HE")
            .interface(
                "2G",
                (1..=11i64).map(SettingValue::Int).collect(),
                vec!["VHT20", "VHT40", "HE20", "HE40"],
            )
            .interface(
                "5G_1",
                [
                    36i64, 40, 44, 48, 52, 56, 60, 64, 100, 104, 108, 112, 116, 120, 124, 128,
                    132, 136, 140, 144, 149, 153, 157, 161, 165,
                ]
                .into_iter()
                .map(SettingValue::Int)
                .collect(),
                high_band_modes.clone(),
            )
            .interface("6G", six_g_channels, high_band_modes)
            .build();

        use FieldKey::{EnableAx, Interface, Region};
        use InterfaceField as F;
        let fields = vec![
            (Region, "WRegion"),
            (EnableAx, "enable_he"),
            (Interface("2G", F::Status), "enable_ap"),
            (Interface("5G_1", F::Status), "enable_ap_an"),
            (Interface("6G", F::Status), "enable_ap_an_2"),
            (Interface("2G", F::Ssid), "ssid"),
            (Interface("5G_1", F::Ssid), "ssid_an"),
            (Interface("6G", F::Ssid), "ssid_an_2"),
            (Interface("2G", F::Channel), "w_channel"),
            (Interface("5G_1", F::Channel), "w_channel_an"),
            (Interface("6G", F::Channel), "w_channel_an_2"),
            (Interface("2G", F::Bandwidth), "opmode"),
            (Interface("5G_1", F::Bandwidth), "opmode_an"),
            (Interface("6G", F::Bandwidth), "opmode_an_2"),
            (Interface("6G", F::SecurityType), "security_type_an_2"),
            (Interface("5G_1", F::SecurityType), "security_type_an"),
            (Interface("2G", F::SecurityType), "security_type"),
            (Interface("2G", F::Password), "passphrase"),
            (Interface("5G_1", F::Password), "passphrase_an"),
            (Interface("6G", F::Password), "passphrase_an_2"),
        ];

        let region_codes = vec![
            ("3", "Australia"),
            ("4", "Canada"),
            ("5", "Europe"),
            ("7", "Japan"),
            ("8", "Korea"),
            ("11", "North America"),
            ("16", "China"),
            ("17", "India"),
            ("21", "Middle East(Saudi Arabia/United Arab Emirates)"),
            ("23", "Singapore"),
            ("25", "Hong Kong"),
            ("26", "Vietnam"),
        ];

        let bw_mode_values = [
            vec![
                ("g and b", "11g"),
                ("HT20", "VHT20"),
                ("HT40", "VHT40"),
                ("HT80", "VHT80"),
                ("HT160", "VHT160"),
            ],
            vec![
                ("g and b", "11g"),
                ("HT20", "HE20"),
                ("HT40", "HE40"),
                ("HT80", "HE80"),
                ("HT160", "HE160"),
            ],
        ];

        let bw_mode_text = vec![
            ("2G", "g and b", "Up to 54 Mbps"),
            ("2G", "HE20", "Up to 600 Mbps"),
            ("2G", "HE40", "Up to 1200 Mbps"),
            ("2G", "VHT20", "Up to 433 Mbps"),
            ("2G", "VHT40", "Up to 1000 Mbps"),
            ("5G_1", "HE20", "Up to 600 Mbps"),
            ("5G_1", "HE40", "Up to 1200 Mbps"),
            ("5G_1", "HE80", "Up to 2400 Mbps"),
            ("5G_1", "HE160", "Up to 4800 Mbps"),
            ("5G_1", "VHT20", "Up to 433 Mbps"),
            ("5G_1", "VHT40", "Up to 1000 Mbps"),
            ("5G_1", "VHT80", "Up to 2165 Mbps"),
            ("5G_1", "VHT160", "Up to 4330 Mbps"),
            ("6G", "HE20", "Up to 600 Mbps"),
            ("6G", "HE40", "Up to 1200 Mbps"),
            ("6G", "HE80", "Up to 2400 Mbps"),
            ("6G", "HE160", "Up to 4800 Mbps"),
            ("6G", "VHT20", "Up to 600 Mbps"),
            ("6G", "VHT40", "Up to 1200 Mbps"),
            ("6G", "VHT80", "Up to 2400 Mbps"),
            ("6G", "VHT160", "Up to 4800 Mbps"),
        ];

        Self {
            config_page: "WLG_wireless_tri_band.htm",
            advanced_page: "WLG_adv_tri_band2.htm",
            firmware_page: "ADVANCED_home2_tri_band.htm",
            capabilities,
            fields,
            region_codes,
            bw_mode_values,
            bw_mode_text,
        }
    }

    fn region_name(&self, code: &str) -> Option<&'static str> {
        self.region_codes
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| *name)
    }

    fn mode_for_gui_value(&self, ax_enabled: bool, gui_value: &str) -> Option<&'static str> {
        self.bw_mode_values[usize::from(ax_enabled)]
            .iter()
            .find(|(v, _)| *v == gui_value)
            .map(|(_, mode)| *mode)
    }

    fn gui_text_for_mode(&self, interface: &str, mode: &str) -> Option<&'static str> {
        self.bw_mode_text
            .iter()
            .find(|(iface, m, _)| *iface == interface && *m == mode)
            .map(|(_, _, text)| *text)
    }

    /// Empty settings skeleton defining the legal key set.
    fn settings_skeleton(&self) -> SettingsTree {
        let mut tree = SettingsTree::new();
        tree.insert_value("region", "");
        tree.insert_value("enable_ax", 0i64);
        for interface in self.capabilities.interfaces() {
            let mut section = SettingsTree::new();
            section.insert_value("status", 0i64);
            section.insert_value("ssid", "");
            section.insert_value("channel", 0i64);
            section.insert_value("bandwidth", "");
            section.insert_value("security_type", "");
            section.insert_value("password", "");
            tree.insert_section(interface.clone(), section);
        }
        tree
    }
}

// ── Driver ──────────────────────────────────────────────────────────

/// Driver for Netgear tri-band APs (currently the RAXE500).
pub struct NetgearTriBandAp {
    config: ApConfig,
    profile: ModelProfile,
    settings: SettingsTree,
    firmware_version: Option<String>,
    reservation: Option<FileLock>,
}

impl NetgearTriBandAp {
    /// Connect to and synchronize with the physical AP.
    ///
    /// Reserves the AP if configured to, reads firmware and current
    /// settings, then pushes the config's initial settings (a no-op
    /// when they already match).
    pub async fn connect(config: ApConfig) -> Result<Self, ApError> {
        let profile =
            ModelProfile::for_model(&config.model).ok_or_else(|| ApError::UnsupportedModel {
                brand: config.brand.clone(),
                model: config.model.clone(),
            })?;

        let reservation = if config.lock_ap {
            info!("trying to acquire AP reservation lock");
            let path = reservation_lock_path(&config.brand, &config.model, &config.ip_address);
            let lock = FileLock::acquire(&path, config.lock_timeout).await?;
            info!("AP reservation lock acquired");
            Some(lock)
        } else {
            None
        };

        let settings = profile.settings_skeleton();
        let initial = config.initial_settings.clone();
        let mut ap = Self {
            config,
            profile,
            settings,
            firmware_version: None,
            reservation,
        };
        ap.read_firmware().await?;
        ap.read_settings().await?;
        if !initial.is_empty() {
            ap.update_settings(SettingsUpdate::from_tree(initial)).await?;
        }
        Ok(ap)
    }

    /// Firmware version scraped at connect time, if the page matched.
    pub fn firmware_version(&self) -> Option<&str> {
        self.firmware_version.as_deref()
    }

    async fn browser(&self) -> Result<BrowserSession, ApError> {
        Ok(BrowserSession::open(self.config.browser.clone(), SESSION_TIMEOUT).await?)
    }

    async fn read_firmware(&mut self) -> Result<(), ApError> {
        let url = self.config.page_url(self.profile.firmware_page);
        let mut browser = self.browser().await?;
        browser
            .visit_persistent(&url, BROWSER_WAIT_MED, VISIT_TRIES, None, None)
            .await?;
        let source = browser.page_source().await?;
        browser.close().await?;

        let pattern = Regex::new(r"Firmware Version[\s\S]+?V(?P<version>[0-9._]+)")
            .map_err(|e| ApError::Config {
                message: format!("bad firmware regex: {e}"),
            })?;
        self.firmware_version = pattern
            .captures(&source)
            .map(|caps| caps["version"].to_owned());
        if self.firmware_version.is_none() {
            warn!("could not parse firmware version");
        }
        Ok(())
    }

    /// Push radio on/off states. Lives on the advanced page, which is
    /// why status toggles need their own apply pass.
    async fn apply_radio_status(&self) -> Result<(), ApError> {
        let config_url = self.config.page_url(self.profile.config_page);
        let advanced_url = self.config.page_url(self.profile.advanced_page);

        let mut browser = self.browser().await?;
        browser
            .visit_persistent(&config_url, BROWSER_WAIT_MED, VISIT_TRIES, None, None)
            .await?;
        browser
            .visit_persistent(&advanced_url, BROWSER_WAIT_MED, VISIT_TRIES, None, None)
            .await?;

        for (key, element) in &self.profile.fields {
            if let FieldKey::Interface(interface, InterfaceField::Status) = key {
                let on = self
                    .settings
                    .section_value(interface, "status")
                    .and_then(SettingValue::as_int)
                    .unwrap_or(0)
                    != 0;
                browser
                    .set_element_value(element, GuiValue::Flag(on), SelectMethod::Value)
                    .await?;
            }
        }

        tokio::time::sleep(BROWSER_WAIT_SHORT).await;
        browser.click_button(APPLY_BUTTON).await?;
        tokio::time::sleep(BROWSER_WAIT_EXTRA_LONG).await;
        browser
            .visit_persistent(&config_url, BROWSER_WAIT_EXTRA_LONG, VISIT_TRIES, None, None)
            .await?;
        browser.close().await?;
        Ok(())
    }

    fn interface_section_mut<'a>(
        snapshot: &'a mut SettingsTree,
        interface: &str,
    ) -> Result<&'a mut SettingsTree, ApError> {
        snapshot
            .section_mut(interface)
            .ok_or_else(|| ApError::UnknownInterface {
                interface: interface.to_owned(),
            })
    }

    /// Build the update tree for a channel and/or bandwidth change.
    ///
    /// Unlike the base reconciler, this GUI family hard-rejects values
    /// outside the capability table: pushing them would leave the
    /// dropdowns in an undefined state. Bandwidth changes also keep the
    /// HE/VHT family consistent across all bands (the GUI couples them
    /// through the 11ax toggle) and rewrite the other bands if needed.
    fn plan_band_update(
        capabilities: &CapabilityTable,
        settings: &SettingsTree,
        interface: &str,
        channel: Option<SettingValue>,
        bandwidth: Option<&str>,
    ) -> Result<SettingsTree, ApError> {
        let mut section = SettingsTree::new();

        if let Some(channel) = channel {
            if !capabilities.supports_channel(interface, &channel) {
                return Err(ApError::UnsupportedValue {
                    value: format!("channel {channel}"),
                    interface: interface.to_owned(),
                });
            }
            // The 6G dropdown takes plain numbers; strip the band tag.
            let channel = match &channel {
                SettingValue::Str(s) if s.starts_with("6g") => s[2..]
                    .parse::<i64>()
                    .map(SettingValue::Int)
                    .unwrap_or(channel.clone()),
                other => other.clone(),
            };
            section.insert_value("channel", channel);
        }

        let mut update = SettingsTree::new();
        let Some(bandwidth) = bandwidth else {
            update.insert_section(interface, section);
            return Ok(update);
        };

        let bandwidth = capabilities.normalize_bandwidth(bandwidth);
        if !capabilities.supports_mode(interface, &bandwidth) {
            return Err(ApError::UnsupportedValue {
                value: format!("{bandwidth} mode"),
                interface: interface.to_owned(),
            });
        }
        let ax_requested = bandwidth.contains("HE");
        section.insert_value("bandwidth", bandwidth);
        update.insert_section(interface, section);
        update.insert_value("enable_ax", i64::from(ax_requested));

        let requested_family = if ax_requested { "HE" } else { "VHT" };
        for other in capabilities.interfaces() {
            if other == interface {
                continue;
            }
            let Some(other_bw) = settings
                .section_value(other, "bandwidth")
                .and_then(SettingValue::as_str)
            else {
                continue;
            };
            let other_family = if other_bw.contains("HE") { "HE" } else { "VHT" };
            if other_family != requested_family {
                let width: String = other_bw.chars().filter(char::is_ascii_digit).collect();
                let rewritten = format!("{requested_family}{width}");
                warn!("all bands must be VHT or HE, updating {other} to {rewritten}");
                let mut other_section = SettingsTree::new();
                other_section.insert_value("bandwidth", rewritten);
                update.insert_section(other.clone(), other_section);
            }
        }
        Ok(update)
    }
}

impl RetailAp for NetgearTriBandAp {
    fn capabilities(&self) -> &CapabilityTable {
        &self.profile.capabilities
    }

    fn settings(&self) -> &SettingsTree {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut SettingsTree {
        &mut self.settings
    }

    async fn read_settings(&mut self) -> Result<SettingsTree, ApError> {
        let config_url = self.config.page_url(self.profile.config_page);
        let advanced_url = self.config.page_url(self.profile.advanced_page);

        let mut browser = self.browser().await?;
        browser
            .visit_persistent(&config_url, BROWSER_WAIT_MED, VISIT_TRIES, None, None)
            .await?;

        let mut snapshot = self.settings.clone();
        for (key, element) in &self.profile.fields {
            match key {
                FieldKey::Interface(interface, InterfaceField::Status) => {
                    // Radio toggles live on the advanced page.
                    browser
                        .visit_persistent(&advanced_url, BROWSER_WAIT_MED, VISIT_TRIES, None, None)
                        .await?;
                    let on = browser
                        .element_value(element)
                        .await?
                        .as_flag()
                        .unwrap_or(false);
                    Self::interface_section_mut(&mut snapshot, interface)?
                        .insert_value("status", i64::from(on));
                    browser
                        .visit_persistent(&config_url, BROWSER_WAIT_MED, VISIT_TRIES, None, None)
                        .await?;
                }
                FieldKey::EnableAx => {
                    let on = browser
                        .element_value(element)
                        .await?
                        .as_flag()
                        .unwrap_or(false);
                    snapshot.insert_value("enable_ax", i64::from(on));
                }
                FieldKey::Region => {
                    let code = browser.element_value(element).await?.as_text();
                    let region = self
                        .profile
                        .region_name(&code)
                        .map_or(code, str::to_owned);
                    snapshot.insert_value("region", region);
                }
                FieldKey::Interface(interface, InterfaceField::Bandwidth) => {
                    // Decode depends on the 11ax toggle read above.
                    let ax_enabled = snapshot
                        .value("enable_ax")
                        .and_then(SettingValue::as_int)
                        .unwrap_or(0)
                        != 0;
                    let gui_value = browser.element_value(element).await?.as_text();
                    let mode = self
                        .profile
                        .mode_for_gui_value(ax_enabled, &gui_value)
                        .map_or(gui_value, str::to_owned);
                    Self::interface_section_mut(&mut snapshot, interface)?
                        .insert_value("bandwidth", mode);
                }
                FieldKey::Interface(interface, InterfaceField::Channel) => {
                    let text = browser.element_value(element).await?.as_text();
                    let channel = text
                        .parse::<i64>()
                        .map_or(SettingValue::Str(text), SettingValue::Int);
                    Self::interface_section_mut(&mut snapshot, interface)?
                        .insert_value("channel", channel);
                }
                FieldKey::Interface(interface, field) => {
                    let text = browser.element_value(element).await?.as_text();
                    let name = match field {
                        InterfaceField::Ssid => "ssid",
                        InterfaceField::SecurityType => "security_type",
                        InterfaceField::Password => "password",
                        _ => unreachable!("handled above"),
                    };
                    Self::interface_section_mut(&mut snapshot, interface)?
                        .insert_value(name, text);
                }
            }
        }
        browser.close().await?;

        self.settings = snapshot.clone();
        Ok(snapshot)
    }

    async fn apply_settings(&mut self, flags: ApplyFlags) -> Result<(), ApError> {
        if flags.status_toggled {
            self.apply_radio_status().await?;
        }

        let config_url = self.config.page_url(self.profile.config_page);
        let nologin_url = self.config.page_url_nologin(self.profile.config_page);

        let mut browser = self.browser().await?;
        browser
            .visit_persistent(&config_url, BROWSER_WAIT_MED, VISIT_TRIES, None, None)
            .await?;
        browser
            .visit_persistent(
                &nologin_url,
                BROWSER_WAIT_MED,
                VISIT_TRIES,
                Some(&config_url),
                None,
            )
            .await?;

        // Pass 1: region and 11ax toggle, then bandwidth. These reset
        // downstream dropdowns, so they go first.
        for (key, element) in &self.profile.fields {
            match key {
                FieldKey::Region => {
                    let region = self
                        .settings
                        .value("region")
                        .map(ToString::to_string)
                        .unwrap_or_default();
                    if browser.is_element_enabled(element).await? {
                        browser
                            .set_element_value(element, region.into(), SelectMethod::Text)
                            .await?;
                    } else {
                        warn!("cannot change region");
                    }
                }
                FieldKey::EnableAx => {
                    let on = self
                        .settings
                        .value("enable_ax")
                        .and_then(SettingValue::as_int)
                        .unwrap_or(0)
                        != 0;
                    browser
                        .set_element_value(element, GuiValue::Flag(on), SelectMethod::Value)
                        .await?;
                }
                FieldKey::Interface(interface, InterfaceField::Bandwidth) => {
                    let mode = self
                        .settings
                        .section_value(interface, "bandwidth")
                        .and_then(SettingValue::as_str)
                        .unwrap_or_default();
                    let Some(text) = self.profile.gui_text_for_mode(interface, mode) else {
                        warn!("cannot select bandwidth, keeping AP default");
                        continue;
                    };
                    if let Err(err) = browser
                        .set_element_value(element, text.into(), SelectMethod::Text)
                        .await
                    {
                        warn!(%err, "cannot select bandwidth, keeping AP default");
                    }
                }
                _ => {}
            }
        }

        // Pass 2: security modes, with passphrases where applicable.
        for (key, element) in &self.profile.fields {
            if let FieldKey::Interface(interface, InterfaceField::SecurityType) = key {
                let security = self
                    .settings
                    .section_value(interface, "security_type")
                    .and_then(SettingValue::as_str)
                    .unwrap_or_default()
                    .to_owned();
                browser
                    .set_element_value(element, security.as_str().into(), SelectMethod::Value)
                    .await?;
                if security.contains("WPA") {
                    let password = self
                        .settings
                        .section_value(interface, "password")
                        .and_then(SettingValue::as_str)
                        .unwrap_or_default();
                    let password_element = self
                        .profile
                        .fields
                        .iter()
                        .find(|(k, _)| {
                            *k == FieldKey::Interface(interface, InterfaceField::Password)
                        })
                        .map(|(_, e)| *e);
                    if let Some(password_element) = password_element {
                        browser
                            .set_element_value(
                                password_element,
                                password.into(),
                                SelectMethod::Value,
                            )
                            .await?;
                    }
                }
            }
        }

        // Pass 3: SSIDs and channels.
        for (key, element) in &self.profile.fields {
            match key {
                FieldKey::Interface(interface, InterfaceField::Ssid) => {
                    let ssid = self
                        .settings
                        .section_value(interface, "ssid")
                        .and_then(SettingValue::as_str)
                        .unwrap_or_default();
                    browser
                        .set_element_value(element, ssid.into(), SelectMethod::Value)
                        .await?;
                }
                FieldKey::Interface(interface, InterfaceField::Channel) => {
                    let channel = self
                        .settings
                        .section_value(interface, "channel")
                        .map(ToString::to_string)
                        .unwrap_or_default();
                    if let Err(err) = browser
                        .set_element_value(element, channel.into(), SelectMethod::Value)
                        .await
                    {
                        warn!(%err, "cannot select channel, keeping AP default");
                    }
                    browser.accept_alert_if_present(BROWSER_WAIT_SHORT).await?;
                }
                _ => {}
            }
        }

        tokio::time::sleep(BROWSER_WAIT_SHORT).await;
        browser.click_button(APPLY_BUTTON).await?;
        browser.accept_alert_if_present(BROWSER_WAIT_SHORT).await?;
        tokio::time::sleep(BROWSER_WAIT_SHORT).await;
        browser
            .visit_persistent(&config_url, BROWSER_WAIT_EXTRA_LONG, VISIT_TRIES, None, None)
            .await?;
        browser.close().await?;
        Ok(())
    }

    async fn teardown(&mut self) -> Result<(), ApError> {
        if let Some(lock) = self.reservation.take() {
            lock.release();
        }
        Ok(())
    }

    // This GUI family hard-rejects out-of-capability values; see
    // `plan_band_update`.

    async fn set_channel(
        &mut self,
        interface: &str,
        channel: impl Into<SettingValue> + Send,
    ) -> Result<(), ApError> {
        let update = Self::plan_band_update(
            self.capabilities(),
            self.settings(),
            interface,
            Some(channel.into()),
            None,
        )?;
        self.update_settings(SettingsUpdate::from_tree(update)).await
    }

    async fn set_bandwidth(&mut self, interface: &str, bandwidth: &str) -> Result<(), ApError> {
        let update = Self::plan_band_update(
            self.capabilities(),
            self.settings(),
            interface,
            None,
            Some(bandwidth),
        )?;
        self.update_settings(SettingsUpdate::from_tree(update)).await
    }

    async fn set_channel_and_bandwidth(
        &mut self,
        interface: &str,
        channel: impl Into<SettingValue> + Send,
        bandwidth: &str,
    ) -> Result<(), ApError> {
        let update = Self::plan_band_update(
            self.capabilities(),
            self.settings(),
            interface,
            Some(channel.into()),
            Some(bandwidth),
        )?;
        self.update_settings(SettingsUpdate::from_tree(update)).await
    }
}

// ── Tests ───────────────────────────────────────────────────────────
