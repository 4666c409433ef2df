//! Shared configuration for the aplab CLI.
//!
//! TOML profiles (one per physical AP on the bench), credential
//! resolution (env + keyring + plaintext), and translation to
//! `aplab_core::ApConfig`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use aplab_core::{ApConfig, SettingsTree};
use aplab_gui::BrowserConfig;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profile named '{profile}'")]
    NoSuchProfile { profile: String },

    #[error("no admin password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring operation failed: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named AP profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Run the browser headless.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// WebDriver endpoint.
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// chromedriver binary path.
    #[serde(default = "default_driver_path")]
    pub driver_path: String,

    /// AP reservation timeout in seconds.
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            webdriver_url: default_webdriver_url(),
            driver_path: default_driver_path(),
            lock_timeout: default_lock_timeout(),
        }
    }
}

fn default_headless() -> bool {
    true
}
fn default_webdriver_url() -> String {
    "http://localhost:9515".into()
}
fn default_driver_path() -> String {
    "chromedriver".into()
}
fn default_lock_timeout() -> u64 {
    3600
}

/// One physical AP on the bench.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// AP vendor, e.g. "Netgear".
    pub brand: String,

    /// AP model, e.g. "RAXE500".
    pub model: String,

    /// "http" or "https".
    #[serde(default = "default_protocol")]
    pub protocol: String,

    /// Control interface address.
    pub ip_address: String,

    /// Web GUI port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// GUI admin username.
    #[serde(default = "default_admin_username")]
    pub admin_username: String,

    /// GUI admin password in plaintext; prefer the keyring or env var.
    pub admin_password: Option<String>,

    /// Environment variable name containing the admin password.
    pub admin_password_env: Option<String>,

    /// Override the headless default.
    pub headless: Option<bool>,

    /// Override the WebDriver endpoint.
    pub webdriver_url: Option<String>,

    /// Override the chromedriver path.
    pub driver_path: Option<String>,

    /// Reserve the AP for the whole run.
    #[serde(default)]
    pub lock_ap: bool,

    /// Override the reservation timeout in seconds.
    pub lock_timeout: Option<u64>,

    /// Settings to push right after connecting.
    #[serde(default)]
    pub settings: SettingsTree,
}

fn default_protocol() -> String {
    "http".into()
}
fn default_port() -> u16 {
    80
}
fn default_admin_username() -> String {
    "admin".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "aplab", "aplab").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("aplab");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("APLAB_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the admin password from the credential chain.
pub fn resolve_admin_password(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's admin_password_env → env var lookup
    if let Some(ref env_name) = profile.admin_password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new("aplab", &format!("{profile_name}/admin-password")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref password) = profile.admin_password {
        return Ok(SecretString::from(password.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store the admin password for a profile in the system keyring.
pub fn store_admin_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new("aplab", &format!("{profile_name}/admin-password"))?;
    entry.set_password(password)?;
    Ok(())
}

// ── Translation to ApConfig ─────────────────────────────────────────

/// Build an `ApConfig` from a named profile plus the global defaults.
pub fn profile_to_ap_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ApConfig, ConfigError> {
    match profile.protocol.as_str() {
        "http" | "https" => {}
        other => {
            return Err(ConfigError::Validation {
                field: "protocol".into(),
                reason: format!("expected 'http' or 'https', got '{other}'"),
            });
        }
    }

    let admin_password = resolve_admin_password(profile, profile_name)?;

    let webdriver_url = profile
        .webdriver_url
        .clone()
        .unwrap_or_else(|| defaults.webdriver_url.clone());
    let driver_port = url::Url::parse(&webdriver_url)
        .ok()
        .and_then(|u| u.port())
        .unwrap_or(9515);

    let browser = BrowserConfig {
        headless: profile.headless.unwrap_or(defaults.headless),
        webdriver_url,
        driver_path: profile
            .driver_path
            .clone()
            .unwrap_or_else(|| defaults.driver_path.clone()),
        spawn_driver: true,
        driver_port,
    };

    Ok(ApConfig {
        brand: profile.brand.clone(),
        model: profile.model.clone(),
        protocol: profile.protocol.clone(),
        ip_address: profile.ip_address.clone(),
        port: profile.port,
        admin_username: profile.admin_username.clone(),
        admin_password,
        browser,
        lock_ap: profile.lock_ap,
        lock_timeout: Duration::from_secs(profile.lock_timeout.unwrap_or(defaults.lock_timeout)),
        initial_settings: profile.settings.clone(),
    })
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    const SAMPLE: &str = r#"
        default_profile = "bench1"

        [defaults]
        headless = true
        lock_timeout = 600

        [profiles.bench1]
        brand = "Netgear"
        model = "RAXE500"
        ip_address = "192.168.1.1"
        admin_password = "hunter2"
        lock_ap = true

        [profiles.bench1.settings]
        region = "North America"

        [profiles.bench1.settings."2G"]
        channel = 6
        bandwidth = "HE40"
    "#;

    fn sample_config() -> Config {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(SAMPLE))
            .extract()
            .expect("sample config")
    }

    #[test]
    fn sample_profile_parses_with_defaults() {
        let config = sample_config();
        assert_eq!(config.default_profile.as_deref(), Some("bench1"));

        let profile = &config.profiles["bench1"];
        assert_eq!(profile.protocol, "http");
        assert_eq!(profile.port, 80);
        assert_eq!(profile.admin_username, "admin");
        assert!(profile.lock_ap);
    }

    #[test]
    fn profile_settings_parse_into_tree() {
        let config = sample_config();
        let settings = &config.profiles["bench1"].settings;
        assert_eq!(
            settings.section_value("2G", "channel"),
            Some(&aplab_core::SettingValue::Int(6))
        );
        assert_eq!(
            settings.value("region"),
            Some(&aplab_core::SettingValue::Str("North America".into()))
        );
    }

    #[test]
    fn conversion_builds_ap_config() {
        let config = sample_config();
        let profile = &config.profiles["bench1"];
        let ap = profile_to_ap_config(profile, "bench1", &config.defaults).expect("convert");

        assert_eq!(ap.brand, "Netgear");
        assert_eq!(ap.admin_password.expose_secret(), "hunter2");
        assert_eq!(ap.lock_timeout, Duration::from_secs(600));
        assert_eq!(ap.browser.driver_port, 9515);
        assert!(ap.browser.headless);
    }

    #[test]
    fn bad_protocol_is_rejected() {
        let config = sample_config();
        let mut profile = Profile {
            brand: "Netgear".into(),
            model: "RAXE500".into(),
            protocol: "ftp".into(),
            ip_address: "192.168.1.1".into(),
            port: 80,
            admin_username: "admin".into(),
            admin_password: Some("pw".into()),
            admin_password_env: None,
            headless: None,
            webdriver_url: None,
            driver_path: None,
            lock_ap: false,
            lock_timeout: None,
            settings: SettingsTree::default(),
        };
        let err = profile_to_ap_config(&profile, "x", &config.defaults).expect_err("bad protocol");
        assert!(matches!(err, ConfigError::Validation { .. }));

        profile.protocol = "https".into();
        profile_to_ap_config(&profile, "x", &config.defaults).expect("https ok");
    }

    #[test]
    fn missing_password_is_a_credentials_error() {
        let config = sample_config();
        let profile = Profile {
            brand: "Netgear".into(),
            model: "RAXE500".into(),
            protocol: "http".into(),
            ip_address: "192.168.1.1".into(),
            port: 80,
            admin_username: "admin".into(),
            admin_password: None,
            admin_password_env: None,
            headless: None,
            webdriver_url: None,
            driver_path: None,
            lock_ap: false,
            lock_timeout: None,
            settings: SettingsTree::default(),
        };
        let err = profile_to_ap_config(&profile, "x", &config.defaults).expect_err("no password");
        assert!(matches!(err, ConfigError::NoCredentials { .. }));
    }

    #[test]
    fn webdriver_port_follows_endpoint_override() {
        let mut config = sample_config();
        let mut profile = config.profiles.remove("bench1").expect("profile");
        profile.webdriver_url = Some("http://127.0.0.1:4444/wd/hub".into());
        let ap = profile_to_ap_config(&profile, "bench1", &config.defaults).expect("convert");
        assert_eq!(ap.browser.driver_port, 4444);
    }
}
