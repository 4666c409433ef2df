// ── Blocking browser session ──
//
// A WebDriver-backed browser session that holds an exclusive file lock
// for its whole lifetime. One chromedriver binary supports exactly one
// live session, so every `BrowserSession` on a host contends for the
// same lock before launching. The guard pattern mirrors the rest of the
// workspace: `open()` acquires, `close()`/drop releases, `restart()`
// recycles the browser without giving up the lock.

use std::process::Stdio;
use std::time::Duration;

use fantoccini::elements::Element;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tokio::process::{Child, Command};
use tokio::time::{Instant, sleep};
use tracing::{debug, error, warn};

use crate::error::GuiError;
use crate::lock::{FileLock, session_lock_path};

// Settle times used across AP page interactions.
pub const BROWSER_WAIT_SHORT: Duration = Duration::from_secs(1);
pub const BROWSER_WAIT_MED: Duration = Duration::from_secs(3);
pub const BROWSER_WAIT_LONG: Duration = Duration::from_secs(30);
pub const BROWSER_WAIT_EXTRA_LONG: Duration = Duration::from_secs(60);

/// How a value should be applied to a `<select>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMethod {
    /// Match the option's `value` attribute.
    Value,
    /// Match the option's visible text.
    Text,
    /// Select by zero-based index.
    Index,
}

/// A value read from or written to a page element.
///
/// AP config pages mix text inputs, dropdowns, radios, and checkboxes;
/// this type carries both textual and on/off shapes so drivers don't
/// stringify booleans by hand.
#[derive(Debug, Clone, PartialEq)]
pub enum GuiValue {
    Text(String),
    Flag(bool),
}

impl GuiValue {
    /// Textual form used for select/radio matching and text inputs.
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Flag(on) => if *on { "1" } else { "0" }.to_owned(),
        }
    }

    /// On/off form used for checkboxes. Textual "1"/"0" coerce.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(on) => Some(*on),
            Self::Text(s) => match s.as_str() {
                "1" => Some(true),
                "0" => Some(false),
                _ => None,
            },
        }
    }
}

impl From<&str> for GuiValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for GuiValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for GuiValue {
    fn from(on: bool) -> Self {
        Self::Flag(on)
    }
}

impl From<i64> for GuiValue {
    fn from(n: i64) -> Self {
        Self::Text(n.to_string())
    }
}

// ── Session configuration ───────────────────────────────────────────

/// Connection parameters for the browser session.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run Chrome without a visible window.
    pub headless: bool,
    /// WebDriver endpoint, e.g. `http://localhost:9515`.
    pub webdriver_url: String,
    /// Path to the chromedriver binary. Also keys the session lock.
    pub driver_path: String,
    /// Spawn chromedriver ourselves instead of expecting one running.
    pub spawn_driver: bool,
    /// Port passed to a spawned chromedriver.
    pub driver_port: u16,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            webdriver_url: "http://localhost:9515".to_owned(),
            driver_path: "chromedriver".to_owned(),
            spawn_driver: true,
            driver_port: 9515,
        }
    }
}

impl BrowserConfig {
    fn capabilities(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut args = vec![
            "--no-proxy-server".to_owned(),
            "--no-sandbox".to_owned(),
            "--crash-dumps-dir=/tmp".to_owned(),
            "--allow-running-insecure-content".to_owned(),
            "--ignore-certificate-errors".to_owned(),
        ];
        if self.headless {
            args.push("--headless".to_owned());
            args.push("--disable-gpu".to_owned());
        }
        let mut caps = serde_json::Map::new();
        caps.insert("goog:chromeOptions".to_owned(), json!({ "args": args }));
        caps.insert("acceptInsecureCerts".to_owned(), json!(true));
        caps
    }
}

// ── Session guard ───────────────────────────────────────────────────

/// An exclusive, file-locked browser session against one AP's web GUI.
///
/// At most one session exists per WebDriver binary at any time, across
/// processes. Always pair `open()` with `close()`; the lock itself is
/// released on drop too, so an early `?` return cannot leak it.
pub struct BrowserSession {
    client: Option<Client>,
    driver: Option<Child>,
    config: BrowserConfig,
    _lock: FileLock,
}

impl BrowserSession {
    /// Acquire the session lock and launch a browser.
    ///
    /// `timeout` bounds the lock acquisition; contenders back off one
    /// second between attempts. If the browser fails to launch after the
    /// lock is won, the lock is released before the error propagates.
    pub async fn open(config: BrowserConfig, timeout: Duration) -> Result<Self, GuiError> {
        let lock_path = session_lock_path(&config.driver_path);
        let lock = FileLock::acquire(&lock_path, timeout).await?;

        let driver = match Self::spawn_driver(&config) {
            Ok(child) => child,
            Err(err) => {
                lock.release();
                return Err(err);
            }
        };

        match Self::connect(&config).await {
            Ok(client) => Ok(Self {
                client: Some(client),
                driver,
                config,
                _lock: lock,
            }),
            Err(err) => {
                error!("error starting browser, releasing session lock");
                lock.release();
                Err(err)
            }
        }
    }

    fn spawn_driver(config: &BrowserConfig) -> Result<Option<Child>, GuiError> {
        if !config.spawn_driver {
            return Ok(None);
        }
        debug!(path = %config.driver_path, port = config.driver_port, "spawning webdriver");
        let child = Command::new(&config.driver_path)
            .arg(format!("--port={}", config.driver_port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        Ok(Some(child))
    }

    async fn connect(config: &BrowserConfig) -> Result<Client, GuiError> {
        // A freshly spawned chromedriver needs a moment to start
        // listening; retry the initial handshake briefly.
        let deadline = Instant::now() + BROWSER_WAIT_LONG;
        loop {
            match ClientBuilder::native()
                .capabilities(config.capabilities())
                .connect(&config.webdriver_url)
                .await
            {
                Ok(client) => return Ok(client),
                Err(err) if Instant::now() >= deadline => return Err(err.into()),
                Err(_) => sleep(BROWSER_WAIT_SHORT).await,
            }
        }
    }

    fn client(&self) -> Result<&Client, GuiError> {
        // None after close() or a failed restart().
        self.client.as_ref().ok_or(GuiError::SessionGone)
    }

    /// Quit and relaunch the browser without releasing the session lock.
    ///
    /// Used after a wedged or crashed page load: mutual exclusion is
    /// preserved while the browser itself is replaced. If the relaunch
    /// fails the session stays stopped and later calls return
    /// [`GuiError::SessionGone`]; calling `restart()` again retries.
    pub async fn restart(&mut self) -> Result<(), GuiError> {
        warn!("restarting browser session");
        if let Some(client) = self.client.take() {
            // The old session may already be dead; that is the point.
            let _ = client.close().await;
        }
        self.client = Some(Self::connect(&self.config).await?);
        Ok(())
    }

    /// Quit the browser and release the session lock.
    ///
    /// The lock is released even if the quit fails.
    pub async fn close(mut self) -> Result<(), GuiError> {
        let result = match self.client.take() {
            Some(client) => client.close().await.map_err(GuiError::from),
            None => Ok(()),
        };
        if let Some(mut driver) = self.driver.take() {
            let _ = driver.kill().await;
        }
        // Lock released by drop of self._lock.
        result
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Navigate to `url`, retrying on redirects and dead sessions.
    ///
    /// After each attempt the trailing path component of the current URL
    /// is compared against the target; a mismatch means the AP bounced us
    /// (usually to a login page), in which case `backup_url` is visited
    /// before the next attempt. A navigation error restarts the browser.
    /// If `check_element` is given, the element must be visible after a
    /// successful navigation -- its absence is fatal, not retried.
    pub async fn visit_persistent(
        &mut self,
        url: &str,
        page_timeout: Duration,
        num_tries: usize,
        backup_url: Option<&str>,
        check_element: Option<&str>,
    ) -> Result<(), GuiError> {
        let timeouts = TimeoutConfiguration::new(None, Some(page_timeout), None);
        self.client()?.update_timeouts(timeouts).await?;

        for attempt in 0..num_tries {
            if let Err(err) = self.client()?.goto(url).await {
                debug!(%err, "navigation failed, restarting browser");
                self.restart().await?;
            }

            let current = self.client()?.current_url().await?;
            let page_reached = trailing_component(current.as_str()) == trailing_component(url);
            if page_reached {
                if let Some(element) = check_element {
                    sleep(BROWSER_WAIT_MED).await;
                    if self.is_element_visible(element).await? {
                        return Ok(());
                    }
                    return Err(GuiError::ElementMissing {
                        element: element.to_owned(),
                    });
                }
                return Ok(());
            }

            let backup = backup_url.unwrap_or("about:blank");
            if let Err(err) = self.client()?.goto(backup).await {
                debug!(%err, "backup navigation failed, restarting browser");
                self.restart().await?;
            }

            debug!(url, attempt, "page not reached, retrying");
        }

        error!(url, "URL unreachable");
        Err(GuiError::Unreachable {
            url: url.to_owned(),
            tries: num_tries,
        })
    }

    /// Raw page source of the current page.
    pub async fn page_source(&self) -> Result<String, GuiError> {
        Ok(self.client()?.source().await?)
    }

    // ── Element access (keyed by HTML `name` attribute) ─────────────

    async fn find_by_name(&self, name: &str) -> Result<Element, GuiError> {
        let selector = format!("[name=\"{name}\"]");
        Ok(self.client()?.find(Locator::Css(&selector)).await?)
    }

    async fn find_all_by_name(&self, name: &str) -> Result<Vec<Element>, GuiError> {
        let selector = format!("[name=\"{name}\"]");
        Ok(self.client()?.find_all(Locator::Css(&selector)).await?)
    }

    /// The `type` attribute of a named element (e.g. "checkbox", "radio").
    pub async fn element_type(&self, name: &str) -> Result<String, GuiError> {
        let element = self.find_by_name(name).await?;
        Ok(element.attr("type").await?.unwrap_or_default())
    }

    /// Read a named element's current value.
    ///
    /// Checkboxes report their checked state, radio groups report the
    /// selected member's value, everything else reports the `value`
    /// property.
    pub async fn element_value(&self, name: &str) -> Result<GuiValue, GuiError> {
        let element = self.find_by_name(name).await?;
        match self.element_type(name).await?.as_str() {
            "checkbox" => Ok(GuiValue::Flag(element.is_selected().await?)),
            "radio" => {
                for item in self.find_all_by_name(name).await? {
                    if item.is_selected().await? {
                        let value = item.prop("value").await?.unwrap_or_default();
                        return Ok(GuiValue::Text(value));
                    }
                }
                Ok(GuiValue::Text(String::new()))
            }
            _ => Ok(GuiValue::Text(
                element.prop("value").await?.unwrap_or_default(),
            )),
        }
    }

    /// Whether a named element is enabled/interactable.
    pub async fn is_element_enabled(&self, name: &str) -> Result<bool, GuiError> {
        let element = self.find_by_name(name).await?;
        Ok(element.is_enabled().await?)
    }

    /// Whether a named element is visible.
    pub async fn is_element_visible(&self, name: &str) -> Result<bool, GuiError> {
        let element = self.find_by_name(name).await?;
        Ok(element.is_displayed().await?)
    }

    /// Write a value to a named element, dispatching on its type.
    pub async fn set_element_value(
        &self,
        name: &str,
        value: GuiValue,
        method: SelectMethod,
    ) -> Result<(), GuiError> {
        let kind = self.element_type(name).await?;
        match kind.as_str() {
            "text" | "password" => {
                let element = self.find_by_name(name).await?;
                element.clear().await?;
                element.send_keys(&value.as_text()).await?;
            }
            "checkbox" => {
                let desired = value.as_flag().ok_or_else(|| GuiError::BadInput {
                    element: name.to_owned(),
                    reason: format!("checkbox needs an on/off value, got {value:?}"),
                })?;
                let element = self.find_by_name(name).await?;
                if desired != element.is_selected().await? {
                    element.click().await?;
                }
            }
            "radio" => {
                let target = value.as_text();
                for item in self.find_all_by_name(name).await? {
                    if item.attr("value").await?.as_deref() == Some(target.as_str()) {
                        item.click().await?;
                    }
                }
            }
            "select-one" => {
                let element = self.find_by_name(name).await?;
                match method {
                    SelectMethod::Value => element.select_by_value(&value.as_text()).await?,
                    SelectMethod::Text => element.select_by_label(&value.as_text()).await?,
                    SelectMethod::Index => {
                        let index = value.as_text().parse::<usize>().map_err(|_| {
                            GuiError::BadInput {
                                element: name.to_owned(),
                                reason: format!("index select needs a number, got {value:?}"),
                            }
                        })?;
                        element.select_by_index(index).await?;
                    }
                }
            }
            other => {
                return Err(GuiError::UnsupportedElement {
                    element: name.to_owned(),
                    kind: other.to_owned(),
                });
            }
        }
        Ok(())
    }

    /// Click a named submit button. Non-submit elements are rejected.
    pub async fn click_button(&self, name: &str) -> Result<(), GuiError> {
        let element = self.find_by_name(name).await?;
        if element.attr("type").await?.as_deref() == Some("submit") {
            element.click().await?;
            Ok(())
        } else {
            Err(GuiError::NotAButton {
                element: name.to_owned(),
            })
        }
    }

    /// Accept a javascript alert if one appears within `wait`.
    ///
    /// Returns whether an alert was accepted. AP GUIs throw confirmation
    /// alerts on some channel changes; absence is not an error. Only the
    /// "no such alert" response is swallowed -- a dead session or
    /// transport failure propagates.
    pub async fn accept_alert_if_present(&self, wait: Duration) -> Result<bool, GuiError> {
        let deadline = Instant::now() + wait;
        loop {
            match self.client()?.accept_alert().await {
                Ok(()) => return Ok(true),
                Err(err) if !alert_missing(&err) => return Err(err.into()),
                Err(_) if Instant::now() < deadline => {
                    sleep(Duration::from_millis(200)).await;
                }
                Err(_) => return Ok(false),
            }
        }
    }
}

/// Whether a WebDriver error means "no alert is open right now".
fn alert_missing(err: &fantoccini::error::CmdError) -> bool {
    err.is_no_such_alert()
}

/// Trailing path component used for redirect detection.
///
/// AP firmwares redirect to a login page on auth failure; comparing the
/// final component (e.g. `WLG_wireless_tri_band.htm`) catches that
/// without tripping on scheme or credential differences.
fn trailing_component(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn trailing_component_matches_page_name() {
        assert_eq!(
            trailing_component("https://admin:pw@192.168.1.1:443/WLG_wireless_tri_band.htm"),
            "WLG_wireless_tri_band.htm"
        );
        assert_eq!(trailing_component("about:blank"), "about:blank");
    }

    #[test]
    fn gui_value_text_forms() {
        assert_eq!(GuiValue::from(6i64).as_text(), "6");
        assert_eq!(GuiValue::from(true).as_text(), "1");
        assert_eq!(GuiValue::from("HE40").as_text(), "HE40");
    }

    #[test]
    fn gui_value_flag_coercion() {
        assert_eq!(GuiValue::Text("1".into()).as_flag(), Some(true));
        assert_eq!(GuiValue::Text("0".into()).as_flag(), Some(false));
        assert_eq!(GuiValue::Text("HE40".into()).as_flag(), None);
        assert_eq!(GuiValue::Flag(false).as_flag(), Some(false));
    }

    #[test]
    fn default_config_is_headless_local() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert_eq!(config.webdriver_url, "http://localhost:9515");
    }

    /// A session whose browser is gone (closed, or a relaunch failed).
    async fn stopped_session(name: &str) -> BrowserSession {
        let dir = tempfile::tempdir().expect("tempdir").keep();
        let lock = FileLock::acquire(&dir.join(format!("{name}.lock")), Duration::from_secs(5))
            .await
            .expect("lock");
        BrowserSession {
            client: None,
            driver: None,
            config: BrowserConfig::default(),
            _lock: lock,
        }
    }

    #[tokio::test]
    async fn stopped_session_errors_instead_of_panicking() {
        let mut session = stopped_session("stopped-source").await;
        assert!(matches!(
            session.page_source().await,
            Err(GuiError::SessionGone)
        ));
        assert!(matches!(
            session
                .visit_persistent("http://192.168.1.1/x.htm", BROWSER_WAIT_SHORT, 1, None, None)
                .await,
            Err(GuiError::SessionGone)
        ));
    }

    #[tokio::test]
    async fn stopped_session_propagates_from_alert_polling() {
        let session = stopped_session("stopped-alert").await;
        assert!(matches!(
            session.accept_alert_if_present(Duration::from_millis(10)).await,
            Err(GuiError::SessionGone)
        ));
    }

    #[test]
    fn only_missing_alerts_are_swallowed() {
        use fantoccini::error::CmdError;
        // Transport/protocol failures must propagate, not read as
        // "no alert open".
        assert!(!alert_missing(&CmdError::NotW3C(json!(null))));
        assert!(!alert_missing(&CmdError::NotW3C(json!({"error": "gone"}))));
    }

    #[test]
    fn capabilities_include_headless_args_only_when_headless() {
        let headless = BrowserConfig::default().capabilities();
        let args = headless["goog:chromeOptions"]["args"].to_string();
        assert!(args.contains("--headless"));

        let visible = BrowserConfig {
            headless: false,
            ..BrowserConfig::default()
        }
        .capabilities();
        let args = visible["goog:chromeOptions"]["args"].to_string();
        assert!(!args.contains("--headless"));
    }
}
