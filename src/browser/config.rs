use crate::error::{BrowserError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};

/// Environment variable that disables the Chrome sandbox (containers, CI)
pub const DISABLE_SANDBOX_ENV: &str = "DISABLE_BROWSER_SANDBOX";

/// Grid URL value meaning "manage a local driver process"
pub const LOCAL_GRID: &str = "local";

/// Browser viewport size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BrowserError::InvalidWindowSize(format!(
                "{}x{}: width and height must be positive",
                width, height
            )));
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for WindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for WindowSize {
    type Err = BrowserError;

    /// Parse the `"<width>x<height>"` form, e.g. `"1600x900"`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            BrowserError::InvalidWindowSize(format!(
                "\"{}\" should use the format \"<width>x<height>\" (e.g. \"1600x900\")",
                s
            ))
        };

        let (w, h) = s.trim().split_once('x').ok_or_else(invalid)?;
        if w.is_empty() || h.is_empty() || !w.bytes().all(|b| b.is_ascii_digit()) || !h.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let width = w.parse().map_err(|_| invalid())?;
        let height = h.parse().map_err(|_| invalid())?;
        Self::new(width, height)
    }
}

/// Window size as accepted on the wire: an object or a `"WxH"` string
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum WindowSizeInput {
    /// `{"width": 1280, "height": 720}`
    Dimensions { width: u32, height: u32 },
    /// `"1280x720"`
    Text(String),
}

impl WindowSizeInput {
    pub fn resolve(&self) -> Result<WindowSize> {
        match self {
            WindowSizeInput::Dimensions { width, height } => WindowSize::new(*width, *height),
            WindowSizeInput::Text(text) => text.parse(),
        }
    }
}

/// Configuration used to (re)launch a browser
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserOptions {
    /// Run the browser without a visible window
    pub headless: bool,

    /// Engine-specific WebDriver capabilities, passed through untouched
    /// except for `browserName`
    pub desired_capabilities: Option<Map<String, Value>>,

    /// Remote WebDriver endpoint; `None` launches a local driver
    pub grid_url: Option<String>,

    /// Viewport size; `None` keeps the browser default
    pub window_size: Option<WindowSize>,
}

/// Per-field overrides applied by the launchBrowser tool.
///
/// Outer `None` leaves a field untouched, `Some(None)` resets it.
#[derive(Debug, Clone, Default)]
pub struct BrowserOverrides {
    pub desired_capabilities: Option<Option<Map<String, Value>>>,
    pub grid_url: Option<Option<String>>,
    pub window_size: Option<Option<WindowSize>>,
}

impl BrowserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Builder method: set the viewport size
    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = Some(WindowSize { width, height });
        self
    }

    /// Builder method: set the remote grid URL (`"local"` clears it)
    pub fn grid_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.grid_url = if url.is_empty() || url == LOCAL_GRID { None } else { Some(url) };
        self
    }

    /// Builder method: set desired capabilities
    pub fn desired_capabilities(mut self, caps: Map<String, Value>) -> Self {
        self.desired_capabilities = Some(caps);
        self
    }

    /// Clone these options with the given overrides applied; untouched fields
    /// keep their current value.
    pub fn merged(&self, overrides: BrowserOverrides) -> Self {
        let mut next = self.clone();
        if let Some(caps) = overrides.desired_capabilities {
            next.desired_capabilities = caps;
        }
        if let Some(grid) = overrides.grid_url {
            next.grid_url = grid.filter(|url| !url.is_empty() && url != LOCAL_GRID);
        }
        if let Some(size) = overrides.window_size {
            next.window_size = size;
        }
        next
    }

    /// `browserName` from the capability bag, lowercased
    pub fn browser_name(&self) -> Option<String> {
        self.desired_capabilities
            .as_ref()
            .and_then(|caps| caps.get("browserName"))
            .and_then(Value::as_str)
            .map(str::to_ascii_lowercase)
    }

    pub fn is_local(&self) -> bool {
        self.grid_url.is_none()
    }
}

/// Validate a user-supplied capability bag. Only `browserName` is interpreted.
pub fn validate_capabilities(caps: &Map<String, Value>) -> Result<()> {
    match caps.get("browserName") {
        None | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(BrowserError::InvalidCapabilities("\"browserName\" must be a string".to_string())),
    }
}

/// Whether the sandbox-disable flag is set in the process environment
pub fn sandbox_disabled() -> bool {
    std::env::var(DISABLE_SANDBOX_ENV)
        .map(|v| !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false"))
        .unwrap_or(false)
}

/// Connection coordinates of an existing WebDriver session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionOpts {
    /// Protocol used for connection
    pub protocol: String,
    /// Hostname for WebDriver server
    pub hostname: String,
    /// Port for WebDriver server
    pub port: u16,
    /// Base path for WebDriver endpoints
    #[serde(default = "default_path")]
    pub path: String,
    /// Reconnection metadata, kept as-is
    #[serde(flatten)]
    #[schemars(skip)]
    pub extra: Map<String, Value>,
}

fn default_path() -> String {
    "/".to_string()
}

impl SessionOpts {
    /// Base URL of the WebDriver server, always ending with `/`
    pub fn base_url(&self) -> String {
        let path = self.path.trim_matches('/');
        if path.is_empty() {
            format!("{}://{}:{}/", self.protocol, self.hostname, self.port)
        } else {
            format!("{}://{}:{}/{}/", self.protocol, self.hostname, self.port, path)
        }
    }
}

/// Externally supplied data describing a running session to attach to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionDescriptor {
    /// Unique identifier for the session
    pub session_id: String,
    /// Pid of the webdriver process, if it exists
    #[serde(default)]
    pub driver_pid: u32,
    /// Session capabilities echoed by the engine
    #[serde(default)]
    pub session_caps: Map<String, Value>,
    /// Session connection options
    pub session_opts: SessionOpts,
}

/// Deserialize a field so that `null` and "absent" can be told apart.
/// Use together with `#[serde(default)]`.
pub fn present<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_browser_options_builder() {
        let opts = BrowserOptions::new().headless(true).window_size(800, 600);

        assert!(opts.headless);
        assert_eq!(opts.window_size, Some(WindowSize { width: 800, height: 600 }));
        assert!(opts.is_local());
    }

    #[test]
    fn test_window_size_parse() {
        assert_eq!("1600x900".parse::<WindowSize>().unwrap(), WindowSize { width: 1600, height: 900 });
        assert_eq!(" 1280x720 ".parse::<WindowSize>().unwrap(), WindowSize { width: 1280, height: 720 });
        assert!("1600X900".parse::<WindowSize>().is_err());
        assert!("1600x".parse::<WindowSize>().is_err());
        assert!("-1x900".parse::<WindowSize>().is_err());
        assert!("0x900".parse::<WindowSize>().is_err());
        assert!("big".parse::<WindowSize>().is_err());
    }

    #[test]
    fn test_window_size_input() {
        let obj: WindowSizeInput = serde_json::from_value(json!({"width": 360, "height": 640})).unwrap();
        assert_eq!(obj.resolve().unwrap(), WindowSize { width: 360, height: 640 });

        let text: WindowSizeInput = serde_json::from_value(json!("1024x768")).unwrap();
        assert_eq!(text.resolve().unwrap().to_string(), "1024x768");
    }

    #[test]
    fn test_merge_preserves_untouched_fields() {
        let base = BrowserOptions::new().headless(true).grid_url("http://grid:4444/wd/hub");

        let merged = base.merged(BrowserOverrides {
            window_size: Some(Some(WindowSize { width: 800, height: 600 })),
            ..Default::default()
        });

        assert!(merged.headless);
        assert_eq!(merged.grid_url.as_deref(), Some("http://grid:4444/wd/hub"));
        assert_eq!(merged.window_size, Some(WindowSize { width: 800, height: 600 }));
    }

    #[test]
    fn test_merge_resets_and_local_grid() {
        let base = BrowserOptions::new().window_size(800, 600).grid_url("http://grid:4444");

        let merged = base.merged(BrowserOverrides {
            window_size: Some(None),
            grid_url: Some(Some("local".to_string())),
            ..Default::default()
        });

        assert_eq!(merged.window_size, None);
        assert!(merged.is_local());
    }

    #[test]
    fn test_validate_capabilities() {
        let ok = json!({"browserName": "chrome", "goog:chromeOptions": {"args": []}});
        assert!(validate_capabilities(ok.as_object().unwrap()).is_ok());

        let bad = json!({"browserName": 42});
        assert!(validate_capabilities(bad.as_object().unwrap()).is_err());
    }

    #[test]
    fn test_browser_name() {
        let opts = BrowserOptions::new()
            .desired_capabilities(json!({"browserName": "Firefox"}).as_object().unwrap().clone());
        assert_eq!(opts.browser_name().as_deref(), Some("firefox"));
    }

    #[test]
    fn test_session_descriptor() {
        let descriptor: SessionDescriptor = serde_json::from_value(json!({
            "sessionId": "abc123",
            "driverPid": 4242,
            "sessionCaps": {"browserName": "chrome", "browserVersion": "120", "setWindowRect": true},
            "sessionOpts": {
                "protocol": "http",
                "hostname": "127.0.0.1",
                "port": 9515,
                "path": "/",
                "strictSSL": false
            }
        }))
        .unwrap();

        assert_eq!(descriptor.session_id, "abc123");
        assert_eq!(descriptor.driver_pid, 4242);
        assert_eq!(descriptor.session_opts.base_url(), "http://127.0.0.1:9515/");
        assert_eq!(descriptor.session_opts.extra.get("strictSSL"), Some(&json!(false)));
    }

    #[test]
    fn test_session_opts_base_url_with_path() {
        let opts = SessionOpts {
            protocol: "https".into(),
            hostname: "grid.local".into(),
            port: 443,
            path: "/wd/hub".into(),
            extra: Map::new(),
        };
        assert_eq!(opts.base_url(), "https://grid.local:443/wd/hub/");
    }
}
