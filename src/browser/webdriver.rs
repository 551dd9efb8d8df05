//! WebDriver-backed browser provider.
//!
//! Speaks the W3C WebDriver HTTP protocol to either a remote grid or a
//! locally spawned `chromedriver`/`geckodriver` process.

use crate::browser::config::{BrowserOptions, SessionDescriptor, sandbox_disabled};
use crate::browser::driver::{BrowserDriver, BrowserHandle, BrowserLauncher, ELEMENT_KEY, ElementRef};
use crate::error::{BrowserError, Result};
use crate::locator::Selector;
use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, Method};
use serde_json::{Map, Value, json};
use std::{process::Stdio, sync::Arc, time::Duration};
use tokio::{process::Child, sync::Mutex};

/// Environment variable pointing at the chromedriver binary
pub const CHROMEDRIVER_PATH_ENV: &str = "CHROMEDRIVER_PATH";

/// Environment variable pointing at the geckodriver binary
pub const GECKODRIVER_PATH_ENV: &str = "GECKODRIVER_PATH";

const COMMAND_TIMEOUT: Duration = Duration::from_secs(120);
const DRIVER_READY_ATTEMPTS: u32 = 100;
const DRIVER_READY_INTERVAL: Duration = Duration::from_millis(100);

/// A W3C WebDriver session
pub struct WebDriverSession {
    client: Client,
    /// Server base URL, always ending with `/`
    base_url: String,
    session_id: String,
    /// Driver process owned by this session, if it was launched locally
    driver_process: Mutex<Option<Child>>,
}

impl WebDriverSession {
    fn new(client: Client, base_url: String, session_id: String, driver_process: Option<Child>) -> Self {
        Self {
            client,
            base_url,
            session_id,
            driver_process: Mutex::new(driver_process),
        }
    }

    fn session_url(&self, path: &str) -> String {
        if path.is_empty() {
            format!("{}session/{}", self.base_url, self.session_id)
        } else {
            format!("{}session/{}/{}", self.base_url, self.session_id, path)
        }
    }

    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = self.session_url(path);
        log::debug!("WebDriver {} {}", method, url);
        send(&self.client, method, &url, body, path).await
    }

    async fn get(&self, path: &str) -> Result<Value> {
        self.command(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.command(Method::POST, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Value> {
        self.command(Method::DELETE, path, None).await
    }

    async fn get_string(&self, path: &str) -> Result<String> {
        let value = self.get(path).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn stop_driver_process(&self) {
        let mut process = self.driver_process.lock().await;
        if let Some(mut child) = process.take() {
            log::info!("Stopping WebDriver process {:?}", child.id());
            if let Err(e) = child.kill().await {
                log::warn!("Failed to stop WebDriver process: {}", e);
            }
        }
    }
}

/// Issue one WebDriver request and unwrap the `value` envelope
async fn send(client: &Client, method: Method, url: &str, body: Option<Value>, command: &str) -> Result<Value> {
    let mut request = client.request(method.clone(), url);
    if method == Method::POST {
        request = request.json(&body.unwrap_or_else(|| json!({})));
    }

    let response = request
        .send()
        .await
        .map_err(|e| BrowserError::ConnectionFailed(format!("{}: {}", url, e)))?;
    let status = response.status();
    let payload: Value = response
        .json()
        .await
        .map_err(|e| BrowserError::ConnectionFailed(format!("invalid response from {}: {}", url, e)))?;

    let value = payload.get("value").cloned().unwrap_or(Value::Null);
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        return Err(BrowserError::WebDriver {
            command: command.to_string(),
            error: error.to_string(),
            message: value.get("message").and_then(Value::as_str).unwrap_or_default().to_string(),
        });
    }
    if !status.is_success() {
        return Err(BrowserError::WebDriver {
            command: command.to_string(),
            error: status.to_string(),
            message: payload.to_string(),
        });
    }

    Ok(value)
}

fn is_no_such_element(err: &BrowserError) -> bool {
    matches!(err, BrowserError::WebDriver { error, .. } if error == "no such element")
}

#[async_trait]
impl BrowserDriver for WebDriverSession {
    fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn current_url(&self) -> Result<String> {
        self.get_string("url").await
    }

    async fn title(&self) -> Result<String> {
        self.get_string("title").await
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.post("url", json!({ "url": url }))
            .await
            .map_err(|e| BrowserError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;
        Ok(())
    }

    async fn window_handles(&self) -> Result<Vec<String>> {
        let value = self.get("window/handles").await?;
        Ok(value
            .as_array()
            .map(|handles| handles.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default())
    }

    async fn window_handle(&self) -> Result<String> {
        self.get_string("window").await
    }

    async fn switch_to_window(&self, handle: &str) -> Result<()> {
        self.post("window", json!({ "handle": handle }))
            .await
            .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to switch to tab: {}", e)))?;
        Ok(())
    }

    async fn close_window(&self) -> Result<()> {
        self.delete("window")
            .await
            .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to close tab: {}", e)))?;
        Ok(())
    }

    async fn new_window(&self) -> Result<String> {
        let value = self
            .post("window/new", json!({ "type": "tab" }))
            .await
            .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to create tab: {}", e)))?;

        value
            .get("handle")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| BrowserError::TabOperationFailed("new window returned no handle".to_string()))
    }

    async fn page_source(&self) -> Result<String> {
        self.get_string("source").await
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let encoded = self.get_string("screenshot").await?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| BrowserError::ScriptFailed(format!("Invalid screenshot data: {}", e)))
    }

    async fn find_element(&self, selector: &Selector) -> Result<Option<ElementRef>> {
        let body = json!({ "using": selector.using(), "value": selector.value() });
        match self.post("element", body).await {
            Ok(value) => Ok(ElementRef::from_json(&value)),
            Err(e) if is_no_such_element(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.post("execute/sync", json!({ "script": script, "args": args }))
            .await
            .map_err(|e| BrowserError::ScriptFailed(e.to_string()))
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        self.post(&format!("element/{}/click", element.id()), json!({})).await?;
        Ok(())
    }

    async fn hover(&self, element: &ElementRef) -> Result<()> {
        let actions = json!({
            "actions": [{
                "type": "pointer",
                "id": "mouse",
                "parameters": { "pointerType": "mouse" },
                "actions": [{
                    "type": "pointerMove",
                    "duration": 0,
                    "origin": { ELEMENT_KEY: element.id() },
                    "x": 0,
                    "y": 0
                }]
            }]
        });
        self.post("actions", actions).await?;
        Ok(())
    }

    async fn set_value(&self, element: &ElementRef, text: &str) -> Result<()> {
        self.post(&format!("element/{}/clear", element.id()), json!({})).await?;
        self.post(&format!("element/{}/value", element.id()), json!({ "text": text }))
            .await?;
        Ok(())
    }

    async fn is_displayed(&self, element: &ElementRef) -> Result<bool> {
        let value = self.get(&format!("element/{}/displayed", element.id())).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn outer_html(&self, element: &ElementRef) -> Result<String> {
        self.get_string(&format!("element/{}/property/outerHTML", element.id()))
            .await
    }

    async fn delete_session(&self) -> Result<()> {
        let result = self.delete("").await;
        self.stop_driver_process().await;
        result.map(|_| ())
    }
}

/// Launches local drivers or connects to remote grids
#[derive(Clone)]
pub struct WebDriverLauncher {
    client: Client,
}

impl Default for WebDriverLauncher {
    fn default() -> Self {
        let client = Client::builder().timeout(COMMAND_TIMEOUT).build().unwrap_or_default();
        Self { client }
    }
}

impl WebDriverLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    async fn create_session(&self, base_url: &str, capabilities: Map<String, Value>) -> Result<String> {
        let url = format!("{}session", base_url);
        let body = json!({ "capabilities": { "alwaysMatch": capabilities } });

        let value = send(&self.client, Method::POST, &url, Some(body), "new session")
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        value
            .get("sessionId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| BrowserError::LaunchFailed("WebDriver returned no session id".to_string()))
    }

    async fn spawn_driver(&self, browser: &str) -> Result<(Child, String)> {
        let (binary, env) = match browser {
            "chrome" | "chromium" => ("chromedriver", CHROMEDRIVER_PATH_ENV),
            "firefox" => ("geckodriver", GECKODRIVER_PATH_ENV),
            other => return Err(BrowserError::UnsupportedBrowser(other.to_string())),
        };
        let path = std::env::var(env).unwrap_or_else(|_| binary.to_string());
        let port = free_port().await?;

        log::info!("Launching {} on port {}", path, port);
        let mut child = tokio::process::Command::new(&path)
            .arg(format!("--port={}", port))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BrowserError::LaunchFailed(format!("Failed to start {}: {}", path, e)))?;

        let base_url = format!("http://127.0.0.1:{}/", port);
        self.wait_until_ready(&mut child, &base_url, &path).await?;
        Ok((child, base_url))
    }

    async fn wait_until_ready(&self, child: &mut Child, base_url: &str, path: &str) -> Result<()> {
        let status_url = format!("{}status", base_url);

        for attempt in 1..=DRIVER_READY_ATTEMPTS {
            if let Ok(Some(status)) = child.try_wait() {
                return Err(BrowserError::LaunchFailed(format!("{} exited early with {}", path, status)));
            }

            if let Ok(response) = self.client.get(&status_url).send().await {
                if response.status().is_success() {
                    log::debug!("{} ready after {} attempts", path, attempt);
                    return Ok(());
                }
            }

            tokio::time::sleep(DRIVER_READY_INTERVAL).await;
        }

        Err(BrowserError::LaunchFailed(format!("{} did not become ready in time", path)))
    }
}

#[async_trait]
impl BrowserLauncher for WebDriverLauncher {
    async fn launch(&self, options: &BrowserOptions) -> Result<BrowserHandle> {
        let browser = options.browser_name().unwrap_or_else(|| "chrome".to_string());
        let capabilities = build_capabilities(options, sandbox_disabled());

        let (base_url, driver_process) = match &options.grid_url {
            Some(grid) => (grid_base_url(grid)?, None),
            None => {
                let (child, base_url) = self.spawn_driver(&browser).await?;
                (base_url, Some(child))
            }
        };

        let session_id = self.create_session(&base_url, capabilities).await?;
        log::info!("Started {} session {} at {}", browser, session_id, base_url);

        let session = WebDriverSession::new(self.client.clone(), base_url, session_id, driver_process);

        if let Some(size) = options.window_size {
            if !sizes_via_arguments(&browser) {
                session
                    .post("window/rect", json!({ "width": size.width, "height": size.height }))
                    .await?;
            }
        }

        Ok(Arc::new(session))
    }

    async fn attach(&self, descriptor: &SessionDescriptor) -> Result<BrowserHandle> {
        let base_url = descriptor.session_opts.base_url();
        url::Url::parse(&base_url).map_err(|e| BrowserError::AttachFailed {
            session_id: descriptor.session_id.clone(),
            reason: format!("invalid WebDriver address {}: {}", base_url, e),
        })?;

        log::info!("Attaching to session {} at {}", descriptor.session_id, base_url);
        Ok(Arc::new(WebDriverSession::new(
            self.client.clone(),
            base_url,
            descriptor.session_id.clone(),
            None,
        )))
    }
}

async fn free_port() -> Result<u16> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    Ok(listener.local_addr()?.port())
}

/// Validate a grid URL and normalize it to end with `/`
pub fn grid_base_url(grid: &str) -> Result<String> {
    let invalid = |reason: String| BrowserError::InvalidGridUrl {
        url: grid.to_string(),
        reason,
    };

    let parsed = url::Url::parse(grid).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme \"{}\"", parsed.scheme())));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }

    let mut base = parsed.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Ok(base)
}

fn sizes_via_arguments(browser: &str) -> bool {
    matches!(browser, "chrome" | "chromium" | "firefox")
}

/// Merge launch options into the user's capability bag
pub fn build_capabilities(options: &BrowserOptions, disable_sandbox: bool) -> Map<String, Value> {
    let mut caps = options.desired_capabilities.clone().unwrap_or_default();
    let browser = options.browser_name().unwrap_or_else(|| "chrome".to_string());
    caps.entry("browserName").or_insert_with(|| json!("chrome"));

    let mut args = Vec::new();
    let options_key = match browser.as_str() {
        "chrome" | "chromium" => {
            if options.headless {
                args.push("--headless=new".to_string());
            }
            if let Some(size) = options.window_size {
                args.push(format!("--window-size={},{}", size.width, size.height));
            }
            if disable_sandbox {
                args.push("--no-sandbox".to_string());
                args.push("--disable-dev-shm-usage".to_string());
            }
            "goog:chromeOptions"
        }
        "firefox" => {
            if options.headless {
                args.push("-headless".to_string());
            }
            if let Some(size) = options.window_size {
                args.push("--width".to_string());
                args.push(size.width.to_string());
                args.push("--height".to_string());
                args.push(size.height.to_string());
            }
            "moz:firefoxOptions"
        }
        _ => return caps,
    };

    if args.is_empty() {
        return caps;
    }

    let vendor = caps.entry(options_key).or_insert_with(|| json!({}));
    if !vendor.is_object() {
        *vendor = json!({});
    }
    if let Some(vendor) = vendor.as_object_mut() {
        let existing = vendor.entry("args").or_insert_with(|| json!([]));
        if !existing.is_array() {
            *existing = json!([]);
        }
        if let Some(existing) = existing.as_array_mut() {
            for arg in args {
                if !existing.iter().any(|a| a.as_str() == Some(arg.as_str())) {
                    existing.push(Value::String(arg));
                }
            }
        }
    }

    caps
}
