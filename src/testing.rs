//! In-memory providers for unit tests.

use crate::browser::config::{BrowserOptions, SessionDescriptor};
use crate::browser::context::BrowserContext;
use crate::browser::driver::{BrowserDriver, BrowserHandle, BrowserLauncher, ElementRef};
use crate::error::{BrowserError, Result};
use crate::locator::{QueryOptions, QueryProvider, QueryType, Selector};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

static NEXT_SESSION: AtomicUsize = AtomicUsize::new(1);

#[derive(Debug, Clone)]
pub struct FakeTab {
    pub handle: String,
    pub title: String,
    pub url: String,
}

#[derive(Default)]
struct DriverState {
    alive: bool,
    tabs: Vec<FakeTab>,
    current: String,
    next_tab: usize,
    elements: HashMap<String, String>,
    hidden: HashSet<String>,
    scripts: Vec<(String, std::result::Result<Value, String>)>,
    fail_delete: bool,
    fail_page_source: bool,
    fail_handles: bool,
    unswitchable: HashSet<String>,
    stale: HashSet<String>,
    deletes: usize,
    actions: Vec<String>,
}

/// Scriptable browser session
#[derive(Clone)]
pub struct FakeDriver {
    session_id: String,
    state: Arc<Mutex<DriverState>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        let id = format!("fake-{}", NEXT_SESSION.fetch_add(1, Ordering::SeqCst));
        Self::with_id(&id)
    }

    pub fn with_id(session_id: &str) -> Self {
        let state = DriverState {
            alive: true,
            tabs: vec![FakeTab {
                handle: "tab-1".into(),
                title: String::new(),
                url: "about:blank".into(),
            }],
            current: "tab-1".into(),
            next_tab: 2,
            ..Default::default()
        };
        Self {
            session_id: session_id.to_string(),
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// A session that fails every command
    pub fn dead(session_id: &str) -> Self {
        let driver = Self::with_id(session_id);
        driver.kill();
        driver
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DriverState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn with_element(self, selector: &str, id: &str) -> Self {
        self.lock().elements.insert(selector.to_string(), id.to_string());
        self
    }

    pub fn with_hidden(self, id: &str) -> Self {
        self.lock().hidden.insert(id.to_string());
        self
    }

    /// Answer scripts containing `needle`
    pub fn with_script(self, needle: &str, result: std::result::Result<Value, String>) -> Self {
        self.lock().scripts.push((needle.to_string(), result));
        self
    }

    /// Add a background tab
    pub fn with_tab(self, title: &str, url: &str) -> Self {
        {
            let mut state = self.lock();
            let handle = format!("tab-{}", state.next_tab);
            state.next_tab += 1;
            state.tabs.push(FakeTab {
                handle,
                title: title.to_string(),
                url: url.to_string(),
            });
        }
        self
    }

    /// Set title and URL of the focused tab
    pub fn with_page(self, title: &str, url: &str) -> Self {
        {
            let mut state = self.lock();
            let current = state.current.clone();
            if let Some(tab) = state.tabs.iter_mut().find(|t| t.handle == current) {
                tab.title = title.to_string();
                tab.url = url.to_string();
            }
        }
        self
    }

    pub fn failing_delete(self) -> Self {
        self.lock().fail_delete = true;
        self
    }

    pub fn failing_page_source(self) -> Self {
        self.lock().fail_page_source = true;
        self
    }

    pub fn failing_handles(self) -> Self {
        self.lock().fail_handles = true;
        self
    }

    /// Make switching to `handle` fail
    pub fn failing_switch_to(self, handle: &str) -> Self {
        self.lock().unswitchable.insert(handle.to_string());
        self
    }

    /// Detach element `id` from the page; later checks on it fail as stale
    pub fn set_stale(&self, id: &str) {
        self.lock().stale.insert(id.to_string());
    }

    pub fn set_element(&self, selector: &str, id: Option<&str>) {
        let mut state = self.lock();
        match id {
            Some(id) => {
                state.elements.insert(selector.to_string(), id.to_string());
            }
            None => {
                state.elements.remove(selector);
            }
        }
    }

    pub fn kill(&self) {
        self.lock().alive = false;
    }

    pub fn delete_count(&self) -> usize {
        self.lock().deletes
    }

    pub fn actions(&self) -> Vec<String> {
        self.lock().actions.clone()
    }

    pub fn tabs(&self) -> Vec<FakeTab> {
        self.lock().tabs.clone()
    }

    pub fn current_handle(&self) -> String {
        self.lock().current.clone()
    }

    fn check_alive(&self) -> Result<()> {
        if self.lock().alive {
            Ok(())
        } else {
            Err(BrowserError::ConnectionFailed("session is gone".to_string()))
        }
    }

    fn current_tab(&self) -> Result<FakeTab> {
        self.check_alive()?;
        let state = self.lock();
        state
            .tabs
            .iter()
            .find(|t| t.handle == state.current)
            .cloned()
            .ok_or_else(|| BrowserError::WebDriver {
                command: "window".into(),
                error: "no such window".into(),
                message: "focused tab was closed".into(),
            })
    }

    fn record(&self, action: String) -> Result<()> {
        self.check_alive()?;
        self.lock().actions.push(action);
        Ok(())
    }
}

#[async_trait]
impl BrowserDriver for FakeDriver {
    fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.current_tab()?.url)
    }

    async fn title(&self) -> Result<String> {
        Ok(self.current_tab()?.title)
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.current_tab()?;
        let mut state = self.lock();
        let current = state.current.clone();
        if let Some(tab) = state.tabs.iter_mut().find(|t| t.handle == current) {
            tab.url = url.to_string();
            tab.title = format!("Title of {}", url);
        }
        Ok(())
    }

    async fn window_handles(&self) -> Result<Vec<String>> {
        self.check_alive()?;
        let state = self.lock();
        if state.fail_handles {
            return Err(BrowserError::TabOperationFailed("handles unavailable".into()));
        }
        Ok(state.tabs.iter().map(|t| t.handle.clone()).collect())
    }

    async fn window_handle(&self) -> Result<String> {
        Ok(self.current_tab()?.handle)
    }

    async fn switch_to_window(&self, handle: &str) -> Result<()> {
        self.check_alive()?;
        let mut state = self.lock();
        if !state.tabs.iter().any(|t| t.handle == handle) || state.unswitchable.contains(handle) {
            return Err(BrowserError::TabOperationFailed(format!("no such window {}", handle)));
        }
        state.current = handle.to_string();
        Ok(())
    }

    async fn close_window(&self) -> Result<()> {
        self.current_tab()?;
        let mut state = self.lock();
        let current = state.current.clone();
        state.tabs.retain(|t| t.handle != current);
        Ok(())
    }

    async fn new_window(&self) -> Result<String> {
        self.check_alive()?;
        let mut state = self.lock();
        let handle = format!("tab-{}", state.next_tab);
        state.next_tab += 1;
        state.tabs.push(FakeTab {
            handle: handle.clone(),
            title: String::new(),
            url: "about:blank".into(),
        });
        Ok(handle)
    }

    async fn page_source(&self) -> Result<String> {
        self.check_alive()?;
        if self.lock().fail_page_source {
            return Err(BrowserError::ScriptFailed("page source unavailable".into()));
        }
        Ok("<html><body><h1>Fake</h1></body></html>".to_string())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.check_alive()?;
        Ok(vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a])
    }

    async fn find_element(&self, selector: &Selector) -> Result<Option<ElementRef>> {
        self.check_alive()?;
        Ok(self.lock().elements.get(selector.value()).map(ElementRef::new))
    }

    async fn execute_script(&self, script: &str, _args: Vec<Value>) -> Result<Value> {
        self.check_alive()?;
        let state = self.lock();
        match state.scripts.iter().find(|(needle, _)| script.contains(needle.as_str())) {
            Some((_, Ok(value))) => Ok(value.clone()),
            Some((_, Err(message))) => Err(BrowserError::ScriptFailed(message.clone())),
            None => Err(BrowserError::ScriptFailed("script not supported".into())),
        }
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        self.record(format!("click {}", element.id()))
    }

    async fn hover(&self, element: &ElementRef) -> Result<()> {
        self.record(format!("hover {}", element.id()))
    }

    async fn set_value(&self, element: &ElementRef, text: &str) -> Result<()> {
        self.record(format!("type {} {}", element.id(), text))
    }

    async fn is_displayed(&self, element: &ElementRef) -> Result<bool> {
        self.check_alive()?;
        let state = self.lock();
        if state.stale.contains(element.id()) {
            return Err(BrowserError::WebDriver {
                command: "element/displayed".into(),
                error: "stale element reference".into(),
                message: format!("element {} is not attached to the page document", element.id()),
            });
        }
        Ok(!state.hidden.contains(element.id()))
    }

    async fn outer_html(&self, element: &ElementRef) -> Result<String> {
        self.check_alive()?;
        Ok(format!("<button id=\"{}\">Go</button>", element.id()))
    }

    async fn delete_session(&self) -> Result<()> {
        let mut state = self.lock();
        state.deletes += 1;
        state.alive = false;
        if state.fail_delete {
            return Err(BrowserError::ConnectionFailed("delete failed".into()));
        }
        Ok(())
    }
}

#[derive(Default)]
struct LauncherState {
    drivers: VecDeque<FakeDriver>,
    attach_driver: Option<FakeDriver>,
    fail_launch: Option<String>,
    fail_attach: Option<String>,
    launched: Vec<BrowserOptions>,
}

/// Launcher handing out [`FakeDriver`]s
#[derive(Clone, Default)]
pub struct FakeLauncher {
    state: Arc<Mutex<LauncherState>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LauncherState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a driver for the next launch
    pub fn with_driver(self, driver: FakeDriver) -> Self {
        self.lock().drivers.push_back(driver);
        self
    }

    pub fn with_attach_driver(self, driver: FakeDriver) -> Self {
        self.lock().attach_driver = Some(driver);
        self
    }

    pub fn failing_launch(self, message: &str) -> Self {
        self.lock().fail_launch = Some(message.to_string());
        self
    }

    pub fn failing_attach(self, message: &str) -> Self {
        self.lock().fail_attach = Some(message.to_string());
        self
    }

    pub fn launch_count(&self) -> usize {
        self.lock().launched.len()
    }

    pub fn launched_options(&self) -> Vec<BrowserOptions> {
        self.lock().launched.clone()
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self, options: &BrowserOptions) -> Result<BrowserHandle> {
        let mut state = self.lock();
        if let Some(message) = &state.fail_launch {
            return Err(BrowserError::LaunchFailed(message.clone()));
        }
        state.launched.push(options.clone());
        let driver = state.drivers.pop_front().unwrap_or_default();
        Ok(Arc::new(driver))
    }

    async fn attach(&self, session: &SessionDescriptor) -> Result<BrowserHandle> {
        let mut state = self.lock();
        if let Some(message) = &state.fail_attach {
            return Err(BrowserError::ConnectionFailed(message.clone()));
        }
        let driver = state
            .attach_driver
            .take()
            .unwrap_or_else(|| FakeDriver::with_id(&session.session_id));
        Ok(Arc::new(driver))
    }
}

impl Default for FakeDriver {
    fn default() -> Self {
        Self::new()
    }
}

/// Query provider returning a fixed result set
#[derive(Clone)]
pub struct FakeQueries {
    results: Vec<ElementRef>,
    calls: Arc<AtomicUsize>,
}

impl FakeQueries {
    pub fn returning(results: Vec<ElementRef>) -> Self {
        Self {
            results,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryProvider for FakeQueries {
    async fn query_all(
        &self,
        _driver: &dyn BrowserDriver,
        _query_type: QueryType,
        _value: &str,
        _options: Option<&QueryOptions>,
    ) -> Result<Vec<ElementRef>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.results.clone())
    }
}

/// Context over `launcher` with default options
pub fn context_with(launcher: &FakeLauncher) -> BrowserContext {
    BrowserContext::new(Arc::new(launcher.clone()), BrowserOptions::new())
}

/// Context whose browser is already running on `driver`
pub async fn running_context(driver: &FakeDriver) -> BrowserContext {
    let launcher = FakeLauncher::new().with_driver(driver.clone());
    let mut context = context_with(&launcher);
    context.get().await.expect("fake launch");
    context
}
