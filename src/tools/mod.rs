//! Browser automation tools
//!
//! Each tool is a typed operation over the shared [`BrowserContext`]. Tools are
//! registered in a [`ToolRegistry`] and executed by name with JSON parameters,
//! which is how the MCP layer drives them.

pub mod attach_to_browser;
pub mod click;
pub mod close_browser;
pub mod close_tab;
pub mod hover;
pub mod launch_browser;
pub mod list_tabs;
pub mod navigate;
pub mod open_new_tab;
pub mod snapshot;
pub mod screenshot;
pub mod switch_tab;
pub mod type_text;
pub mod utils;
pub mod wait;

pub use attach_to_browser::{AttachToBrowserParams, AttachToBrowserTool};
pub use click::ClickTool;
pub use close_browser::CloseBrowserTool;
pub use close_tab::{CloseTabParams, CloseTabTool};
pub use hover::HoverTool;
pub use launch_browser::{LaunchBrowserParams, LaunchBrowserTool};
pub use list_tabs::ListTabsTool;
pub use navigate::{NavigateParams, NavigateTool};
pub use open_new_tab::{OpenNewTabParams, OpenNewTabTool};
pub use screenshot::{ScreenshotParams, ScreenshotTool};
pub use snapshot::SnapshotTool;
pub use switch_tab::{SwitchTabParams, SwitchTabTool};
pub use type_text::{TypeParams, TypeTool};
pub use wait::{WaitForElementParams, WaitForElementTool};

use crate::browser::BrowserContext;
use crate::error::{BrowserError, Result};
use crate::locator::{ElementResolver, LocatorArgs};
use crate::responses::ToolResponse;
use async_trait::async_trait;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Shared state handed to every tool call
pub struct ToolContext<'a> {
    /// The browser session store
    pub browser: &'a mut BrowserContext,

    /// Locator resolution
    pub resolver: &'a ElementResolver,
}

impl<'a> ToolContext<'a> {
    pub fn new(browser: &'a mut BrowserContext, resolver: &'a ElementResolver) -> Self {
        Self { browser, resolver }
    }
}

/// A browser automation operation with typed parameters
#[async_trait]
pub trait Tool: Send + Sync + Default {
    type Params: DeserializeOwned + JsonSchema + Send;

    /// Tool name as exposed to agents
    fn name(&self) -> &str;

    /// Run the tool. Validation problems are returned as `Err`; anything the
    /// agent can act on is an error-shaped [`ToolResponse`].
    async fn execute_typed(&self, params: Self::Params, context: &mut ToolContext<'_>) -> Result<ToolResponse>;

    /// JSON schema of the parameters
    fn parameters_schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(Self::Params)).unwrap_or_default()
    }
}

/// Object-safe view of [`Tool`] used by the registry
#[async_trait]
pub trait DynTool: Send + Sync {
    fn name(&self) -> &str;

    fn parameters_schema(&self) -> Value;

    async fn execute(&self, params: Value, context: &mut ToolContext<'_>) -> Result<ToolResponse>;
}

#[async_trait]
impl<T: Tool> DynTool for T {
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn parameters_schema(&self) -> Value {
        Tool::parameters_schema(self)
    }

    async fn execute(&self, params: Value, context: &mut ToolContext<'_>) -> Result<ToolResponse> {
        let typed: T::Params = serde_json::from_value(params).map_err(|e| BrowserError::InvalidParams {
            tool: Tool::name(self).to_string(),
            reason: e.to_string(),
        })?;
        self.execute_typed(typed, context).await
    }
}

/// Registry of tools, keyed by name in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Box<dyn DynTool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every browser tool registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(NavigateTool);
        registry.register(LaunchBrowserTool);
        registry.register(AttachToBrowserTool);
        registry.register(CloseBrowserTool);
        registry.register(ClickTool);
        registry.register(HoverTool);
        registry.register(TypeTool);
        registry.register(SnapshotTool);
        registry.register(ScreenshotTool);
        registry.register(ListTabsTool);
        registry.register(SwitchTabTool);
        registry.register(CloseTabTool);
        registry.register(OpenNewTabTool);
        registry.register(WaitForElementTool);
        registry
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = Tool::name(&tool).to_string();
        self.tools.insert(name, Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn DynTool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, params: Value, context: &mut ToolContext<'_>) -> Result<ToolResponse> {
        let tool = self
            .get(name)
            .ok_or_else(|| BrowserError::UnknownTool(name.to_string()))?;

        log::debug!("Executing tool {}", name);
        tool.execute(params, context).await
    }
}

/// Parameters of tools that only take a locator
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ElementParams {
    pub locator: LocatorArgs,
}

/// Parameters of tools that take no input
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NoParams {}

pub(crate) const ELEMENT_NOT_FOUND: &str =
    "Element not found. Try using a different query strategy or check if the element exists on the page.";

/// Map a failed element interaction to a response. Validation errors stay
/// errors; a missing element gets the standard hint.
pub(crate) fn element_failure(prefix: &str, err: BrowserError) -> Result<ToolResponse> {
    if err.is_validation() {
        return Err(err);
    }
    log::warn!("{}: {}", prefix, err);
    if err.is_not_found() {
        return Ok(ToolResponse::error(ELEMENT_NOT_FOUND, None));
    }
    Ok(ToolResponse::error(prefix, Some(&err)))
}

/// Error for tab tools called before any browser exists
pub(crate) fn not_launched(what: &str) -> ToolResponse {
    ToolResponse::error(
        format!("{} — browser is not launched yet. Try opening a tab or navigating to URL.", what),
        None,
    )
}

/// Reject tab numbers below 1
pub(crate) fn check_tab_number(tool: &str, tab_number: usize) -> Result<()> {
    if tab_number == 0 {
        return Err(BrowserError::InvalidParams {
            tool: tool.to_string(),
            reason: "tabNumber must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Map any other failed tool call to a response
pub(crate) fn failure(prefix: &str, err: BrowserError) -> Result<ToolResponse> {
    if err.is_validation() {
        return Err(err);
    }
    log::warn!("{}: {}", prefix, err);
    Ok(ToolResponse::error(prefix, Some(&err)))
}
