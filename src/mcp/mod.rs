//! MCP (Model Context Protocol) server implementation for browser automation
//!
//! This module exposes the tools of [`crate::tools`] through rmcp. Each MCP
//! tool forwards its arguments to the [`ToolRegistry`](crate::tools::ToolRegistry)
//! under the shared browser lock.

pub mod handler;
pub use handler::BrowserServer;

use crate::dom::SnapshotOptions;
use crate::responses::ToolResponse;
use crate::tools::{
    AttachToBrowserParams, CloseTabParams, ElementParams, LaunchBrowserParams, NavigateParams, NoParams,
    OpenNewTabParams, ScreenshotParams, SwitchTabParams, ToolContext, TypeParams, WaitForElementParams,
};
use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    tool, tool_router,
};
use serde::Serialize;

/// Convert a tool response to an MCP result
fn convert_result(response: ToolResponse) -> CallToolResult {
    if response.is_error {
        CallToolResult::error(vec![Content::text(response.text)])
    } else {
        CallToolResult::success(vec![Content::text(response.text)])
    }
}

impl BrowserServer {
    /// Run a registered tool against the shared browser context
    async fn run(&self, name: &str, params: impl Serialize) -> Result<CallToolResult, McpError> {
        let params = serde_json::to_value(params).map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        let mut browser = self.browser.lock().await;
        let mut context = ToolContext::new(&mut browser, &self.resolver);

        match self.registry.execute(name, params, &mut context).await {
            Ok(response) => Ok(convert_result(response)),
            Err(e) if e.is_validation() => Err(McpError::invalid_params(e.to_string(), None)),
            Err(e) => {
                log::error!("Tool {} failed: {}", name, e);
                Ok(convert_result(ToolResponse::error(format!("Tool {} failed", name), Some(&e))))
            }
        }
    }
}

#[tool_router]
impl BrowserServer {
    #[tool(name = "navigate", description = "Open a URL in the browser")]
    async fn navigate(&self, Parameters(params): Parameters<NavigateParams>) -> Result<CallToolResult, McpError> {
        self.run("navigate", params).await
    }

    #[tool(
        name = "launchBrowser",
        description = "Launch a new browser session with custom desired capabilities. Avoid using this tool unless the user explicitly requests a custom browser configuration; browsers are launched automatically for commands like navigate to URL. Only Chrome and Firefox drivers are managed locally, for other browsers you MUST ensure that a driver is running and provide it as custom gridUrl."
    )]
    async fn launch_browser(
        &self,
        Parameters(params): Parameters<LaunchBrowserParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("launchBrowser", params).await
    }

    #[tool(name = "attachToBrowser", description = "Attach to existing browser session")]
    async fn attach_to_browser(
        &self,
        Parameters(params): Parameters<AttachToBrowserParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("attachToBrowser", params).await
    }

    #[tool(name = "closeBrowser", description = "Close the current browser session")]
    async fn close_browser(&self) -> Result<CallToolResult, McpError> {
        self.run("closeBrowser", NoParams {}).await
    }

    #[tool(
        name = "clickOnElement",
        description = "Click an element on the page.\n\nPREFERRED APPROACH (for AI agents): Use semantic queries (queryType + queryValue) which are more robust and accessibility-focused:\n- queryType=\"role\" + queryValue=\"button\" + queryOptions.name=\"Submit\" finds the submit button\n- queryType=\"text\" + queryValue=\"Click here\" finds the element containing that text\n- queryType=\"labelText\" + queryValue=\"Email\" finds the input with the Email label\n\nFALLBACK APPROACH: Use selector only when semantic queries cannot locate the element:\n- selector=\"button.submit-btn\" is a CSS selector\n- selector=\"//button[text()='Submit']\" is an XPath"
    )]
    async fn click_on_element(
        &self,
        Parameters(params): Parameters<ElementParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("clickOnElement", params).await
    }

    #[tool(name = "hoverElement", description = "Hover an element on the page.")]
    async fn hover_element(&self, Parameters(params): Parameters<ElementParams>) -> Result<CallToolResult, McpError> {
        self.run("hoverElement", params).await
    }

    #[tool(name = "typeIntoElement", description = "Type text into an element on the page.")]
    async fn type_into_element(
        &self,
        Parameters(params): Parameters<TypeParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("typeIntoElement", params).await
    }

    #[tool(
        name = "takePageSnapshot",
        description = "Capture a DOM snapshot of the current page. Note: by default, only useful tags and attributes are included. Prefer to use defaults. Response contains info as to what was omitted. If you need more info, request a snapshot with more tags and attributes."
    )]
    async fn take_page_snapshot(
        &self,
        Parameters(params): Parameters<SnapshotOptions>,
    ) -> Result<CallToolResult, McpError> {
        self.run("takePageSnapshot", params).await
    }

    #[tool(
        name = "takeViewportScreenshot",
        description = "Capture a PNG screenshot of the current browser viewport. Strongly prefer capturing text-based snapshots using takePageSnapshot tool. Only use to test for visual changes when text-based snapshots are not useful."
    )]
    async fn take_viewport_screenshot(
        &self,
        Parameters(params): Parameters<ScreenshotParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("takeViewportScreenshot", params).await
    }

    #[tool(
        name = "listTabs",
        description = "Get a list of all currently opened browser tabs with their URLs, titles, and active status"
    )]
    async fn list_tabs(&self) -> Result<CallToolResult, McpError> {
        self.run("listTabs", NoParams {}).await
    }

    #[tool(name = "switchToTab", description = "Switch to a specific browser tab by its number (starting from 1)")]
    async fn switch_to_tab(
        &self,
        Parameters(params): Parameters<SwitchTabParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("switchToTab", params).await
    }

    #[tool(
        name = "closeTab",
        description = "Close a specific browser tab by its number (1-based), or close the current tab if no number is provided"
    )]
    async fn close_tab(&self, Parameters(params): Parameters<CloseTabParams>) -> Result<CallToolResult, McpError> {
        self.run("closeTab", params).await
    }

    #[tool(
        name = "openNewTab",
        description = "Open a new browser tab, optionally navigate to a URL, and automatically switch to it"
    )]
    async fn open_new_tab(
        &self,
        Parameters(params): Parameters<OpenNewTabParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("openNewTab", params).await
    }

    #[tool(
        name = "waitForElement",
        description = "Wait for an element to appear or disappear on the page. Useful for waiting until page loads fully or loading spinners disappear."
    )]
    async fn wait_for_element(
        &self,
        Parameters(params): Parameters<WaitForElementParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run("waitForElement", params).await
    }
}
