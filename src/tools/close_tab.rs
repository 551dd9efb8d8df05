use crate::browser::BrowserDriver;
use crate::error::{BrowserError, Result};
use crate::responses::helpers::list_tabs;
use crate::responses::{StateReport, ToolResponse, browser_state};
use crate::tools::{Tool, ToolContext, check_tab_number, failure, not_launched};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the closeTab tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloseTabParams {
    /// The number of the tab to close (starting from 1). If not provided,
    /// closes the current tab
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1))]
    pub tab_number: Option<usize>,
}

/// Tool for closing one tab
#[derive(Default)]
pub struct CloseTabTool;

#[async_trait]
impl Tool for CloseTabTool {
    type Params = CloseTabParams;

    fn name(&self) -> &str {
        "closeTab"
    }

    async fn execute_typed(&self, params: CloseTabParams, context: &mut ToolContext<'_>) -> Result<ToolResponse> {
        if let Some(tab_number) = params.tab_number {
            check_tab_number(self.name(), tab_number)?;
        }

        if !context.browser.is_active().await {
            return Ok(not_launched("Cannot close tab"));
        }

        let browser = match context.browser.get().await {
            Ok(browser) => browser,
            Err(e) => return failure("Error closing tab", e),
        };

        close(browser.as_ref(), params.tab_number)
            .await
            .or_else(|e| failure("Error closing tab", e))
    }
}

async fn close(browser: &dyn BrowserDriver, tab_number: Option<usize>) -> Result<ToolResponse> {
    let handles = browser.window_handles().await?;
    match handles.len() {
        0 => return Ok(ToolResponse::error("Cannot close tab — no tabs are currently open", None)),
        1 => {
            return Ok(ToolResponse::error(
                "Cannot close tab — this is the last remaining tab. Use \"closeBrowser\" command to close the entire browser session.",
                None,
            ));
        }
        _ => {}
    }

    let current = browser.window_handle().await?;
    let current_number = handles.iter().position(|h| *h == current).map(|i| i + 1);

    let target_number = match tab_number {
        Some(number) if number > handles.len() => {
            let err = BrowserError::TabOutOfRange {
                number,
                available: handles.len(),
            };
            return Ok(ToolResponse::error(format!("Cannot close tab — {}", err), None));
        }
        Some(number) => number,
        None => current_number.unwrap_or(1),
    };

    let tabs = list_tabs(browser).await?;
    let (title, url) = tabs
        .get(target_number - 1)
        .map(|tab| (tab.title.clone(), tab.url.clone()))
        .unwrap_or_default();

    browser.switch_to_window(&handles[target_number - 1]).await?;
    browser.close_window().await?;

    // An explicit other tab returns focus where it was; closing the focused
    // tab moves focus to the first remaining one.
    if tab_number.is_some() && current_number != Some(target_number) {
        browser.switch_to_window(&current).await?;
    } else {
        let remaining = browser.window_handles().await?;
        if let Some(first) = remaining.first() {
            browser.switch_to_window(first).await?;
        }
    }

    let code = if tab_number.is_some() {
        format!(
            "// Close specific tab by number\n\
             const windowHandles = await browser.getWindowHandles();\n\
             await browser.switchToWindow(windowHandles[{}]);\n\
             await browser.closeWindow();",
            target_number - 1
        )
    } else {
        "// Close current tab\nawait browser.closeWindow();".to_string()
    };

    Ok(browser_state(
        browser,
        StateReport::new(format!("Closed tab {}: {} (URL: {})", target_number, title, url))
            .code(code)
            .without_snapshot(),
    )
    .await)
}
