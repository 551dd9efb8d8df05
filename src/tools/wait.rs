use crate::browser::BrowserDriver;
use crate::error::{BrowserError, Result};
use crate::locator::{ElementResolver, Locator, LocatorArgs};
use crate::responses::{StateReport, ToolResponse, action_only, browser_state};
use crate::tools::utils::js_string;
use crate::tools::{Tool, ToolContext, element_failure};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{Instant, sleep};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Parameters for the waitForElement tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WaitForElementParams {
    pub locator: LocatorArgs,

    /// Whether to wait for element to disappear. Default: false (wait for element to appear)
    #[serde(default)]
    pub disappear: bool,

    /// Maximum time to wait in milliseconds. Default: 3000
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Whether to include page snapshot in response. Default: true
    #[serde(default = "default_include_snapshot")]
    pub include_snapshot_in_response: bool,
}

fn default_timeout() -> u64 {
    3000
}

fn default_include_snapshot() -> bool {
    true
}

/// Tool for waiting until an element appears or disappears
#[derive(Default)]
pub struct WaitForElementTool;

#[async_trait]
impl Tool for WaitForElementTool {
    type Params = WaitForElementParams;

    fn name(&self) -> &str {
        "waitForElement"
    }

    async fn execute_typed(&self, params: WaitForElementParams, context: &mut ToolContext<'_>) -> Result<ToolResponse> {
        let locator = Locator::try_from(params.locator)?;
        let action = if params.disappear { "disappear" } else { "appear" };

        let browser = match context.browser.get().await {
            Ok(browser) => browser,
            Err(e) => return element_failure("Error waiting for element", e),
        };

        let description = match poll_until(
            context.resolver,
            browser.as_ref(),
            &locator,
            !params.disappear,
            Duration::from_millis(params.timeout),
        )
        .await
        {
            Ok(description) => description,
            Err(BrowserError::WaitTimeout { action, .. }) => {
                return Ok(ToolResponse::error(
                    format!(
                        "Timeout waiting for element to {}. Consider increasing the timeout value or checking if the element behavior is as expected.",
                        action
                    ),
                    None,
                ));
            }
            Err(e) => return element_failure("Error waiting for element", e),
        };
        log::info!("Element with {} did {} in time", description, action);

        let report = StateReport::new(format!(
            "Successfully waited for element found by {} to {}",
            description, action
        ))
        .code(wait_code(&locator, params.disappear, params.timeout));

        if params.include_snapshot_in_response {
            Ok(browser_state(browser.as_ref(), report).await)
        } else {
            Ok(action_only(report))
        }
    }
}

/// Poll until the element's visibility equals `displayed`. A missing element
/// counts as not displayed. Returns the locator description.
async fn poll_until(
    resolver: &ElementResolver,
    browser: &dyn BrowserDriver,
    locator: &Locator,
    displayed: bool,
    timeout: Duration,
) -> Result<String> {
    let deadline = Instant::now() + timeout;
    loop {
        let found = resolver.find_element_nullable(browser, locator).await?;
        let visible = match &found.element {
            Some(element) => match browser.is_displayed(element).await {
                Ok(visible) => visible,
                // Removed between lookup and check
                Err(e) if e.is_stale_element() => {
                    log::debug!("Element went stale while waiting: {}", e);
                    false
                }
                Err(e) => return Err(e),
            },
            None => false,
        };
        if visible == displayed {
            return Ok(found.query_description);
        }

        if Instant::now() >= deadline {
            return Err(BrowserError::WaitTimeout {
                action: if displayed { "appear" } else { "disappear" }.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Test code equivalent to the wait
fn wait_code(locator: &Locator, disappear: bool, timeout: u64) -> String {
    match locator {
        Locator::Wdio { selector } => format!(
            "await browser.$({}).waitForDisplayed({});",
            js_string(selector),
            serde_json::json!({ "reverse": disappear, "timeout": timeout })
        ),
        Locator::TestingLibrary {
            query_type,
            query_value,
            query_options,
        } => {
            let options = query_options
                .as_ref()
                .and_then(|o| serde_json::to_string(o).ok())
                .map(|json| format!(", {}", json))
                .unwrap_or_default();
            format!(
                "await browser.waitUntil(async () => {{\n    \
                 const result = await browser.queryBy{}({}{});\n    \
                 return await result.isDisplayed() === {};\n\
                 }}, {{ timeout: {} }});",
                query_type.method_suffix(),
                js_string(query_value),
                options,
                !disappear,
                timeout
            )
        }
    }
}
