use crate::browser::BrowserDriver;
use crate::error::{BrowserError, Result};
use crate::responses::helpers::list_tabs;
use crate::responses::{StateReport, ToolResponse, browser_state};
use crate::tools::{Tool, ToolContext, check_tab_number, failure, not_launched};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the switchToTab tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwitchTabParams {
    /// The number of the tab to switch to (starting from 1)
    #[schemars(range(min = 1))]
    pub tab_number: usize,
}

/// Tool for focusing another tab
#[derive(Default)]
pub struct SwitchTabTool;

#[async_trait]
impl Tool for SwitchTabTool {
    type Params = SwitchTabParams;

    fn name(&self) -> &str {
        "switchToTab"
    }

    async fn execute_typed(&self, params: SwitchTabParams, context: &mut ToolContext<'_>) -> Result<ToolResponse> {
        let tab_number = params.tab_number;
        check_tab_number(self.name(), tab_number)?;

        if !context.browser.is_active().await {
            return Ok(not_launched("Cannot switch to tab"));
        }

        let browser = match context.browser.get().await {
            Ok(browser) => browser,
            Err(e) => return failure("Error switching to tab", e),
        };

        switch_to(browser.as_ref(), tab_number)
            .await
            .or_else(|e| failure("Error switching to tab", e))
    }
}

async fn switch_to(browser: &dyn BrowserDriver, tab_number: usize) -> Result<ToolResponse> {
    let handles = browser.window_handles().await?;
    if handles.is_empty() {
        return Ok(ToolResponse::error("Cannot switch to tab — no tabs are currently open", None));
    }
    if tab_number > handles.len() {
        let err = BrowserError::TabOutOfRange {
            number: tab_number,
            available: handles.len(),
        };
        return Ok(ToolResponse::error(format!("Cannot switch to tab — {}", err), None));
    }

    let index = tab_number - 1;
    let target = &handles[index];
    if *target == browser.window_handle().await? {
        return Ok(browser_state(
            browser,
            StateReport::new(format!("Already on tab {}", tab_number)).without_snapshot(),
        )
        .await);
    }

    browser.switch_to_window(target).await?;
    let tabs = list_tabs(browser).await?;
    let (title, url) = tabs
        .get(index)
        .map(|tab| (tab.title.clone(), tab.url.clone()))
        .unwrap_or_default();

    Ok(browser_state(
        browser,
        StateReport::new(format!("Switched to tab {}: {}, URL: {}", tab_number, title, url))
            .code(format!(
                "// In actual test code, you may want to search for the tab by its name or URL\n\
                 // Switch to tab by index\n\
                 const windowHandles = await browser.getWindowHandles();\n\
                 await browser.switchToWindow(windowHandles[{}]);",
                index
            ))
            .without_snapshot(),
    )
    .await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::ElementResolver;
    use crate::testing::{FakeDriver, FakeLauncher, context_with, running_context};

    async fn switch(driver: &FakeDriver, tab_number: usize) -> Result<ToolResponse> {
        let mut browser = running_context(driver).await;
        let resolver = ElementResolver::default();
        let mut context = ToolContext::new(&mut browser, &resolver);
        SwitchTabTool
            .execute_typed(SwitchTabParams { tab_number }, &mut context)
            .await
    }

    #[tokio::test]
    async fn test_switch_to_second_tab() {
        let driver = FakeDriver::new()
            .with_page("Example Domain", "https://example.com/")
            .with_tab("Docs", "https://docs.rs/");

        let response = switch(&driver, 2).await.unwrap();

        assert!(response.text.starts_with("✅ Switched to tab 2: Docs, URL: https://docs.rs/"));
        assert!(response.text.contains("await browser.switchToWindow(windowHandles[1]);"));
        assert!(response.text.contains("  2. Title: Docs; URL: https://docs.rs/ (current)"));
        assert_eq!(driver.current_handle(), "tab-2");
    }

    #[tokio::test]
    async fn test_already_on_tab() {
        let driver = FakeDriver::new().with_tab("Docs", "https://docs.rs/");

        let response = switch(&driver, 1).await.unwrap();

        assert!(response.text.starts_with("✅ Already on tab 1\n\n## Browser Tabs"));
        assert!(!response.text.contains("## Generated Code"));
    }

    #[tokio::test]
    async fn test_out_of_range() {
        let driver = FakeDriver::new().with_tab("Docs", "https://docs.rs/");

        let response = switch(&driver, 5).await.unwrap();

        assert!(response.is_error);
        assert_eq!(
            response.text,
            "❌ Cannot switch to tab — tab number 5 is out of range. Available range: 1-2"
        );
        assert_eq!(driver.current_handle(), "tab-1");
    }

    #[tokio::test]
    async fn test_zero_rejected() {
        let driver = FakeDriver::new();
        assert!(switch(&driver, 0).await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_switch_without_browser() {
        let launcher = FakeLauncher::new();
        let mut browser = context_with(&launcher);
        let resolver = ElementResolver::default();
        let mut context = ToolContext::new(&mut browser, &resolver);

        let response = SwitchTabTool
            .execute_typed(SwitchTabParams { tab_number: 1 }, &mut context)
            .await
            .unwrap();

        assert!(response.text.starts_with("❌ Cannot switch to tab — browser is not launched yet."));
        assert_eq!(launcher.launch_count(), 0);
    }
}
