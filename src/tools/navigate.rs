use crate::error::Result;
use crate::responses::{StateReport, ToolResponse, browser_state};
use crate::tools::utils::{js_string, validate_url};
use crate::tools::{Tool, ToolContext, failure};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the navigate tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NavigateParams {
    /// The URL to navigate to
    pub url: String,
}

/// Tool for opening a URL in the current tab
#[derive(Default)]
pub struct NavigateTool;

#[async_trait]
impl Tool for NavigateTool {
    type Params = NavigateParams;

    fn name(&self) -> &str {
        "navigate"
    }

    async fn execute_typed(&self, params: NavigateParams, context: &mut ToolContext<'_>) -> Result<ToolResponse> {
        let url = validate_url(&params.url)?;

        let browser = match context.browser.get().await {
            Ok(browser) => browser,
            Err(e) => return failure("Error navigating to URL", e),
        };

        log::info!("Navigating to {}", url);
        if let Err(e) = browser.navigate(&url).await {
            return failure("Error navigating to URL", e);
        }

        Ok(browser_state(
            browser.as_ref(),
            StateReport::new(format!("Successfully navigated to {}", url))
                .code(format!("await browser.openAndWait({});", js_string(&url))),
        )
        .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{BrowserContext, BrowserOptions};
    use crate::error::BrowserError;
    use crate::locator::ElementResolver;
    use crate::testing::{FakeDriver, FakeLauncher};
    use std::sync::Arc;

    #[test]
    fn test_navigate_params() {
        let params: NavigateParams = serde_json::from_value(serde_json::json!({
            "url": "https://example.com"
        }))
        .unwrap();
        assert_eq!(params.url, "https://example.com");
    }

    #[test]
    fn test_navigate_tool_metadata() {
        let tool = NavigateTool;
        assert_eq!(tool.name(), "navigate");
        assert!(tool.parameters_schema().is_object());
    }

    #[tokio::test]
    async fn test_navigate_launches_lazily() {
        let driver = FakeDriver::new();
        let launcher = FakeLauncher::new().with_driver(driver.clone());
        let mut browser = BrowserContext::new(Arc::new(launcher.clone()), BrowserOptions::new());
        let resolver = ElementResolver::default();
        let mut context = ToolContext::new(&mut browser, &resolver);

        let response = NavigateTool
            .execute_typed(
                NavigateParams {
                    url: "https://example.com/".into(),
                },
                &mut context,
            )
            .await
            .unwrap();

        assert_eq!(launcher.launch_count(), 1);
        assert!(!response.is_error);
        assert!(response.text.starts_with("✅ Successfully navigated to https://example.com/"));
        assert!(response.text.contains("await browser.openAndWait(\"https://example.com/\");"));
        assert!(response.text.contains("Title: Title of https://example.com/; URL: https://example.com/ (current)"));
    }

    #[tokio::test]
    async fn test_navigate_rejects_relative_url() {
        let launcher = FakeLauncher::new();
        let mut browser = BrowserContext::new(Arc::new(launcher.clone()), BrowserOptions::new());
        let resolver = ElementResolver::default();
        let mut context = ToolContext::new(&mut browser, &resolver);

        let err = NavigateTool
            .execute_typed(NavigateParams { url: "example.com".into() }, &mut context)
            .await
            .unwrap_err();

        assert!(matches!(err, BrowserError::InvalidUrl { .. }));
        assert_eq!(launcher.launch_count(), 0);
    }

    #[tokio::test]
    async fn test_navigate_launch_failure_is_error_result() {
        let launcher = FakeLauncher::new().failing_launch("chromedriver not found");
        let mut browser = BrowserContext::new(Arc::new(launcher), BrowserOptions::new());
        let resolver = ElementResolver::default();
        let mut context = ToolContext::new(&mut browser, &resolver);

        let response = NavigateTool
            .execute_typed(
                NavigateParams {
                    url: "https://example.com".into(),
                },
                &mut context,
            )
            .await
            .unwrap();

        assert!(response.is_error);
        assert!(response.text.starts_with("❌ Error navigating to URL: "));
        assert!(response.text.contains("chromedriver not found"));
    }
}
