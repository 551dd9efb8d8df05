use crate::browser::BrowserDriver;
use crate::error::Result;
use crate::responses::{StateReport, ToolResponse, browser_state};
use crate::tools::utils::validate_url;
use crate::tools::{Tool, ToolContext, failure};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the openNewTab tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct OpenNewTabParams {
    /// Optional URL to navigate to in the new tab
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Tool for opening a new tab and focusing it
#[derive(Default)]
pub struct OpenNewTabTool;

#[async_trait]
impl Tool for OpenNewTabTool {
    type Params = OpenNewTabParams;

    fn name(&self) -> &str {
        "openNewTab"
    }

    async fn execute_typed(&self, params: OpenNewTabParams, context: &mut ToolContext<'_>) -> Result<ToolResponse> {
        let url = params.url.as_deref().map(validate_url).transpose()?;

        let was_active = context.browser.is_active().await;
        let browser = match context.browser.get().await {
            Ok(browser) => browser,
            Err(e) => return failure("Error opening new tab", e),
        };

        if let Err(e) = open_tab(browser.as_ref(), was_active, url.as_deref()).await {
            return failure("Error opening new tab", e);
        }

        let report = match &url {
            Some(url) => StateReport::new(format!("Opened new tab and navigated to {}", url))
                .code(format!("// Open new tab and navigate to URL\nawait browser.newWindow('{}');", url)),
            None => StateReport::new("Opened new tab").code("// Open new tab\nawait browser.newWindow('about:blank');"),
        };

        Ok(browser_state(browser.as_ref(), report).await)
    }
}

async fn open_tab(browser: &dyn BrowserDriver, was_active: bool, url: Option<&str>) -> Result<()> {
    // A freshly launched browser already has an empty first tab
    if was_active {
        let handle = browser.new_window().await?;
        browser.switch_to_window(&handle).await?;
    }
    if let Some(url) = url {
        browser.navigate(url).await?;
    }
    Ok(())
}
