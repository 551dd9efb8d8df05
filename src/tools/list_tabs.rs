use crate::error::Result;
use crate::responses::{StateReport, ToolResponse, browser_state};
use crate::tools::{NoParams, Tool, ToolContext, failure, not_launched};
use async_trait::async_trait;

/// Tool for listing open tabs
#[derive(Default)]
pub struct ListTabsTool;

#[async_trait]
impl Tool for ListTabsTool {
    type Params = NoParams;

    fn name(&self) -> &str {
        "listTabs"
    }

    async fn execute_typed(&self, _params: NoParams, context: &mut ToolContext<'_>) -> Result<ToolResponse> {
        if !context.browser.is_active().await {
            return Ok(not_launched("No opened tabs"));
        }

        let browser = match context.browser.get().await {
            Ok(browser) => browser,
            Err(e) => return failure("Error listing browser tabs", e),
        };

        Ok(browser_state(
            browser.as_ref(),
            StateReport::new("Retrieved list of browser tabs").without_snapshot(),
        )
        .await)
    }
}
