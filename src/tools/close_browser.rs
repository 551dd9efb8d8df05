use crate::error::Result;
use crate::responses::ToolResponse;
use crate::tools::{NoParams, Tool, ToolContext};
use async_trait::async_trait;

/// Tool for ending the browser session
#[derive(Default)]
pub struct CloseBrowserTool;

#[async_trait]
impl Tool for CloseBrowserTool {
    type Params = NoParams;

    fn name(&self) -> &str {
        "closeBrowser"
    }

    async fn execute_typed(&self, _params: NoParams, context: &mut ToolContext<'_>) -> Result<ToolResponse> {
        if context.browser.browser().is_none() {
            return Ok(ToolResponse::simple("No active browser session to close", false));
        }

        // A dead handle is dropped too, so the next tool launches afresh
        context.browser.close().await;
        Ok(ToolResponse::simple("Browser session closed successfully", false))
    }
}
