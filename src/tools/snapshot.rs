use crate::dom::SnapshotOptions;
use crate::error::Result;
use crate::responses::{StateReport, ToolResponse, browser_state};
use crate::tools::{Tool, ToolContext, failure};
use async_trait::async_trait;

/// Tool for capturing a DOM snapshot of the current page
#[derive(Default)]
pub struct SnapshotTool;

#[async_trait]
impl Tool for SnapshotTool {
    type Params = SnapshotOptions;

    fn name(&self) -> &str {
        "takePageSnapshot"
    }

    async fn execute_typed(&self, params: SnapshotOptions, context: &mut ToolContext<'_>) -> Result<ToolResponse> {
        let browser = match context.browser.get().await {
            Ok(browser) => browser,
            Err(e) => return failure("Error taking page snapshot", e),
        };

        let options = serde_json::to_string_pretty(&params)?;

        Ok(browser_state(
            browser.as_ref(),
            StateReport::new("Page snapshot captured successfully")
                .code(format!(
                    "const snapshot = await browser.unstable_captureDomSnapshot({});",
                    options
                ))
                .snapshot(params),
        )
        .await)
    }
}
