use crate::error::Result;
use crate::locator::Locator;
use crate::responses::{StateReport, ToolResponse, element_state};
use crate::tools::utils::chain_call;
use crate::tools::{ElementParams, Tool, ToolContext, element_failure};
use async_trait::async_trait;

/// Tool for moving the pointer over an element
#[derive(Default)]
pub struct HoverTool;

#[async_trait]
impl Tool for HoverTool {
    type Params = ElementParams;

    fn name(&self) -> &str {
        "hoverElement"
    }

    async fn execute_typed(&self, params: ElementParams, context: &mut ToolContext<'_>) -> Result<ToolResponse> {
        let locator = Locator::try_from(params.locator)?;

        let browser = match context.browser.get().await {
            Ok(browser) => browser,
            Err(e) => return element_failure("Error hover element", e),
        };

        let found = match context.resolver.find_element(browser.as_ref(), &locator).await {
            Ok(found) => found,
            Err(e) => return element_failure("Error hover element", e),
        };

        if let Err(e) = browser.hover(&found.element).await {
            return element_failure("Error hover element", e);
        }

        Ok(element_state(
            browser.as_ref(),
            &found.element,
            StateReport::new(format!("Successfully hovered element found by {}", found.query_description))
                .code(chain_call(&found.generated_code, "moveTo()")),
        )
        .await)
    }
}
