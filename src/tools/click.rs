use crate::error::Result;
use crate::locator::Locator;
use crate::responses::{StateReport, ToolResponse, element_state};
use crate::tools::utils::chain_call;
use crate::tools::{ElementParams, Tool, ToolContext, element_failure};
use async_trait::async_trait;

/// Tool for clicking elements
#[derive(Default)]
pub struct ClickTool;

#[async_trait]
impl Tool for ClickTool {
    type Params = ElementParams;

    fn name(&self) -> &str {
        "clickOnElement"
    }

    async fn execute_typed(&self, params: ElementParams, context: &mut ToolContext<'_>) -> Result<ToolResponse> {
        let locator = Locator::try_from(params.locator)?;

        let browser = match context.browser.get().await {
            Ok(browser) => browser,
            Err(e) => return element_failure("Error clicking element", e),
        };

        let found = match context.resolver.find_element(browser.as_ref(), &locator).await {
            Ok(found) => found,
            Err(e) => return element_failure("Error clicking element", e),
        };

        if let Err(e) = browser.click(&found.element).await {
            return element_failure("Error clicking element", e);
        }

        Ok(element_state(
            browser.as_ref(),
            &found.element,
            StateReport::new(format!("Successfully clicked element found by {}", found.query_description))
                .code(chain_call(&found.generated_code, "click()")),
        )
        .await)
    }
}
