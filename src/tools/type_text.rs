use crate::error::Result;
use crate::locator::{Locator, LocatorArgs};
use crate::responses::{StateReport, ToolResponse, element_state};
use crate::tools::utils::{chain_call, js_string};
use crate::tools::{Tool, ToolContext, element_failure};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the typeIntoElement tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TypeParams {
    pub locator: LocatorArgs,

    /// The text to type into the element
    pub text: String,
}

/// Tool for typing text into input elements
#[derive(Default)]
pub struct TypeTool;

#[async_trait]
impl Tool for TypeTool {
    type Params = TypeParams;

    fn name(&self) -> &str {
        "typeIntoElement"
    }

    async fn execute_typed(&self, params: TypeParams, context: &mut ToolContext<'_>) -> Result<ToolResponse> {
        let locator = Locator::try_from(params.locator)?;

        let browser = match context.browser.get().await {
            Ok(browser) => browser,
            Err(e) => return element_failure("Error typing into element", e),
        };

        let found = match context.resolver.find_element(browser.as_ref(), &locator).await {
            Ok(found) => found,
            Err(e) => return element_failure("Error typing into element", e),
        };

        // Replaces the current value
        if let Err(e) = browser.set_value(&found.element, &params.text).await {
            return element_failure("Error typing into element", e);
        }

        Ok(element_state(
            browser.as_ref(),
            &found.element,
            StateReport::new(format!(
                "Successfully typed \"{}\" into element found by {}",
                params.text, found.query_description
            ))
            .code(chain_call(
                &found.generated_code,
                &format!("setValue({})", js_string(&params.text)),
            )),
        )
        .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::ElementResolver;
    use crate::testing::{FakeDriver, running_context};

    #[test]
    fn test_type_params() {
        let params: TypeParams = serde_json::from_value(serde_json::json!({
            "locator": {"strategy": "wdio", "selector": "#email"},
            "text": "user@example.com"
        }))
        .unwrap();
        assert_eq!(params.text, "user@example.com");
        assert_eq!(params.locator.selector.as_deref(), Some("#email"));
    }

    #[tokio::test]
    async fn test_type_into_input() {
        let driver = FakeDriver::new().with_element("#email", "input-1");
        let mut browser = running_context(&driver).await;
        let resolver = ElementResolver::default();
        let mut context = ToolContext::new(&mut browser, &resolver);

        let response = TypeTool
            .execute_typed(
                TypeParams {
                    locator: Locator::selector("#email").into(),
                    text: "user@example.com".into(),
                },
                &mut context,
            )
            .await
            .unwrap();

        assert!(response
            .text
            .starts_with("✅ Successfully typed \"user@example.com\" into element found by CSS selector \"#email\""));
        assert!(response.text.contains("await browser.$(\"#email\").setValue(\"user@example.com\");"));
        assert_eq!(driver.actions(), vec!["type input-1 user@example.com"]);
    }
}
