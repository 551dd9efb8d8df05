use crate::browser::{BrowserOptions, SessionDescriptor};
use crate::error::Result;
use crate::responses::ToolResponse;
use crate::tools::{Tool, ToolContext, failure};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the attachToBrowser tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AttachToBrowserParams {
    /// Session JSON printed by a test run that kept its browser open
    pub session: SessionDescriptor,
}

/// Tool for taking over an already running WebDriver session
#[derive(Default)]
pub struct AttachToBrowserTool;

#[async_trait]
impl Tool for AttachToBrowserTool {
    type Params = AttachToBrowserParams;

    fn name(&self) -> &str {
        "attachToBrowser"
    }

    async fn execute_typed(&self, params: AttachToBrowserParams, context: &mut ToolContext<'_>) -> Result<ToolResponse> {
        context.browser.replace(None).await;
        context.browser.set_options(BrowserOptions::default());
        context.browser.set_session(params.session);

        if let Err(e) = context.browser.get().await {
            return failure("Error attach to browser", e);
        }

        if !context.browser.is_active().await {
            return Ok(ToolResponse::error(
                "Can not attach to browser using existing session options",
                None,
            ));
        }

        Ok(ToolResponse::simple("Successfully attached to existing browser session", false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::ElementResolver;
    use crate::testing::{FakeDriver, FakeLauncher, context_with, running_context};
    use serde_json::json;

    fn params() -> AttachToBrowserParams {
        serde_json::from_value(json!({
            "session": {
                "sessionId": "4f1c2a",
                "sessionCaps": {"browserName": "chrome", "browserVersion": "126.0", "setWindowRect": true},
                "sessionOpts": {"protocol": "http", "hostname": "127.0.0.1", "port": 9515, "path": "/"}
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_attach_success() {
        let launcher = FakeLauncher::new();
        let mut browser = context_with(&launcher);
        let resolver = ElementResolver::default();
        let mut context = ToolContext::new(&mut browser, &resolver);

        let response = AttachToBrowserTool.execute_typed(params(), &mut context).await.unwrap();

        assert_eq!(
            response,
            ToolResponse::simple("Successfully attached to existing browser session", false)
        );
        assert_eq!(browser.browser().unwrap().session_id(), "4f1c2a");
        assert_eq!(launcher.launch_count(), 0);
    }

    #[tokio::test]
    async fn test_attach_replaces_running_browser() {
        let previous = FakeDriver::new();
        let mut browser = running_context(&previous).await;
        let resolver = ElementResolver::default();
        let mut context = ToolContext::new(&mut browser, &resolver);

        AttachToBrowserTool.execute_typed(params(), &mut context).await.unwrap();

        assert_eq!(previous.delete_count(), 1);
        assert_eq!(browser.browser().unwrap().session_id(), "4f1c2a");
    }

    #[tokio::test]
    async fn test_attach_to_dead_session() {
        let launcher = FakeLauncher::new().with_attach_driver(FakeDriver::dead("4f1c2a"));
        let mut browser = context_with(&launcher);
        let resolver = ElementResolver::default();
        let mut context = ToolContext::new(&mut browser, &resolver);

        let response = AttachToBrowserTool.execute_typed(params(), &mut context).await.unwrap();

        assert!(response.is_error);
        assert!(response.text.starts_with("❌ Error attach to browser: "));
        assert!(browser.browser().is_none());
    }

    #[tokio::test]
    async fn test_attach_connection_refused() {
        let launcher = FakeLauncher::new().failing_attach("connection refused");
        let mut browser = context_with(&launcher);
        let resolver = ElementResolver::default();
        let mut context = ToolContext::new(&mut browser, &resolver);

        let response = AttachToBrowserTool.execute_typed(params(), &mut context).await.unwrap();

        assert!(response.is_error);
        assert!(response.text.contains("connection refused"));
    }
}
