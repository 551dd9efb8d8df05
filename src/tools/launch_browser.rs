use crate::browser::config::{BrowserOverrides, WindowSizeInput, present, validate_capabilities};
use crate::error::Result;
use crate::responses::ToolResponse;
use crate::tools::{Tool, ToolContext, failure};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameters for the launchBrowser tool.
///
/// Fields left out keep the value of the previous launch; `null` resets
/// `desiredCapabilities` and `windowSize` to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LaunchBrowserParams {
    /// WebDriver desiredCapabilities used when launching the browser, e.g.
    /// {"browserName":"chrome","goog:chromeOptions":{"mobileEmulation":{"deviceMetrics":{"width":360,"height":800,"pixelRatio":1.0}}}}
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<Map<String, Value>>")]
    pub desired_capabilities: Option<Option<Map<String, Value>>>,

    /// WebDriver endpoint to connect to. "local" (default) manages Chrome and
    /// Firefox drivers automatically; set a Selenium grid URL for other browsers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_url: Option<String>,

    /// Viewport to use: {"width": number, "height": number} or "1280x720";
    /// null resets to the default size
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<WindowSizeInput>")]
    pub window_size: Option<Option<WindowSizeInput>>,
}

impl LaunchBrowserParams {
    /// Validate inputs and turn them into option overrides
    pub fn into_overrides(self) -> Result<BrowserOverrides> {
        if let Some(Some(caps)) = &self.desired_capabilities {
            validate_capabilities(caps)?;
        }

        let window_size = match self.window_size {
            Some(Some(input)) => Some(Some(input.resolve()?)),
            Some(None) => Some(None),
            None => None,
        };

        Ok(BrowserOverrides {
            desired_capabilities: self.desired_capabilities,
            grid_url: Some(self.grid_url),
            window_size,
        })
    }
}

/// Tool for launching a browser with custom options
#[derive(Default)]
pub struct LaunchBrowserTool;

#[async_trait]
impl Tool for LaunchBrowserTool {
    type Params = LaunchBrowserParams;

    fn name(&self) -> &str {
        "launchBrowser"
    }

    async fn execute_typed(&self, params: LaunchBrowserParams, context: &mut ToolContext<'_>) -> Result<ToolResponse> {
        let overrides = params.into_overrides()?;

        if context.browser.is_active().await {
            log::info!("Closing existing browser before launching a new one");
        }
        context.browser.replace(None).await;

        let options = context.browser.options().merged(overrides);
        context.browser.set_options(options);

        match context.browser.get().await {
            Ok(_) => Ok(ToolResponse::simple("Successfully launched browser session", false)),
            Err(e) => failure("Error launching browser", e),
        }
    }
}
