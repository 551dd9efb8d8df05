use crate::error::Result;
use crate::responses::{StateReport, ToolResponse, browser_state};
use crate::tools::utils::js_string;
use crate::tools::{Tool, ToolContext, failure};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Parameters for the takeViewportScreenshot tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotParams {
    /// Path to save the screenshot (defaults to tmp directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

/// Tool for saving a PNG of the current viewport
#[derive(Default)]
pub struct ScreenshotTool;

/// `<tmp>/viewport-<timestamp>.png`, with `:` and `.` in the timestamp
/// replaced so the name is valid on every platform
pub fn default_screenshot_path() -> PathBuf {
    let timestamp = Utc::now()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    std::env::temp_dir().join(format!("viewport-{}.png", timestamp))
}

async fn save_png(path: &Path, data: &[u8]) -> Result<u64> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, data).await?;
    Ok(tokio::fs::metadata(path).await?.len())
}

#[async_trait]
impl Tool for ScreenshotTool {
    type Params = ScreenshotParams;

    fn name(&self) -> &str {
        "takeViewportScreenshot"
    }

    async fn execute_typed(&self, params: ScreenshotParams, context: &mut ToolContext<'_>) -> Result<ToolResponse> {
        let browser = match context.browser.get().await {
            Ok(browser) => browser,
            Err(e) => return failure("Error taking viewport screenshot", e),
        };

        let path = params
            .file_path
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_screenshot_path);

        let data = match browser.screenshot().await {
            Ok(data) => data,
            Err(e) => return failure("Error taking viewport screenshot", e),
        };

        let size = match save_png(&path, &data).await {
            Ok(size) => size,
            Err(e) => return failure("Error taking viewport screenshot", e),
        };
        let size_kb = (size as f64 / 1024.0).round() as u64;
        let display = path.display().to_string();
        log::info!("Saved screenshot to {} ({} bytes)", display, size);

        Ok(browser_state(
            browser.as_ref(),
            StateReport::new("Viewport screenshot captured successfully")
                .code(format!("await browser.saveScreenshot({});", js_string(&display)))
                .notes(format!("Screenshot saved: {} ({} KB)", display, size_kb))
                .without_snapshot(),
        )
        .await)
    }
}
