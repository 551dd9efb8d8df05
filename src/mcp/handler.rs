use crate::browser::{BrowserContext, BrowserLauncher, BrowserOptions, WebDriverLauncher};
use crate::locator::ElementResolver;
use crate::tools::ToolRegistry;
use rmcp::{
    ServerHandler,
    handler::server::router::tool::ToolRouter,
    model::{ServerCapabilities, ServerInfo},
    tool_handler,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// MCP server exposing the browser tools.
///
/// All tool calls share one [`BrowserContext`] and hold its lock for their
/// whole duration.
#[derive(Clone)]
pub struct BrowserServer {
    pub(super) tool_router: ToolRouter<Self>,
    pub(super) browser: Arc<Mutex<BrowserContext>>,
    pub(super) resolver: ElementResolver,
    pub(super) registry: Arc<ToolRegistry>,
}

impl BrowserServer {
    /// Create a server that launches browsers through local drivers or a grid
    pub fn new(options: BrowserOptions) -> Self {
        Self::with_launcher(Arc::new(WebDriverLauncher::default()), options)
    }

    /// Create a server with a custom launcher
    pub fn with_launcher(launcher: Arc<dyn BrowserLauncher>, options: BrowserOptions) -> Self {
        Self {
            tool_router: Self::tool_router(),
            browser: Arc::new(Mutex::new(BrowserContext::new(launcher, options))),
            resolver: ElementResolver::default(),
            registry: Arc::new(ToolRegistry::with_defaults()),
        }
    }

    /// Builder method: resolve semantic queries with a custom resolver
    pub fn with_resolver(mut self, resolver: ElementResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Shared browser context, e.g. for cleanup on shutdown
    pub fn browser(&self) -> Arc<Mutex<BrowserContext>> {
        self.browser.clone()
    }

    /// Close the browser if one is running
    pub async fn shutdown(&self) {
        let mut browser = self.browser.lock().await;
        if browser.is_active().await {
            log::info!("Closing browser session");
            browser.close().await;
        }
    }
}

#[tool_handler]
impl ServerHandler for BrowserServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Browser automation over WebDriver. Use 'navigate' to open a page; a browser is launched \
                 automatically on first use. Locate elements with semantic queries (role, text, labelText, ...) \
                 or with wdio selectors (CSS, XPath). Every action returns the equivalent WebdriverIO test code, \
                 the open tabs and a DOM snapshot of the page."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
