use thiserror::Error;

/// Errors produced by the browser session, element resolution and tools
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Locator has both strategies populated, or neither
    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    #[error("Unsupported queryType: {0}")]
    UnsupportedQueryType(String),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid window size: {0}")]
    InvalidWindowSize(String),

    #[error("Invalid desired capabilities: {0}")]
    InvalidCapabilities(String),

    /// Tool arguments could not be deserialized
    #[error("Invalid parameters for '{tool}': {reason}")]
    InvalidParams { tool: String, reason: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("tab number {number} is out of range. Available range: 1-{available}")]
    TabOutOfRange { number: usize, available: usize },

    #[error("{0}")]
    ElementNotFound(String),

    /// More than one element matched a semantic query. Holds only the first line
    /// of the provider message.
    #[error("{0}")]
    MultipleElements(String),

    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Invalid grid URL '{url}': {reason}")]
    InvalidGridUrl { url: String, reason: String },

    #[error("Unsupported browser '{0}': only chrome and firefox can be launched locally, provide a gridUrl for other browsers")]
    UnsupportedBrowser(String),

    #[error("Could not attach to session {session_id}: {reason}")]
    AttachFailed { session_id: String, reason: String },

    #[error("Attached to session {session_id} but it did not respond: {reason}")]
    AttachVerificationFailed { session_id: String, reason: String },

    #[error("Failed to connect to WebDriver: {0}")]
    ConnectionFailed(String),

    /// Error reported by the WebDriver endpoint for a command
    #[error("WebDriver command '{command}' failed ({error}): {message}")]
    WebDriver {
        command: String,
        error: String,
        message: String,
    },

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error("Script execution failed: {0}")]
    ScriptFailed(String),

    #[error("Snapshot failed: {0}")]
    SnapshotFailed(String),

    #[error("Timeout waiting for element to {action} after {timeout_ms}ms")]
    WaitTimeout { action: String, timeout_ms: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl BrowserError {
    /// Whether this error should reject the tool call outright instead of being
    /// rendered as an error-shaped result.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BrowserError::InvalidLocator(_)
                | BrowserError::UnsupportedQueryType(_)
                | BrowserError::InvalidUrl { .. }
                | BrowserError::InvalidWindowSize(_)
                | BrowserError::InvalidCapabilities(_)
                | BrowserError::InvalidParams { .. }
                | BrowserError::UnknownTool(_)
        )
    }

    /// Whether this error means the resolver found nothing
    pub fn is_not_found(&self) -> bool {
        matches!(self, BrowserError::ElementNotFound(_))
    }

    /// Whether a previously found element is gone from the page
    pub fn is_stale_element(&self) -> bool {
        match self {
            BrowserError::WebDriver { error, .. } => error == "stale element reference" || error == "no such element",
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, BrowserError>;
