use crate::browser::config::{BrowserOptions, SessionDescriptor};
use crate::browser::driver::{BrowserHandle, BrowserLauncher};
use crate::error::{BrowserError, Result};
use std::sync::Arc;

/// Owner of the single browser session shared by all tools.
///
/// The browser is created lazily on first use: either by attaching to a
/// pending [`SessionDescriptor`] or by launching with the stored options.
pub struct BrowserContext {
    launcher: Arc<dyn BrowserLauncher>,
    options: BrowserOptions,
    session: Option<SessionDescriptor>,
    browser: Option<BrowserHandle>,
}

impl BrowserContext {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, options: BrowserOptions) -> Self {
        Self {
            launcher,
            options,
            session: None,
            browser: None,
        }
    }

    /// Options used for the next launch
    pub fn options(&self) -> &BrowserOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: BrowserOptions) {
        self.options = options;
    }

    /// Queue a session to attach to on the next [`get`](Self::get)
    pub fn set_session(&mut self, session: SessionDescriptor) {
        self.session = Some(session);
    }

    pub fn launcher(&self) -> &Arc<dyn BrowserLauncher> {
        &self.launcher
    }

    /// The current browser handle without creating one
    pub fn browser(&self) -> Option<&BrowserHandle> {
        self.browser.as_ref()
    }

    /// Get the browser, attaching or launching one if none exists yet
    pub async fn get(&mut self) -> Result<BrowserHandle> {
        if let Some(browser) = &self.browser {
            return Ok(browser.clone());
        }

        let browser = match self.session.take() {
            Some(session) => self.attach(session).await?,
            None => {
                log::info!("Launching browser (headless: {})", self.options.headless);
                self.launcher.launch(&self.options).await?
            }
        };

        self.browser = Some(browser.clone());
        Ok(browser)
    }

    async fn attach(&self, session: SessionDescriptor) -> Result<BrowserHandle> {
        let browser = self
            .launcher
            .attach(&session)
            .await
            .map_err(|e| BrowserError::AttachFailed {
                session_id: session.session_id.clone(),
                reason: e.to_string(),
            })?;

        browser
            .current_url()
            .await
            .map_err(|e| BrowserError::AttachVerificationFailed {
                session_id: session.session_id.clone(),
                reason: e.to_string(),
            })?;

        log::info!("Attached to session {}", session.session_id);
        Ok(browser)
    }

    /// Whether a browser exists and still answers
    pub async fn is_active(&self) -> bool {
        match &self.browser {
            Some(browser) => match browser.current_url().await {
                Ok(_) => true,
                Err(e) => {
                    log::debug!("Browser session {} is not responding: {}", browser.session_id(), e);
                    false
                }
            },
            None => false,
        }
    }

    /// End the current session. Teardown errors are logged; the handle is
    /// cleared either way.
    pub async fn close(&mut self) {
        self.session = None;
        let Some(browser) = self.browser.take() else {
            return;
        };

        if let Err(e) = browser.delete_session().await {
            log::warn!("Failed to close browser session {}: {}", browser.session_id(), e);
        } else {
            log::info!("Closed browser session {}", browser.session_id());
        }
    }

    /// Install a new browser handle, closing the previous one if it is still alive
    pub async fn replace(&mut self, next: Option<BrowserHandle>) {
        if self.is_active().await {
            self.close().await;
        }
        self.browser = next;
    }
}
