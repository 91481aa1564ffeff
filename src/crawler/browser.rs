//! Headless-browser fetcher for script-rendered listings
//!
//! One Chrome session is launched per domain and reused for every page of
//! that domain's traversal. The CDP handler runs on its own tokio task so
//! browser I/O never blocks the crawl loop.

use crate::config::BrowserConfig;
use crate::crawler::retry::{retry, RetryPolicy};
use crate::FetchError;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use futures::StreamExt;
use std::fmt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// A running browser together with the task draining its CDP event stream
struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

/// Fetches pages by rendering them in headless Chrome
///
/// The session is optional: when the browser cannot be launched the fetcher
/// still exists, but every fetch fails with [`FetchError::Uninitialized`].
pub struct DynamicFetcher {
    session: Option<BrowserSession>,
    navigation_timeout: Duration,
    retry: RetryPolicy,
}

impl DynamicFetcher {
    /// Launches a browser session; launch failure is logged, not returned
    pub async fn launch(config: &BrowserConfig, user_agent: &str, retry: RetryPolicy) -> Self {
        let navigation_timeout = Duration::from_secs(config.navigation_timeout_secs);

        let session = match start_session(config, user_agent, navigation_timeout).await {
            Ok(session) => {
                tracing::debug!("Browser session started");
                Some(session)
            }
            Err(e) => {
                tracing::warn!("Browser session unavailable: {}", e);
                None
            }
        };

        Self {
            session,
            navigation_timeout,
            retry,
        }
    }

    /// A fetcher whose session never came up
    pub fn uninitialized(retry: RetryPolicy) -> Self {
        Self {
            session: None,
            navigation_timeout: Duration::from_secs(30),
            retry,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    async fn try_fetch(&self, browser: &Browser, url: &str) -> Result<String, FetchError> {
        let page = timeout(self.navigation_timeout, browser.new_page(url))
            .await
            .map_err(|_| FetchError::Transient {
                url: url.to_string(),
                message: "navigation timed out".to_string(),
            })?
            .map_err(|e| FetchError::Browser {
                url: url.to_string(),
                message: format!("failed to open page: {}", e),
            })?;

        // Best effort; late network activity should not fail the fetch
        let _ = timeout(self.navigation_timeout, page.wait_for_navigation()).await;

        let html = timeout(self.navigation_timeout, page.content()).await;

        if let Err(e) = page.close().await {
            tracing::debug!("Page close error for {}: {}", url, e);
        }

        match html {
            Ok(Ok(html)) => Ok(html),
            Ok(Err(e)) => Err(FetchError::Browser {
                url: url.to_string(),
                message: format!("failed to read content: {}", e),
            }),
            Err(_) => Err(FetchError::Transient {
                url: url.to_string(),
                message: "content serialization timed out".to_string(),
            }),
        }
    }

    /// Renders `url` and returns the resulting DOM as HTML
    ///
    /// Navigation failures yield empty content. A missing session yields
    /// [`FetchError::Uninitialized`].
    pub async fn fetch_content(&self, url: &str) -> Result<String, FetchError> {
        let session = self.session.as_ref().ok_or(FetchError::Uninitialized)?;

        match retry(&self.retry, || self.try_fetch(&session.browser, url)).await {
            Ok(html) => Ok(html),
            Err(e) => {
                tracing::warn!("Browser fetch failed for {}: {}", url, e);
                Ok(String::new())
            }
        }
    }

    /// Shuts the browser down and waits for the process to exit
    ///
    /// Later calls are no-ops.
    pub async fn close(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        if let Err(e) = session.browser.close().await {
            tracing::warn!("Browser close error: {}", e);
        }
        if let Err(e) = session.browser.wait().await {
            tracing::debug!("Browser wait error: {}", e);
        }
        session.handler.abort();
        tracing::debug!("Browser session released");
    }
}

impl Drop for DynamicFetcher {
    fn drop(&mut self) {
        // Dropping the Browser kills the child process
        if let Some(session) = self.session.take() {
            session.handler.abort();
            tracing::debug!("Browser session released on drop");
        }
    }
}

impl fmt::Debug for DynamicFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicFetcher")
            .field("initialized", &self.is_initialized())
            .field("navigation_timeout", &self.navigation_timeout)
            .finish()
    }
}

async fn start_session(
    config: &BrowserConfig,
    user_agent: &str,
    navigation_timeout: Duration,
) -> Result<BrowserSession, String> {
    let mut builder = ChromeConfig::builder()
        .request_timeout(navigation_timeout)
        .arg("--no-sandbox")
        .arg("--disable-setuid-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-gpu")
        .arg(format!("--user-agent={}", user_agent));

    if let Some(executable) = &config.executable {
        builder = builder.chrome_executable(executable);
    }

    let chrome_config = builder
        .build()
        .map_err(|e| format!("browser config error: {}", e))?;

    let (browser, mut handler) = Browser::launch(chrome_config)
        .await
        .map_err(|e| format!("browser launch failed: {}", e))?;

    let handler = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                tracing::trace!("CDP handler error: {}", e);
            }
        }
    });

    Ok(BrowserSession { browser, handler })
}
