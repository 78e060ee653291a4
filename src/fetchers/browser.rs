use crate::config::BrowserConfig;
use crate::error::RenderError;
use crate::fetchers::launcher::{launcher_for, BrowserLauncher, BrowserSession};
use crate::model::{RenderRequest, RenderResult};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{EventDomContentEventFired, NavigateParams};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

pub const VIEWPORT_WIDTH: i64 = 1366;
pub const VIEWPORT_HEIGHT: i64 = 768;

/// Turns a URL into the HTML a browser would show for it
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Short name of the rendering strategy, reported by the health endpoint
    fn strategy(&self) -> &str;

    async fn render(&self, request: &RenderRequest) -> Result<RenderResult, RenderError>;
}

/// Renders pages in a fresh headless browser per request.
pub struct BrowserRenderer {
    launcher: Arc<dyn BrowserLauncher>,
    user_agent: String,
    navigation_timeout: Duration,
}

impl BrowserRenderer {
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        user_agent: impl Into<String>,
        navigation_timeout: Duration,
    ) -> Self {
        Self {
            launcher,
            user_agent: user_agent.into(),
            navigation_timeout,
        }
    }

    pub fn from_config(config: &BrowserConfig) -> Self {
        Self::new(
            launcher_for(config),
            &config.user_agent,
            Duration::from_secs(config.navigation_timeout_secs),
        )
    }

    async fn capture(
        &self,
        session: &BrowserSession,
        request: &RenderRequest,
    ) -> Result<RenderResult, RenderError> {
        let page = session.browser().new_page("about:blank").await?;

        page.execute(SetDeviceMetricsOverrideParams::new(
            VIEWPORT_WIDTH,
            VIEWPORT_HEIGHT,
            1.0,
            false,
        ))
        .await?;
        page.execute(SetUserAgentOverrideParams::new(self.user_agent.clone()))
            .await?;

        navigate(&page, request.as_str(), self.navigation_timeout).await?;

        let html = page.content().await?;
        debug!("Rendered {} ({} bytes)", request.as_str(), html.len());
        Ok(RenderResult { html })
    }
}

#[async_trait]
impl PageRenderer for BrowserRenderer {
    fn strategy(&self) -> &str {
        self.launcher.name()
    }

    async fn render(&self, request: &RenderRequest) -> Result<RenderResult, RenderError> {
        info!(
            "Rendering {} with {} browser",
            request.as_str(),
            self.launcher.name()
        );
        let session = self.launcher.launch().await?;

        let result = self.capture(&session, request).await;
        if let Err(e) = &result {
            warn!("Render of {} failed: {}", request.as_str(), e);
        }

        session.close().await;
        result
    }
}

/// Navigate and return once the DOM is constructed, without waiting for subresources.
///
/// The `Page.navigate` response only arrives after the `load` lifecycle, so it is
/// raced against the DOMContentLoaded event instead of awaited first.
async fn navigate(page: &Page, url: &str, timeout: Duration) -> Result<(), RenderError> {
    // Subscribe before navigating so the event cannot be missed
    let mut dom_ready = page.event_listener::<EventDomContentEventFired>().await?;

    let navigation = async {
        let navigate = page.execute(NavigateParams::new(url));
        tokio::pin!(navigate);

        tokio::select! {
            ready = dom_ready.next() => dom_content_loaded(url, ready.is_some()),
            response = &mut navigate => {
                let response = response.map_err(|e| protocol_error(e, timeout))?;
                if let Some(error) = &response.result.error_text {
                    return Err(RenderError::Navigation(format!("{}: {}", url, error)));
                }
                // Fully loaded already, the event is buffered
                dom_content_loaded(url, dom_ready.next().await.is_some())
            }
        }
    };

    match tokio::time::timeout(timeout, navigation).await {
        Ok(result) => result,
        Err(_) => Err(RenderError::Timeout(timeout)),
    }
}

fn dom_content_loaded(url: &str, fired: bool) -> Result<(), RenderError> {
    if fired {
        Ok(())
    } else {
        Err(RenderError::Navigation(format!(
            "{}: page closed before DOMContentLoaded",
            url
        )))
    }
}

/// The browser's own request deadline reports the same condition as ours.
fn protocol_error(error: CdpError, timeout: Duration) -> RenderError {
    match error {
        CdpError::Timeout => RenderError::Timeout(timeout),
        other => RenderError::Protocol(other),
    }
}
