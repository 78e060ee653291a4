use crate::config::{BrowserConfig, LaunchStrategy};
use crate::error::RenderError;
use crate::fetchers::pack::PinnedBrowserPack;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig, BrowserConfigBuilder};
use futures::StreamExt;
use log::{debug, warn};
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;

const FULL_ARGS: &[&str] = &["--disable-setuid-sandbox"];
const COMMON_ARGS: &[&str] = &["--ignore-certificate-errors"];
/// Headroom so the renderer's own navigation deadline fires first
const REQUEST_TIMEOUT_GRACE: Duration = Duration::from_secs(5);

/// A launched browser process and the task driving its DevTools connection.
///
/// Owned by exactly one render; call [`BrowserSession::close`] on every exit path.
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    pub async fn launch(config: CdpBrowserConfig) -> Result<Self, RenderError> {
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        // The connection only makes progress while its handler is polled
        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });

        Ok(Self { browser, handler })
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Close the browser and reap its process. Failures are logged only.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to reap browser process: {}", e);
        }
        debug!("Browser session closed");
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// Strategy for obtaining a headless browser on the current host
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Strategy name (e.g., "full", "constrained")
    fn name(&self) -> &'static str;

    /// Start a fresh, unshared browser instance
    async fn launch(&self) -> Result<BrowserSession, RenderError>;
}

/// Pick the launcher named by the configured strategy.
pub fn launcher_for(config: &BrowserConfig) -> Arc<dyn BrowserLauncher> {
    let navigation_timeout = Duration::from_secs(config.navigation_timeout_secs);
    match config.strategy {
        LaunchStrategy::Full => Arc::new(FullLauncher::new(
            config.executable.clone(),
            navigation_timeout,
        )),
        LaunchStrategy::Constrained => Arc::new(ConstrainedLauncher::new(
            PinnedBrowserPack::from_config(config),
            navigation_timeout,
        )),
    }
}

fn build_config(
    builder: BrowserConfigBuilder,
    navigation_timeout: Duration,
) -> Result<CdpBrowserConfig, RenderError> {
    builder
        .args(COMMON_ARGS.iter().copied())
        .request_timeout(navigation_timeout + REQUEST_TIMEOUT_GRACE)
        .build()
        .map_err(|e| RenderError::Launch(format!("Browser config error: {}", e)))
}

/// Launches a Chrome/Chromium installed on the host
pub struct FullLauncher {
    executable: Option<PathBuf>,
    navigation_timeout: Duration,
}

impl FullLauncher {
    pub fn new(executable: Option<PathBuf>, navigation_timeout: Duration) -> Self {
        Self {
            executable,
            navigation_timeout,
        }
    }

    pub fn launch_config(&self) -> Result<CdpBrowserConfig, RenderError> {
        let mut builder = CdpBrowserConfig::builder()
            .no_sandbox()
            .args(FULL_ARGS.iter().copied());
        if let Some(executable) = &self.executable {
            builder = builder.chrome_executable(executable);
        }
        build_config(builder, self.navigation_timeout)
    }
}

#[async_trait]
impl BrowserLauncher for FullLauncher {
    fn name(&self) -> &'static str {
        "full"
    }

    async fn launch(&self) -> Result<BrowserSession, RenderError> {
        debug!("FullLauncher: launching local browser");
        BrowserSession::launch(self.launch_config()?).await
    }
}

/// Launches a pinned headless build downloaded on first use
pub struct ConstrainedLauncher {
    pack: PinnedBrowserPack,
    client: Client,
    executable: OnceCell<PathBuf>,
    navigation_timeout: Duration,
}

impl ConstrainedLauncher {
    pub fn new(pack: PinnedBrowserPack, navigation_timeout: Duration) -> Self {
        Self {
            pack,
            client: Client::new(),
            executable: OnceCell::new(),
            navigation_timeout,
        }
    }

    pub fn pack(&self) -> &PinnedBrowserPack {
        &self.pack
    }

    pub fn launch_config(&self, executable: PathBuf) -> Result<CdpBrowserConfig, RenderError> {
        let builder = CdpBrowserConfig::builder()
            .chrome_executable(executable)
            .no_sandbox()
            .args(self.pack.default_args().iter().copied());
        build_config(builder, self.navigation_timeout)
    }
}

#[async_trait]
impl BrowserLauncher for ConstrainedLauncher {
    fn name(&self) -> &'static str {
        "constrained"
    }

    async fn launch(&self) -> Result<BrowserSession, RenderError> {
        // Concurrent first requests share one download; the browsers themselves stay separate
        let executable = self
            .executable
            .get_or_try_init(|| self.pack.ensure_installed(&self.client))
            .await?
            .clone();

        debug!(
            "ConstrainedLauncher: launching pack {} from {}",
            self.pack.version(),
            executable.display()
        );
        BrowserSession::launch(self.launch_config(executable)?).await
    }
}
