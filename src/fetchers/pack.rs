use crate::config::BrowserConfig;
use crate::error::RenderError;
use log::{debug, info};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::process::Command;

/// Launch arguments a pinned headless-shell needs on a locked-down host.
const CONSTRAINED_ARGS: &[&str] = &[
    "--disable-setuid-sandbox",
    "--no-zygote",
    "--single-process",
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--no-first-run",
    "--mute-audio",
    "--hide-scrollbars",
    "--disable-web-security",
];

/// Written last into an install directory; its absence means the unpack never finished.
const INSTALL_MARKER: &str = ".installed";

/// A minimal browser build fetched from a pinned, versioned location.
///
/// The version and the launcher protocol have to agree, so the pin lives in
/// configuration and is only ever bumped on purpose.
#[derive(Debug, Clone)]
pub struct PinnedBrowserPack {
    version: String,
    url_template: String,
    executable: PathBuf,
    cache_dir: PathBuf,
}

impl PinnedBrowserPack {
    pub fn new(
        version: impl Into<String>,
        url_template: impl Into<String>,
        executable: impl Into<PathBuf>,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            version: version.into(),
            url_template: url_template.into(),
            executable: executable.into(),
            cache_dir: cache_dir.into(),
        }
    }

    pub fn from_config(config: &BrowserConfig) -> Self {
        Self::new(
            &config.pack_version,
            &config.pack_url,
            &config.pack_executable,
            &config.cache_dir,
        )
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn download_url(&self) -> String {
        self.url_template.replace("{version}", &self.version)
    }

    /// Each version unpacks into its own directory so a bump never reuses a stale binary.
    pub fn install_dir(&self) -> PathBuf {
        self.cache_dir.join(&self.version)
    }

    pub fn executable_path(&self) -> PathBuf {
        self.install_dir().join(&self.executable)
    }

    pub fn default_args(&self) -> &'static [&'static str] {
        CONSTRAINED_ARGS
    }

    /// Download and unpack the pack unless it is already present, returning the executable.
    ///
    /// An install only counts once its marker exists. Unpacking happens in a
    /// staging directory that is renamed into place, so an interrupted
    /// extraction is never mistaken for a usable browser.
    pub async fn ensure_installed(&self, client: &Client) -> Result<PathBuf, RenderError> {
        let executable = self.executable_path();
        if self.is_installed().await {
            debug!("Browser pack {} already at {}", self.version, executable.display());
            return Ok(executable);
        }

        let staging = self
            .cache_dir
            .join(format!("{}.partial-{}", self.version, std::process::id()));
        let result = self.install_into(client, &staging).await;
        if result.is_err() {
            discard(&staging).await;
        }
        result?;

        let install_dir = self.install_dir();
        if self.is_installed().await {
            discard(&staging).await;
            return Ok(executable);
        }
        if fs::metadata(&install_dir).await.is_ok() {
            debug!("Replacing incomplete install at {}", install_dir.display());
            discard(&install_dir).await;
        }
        if let Err(e) = fs::rename(&staging, &install_dir).await {
            discard(&staging).await;
            // Another process may have finished the same version first
            if !self.is_installed().await {
                return Err(RenderError::BinaryFetch(format!(
                    "{}: {}",
                    install_dir.display(),
                    e
                )));
            }
        }

        Ok(executable)
    }

    async fn is_installed(&self) -> bool {
        fs::metadata(self.install_dir().join(INSTALL_MARKER))
            .await
            .is_ok()
            && fs::metadata(self.executable_path()).await.is_ok()
    }

    async fn install_into(&self, client: &Client, dir: &Path) -> Result<(), RenderError> {
        discard(dir).await;
        fs::create_dir_all(dir)
            .await
            .map_err(|e| RenderError::BinaryFetch(format!("{}: {}", dir.display(), e)))?;

        let url = self.download_url();
        info!("Downloading browser pack {} from {}", self.version, url);
        let archive = dir.join("pack.zip");
        download(client, &url, &archive).await?;
        unpack(&archive, dir).await?;
        if let Err(e) = fs::remove_file(&archive).await {
            debug!("Could not remove {}: {}", archive.display(), e);
        }

        let executable = dir.join(&self.executable);
        if fs::metadata(&executable).await.is_err() {
            return Err(RenderError::BinaryFetch(format!(
                "pack {} has no executable at {}",
                self.version, self.executable.display()
            )));
        }

        fs::write(dir.join(INSTALL_MARKER), &self.version)
            .await
            .map_err(|e| RenderError::BinaryFetch(format!("{}: {}", dir.display(), e)))
    }
}

async fn discard(dir: &Path) {
    if let Err(e) = fs::remove_dir_all(dir).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            debug!("Could not remove {}: {}", dir.display(), e);
        }
    }
}

async fn download(client: &Client, url: &str, path: &Path) -> Result<(), RenderError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| RenderError::BinaryFetch(e.to_string()))?;

    if !response.status().is_success() {
        return Err(RenderError::BinaryFetch(format!(
            "download of {} failed with status: {}",
            url,
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| RenderError::BinaryFetch(e.to_string()))?;
    fs::write(path, &bytes)
        .await
        .map_err(|e| RenderError::BinaryFetch(format!("{}: {}", path.display(), e)))
}

async fn unpack(archive: &Path, dest_dir: &Path) -> Result<(), RenderError> {
    let output = Command::new("unzip")
        .arg("-q")
        .arg("-o")
        .arg(archive)
        .arg("-d")
        .arg(dest_dir)
        .output()
        .await
        .map_err(|e| RenderError::BinaryFetch(format!("failed to run unzip: {e}")))?;

    if !output.status.success() {
        return Err(RenderError::BinaryFetch(format!(
            "extraction failed: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("kitchen-vibe-pack-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_download_url_substitutes_version() {
        let pack = PinnedBrowserPack::new(
            "131.0.1",
            "https://example.com/releases/{version}/chromium-{version}.zip",
            "chromium",
            "/tmp/cache",
        );
        assert_eq!(
            pack.download_url(),
            "https://example.com/releases/131.0.1/chromium-131.0.1.zip"
        );
        assert_eq!(
            pack.executable_path(),
            PathBuf::from("/tmp/cache/131.0.1/chromium")
        );
    }

    #[test]
    fn test_default_args_relax_sandbox_and_web_security() {
        let pack = PinnedBrowserPack::from_config(&BrowserConfig::default());
        assert!(pack.default_args().contains(&"--disable-web-security"));
        assert!(pack.default_args().contains(&"--no-zygote"));
        assert_eq!(pack.version(), "131.0.6778.85");
    }

    #[tokio::test]
    async fn test_existing_install_is_reused() {
        let cache = scratch_dir("reuse");
        let pack = PinnedBrowserPack::new("1.0", "http://127.0.0.1:9/{version}.zip", "bin/chrome", &cache);
        std::fs::create_dir_all(pack.install_dir().join("bin")).unwrap();
        std::fs::write(pack.executable_path(), b"").unwrap();
        std::fs::write(pack.install_dir().join(INSTALL_MARKER), b"1.0").unwrap();

        // The download URL is unreachable, so success proves no fetch happened
        let path = pack.ensure_installed(&Client::new()).await.unwrap();
        assert_eq!(path, pack.executable_path());

        std::fs::remove_dir_all(&cache).unwrap();
    }

    #[tokio::test]
    async fn test_failed_download_is_binary_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/9.9/pack.zip")
            .with_status(404)
            .create_async()
            .await;

        let cache = scratch_dir("missing");
        let pack = PinnedBrowserPack::new(
            "9.9",
            format!("{}/{{version}}/pack.zip", server.url()),
            "chrome",
            &cache,
        );

        let result = pack.ensure_installed(&Client::new()).await;
        assert!(matches!(result, Err(RenderError::BinaryFetch(_))));

        let _ = std::fs::remove_dir_all(&cache);
    }

    #[tokio::test]
    async fn test_executable_without_marker_is_downloaded_again() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/2.0/pack.zip")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let cache = scratch_dir("interrupted");
        let pack = PinnedBrowserPack::new(
            "2.0",
            format!("{}/{{version}}/pack.zip", server.url()),
            "chrome",
            &cache,
        );
        // Left behind by an extraction that died before finishing
        std::fs::create_dir_all(pack.install_dir()).unwrap();
        std::fs::write(pack.executable_path(), b"").unwrap();

        let result = pack.ensure_installed(&Client::new()).await;

        mock.assert_async().await;
        assert!(matches!(result, Err(RenderError::BinaryFetch(_))));
        let leftovers: Vec<_> = std::fs::read_dir(&cache)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().contains(".partial-"))
            .collect();
        assert!(leftovers.is_empty());

        let _ = std::fs::remove_dir_all(&cache);
    }
}
