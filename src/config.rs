use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Top-level application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Browser launch and navigation settings
    #[serde(default)]
    pub browser: BrowserConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Interest-capture notification settings
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// How the headless browser is obtained
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LaunchStrategy {
    /// A Chrome/Chromium already installed on the host
    #[default]
    Full,
    /// A minimal pinned binary downloaded at first use, for sandboxed hosts
    Constrained,
}

/// Configuration for the renderer
#[derive(Debug, Deserialize, Clone)]
pub struct BrowserConfig {
    /// Launch strategy, the single switch between local and remote-binary browsers
    #[serde(default)]
    pub strategy: LaunchStrategy,
    /// Explicit browser executable for the full strategy (auto-detected when unset)
    #[serde(default)]
    pub executable: Option<PathBuf>,
    /// Pinned version of the remote browser package. Must match the launcher; bump deliberately.
    #[serde(default = "default_pack_version")]
    pub pack_version: String,
    /// Download URL template for the remote package, `{version}` is substituted
    #[serde(default = "default_pack_url")]
    pub pack_url: String,
    /// Executable path inside the unpacked package
    #[serde(default = "default_pack_executable")]
    pub pack_executable: PathBuf,
    /// Where the remote package is unpacked
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// Navigation timeout in seconds
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,
    /// User agent sent by the rendered page
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            strategy: LaunchStrategy::default(),
            executable: None,
            pack_version: default_pack_version(),
            pack_url: default_pack_url(),
            pack_executable: default_pack_executable(),
            cache_dir: default_cache_dir(),
            navigation_timeout_secs: default_navigation_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Configuration for the HTTP surface
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Socket address to bind
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Configuration for the interest-capture e-mail
#[derive(Debug, Deserialize, Clone)]
pub struct NotifyConfig {
    /// Resend API key (can also be set via RESEND_API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL of the e-mail API
    #[serde(default = "default_notify_api_base")]
    pub api_base: String,
    /// Sender address
    #[serde(default = "default_notify_from")]
    pub from: String,
    /// Recipient of interest notifications
    #[serde(default)]
    pub to: Vec<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_notify_api_base(),
            from: default_notify_from(),
            to: Vec::new(),
        }
    }
}

// Default value functions
fn default_pack_version() -> String {
    "131.0.6778.85".to_string()
}

fn default_pack_url() -> String {
    "https://storage.googleapis.com/chrome-for-testing-public/{version}/linux64/chrome-headless-shell-linux64.zip".to_string()
}

fn default_pack_executable() -> PathBuf {
    PathBuf::from("chrome-headless-shell-linux64/chrome-headless-shell")
}

fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("kitchen-vibe-browser")
}

fn default_navigation_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_notify_api_base() -> String {
    "https://api.resend.com".to_string()
}

fn default_notify_from() -> String {
    "Kitchen Vibe <onboarding@resend.dev>".to_string()
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with KITCHEN_VIBE__ prefix
    /// 2. kitchen-vibe.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: KITCHEN_VIBE__BROWSER__STRATEGY=constrained
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("kitchen-vibe").required(false))
        // Use double underscore for nested: KITCHEN_VIBE__BROWSER__STRATEGY
        .add_source(
            Environment::with_prefix("KITCHEN_VIBE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("notify.to"),
        )
        .build()?;

    settings.try_deserialize()
}
