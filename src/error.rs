use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while importing a recipe from a URL
#[derive(Error, Debug)]
pub enum ImportError {
    /// No URL was supplied
    #[error("URL is required")]
    MissingUrl,

    /// The URL failed syntax or scheme validation
    #[error("Invalid URL provided: {0}")]
    InvalidUrl(String),

    /// The page could not be rendered
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The page rendered but carries no schema.org Recipe
    #[error("Could not extract recipe data")]
    RecipeNotFound,

    /// Interest notification could not be delivered
    #[error("Notification failed: {0}")]
    Notify(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

impl ImportError {
    /// True for failures caused by the caller's input rather than the page or the host
    pub fn is_validation(&self) -> bool {
        matches!(self, ImportError::MissingUrl | ImportError::InvalidUrl(_))
    }
}

/// Errors raised while acquiring a browser or driving it to a page
#[derive(Error, Debug)]
pub enum RenderError {
    /// The browser process could not be started
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    /// The pinned browser binary could not be downloaded or unpacked
    #[error("Failed to fetch browser binary: {0}")]
    BinaryFetch(String),

    /// Navigation did not reach DOMContentLoaded in time
    #[error("Navigation timeout of {}s exceeded", .0.as_secs())]
    Timeout(Duration),

    /// The browser reported a navigation or network failure
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// A DevTools command failed after the browser was up
    #[error("Browser protocol error: {0}")]
    Protocol(#[from] chromiumoxide::error::CdpError),
}
