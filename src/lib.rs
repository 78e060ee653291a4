pub mod config;
pub mod error;
pub mod extractors;
pub mod fetchers;
pub mod model;
pub mod notify;
pub mod pipelines;
pub mod server;

pub use config::{AppConfig, LaunchStrategy};
pub use error::{ImportError, RenderError};
pub use extractors::extract_recipe;
pub use fetchers::{BrowserRenderer, PageRenderer};
pub use model::{NormalizedRecipe, RenderRequest, RenderResult};

/// Render `url` with a browser configured from `config` and extract its recipe
///
/// # Arguments
/// * `url` - Absolute http(s) URL of a recipe page
/// * `config` - Browser settings (launch strategy, timeout, user agent)
///
/// # Returns
/// The first schema.org Recipe on the page, or [`ImportError::RecipeNotFound`]
pub async fn fetch_recipe(
    url: &str,
    config: &config::BrowserConfig,
) -> Result<NormalizedRecipe, ImportError> {
    let renderer = BrowserRenderer::from_config(config);
    pipelines::url::process(url, &renderer).await
}
