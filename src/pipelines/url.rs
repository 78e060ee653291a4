use crate::extractors::JsonLdExtractor;
use crate::fetchers::PageRenderer;
use crate::model::{NormalizedRecipe, RenderRequest};
use crate::ImportError;
use log::{debug, info};

/// Process a URL into a normalized recipe
///
/// This pipeline:
/// 1. Validates the URL (nothing is launched for a bad one)
/// 2. Renders the page with the given renderer
/// 3. Runs the JSON-LD extractor over the rendered HTML
///
/// # Arguments
/// * `url` - The URL to render and extract
/// * `renderer` - Strategy-specific page renderer
///
/// # Returns
/// * `Ok(NormalizedRecipe)` - The first Recipe entity on the page
/// * `Err(ImportError::RecipeNotFound)` - The page rendered but has no Recipe
/// * `Err(...)` - Validation or render failure
pub async fn process(url: &str, renderer: &dyn PageRenderer) -> Result<NormalizedRecipe, ImportError> {
    let request = RenderRequest::parse(url)?;

    let rendered = renderer.render(&request).await?;
    debug!("Extracting recipe from {} bytes of HTML", rendered.html.len());

    match JsonLdExtractor.extract(&rendered.html) {
        Some(recipe) => {
            info!("Extracted recipe {:?} from {}", recipe.title, request.as_str());
            Ok(recipe)
        }
        None => Err(ImportError::RecipeNotFound),
    }
}
