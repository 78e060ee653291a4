mod json_ld;

pub use json_ld::JsonLdExtractor;

use crate::model::NormalizedRecipe;

/// Extract the first schema.org Recipe from rendered HTML
///
/// Returns `None` when the page carries no Recipe entity; that is an expected
/// outcome, not an error.
pub fn extract_recipe(html: &str) -> Option<NormalizedRecipe> {
    JsonLdExtractor.extract(html)
}
