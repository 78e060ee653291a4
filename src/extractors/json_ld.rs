use crate::model::NormalizedRecipe;
use log::{debug, warn};
use scraper::{Html, Selector};
use serde_json::{Map, Value};

const RECIPE_TYPE: &str = "Recipe";
const HOW_TO_STEP_TYPE: &str = "HowToStep";
const HOW_TO_SECTION_TYPE: &str = "HowToSection";
const GRAPH_KEY: &str = "@graph";
const TYPE_KEY: &str = "@type";

/// Finds the first schema.org `Recipe` in a page's JSON-LD blocks.
pub struct JsonLdExtractor;

impl JsonLdExtractor {
    /// Extract a recipe from raw HTML. `None` means the page has no Recipe entity.
    pub fn extract(&self, html: &str) -> Option<NormalizedRecipe> {
        let document = Html::parse_document(html);
        self.extract_document(&document)
    }

    pub fn extract_document(&self, document: &Html) -> Option<NormalizedRecipe> {
        let blocks = structured_data_blocks(document);
        debug!("JsonLdExtractor: {} parseable JSON-LD blocks", blocks.len());

        for (index, block) in blocks.iter().enumerate() {
            if let Some(entity) = find_recipe(block) {
                debug!("JsonLdExtractor: Recipe found in block {}", index);
                return Some(normalize(entity));
            }
        }

        debug!("JsonLdExtractor: No Recipe entity in any JSON-LD block");
        None
    }
}

/// Parses every `application/ld+json` script in document order, skipping malformed ones.
fn structured_data_blocks(document: &Html) -> Vec<Value> {
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();

    document
        .select(&selector)
        .enumerate()
        .filter_map(|(index, script)| {
            let raw = script.text().collect::<String>();
            match serde_json::from_str::<Value>(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("JsonLdExtractor: Skipping malformed JSON-LD block {}: {}", index, e);
                    None
                }
            }
        })
        .collect()
}

/// Depth-first search for the first Recipe-tagged entity.
pub(crate) fn find_recipe(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.iter().find_map(find_recipe),
        Value::Object(object) if has_type(object, RECIPE_TYPE) => Some(value),
        Value::Object(object) => object.get(GRAPH_KEY).and_then(find_recipe),
        _ => None,
    }
}

/// `@type` may be a single string or a list of strings.
fn has_type(object: &Map<String, Value>, wanted: &str) -> bool {
    match object.get(TYPE_KEY) {
        Some(Value::String(tag)) => tag == wanted,
        Some(Value::Array(tags)) => tags.iter().any(|tag| tag.as_str() == Some(wanted)),
        _ => false,
    }
}

fn normalize(entity: &Value) -> NormalizedRecipe {
    NormalizedRecipe {
        title: string_field(entity, "name"),
        image: entity.get("image").map(normalize_image),
        ingredients: normalize_ingredients(entity.get("recipeIngredient")),
        instructions: normalize_instructions(entity.get("recipeInstructions")),
        description: string_field(entity, "description"),
        cook_time: string_field(entity, "cookTime"),
        prep_time: string_field(entity, "prepTime"),
        recipe_yield: entity.get("recipeYield").cloned(),
    }
}

fn string_field(entity: &Value, key: &str) -> Option<String> {
    entity.get(key).and_then(Value::as_str).map(str::to_string)
}

/// An ImageObject is reduced to its url, anything else is kept as the page wrote it.
fn normalize_image(image: &Value) -> Value {
    match image {
        Value::Object(object) => match object.get("url") {
            Some(url) => url.clone(),
            None => image.clone(),
        },
        _ => image.clone(),
    }
}

fn normalize_ingredients(field: Option<&Value>) -> Vec<String> {
    match field {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(single)) => vec![single.clone()],
        _ => Vec::new(),
    }
}

/// Map each entry to text, then flatten exactly one level.
///
/// A nested list or a `HowToSection` contributes its children; anything nested
/// deeper than that is serialized rather than flattened further.
pub(crate) fn normalize_instructions(field: Option<&Value>) -> Vec<String> {
    match field {
        Some(Value::Array(steps)) => steps.iter().flat_map(map_instruction).collect(),
        Some(Value::String(single)) => vec![single.clone()],
        Some(other) => vec![step_text(other)],
        None => Vec::new(),
    }
}

fn map_instruction(step: &Value) -> Vec<String> {
    match step {
        Value::Array(sub_steps) => sub_steps.iter().map(step_text).collect(),
        Value::Object(object) if has_type(object, HOW_TO_SECTION_TYPE) => {
            match object.get("itemListElement") {
                Some(Value::Array(sub_steps)) => sub_steps.iter().map(step_text).collect(),
                _ => vec![step_text(step)],
            }
        }
        _ => vec![step_text(step)],
    }
}

fn step_text(step: &Value) -> String {
    match step {
        Value::String(text) => text.clone(),
        Value::Object(object) => {
            let text = object.get("text").and_then(Value::as_str);
            match text {
                Some(text) if has_type(object, HOW_TO_STEP_TYPE) => text.to_string(),
                Some(text) if !text.is_empty() => text.to_string(),
                _ => step.to_string(),
            }
        }
        _ => step.to_string(),
    }
}
