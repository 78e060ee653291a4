use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::ImportError;

/// A validated page to render.
///
/// Only `http` and `https` URLs are accepted, so a request that reaches the
/// renderer never needs to be checked again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub url: Url,
}

impl RenderRequest {
    pub fn parse(raw: &str) -> Result<Self, ImportError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ImportError::MissingUrl);
        }

        let url = Url::parse(raw).map_err(|e| ImportError::InvalidUrl(format!("{raw}: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(Self { url }),
            other => Err(ImportError::InvalidUrl(format!(
                "{raw}: unsupported scheme '{other}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

/// Serialized DOM of a page after its initial content load.
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub html: String,
}

/// Recipe as returned to callers.
///
/// Text fields are passed through from the page's JSON-LD untouched. `image`
/// and `yield` keep whatever shape the page used (string, object url or
/// list); picking a single displayable value is left to the presentation
/// layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecipe {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Value>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<String>,
    #[serde(rename = "yield", skip_serializing_if = "Option::is_none")]
    pub recipe_yield: Option<Value>,
}
