use axum::{extract::rejection::JsonRejection, extract::State, Json};
use log::info;
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::model::NormalizedRecipe;
use crate::notify::{InterestRequest, NotificationReceipt};
use crate::pipelines;

#[derive(Debug, Deserialize)]
pub struct ExtractBody {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub success: bool,
    pub recipe: NormalizedRecipe,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveInterestBody {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub recipe_title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveInterestResponse {
    pub success: bool,
    pub data: NotificationReceipt,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub strategy: String,
}

pub async fn extract(
    State(state): State<AppState>,
    payload: Result<Json<ExtractBody>, JsonRejection>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let Json(body) = payload?;
    let url = body.url.unwrap_or_default();

    let recipe = pipelines::url::process(&url, state.renderer.as_ref()).await?;
    Ok(Json(ExtractResponse {
        success: true,
        recipe,
    }))
}

pub async fn save_interest(
    State(state): State<AppState>,
    payload: Result<Json<SaveInterestBody>, JsonRejection>,
) -> Result<Json<SaveInterestResponse>, ApiError> {
    let Json(body) = payload?;
    let email = body
        .email
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("Email is required".to_string()))?;

    let request = InterestRequest {
        email,
        recipe_title: body.recipe_title,
    };
    let data = state.notifier.notify(&request).await?;
    info!("Recorded save interest for {:?}", request.recipe_title);

    Ok(Json(SaveInterestResponse {
        success: true,
        data,
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        strategy: state.renderer.strategy().to_string(),
    })
}
