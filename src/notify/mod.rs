mod resend;

pub use resend::ResendNotifier;

use crate::ImportError;
use async_trait::async_trait;
use serde::Serialize;

/// Someone asked to save a recipe
#[derive(Debug, Clone)]
pub struct InterestRequest {
    pub email: String,
    pub recipe_title: Option<String>,
}

/// Acknowledgement from the delivery backend
#[derive(Debug, Clone, Default, Serialize)]
pub struct NotificationReceipt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Delivers interest notifications; independent of recipe extraction
#[async_trait]
pub trait InterestNotifier: Send + Sync {
    async fn notify(&self, request: &InterestRequest) -> Result<NotificationReceipt, ImportError>;
}
