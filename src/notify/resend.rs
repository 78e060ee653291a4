use super::{InterestNotifier, InterestRequest, NotificationReceipt};
use crate::config::NotifyConfig;
use crate::ImportError;
use async_trait::async_trait;
use html_escape::encode_text;
use log::{debug, error};
use reqwest::Client;
use serde_json::{json, Value};

const SUBJECT: &str = "New Recipe Save Interest!";

/// Sends interest notifications through the Resend e-mail API
pub struct ResendNotifier {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    from: String,
    to: Vec<String>,
}

impl ResendNotifier {
    /// Create a notifier from configuration
    pub fn new(config: &NotifyConfig) -> Self {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("RESEND_API_KEY").ok());

        ResendNotifier {
            client: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            from: config.from.clone(),
            to: config.to.clone(),
        }
    }
}

fn render_body(request: &InterestRequest) -> String {
    let title = request.recipe_title.as_deref().unwrap_or("Unknown");
    format!(
        r#"<div style="font-family: sans-serif; padding: 20px; color: #333;">
  <h2 style="color: #10b981;">New Interest recorded!</h2>
  <p>A user wants to save a recipe.</p>
  <hr style="border: none; border-top: 1px solid #eee; margin: 20px 0;" />
  <p><strong>User Email:</strong> {}</p>
  <p><strong>Recipe:</strong> {}</p>
  <hr style="border: none; border-top: 1px solid #eee; margin: 20px 0;" />
  <p style="font-size: 12px; color: #666;">Sent via Kitchen Vibe</p>
</div>"#,
        encode_text(&request.email),
        encode_text(title)
    )
}

#[async_trait]
impl InterestNotifier for ResendNotifier {
    async fn notify(&self, request: &InterestRequest) -> Result<NotificationReceipt, ImportError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ImportError::Notify("RESEND_API_KEY not found in config or environment".to_string()))?;
        if self.to.is_empty() {
            return Err(ImportError::Notify("No notification recipient configured".to_string()));
        }

        let response = self
            .client
            .post(format!("{}/emails", self.api_base))
            .bearer_auth(api_key)
            .json(&json!({
                "from": self.from,
                "to": self.to,
                "subject": SUBJECT,
                "html": render_body(request),
            }))
            .send()
            .await
            .map_err(|e| ImportError::Notify(e.to_string()))?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        debug!("Resend response {}: {:?}", status, body);

        if !status.is_success() {
            let message = body["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| format!("Resend request failed with status: {}", status));
            error!("Resend error: {}", message);
            return Err(ImportError::Notify(message));
        }

        Ok(NotificationReceipt {
            id: body["id"].as_str().map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(api_base: &str) -> NotifyConfig {
        NotifyConfig {
            api_key: Some("re_test".to_string()),
            api_base: api_base.to_string(),
            from: "Kitchen Vibe <onboarding@resend.dev>".to_string(),
            to: vec!["owner@example.com".to_string()],
        }
    }

    fn interest(title: Option<&str>) -> InterestRequest {
        InterestRequest {
            email: "cook@example.com".to_string(),
            recipe_title: title.map(str::to_string),
        }
    }

    #[test]
    fn test_body_escapes_user_input() {
        let body = render_body(&InterestRequest {
            email: "<script>@example.com".to_string(),
            recipe_title: Some("Mac & Cheese".to_string()),
        });
        assert!(body.contains("&lt;script&gt;@example.com"));
        assert!(body.contains("Mac &amp; Cheese"));
    }

    #[test]
    fn test_body_defaults_title() {
        assert!(render_body(&interest(None)).contains("<strong>Recipe:</strong> Unknown"));
    }

    #[tokio::test]
    async fn test_notify_posts_email() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/emails")
            .match_header("authorization", "Bearer re_test")
            .match_body(mockito::Matcher::PartialJson(json!({
                "to": ["owner@example.com"],
                "subject": "New Recipe Save Interest!"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "email_123"}"#)
            .create_async()
            .await;

        let notifier = ResendNotifier::new(&test_config(&server.url()));
        let receipt = notifier.notify(&interest(Some("Pancakes"))).await.unwrap();

        mock.assert_async().await;
        assert_eq!(receipt.id.as_deref(), Some("email_123"));
    }

    #[tokio::test]
    async fn test_notify_surfaces_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/emails")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name": "validation_error", "message": "Invalid `to` field."}"#)
            .create_async()
            .await;

        let notifier = ResendNotifier::new(&test_config(&server.url()));
        let result = notifier.notify(&interest(None)).await;

        match result {
            Err(ImportError::Notify(message)) => assert_eq!(message, "Invalid `to` field."),
            other => panic!("Expected notify error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_notify_requires_recipient() {
        let mut config = test_config("http://127.0.0.1:9");
        config.to.clear();

        let result = ResendNotifier::new(&config).notify(&interest(None)).await;
        assert!(matches!(result, Err(ImportError::Notify(_))));
    }
}
