use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7"),
    ("accept-language", "en-US,en;q=0.9"),
    ("referer", "https://www.google.com/"),
    ("upgrade-insecure-requests", "1"),
    ("sec-ch-ua", r#""Not_A Brand";v="8", "Chromium";v="120", "Google Chrome";v="120""#),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", r#""Windows""#),
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "cross-site"),
    ("sec-fetch-user", "?1"),
    ("cache-control", "max-age=0"),
];

/// Outcome of a plain HTTP request to a recipe page
#[derive(Debug, Serialize)]
pub struct ProbeReport {
    pub url: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Plain HTTP client dressed up as a desktop browser.
///
/// Used to check whether a site blocks non-browser clients before blaming the
/// renderer; the extraction pipeline never goes through it.
pub struct RequestFetcher {
    client: Client,
}

impl RequestFetcher {
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let timeout = timeout.unwrap_or(Duration::from_secs(10));
        let mut headers = HeaderMap::new();
        for (name, value) in BROWSER_HEADERS {
            headers.insert(*name, HeaderValue::from_static(*value));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }

    pub async fn probe(&self, url: &str) -> Result<ProbeReport, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(ProbeReport {
            url: response.url().to_string(),
            status: response.status().as_u16(),
            content_type,
        })
    }
}
