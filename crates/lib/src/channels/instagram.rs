//! Instagram delivery via the Graph API send endpoint.

use async_trait::async_trait;

use crate::channels::Responder;

const GRAPH_API_BASE: &str = "https://graph.facebook.com/v18.0";

/// Sends replies through POST /me/messages with the bot's page access token.
pub struct InstagramResponder {
    base_url: String,
    client: reqwest::Client,
}

impl InstagramResponder {
    pub fn new(base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| GRAPH_API_BASE.to_string());
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Responder for InstagramResponder {
    async fn deliver(
        &self,
        customer_id: &str,
        text: &str,
        credential: &str,
    ) -> Result<(), String> {
        let url = format!("{}/me/messages", self.base_url);
        let body = serde_json::json!({
            "recipient": { "id": customer_id },
            "message": { "text": text },
        });
        let res = self
            .client
            .post(&url)
            .query(&[("access_token", credential)])
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("send failed: {} {}", status, body));
        }
        Ok(())
    }
}
