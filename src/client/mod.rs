pub mod types;

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ApiConfig;
use crate::status::poller::StatusSource;
use types::{
    BatchAnalysis, ChatMessage, ChatReply, FraudVerdict, InjectionVerdict, PhishingAnalysis,
    SimulateAttackOutcome, StreamStatus, Transaction, TransactionFeatures,
};

/// HTTP client for the fraud-detection backend.
/// A plain transport: no retries, no interpretation of scores or labels.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> eyre::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| eyre::eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// GET /stream-status
    pub async fn stream_status(&self) -> eyre::Result<StreamStatus> {
        self.get_json("stream-status").await
    }

    /// POST /analyze-text
    pub async fn analyze_text(&self, text: &str) -> eyre::Result<PhishingAnalysis> {
        self.post_json("analyze-text", &serde_json::json!({ "text": text }))
            .await
    }

    /// POST /simulate-attack
    pub async fn simulate_attack(&self) -> eyre::Result<SimulateAttackOutcome> {
        self.post_json("simulate-attack", &serde_json::json!({})).await
    }

    /// POST /analyze-transactions
    pub async fn analyze_transactions(
        &self,
        transactions: &[Transaction],
    ) -> eyre::Result<BatchAnalysis> {
        self.post_json(
            "analyze-transactions",
            &serde_json::json!({ "transactions": transactions }),
        )
        .await
    }

    /// POST /score-transaction
    pub async fn score_transaction(
        &self,
        features: &TransactionFeatures,
    ) -> eyre::Result<FraudVerdict> {
        self.post_json("score-transaction", features).await
    }

    /// POST /check-agent-message
    pub async fn check_agent_message(&self, message: &str) -> eyre::Result<InjectionVerdict> {
        self.post_json("check-agent-message", &serde_json::json!({ "message": message }))
            .await
    }

    /// POST /chat
    pub async fn chat(&self, messages: &[ChatMessage]) -> eyre::Result<String> {
        let reply: ChatReply = self
            .post_json("chat", &serde_json::json!({ "messages": messages }))
            .await?;
        Ok(reply.reply)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> eyre::Result<T> {
        let url = self.url(path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| eyre::eyre!("Request to {} failed: {}", url, e))?;
        decode(&url, response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> eyre::Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| eyre::eyre!("Request to {} failed: {}", url, e))?;
        decode(&url, response).await
    }
}

async fn decode<T: DeserializeOwned>(url: &str, response: reqwest::Response) -> eyre::Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(eyre::eyre!("{} returned {}", url, status));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| eyre::eyre!("Malformed response from {}: {}", url, e))
}

impl StatusSource for ApiClient {
    async fn fetch_status(&self) -> eyre::Result<StreamStatus> {
        self.stream_status().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = ApiClient::new(&ApiConfig {
            base_url: "http://localhost:8000/api/".to_string(),
            timeout_secs: 30,
        })
        .unwrap();
        assert_eq!(client.url("stream-status"), "http://localhost:8000/api/stream-status");
    }
}
