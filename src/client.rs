//! HTTP client for the question/answer backend.
//!
//! Two endpoints: `GET /get_balance` for the wallet and `POST /ask` for a
//! question. A non-success status is a backend-reported failure and its
//! `error` field (when present) is surfaced verbatim; connection failures
//! and unparsable bodies are transport failures. No retries, no
//! client-enforced timeout.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

fn default_currency() -> String {
    "sats".to_string()
}

#[derive(Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

/// Successful `POST /ask` response.
#[derive(Debug, Clone, Deserialize)]
pub struct AskReply {
    pub answer: String,
    pub final_balance: f64,
    pub balance_difference: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Successful `GET /get_balance` response.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceInfo {
    pub balance: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-success HTTP status. `message` is the body's `error` field when
    /// present, otherwise a generic fallback.
    #[error("{message}")]
    Backend { status: StatusCode, message: String },
    /// Network unreachable, or a success status with an unparsable body.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    /// The spawned request task died before producing a result.
    #[error("request task failed: {0}")]
    Task(String),
}

impl ClientError {
    /// Banner text shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Backend { message, .. } => message.clone(),
            ClientError::Transport(err) => {
                format!("Network error: {err}. Check that the backend is reachable.")
            }
            ClientError::Task(msg) => format!("Request failed unexpectedly: {msg}"),
        }
    }
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_balance(&self) -> Result<BalanceInfo, ClientError> {
        let url = format!("{}/get_balance", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Self::backend_error(response).await);
        }

        Ok(response.json().await?)
    }

    pub async fn ask(&self, question: &str) -> Result<AskReply, ClientError> {
        let url = format!("{}/ask", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&AskRequest { question })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::backend_error(response).await);
        }

        Ok(response.json().await?)
    }

    async fn backend_error(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| "An error occurred while processing your request.".to_string());
        ClientError::Backend { status, message }
    }
}
