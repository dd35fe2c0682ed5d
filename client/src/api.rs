use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{Bank, CreateBankRequest, ErrorResponse, UpdateBankRequest, API_KEY_HEADER};
use thiserror::Error;
use tracing::debug;

/// Default API root of a locally running registry
pub const DEFAULT_BASE_URL: &str = "http://localhost:5001/api";

#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered with a non-2xx status
    #[error("server returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ClientError {
    /// HTTP status of a remote failure
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// API client for the bank registry REST endpoints
#[derive(Clone)]
pub struct BankApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl Default for BankApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl BankApiClient {
    /// Create a client for the API rooted at `base_url` (e.g. `http://host:5001/api`)
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key: None,
        }
    }

    /// Send `key` in the `X-Api-Key` header of every request
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_banks(&self) -> ClientResult<Vec<Bank>> {
        let response = self.send(self.request(Method::GET, "/banks")).await?;
        decode(response).await
    }

    pub async fn get_bank(&self, id: i64) -> ClientResult<Bank> {
        let response = self
            .send(self.request(Method::GET, &format!("/banks/{}", id)))
            .await?;
        decode(response).await
    }

    pub async fn create_bank(&self, name: &str, location: &str) -> ClientResult<Bank> {
        let body = CreateBankRequest::new(name, location);
        let response = self
            .send(self.request(Method::POST, "/banks").json(&body))
            .await?;
        decode(response).await
    }

    /// Change the supplied fields of a bank
    pub async fn update_bank(&self, id: i64, changes: &UpdateBankRequest) -> ClientResult<Bank> {
        let response = self
            .send(self.request(Method::PUT, &format!("/banks/{}", id)).json(changes))
            .await?;
        decode(response).await
    }

    pub async fn delete_bank(&self, id: i64) -> ClientResult<()> {
        self.send(self.request(Method::DELETE, &format!("/banks/{}", id)))
            .await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let builder = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");

        match &self.api_key {
            Some(key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        }
    }

    /// Send the request and turn any non-2xx answer into [`ClientError::Remote`]
    async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await?;
        Err(ClientError::Remote {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

/// The server's `error` field, else the raw body, else the status reason
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
        return parsed.error;
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}
