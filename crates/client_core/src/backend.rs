use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::TurnError,
    protocol::{AskErrorBody, AskRequest, AskResponse},
};
use tracing::debug;
use url::Url;

/// Path of the ask endpoint, resolved against the server root.
pub const ASK_PATH: &str = "/ask";

/// The remote "ask" operation.
#[async_trait]
pub trait AskBackend: Send + Sync {
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, TurnError>;
}

#[async_trait]
impl<T> AskBackend for Arc<T>
where
    T: AskBackend + ?Sized,
{
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, TurnError> {
        (**self).ask(request).await
    }
}

#[derive(Debug, Clone)]
pub struct HttpAskClient {
    http: Client,
    ask_url: Url,
}

impl HttpAskClient {
    pub fn new(server_url: &str) -> Result<Self, url::ParseError> {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Result<Self, url::ParseError> {
        let ask_url = Url::parse(server_url.trim())?.join(ASK_PATH)?;
        Ok(Self { http, ask_url })
    }

    pub fn ask_url(&self) -> &Url {
        &self.ask_url
    }
}

#[async_trait]
impl AskBackend for HttpAskClient {
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, TurnError> {
        let response = self
            .http
            .post(self.ask_url.clone())
            .json(request)
            .send()
            .await
            .map_err(|err| TurnError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // A non-JSON error page still yields a status-derived message.
            let body = response.json::<AskErrorBody>().await.ok();
            debug!(status = status.as_u16(), "ask request rejected");
            return Err(TurnError::from_status(status.as_u16(), body));
        }

        response
            .json::<AskResponse>()
            .await
            .map_err(|err| TurnError::MalformedResponse(err.to_string()))
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
