use crate::domain::{ListParams, NotificationPage, NotificationSource, TransportError};
use crate::infra::CredentialStore;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

#[derive(Deserialize)]
struct UnreadCountResponse {
    #[serde(default)]
    count: u64,
}

#[derive(Deserialize)]
struct AckResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

fn default_success() -> bool {
    true
}

/// `NotificationSource` backed by the eTuitionBD REST API.
#[derive(Clone)]
pub struct RestNotificationSource {
    client: Client,
    base_url: String,
    credentials: Arc<CredentialStore>,
}

impl RestNotificationSource {
    pub fn new(base_url: impl Into<String>, credentials: Arc<CredentialStore>) -> anyhow::Result<Self> {
        let client = Client::builder().user_agent(Self::get_user_agent()).build()?;
        Ok(Self::with_client(client, base_url, credentials))
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        credentials: Arc<CredentialStore>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        Url::parse(&format!("{}/notifications{}", self.base_url, path))
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))
    }

    fn item_endpoint(&self, id: &str, suffix: &str) -> Result<Url, TransportError> {
        self.endpoint(&format!("/{}{}", urlencoding::encode(id), suffix))
    }

    fn authorized(&self, method: Method, url: Url, token: &str) -> RequestBuilder {
        log::debug!("{method} {url}");
        self.client.request(method, url).bearer_auth(token)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, TransportError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            log::info!("Server rejected the stored token, clearing credentials");
            if let Err(e) = self.credentials.clear().await {
                log::error!("Failed to clear credentials: {e}");
            }
            return Err(TransportError::Unauthenticated);
        }
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }

        Ok(response.json::<T>().await?)
    }

    async fn mutate(&self, method: Method, url: Url) -> Result<(), TransportError> {
        let token = self
            .credentials
            .token()
            .ok_or(TransportError::Unauthenticated)?;

        let ack: AckResponse = self.send(self.authorized(method, url, &token)).await?;
        if !ack.success {
            return Err(TransportError::Rejected(
                ack.message.unwrap_or_else(|| "operation failed".to_string()),
            ));
        }
        Ok(())
    }

    fn get_user_agent() -> String {
        format!("EtuitionNotify/{}", env!("CARGO_PKG_VERSION"))
    }
}

#[async_trait]
impl NotificationSource for RestNotificationSource {
    async fn list(&self, params: ListParams) -> Result<NotificationPage, TransportError> {
        let Some(token) = self.credentials.token() else {
            return Ok(NotificationPage::empty());
        };

        let url = Url::parse_with_params(self.endpoint("")?.as_str(), params.query_pairs())
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        self.send(self.authorized(Method::GET, url, &token)).await
    }

    async fn unread_count(&self) -> Result<u64, TransportError> {
        let Some(token) = self.credentials.token() else {
            return Ok(0);
        };

        let url = self.endpoint("/unread-count")?;
        let response: UnreadCountResponse =
            self.send(self.authorized(Method::GET, url, &token)).await?;
        Ok(response.count)
    }

    async fn mark_read(&self, id: &str) -> Result<(), TransportError> {
        self.mutate(Method::PATCH, self.item_endpoint(id, "/read")?)
            .await
    }

    async fn mark_all_read(&self) -> Result<(), TransportError> {
        self.mutate(Method::PATCH, self.endpoint("/mark-all-read")?)
            .await
    }

    async fn delete(&self, id: &str) -> Result<(), TransportError> {
        self.mutate(Method::DELETE, self.item_endpoint(id, "")?)
            .await
    }

    async fn delete_all_read(&self) -> Result<(), TransportError> {
        self.mutate(Method::DELETE, self.endpoint("/clear-read")?)
            .await
    }
}
