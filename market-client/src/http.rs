// market-client/src/http.rs
// HTTP adapter - base URL, JSON, token injection and the 401 hook

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::ErrorBody;

use crate::config::{ApiGroup, ClientConfig};
use crate::error::{ClientError, ClientResult, GENERIC_SERVER_ERROR};
use crate::session::SessionContext;

/// Query string pairs
pub type QueryParams = [(String, String)];

/// HTTP client trait
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get<T: DeserializeOwned>(
        &self,
        group: ApiGroup,
        path: &str,
        query: &QueryParams,
    ) -> ClientResult<T>;

    async fn post<T: DeserializeOwned, B: serde::Serialize + std::marker::Sync>(
        &self,
        group: ApiGroup,
        path: &str,
        body: &B,
    ) -> ClientResult<T>;

    /// Session the client reads its token from
    fn session(&self) -> &SessionContext;
}

/// Network HTTP client
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    config: ClientConfig,
    session: SessionContext,
}

impl NetworkHttpClient {
    pub fn new(config: ClientConfig, session: SessionContext) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            client,
            config,
            session,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Authorization header for a group, using the token current right now
    fn auth_header(&self, group: ApiGroup) -> Option<String> {
        let scheme = self.config.group(group).auth_scheme;
        self.session.token().map(|t| scheme.header_value(&t))
    }

    fn request(&self, method: reqwest::Method, group: ApiGroup, path: &str) -> reqwest::RequestBuilder {
        let url = self.config.group(group).url(path);
        let mut req = self
            .client
            .request(method, &url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(auth) = self.auth_header(group) {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }
        req
    }

    /// Single response pipeline for every call
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();
        let url = response.url().path().to_string();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.text().map(str::to_string));

            if status == StatusCode::UNAUTHORIZED {
                tracing::warn!(path = %url, "Received 401, invalidating session");
                self.session.invalidate();
                return Err(ClientError::Unauthorized(
                    message.unwrap_or_else(|| "Unauthorized".into()),
                ));
            }

            tracing::debug!(path = %url, status = status.as_u16(), "Request rejected");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: message.unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string()),
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return serde_json::from_str("null")
                .map_err(|_| ClientError::InvalidResponse(format!("{}: empty body", url)));
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::InvalidResponse(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl HttpClient for NetworkHttpClient {
    async fn get<T: DeserializeOwned>(
        &self,
        group: ApiGroup,
        path: &str,
        query: &QueryParams,
    ) -> ClientResult<T> {
        let req = self.request(reqwest::Method::GET, group, path).query(query);
        tracing::debug!(?group, path, "GET");
        let response = req.send().await?;
        self.handle_response(response).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize + std::marker::Sync>(
        &self,
        group: ApiGroup,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let req = self.request(reqwest::Method::POST, group, path).json(body);
        tracing::debug!(?group, path, "POST");
        let response = req.send().await?;
        self.handle_response(response).await
    }

    fn session(&self) -> &SessionContext {
        &self.session
    }
}
