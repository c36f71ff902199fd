//! HTTP backend implementation.
//!
//! Maps each [`Backend`] call onto a REST route under a base URL using
//! `reqwest`:
//!
//! | call        | route                                   |
//! |-------------|-----------------------------------------|
//! | `load`      | `GET {base}/{path}?page&perPage&sort`   |
//! | `get_by_id` | `GET {base}/{path}/{id}`                |
//! | `push`      | `POST {base}/{path}`                    |
//! | `set`       | `PUT {base}/{path}/{id}`                |
//! | `remove`    | `DELETE {base}/{path}/{id}`             |
//!
//! Successful responses are returned undecoded as [`Payload::Envelope`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, header};
use url::Url;

use super::{Backend, BackendError, Envelope, Payload};
use crate::{Error, Pagination, Result, user::User};

/// Connection settings for [`HttpBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Base URL every collection path is appended to.
    pub base_url: Url,
    /// Authenticated user reported by [`Backend::user_id`].
    pub user_id: Option<String>,
    /// Bearer token attached to every request.
    pub token: Option<String>,
    /// Per-request timeout.
    pub timeout: Option<Duration>,
}

impl HttpBackendConfig {
    /// Configuration for `base_url` with no credentials and no timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| BackendError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            }
            .into());
        }
        Ok(Self {
            base_url,
            user_id: None,
            token: None,
            timeout: None,
        })
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// REST client implementing [`Backend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: HttpBackendConfig,
}

impl HttpBackend {
    /// Create a new HTTP backend from its configuration.
    pub fn new(config: HttpBackendConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| BackendError::Request {
            url: config.base_url.to_string(),
            reason: format!("Failed to build client: {e}"),
        })?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpBackendConfig {
        &self.config
    }

    /// Build `{base}/{segments...}`, percent-encoding each segment.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidUrl {
                url: self.config.base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Payload> {
        let request = match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| BackendError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }
            .into());
        }

        let body = response.text().await.map_err(|e| BackendError::Request {
            url: url.to_string(),
            reason: format!("Failed to read response: {e}"),
        })?;
        Ok(Payload::Envelope(Envelope::new(status.as_u16(), body)))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn load(&self, path: &str, pagination: Option<&Pagination>) -> Result<Payload> {
        let mut url = self.url(&[path])?;
        if let Some(pagination) = pagination {
            let pairs = pagination.query_pairs();
            if !pairs.is_empty() {
                url.query_pairs_mut().extend_pairs(pairs);
            }
        }
        self.send(self.client.get(url.clone()), &url).await
    }

    async fn get_by_id(&self, path: &str, id: &str) -> Result<Payload> {
        let url = self.url(&[path, id])?;
        self.send(self.client.get(url.clone()), &url).await
    }

    async fn push(&self, path: &str, body: String) -> Result<Payload> {
        let url = self.url(&[path])?;
        let request = self
            .client
            .post(url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(body);
        self.send(request, &url).await
    }

    async fn set(&self, path: &str, id: &str, user: &User) -> Result<Payload> {
        let url = self.url(&[path, id])?;
        let body = serde_json::to_string(user).map_err(Error::Serialize)?;
        let request = self
            .client
            .put(url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(body);
        self.send(request, &url).await
    }

    async fn remove(&self, path: &str, id: &str) -> Result<Payload> {
        let url = self.url(&[path, id])?;
        self.send(self.client.delete(url.clone()), &url).await
    }

    fn user_id(&self) -> Option<String> {
        self.config.user_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_invalid_urls() {
        assert!(HttpBackendConfig::new("not a url").is_err());
        assert!(HttpBackendConfig::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn url_appends_escaped_segments() {
        let config = HttpBackendConfig::new("http://localhost:3000/api/").unwrap();
        let backend = HttpBackend::new(config).unwrap();

        let url = backend.url(&["Users", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/Users/a%20b%2Fc");
    }

    #[test]
    fn user_id_comes_from_config() {
        let config = HttpBackendConfig::new("http://localhost")
            .unwrap()
            .with_user_id("me")
            .with_token("secret")
            .with_timeout(Duration::from_secs(2));
        let backend = HttpBackend::new(config).unwrap();

        assert_eq!(backend.user_id().as_deref(), Some("me"));
        assert_eq!(backend.config().timeout, Some(Duration::from_secs(2)));
    }
}
