//! Authenticated HTTP client bound to one engine REST root.

use super::{RestError, RestResult};
use crate::config::EngineConfig;
use reqwest::header::{ETAG, IF_MATCH};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};
use url::Url;

/// Body and metadata of a successful engine response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestResponse {
    url: String,
    status: u16,
    etag: Option<String>,
    body: String,
}

impl RestResponse {
    /// Returns the URL the response was read from.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the `ETag` header, when present.
    #[must_use]
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    /// Returns the raw body text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Decode`] when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> RestResult<T> {
        serde_json::from_str(&self.body).map_err(|source| RestError::Decode {
            url: self.url.clone(),
            source,
        })
    }

    /// Decodes the body as JSON, treating an empty body, `null` or `{}` as
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Decode`] when a non-empty body does not match `T`.
    pub fn json_opt<T: DeserializeOwned>(&self) -> RestResult<Option<T>> {
        if self.body.trim().is_empty() {
            return Ok(None);
        }
        let value: Value = self.json()?;
        let is_empty = match &value {
            Value::Null => true,
            Value::Object(members) => members.is_empty(),
            _ => false,
        };
        if is_empty {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|source| RestError::Decode {
                url: self.url.clone(),
                source,
            })
    }
}

/// HTTP client for one engine session.
///
/// Every request carries HTTP basic credentials from the session
/// configuration. Non-success statuses are returned as
/// [`RestError::Status`] with the body preserved verbatim.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: String,
}

impl RestClient {
    /// Builds a client from session settings.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Client`] when the TLS backend cannot be
    /// initialised.
    pub fn new(config: &EngineConfig) -> RestResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(RestError::Client)?;
        Ok(Self {
            http,
            base_url: config.base_url().clone(),
            username: config.username().to_owned(),
            password: config.password().to_owned(),
        })
    }

    /// Returns the REST root.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a URI returned by the engine against the REST root.
    ///
    /// Relative URIs resolve beneath the root; absolute URLs pass through.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::InvalidUri`] when the URI cannot be parsed.
    pub fn resolve(&self, uri: &str) -> RestResult<Url> {
        self.base_url
            .join(uri.trim())
            .map_err(|source| RestError::InvalidUri {
                uri: uri.to_owned(),
                source,
            })
    }

    /// Builds a URL from path segments below the REST root.
    ///
    /// Segments are percent-encoded, so queue and template names may contain
    /// spaces or slashes.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::InvalidBase`] when the root cannot carry path
    /// segments.
    pub fn endpoint<I, S>(&self, segments: I) -> RestResult<Url>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RestError::InvalidBase(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issues a GET request.
    ///
    /// # Errors
    ///
    /// Returns [`RestError`] on transport failure or a non-success status.
    pub async fn get(&self, url: Url) -> RestResult<RestResponse> {
        let request = self.http.get(url.clone());
        self.execute(Method::GET, url, request).await
    }

    /// Issues a PUT request, optionally conditional on `if_match` and with a
    /// JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`RestError`] on transport failure or a non-success status.
    pub async fn put(
        &self,
        url: Url,
        if_match: Option<&str>,
        body: Option<&Value>,
    ) -> RestResult<RestResponse> {
        let mut request = self.http.put(url.clone());
        if let Some(token) = if_match {
            request = request.header(IF_MATCH, token);
        }
        if let Some(json) = body {
            request = request.json(json);
        }
        self.execute(Method::PUT, url, request).await
    }

    /// Issues a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`RestError`] on transport failure or a non-success status.
    pub async fn post(&self, url: Url, body: &Value) -> RestResult<RestResponse> {
        let request = self.http.post(url.clone()).json(body);
        self.execute(Method::POST, url, request).await
    }

    async fn execute(
        &self,
        method: Method,
        url: Url,
        request: RequestBuilder,
    ) -> RestResult<RestResponse> {
        debug!(%method, %url, "engine request");
        let response = request
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|source| RestError::Transport {
                method: method.to_string(),
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response
            .text()
            .await
            .map_err(|source| RestError::Transport {
                method: method.to_string(),
                url: url.to_string(),
                source,
            })?;

        if !status.is_success() {
            warn!(%method, %url, status = status.as_u16(), "engine rejected request");
            return Err(RestError::Status {
                method: method.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(RestResponse {
            url: url.to_string(),
            status: status.as_u16(),
            etag,
            body,
        })
    }
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
