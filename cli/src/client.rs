//! HTTP client for the Flowdeck API.
//!
//! Wraps `reqwest` with the bearer token and timeout from [`ClientConfig`],
//! and turns non-2xx responses into [`ClientError`]s that carry a severity.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared::config::ClientConfig;
use shared::models::{BlockConfig, Flow, Metric, MetricKind, Notebook, NotebookPatch, Tenant};
use shared::persistence::{NotebookSink, PersistError};
use shared::promql::GeneratedQuery;
use shared::uuid::Uuid;
use std::future::Future;
use thiserror::Error;

/// How loudly a failure should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The request was wrong; the user can fix it.
    Warning,
    /// The server or network failed.
    Error,
}

/// Errors returned by [`ApiClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// Response status.
        status: StatusCode,
        /// Message from the error body, or the raw body.
        message: String,
    },

    /// The request could not be sent.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The response body was not what was expected.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The client could not be built from its configuration.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Classifies the error: client-side HTTP errors are warnings,
    /// everything else is an error.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Http { status, .. } if status.is_client_error() => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Logs the error at the level matching its severity.
    pub fn report(&self, context: &str) {
        match self.severity() {
            Severity::Warning => tracing::warn!(error = %self, "{context}"),
            Severity::Error => tracing::error!(error = %self, "{context}"),
        }
    }

    fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct MetricList {
    metrics: Vec<Metric>,
}

#[derive(Deserialize)]
struct LabelList {
    labels: Vec<String>,
}

#[derive(Deserialize)]
struct TenantList {
    tenants: Vec<Tenant>,
}

/// One page of flows.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FlowPage {
    /// Flows on the page, newest first.
    pub flows: Vec<Flow>,
    /// Number of flows matching the filters.
    pub total_count: usize,
}

/// Filters for listing flows.
#[derive(Debug, Default, Serialize)]
pub struct FlowFilter {
    /// Tenant filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Uuid>,
    /// Status filter ("running", "failed", ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Page offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

/// Client for the Flowdeck REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    /// Builds a client from its configuration.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if the token is not a valid header value
    /// or the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ClientError::Config(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// The configuration the client was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.config.url(path))
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or(body);
            return Err(ClientError::Http { status, message });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::from_reqwest(&e))
    }

    /// Fetches the health document.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        self.execute(self.request(Method::GET, "/health")).await
    }

    /// Lists catalog metrics.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn metrics(
        &self,
        kind: Option<MetricKind>,
        search: Option<&str>,
    ) -> Result<Vec<Metric>, ClientError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(kind) = kind {
            query.push(("kind", kind.to_string()));
        }
        if let Some(search) = search {
            query.push(("search", search.to_string()));
        }
        let list: MetricList = self
            .execute(self.request(Method::GET, "/api/metrics").query(&query))
            .await?;
        Ok(list.metrics)
    }

    /// Lists label names, for one metric or across the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn labels(&self, metric: Option<&str>) -> Result<Vec<String>, ClientError> {
        let mut request = self.request(Method::GET, "/api/labels");
        if let Some(metric) = metric {
            request = request.query(&[("metric", metric)]);
        }
        let list: LabelList = self.execute(request).await?;
        Ok(list.labels)
    }

    /// Lists tenants.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn tenants(&self) -> Result<Vec<Tenant>, ClientError> {
        let list: TenantList = self.execute(self.request(Method::GET, "/api/tenants")).await?;
        Ok(list.tenants)
    }

    /// Lists one page of flows.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn flows(&self, filter: &FlowFilter) -> Result<FlowPage, ClientError> {
        self.execute(self.request(Method::GET, "/api/flows").query(filter))
            .await
    }

    /// Asks the server to generate a query for a catalog metric.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the
    /// selection.
    pub async fn promql(&self, config: &BlockConfig) -> Result<GeneratedQuery, ClientError> {
        self.execute(self.request(Method::POST, "/api/promql").json(config))
            .await
    }

    /// Fetches a notebook.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn notebook(&self, id: Uuid) -> Result<Notebook, ClientError> {
        self.execute(self.request(Method::GET, &format!("/api/notebooks/{id}")))
            .await
    }

    /// Applies a partial update to a notebook.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the update is rejected.
    pub async fn patch_notebook(
        &self,
        id: Uuid,
        patch: &NotebookPatch,
    ) -> Result<Notebook, ClientError> {
        self.execute(
            self.request(Method::PATCH, &format!("/api/notebooks/{id}"))
                .json(patch),
        )
        .await
    }
}

impl NotebookSink for ApiClient {
    fn save(
        &self,
        id: Uuid,
        patch: NotebookPatch,
    ) -> impl Future<Output = Result<(), PersistError>> + Send {
        let client = self.clone();
        async move {
            match client.patch_notebook(id, &patch).await {
                Ok(_) => Ok(()),
                Err(ClientError::Http { status, .. }) if status == StatusCode::NOT_FOUND => {
                    Err(PersistError::NotFound(id))
                }
                Err(e) => {
                    e.report("Failed to save notebook");
                    Err(PersistError::Rejected(e.to_string()))
                }
            }
        }
    }
}

/// Logs a failed request and falls back to an empty value.
pub fn or_empty<T: Default>(result: Result<T, ClientError>, context: &str) -> T {
    result.unwrap_or_else(|e| {
        e.report(context);
        T::default()
    })
}
