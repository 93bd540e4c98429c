use reqwest::Method;
use solrkit_core::response::{decode, ResponseFormat};
use solrkit_core::{
    AddOptions, ClientConfig, Command, CommitOptions, Document, FieldValue, OptimizeOptions,
    Query, SearchResult,
};
use std::future::Future;
use std::sync::Arc;
use tracing::instrument::WithSubscriber;
use tracing::Instrument;

use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::{ClientError, Result};

/// Select responses are always requested in this format
const SEARCH_FORMAT: ResponseFormat = ResponseFormat::Json;

/// Solr REST API client.
///
/// Every call is one request and one response; nothing is queued, retried
/// or reordered. Ordering between dependent calls (add, then commit, then
/// search) is up to the caller awaiting each one. The client keeps no
/// mutable state, so clones can be used from concurrent tasks.
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    log: Option<tracing::Dispatch>,
}

impl Client {
    /// Create a new client for the core at the given base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(base_url))
    }

    /// Create a client using the default `reqwest` transport
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client that sends through a custom transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        reqwest::Url::parse(&config.base_url).map_err(|e| {
            ClientError::Config(format!("invalid base URL '{}': {}", config.base_url, e))
        })?;

        Ok(Self {
            config,
            transport,
            log: None,
        })
    }

    /// Send this client's log events and spans to `dispatch` instead of the
    /// global subscriber
    pub fn with_log_dispatch(mut self, dispatch: tracing::Dispatch) -> Self {
        self.log = Some(dispatch);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Check that the server answers on the base path
    pub async fn ping(&self) -> Result<()> {
        let url = self.config.ping_url();
        self.run("ping", &url, async {
            let response = self.send(HttpRequest::new(Method::HEAD, url.as_str())).await?;
            self.check_status(response)?;
            Ok(())
        })
        .await
    }

    /// Add one document
    pub async fn add(&self, document: Document) -> Result<()> {
        self.add_with_options(vec![document], AddOptions::default())
            .await
    }

    /// Add several documents in one `<add>` command
    pub async fn add_all(&self, documents: Vec<Document>) -> Result<()> {
        self.add_with_options(documents, AddOptions::default())
            .await
    }

    /// Add documents with `overwrite` / `commitWithin`
    pub async fn add_with_options(
        &self,
        documents: Vec<Document>,
        options: AddOptions,
    ) -> Result<()> {
        self.execute(&Command::Add { documents, options }).await
    }

    /// Add one JSON object, or an array of objects, as documents
    pub async fn add_json(&self, value: serde_json::Value, options: AddOptions) -> Result<()> {
        let documents = solrkit_core::documents_from_json(value)?;
        self.add_with_options(documents, options).await
    }

    /// Delete documents by id
    pub async fn delete<I, T>(&self, ids: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<FieldValue>,
    {
        let ids = ids.into_iter().map(Into::into).collect();
        self.execute(&Command::Delete { ids }).await
    }

    /// Delete every document matching a query
    pub async fn delete_by_query(&self, query: impl Into<String>) -> Result<()> {
        self.execute(&Command::DeleteByQuery {
            query: query.into(),
        })
        .await
    }

    pub async fn commit(&self) -> Result<()> {
        self.commit_with_options(CommitOptions::default()).await
    }

    pub async fn commit_with_options(&self, options: CommitOptions) -> Result<()> {
        self.execute(&Command::Commit(options)).await
    }

    /// Discard uncommitted adds and deletes
    pub async fn rollback(&self) -> Result<()> {
        self.execute(&Command::Rollback).await
    }

    /// Merge index segments; also commits
    pub async fn optimize(&self) -> Result<()> {
        self.optimize_with_options(OptimizeOptions::default())
            .await
    }

    pub async fn optimize_with_options(&self, options: OptimizeOptions) -> Result<()> {
        self.execute(&Command::Optimize(options)).await
    }

    /// Encode and post any update command.
    ///
    /// Encoding happens before anything is sent, so invalid input never
    /// reaches the server.
    pub async fn execute(&self, command: &Command) -> Result<()> {
        let url = self.config.update_url();
        self.run(command.name(), &url, async {
            let payload = command.encode()?;
            let request = HttpRequest::new(Method::POST, url.as_str())
                .with_body(payload.content_type, payload.body);
            let response = self.send(request).await?;
            self.check_status(response)?;
            Ok(())
        })
        .await
    }

    /// Run a select query.
    ///
    /// Accepts a plain query string or a [`Query`] with extra parameters.
    pub async fn search(&self, query: impl Into<Query>) -> Result<SearchResult> {
        let query = query.into();
        let url = self.config.select_url();
        self.run("search", &url, async {
            let request = HttpRequest::new(Method::GET, url.as_str())
                .with_query(query.to_params(SEARCH_FORMAT.wt()));
            let response = self.send(request).await?;
            let response = self.check_status(response)?;
            Ok(decode(&response.body, SEARCH_FORMAT)?)
        })
        .await
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        tracing::debug!("{} {}", request.method, request.url);
        let response = self.transport.send(request).await?;
        tracing::debug!("HTTP {} ({} bytes)", response.status, response.body.len());
        Ok(response)
    }

    fn check_status(&self, response: HttpResponse) -> Result<HttpResponse> {
        if self.config.is_success(response.status) {
            return Ok(response);
        }

        tracing::warn!("Solr returned HTTP {}", response.status);
        Err(ClientError::WrongHttpStatus {
            status: response.status,
            expected: self.config.success_statuses.clone(),
            body: response.body,
        })
    }

    /// Drive one operation inside its span, under the injected dispatcher
    /// when there is one
    async fn run<T, F>(&self, op: &'static str, url: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let traced = async move {
            let span = tracing::info_span!("solr", op, url);
            let result = fut.instrument(span.clone()).await;
            if let Err(err) = &result {
                span.in_scope(|| tracing::warn!("{} failed: {}", op, err));
            }
            result
        };

        match &self.log {
            Some(dispatch) => traced.with_subscriber(dispatch.clone()).await,
            None => traced.await,
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("log", &self.log.is_some())
            .finish_non_exhaustive()
    }
}
