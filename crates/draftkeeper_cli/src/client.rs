//! HTTP client for the Draftkeeper API, plus the [`Persist`] adapter that lets
//! an autosave coordinator write through it.

use draftkeeper_core::models::document::{Document, DocumentMeta};
use draftkeeper_core::{DocumentId, Persist, PersistFuture, PersistenceError, OWNER_HEADER};
use serde_json::{json, Value};

pub(crate) fn error_message_for_response(status: reqwest::StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return value
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or(body)
            .to_string();
    }

    body.to_string()
}

pub(crate) fn api_url(server: &str, segments: &[&str]) -> Result<reqwest::Url, String> {
    let mut url = reqwest::Url::parse(server)
        .map_err(|err| format!("Invalid server URL '{}': {}", server, err))?;
    let mut path = url
        .path_segments_mut()
        .map_err(|_| "Server URL cannot be used as an API base".to_string())?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(url)
}

pub(crate) fn normalize_server(server: String) -> String {
    let trimmed = server.trim();
    if let Ok(mut url) = reqwest::Url::parse(trimmed) {
        let should_normalize_localhost =
            url.scheme().eq_ignore_ascii_case("http") && url.host_str() == Some("localhost");
        if should_normalize_localhost && url.set_host(Some("127.0.0.1")).is_err() {
            return server;
        }
        let mut normalized = url.to_string();
        while normalized.ends_with('/') {
            normalized.pop();
        }
        return normalized;
    }
    server
}

/// Map a non-success response onto the persistence error taxonomy.
pub(crate) async fn error_from_response(res: reqwest::Response) -> PersistenceError {
    let status = res.status();
    let body = match res.text().await {
        Ok(body) => body,
        Err(err) => format!("failed to read error response body: {}", err),
    };
    let message = error_message_for_response(status, &body);
    if status == reqwest::StatusCode::LOCKED {
        PersistenceError::Locked(message)
    } else {
        PersistenceError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

fn transport(err: reqwest::Error) -> PersistenceError {
    PersistenceError::Transport(err.to_string())
}

fn invalid_url(message: String) -> PersistenceError {
    PersistenceError::Transport(message)
}

/// Thin typed wrapper over the document and lock endpoints.
#[derive(Clone)]
pub(crate) struct ApiClient {
    http: reqwest::Client,
    server: String,
    owner: Option<String>,
}

impl ApiClient {
    pub(crate) fn new(http: reqwest::Client, server: String, owner: Option<String>) -> Self {
        Self {
            http,
            server,
            owner,
        }
    }

    pub(crate) fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    fn url(&self, segments: &[&str]) -> Result<reqwest::Url, PersistenceError> {
        api_url(&self.server, segments).map_err(invalid_url)
    }

    fn with_owner(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.owner {
            Some(owner) => request.header(OWNER_HEADER, owner.as_str()),
            None => request,
        }
    }

    /// Fetch a document, returning `None` on 404.
    pub(crate) async fn get_document(&self, id: &str) -> Result<Option<Document>, PersistenceError> {
        let url = self.url(&["api", "document", id])?;
        let res = self.http.get(url).send().await.map_err(transport)?;
        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !res.status().is_success() {
            return Err(error_from_response(res).await);
        }
        res.json().await.map(Some).map_err(transport)
    }

    pub(crate) async fn put_document(
        &self,
        id: &str,
        content: String,
    ) -> Result<Document, PersistenceError> {
        let url = self.url(&["api", "document", id])?;
        let request = self.with_owner(self.http.put(url).json(&json!({ "content": content })));
        let res = request.send().await.map_err(transport)?;
        if !res.status().is_success() {
            return Err(error_from_response(res).await);
        }
        res.json().await.map_err(transport)
    }

    pub(crate) async fn list_documents(
        &self,
        limit: usize,
    ) -> Result<Vec<DocumentMeta>, PersistenceError> {
        let url = self.url(&["api", "documents"])?;
        let res = self
            .http
            .get(url)
            .query(&[("limit", limit)])
            .send()
            .await
            .map_err(transport)?;
        if !res.status().is_success() {
            return Err(error_from_response(res).await);
        }
        res.json().await.map_err(transport)
    }

    pub(crate) async fn acquire_lock(&self, id: &str) -> Result<(), PersistenceError> {
        self.lock_request(reqwest::Method::POST, id).await
    }

    pub(crate) async fn release_lock(&self, id: &str) -> Result<(), PersistenceError> {
        self.lock_request(reqwest::Method::DELETE, id).await
    }

    async fn lock_request(&self, method: reqwest::Method, id: &str) -> Result<(), PersistenceError> {
        let url = self.url(&["api", "document", id, "lock"])?;
        let res = self
            .with_owner(self.http.request(method, url))
            .send()
            .await
            .map_err(transport)?;
        if !res.status().is_success() {
            return Err(error_from_response(res).await);
        }
        Ok(())
    }
}

/// Saves coordinator output with `PUT /api/document/:id`.
pub(crate) struct HttpPersist {
    client: ApiClient,
}

impl HttpPersist {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl Persist<String> for HttpPersist {
    fn persist(&self, document_id: &DocumentId, content: String) -> PersistFuture {
        let client = self.client.clone();
        let id = document_id.clone();
        Box::pin(async move {
            let document = client.put_document(id.as_str(), content).await?;
            tracing::debug!(
                document = %id,
                revision = document.revision,
                "server accepted draft"
            );
            Ok(())
        })
    }
}
