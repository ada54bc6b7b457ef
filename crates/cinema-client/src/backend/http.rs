use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use tracing::debug;

use cinema_shared::constants::{
    FALLBACK_CREATE, FALLBACK_DELETE, FALLBACK_LIST, FALLBACK_UPDATE, PATH_MOVIES,
    PATH_MOVIE_CREATE,
};
use cinema_shared::error::{CatalogError, Result};
use cinema_shared::protocol::{CreateMovieRequest, ErrorBody, RelationUpsertRequest};
use cinema_shared::{
    CreateReceipt, Credentials, Movie, MovieId, MoviePrimary, RelationKind, UpsertMode,
};

use super::CatalogBackend;
use crate::config::ClientConfig;

/// [`CatalogBackend`] over HTTP/JSON.
///
/// Owns the request timeout; the engine itself never times out a write.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config.api_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
    }

    /// Send a request and turn transport failures and non-2xx answers into
    /// [`CatalogError`]s.
    async fn send(&self, req: RequestBuilder, fallback: &str) -> Result<Response> {
        let resp = req
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        // an unreadable failure body still gets the fallback message
        let body = resp.bytes().await.unwrap_or_default();
        let message = ErrorBody::message_or(&body, fallback);
        debug!(status = status.as_u16(), %message, "Backend returned failure");

        Err(CatalogError::server(Some(status.as_u16()), message))
    }
}

#[async_trait]
impl CatalogBackend for HttpBackend {
    async fn list_movies(&self) -> Result<Vec<Movie>> {
        let resp = self
            .send(self.request(Method::GET, PATH_MOVIES), FALLBACK_LIST)
            .await?;
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| {
            debug!(error = %e, "Undecodable movie listing");
            CatalogError::server(Some(status), FALLBACK_LIST)
        })
    }

    async fn create_movie(
        &self,
        primary: &MoviePrimary,
        credentials: &Credentials,
    ) -> Result<CreateReceipt> {
        let body = CreateMovieRequest {
            credentials: credentials.clone(),
            primary: primary.clone(),
        };
        let resp = self
            .send(
                self.request(Method::POST, PATH_MOVIE_CREATE).json(&body),
                FALLBACK_CREATE,
            )
            .await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        // The record exists once we get a 2xx; an unreadable body just means
        // we don't know its id.
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        Ok(CreateReceipt::from_response(&value))
    }

    async fn update_movie(&self, id: MovieId, primary: &MoviePrimary) -> Result<()> {
        let path = format!("{PATH_MOVIES}/{id}");
        self.send(
            self.request(Method::PUT, &path).json(primary),
            FALLBACK_UPDATE,
        )
        .await?;
        Ok(())
    }

    async fn delete_movie(&self, id: MovieId) -> Result<()> {
        let path = format!("{PATH_MOVIES}/{id}");
        self.send(self.request(Method::DELETE, &path), FALLBACK_DELETE)
            .await?;
        Ok(())
    }

    async fn upsert_genre(
        &self,
        movie_id: MovieId,
        name: &str,
        credentials: &Credentials,
        mode: UpsertMode,
    ) -> Result<()> {
        self.upsert(RelationKind::Genre, movie_id, name, credentials, mode)
            .await
    }

    async fn upsert_director(
        &self,
        movie_id: MovieId,
        name: &str,
        credentials: &Credentials,
        mode: UpsertMode,
    ) -> Result<()> {
        self.upsert(RelationKind::Director, movie_id, name, credentials, mode)
            .await
    }
}

impl HttpBackend {
    async fn upsert(
        &self,
        kind: RelationKind,
        movie_id: MovieId,
        name: &str,
        credentials: &Credentials,
        mode: UpsertMode,
    ) -> Result<()> {
        let method = match mode {
            UpsertMode::Insert => Method::POST,
            UpsertMode::Update => Method::PUT,
        };
        let body = RelationUpsertRequest::new(kind, movie_id, name, credentials.clone());

        self.send(
            self.request(method, kind.path()).json(&body),
            kind.fallback_message(),
        )
        .await?;
        Ok(())
    }
}
