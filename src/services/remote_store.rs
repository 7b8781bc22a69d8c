use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Comment, NewComment, Post};
use crate::store::PostStore;

/// Post store reached over a small REST API:
///
/// - `GET  {base}/posts`
/// - `GET  {base}/posts/{id}`
/// - `GET  {base}/posts/{id}/comments`
/// - `POST {base}/comments` with `{postId, comment}`
pub struct RemoteStore {
    client: Client,
    base: Url,
    access_token: Option<String>,
}

impl RemoteStore {
    pub fn new(base_url: &str, access_token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("article-comments/1.0")
            .build()?;

        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(AppError::Config(format!("store_url cannot be a base: {}", base_url)));
        }

        Ok(Self {
            client,
            base,
            access_token,
        })
    }

    /// Append escaped path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("store_url cannot be a base: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self.authorized(self.client.get(url)).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    Err(AppError::Store(format!("HTTP {}: {}", status, error_text)))
}

#[async_trait]
impl PostStore for RemoteStore {
    async fn fetch_single_post(&self, post_id: &str) -> Result<Post> {
        let url = self.endpoint(&["posts", post_id])?;
        tracing::debug!("GET {}", url);
        let response = self.authorized(self.client.get(url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::ArticleNotFound(post_id.to_string()));
        }

        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    async fn fetch_posts(&self) -> Result<Vec<Post>> {
        self.get_json(self.endpoint(&["posts"])?).await
    }

    async fn fetch_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        let comments: Vec<Comment> = self
            .get_json(self.endpoint(&["posts", post_id, "comments"])?)
            .await?;
        tracing::debug!("Fetched {} comments for post {}", comments.len(), post_id);
        Ok(comments)
    }

    async fn add_comment(&self, comment: NewComment) -> Result<Comment> {
        let url = self.endpoint(&["comments"])?;
        tracing::debug!("POST {}", url);
        let response = self
            .authorized(self.client.post(url))
            .json(&comment)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }
}
