use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Comment, NewComment, Post};

/// Backend holding posts and their comments.
///
/// Writes are eventually consistent: a successful `add_comment` says the
/// store accepted the comment, nothing more.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Fails with `ArticleNotFound` when no post has this id.
    async fn fetch_single_post(&self, post_id: &str) -> Result<Post>;

    async fn fetch_posts(&self) -> Result<Vec<Post>>;

    /// Comments for a post, oldest first.
    async fn fetch_comments(&self, post_id: &str) -> Result<Vec<Comment>>;

    async fn add_comment(&self, comment: NewComment) -> Result<Comment>;
}
