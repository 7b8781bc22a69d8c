use std::sync::Arc;

use crate::comments::CommentForm;
use crate::config::Config;
use crate::content::{build_article_view, ContentOptions};
use crate::db::Repository;
use crate::error::Result;
use crate::models::{ArticleView, Comment, PageMetadata, PostTeaser};
use crate::services::RemoteStore;
use crate::status::{ErrorInfo, StatusTracker};
use crate::store::PostStore;

/// Everything an article page needs, built for a single request.
pub struct ArticlePage {
    pub article: ArticleView,
    pub metadata: PageMetadata,
    pub comments: Vec<Comment>,
    pub more_posts: Vec<PostTeaser>,
}

pub struct App {
    pub config: Config,
    content: ContentOptions,
    store: Arc<dyn PostStore>,
    status: StatusTracker,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self> {
        let store: Arc<dyn PostStore> = match &config.store_url {
            Some(url) => Arc::new(RemoteStore::new(url, config.store_token.clone())?),
            None => Arc::new(Repository::new(&config.db_path).await?),
        };

        Ok(Self::with_store(config.clone(), store, StatusTracker::new()))
    }

    pub fn with_store(config: Config, store: Arc<dyn PostStore>, status: StatusTracker) -> Self {
        Self {
            content: config.content_options(),
            config,
            store,
            status,
        }
    }

    pub fn status(&self) -> &StatusTracker {
        &self.status
    }

    pub async fn load_article(&self, article_id: &str) -> Result<ArticleView> {
        let post = self.store.fetch_single_post(article_id).await?;
        build_article_view(post, &self.content)
    }

    pub async fn page_metadata(&self, article_id: &str) -> Result<PageMetadata> {
        let article = self.load_article(article_id).await?;
        PageMetadata::for_article(&article, &self.config.site)
    }

    /// Load the article and its comments, reporting progress on the tracker.
    pub async fn open_article(&self, article_id: &str) -> Result<ArticlePage> {
        self.status.start();

        let result = self.build_page(article_id).await;
        if let Err(e) = &result {
            tracing::error!("Failed to open article {}: {}", article_id, e);
            self.status.error(ErrorInfo::from(e));
        }

        self.status.finish();
        self.status.app_loaded();
        result
    }

    async fn build_page(&self, article_id: &str) -> Result<ArticlePage> {
        let (post, comments) = futures::try_join!(
            self.store.fetch_single_post(article_id),
            self.store.fetch_comments(article_id),
        )?;

        let article = build_article_view(post, &self.content)?;
        let metadata = PageMetadata::for_article(&article, &self.config.site)?;
        let more_posts = self.more_posts(article_id, MORE_POSTS_LIMIT).await?;

        Ok(ArticlePage {
            article,
            metadata,
            comments,
            more_posts,
        })
    }

    /// Other posts, newest first, for the block under the article.
    pub async fn more_posts(&self, exclude_id: &str, limit: usize) -> Result<Vec<PostTeaser>> {
        let mut posts = self.store.fetch_posts().await?;
        posts.sort_by(|a, b| b.date.seconds.cmp(&a.date.seconds));

        Ok(posts
            .into_iter()
            .filter(|p| p.id != exclude_id)
            .take(limit)
            .map(|p| PostTeaser {
                id: p.id,
                title: p.title,
            })
            .collect())
    }

    pub fn comment_form(&self, article_id: &str) -> CommentForm {
        CommentForm::new(article_id, Arc::clone(&self.store), self.status.clone())
    }
}

const MORE_POSTS_LIMIT: usize = 3;
