//! Turning a stored post into something a page can show.

mod extract;
mod summary;
mod timestamp;

pub use extract::{extract_leaf_text, leaf_texts, LeafTexts};
pub use summary::{build_summary, summarize_document, DESCRIPTION_LENGTH, OMISSION};
pub use timestamp::{epoch_millis, normalize_timestamp, resolve_locale};

use crate::error::Result;
use crate::models::{ArticleView, Document, Post};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentOptions {
    pub locale: String,
    pub description_length: usize,
    pub omission: String,
}

impl Default for ContentOptions {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            description_length: DESCRIPTION_LENGTH,
            omission: OMISSION.to_string(),
        }
    }
}

/// Build the view for one request. An invalid date makes the whole article
/// unavailable rather than showing a bogus date.
pub fn build_article_view(post: Post, options: &ContentOptions) -> Result<ArticleView> {
    let display_date = normalize_timestamp(post.date.seconds, post.date.nanoseconds, &options.locale)?;
    let body = Document::parse(&post.body)?;
    let description =
        summarize_document(&body.root, options.description_length, &options.omission);

    Ok(ArticleView {
        id: post.id,
        title: post.title,
        description,
        display_date,
        image_url: post.image_url,
        author: post.author,
        tags: post.tags,
        body,
    })
}
