mod comment;
mod document;
mod metadata;
mod post;

pub use comment::{Comment, NewComment};
pub use document::{Document, DocumentNode};
pub use metadata::{article_url, OgImage, OpenGraph, PageMetadata, TwitterCard};
pub use post::{ArticleView, Post, PostTeaser, SplitTimestamp};
