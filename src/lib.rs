//! Article page pipeline: plain-text summaries and display dates for stored
//! posts, plus the comment submission flow and its shared busy/error status.

pub mod app;
pub mod comments;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod status;
pub mod store;

pub use app::{App, ArticlePage};
pub use error::{AppError, Result};
