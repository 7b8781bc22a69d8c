use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::Document;

/// Post record as the store hands it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    /// Serialized editor state; see [`Document::parse`].
    pub body: String,
    #[serde(default)]
    pub date: SplitTimestamp,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Seconds/nanoseconds pair as stored by the backend.
///
/// Both halves are optional: a record with a broken date still decodes and
/// the problem surfaces later as `InvalidTimestamp`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitTimestamp {
    #[serde(default, deserialize_with = "lenient_integer")]
    pub seconds: Option<i64>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub nanoseconds: Option<i64>,
}

impl SplitTimestamp {
    pub fn new(seconds: i64, nanoseconds: i64) -> Self {
        Self {
            seconds: Some(seconds),
            nanoseconds: Some(nanoseconds),
        }
    }
}

fn lenient_integer<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_i64))
}

/// Rendering-ready article, rebuilt on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub display_date: String,
    pub image_url: Option<String>,
    pub author: Option<String>,
    pub tags: Vec<String>,
    pub body: Document,
}

/// Short teaser used for the "more posts" block under an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostTeaser {
    pub id: String,
    pub title: String,
}
