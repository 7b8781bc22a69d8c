use serde::Serialize;
use url::Url;

use super::ArticleView;
use crate::config::SiteConfig;
use crate::error::Result;

const TWITTER_CARD: &str = "summary_large_image";

/// Page-head description of an article, consumed by whatever renders `<head>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub open_graph: OpenGraph,
    pub twitter: TwitterCard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenGraph {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub published_time: String,
    pub authors: Option<String>,
    pub url: String,
    pub site_name: String,
    pub images: Vec<OgImage>,
    pub locale: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OgImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TwitterCard {
    pub card: String,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
}

impl PageMetadata {
    /// Build metadata for an article; both descriptions are the view's own.
    pub fn for_article(view: &ArticleView, site: &SiteConfig) -> Result<Self> {
        let url = article_url(&site.url, &view.id)?;

        let images = match &view.image_url {
            Some(image) => vec![
                OgImage {
                    url: image.clone(),
                    width: 800,
                    height: 600,
                    alt: None,
                },
                OgImage {
                    url: image.clone(),
                    width: 1800,
                    height: 1600,
                    alt: site.image_alt.clone(),
                },
            ],
            None => Vec::new(),
        };

        Ok(Self {
            title: view.title.clone(),
            description: view.description.clone(),
            open_graph: OpenGraph {
                title: view.title.clone(),
                description: view.description.clone(),
                kind: site.og_type.clone(),
                published_time: view.display_date.clone(),
                authors: view.author.clone(),
                url: url.to_string(),
                site_name: site.name.clone(),
                images,
                locale: site.og_locale.clone(),
            },
            twitter: TwitterCard {
                card: TWITTER_CARD.to_string(),
                title: view.title.clone(),
                description: view.description.clone(),
                images: view.image_url.iter().cloned().collect(),
            },
        })
    }
}

/// `{site}/blog/{id}`, with the id escaped as a single path segment.
pub fn article_url(site_url: &str, article_id: &str) -> Result<Url> {
    let mut url = Url::parse(site_url)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(["blog", article_id]);
    Ok(url)
}
