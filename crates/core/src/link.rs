use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::ConvertError;

/// GeoJSON media type for item links.
pub const MEDIA_TYPE_GEOJSON: &str = "application/geo+json";
/// Plain JSON media type for collection/catalog links.
pub const MEDIA_TYPE_JSON: &str = "application/json";

/// A STAC hyperlink: relation plus target.
///
/// Richer metadata beyond href/rel/type/title is tolerated on input and
/// carried in `extra`; the Collection storage shape discards it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Link {
    pub fn new(rel: &str, href: String, media_type: &str) -> Self {
        Self {
            rel: rel.to_string(),
            href,
            media_type: Some(media_type.to_string()),
            title: None,
            extra: IndexMap::new(),
        }
    }

    /// Reduce to the minimal {href, rel, type, title} form persisted on a
    /// Collection row, discarding any richer metadata.
    pub fn minimal(&self) -> Self {
        Self {
            rel: self.rel.clone(),
            href: self.href.clone(),
            media_type: self.media_type.clone(),
            title: self.title.clone(),
            extra: IndexMap::new(),
        }
    }
}

/// Ensure a base URL ends with a slash so joins append instead of
/// replacing the last path segment.
fn base(base_url: &str) -> Result<Url, ConvertError> {
    let normalized = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    };
    Ok(Url::parse(&normalized)?)
}

/// Canonical link set for an Item: self, parent, collection, root.
#[derive(Debug, Clone)]
pub struct ItemLinks<'a> {
    pub base_url: &'a str,
    pub collection_id: &'a str,
    pub item_id: &'a str,
}

impl ItemLinks<'_> {
    pub fn create(&self) -> Result<Vec<Link>, ConvertError> {
        let base = base(self.base_url)?;
        let collection = base.join(&format!("collections/{}", self.collection_id))?;
        let item = base.join(&format!(
            "collections/{}/items/{}",
            self.collection_id, self.item_id
        ))?;
        Ok(vec![
            Link::new("self", item.to_string(), MEDIA_TYPE_GEOJSON),
            Link::new("parent", collection.to_string(), MEDIA_TYPE_JSON),
            Link::new("collection", collection.to_string(), MEDIA_TYPE_JSON),
            Link::new("root", base.to_string(), MEDIA_TYPE_JSON),
        ])
    }
}

/// Canonical link set for a Collection: self, parent, root.
#[derive(Debug, Clone)]
pub struct CollectionLinks<'a> {
    pub base_url: &'a str,
    pub collection_id: &'a str,
}

impl CollectionLinks<'_> {
    pub fn create(&self) -> Result<Vec<Link>, ConvertError> {
        let base = base(self.base_url)?;
        let collection = base.join(&format!("collections/{}", self.collection_id))?;
        Ok(vec![
            Link::new("self", collection.to_string(), MEDIA_TYPE_JSON),
            Link::new("parent", base.to_string(), MEDIA_TYPE_JSON),
            Link::new("root", base.to_string(), MEDIA_TYPE_JSON),
        ])
    }
}

/// Rehydrate persisted links: relative hrefs become absolute against the
/// base URL, absolute hrefs pass through unchanged.
pub fn resolve_links(links: &[Link], base_url: &str) -> Result<Vec<Link>, ConvertError> {
    links
        .iter()
        .map(|link| {
            let href = match Url::parse(&link.href) {
                Ok(absolute) => absolute.to_string(),
                Err(url::ParseError::RelativeUrlWithoutBase) => {
                    base(base_url)?.join(&link.href)?.to_string()
                }
                Err(e) => return Err(ConvertError::Url(e)),
            };
            Ok(Link { href, ..link.clone() })
        })
        .collect()
}
