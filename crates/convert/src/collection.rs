use indexmap::IndexMap;
use serde_json::{json, Value};
use tracing::debug;

use stacbridge_core::link::{resolve_links, CollectionLinks, Link};
use stacbridge_core::{rfc3339, Collection, ConvertError, Extent, Provider, Settings, Summary};

use stacbridge_store::CollectionRow;

use crate::payload::CollectionPayload;
use crate::serializer::{Serializer, WriteOptions};

/// Maps STAC Collections between their API shape and their storage row.
#[derive(Debug, Clone)]
pub struct CollectionConverter {
    stac_version: String,
}

impl CollectionConverter {
    pub fn new(settings: &Settings) -> Self {
        Self {
            stac_version: settings.stac_version.clone(),
        }
    }
}

impl Serializer for CollectionConverter {
    type Row = CollectionRow;
    type Record = Collection;
    type Payload = CollectionPayload;

    fn row_to_record(&self, row: &CollectionRow, base_url: &str) -> Result<Collection, ConvertError> {
        let mut links = CollectionLinks { base_url, collection_id: &row.id }.create()?;
        if let Some(extra) = &row.links {
            links.extend(resolve_links(extra, base_url)?);
        }

        let extent: Extent = serde_json::from_value(row.extent.clone())
            .map_err(|e| ConvertError::Validation(format!("invalid extent on row: {e}")))?;

        let providers: Vec<Provider> = match &row.providers {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| ConvertError::Validation(format!("invalid providers on row: {e}")))?,
            None => Vec::new(),
        };

        let summaries: IndexMap<String, Summary> = match &row.summaries {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| ConvertError::Validation(format!("invalid summaries on row: {e}")))?,
            None => IndexMap::new(),
        };

        // Optional members stay empty here; the record's serialized form
        // omits them rather than emitting null.
        Ok(Collection {
            r#type: "Collection".to_string(),
            stac_version: row.stac_version.clone(),
            stac_extensions: row.stac_extensions.clone().unwrap_or_default(),
            id: row.id.clone(),
            title: row.title.clone(),
            description: row.description.clone(),
            keywords: row.keywords.clone().unwrap_or_default(),
            license: row.license.clone(),
            providers,
            extent,
            summaries,
            links,
        })
    }

    fn record_to_row(
        &self,
        payload: CollectionPayload,
        _opts: &WriteOptions,
    ) -> Result<CollectionRow, ConvertError> {
        let collection = payload.into_collection()?;

        // Flatten the extent: spatial bbox passes through, temporal
        // intervals are walked pairwise with instants stringified and
        // nulls preserved.
        let intervals: Vec<Value> = collection
            .extent
            .temporal
            .interval
            .iter()
            .map(|interval| {
                json!([
                    interval.start.as_ref().map(rfc3339::format),
                    interval.end.as_ref().map(rfc3339::format),
                ])
            })
            .collect();
        let extent = json!({
            "spatial": {"bbox": collection.extent.spatial.bbox},
            "temporal": {"interval": intervals},
        });

        let providers: Vec<Value> = collection
            .providers
            .iter()
            .map(Provider::to_value)
            .collect::<Result<_, _>>()?;

        let summaries: Vec<(String, Value)> = collection
            .summaries
            .iter()
            .map(|(key, summary)| Ok((key.clone(), summary.to_value()?)))
            .collect::<Result<_, ConvertError>>()?;
        let summaries: Value = Value::Object(summaries.into_iter().collect());

        let links: Vec<Link> = collection.links.iter().map(Link::minimal).collect();
        debug!(links = links.len(), "reduced collection links to minimal form");

        // The assembled mapping must survive a JSON serializability check
        // before it becomes a row; a failure here is an integration
        // defect and is fatal.
        let staged = json!({
            "id": collection.id,
            "stac_version": collection.stac_version,
            "stac_extensions": collection.stac_extensions,
            "title": collection.title,
            "description": collection.description,
            "keywords": collection.keywords,
            "license": collection.license,
            "providers": providers,
            "extent": extent,
            "summaries": summaries,
            "links": links,
        });
        serde_json::to_string(&staged)?;

        let stac_version = if collection.stac_version.is_empty() {
            self.stac_version.clone()
        } else {
            collection.stac_version
        };

        Ok(CollectionRow {
            id: collection.id,
            stac_version,
            stac_extensions: if collection.stac_extensions.is_empty() {
                None
            } else {
                Some(collection.stac_extensions)
            },
            title: collection.title,
            description: collection.description,
            keywords: if collection.keywords.is_empty() {
                None
            } else {
                Some(collection.keywords)
            },
            license: collection.license,
            providers: if providers.is_empty() {
                None
            } else {
                Some(Value::Array(providers))
            },
            extent,
            summaries: match summaries {
                Value::Object(map) if map.is_empty() => None,
                other => Some(other),
            },
            links: if links.is_empty() { None } else { Some(links) },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::row_to_map;

    const BASE_URL: &str = "http://test-server";

    fn collection_payload() -> CollectionPayload {
        let raw = json!({
            "id": "test-collection",
            "stac_version": "1.0.0",
            "title": "Test",
            "description": "A test collection",
            "keywords": ["test"],
            "license": "MIT",
            "providers": [
                {"name": "Acme", "roles": ["producer"], "url": "http://acme.example"},
            ],
            "extent": {
                "spatial": {"bbox": [[-180.0, -90.0, 180.0, 90.0]]},
                "temporal": {"interval": [["2019-01-01T00:00:00Z", null]]},
            },
            "summaries": {
                "eo:cloud_cover": {"minimum": 0, "maximum": 100},
                "platform": ["landsat-8"],
            },
            "links": [
                {"rel": "license", "href": "http://acme.example/license", "method": "GET"},
            ],
            "assets": {"thumbnail": {"href": "http://x/t.png"}},
        });
        let Value::Object(map) = raw else { unreachable!() };
        CollectionPayload::Raw(map)
    }

    #[test]
    fn write_flattens_extent_and_stringifies_intervals() {
        let converter = CollectionConverter::new(&Settings::default());
        let row = converter
            .record_to_row(collection_payload(), &WriteOptions::default())
            .unwrap();

        assert_eq!(row.extent["spatial"]["bbox"], json!([[-180.0, -90.0, 180.0, 90.0]]));
        let interval = &row.extent["temporal"]["interval"][0];
        assert_eq!(interval[0], json!("2019-01-01T00:00:00.000000Z"));
        assert_eq!(interval[1], Value::Null);
    }

    #[test]
    fn write_never_emits_assets() {
        let converter = CollectionConverter::new(&Settings::default());
        let row = converter
            .record_to_row(collection_payload(), &WriteOptions::default())
            .unwrap();
        assert!(!row_to_map(&row).contains_key("assets"));
    }

    #[test]
    fn write_exports_providers_and_summaries() {
        let converter = CollectionConverter::new(&Settings::default());
        let row = converter
            .record_to_row(collection_payload(), &WriteOptions::default())
            .unwrap();

        let providers = row.providers.as_ref().unwrap();
        assert_eq!(providers[0]["name"], json!("Acme"));
        let summaries = row.summaries.as_ref().unwrap();
        assert_eq!(summaries["eo:cloud_cover"], json!({"minimum": 0, "maximum": 100}));
        assert_eq!(summaries["platform"], json!(["landsat-8"]));
    }

    #[test]
    fn write_minimizes_links() {
        let converter = CollectionConverter::new(&Settings::default());
        let row = converter
            .record_to_row(collection_payload(), &WriteOptions::default())
            .unwrap();

        let links = row.links.as_ref().unwrap();
        assert_eq!(links[0].rel, "license");
        assert_eq!(links[0].href, "http://acme.example/license");
        // Richer metadata beyond href/rel/type/title is discarded.
        assert!(links[0].extra.is_empty());
    }

    #[test]
    fn read_omits_empty_optionals() {
        let row = CollectionRow {
            id: "bare".to_string(),
            stac_version: "1.0.0".to_string(),
            stac_extensions: None,
            title: None,
            description: "bare collection".to_string(),
            keywords: None,
            license: "proprietary".to_string(),
            providers: None,
            extent: json!({
                "spatial": {"bbox": [[0.0, 0.0, 1.0, 1.0]]},
                "temporal": {"interval": [[null, null]]},
            }),
            summaries: None,
            links: None,
        };
        let converter = CollectionConverter::new(&Settings::default());
        let collection = converter.row_to_record(&row, BASE_URL).unwrap();

        let value = serde_json::to_value(&collection).unwrap();
        let object = value.as_object().unwrap();
        for absent in ["title", "keywords", "providers", "summaries"] {
            assert!(!object.contains_key(absent), "{absent} should be omitted");
        }
        assert_eq!(object["license"], json!("proprietary"));
    }

    #[test]
    fn read_builds_canonical_links_and_resolves_extras() {
        let converter = CollectionConverter::new(&Settings::default());
        let mut row = converter
            .record_to_row(collection_payload(), &WriteOptions::default())
            .unwrap();
        row.links
            .as_mut()
            .unwrap()
            .push(Link::new("describedby", "docs/test-collection".to_string(), "text/html"));

        let collection = converter.row_to_record(&row, BASE_URL).unwrap();
        let rels: Vec<&str> = collection.links.iter().map(|l| l.rel.as_str()).collect();
        assert_eq!(rels, vec!["self", "parent", "root", "license", "describedby"]);
        assert_eq!(collection.links[0].href, "http://test-server/collections/test-collection");
        assert_eq!(collection.links[4].href, "http://test-server/docs/test-collection");
    }

    #[test]
    fn round_trip_restores_mandatory_fields() {
        let converter = CollectionConverter::new(&Settings::default());
        let row = converter
            .record_to_row(collection_payload(), &WriteOptions::default())
            .unwrap();
        let collection = converter.row_to_record(&row, BASE_URL).unwrap();

        assert_eq!(collection.id, "test-collection");
        assert_eq!(collection.description, "A test collection");
        assert_eq!(collection.license, "MIT");
        assert_eq!(collection.extent.spatial.bbox, vec![vec![-180.0, -90.0, 180.0, 90.0]]);
        let interval = &collection.extent.temporal.interval[0];
        assert!(interval.start.is_some());
        assert!(interval.end.is_none());
        assert_eq!(collection.title.as_deref(), Some("Test"));
        assert_eq!(collection.providers[0].name, "Acme");
    }

    #[test]
    fn missing_extent_is_validation_error() {
        let raw = json!({
            "id": "c1",
            "description": "test",
            "license": "MIT",
        });
        let Value::Object(map) = raw else { unreachable!() };
        let converter = CollectionConverter::new(&Settings::default());
        let err = converter
            .record_to_row(CollectionPayload::Raw(map), &WriteOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConvertError::Validation(_)));
    }

    #[test]
    fn version_stamped_when_absent() {
        let raw = json!({
            "id": "c1",
            "description": "test",
            "license": "MIT",
            "extent": {
                "spatial": {"bbox": [[0.0, 0.0, 1.0, 1.0]]},
                "temporal": {"interval": [[null, null]]},
            },
        });
        let Value::Object(map) = raw else { unreachable!() };
        let converter = CollectionConverter::new(&Settings::default());
        let row = converter
            .record_to_row(CollectionPayload::Raw(map), &WriteOptions::default())
            .unwrap();
        assert_eq!(row.stac_version, "1.0.0");
    }
}
