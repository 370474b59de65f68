use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use stacbridge_core::link::{resolve_links, ItemLinks};
use stacbridge_core::{rfc3339, ConvertError, Item, Settings};
use stacbridge_store::{IndexedValue, ItemRow, StoredGeometry};

use crate::geometry;
use crate::payload::ItemPayload;
use crate::serializer::{Serializer, WriteOptions};

/// Column name for a possibly extension-namespaced field path
/// ("eo:cloud_cover" -> "cloud_cover").
fn column_name(field: &str) -> &str {
    field.rsplit(':').next().unwrap_or(field)
}

/// Maps STAC Items between their API shape and their storage row.
#[derive(Debug, Clone)]
pub struct ItemConverter {
    stac_version: String,
    indexed_fields: Vec<String>,
}

impl ItemConverter {
    pub fn new(settings: &Settings) -> Self {
        Self {
            stac_version: settings.stac_version.clone(),
            indexed_fields: settings.indexed_fields.clone(),
        }
    }
}

impl Serializer for ItemConverter {
    type Row = ItemRow;
    type Record = Item;
    type Payload = ItemPayload;

    fn row_to_record(&self, row: &ItemRow, base_url: &str) -> Result<Item, ConvertError> {
        // Overlay promoted columns onto a copy of the properties blob,
        // overwriting any stale embedded value.
        let mut properties = row.properties.clone();
        for field in &self.indexed_fields {
            let column = column_name(field);
            let value = row
                .indexed
                .get(column)
                .ok_or_else(|| ConvertError::MissingField(field.clone()))?;
            let value = match value {
                IndexedValue::Timestamp(dt) => Value::String(rfc3339::format(dt)),
                IndexedValue::Json(v) => v.clone(),
            };
            properties.insert(field.clone(), value);
        }

        let mut links = ItemLinks {
            base_url,
            collection_id: &row.collection_id,
            item_id: &row.id,
        }
        .create()?;
        if let Some(extra) = &row.links {
            links.extend(resolve_links(extra, base_url)?);
        }

        let geometry = match &row.geometry {
            Some(stored) => Some(geometry::decode(stored)?),
            None => None,
        };

        Ok(Item {
            r#type: "Feature".to_string(),
            stac_version: row.stac_version.clone(),
            stac_extensions: row.stac_extensions.clone().unwrap_or_default(),
            id: row.id.clone(),
            collection: row.collection_id.clone(),
            geometry,
            bbox: row.bbox.clone(),
            properties,
            links,
            assets: row.assets.clone(),
        })
    }

    fn record_to_row(&self, payload: ItemPayload, opts: &WriteOptions) -> Result<ItemRow, ConvertError> {
        let mut item = payload.into_item()?;

        // Stage promoted columns out of the properties blob. The datetime
        // column is a timezone-aware instant in storage, not a string.
        let mut indexed = IndexMap::new();
        for field in &self.indexed_fields {
            let value = item
                .properties
                .get(field)
                .cloned()
                .ok_or_else(|| ConvertError::MissingField(field.clone()))?;
            let staged = if field == "datetime" {
                let text = value.as_str().ok_or_else(|| {
                    ConvertError::Validation("properties.datetime must be an RFC 3339 string".to_string())
                })?;
                IndexedValue::Timestamp(rfc3339::parse(text)?)
            } else {
                IndexedValue::Json(value)
            };
            indexed.insert(column_name(field).to_string(), staged);
        }
        debug!(fields = self.indexed_fields.len(), "staged indexed columns");

        // created defaults on first write; updated refreshes on every write.
        let now = rfc3339::now_str();
        item.properties
            .entry("created".to_string())
            .or_insert_with(|| Value::String(now.clone()));
        item.properties.insert("updated".to_string(), Value::String(now));

        let stored_geometry = if opts.exclude_geometry {
            None
        } else {
            match &item.geometry {
                Some(g) => Some(StoredGeometry::Text(geometry::encode_text(g)?)),
                None => None,
            }
        };

        // The blob must hold plain RFC 3339 strings for its timestamp
        // entries before it can be persisted.
        normalize_timestamp_entry(&mut item.properties, "datetime")?;
        normalize_timestamp_entry(&mut item.properties, "created")?;

        let stac_version = if item.stac_version.is_empty() {
            self.stac_version.clone()
        } else {
            item.stac_version
        };

        Ok(ItemRow {
            id: item.id,
            collection_id: item.collection,
            stac_version,
            stac_extensions: if item.stac_extensions.is_empty() {
                None
            } else {
                Some(item.stac_extensions)
            },
            geometry: stored_geometry,
            bbox: item.bbox,
            properties: item.properties,
            assets: item.assets,
            links: None,
            indexed,
        })
    }
}

/// Re-normalize a timestamp entry in the properties blob to an RFC 3339
/// string. The entry must exist and must be string-shaped.
fn normalize_timestamp_entry(
    properties: &mut IndexMap<String, Value>,
    key: &str,
) -> Result<(), ConvertError> {
    let value = properties
        .get_mut(key)
        .ok_or_else(|| ConvertError::MissingField(key.to_string()))?;
    match value {
        Value::String(text) => {
            let normalized = rfc3339::format(&rfc3339::parse(text)?);
            *value = Value::String(normalized);
            Ok(())
        }
        _ => Err(ConvertError::Validation(format!(
            "properties.{key} must be an RFC 3339 string"
        ))),
    }
}
