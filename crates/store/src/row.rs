use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use stacbridge_core::link::Link;
use stacbridge_core::rfc3339;

/// The encodings a geometry column can arrive in.
///
/// Reads may see well-known binary straight from the spatial column;
/// rows written by the conversion layer carry JSON text; a bulk path may
/// hand over an already-structured object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoredGeometry {
    Wkb(Vec<u8>),
    Text(String),
    GeoJson(Value),
}

/// A promoted indexed-field column value.
///
/// Datetime-valued fields are stored as timezone-aware instants; every
/// other promoted field keeps its JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexedValue {
    Timestamp(DateTime<Utc>),
    Json(Value),
}

/// The relational persistence shape of a STAC Item.
///
/// `indexed` holds the promoted indexed-field columns, keyed by column
/// name (the trailing segment of a namespaced field path).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRow {
    pub id: String,
    pub collection_id: String,
    pub stac_version: String,
    pub stac_extensions: Option<Vec<String>>,
    pub geometry: Option<StoredGeometry>,
    pub bbox: Option<Vec<f64>>,
    pub properties: IndexMap<String, Value>,
    pub assets: IndexMap<String, Value>,
    pub links: Option<Vec<Link>>,
    #[serde(default)]
    pub indexed: IndexMap<String, IndexedValue>,
}

/// The relational persistence shape of a STAC Collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionRow {
    pub id: String,
    pub stac_version: String,
    pub stac_extensions: Option<Vec<String>>,
    pub title: Option<String>,
    pub description: String,
    pub keywords: Option<Vec<String>>,
    pub license: String,
    pub providers: Option<Value>,
    pub extent: Value,
    pub summaries: Option<Value>,
    pub links: Option<Vec<Link>>,
}

/// Flatten a row into column name -> non-null value, for generic row
/// inspection and debugging. Null and empty columns are skipped.
pub trait RowColumns {
    fn columns(&self) -> IndexMap<String, Value>;
}

fn object(map: &IndexMap<String, Value>) -> Value {
    Value::Object(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}

fn insert_nonempty(columns: &mut IndexMap<String, Value>, name: &str, value: Value) {
    let empty = match &value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    };
    if !empty {
        columns.insert(name.to_string(), value);
    }
}

impl RowColumns for ItemRow {
    fn columns(&self) -> IndexMap<String, Value> {
        let mut columns = IndexMap::new();
        insert_nonempty(&mut columns, "id", Value::String(self.id.clone()));
        insert_nonempty(&mut columns, "collection_id", Value::String(self.collection_id.clone()));
        insert_nonempty(&mut columns, "stac_version", Value::String(self.stac_version.clone()));
        if let Some(extensions) = &self.stac_extensions {
            insert_nonempty(
                &mut columns,
                "stac_extensions",
                Value::Array(extensions.iter().cloned().map(Value::String).collect()),
            );
        }
        if let Some(geometry) = &self.geometry {
            let value = match geometry {
                StoredGeometry::Wkb(bytes) => Value::Array(
                    bytes.iter().map(|b| Value::Number((*b).into())).collect(),
                ),
                StoredGeometry::Text(text) => Value::String(text.clone()),
                StoredGeometry::GeoJson(value) => value.clone(),
            };
            insert_nonempty(&mut columns, "geometry", value);
        }
        if let Some(bbox) = &self.bbox {
            insert_nonempty(
                &mut columns,
                "bbox",
                Value::Array(bbox.iter().map(|f| Value::from(*f)).collect()),
            );
        }
        insert_nonempty(&mut columns, "properties", object(&self.properties));
        insert_nonempty(&mut columns, "assets", object(&self.assets));
        if let Some(links) = &self.links {
            if let Ok(value) = serde_json::to_value(links) {
                insert_nonempty(&mut columns, "links", value);
            }
        }
        for (name, value) in &self.indexed {
            let value = match value {
                IndexedValue::Timestamp(dt) => Value::String(rfc3339::format(dt)),
                IndexedValue::Json(v) => v.clone(),
            };
            insert_nonempty(&mut columns, name, value);
        }
        columns
    }
}

impl RowColumns for CollectionRow {
    fn columns(&self) -> IndexMap<String, Value> {
        let mut columns = IndexMap::new();
        insert_nonempty(&mut columns, "id", Value::String(self.id.clone()));
        insert_nonempty(&mut columns, "stac_version", Value::String(self.stac_version.clone()));
        if let Some(extensions) = &self.stac_extensions {
            insert_nonempty(
                &mut columns,
                "stac_extensions",
                Value::Array(extensions.iter().cloned().map(Value::String).collect()),
            );
        }
        if let Some(title) = &self.title {
            insert_nonempty(&mut columns, "title", Value::String(title.clone()));
        }
        insert_nonempty(&mut columns, "description", Value::String(self.description.clone()));
        if let Some(keywords) = &self.keywords {
            insert_nonempty(
                &mut columns,
                "keywords",
                Value::Array(keywords.iter().cloned().map(Value::String).collect()),
            );
        }
        insert_nonempty(&mut columns, "license", Value::String(self.license.clone()));
        if let Some(providers) = &self.providers {
            insert_nonempty(&mut columns, "providers", providers.clone());
        }
        insert_nonempty(&mut columns, "extent", self.extent.clone());
        if let Some(summaries) = &self.summaries {
            insert_nonempty(&mut columns, "summaries", summaries.clone());
        }
        if let Some(links) = &self.links {
            if let Ok(value) = serde_json::to_value(links) {
                insert_nonempty(&mut columns, "links", value);
            }
        }
        columns
    }
}
