use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::ConvertError;
use crate::link::Link;
use crate::rfc3339;

/// A STAC Item in its API (GeoJSON Feature) shape.
///
/// `geometry` stays an untyped GeoJSON object: this layer converts its
/// encoding but never interprets coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "type", default = "feature_type")]
    pub r#type: String,
    #[serde(default)]
    pub stac_version: String,
    #[serde(default)]
    pub stac_extensions: Vec<String>,
    pub id: String,
    pub collection: String,
    pub geometry: Option<Value>,
    pub bbox: Option<Vec<f64>>,
    pub properties: IndexMap<String, Value>,
    #[serde(default)]
    pub links: Vec<Link>,
    pub assets: IndexMap<String, Value>,
}

fn feature_type() -> String {
    "Feature".to_string()
}

/// A STAC Collection in its API shape.
///
/// Optional members are omitted from the serialized form when empty or
/// absent, never emitted as null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    #[serde(rename = "type", default = "collection_type")]
    pub r#type: String,
    #[serde(default)]
    pub stac_version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stac_extensions: Vec<String>,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    pub license: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub providers: Vec<Provider>,
    pub extent: Extent,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub summaries: IndexMap<String, Summary>,
    #[serde(default)]
    pub links: Vec<Link>,
}

fn collection_type() -> String {
    "Collection".to_string()
}

/// A Collection's declared spatial and temporal coverage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extent {
    pub spatial: SpatialExtent,
    pub temporal: TemporalExtent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpatialExtent {
    pub bbox: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalExtent {
    pub interval: Vec<TemporalInterval>,
}

/// One temporal coverage interval, serialized as a 2-element JSON array
/// with either endpoint nullable (open-ended coverage).
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalInterval {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl Serialize for TemporalInterval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&self.start.as_ref().map(rfc3339::format))?;
        seq.serialize_element(&self.end.as_ref().map(rfc3339::format))?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for TemporalInterval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let endpoints: Vec<Option<String>> = Vec::deserialize(deserializer)?;
        if endpoints.len() != 2 {
            return Err(D::Error::invalid_length(
                endpoints.len(),
                &"a 2-element [start, end] interval",
            ));
        }
        let parse = |endpoint: &Option<String>| {
            endpoint
                .as_ref()
                .map(|s| rfc3339::parse(s).map_err(D::Error::custom))
                .transpose()
        };
        Ok(Self {
            start: parse(&endpoints[0])?,
            end: parse(&endpoints[1])?,
        })
    }
}

/// An organization associated with a Collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Provider {
    /// Export to the plain mapping persisted on a row.
    pub fn to_value(&self) -> Result<Value, ConvertError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// A Collection summary value.
///
/// Either a structured range with an explicit export method, or a value
/// that is already plain JSON (a set of values, a schema). Dispatch is by
/// variant, not by probing the value for capabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Summary {
    Range(RangeSummary),
    Plain(Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeSummary {
    pub minimum: Value,
    pub maximum: Value,
}

impl Summary {
    /// Export to the plain mapping persisted on a row.
    pub fn to_value(&self) -> Result<Value, ConvertError> {
        match self {
            Summary::Range(range) => Ok(serde_json::to_value(range)?),
            Summary::Plain(value) => Ok(value.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn temporal_interval_round_trip() {
        let json = json!(["2020-01-01T00:00:00Z", null]);
        let interval: TemporalInterval = serde_json::from_value(json).unwrap();
        assert!(interval.start.is_some());
        assert!(interval.end.is_none());

        let back = serde_json::to_value(&interval).unwrap();
        assert_eq!(back[0], json!("2020-01-01T00:00:00.000000Z"));
        assert_eq!(back[1], Value::Null);
    }

    #[test]
    fn temporal_interval_rejects_wrong_arity() {
        let json = json!(["2020-01-01T00:00:00Z"]);
        assert!(serde_json::from_value::<TemporalInterval>(json).is_err());
    }

    #[test]
    fn summary_dispatches_range_vs_plain() {
        let range: Summary = serde_json::from_value(json!({"minimum": 0, "maximum": 10})).unwrap();
        assert!(matches!(range, Summary::Range(_)));
        assert_eq!(range.to_value().unwrap(), json!({"minimum": 0, "maximum": 10}));

        let plain: Summary = serde_json::from_value(json!(["red", "green"])).unwrap();
        assert!(matches!(plain, Summary::Plain(_)));
        assert_eq!(plain.to_value().unwrap(), json!(["red", "green"]));
    }

    #[test]
    fn collection_omits_empty_optionals() {
        let collection = Collection {
            r#type: "Collection".to_string(),
            stac_version: "1.0.0".to_string(),
            stac_extensions: Vec::new(),
            id: "c1".to_string(),
            title: None,
            description: "test".to_string(),
            keywords: Vec::new(),
            license: "MIT".to_string(),
            providers: Vec::new(),
            extent: Extent {
                spatial: SpatialExtent { bbox: vec![vec![-180.0, -90.0, 180.0, 90.0]] },
                temporal: TemporalExtent {
                    interval: vec![TemporalInterval { start: None, end: None }],
                },
            },
            summaries: IndexMap::new(),
            links: Vec::new(),
        };

        let value = serde_json::to_value(&collection).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        for absent in ["title", "keywords", "providers", "summaries", "stac_extensions"] {
            assert!(!keys.iter().any(|k| *k == absent), "{absent} should be omitted");
        }
    }

    #[test]
    fn item_defaults_type_and_extensions() {
        let item: Item = serde_json::from_value(json!({
            "id": "a",
            "collection": "c1",
            "geometry": null,
            "properties": {"datetime": "2020-01-01T00:00:00Z"},
            "assets": {},
        }))
        .unwrap();
        assert_eq!(item.r#type, "Feature");
        assert!(item.stac_extensions.is_empty());
        assert!(item.bbox.is_none());
    }
}
