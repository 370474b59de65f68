use serde_json::{Map, Value};
use tracing::debug;

use stacbridge_core::{Collection, ConvertError, Item};

/// An Item write payload, before normalization.
///
/// The single-item endpoint hands over a validated typed record; the
/// bulk-ingest endpoint hands over a raw JSON mapping. Both normalize to
/// the canonical typed `Item` through one adapter, so conversion logic
/// never inspects shapes.
#[derive(Debug, Clone)]
pub enum ItemPayload {
    Typed(Item),
    Raw(Map<String, Value>),
}

impl ItemPayload {
    /// Normalize to the canonical typed record.
    pub fn into_item(self) -> Result<Item, ConvertError> {
        match self {
            ItemPayload::Typed(item) => Ok(item),
            ItemPayload::Raw(map) => serde_json::from_value(Value::Object(map))
                .map_err(|e| ConvertError::Validation(format!("invalid item payload: {e}"))),
        }
    }
}

impl From<Item> for ItemPayload {
    fn from(item: Item) -> Self {
        ItemPayload::Typed(item)
    }
}

impl From<Map<String, Value>> for ItemPayload {
    fn from(map: Map<String, Value>) -> Self {
        ItemPayload::Raw(map)
    }
}

/// A Collection write payload, before normalization.
#[derive(Debug, Clone)]
pub enum CollectionPayload {
    Typed(Collection),
    Raw(Map<String, Value>),
}

impl CollectionPayload {
    /// Normalize to the canonical typed record.
    ///
    /// Collections have no assets in storage; a raw payload carrying one
    /// has it dropped here, before any field mapping.
    pub fn into_collection(self) -> Result<Collection, ConvertError> {
        match self {
            CollectionPayload::Typed(collection) => Ok(collection),
            CollectionPayload::Raw(mut map) => {
                if map.remove("assets").is_some() {
                    debug!("dropping assets member from collection payload");
                }
                serde_json::from_value(Value::Object(map))
                    .map_err(|e| ConvertError::Validation(format!("invalid collection payload: {e}")))
            }
        }
    }
}

impl From<Collection> for CollectionPayload {
    fn from(collection: Collection) -> Self {
        CollectionPayload::Typed(collection)
    }
}

impl From<Map<String, Value>> for CollectionPayload {
    fn from(map: Map<String, Value>) -> Self {
        CollectionPayload::Raw(map)
    }
}
