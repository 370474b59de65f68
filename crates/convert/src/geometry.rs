use geozero::geojson::GeoJson;
use geozero::wkb::Wkb;
use geozero::{CoordDimensions, ToJson, ToWkb};
use serde_json::Value;
use tracing::debug;

use stacbridge_core::ConvertError;
use stacbridge_store::StoredGeometry;

/// Decode a stored geometry column into a GeoJSON object.
///
/// Null handling belongs to the caller: an absent column stays absent.
pub fn decode(stored: &StoredGeometry) -> Result<Value, ConvertError> {
    match stored {
        StoredGeometry::Wkb(bytes) => {
            debug!(len = bytes.len(), "decoding WKB geometry column");
            let json = Wkb(bytes.clone())
                .to_json()
                .map_err(|e| ConvertError::Geometry(format!("invalid WKB geometry: {e}")))?;
            serde_json::from_str(&json)
                .map_err(|e| ConvertError::Geometry(format!("WKB decoded to invalid JSON: {e}")))
        }
        StoredGeometry::Text(text) => serde_json::from_str(text)
            .map_err(|e| ConvertError::Geometry(format!("invalid geometry JSON text: {e}"))),
        StoredGeometry::GeoJson(value) => Ok(value.clone()),
    }
}

/// Serialize a GeoJSON object to the JSON text form written to storage.
pub fn encode_text(geometry: &Value) -> Result<String, ConvertError> {
    if !geometry.is_object() {
        return Err(ConvertError::Geometry(
            "geometry must be a GeoJSON object".to_string(),
        ));
    }
    Ok(geometry.to_string())
}

/// Encode a GeoJSON object to well-known binary, the spatial column's
/// native form. Used by backfill tooling and tests; the regular write
/// path stores JSON text and lets the database bind it.
pub fn encode_wkb(geometry: &Value) -> Result<Vec<u8>, ConvertError> {
    let text = encode_text(geometry)?;
    GeoJson(&text)
        .to_wkb(CoordDimensions::xy())
        .map_err(|e| ConvertError::Geometry(format!("cannot encode geometry as WKB: {e}")))
}
