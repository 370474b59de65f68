use indexmap::IndexMap;
use serde_json::Value;

use stacbridge_core::ConvertError;
use stacbridge_store::RowColumns;

/// Write-path options.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Leave the geometry column unset, for callers that backfill it
    /// separately (bulk ingest).
    pub exclude_geometry: bool,
}

/// Two-way mapping between an API record and its storage row.
///
/// Implementations are pure: they never mutate their inputs, perform no
/// I/O, and hold only an immutable field-list captured at construction,
/// so a single converter is safe to share across request handlers.
pub trait Serializer {
    type Row;
    type Record;
    type Payload;

    /// Transform a storage row into the equivalent API record, with
    /// hyperlinks synthesized from `base_url`.
    fn row_to_record(&self, row: &Self::Row, base_url: &str) -> Result<Self::Record, ConvertError>;

    /// Transform an API record payload into a row ready for persistence.
    fn record_to_row(
        &self,
        payload: Self::Payload,
        opts: &WriteOptions,
    ) -> Result<Self::Row, ConvertError>;
}

/// Flatten a storage row into a mapping of column name -> non-null value.
pub fn row_to_map<R: RowColumns>(row: &R) -> IndexMap<String, Value> {
    row.columns()
}
