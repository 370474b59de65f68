pub mod row;

pub use row::{CollectionRow, IndexedValue, ItemRow, RowColumns, StoredGeometry};
