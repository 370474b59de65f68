pub mod collection;
pub mod geometry;
pub mod item;
pub mod payload;
pub mod serializer;

pub use collection::CollectionConverter;
pub use item::ItemConverter;
pub use payload::{CollectionPayload, ItemPayload};
pub use serializer::{row_to_map, Serializer, WriteOptions};
