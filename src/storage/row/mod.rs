pub mod buffer;
pub mod comparator;
pub mod decoder;
pub mod error;

pub use buffer::{KeyRegion, RecordShape, RowBuffer};
pub use comparator::{compare_bytes, compare_keys, CellComparator, KeyComparator};
pub use decoder::{key_region, lookup_column, lookup_column_by_term, search_term, SearchTerm};
pub use error::RecordError;
