// Storage Record Module
//
// Read-only access to the records the store hands the engine: the cell layout,
// the row buffer in its two shapes, the decoder and the key comparators.

pub mod cell;
pub mod row;

pub use cell::{Cell, CellType};
pub use row::{RecordError, RowBuffer};
