mod view;
pub mod encoding;
pub mod layout;

pub use view::Cell;
pub use encoding::{encode_cell, encode_scan_record, write_cell, NewCell};
pub use layout::CellType;
