//! Tabular output model: scalar values, routed rows, the four logical metadata
//! tables, and the wide (denormalized) per-structure table.

pub mod row;
pub mod table;
pub mod value;
pub mod wide;

pub use row::Row;
pub use table::{Table, TableKind, TableSet, UnknownTableError, column_union};
pub use value::Value;
