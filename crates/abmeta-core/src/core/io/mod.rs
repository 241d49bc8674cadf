//! Provides input/output functionality for the metadata pipeline.
//!
//! Structure readers (PDB and mmCIF) share a trait-based interface and are
//! dispatched by file extension. Side-tables (per-file parameters, paratope
//! predictions) are read from CSV, and the resulting metadata tables are
//! written back to CSV.

pub mod discovery;
pub mod export;
pub mod mmcif;
pub mod params;
pub mod pdb;
pub mod predictions;
mod side_table;
pub mod structure;
pub mod traits;

pub use side_table::SideTableError;
