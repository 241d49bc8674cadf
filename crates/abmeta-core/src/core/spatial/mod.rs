//! Spatial queries between atom sets: a uniform-grid cell list for cutoff
//! counting and the contact engine built on top of it.

pub mod cell_list;
pub mod contacts;

pub use contacts::{ContactParams, ContactStats, contact_stats};
