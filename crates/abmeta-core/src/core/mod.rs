//! # Core Module
//!
//! Stateless building blocks of the metadata pipeline.
//!
//! ## Overview
//!
//! Nothing in this module knows about plugins or configuration. It exposes the
//! data models a structure is parsed into, the geometry computed on top of them,
//! the tabular types rows are routed into, and the file formats that move data
//! in and out of the pipeline.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, shareable atom-set views, chain maps
//! - **Geometry** ([`utils`]) - Point-set summaries and backbone continuity checks
//! - **Spatial Queries** ([`spatial`]) - Cell list and the contact/clash engine
//! - **Tables** ([`tables`]) - Values, rows, the four metadata tables and the wide join
//! - **File I/O** ([`io`]) - Structure readers, side-table readers and CSV export

pub mod io;
pub mod models;
pub mod spatial;
pub mod tables;
pub mod utils;
