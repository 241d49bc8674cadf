//! # Workflows Module
//!
//! End-to-end procedures built on the `engine` and `core` layers.
//!
//! - **Metadata extraction** ([`metadata`]) discovers structure files, runs the
//!   configured plugins on each one and returns the append-only tables, the
//!   wide table and the bad-file list, ready to be written as CSV.

pub mod metadata;
