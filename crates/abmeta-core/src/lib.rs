//! # abmeta Core Library
//!
//! A library for extracting role-aware geometric metadata from collections of
//! antibody–antigen structure files and routing it into relational tables.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture so that geometry, pipeline
//! orchestration, and end-to-end procedures can be tested in isolation.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Atom`, `AtomSet`), point-set
//!   geometry, the spatial contact engine, tabular row/value types, the wide-table
//!   assembler, and file I/O (structure readers, parameter and prediction side-tables,
//!   CSV table export).
//!
//! - **[`engine`]: The Logic Core.** Configuration, the role resolver, the per-structure
//!   `ExecutionContext`, the plugin trait with its built-in registry, and the row routing
//!   rules (column prefixing, parameter attachment, table accumulation).
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together: discovers
//!   structure files, runs every configured plugin against each structure, and returns
//!   the four metadata tables, the wide table, and the bad-file list.

pub mod core;
pub mod engine;
pub mod workflows;
