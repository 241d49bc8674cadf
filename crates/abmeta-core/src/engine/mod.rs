//! # Engine Module
//!
//! Per-structure orchestration: everything between a parsed atom set and the
//! rows that land in the metadata tables.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Role definitions, interface pairs, plugin list,
//!   side-table policies and the ipSAE settings, validated by a builder
//! - **Role Resolution** ([`roles`]) - Chain map plus role specifications to named atom sets
//! - **Execution Context** ([`context`]) - The read-only bundle each plugin receives
//! - **Plugins** ([`plugins`]) - The analyzer trait and the built-in registry
//! - **Routing** ([`routing`]) - Column prefixing, parameter attachment and table placement
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Engine-level error type wrapping the lower layers

pub mod config;
pub mod context;
pub mod error;
pub mod plugins;
pub mod progress;
pub mod roles;
pub mod routing;
