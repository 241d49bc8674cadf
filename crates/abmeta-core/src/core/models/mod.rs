//! # Core Models Module
//!
//! This module contains the data structures used to represent parsed
//! macromolecular structures inside abmeta.
//!
//! ## Overview
//!
//! The pipeline never needs a full residue/bond topology; it works on flat atom
//! arrays annotated with chain identifiers and polymer membership. The models are
//! designed to:
//!
//! - **Share, not copy** - Chain and role selections are index views over one storage
//! - **Keep unresolved atoms** - Missing coordinates are NaN, filtered only where distances are computed
//! - **Iterate deterministically** - Chain maps are ordered by chain identifier
//!
//! ## Key Components
//!
//! - [`atom`] - Individual atom with coordinates, residue/chain identity and polymer flag
//! - [`atom_set`] - Ordered, shareable views over a structure's atoms
//! - [`chain`] - Partitioning of a structure into per-chain polymer selections
//!
//! ## Usage
//!
//! ```ignore
//! use abmeta::core::models::{atom::Atom, atom_set::AtomSet, chain::build_chain_map};
//!
//! let atoms = AtomSet::new(vec![Atom::new("CA", "H", Point3::new(0.0, 0.0, 0.0))]);
//! let chains = build_chain_map(&atoms);
//! ```

pub mod atom;
pub mod atom_set;
pub mod chain;
