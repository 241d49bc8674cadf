use super::atom_set::AtomSet;
use std::collections::BTreeMap;

/// Mapping from chain identifier to the polymer atoms of that chain.
///
/// Ordered by chain identifier so every consumer iterates chains in the same,
/// reproducible order.
pub type ChainMap = BTreeMap<String, AtomSet>;

/// Partitions a structure into per-chain polymer selections.
///
/// Every chain identifier present in `atoms` gets an entry, including chains
/// that carry only non-polymer atoms; those map to an empty selection.
///
/// # Arguments
///
/// * `atoms` - The full atom set of one structure.
///
/// # Return
///
/// Returns the chain map, keyed and ordered by chain identifier.
pub fn build_chain_map(atoms: &AtomSet) -> ChainMap {
    atoms
        .chain_ids()
        .into_iter()
        .map(|chain_id| {
            let selection = atoms.select(|atom| atom.chain_id == chain_id && atom.is_polymer());
            (chain_id, selection)
        })
        .collect()
}
