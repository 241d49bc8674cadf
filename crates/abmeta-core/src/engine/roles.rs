use super::config::RoleConfig;
use crate::core::models::atom_set::AtomSet;
use crate::core::models::chain::ChainMap;
use indexmap::IndexMap;

/// Role name to the concatenated atoms of its member chains, in configuration order.
pub type RoleMap = IndexMap<String, AtomSet>;

/// Resolves configured roles against the chains of one structure.
///
/// Each role becomes the concatenation, in configured order, of its member
/// chains that exist in `chains` and are non-empty. Missing or empty chains
/// are skipped, so a role that resolves to nothing is an empty set over the
/// structure's storage rather than an error.
///
/// # Arguments
///
/// * `chains` - The structure's chain map.
/// * `roles` - The configured role membership.
/// * `template` - Supplies the storage for empty roles (normally the structure's full atom set).
pub fn build_roles(chains: &ChainMap, roles: &RoleConfig, template: &AtomSet) -> RoleMap {
    roles
        .iter()
        .map(|(name, spec)| {
            let parts: Vec<&AtomSet> = spec
                .chain_ids()
                .iter()
                .filter_map(|id| chains.get(id))
                .filter(|set| !set.is_empty())
                .collect();
            (name.clone(), AtomSet::concatenate(&parts, template))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::{Atom, AtomKind};
    use crate::core::models::chain::build_chain_map;
    use crate::engine::config::RoleSpec;
    use nalgebra::Point3;

    fn structure() -> AtomSet {
        AtomSet::new(vec![
            Atom::new("N", "A", Point3::new(0.0, 0.0, 0.0)),
            Atom::new("N", "H", Point3::new(1.0, 0.0, 0.0)),
            Atom::new("CA", "H", Point3::new(2.0, 0.0, 0.0)),
            Atom::new("N", "L", Point3::new(3.0, 0.0, 0.0)),
            Atom::new("ZN", "Z", Point3::new(4.0, 0.0, 0.0)).with_kind(AtomKind::NonPolymer),
        ])
    }

    fn config(entries: &[(&str, &[&str])]) -> RoleConfig {
        entries
            .iter()
            .map(|(name, ids)| (name.to_string(), RoleSpec::new(ids.iter().copied())))
            .collect()
    }

    #[test]
    fn concatenates_member_chains_in_configured_order() {
        let atoms = structure();
        let chains = build_chain_map(&atoms);
        let roles = build_roles(&chains, &config(&[("antibody", &["L", "H"])]), &atoms);

        let xs: Vec<f64> = roles["antibody"].iter().map(|a| a.position.x).collect();
        assert_eq!(xs, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn missing_and_empty_chains_are_skipped() {
        let atoms = structure();
        let chains = build_chain_map(&atoms);
        let roles = build_roles(
            &chains,
            &config(&[("antigen", &["A", "Q"]), ("ligand", &["Z"]), ("nothing", &["Q"])]),
            &atoms,
        );

        assert_eq!(roles["antigen"].len(), 1);
        assert!(roles["ligand"].is_empty());
        assert!(roles["nothing"].is_empty());
        assert_eq!(roles.keys().collect::<Vec<_>>(), vec!["antigen", "ligand", "nothing"]);
    }
}
