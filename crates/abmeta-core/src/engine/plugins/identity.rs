use super::{Plugin, RowStream};
use crate::core::models::atom_set::AtomSet;
use crate::engine::context::ExecutionContext;
use crate::core::tables::table::TableKind;
use std::iter;

/// Atom counts and unresolved-coordinate flags for the structure, each chain and each role.
pub struct IdentityPlugin;

/// An empty selection is reported as having unresolved coordinates.
fn has_nan_coord(atoms: &AtomSet) -> bool {
    atoms.is_empty() || atoms.has_invalid_coord()
}

impl Plugin for IdentityPlugin {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn prefix(&self) -> &'static str {
        "id"
    }

    fn table(&self) -> TableKind {
        TableKind::Structures
    }

    fn run<'a>(&'a self, ctx: &'a ExecutionContext<'a>) -> RowStream<'a> {
        let structure = ctx
            .row_for(TableKind::Structures)
            .with("n_atoms_total", ctx.atoms.len())
            .with("has_nan_coord", has_nan_coord(&ctx.atoms))
            .with("n_chains", ctx.chains.len());

        let chains = ctx.chains.iter().map(move |(chain_id, atoms)| {
            ctx.row_for(TableKind::Chains)
                .with("chain_id", chain_id.as_str())
                .with("n_atoms", atoms.len())
                .with("has_nan_coord", has_nan_coord(atoms))
        });

        let roles = ctx.roles.iter().map(move |(role, atoms)| {
            ctx.row_for(TableKind::Roles)
                .with("role", role.as_str())
                .with("n_atoms", atoms.len())
                .with("has_nan_coord", has_nan_coord(atoms))
        });

        Box::new(iter::once(structure).chain(chains).chain(roles).map(Ok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::tables::value::Value;
    use crate::engine::config::MetadataConfig;
    use nalgebra::Point3;

    #[test]
    fn emits_structure_chain_and_role_rows() {
        let config = MetadataConfig::default();
        let atoms = AtomSet::new(vec![
            Atom::new("CA", "A", Point3::origin()),
            Atom::new("CA", "B", Point3::new(f64::NAN, 0.0, 0.0)),
            Atom::new("CB", "B", Point3::new(1.0, 0.0, 0.0)),
        ]);
        let ctx = ExecutionContext::new("/s.cif".into(), atoms, &config, None, None);

        let rows: Vec<_> = IdentityPlugin.run(&ctx).map(Result::unwrap).collect();

        assert_eq!(rows.len(), 1 + 2 + 4);
        let s = &rows[0];
        assert_eq!(s.table(), Some(TableKind::Structures));
        assert_eq!(s.get("n_atoms_total"), Some(&Value::Int(3)));
        assert_eq!(s.get("has_nan_coord"), Some(&Value::Bool(true)));
        assert_eq!(s.get("n_chains"), Some(&Value::Int(2)));

        let chain_a = &rows[1];
        assert_eq!(chain_a.table(), Some(TableKind::Chains));
        assert_eq!(chain_a.get("chain_id"), Some(&Value::from("A")));
        assert_eq!(chain_a.get("has_nan_coord"), Some(&Value::Bool(false)));

        let vl = rows
            .iter()
            .find(|r| r.get("role") == Some(&Value::from("vl")))
            .unwrap();
        assert_eq!(vl.table(), Some(TableKind::Roles));
        assert_eq!(vl.get("n_atoms"), Some(&Value::Int(0)));
        assert_eq!(vl.get("has_nan_coord"), Some(&Value::Bool(true)));
    }
}
