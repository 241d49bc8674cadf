use super::config::MetadataConfig;
use super::roles::{RoleMap, build_roles};
use crate::core::io::params::ParamRow;
use crate::core::io::predictions::PredictionTable;
use crate::core::models::atom_set::AtomSet;
use crate::core::models::chain::{ChainMap, build_chain_map};
use crate::core::tables::row::Row;
use crate::core::tables::table::TableKind;

/// Everything a plugin may read about one structure.
///
/// Built once per structure and dropped after its rows are collected.
/// Plugins only ever receive a shared reference.
#[derive(Debug)]
pub struct ExecutionContext<'a> {
    pub path: String,
    pub assembly_id: &'a str,
    pub atoms: AtomSet,
    pub chains: ChainMap,
    pub roles: RoleMap,
    pub config: &'a MetadataConfig,
    pub params: Option<&'a ParamRow>,
    pub predictions: Option<&'a PredictionTable>,
}

impl<'a> ExecutionContext<'a> {
    /// Builds the chain map and role map of a parsed structure.
    ///
    /// A structure with no chains gets an empty role map.
    pub fn new(
        path: String,
        atoms: AtomSet,
        config: &'a MetadataConfig,
        params: Option<&'a ParamRow>,
        predictions: Option<&'a PredictionTable>,
    ) -> Self {
        let chains = build_chain_map(&atoms);
        let roles = if chains.is_empty() {
            RoleMap::new()
        } else {
            build_roles(&chains, &config.roles, &atoms)
        };
        Self {
            path,
            assembly_id: &config.assembly_id,
            atoms,
            chains,
            roles,
            config,
            params,
            predictions,
        }
    }

    /// Starts a row with the `path` and `assembly_id` identity columns filled in.
    pub fn row(&self) -> Row {
        Row::new()
            .with("path", self.path.as_str())
            .with("assembly_id", self.assembly_id)
    }

    /// Like [`row`](Self::row), but explicitly routed to `table`.
    pub fn row_for(&self, table: TableKind) -> Row {
        let mut row = self.row();
        row.set_table(Some(table));
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::tables::value::Value;
    use nalgebra::Point3;

    #[test]
    fn new_builds_chains_and_configured_roles() {
        let config = MetadataConfig::default();
        let atoms = AtomSet::new(vec![
            Atom::new("CA", "A", Point3::origin()),
            Atom::new("CA", "B", Point3::new(4.0, 0.0, 0.0)),
        ]);

        let ctx = ExecutionContext::new("/x/1abc.cif".into(), atoms, &config, None, None);

        assert_eq!(ctx.chains.len(), 2);
        assert_eq!(ctx.roles.len(), config.roles.len());
        assert_eq!(ctx.roles["antibody"].len(), 1);
        assert!(ctx.roles["vl"].is_empty());
    }

    #[test]
    fn row_starts_with_identity_columns() {
        let config = MetadataConfig::default();
        let ctx = ExecutionContext::new(
            "/x/1abc.cif".into(),
            AtomSet::new(vec![Atom::new("CA", "A", Point3::origin())]),
            &config,
            None,
            None,
        );
        let row = ctx.row();
        assert_eq!(row.get("path"), Some(&Value::from("/x/1abc.cif")));
        assert_eq!(row.get("assembly_id"), Some(&Value::from("1")));
        assert_eq!(row.table(), None);
        assert_eq!(ctx.row_for(TableKind::Roles).table(), Some(TableKind::Roles));
    }
}
