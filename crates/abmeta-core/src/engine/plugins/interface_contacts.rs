use super::{Plugin, RowStream};
use crate::core::spatial::contacts::contact_stats;
use crate::core::tables::table::TableKind;
use crate::engine::context::ExecutionContext;

/// Contact, clash and minimum-distance statistics for each configured role pair.
///
/// Pairs where either role is unknown or resolved to no atoms are skipped.
pub struct InterfaceContactsPlugin;

impl Plugin for InterfaceContactsPlugin {
    fn name(&self) -> &'static str {
        "interface_contacts"
    }

    fn prefix(&self) -> &'static str {
        "iface"
    }

    fn table(&self) -> TableKind {
        TableKind::Interfaces
    }

    fn run<'a>(&'a self, ctx: &'a ExecutionContext<'a>) -> RowStream<'a> {
        let params = ctx.config.contacts;
        let rows = ctx.config.interface_pairs.iter().filter_map(move |pair| {
            let left = ctx.roles.get(&pair.left)?;
            let right = ctx.roles.get(&pair.right)?;
            if left.is_empty() || right.is_empty() {
                return None;
            }

            let stats = contact_stats(&left.coords(), &right.coords(), &params);
            Some(Ok(ctx
                .row()
                .with("pair", pair.key())
                .with("role_left", pair.left.as_str())
                .with("role_right", pair.right.as_str())
                .with("contact_cutoff", params.contact_cutoff)
                .with("clash_cutoff", params.clash_cutoff)
                .with("n_contact_atoms", stats.n_contact_atoms)
                .with("n_clash_atoms", stats.n_clash_atoms)
                .with("min_dist", stats.min_dist)))
        });
        Box::new(rows)
    }
}
