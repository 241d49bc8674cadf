use super::{Plugin, RowStream};
use crate::core::tables::table::TableKind;
use crate::core::utils::geometry::count_backbone_breaks;
use crate::engine::context::ExecutionContext;
use tracing::warn;

/// Backbone break detection per non-empty chain.
///
/// A chain whose continuity cannot be assessed is reported as broken with
/// `n_breaks = -1`.
pub struct ChainContinuityPlugin;

impl Plugin for ChainContinuityPlugin {
    fn name(&self) -> &'static str {
        "chain_continuity"
    }

    fn prefix(&self) -> &'static str {
        "qc"
    }

    fn table(&self) -> TableKind {
        TableKind::Chains
    }

    fn run<'a>(&'a self, ctx: &'a ExecutionContext<'a>) -> RowStream<'a> {
        let rows = ctx
            .chains
            .iter()
            .filter(|(_, atoms)| !atoms.is_empty())
            .map(move |(chain_id, atoms)| {
                let (has_break, n_breaks) = match count_backbone_breaks(atoms) {
                    Ok(n) => (n > 0, n as i64),
                    Err(e) => {
                        warn!(path = %ctx.path, chain = %chain_id, error = %e, "Continuity check failed; marking chain as broken.");
                        (true, -1)
                    }
                };
                Ok(ctx
                    .row()
                    .with("chain_id", chain_id.as_str())
                    .with("has_break", has_break)
                    .with("n_breaks", n_breaks))
            });
        Box::new(rows)
    }
}
