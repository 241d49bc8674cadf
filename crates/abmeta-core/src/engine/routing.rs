use super::config::{ConflictPolicy, ParamPolicy};
use super::context::ExecutionContext;
use super::error::EngineError;
use super::plugins::Plugin;
use crate::core::io::params::ParamRow;
use crate::core::tables::row::Row;
use crate::core::tables::table::TableSet;
use phf::{Set, phf_set};
use tracing::debug;

/// Columns that identify a row and are never namespaced by a plugin prefix.
pub static IDENTITY_COLUMNS: Set<&'static str> = phf_set! {
    "path",
    "assembly_id",
    "chain_id",
    "role",
    "pair",
    "role_left",
    "role_right",
    "contact_cutoff",
    "clash_cutoff",
};

pub fn is_identity_column(name: &str) -> bool {
    IDENTITY_COLUMNS.contains(name)
}

/// Namespaces a plugin row: every non-identity column becomes `{prefix}__{column}`.
///
/// The row's table override is cleared; routing has already consumed it.
pub fn prefix_row(row: Row, prefix: &str) -> Row {
    row.into_columns()
        .into_iter()
        .map(|(name, value)| {
            if is_identity_column(&name) {
                (name, value)
            } else {
                (format!("{}__{}", prefix, name), value)
            }
        })
        .collect()
}

/// Adds per-file parameters to a row as `{policy.prefix}{column}` columns.
///
/// Under [`ConflictPolicy::KeepRow`] a column the row already has is left
/// untouched; under [`ConflictPolicy::Overwrite`] the parameter replaces it.
pub fn attach_params(row: &mut Row, params: Option<&ParamRow>, policy: &ParamPolicy) {
    let Some(params) = params else {
        return;
    };
    for (name, value) in params {
        let column = format!("{}{}", policy.prefix, name);
        if policy.on_conflict == ConflictPolicy::KeepRow && row.contains(&column) {
            continue;
        }
        row.insert(column, value.clone());
    }
}

/// Runs `plugins` in order against one structure and routes their rows.
///
/// Each row goes to its explicit table, or to the plugin's default table,
/// then is prefixed and receives the structure's parameters.
///
/// # Errors
///
/// Returns the first error any plugin yields; rows already produced for this
/// structure are discarded with the partial table set.
pub fn collect_rows(
    ctx: &ExecutionContext<'_>,
    plugins: &[&dyn Plugin],
) -> Result<TableSet, EngineError> {
    let mut tables = TableSet::new();
    for plugin in plugins {
        let mut emitted = 0usize;
        for row in plugin.run(ctx) {
            let row = row?;
            let table = row.table().unwrap_or_else(|| plugin.table());
            let mut row = prefix_row(row, plugin.prefix());
            attach_params(&mut row, ctx.params, &ctx.config.params);
            tables.push(table, row);
            emitted += 1;
        }
        debug!(plugin = plugin.name(), path = %ctx.path, rows = emitted, "Plugin finished.");
    }
    Ok(tables)
}
