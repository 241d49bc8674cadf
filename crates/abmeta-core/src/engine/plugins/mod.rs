//! Built-in analyzers and the trait they implement.
//!
//! A plugin reads an [`ExecutionContext`] and yields rows. It never writes to
//! tables itself: the driver routes each row to the row's explicit table, or
//! to the plugin's default table, namespaces its columns with the plugin
//! prefix, and attaches per-file parameters.

mod chain_continuity;
mod identity;
mod interface_contacts;
mod ipsae;
mod paratope;

pub use chain_continuity::ChainContinuityPlugin;
pub use identity::IdentityPlugin;
pub use interface_contacts::InterfaceContactsPlugin;
pub use ipsae::IpsaePlugin;
pub use paratope::ParatopePlugin;

use super::config::ConfigError;
use super::context::ExecutionContext;
use super::error::EngineError;
use crate::core::tables::row::Row;
use crate::core::tables::table::TableKind;

/// Lazily produced rows of one plugin run.
pub type RowStream<'a> = Box<dyn Iterator<Item = Result<Row, EngineError>> + 'a>;

pub trait Plugin: Sync {
    /// Registry name used in configuration.
    fn name(&self) -> &'static str;

    /// Namespace for non-identity columns: `{prefix}__{column}`.
    fn prefix(&self) -> &'static str;

    /// Table for rows that do not carry an explicit one.
    fn table(&self) -> TableKind;

    fn run<'a>(&'a self, ctx: &'a ExecutionContext<'a>) -> RowStream<'a>;
}

static BUILTIN_PLUGINS: &[&dyn Plugin] = &[
    &IdentityPlugin,
    &ChainContinuityPlugin,
    &ParatopePlugin,
    &InterfaceContactsPlugin,
    &IpsaePlugin,
];

pub fn builtin_plugins() -> &'static [&'static dyn Plugin] {
    BUILTIN_PLUGINS
}

pub fn find_plugin(name: &str) -> Option<&'static dyn Plugin> {
    BUILTIN_PLUGINS.iter().copied().find(|p| p.name() == name)
}

/// Looks up every configured plugin name, preserving order.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownPlugin`] for the first name that is not registered.
pub fn resolve_plugins(names: &[String]) -> Result<Vec<&'static dyn Plugin>, ConfigError> {
    names
        .iter()
        .map(|name| {
            find_plugin(name).ok_or_else(|| {
                let mut available: Vec<&'static str> =
                    BUILTIN_PLUGINS.iter().map(|p| p.name()).collect();
                available.sort_unstable();
                ConfigError::UnknownPlugin {
                    name: name.clone(),
                    available,
                }
            })
        })
        .collect()
}
