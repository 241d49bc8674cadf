pub use crate::core::io::params::ParamMergeMode;
pub use crate::core::io::predictions::IdMode;
pub use crate::core::spatial::contacts::ContactParams;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const ANTIGEN_ROLE: &str = "antigen";
pub const VH_ROLE: &str = "vh";
pub const VL_ROLE: &str = "vl";
pub const ANTIBODY_ROLE: &str = "antibody";

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: &'static str, reason: String },

    #[error("Unknown plugin '{name}'. Available: {}", .available.join(", "))]
    UnknownPlugin {
        name: String,
        available: Vec<&'static str>,
    },
}

/// An ordered, duplicate-free list of chain identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoleSpec {
    chain_ids: Vec<String>,
}

impl RoleSpec {
    /// Creates a role from chain ids; repeated ids keep their first position.
    pub fn new<I, S>(chain_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chain_ids: chain_ids.into_iter().map(Into::<String>::into).unique().collect(),
        }
    }

    pub fn chain_ids(&self) -> &[String] {
        &self.chain_ids
    }

    pub fn contains(&self, chain_id: &str) -> bool {
        self.chain_ids.iter().any(|c| c == chain_id)
    }

    pub fn is_empty(&self) -> bool {
        self.chain_ids.is_empty()
    }
}

/// Role name to chain membership, in configuration order.
pub type RoleConfig = IndexMap<String, RoleSpec>;

/// An ordered pair of roles whose interface is measured.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterfacePair {
    pub left: String,
    pub right: String,
}

impl InterfacePair {
    pub fn new(left: &str, right: &str) -> Self {
        Self {
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    /// The interfaces-table key `{left}__{right}`.
    pub fn key(&self) -> String {
        format!("{}__{}", self.left, self.right)
    }
}

/// What happens when a parameter column collides with a column a plugin already emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    #[default]
    KeepRow,
    Overwrite,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParatopeConfig {
    pub cutoff: f64,
    pub id_mode: IdMode,
    pub summary_roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamPolicy {
    pub mode: ParamMergeMode,
    pub prefix: String,
    pub on_conflict: ConflictPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IpsaeConfig {
    pub interpreter: PathBuf,
    pub script: Option<PathBuf>,
    pub pae_cutoff: f64,
    pub dist_cutoff: f64,
    pub timeout: Duration,
    pub emit_max: bool,
    pub emit_min: bool,
}

impl Default for IpsaeConfig {
    fn default() -> Self {
        Self {
            interpreter: PathBuf::from("python"),
            script: None,
            pae_cutoff: 15.0,
            dist_cutoff: 15.0,
            timeout: Duration::from_secs(600),
            emit_max: true,
            emit_min: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataConfig {
    pub assembly_id: String,
    pub roles: RoleConfig,
    pub interface_pairs: Vec<InterfacePair>,
    pub paratope: ParatopeConfig,
    pub contacts: ContactParams,
    pub params: ParamPolicy,
    pub plugins: Vec<String>,
    pub ipsae: IpsaeConfig,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        let mut roles = RoleConfig::new();
        roles.insert(ANTIGEN_ROLE.to_string(), RoleSpec::new(["A"]));
        roles.insert(VH_ROLE.to_string(), RoleSpec::new(["B"]));
        roles.insert(VL_ROLE.to_string(), RoleSpec::new(["C"]));
        roles.insert(ANTIBODY_ROLE.to_string(), RoleSpec::new(["B", "C"]));

        Self {
            assembly_id: "1".to_string(),
            roles,
            interface_pairs: vec![InterfacePair::new(ANTIBODY_ROLE, ANTIGEN_ROLE)],
            paratope: ParatopeConfig {
                cutoff: 0.734,
                id_mode: IdMode::Stem,
                summary_roles: vec![VH_ROLE.into(), VL_ROLE.into(), ANTIBODY_ROLE.into()],
            },
            contacts: ContactParams::default(),
            params: ParamPolicy {
                mode: ParamMergeMode::Merge,
                prefix: "param__".to_string(),
                on_conflict: ConflictPolicy::KeepRow,
            },
            plugins: ["identity", "chain_continuity", "paragraph_paratope", "interface_contacts"]
                .map(String::from)
                .to_vec(),
            ipsae: IpsaeConfig::default(),
        }
    }
}

/// Builds a [`MetadataConfig`], starting from the defaults.
///
/// Role edits are applied in a fixed order at [`build`](Self::build): the
/// `antigen`/`vh`/`vl` shortcuts first, then the derived `antibody` role
/// (first-occurrence union of `vh` and `vl`, only when either shortcut was
/// given), then explicit [`role`](Self::role) overrides in call order.
#[derive(Default)]
pub struct MetadataConfigBuilder {
    assembly_id: Option<String>,
    antigen_chains: Option<Vec<String>>,
    vh_chains: Option<Vec<String>>,
    vl_chains: Option<Vec<String>>,
    role_overrides: Vec<(String, Vec<String>)>,
    interface_pairs: Option<Vec<InterfacePair>>,
    paratope_cutoff: Option<f64>,
    id_mode: Option<IdMode>,
    summary_roles: Option<Vec<String>>,
    contact_cutoff: Option<f64>,
    clash_cutoff: Option<f64>,
    cell_size: Option<f64>,
    param_mode: Option<ParamMergeMode>,
    param_prefix: Option<String>,
    on_conflict: Option<ConflictPolicy>,
    plugins: Option<Vec<String>>,
    ipsae_interpreter: Option<PathBuf>,
    ipsae_script: Option<PathBuf>,
    ipsae_pae_cutoff: Option<f64>,
    ipsae_dist_cutoff: Option<f64>,
    ipsae_timeout: Option<Duration>,
    ipsae_emit_max: Option<bool>,
    ipsae_emit_min: Option<bool>,
}

impl MetadataConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assembly_id(mut self, id: impl Into<String>) -> Self {
        self.assembly_id = Some(id.into());
        self
    }
    pub fn antigen_chains(mut self, chains: Vec<String>) -> Self {
        self.antigen_chains = Some(chains);
        self
    }
    pub fn vh_chains(mut self, chains: Vec<String>) -> Self {
        self.vh_chains = Some(chains);
        self
    }
    pub fn vl_chains(mut self, chains: Vec<String>) -> Self {
        self.vl_chains = Some(chains);
        self
    }
    pub fn role(mut self, name: impl Into<String>, chains: Vec<String>) -> Self {
        self.role_overrides.push((name.into(), chains));
        self
    }
    pub fn interface_pairs(mut self, pairs: Vec<InterfacePair>) -> Self {
        self.interface_pairs = Some(pairs);
        self
    }
    pub fn paratope_cutoff(mut self, cutoff: f64) -> Self {
        self.paratope_cutoff = Some(cutoff);
        self
    }
    pub fn id_mode(mut self, mode: IdMode) -> Self {
        self.id_mode = Some(mode);
        self
    }
    pub fn summary_roles(mut self, roles: Vec<String>) -> Self {
        self.summary_roles = Some(roles);
        self
    }
    pub fn contact_cutoff(mut self, cutoff: f64) -> Self {
        self.contact_cutoff = Some(cutoff);
        self
    }
    pub fn clash_cutoff(mut self, cutoff: f64) -> Self {
        self.clash_cutoff = Some(cutoff);
        self
    }
    pub fn cell_size(mut self, size: f64) -> Self {
        self.cell_size = Some(size);
        self
    }
    pub fn param_mode(mut self, mode: ParamMergeMode) -> Self {
        self.param_mode = Some(mode);
        self
    }
    pub fn param_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.param_prefix = Some(prefix.into());
        self
    }
    pub fn on_conflict(mut self, policy: ConflictPolicy) -> Self {
        self.on_conflict = Some(policy);
        self
    }
    pub fn plugins(mut self, names: Vec<String>) -> Self {
        self.plugins = Some(names);
        self
    }
    pub fn ipsae_interpreter(mut self, path: PathBuf) -> Self {
        self.ipsae_interpreter = Some(path);
        self
    }
    pub fn ipsae_script(mut self, path: PathBuf) -> Self {
        self.ipsae_script = Some(path);
        self
    }
    pub fn ipsae_pae_cutoff(mut self, cutoff: f64) -> Self {
        self.ipsae_pae_cutoff = Some(cutoff);
        self
    }
    pub fn ipsae_dist_cutoff(mut self, cutoff: f64) -> Self {
        self.ipsae_dist_cutoff = Some(cutoff);
        self
    }
    pub fn ipsae_timeout(mut self, timeout: Duration) -> Self {
        self.ipsae_timeout = Some(timeout);
        self
    }
    pub fn ipsae_emit_max(mut self, emit: bool) -> Self {
        self.ipsae_emit_max = Some(emit);
        self
    }
    pub fn ipsae_emit_min(mut self, emit: bool) -> Self {
        self.ipsae_emit_min = Some(emit);
        self
    }

    pub fn build(self) -> Result<MetadataConfig, ConfigError> {
        let defaults = MetadataConfig::default();

        let mut roles = defaults.roles;
        if let Some(chains) = self.antigen_chains {
            roles.insert(ANTIGEN_ROLE.to_string(), RoleSpec::new(chains));
        }
        let derive_antibody = self.vh_chains.is_some() || self.vl_chains.is_some();
        if let Some(chains) = self.vh_chains {
            roles.insert(VH_ROLE.to_string(), RoleSpec::new(chains));
        }
        if let Some(chains) = self.vl_chains {
            roles.insert(VL_ROLE.to_string(), RoleSpec::new(chains));
        }
        if derive_antibody {
            let union = [VH_ROLE, VL_ROLE]
                .iter()
                .filter_map(|name| roles.get(*name))
                .flat_map(|spec| spec.chain_ids().iter().cloned())
                .collect::<Vec<_>>();
            roles.insert(ANTIBODY_ROLE.to_string(), RoleSpec::new(union));
        }
        for (name, chains) in self.role_overrides {
            roles.insert(name, RoleSpec::new(chains));
        }

        let contacts = ContactParams {
            contact_cutoff: self.contact_cutoff.unwrap_or(defaults.contacts.contact_cutoff),
            clash_cutoff: self.clash_cutoff.unwrap_or(defaults.contacts.clash_cutoff),
            cell_size: self.cell_size.unwrap_or(defaults.contacts.cell_size),
        };
        if !(contacts.cell_size > 0.0 && contacts.cell_size.is_finite()) {
            return Err(ConfigError::InvalidValue {
                name: "cell_size",
                reason: format!("must be a positive number, got {}", contacts.cell_size),
            });
        }
        for (name, value) in [
            ("contact_cutoff", contacts.contact_cutoff),
            ("clash_cutoff", contacts.clash_cutoff),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::InvalidValue {
                    name,
                    reason: format!("must be a non-negative number, got {}", value),
                });
            }
        }

        let plugins = self.plugins.unwrap_or(defaults.plugins);
        let ipsae = IpsaeConfig {
            interpreter: self.ipsae_interpreter.unwrap_or(defaults.ipsae.interpreter),
            script: self.ipsae_script.or(defaults.ipsae.script),
            pae_cutoff: self.ipsae_pae_cutoff.unwrap_or(defaults.ipsae.pae_cutoff),
            dist_cutoff: self.ipsae_dist_cutoff.unwrap_or(defaults.ipsae.dist_cutoff),
            timeout: self.ipsae_timeout.unwrap_or(defaults.ipsae.timeout),
            emit_max: self.ipsae_emit_max.unwrap_or(defaults.ipsae.emit_max),
            emit_min: self.ipsae_emit_min.unwrap_or(defaults.ipsae.emit_min),
        };
        if plugins.iter().any(|p| p == "ipsae") && ipsae.script.is_none() {
            return Err(ConfigError::MissingParameter("ipsae_script"));
        }

        Ok(MetadataConfig {
            assembly_id: self.assembly_id.unwrap_or(defaults.assembly_id),
            roles,
            interface_pairs: self.interface_pairs.unwrap_or(defaults.interface_pairs),
            paratope: ParatopeConfig {
                cutoff: self.paratope_cutoff.unwrap_or(defaults.paratope.cutoff),
                id_mode: self.id_mode.unwrap_or(defaults.paratope.id_mode),
                summary_roles: self.summary_roles.unwrap_or(defaults.paratope.summary_roles),
            },
            contacts,
            params: ParamPolicy {
                mode: self.param_mode.unwrap_or(defaults.params.mode),
                prefix: self.param_prefix.unwrap_or(defaults.params.prefix),
                on_conflict: self.on_conflict.unwrap_or(defaults.params.on_conflict),
            },
            plugins,
            ipsae,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chains(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn role_spec_removes_duplicates_keeping_first() {
        let spec = RoleSpec::new(["H", "L", "H", "A", "L"]);
        assert_eq!(spec.chain_ids(), ["H", "L", "A"]);
    }

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = MetadataConfigBuilder::new().build().unwrap();

        assert_eq!(config.assembly_id, "1");
        assert_eq!(config.roles[ANTIGEN_ROLE].chain_ids(), ["A"]);
        assert_eq!(config.roles[ANTIBODY_ROLE].chain_ids(), ["B", "C"]);
        assert_eq!(config.interface_pairs, vec![InterfacePair::new("antibody", "antigen")]);
        assert_eq!(config.paratope.cutoff, 0.734);
        assert_eq!(config.paratope.id_mode, IdMode::Stem);
        assert_eq!(config.params.prefix, "param__");
        assert_eq!(config.params.mode, ParamMergeMode::Merge);
        assert_eq!(
            config.plugins,
            chains(&["identity", "chain_continuity", "paragraph_paratope", "interface_contacts"])
        );
        assert_eq!(config.contacts, ContactParams::default());
    }

    #[test]
    fn antibody_is_derived_from_vh_and_vl_shortcuts() {
        let config = MetadataConfigBuilder::new()
            .vh_chains(chains(&["H", "K"]))
            .vl_chains(chains(&["L", "H"]))
            .build()
            .unwrap();

        assert_eq!(config.roles[VH_ROLE].chain_ids(), ["H", "K"]);
        assert_eq!(config.roles[ANTIBODY_ROLE].chain_ids(), ["H", "K", "L"]);
        assert_eq!(config.roles[VL_ROLE].chain_ids(), ["L", "H"]);
    }

    #[test]
    fn explicit_role_override_wins_over_derived_antibody() {
        let config = MetadataConfigBuilder::new()
            .vh_chains(chains(&["H"]))
            .role("antibody", chains(&["X"]))
            .role("nanobody", chains(&["N", "N"]))
            .build()
            .unwrap();

        assert_eq!(config.roles[ANTIBODY_ROLE].chain_ids(), ["X"]);
        assert_eq!(config.roles["nanobody"].chain_ids(), ["N"]);
        assert_eq!(config.roles.keys().last().map(String::as_str), Some("nanobody"));
    }

    #[test]
    fn non_positive_cell_size_is_rejected() {
        let err = MetadataConfigBuilder::new().cell_size(0.0).build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "cell_size", .. }));
    }

    #[test]
    fn negative_or_non_finite_cutoffs_are_rejected() {
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let err = MetadataConfigBuilder::new().clash_cutoff(bad).build().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { name: "clash_cutoff", .. }));

            let err = MetadataConfigBuilder::new().contact_cutoff(bad).build().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { name: "contact_cutoff", .. }));
        }
        assert!(MetadataConfigBuilder::new().clash_cutoff(0.0).build().is_ok());
    }

    #[test]
    fn ipsae_plugin_requires_a_script() {
        let err = MetadataConfigBuilder::new()
            .plugins(chains(&["ipsae"]))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("ipsae_script"));

        let ok = MetadataConfigBuilder::new()
            .plugins(chains(&["ipsae"]))
            .ipsae_script(PathBuf::from("ipsae.py"))
            .build();
        assert!(ok.is_ok());
    }

    #[test]
    fn interface_pair_key_joins_roles() {
        assert_eq!(InterfacePair::new("vh", "antigen").key(), "vh__antigen");
    }
}
