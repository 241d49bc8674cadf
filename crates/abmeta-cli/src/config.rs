use crate::cli::ExtractArgs;
use crate::error::{CliError, Result};
use abmeta::engine::config::{
    ANTIGEN_ROLE, ConflictPolicy, IdMode, InterfacePair, MetadataConfig, MetadataConfigBuilder,
    ParamMergeMode, VH_ROLE, VL_ROLE,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialParatopeConfig {
    cutoff: Option<f64>,
    id_mode: Option<IdMode>,
    summary_roles: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialContactConfig {
    contact_cutoff: Option<f64>,
    clash_cutoff: Option<f64>,
    cell_size: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialParamConfig {
    mode: Option<ParamMergeMode>,
    prefix: Option<String>,
    on_conflict: Option<ConflictPolicy>,
    csv: Option<Vec<PathBuf>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialIpsaeConfig {
    interpreter: Option<PathBuf>,
    script: Option<PathBuf>,
    pae_cutoff: Option<f64>,
    dist_cutoff: Option<f64>,
    timeout_secs: Option<u64>,
    emit_max: Option<bool>,
    emit_min: Option<bool>,
}

/// Configuration file contents; every key is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialMetadataConfig {
    assembly_id: Option<String>,
    plugins: Option<Vec<String>>,
    interface_pairs: Option<Vec<[String; 2]>>,
    paragraph_preds: Option<PathBuf>,
    roles: Option<toml::Table>,
    paratope: Option<PartialParatopeConfig>,
    contacts: Option<PartialContactConfig>,
    params: Option<PartialParamConfig>,
    ipsae: Option<PartialIpsaeConfig>,
}

/// Side-table locations resolved from the command line and the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideTables {
    pub param_csvs: Vec<PathBuf>,
    pub predictions: Option<PathBuf>,
}

fn chain_list(role: &str, value: toml::Value) -> Result<Vec<String>> {
    match value {
        toml::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                toml::Value::String(chain) => Ok(chain),
                other => Err(CliError::Config(format!(
                    "Role '{}' must list chain ids as strings, found {}.",
                    role, other
                ))),
            })
            .collect(),
        toml::Value::String(chain) => Ok(vec![chain]),
        other => Err(CliError::Config(format!(
            "Role '{}' must be a list of chain ids, found {}.",
            role, other
        ))),
    }
}

fn parse_pair(values: &[String]) -> Result<InterfacePair> {
    match values {
        [left, right] => Ok(InterfacePair::new(left, right)),
        _ => Err(CliError::InterfacePair(format!(
            "--iface-pair expects LEFT RIGHT, got {:?}",
            values
        ))),
    }
}

impl PartialMetadataConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let config_file_error = |source: anyhow::Error| CliError::ConfigFile {
            path: path.to_path_buf(),
            source,
        };
        let content = std::fs::read_to_string(path).map_err(|e| config_file_error(e.into()))?;
        toml::from_str(&content).map_err(|e| config_file_error(e.into()))
    }

    /// Loads `path` when given, otherwise starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    /// Combines file values with command-line flags; flags take precedence.
    ///
    /// Roles are applied in order: `antigen`/`vh`/`vl` shortcuts (flag, else
    /// file), the derived `antibody`, the file's other roles, then each
    /// `--role` occurrence. `--iface-pair` replaces the configured pairs.
    pub fn merge_with_cli(self, args: &ExtractArgs) -> Result<(MetadataConfig, SideTables)> {
        let paratope = self.paratope.unwrap_or_default();
        let contacts = self.contacts.unwrap_or_default();
        let params = self.params.unwrap_or_default();
        let ipsae = self.ipsae.unwrap_or_default();

        let mut builder = MetadataConfigBuilder::new();

        if let Some(id) = args.assembly_id.clone().or(self.assembly_id) {
            builder = builder.assembly_id(id);
        }
        if let Some(plugins) = args.plugins.clone().or(self.plugins) {
            builder = builder.plugins(plugins);
        }

        let mut file_roles: Vec<(String, Vec<String>)> = Vec::new();
        for (name, value) in self.roles.unwrap_or_default() {
            let chains = chain_list(&name, value)?;
            file_roles.push((name, chains));
        }
        let mut file_shortcut = |role: &str| {
            file_roles
                .iter()
                .position(|(name, _)| name == role)
                .map(|index| file_roles.remove(index).1)
        };
        let antigen = args.antigen_chains.clone().or(file_shortcut(ANTIGEN_ROLE));
        let vh = args.vh_chains.clone().or(file_shortcut(VH_ROLE));
        let vl = args.vl_chains.clone().or(file_shortcut(VL_ROLE));
        if let Some(chains) = antigen {
            builder = builder.antigen_chains(chains);
        }
        if let Some(chains) = vh {
            builder = builder.vh_chains(chains);
        }
        if let Some(chains) = vl {
            builder = builder.vl_chains(chains);
        }
        for (name, chains) in file_roles {
            builder = builder.role(name, chains);
        }
        for occurrence in &args.role {
            let Some((name, chains)) = occurrence.split_first() else {
                continue;
            };
            builder = builder.role(name.clone(), chains.to_vec());
        }

        if !args.iface_pair.is_empty() {
            let pairs = args
                .iface_pair
                .iter()
                .map(|values| parse_pair(values))
                .collect::<Result<Vec<_>>>()?;
            builder = builder.interface_pairs(pairs);
        } else if let Some(pairs) = self.interface_pairs {
            builder = builder.interface_pairs(
                pairs
                    .iter()
                    .map(|[left, right]| InterfacePair::new(left, right))
                    .collect(),
            );
        }

        if let Some(cutoff) = args.paragraph_cutoff.or(paratope.cutoff) {
            builder = builder.paratope_cutoff(cutoff);
        }
        if let Some(mode) = args.paragraph_id_mode.map(Into::into).or(paratope.id_mode) {
            builder = builder.id_mode(mode);
        }
        if let Some(roles) = args.role_paratope_summaries.clone().or(paratope.summary_roles) {
            builder = builder.summary_roles(roles);
        }

        if let Some(cutoff) = args.contact_cutoff.or(contacts.contact_cutoff) {
            builder = builder.contact_cutoff(cutoff);
        }
        if let Some(cutoff) = args.clash_cutoff.or(contacts.clash_cutoff) {
            builder = builder.clash_cutoff(cutoff);
        }
        if let Some(size) = args.cell_size.or(contacts.cell_size) {
            builder = builder.cell_size(size);
        }

        if let Some(mode) = args.csv_mode.map(Into::into).or(params.mode) {
            builder = builder.param_mode(mode);
        }
        if let Some(prefix) = args.param_prefix.clone().or(params.prefix) {
            builder = builder.param_prefix(prefix);
        }
        if let Some(policy) = args.param_on_conflict.map(Into::into).or(params.on_conflict) {
            builder = builder.on_conflict(policy);
        }

        if let Some(script) = args.ipsae_script.clone().or(ipsae.script) {
            builder = builder.ipsae_script(script);
        }
        if let Some(interpreter) = args.ipsae_interpreter.clone().or(ipsae.interpreter) {
            builder = builder.ipsae_interpreter(interpreter);
        }
        if let Some(secs) = args.ipsae_timeout.or(ipsae.timeout_secs) {
            builder = builder.ipsae_timeout(Duration::from_secs(secs));
        }
        if let Some(cutoff) = ipsae.pae_cutoff {
            builder = builder.ipsae_pae_cutoff(cutoff);
        }
        if let Some(cutoff) = ipsae.dist_cutoff {
            builder = builder.ipsae_dist_cutoff(cutoff);
        }
        if let Some(emit) = ipsae.emit_max {
            builder = builder.ipsae_emit_max(emit);
        }
        if let Some(emit) = ipsae.emit_min {
            builder = builder.ipsae_emit_min(emit);
        }

        let config = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let side_tables = SideTables {
            param_csvs: if args.param_csv.is_empty() {
                params.csv.unwrap_or_default()
            } else {
                args.param_csv.clone()
            },
            predictions: args.paragraph_preds.clone().or(self.paragraph_preds),
        };

        Ok((config, side_tables))
    }
}
