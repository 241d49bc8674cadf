use abmeta::engine::config::{ConflictPolicy, IdMode, ParamMergeMode};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "abmeta - Role-aware geometric metadata extraction for antibody-antigen structure collections.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to process structures in parallel.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract structure, chain, role and interface metadata from a directory of structures.
    Extract(ExtractArgs),
    /// List the built-in plugins with their column prefix and default table.
    Plugins,
}

/// Arguments for the `extract` subcommand.
#[derive(Args, Debug, Default)]
pub struct ExtractArgs {
    // --- Core Arguments ---
    /// Directory searched recursively for .cif, .mmcif, .pdb and .ent files.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Directory the CSV tables are written to.
    #[arg(short, long, default_value = "abmeta_out", value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Optional configuration file in TOML format. Command-line flags take precedence.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Assembly identifier recorded in every row.
    #[arg(long, value_name = "ID")]
    pub assembly_id: Option<String>,

    /// Plugins to run, in order.
    #[arg(long, value_name = "NAME", num_args(1..))]
    pub plugins: Option<Vec<String>>,

    // --- Roles ---
    /// Chains forming the antigen role.
    #[arg(long, value_name = "CHAIN", num_args(0..))]
    pub antigen_chains: Option<Vec<String>>,

    /// Chains forming the heavy-chain role; also redefines `antibody` as vh + vl.
    #[arg(long, value_name = "CHAIN", num_args(0..))]
    pub vh_chains: Option<Vec<String>>,

    /// Chains forming the light-chain role; also redefines `antibody` as vh + vl.
    #[arg(long, value_name = "CHAIN", num_args(0..))]
    pub vl_chains: Option<Vec<String>>,

    /// Define a role: --role NAME CHAIN... (repeatable). Example: --role antigen A D
    #[arg(long, value_names = ["NAME", "CHAIN"], num_args(1..))]
    pub role: Vec<Vec<String>>,

    /// Add an interface pair: --iface-pair LEFT RIGHT (repeatable). Replaces the configured pairs.
    #[arg(long, value_names = ["LEFT", "RIGHT"], num_args(2))]
    pub iface_pair: Vec<Vec<String>>,

    // --- Side-tables ---
    /// Per-structure parameter CSV files keyed by `path`.
    #[arg(long, value_name = "PATH", num_args(1..))]
    pub param_csv: Vec<PathBuf>,

    /// How several parameter CSV files are combined.
    #[arg(long, value_enum, value_name = "MODE")]
    pub csv_mode: Option<CsvMode>,

    /// Prefix for parameter columns attached to every row.
    #[arg(long, value_name = "PREFIX")]
    pub param_prefix: Option<String>,

    /// What happens when a parameter column already exists on a row.
    #[arg(long, value_enum, value_name = "POLICY")]
    pub param_on_conflict: Option<OnConflict>,

    /// Per-residue paratope prediction CSV.
    #[arg(long, value_name = "PATH")]
    pub paragraph_preds: Option<PathBuf>,

    /// Score at or above which a residue counts as paratope.
    #[arg(long, value_name = "FLOAT")]
    pub paragraph_cutoff: Option<f64>,

    /// How prediction rows are matched to structure files.
    #[arg(long, value_enum, value_name = "MODE")]
    pub paragraph_id_mode: Option<IdModeArg>,

    /// Roles that get role-level paratope summaries.
    #[arg(long, value_name = "ROLE", num_args(0..))]
    pub role_paratope_summaries: Option<Vec<String>>,

    // --- Contacts ---
    /// Contact distance cutoff in Angstroms.
    #[arg(long, value_name = "FLOAT")]
    pub contact_cutoff: Option<f64>,

    /// Clash distance cutoff in Angstroms.
    #[arg(long, value_name = "FLOAT")]
    pub clash_cutoff: Option<f64>,

    /// Cell size of the contact search grid in Angstroms.
    #[arg(long, value_name = "FLOAT")]
    pub cell_size: Option<f64>,

    // --- ipSAE ---
    /// Path to the ipSAE script; required when the `ipsae` plugin is enabled.
    #[arg(long, value_name = "PATH")]
    pub ipsae_script: Option<PathBuf>,

    /// Interpreter used to run the ipSAE script.
    #[arg(long, value_name = "PATH")]
    pub ipsae_interpreter: Option<PathBuf>,

    /// Seconds to wait for the ipSAE script before aborting the run.
    #[arg(long, value_name = "SECS")]
    pub ipsae_timeout: Option<u64>,
}

/// Parameter CSV combination mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CsvMode {
    Merge,
    Append,
}

impl From<CsvMode> for ParamMergeMode {
    fn from(mode: CsvMode) -> Self {
        match mode {
            CsvMode::Merge => ParamMergeMode::Merge,
            CsvMode::Append => ParamMergeMode::Append,
        }
    }
}

/// Parameter column conflict policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnConflict {
    #[value(name = "keep_row")]
    KeepRow,
    Overwrite,
}

impl From<OnConflict> for ConflictPolicy {
    fn from(policy: OnConflict) -> Self {
        match policy {
            OnConflict::KeepRow => ConflictPolicy::KeepRow,
            OnConflict::Overwrite => ConflictPolicy::Overwrite,
        }
    }
}

/// Prediction-to-structure matching mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IdModeArg {
    Stem,
    Path,
}

impl From<IdModeArg> for IdMode {
    fn from(mode: IdModeArg) -> Self {
        match mode {
            IdModeArg::Stem => IdMode::Stem,
            IdModeArg::Path => IdMode::Path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ExtractArgs {
        let cli = Cli::parse_from(["abmeta", "extract"].iter().chain(args));
        match cli.command {
            Commands::Extract(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn repeated_role_flags_are_grouped_per_occurrence() {
        let args = parse(&[
            "-i", "in", "--role", "antigen", "A", "D", "--role", "vh", "H",
        ]);
        assert_eq!(
            args.role,
            vec![
                vec!["antigen".to_string(), "A".into(), "D".into()],
                vec!["vh".to_string(), "H".into()],
            ]
        );
        assert_eq!(args.out_dir, PathBuf::from("abmeta_out"));
    }

    #[test]
    fn iface_pairs_take_exactly_two_values() {
        let args = parse(&[
            "-i", "in", "--iface-pair", "vh", "antigen", "--iface-pair", "vl", "antigen",
        ]);
        assert_eq!(args.iface_pair.len(), 2);
        assert_eq!(args.iface_pair[1], vec!["vl".to_string(), "antigen".into()]);

        let result = Cli::try_parse_from(["abmeta", "extract", "-i", "in", "--iface-pair", "vh"]);
        assert!(result.is_err());
    }

    #[test]
    fn empty_role_shortcut_is_distinct_from_absent() {
        let args = parse(&["-i", "in", "--vl-chains"]);
        assert_eq!(args.vl_chains, Some(Vec::new()));
        assert_eq!(args.vh_chains, None);
    }

    #[test]
    fn value_enums_use_snake_case_names() {
        let args = parse(&[
            "-i", "in", "--csv-mode", "append", "--param-on-conflict", "keep_row",
            "--paragraph-id-mode", "path",
        ]);
        assert_eq!(args.csv_mode, Some(CsvMode::Append));
        assert_eq!(args.param_on_conflict, Some(OnConflict::KeepRow));
        assert_eq!(args.paragraph_id_mode, Some(IdModeArg::Path));
    }

    #[test]
    fn global_flags_are_accepted_after_subcommand() {
        let cli = Cli::parse_from(["abmeta", "extract", "-i", "in", "-vv", "-j", "4"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.threads, Some(4));
    }
}
