use crate::core::io::discovery::list_structures;
use crate::core::io::export::{ExportError, write_rows, write_table};
use crate::core::io::params::{ParamMap, load_param_map};
use crate::core::io::predictions::{PredictionTable, load_predictions};
use crate::core::io::structure::read_structure;
use crate::core::tables::row::Row;
use crate::core::tables::table::{Table, TableSet};
use crate::core::tables::wide::build_wide_table;
use crate::engine::config::MetadataConfig;
use crate::engine::context::ExecutionContext;
use crate::engine::error::EngineError;
use crate::engine::plugins::{Plugin, resolve_plugins};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::routing::{attach_params, collect_rows};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Reason recorded for a structure file that could not be read.
pub const PARSE_FAILED: &str = "parse_failed";

/// Files the workflow reads.
#[derive(Debug, Clone, Default)]
pub struct MetadataInputs {
    /// Directory searched recursively for structure files.
    pub input_dir: PathBuf,
    /// Per-structure parameter CSVs keyed by `path`, combined in order.
    pub param_csvs: Vec<PathBuf>,
    /// Optional per-residue paratope prediction CSV.
    pub predictions: Option<PathBuf>,
}

/// Everything a metadata run produces.
#[derive(Debug, Clone)]
pub struct MetadataTables {
    /// The four append-only tables, one row per plugin emission.
    pub tables: TableSet,
    /// One row per structure with chain, role and interface features pivoted in.
    pub wide: Table,
    /// Structure files that could not be read.
    pub bad_files: Vec<Row>,
}

impl MetadataTables {
    /// Writes every table into `out_dir` as CSV, creating the directory if needed.
    ///
    /// Files: `{kind}_metadata.csv` for each table, `all_metadata.csv` for the
    /// wide table and `bad_files.csv`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Export`] if the directory or any file cannot be written.
    #[instrument(skip_all, fields(out_dir = %out_dir.display()))]
    pub fn write_all(&self, out_dir: &Path) -> Result<Vec<PathBuf>, EngineError> {
        fs::create_dir_all(out_dir).map_err(|source| ExportError::Io {
            path: out_dir.display().to_string(),
            source,
        })?;

        let mut written = Vec::new();
        for table in self.tables.iter() {
            let path = out_dir.join(format!("{}_metadata.csv", table.kind()));
            write_table(table, &path)?;
            written.push(path);
        }

        let wide_path = out_dir.join("all_metadata.csv");
        write_table(&self.wide, &wide_path)?;
        written.push(wide_path);

        let bad_path = out_dir.join("bad_files.csv");
        write_rows(&self.bad_files, &bad_path)?;
        written.push(bad_path);

        info!(files = written.len(), "Metadata tables written.");
        Ok(written)
    }
}

/// Result of processing one structure file.
enum StructureOutcome {
    Processed(TableSet),
    Bad(Row),
}

/// Shared, read-only inputs of every per-structure step.
struct RunInputs<'a> {
    config: &'a MetadataConfig,
    plugins: &'a [&'static dyn Plugin],
    params: &'a ParamMap,
    predictions: Option<&'a PredictionTable>,
}

/// Resolves symlinks where possible so that parameter rows keyed by the real
/// path still match.
fn absolute_path_string(path: &Path) -> String {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

fn process_structure(
    file: &Path,
    inputs: &RunInputs<'_>,
    reporter: &ProgressReporter,
) -> Result<StructureOutcome, EngineError> {
    let path = absolute_path_string(file);
    let params = inputs.params.get(&path);

    let atoms = match read_structure(file) {
        Ok(atoms) => atoms,
        Err(e) => {
            warn!(path = %path, error = %e, "Failed to parse structure; recording as bad file.");
            let mut row = Row::new()
                .with("path", path.as_str())
                .with("error", PARSE_FAILED)
                .with("detail", e.to_string());
            attach_params(&mut row, params, &inputs.config.params);
            reporter.report(Progress::StructureDone { path, ok: false });
            return Ok(StructureOutcome::Bad(row));
        }
    };

    debug!(path = %path, atoms = atoms.len(), "Parsed structure.");
    let ctx = ExecutionContext::new(
        path.clone(),
        atoms,
        inputs.config,
        params,
        inputs.predictions,
    );
    let tables = collect_rows(&ctx, inputs.plugins)?;
    reporter.report(Progress::StructureDone { path, ok: true });
    Ok(StructureOutcome::Processed(tables))
}

/// Builds the metadata tables for every structure under `inputs.input_dir`.
///
/// Plugin names are validated and side-tables loaded before any structure is
/// read. Structures are processed in sorted path order; with the `parallel`
/// feature they run concurrently and are merged back in that same order.
/// Files that fail to parse are recorded in [`MetadataTables::bad_files`].
///
/// # Errors
///
/// Returns an error for an unknown plugin, an unreadable side-table, an
/// unreadable input directory, or any plugin failure. Nothing is returned
/// for a partially processed run.
#[instrument(skip_all, name = "metadata_workflow", fields(input_dir = %inputs.input_dir.display()))]
pub fn run(
    inputs: &MetadataInputs,
    config: &MetadataConfig,
    reporter: &ProgressReporter,
) -> Result<MetadataTables, EngineError> {
    reporter.report(Progress::LoadingInputs);
    let plugins = resolve_plugins(&config.plugins)?;
    info!(plugins = ?config.plugins, "Resolved plugins.");

    let params = load_param_map(&inputs.param_csvs, config.params.mode)?;
    let predictions = inputs
        .predictions
        .as_deref()
        .map(load_predictions)
        .transpose()?;

    let files = list_structures(&inputs.input_dir).map_err(|source| EngineError::Discovery {
        path: inputs.input_dir.display().to_string(),
        source,
    })?;
    info!(count = files.len(), "Discovered structure files.");
    reporter.report(Progress::StructuresFound {
        count: files.len() as u64,
    });

    let run_inputs = RunInputs {
        config,
        plugins: &plugins,
        params: &params,
        predictions: predictions.as_ref(),
    };

    #[cfg(not(feature = "parallel"))]
    let iterator = files.iter();

    #[cfg(feature = "parallel")]
    let iterator = files.par_iter();

    let outcomes = iterator
        .map(|file| process_structure(file, &run_inputs, reporter))
        .collect::<Result<Vec<_>, EngineError>>()?;

    let mut tables = TableSet::new();
    let mut bad_files = Vec::new();
    for outcome in outcomes {
        match outcome {
            StructureOutcome::Processed(per_structure) => tables.append(per_structure),
            StructureOutcome::Bad(row) => bad_files.push(row),
        }
    }

    reporter.report(Progress::JoiningWideTable);
    let wide = build_wide_table(&tables);
    info!(
        structures = tables.structures.len(),
        chains = tables.chains.len(),
        roles = tables.roles.len(),
        interfaces = tables.interfaces.len(),
        bad_files = bad_files.len(),
        "Metadata extraction complete."
    );
    reporter.report(Progress::Finished {
        structures: wide.len() as u64,
        bad_files: bad_files.len() as u64,
    });

    Ok(MetadataTables {
        tables,
        wide,
        bad_files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tables::table::TableKind;
    use crate::core::tables::value::Value;
    use crate::engine::config::{ConfigError, MetadataConfigBuilder};
    use std::sync::Mutex;

    fn atom_line(serial: usize, name: &str, chain: char, res: i32, x: f64) -> String {
        format!(
            "ATOM  {serial:>5} {name:<4} ALA {chain}{res:>4}    {x:>8.3}{:>8.3}{:>8.3}  1.00  0.00           C",
            0.0, 0.0
        )
    }

    fn write_complex(path: &Path) {
        let lines = [
            atom_line(1, "N", 'A', 1, 0.0),
            atom_line(2, "CA", 'A', 1, 1.46),
            atom_line(3, "N", 'B', 1, 4.0),
            atom_line(4, "CA", 'B', 1, 5.46),
        ];
        fs::write(path, lines.join("\n") + "\nEND\n").unwrap();
    }

    #[test]
    fn bad_files_are_recorded_and_good_files_processed() {
        let dir = tempfile::tempdir().unwrap();
        write_complex(&dir.path().join("good.pdb"));
        fs::write(dir.path().join("broken.pdb"), "ATOM  garbage\n").unwrap();

        let inputs = MetadataInputs {
            input_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let config = MetadataConfig::default();
        let result = run(&inputs, &config, &ProgressReporter::new()).unwrap();

        assert_eq!(result.tables.get(TableKind::Structures).len(), 1);
        assert_eq!(result.wide.len(), 1);
        assert_eq!(result.bad_files.len(), 1);
        let bad = &result.bad_files[0];
        assert_eq!(bad.get("error"), Some(&Value::from(PARSE_FAILED)));
        assert!(bad.get("path").and_then(Value::as_str).unwrap().ends_with("broken.pdb"));
    }

    #[test]
    fn unknown_plugin_fails_before_processing() {
        let dir = tempfile::tempdir().unwrap();
        write_complex(&dir.path().join("good.pdb"));
        let config = MetadataConfigBuilder::new()
            .plugins(vec!["identity".into(), "nope".into()])
            .build()
            .unwrap();
        let inputs = MetadataInputs {
            input_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        let err = run(&inputs, &config, &ProgressReporter::new()).unwrap_err();

        assert!(matches!(
            err,
            EngineError::Config {
                source: ConfigError::UnknownPlugin { .. }
            }
        ));
    }

    #[test]
    fn progress_follows_the_run_milestones() {
        let dir = tempfile::tempdir().unwrap();
        write_complex(&dir.path().join("a.pdb"));
        write_complex(&dir.path().join("b.pdb"));
        fs::write(dir.path().join("c.pdb"), "ATOM  garbage\n").unwrap();
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        let inputs = MetadataInputs {
            input_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        run(&inputs, &MetadataConfig::default(), &reporter).unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        assert_eq!(events.len(), 7);
        assert_eq!(events[0], Progress::LoadingInputs);
        assert_eq!(events[1], Progress::StructuresFound { count: 3 });
        let mut outcomes: Vec<bool> = events[2..5]
            .iter()
            .map(|e| match e {
                Progress::StructureDone { ok, .. } => *ok,
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        outcomes.sort();
        assert_eq!(outcomes, vec![false, true, true]);
        assert_eq!(events[5], Progress::JoiningWideTable);
        assert_eq!(
            events[6],
            Progress::Finished {
                structures: 2,
                bad_files: 1
            }
        );
    }

    #[test]
    fn write_all_creates_every_output_file() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_complex(&input.path().join("good.pdb"));
        let inputs = MetadataInputs {
            input_dir: input.path().to_path_buf(),
            ..Default::default()
        };
        let result = run(&inputs, &MetadataConfig::default(), &ProgressReporter::new()).unwrap();

        let out_dir = output.path().join("nested");
        let written = result.write_all(&out_dir).unwrap();

        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "structures_metadata.csv",
                "chains_metadata.csv",
                "roles_metadata.csv",
                "interfaces_metadata.csv",
                "all_metadata.csv",
                "bad_files.csv",
            ]
        );
        assert!(written.iter().all(|p| p.is_file()));
        let wide = fs::read_to_string(out_dir.join("all_metadata.csv")).unwrap();
        assert!(wide.starts_with("path,assembly_id,id__n_atoms_total"));
    }
}
