use super::{Plugin, RowStream};
use crate::core::tables::row::Row;
use crate::core::tables::table::TableKind;
use crate::core::tables::value::Value;
use crate::engine::config::{ConfigError, IpsaeConfig};
use crate::engine::context::ExecutionContext;
use crate::engine::error::EngineError;
use phf::{Set, phf_set};
use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use std::{fs, iter, thread};
use tracing::{debug, warn};

const TOOL: &str = "ipsae";
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Columns of the score file that identify a row rather than score it.
static ID_COLUMNS: Set<&'static str> = phf_set! {
    "Chn1", "Chn2", "PAE", "Dist", "Type", "Model",
};

/// Chain-pair interface scores from the external ipSAE script.
///
/// Runs only when a PAE file sits next to the structure. The script writes
/// its score table beside the structure; a missing table yields no rows.
pub struct IpsaePlugin;

/// Returns the first PAE file found next to `structure`.
fn find_pae_file(structure: &Path) -> Option<PathBuf> {
    let folder = structure.parent()?;
    let stem = structure.file_stem()?.to_string_lossy();
    [
        format!("pae_{stem}.npz"),
        format!("{stem}_pae.npz"),
        "pae.npz".to_string(),
        "confidences.json".to_string(),
    ]
    .into_iter()
    .map(|name| folder.join(name))
    .find(|candidate| candidate.is_file())
}

/// Path of the score table the script writes, e.g. `model_15_15.txt` for `model.cif`.
fn score_file_path(structure: &Path, pae_cutoff: f64, dist_cutoff: f64) -> PathBuf {
    let mut name: OsString = structure.with_extension("").into_os_string();
    name.push(format!(
        "_{:02}_{:02}.txt",
        pae_cutoff as i64, dist_cutoff as i64
    ));
    PathBuf::from(name)
}

fn tool_error(message: impl Into<String>) -> EngineError {
    EngineError::ExternalTool {
        tool: TOOL.to_string(),
        message: message.into(),
    }
}

/// Waits for `child` to exit, killing it once `timeout` has elapsed.
fn wait_with_timeout(mut child: Child, timeout: Duration) -> Result<(), EngineError> {
    let stderr_reader = child.stderr.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = String::new();
            let _ = pipe.read_to_string(&mut buf);
            buf
        })
    });
    let collect_stderr = |reader: Option<thread::JoinHandle<String>>| {
        reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default()
    };

    let deadline = Instant::now() + timeout;
    loop {
        let polled = child
            .try_wait()
            .map_err(|e| tool_error(format!("failed to poll process: {e}")))?;
        match polled {
            Some(status) if status.success() => {
                collect_stderr(stderr_reader);
                return Ok(());
            }
            Some(status) => {
                let stderr = collect_stderr(stderr_reader);
                return Err(tool_error(format!("exited with {status}: {}", stderr.trim())));
            }
            None if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(tool_error(format!(
                    "timed out after {:.1}s",
                    timeout.as_secs_f64()
                )));
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    }
}

fn run_script(settings: &IpsaeConfig, pae: &Path, structure: &Path) -> Result<(), EngineError> {
    let script = settings
        .script
        .as_ref()
        .ok_or(ConfigError::MissingParameter("ipsae_script"))?;

    debug!(script = %script.display(), pae = %pae.display(), structure = %structure.display(), "Running ipSAE.");
    let child = Command::new(&settings.interpreter)
        .arg(script)
        .arg(pae)
        .arg(structure)
        .arg(settings.pae_cutoff.to_string())
        .arg(settings.dist_cutoff.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            tool_error(format!(
                "failed to launch '{}': {e}",
                settings.interpreter.display()
            ))
        })?;

    wait_with_timeout(child, settings.timeout)
}

/// One parsed line of the score table.
type ScoreLine = Vec<(String, Value)>;

/// Parses a whitespace-separated table with a header line.
///
/// Blank lines are skipped; lines whose width differs from the header are
/// dropped with a warning.
fn parse_score_table(text: &str) -> (Vec<String>, Vec<ScoreLine>) {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    let Some(header_line) = lines.next() else {
        return (Vec::new(), Vec::new());
    };
    let header: Vec<String> = header_line.split_whitespace().map(String::from).collect();

    let rows = lines
        .filter_map(|line| {
            let cells: Vec<&str> = line.split_whitespace().collect();
            if cells.len() != header.len() {
                warn!(expected = header.len(), found = cells.len(), "Skipping malformed ipSAE line.");
                return None;
            }
            Some(
                header
                    .iter()
                    .cloned()
                    .zip(cells.into_iter().map(Value::infer))
                    .collect(),
            )
        })
        .collect();
    (header, rows)
}

fn cell<'a>(line: &'a ScoreLine, column: &str) -> Option<&'a Value> {
    line.iter().find(|(name, _)| name == column).map(|(_, v)| v)
}

/// Minimum numeric value of `column` over `lines`.
///
/// `None` when any cell holds text, so the column is left out entirely.
fn column_min(lines: &[&ScoreLine], column: &str) -> Option<Value> {
    let mut min: Option<f64> = None;
    for line in lines {
        match cell(line, column) {
            Some(Value::Str(_)) => return None,
            Some(v) => {
                if let Some(x) = v.as_f64() {
                    min = Some(min.map_or(x, |m| m.min(x)));
                }
            }
            None => {}
        }
    }
    Some(Value::from(min))
}

/// Turns the score table into one row of columns per chain pair.
///
/// Each `max` line starts a pair `{Chn1}-{Chn2}`; its scores become `{col}_max`
/// and the minima over the pair's other lines become `{col}_min`.
fn pair_columns(text: &str, emit_max: bool, emit_min: bool) -> Vec<Row> {
    let (header, lines) = parse_score_table(text);
    let score_columns: Vec<&String> = header
        .iter()
        .filter(|name| !ID_COLUMNS.contains(name.as_str()))
        .collect();

    let is_max = |line: &ScoreLine| cell(line, "Type").and_then(Value::as_str) == Some("max");

    lines
        .iter()
        .filter(|line| is_max(line))
        .map(|max_line| {
            let chn1 = cell(max_line, "Chn1").cloned().unwrap_or(Value::Null);
            let chn2 = cell(max_line, "Chn2").cloned().unwrap_or(Value::Null);
            let mut row = Row::new().with("pair", format!("{chn1}-{chn2}"));

            if emit_max {
                for &column in &score_columns {
                    let value = cell(max_line, column).cloned().unwrap_or(Value::Null);
                    row.insert(format!("{column}_max"), value);
                }
            }

            if emit_min {
                let others: Vec<&ScoreLine> = lines
                    .iter()
                    .filter(|line| {
                        !is_max(line)
                            && cell(line, "Chn1") == Some(&chn1)
                            && cell(line, "Chn2") == Some(&chn2)
                    })
                    .collect();
                if !others.is_empty() {
                    for &column in &score_columns {
                        if let Some(min) = column_min(&others, column) {
                            row.insert(format!("{column}_min"), min);
                        }
                    }
                }
            }
            row
        })
        .collect()
}

impl IpsaePlugin {
    fn collect(&self, ctx: &ExecutionContext<'_>) -> Result<Vec<Row>, EngineError> {
        let settings = &ctx.config.ipsae;
        let structure = Path::new(&ctx.path);
        let Some(pae) = find_pae_file(structure) else {
            debug!(path = %ctx.path, "No PAE file found; skipping ipSAE.");
            return Ok(Vec::new());
        };

        run_script(settings, &pae, structure)?;

        let score_file = score_file_path(structure, settings.pae_cutoff, settings.dist_cutoff);
        let text = match fs::read_to_string(&score_file) {
            Ok(text) => text,
            Err(e) => {
                debug!(file = %score_file.display(), error = %e, "ipSAE produced no score table.");
                return Ok(Vec::new());
            }
        };

        Ok(pair_columns(&text, settings.emit_max, settings.emit_min)
            .into_iter()
            .map(|columns| {
                let mut row = ctx.row();
                row.extend(columns.into_columns());
                row
            })
            .collect())
    }
}

impl Plugin for IpsaePlugin {
    fn name(&self) -> &'static str {
        TOOL
    }

    fn prefix(&self) -> &'static str {
        "ipsae"
    }

    fn table(&self) -> TableKind {
        TableKind::Interfaces
    }

    fn run<'a>(&'a self, ctx: &'a ExecutionContext<'a>) -> RowStream<'a> {
        match self.collect(ctx) {
            Ok(rows) => Box::new(rows.into_iter().map(Ok)),
            Err(e) => Box::new(iter::once(Err(e))),
        }
    }
}
