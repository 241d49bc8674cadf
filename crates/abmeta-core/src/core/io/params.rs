use super::side_table::{RawTable, SideTableError};
use crate::core::tables::value::Value;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

/// Per-structure parameters: column name to value, excluding `path`.
pub type ParamRow = IndexMap<String, Value>;

/// Parameter rows keyed by absolute structure path.
pub type ParamMap = IndexMap<String, ParamRow>;

const PATH_COLUMN: &str = "path";
const DUPLICATE_SUFFIX: &str = "_dup";

/// How several parameter CSV files are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamMergeMode {
    /// Outer join on `path`; overlapping columns from later files get a `_dup` suffix.
    #[default]
    Merge,
    /// Row union; when a path repeats, the last row wins.
    Append,
}

/// Loads and combines parameter side-tables keyed by `path`.
///
/// Every returned row carries the full column set of the combined table, with
/// `Null` where a file had no value for that path. Cells are type-inferred.
///
/// # Arguments
///
/// * `paths` - The CSV files to combine, in order. An empty list yields an empty map.
/// * `mode` - The combination policy.
///
/// # Errors
///
/// Returns [`SideTableError::MissingColumns`] if any file lacks a `path`
/// column, or [`SideTableError::Csv`] if a file cannot be read.
pub fn load_param_map(paths: &[PathBuf], mode: ParamMergeMode) -> Result<ParamMap, SideTableError> {
    let mut columns: Vec<String> = Vec::new();
    let mut cells: IndexMap<String, IndexMap<String, Value>> = IndexMap::new();

    for (file_idx, path) in paths.iter().enumerate() {
        let table = RawTable::read(path)?;
        table.require(path, &[PATH_COLUMN])?;
        let path_col = table.column(PATH_COLUMN).unwrap_or_default();

        let mut renamed: Vec<Option<String>> = Vec::with_capacity(table.headers.len());
        for (i, header) in table.headers.iter().enumerate() {
            if i == path_col {
                renamed.push(None);
                continue;
            }
            let name = match mode {
                ParamMergeMode::Merge if file_idx > 0 => unique_name(&columns, header),
                _ => header.clone(),
            };
            if !columns.contains(&name) {
                columns.push(name.clone());
            }
            renamed.push(Some(name));
        }

        for record in &table.records {
            let key = record[path_col].clone();
            let values = renamed
                .iter()
                .zip(record)
                .filter_map(|(name, raw)| name.as_ref().map(|n| (n.clone(), Value::infer(raw))));

            match mode {
                ParamMergeMode::Append => {
                    cells.shift_remove(&key);
                    cells.insert(key, values.collect());
                }
                ParamMergeMode::Merge => {
                    cells.entry(key).or_default().extend(values);
                }
            }
        }
        debug!(file = %path.display(), rows = table.records.len(), "Loaded parameter table.");
    }

    Ok(cells
        .into_iter()
        .map(|(key, row)| {
            let full = columns
                .iter()
                .map(|c| (c.clone(), row.get(c).cloned().unwrap_or_default()))
                .collect();
            (key, full)
        })
        .collect())
}

fn unique_name(existing: &[String], header: &str) -> String {
    let mut name = header.to_string();
    while existing.contains(&name) {
        name.push_str(DUPLICATE_SUFFIX);
    }
    name
}
