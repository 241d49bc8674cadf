use super::side_table::{RawTable, SideTableError};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

const REQUIRED_COLUMNS: [&str; 7] = ["pdb", "chain_id", "IMGT", "pred", "x", "y", "z"];

/// How prediction rows are matched to a structure file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdMode {
    /// Match the `pdb` column against the structure file stem.
    #[default]
    Stem,
    /// Match the optional `path` column against the absolute structure path.
    Path,
}

/// One per-residue paratope prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    pub pdb: String,
    pub path: Option<String>,
    pub chain_id: String,
    pub imgt: String,
    /// Predicted paratope probability; `None` when the cell was not numeric.
    pub score: Option<f64>,
    /// Residue coordinates; each `None` when the cell was not numeric.
    pub position: [Option<f64>; 3],
}

impl PredictionRecord {
    /// Returns the residue label `{chain_id}:{IMGT}`.
    pub fn label(&self) -> String {
        format!("{}:{}", self.chain_id, self.imgt)
    }
}

/// Per-residue paratope predictions covering any number of structures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionTable {
    records: Vec<PredictionRecord>,
    has_path_column: bool,
}

fn numeric(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

impl PredictionTable {
    pub fn new(records: Vec<PredictionRecord>, has_path_column: bool) -> Self {
        Self {
            records,
            has_path_column,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    /// Selects the records belonging to one structure.
    ///
    /// In [`IdMode::Stem`] the `pdb` column must equal the file stem of
    /// `structure_path`; in [`IdMode::Path`] the `path` column must equal the
    /// path itself, and a table without a `path` column matches nothing.
    pub fn for_structure(&self, structure_path: &str, mode: IdMode) -> Vec<&PredictionRecord> {
        match mode {
            IdMode::Stem => {
                let stem = Path::new(structure_path)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.records.iter().filter(|r| r.pdb == stem).collect()
            }
            IdMode::Path if self.has_path_column => self
                .records
                .iter()
                .filter(|r| r.path.as_deref() == Some(structure_path))
                .collect(),
            IdMode::Path => Vec::new(),
        }
    }
}

/// Loads a paratope prediction CSV.
///
/// Score and coordinate cells that are not numeric become `None`; text
/// columns are kept verbatim.
///
/// # Errors
///
/// Returns [`SideTableError::MissingColumns`] if any of `pdb`, `chain_id`,
/// `IMGT`, `pred`, `x`, `y`, `z` is absent, or [`SideTableError::Csv`] if the
/// file cannot be read.
pub fn load_predictions(path: &Path) -> Result<PredictionTable, SideTableError> {
    let table = RawTable::read(path)?;
    table.require(path, &REQUIRED_COLUMNS)?;

    let col = |name: &str| table.column(name).unwrap_or_default();
    let (pdb, chain, imgt, pred) = (col("pdb"), col("chain_id"), col("IMGT"), col("pred"));
    let (x, y, z) = (col("x"), col("y"), col("z"));
    let path_col = table.column("path");

    let records: Vec<PredictionRecord> = table
        .records
        .iter()
        .map(|r| PredictionRecord {
            pdb: r[pdb].trim().to_string(),
            path: path_col.map(|c| r[c].trim().to_string()),
            chain_id: r[chain].trim().to_string(),
            imgt: r[imgt].trim().to_string(),
            score: numeric(&r[pred]),
            position: [numeric(&r[x]), numeric(&r[y]), numeric(&r[z])],
        })
        .collect();

    debug!(file = %path.display(), rows = records.len(), "Loaded paratope predictions.");
    Ok(PredictionTable::new(records, path_col.is_some()))
}
