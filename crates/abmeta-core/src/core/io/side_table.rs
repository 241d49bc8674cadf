use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SideTableError {
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("'{path}' is missing required column(s): {}", .columns.join(", "))]
    MissingColumns { path: String, columns: Vec<String> },
}

/// A CSV side-table held as raw text cells.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl RawTable {
    pub fn read(path: &Path) -> Result<Self, SideTableError> {
        let csv_err = |source: csv::Error| SideTableError::Csv {
            path: path.to_string_lossy().to_string(),
            source,
        };

        let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
        let headers = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result.map_err(csv_err)?;
            records.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, records })
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Fails with the sorted list of `required` columns absent from the header.
    pub fn require(&self, path: &Path, required: &[&str]) -> Result<(), SideTableError> {
        let mut missing: Vec<String> = required
            .iter()
            .filter(|name| self.column(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort();
        Err(SideTableError::MissingColumns {
            path: path.to_string_lossy().to_string(),
            columns: missing,
        })
    }
}
