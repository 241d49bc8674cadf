use crate::core::tables::row::Row;
use crate::core::tables::table::{Table, column_union};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Writes rows as CSV with the union of their columns as header.
///
/// Columns appear in first-appearance order; cells a row does not have, and
/// null cells, are written empty. With no rows the file is created empty.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_rows(rows: &[Row], path: &Path) -> Result<(), ExportError> {
    let csv_err = |source: csv::Error| ExportError::Csv {
        path: path.to_string_lossy().to_string(),
        source,
    };

    let columns = column_union(rows);
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    if !columns.is_empty() {
        writer.write_record(&columns).map_err(csv_err)?;
    }
    for row in rows {
        let record: Vec<String> = columns
            .iter()
            .map(|c| row.get(c).map(ToString::to_string).unwrap_or_default())
            .collect();
        writer.write_record(&record).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_string_lossy().to_string(),
        source,
    })
}

/// Writes a table as CSV. See [`write_rows`].
pub fn write_table(table: &Table, path: &Path) -> Result<(), ExportError> {
    write_rows(table.rows(), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tables::table::TableKind;
    use crate::core::tables::value::Value;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn writes_union_header_and_empty_cells_for_nulls() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chains_metadata.csv");
        let mut table = Table::new(TableKind::Chains);
        table.push(Row::new().with("path", "/a.cif").with("chain_id", "H").with("n", 3i64));
        table.push(
            Row::new()
                .with("path", "/a.cif")
                .with("chain_id", "L")
                .with("min_dist", f64::INFINITY)
                .with("n", Value::Null),
        );

        write_table(&table, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "path,chain_id,n,min_dist\n/a.cif,H,3,\n/a.cif,L,,inf\n"
        );
    }

    #[test]
    fn empty_table_writes_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("interfaces_metadata.csv");
        write_rows(&[], &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn text_with_delimiters_is_quoted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roles_metadata.csv");
        write_rows(&[Row::new().with("labels", "H:27;H:28, L:1")], &path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "labels\n\"H:27;H:28, L:1\"\n"
        );
    }
}
