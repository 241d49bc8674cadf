use super::mmcif::MmcifFile;
use super::pdb::PdbFile;
use super::traits::StructureFile;
use crate::core::models::atom_set::AtomSet;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StructureError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
    #[error("Unsupported structure format: '{0}'")]
    UnsupportedFormat(String),
    #[error("Structure contains no atoms")]
    NoAtoms,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseErrorKind {
    #[error("Invalid integer in {field} (value: '{value}')")]
    InvalidInt { field: String, value: String },
    #[error("Invalid float in {field} (value: '{value}')")]
    InvalidFloat { field: String, value: String },
    #[error("Line is too short for an ATOM/HETATM record (must be at least 54 chars)")]
    LineTooShort,
    #[error("Required column '{0}' is missing from the atom_site loop")]
    MissingColumn(String),
    #[error("Loop has {values} values, not a multiple of its {columns} columns")]
    RaggedLoop { columns: usize, values: usize },
    #[error("Unterminated quoted value")]
    UnterminatedQuote,
    #[error("Unterminated multi-line text field")]
    UnterminatedTextField,
}

/// Reads a structure file, choosing the reader from the file extension.
///
/// `.pdb` and `.ent` files use the fixed-column PDB reader; `.cif` and
/// `.mmcif` files use the mmCIF `_atom_site` reader. Only the first model is
/// returned.
///
/// # Errors
///
/// Returns [`StructureError::UnsupportedFormat`] for any other extension,
/// [`StructureError::NoAtoms`] when the file parses but holds no atoms, and
/// the reader's error otherwise.
pub fn read_structure(path: &Path) -> Result<AtomSet, StructureError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let atoms = match extension.as_str() {
        "pdb" | "ent" => PdbFile::read_from_path(path)?,
        "cif" | "mmcif" => MmcifFile::read_from_path(path)?,
        _ => return Err(StructureError::UnsupportedFormat(path.display().to_string())),
    };

    if atoms.is_empty() {
        return Err(StructureError::NoAtoms);
    }
    Ok(AtomSet::new(atoms))
}
