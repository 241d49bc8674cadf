use crate::core::models::atom::Atom;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Defines the interface for reading macromolecular structure formats.
///
/// Readers return the flat atom list of the first model in file order.
/// Implementors handle format-specific parsing; unresolved coordinates are
/// returned as NaN rather than rejected.
pub trait StructureFile {
    /// The error type for read operations.
    type Error: Error + From<io::Error>;

    /// Reads the atoms of a structure from a buffered reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The buffered reader to read from.
    ///
    /// # Return
    ///
    /// Returns the parsed atoms in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<Vec<Atom>, Self::Error>;

    /// Reads the atoms of a structure from a file path.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the file to read.
    ///
    /// # Return
    ///
    /// Returns the parsed atoms in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Atom>, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}
