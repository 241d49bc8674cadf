use crate::core::utils::identifiers::is_structure_extension;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Recursively lists the structure files under `root`, sorted by path.
///
/// Files are recognized by extension (`.cif`, `.mmcif`, `.pdb`, `.ent`,
/// case-insensitive). Sorting makes the processing order, and therefore every
/// output table, reproducible.
///
/// # Errors
///
/// Returns an error if `root` or any directory below it cannot be read.
pub fn list_structures(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(is_structure_extension)
            {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}
