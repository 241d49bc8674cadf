use super::structure::{ParseErrorKind, StructureError};
use super::traits::StructureFile;
use crate::core::models::atom::{Atom, AtomKind};
use nalgebra::Point3;
use std::io::BufRead;

const MIN_COORD_LINE_LEN: usize = 54;

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn parse_coord(line: &str, line_num: usize, start: usize, axis: &str) -> Result<f64, StructureError> {
    let raw = slice_and_trim(line, start, start + 8);
    raw.parse().map_err(|_| StructureError::Parse {
        line: line_num,
        kind: ParseErrorKind::InvalidFloat {
            field: format!("{} (columns {}-{})", axis, start + 1, start + 8),
            value: raw.to_string(),
        },
    })
}

/// Fixed-column PDB reader (`.pdb`, `.ent`).
///
/// Reads `ATOM` (polymer) and `HETATM` (non-polymer) records of the first
/// model. Alternate locations other than blank or `A` are dropped.
pub struct PdbFile;

impl StructureFile for PdbFile {
    type Error = StructureError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<Atom>, Self::Error> {
        let mut atoms = Vec::new();
        let mut seen_model = false;

        for (idx, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = idx + 1;
            let record = slice_and_trim(&line, 0, 6);

            match record {
                "MODEL" => {
                    if seen_model {
                        break;
                    }
                    seen_model = true;
                }
                "ENDMDL" | "END" => {
                    if !atoms.is_empty() {
                        break;
                    }
                }
                "ATOM" | "HETATM" => {
                    if line.len() < MIN_COORD_LINE_LEN {
                        return Err(StructureError::Parse {
                            line: line_num,
                            kind: ParseErrorKind::LineTooShort,
                        });
                    }

                    let alt_loc = slice_and_trim(&line, 16, 17);
                    if !(alt_loc.is_empty() || alt_loc == "A") {
                        continue;
                    }

                    let res_seq_str = slice_and_trim(&line, 22, 26);
                    let residue_number: isize = if res_seq_str.is_empty() {
                        0
                    } else {
                        res_seq_str.parse().map_err(|_| StructureError::Parse {
                            line: line_num,
                            kind: ParseErrorKind::InvalidInt {
                                field: "resSeq (columns 23-26)".to_string(),
                                value: res_seq_str.to_string(),
                            },
                        })?
                    };

                    let x = parse_coord(&line, line_num, 30, "x")?;
                    let y = parse_coord(&line, line_num, 38, "y")?;
                    let z = parse_coord(&line, line_num, 46, "z")?;

                    let kind = if record == "ATOM" {
                        AtomKind::Polymer
                    } else {
                        AtomKind::NonPolymer
                    };

                    let mut atom = Atom::new(
                        slice_and_trim(&line, 12, 16),
                        slice_and_trim(&line, 21, 22),
                        Point3::new(x, y, z),
                    )
                    .with_residue(slice_and_trim(&line, 17, 20), residue_number)
                    .with_kind(kind);
                    atom.insertion_code = slice_and_trim(&line, 26, 27).chars().next();
                    atom.element = slice_and_trim(&line, 76, 78).to_string();
                    atoms.push(atom);
                }
                _ => {}
            }
        }

        Ok(atoms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn atom_line(record: &str, serial: usize, name: &str, alt: char, chain: &str, res: isize, xyz: [f64; 3]) -> String {
        format!(
            "{:<6}{:>5} {:<4}{}{:>3} {}{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00  0.00          {:>2}",
            record, serial, name, alt, "GLY", chain, res, xyz[0], xyz[1], xyz[2], &name[..1]
        )
    }

    fn read(text: &str) -> Result<Vec<Atom>, StructureError> {
        PdbFile::read_from(&mut Cursor::new(text.as_bytes()))
    }

    #[test]
    fn reads_atom_and_hetatm_records() {
        let text = [
            atom_line("ATOM", 1, "N", ' ', "H", 1, [1.0, 2.0, 3.0]),
            atom_line("ATOM", 2, "CA", ' ', "H", 1, [2.5, 2.0, 3.0]),
            atom_line("HETATM", 3, "C1", ' ', "H", 501, [9.0, 9.0, 9.0]),
        ]
        .join("\n");

        let atoms = read(&text).unwrap();

        assert_eq!(atoms.len(), 3);
        assert_eq!(atoms[1].name, "CA");
        assert_eq!(atoms[1].residue_name, "GLY");
        assert_eq!(atoms[1].residue_number, 1);
        assert_eq!(atoms[1].position, Point3::new(2.5, 2.0, 3.0));
        assert!(atoms[1].is_polymer());
        assert_eq!(atoms[2].kind, AtomKind::NonPolymer);
        assert_eq!(atoms[2].residue_number, 501);
    }

    #[test]
    fn reads_only_the_first_model() {
        let text = [
            "MODEL        1".to_string(),
            atom_line("ATOM", 1, "N", ' ', "A", 1, [0.0, 0.0, 0.0]),
            "ENDMDL".to_string(),
            "MODEL        2".to_string(),
            atom_line("ATOM", 1, "N", ' ', "A", 1, [5.0, 0.0, 0.0]),
            "ENDMDL".to_string(),
        ]
        .join("\n");

        let atoms = read(&text).unwrap();
        assert_eq!(atoms.len(), 1);
        assert_eq!(atoms[0].position.x, 0.0);
    }

    #[test]
    fn keeps_blank_and_first_alternate_location_only() {
        let text = [
            atom_line("ATOM", 1, "CA", 'A', "A", 1, [0.0, 0.0, 0.0]),
            atom_line("ATOM", 2, "CA", 'B', "A", 1, [0.3, 0.0, 0.0]),
            atom_line("ATOM", 3, "C", ' ', "A", 1, [1.5, 0.0, 0.0]),
        ]
        .join("\n");

        let atoms = read(&text).unwrap();
        assert_eq!(atoms.len(), 2);
        assert_eq!(atoms[1].name, "C");
    }

    #[test]
    fn short_line_is_a_parse_error() {
        let err = read("ATOM      1  N   GLY A   1      11.104").unwrap_err();
        assert!(matches!(
            err,
            StructureError::Parse {
                line: 1,
                kind: ParseErrorKind::LineTooShort
            }
        ));
    }

    #[test]
    fn invalid_coordinate_is_a_parse_error() {
        let mut line = atom_line("ATOM", 1, "N", ' ', "A", 1, [0.0, 0.0, 0.0]);
        line.replace_range(30..38, "   abcde");
        let err = read(&line).unwrap_err();
        assert!(matches!(
            err,
            StructureError::Parse {
                kind: ParseErrorKind::InvalidFloat { .. },
                ..
            }
        ));
    }
}
