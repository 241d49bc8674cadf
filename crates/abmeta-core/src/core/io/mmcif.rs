use super::structure::{ParseErrorKind, StructureError};
use super::traits::StructureFile;
use crate::core::models::atom::{Atom, AtomKind};
use nalgebra::Point3;
use std::collections::HashMap;
use std::io::BufRead;

const ATOM_SITE_PREFIX: &str = "_atom_site.";

#[derive(Debug, Clone, PartialEq)]
struct Token {
    text: String,
    line: usize,
    quoted: bool,
}

impl Token {
    fn is_reserved(&self) -> bool {
        if self.quoted {
            return false;
        }
        let lower = self.text.to_ascii_lowercase();
        self.text.starts_with('_')
            || lower == "loop_"
            || lower.starts_with("data_")
            || lower.starts_with("save_")
            || lower == "global_"
            || lower == "stop_"
    }

    /// `?` and `.` mark unknown or inapplicable values when not quoted.
    fn is_missing(&self) -> bool {
        !self.quoted && (self.text == "?" || self.text == ".")
    }
}

fn split_line(line: &str, line_num: usize, tokens: &mut Vec<Token>) -> Result<(), StructureError> {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if c == b'#' {
            break;
        }
        if c == b'\'' || c == b'"' {
            let start = i + 1;
            let mut j = start;
            loop {
                if j >= bytes.len() {
                    return Err(StructureError::Parse {
                        line: line_num,
                        kind: ParseErrorKind::UnterminatedQuote,
                    });
                }
                if bytes[j] == c && (j + 1 == bytes.len() || bytes[j + 1].is_ascii_whitespace()) {
                    break;
                }
                j += 1;
            }
            tokens.push(Token {
                text: line[start..j].to_string(),
                line: line_num,
                quoted: true,
            });
            i = j + 1;
        } else {
            let start = i;
            while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            tokens.push(Token {
                text: line[start..i].to_string(),
                line: line_num,
                quoted: false,
            });
        }
    }
    Ok(())
}

fn tokenize(reader: &mut impl BufRead) -> Result<Vec<Token>, StructureError> {
    let mut tokens = Vec::new();
    let mut text_field: Option<(usize, String)> = None;

    for (idx, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        let line_num = idx + 1;

        if let Some((start, mut buf)) = text_field.take() {
            if line.starts_with(';') {
                tokens.push(Token {
                    text: buf,
                    line: start,
                    quoted: true,
                });
            } else {
                if !buf.is_empty() {
                    buf.push('\n');
                }
                buf.push_str(&line);
                text_field = Some((start, buf));
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix(';') {
            text_field = Some((line_num, rest.to_string()));
            continue;
        }
        split_line(&line, line_num, &mut tokens)?;
    }

    if let Some((start, _)) = text_field {
        return Err(StructureError::Parse {
            line: start,
            kind: ParseErrorKind::UnterminatedTextField,
        });
    }
    Ok(tokens)
}

/// Column positions of the `_atom_site` fields the reader consumes.
struct AtomSiteColumns {
    group: Option<usize>,
    atom_name: usize,
    residue_name: Option<usize>,
    chain_id: usize,
    residue_number: Option<usize>,
    insertion_code: Option<usize>,
    element: Option<usize>,
    alt_id: Option<usize>,
    model: Option<usize>,
    x: usize,
    y: usize,
    z: usize,
}

impl AtomSiteColumns {
    fn resolve(headers: &[&str], line: usize) -> Result<Self, StructureError> {
        let index: HashMap<&str, usize> = headers.iter().enumerate().map(|(i, h)| (*h, i)).collect();
        let find = |names: &[&str]| names.iter().find_map(|n| index.get(n).copied());
        let require = |names: &[&str]| {
            find(names).ok_or_else(|| StructureError::Parse {
                line,
                kind: ParseErrorKind::MissingColumn(format!("{}{}", ATOM_SITE_PREFIX, names[0])),
            })
        };

        Ok(Self {
            group: find(&["group_PDB"]),
            atom_name: require(&["auth_atom_id", "label_atom_id"])?,
            residue_name: find(&["auth_comp_id", "label_comp_id"]),
            chain_id: require(&["auth_asym_id", "label_asym_id"])?,
            residue_number: find(&["auth_seq_id", "label_seq_id"]),
            insertion_code: find(&["pdbx_PDB_ins_code"]),
            element: find(&["type_symbol"]),
            alt_id: find(&["label_alt_id"]),
            model: find(&["pdbx_PDB_model_num"]),
            x: require(&["Cartn_x"])?,
            y: require(&["Cartn_y"])?,
            z: require(&["Cartn_z"])?,
        })
    }
}

fn coord(token: &Token, field: &str) -> Result<f64, StructureError> {
    if token.is_missing() {
        return Ok(f64::NAN);
    }
    token.text.parse().map_err(|_| StructureError::Parse {
        line: token.line,
        kind: ParseErrorKind::InvalidFloat {
            field: field.to_string(),
            value: token.text.clone(),
        },
    })
}

fn text_or_empty(row: &[Token], column: Option<usize>) -> &str {
    column
        .map(|c| &row[c])
        .filter(|t| !t.is_missing())
        .map_or("", |t| t.text.as_str())
}

/// mmCIF reader (`.cif`, `.mmcif`) for the `_atom_site` loop.
///
/// Author-assigned chain ids, residue numbers and atom names are preferred over
/// label ones. Only rows of the first model are read, and alternate locations
/// other than none or `A` are dropped. Unknown coordinates (`?` or `.`) are
/// read as NaN.
pub struct MmcifFile;

impl StructureFile for MmcifFile {
    type Error = StructureError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<Atom>, Self::Error> {
        let tokens = tokenize(reader)?;

        let loop_start = tokens
            .windows(2)
            .position(|w| {
                !w[0].quoted
                    && w[0].text.eq_ignore_ascii_case("loop_")
                    && !w[1].quoted
                    && w[1].text.starts_with(ATOM_SITE_PREFIX)
            })
            .ok_or_else(|| StructureError::MissingRecord("_atom_site loop".to_string()))?;

        let mut cursor = loop_start + 1;
        let mut headers = Vec::new();
        while let Some(tag) = tokens
            .get(cursor)
            .filter(|t| !t.quoted)
            .and_then(|t| t.text.strip_prefix(ATOM_SITE_PREFIX))
        {
            headers.push(tag);
            cursor += 1;
        }

        let header_line = tokens[loop_start].line;
        let columns = AtomSiteColumns::resolve(&headers, header_line)?;

        let values_end = tokens[cursor..]
            .iter()
            .position(Token::is_reserved)
            .map_or(tokens.len(), |offset| cursor + offset);
        let values = &tokens[cursor..values_end];
        if values.len() % headers.len() != 0 {
            return Err(StructureError::Parse {
                line: header_line,
                kind: ParseErrorKind::RaggedLoop {
                    columns: headers.len(),
                    values: values.len(),
                },
            });
        }

        let mut atoms = Vec::with_capacity(values.len() / headers.len());
        let mut first_model: Option<&str> = None;

        for row in values.chunks(headers.len()) {
            if let Some(model_col) = columns.model {
                let model = row[model_col].text.as_str();
                match first_model {
                    None => first_model = Some(model),
                    Some(first) if first != model => continue,
                    Some(_) => {}
                }
            }

            let alt = text_or_empty(row, columns.alt_id);
            if !(alt.is_empty() || alt == "A") {
                continue;
            }

            let residue_text = text_or_empty(row, columns.residue_number);
            let residue_number: isize = if residue_text.is_empty() {
                0
            } else {
                residue_text.parse().map_err(|_| StructureError::Parse {
                    line: row[0].line,
                    kind: ParseErrorKind::InvalidInt {
                        field: "residue number".to_string(),
                        value: residue_text.to_string(),
                    },
                })?
            };

            let position = Point3::new(
                coord(&row[columns.x], "Cartn_x")?,
                coord(&row[columns.y], "Cartn_y")?,
                coord(&row[columns.z], "Cartn_z")?,
            );

            let kind = text_or_empty(row, columns.group)
                .parse::<AtomKind>()
                .unwrap_or_default();

            let mut atom = Atom::new(
                text_or_empty(row, Some(columns.atom_name)),
                text_or_empty(row, Some(columns.chain_id)),
                position,
            )
            .with_residue(text_or_empty(row, columns.residue_name), residue_number)
            .with_kind(kind);
            atom.insertion_code = text_or_empty(row, columns.insertion_code).chars().next();
            atom.element = text_or_empty(row, columns.element).to_string();
            atoms.push(atom);
        }

        Ok(atoms)
    }
}
