use nalgebra::Point3;
use std::str::FromStr;

/// Distinguishes polymer atoms from everything else deposited in a structure.
///
/// Chain and role selections only ever look at polymer atoms; non-polymer atoms
/// (ligands, glycans, waters, ions) are kept in the full atom array so that
/// structure-level statistics still see them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum AtomKind {
    /// Atom belonging to a polymer entity (`ATOM` records).
    #[default]
    Polymer,
    /// Atom of a non-polymer entity (`HETATM` records).
    NonPolymer,
}

/// Represents a single atom read from a structure file.
///
/// Only the annotations needed by the metadata pipeline are stored: identity
/// (name, residue, chain), element, position and polymer membership. Positions
/// of unresolved atoms are stored as NaN rather than dropped so that atom
/// counts stay faithful to the deposited model.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The name of the atom (e.g., "CA", "N", "O").
    pub name: String,
    /// The three-letter residue name (e.g., "ALA").
    pub residue_name: String,
    /// The author residue sequence number.
    pub residue_number: isize,
    /// The residue insertion code, if any.
    pub insertion_code: Option<char>,
    /// The chain identifier this atom belongs to (e.g., "A", "H", "AA").
    pub chain_id: String,
    /// The element symbol, empty when the file did not provide one.
    pub element: String,
    /// The 3D coordinates of the atom in Angstroms. May contain NaN.
    pub position: Point3<f64>,
    /// Whether the atom belongs to a polymer entity.
    pub kind: AtomKind,
}

impl Atom {
    /// Creates a new polymer `Atom` with empty residue annotations.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the atom.
    /// * `chain_id` - The chain the atom belongs to.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(name: &str, chain_id: &str, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            residue_name: String::new(),
            residue_number: 0,
            insertion_code: None,
            chain_id: chain_id.to_string(),
            element: String::new(),
            position,
            kind: AtomKind::default(),
        }
    }

    /// Sets the residue name and number, returning the updated atom.
    pub fn with_residue(mut self, residue_name: &str, residue_number: isize) -> Self {
        self.residue_name = residue_name.to_string();
        self.residue_number = residue_number;
        self
    }

    /// Sets the polymer/non-polymer kind, returning the updated atom.
    pub fn with_kind(mut self, kind: AtomKind) -> Self {
        self.kind = kind;
        self
    }

    /// Returns `true` if the atom belongs to a polymer entity.
    pub fn is_polymer(&self) -> bool {
        self.kind == AtomKind::Polymer
    }

    /// Returns `true` if every coordinate component is a finite number.
    ///
    /// Atoms failing this check are unresolved and must be excluded from any
    /// distance computation.
    pub fn has_valid_position(&self) -> bool {
        self.position.iter().all(|c| c.is_finite())
    }
}

impl FromStr for AtomKind {
    type Err = ();

    /// Parses a record group name into an `AtomKind`.
    ///
    /// Accepts the PDB/mmCIF record names (`ATOM`, `HETATM`) as well as the
    /// descriptive spellings `polymer` and `non-polymer`, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `()` if the input does not name a known record group.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "atom" | "polymer" => Ok(AtomKind::Polymer),
            "hetatm" | "non-polymer" | "nonpolymer" | "non_polymer" => Ok(AtomKind::NonPolymer),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_has_expected_default_fields() {
        let atom = Atom::new("CA", "H", Point3::new(1.0, 2.0, 3.0));

        assert_eq!(atom.name, "CA");
        assert_eq!(atom.chain_id, "H");
        assert_eq!(atom.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.residue_name, "");
        assert_eq!(atom.residue_number, 0);
        assert_eq!(atom.insertion_code, None);
        assert_eq!(atom.kind, AtomKind::Polymer);
        assert!(atom.is_polymer());
    }

    #[test]
    fn builder_style_setters_update_fields() {
        let atom = Atom::new("C1", "A", Point3::origin())
            .with_residue("NAG", 401)
            .with_kind(AtomKind::NonPolymer);

        assert_eq!(atom.residue_name, "NAG");
        assert_eq!(atom.residue_number, 401);
        assert!(!atom.is_polymer());
    }

    #[test]
    fn has_valid_position_rejects_nan_and_infinite_components() {
        let ok = Atom::new("N", "A", Point3::new(0.0, -1.5, 2.0));
        let nan = Atom::new("N", "A", Point3::new(0.0, f64::NAN, 2.0));
        let inf = Atom::new("N", "A", Point3::new(f64::INFINITY, 0.0, 0.0));

        assert!(ok.has_valid_position());
        assert!(!nan.has_valid_position());
        assert!(!inf.has_valid_position());
    }

    #[test]
    fn from_str_parses_record_groups_case_insensitively() {
        assert_eq!(AtomKind::from_str("ATOM"), Ok(AtomKind::Polymer));
        assert_eq!(AtomKind::from_str("hetatm"), Ok(AtomKind::NonPolymer));
        assert_eq!(AtomKind::from_str(" Polymer "), Ok(AtomKind::Polymer));
        assert_eq!(AtomKind::from_str("non-polymer"), Ok(AtomKind::NonPolymer));
    }

    #[test]
    fn from_str_returns_err_for_unknown_group() {
        assert_eq!(AtomKind::from_str("water"), Err(()));
        assert_eq!(AtomKind::from_str(""), Err(()));
    }
}
