use phf::{Set, phf_set};

static BACKBONE_TRACE_ATOM_NAMES: Set<&'static str> = phf_set! {
    "N", "CA", "C",
};

static POLYMER_STRUCTURE_EXTENSIONS: Set<&'static str> = phf_set! {
    "cif", "mmcif", "pdb", "ent",
};

/// Returns `true` for the atoms that trace a peptide backbone (`N`, `CA`, `C`).
pub fn is_backbone_trace_atom(atom_name: &str) -> bool {
    BACKBONE_TRACE_ATOM_NAMES.contains(atom_name.trim())
}

/// Returns `true` if `extension` names a supported structure file format.
///
/// Matching is case-insensitive and ignores a leading dot.
pub fn is_structure_extension(extension: &str) -> bool {
    let normalized = extension.trim_start_matches('.').to_ascii_lowercase();
    POLYMER_STRUCTURE_EXTENSIONS.contains(normalized.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_backbone_trace_atom_recognizes_n_ca_c() {
        assert!(is_backbone_trace_atom("N"));
        assert!(is_backbone_trace_atom(" CA "));
        assert!(is_backbone_trace_atom("C"));
    }

    #[test]
    fn is_backbone_trace_atom_rejects_other_atoms() {
        assert!(!is_backbone_trace_atom("O"));
        assert!(!is_backbone_trace_atom("CB"));
        assert!(!is_backbone_trace_atom("ca"));
        assert!(!is_backbone_trace_atom(""));
    }

    #[test]
    fn is_structure_extension_is_case_insensitive() {
        assert!(is_structure_extension("cif"));
        assert!(is_structure_extension("CIF"));
        assert!(is_structure_extension(".mmCIF"));
        assert!(is_structure_extension("pdb"));
        assert!(is_structure_extension("ent"));
    }

    #[test]
    fn is_structure_extension_rejects_unknown_formats() {
        assert!(!is_structure_extension("bgf"));
        assert!(!is_structure_extension("csv"));
        assert!(!is_structure_extension(""));
    }
}
