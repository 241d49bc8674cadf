use super::cell_list::CellList;
use itertools::Itertools;
use kiddo::{ImmutableKdTree, SquaredEuclidean};
use nalgebra::Point3;

/// Distance thresholds (Angstroms) for the contact engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactParams {
    pub contact_cutoff: f64,
    pub clash_cutoff: f64,
    pub cell_size: f64,
}

impl Default for ContactParams {
    fn default() -> Self {
        Self {
            contact_cutoff: 5.0,
            clash_cutoff: 1.0,
            cell_size: 6.0,
        }
    }
}

/// Contact statistics of one atom set against another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactStats {
    /// Atoms of the first set with a second-set atom within the contact cutoff.
    pub n_contact_atoms: usize,
    /// Atoms of the first set with a second-set atom within the clash cutoff.
    pub n_clash_atoms: usize,
    /// Minimum distance between the sets; `+inf` when either set has no valid atom.
    pub min_dist: f64,
}

impl ContactStats {
    pub const EMPTY: ContactStats = ContactStats {
        n_contact_atoms: 0,
        n_clash_atoms: 0,
        min_dist: f64::INFINITY,
    };
}

fn finite_points(points: &[Point3<f64>]) -> Vec<Point3<f64>> {
    points
        .iter()
        .filter(|p| p.iter().all(|c| c.is_finite()))
        .copied()
        .collect()
}

/// Computes contact and clash counts of `set1` against `set2`, plus their minimum distance.
///
/// Points with any non-finite component are discarded first. Counts are
/// directional: they count atoms of `set1`, with both cutoffs inclusive.
/// The clash cutoff is not required to be smaller than the contact cutoff.
/// A negative or NaN cutoff matches no atom.
///
/// # Arguments
///
/// * `set1` - The atoms whose contacts are counted.
/// * `set2` - The atoms they are compared against.
/// * `params` - Cutoffs and the cell size of the spatial hash built over `set2`.
///
/// # Return
///
/// Returns [`ContactStats::EMPTY`] when either filtered set is empty.
pub fn contact_stats(
    set1: &[Point3<f64>],
    set2: &[Point3<f64>],
    params: &ContactParams,
) -> ContactStats {
    let a = finite_points(set1);
    let b = finite_points(set2);
    if a.is_empty() || b.is_empty() {
        return ContactStats::EMPTY;
    }

    let cells = CellList::new(&b, params.cell_size);
    let mut n_contact_atoms = 0;
    let mut n_clash_atoms = 0;
    for p in &a {
        if cells.any_within(p, params.contact_cutoff) {
            n_contact_atoms += 1;
        }
        if cells.any_within(p, params.clash_cutoff) {
            n_clash_atoms += 1;
        }
    }

    // Coincident points cannot change the minimum distance.
    let tree_points: Vec<[f64; 3]> = b
        .iter()
        .map(|p| [p.x + 0.0, p.y + 0.0, p.z + 0.0])
        .unique_by(|c| c.map(f64::to_bits))
        .collect();
    let kdtree: ImmutableKdTree<f64, 3> = ImmutableKdTree::new_from_slice(&tree_points);
    let min_dist_sq = a
        .iter()
        .map(|p| kdtree.nearest_one::<SquaredEuclidean>(&[p.x, p.y, p.z]).distance)
        .fold(f64::INFINITY, f64::min);

    ContactStats {
        n_contact_atoms,
        n_clash_atoms,
        min_dist: min_dist_sq.sqrt(),
    }
}
