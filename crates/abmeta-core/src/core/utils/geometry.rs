use super::identifiers::is_backbone_trace_atom;
use crate::core::models::atom_set::AtomSet;
use crate::core::tables::value::Value;
use nalgebra::{Point3, Vector3};
use thiserror::Error;

/// Delimiter used to join point labels.
pub const LABEL_DELIMITER: &str = ";";

/// Accepted range (Angstroms) for a covalent bond between consecutive backbone trace atoms.
pub const BACKBONE_BOND_RANGE: (f64, f64) = (1.2, 1.8);

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("Point {index} has {width} coordinates; points must be (N, 3)")]
    PointShape { index: usize, width: usize },

    #[error("Got {labels} labels for {points} points")]
    LabelCount { points: usize, labels: usize },

    #[error("Selection contains no backbone trace atoms (N, CA, C)")]
    NoBackbone,
}

/// Fixed-shape summary of a labeled point set.
///
/// `centroid` and `radius_of_gyration` are `None` for an empty set: absence
/// of data, never a zero position.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSetSummary {
    pub size: usize,
    pub labels: String,
    pub centroid: Option<Point3<f64>>,
    pub radius_of_gyration: Option<f64>,
}

impl PointSetSummary {
    /// Expands the summary into prefixed columns.
    ///
    /// Produces `{prefix}_size`, `{prefix}_labels`, `{prefix}_centroid_x`,
    /// `{prefix}_centroid_y`, `{prefix}_centroid_z` and `{prefix}_rg`.
    pub fn to_columns(&self, prefix: &str) -> Vec<(String, Value)> {
        let axis = |i: usize| Value::from(self.centroid.map(|c| c[i]));
        vec![
            (format!("{prefix}_size"), Value::from(self.size)),
            (format!("{prefix}_labels"), Value::from(self.labels.as_str())),
            (format!("{prefix}_centroid_x"), axis(0)),
            (format!("{prefix}_centroid_y"), axis(1)),
            (format!("{prefix}_centroid_z"), axis(2)),
            (format!("{prefix}_rg"), Value::from(self.radius_of_gyration)),
        ]
    }
}

/// Converts rows of raw coordinates into points, enforcing an (N, 3) shape.
///
/// # Errors
///
/// Returns [`GeometryError::PointShape`] for the first row that is not exactly
/// three values wide.
pub fn points_from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Vec<Point3<f64>>, GeometryError> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| match row.as_ref() {
            [x, y, z] => Ok(Point3::new(*x, *y, *z)),
            other => Err(GeometryError::PointShape {
                index,
                width: other.len(),
            }),
        })
        .collect()
}

/// Summarizes a labeled point set: size, joined labels, centroid and radius of gyration.
///
/// The radius of gyration is the root-mean-square distance of the points from
/// their centroid, so a single point has a radius of zero.
///
/// # Arguments
///
/// * `points` - The points to summarize; may be empty.
/// * `labels` - One label per point, joined with [`LABEL_DELIMITER`] in input order.
///
/// # Errors
///
/// Returns [`GeometryError::LabelCount`] when the label and point counts differ.
pub fn summarize_points<S: AsRef<str>>(
    points: &[Point3<f64>],
    labels: &[S],
) -> Result<PointSetSummary, GeometryError> {
    if points.len() != labels.len() {
        return Err(GeometryError::LabelCount {
            points: points.len(),
            labels: labels.len(),
        });
    }
    if points.is_empty() {
        return Ok(PointSetSummary {
            size: 0,
            labels: String::new(),
            centroid: None,
            radius_of_gyration: None,
        });
    }

    let n = points.len() as f64;
    let sum: Vector3<f64> = points.iter().map(|p| p.coords).sum();
    let centroid = Point3::from(sum / n);
    let mean_sq = points
        .iter()
        .map(|p| (p - centroid).norm_squared())
        .sum::<f64>()
        / n;

    let joined = labels
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(LABEL_DELIMITER);

    Ok(PointSetSummary {
        size: points.len(),
        labels: joined,
        centroid: Some(centroid),
        radius_of_gyration: Some(mean_sq.sqrt()),
    })
}

/// Counts chain breaks along the backbone trace of a polymer selection.
///
/// Consecutive `N`, `CA`, `C` atoms (in selection order) must lie within
/// [`BACKBONE_BOND_RANGE`] of each other; every consecutive pair outside the
/// range, or with an unresolved coordinate, counts as one break.
///
/// # Errors
///
/// Returns [`GeometryError::NoBackbone`] when the selection has no backbone
/// trace atoms, since continuity is then undefined.
pub fn count_backbone_breaks(atoms: &AtomSet) -> Result<usize, GeometryError> {
    let trace: Vec<Point3<f64>> = atoms
        .iter()
        .filter(|atom| is_backbone_trace_atom(&atom.name))
        .map(|atom| atom.position)
        .collect();

    if trace.is_empty() {
        return Err(GeometryError::NoBackbone);
    }

    let (min_len, max_len) = BACKBONE_BOND_RANGE;
    let breaks = trace
        .windows(2)
        .filter(|pair| {
            let d = (pair[1] - pair[0]).norm();
            !(d >= min_len && d <= max_len)
        })
        .count();
    Ok(breaks)
}
