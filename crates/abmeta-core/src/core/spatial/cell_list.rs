use nalgebra::Point3;
use std::collections::HashMap;

type CellIndex = (i64, i64, i64);

/// Uniform-grid spatial hash over a fixed point set.
///
/// Points are binned into cubic cells of edge `cell_size`. A radius query
/// inspects every cell within `ceil(radius / cell_size)` rings of the query
/// cell, so results are exact for any radius, not only radii up to one cell.
#[derive(Debug)]
pub struct CellList<'a> {
    points: &'a [Point3<f64>],
    cell_size: f64,
    origin: Point3<f64>,
    cells: HashMap<CellIndex, Vec<usize>>,
}

impl<'a> CellList<'a> {
    /// Bins `points` into a grid. Every point must be finite and `cell_size` positive.
    pub fn new(points: &'a [Point3<f64>], cell_size: f64) -> Self {
        let origin = points.iter().fold(
            Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            |acc, p| Point3::new(acc.x.min(p.x), acc.y.min(p.y), acc.z.min(p.z)),
        );
        let origin = if points.is_empty() {
            Point3::origin()
        } else {
            origin
        };

        let mut cells: HashMap<CellIndex, Vec<usize>> = HashMap::new();
        for (idx, p) in points.iter().enumerate() {
            cells
                .entry(Self::cell_of(p, &origin, cell_size))
                .or_default()
                .push(idx);
        }

        Self {
            points,
            cell_size,
            origin,
            cells,
        }
    }

    fn cell_of(p: &Point3<f64>, origin: &Point3<f64>, cell_size: f64) -> CellIndex {
        let d = p - origin;
        (
            (d.x / cell_size).floor() as i64,
            (d.y / cell_size).floor() as i64,
            (d.z / cell_size).floor() as i64,
        )
    }

    /// Returns `true` if any binned point lies within `radius` (inclusive) of `query`.
    ///
    /// A negative or NaN radius matches nothing. When the ring search would
    /// visit more cells than are occupied, the occupied cells are scanned instead.
    pub fn any_within(&self, query: &Point3<f64>, radius: f64) -> bool {
        if radius.is_nan() || radius < 0.0 {
            return false;
        }
        let radius_sq = radius * radius;
        let within = |members: &Vec<usize>| {
            members
                .iter()
                .any(|&i| (self.points[i] - query).norm_squared() <= radius_sq)
        };

        let rings = (radius / self.cell_size).ceil().max(1.0);
        let visited = (2.0 * rings + 1.0).powi(3);
        if !visited.is_finite() || visited > self.cells.len() as f64 {
            return self.cells.values().any(within);
        }

        let reach = rings as i64;
        let (cx, cy, cz) = Self::cell_of(query, &self.origin, self.cell_size);
        for dx in -reach..=reach {
            for dy in -reach..=reach {
                for dz in -reach..=reach {
                    if self
                        .cells
                        .get(&(cx + dx, cy + dy, cz + dz))
                        .is_some_and(within)
                    {
                        return true;
                    }
                }
            }
        }
        false
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(points: &[Point3<f64>], q: &Point3<f64>, r: f64) -> bool {
        points.iter().any(|p| (p - q).norm() <= r)
    }

    #[test]
    fn finds_point_in_adjacent_cell() {
        let points = [Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)];
        let list = CellList::new(&points, 2.0);

        assert!(list.any_within(&Point3::new(1.9, 0.0, 0.0), 2.0));
        assert!(!list.any_within(&Point3::new(5.0, 0.0, 0.0), 2.0));
    }

    #[test]
    fn radius_is_inclusive() {
        let points = [Point3::new(0.0, 0.0, 0.0)];
        let list = CellList::new(&points, 6.0);
        assert!(list.any_within(&Point3::new(0.0, 5.0, 0.0), 5.0));
    }

    #[test]
    fn radius_larger_than_cell_size_is_exact() {
        let points: Vec<Point3<f64>> = (0..20)
            .map(|i| Point3::new(i as f64 * 3.7, (i % 3) as f64, -(i as f64) * 0.5))
            .collect();
        let list = CellList::new(&points, 1.0);

        for i in 0..40 {
            let q = Point3::new(i as f64 * 2.1 - 5.0, 4.0, 1.0);
            for r in [0.5, 2.5, 5.0, 8.0] {
                assert_eq!(list.any_within(&q, r), brute_force(&points, &q, r));
            }
        }
    }

    #[test]
    fn empty_list_never_matches() {
        let points: [Point3<f64>; 0] = [];
        let list = CellList::new(&points, 6.0);
        assert!(list.is_empty());
        assert!(!list.any_within(&Point3::origin(), 100.0));
    }

    #[test]
    fn negative_and_nan_radius_never_match() {
        let points = [Point3::new(0.0, 0.0, 0.0)];
        let list = CellList::new(&points, 6.0);
        let q = Point3::new(0.5, 0.0, 0.0);
        assert!(!list.any_within(&q, -1.0));
        assert!(!list.any_within(&q, f64::NAN));
    }

    #[test]
    fn huge_ring_count_falls_back_to_occupied_cells() {
        let points = [Point3::new(0.0, 0.0, 0.0), Point3::new(90.0, 0.0, 0.0)];
        let list = CellList::new(&points, 0.01);

        assert!(list.any_within(&Point3::new(50.0, 0.0, 0.0), 100.0));
        assert!(!list.any_within(&Point3::new(45.0, 0.0, 0.0), 40.0));
        assert!(list.any_within(&Point3::new(1.0, 0.0, 0.0), f64::INFINITY));
    }
}
