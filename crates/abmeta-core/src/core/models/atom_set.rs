use super::atom::Atom;
use nalgebra::Point3;
use std::sync::Arc;

/// An ordered view over the atoms of one structure.
///
/// The atoms themselves live in a shared, immutable storage owned by the
/// structure. Chain and role selections are expressed as index lists into that
/// storage, so slicing a structure into chains and concatenating chains into
/// roles never copies atom data. An empty view keeps a handle to the same
/// storage, which lets downstream code treat "no atoms" exactly like any other
/// selection.
#[derive(Debug, Clone)]
pub struct AtomSet {
    storage: Arc<[Atom]>,
    indices: Vec<usize>,
}

impl AtomSet {
    /// Creates a view covering every atom in `atoms`, in order.
    ///
    /// # Arguments
    ///
    /// * `atoms` - The atoms of one structure; ownership moves into shared storage.
    pub fn new(atoms: Vec<Atom>) -> Self {
        let indices = (0..atoms.len()).collect();
        Self {
            storage: atoms.into(),
            indices,
        }
    }

    /// Returns an empty view over the same storage.
    pub fn empty_like(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            indices: Vec::new(),
        }
    }

    /// Returns the number of atoms in this view.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the view selects no atoms.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns an iterator over the selected atoms in view order.
    pub fn iter(&self) -> impl Iterator<Item = &Atom> + '_ {
        self.indices.iter().map(move |&i| &self.storage[i])
    }

    /// Returns the selected atom at position `index` of the view.
    pub fn get(&self, index: usize) -> Option<&Atom> {
        self.indices.get(index).map(|&i| &self.storage[i])
    }

    /// Collects the coordinates of the selected atoms, invalid ones included.
    pub fn coords(&self) -> Vec<Point3<f64>> {
        self.iter().map(|atom| atom.position).collect()
    }

    /// Returns `true` if any selected atom has a non-finite coordinate.
    pub fn has_invalid_coord(&self) -> bool {
        self.iter().any(|atom| !atom.has_valid_position())
    }

    /// Returns a sub-view of the atoms matching `predicate`, preserving order.
    ///
    /// # Arguments
    ///
    /// * `predicate` - Selection criterion applied to each atom of this view.
    pub fn select<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&Atom) -> bool,
    {
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&i| predicate(&self.storage[i]))
            .collect();
        Self {
            storage: Arc::clone(&self.storage),
            indices,
        }
    }

    /// Returns the distinct chain identifiers of the selected atoms, sorted.
    pub fn chain_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.iter().map(|atom| atom.chain_id.clone()).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Concatenates several views in order.
    ///
    /// Views over the same storage are joined by concatenating their index
    /// lists. Views over different storages are materialized into a new
    /// storage so the result is still a single coherent set.
    ///
    /// # Arguments
    ///
    /// * `parts` - The views to concatenate, in output order.
    /// * `template` - Supplies the storage of the result when `parts` is empty.
    ///
    /// # Return
    ///
    /// Returns a view with `sum(parts.len())` atoms, preserving per-atom annotations.
    pub fn concatenate(parts: &[&AtomSet], template: &AtomSet) -> Self {
        let Some(first) = parts.first() else {
            return template.empty_like();
        };

        if parts
            .iter()
            .all(|part| Arc::ptr_eq(&part.storage, &first.storage))
        {
            let indices = parts
                .iter()
                .flat_map(|part| part.indices.iter().copied())
                .collect();
            return Self {
                storage: Arc::clone(&first.storage),
                indices,
            };
        }

        let atoms = parts
            .iter()
            .flat_map(|part| part.iter().cloned())
            .collect::<Vec<_>>();
        Self::new(atoms)
    }
}

impl PartialEq for AtomSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}
