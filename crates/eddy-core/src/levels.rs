//! Level-indexed collections.

use std::ops::{Index, IndexMut};

/// An ordered collection with one entry per mesh level, level 0 first.
///
/// Every per-level field set owned by the solver is a `LevelVec`, so all
/// of them have the same length and index the same hierarchy levels.
/// Entries are replaced wholesale when the hierarchy changes rather than
/// edited in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LevelVec<T> {
    items: Vec<T>,
}

impl<T> LevelVec<T> {
    /// Build `num_levels` entries from a per-level constructor.
    pub fn from_fn<F: FnMut(usize) -> T>(num_levels: usize, f: F) -> Self {
        Self {
            items: (0..num_levels).map(f).collect(),
        }
    }

    /// Number of levels.
    pub fn num_levels(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no levels.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the finest level, or `None` if empty.
    pub fn finest_level(&self) -> Option<usize> {
        self.items.len().checked_sub(1)
    }

    /// Entry for `level`.
    pub fn get(&self, level: usize) -> Option<&T> {
        self.items.get(level)
    }

    /// Mutable entry for `level`.
    pub fn get_mut(&mut self, level: usize) -> Option<&mut T> {
        self.items.get_mut(level)
    }

    /// Iterate from level 0 upwards.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Mutable iteration from level 0 upwards.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Entries as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Entries as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }
}

impl<T> Index<usize> for LevelVec<T> {
    type Output = T;

    fn index(&self, level: usize) -> &T {
        &self.items[level]
    }
}

impl<T> IndexMut<usize> for LevelVec<T> {
    fn index_mut(&mut self, level: usize) -> &mut T {
        &mut self.items[level]
    }
}

impl<T> From<Vec<T>> for LevelVec<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> FromIterator<T> for LevelVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a LevelVec<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
