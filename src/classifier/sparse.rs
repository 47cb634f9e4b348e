//! Sparse feature vectors.

/// Non-zero `(index, value)` pairs of a dense vector of length `dim`,
/// sorted by index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    /// An all-zero vector.
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            entries: Vec::new(),
        }
    }

    /// Build from arbitrary `(index, value)` pairs.
    ///
    /// Values for the same index are summed; zeros and indices outside
    /// `0..dim` are dropped.
    pub fn from_entries(dim: usize, entries: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut entries: Vec<(usize, f64)> = entries.into_iter().filter(|&(i, _)| i < dim).collect();
        entries.sort_by_key(|&(i, _)| i);

        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
        for (idx, value) in entries {
            match merged.last_mut() {
                Some((last, sum)) if *last == idx => *sum += value,
                _ => merged.push((idx, value)),
            }
        }
        merged.retain(|&(_, v)| v != 0.0);

        Self {
            dim,
            entries: merged,
        }
    }

    /// Length of the dense vector.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of non-zero entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value at `index` (zero when absent).
    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |&(i, _)| i)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    /// Non-zero entries in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Dot product with a dense vector. Indices past `dense.len()` count as zero.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.entries
            .iter()
            .filter_map(|&(i, v)| dense.get(i).map(|w| w * v))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_entries_merges_and_sorts() {
        let v = FeatureVector::from_entries(5, [(3, 1.0), (1, 2.0), (3, 1.0), (4, 0.0), (9, 1.0)]);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![(1, 2.0), (3, 2.0)]);
        assert_eq!(v.dim(), 5);
        assert_eq!(v.nnz(), 2);
    }

    #[test]
    fn test_get_and_dot() {
        let v = FeatureVector::from_entries(4, [(0, 1.0), (2, 3.0)]);
        assert_eq!(v.get(2), 3.0);
        assert_eq!(v.get(1), 0.0);
        assert_eq!(v.dot(&[0.5, 10.0, -1.0, 7.0]), -2.5);
        assert_eq!(v.dot(&[0.5]), 0.5);
    }

    #[test]
    fn test_zeros() {
        let v = FeatureVector::zeros(3);
        assert!(v.is_zero());
        assert_eq!(v.dot(&[1.0, 2.0, 3.0]), 0.0);
    }
}
