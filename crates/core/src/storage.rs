//! Flat contiguous vector storage.
//!
//! All coordinates live in a single `Vec<f32>`: vector `i` occupies
//! `[i * dim, (i + 1) * dim)`. External ids are kept in a parallel array.
//! Nothing is ever removed or reordered, so internal indices are stable.
//!
//! Views returned by [`FlatStorage::vector`] borrow the storage and therefore
//! cannot outlive the next mutating call; reallocation on append is never
//! observable from safe code.

use crate::error::{CoreError, CoreResult};
use std::ops::Range;

/// Append-only storage for fixed-dimension vectors.
#[derive(Debug, Clone)]
pub struct FlatStorage {
    /// Dimensionality of every stored vector.
    dim: usize,
    /// Coordinates of all vectors, row-major.
    data: Vec<f32>,
    /// External id of each row.
    ids: Vec<u64>,
}

impl FlatStorage {
    /// Create empty storage for vectors of `dim` coordinates.
    pub fn new(dim: usize) -> CoreResult<Self> {
        if dim == 0 {
            return Err(CoreError::ZeroDimension);
        }
        Ok(Self {
            dim,
            data: Vec::new(),
            ids: Vec::new(),
        })
    }

    /// Create empty storage with room for `capacity` vectors.
    pub fn with_capacity(dim: usize, capacity: usize) -> CoreResult<Self> {
        let mut storage = Self::new(dim)?;
        storage.data.reserve(capacity.saturating_mul(dim));
        storage.ids.reserve(capacity);
        Ok(storage)
    }

    /// Reserve room for `additional` more vectors.
    pub fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional.saturating_mul(self.dim));
        self.ids.reserve(additional);
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of whole rows in a row-major buffer.
    ///
    /// Fails if `len` is not a multiple of `dim`.
    pub fn rows_in(&self, len: usize) -> CoreResult<usize> {
        if len % self.dim != 0 {
            return Err(CoreError::BufferLength { len, dim: self.dim });
        }
        Ok(len / self.dim)
    }

    /// Append a row-major block of vectors.
    ///
    /// `vectors.len()` must be a multiple of `dim`. When `ids` is given it must
    /// hold exactly one id per row; otherwise rows get sequential ids starting
    /// at the current size. Returns the internal indices assigned to the rows.
    /// On error the storage is left untouched.
    pub fn append(&mut self, vectors: &[f32], ids: Option<&[u64]>) -> CoreResult<Range<usize>> {
        let count = self.rows_in(vectors.len())?;
        if let Some(ids) = ids {
            if ids.len() != count {
                return Err(CoreError::InvalidArgument(format!(
                    "ids length {} does not match row count {}",
                    ids.len(),
                    count
                )));
            }
        }

        let old_size = self.len();
        let new_size = old_size + count;
        if count == 0 {
            return Ok(old_size..old_size);
        }

        // One reservation per batch; Vec growth keeps repeated appends amortized.
        self.data.reserve(count * self.dim);
        self.ids.reserve(count);

        self.data.extend_from_slice(vectors);
        match ids {
            Some(ids) => self.ids.extend_from_slice(ids),
            None => self.ids.extend((old_size..new_size).map(|i| i as u64)),
        }

        Ok(old_size..new_size)
    }

    /// Read-only view of the vector at `index`.
    pub fn vector(&self, index: usize) -> CoreResult<&[f32]> {
        if index >= self.len() {
            return Err(CoreError::OutOfBounds {
                index,
                len: self.len(),
            });
        }
        Ok(self.row(index))
    }

    /// View of the vector at `index` for callers that already know it is valid.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn row(&self, index: usize) -> &[f32] {
        let start = index * self.dim;
        &self.data[start..start + self.dim]
    }

    /// External id of the vector at `index`.
    pub fn id(&self, index: usize) -> CoreResult<u64> {
        self.ids.get(index).copied().ok_or(CoreError::OutOfBounds {
            index,
            len: self.len(),
        })
    }

    /// External ids in internal-index order.
    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    /// The whole coordinate buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Iterate over `(internal index, external id, vector)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u64, &[f32])> + '_ {
        self.data
            .chunks_exact(self.dim)
            .zip(self.ids.iter().copied())
            .enumerate()
            .map(|(index, (vector, id))| (index, id, vector))
    }

    /// Heap bytes held by coordinates and ids.
    pub fn memory_bytes(&self) -> usize {
        self.data.capacity() * std::mem::size_of::<f32>()
            + self.ids.capacity() * std::mem::size_of::<u64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dim_rejected() {
        assert_eq!(FlatStorage::new(0).unwrap_err(), CoreError::ZeroDimension);
    }

    #[test]
    fn test_append_assigns_sequential_ids() {
        let mut storage = FlatStorage::new(2).unwrap();
        let range = storage.append(&[1.0, 2.0, 3.0, 4.0], None).unwrap();
        assert_eq!(range, 0..2);
        let range = storage.append(&[5.0, 6.0], None).unwrap();
        assert_eq!(range, 2..3);

        assert_eq!(storage.ids(), &[0, 1, 2]);
        assert_eq!(storage.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_append_with_ids() {
        let mut storage = FlatStorage::new(3).unwrap();
        storage
            .append(&[0.0, 0.0, 1.0, 0.0, 1.0, 0.0], Some(&[70, 80]))
            .unwrap();
        assert_eq!(storage.id(0).unwrap(), 70);
        assert_eq!(storage.id(1).unwrap(), 80);
        assert_eq!(storage.vector(1).unwrap(), &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_append_is_cumulative_and_ordered() {
        let mut storage = FlatStorage::new(2).unwrap();
        let first: Vec<f32> = (0..6).map(|i| i as f32).collect();
        let second: Vec<f32> = (100..104).map(|i| i as f32).collect();
        storage.append(&first, None).unwrap();
        storage.append(&second, None).unwrap();

        for i in 0..3 {
            assert_eq!(storage.vector(i).unwrap(), &first[i * 2..i * 2 + 2]);
        }
        for i in 3..5 {
            let j = i - 3;
            assert_eq!(storage.vector(i).unwrap(), &second[j * 2..j * 2 + 2]);
        }
    }

    #[test]
    fn test_bad_buffer_leaves_storage_untouched() {
        let mut storage = FlatStorage::new(4).unwrap();
        storage.append(&[1.0; 4], None).unwrap();

        let err = storage.append(&[1.0; 6], None).unwrap_err();
        assert_eq!(err, CoreError::BufferLength { len: 6, dim: 4 });

        let err = storage.append(&[1.0; 8], Some(&[1])).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));

        assert_eq!(storage.len(), 1);
        assert_eq!(storage.as_slice().len(), 4);
    }

    #[test]
    fn test_empty_append_is_noop() {
        let mut storage = FlatStorage::new(4).unwrap();
        assert_eq!(storage.append(&[], None).unwrap(), 0..0);
        assert_eq!(storage.append(&[], Some(&[])).unwrap(), 0..0);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_out_of_bounds() {
        let mut storage = FlatStorage::new(2).unwrap();
        storage.append(&[1.0, 2.0], None).unwrap();
        assert_eq!(
            storage.vector(1).unwrap_err(),
            CoreError::OutOfBounds { index: 1, len: 1 }
        );
        assert!(storage.id(5).is_err());
    }

    #[test]
    fn test_iter() {
        let mut storage = FlatStorage::new(2).unwrap();
        storage.append(&[1.0, 2.0, 3.0, 4.0], Some(&[9, 8])).unwrap();
        let rows: Vec<(usize, u64, Vec<f32>)> = storage
            .iter()
            .map(|(i, id, v)| (i, id, v.to_vec()))
            .collect();
        assert_eq!(rows, vec![(0, 9, vec![1.0, 2.0]), (1, 8, vec![3.0, 4.0])]);
    }

    #[test]
    fn test_with_capacity() {
        let storage = FlatStorage::with_capacity(8, 100).unwrap();
        assert!(storage.is_empty());
        assert!(storage.memory_bytes() >= 100 * 8 * 4 + 100 * 8);
    }
}
