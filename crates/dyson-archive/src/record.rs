//! In-memory archive contents.

use std::collections::btree_map;
use std::collections::BTreeMap;

use anyhow::{ensure, Result};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// A dense complex array in row-major (C) order together with its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayRecord {
    dims: Vec<usize>,
    data: Vec<Complex64>,
}

impl ArrayRecord {
    /// Create a record, checking that `data` fills `dims` exactly.
    pub fn new(dims: Vec<usize>, data: Vec<Complex64>) -> Result<Self> {
        let expected: usize = dims.iter().product();
        ensure!(
            data.len() == expected,
            "Shape mismatch in ArrayRecord: data length {} vs shape {:?} (expected {})",
            data.len(),
            dims,
            expected
        );
        Ok(Self { dims, data })
    }

    /// Shape of the array
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Row-major data
    pub fn data(&self) -> &[Complex64] {
        &self.data
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let expected: usize = self.dims.iter().product();
        ensure!(
            self.data.len() == expected,
            "Corrupted array: data length {} vs shape {:?}",
            self.data.len(),
            self.dims
        );
        Ok(())
    }
}

/// Named arrays, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Archive {
    arrays: BTreeMap<String, ArrayRecord>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an array, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, record: ArrayRecord) -> Option<ArrayRecord> {
        self.arrays.insert(name.into(), record)
    }

    pub fn get(&self, name: &str) -> Option<&ArrayRecord> {
        self.arrays.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.arrays.contains_key(name)
    }

    /// Names of all stored arrays, in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.arrays.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ArrayRecord> {
        self.arrays.iter()
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Copy every array of `other` into `self`, replacing arrays of the same name.
    pub fn merge(&mut self, other: Archive) {
        self.arrays.extend(other.arrays);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(values: &[f64]) -> ArrayRecord {
        let data = values.iter().map(|&v| Complex64::new(v, -v)).collect();
        ArrayRecord::new(vec![values.len()], data).unwrap()
    }

    #[test]
    fn test_record_shape_mismatch_returns_error() {
        let data = vec![Complex64::new(1.0, 0.0); 3];
        let result = ArrayRecord::new(vec![2, 3], data);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Shape mismatch"));
    }

    #[test]
    fn test_scalar_record() {
        let r = ArrayRecord::new(vec![], vec![Complex64::new(42.0, 0.0)]).unwrap();
        assert_eq!(r.len(), 1);
        assert!(r.dims().is_empty());
    }

    #[test]
    fn test_merge_replaces_same_name() {
        let mut a = Archive::new();
        a.insert("G.SmoothT", record(&[1.0]));
        a.insert("W.DeltaT", record(&[2.0]));

        let mut b = Archive::new();
        b.insert("G.SmoothT", record(&[3.0, 4.0]));

        a.merge(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.get("G.SmoothT").unwrap().len(), 2);
        assert_eq!(a.get("W.DeltaT").unwrap(), &record(&[2.0]));
        assert_eq!(a.names().collect::<Vec<_>>(), vec!["G.SmoothT", "W.DeltaT"]);
    }
}
