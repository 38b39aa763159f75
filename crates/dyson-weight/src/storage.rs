//! Dense complex storage for weight components.

use mdarray::{DynRank, Shape, Tensor};
use num_complex::Complex64;
use num_traits::Zero;

/// Dense row-major `Complex64` buffer with a dynamic-rank shape.
///
/// Thin wrapper over mdarray's `Tensor<Complex64, DynRank>`; the shape travels
/// with the data so reshapes and axis permutations need no side bookkeeping.
#[derive(Debug, Clone)]
pub struct DenseStorage(Tensor<Complex64, DynRank>);

impl DenseStorage {
    /// Create storage from a Vec with explicit shape.
    ///
    /// # Panics
    /// Panics if the product of dims doesn't match vec.len().
    pub fn from_vec_with_shape(vec: Vec<Complex64>, dims: &[usize]) -> Self {
        let expected_len: usize = dims.iter().product();
        assert_eq!(
            vec.len(),
            expected_len,
            "Vec length {} doesn't match shape {:?} (product {})",
            vec.len(),
            dims,
            expected_len
        );
        let tensor = Tensor::from(vec).into_shape(DynRank::from_dims(dims));
        Self(tensor)
    }

    /// Zero-filled storage of the given shape.
    pub fn zeros(dims: &[usize]) -> Self {
        let len: usize = dims.iter().product();
        Self::from_vec_with_shape(vec![Complex64::zero(); len], dims)
    }

    /// Placeholder with no elements.
    pub(crate) fn empty() -> Self {
        Self::from_vec_with_shape(Vec::new(), &[0])
    }

    /// Shape of the storage.
    pub fn dims(&self) -> Vec<usize> {
        self.0.shape().with_dims(|d| d.to_vec())
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.0.rank()
    }

    pub fn as_slice(&self) -> &[Complex64] {
        &self.0[..]
    }

    pub fn as_mut_slice(&mut self) -> &mut [Complex64] {
        &mut self.0[..]
    }

    pub fn into_vec(self) -> Vec<Complex64> {
        self.0.into_vec()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reinterpret the buffer under a new shape with the same element count.
    ///
    /// # Panics
    /// Panics if the element count changes.
    pub fn reshape(self, dims: &[usize]) -> Self {
        Self::from_vec_with_shape(self.into_vec(), dims)
    }

    /// Permute axes, materializing the result in row-major order.
    pub fn permute(&self, perm: &[usize]) -> Self {
        assert_eq!(
            perm.len(),
            self.rank(),
            "permutation length {} doesn't match rank {}",
            perm.len(),
            self.rank()
        );
        Self(self.0.permute(perm).to_tensor())
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: Complex64) {
        self.as_mut_slice().fill(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn test_from_vec_with_shape() {
        let s = DenseStorage::from_vec_with_shape((0..6).map(|i| c(i as f64)).collect(), &[2, 3]);
        assert_eq!(s.dims(), vec![2, 3]);
        assert_eq!(s.rank(), 2);
        assert_eq!(s.len(), 6);
        assert_eq!(s.as_slice()[4], c(4.0));
    }

    #[test]
    #[should_panic(expected = "doesn't match shape")]
    fn test_from_vec_with_wrong_shape() {
        DenseStorage::from_vec_with_shape(vec![c(1.0); 5], &[2, 3]);
    }

    #[test]
    fn test_permute_transposes() {
        // [[0, 1, 2], [3, 4, 5]] -> [[0, 3], [1, 4], [2, 5]]
        let s = DenseStorage::from_vec_with_shape((0..6).map(|i| c(i as f64)).collect(), &[2, 3]);
        let t = s.permute(&[1, 0]);
        assert_eq!(t.dims(), vec![3, 2]);
        let expected: Vec<Complex64> = [0.0, 3.0, 1.0, 4.0, 2.0, 5.0].iter().map(|&x| c(x)).collect();
        assert_eq!(t.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_reshape_keeps_data() {
        let s = DenseStorage::from_vec_with_shape((0..12).map(|i| c(i as f64)).collect(), &[3, 4]);
        let r = s.reshape(&[2, 2, 3]);
        assert_eq!(r.dims(), vec![2, 2, 3]);
        assert_eq!(r.as_slice()[11], c(11.0));
    }

    #[test]
    fn test_zeros_and_fill() {
        let mut s = DenseStorage::zeros(&[2, 2]);
        assert!(s.as_slice().iter().all(|z| z.is_zero()));
        s.fill(c(2.5));
        assert!(s.as_slice().iter().all(|&z| z == c(2.5)));
        assert!(DenseStorage::empty().is_empty());
    }
}
