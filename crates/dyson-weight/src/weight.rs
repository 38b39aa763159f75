//! The [`Weight`] container and its builder.

use std::path::Path;
use std::sync::Arc;

use dyson_archive::{load_archive, save_archive, Archive, ArrayRecord, SaveMode};
use dyson_indexmap::{IndexMap, SpinFlavor};
use num_complex::Complex64;
use tracing::info;

use crate::error::{Result, WeightError};
use crate::storage::DenseStorage;
use crate::types::{ComponentKind, Layout, TauSymmetry};

/// One component's data and its current axis arrangement.
#[derive(Debug, Clone)]
pub(crate) struct Component {
    pub(crate) storage: DenseStorage,
    pub(crate) layout: Layout,
}

/// A propagator or interaction over spin, sublattice, space and imaginary time.
///
/// A weight owns up to two dense complex components:
///
/// - `SmoothT`: `[NSpin^2, NSub^2, Volume, MaxTauBin]`
/// - `DeltaT`: `[NSpin^2, NSub^2, Volume]`
///
/// where `NSpin` is 2 for one-spin and 4 for two-spin weights. The shape is
/// fixed by the [`WeightBuilder`]; every setter and every transform checks the
/// live shape against it.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use dyson_indexmap::{IndexMap, SpinFlavor};
/// use dyson_weight::{ComponentKind, TauSymmetry, Weight};
///
/// let map = Arc::new(IndexMap::new(1.0, &[4, 4], 2, 16).unwrap());
/// let g = Weight::builder("G", map)
///     .flavor(SpinFlavor::OneSpin)
///     .symmetry(TauSymmetry::AntiSymmetric)
///     .with_smooth_t()
///     .build()
///     .unwrap();
/// assert_eq!(g.dims(ComponentKind::SmoothT), Some(vec![4, 4, 16, 16]));
/// assert!(!g.has(ComponentKind::DeltaT));
/// ```
#[derive(Debug, Clone)]
pub struct Weight {
    pub(crate) name: String,
    pub(crate) map: Arc<IndexMap>,
    pub(crate) flavor: SpinFlavor,
    pub(crate) symmetry: Option<TauSymmetry>,
    pub(crate) smooth_t: Option<Component>,
    pub(crate) delta_t: Option<Component>,
}

/// Builder for [`Weight`]
#[derive(Debug, Clone)]
pub struct WeightBuilder {
    name: String,
    map: Arc<IndexMap>,
    flavor: Option<SpinFlavor>,
    symmetry: Option<TauSymmetry>,
    smooth_t: bool,
    delta_t: bool,
}

impl WeightBuilder {
    fn new(name: impl Into<String>, map: Arc<IndexMap>) -> Self {
        Self {
            name: name.into(),
            map,
            flavor: None,
            symmetry: None,
            smooth_t: false,
            delta_t: false,
        }
    }

    /// Set the spin flavor (required)
    pub fn flavor(mut self, flavor: SpinFlavor) -> Self {
        self.flavor = Some(flavor);
        self
    }

    /// Set the imaginary-time symmetry (required when the weight will carry `SmoothT`)
    pub fn symmetry(mut self, symmetry: TauSymmetry) -> Self {
        self.symmetry = Some(symmetry);
        self
    }

    /// Allocate a zero `SmoothT` component
    pub fn with_smooth_t(mut self) -> Self {
        self.smooth_t = true;
        self
    }

    /// Allocate a zero `DeltaT` component
    pub fn with_delta_t(mut self) -> Self {
        self.delta_t = true;
        self
    }

    /// Build the weight
    pub fn build(self) -> Result<Weight> {
        validate_name(&self.name)?;
        let flavor = self.flavor.ok_or_else(|| {
            WeightError::invalid(format!("spin flavor of {} is not set", self.name))
        })?;

        let mut weight = Weight {
            name: self.name,
            map: self.map,
            flavor,
            symmetry: self.symmetry,
            smooth_t: None,
            delta_t: None,
        };
        if self.smooth_t {
            weight.allocate(ComponentKind::SmoothT)?;
        }
        if self.delta_t {
            weight.allocate(ComponentKind::DeltaT)?;
        }
        Ok(weight)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(WeightError::invalid("weight name must not be empty"));
    }
    if name.contains('.') {
        return Err(WeightError::invalid(format!(
            "weight name {name:?} must not contain '.'"
        )));
    }
    Ok(())
}

impl Weight {
    /// Start building a weight named `name` over the given index map.
    pub fn builder(name: impl Into<String>, map: Arc<IndexMap>) -> WeightBuilder {
        WeightBuilder::new(name, map)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn map(&self) -> &Arc<IndexMap> {
        &self.map
    }

    pub fn flavor(&self) -> SpinFlavor {
        self.flavor
    }

    /// Declared symmetry, if any.
    pub fn symmetry(&self) -> Option<TauSymmetry> {
        self.symmetry
    }

    /// Whether the weight carries the given component.
    pub fn has(&self, kind: ComponentKind) -> bool {
        self.component(kind).is_some()
    }

    /// Current layout of a component.
    pub fn layout(&self, kind: ComponentKind) -> Option<Layout> {
        self.component(kind).map(|c| c.layout)
    }

    /// Live shape of a component.
    pub fn dims(&self, kind: ComponentKind) -> Option<Vec<usize>> {
        self.component(kind).map(|c| c.storage.dims())
    }

    /// Shape a component must have in the given layout.
    pub fn declared_dims(&self, kind: ComponentKind, layout: Layout) -> Vec<usize> {
        match layout {
            Layout::Merged => self.map.weight_dims(self.flavor, kind.has_tau()),
            Layout::SplitSwapped => {
                let n = self.flavor.nspin() * self.map.n_sublattice();
                let mut dims = vec![n, n, self.map.volume()];
                if kind.has_tau() {
                    dims.push(self.map.max_tau_bin());
                }
                dims
            }
        }
    }

    pub fn smooth_t(&self) -> Option<&DenseStorage> {
        self.storage(ComponentKind::SmoothT)
    }

    pub fn delta_t(&self) -> Option<&DenseStorage> {
        self.storage(ComponentKind::DeltaT)
    }

    pub fn smooth_t_mut(&mut self) -> Option<&mut DenseStorage> {
        self.storage_mut(ComponentKind::SmoothT)
    }

    pub fn delta_t_mut(&mut self) -> Option<&mut DenseStorage> {
        self.storage_mut(ComponentKind::DeltaT)
    }

    pub fn storage(&self, kind: ComponentKind) -> Option<&DenseStorage> {
        self.component(kind).map(|c| &c.storage)
    }

    pub fn storage_mut(&mut self, kind: ComponentKind) -> Option<&mut DenseStorage> {
        self.component_mut(kind).map(|c| &mut c.storage)
    }

    pub(crate) fn component(&self, kind: ComponentKind) -> Option<&Component> {
        match kind {
            ComponentKind::SmoothT => self.smooth_t.as_ref(),
            ComponentKind::DeltaT => self.delta_t.as_ref(),
        }
    }

    pub(crate) fn component_mut(&mut self, kind: ComponentKind) -> Option<&mut Component> {
        match kind {
            ComponentKind::SmoothT => self.smooth_t.as_mut(),
            ComponentKind::DeltaT => self.delta_t.as_mut(),
        }
    }

    fn slot_mut(&mut self, kind: ComponentKind) -> &mut Option<Component> {
        match kind {
            ComponentKind::SmoothT => &mut self.smooth_t,
            ComponentKind::DeltaT => &mut self.delta_t,
        }
    }

    /// Components present, `SmoothT` first.
    pub(crate) fn present_kinds(&self) -> Vec<ComponentKind> {
        ComponentKind::ALL
            .into_iter()
            .filter(|&k| self.has(k))
            .collect()
    }

    /// `"{name}.{kind}"`, also the archive key.
    pub fn key(&self, kind: ComponentKind) -> String {
        format!("{}.{}", self.name, kind)
    }

    pub(crate) fn missing(&self, kind: ComponentKind) -> WeightError {
        WeightError::MissingComponent {
            name: self.name.clone(),
            kind,
        }
    }

    // ========================================================================
    // Shape checks
    // ========================================================================

    /// Check the live shape of a component against the shape declared for its layout.
    pub(crate) fn check_shape(&self, kind: ComponentKind) -> Result<()> {
        let component = self.component(kind).ok_or_else(|| self.missing(kind))?;
        let expected = self.declared_dims(kind, component.layout);
        let actual = component.storage.dims();
        if expected != actual {
            return Err(WeightError::shape_mismatch(self.key(kind), &expected, &actual));
        }
        Ok(())
    }

    /// Check that a present component has its merged shape and layout.
    pub(crate) fn check_merged(&self, kind: ComponentKind) -> Result<()> {
        let component = self.component(kind).ok_or_else(|| self.missing(kind))?;
        let expected = self.declared_dims(kind, Layout::Merged);
        let actual = component.storage.dims();
        if expected != actual {
            return Err(WeightError::shape_mismatch(self.key(kind), &expected, &actual));
        }
        self.check_layout(kind, Layout::Merged)
    }

    pub(crate) fn check_layout(&self, kind: ComponentKind, expected: Layout) -> Result<()> {
        let component = self.component(kind).ok_or_else(|| self.missing(kind))?;
        if component.layout != expected {
            return Err(WeightError::LayoutMismatch {
                component: self.key(kind),
                expected,
                actual: component.layout,
            });
        }
        Ok(())
    }

    fn require_symmetry_for(&self, kind: ComponentKind) -> Result<()> {
        if kind.has_tau() && self.symmetry.is_none() {
            return Err(WeightError::invalid(format!(
                "{} carries SmoothT, so its tau symmetry must be declared",
                self.name
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Component management
    // ========================================================================

    /// Allocate (or reset) a component as zeros in merged layout.
    pub fn allocate(&mut self, kind: ComponentKind) -> Result<()> {
        self.require_symmetry_for(kind)?;
        let dims = self.declared_dims(kind, Layout::Merged);
        *self.slot_mut(kind) = Some(Component {
            storage: DenseStorage::zeros(&dims),
            layout: Layout::Merged,
        });
        Ok(())
    }

    /// Replace a component with `storage`, which must have the merged shape.
    pub fn set_component(&mut self, kind: ComponentKind, storage: DenseStorage) -> Result<()> {
        self.require_symmetry_for(kind)?;
        let expected = self.declared_dims(kind, Layout::Merged);
        let actual = storage.dims();
        if expected != actual {
            return Err(WeightError::shape_mismatch(self.key(kind), &expected, &actual));
        }
        *self.slot_mut(kind) = Some(Component {
            storage,
            layout: Layout::Merged,
        });
        Ok(())
    }

    pub fn set_smooth_t(&mut self, storage: DenseStorage) -> Result<()> {
        self.set_component(ComponentKind::SmoothT, storage)
    }

    pub fn set_delta_t(&mut self, storage: DenseStorage) -> Result<()> {
        self.set_component(ComponentKind::DeltaT, storage)
    }

    /// Zero every element of a component.
    pub fn fill_zero(&mut self, kind: ComponentKind) -> Result<()> {
        let name = self.name.clone();
        let component = self
            .component_mut(kind)
            .ok_or(WeightError::MissingComponent { name, kind })?;
        component.storage.fill(Complex64::new(0.0, 0.0));
        Ok(())
    }

    // ========================================================================
    // Element access
    // ========================================================================

    /// Row-major offset of a multi-index into a merged component.
    ///
    /// `index` is `[spin, sublattice, site, tau]` for `SmoothT` and
    /// `[spin, sublattice, site]` for `DeltaT`.
    pub fn offset(&self, kind: ComponentKind, index: &[usize]) -> Result<usize> {
        self.check_merged(kind)?;
        let dims = self.declared_dims(kind, Layout::Merged);
        if index.len() != dims.len() {
            return Err(WeightError::invalid(format!(
                "{} takes {} indices, got {}",
                self.key(kind),
                dims.len(),
                index.len()
            )));
        }
        let mut offset = 0;
        for (axis, (&i, &d)) in index.iter().zip(dims.iter()).enumerate() {
            if i >= d {
                return Err(WeightError::invalid(format!(
                    "index {i} out of range [0, {d}) on axis {axis} of {}",
                    self.key(kind)
                )));
            }
            offset = offset * d + i;
        }
        Ok(offset)
    }

    pub fn get(&self, kind: ComponentKind, index: &[usize]) -> Result<Complex64> {
        let offset = self.offset(kind, index)?;
        let storage = self.storage(kind).ok_or_else(|| self.missing(kind))?;
        Ok(storage.as_slice()[offset])
    }

    pub fn set(&mut self, kind: ComponentKind, index: &[usize], value: Complex64) -> Result<()> {
        let offset = self.offset(kind, index)?;
        let missing = self.missing(kind);
        let storage = self.storage_mut(kind).ok_or(missing)?;
        storage.as_mut_slice()[offset] = value;
        Ok(())
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Collect the components as archive records keyed by [`key`](Self::key).
    pub fn to_archive(&self) -> Result<Archive> {
        let mut archive = Archive::new();
        for kind in self.present_kinds() {
            self.check_merged(kind)?;
            let storage = self.storage(kind).ok_or_else(|| self.missing(kind))?;
            let record = ArrayRecord::new(storage.dims(), storage.as_slice().to_vec())
                .map_err(|e| WeightError::invalid(format!("{e:#}")))?;
            archive.insert(self.key(kind), record);
        }
        Ok(archive)
    }

    /// Write all present components to an archive file.
    pub fn save(&self, path: impl AsRef<Path>, mode: SaveMode) -> Result<()> {
        let path = path.as_ref();
        info!("Saving {} Matrix...", self.name);
        let archive = self.to_archive()?;
        save_archive(path, &archive, mode).map_err(|e| WeightError::Io {
            path: path.display().to_string(),
            message: format!("{e:#}"),
        })
    }

    /// Load whichever of `{name}.SmoothT` / `{name}.DeltaT` the archive holds.
    ///
    /// Every found array is shape-checked before anything is replaced.
    /// Components absent from the archive are left as they are.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        info!("Loading {} Matrix...", self.name);
        let archive = load_archive(path).map_err(|e| WeightError::Io {
            path: path.display().to_string(),
            message: format!("{e:#}"),
        })?;

        let mut found = Vec::new();
        for kind in ComponentKind::ALL {
            let key = self.key(kind);
            if let Some(record) = archive.get(&key) {
                self.require_symmetry_for(kind)?;
                let expected = self.declared_dims(kind, Layout::Merged);
                if record.dims() != expected.as_slice() {
                    return Err(WeightError::shape_mismatch(key, &expected, record.dims()));
                }
                found.push((kind, key, record));
            }
        }
        if found.is_empty() {
            return Err(WeightError::QuantityNotFound {
                name: self.name.clone(),
                path: path.display().to_string(),
            });
        }

        for (kind, key, record) in found {
            info!("Load {}", key);
            let storage = DenseStorage::from_vec_with_shape(record.data().to_vec(), record.dims());
            self.set_component(kind, storage)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dyson_indexmap::SpinFlavor;

    fn map() -> Arc<IndexMap> {
        Arc::new(IndexMap::new(2.0, &[2, 3], 2, 4).unwrap())
    }

    #[test]
    fn test_builder_allocates_zeros() {
        let w = Weight::builder("W", map())
            .flavor(SpinFlavor::TwoSpin)
            .symmetry(TauSymmetry::Symmetric)
            .with_smooth_t()
            .with_delta_t()
            .build()
            .unwrap();
        assert_eq!(w.dims(ComponentKind::SmoothT), Some(vec![16, 4, 6, 4]));
        assert_eq!(w.dims(ComponentKind::DeltaT), Some(vec![16, 4, 6]));
        assert!(w.smooth_t().unwrap().as_slice().iter().all(|z| z.norm() == 0.0));
        assert_eq!(w.layout(ComponentKind::DeltaT), Some(Layout::Merged));
    }

    #[test]
    fn test_builder_rejects_missing_flavor() {
        let err = Weight::builder("G", map()).with_delta_t().build().unwrap_err();
        assert!(matches!(err, WeightError::InvalidArgument { .. }));
    }

    #[test]
    fn test_builder_rejects_smooth_t_without_symmetry() {
        let err = Weight::builder("G", map())
            .flavor(SpinFlavor::OneSpin)
            .with_smooth_t()
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("symmetry"));

        // DeltaT alone needs no symmetry
        assert!(Weight::builder("G", map())
            .flavor(SpinFlavor::OneSpin)
            .with_delta_t()
            .build()
            .is_ok());
    }

    #[test]
    fn test_builder_rejects_malformed_names() {
        for name in ["", "G.SmoothT"] {
            let err = Weight::builder(name, map())
                .flavor(SpinFlavor::OneSpin)
                .build()
                .unwrap_err();
            assert!(matches!(err, WeightError::InvalidArgument { .. }), "{name:?}");
        }
    }

    #[test]
    fn test_set_component_checks_every_axis() {
        let mut g = Weight::builder("G", map())
            .flavor(SpinFlavor::OneSpin)
            .symmetry(TauSymmetry::AntiSymmetric)
            .build()
            .unwrap();

        let err = g.set_smooth_t(DenseStorage::zeros(&[4, 4, 6, 5])).unwrap_err();
        match err {
            WeightError::ShapeMismatch {
                component,
                axis,
                expected,
                actual,
            } => {
                assert_eq!(component, "G.SmoothT");
                assert_eq!(axis, 3);
                assert_eq!(expected, vec![4, 4, 6, 4]);
                assert_eq!(actual, vec![4, 4, 6, 5]);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(!g.has(ComponentKind::SmoothT));

        g.set_smooth_t(DenseStorage::zeros(&[4, 4, 6, 4])).unwrap();
        assert!(g.has(ComponentKind::SmoothT));
    }

    #[test]
    fn test_get_set_and_fill_zero() {
        let mut g = Weight::builder("G", map())
            .flavor(SpinFlavor::OneSpin)
            .symmetry(TauSymmetry::AntiSymmetric)
            .with_smooth_t()
            .with_delta_t()
            .build()
            .unwrap();

        let z = Complex64::new(1.5, -2.0);
        g.set(ComponentKind::SmoothT, &[3, 1, 5, 2], z).unwrap();
        assert_eq!(g.get(ComponentKind::SmoothT, &[3, 1, 5, 2]).unwrap(), z);
        // Row-major offset: ((3*4 + 1)*6 + 5)*4 + 2
        assert_eq!(g.smooth_t().unwrap().as_slice()[334], z);

        assert!(g.get(ComponentKind::SmoothT, &[4, 0, 0, 0]).is_err());
        assert!(g.get(ComponentKind::DeltaT, &[0, 0, 0, 0]).is_err());

        g.fill_zero(ComponentKind::SmoothT).unwrap();
        assert_eq!(g.get(ComponentKind::SmoothT, &[3, 1, 5, 2]).unwrap().norm(), 0.0);
    }

    #[test]
    fn test_fill_zero_missing_component() {
        let mut g = Weight::builder("G", map())
            .flavor(SpinFlavor::OneSpin)
            .with_delta_t()
            .build()
            .unwrap();
        let err = g.fill_zero(ComponentKind::SmoothT).unwrap_err();
        assert!(matches!(err, WeightError::MissingComponent { .. }));
    }

    #[test]
    fn test_corrupted_storage_is_observed() {
        let mut g = Weight::builder("G", map())
            .flavor(SpinFlavor::OneSpin)
            .with_delta_t()
            .build()
            .unwrap();
        *g.delta_t_mut().unwrap() = DenseStorage::zeros(&[4, 4, 5]);
        let err = g.check_shape(ComponentKind::DeltaT).unwrap_err();
        assert!(matches!(err, WeightError::ShapeMismatch { axis: 2, .. }));
    }
}
