//! Space and imaginary-time Fourier transforms.
//!
//! Transforms act on merged components. The `Volume` axis is expanded into the
//! row-major lattice grid (first extent outermost) and transformed along each
//! lattice axis; the `Tau` axis of `SmoothT` is transformed on its own.
//!
//! Forward transforms are unnormalized, backward transforms carry the `1/N`
//! factor, so `Backward(Forward(x)) == x`.
//!
//! A fermionic (antisymmetric) weight is antiperiodic in tau. Before its
//! forward time transform every bin `b` is multiplied by
//! `exp(i * pi * t_b / beta)`, which maps the fermionic Matsubara frequencies
//! onto the DFT grid; the backward transform undoes the phase afterwards.

use dyson_indexmap::Axis;
use num_complex::Complex64;
use num_traits::Zero;
use rustfft::{Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{ComponentKind, Direction, Domains, Layout};
use crate::weight::Weight;

/// DFT planner plus the scratch lanes reused across axis passes.
pub(crate) struct AxisTransformer {
    planner: FftPlanner<f64>,
    lane: Vec<Complex64>,
    scratch: Vec<Complex64>,
}

impl AxisTransformer {
    pub(crate) fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
            lane: Vec::new(),
            scratch: Vec::new(),
        }
    }

    fn plan(&mut self, len: usize, direction: Direction) -> Arc<dyn Fft<f64>> {
        match direction {
            Direction::Forward => self.planner.plan_fft_forward(len),
            Direction::Backward => self.planner.plan_fft_inverse(len),
        }
    }

    /// Transform `data`, viewed as a row-major array of shape `dims`, along `axis`.
    pub(crate) fn transform_axis(
        &mut self,
        data: &mut [Complex64],
        dims: &[usize],
        axis: usize,
        direction: Direction,
    ) {
        let n = dims[axis];
        if n <= 1 {
            return;
        }
        debug_assert_eq!(data.len(), dims.iter().product::<usize>());
        let inner: usize = dims[axis + 1..].iter().product();
        let outer: usize = dims[..axis].iter().product();

        let fft = self.plan(n, direction);
        self.lane.resize(n, Complex64::zero());
        self.scratch
            .resize(fft.get_inplace_scratch_len(), Complex64::zero());
        let scale = match direction {
            Direction::Forward => 1.0,
            Direction::Backward => 1.0 / n as f64,
        };

        for o in 0..outer {
            for i in 0..inner {
                let base = o * n * inner + i;
                for k in 0..n {
                    self.lane[k] = data[base + k * inner];
                }
                fft.process_with_scratch(&mut self.lane, &mut self.scratch);
                for k in 0..n {
                    data[base + k * inner] = self.lane[k] * scale;
                }
            }
        }
    }
}

/// `exp(i * sign * pi * t_b / beta)` for every tau bin.
fn symmetry_phases(weight: &Weight, direction: Direction) -> Vec<Complex64> {
    let map = weight.map();
    let sign = direction.sign();
    (0..map.max_tau_bin())
        .map(|b| {
            let angle = sign * PI * map.bin_center_time(b) / map.beta();
            Complex64::new(angle.cos(), angle.sin())
        })
        .collect()
}

impl Weight {
    /// Apply or undo the antisymmetric phase on `SmoothT`.
    ///
    /// No-op for symmetric weights and for weights without `SmoothT`.
    pub fn change_symmetry(&mut self, direction: Direction) -> Result<()> {
        if !self.has(ComponentKind::SmoothT) || self.symmetry.map_or(true, |s| s.is_symmetric()) {
            return Ok(());
        }
        self.check_merged(ComponentKind::SmoothT)?;

        let phases = symmetry_phases(self, direction);
        let ntau = phases.len();
        if let Some(storage) = self.smooth_t_mut() {
            for lane in storage.as_mut_slice().chunks_exact_mut(ntau) {
                for (z, phase) in lane.iter_mut().zip(phases.iter()) {
                    *z *= phase;
                }
            }
        }
        Ok(())
    }

    /// Fourier transform over the requested domains.
    ///
    /// `Space` acts on every present component, `Time` on `SmoothT` only.
    /// The two commute. All present components must be in merged layout.
    pub fn fourier_transform(&mut self, direction: Direction, domains: Domains) -> Result<()> {
        for kind in self.present_kinds() {
            self.check_merged(kind)?;
        }
        if domains.is_empty() {
            return Ok(());
        }

        let mut transformer = AxisTransformer::new();
        if domains.contains(Domains::SPACE) {
            for kind in self.present_kinds() {
                self.transform_space(&mut transformer, kind, direction);
            }
        }
        if domains.contains(Domains::TIME) && self.has(ComponentKind::SmoothT) {
            if direction == Direction::Forward {
                self.change_symmetry(Direction::Forward)?;
            }
            self.transform_time(&mut transformer, direction);
            if direction == Direction::Backward {
                self.change_symmetry(Direction::Backward)?;
            }
        }
        Ok(())
    }

    fn transform_space(
        &mut self,
        transformer: &mut AxisTransformer,
        kind: ComponentKind,
        direction: Direction,
    ) {
        // [SpinBlock, SublatticeBlock, L_0, ..., L_{d-1}, (Tau)]
        let merged = self.declared_dims(kind, Layout::Merged);
        let lattice = self.map().lattice().to_vec();
        let volume = Axis::Volume.position();
        let mut dims = merged[..volume].to_vec();
        dims.extend_from_slice(&lattice);
        dims.extend_from_slice(&merged[volume + 1..]);

        if let Some(storage) = self.storage_mut(kind) {
            let data = storage.as_mut_slice();
            for axis in volume..volume + lattice.len() {
                transformer.transform_axis(data, &dims, axis, direction);
            }
        }
    }

    fn transform_time(&mut self, transformer: &mut AxisTransformer, direction: Direction) {
        let dims = self.declared_dims(ComponentKind::SmoothT, Layout::Merged);
        if let Some(storage) = self.smooth_t_mut() {
            transformer.transform_axis(
                storage.as_mut_slice(),
                &dims,
                Axis::Tau.position(),
                direction,
            );
        }
    }
}
