//! Equation-assembly policies.
//!
//! A policy fills the polarization, the screened interaction and the
//! self-energy from the bare propagator `G0` and interaction `W0`. The
//! weight crate only supplies the primitives; the order of the expansion is
//! chosen here.

use dyson_indexmap::{Axis, Spin, SpinFlavor, SpinPair, SpinQuad};
use dyson_weight::{ComponentKind, Layout, Result, Weight, WeightError};
use num_complex::Complex64;
use tracing::info;

/// One order of the Dyson expansion.
pub trait DysonPolicy {
    /// Expansion order this policy implements.
    fn order(&self) -> usize;

    /// Assemble the polarization from the propagator.
    fn polar(&self, g: &Weight, polar: &mut Weight) -> Result<()>;

    /// Assemble the screened interaction.
    fn w(&self, w0: &Weight, polar: &Weight, w: &mut Weight) -> Result<()>;

    /// Assemble the self-energy.
    fn sigma(&self, g0: &Weight, w: &Weight, sigma: &mut Weight) -> Result<()>;
}

/// Policy registered for an expansion order.
pub fn policy_for_order(order: usize) -> Result<Box<dyn DysonPolicy>> {
    match order {
        1 => Ok(Box::new(FirstOrder)),
        _ => Err(WeightError::InvalidArgument {
            message: format!("no policy is registered for order {order}, only order 1 is"),
        }),
    }
}

/// Merged `SmoothT` of `w`, checked against its declared shape.
fn merged_smooth_t(w: &Weight) -> Result<&[Complex64]> {
    let storage = w.smooth_t().ok_or_else(|| WeightError::MissingComponent {
        name: w.name().to_string(),
        kind: ComponentKind::SmoothT,
    })?;
    let expected = w.declared_dims(ComponentKind::SmoothT, Layout::Merged);
    let actual = storage.dims();
    if expected != actual || w.layout(ComponentKind::SmoothT) != Some(Layout::Merged) {
        return Err(WeightError::InvalidArgument {
            message: format!(
                "{} must be in merged layout with shape {:?}, got {:?}",
                w.key(ComponentKind::SmoothT),
                expected,
                actual
            ),
        });
    }
    Ok(storage.as_slice())
}

fn require_flavor(w: &Weight, flavor: SpinFlavor) -> Result<()> {
    if w.flavor() != flavor {
        return Err(WeightError::InvalidArgument {
            message: format!("{} must be {}, got {}", w.name(), flavor, w.flavor()),
        });
    }
    Ok(())
}

/// First-order terms: a bubble for the polarization, no correction to W or Sigma.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstOrder;

impl DysonPolicy for FirstOrder {
    fn order(&self) -> usize {
        1
    }

    /// `Polar[((s2,s1),(s1,s2)), (a,b), x, t] = -G[(s1,s1), (b,a), x, N-1-t] * G[(s2,s2), (a,b), x, t]`
    fn polar(&self, g: &Weight, polar: &mut Weight) -> Result<()> {
        require_flavor(g, SpinFlavor::OneSpin)?;
        require_flavor(polar, SpinFlavor::TwoSpin)?;
        let g_dims = g.declared_dims(ComponentKind::SmoothT, Layout::Merged);
        let polar_dims = polar.declared_dims(ComponentKind::SmoothT, Layout::Merged);
        let sub = Axis::SublatticeBlock.position();
        if g_dims[sub..] != polar_dims[sub..] {
            return Err(WeightError::InvalidArgument {
                message: format!(
                    "{} {:?} and {} {:?} disagree on sublattice, volume or tau",
                    g.name(),
                    g_dims,
                    polar.name(),
                    polar_dims
                ),
            });
        }
        let gs = merged_smooth_t(g)?;
        merged_smooth_t(polar)?;

        let map = g.map().clone();
        let nsub = map.n_sublattice();
        let sub_block = nsub * nsub;
        let (volume, ntau) = (map.volume(), map.max_tau_bin());
        let lane = volume * ntau;
        let offset = |spin: usize, sub: usize| (spin * sub_block + sub) * lane;

        let polar_name = polar.name().to_string();
        let out = polar
            .smooth_t_mut()
            .ok_or(WeightError::MissingComponent {
                name: polar_name,
                kind: ComponentKind::SmoothT,
            })?
            .as_mut_slice();

        for s1 in Spin::ALL {
            for s2 in Spin::ALL {
                let quad = map.spin_quad_index(SpinQuad::new(
                    SpinPair::new(s2, s1),
                    SpinPair::new(s1, s2),
                ));
                let g1 = map.spin_pair_index(SpinPair::new(s1, s1));
                let g2 = map.spin_pair_index(SpinPair::new(s2, s2));
                for a in 0..nsub {
                    for b in 0..nsub {
                        let ab = map.sublattice_pair_index(a, b);
                        let ba = map.sublattice_pair_index(b, a);
                        let first = &gs[offset(g1, ba)..offset(g1, ba) + lane];
                        let second = &gs[offset(g2, ab)..offset(g2, ab) + lane];
                        let target = &mut out[offset(quad, ab)..offset(quad, ab) + lane];
                        for site in 0..volume {
                            let row = site * ntau;
                            for t in 0..ntau {
                                target[row + t] =
                                    -first[row + ntau - 1 - t] * second[row + t];
                            }
                        }
                    }
                }
            }
        }
        info!("Polar assembled at first order");
        Ok(())
    }

    fn w(&self, _w0: &Weight, _polar: &Weight, w: &mut Weight) -> Result<()> {
        w.fill_zero(ComponentKind::SmoothT)?;
        info!("W assembled at first order");
        Ok(())
    }

    fn sigma(&self, _g0: &Weight, _w: &Weight, sigma: &mut Weight) -> Result<()> {
        sigma.fill_zero(ComponentKind::SmoothT)?;
        info!("Sigma assembled at first order");
        Ok(())
    }
}
