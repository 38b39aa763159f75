//! One Dyson run: load the bare quantities, apply a policy, save the results.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use dyson_indexmap::SpinFlavor;
use dyson_weight::{ComponentKind, SaveMode, TauSymmetry, Weight, WeightError};
use tracing::info;

use crate::parameter::Parameter;
use crate::policy::policy_for_order;

/// Quantities produced by one run.
#[derive(Debug, Clone)]
pub struct DysonResult {
    pub g: Weight,
    pub w: Weight,
    pub sigma: Weight,
    pub polar: Weight,
}

impl DysonResult {
    /// Save every quantity into one archive.
    pub fn save(&self, path: impl AsRef<Path>, mode: SaveMode) -> Result<()> {
        let path = path.as_ref();
        for weight in [&self.g, &self.w, &self.sigma, &self.polar] {
            weight
                .save(path, mode)
                .with_context(|| format!("saving {} to {}", weight.name(), path.display()))?;
        }
        Ok(())
    }
}

fn require(weight: &Weight, kind: ComponentKind) -> Result<(), WeightError> {
    if weight.has(kind) {
        Ok(())
    } else {
        Err(WeightError::MissingComponent {
            name: weight.name().to_string(),
            kind,
        })
    }
}

/// Compute `G`, `W`, `Sigma` and `Polar` from the `G` and `W` stored in `input`.
pub fn compute(parameter: &Parameter, input: impl AsRef<Path>) -> Result<DysonResult> {
    let input = input.as_ref();
    let map = Arc::new(parameter.index_map()?);
    let policy = policy_for_order(parameter.order)?;
    info!(
        "Dyson run at order {}, beta {} (T = {}), lattice {:?}, {} sublattice(s), {} tau bins",
        policy.order(),
        map.beta(),
        parameter.temperature(),
        map.lattice(),
        map.n_sublattice(),
        map.max_tau_bin()
    );

    let mut g0 = Weight::builder("G", map.clone())
        .flavor(SpinFlavor::OneSpin)
        .symmetry(TauSymmetry::AntiSymmetric)
        .build()?;
    g0.load(input)?;
    require(&g0, ComponentKind::SmoothT)?;

    let mut w0 = Weight::builder("W", map.clone())
        .flavor(SpinFlavor::TwoSpin)
        .symmetry(TauSymmetry::Symmetric)
        .build()?;
    w0.load(input)?;
    require(&w0, ComponentKind::DeltaT)?;

    // G starts from a zero SmoothT; no policy step updates it yet.
    let g = Weight::builder("G", map.clone())
        .flavor(SpinFlavor::OneSpin)
        .symmetry(TauSymmetry::AntiSymmetric)
        .with_smooth_t()
        .build()?;
    let mut w = Weight::builder("W", map.clone())
        .flavor(SpinFlavor::TwoSpin)
        .symmetry(TauSymmetry::Symmetric)
        .with_smooth_t()
        .build()?;
    if let Some(delta) = w0.delta_t() {
        w.set_delta_t(delta.clone())?;
    }
    let mut sigma = Weight::builder("Sigma", map.clone())
        .flavor(SpinFlavor::OneSpin)
        .symmetry(TauSymmetry::AntiSymmetric)
        .with_smooth_t()
        .with_delta_t()
        .build()?;
    let mut polar = Weight::builder("Polar", map)
        .flavor(SpinFlavor::TwoSpin)
        .symmetry(TauSymmetry::Symmetric)
        .with_smooth_t()
        .build()?;

    policy.polar(&g0, &mut polar)?;
    policy.w(&w0, &polar, &mut w)?;
    policy.sigma(&g0, &w, &mut sigma)?;

    Ok(DysonResult { g, w, sigma, polar })
}

/// [`compute`] and append the results to `output`.
pub fn run(parameter: &Parameter, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
    let output = output.as_ref();
    let result = compute(parameter, input)?;
    result.save(output, SaveMode::Append)?;
    info!("Results saved to {}", output.display());
    Ok(())
}
