//! Run parameters read from a JSON parameter file.

use std::fs;
use std::path::Path;

use anyhow::Context;
use dyson_indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ParameterError, Result};

/// Orders at or above this are rejected.
pub const MAX_ORDER: usize = 10;

/// Parameters of one Dyson run.
///
/// The JSON keys follow the parameter dictionary of the Monte Carlo code:
///
/// ```json
/// {
///   "L": [8, 8], "NSublat": 2, "MaxTauBin": 64,
///   "InitialBeta": 1.0, "DeltaBeta": 0.1, "FinalBeta": 2.0,
///   "Order": 1
/// }
/// ```
///
/// `Beta` defaults to `InitialBeta` and `Version` to 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "L")]
    pub lattice: Vec<usize>,
    #[serde(rename = "NSublat")]
    pub n_sublattice: usize,
    #[serde(rename = "MaxTauBin")]
    pub max_tau_bin: usize,
    #[serde(rename = "InitialBeta")]
    pub initial_beta: f64,
    #[serde(rename = "DeltaBeta")]
    pub delta_beta: f64,
    #[serde(rename = "FinalBeta")]
    pub final_beta: f64,
    #[serde(rename = "Order")]
    pub order: usize,
    #[serde(rename = "Beta", default, skip_serializing_if = "Option::is_none")]
    beta: Option<f64>,
    #[serde(rename = "Version", default)]
    pub version: u64,
}

impl Parameter {
    /// Parse parameters from JSON text and validate them.
    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        let parameter: Parameter =
            serde_json::from_str(text).context("malformed parameter file")?;
        parameter.validate()?;
        Ok(parameter)
    }

    /// Read and validate a parameter file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("{} fails to read!", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Write the parameters, with `Beta` resolved, as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let mut resolved = self.clone();
        resolved.beta = Some(self.beta());
        let text = serde_json::to_string_pretty(&resolved)?;
        fs::write(path, text).with_context(|| format!("{} fails to write!", path.display()))
    }

    /// Current inverse temperature.
    pub fn beta(&self) -> f64 {
        self.beta.unwrap_or(self.initial_beta)
    }

    /// Temperature `1 / beta`.
    pub fn temperature(&self) -> f64 {
        1.0 / self.beta()
    }

    pub fn validate(&self) -> Result<()> {
        let beta = self.beta();
        if !(beta >= self.initial_beta && beta <= self.final_beta) {
            return Err(ParameterError::BetaOutOfRange {
                beta,
                initial: self.initial_beta,
                final_beta: self.final_beta,
            });
        }
        if self.order >= MAX_ORDER {
            return Err(ParameterError::OrderTooLarge {
                order: self.order,
                max: MAX_ORDER,
            });
        }
        Ok(())
    }

    /// Index map at the current beta.
    pub fn index_map(&self) -> Result<IndexMap> {
        Ok(IndexMap::new(
            self.beta(),
            &self.lattice,
            self.n_sublattice,
            self.max_tau_bin,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = r#"{
        "L": [8, 8], "NSublat": 2, "MaxTauBin": 64,
        "InitialBeta": 1.0, "DeltaBeta": 0.1, "FinalBeta": 2.0,
        "Order": 1
    }"#;

    #[test]
    fn test_defaults() {
        let p = Parameter::from_json_str(BASIC).unwrap();
        assert_eq!(p.lattice, vec![8, 8]);
        assert_eq!(p.beta(), 1.0);
        assert_eq!(p.version, 0);
        assert_eq!(p.temperature(), 1.0);

        let map = p.index_map().unwrap();
        assert_eq!(map.volume(), 64);
        assert_eq!(map.max_tau_bin(), 64);
    }

    #[test]
    fn test_explicit_beta_and_version() {
        let text = BASIC.replace("\"Order\": 1", "\"Order\": 1, \"Beta\": 1.5, \"Version\": 3");
        let p = Parameter::from_json_str(&text).unwrap();
        assert_eq!(p.beta(), 1.5);
        assert_eq!(p.version, 3);
        assert_eq!(p.index_map().unwrap().beta(), 1.5);
    }

    #[test]
    fn test_beta_out_of_range() {
        let text = BASIC.replace("\"Order\": 1", "\"Order\": 1, \"Beta\": 2.5");
        let err = Parameter::from_json_str(&text).unwrap_err();
        let err = err.downcast::<ParameterError>().unwrap();
        assert!(matches!(err, ParameterError::BetaOutOfRange { .. }));
    }

    #[test]
    fn test_order_too_large() {
        let text = BASIC.replace("\"Order\": 1", "\"Order\": 10");
        let err = Parameter::from_json_str(&text).unwrap_err();
        assert!(err.to_string().contains("Order can not be bigger than 10"));
    }

    #[test]
    fn test_missing_key() {
        let text = BASIC.replace("\"NSublat\": 2,", "");
        assert!(Parameter::from_json_str(&text).is_err());
    }

    #[test]
    fn test_invalid_lattice_fails_at_index_map() {
        let text = BASIC.replace("[8, 8]", "[8, 0]");
        let p = Parameter::from_json_str(&text).unwrap();
        assert!(matches!(
            p.index_map().unwrap_err(),
            ParameterError::IndexMap(_)
        ));
    }

    #[test]
    fn test_save_resolves_beta() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("param.json");
        let p = Parameter::from_json_str(BASIC).unwrap();
        p.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"Beta\": 1.0"));
        let reloaded = Parameter::load(&path).unwrap();
        assert_eq!(reloaded.beta(), 1.0);
        assert_eq!(reloaded.lattice, p.lattice);
    }
}
