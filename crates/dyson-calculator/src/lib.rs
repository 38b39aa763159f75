//! Dyson-equation driver.
//!
//! - [`Parameter`]: run parameters from a JSON file
//! - [`DysonPolicy`]: how one expansion order assembles `Polar`, `W` and
//!   `Sigma`, with [`FirstOrder`] as the registered implementation
//! - [`run`]: load `G` and `W` from an archive, apply the policy and append
//!   the results to another archive

mod driver;
mod error;
mod parameter;
mod policy;

pub use driver::{compute, run, DysonResult};
pub use error::{ParameterError, Result};
pub use parameter::{Parameter, MAX_ORDER};
pub use policy::{policy_for_order, DysonPolicy, FirstOrder};
