//! Scenario configuration, simulation driving, result export, and
//! comparison plotting for perturbed-orbit benchmark runs.
//!
//! The numerical propagation itself is a pluggable collaborator behind
//! [`orbit_engine::PropagationEngine`]; everything in this workspace is the
//! declarative scenario layer, the deterministic output pipeline, and the
//! cross-implementation comparison tooling around it.

pub use orbit_compare as compare;
pub use orbit_config as config;
pub use orbit_elements as elements;
pub use orbit_engine as engine;
pub use orbit_export as export;
pub use orbit_scenario as scenario;

pub mod depvar;
pub mod figures;

/// Returns the version of the workspace for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
