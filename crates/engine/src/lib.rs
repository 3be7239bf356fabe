//! Propagation-engine interface and the simulation driver built on it.
//!
//! The numerical heavy lifting lives behind [`PropagationEngine`]: the
//! driver hands a validated scenario to whichever engine is plugged in and
//! turns the returned histories into result tables. The built-in
//! [`reference::ReferenceEngine`] keeps the pipeline runnable end-to-end
//! without an external library; production comparisons bind real engines
//! behind the same trait.

use orbit_core::vector::State6;
use orbit_export::TableError;
use orbit_scenario::{ConfigurationError, Scenario};
use thiserror::Error;

pub mod driver;
pub mod ephemeris;
pub mod forces;
pub mod reference;

pub use driver::{SimulationProducts, run_scenario};
pub use reference::ReferenceEngine;

/// Raw propagation output: the state history and the dependent-variable
/// history, both sampled at every integrator epoch from the initial
/// condition to the termination epoch.
#[derive(Debug, Clone)]
pub struct PropagationOutput {
    pub state_history: Vec<(f64, State6)>,
    pub dependent_history: Vec<(f64, Vec<f64>)>,
}

/// The consumed interface of an orbit-propagation engine.
pub trait PropagationEngine {
    /// Human-readable engine name, used in manifests and error messages.
    fn name(&self) -> &str;

    /// Propagate the scenario from its start epoch to its termination
    /// epoch, sampling state and dependent variables at every step.
    fn propagate(&self, scenario: &Scenario) -> Result<PropagationOutput, EngineError>;
}

/// Failures raised inside an engine. These carry the underlying cause and
/// are never retried: fixed-step deterministic propagation has no transient
/// failure class.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("propagation diverged at t = {epoch_s} s (non-finite state component)")]
    Diverged { epoch_s: f64 },
    #[error("force model `{force}` on `{body}` is not supported by this engine")]
    UnsupportedForce { force: String, body: String },
    #[error("missing reference data for body `{body}`: {detail}")]
    MissingReferenceData { body: String, detail: String },
    #[error("dependent-variable evaluation failed at t = {epoch_s} s: {detail}")]
    DependentVariable { epoch_s: f64, detail: String },
    #[error("scenario rejected by engine: {0}")]
    Rejected(#[from] ConfigurationError),
}

/// A failed simulation run, surfaced by the driver with the cause attached.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("simulation of scenario `{scenario}` failed")]
    Engine {
        scenario: String,
        #[source]
        cause: EngineError,
    },
    #[error(
        "engine `{engine}` returned {state_rows} state rows but {dependent_rows} dependent rows for scenario `{scenario}`"
    )]
    MismatchedHistories {
        scenario: String,
        engine: String,
        state_rows: usize,
        dependent_rows: usize,
    },
    #[error(
        "engine `{engine}` returned {got} rows for scenario `{scenario}`, fixed-step sampling requires {expected}"
    )]
    SampleCount {
        scenario: String,
        engine: String,
        expected: usize,
        got: usize,
    },
    #[error("engine `{engine}` produced a malformed history for scenario `{scenario}`")]
    MalformedHistory {
        scenario: String,
        engine: String,
        #[source]
        cause: TableError,
    },
}
