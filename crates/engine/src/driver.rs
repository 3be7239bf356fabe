//! Simulation driver: one scenario in, two result tables out.

use orbit_export::ResultTable;
use orbit_scenario::Scenario;

use crate::{PropagationEngine, SimulationError};

/// The two tables a simulation run produces.
#[derive(Debug, Clone)]
pub struct SimulationProducts {
    pub state: ResultTable,
    pub dependent: ResultTable,
}

/// Column labels of the state table, excluding time.
pub fn state_column_labels() -> Vec<String> {
    ["x_m", "y_m", "z_m", "vx_m_s", "vy_m_s", "vz_m_s"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Run the scenario on the given engine and shape its histories into result
/// tables. Engine failures are surfaced with their cause attached; there is
/// no retry. Histories that violate the fixed-step sampling contract are
/// rejected as engine faults rather than written out partially.
pub fn run_scenario(
    engine: &dyn PropagationEngine,
    scenario: &Scenario,
) -> Result<SimulationProducts, SimulationError> {
    let output = engine
        .propagate(scenario)
        .map_err(|cause| SimulationError::Engine {
            scenario: scenario.name().to_string(),
            cause,
        })?;

    if output.state_history.len() != output.dependent_history.len() {
        return Err(SimulationError::MismatchedHistories {
            scenario: scenario.name().to_string(),
            engine: engine.name().to_string(),
            state_rows: output.state_history.len(),
            dependent_rows: output.dependent_history.len(),
        });
    }
    let expected = scenario.expected_rows();
    if output.state_history.len() != expected {
        return Err(SimulationError::SampleCount {
            scenario: scenario.name().to_string(),
            engine: engine.name().to_string(),
            expected,
            got: output.state_history.len(),
        });
    }

    let malformed = |cause| SimulationError::MalformedHistory {
        scenario: scenario.name().to_string(),
        engine: engine.name().to_string(),
        cause,
    };

    let mut state = ResultTable::new(state_column_labels());
    for (t, sample) in &output.state_history {
        state.push_row(*t, sample.to_vec()).map_err(malformed)?;
    }

    let mut dependent = ResultTable::new(scenario.dependent_column_labels());
    for (t, sample) in output.dependent_history {
        dependent.push_row(t, sample).map_err(malformed)?;
    }

    Ok(SimulationProducts { state, dependent })
}
