use orbit_bench::config::BodyConfig;
use orbit_bench::elements::KeplerianElements;
use orbit_bench::engine::{
    EngineError, PropagationEngine, PropagationOutput, ReferenceEngine, SimulationError,
    run_scenario,
};
use orbit_bench::scenario::{ForceKind, Scenario, Vehicle};
use orbit_core::vector;

const MU_EARTH: f64 = 3.986004418e14;

fn earth() -> BodyConfig {
    BodyConfig {
        name: "Earth".to_string(),
        mu_m3_s2: MU_EARTH,
        radius_m: 6.378136e6,
        rotation_rate_rad_s: None,
        atmosphere: None,
        gravity_field: None,
        ephemeris: None,
    }
}

fn two_body_scenario(span_s: f64, step_s: f64) -> Scenario {
    Scenario::builder("two-body")
        .body(earth())
        .central_body("Earth")
        .vehicle(Vehicle {
            name: "test-sat".to_string(),
            mass_kg: 400.0,
            drag_coefficient: 1.2,
            drag_reference_area_m2: 4.0,
            radiation_pressure_coefficient: 1.2,
            radiation_reference_area_m2: 4.0,
        })
        .initial_elements(KeplerianElements {
            semi_major_axis_m: 7.5e6,
            eccentricity: 0.1,
            inclination_rad: 0.3,
            argument_of_periapsis_rad: 0.4,
            raan_rad: 0.5,
            true_anomaly_rad: 0.6,
        })
        .window(0.0, span_s)
        .runge_kutta_4(step_s)
        .force("Earth", ForceKind::PointMassGravity)
        .output(orbit_bench::scenario::DependentVariable::TotalAcceleration)
        .build()
        .expect("valid scenario")
}

#[test]
fn fixed_step_run_produces_floor_plus_one_rows() {
    let engine = ReferenceEngine::new();

    // Exact multiple of the step.
    let products = run_scenario(&engine, &two_body_scenario(100.0, 10.0)).expect("run");
    assert_eq!(products.state.row_count(), 11);
    assert_eq!(products.dependent.row_count(), 11);

    // Non-multiple: the final partial step is never taken.
    let products = run_scenario(&engine, &two_body_scenario(100.0, 7.0)).expect("run");
    assert_eq!(products.state.row_count(), 15);
    assert_eq!(products.state.times().last().copied(), Some(98.0));
}

#[test]
fn state_table_carries_the_cartesian_layout() {
    let engine = ReferenceEngine::new();
    let scenario = two_body_scenario(100.0, 10.0);
    let products = run_scenario(&engine, &scenario).expect("run");

    assert_eq!(
        products.state.columns(),
        ["x_m", "y_m", "z_m", "vx_m_s", "vy_m_s", "vz_m_s"]
    );
    let initial = scenario.initial_cartesian_state().expect("initial state");
    assert_eq!(products.state.rows()[0], initial.to_vec());
}

#[test]
fn two_body_energy_is_conserved_over_an_orbit() {
    let engine = ReferenceEngine::new();
    // Roughly one orbital period of the 7500 km orbit.
    let scenario = two_body_scenario(6_500.0, 10.0);
    let products = run_scenario(&engine, &scenario).expect("run");

    let energy = |row: &[f64]| {
        let position = [row[0], row[1], row[2]];
        let velocity = [row[3], row[4], row[5]];
        0.5 * vector::dot(&velocity, &velocity) - MU_EARTH / vector::norm(&position)
    };
    let initial = energy(&products.state.rows()[0]);
    let last = energy(products.state.rows().last().unwrap());
    assert!(
        ((last - initial) / initial).abs() < 1e-6,
        "energy drifted: {initial} vs {last}"
    );
}

/// Engine that drops the last sample of each history.
struct TruncatingEngine;

impl PropagationEngine for TruncatingEngine {
    fn name(&self) -> &str {
        "truncating"
    }

    fn propagate(&self, scenario: &Scenario) -> Result<PropagationOutput, EngineError> {
        let mut output = ReferenceEngine::new().propagate(scenario)?;
        output.state_history.pop();
        output.dependent_history.pop();
        Ok(output)
    }
}

/// Engine that returns state and dependent histories of different lengths.
struct LopsidedEngine;

impl PropagationEngine for LopsidedEngine {
    fn name(&self) -> &str {
        "lopsided"
    }

    fn propagate(&self, scenario: &Scenario) -> Result<PropagationOutput, EngineError> {
        let mut output = ReferenceEngine::new().propagate(scenario)?;
        output.dependent_history.pop();
        Ok(output)
    }
}

#[test]
fn driver_rejects_short_histories() {
    let scenario = two_body_scenario(100.0, 10.0);
    let err = run_scenario(&TruncatingEngine, &scenario).unwrap_err();
    match err {
        SimulationError::SampleCount { expected, got, .. } => {
            assert_eq!(expected, 11);
            assert_eq!(got, 10);
        }
        other => panic!("expected sample-count error, got {other}"),
    }
}

#[test]
fn driver_rejects_mismatched_histories() {
    let scenario = two_body_scenario(100.0, 10.0);
    let err = run_scenario(&LopsidedEngine, &scenario).unwrap_err();
    assert!(matches!(err, SimulationError::MismatchedHistories { .. }));
}

#[test]
fn missing_ephemeris_surfaces_as_simulation_failure() {
    // A third-body force whose source has no ephemeris entry cannot be
    // evaluated by the built-in engine.
    let scenario = Scenario::builder("missing-ephemeris")
        .body(earth())
        .body(BodyConfig {
            name: "Moon".to_string(),
            mu_m3_s2: 4.9048695e12,
            radius_m: 1.7374e6,
            rotation_rate_rad_s: None,
            atmosphere: None,
            gravity_field: None,
            ephemeris: None,
        })
        .central_body("Earth")
        .vehicle(Vehicle {
            name: "test-sat".to_string(),
            mass_kg: 400.0,
            drag_coefficient: 1.2,
            drag_reference_area_m2: 4.0,
            radiation_pressure_coefficient: 1.2,
            radiation_reference_area_m2: 4.0,
        })
        .initial_elements(KeplerianElements {
            semi_major_axis_m: 7.5e6,
            eccentricity: 0.1,
            inclination_rad: 0.3,
            argument_of_periapsis_rad: 0.4,
            raan_rad: 0.5,
            true_anomaly_rad: 0.6,
        })
        .window(0.0, 100.0)
        .runge_kutta_4(10.0)
        .force("Earth", ForceKind::PointMassGravity)
        .force("Moon", ForceKind::PointMassGravity)
        .build()
        .expect("valid scenario");

    let err = run_scenario(&ReferenceEngine::new(), &scenario).unwrap_err();
    match err {
        SimulationError::Engine { cause, .. } => {
            assert!(matches!(
                cause,
                EngineError::MissingReferenceData { ref body, .. } if body == "Moon"
            ));
        }
        other => panic!("expected engine failure, got {other}"),
    }
}
