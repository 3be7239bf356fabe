use orbit_bench::config::{BodyConfig, load_bodies, load_scenario, load_vehicles};
use orbit_bench::elements::KeplerianElements;
use orbit_bench::scenario::benchmark::{benchmark_outputs, perturbed_leo};
use orbit_bench::scenario::{
    ConfigurationError, DependentVariable, ForceKind, ForceTag, Scenario, Vehicle,
};
use orbit_core::units::deg_to_rad;

fn body(name: &str, mu: f64) -> BodyConfig {
    BodyConfig {
        name: name.to_string(),
        mu_m3_s2: mu,
        radius_m: 6.378136e6,
        rotation_rate_rad_s: None,
        atmosphere: None,
        gravity_field: None,
        ephemeris: None,
    }
}

fn vehicle() -> Vehicle {
    Vehicle {
        name: "test-sat".to_string(),
        mass_kg: 400.0,
        drag_coefficient: 1.2,
        drag_reference_area_m2: 4.0,
        radiation_pressure_coefficient: 1.2,
        radiation_reference_area_m2: 4.0,
    }
}

fn leo_elements() -> KeplerianElements {
    KeplerianElements {
        semi_major_axis_m: 7.5e6,
        eccentricity: 0.1,
        inclination_rad: deg_to_rad(85.3),
        argument_of_periapsis_rad: deg_to_rad(235.7),
        raan_rad: deg_to_rad(23.4),
        true_anomaly_rad: deg_to_rad(139.87),
    }
}

fn minimal_builder() -> orbit_bench::scenario::ScenarioBuilder {
    Scenario::builder("two-body")
        .body(body("Earth", 3.986004418e14))
        .central_body("Earth")
        .vehicle(vehicle())
        .initial_elements(leo_elements())
        .window(0.0, 100.0)
        .runge_kutta_4(10.0)
        .force("Earth", ForceKind::PointMassGravity)
}

#[test]
fn minimal_scenario_builds() {
    let scenario = minimal_builder().build().expect("valid scenario");
    assert_eq!(scenario.expected_rows(), 11);
    assert_eq!(scenario.dependent_row_width(), 0);
    assert_eq!(scenario.central_body().name, "Earth");
}

#[test]
fn force_on_unknown_body_is_rejected() {
    let err = minimal_builder()
        .force("Jupiter", ForceKind::PointMassGravity)
        .build()
        .unwrap_err();
    match err {
        ConfigurationError::UnknownForceSource { body, .. } => assert_eq!(body, "Jupiter"),
        other => panic!("expected unknown force source, got {other:?}"),
    }
    assert!(
        minimal_builder()
            .force("Jupiter", ForceKind::PointMassGravity)
            .build()
            .unwrap_err()
            .to_string()
            .contains("Jupiter")
    );
}

#[test]
fn aerodynamic_force_requires_an_atmosphere() {
    let err = minimal_builder()
        .force("Earth", ForceKind::Aerodynamic)
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::MissingAtmosphere(name) if name == "Earth"));
}

#[test]
fn occulting_body_must_be_in_the_body_set() {
    let err = minimal_builder()
        .body(body("Sun", 1.32712440018e20))
        .force(
            "Sun",
            ForceKind::CannonballRadiationPressure {
                occulting_bodies: vec!["Moon".to_string()],
            },
        )
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::UnknownOccultingBody(name) if name == "Moon"));
}

#[test]
fn acceleration_norm_output_must_match_a_configured_force() {
    let err = minimal_builder()
        .output(DependentVariable::AccelerationNorm {
            force: ForceTag::Aerodynamic,
            source: "Earth".to_string(),
        })
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::UnmatchedAccelerationNorm { .. }
    ));
}

#[test]
fn non_positive_step_is_rejected() {
    let err = minimal_builder().runge_kutta_4(0.0).build().unwrap_err();
    assert!(matches!(err, ConfigurationError::NonPositiveStep(_)));
}

#[test]
fn empty_window_is_rejected() {
    let err = minimal_builder().window(100.0, 100.0).build().unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::EmptyPropagationWindow { .. }
    ));
}

#[test]
fn duplicate_bodies_are_rejected() {
    let err = minimal_builder()
        .body(body("Earth", 3.986004418e14))
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::DuplicateBody(name) if name == "Earth"));
}

#[test]
fn benchmark_scenario_matches_declared_layout() {
    let bodies = load_bodies("configs/bodies.yaml").expect("bodies yaml");
    let vehicles = load_vehicles("configs/vehicles.yaml").expect("vehicles yaml");
    let scenario = perturbed_leo(bodies, &vehicles[0]).expect("benchmark scenario");

    assert_eq!(scenario.expected_rows(), 8641);
    assert_eq!(scenario.dependent_row_width(), 18);
    assert_eq!(scenario.outputs().len(), benchmark_outputs().len());

    let labels = scenario.dependent_column_labels();
    assert_eq!(labels.len(), 18);
    assert_eq!(labels[0], "total_accel_x");
    assert_eq!(labels[3], "sma_m");
    assert_eq!(labels[9], "latitude_rad");
    assert_eq!(labels[10], "longitude_rad");
    assert_eq!(labels[11], "accel_norm_pm_sun");
    assert_eq!(labels[17], "accel_norm_rp_sun");

    // The initial orbit converts once into a bound Cartesian state.
    let state = scenario.initial_cartesian_state().expect("initial state");
    assert!(state.iter().all(|v| v.is_finite()));
}

#[test]
fn manifest_resolves_to_the_same_scenario_shape() {
    let bodies = load_bodies("configs/bodies.yaml").expect("bodies yaml");
    let vehicles = load_vehicles("configs/vehicles.yaml").expect("vehicles yaml");
    let manifest = load_scenario("configs/scenario.yaml").expect("scenario yaml");

    let from_manifest =
        Scenario::from_config(&manifest, &bodies, &vehicles).expect("manifest scenario");
    let built_in = perturbed_leo(bodies.clone(), &vehicles[0]).expect("benchmark scenario");

    assert_eq!(from_manifest.expected_rows(), built_in.expected_rows());
    assert_eq!(
        from_manifest.dependent_column_labels(),
        built_in.dependent_column_labels()
    );
    assert_eq!(from_manifest.forces().len(), built_in.forces().len());
}

#[test]
fn manifest_with_unknown_vehicle_is_rejected() {
    let bodies = load_bodies("configs/bodies.yaml").expect("bodies yaml");
    let vehicles = load_vehicles("configs/vehicles.yaml").expect("vehicles yaml");
    let mut manifest = load_scenario("configs/scenario.yaml").expect("scenario yaml");
    manifest.vehicle = "Nonexistent-9".to_string();

    let err = Scenario::from_config(&manifest, &bodies, &vehicles).unwrap_err();
    assert!(matches!(err, ConfigurationError::UnknownVehicle(name) if name == "Nonexistent-9"));
}
