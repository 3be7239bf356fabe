//! The canned perturbed-LEO benchmark scenario.
//!
//! One Julian day of a 400 kg satellite in a mildly eccentric low orbit,
//! with every perturbation the comparison pipeline knows how to plot. Body
//! and vehicle data come from the catalogs; everything else is fixed here so
//! that independent implementations run the identical case.

use orbit_config::{BodyConfig, VehicleConfig};
use orbit_core::constants::SECONDS_PER_DAY;
use orbit_core::units::deg_to_rad;
use orbit_elements::KeplerianElements;

use crate::{
    ConfigurationError, DependentVariable, ForceKind, ForceTag, Scenario, ScenarioBuilder, Vehicle,
};

/// Fixed-step size of the benchmark run, in seconds.
pub const STEP_S: f64 = 10.0;

/// Duration of the benchmark run, in seconds.
pub const DURATION_S: f64 = SECONDS_PER_DAY;

/// Pre-populated builder for the benchmark scenario, so callers can override
/// the integration window before freezing it.
pub fn perturbed_leo_builder(bodies: Vec<BodyConfig>, vehicle: &VehicleConfig) -> ScenarioBuilder {
    let mut builder = Scenario::builder("perturbed-leo")
        .frame("Earth", "J2000")
        .central_body("Earth")
        .vehicle(Vehicle::from(vehicle))
        .initial_elements(KeplerianElements {
            semi_major_axis_m: 7_500.0e3,
            eccentricity: 0.1,
            inclination_rad: deg_to_rad(85.3),
            argument_of_periapsis_rad: deg_to_rad(235.7),
            raan_rad: deg_to_rad(23.4),
            true_anomaly_rad: deg_to_rad(139.87),
        })
        .window(0.0, DURATION_S)
        .runge_kutta_4(STEP_S)
        .force(
            "Sun",
            ForceKind::CannonballRadiationPressure {
                occulting_bodies: vec!["Earth".to_string()],
            },
        )
        .force("Sun", ForceKind::PointMassGravity)
        .force(
            "Earth",
            ForceKind::SphericalHarmonicGravity {
                degree: 5,
                order: 5,
            },
        )
        .force("Earth", ForceKind::Aerodynamic)
        .force("Moon", ForceKind::PointMassGravity)
        .force("Mars", ForceKind::PointMassGravity)
        .force("Venus", ForceKind::PointMassGravity);

    for body in bodies {
        builder = builder.body(body);
    }

    for output in benchmark_outputs() {
        builder = builder.output(output);
    }
    builder
}

/// Build the benchmark scenario as-is.
pub fn perturbed_leo(
    bodies: Vec<BodyConfig>,
    vehicle: &VehicleConfig,
) -> Result<Scenario, ConfigurationError> {
    perturbed_leo_builder(bodies, vehicle).build()
}

/// The benchmark's dependent-variable list, in declaration order. The
/// dependent table's column layout follows directly from this.
pub fn benchmark_outputs() -> Vec<DependentVariable> {
    let norm = |force, source: &str| DependentVariable::AccelerationNorm {
        force,
        source: source.to_string(),
    };
    vec![
        DependentVariable::TotalAcceleration,
        DependentVariable::KeplerianState {
            relative_to: "Earth".to_string(),
        },
        DependentVariable::Latitude {
            relative_to: "Earth".to_string(),
        },
        DependentVariable::Longitude {
            relative_to: "Earth".to_string(),
        },
        norm(ForceTag::PointMassGravity, "Sun"),
        norm(ForceTag::PointMassGravity, "Moon"),
        norm(ForceTag::PointMassGravity, "Mars"),
        norm(ForceTag::PointMassGravity, "Venus"),
        norm(ForceTag::SphericalHarmonicGravity, "Earth"),
        norm(ForceTag::Aerodynamic, "Earth"),
        norm(ForceTag::CannonballRadiationPressure, "Sun"),
    ]
}
