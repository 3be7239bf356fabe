//! Reference-body state provider for the built-in engine.
//!
//! Bodies move on the coarse circular paths declared in their catalog
//! entries. That is nowhere near ephemeris-grade, but third-body terms on a
//! one-day low-orbit run are tiny and a real engine brings its own source;
//! this keeps the built-in engine self-contained.

use std::collections::HashMap;

use orbit_config::EphemerisConfig;
use orbit_core::vector::Vector3;
use orbit_scenario::Scenario;

use crate::EngineError;

/// Position and velocity of a body relative to the frame origin.
#[derive(Debug, Clone, Copy)]
pub struct BodyState {
    pub position_m: Vector3,
    pub velocity_m_s: Vector3,
}

/// Where each scenario body sits at a given epoch.
pub trait BodyStateProvider {
    fn body_state(&self, body: &str, epoch_s: f64) -> Result<BodyState, EngineError>;
}

/// Circular-path provider assembled from the scenario's body catalog.
/// The frame-origin body is pinned at the origin.
#[derive(Debug, Clone)]
pub struct CircularEphemeris {
    origin: String,
    paths: HashMap<String, EphemerisConfig>,
}

impl CircularEphemeris {
    /// Collect the circular paths of every scenario body that declares one.
    pub fn for_scenario(scenario: &Scenario) -> Self {
        let paths = scenario
            .bodies()
            .iter()
            .filter_map(|body| {
                body.ephemeris
                    .clone()
                    .map(|path| (body.name.clone(), path))
            })
            .collect();
        CircularEphemeris {
            origin: scenario.frame().origin.clone(),
            paths,
        }
    }
}

impl BodyStateProvider for CircularEphemeris {
    fn body_state(&self, body: &str, epoch_s: f64) -> Result<BodyState, EngineError> {
        if body == self.origin {
            return Ok(BodyState {
                position_m: [0.0, 0.0, 0.0],
                velocity_m_s: [0.0, 0.0, 0.0],
            });
        }
        let path = self
            .paths
            .get(body)
            .ok_or_else(|| EngineError::MissingReferenceData {
                body: body.to_string(),
                detail: "no ephemeris entry in the body catalog".to_string(),
            })?;

        let angle = path.initial_phase_rad + path.angular_rate_rad_s * epoch_s;
        let (sin_a, cos_a) = angle.sin_cos();
        let speed = path.distance_m * path.angular_rate_rad_s;
        Ok(BodyState {
            position_m: [path.distance_m * cos_a, path.distance_m * sin_a, 0.0],
            velocity_m_s: [-speed * sin_a, speed * cos_a, 0.0],
        })
    }
}
