//! Built-in fixed-step RK4 engine.
//!
//! A deliberately small stand-in for an external propagation library: the
//! classic fourth-order Runge-Kutta scheme over the simplified force models
//! in [`crate::forces`], sampling dependent variables at every accepted
//! epoch. Good enough to exercise the whole pipeline and its contracts;
//! not a replacement for a real dynamics engine.

use std::f64::consts::{PI, TAU};

use orbit_config::BodyConfig;
use orbit_core::vector::{self, State6, Vector3};
use orbit_elements::cartesian_to_keplerian;
use orbit_scenario::{DependentVariable, ForceKind, ForceModel, Scenario};

use crate::ephemeris::{BodyStateProvider, CircularEphemeris};
use crate::{EngineError, PropagationEngine, PropagationOutput, forces};

/// The built-in engine. Stateless; all inputs come from the scenario.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceEngine;

impl ReferenceEngine {
    pub fn new() -> Self {
        ReferenceEngine
    }
}

impl PropagationEngine for ReferenceEngine {
    fn name(&self) -> &str {
        "reference-rk4"
    }

    fn propagate(&self, scenario: &Scenario) -> Result<PropagationOutput, EngineError> {
        let ephemeris = CircularEphemeris::for_scenario(scenario);
        let initial: State6 = scenario.initial_cartesian_state()?;

        let start = scenario.start_epoch_s();
        let step = scenario.integrator().step_s();
        let steps = ((scenario.end_epoch_s() - start) / step).floor() as usize;

        let mut state_history = Vec::with_capacity(steps + 1);
        let mut dependent_history = Vec::with_capacity(steps + 1);

        let mut state = initial;
        for i in 0..=steps {
            let epoch = start + i as f64 * step;

            let contributions = force_accelerations(scenario, &ephemeris, epoch, &state)?;
            state_history.push((epoch, state));
            dependent_history.push((
                epoch,
                evaluate_outputs(scenario, &ephemeris, epoch, &state, &contributions)?,
            ));

            if i < steps {
                state = rk4_step(scenario, &ephemeris, epoch, &state, step)?;
                if state.iter().any(|component| !component.is_finite()) {
                    return Err(EngineError::Diverged {
                        epoch_s: epoch + step,
                    });
                }
            }
        }

        Ok(PropagationOutput {
            state_history,
            dependent_history,
        })
    }
}

/// Acceleration contributed by each configured force model, in declaration
/// order, at the given epoch and state.
fn force_accelerations(
    scenario: &Scenario,
    ephemeris: &dyn BodyStateProvider,
    epoch_s: f64,
    state: &State6,
) -> Result<Vec<Vector3>, EngineError> {
    let r = vector::position(state);
    let v = vector::velocity(state);
    let central = scenario.central_body();
    let vehicle = scenario.vehicle();

    scenario
        .forces()
        .iter()
        .map(|force| {
            let source = source_body(scenario, force);
            match &force.kind {
                ForceKind::PointMassGravity => {
                    if source.name == central.name {
                        Ok(forces::central_gravity(source.mu_m3_s2, &r))
                    } else {
                        let body = ephemeris.body_state(&source.name, epoch_s)?;
                        Ok(forces::third_body_gravity(
                            source.mu_m3_s2,
                            &r,
                            &body.position_m,
                        ))
                    }
                }
                ForceKind::SphericalHarmonicGravity { .. } => {
                    let field = source.gravity_field.as_ref().ok_or_else(|| {
                        EngineError::MissingReferenceData {
                            body: source.name.clone(),
                            detail: "no gravity-field entry in the body catalog".to_string(),
                        }
                    })?;
                    Ok(forces::zonal_harmonic_gravity(source.mu_m3_s2, field, &r))
                }
                ForceKind::Aerodynamic => {
                    let atmosphere = source
                        .atmosphere
                        .as_ref()
                        .expect("aerodynamic source validated to carry an atmosphere");
                    Ok(forces::aerodynamic_drag(source, atmosphere, vehicle, &r, &v))
                }
                ForceKind::CannonballRadiationPressure { occulting_bodies } => {
                    let sun = ephemeris.body_state(&source.name, epoch_s)?;
                    let mut shadow = 1.0;
                    for name in occulting_bodies {
                        let occluder = scenario
                            .body(name)
                            .expect("occulting body validated at build time");
                        let position = ephemeris.body_state(name, epoch_s)?.position_m;
                        shadow *= forces::shadow_factor(
                            &r,
                            &sun.position_m,
                            &position,
                            occluder.radius_m,
                        );
                    }
                    Ok(forces::cannonball_radiation_pressure(
                        vehicle,
                        &r,
                        &sun.position_m,
                        shadow,
                    ))
                }
            }
        })
        .collect()
}

fn source_body<'a>(scenario: &'a Scenario, force: &ForceModel) -> &'a BodyConfig {
    scenario
        .body(&force.source)
        .expect("force source validated at build time")
}

/// Net acceleration at the given epoch and state.
fn total_acceleration(
    scenario: &Scenario,
    ephemeris: &dyn BodyStateProvider,
    epoch_s: f64,
    state: &State6,
) -> Result<Vector3, EngineError> {
    let contributions = force_accelerations(scenario, ephemeris, epoch_s, state)?;
    Ok(contributions
        .iter()
        .fold([0.0, 0.0, 0.0], |acc, a| vector::add(&acc, a)))
}

/// One classic RK4 step of the translational equations of motion.
fn rk4_step(
    scenario: &Scenario,
    ephemeris: &dyn BodyStateProvider,
    epoch_s: f64,
    state: &State6,
    step_s: f64,
) -> Result<State6, EngineError> {
    let derivative = |t: f64, y: &State6| -> Result<State6, EngineError> {
        let a = total_acceleration(scenario, ephemeris, t, y)?;
        Ok([y[3], y[4], y[5], a[0], a[1], a[2]])
    };
    let advance = |y: &State6, k: &State6, factor: f64| -> State6 {
        let mut out = *y;
        for (value, slope) in out.iter_mut().zip(k) {
            *value += factor * slope;
        }
        out
    };

    let half = 0.5 * step_s;
    let k1 = derivative(epoch_s, state)?;
    let k2 = derivative(epoch_s + half, &advance(state, &k1, half))?;
    let k3 = derivative(epoch_s + half, &advance(state, &k2, half))?;
    let k4 = derivative(epoch_s + step_s, &advance(state, &k3, step_s))?;

    let mut next = *state;
    for i in 0..6 {
        next[i] += step_s / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
    }
    Ok(next)
}

/// Sample the scenario's dependent variables, in declaration order.
fn evaluate_outputs(
    scenario: &Scenario,
    ephemeris: &dyn BodyStateProvider,
    epoch_s: f64,
    state: &State6,
    contributions: &[Vector3],
) -> Result<Vec<f64>, EngineError> {
    let mut row = Vec::with_capacity(scenario.dependent_row_width());

    for output in scenario.outputs() {
        match output {
            DependentVariable::TotalAcceleration => {
                let total = contributions
                    .iter()
                    .fold([0.0, 0.0, 0.0], |acc, a| vector::add(&acc, a));
                row.extend_from_slice(&total);
            }
            DependentVariable::KeplerianState { relative_to } => {
                let body = scenario
                    .body(relative_to)
                    .expect("output body validated at build time");
                let relative = relative_state(scenario, ephemeris, epoch_s, state, relative_to)?;
                let elements =
                    cartesian_to_keplerian(&relative, body.mu_m3_s2).map_err(|cause| {
                        EngineError::DependentVariable {
                            epoch_s,
                            detail: cause.to_string(),
                        }
                    })?;
                row.extend_from_slice(&elements.as_array());
            }
            DependentVariable::Latitude { relative_to } => {
                let relative = relative_state(scenario, ephemeris, epoch_s, state, relative_to)?;
                let position = vector::position(&relative);
                let radius = vector::norm(&position);
                row.push((position[2] / radius).clamp(-1.0, 1.0).asin());
            }
            DependentVariable::Longitude { relative_to } => {
                let body = scenario
                    .body(relative_to)
                    .expect("output body validated at build time");
                let relative = relative_state(scenario, ephemeris, epoch_s, state, relative_to)?;
                let rotation = body.rotation_rate_rad_s.unwrap_or(0.0);
                let inertial = relative[1].atan2(relative[0]);
                row.push(wrap_longitude(inertial - rotation * epoch_s));
            }
            DependentVariable::AccelerationNorm { force, source } => {
                let index = scenario
                    .forces()
                    .iter()
                    .position(|f| f.kind.tag() == *force && &f.source == source)
                    .expect("acceleration-norm output validated at build time");
                row.push(vector::norm(&contributions[index]));
            }
        }
    }
    Ok(row)
}

/// Vehicle state relative to the named body.
fn relative_state(
    scenario: &Scenario,
    ephemeris: &dyn BodyStateProvider,
    epoch_s: f64,
    state: &State6,
    body: &str,
) -> Result<State6, EngineError> {
    if body == scenario.frame().origin {
        return Ok(*state);
    }
    let reference = ephemeris.body_state(body, epoch_s)?;
    Ok([
        state[0] - reference.position_m[0],
        state[1] - reference.position_m[1],
        state[2] - reference.position_m[2],
        state[3] - reference.velocity_m_s[0],
        state[4] - reference.velocity_m_s[1],
        state[5] - reference.velocity_m_s[2],
    ])
}

/// Wrap a longitude into (-π, π].
fn wrap_longitude(angle_rad: f64) -> f64 {
    let wrapped = angle_rad.rem_euclid(TAU);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}
