//! Immutable simulation-scenario values and their validating builder.
//!
//! A [`Scenario`] is assembled once, checked for internal consistency at
//! build time, and then passed by reference to whichever propagation engine
//! runs it. Nothing in it is mutated afterwards, so repeated runs in one
//! process cannot leak state into each other.

use orbit_config::{BodyConfig, ForceConfig, OutputConfig, ScenarioConfig, VehicleConfig};
use orbit_core::units::deg_to_rad;
use orbit_core::vector::State6;
use orbit_elements::{ElementsError, KeplerianElements, keplerian_to_cartesian};
use thiserror::Error;

pub mod benchmark;

/// Reference frame the propagation is expressed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSpec {
    pub origin: String,
    pub orientation: String,
}

/// Vehicle with its two dimensionless interface coefficients and the
/// reference areas they apply to.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub name: String,
    pub mass_kg: f64,
    pub drag_coefficient: f64,
    pub drag_reference_area_m2: f64,
    pub radiation_pressure_coefficient: f64,
    pub radiation_reference_area_m2: f64,
}

impl From<&VehicleConfig> for Vehicle {
    fn from(config: &VehicleConfig) -> Self {
        Vehicle {
            name: config.name.clone(),
            mass_kg: config.mass_kg,
            drag_coefficient: config.drag_coefficient,
            drag_reference_area_m2: config.drag_reference_area_m2,
            radiation_pressure_coefficient: config.radiation_pressure_coefficient,
            radiation_reference_area_m2: config.radiation_reference_area_m2,
        }
    }
}

/// One force model acting on the vehicle, attributed to a source body.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceModel {
    pub source: String,
    pub kind: ForceKind,
}

/// The force-model families a scenario can request.
#[derive(Debug, Clone, PartialEq)]
pub enum ForceKind {
    PointMassGravity,
    SphericalHarmonicGravity { degree: u32, order: u32 },
    Aerodynamic,
    CannonballRadiationPressure { occulting_bodies: Vec<String> },
}

impl ForceKind {
    /// Tag identifying the family regardless of its parameters.
    pub fn tag(&self) -> ForceTag {
        match self {
            ForceKind::PointMassGravity => ForceTag::PointMassGravity,
            ForceKind::SphericalHarmonicGravity { .. } => ForceTag::SphericalHarmonicGravity,
            ForceKind::Aerodynamic => ForceTag::Aerodynamic,
            ForceKind::CannonballRadiationPressure { .. } => ForceTag::CannonballRadiationPressure,
        }
    }
}

/// Force-model family tag, used to address a single configured force.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceTag {
    PointMassGravity,
    SphericalHarmonicGravity,
    Aerodynamic,
    CannonballRadiationPressure,
}

impl ForceTag {
    /// Short lowercase slug used in column labels.
    pub fn slug(&self) -> &'static str {
        match self {
            ForceTag::PointMassGravity => "pm",
            ForceTag::SphericalHarmonicGravity => "sh",
            ForceTag::Aerodynamic => "aero",
            ForceTag::CannonballRadiationPressure => "rp",
        }
    }

    fn parse(name: &str) -> Option<ForceTag> {
        match name {
            "point_mass_gravity" => Some(ForceTag::PointMassGravity),
            "spherical_harmonic_gravity" => Some(ForceTag::SphericalHarmonicGravity),
            "aerodynamic" => Some(ForceTag::Aerodynamic),
            "cannonball_radiation_pressure" => Some(ForceTag::CannonballRadiationPressure),
            _ => None,
        }
    }
}

/// Integrator selection. Fixed-step explicit schemes only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntegratorSettings {
    RungeKutta4 { step_s: f64 },
}

impl IntegratorSettings {
    /// Fixed step size in seconds.
    pub fn step_s(&self) -> f64 {
        match self {
            IntegratorSettings::RungeKutta4 { step_s } => *step_s,
        }
    }
}

/// A derived quantity sampled alongside the state at every integrator step.
#[derive(Debug, Clone, PartialEq)]
pub enum DependentVariable {
    TotalAcceleration,
    KeplerianState { relative_to: String },
    Latitude { relative_to: String },
    Longitude { relative_to: String },
    AccelerationNorm { force: ForceTag, source: String },
}

impl DependentVariable {
    /// Number of scalar columns the variable occupies in the output table.
    pub fn scalar_width(&self) -> usize {
        match self {
            DependentVariable::TotalAcceleration => 3,
            DependentVariable::KeplerianState { .. } => 6,
            DependentVariable::Latitude { .. } => 1,
            DependentVariable::Longitude { .. } => 1,
            DependentVariable::AccelerationNorm { .. } => 1,
        }
    }

    /// Column labels contributed by the variable, in order.
    pub fn column_labels(&self) -> Vec<String> {
        match self {
            DependentVariable::TotalAcceleration => vec![
                "total_accel_x".to_string(),
                "total_accel_y".to_string(),
                "total_accel_z".to_string(),
            ],
            DependentVariable::KeplerianState { .. } => vec![
                "sma_m".to_string(),
                "ecc".to_string(),
                "inc_rad".to_string(),
                "argp_rad".to_string(),
                "raan_rad".to_string(),
                "true_anomaly_rad".to_string(),
            ],
            DependentVariable::Latitude { .. } => vec!["latitude_rad".to_string()],
            DependentVariable::Longitude { .. } => vec!["longitude_rad".to_string()],
            DependentVariable::AccelerationNorm { force, source } => {
                vec![format!(
                    "accel_norm_{}_{}",
                    force.slug(),
                    source.to_ascii_lowercase()
                )]
            }
        }
    }
}

/// Fully validated, immutable description of one propagation run.
#[derive(Debug, Clone)]
pub struct Scenario {
    name: String,
    frame: FrameSpec,
    bodies: Vec<BodyConfig>,
    central_body: String,
    vehicle: Vehicle,
    forces: Vec<ForceModel>,
    initial_elements: KeplerianElements,
    start_epoch_s: f64,
    end_epoch_s: f64,
    integrator: IntegratorSettings,
    outputs: Vec<DependentVariable>,
}

/// Errors raised when a scenario is internally inconsistent. Detected
/// eagerly at build time; each variant names the offending entity.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("scenario declares no celestial bodies")]
    EmptyBodySet,
    #[error("body `{0}` appears more than once in the body set")]
    DuplicateBody(String),
    #[error("central body `{0}` is not in the body set")]
    UnknownCentralBody(String),
    #[error("frame origin `{0}` is not in the body set")]
    UnknownFrameOrigin(String),
    #[error("force model `{force}` references body `{body}`, which is not in the body set")]
    UnknownForceSource { force: &'static str, body: String },
    #[error("aerodynamic force on `{0}` requires an atmosphere, but the body declares none")]
    MissingAtmosphere(String),
    #[error("occulting body `{0}` is not in the body set")]
    UnknownOccultingBody(String),
    #[error("dependent variable references body `{0}`, which is not in the body set")]
    UnknownOutputBody(String),
    #[error("dependent variable requests `{force}` acceleration from `{body}`, but no such force model is configured")]
    UnmatchedAccelerationNorm { force: &'static str, body: String },
    #[error("unknown force family `{0}` in scenario manifest")]
    UnknownForceFamily(String),
    #[error("vehicle `{0}` not found in the vehicle catalog")]
    UnknownVehicle(String),
    #[error("body `{0}` not found in the body catalog")]
    UnknownCatalogBody(String),
    #[error("scenario declares no vehicle")]
    MissingVehicle,
    #[error("scenario declares no initial orbit")]
    MissingInitialOrbit,
    #[error("vehicle mass must be positive, got {0} kg")]
    NonPositiveMass(f64),
    #[error("integrator step must be positive, got {0} s")]
    NonPositiveStep(f64),
    #[error("termination epoch {end_s} s does not lie after the start epoch {start_s} s")]
    EmptyPropagationWindow { start_s: f64, end_s: f64 },
    #[error("initial orbit is invalid: {0}")]
    InvalidInitialOrbit(#[from] ElementsError),
}

impl Scenario {
    /// Start assembling a scenario.
    pub fn builder(name: impl Into<String>) -> ScenarioBuilder {
        ScenarioBuilder::new(name)
    }

    /// Resolve a scenario manifest against the body and vehicle catalogs.
    pub fn from_config(
        config: &ScenarioConfig,
        body_catalog: &[BodyConfig],
        vehicle_catalog: &[VehicleConfig],
    ) -> Result<Scenario, ConfigurationError> {
        let vehicle = vehicle_catalog
            .iter()
            .find(|v| v.name == config.vehicle)
            .ok_or_else(|| ConfigurationError::UnknownVehicle(config.vehicle.clone()))?;

        let mut builder = Scenario::builder(&config.name)
            .frame(&config.frame.origin, &config.frame.orientation)
            .central_body(&config.central_body)
            .vehicle(Vehicle::from(vehicle))
            .initial_elements(KeplerianElements {
                semi_major_axis_m: config.initial_elements.semi_major_axis_m,
                eccentricity: config.initial_elements.eccentricity,
                inclination_rad: deg_to_rad(config.initial_elements.inclination_deg),
                argument_of_periapsis_rad: deg_to_rad(
                    config.initial_elements.argument_of_periapsis_deg,
                ),
                raan_rad: deg_to_rad(config.initial_elements.raan_deg),
                true_anomaly_rad: deg_to_rad(config.initial_elements.true_anomaly_deg),
            })
            .window(config.start_epoch_s, config.end_epoch_s)
            .runge_kutta_4(config.step_s);

        for name in &config.bodies {
            let body = body_catalog
                .iter()
                .find(|b| &b.name == name)
                .ok_or_else(|| ConfigurationError::UnknownCatalogBody(name.clone()))?;
            builder = builder.body(body.clone());
        }

        for force in &config.forces {
            builder = match force {
                ForceConfig::PointMassGravity { source } => {
                    builder.force(source, ForceKind::PointMassGravity)
                }
                ForceConfig::SphericalHarmonicGravity {
                    source,
                    degree,
                    order,
                } => builder.force(
                    source,
                    ForceKind::SphericalHarmonicGravity {
                        degree: *degree,
                        order: *order,
                    },
                ),
                ForceConfig::Aerodynamic { source } => builder.force(source, ForceKind::Aerodynamic),
                ForceConfig::CannonballRadiationPressure {
                    source,
                    occulting_bodies,
                } => builder.force(
                    source,
                    ForceKind::CannonballRadiationPressure {
                        occulting_bodies: occulting_bodies.clone(),
                    },
                ),
            };
        }

        for output in &config.outputs {
            let variable = match output {
                OutputConfig::TotalAcceleration => DependentVariable::TotalAcceleration,
                OutputConfig::KeplerianState { relative_to } => DependentVariable::KeplerianState {
                    relative_to: relative_to.clone(),
                },
                OutputConfig::Latitude { relative_to } => DependentVariable::Latitude {
                    relative_to: relative_to.clone(),
                },
                OutputConfig::Longitude { relative_to } => DependentVariable::Longitude {
                    relative_to: relative_to.clone(),
                },
                OutputConfig::AccelerationNorm { force, source } => {
                    let tag = ForceTag::parse(force)
                        .ok_or_else(|| ConfigurationError::UnknownForceFamily(force.clone()))?;
                    DependentVariable::AccelerationNorm {
                        force: tag,
                        source: source.clone(),
                    }
                }
            };
            builder = builder.output(variable);
        }

        builder.build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame(&self) -> &FrameSpec {
        &self.frame
    }

    pub fn bodies(&self) -> &[BodyConfig] {
        &self.bodies
    }

    /// Look a body up by name.
    pub fn body(&self, name: &str) -> Option<&BodyConfig> {
        self.bodies.iter().find(|b| b.name == name)
    }

    pub fn central_body(&self) -> &BodyConfig {
        self.body(&self.central_body)
            .expect("central body validated at build time")
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn forces(&self) -> &[ForceModel] {
        &self.forces
    }

    pub fn initial_elements(&self) -> &KeplerianElements {
        &self.initial_elements
    }

    pub fn start_epoch_s(&self) -> f64 {
        self.start_epoch_s
    }

    pub fn end_epoch_s(&self) -> f64 {
        self.end_epoch_s
    }

    pub fn integrator(&self) -> IntegratorSettings {
        self.integrator
    }

    pub fn outputs(&self) -> &[DependentVariable] {
        &self.outputs
    }

    /// The initial Cartesian state consumed by the propagator, converted
    /// once from the authored Keplerian elements.
    pub fn initial_cartesian_state(&self) -> Result<State6, ConfigurationError> {
        Ok(keplerian_to_cartesian(
            &self.initial_elements,
            self.central_body().mu_m3_s2,
        )?)
    }

    /// Number of samples a fixed-step run produces: one per completed step,
    /// plus the initial condition.
    pub fn expected_rows(&self) -> usize {
        let span = self.end_epoch_s - self.start_epoch_s;
        (span / self.integrator.step_s()).floor() as usize + 1
    }

    /// Scalar width of one dependent-variable row.
    pub fn dependent_row_width(&self) -> usize {
        self.outputs.iter().map(|o| o.scalar_width()).sum()
    }

    /// Column labels of the dependent-variable table, in declaration order.
    pub fn dependent_column_labels(&self) -> Vec<String> {
        self.outputs
            .iter()
            .flat_map(|o| o.column_labels())
            .collect()
    }
}

/// Builder collecting scenario parts before the consistency checks run.
#[derive(Debug, Default)]
pub struct ScenarioBuilder {
    name: String,
    frame: Option<FrameSpec>,
    bodies: Vec<BodyConfig>,
    central_body: String,
    vehicle: Option<Vehicle>,
    forces: Vec<ForceModel>,
    initial_elements: Option<KeplerianElements>,
    start_epoch_s: f64,
    end_epoch_s: f64,
    step_s: f64,
    outputs: Vec<DependentVariable>,
}

impl ScenarioBuilder {
    fn new(name: impl Into<String>) -> Self {
        ScenarioBuilder {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the frame origin and orientation.
    pub fn frame(mut self, origin: &str, orientation: &str) -> Self {
        self.frame = Some(FrameSpec {
            origin: origin.to_string(),
            orientation: orientation.to_string(),
        });
        self
    }

    /// Add a celestial body to the environment.
    pub fn body(mut self, body: BodyConfig) -> Self {
        self.bodies.push(body);
        self
    }

    /// Name the body the propagated state is expressed around.
    pub fn central_body(mut self, name: &str) -> Self {
        self.central_body = name.to_string();
        self
    }

    /// Set the propagated vehicle.
    pub fn vehicle(mut self, vehicle: Vehicle) -> Self {
        self.vehicle = Some(vehicle);
        self
    }

    /// Append a force model acting on the vehicle.
    pub fn force(mut self, source: &str, kind: ForceKind) -> Self {
        self.forces.push(ForceModel {
            source: source.to_string(),
            kind,
        });
        self
    }

    /// Set the initial orbit.
    pub fn initial_elements(mut self, elements: KeplerianElements) -> Self {
        self.initial_elements = Some(elements);
        self
    }

    /// Set the propagation window in seconds since the reference epoch.
    pub fn window(mut self, start_epoch_s: f64, end_epoch_s: f64) -> Self {
        self.start_epoch_s = start_epoch_s;
        self.end_epoch_s = end_epoch_s;
        self
    }

    /// Select the fixed-step RK4 integrator.
    pub fn runge_kutta_4(mut self, step_s: f64) -> Self {
        self.step_s = step_s;
        self
    }

    /// Append a dependent variable to sample, preserving declaration order.
    pub fn output(mut self, variable: DependentVariable) -> Self {
        self.outputs.push(variable);
        self
    }

    /// Run the consistency checks and freeze the scenario.
    pub fn build(self) -> Result<Scenario, ConfigurationError> {
        if self.bodies.is_empty() {
            return Err(ConfigurationError::EmptyBodySet);
        }
        for (i, body) in self.bodies.iter().enumerate() {
            if self.bodies[..i].iter().any(|b| b.name == body.name) {
                return Err(ConfigurationError::DuplicateBody(body.name.clone()));
            }
        }

        let known = |name: &str| self.bodies.iter().any(|b| b.name == name);

        if !known(&self.central_body) {
            return Err(ConfigurationError::UnknownCentralBody(
                self.central_body.clone(),
            ));
        }

        let frame = self.frame.unwrap_or_else(|| FrameSpec {
            origin: self.central_body.clone(),
            orientation: "J2000".to_string(),
        });
        if !known(&frame.origin) {
            return Err(ConfigurationError::UnknownFrameOrigin(frame.origin));
        }

        let vehicle = self.vehicle.ok_or(ConfigurationError::MissingVehicle)?;
        if !(vehicle.mass_kg > 0.0) {
            return Err(ConfigurationError::NonPositiveMass(vehicle.mass_kg));
        }

        for force in &self.forces {
            let family = force_family_name(force.kind.tag());
            if !known(&force.source) {
                return Err(ConfigurationError::UnknownForceSource {
                    force: family,
                    body: force.source.clone(),
                });
            }
            match &force.kind {
                ForceKind::Aerodynamic => {
                    let source = self
                        .bodies
                        .iter()
                        .find(|b| b.name == force.source)
                        .expect("source known");
                    if source.atmosphere.is_none() {
                        return Err(ConfigurationError::MissingAtmosphere(force.source.clone()));
                    }
                }
                ForceKind::CannonballRadiationPressure { occulting_bodies } => {
                    for occulting in occulting_bodies {
                        if !known(occulting) {
                            return Err(ConfigurationError::UnknownOccultingBody(
                                occulting.clone(),
                            ));
                        }
                    }
                }
                _ => {}
            }
        }

        for output in &self.outputs {
            match output {
                DependentVariable::KeplerianState { relative_to }
                | DependentVariable::Latitude { relative_to }
                | DependentVariable::Longitude { relative_to } => {
                    if !known(relative_to) {
                        return Err(ConfigurationError::UnknownOutputBody(relative_to.clone()));
                    }
                }
                DependentVariable::AccelerationNorm { force, source } => {
                    let matched = self
                        .forces
                        .iter()
                        .any(|f| f.kind.tag() == *force && f.source == *source);
                    if !matched {
                        return Err(ConfigurationError::UnmatchedAccelerationNorm {
                            force: force_family_name(*force),
                            body: source.clone(),
                        });
                    }
                }
                DependentVariable::TotalAcceleration => {}
            }
        }

        if !(self.step_s > 0.0) {
            return Err(ConfigurationError::NonPositiveStep(self.step_s));
        }
        if !(self.end_epoch_s > self.start_epoch_s) {
            return Err(ConfigurationError::EmptyPropagationWindow {
                start_s: self.start_epoch_s,
                end_s: self.end_epoch_s,
            });
        }

        let initial_elements = self
            .initial_elements
            .ok_or(ConfigurationError::MissingInitialOrbit)?;
        initial_elements.validate()?;

        Ok(Scenario {
            name: self.name,
            frame,
            bodies: self.bodies,
            central_body: self.central_body,
            vehicle,
            forces: self.forces,
            initial_elements,
            start_epoch_s: self.start_epoch_s,
            end_epoch_s: self.end_epoch_s,
            integrator: IntegratorSettings::RungeKutta4 { step_s: self.step_s },
            outputs: self.outputs,
        })
    }
}

fn force_family_name(tag: ForceTag) -> &'static str {
    match tag {
        ForceTag::PointMassGravity => "point_mass_gravity",
        ForceTag::SphericalHarmonicGravity => "spherical_harmonic_gravity",
        ForceTag::Aerodynamic => "aerodynamic",
        ForceTag::CannonballRadiationPressure => "cannonball_radiation_pressure",
    }
}
