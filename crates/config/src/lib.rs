//! Configuration models and loaders for the orbit_bench workspace.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Celestial-body configuration parsed from catalog manifests.
///
/// The optional blocks describe reference data the built-in engine can use;
/// an external engine is free to ignore them and consult its own sources.
#[derive(Debug, Deserialize, Clone)]
pub struct BodyConfig {
    pub name: String,
    pub mu_m3_s2: f64,
    pub radius_m: f64,
    #[serde(default)]
    pub rotation_rate_rad_s: Option<f64>,
    #[serde(default)]
    pub atmosphere: Option<AtmosphereConfig>,
    #[serde(default)]
    pub gravity_field: Option<GravityFieldConfig>,
    #[serde(default)]
    pub ephemeris: Option<EphemerisConfig>,
}

/// Exponential-atmosphere metadata for aerodynamic force models, anchored
/// at a reference altitude so the profile stays meaningful at orbital
/// heights.
#[derive(Debug, Deserialize, Clone)]
pub struct AtmosphereConfig {
    pub reference_altitude_m: f64,
    pub reference_density_kg_m3: f64,
    pub scale_height_m: f64,
}

/// Non-spherical gravity metadata: the dominant zonal coefficient and the
/// reference radius it was normalised against.
#[derive(Debug, Deserialize, Clone)]
pub struct GravityFieldConfig {
    pub reference_radius_m: f64,
    pub j2: f64,
}

/// Coarse circular path of a body around the frame origin, used by the
/// built-in engine as its reference-body state source.
#[derive(Debug, Deserialize, Clone)]
pub struct EphemerisConfig {
    pub distance_m: f64,
    pub angular_rate_rad_s: f64,
    #[serde(default)]
    pub initial_phase_rad: f64,
}

/// Vehicle configuration parsed from catalog manifests.
#[derive(Debug, Deserialize, Clone)]
pub struct VehicleConfig {
    pub name: String,
    pub mass_kg: f64,
    pub drag_coefficient: f64,
    pub drag_reference_area_m2: f64,
    pub radiation_pressure_coefficient: f64,
    pub radiation_reference_area_m2: f64,
}

/// Force-model entry in a scenario manifest.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type")]
pub enum ForceConfig {
    #[serde(rename = "point_mass_gravity")]
    PointMassGravity { source: String },
    #[serde(rename = "spherical_harmonic_gravity")]
    SphericalHarmonicGravity {
        source: String,
        degree: u32,
        order: u32,
    },
    #[serde(rename = "aerodynamic")]
    Aerodynamic { source: String },
    #[serde(rename = "cannonball_radiation_pressure")]
    CannonballRadiationPressure {
        source: String,
        occulting_bodies: Vec<String>,
    },
}

/// Dependent-variable entry in a scenario manifest, in declaration order.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "kind")]
pub enum OutputConfig {
    #[serde(rename = "total_acceleration")]
    TotalAcceleration,
    #[serde(rename = "keplerian_state")]
    KeplerianState { relative_to: String },
    #[serde(rename = "latitude")]
    Latitude { relative_to: String },
    #[serde(rename = "longitude")]
    Longitude { relative_to: String },
    #[serde(rename = "acceleration_norm")]
    AccelerationNorm { force: String, source: String },
}

/// Reference frame block of a scenario manifest.
#[derive(Debug, Deserialize, Clone)]
pub struct FrameConfig {
    pub origin: String,
    pub orientation: String,
}

/// Initial orbit block of a scenario manifest. Angles are authored in
/// degrees; the scenario layer converts to radians.
#[derive(Debug, Deserialize, Clone)]
pub struct InitialElementsConfig {
    pub semi_major_axis_m: f64,
    pub eccentricity: f64,
    pub inclination_deg: f64,
    pub argument_of_periapsis_deg: f64,
    pub raan_deg: f64,
    pub true_anomaly_deg: f64,
}

/// A full scenario manifest: bodies, vehicle, forces, initial orbit,
/// integration window, and requested outputs.
#[derive(Debug, Deserialize, Clone)]
pub struct ScenarioConfig {
    pub name: String,
    pub frame: FrameConfig,
    pub bodies: Vec<String>,
    pub central_body: String,
    pub vehicle: String,
    pub start_epoch_s: f64,
    pub end_epoch_s: f64,
    pub step_s: f64,
    pub initial_elements: InitialElementsConfig,
    pub forces: Vec<ForceConfig>,
    pub outputs: Vec<OutputConfig>,
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse YAML {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to parse TOML {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Load body configurations from a YAML file, a TOML file, or a directory of
/// TOML records.
pub fn load_bodies<P: AsRef<Path>>(path: P) -> Result<Vec<BodyConfig>, ConfigError> {
    load_records(path)
}

/// Load vehicle configurations from a YAML file, a TOML file, or a directory
/// of TOML records.
pub fn load_vehicles<P: AsRef<Path>>(path: P) -> Result<Vec<VehicleConfig>, ConfigError> {
    load_records(path)
}

/// Load a single scenario manifest (YAML or TOML).
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<ScenarioConfig, ConfigError> {
    let path = path.as_ref();
    if is_toml(path) {
        let contents = read_to_string(path)?;
        toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    } else {
        let reader = open(path)?;
        serde_yaml::from_reader(reader).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if is_toml(path) {
        let contents = read_to_string(path)?;
        let record: T = toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(vec![record])
    } else {
        let reader = open(path)?;
        serde_yaml::from_reader(reader).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path))
        .collect();
    entries.sort();
    for path in entries {
        let contents = read_to_string(&path)?;
        let record: T = toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.clone(),
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}

fn open(path: &Path) -> Result<File, ConfigError> {
    File::open(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_to_string(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
