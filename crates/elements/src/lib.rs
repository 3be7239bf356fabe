//! Classical orbital elements and their Cartesian conversions.
//!
//! Initial conditions are authored as Keplerian elements for readability and
//! converted exactly once to the Cartesian 6-vector the propagation side
//! consumes. Both directions use the elliptical closed form, so a round trip
//! reproduces the inputs to numerical precision.

use std::f64::consts::TAU;

use orbit_core::vector::{self, State6, Vector3};
use thiserror::Error;

/// The six classical orbital elements of an elliptical orbit.
///
/// Angles are in radians; the element order matches the dependent-variable
/// layout produced by the simulation driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerianElements {
    pub semi_major_axis_m: f64,
    pub eccentricity: f64,
    pub inclination_rad: f64,
    pub argument_of_periapsis_rad: f64,
    pub raan_rad: f64,
    pub true_anomaly_rad: f64,
}

/// Errors surfaced when a conversion is handed a state outside the
/// elliptical closed form.
#[derive(Debug, Error)]
pub enum ElementsError {
    #[error("semi-major axis must be positive, got {0} m")]
    NonPositiveSemiMajorAxis(f64),
    #[error("eccentricity must lie in [0, 1) for an elliptical orbit, got {0}")]
    NonEllipticalEccentricity(f64),
    #[error("gravitational parameter must be positive, got {0} m^3/s^2")]
    NonPositiveGravitationalParameter(f64),
    #[error("state has vanishing angular momentum; the orbital plane is undefined")]
    DegenerateState,
    #[error("state is not bound to an elliptical orbit (specific energy >= 0)")]
    UnboundState,
}

impl KeplerianElements {
    /// Validate that the element set describes a closed elliptical orbit.
    pub fn validate(&self) -> Result<(), ElementsError> {
        if !(self.semi_major_axis_m > 0.0) {
            return Err(ElementsError::NonPositiveSemiMajorAxis(
                self.semi_major_axis_m,
            ));
        }
        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(ElementsError::NonEllipticalEccentricity(self.eccentricity));
        }
        Ok(())
    }

    /// Elements as an array in the canonical order
    /// `[a, e, i, argp, raan, true anomaly]`.
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.semi_major_axis_m,
            self.eccentricity,
            self.inclination_rad,
            self.argument_of_periapsis_rad,
            self.raan_rad,
            self.true_anomaly_rad,
        ]
    }
}

/// Convert Keplerian elements to a Cartesian state for a central body with
/// gravitational parameter `mu_m3_s2`.
pub fn keplerian_to_cartesian(
    elements: &KeplerianElements,
    mu_m3_s2: f64,
) -> Result<State6, ElementsError> {
    elements.validate()?;
    if !(mu_m3_s2 > 0.0) {
        return Err(ElementsError::NonPositiveGravitationalParameter(mu_m3_s2));
    }

    let a = elements.semi_major_axis_m;
    let e = elements.eccentricity;
    let nu = elements.true_anomaly_rad;

    // Perifocal position and velocity on the ellipse.
    let p = a * (1.0 - e * e);
    let r = p / (1.0 + e * nu.cos());
    let r_pf = [r * nu.cos(), r * nu.sin(), 0.0];
    let v_scale = (mu_m3_s2 / p).sqrt();
    let v_pf = [-v_scale * nu.sin(), v_scale * (e + nu.cos()), 0.0];

    let rot = perifocal_to_frame_rotation(
        elements.raan_rad,
        elements.inclination_rad,
        elements.argument_of_periapsis_rad,
    );
    Ok(vector::assemble(
        &apply_rotation(&rot, &r_pf),
        &apply_rotation(&rot, &v_pf),
    ))
}

/// Convert a Cartesian state back to Keplerian elements.
///
/// Inverse of [`keplerian_to_cartesian`] for bound elliptical states. For
/// equatorial or circular orbits the undefined node/periapsis angles collapse
/// to zero instead of erroring, mirroring the usual convention.
pub fn cartesian_to_keplerian(
    state: &State6,
    mu_m3_s2: f64,
) -> Result<KeplerianElements, ElementsError> {
    if !(mu_m3_s2 > 0.0) {
        return Err(ElementsError::NonPositiveGravitationalParameter(mu_m3_s2));
    }

    let r_vec = vector::position(state);
    let v_vec = vector::velocity(state);
    let r = vector::norm(&r_vec);
    let v = vector::norm(&v_vec);
    if r == 0.0 {
        return Err(ElementsError::DegenerateState);
    }

    let h_vec = vector::cross(&r_vec, &v_vec);
    let h = vector::norm(&h_vec);
    if h == 0.0 {
        return Err(ElementsError::DegenerateState);
    }

    let energy = 0.5 * v * v - mu_m3_s2 / r;
    if energy >= 0.0 {
        return Err(ElementsError::UnboundState);
    }
    let a = -mu_m3_s2 / (2.0 * energy);

    // Eccentricity vector points to periapsis.
    let v_cross_h = vector::cross(&v_vec, &h_vec);
    let e_vec = vector::sub(
        &vector::scale(&v_cross_h, 1.0 / mu_m3_s2),
        &vector::scale(&r_vec, 1.0 / r),
    );
    let e = vector::norm(&e_vec);

    let inclination = (h_vec[2] / h).clamp(-1.0, 1.0).acos();

    // Node vector lies along the ascending node.
    let n_vec = vector::cross(&[0.0, 0.0, 1.0], &h_vec);
    let n = vector::norm(&n_vec);

    let raan = if n > 0.0 {
        wrap_angle(n_vec[1].atan2(n_vec[0]))
    } else {
        0.0
    };

    let argp = if n > 0.0 && e > ANGLE_DEGENERACY_EPS {
        let cos_argp = (vector::dot(&n_vec, &e_vec) / (n * e)).clamp(-1.0, 1.0);
        let raw = cos_argp.acos();
        wrap_angle(if e_vec[2] < 0.0 { TAU - raw } else { raw })
    } else if e > ANGLE_DEGENERACY_EPS {
        // Equatorial: measure periapsis from the x-axis.
        let raw = e_vec[1].atan2(e_vec[0]);
        wrap_angle(if h_vec[2] < 0.0 { -raw } else { raw })
    } else {
        0.0
    };

    let true_anomaly = if e > ANGLE_DEGENERACY_EPS {
        let cos_nu = (vector::dot(&e_vec, &r_vec) / (e * r)).clamp(-1.0, 1.0);
        let raw = cos_nu.acos();
        wrap_angle(if vector::dot(&r_vec, &v_vec) < 0.0 {
            TAU - raw
        } else {
            raw
        })
    } else if n > 0.0 {
        // Circular inclined: measure from the ascending node.
        let cos_u = (vector::dot(&n_vec, &r_vec) / (n * r)).clamp(-1.0, 1.0);
        let raw = cos_u.acos();
        wrap_angle(if r_vec[2] < 0.0 { TAU - raw } else { raw })
    } else {
        // Circular equatorial: measure from the x-axis.
        wrap_angle(r_vec[1].atan2(r_vec[0]))
    };

    Ok(KeplerianElements {
        semi_major_axis_m: a,
        eccentricity: e,
        inclination_rad: inclination,
        argument_of_periapsis_rad: argp,
        raan_rad: raan,
        true_anomaly_rad: true_anomaly,
    })
}

/// Below this eccentricity the periapsis direction is numerically meaningless.
const ANGLE_DEGENERACY_EPS: f64 = 1e-11;

/// Wrap an angle into [0, 2π).
pub fn wrap_angle(angle_rad: f64) -> f64 {
    let wrapped = angle_rad.rem_euclid(TAU);
    if wrapped == TAU { 0.0 } else { wrapped }
}

type Rotation = [[f64; 3]; 3]; // row-major

fn apply_rotation(rot: &Rotation, v: &Vector3) -> Vector3 {
    [
        rot[0][0] * v[0] + rot[0][1] * v[1] + rot[0][2] * v[2],
        rot[1][0] * v[0] + rot[1][1] * v[1] + rot[1][2] * v[2],
        rot[2][0] * v[0] + rot[2][1] * v[1] + rot[2][2] * v[2],
    ]
}

/// Rotation taking perifocal coordinates into the inertial frame:
/// R3(-raan) · R1(-i) · R3(-argp).
fn perifocal_to_frame_rotation(raan: f64, inclination: f64, argp: f64) -> Rotation {
    let (sin_o, cos_o) = raan.sin_cos();
    let (sin_i, cos_i) = inclination.sin_cos();
    let (sin_w, cos_w) = argp.sin_cos();

    [
        [
            cos_o * cos_w - sin_o * sin_w * cos_i,
            -cos_o * sin_w - sin_o * cos_w * cos_i,
            sin_o * sin_i,
        ],
        [
            sin_o * cos_w + cos_o * sin_w * cos_i,
            -sin_o * sin_w + cos_o * cos_w * cos_i,
            -cos_o * sin_i,
        ],
        [sin_w * sin_i, cos_w * sin_i, cos_i],
    ]
}
