//! Simplified force models used by the built-in engine.
//!
//! Each function returns the acceleration on the vehicle in m/s². The
//! models are the textbook cannonball/exponential forms; a production
//! comparison replaces all of this with an external engine.

use orbit_config::{AtmosphereConfig, BodyConfig, GravityFieldConfig};
use orbit_core::constants::{AU_M, SOLAR_PRESSURE_AT_1AU_N_M2};
use orbit_core::vector::{self, Vector3};
use orbit_scenario::Vehicle;

/// Central-body point-mass gravity: `-mu r / |r|^3`.
pub fn central_gravity(mu_m3_s2: f64, r_m: &Vector3) -> Vector3 {
    let r = vector::norm(r_m);
    vector::scale(r_m, -mu_m3_s2 / (r * r * r))
}

/// Third-body point-mass gravity in a frame centred on the primary: direct
/// attraction minus the acceleration the third body imparts on the frame
/// origin.
pub fn third_body_gravity(mu_m3_s2: f64, r_m: &Vector3, body_position_m: &Vector3) -> Vector3 {
    let to_body = vector::sub(body_position_m, r_m);
    let d = vector::norm(&to_body);
    let s = vector::norm(body_position_m);
    let direct = vector::scale(&to_body, mu_m3_s2 / (d * d * d));
    let indirect = vector::scale(body_position_m, mu_m3_s2 / (s * s * s));
    vector::sub(&direct, &indirect)
}

/// Truncated zonal-harmonic gravity of the central body: the point-mass
/// term plus the dominant J2 oblateness contribution. Requested
/// degree/order beyond that are not evaluated by the built-in engine.
pub fn zonal_harmonic_gravity(
    mu_m3_s2: f64,
    field: &GravityFieldConfig,
    r_m: &Vector3,
) -> Vector3 {
    let r = vector::norm(r_m);
    let mut accel = central_gravity(mu_m3_s2, r_m);

    let z_over_r = r_m[2] / r;
    let z2 = z_over_r * z_over_r;
    let factor =
        -1.5 * field.j2 * mu_m3_s2 * field.reference_radius_m * field.reference_radius_m
            / (r * r * r * r * r);
    let oblateness = [
        factor * r_m[0] * (1.0 - 5.0 * z2),
        factor * r_m[1] * (1.0 - 5.0 * z2),
        factor * r_m[2] * (3.0 - 5.0 * z2),
    ];
    accel = vector::add(&accel, &oblateness);
    accel
}

/// Aerodynamic drag in an exponential, co-rotating atmosphere.
pub fn aerodynamic_drag(
    body: &BodyConfig,
    atmosphere: &AtmosphereConfig,
    vehicle: &Vehicle,
    r_m: &Vector3,
    v_m_s: &Vector3,
) -> Vector3 {
    let altitude = vector::norm(r_m) - body.radius_m;
    let density = atmosphere.reference_density_kg_m3
        * (-(altitude - atmosphere.reference_altitude_m) / atmosphere.scale_height_m).exp();

    // Atmosphere co-rotates with the body when a rotation rate is declared.
    let rotation = body.rotation_rate_rad_s.unwrap_or(0.0);
    let wind = [-rotation * r_m[1], rotation * r_m[0], 0.0];
    let relative = vector::sub(v_m_s, &wind);
    let speed = vector::norm(&relative);

    let scale = -0.5 * density * speed * vehicle.drag_coefficient * vehicle.drag_reference_area_m2
        / vehicle.mass_kg;
    vector::scale(&relative, scale)
}

/// Cannonball solar radiation pressure, scaled by the inverse-square flux
/// law and zeroed inside any occulting body's cylindrical shadow.
pub fn cannonball_radiation_pressure(
    vehicle: &Vehicle,
    r_m: &Vector3,
    sun_position_m: &Vector3,
    shadow_factor: f64,
) -> Vector3 {
    if shadow_factor == 0.0 {
        return [0.0, 0.0, 0.0];
    }
    let from_sun = vector::sub(r_m, sun_position_m);
    let distance = vector::norm(&from_sun);
    let pressure = SOLAR_PRESSURE_AT_1AU_N_M2 * (AU_M / distance) * (AU_M / distance);
    let scale = shadow_factor * pressure * vehicle.radiation_pressure_coefficient
        * vehicle.radiation_reference_area_m2
        / (vehicle.mass_kg * distance);
    vector::scale(&from_sun, scale)
}

/// Cylindrical-umbra shadow test: 0 when the vehicle sits behind the
/// occluder relative to the sun and inside its radius, 1 otherwise.
pub fn shadow_factor(
    r_m: &Vector3,
    sun_position_m: &Vector3,
    occluder_position_m: &Vector3,
    occluder_radius_m: f64,
) -> f64 {
    let to_sun = vector::sub(sun_position_m, occluder_position_m);
    let sun_distance = vector::norm(&to_sun);
    if sun_distance == 0.0 {
        return 1.0;
    }
    let sun_dir = vector::scale(&to_sun, 1.0 / sun_distance);
    let offset = vector::sub(r_m, occluder_position_m);
    let along = vector::dot(&offset, &sun_dir);
    if along >= 0.0 {
        return 1.0;
    }
    let lateral = vector::sub(&offset, &vector::scale(&sun_dir, along));
    if vector::norm(&lateral) < occluder_radius_m {
        0.0
    } else {
        1.0
    }
}
