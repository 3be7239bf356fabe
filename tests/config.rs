use std::fs;
use std::io::Write;

use orbit_bench::config::{ConfigError, load_bodies, load_scenario, load_vehicles};

#[test]
fn body_catalog_contains_benchmark_bodies() {
    let bodies = load_bodies("configs/bodies.yaml").expect("bodies yaml");
    assert_eq!(bodies.len(), 5);
    for name in ["Sun", "Earth", "Moon", "Mars", "Venus"] {
        assert!(bodies.iter().any(|b| b.name == name), "missing {name}");
    }

    let earth = bodies.iter().find(|b| b.name == "Earth").unwrap();
    assert!(earth.atmosphere.is_some());
    assert!(earth.gravity_field.is_some());
    assert!(earth.rotation_rate_rad_s.is_some());
    assert!(earth.mu_m3_s2 > 3.9e14 && earth.mu_m3_s2 < 4.0e14);

    let sun = bodies.iter().find(|b| b.name == "Sun").unwrap();
    let path = sun.ephemeris.as_ref().expect("sun ephemeris");
    assert!(path.distance_m > 1.4e11 && path.distance_m < 1.6e11);
}

#[test]
fn vehicle_catalog_loads() {
    let vehicles = load_vehicles("configs/vehicles.yaml").expect("vehicles yaml");
    assert!(!vehicles.is_empty());
    let first = &vehicles[0];
    assert_eq!(first.mass_kg, 400.0);
    assert_eq!(first.drag_coefficient, 1.2);
    assert_eq!(first.radiation_reference_area_m2, 4.0);
}

#[test]
fn scenario_manifest_loads() {
    let manifest = load_scenario("configs/scenario.yaml").expect("scenario yaml");
    assert_eq!(manifest.name, "perturbed-leo");
    assert_eq!(manifest.bodies.len(), 5);
    assert_eq!(manifest.forces.len(), 7);
    assert_eq!(manifest.outputs.len(), 11);
    assert_eq!(manifest.step_s, 10.0);
}

#[test]
fn toml_directory_catalog_loads() {
    let dir = tempfile::tempdir().expect("tempdir");

    let mut earth = fs::File::create(dir.path().join("earth.toml")).expect("create");
    writeln!(
        earth,
        "name = \"Earth\"\nmu_m3_s2 = 3.986004418e14\nradius_m = 6.378136e6"
    )
    .unwrap();

    let mut moon = fs::File::create(dir.path().join("moon.toml")).expect("create");
    writeln!(
        moon,
        "name = \"Moon\"\nmu_m3_s2 = 4.9048695e12\nradius_m = 1.7374e6"
    )
    .unwrap();

    let bodies = load_bodies(dir.path()).expect("toml dir");
    assert_eq!(bodies.len(), 2);
    // Directory records are read in sorted order.
    assert_eq!(bodies[0].name, "Earth");
    assert_eq!(bodies[1].name, "Moon");
    assert!(bodies[0].atmosphere.is_none());
}

#[test]
fn missing_catalog_names_the_path() {
    let err = load_bodies("configs/no_such_catalog.yaml").unwrap_err();
    match err {
        ConfigError::Io { path, .. } => {
            assert!(path.to_string_lossy().contains("no_such_catalog"));
        }
        other => panic!("expected io error, got {other:?}"),
    }
}
