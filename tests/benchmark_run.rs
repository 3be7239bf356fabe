use orbit_bench::compare::{DEFAULT_OUTLIER_THRESHOLD, relative_difference, summarize};
use orbit_bench::config::{load_bodies, load_vehicles};
use orbit_bench::depvar;
use orbit_bench::engine::{PropagationEngine, ReferenceEngine, run_scenario};
use orbit_bench::export::{RunManifest, read_table, write_manifest, write_table};
use orbit_bench::scenario::benchmark::perturbed_leo;

#[test]
fn benchmark_run_produces_the_declared_tables() {
    let bodies = load_bodies("configs/bodies.yaml").expect("bodies yaml");
    let vehicles = load_vehicles("configs/vehicles.yaml").expect("vehicles yaml");
    let scenario = perturbed_leo(bodies, &vehicles[0]).expect("benchmark scenario");

    let engine = ReferenceEngine::new();
    let products = run_scenario(&engine, &scenario).expect("benchmark run");

    // One Julian day at 10 s steps: 86400 / 10 + 1 samples.
    assert_eq!(products.state.row_count(), 8641);
    assert_eq!(products.state.column_count(), 6);
    assert_eq!(products.dependent.row_count(), 8641);
    assert_eq!(products.dependent.column_count(), 18);
    depvar::check_layout(&products.dependent).expect("benchmark layout");

    // Every sampled value is finite and the per-source norms are
    // non-negative by construction.
    for row in products.dependent.rows() {
        assert!(row.iter().all(|v| v.is_finite()));
        for column in depvar::ACCELERATION_NORMS {
            assert!(row[column] >= 0.0);
        }
    }

    // Central gravity dominates every perturbation on this orbit.
    let first = &products.dependent.rows()[0];
    let sh_earth = first[depvar::ACCELERATION_NORMS.start + 4];
    for offset in [0, 1, 2, 3, 5, 6] {
        assert!(sh_earth > first[depvar::ACCELERATION_NORMS.start + offset]);
    }

    let dir = tempfile::tempdir().expect("tempdir");
    let state_path = dir.path().join("reference/state.dat");
    let dependent_path = dir.path().join("reference/depvar.dat");
    write_table(&state_path, &products.state).expect("write state");
    write_table(&dependent_path, &products.dependent).expect("write depvar");

    let manifest_path = dir.path().join("reference/run.json");
    write_manifest(
        &manifest_path,
        &RunManifest {
            scenario: scenario.name().to_string(),
            engine: engine.name().to_string(),
            step_s: scenario.integrator().step_s(),
            start_epoch_s: scenario.start_epoch_s(),
            end_epoch_s: scenario.end_epoch_s(),
            state_rows: products.state.row_count(),
            state_columns: products.state.column_count(),
            dependent_rows: products.dependent.row_count(),
            dependent_columns: products.dependent.column_count(),
        },
    )
    .expect("write manifest");
    assert!(manifest_path.exists());

    // Reading the tables back and comparing a run against itself yields
    // no differences beyond the filtered divide-by-zero artifacts.
    let state = read_table(&state_path).expect("read state");
    let dependent = read_table(&dependent_path).expect("read depvar");
    assert_eq!(state.row_count(), 8641);
    assert_eq!(dependent.column_count(), 18);

    let state_diff = relative_difference(&state, &state).expect("same shape");
    let summary = summarize(&state_diff, DEFAULT_OUTLIER_THRESHOLD);
    assert_eq!(summary.max_abs, 0.0);

    let dependent_diff = relative_difference(&dependent, &dependent).expect("same shape");
    let summary = summarize(&dependent_diff, DEFAULT_OUTLIER_THRESHOLD);
    assert_eq!(summary.max_abs, 0.0);
}

#[test]
fn shrinking_the_window_shrinks_the_tables() {
    let bodies = load_bodies("configs/bodies.yaml").expect("bodies yaml");
    let vehicles = load_vehicles("configs/vehicles.yaml").expect("vehicles yaml");
    let scenario =
        orbit_bench::scenario::benchmark::perturbed_leo_builder(bodies, &vehicles[0])
            .window(0.0, 600.0)
            .build()
            .expect("short scenario");

    let products = run_scenario(&ReferenceEngine::new(), &scenario).expect("short run");
    assert_eq!(products.state.row_count(), 61);
    assert_eq!(products.dependent.row_count(), 61);
}
