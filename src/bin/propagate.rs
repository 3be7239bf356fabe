use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use orbit_bench::config::{VehicleConfig, load_bodies, load_scenario, load_vehicles};
use orbit_bench::engine::{PropagationEngine, ReferenceEngine, run_scenario};
use orbit_bench::export::{RunManifest, write_manifest, write_table};
use orbit_bench::scenario::benchmark::perturbed_leo_builder;
use orbit_bench::scenario::Scenario;
use orbit_core::time::days_to_seconds;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Run the perturbed-orbit benchmark scenario and write its result tables"
)]
struct Cli {
    /// Body catalog (YAML file, TOML file, or directory of TOML records)
    #[arg(long, default_value = "configs/bodies.yaml")]
    bodies: PathBuf,

    /// Vehicle catalog
    #[arg(long, default_value = "configs/vehicles.yaml")]
    vehicles: PathBuf,

    /// Scenario manifest; defaults to the built-in benchmark scenario
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Vehicle to fly (defaults to the first catalog entry)
    #[arg(long)]
    vehicle: Option<String>,

    /// Variant label; tables land in <output-root>/<variant>/
    #[arg(long, default_value = "reference")]
    variant: String,

    /// Root directory for result tables
    #[arg(long, default_value = "output")]
    output_root: PathBuf,

    /// Override the fixed integrator step size in seconds
    #[arg(long)]
    step: Option<f64>,

    /// Override the propagation duration in days
    #[arg(long)]
    duration_days: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let bodies = load_bodies(&cli.bodies)?;
    let vehicles = load_vehicles(&cli.vehicles)?;
    let vehicle = select_vehicle(&vehicles, cli.vehicle.as_deref())?;

    let scenario = match &cli.scenario {
        Some(path) => {
            let mut config = load_scenario(path)?;
            if let Some(step) = cli.step {
                config.step_s = step;
            }
            if let Some(days) = cli.duration_days {
                config.end_epoch_s = config.start_epoch_s + days_to_seconds(days);
            }
            Scenario::from_config(&config, &bodies, &vehicles)?
        }
        None => {
            let mut builder = perturbed_leo_builder(bodies, vehicle);
            if let Some(step) = cli.step {
                builder = builder.runge_kutta_4(step);
            }
            if let Some(days) = cli.duration_days {
                builder = builder.window(0.0, days_to_seconds(days));
            }
            builder.build()?
        }
    };

    let engine = ReferenceEngine::new();
    println!("Scenario : {}", scenario.name());
    println!("Engine   : {}", engine.name());
    println!(
        "Window   : {:.1} s to {:.1} s at {:.1} s steps ({} samples)",
        scenario.start_epoch_s(),
        scenario.end_epoch_s(),
        scenario.integrator().step_s(),
        scenario.expected_rows()
    );

    let products = run_scenario(&engine, &scenario)?;

    let variant_dir = cli.output_root.join(&cli.variant);
    let state_path = variant_dir.join("state.dat");
    let dependent_path = variant_dir.join("depvar.dat");
    let manifest_path = variant_dir.join("run.json");

    println!("Saving results to {}", state_path.display());
    write_table(&state_path, &products.state)?;
    println!("Saving results to {}", dependent_path.display());
    write_table(&dependent_path, &products.dependent)?;

    let manifest = RunManifest {
        scenario: scenario.name().to_string(),
        engine: engine.name().to_string(),
        step_s: scenario.integrator().step_s(),
        start_epoch_s: scenario.start_epoch_s(),
        end_epoch_s: scenario.end_epoch_s(),
        state_rows: products.state.row_count(),
        state_columns: products.state.column_count(),
        dependent_rows: products.dependent.row_count(),
        dependent_columns: products.dependent.column_count(),
    };
    write_manifest(&manifest_path, &manifest)?;
    println!("Saving manifest to {}", manifest_path.display());

    Ok(())
}

fn select_vehicle<'a>(
    catalog: &'a [VehicleConfig],
    requested: Option<&str>,
) -> anyhow::Result<&'a VehicleConfig> {
    match requested {
        Some(name) => catalog
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
            .with_context(|| format!("vehicle '{name}' not found in catalog")),
        None => catalog
            .first()
            .context("vehicle catalog is empty"),
    }
}
