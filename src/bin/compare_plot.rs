use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use orbit_bench::compare::{
    DEFAULT_OUTLIER_THRESHOLD, filter_outliers, relative_difference, summarize,
};
use orbit_bench::depvar;
use orbit_bench::export::{ResultTable, read_table, writer_for_path};
use orbit_bench::figures;
use orbit_core::units::{m_to_km, rad_to_deg};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Compare variant result tables and render the standard figures"
)]
struct Cli {
    /// Reference variant directory holding the result tables
    #[arg(long)]
    reference: PathBuf,

    /// Candidate variant directory to compare against the reference (repeatable)
    #[arg(long = "candidate", required = true)]
    candidates: Vec<PathBuf>,

    /// Directory for comparison figures and the summary CSV
    #[arg(long, default_value = "output")]
    output: PathBuf,

    /// Directory for PNG copies of the comparison histograms
    #[arg(long, default_value = "figs")]
    figs: PathBuf,

    /// Drop relative differences at or beyond this magnitude before plotting.
    /// A lossy anti-blow-up policy, not a correctness filter.
    #[arg(long, default_value_t = DEFAULT_OUTLIER_THRESHOLD)]
    outlier_threshold: f64,

    /// Ground-track window from the start of the run, in hours
    #[arg(long, default_value_t = 3.0)]
    ground_track_hours: f64,

    /// Histogram bin count
    #[arg(long, default_value_t = 100)]
    bins: usize,

    /// State table file name inside each variant directory
    #[arg(long, default_value = "state.dat")]
    state_file: String,

    /// Dependent-variable table file name inside each variant directory
    #[arg(long, default_value = "depvar.dat")]
    depvar_file: String,
}

struct Variant {
    name: String,
    state: ResultTable,
    dependent: ResultTable,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let reference = load_variant(&cli, &cli.reference)?;
    let candidates: Vec<Variant> = cli
        .candidates
        .iter()
        .map(|dir| load_variant(&cli, dir))
        .collect::<anyhow::Result<_>>()?;

    let mut summary_records = Vec::new();
    for candidate in &candidates {
        let state_diff = relative_difference(&reference.state, &candidate.state)
            .with_context(|| {
                format!(
                    "state tables of `{}` and `{}`",
                    reference.name, candidate.name
                )
            })?;
        let dependent_diff = relative_difference(&reference.dependent, &candidate.dependent)
            .with_context(|| {
                format!(
                    "dependent-variable tables of `{}` and `{}`",
                    reference.name, candidate.name
                )
            })?;

        summary_records.push((
            candidate.name.clone(),
            "state",
            summarize(&state_diff, cli.outlier_threshold),
        ));
        summary_records.push((
            candidate.name.clone(),
            "dependent",
            summarize(&dependent_diff, cli.outlier_threshold),
        ));

        let state_filtered = filter_outliers(&state_diff, cli.outlier_threshold);
        let dependent_filtered = filter_outliers(&dependent_diff, cli.outlier_threshold);
        let title = format!(
            "Relative difference between {} and {} results",
            reference.name, candidate.name
        );
        for dir in [&cli.output, &cli.figs] {
            let path = dir.join(format!("relative_difference_{}.png", candidate.name));
            figures::relative_difference_histogram(
                &path,
                &title,
                &state_filtered,
                &dependent_filtered,
                cli.bins,
            )?;
            println!("Saving figure to {}", path.display());
        }
    }

    write_summary(&cli.output.join("comparison_summary.csv"), &summary_records)?;

    for variant in std::iter::once(&reference).chain(&candidates) {
        render_variant_figures(&cli, variant)?;
    }

    Ok(())
}

fn load_variant(cli: &Cli, dir: &Path) -> anyhow::Result<Variant> {
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .with_context(|| format!("variant directory {} has no name", dir.display()))?;
    let state = read_table(&dir.join(&cli.state_file))
        .with_context(|| format!("loading state table of variant `{name}`"))?;
    let dependent = read_table(&dir.join(&cli.depvar_file))
        .with_context(|| format!("loading dependent-variable table of variant `{name}`"))?;
    Ok(Variant {
        name,
        state,
        dependent,
    })
}

fn write_summary(
    path: &Path,
    records: &[(String, &str, orbit_bench::compare::DifferenceSummary)],
) -> anyhow::Result<()> {
    let generated_at = chrono::Utc::now().to_rfc3339();
    let mut writer = csv::Writer::from_writer(writer_for_path(path)?);
    writer.write_record([
        "variant",
        "table",
        "differences_total",
        "differences_kept",
        "max_abs",
        "mean_abs",
        "generated_at",
    ])?;
    for (variant, table, summary) in records {
        writer.write_record([
            variant.as_str(),
            table,
            &summary.total.to_string(),
            &summary.kept.to_string(),
            &format!("{:.6e}", summary.max_abs),
            &format!("{:.6e}", summary.mean_abs),
            &generated_at,
        ])?;
    }
    writer.flush()?;
    println!("Saving summary to {}", path.display());
    Ok(())
}

fn render_variant_figures(cli: &Cli, variant: &Variant) -> anyhow::Result<()> {
    depvar::check_layout(&variant.dependent).with_context(|| {
        format!("dependent-variable table of variant `{}`", variant.name)
    })?;

    let table = &variant.dependent;
    let time_hours: Vec<f64> = table.times().iter().map(|t| t / 3_600.0).collect();
    let out_dir = cli.output.join(&variant.name);

    let accel_norm: Vec<f64> = table
        .rows()
        .iter()
        .map(|row| {
            depvar::TOTAL_ACCELERATION
                .clone()
                .map(|i| row[i] * row[i])
                .sum::<f64>()
                .sqrt()
        })
        .collect();
    let path = out_dir.join("total_acceleration.png");
    figures::total_acceleration_series(
        &path,
        &format!("Total acceleration norm, {} run", variant.name),
        &time_hours,
        &accel_norm,
    )?;
    println!("Saving figure to {}", path.display());

    let window_s = cli.ground_track_hours * 3_600.0;
    let start = table.times().first().copied().unwrap_or(0.0);
    let subset = table
        .times()
        .iter()
        .take_while(|&&t| t - start < window_s)
        .count();
    let longitude_deg: Vec<f64> = table.rows()[..subset]
        .iter()
        .map(|row| rad_to_deg(row[depvar::LONGITUDE]))
        .collect();
    let latitude_deg: Vec<f64> = table.rows()[..subset]
        .iter()
        .map(|row| rad_to_deg(row[depvar::LATITUDE]))
        .collect();
    let path = out_dir.join("ground_track.png");
    figures::ground_track(
        &path,
        &format!(
            "{:.0} hour ground track, {} run",
            cli.ground_track_hours, variant.name
        ),
        &longitude_deg,
        &latitude_deg,
    )?;
    println!("Saving figure to {}", path.display());

    let kepler_start = depvar::KEPLER_ELEMENTS.start;
    let elements = figures::KeplerSeries {
        sma_km: table
            .column_values(kepler_start)
            .into_iter()
            .map(m_to_km)
            .collect(),
        eccentricity: table.column_values(kepler_start + 1),
        inclination_deg: to_degrees(table.column_values(kepler_start + 2)),
        argp_deg: to_degrees(table.column_values(kepler_start + 3)),
        raan_deg: to_degrees(table.column_values(kepler_start + 4)),
        true_anomaly_deg: to_degrees(table.column_values(kepler_start + 5)),
    };
    let path = out_dir.join("kepler_elements.png");
    figures::kepler_elements_grid(
        &path,
        &format!("Kepler elements over the {} run", variant.name),
        &time_hours,
        &elements,
    )?;
    println!("Saving figure to {}", path.display());

    let series: Vec<(String, Vec<f64>)> = depvar::ACCELERATION_NORMS
        .clone()
        .zip(depvar::ACCELERATION_NORM_LABELS)
        .map(|(column, label)| (label.to_string(), table.column_values(column)))
        .collect();
    let path = out_dir.join("acceleration_norms.png");
    figures::acceleration_norms_overlay(
        &path,
        &format!("Acceleration norms by source, {} run", variant.name),
        &time_hours,
        &series,
    )?;
    println!("Saving figure to {}", path.display());

    Ok(())
}

fn to_degrees(values: Vec<f64>) -> Vec<f64> {
    values.into_iter().map(rad_to_deg).collect()
}
