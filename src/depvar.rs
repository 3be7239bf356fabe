//! Fixed dependent-variable column layout of the benchmark scenario.
//!
//! Data-column indices (time excluded) as produced by
//! `orbit_scenario::benchmark::benchmark_outputs`. The comparison plots read
//! tables from arbitrary producers, so they address columns positionally
//! rather than by label.

use std::ops::Range;

use orbit_export::ResultTable;
use thiserror::Error;

/// Total acceleration vector components.
pub const TOTAL_ACCELERATION: Range<usize> = 0..3;
/// The six Kepler elements: a, e, i, argp, raan, true anomaly.
pub const KEPLER_ELEMENTS: Range<usize> = 3..9;
/// Latitude in radians.
pub const LATITUDE: usize = 9;
/// Longitude in radians.
pub const LONGITUDE: usize = 10;
/// The seven per-source acceleration norms.
pub const ACCELERATION_NORMS: Range<usize> = 11..18;
/// Data columns in one benchmark dependent-variable row.
pub const ROW_WIDTH: usize = 18;

/// Legend labels for the per-source acceleration norms, in column order.
pub const ACCELERATION_NORM_LABELS: [&str; 7] = [
    "PM Sun",
    "PM Moon",
    "PM Mars",
    "PM Venus",
    "SH Earth",
    "Aerodynamic Earth",
    "Radiation Pressure Sun",
];

/// A dependent-variable table that does not carry the benchmark layout.
#[derive(Debug, Error)]
#[error(
    "dependent-variable table has {got} data columns, the benchmark layout requires {ROW_WIDTH}"
)]
pub struct LayoutError {
    pub got: usize,
}

/// Verify a table is wide enough to be addressed with the indices above.
pub fn check_layout(table: &ResultTable) -> Result<(), LayoutError> {
    if table.column_count() == ROW_WIDTH {
        Ok(())
    } else {
        Err(LayoutError {
            got: table.column_count(),
        })
    }
}
