//! Result tables and their on-disk artifacts.
//!
//! A [`ResultTable`] is an ordered sequence of rows keyed by a strictly
//! increasing time value. The on-disk form is whitespace-delimited text: one
//! label row, then one line per sample with the time first. Values are
//! written in scientific notation with enough digits to reconstruct the
//! original doubles on read.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ordered, time-keyed table of samples with a fixed column layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    columns: Vec<String>,
    times: Vec<f64>,
    rows: Vec<Vec<f64>>,
}

/// Errors surfaced while building, writing, or reading result tables.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path}:{line}: could not parse `{token}` as a number")]
    Parse {
        path: PathBuf,
        line: usize,
        token: String,
    },
    #[error("{path}:{line}: row has {got} values, table declares {want}")]
    RaggedRow {
        path: PathBuf,
        line: usize,
        got: usize,
        want: usize,
    },
    #[error("result file {path} holds no samples")]
    Empty { path: PathBuf },
    #[error("row at t = {t_s} s has {got} values, table declares {want} columns")]
    RowWidth { t_s: f64, got: usize, want: usize },
    #[error("time {t_s} s does not increase over the previous sample at {previous_s} s")]
    NonMonotonicTime { t_s: f64, previous_s: f64 },
}

impl ResultTable {
    /// Create an empty table with the given data-column labels (the time
    /// column is implicit and always first on disk).
    pub fn new(columns: Vec<String>) -> Self {
        ResultTable {
            columns,
            times: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Append a sample, enforcing the row-width and monotonic-time
    /// invariants.
    pub fn push_row(&mut self, t_s: f64, values: Vec<f64>) -> Result<(), TableError> {
        if values.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                t_s,
                got: values.len(),
                want: self.columns.len(),
            });
        }
        if let Some(&previous_s) = self.times.last() {
            if t_s <= previous_s {
                return Err(TableError::NonMonotonicTime { t_s, previous_s });
            }
        }
        self.times.push(t_s);
        self.rows.push(values);
        Ok(())
    }

    /// Data-column labels, excluding time.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Sample times in seconds since the reference epoch.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Data rows, aligned with [`ResultTable::times`].
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.times.len()
    }

    /// Number of data columns, excluding time.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Extract one data column by index.
    pub fn column_values(&self, index: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[index]).collect()
    }
}

/// Create a buffered writer for the target path, creating parent directories
/// as needed; `-` writes to stdout by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Serialize a table: label row first, then `t` and the data values per
/// line, space-delimited, in `{:.14e}` notation (lossless to ~1e-14
/// relative on re-read).
pub fn write_table(path: &Path, table: &ResultTable) -> Result<(), TableError> {
    let io_err = |source| TableError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = writer_for_path(path).map_err(io_err)?;

    let mut header = String::from("t");
    for label in table.columns() {
        header.push(' ');
        header.push_str(label);
    }
    writeln!(writer, "{header}").map_err(io_err)?;

    for (t, row) in table.times().iter().zip(table.rows()) {
        write!(writer, "{t:.14e}").map_err(io_err)?;
        for value in row {
            write!(writer, " {value:.14e}").map_err(io_err)?;
        }
        writeln!(writer).map_err(io_err)?;
    }
    writer.flush().map_err(io_err)
}

/// Read a table back from disk.
///
/// The first line is always skipped: it is the label row when this crate
/// wrote the file, and other producers may emit no labels at all, in which
/// case their first sample is sacrificed. Tokens on the skipped line are
/// reused as labels when they are not numeric; otherwise generic `col_N`
/// labels are synthesized.
pub fn read_table(path: &Path) -> Result<ResultTable, TableError> {
    let file = File::open(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines().enumerate();

    let first_line = match lines.next() {
        Some((_, line)) => line.map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?,
        None => {
            return Err(TableError::Empty {
                path: path.to_path_buf(),
            });
        }
    };
    let header_tokens: Vec<&str> = first_line.split_whitespace().collect();
    let labelled = !header_tokens.is_empty()
        && header_tokens
            .iter()
            .any(|token| token.parse::<f64>().is_err());

    let mut times = Vec::new();
    let mut rows = Vec::new();
    let mut width: Option<usize> = None;

    for (index, line) in lines {
        let line = line.map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        let line_no = index + 1;
        let mut values = Vec::with_capacity(tokens.len());
        for token in &tokens {
            let value = token.parse::<f64>().map_err(|_| TableError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                token: (*token).to_string(),
            })?;
            values.push(value);
        }
        let row_width = values.len().saturating_sub(1);
        match width {
            None => width = Some(row_width),
            Some(want) if want != row_width => {
                return Err(TableError::RaggedRow {
                    path: path.to_path_buf(),
                    line: line_no,
                    got: row_width,
                    want,
                });
            }
            _ => {}
        }
        times.push(values[0]);
        rows.push(values[1..].to_vec());
    }

    let width = width.ok_or_else(|| TableError::Empty {
        path: path.to_path_buf(),
    })?;

    let columns = if labelled && header_tokens.len() == width + 1 {
        header_tokens[1..].iter().map(|s| s.to_string()).collect()
    } else {
        (0..width).map(|i| format!("col_{i}")).collect()
    };

    Ok(ResultTable {
        columns,
        times,
        rows,
    })
}

/// Summary of one simulation run, written next to its tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub scenario: String,
    pub engine: String,
    pub step_s: f64,
    pub start_epoch_s: f64,
    pub end_epoch_s: f64,
    pub state_rows: usize,
    pub state_columns: usize,
    pub dependent_rows: usize,
    pub dependent_columns: usize,
}

/// Write the run manifest as pretty-printed JSON.
pub fn write_manifest(path: &Path, manifest: &RunManifest) -> Result<(), TableError> {
    let io_err = |source| TableError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = writer_for_path(path).map_err(io_err)?;
    serde_json::to_writer_pretty(&mut writer, manifest)
        .map_err(|source| io_err(io::Error::other(source)))?;
    writeln!(writer).map_err(io_err)?;
    writer.flush().map_err(io_err)
}

/// Read a run manifest back.
pub fn read_manifest(path: &Path) -> Result<RunManifest, TableError> {
    let file = File::open(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source: io::Error::other(source),
    })
}
