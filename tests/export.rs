use std::fs;
use std::io::Write;

use orbit_bench::export::{
    ResultTable, RunManifest, TableError, read_manifest, read_table, write_manifest, write_table,
};

fn sample_table() -> ResultTable {
    let mut table = ResultTable::new(vec!["x_m".to_string(), "vx_m_s".to_string()]);
    table
        .push_row(0.0, vec![6.378136e6, -7.3508294512345678e3])
        .unwrap();
    table
        .push_row(10.0, vec![std::f64::consts::PI * 1e6, 1.234567890123456e-9])
        .unwrap();
    table
        .push_row(20.0, vec![-4.2e-17, 0.0])
        .unwrap();
    table
}

#[test]
fn write_then_read_round_trips_within_formatting_tolerance() {
    let dir = tempfile::tempdir().expect("tempdir");
    // Nested path: the writer creates missing directories.
    let path = dir.path().join("variant").join("state.dat");

    let table = sample_table();
    write_table(&path, &table).expect("write");
    let read = read_table(&path).expect("read");

    assert_eq!(read.row_count(), table.row_count());
    assert_eq!(read.columns(), table.columns());
    for (a, b) in read.times().iter().zip(table.times()) {
        assert_eq!(a, b);
    }
    for (read_row, row) in read.rows().iter().zip(table.rows()) {
        for (a, b) in read_row.iter().zip(row) {
            if *b == 0.0 {
                assert_eq!(*a, 0.0);
            } else {
                assert!(
                    ((a - b) / b).abs() <= 1e-12,
                    "round trip drifted: {a} vs {b}"
                );
            }
        }
    }
}

#[test]
fn first_line_is_skipped_even_without_labels() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bare.dat");

    let mut file = fs::File::create(&path).expect("create");
    for i in 0..4 {
        writeln!(file, "{} {} {}", i as f64 * 10.0, i as f64, -(i as f64)).unwrap();
    }
    drop(file);

    let table = read_table(&path).expect("read");
    // The first sample is sacrificed as a presumed label row.
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.columns(), ["col_0", "col_1"]);
    assert_eq!(table.times()[0], 10.0);
}

#[test]
fn parse_failure_names_path_and_line() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.dat");
    fs::write(&path, "t x\n0.0 1.0\n1.0 not-a-number\n").expect("write");

    let err = read_table(&path).unwrap_err();
    match err {
        TableError::Parse { line, token, .. } => {
            assert_eq!(line, 3);
            assert_eq!(token, "not-a-number");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
    let message = read_table(&path).unwrap_err().to_string();
    assert!(message.contains("broken.dat"));
}

#[test]
fn ragged_rows_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ragged.dat");
    fs::write(&path, "t x\n0.0 1.0\n1.0 2.0 3.0\n").expect("write");

    assert!(matches!(
        read_table(&path).unwrap_err(),
        TableError::RaggedRow { got: 2, want: 1, .. }
    ));
}

#[test]
fn empty_file_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("empty.dat");
    fs::write(&path, "").expect("write");
    assert!(matches!(
        read_table(&path).unwrap_err(),
        TableError::Empty { .. }
    ));

    fs::write(&path, "t x y\n").expect("write");
    assert!(matches!(
        read_table(&path).unwrap_err(),
        TableError::Empty { .. }
    ));
}

#[test]
fn table_invariants_hold_on_push() {
    let mut table = ResultTable::new(vec!["x_m".to_string()]);
    table.push_row(0.0, vec![1.0]).unwrap();

    assert!(matches!(
        table.push_row(0.0, vec![2.0]).unwrap_err(),
        TableError::NonMonotonicTime { .. }
    ));
    assert!(matches!(
        table.push_row(1.0, vec![2.0, 3.0]).unwrap_err(),
        TableError::RowWidth { got: 2, want: 1, .. }
    ));
}

#[test]
fn manifest_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("run.json");

    let manifest = RunManifest {
        scenario: "perturbed-leo".to_string(),
        engine: "reference-rk4".to_string(),
        step_s: 10.0,
        start_epoch_s: 0.0,
        end_epoch_s: 86_400.0,
        state_rows: 8641,
        state_columns: 6,
        dependent_rows: 8641,
        dependent_columns: 18,
    };
    write_manifest(&path, &manifest).expect("write");
    let read = read_manifest(&path).expect("read");
    assert_eq!(read, manifest);
}
