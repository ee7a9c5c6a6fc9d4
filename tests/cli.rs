use std::process::Command;

const LEGACY: &str = "# vtk DataFile Version 3.0
cli
ASCII
DATASET STRUCTURED_POINTS
DIMENSIONS 2 1 1
POINT_DATA 2
SCALARS p double 1
LOOKUP_TABLE default
0.1 0.2
VECTORS u double
1 0 0
0 1 0
";

fn vtk2raw() -> Command {
    Command::new(env!("CARGO_BIN_EXE_vtk2raw"))
}

#[test]
fn writes_ascii_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.vtk");
    let output = dir.path().join("out.txt");
    std::fs::write(&input, LEGACY).unwrap();

    let result = vtk2raw().arg(&input).arg(&output).output().unwrap();

    assert!(result.status.success());
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "0.1\t1\t0\t0\n0.2\t0\t1\t0"
    );

    let stdout = String::from_utf8(result.stdout).unwrap();
    assert!(stdout.contains("Array: 0, NumberOfComponents: 1, NumberOfTuples: 2, ArrayName: p"));
    assert!(stdout.contains("Array: 1, NumberOfComponents: 3, NumberOfTuples: 2, ArrayName: u"));
    assert!(stdout.contains("Rows: 2, Columns: 4"));
}

#[test]
fn writes_binary_with_flag() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.vtk");
    let output = dir.path().join("out.raw");
    std::fs::write(&input, LEGACY).unwrap();

    let result = vtk2raw().arg(&input).arg(&output).arg("1").output().unwrap();

    assert!(result.status.success());
    assert_eq!(std::fs::read(&output).unwrap().len(), 2 * 4 * 8);
}

#[test]
fn rejects_bad_flag() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.vtk");
    let output = dir.path().join("out.raw");
    std::fs::write(&input, LEGACY).unwrap();

    let result = vtk2raw().arg(&input).arg(&output).arg("2").output().unwrap();

    assert_eq!(result.status.code(), Some(2));
    assert!(!output.exists());
}

#[test]
fn missing_arguments() {
    let result = vtk2raw().arg("only-one.vtk").output().unwrap();

    assert_eq!(result.status.code(), Some(2));
}

#[test]
fn runtime_errors_exit_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.vtx");
    std::fs::write(&input, LEGACY).unwrap();

    let result = vtk2raw()
        .arg(&input)
        .arg(dir.path().join("out.raw"))
        .output()
        .unwrap();

    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8(result.stderr).unwrap();
    assert!(stderr.starts_with("error: could not convert"));
    assert!(stderr.contains("Unsupported input format"));
}
