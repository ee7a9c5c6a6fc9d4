use std::path::Path;

use vtk_raw::{
    convert, read_ascii_matrix, read_binary_matrix, ConvertOptions, Encoding, Error,
    ValidationError,
};

const IMAGE_DATA: &str = r#"<?xml version="1.0"?>
<VTKFile type="ImageData" version="1.0" byte_order="LittleEndian" header_type="UInt64">
  <ImageData WholeExtent="0 2 0 0 0 0" Origin="0 0 0" Spacing="1 1 1">
    <Piece Extent="0 2 0 0 0 0">
      <PointData>
        <DataArray type="Float64" Name="A" NumberOfComponents="2" format="ascii">
          1 2 3 4 5 6
        </DataArray>
        <DataArray type="Int32" Name="B" format="ascii">7 8 9</DataArray>
      </PointData>
    </Piece>
  </ImageData>
</VTKFile>
"#;

const LEGACY: &str = "# vtk DataFile Version 3.0
scenario
ASCII
DATASET STRUCTURED_POINTS
DIMENSIONS 3 1 1
ORIGIN 0 0 0
SPACING 1 1 1
POINT_DATA 3
FIELD FieldData 2
A 2 3 double
1 2 3 4 5 6
B 1 3 float
7 8 9
";

const MISMATCHED: &str = "# vtk DataFile Version 3.0
mismatched
ASCII
DATASET STRUCTURED_POINTS
DIMENSIONS 3 1 1
POINT_DATA 3
FIELD FieldData 2
A 1 3 double
1 2 3
B 1 4 double
1 2 3 4
";

fn write_input(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn image_data_to_ascii() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "scenario.vti", IMAGE_DATA);
    let output = dir.path().join("scenario.txt");

    let summary = convert(&ConvertOptions::new(&input, &output, Encoding::Ascii)).unwrap();

    assert_eq!(summary.layout.total_rows, 3);
    assert_eq!(summary.layout.total_columns, 3);
    assert_eq!(summary.arrays.len(), 2);
    assert_eq!(summary.arrays[0].name, "A");

    let text = std::fs::read_to_string(&output).unwrap();
    assert_eq!(text, "1\t2\t7\n3\t4\t8\n5\t6\t9");
}

#[test]
fn legacy_to_binary() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "scenario.VTK", LEGACY);
    let output = dir.path().join("scenario.raw");

    let summary = convert(&ConvertOptions::new(&input, &output, Encoding::Binary)).unwrap();

    let bytes = std::fs::read(&output).unwrap();
    assert_eq!(bytes.len(), summary.layout.binary_len());
    assert_eq!(bytes.len(), 72);

    let matrix = read_binary_matrix(bytes.as_slice(), summary.layout.total_columns).unwrap();
    assert_eq!(
        matrix,
        ndarray::array![[1.0, 2.0, 7.0], [3.0, 4.0, 8.0], [5.0, 6.0, 9.0]]
    );
}

#[test]
fn ascii_and_binary_agree() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "values.vtk", LEGACY);
    let ascii = dir.path().join("values.txt");
    let binary = dir.path().join("values.raw");

    convert(&ConvertOptions::new(&input, &ascii, Encoding::Ascii)).unwrap();
    let summary = convert(&ConvertOptions::new(&input, &binary, Encoding::Binary)).unwrap();

    let from_ascii = read_ascii_matrix(std::fs::File::open(&ascii).unwrap()).unwrap();
    let from_binary = read_binary_matrix(
        std::fs::File::open(&binary).unwrap(),
        summary.layout.total_columns,
    )
    .unwrap();

    assert_eq!(from_ascii, from_binary);
}

#[test]
fn mismatched_arrays_leave_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "mismatched.vtk", MISMATCHED);
    let output = dir.path().join("mismatched.raw");

    let err = convert(&ConvertOptions::new(&input, &output, Encoding::Binary)).unwrap_err();

    assert!(matches!(
        err,
        Error::Validation(ValidationError::InconsistentTupleCount {
            array_index: 1,
            expected: 3,
            found: 4
        })
    ));
    assert!(!output.exists());
}

#[test]
fn unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "scenario.vtkhdf", LEGACY);
    let output = dir.path().join("out.raw");

    let err = convert(&ConvertOptions::new(&input, &output, Encoding::Ascii)).unwrap_err();

    assert!(matches!(err, Error::UnsupportedFormat { .. }));
    assert!(!output.exists());
}

#[test]
fn missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("missing.vtp");
    let output = dir.path().join("out.raw");

    let err = convert(&ConvertOptions::new(&input, &output, Encoding::Ascii)).unwrap_err();

    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn empty_point_data() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "empty.vtp",
        r#"<VTKFile type="PolyData"><PolyData><Piece><PointData/></Piece></PolyData></VTKFile>"#,
    );
    let output = dir.path().join("out.raw");

    let err = convert(&ConvertOptions::new(&input, &output, Encoding::Ascii)).unwrap_err();

    assert!(matches!(err, Error::Validation(ValidationError::EmptyDataset)));
    assert!(!output.exists());
}
