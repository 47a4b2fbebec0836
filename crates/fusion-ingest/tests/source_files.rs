use std::fs;

use fusion_ingest::{IngestError, read_export, read_source_table};
use fusion_model::SourceLayout;

fn layout(delimiter: char) -> SourceLayout {
    SourceLayout {
        delimiter,
        renames: Default::default(),
        keep_columns: Vec::new(),
    }
}

#[test]
fn reads_tab_delimited_lis_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("@Pt21-X-X-1-2-3.lis");
    fs::write(
        &path,
        "\u{feff}Specimen Barcode\tRun ID\tTest order #\tInterpretation 6\n\
         PARA PANEL C_007\t1043\t000001\tPositive\n\
         [end]\t\t\t\n",
    )
    .unwrap();

    let table = read_export(&path, &layout('\t')).unwrap();
    assert_eq!(
        table.headers,
        vec!["Specimen Barcode", "Run ID", "Test order #", "Interpretation 6"]
    );
    assert_eq!(table.height(), 2);
    assert_eq!(table.cell(0, 2), "000001");
    assert_eq!(table.cell(1, 0), "[end]");
}

#[test]
fn reads_comma_delimited_pcr_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("@DI1-X-X-1-2-3.csv");
    fs::write(
        &path,
        "Specimen Barcode,Channel,RFU Range\n\"S,1\",FAM,1500.25\n",
    )
    .unwrap();

    let table = read_export(&path, &layout(',')).unwrap();
    assert_eq!(table.column("Specimen Barcode"), Some(vec!["S,1"]));
    assert_eq!(table.column("RFU Range"), Some(vec!["1500.25"]));
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_source_table(&dir.path().join("absent.csv"), b',').unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}

#[test]
fn empty_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    fs::write(&path, "").unwrap();
    let err = read_source_table(&path, b',').unwrap_err();
    assert!(matches!(err, IngestError::EmptyTable { .. }));
}
