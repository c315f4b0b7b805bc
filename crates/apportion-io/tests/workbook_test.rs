//! Contract workbooks read through calamine.

use apportion_io::{ColumnAliases, IngestionError, SourceFormat, ingest_bytes, ingest_path};
use apportion_types::ContractRecord;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

#[test]
fn reads_the_first_sheet_of_a_workbook() {
    let path = fixture("contratos.xlsx");
    assert_eq!(
        SourceFormat::from_file_name(&path.to_string_lossy()),
        Some(SourceFormat::Workbook)
    );

    let ingested = ingest_path(&path, &ColumnAliases::default()).unwrap();

    assert_eq!(
        ingested.records,
        vec![
            ContractRecord::new("ana", "1001", 600.0),
            ContractRecord::new("ana", "1002", 400.5),
            ContractRecord::new("bruno", "X-7", 250.0),
        ]
    );
    // the second sheet ("Resumo") is never read
    assert!(ingested.records.iter().all(|r| r.salesperson != "carla"));
    assert_eq!(ingested.summary.accepted_rows, 3);
    assert_eq!(ingested.summary.dropped_rows, 2);
    assert_eq!(ingested.summary.salespeople, vec!["ana", "bruno"]);
}

#[test]
fn workbook_bytes_match_the_file_path() {
    let path = fixture("contratos.xlsx");
    let bytes = std::fs::read(&path).unwrap();
    let aliases = ColumnAliases::default();

    let from_bytes = ingest_bytes("upload.xlsx", &bytes, &aliases).unwrap();
    let from_path = ingest_path(&path, &aliases).unwrap();
    assert_eq!(from_bytes, from_path);
}

#[test]
fn workbook_without_required_columns_is_rejected() {
    let aliases = ColumnAliases {
        contract: vec!["numero".to_string()],
        ..ColumnAliases::default()
    };
    let err = ingest_path(&fixture("contratos.xlsx"), &aliases).unwrap_err();
    assert!(matches!(err, IngestionError::MissingColumns { ref missing } if missing == &["numero"]));
}
