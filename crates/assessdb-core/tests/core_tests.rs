use std::fs;
use tempfile::TempDir;

use assessdb_core::catalog::CatalogReader;

const HEADER: &str = "Assessment Name,URL,Remote Testing Support,Adaptive Support,IRT Support,Test Type(s),Duration,Description,Job Levels,Languages\n";

#[test]
fn read_csv_normalizes_rows() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("catalog.csv");
    let body = format!(
        "{HEADER}\
Account Manager Solution,https://www.shl.com/a,Yes,Yes,Yes,\"C, P, A, B\",49,\"Sales, service and, commas\",\"Mid-Professional, Manager\",English (USA)\n\
.NET Framework 4.5,https://www.shl.com/b,Yes,No,No,K,Approximate Completion Time in minutes = 30,Tests .NET,N/A,\"English (USA), Spanish\"\n"
    );
    fs::write(&path, body).unwrap();

    let records = CatalogReader::new().read_csv(&path).expect("read");
    assert_eq!(records.len(), 2);

    let first = &records[0];
    assert_eq!(first.test_type_codes, vec!["C", "P", "A", "B"]);
    assert_eq!(first.test_types[1], "Personality & Behavior");
    assert_eq!(first.duration_minutes, Some(49));
    assert_eq!(first.description, "Sales, service and, commas");
    assert!(first.irt_support);

    let second = &records[1];
    assert!(!second.adaptive_support);
    assert_eq!(second.duration_minutes, Some(30));
    assert_eq!(second.duration_text, "30");
    assert_eq!(second.languages, vec!["English (USA)", "Spanish"]);
}

#[test]
fn read_all_skips_missing_files_but_rejects_empty_catalog() {
    let tmp = TempDir::new().unwrap();
    let present = tmp.path().join("present.csv");
    fs::write(&present, format!("{HEADER}Verify G+,https://x,Yes,Yes,No,A,36,General ability,Graduate,English\n")).unwrap();
    let missing = tmp.path().join("missing.csv");

    let reader = CatalogReader::new();
    let records = reader.read_all(&[&missing, &present]).expect("read_all");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].test_types, vec!["Ability & Aptitude"]);

    assert!(reader.read_all(&[&missing]).is_err(), "empty catalog is an error");
}
