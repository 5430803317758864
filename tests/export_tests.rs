// Export helper tests: argument validation and the written file.

use linecalc::{save_as_file, ExportError};
use std::fs;

#[test]
fn rejects_missing_arguments() {
    assert!(matches!(
        save_as_file("", "results", None),
        Err(ExportError::MissingContent)
    ));
    assert!(matches!(
        save_as_file("7\n14\n", "", None),
        Err(ExportError::MissingFilename)
    ));
}

#[test]
fn writes_the_named_file() {
    let base = std::env::temp_dir().join(format!("linecalc_export_{}", std::process::id()));
    let base = base.to_str().expect("temp path is valid utf-8");

    let path = save_as_file("7\n14\n", base, None).expect("export succeeds");
    assert!(path.to_string_lossy().ends_with(".txt"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "7\n14\n");
    fs::remove_file(&path).ok();
}

#[test]
fn honors_a_custom_extension() {
    let base = std::env::temp_dir().join(format!("linecalc_export_csv_{}", std::process::id()));
    let base = base.to_str().expect("temp path is valid utf-8");

    let path = save_as_file("a,b\n", base, Some("csv")).expect("export succeeds");
    assert!(path.to_string_lossy().ends_with(".csv"));
    fs::remove_file(&path).ok();
}
