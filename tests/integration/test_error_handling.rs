// エラー処理の統合テスト

use crate::fixtures::open_app;
use kiroku_lot::{
    codec::sniff_and_decode,
    core::{ErrorSeverity, RecordError},
    storage::{LocalFileStorage, TEMPLATES_KEY, TESTS_KEY},
};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_corrupt_file_falls_back_to_sample() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalFileStorage::new(temp_dir.path());
    fs::write(storage.path_for(TESTS_KEY), "{{{ broken").unwrap();
    fs::write(storage.path_for(TEMPLATES_KEY), "[oops").unwrap();

    let app = open_app(temp_dir.path());
    assert_eq!(app.store.tests().len(), 1);
    assert_eq!(app.store.tests()[0].name, "定期テスト（サンプル）");
    assert!(app.store.templates().is_empty());
}

#[test]
fn test_sniff_not_json_is_none() {
    assert!(sniff_and_decode("not json at all").is_none());
    assert!(sniff_and_decode("").is_none());
}

#[test]
fn test_invalid_import_is_rejected_whole() {
    let temp_dir = TempDir::new().unwrap();
    let mut app = open_app(temp_dir.path());

    let error = app
        .store
        .import_json(r#"[{"name":"ok"},"bad"]"#)
        .unwrap_err();
    assert!(matches!(error, RecordError::ValidationError { .. }));
    assert_eq!(error.severity(), ErrorSeverity::Medium);
    assert!(error.is_recoverable());
    assert_eq!(app.store.tests().len(), 1);
}

#[test]
fn test_decode_error_user_message() {
    let temp_dir = TempDir::new().unwrap();
    let app = open_app(temp_dir.path());

    let error = app.compare_pasted("%%%").unwrap_err();
    assert_eq!(error.user_message(), "共有データの形式が不正です");
}

#[cfg(unix)]
#[test]
fn test_unwritable_data_dir_keeps_changes_in_memory() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let mut app = open_app(temp_dir.path());
    fs::set_permissions(temp_dir.path(), fs::Permissions::from_mode(0o555)).unwrap();

    // root 権限では書き込めてしまうため、その場合は検証しない
    let probe = temp_dir.path().join("probe");
    if fs::write(&probe, "x").is_ok() {
        fs::remove_file(&probe).unwrap();
        fs::set_permissions(temp_dir.path(), fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    app.store.add_subject("理科", Some(60.0)).unwrap();
    assert!(app.store.current_test().unwrap().has_subject("理科"));
    assert!(matches!(
        app.store.take_persist_warning(),
        Some(RecordError::PersistenceError { .. })
    ));

    fs::set_permissions(temp_dir.path(), fs::Permissions::from_mode(0o755)).unwrap();
    let reopened = open_app(temp_dir.path());
    assert!(!reopened.store.tests()[0].has_subject("理科"));
}
