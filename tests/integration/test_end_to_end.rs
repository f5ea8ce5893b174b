// エンドツーエンド統合テスト（ファイル保存）

use crate::fixtures::open_app;
use kiroku_lot::{
    cli::commands::transfer::{execute_export, execute_import},
    core::TestRecord,
    storage::{LocalFileStorage, TESTS_KEY},
};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_first_run_writes_sample_to_data_dir() {
    let temp_dir = TempDir::new().unwrap();
    let app = open_app(temp_dir.path());

    let path = LocalFileStorage::new(temp_dir.path()).path_for(TESTS_KEY);
    let persisted: Vec<TestRecord> =
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

    assert_eq!(persisted, app.store.tests());
    assert_eq!(persisted[0].name, "定期テスト（サンプル）");
}

#[test]
fn test_edits_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut app = open_app(temp_dir.path());
        app.store.add_test("期末テスト");
        app.store.add_subject("国語", Some(80.0)).unwrap();
        app.store.add_subject("数学", None).unwrap();
        app.store.save_as_template(None).unwrap();
        app.store.set_username("花子");
        assert!(app.shutdown().is_none());
    }

    let app = open_app(temp_dir.path());
    let current = app.store.current_test().unwrap();
    assert_eq!(current.name, "期末テスト");
    assert_eq!(current.subjects.len(), 2);
    assert_eq!(current.subjects[1].score, None);
    assert_eq!(app.store.templates()[0].name, "期末テストのテンプレート");
    assert_eq!(app.store.username().as_deref(), Some("花子"));
}

#[test]
fn test_share_between_two_users() {
    let alice_dir = TempDir::new().unwrap();
    let bob_dir = TempDir::new().unwrap();

    let mut alice = open_app(alice_dir.path());
    alice.store.set_username("alice");
    alice.store.set_score("英語", Some(95.0)).unwrap();
    let link = alice.share_link().unwrap();
    assert!(link.starts_with("https://kiroku.example.com/app/?share="));

    let mut bob = open_app(bob_dir.path());
    let (shared, result) = bob.compare_pasted(&link).unwrap();
    assert_eq!(shared.username.as_deref(), Some("alice"));
    let english = result.rows.iter().find(|r| r.subject_name == "英語").unwrap();
    assert_eq!(english.diff, Some(-7.0));

    // 比較は保存状態を変えない
    assert_eq!(bob.store.tests().len(), 1);

    bob.store.save_shared_as_test(&shared, None);
    assert_eq!(bob.store.tests().len(), 2);
    assert_ne!(bob.store.tests()[1].id, alice.store.tests()[0].id);
}

#[tokio::test]
async fn test_export_and_import_between_data_dirs() {
    let source_dir = TempDir::new().unwrap();
    let target_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();

    let source = open_app(source_dir.path());
    let path = execute_export(&source, out_dir.path()).await.unwrap();

    let mut target = open_app(target_dir.path());
    execute_import(&mut target, path).await.unwrap();

    // 同じサンプルのIDは衝突しないため、そのまま追加される
    assert_eq!(target.store.tests().len(), 2);
    assert_eq!(target.store.tests()[1], source.store.tests()[0]);
}

#[test]
fn test_template_link_between_users() {
    let alice_dir = TempDir::new().unwrap();
    let bob_dir = TempDir::new().unwrap();

    let mut alice = open_app(alice_dir.path());
    alice.store.save_as_template(Some("3教科")).unwrap();
    let link = alice.template_link("3教科").unwrap();

    let mut bob = open_app(bob_dir.path());
    bob.store.add_test("模試");
    bob.load_shared_template(&link).unwrap();
    assert_eq!(bob.store.apply_template("3教科").unwrap(), 3);
    assert_eq!(bob.store.apply_template("3教科").unwrap(), 0);

    let current = bob.store.current_test().unwrap();
    assert_eq!(current.name, "模試");
    assert!(current.subjects.iter().all(|s| s.score.is_none()));
}
