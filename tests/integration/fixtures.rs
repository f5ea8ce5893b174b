// テスト用のヘルパーとデータ

use kiroku_lot::{
    config::DefaultRecordConfig,
    core::{Subject, TestRecord},
    storage::LocalFileStorage,
    App,
};
use std::path::Path;

pub type FileApp = App<DefaultRecordConfig, LocalFileStorage>;

/// データディレクトリを指定してアプリを開く
pub fn open_app(data_dir: &Path) -> FileApp {
    let config = DefaultRecordConfig::new(data_dir).with_share_base_url("https://kiroku.example.com/app/");
    App::new(config, LocalFileStorage::new(data_dir))
}

pub fn test_with(name: &str, subjects: &[(&str, Option<f64>)]) -> TestRecord {
    let mut test = TestRecord::new(name);
    test.subjects = subjects
        .iter()
        .map(|(name, score)| Subject::new(*name, *score))
        .collect();
    test
}
