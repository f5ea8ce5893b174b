use anyhow::{Context, Result};
use async_trait::async_trait;
use mockall::automock;
use std::path::PathBuf;

pub mod local;
pub mod memory;

pub use local::LocalFileStorage;
pub use memory::MemoryStorage;

/// テスト記録コレクションの保存キー
pub const TESTS_KEY: &str = "kiroku_lot_tests_v1";
/// テンプレートコレクションの保存キー
pub const TEMPLATES_KEY: &str = "kiroku_lot_templates_v1";
/// 選択中テストIDの保存キー
pub const CURRENT_TEST_KEY: &str = "kiroku_lot_current_v1";
/// 共有時に添付するユーザー名の保存キー
pub const USERNAME_KEY: &str = "kl_username";

/// キーごとに1つの文字列値を保存するストレージのトレイト
///
/// 各コレクションは単一の文字列として丸ごと書き込む
#[automock]
pub trait KeyValueStorage: Send + Sync {
    /// 値を読み込む（未保存なら None）
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// 値を丸ごと書き込む
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// 値を削除する
    fn remove(&self, key: &str) -> Result<()>;
}

// KeyValueStorage for Box<dyn KeyValueStorage>
impl KeyValueStorage for Box<dyn KeyValueStorage> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.as_ref().read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.as_ref().write(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.as_ref().remove(key)
    }
}

/// インポート・貼り付けテキストの読み込み元
#[automock]
#[async_trait]
pub trait PayloadSource: Send + Sync {
    /// 読み込み元の表示名
    fn describe(&self) -> String;

    /// テキスト全体を読み込む
    async fn read_text(&self) -> Result<String>;
}

/// ファイルからの読み込み
#[derive(Debug, Clone)]
pub struct FilePayload {
    path: PathBuf,
}

impl FilePayload {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PayloadSource for FilePayload {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn read_text(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read file: {}", self.path.display()))
    }
}

/// 標準入力からの読み込み
#[derive(Debug, Clone, Default)]
pub struct StdinPayload;

#[async_trait]
impl PayloadSource for StdinPayload {
    fn describe(&self) -> String {
        "stdin".to_string()
    }

    async fn read_text(&self) -> Result<String> {
        use tokio::io::AsyncReadExt;

        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read from stdin")?;
        Ok(text)
    }
}

/// 引数で直接渡されたテキスト
#[derive(Debug, Clone)]
pub struct TextPayload(pub String);

#[async_trait]
impl PayloadSource for TextPayload {
    fn describe(&self) -> String {
        "argument".to_string()
    }

    async fn read_text(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}
