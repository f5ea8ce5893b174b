pub mod cli;
pub mod codec;
pub mod compare;
pub mod config;
pub mod core;
pub mod query;
pub mod reconcile;
pub mod storage;
pub mod store;

use crate::codec::Sniffer;
use crate::core::{ComparisonResult, RecordConfig, RecordError, RecordResult, SharedSnapshot};
use crate::storage::{KeyValueStorage, PayloadSource};
use crate::store::RecordStore;

// DIコンテナの役割を果たすジェネリックなApp構造体
// 設定とストアを直接所有する
pub struct App<C, S>
where
    C: RecordConfig,
    S: KeyValueStorage,
{
    pub config: C,
    pub store: RecordStore<S>,
    share_sniffer: Sniffer,
    template_sniffer: Sniffer,
}

impl<C, S> App<C, S>
where
    C: RecordConfig,
    S: KeyValueStorage,
{
    /// 新しいAppインスタンスを作成（コンストラクタインジェクション）
    pub fn new(config: C, storage: S) -> Self {
        Self {
            config,
            store: RecordStore::open(storage),
            share_sniffer: Sniffer::for_share(),
            template_sniffer: Sniffer::for_template(),
        }
    }

    // ========================================
    // 共有リンク
    // ========================================

    /// 選択中テストの共有リンク
    pub fn share_link(&self) -> RecordResult<String> {
        let snapshot = self.store.share_snapshot()?;
        codec::share_url(&self.config.share_base_url(), &snapshot)
    }

    /// テンプレートの共有リンク
    pub fn template_link(&self, selector: &str) -> RecordResult<String> {
        let template = self.store.find_template(selector)?;
        codec::template_url(&self.config.share_base_url(), template)
    }

    /// 共有リンクのQR画像URL
    pub fn qr_url(&self, link: &str) -> RecordResult<String> {
        codec::qr_image_url(&self.config.qr_service_url(), link)
    }

    /// 選択中テストを投稿するイシュー作成URL
    pub fn publish_url(&self) -> RecordResult<String> {
        let snapshot = self.store.share_snapshot()?;
        codec::issue_url(&self.config.issue_tracker_url(), &snapshot)
    }

    // ========================================
    // 貼り付けデータの取り込み
    // ========================================

    /// 貼り付けテキストを共有スナップショットとして解釈（テンプレートのリンクは受け付けない）
    pub fn decode_shared(&self, text: &str) -> RecordResult<SharedSnapshot> {
        let value = self.share_sniffer.sniff(text)?;
        store::snapshot_from_value(value)
    }

    /// 貼り付けテキストと選択中テストを比較
    pub fn compare_pasted(&self, text: &str) -> RecordResult<(SharedSnapshot, ComparisonResult)> {
        let shared = self.decode_shared(text)?;
        let local = self
            .store
            .current_test()
            .ok_or_else(|| RecordError::not_found("テスト"))?;
        let result = compare::compare(local, &shared);
        Ok((shared, result))
    }

    /// 共有テンプレートを取り込む（戻り値は新しいテンプレートID）
    pub fn load_shared_template(&mut self, text: &str) -> RecordResult<String> {
        let value = self.template_sniffer.sniff(text)?;
        let template = store::template_from_value(value)?;
        Ok(self.store.add_shared_template(template))
    }

    /// 読み込み元からJSONエクスポートをインポート
    pub async fn import_from(&mut self, source: &impl PayloadSource) -> RecordResult<usize> {
        let text = source
            .read_text()
            .await
            .map_err(|e| RecordError::decode("import", e))?;
        let count = self.store.import_json(&text)?;
        tracing::info!(source = %source.describe(), count, "tests imported");
        Ok(count)
    }

    /// 終了時の最終保存（失敗時は警告を返す）
    pub fn shutdown(self) -> Option<RecordError> {
        self.store.close()
    }
}
