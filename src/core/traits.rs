// 記録エンジンのトレイト定義

use super::types::{SharedSnapshot, Subject, Template, TestRecord};
use mockall::automock;
use std::path::PathBuf;

/// 教科名と点数の並びとして読める記録（テスト、共有データ、テンプレート）
pub trait ScoreSheet {
    /// 表示順の (教科名, 点数) 一覧
    fn score_entries(&self) -> Vec<(&str, Option<f64>)>;
}

fn entries(subjects: &[Subject]) -> Vec<(&str, Option<f64>)> {
    subjects.iter().map(|s| (s.name.as_str(), s.score)).collect()
}

impl ScoreSheet for TestRecord {
    fn score_entries(&self) -> Vec<(&str, Option<f64>)> {
        entries(&self.subjects)
    }
}

impl ScoreSheet for SharedSnapshot {
    fn score_entries(&self) -> Vec<(&str, Option<f64>)> {
        entries(&self.subjects)
    }
}

impl ScoreSheet for Template {
    fn score_entries(&self) -> Vec<(&str, Option<f64>)> {
        self.subject_names().map(|name| (name, None)).collect()
    }
}

/// アプリケーション設定を抽象化するトレイト
#[automock]
pub trait RecordConfig: Send + Sync {
    /// 記録ファイルの保存先ディレクトリ
    fn data_dir(&self) -> PathBuf;

    /// 共有リンクの基底URL（origin + path）
    fn share_base_url(&self) -> String;

    /// 投稿用イシュー作成ページのURL
    fn issue_tracker_url(&self) -> String;

    /// QRコード画像生成サービスのURL
    fn qr_service_url(&self) -> String;
}

// RecordConfig for Box<dyn RecordConfig>
impl RecordConfig for Box<dyn RecordConfig> {
    fn data_dir(&self) -> PathBuf {
        self.as_ref().data_dir()
    }

    fn share_base_url(&self) -> String {
        self.as_ref().share_base_url()
    }

    fn issue_tracker_url(&self) -> String {
        self.as_ref().issue_tracker_url()
    }

    fn qr_service_url(&self) -> String {
        self.as_ref().qr_service_url()
    }
}
