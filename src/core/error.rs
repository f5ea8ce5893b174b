// 記録エンジンのエラー型定義

use thiserror::Error;

/// 記録エンジン固有のエラー型
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("デコードエラー: {stage} - {source}")]
    DecodeError {
        stage: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("対象が見つかりません: {target}")]
    NotFoundError { target: String },

    #[error("バリデーションエラー: {field} - {reason}")]
    ValidationError { field: String, reason: String },

    #[error("永続化エラー: {key} - {source}")]
    PersistenceError {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("内部エラー: {source}")]
    InternalError {
        #[source]
        source: anyhow::Error,
    },
}

impl RecordError {
    /// デコードエラーの作成
    pub fn decode(stage: impl Into<String>, source: anyhow::Error) -> Self {
        Self::DecodeError {
            stage: stage.into(),
            source,
        }
    }

    /// 対象不在エラーの作成
    pub fn not_found(target: impl Into<String>) -> Self {
        Self::NotFoundError {
            target: target.into(),
        }
    }

    /// バリデーションエラーの作成
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// 永続化エラーの作成
    pub fn persistence(key: impl Into<String>, source: anyhow::Error) -> Self {
        Self::PersistenceError {
            key: key.into(),
            source,
        }
    }

    /// 内部エラーの作成
    pub fn internal(source: anyhow::Error) -> Self {
        Self::InternalError { source }
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::DecodeError { .. } | Self::NotFoundError { .. } => ErrorSeverity::Low,
            Self::ValidationError { .. } => ErrorSeverity::Medium,
            Self::PersistenceError { .. } => ErrorSeverity::High,
            Self::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// エラーが回復可能かどうかを判定
    ///
    /// 内部エラー以外は状態を変更せずに操作を中断するだけなので回復可能
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InternalError { .. })
    }

    /// エラーコンテキストを取得
    pub fn context(&self) -> ErrorContext {
        match self {
            Self::DecodeError { stage, .. } => ErrorContext::new("decode")
                .with_resource(stage.clone())
                .with_suggestion("共有データの形式が不正です"),
            Self::NotFoundError { target } => ErrorContext::new("lookup")
                .with_resource(target.clone())
                .with_suggestion(format!("{target}が見つかりません")),
            Self::ValidationError { field, reason } => ErrorContext::new("validation")
                .with_resource(field.clone())
                .with_suggestion(reason.clone()),
            Self::PersistenceError { key, .. } => ErrorContext::new("persistence")
                .with_resource(key.clone())
                .with_suggestion("保存に失敗しました。変更はこのセッション内のみ保持されます"),
            Self::InternalError { .. } => ErrorContext::new("internal"),
        }
    }

    /// ユーザー向けメッセージを取得
    pub fn user_message(&self) -> String {
        self.context()
            .suggestion
            .unwrap_or_else(|| self.to_string())
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 低重要度 - メッセージ表示のみ
    Low,
    /// 中重要度 - 操作全体を拒否
    Medium,
    /// 高重要度 - データが保存されていない可能性
    High,
    /// 致命的
    Critical,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// エラーコンテキスト情報
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// 実行していた操作
    pub operation: String,
    /// 関連するリソース（キー、フィールド名等）
    pub resource: Option<String>,
    /// ユーザーへの案内
    pub suggestion: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            resource: None,
            suggestion: None,
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// 記録エンジンの結果型
pub type RecordResult<T> = std::result::Result<T, RecordError>;

impl From<serde_json::Error> for RecordError {
    fn from(error: serde_json::Error) -> Self {
        RecordError::InternalError {
            source: error.into(),
        }
    }
}
