// コアレイヤー - データ型、トレイト、エラー定義
// 他のレイヤーから参照される基本的な抽象化を提供

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ErrorContext, ErrorSeverity, RecordError, RecordResult};
pub use traits::{RecordConfig, ScoreSheet};
pub use types::{
    new_record_id, BoardRow, ComparisonResult, ComparisonRow, SharedSnapshot, Subject, Template,
    TemplateSubject, TestRecord, Totals,
};
