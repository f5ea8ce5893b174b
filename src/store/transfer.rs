// インポート・エクスポート・共有データの形状検証

use crate::core::{RecordError, RecordResult, SharedSnapshot, Subject, Template, TemplateSubject};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

const UNTITLED: &str = "無題";
const SHARED_TEMPLATE_NAME: &str = "共有テンプレート";

/// インポートファイル内のテスト（IDは任意）
#[derive(Debug, Clone, Deserialize)]
pub struct ImportedTest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub previous: Vec<Subject>,
}

impl ImportedTest {
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNTITLED)
            .to_string()
    }
}

/// 共有テンプレート（IDは取り込み時に振り直す）
#[derive(Debug, Clone, Deserialize)]
struct SharedTemplate {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    subjects: Vec<TemplateSubject>,
}

/// インポートJSONを解析（配列でなければ全体を拒否）
pub fn parse_import(text: &str) -> RecordResult<Vec<ImportedTest>> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| RecordError::decode("import", e.into()))?;
    let Value::Array(items) = value else {
        return Err(RecordError::validation("import", "形式が不正です（配列ではありません）"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(RecordError::validation(
                    format!("import[{index}]"),
                    "テストはオブジェクトである必要があります",
                ));
            }
            serde_json::from_value(item).map_err(|e| {
                RecordError::validation(format!("import[{index}]"), format!("形式が不正です: {e}"))
            })
        })
        .collect()
}

/// デコード済みの値を共有スナップショットとして検証
pub fn snapshot_from_value(value: Value) -> RecordResult<SharedSnapshot> {
    if !value.is_object() {
        return Err(RecordError::validation(
            "shared",
            "共有データの形式が不正です",
        ));
    }
    serde_json::from_value(value)
        .map_err(|e| RecordError::validation("shared", format!("共有データの形式が不正です: {e}")))
}

/// デコード済みの値をテンプレートとして検証（新しいIDを発行）
pub fn template_from_value(value: Value) -> RecordResult<Template> {
    if !value.is_object() {
        return Err(RecordError::validation(
            "template",
            "テンプレートの形式が不正です",
        ));
    }
    let shared: SharedTemplate = serde_json::from_value(value).map_err(|e| {
        RecordError::validation("template", format!("テンプレートの形式が不正です: {e}"))
    })?;

    let name = shared
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| SHARED_TEMPLATE_NAME.to_string());

    Ok(Template {
        id: crate::core::new_record_id(),
        name,
        subjects: shared.subjects,
    })
}

/// エクスポートファイル名（日付入り）
pub fn export_file_name(date: NaiveDate) -> String {
    format!("testRecords_{}.json", date.format("%Y-%m-%d"))
}
