// 記録データ型定義

use serde::{Deserialize, Serialize};

/// 新しいローカルIDを発行
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// 点数のシリアライズ規則
///
/// 整数値は整数として書き出し、数値以外（文字列等）は未採点として読み込む
mod score_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

    pub fn serialize<S: Serializer>(score: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match score {
            Some(value) if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER => {
                serializer.serialize_i64(*value as i64)
            }
            Some(value) => serializer.serialize_f64(*value),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(value.and_then(|v| v.as_f64()))
    }
}

/// 教科（名前と任意の点数）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(default)]
    pub name: String,
    #[serde(
        default,
        serialize_with = "score_serde::serialize",
        deserialize_with = "score_serde::deserialize"
    )]
    pub score: Option<f64>,
}

impl Subject {
    pub fn new(name: impl Into<String>, score: Option<f64>) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }

    pub fn ungraded(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }
}

/// テスト記録
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    /// 「前回として保存」時点のスナップショット（差分表示専用）
    #[serde(default)]
    pub previous: Vec<Subject>,
}

impl TestRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_record_id(),
            name: name.into(),
            subjects: Vec::new(),
            previous: Vec::new(),
        }
    }

    pub fn subject(&self, name: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.name == name)
    }

    pub fn subject_mut(&mut self, name: &str) -> Option<&mut Subject> {
        self.subjects.iter_mut().find(|s| s.name == name)
    }

    pub fn has_subject(&self, name: &str) -> bool {
        self.subject(name).is_some()
    }
}

/// テンプレートの教科（点数は持たない）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSubject {
    #[serde(default)]
    pub name: String,
}

/// 教科構成のテンプレート
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subjects: Vec<TemplateSubject>,
}

impl Template {
    /// テストの教科構成からテンプレートを作成（点数は除去）
    pub fn from_test(test: &TestRecord, name: impl Into<String>) -> Self {
        Self {
            id: new_record_id(),
            name: name.into(),
            subjects: subject_names(&test.subjects),
        }
    }

    pub fn subject_names(&self) -> impl Iterator<Item = &str> {
        self.subjects.iter().map(|s| s.name.as_str())
    }
}

/// 教科一覧から名前のみのリストを作成
pub fn subject_names(subjects: &[Subject]) -> Vec<TemplateSubject> {
    subjects
        .iter()
        .map(|s| TemplateSubject {
            name: s.name.clone(),
        })
        .collect()
}

/// 共有用スナップショット（テスト＋ユーザー名）
///
/// ローカルのIDとの整合性は保証されない
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SharedSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub previous: Vec<Subject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl SharedSnapshot {
    pub fn from_test(test: &TestRecord, username: Option<&str>) -> Self {
        Self {
            id: Some(test.id.clone()),
            name: Some(test.name.clone()),
            subjects: test.subjects.clone(),
            previous: test.previous.clone(),
            username: username.map(str::to_string),
        }
    }
}

/// 合計と平均（数値の点数のみ対象）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Totals {
    pub total: f64,
    pub avg: f64,
    pub count: usize,
}

/// 比較表の1行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub subject_name: String,
    pub local_score: Option<f64>,
    pub remote_score: Option<f64>,
    /// 両方に点数がある場合のみ local - remote
    pub diff: Option<f64>,
}

/// ローカルと共有データの比較結果（永続化しない）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub rows: Vec<ComparisonRow>,
    pub local_total: f64,
    pub local_avg: f64,
    pub remote_total: f64,
    pub remote_avg: f64,
}

/// 成績表の1行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardRow {
    pub name: String,
    pub score: Option<f64>,
    pub previous: Option<f64>,
    pub delta: Option<f64>,
}
