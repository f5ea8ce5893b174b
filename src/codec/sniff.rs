// 貼り付けテキストの形式推定デコード
//
// 貼り付け元は共有リンク、転送文字列、JSONエクスポートのいずれもあり得るため、
// デコード戦略を優先順に試し、最初に成功したものを採用する

use super::decode_value;
use crate::core::{RecordError, RecordResult};
use serde_json::Value;
use url::Url;

/// 共有データを運ぶクエリパラメータ名
pub const SHARE_PARAM: &str = "share";
/// テンプレートを運ぶクエリパラメータ名
pub const TEMPLATE_PARAM: &str = "template";

/// 単一のデコード戦略
pub trait DecodeStrategy: Send + Sync {
    /// ログ出力用の戦略名
    fn name(&self) -> &'static str;

    /// テキストのデコードを試みる
    fn try_decode(&self, text: &str) -> RecordResult<Value>;
}

/// URLのクエリパラメータから転送文字列を取り出す戦略
#[derive(Debug, Clone)]
pub struct UrlParamStrategy {
    params: Vec<&'static str>,
}

impl UrlParamStrategy {
    pub fn new(params: Vec<&'static str>) -> Self {
        Self { params }
    }
}

impl Default for UrlParamStrategy {
    fn default() -> Self {
        Self::new(vec![SHARE_PARAM, TEMPLATE_PARAM])
    }
}

impl DecodeStrategy for UrlParamStrategy {
    fn name(&self) -> &'static str {
        "url_param"
    }

    fn try_decode(&self, text: &str) -> RecordResult<Value> {
        let url = Url::parse(text.trim()).map_err(|e| RecordError::decode("url", e.into()))?;
        let transport = self
            .params
            .iter()
            .find_map(|param| super::share::param_value(&url, param))
            .ok_or_else(|| {
                RecordError::decode("url", anyhow::anyhow!("共有パラメータがありません"))
            })?;
        decode_value(&transport)
    }
}

/// JSONテキストを直接解析する戦略
#[derive(Debug, Clone, Default)]
pub struct RawJsonStrategy;

impl DecodeStrategy for RawJsonStrategy {
    fn name(&self) -> &'static str {
        "raw_json"
    }

    fn try_decode(&self, text: &str) -> RecordResult<Value> {
        let trimmed = text.trim();
        if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
            return Err(RecordError::decode(
                "json",
                anyhow::anyhow!("JSONオブジェクトまたは配列ではありません"),
            ));
        }
        serde_json::from_str(trimmed).map_err(|e| RecordError::decode("json", e.into()))
    }
}

/// 転送文字列として直接デコードする戦略
#[derive(Debug, Clone, Default)]
pub struct TransportStrategy;

impl DecodeStrategy for TransportStrategy {
    fn name(&self) -> &'static str {
        "transport"
    }

    fn try_decode(&self, text: &str) -> RecordResult<Value> {
        decode_value(text.trim())
    }
}

/// デコード戦略を優先順に試す推定デコーダ
pub struct Sniffer {
    strategies: Vec<Box<dyn DecodeStrategy>>,
}

impl Default for Sniffer {
    fn default() -> Self {
        Self::new(vec![
            Box::new(UrlParamStrategy::default()),
            Box::new(RawJsonStrategy),
            Box::new(TransportStrategy),
        ])
    }
}

impl Sniffer {
    pub fn new(strategies: Vec<Box<dyn DecodeStrategy>>) -> Self {
        Self { strategies }
    }

    /// URLからは指定パラメータのみを受け付ける推定デコーダ
    pub fn for_param(param: &'static str) -> Self {
        Self::new(vec![
            Box::new(UrlParamStrategy::new(vec![param])),
            Box::new(RawJsonStrategy),
            Box::new(TransportStrategy),
        ])
    }

    /// 共有スナップショット用（`?share=` のみ）
    pub fn for_share() -> Self {
        Self::for_param(SHARE_PARAM)
    }

    /// 共有テンプレート用（`?template=` のみ）
    pub fn for_template() -> Self {
        Self::for_param(TEMPLATE_PARAM)
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// 全戦略を試し、すべて失敗した場合はデコードエラーを返す
    pub fn sniff(&self, text: &str) -> RecordResult<Value> {
        if text.trim().is_empty() {
            return Err(RecordError::decode(
                "sniff",
                anyhow::anyhow!("貼り付けデータが空です"),
            ));
        }

        for strategy in &self.strategies {
            match strategy.try_decode(text) {
                Ok(value) => {
                    tracing::debug!(strategy = strategy.name(), "shared data decoded");
                    return Ok(value);
                }
                Err(error) => {
                    tracing::debug!(strategy = strategy.name(), %error, "decode strategy skipped");
                }
            }
        }

        Err(RecordError::decode(
            "sniff",
            anyhow::anyhow!("いずれの形式としても解釈できません"),
        ))
    }

    /// 失敗時は None（ユーザー向けの形式エラー表示に使う）
    pub fn sniff_or_none(&self, text: &str) -> Option<Value> {
        match self.sniff(text) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(%error, "pasted text could not be decoded");
                None
            }
        }
    }
}

/// 既定の戦略順で貼り付けテキストをデコード
pub fn sniff_and_decode(text: &str) -> Option<Value> {
    Sniffer::default().sniff_or_none(text)
}
