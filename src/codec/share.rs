// 共有リンクと外部サービス用URLの生成

use super::encode;
use super::sniff::{SHARE_PARAM, TEMPLATE_PARAM};
use crate::core::{RecordError, RecordResult, SharedSnapshot, Template};
use url::Url;

const QR_IMAGE_SIZE: &str = "200x200";
const ANONYMOUS_USER: &str = "名無し";

fn parse_base(base_url: &str) -> RecordResult<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| RecordError::validation("base_url", format!("URLが不正です: {e}")))?;
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn link_with_param(base_url: &str, param: &str, transport: &str) -> RecordResult<String> {
    let mut url = parse_base(base_url)?;
    url.query_pairs_mut().append_pair(param, transport);
    Ok(url.to_string())
}

/// クエリパラメータの値を取得
///
/// base64 に空白は現れないため、フォームデコードで空白化した '+' を元に戻す
pub(crate) fn param_value(url: &Url, param: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == param)
        .map(|(_, value)| value.replace(' ', "+"))
        .filter(|value| !value.is_empty())
}

/// URL文字列から指定パラメータの転送文字列を取り出す
pub fn extract_param(text: &str, param: &str) -> Option<String> {
    let url = Url::parse(text.trim()).ok()?;
    param_value(&url, param)
}

/// テストの共有リンクを生成（`?share=`）
pub fn share_url(base_url: &str, snapshot: &SharedSnapshot) -> RecordResult<String> {
    link_with_param(base_url, SHARE_PARAM, &encode(snapshot)?)
}

/// テンプレートの共有リンクを生成（`?template=`）
pub fn template_url(base_url: &str, template: &Template) -> RecordResult<String> {
    link_with_param(base_url, TEMPLATE_PARAM, &encode(template)?)
}

/// 外部QR生成サービスの画像URLを生成
pub fn qr_image_url(service_url: &str, link: &str) -> RecordResult<String> {
    let mut url = Url::parse(service_url)
        .map_err(|e| RecordError::validation("qr_service_url", format!("URLが不正です: {e}")))?;
    url.query_pairs_mut()
        .append_pair("size", QR_IMAGE_SIZE)
        .append_pair("data", link);
    Ok(url.to_string())
}

/// イシュー作成ページのURLを生成（タイトルと本文に共有データを埋め込む）
pub fn issue_url(tracker_url: &str, snapshot: &SharedSnapshot) -> RecordResult<String> {
    let mut url = Url::parse(tracker_url)
        .map_err(|e| RecordError::validation("issue_tracker_url", format!("URLが不正です: {e}")))?;

    let test_name = snapshot.name.as_deref().unwrap_or("テスト");
    let username = snapshot
        .username
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(ANONYMOUS_USER);
    let title = format!("[投稿] {test_name} by {username}");
    let body = format!(
        "共有データ (JSON)\n\n{}",
        serde_json::to_string_pretty(snapshot)?
    );

    url.query_pairs_mut()
        .append_pair("title", &title)
        .append_pair("body", &body);
    Ok(url.to_string())
}
