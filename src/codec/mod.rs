// 共有用の転送文字列コーデック
//
// 構造体 -> JSON -> UTF-8バイト列 -> base64 の可逆変換
// - codec/sniff.rs  - 貼り付けテキストの形式推定デコード
// - codec/share.rs  - 共有リンク、QR画像URL、投稿URLの生成

pub mod share;
pub mod sniff;

use crate::core::{RecordError, RecordResult};
use base64::alphabet;
use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use share::{extract_param, issue_url, qr_image_url, share_url, template_url};
pub use sniff::{sniff_and_decode, DecodeStrategy, Sniffer};

const LENIENT_CONFIG: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// パディング有無を問わない標準アルファベット
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT_CONFIG);

/// パディング有無を問わないURLセーフアルファベット
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT_CONFIG);

/// 値を転送文字列にエンコード
pub fn encode<T: Serialize + ?Sized>(value: &T) -> RecordResult<String> {
    let json = serde_json::to_string(value)?;
    Ok(STANDARD.encode(json.as_bytes()))
}

/// 転送文字列をJSON値にデコード
///
/// 形状の検証は行わない（オブジェクト以外もそのまま返す）
pub fn decode_value(transport: &str) -> RecordResult<serde_json::Value> {
    let json = decode_to_json_text(transport)?;
    serde_json::from_str(&json).map_err(|e| RecordError::decode("json", e.into()))
}

/// 転送文字列を型付きの値にデコード
pub fn decode<T: DeserializeOwned>(transport: &str) -> RecordResult<T> {
    let value = decode_value(transport)?;
    serde_json::from_value(value).map_err(|e| RecordError::decode("shape", e.into()))
}

fn decode_to_json_text(transport: &str) -> RecordResult<String> {
    // コピー時に混入した改行・空白は無視する
    let compact: String = transport
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return Err(RecordError::decode(
            "base64",
            anyhow::anyhow!("空の転送文字列です"),
        ));
    }

    let bytes = LENIENT_STANDARD
        .decode(compact.as_bytes())
        .or_else(|_| LENIENT_URL_SAFE.decode(compact.as_bytes()))
        .map_err(|e| RecordError::decode("base64", e.into()))?;

    String::from_utf8(bytes).map_err(|e| RecordError::decode("utf8", e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SharedSnapshot, Subject, Template, TemplateSubject, TestRecord};
    use serde_json::json;

    fn sample_test() -> TestRecord {
        TestRecord {
            id: "abc1234".into(),
            name: "定期テスト".into(),
            subjects: vec![
                Subject::new("国語", Some(80.0)),
                Subject::ungraded("数学"),
                Subject::new("英語", Some(88.5)),
            ],
            previous: vec![Subject::new("国語", Some(78.0))],
        }
    }

    #[test]
    fn test_test_record_round_trip_with_unicode_and_nulls() {
        let test = sample_test();
        let decoded: TestRecord = decode(&encode(&test).unwrap()).unwrap();
        assert_eq!(decoded, test);
    }

    #[test]
    fn test_fractional_scores_round_trip_exactly() {
        // 線形合同法で再現可能な端数付き点数を生成
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next_score = || {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 11) as f64 / (1u64 << 53) as f64 * 100.0
        };

        let mut test = TestRecord::new("端数");
        test.subjects = (0..5_000)
            .map(|i| Subject::new(format!("教科{i}"), Some(next_score())))
            .collect();
        test.previous = vec![
            Subject::new("a", Some(24.119385920125694)),
            Subject::new("b", Some(91.45055071005739)),
            Subject::new("c", Some(0.1 + 0.2)),
        ];

        let decoded: TestRecord = decode(&encode(&test).unwrap()).unwrap();
        let mismatches: Vec<_> = test
            .subjects
            .iter()
            .chain(&test.previous)
            .zip(decoded.subjects.iter().chain(&decoded.previous))
            .filter(|(a, b)| a.score != b.score)
            .map(|(a, b)| (a.score, b.score))
            .collect();
        assert!(mismatches.is_empty(), "mismatches: {mismatches:?}");
        assert_eq!(decoded, test);
    }

    #[test]
    fn test_template_round_trip() {
        let template = Template {
            id: "tpl".into(),
            name: "定期テストのテンプレート".into(),
            subjects: vec![TemplateSubject { name: "社会".into() }],
        };
        let decoded: Template = decode(&encode(&template).unwrap()).unwrap();
        assert_eq!(decoded, template);
    }

    #[test]
    fn test_snapshot_round_trip_keeps_username() {
        let snapshot = SharedSnapshot::from_test(&sample_test(), Some("花子"));
        let decoded: SharedSnapshot = decode(&encode(&snapshot).unwrap()).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_encoding_matches_browser_btoa_of_utf8() {
        // btoa(unescape(encodeURIComponent('{"name":"国語"}')))
        let encoded = encode(&json!({"name": "国語"})).unwrap();
        assert_eq!(encoded, "eyJuYW1lIjoi5Zu96KqeIn0=");
    }

    #[test]
    fn test_decode_accepts_unpadded_and_url_safe_input() {
        let value = json!({"name": "国語?>>"});
        let standard = encode(&value).unwrap();

        let unpadded = standard.trim_end_matches('=');
        assert_eq!(decode_value(unpadded).unwrap(), value);

        let url_safe = standard.replace('+', "-").replace('/', "_");
        assert_eq!(decode_value(&url_safe).unwrap(), value);

        let wrapped = format!("{}\n{}", &standard[..4], &standard[4..]);
        assert_eq!(decode_value(&wrapped).unwrap(), value);
    }

    #[test]
    fn test_decode_returns_non_object_json_as_is() {
        let encoded = encode(&json!([1, 2, 3])).unwrap();
        assert_eq!(decode_value(&encoded).unwrap(), json!([1, 2, 3]));
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            decode_value(""),
            Err(RecordError::DecodeError { .. })
        ));
        assert!(matches!(
            decode_value("!!!not base64!!!"),
            Err(RecordError::DecodeError { .. })
        ));
        // "not json" を base64 化したもの
        let encoded = STANDARD.encode("not json");
        assert!(matches!(
            decode_value(&encoded),
            Err(RecordError::DecodeError { .. })
        ));
        // 不正なUTF-8
        let encoded = STANDARD.encode([0xff, 0xfe, 0xfd]);
        assert!(matches!(
            decode_value(&encoded),
            Err(RecordError::DecodeError { .. })
        ));
    }
}
