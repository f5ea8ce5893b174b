// 設定管理の具象実装

use crate::core::{RecordConfig, RecordError, RecordResult};
use std::path::PathBuf;

const APP_DIR_NAME: &str = "kiroku_lot";
const FALLBACK_DIR_NAME: &str = ".kiroku_lot";
const DEFAULT_SHARE_BASE_URL: &str = "http://localhost:8080/";
const DEFAULT_ISSUE_TRACKER_URL: &str = "https://github.com/tstyr/kiroku-lot/issues/new";
const DEFAULT_QR_SERVICE_URL: &str = "https://api.qrserver.com/v1/create-qr-code/";

/// デフォルト設定実装
#[derive(Debug, Clone)]
pub struct DefaultRecordConfig {
    data_dir: PathBuf,
    share_base_url: String,
    issue_tracker_url: String,
    qr_service_url: String,
}

impl DefaultRecordConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
            issue_tracker_url: DEFAULT_ISSUE_TRACKER_URL.to_string(),
            qr_service_url: DEFAULT_QR_SERVICE_URL.to_string(),
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_share_base_url(mut self, url: impl Into<String>) -> Self {
        self.share_base_url = url.into();
        self
    }

    pub fn with_issue_tracker_url(mut self, url: impl Into<String>) -> Self {
        self.issue_tracker_url = url.into();
        self
    }

    pub fn with_qr_service_url(mut self, url: impl Into<String>) -> Self {
        self.qr_service_url = url.into();
        self
    }

    /// URL設定が http(s) であることを検証
    pub fn validate(&self) -> RecordResult<()> {
        for (field, value) in [
            ("share_base_url", &self.share_base_url),
            ("issue_tracker_url", &self.issue_tracker_url),
            ("qr_service_url", &self.qr_service_url),
        ] {
            let url = url::Url::parse(value)
                .map_err(|e| RecordError::validation(field, format!("URLが不正です: {e}")))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(RecordError::validation(
                    field,
                    "http または https のURLを指定してください",
                ));
            }
        }
        Ok(())
    }
}

impl Default for DefaultRecordConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DIR_NAME));
        Self::new(data_dir)
    }
}

impl RecordConfig for DefaultRecordConfig {
    fn data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    fn share_base_url(&self) -> String {
        self.share_base_url.clone()
    }

    fn issue_tracker_url(&self) -> String {
        self.issue_tracker_url.clone()
    }

    fn qr_service_url(&self) -> String {
        self.qr_service_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_config() {
        let config = DefaultRecordConfig::default();

        assert!(config.data_dir().ends_with(APP_DIR_NAME) || config.data_dir().ends_with(FALLBACK_DIR_NAME));
        assert_eq!(config.share_base_url(), DEFAULT_SHARE_BASE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_record_config_builder() {
        let config = DefaultRecordConfig::new("/tmp/a")
            .with_data_dir("/tmp/b")
            .with_share_base_url("https://example.com/kiroku/")
            .with_issue_tracker_url("https://example.com/issues/new")
            .with_qr_service_url("https://qr.example.com/");

        assert_eq!(config.data_dir(), PathBuf::from("/tmp/b"));
        assert_eq!(config.share_base_url(), "https://example.com/kiroku/");
        assert_eq!(config.issue_tracker_url(), "https://example.com/issues/new");
        assert_eq!(config.qr_service_url(), "https://qr.example.com/");
    }

    #[test]
    fn test_validate_rejects_non_http_urls() {
        let config = DefaultRecordConfig::new("/tmp").with_share_base_url("ftp://example.com/");
        assert!(matches!(
            config.validate(),
            Err(RecordError::ValidationError { .. })
        ));

        let config = DefaultRecordConfig::new("/tmp").with_share_base_url("example");
        assert!(config.validate().is_err());
    }
}
