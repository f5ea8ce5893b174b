// 統合テスト - 公開APIをエンドツーエンドで検証

mod fixtures;
mod test_end_to_end;
mod test_error_handling;
mod test_properties;
