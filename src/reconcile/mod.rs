// テンプレートとテストの教科構成の突き合わせ
//
// テンプレート適用は追加のみ（既存教科と点数は変更しない）。
// 自動テンプレートの同期は既存のものを更新するだけで、新規作成はしない。

use crate::core::types::subject_names;
use crate::core::{Subject, Template, TestRecord};

const DERIVED_TEMPLATE_SUFFIX: &str = "のテンプレート";

/// テスト名から自動テンプレート名を導出
pub fn derived_template_name(test_name: &str) -> String {
    format!("{test_name}{DERIVED_TEMPLATE_SUFFIX}")
}

/// テンプレートの教科のうちテストに無いものを未採点で追加
///
/// 戻り値は追加した教科数。同じテンプレートを再適用しても重複しない
pub fn apply_template(template: &Template, test: &mut TestRecord) -> usize {
    let mut added = 0;
    for name in template.subject_names() {
        if !test.has_subject(name) {
            test.subjects.push(Subject::ungraded(name));
            added += 1;
        }
    }
    added
}

/// テストに対応する自動テンプレートの教科構成を置き換える
///
/// 対応するテンプレートが無い場合は何もせず false を返す。
/// テスト名を変更すると旧テンプレートとの対応は切れる
pub fn sync_derived_template(test: &TestRecord, templates: &mut [Template]) -> bool {
    let name = derived_template_name(&test.name);
    match templates.iter_mut().find(|t| t.name == name) {
        Some(template) => {
            template.subjects = subject_names(&test.subjects);
            true
        }
        None => false,
    }
}
