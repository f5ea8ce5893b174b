// テスト記録とテンプレートの保持・永続化
//
// 変更操作のたびにコレクション全体を書き込む（差分書き込みはしない）。
// 検証に失敗した操作はメモリ上の状態も保存済みの状態も変更しない。

pub mod transfer;

use crate::core::{
    new_record_id, RecordError, RecordResult, SharedSnapshot, Subject, Template, TestRecord,
};
use crate::reconcile;
use crate::storage::{KeyValueStorage, CURRENT_TEST_KEY, TEMPLATES_KEY, TESTS_KEY, USERNAME_KEY};
use std::collections::HashSet;

pub use transfer::{export_file_name, parse_import, snapshot_from_value, template_from_value};

const UNTITLED: &str = "無題";
const NEW_TEST_NAME: &str = "新しいテスト";
const SHARED_TEST_NAME: &str = "共有テスト";
const TEST_TARGET: &str = "テスト";
const TEMPLATE_TARGET: &str = "テンプレート";

/// 初回起動時のサンプル
pub fn sample_tests() -> Vec<TestRecord> {
    vec![TestRecord {
        id: new_record_id(),
        name: "定期テスト（サンプル）".to_string(),
        subjects: vec![
            Subject::new("国語", Some(80.0)),
            Subject::new("数学", Some(75.0)),
            Subject::new("英語", Some(88.0)),
        ],
        previous: vec![
            Subject::new("国語", Some(78.0)),
            Subject::new("数学", Some(70.0)),
            Subject::new("英語", Some(82.0)),
        ],
    }]
}

/// ID完全一致、名前完全一致、IDの一意な前方一致の順で解決
fn resolve<'a, T>(
    items: &'a [T],
    selector: &str,
    kind: &str,
    id_of: fn(&T) -> &str,
    name_of: fn(&T) -> &str,
) -> RecordResult<&'a T> {
    let selector = selector.trim();
    if let Some(item) = items.iter().find(|item| id_of(item) == selector) {
        return Ok(item);
    }
    if let Some(item) = items.iter().find(|item| name_of(item) == selector) {
        return Ok(item);
    }
    if selector.is_empty() {
        return Err(RecordError::not_found(kind));
    }

    let matches: Vec<&T> = items
        .iter()
        .filter(|item| id_of(item).starts_with(selector))
        .collect();
    match matches.as_slice() {
        [] => Err(RecordError::not_found(format!("{kind}「{selector}」"))),
        [item] => Ok(item),
        _ => Err(RecordError::validation(
            kind,
            format!("「{selector}」に一致する{kind}が複数あります"),
        )),
    }
}

/// 読み込んだテストのID欠落・重複と空の名前を補う（変更があれば true）
fn repair_loaded(tests: &mut [TestRecord]) -> bool {
    let mut seen = HashSet::new();
    let mut changed = false;
    for test in tests.iter_mut() {
        if test.id.trim().is_empty() || !seen.insert(test.id.clone()) {
            test.id = new_record_id();
            seen.insert(test.id.clone());
            changed = true;
        }
        if test.name.trim().is_empty() {
            test.name = UNTITLED.to_string();
            changed = true;
        }
    }
    changed
}

fn subject_name(name: &str) -> RecordResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RecordError::validation("subject", "教科名を入力してください"));
    }
    Ok(trimmed.to_string())
}

fn check_score(score: Option<f64>) -> RecordResult<()> {
    match score {
        Some(value) if !value.is_finite() => Err(RecordError::validation(
            "score",
            "点数は数値で入力してください",
        )),
        _ => Ok(()),
    }
}

/// テスト記録・テンプレート・選択状態を所有するストア
pub struct RecordStore<S: KeyValueStorage> {
    storage: S,
    tests: Vec<TestRecord>,
    templates: Vec<Template>,
    current_test_id: Option<String>,
    persist_warning: Option<RecordError>,
}

impl<S: KeyValueStorage> RecordStore<S> {
    /// 保存済みデータからストアを構築
    pub fn open(storage: S) -> Self {
        let mut store = Self {
            storage,
            tests: Vec::new(),
            templates: Vec::new(),
            current_test_id: None,
            persist_warning: None,
        };
        store.tests = store.load();
        store.templates = store.load_templates();
        store.current_test_id = store.load_selection();
        store
    }

    /// テスト記録を読み込む（未保存・破損時はサンプルを作成して保存）
    pub fn load(&mut self) -> Vec<TestRecord> {
        match self.storage.read(TESTS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<TestRecord>>(&raw) {
                Ok(mut tests) => {
                    if repair_loaded(&mut tests) {
                        tracing::info!("filled in missing test ids or names");
                        match serde_json::to_string(&tests) {
                            Ok(json) => self.write_value(TESTS_KEY, &json),
                            Err(error) => {
                                self.warn(RecordError::persistence(TESTS_KEY, error.into()))
                            }
                        }
                    }
                    return tests;
                }
                Err(error) => {
                    tracing::warn!(%error, "stored test records are corrupt; recreating sample");
                }
            },
            Ok(None) => {}
            Err(error) => {
                // 読み込み自体に失敗した場合は既存データを上書きしない
                tracing::warn!(%error, "failed to read test records; using in-memory sample");
                self.persist_warning = Some(RecordError::persistence(TESTS_KEY, error));
                return sample_tests();
            }
        }

        let sample = sample_tests();
        match serde_json::to_string(&sample) {
            Ok(json) => self.write_value(TESTS_KEY, &json),
            Err(error) => self.warn(RecordError::persistence(TESTS_KEY, error.into())),
        }
        sample
    }

    /// テンプレートを読み込む（未保存・破損時は空）
    pub fn load_templates(&mut self) -> Vec<Template> {
        match self.storage.read(TEMPLATES_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|error| {
                tracing::warn!(%error, "stored templates are corrupt; starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(error) => {
                tracing::warn!(%error, "failed to read templates; starting empty");
                Vec::new()
            }
        }
    }

    fn load_selection(&self) -> Option<String> {
        let stored = self.storage.read(CURRENT_TEST_KEY).ok().flatten();
        stored
            .filter(|id| self.tests.iter().any(|t| &t.id == id))
            .or_else(|| self.tests.first().map(|t| t.id.clone()))
    }

    /// テスト記録全体を保存
    pub fn save(&mut self) {
        match serde_json::to_string(&self.tests) {
            Ok(json) => self.write_value(TESTS_KEY, &json),
            Err(error) => self.warn(RecordError::persistence(TESTS_KEY, error.into())),
        }
    }

    /// テンプレート全体を保存
    pub fn save_templates(&mut self) {
        match serde_json::to_string(&self.templates) {
            Ok(json) => self.write_value(TEMPLATES_KEY, &json),
            Err(error) => self.warn(RecordError::persistence(TEMPLATES_KEY, error.into())),
        }
    }

    fn write_value(&mut self, key: &str, value: &str) {
        if let Err(error) = self.storage.write(key, value) {
            self.warn(RecordError::persistence(key, error));
        }
    }

    fn warn(&mut self, error: RecordError) {
        tracing::warn!(%error, "persist failed; changes are kept in memory only");
        self.persist_warning = Some(error);
    }

    /// 直近の永続化失敗を取り出す
    pub fn take_persist_warning(&mut self) -> Option<RecordError> {
        self.persist_warning.take()
    }

    /// 終了時の最終保存
    pub fn close(mut self) -> Option<RecordError> {
        self.save();
        self.save_templates();
        self.persist_warning
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn tests(&self) -> &[TestRecord] {
        &self.tests
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn current_test_id(&self) -> Option<&str> {
        self.current_test_id.as_deref()
    }

    pub fn current_test(&self) -> Option<&TestRecord> {
        let id = self.current_test_id.as_deref()?;
        self.tests.iter().find(|t| t.id == id)
    }

    fn current_index(&self) -> RecordResult<usize> {
        let id = self
            .current_test_id
            .as_deref()
            .ok_or_else(|| RecordError::not_found(TEST_TARGET))?;
        self.tests
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| RecordError::not_found(TEST_TARGET))
    }

    fn set_current(&mut self, id: Option<String>) {
        match &id {
            Some(id) => self.write_value(CURRENT_TEST_KEY, id),
            None => {
                if let Err(error) = self.storage.remove(CURRENT_TEST_KEY) {
                    self.warn(RecordError::persistence(CURRENT_TEST_KEY, error));
                }
            }
        }
        self.current_test_id = id;
    }

    // ========================================
    // テストの操作
    // ========================================

    /// テストを検索（ID、名前、IDの前方一致）
    pub fn find_test(&self, selector: &str) -> RecordResult<&TestRecord> {
        resolve(
            &self.tests,
            selector,
            TEST_TARGET,
            |t| t.id.as_str(),
            |t| t.name.as_str(),
        )
    }

    /// テストを選択
    pub fn select_test(&mut self, selector: &str) -> RecordResult<&TestRecord> {
        let id = self.find_test(selector)?.id.clone();
        self.set_current(Some(id));
        let index = self.current_index()?;
        Ok(&self.tests[index])
    }

    /// この実行中だけテストを選択（保存済みの選択は変更しない）
    pub fn focus_test(&mut self, selector: &str) -> RecordResult<&TestRecord> {
        let id = self.find_test(selector)?.id.clone();
        self.current_test_id = Some(id);
        let index = self.current_index()?;
        Ok(&self.tests[index])
    }

    /// 新規テスト名の既定値
    pub fn default_test_name(&self) -> String {
        format!("テスト {}", self.tests.len() + 1)
    }

    /// テストを追加して選択（空の名前は「無題」）
    pub fn add_test(&mut self, name: &str) -> String {
        let name = match name.trim() {
            "" => UNTITLED,
            trimmed => trimmed,
        };
        let test = TestRecord::new(name);
        let id = test.id.clone();
        self.tests.push(test);
        self.save();
        self.set_current(Some(id.clone()));
        id
    }

    /// 選択中テストの名前を変更（空または同名なら何もしない）
    ///
    /// 旧名に対応する自動テンプレートとの対応は切れる
    pub fn rename_current_test(&mut self, new_name: &str) -> RecordResult<bool> {
        let index = self.current_index()?;
        let new_name = new_name.trim();
        if new_name.is_empty() || new_name == self.tests[index].name {
            return Ok(false);
        }
        self.tests[index].name = new_name.to_string();
        self.save();
        Ok(true)
    }

    /// 選択中テストを削除（選択は先頭のテストへ移る）
    pub fn delete_current_test(&mut self) -> RecordResult<TestRecord> {
        let index = self.current_index()?;
        let removed = self.tests.remove(index);
        let next = self.tests.first().map(|t| t.id.clone());
        self.save();
        self.set_current(next);
        Ok(removed)
    }

    // ========================================
    // 教科の操作
    // ========================================

    /// 選択中テストに教科を追加
    pub fn add_subject(&mut self, name: &str, score: Option<f64>) -> RecordResult<()> {
        let name = subject_name(name)?;
        check_score(score)?;
        let index = self.current_index()?;
        if self.tests[index].has_subject(&name) {
            return Err(RecordError::validation(
                "subject",
                format!("教科「{name}」は既に存在します"),
            ));
        }

        self.tests[index].subjects.push(Subject::new(name, score));
        self.save();
        self.sync_derived_template(index);
        Ok(())
    }

    /// 教科の点数を設定（None で未採点）
    pub fn set_score(&mut self, name: &str, score: Option<f64>) -> RecordResult<()> {
        check_score(score)?;
        let index = self.current_index()?;
        let subject = self.tests[index]
            .subject_mut(name.trim())
            .ok_or_else(|| RecordError::not_found(format!("教科「{}」", name.trim())))?;
        subject.score = score;
        self.save();
        Ok(())
    }

    /// 教科名を変更
    pub fn rename_subject(&mut self, old_name: &str, new_name: &str) -> RecordResult<()> {
        let old_name = old_name.trim();
        let new_name = subject_name(new_name)?;
        let index = self.current_index()?;
        let test = &self.tests[index];
        if !test.has_subject(old_name) {
            return Err(RecordError::not_found(format!("教科「{old_name}」")));
        }
        if old_name == new_name {
            return Ok(());
        }
        if test.has_subject(&new_name) {
            return Err(RecordError::validation(
                "subject",
                format!("教科「{new_name}」は既に存在します"),
            ));
        }

        if let Some(subject) = self.tests[index].subject_mut(old_name) {
            subject.name = new_name;
        }
        self.save();
        self.sync_derived_template(index);
        Ok(())
    }

    /// 教科を削除
    ///
    /// テンプレートからは削除しない（テンプレート側は追加方向にのみ同期）
    pub fn delete_subject(&mut self, name: &str) -> RecordResult<Subject> {
        let name = name.trim();
        let index = self.current_index()?;
        let position = self.tests[index]
            .subjects
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| RecordError::not_found(format!("教科「{name}」")))?;
        let removed = self.tests[index].subjects.remove(position);
        self.save();
        Ok(removed)
    }

    /// 現在の点数を「前回」として保存
    pub fn save_as_previous(&mut self) -> RecordResult<()> {
        let index = self.current_index()?;
        let test = &mut self.tests[index];
        test.previous = test.subjects.clone();
        self.save();
        Ok(())
    }

    fn sync_derived_template(&mut self, index: usize) {
        if reconcile::sync_derived_template(&self.tests[index], &mut self.templates) {
            tracing::debug!(test = %self.tests[index].name, "derived template re-synced");
            self.save_templates();
        }
    }

    // ========================================
    // テンプレートの操作
    // ========================================

    /// テンプレートを検索（ID、名前、IDの前方一致）
    pub fn find_template(&self, selector: &str) -> RecordResult<&Template> {
        resolve(
            &self.templates,
            selector,
            TEMPLATE_TARGET,
            |t| t.id.as_str(),
            |t| t.name.as_str(),
        )
    }

    /// 選択中テストの教科構成をテンプレートとして保存
    ///
    /// 名前省略時は自動テンプレート名（以後、教科の追加・変更に追従する）
    pub fn save_as_template(&mut self, name: Option<&str>) -> RecordResult<String> {
        let index = self.current_index()?;
        let test = &self.tests[index];
        let name = match name.map(str::trim) {
            Some("") => {
                return Err(RecordError::validation(
                    "template",
                    "テンプレート名を入力してください",
                ))
            }
            Some(name) => name.to_string(),
            None => reconcile::derived_template_name(&test.name),
        };

        let template = Template::from_test(test, name);
        let id = template.id.clone();
        self.templates.push(template);
        self.save_templates();
        Ok(id)
    }

    /// テンプレートの教科を選択中テストへ追加
    ///
    /// テストが無ければ新規作成する。戻り値は追加した教科数
    pub fn apply_template(&mut self, selector: &str) -> RecordResult<usize> {
        let template = self.find_template(selector)?.clone();
        if self.current_index().is_err() {
            self.add_test(NEW_TEST_NAME);
        }
        let index = self.current_index()?;

        let added = reconcile::apply_template(&template, &mut self.tests[index]);
        self.save();
        if added > 0 {
            self.sync_derived_template(index);
        }
        Ok(added)
    }

    /// 共有されたテンプレートを追加（既存のものは上書きしない）
    pub fn add_shared_template(&mut self, mut template: Template) -> String {
        template.id = new_record_id();
        let id = template.id.clone();
        self.templates.push(template);
        self.save_templates();
        id
    }

    // ========================================
    // 共有・インポート・エクスポート
    // ========================================

    /// 共有時に添付するユーザー名
    pub fn username(&self) -> Option<String> {
        match self.storage.read(USERNAME_KEY) {
            Ok(value) => value.filter(|name| !name.trim().is_empty()),
            Err(error) => {
                tracing::warn!(%error, "failed to read username");
                None
            }
        }
    }

    /// ユーザー名を設定（空なら削除）
    pub fn set_username(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            if let Err(error) = self.storage.remove(USERNAME_KEY) {
                self.warn(RecordError::persistence(USERNAME_KEY, error));
            }
        } else {
            self.write_value(USERNAME_KEY, name);
        }
    }

    /// 選択中テストの共有スナップショット
    pub fn share_snapshot(&self) -> RecordResult<SharedSnapshot> {
        let index = self.current_index()?;
        Ok(SharedSnapshot::from_test(
            &self.tests[index],
            self.username().as_deref(),
        ))
    }

    /// 共有データを新しいテストとして保存（常に新しいIDを発行）
    pub fn save_shared_as_test(&mut self, shared: &SharedSnapshot, name: Option<&str>) -> String {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .or_else(|| shared.name.as_deref().map(str::trim).filter(|n| !n.is_empty()))
            .unwrap_or(SHARED_TEST_NAME)
            .to_string();

        let test = TestRecord {
            id: new_record_id(),
            name,
            subjects: shared.subjects.clone(),
            previous: shared.previous.clone(),
        };
        let id = test.id.clone();
        self.tests.push(test);
        self.save();
        id
    }

    /// JSON配列のテストを追加でインポート
    ///
    /// IDが無いもの・既存と衝突するものには新しいIDを発行する。
    /// 1件でも形式が不正なら全体を拒否する
    pub fn import_json(&mut self, text: &str) -> RecordResult<usize> {
        let imported = parse_import(text)?;
        let mut used: HashSet<String> = self.tests.iter().map(|t| t.id.clone()).collect();

        let count = imported.len();
        for item in imported {
            let name = item.display_name();
            let id = match item.id {
                Some(id) if !id.trim().is_empty() && !used.contains(&id) => id,
                _ => new_record_id(),
            };
            used.insert(id.clone());
            self.tests.push(TestRecord {
                id,
                name,
                subjects: item.subjects,
                previous: item.previous,
            });
        }
        self.save();

        if self.current_index().is_err() {
            let first = self.tests.first().map(|t| t.id.clone());
            self.set_current(first);
        }
        Ok(count)
    }

    /// 全テストを整形済みJSONとしてエクスポート
    pub fn export_json(&self) -> RecordResult<String> {
        Ok(serde_json::to_string_pretty(&self.tests)?)
    }
}
