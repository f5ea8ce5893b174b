use crate::core::{RecordConfig, RecordError, TestRecord};
use crate::query::{board_rows, format_delta, format_number, totals};
use crate::storage::KeyValueStorage;
use crate::App;
use anyhow::Result;

/// Prompt user for confirmation
fn confirm_delete(test_name: &str) -> Result<bool> {
    use std::io::{self, Write};

    print!("⚠️  テスト「{test_name}」を削除します。よろしいですか? [y/N]: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y")
}

/// 成績表の文字列を作成
pub fn render_board(test: &TestRecord) -> String {
    let mut out = format!("📝 {}\n", test.name);
    if test.subjects.is_empty() {
        out.push_str("   (教科がありません)\n");
    }
    for row in board_rows(test) {
        out.push_str(&format!(
            "   {:<8} {:>6}  前回 {:>6}  増減 {:>6}\n",
            row.name,
            format_number(row.score),
            format_number(row.previous),
            format_delta(row.delta),
        ));
    }

    let summary = totals(test);
    out.push_str(&format!(
        "📊 合計 {} / 平均 {}\n",
        format_number(Some(summary.total)),
        format_number(Some(summary.avg)),
    ));
    out
}

/// テスト一覧の文字列を作成（選択中は * 印）
pub fn render_test_list(tests: &[TestRecord], current: Option<&str>) -> String {
    if tests.is_empty() {
        return "テストがありません。`add-test` で追加してください。\n".to_string();
    }

    tests
        .iter()
        .map(|test| {
            let mark = if Some(test.id.as_str()) == current { "*" } else { " " };
            let summary = totals(test);
            format!(
                "{mark} {}  {}  ({}教科, 合計 {})\n",
                short_id(&test.id),
                test.name,
                test.subjects.len(),
                format_number(Some(summary.total)),
            )
        })
        .collect()
}

/// 一覧表示用の短いID
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn current_or_bail<C: RecordConfig, S: KeyValueStorage>(app: &App<C, S>) -> Result<&TestRecord> {
    app.store
        .current_test()
        .ok_or_else(|| RecordError::not_found("テスト").into())
}

/// List all tests
pub fn execute_list<C: RecordConfig, S: KeyValueStorage>(app: &App<C, S>) -> Result<()> {
    print!(
        "{}",
        render_test_list(app.store.tests(), app.store.current_test_id())
    );
    Ok(())
}

/// Show the score board of the selected test
pub fn execute_show<C: RecordConfig, S: KeyValueStorage>(app: &App<C, S>, json: bool) -> Result<()> {
    let test = current_or_bail(app)?;
    if json {
        println!("{}", serde_json::to_string_pretty(test)?);
    } else {
        print!("{}", render_board(test));
    }
    Ok(())
}

/// Select a test
pub fn execute_select<C: RecordConfig, S: KeyValueStorage>(
    app: &mut App<C, S>,
    selector: &str,
) -> Result<()> {
    let test = app.store.select_test(selector)?;
    println!("✅ 「{}」を選択しました", test.name);
    Ok(())
}

/// Add a new test
pub fn execute_add_test<C: RecordConfig, S: KeyValueStorage>(
    app: &mut App<C, S>,
    name: Option<String>,
) -> Result<()> {
    let name = name.unwrap_or_else(|| app.store.default_test_name());
    let id = app.store.add_test(&name);
    let test = current_or_bail(app)?;
    println!("✅ テスト「{}」を追加しました ({})", test.name, short_id(&id));
    Ok(())
}

/// Rename the selected test
pub fn execute_rename_test<C: RecordConfig, S: KeyValueStorage>(
    app: &mut App<C, S>,
    name: &str,
) -> Result<()> {
    if app.store.rename_current_test(name)? {
        println!("✅ テスト名を「{}」に変更しました", name.trim());
    } else {
        println!("変更はありません");
    }
    Ok(())
}

/// Delete the selected test
pub fn execute_delete_test<C: RecordConfig, S: KeyValueStorage>(
    app: &mut App<C, S>,
    yes: bool,
) -> Result<()> {
    let name = current_or_bail(app)?.name.clone();
    if !yes && !confirm_delete(&name)? {
        println!("❌ キャンセルしました");
        return Ok(());
    }

    app.store.delete_current_test()?;
    println!("🗑️  テスト「{name}」を削除しました");
    if let Some(next) = app.store.current_test() {
        println!("   選択中: {}", next.name);
    }
    Ok(())
}

/// Add a subject
pub fn execute_add_subject<C: RecordConfig, S: KeyValueStorage>(
    app: &mut App<C, S>,
    name: &str,
    score: Option<f64>,
) -> Result<()> {
    app.store.add_subject(name, score)?;
    println!("✅ 教科「{}」を追加しました", name.trim());
    Ok(())
}

/// Set or clear a score
pub fn execute_set_score<C: RecordConfig, S: KeyValueStorage>(
    app: &mut App<C, S>,
    name: &str,
    score: Option<f64>,
) -> Result<()> {
    app.store.set_score(name, score)?;
    println!("✅ {}: {}", name.trim(), format_number(score));
    Ok(())
}

/// Rename a subject
pub fn execute_rename_subject<C: RecordConfig, S: KeyValueStorage>(
    app: &mut App<C, S>,
    old_name: &str,
    new_name: &str,
) -> Result<()> {
    app.store.rename_subject(old_name, new_name)?;
    println!("✅ 教科「{old_name}」を「{}」に変更しました", new_name.trim());
    Ok(())
}

/// Delete a subject
pub fn execute_delete_subject<C: RecordConfig, S: KeyValueStorage>(
    app: &mut App<C, S>,
    name: &str,
) -> Result<()> {
    let removed = app.store.delete_subject(name)?;
    println!("🗑️  教科「{}」を削除しました", removed.name);
    Ok(())
}

/// Save current scores as the previous result
pub fn execute_save_previous<C: RecordConfig, S: KeyValueStorage>(
    app: &mut App<C, S>,
) -> Result<()> {
    app.store.save_as_previous()?;
    println!("✅ 現在の点数を前回として保存しました");
    Ok(())
}

/// Show or set the username
pub fn execute_username<C: RecordConfig, S: KeyValueStorage>(
    app: &mut App<C, S>,
    name: Option<String>,
) -> Result<()> {
    match name {
        Some(name) => {
            app.store.set_username(&name);
            match app.store.username() {
                Some(stored) => println!("✅ ユーザー名を「{stored}」に設定しました"),
                None => println!("✅ ユーザー名を削除しました"),
            }
        }
        None => match app.store.username() {
            Some(stored) => println!("{stored}"),
            None => println!("(未設定)"),
        },
    }
    Ok(())
}
