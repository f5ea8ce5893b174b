use super::read_pasted;
use crate::core::{ComparisonResult, RecordConfig};
use crate::query::{format_delta, format_number};
use crate::storage::KeyValueStorage;
use crate::App;
use anyhow::Result;

/// 比較表の文字列を作成
pub fn render_comparison(result: &ComparisonResult, remote_label: &str) -> String {
    let mut out = format!("{:<8} {:>6} {:>6} {:>6}\n", "教科", "自分", remote_label, "差");
    for row in &result.rows {
        out.push_str(&format!(
            "{:<8} {:>6} {:>6} {:>6}\n",
            row.subject_name,
            format_number(row.local_score),
            format_number(row.remote_score),
            format_delta(row.diff),
        ));
    }
    out.push_str(&format!(
        "合計     {:>6} {:>6}\n平均     {:>6} {:>6}\n",
        format_number(Some(result.local_total)),
        format_number(Some(result.remote_total)),
        format_number(Some(result.local_avg)),
        format_number(Some(result.remote_avg)),
    ));
    out
}

/// Print a share link for the selected test
pub fn execute_share<C: RecordConfig, S: KeyValueStorage>(app: &App<C, S>, qr: bool) -> Result<()> {
    let link = app.share_link()?;
    println!("🔗 {link}");
    if qr {
        println!("📱 {}", app.qr_url(&link)?);
    }
    Ok(())
}

/// Print an issue tracker URL for publishing the selected test
pub fn execute_publish<C: RecordConfig, S: KeyValueStorage>(app: &App<C, S>) -> Result<()> {
    let url = app.publish_url()?;
    println!("📮 次のURLを開いて投稿してください:");
    println!("{url}");
    Ok(())
}

/// Compare the selected test with shared data
pub async fn execute_compare<C: RecordConfig, S: KeyValueStorage>(
    app: &App<C, S>,
    text: Option<String>,
    json: bool,
) -> Result<()> {
    let text = read_pasted(text).await?;
    let (shared, result) = app.compare_pasted(&text)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let label = shared
        .username
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or("相手");
    if let Some(name) = shared.name.as_deref() {
        println!("🔍 比較対象: {name}");
    }
    print!("{}", render_comparison(&result, label));
    Ok(())
}

/// Save shared data as a new test
pub async fn execute_save_shared<C: RecordConfig, S: KeyValueStorage>(
    app: &mut App<C, S>,
    text: Option<String>,
    name: Option<String>,
) -> Result<()> {
    let text = read_pasted(text).await?;
    let shared = app.decode_shared(&text)?;
    let id = app.store.save_shared_as_test(&shared, name.as_deref());
    let test = app.store.find_test(&id)?;
    println!(
        "✅ 共有データを「{}」として保存しました ({}教科)",
        test.name,
        test.subjects.len()
    );
    Ok(())
}
