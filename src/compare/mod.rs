// ローカル記録と共有記録の比較
//
// 副作用を持たない純粋関数。ローカル記録の編集ごとに再計算してよい

use crate::core::{ComparisonResult, ComparisonRow, ScoreSheet};
use crate::query::totals_of;

fn lookup(entries: &[(&str, Option<f64>)], name: &str) -> Option<f64> {
    entries
        .iter()
        .find(|(n, _)| *n == name)
        .and_then(|(_, score)| *score)
}

/// 教科名ごとの比較表と双方の合計・平均を計算
///
/// 教科の並びはローカルの順、続いて共有側のみの教科を共有側の順で追加する。
/// 同名の教科が複数ある場合は各側で最初のものを使う
pub fn compare(local: &impl ScoreSheet, remote: &impl ScoreSheet) -> ComparisonResult {
    let local_entries = local.score_entries();
    let remote_entries = remote.score_entries();

    let mut names: Vec<&str> = Vec::with_capacity(local_entries.len() + remote_entries.len());
    for (name, _) in local_entries.iter().chain(remote_entries.iter()) {
        if !names.contains(name) {
            names.push(*name);
        }
    }

    let rows: Vec<ComparisonRow> = names
        .into_iter()
        .map(|name| {
            let local_score = lookup(&local_entries, name);
            let remote_score = lookup(&remote_entries, name);
            let diff = match (local_score, remote_score) {
                (Some(a), Some(b)) => Some(a - b),
                _ => None,
            };
            ComparisonRow {
                subject_name: name.to_string(),
                local_score,
                remote_score,
                diff,
            }
        })
        .collect();

    let local_totals = totals_of(rows.iter().map(|r| r.local_score));
    let remote_totals = totals_of(rows.iter().map(|r| r.remote_score));

    ComparisonResult {
        rows,
        local_total: local_totals.total,
        local_avg: local_totals.avg,
        remote_total: remote_totals.total,
        remote_avg: remote_totals.avg,
    }
}
