// 表示用の読み取り専用ヘルパー
//
// 点数が数値の教科のみを合計・平均の対象とする

use crate::core::{BoardRow, ScoreSheet, Subject, TestRecord, Totals};

/// 未採点・差分なしの表示記号
pub const ABSENT_MARK: &str = "—";

/// 小数第2位に丸める（0.5 は0から遠い方へ）
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 点数の一覧から合計と平均を計算
pub fn totals_of<I>(scores: I) -> Totals
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (total, count) = scores
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, n), score| (sum + score, n + 1));
    let avg = if count == 0 { 0.0 } else { total / count as f64 };

    Totals {
        total: round2(total),
        avg: round2(avg),
        count,
    }
}

/// 記録の合計と平均
pub fn totals(sheet: &impl ScoreSheet) -> Totals {
    totals_of(sheet.score_entries().into_iter().map(|(_, score)| score))
}

/// 前回スナップショットから教科の点数を取得（同名は後勝ち）
pub fn previous_score(name: &str, previous: &[Subject]) -> Option<f64> {
    previous
        .iter()
        .rev()
        .find(|s| s.name == name)
        .and_then(|s| s.score)
}

/// 前回からの増減（両方が数値の場合のみ）
pub fn delta(subject: &Subject, previous: &[Subject]) -> Option<f64> {
    let current = subject.score?;
    let prev = previous_score(&subject.name, previous)?;
    Some(current - prev)
}

/// 成績表の行を作成
pub fn board_rows(test: &TestRecord) -> Vec<BoardRow> {
    test.subjects
        .iter()
        .map(|subject| BoardRow {
            name: subject.name.clone(),
            score: subject.score,
            previous: previous_score(&subject.name, &test.previous),
            delta: delta(subject, &test.previous),
        })
        .collect()
}

/// 数値の表示（整数は小数点なし、未採点は記号）
pub fn format_number(value: Option<f64>) -> String {
    match value {
        Some(v) => {
            let rounded = round2(v);
            if rounded.fract() == 0.0 {
                format!("{}", rounded as i64)
            } else {
                format!("{rounded}")
            }
        }
        None => ABSENT_MARK.to_string(),
    }
}

/// 増減の表示（0以上は + 付き）
pub fn format_delta(value: Option<f64>) -> String {
    match value {
        Some(v) if round2(v) >= 0.0 => format!("+{}", format_number(Some(v.abs()))),
        Some(v) => format_number(Some(v)),
        None => ABSENT_MARK.to_string(),
    }
}
