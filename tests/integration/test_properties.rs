// 記録エンジンの性質と代表シナリオ

use crate::fixtures::{open_app, test_with};
use kiroku_lot::{
    codec::{decode, encode},
    compare::compare,
    core::{SharedSnapshot, Subject, Template, TemplateSubject, TestRecord},
    query::{delta, format_delta, totals},
    reconcile::apply_template,
};
use tempfile::TempDir;

#[test]
fn test_round_trip_unicode_and_null_scores() {
    let mut test = test_with(
        "二学期 期末🎌",
        &[("国語", Some(80.0)), ("数学Ⅱ", None), ("English", Some(72.5))],
    );
    test.previous = vec![Subject::new("国語", Some(78.0))];
    let decoded: TestRecord = decode(&encode(&test).unwrap()).unwrap();
    assert_eq!(decoded, test);

    let template = Template::from_test(&test, "テンプレ");
    let decoded: Template = decode(&encode(&template).unwrap()).unwrap();
    assert_eq!(decoded, template);
}

#[test]
fn test_apply_template_idempotent_and_additive() {
    let template = Template {
        id: "t".into(),
        name: "5教科".into(),
        subjects: ["国語", "数学", "英語", "理科", "社会"]
            .iter()
            .map(|name| TemplateSubject { name: name.to_string() })
            .collect(),
    };
    let mut test = test_with("中間", &[("数学", Some(42.0))]);

    assert_eq!(apply_template(&template, &mut test), 4);
    let once = test.clone();
    assert_eq!(apply_template(&template, &mut test), 0);

    assert_eq!(test, once);
    assert_eq!(test.subject("数学").unwrap().score, Some(42.0));
    assert_eq!(test.subjects[0].name, "数学");
}

#[test]
fn test_totals_exclude_nulls() {
    let test = test_with("t", &[("a", Some(80.0)), ("b", None), ("c", Some(60.0))]);
    let result = totals(&test);
    assert_eq!((result.total, result.avg), (140.0, 70.0));
}

#[test]
fn test_comparator_symmetry() {
    let a = test_with("a", &[("国語", Some(80.0)), ("数学", Some(75.0)), ("英語", None)]);
    let b = test_with("b", &[("英語", Some(60.0)), ("数学", Some(90.0)), ("社会", Some(50.0))]);

    let ab = compare(&a, &b);
    let ba = compare(&b, &a);
    assert_eq!(ab.rows.len(), ba.rows.len());
    for row in &ab.rows {
        let other = ba
            .rows
            .iter()
            .find(|r| r.subject_name == row.subject_name)
            .unwrap();
        assert_eq!(row.diff, other.diff.map(|d| -d));
    }
}

#[test]
fn test_delta_scenario() {
    let mut test = test_with("t", &[("国語", Some(80.0)), ("数学", Some(75.0))]);
    test.previous = vec![Subject::new("国語", Some(78.0)), Subject::new("数学", Some(70.0))];

    assert_eq!(format_delta(delta(&test.subjects[0], &test.previous)), "+2");
    assert_eq!(format_delta(delta(&test.subjects[1], &test.previous)), "+5");
}

#[test]
fn test_comparison_scenario() {
    let local = test_with("t", &[("英語", Some(88.0))]);
    let shared = SharedSnapshot {
        subjects: vec![Subject::new("英語", Some(82.0)), Subject::new("理科", Some(90.0))],
        ..Default::default()
    };

    let result = compare(&local, &shared);
    assert_eq!(format_delta(result.rows[0].diff), "+6");
    assert_eq!(result.rows[1].subject_name, "理科");
    assert_eq!(result.rows[1].local_score, None);
    assert_eq!(result.rows[1].remote_score, Some(90.0));
    assert_eq!(result.rows[1].diff, None);
}

#[test]
fn test_import_scenario_appends_with_fresh_id() {
    let temp_dir = TempDir::new().unwrap();
    let mut app = open_app(temp_dir.path());
    let existing = app.store.tests().to_vec();

    assert_eq!(app.store.import_json(r#"[{"name":"T1", "subjects":[]}]"#).unwrap(), 1);

    let tests = app.store.tests();
    assert_eq!(&tests[..1], existing.as_slice());
    assert_eq!(tests[1].name, "T1");
    assert!(!tests[1].id.is_empty());
    assert_ne!(tests[1].id, existing[0].id);
}
