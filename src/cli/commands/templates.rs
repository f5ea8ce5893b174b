use super::read_pasted;
use crate::cli::TemplateAction;
use crate::core::{RecordConfig, Template};
use crate::storage::KeyValueStorage;
use crate::App;
use anyhow::Result;

/// テンプレート一覧の文字列を作成
pub fn render_template_list(templates: &[Template]) -> String {
    if templates.is_empty() {
        return "テンプレートがありません。`template save` で作成してください。\n".to_string();
    }

    templates
        .iter()
        .map(|template| {
            let names: Vec<&str> = template.subject_names().collect();
            format!(
                "  {}  {}  [{}]\n",
                super::records::short_id(&template.id),
                template.name,
                names.join(", ")
            )
        })
        .collect()
}

/// Manage subject templates
pub async fn execute_template<C: RecordConfig, S: KeyValueStorage>(
    app: &mut App<C, S>,
    action: TemplateAction,
) -> Result<()> {
    match action {
        TemplateAction::List => {
            print!("{}", render_template_list(app.store.templates()));
        }
        TemplateAction::Save { name } => {
            let id = app.store.save_as_template(name.as_deref())?;
            let template = app.store.find_template(&id)?;
            println!(
                "✅ テンプレート「{}」を保存しました ({}教科)",
                template.name,
                template.subjects.len()
            );
        }
        TemplateAction::Apply { selector } => {
            let added = app.store.apply_template(&selector)?;
            let test_name = app
                .store
                .current_test()
                .map(|t| t.name.clone())
                .unwrap_or_default();
            println!("✅ 「{test_name}」に{added}教科を追加しました");
        }
        TemplateAction::Share { selector, qr } => {
            let link = app.template_link(&selector)?;
            println!("🔗 {link}");
            if qr {
                println!("📱 {}", app.qr_url(&link)?);
            }
        }
        TemplateAction::Load { text } => {
            let text = read_pasted(text).await?;
            let id = app.load_shared_template(&text)?;
            let template = app.store.find_template(&id)?;
            println!(
                "✅ テンプレート「{}」を読み込みました ({}教科)",
                template.name,
                template.subjects.len()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DefaultRecordConfig;
    use crate::core::TemplateSubject;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_render_template_list() {
        let template = Template {
            id: "0123456789".into(),
            name: "基本".into(),
            subjects: vec![
                TemplateSubject { name: "国語".into() },
                TemplateSubject { name: "数学".into() },
            ],
        };

        let list = render_template_list(&[template]);
        assert_eq!(list, "  01234567  基本  [国語, 数学]\n");
        assert!(render_template_list(&[]).contains("template save"));
    }

    #[tokio::test]
    async fn test_execute_template_save_share_and_load() {
        let mut app = App::new(DefaultRecordConfig::new("/tmp/kiroku"), MemoryStorage::new());

        execute_template(&mut app, TemplateAction::Save { name: None })
            .await
            .unwrap();
        let link = app.template_link("定期テスト（サンプル）のテンプレート").unwrap();

        execute_template(&mut app, TemplateAction::Load { text: Some(link) })
            .await
            .unwrap();
        assert_eq!(app.store.templates().len(), 2);
        assert_ne!(app.store.templates()[0].id, app.store.templates()[1].id);
    }

    #[tokio::test]
    async fn test_execute_template_apply_unknown() {
        let mut app = App::new(DefaultRecordConfig::new("/tmp/kiroku"), MemoryStorage::new());
        let result = execute_template(
            &mut app,
            TemplateAction::Apply {
                selector: "なし".into(),
            },
        )
        .await;
        assert!(result.is_err());
    }
}
