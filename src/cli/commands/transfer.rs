use crate::core::RecordConfig;
use crate::storage::{FilePayload, KeyValueStorage, PayloadSource};
use crate::store::export_file_name;
use crate::App;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Export all tests as a dated JSON file
pub async fn execute_export<C: RecordConfig, S: KeyValueStorage>(
    app: &App<C, S>,
    out_dir: &Path,
) -> Result<PathBuf> {
    if !out_dir.is_dir() {
        anyhow::bail!("Output directory does not exist: {}", out_dir.display());
    }

    let json = app.store.export_json()?;
    let path = out_dir.join(export_file_name(chrono::Local::now().date_naive()));
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;

    println!(
        "📄 {}件のテストを {} に書き出しました",
        app.store.tests().len(),
        path.display()
    );
    Ok(path)
}

/// Import tests from an exported JSON file
pub async fn execute_import<C: RecordConfig, S: KeyValueStorage>(
    app: &mut App<C, S>,
    file: PathBuf,
) -> Result<()> {
    let source = FilePayload::new(file);
    let count = app.import_from(&source).await?;
    println!("✅ {}件のテストを {} から読み込みました", count, source.describe());
    Ok(())
}
