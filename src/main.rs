use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kiroku_lot::{
    cli::{self, Cli, Commands},
    config::DefaultRecordConfig,
    core::{RecordConfig, RecordError},
    storage::LocalFileStorage,
    App,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = run(Cli::parse()).await {
        match error.downcast_ref::<RecordError>() {
            Some(record_error) => eprintln!("❌ {}", record_error.user_message()),
            None => eprintln!("❌ エラー: {error:#}"),
        }
        std::process::exit(1);
    }
}

async fn run(args: Cli) -> Result<()> {
    let mut config = DefaultRecordConfig::default();
    if let Some(dir) = args.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(url) = args.base_url {
        config = config.with_share_base_url(url);
    }
    config.validate()?;

    let storage = LocalFileStorage::new(config.data_dir());
    tracing::debug!(data_dir = %config.data_dir().display(), "opening record store");
    let mut app = App::new(config, storage);

    // --test はこの実行だけの選択（保存済みの選択は `select` で変更する）
    let focused = match args.test.as_deref() {
        Some(selector) => app.store.focus_test(selector).map(|_| ()),
        None => Ok(()),
    };
    let result = match focused {
        Ok(()) => dispatch(&mut app, args.command).await,
        Err(error) => Err(error.into()),
    };

    if let Some(warning) = app.shutdown() {
        eprintln!("⚠️  {}", warning.user_message());
    }
    result
}

async fn dispatch(
    app: &mut App<DefaultRecordConfig, LocalFileStorage>,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::List => cli::execute_list(app),
        Commands::Show { json } => cli::execute_show(app, json),
        Commands::Select { selector } => cli::execute_select(app, &selector),
        Commands::AddTest { name } => cli::execute_add_test(app, name),
        Commands::RenameTest { name } => cli::execute_rename_test(app, &name),
        Commands::DeleteTest { yes } => cli::execute_delete_test(app, yes),
        Commands::AddSubject { name, score } => cli::execute_add_subject(app, &name, score),
        Commands::SetScore { name, score } => cli::execute_set_score(app, &name, score),
        Commands::RenameSubject { old_name, new_name } => {
            cli::execute_rename_subject(app, &old_name, &new_name)
        }
        Commands::DeleteSubject { name } => cli::execute_delete_subject(app, &name),
        Commands::SavePrevious => cli::execute_save_previous(app),
        Commands::Template { action } => cli::execute_template(app, action).await,
        Commands::Share { qr } => cli::execute_share(app, qr),
        Commands::Publish => cli::execute_publish(app),
        Commands::Compare { text, json } => cli::execute_compare(app, text, json).await,
        Commands::SaveShared { text, name } => cli::execute_save_shared(app, text, name).await,
        Commands::Export { out_dir } => cli::execute_export(app, &out_dir).await.map(|_| ()),
        Commands::Import { file } => cli::execute_import(app, file).await,
        Commands::Username { name } => cli::execute_username(app, name),
    }
}
