//! voxrelay CLI entry point

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use voxrelay::cli::{
    app::{self, load_merged_config, RecordOptions},
    args::{Cli, Commands, SessionsAction},
    config_cmd::handle_config_command,
    presenter::Presenter,
    sessions_cmd::handle_sessions_command,
    EXIT_ERROR, EXIT_USAGE_ERROR,
};
use voxrelay::domain::config::AppConfig;
use voxrelay::domain::recording::Duration;
use voxrelay::infrastructure::{JsonCheckpointStore, XdgConfigStore};

fn init_tracing() {
    let filter = EnvFilter::try_from_env("VOXRELAY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let presenter = Presenter::new();

    match cli.command {
        Commands::Config { action } => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
        Commands::Sessions { action } => {
            let state_dir = match &action {
                SessionsAction::List { state_dir } | SessionsAction::Export { state_dir, .. } => {
                    state_dir.clone()
                }
            };
            let config = load_merged_config(with_state_dir(state_dir)).await;
            let store = JsonCheckpointStore::new(config.state_dir_or_default());
            if let Err(e) = handle_sessions_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
        Commands::Record {
            duration,
            output,
            codecs,
            timeslice,
            state_dir,
        } => {
            let cli_config = AppConfig {
                codecs,
                timeslice,
                ..with_state_dir(state_dir)
            };
            let config = load_merged_config(cli_config).await;

            let duration = match duration.as_deref().map(str::parse::<Duration>) {
                Some(Ok(d)) => d,
                Some(Err(e)) => {
                    presenter.error(&format!("Invalid duration: {}", e));
                    return ExitCode::from(EXIT_USAGE_ERROR);
                }
                None => Duration::default_record(),
            };
            let limit = config.max_duration_or_default();
            if duration > limit {
                presenter.warn(&format!("Duration capped at {}", limit));
            }

            let options = RecordOptions {
                duration: duration.min(limit),
                output,
            };
            app::run_record(options, &config).await
        }
        Commands::Compose {
            preamble,
            original,
            output,
        } => {
            let config = load_merged_config(AppConfig::empty()).await;
            app::run_compose(&preamble, &original, &output, &config).await
        }
        Commands::Forward {
            preamble,
            original,
            outbox,
        } => {
            let cli_config = AppConfig {
                outbox_dir: outbox.map(path_string),
                ..Default::default()
            };
            let config = load_merged_config(cli_config).await;
            let outbox = config.outbox_dir_or_default();
            app::run_forward(&preamble, &original, outbox, &config).await
        }
        Commands::Probe { file } => {
            let config = load_merged_config(AppConfig::empty()).await;
            app::run_probe(&file, &config).await
        }
        Commands::Play { file } => app::run_play(&file).await,
    }
}

fn with_state_dir(state_dir: Option<PathBuf>) -> AppConfig {
    AppConfig {
        state_dir: state_dir.map(path_string),
        ..Default::default()
    }
}

fn path_string(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}
