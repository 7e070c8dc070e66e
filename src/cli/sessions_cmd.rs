//! Sessions command handler

use std::path::Path;

use tokio::fs;

use crate::application::ports::CheckpointError;
use crate::domain::recording::SessionId;
use crate::infrastructure::JsonCheckpointStore;

use super::args::SessionsAction;
use super::presenter::Presenter;

/// Handle sessions subcommand against the checkpoint directory
pub async fn handle_sessions_command(
    action: SessionsAction,
    store: &JsonCheckpointStore,
    presenter: &Presenter,
) -> Result<(), CheckpointError> {
    match action {
        SessionsAction::List { .. } => handle_list(store, presenter).await,
        SessionsAction::Export { id, output, .. } => {
            handle_export(store, presenter, &SessionId::new(id), &output).await
        }
    }
}

async fn handle_list(store: &JsonCheckpointStore, presenter: &Presenter) -> Result<(), CheckpointError> {
    let records = store.list().await?;
    if records.is_empty() {
        presenter.info(&format!("No sessions in {}", store.root().display()));
        return Ok(());
    }
    for record in &records {
        presenter.session_row(record);
    }
    Ok(())
}

async fn handle_export(
    store: &JsonCheckpointStore,
    presenter: &Presenter,
    id: &SessionId,
    output: &Path,
) -> Result<(), CheckpointError> {
    let artifact = store.export(id).await?;
    fs::write(output, artifact.bytes())
        .await
        .map_err(|e| CheckpointError::Unavailable(format!("{}: {}", output.display(), e)))?;
    presenter.success(&format!(
        "Exported {} ({})",
        id,
        artifact.human_readable_size()
    ));
    presenter.output(&output.to_string_lossy());
    Ok(())
}
