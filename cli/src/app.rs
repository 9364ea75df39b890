//! Builds a [`TutorialWorkflow`] from [`Settings`].

use std::sync::Arc;

use config::Settings;
use quill::{
    ChatOpenAI, CheckpointError, Checkpointer, JsonSerializer, LlmClient, MemorySaver,
    RetryPolicy, RetryingLlm, SessionState, SqliteSaver, TutorialWorkflow,
};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("settings: {0}")]
    Settings(#[from] config::SettingsError),
    #[error("open checkpoint store: {0}")]
    Store(#[from] CheckpointError),
}

/// Where sessions are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// SQLite file at `Settings::checkpoint_db`.
    Sqlite,
    /// Process memory; lost on exit. Only useful with the REPL.
    Memory,
}

pub fn checkpointer(
    settings: &Settings,
    kind: StoreKind,
) -> Result<Arc<dyn Checkpointer<SessionState>>, AppError> {
    Ok(match kind {
        StoreKind::Memory => Arc::new(MemorySaver::<SessionState>::new()),
        StoreKind::Sqlite => {
            let saver = SqliteSaver::new(&settings.checkpoint_db, Arc::new(JsonSerializer))?;
            info!(path = %saver.path().display(), "using sqlite checkpoints");
            Arc::new(saver)
        }
    })
}

/// OpenAI-compatible client with the configured timeout and retry budget.
pub fn model_client(settings: &Settings) -> Arc<dyn LlmClient> {
    let config = ChatOpenAI::config(settings.api_key.as_deref(), settings.base_url.as_deref());
    let client = ChatOpenAI::with_config(config, settings.model.clone())
        .with_temperature(settings.temperature)
        .with_timeout(settings.llm_timeout);
    let policy = RetryPolicy::exponential(
        settings.llm_max_retries,
        std::time::Duration::from_millis(500),
        std::time::Duration::from_secs(8),
        2.0,
    );
    Arc::new(RetryingLlm::new(client, policy))
}

pub fn build_workflow(settings: &Settings, kind: StoreKind) -> Result<TutorialWorkflow, AppError> {
    info!(model = %settings.model, store = ?kind, "building workflow");
    Ok(TutorialWorkflow::from_llm(
        model_client(settings),
        checkpointer(settings, kind)?,
    ))
}
