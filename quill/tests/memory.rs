//! Checkpointer tests: MemorySaver and SqliteSaver share one contract.

mod common;
mod init_logging;

use std::sync::Arc;

use quill::{
    CheckpointError, Checkpointer, JsonSerializer, MemorySaver, MockLlm, SessionState,
    SqliteSaver, TutorialWorkflow,
};
use serde_json::json;

use common::{expert_with_progress, python_beginner, session_with_expert};

fn sample(n: usize) -> SessionState {
    let mut s = SessionState::new();
    for i in 0..n {
        s.push_user(format!("message {}", i));
    }
    s
}

async fn exercise_contract(store: &dyn Checkpointer<SessionState>) {
    assert!(store.load("s1").await.unwrap().is_none());

    let id1 = store.save("s1", &sample(1)).await.unwrap();
    let id2 = store.save("s1", &sample(2)).await.unwrap();
    store.save("s2", &sample(5)).await.unwrap();
    assert_ne!(id1, id2);

    assert_eq!(store.load("s1").await.unwrap(), Some(sample(2)));
    assert_eq!(store.load("s2").await.unwrap(), Some(sample(5)));

    let history = store.list("s1", None).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].checkpoint_id, id1);
    assert_eq!(history[0].step, 1);
    assert_eq!(history[1].step, 2);

    let newest = store.list("s1", Some(1)).await.unwrap();
    assert_eq!(newest.len(), 1);
    assert_eq!(newest[0].checkpoint_id, id2);

    store.delete("s1").await.unwrap();
    assert!(store.load("s1").await.unwrap().is_none());
    assert!(store.list("s1", None).await.unwrap().is_empty());
    assert!(store.load("s2").await.unwrap().is_some());
    store.delete("never-existed").await.unwrap();

    assert_eq!(
        store.save("", &sample(1)).await.unwrap_err(),
        CheckpointError::SessionIdRequired
    );
    assert_eq!(
        store.load(" ").await.unwrap_err(),
        CheckpointError::SessionIdRequired
    );
}

#[tokio::test]
async fn memory_saver_contract() {
    let store = MemorySaver::<SessionState>::new();
    exercise_contract(&store).await;
    assert_eq!(store.session_count().await, 1);
}

#[tokio::test]
async fn sqlite_saver_contract() {
    let dir = tempfile::tempdir().unwrap();
    let store =
        SqliteSaver::<SessionState>::new(dir.path().join("nested/sessions.db"), Arc::new(JsonSerializer))
            .unwrap();
    exercise_contract(&store).await;
}

/// **Scenario**: a session with planner and expert progress survives a save/load through SQLite.
#[tokio::test]
async fn sqlite_saver_preserves_full_session() {
    let dir = tempfile::tempdir().unwrap();
    let store =
        SqliteSaver::<SessionState>::new(dir.path().join("s.db"), Arc::new(JsonSerializer)).unwrap();
    let mut state = session_with_expert(expert_with_progress(3, 2));
    state.push_user("next");
    store.save("full", &state).await.unwrap();

    let loaded = store.load("full").await.unwrap().unwrap();
    assert_eq!(loaded, state);
    assert!((loaded.expert.unwrap().progress() - 200.0 / 3.0).abs() < 1e-9);
}

/// **Scenario**: two engine instances sharing one SQLite file continue the same session.
#[tokio::test]
async fn resume_across_engine_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.db");
    let llm = Arc::new(
        MockLlm::new()
            .then_json(json!({"subject": "Python", "level": "beginner"}))
            .then_text("What do you want to build?")
            .then_json(json!({"project_type": "CLI tool"}))
            .then_text("Which editor do you use?"),
    );

    let first = TutorialWorkflow::from_llm(
        llm.clone(),
        Arc::new(SqliteSaver::<SessionState>::new(&path, Arc::new(JsonSerializer)).unwrap()),
    );
    first.run("resume", "Python, beginner").await.unwrap();
    drop(first);

    let second = TutorialWorkflow::from_llm(
        llm.clone(),
        Arc::new(SqliteSaver::<SessionState>::new(&path, Arc::new(JsonSerializer)).unwrap()),
    );
    let state = second.run("resume", "a CLI tool").await.unwrap();

    let planner = state.planner.unwrap();
    assert_eq!(planner.subject, python_beginner().subject);
    assert_eq!(planner.project_type.as_deref(), Some("CLI tool"));
    assert_eq!(state.messages.len(), 4);
    assert_eq!(second.history("resume", None).await.unwrap().len(), 2);

    second.reset("resume").await.unwrap();
    assert_eq!(second.load("resume").await.unwrap(), SessionState::default());
}
