//! # Quill
//!
//! A conversational tutorial builder. Three cooperating agents share one session
//! record: the **planner** asks the user what they want to learn, the **expert**
//! designs a learning path and writes it step by step, and the **writer** weaves
//! the steps into a single tutorial.
//!
//! Every user message is one turn. A turn loads the session from a
//! [`Checkpointer`], runs nodes until the workflow needs input again (or the
//! tutorial is done), and saves the session back, so each turn can be a
//! separate process invocation.
//!
//! ## Main modules
//!
//! - [`workflow`]: [`TutorialWorkflow`], [`TurnReport`], [`NodeId`], [`Route`], routers and node bodies.
//! - [`state`]: [`SessionState`], [`PlannerState`], [`ExpertState`], [`ExpertStep`], [`WriterState`].
//! - [`agent`]: [`PlannerAgent`], [`ExpertAgent`], [`WriterAgent`] and their model-backed services.
//! - [`llm`]: [`LlmClient`] trait, [`OutputSchema`], [`MockLlm`], [`ChatOpenAI`], [`RetryingLlm`].
//! - [`memory`]: [`Checkpointer`], [`MemorySaver`], [`SqliteSaver`].
//! - [`message`]: [`Message`] (System / User / Assistant).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use quill::{MemorySaver, MockLlm, SessionState, TutorialWorkflow};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), quill::AgentError> {
//! let llm = Arc::new(MockLlm::always("What would you like to learn?"));
//! let store = Arc::new(MemorySaver::<SessionState>::new());
//! let workflow = TutorialWorkflow::from_llm(llm, store);
//!
//! let report = workflow.run_with_report("session-1", "I want to learn Rust").await?;
//! for reply in report.replies() {
//!     println!("{}", reply);
//! }
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod error;
pub mod llm;
pub mod memory;
pub mod message;
pub mod state;
pub mod workflow;

pub use agent::{
    ExpertAgent, ExpertService, PlannerAgent, PlannerService, WriterAgent, WriterService,
};
pub use error::AgentError;
pub use llm::{
    ChatOpenAI, FieldType, LlmCall, LlmClient, LlmError, LlmResponse, LlmUsage, MockLlm,
    MockReply, OutputSchema, RetryPolicy, RetryingLlm, SchemaField,
};
pub use memory::{
    CheckpointError, CheckpointListItem, Checkpointer, JsonSerializer, MemorySaver, Serializer,
    SqliteSaver,
};
pub use message::Message;
pub use state::{
    DifficultyLevel, ExpertState, ExpertStep, PlannerDelta, PlannerState, SessionState,
    StepStatus, ValidationError, WriterState, NOT_PROVIDED,
};
pub use workflow::{NodeFailure, NodeId, NodeOutcome, Route, TurnReport, TutorialWorkflow};

/// When running `cargo test -p quill`, initializes tracing from `RUST_LOG` so that
/// unit tests in `src/**` can print logs with `--nocapture`.
#[cfg(test)]
mod test_logging {
    use ctor::ctor;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::Layer;

    #[ctor]
    fn init() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_filter(filter),
            )
            .try_init();
    }
}
