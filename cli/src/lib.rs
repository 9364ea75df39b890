//! Library side of the Quill CLI: workflow wiring, turn rendering and tutorial export.
//!
//! The binary in `main.rs` only parses arguments and dispatches here.

pub mod app;
pub mod export;
pub mod render;

pub use app::{build_workflow, AppError, StoreKind};
pub use export::{export_tutorial, slugify, tutorial_markdown};
pub use render::{render_report, report_json};
