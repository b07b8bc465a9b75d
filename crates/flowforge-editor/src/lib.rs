//! Flowforge Editor
//!
//! The composition root of a workflow editing session. [`WorkflowEditor`]
//! owns the graph and its undo history and is the only way to change either:
//! node and edge edits, template application, auto-layout, and import all go
//! through it, so every change is undoable the same way.
//!
//! Edits can also be driven by data through [`EditorCommand`].

mod command;
mod config;
mod editor;
mod error;

pub use command::{CommandOutcome, EditorCommand};
pub use config::EditorConfig;
pub use editor::{DEFAULT_POSITION, TEMPLATE_OFFSET_X, WorkflowEditor};
pub use error::EditorError;
