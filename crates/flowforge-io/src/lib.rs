//! Flowforge IO
//!
//! Versioned JSON documents for workflow graphs.
//!
//! Export always stamps [`FORMAT_VERSION`] and the export time. Import is
//! fail-fast: the first structural problem is reported with the offending
//! index or id and nothing is returned.
//!
//! ```text
//! {
//!   "nodes": [{ "id", "type", "position": { "x", "y" }, "data": { ... } }],
//!   "edges": [{ "id", "source", "target" }],
//!   "version": "1.0",
//!   "exportedAt": "2024-03-01T09:30:00Z"
//! }
//! ```

mod document;
mod error;
mod fs;
mod import;

pub use document::{DEFAULT_FILE_PREFIX, FORMAT_VERSION, WorkflowDocument, file_name};
pub use error::SerializationError;
pub use fs::{read_document, write_document, write_document_to};
pub use import::{import, import_value};
