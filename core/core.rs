pub mod config;
pub mod content;
pub mod error;
pub mod export;
pub mod filters;

pub use config::{DEFAULT_OUTPUT_FILE, DEFAULT_ROOT, ExportOptions};
pub use content::{decode_lossy, read_text_lossy};
pub use error::{AppError, Result};
pub use export::{ExportSummary, SelectedFile, export_tree, export_tree_with_progress, select_files};
pub use filters::{FileVerdict, Filters};
