// Position tracking module
pub mod position;

// Position marker format
pub mod marker;

// Source file loading
pub mod file;

// Edit session over an immutable original text
pub mod edit;

// Rewrite targets from the analysis pass
pub mod target;

// Runtime dependency settings
pub mod config;

// Import and replacement payloads
pub mod planner;

// Generation pass over many files
pub mod generate;

pub mod error;

// JSON request/response module
pub mod json;

// Re-exports
pub use position::{LineIndex, LineIndexResolver, Position, PositionResolver};
pub use marker::{LineMarker, MarkerParseError, find_markers, remap};
pub use file::{FileError, SourceFile, checksum, read_source};
pub use edit::{Edit, RewriteSession};
pub use target::RewriteTarget;
pub use config::{DEFAULT_ALIAS, DEFAULT_IMPORT_PATH, RewriteConfig};
pub use planner::{EditPlanner, PlannedEdit, quote_literal};
pub use generate::{FileRewrite, Generator, RewrittenFile};
pub use error::RewriteError;
pub use json::{
    FileJson, FileReportJson, RewriteRequest, RewriteResponse, TargetJson,
    generate_execution_id, resolve_execution_id,
};
