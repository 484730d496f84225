pub mod api;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod loader;
pub mod options;
pub mod playback;
pub mod semantic;

pub use api::{compile, compile_with_options, preview, preview_with_options};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use document::*;
pub use error::*;
pub use loader::{parse, parse_json, parse_yaml, to_json};
pub use options::CompileOptions;
pub use playback::{expand_full_tab, expand_specific_chord_grouping, Compilation, GroupingLocation};
pub use semantic::lint;
