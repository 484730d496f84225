//! # Public API
//!
//! String-in entry points that load a persisted tab and compile it in one call.
//!
//! ## Compilation Functions
//!
//! - [`compile()`] - Full timeline following the tab's section progression
//! - [`compile_with_options()`] - Same, with a default tempo or an expansion cap
//! - [`preview()`] - One section, subsection or chord sequence in isolation
//! - [`preview_with_options()`] - Same, with options
//!
//! ## Typical Usage
//!
//! ```rust
//! use tabline::compile;
//!
//! let source = r#"{
//!   "bpm": 100,
//!   "sections": [{ "id": "verse", "title": "Verse", "data": [{
//!     "type": "chord",
//!     "data": [{
//!       "strummingPattern": {
//!         "noteLength": "eighth",
//!         "strums": [{ "strum": "v" }, { "strum": "^" }, { "strum": "v" }, { "strum": "^" }]
//!       },
//!       "data": ["Em", "", "", ""]
//!     }]
//!   }]}]
//! }"#;
//!
//! let compiled = compile(source)?;
//! assert_eq!(compiled.playable_count(), 4);
//! assert!((compiled.metadata[3].elapsed_seconds - 0.9).abs() < 1e-9);
//! # Ok::<(), tabline::TablineError>(())
//! ```
//!
//! Documents without a saved section progression play every section once, in order.

use crate::error::TablineError;
use crate::loader::parse;
use crate::options::CompileOptions;
use crate::playback::{
    expand_full_tab, expand_specific_chord_grouping, Compilation, GroupingLocation,
};

/// Load and compile a tab with default options.
///
/// # Errors
/// Returns [`TablineError`] only if the source cannot be parsed.
pub fn compile(source: &str) -> Result<Compilation, TablineError> {
    compile_with_options(source, &CompileOptions::default())
}

/// Load and compile a tab.
///
/// # Example
/// ```rust
/// use tabline::{compile_with_options, CompileOptions};
///
/// let source = r#"{
///   "sections": [{ "id": "a", "data": [{ "type": "tab", "data": [
///     ["", "", "", "", "", "", "0", "", "quarter", "c1"]
///   ]}]}]
/// }"#;
///
/// let options = CompileOptions::default().with_default_bpm(60.0);
/// let compiled = compile_with_options(source, &options)?;
/// assert_eq!(compiled.metadata[0].bpm, 60.0);
/// # Ok::<(), tabline::TablineError>(())
/// ```
pub fn compile_with_options(
    source: &str,
    options: &CompileOptions,
) -> Result<Compilation, TablineError> {
    let document = parse(source)?;
    Ok(expand_full_tab(&document, &document.effective_progression(), options))
}

/// Load a tab and compile one unit of it for preview.
pub fn preview(source: &str, location: &GroupingLocation) -> Result<Compilation, TablineError> {
    preview_with_options(source, location, &CompileOptions::default())
}

pub fn preview_with_options(
    source: &str,
    location: &GroupingLocation,
    options: &CompileOptions,
) -> Result<Compilation, TablineError> {
    let document = parse(source)?;
    Ok(expand_specific_chord_grouping(&document, location, options))
}
