//! # Playback Module
//!
//! Compile a tab document into a flat, time-indexed playback timeline.
//!
//! ## Purpose
//! The playback layer needs two things from a tab:
//! 1. **A timeline** - one entry per playable note or strum (and per measure line),
//!    with the tempo in effect and the elapsed seconds at which it starts
//! 2. **An expanded tree** - the tab after every repetition was unrolled, carrying
//!    resolved tempos and the playback indices of its notes, for highlighting
//!
//! ## Sub-modules
//! - `note_length` - Note length tags and their duration multipliers
//! - `tempo` - Tempo cascade and measure-line tempo changes
//! - `expand` - Section, subsection, chord sequence and column expanders
//! - `engine` - Full-tab and preview compilers
//! - `types` - Compilation, PlaybackMetadata and the expanded tree
//! - `timeline` - Position lookup on a compiled timeline
//!
//! ## Entry Points
//! - [`expand_full_tab()`] - Whole tab, following the section progression
//! - [`expand_specific_chord_grouping()`] - One section, subsection or chord sequence
//!
//! ## Timing
//!
//! A unit lasts `60 / (bpm / multiplier)` seconds, where the multiplier is the
//! note length relative to a quarter note:
//!
//! | tag | multiplier |
//! |-----|-----------|
//! | `quarter` | 1 |
//! | `quarterTriplet` | 0.6667 |
//! | `eighth` | 0.5 |
//! | `eighthTriplet` | 0.3333 |
//! | `sixteenth` | 0.25 |
//! | `sixteenthTriplet` | 0.1667 |
//! | `measureLine` | 0 |
//!
//! ## Tempo Cascade
//!
//! chord sequence → subsection → document → `CompileOptions::default_bpm`.
//! Inside a tab subsection, a measure line with a tempo changes it for the columns
//! that follow; a measure line without one returns to the subsection's tempo.
//!
//! ## Playback Indices
//!
//! Every playable column and strum gets the next index of one counter shared by the
//! whole compilation. Measure lines get none.

mod engine;
mod expand;
mod note_length;
mod tempo;
mod timeline;
mod types;

#[cfg(test)]
mod tests;

pub use engine::{expand_full_tab, expand_specific_chord_grouping};
pub use note_length::NoteLength;
pub use tempo::{is_usable_bpm, resolve_bpm, TabTempo};
pub use timeline::position_at;
pub use types::{
    Compilation, GroupingLocation, Location, PlaybackChordSequence, PlaybackChordSubsection,
    PlaybackMetadata, PlaybackSection, PlaybackSubsection, PlaybackTabSubsection,
};
