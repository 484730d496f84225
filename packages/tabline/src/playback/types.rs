//! Playback type definitions
//!
//! This module defines the compiler's output: a compiled tree mirroring the tab
//! after repetitions were expanded, and the flat metadata timeline used for
//! transport position lookup and highlighting.

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostic;
use crate::document::{Column, StrummingPattern};

/// Where a playback entry comes from in the source document.
///
/// Indices point into the document (not into the expanded tree), so every pass of
/// a repeated unit maps back to the same on-screen element.
///
/// # Fields
/// - `section_index`: index into `TabDocument::sections`
/// - `subsection_index`: index into the section's subsections
/// - `chord_sequence_index`: set for strums of a chord subsection
/// - `chord_index`: column index in a tab subsection, strum index in a chord sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub section_index: usize,
    pub subsection_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chord_sequence_index: Option<usize>,
    pub chord_index: usize,
}

impl Location {
    pub fn column(section_index: usize, subsection_index: usize, column_index: usize) -> Self {
        Self {
            section_index,
            subsection_index,
            chord_sequence_index: None,
            chord_index: column_index,
        }
    }

    pub fn strum(
        section_index: usize,
        subsection_index: usize,
        chord_sequence_index: usize,
        strum_index: usize,
    ) -> Self {
        Self {
            section_index,
            subsection_index,
            chord_sequence_index: Some(chord_sequence_index),
            chord_index: strum_index,
        }
    }

    /// Same location, one position further along its innermost level.
    pub fn next_chord(&self) -> Self {
        Self {
            chord_index: self.chord_index + 1,
            ..*self
        }
    }
}

/// Address of the unit a preview compiles.
///
/// `subsection_index` narrows the section to one subsection, and
/// `chord_sequence_index` (chord subsections only) narrows further to one chord
/// sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingLocation {
    pub section_index: usize,
    #[serde(default)]
    pub subsection_index: Option<usize>,
    #[serde(default)]
    pub chord_sequence_index: Option<usize>,
}

impl GroupingLocation {
    pub fn section(section_index: usize) -> Self {
        Self {
            section_index,
            subsection_index: None,
            chord_sequence_index: None,
        }
    }

    pub fn subsection(section_index: usize, subsection_index: usize) -> Self {
        Self {
            subsection_index: Some(subsection_index),
            ..Self::section(section_index)
        }
    }

    pub fn chord_sequence(
        section_index: usize,
        subsection_index: usize,
        chord_sequence_index: usize,
    ) -> Self {
        Self {
            chord_sequence_index: Some(chord_sequence_index),
            ..Self::subsection(section_index, subsection_index)
        }
    }
}

/// One instant of the compiled timeline.
///
/// # Fields
/// - `location`: source element to highlight
/// - `bpm`: tempo in effect at this instant
/// - `note_length_multiplier`: length relative to a beat, as a decimal string
///   (`"0"` for measure lines)
/// - `elapsed_seconds`: time from the start of the timeline to this instant
/// - `playback_index`: index of the playable unit; absent for measure lines and the
///   terminal boundary entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackMetadata {
    pub location: Location,
    pub bpm: f64,
    pub note_length_multiplier: String,
    pub elapsed_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback_index: Option<usize>,
}

impl PlaybackMetadata {
    pub fn is_playable(&self) -> bool {
        self.playback_index.is_some()
    }
}

/// A tab subsection after expansion.
///
/// `columns` keeps measure lines; `indices` holds the playback index of every
/// playable column in order, so measure lines never appear in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackTabSubsection {
    pub id: String,
    pub bpm: f64,
    #[serde(rename = "data")]
    pub columns: Vec<Column>,
    pub indices: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackChordSequence {
    pub id: String,
    pub bpm: f64,
    pub strumming_pattern: StrummingPattern,
    #[serde(rename = "data")]
    pub chords: Vec<String>,
    /// One playback index per strum
    pub indices: Vec<usize>,
}

/// A chord subsection after expansion; repeated chord sequences appear once per pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackChordSubsection {
    pub id: String,
    pub bpm: f64,
    #[serde(rename = "data")]
    pub sequences: Vec<PlaybackChordSequence>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlaybackSubsection {
    Tab(PlaybackTabSubsection),
    Chord(PlaybackChordSubsection),
}

impl PlaybackSubsection {
    pub fn id(&self) -> &str {
        match self {
            PlaybackSubsection::Tab(tab) => &tab.id,
            PlaybackSubsection::Chord(chord) => &chord.id,
        }
    }

    pub fn bpm(&self) -> f64 {
        match self {
            PlaybackSubsection::Tab(tab) => tab.bpm,
            PlaybackSubsection::Chord(chord) => chord.bpm,
        }
    }
}

/// A section after expansion; repeated subsections appear once per pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSection {
    pub id: String,
    pub title: String,
    #[serde(rename = "data")]
    pub subsections: Vec<PlaybackSubsection>,
}

/// Everything one compiler call produces.
///
/// # Fields
/// - `sections`: the expanded tree, one entry per section pass
/// - `metadata`: the flat timeline
/// - `diagnostics`: problems noticed along the way, each reported once
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Compilation {
    pub sections: Vec<PlaybackSection>,
    pub metadata: Vec<PlaybackMetadata>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Compilation {
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }
}
