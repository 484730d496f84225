//! Playback timeline compilers
//!
//! Two entry points drive the unit expanders:
//! - [`expand_full_tab`] walks the section progression and produces the continuous
//!   timeline used for full playback and looping.
//! - [`expand_specific_chord_grouping`] compiles a single section, subsection or
//!   chord sequence in isolation for previews.

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::document::{ProgressionEntry, Subsection, TabDocument};
use crate::options::CompileOptions;

use super::expand::{Cursor, Expander, Trace};
use super::tempo::resolve_bpm;
use super::types::{
    Compilation, GroupingLocation, Location, PlaybackChordSubsection, PlaybackMetadata,
    PlaybackSection, PlaybackSubsection,
};

/// Compile a whole tab following a section progression.
///
/// # Pipeline
/// 1. Resolve every progression entry to its section (missing sections are skipped
///    and reported)
/// 2. Expand the section once per repetition of the entry, continuing one shared
///    elapsed time and playback index
/// 3. Shift the timeline so it starts at exactly zero
/// 4. Append a terminal boundary entry so "end of tab" is an addressable position
///
/// # Terminal Boundary
/// The boundary sits right after the last entry: same location with its innermost
/// index plus one, same tempo and multiplier, and an elapsed time of
/// `last + ceil(60 / bpm) + 1` seconds. The rounding and the extra second are a
/// deliberately loose margin for the playback UI.
///
/// # Example
/// ```rust
/// use tabline::playback::expand_full_tab;
/// use tabline::{Column, CompileOptions, ProgressionEntry, Section, TabDocument, TabSubsection};
///
/// let riff = TabSubsection::new("riff", vec![
///     Column::new("c1", "quarter"),
///     Column::new("c2", "quarter"),
/// ]);
/// let document = TabDocument::new(vec![Section::new("intro", "Intro", vec![riff.into()])])
///     .with_bpm(120.0);
///
/// let compiled = expand_full_tab(
///     &document,
///     &[ProgressionEntry::new("intro", 1)],
///     &CompileOptions::default(),
/// );
///
/// let elapsed: Vec<f64> = compiled.metadata.iter().map(|m| m.elapsed_seconds).collect();
/// assert_eq!(elapsed, vec![0.0, 0.5, 2.5]);
/// assert!(compiled.diagnostics.is_empty());
/// ```
pub fn expand_full_tab(
    document: &TabDocument,
    progression: &[ProgressionEntry],
    options: &CompileOptions,
) -> Compilation {
    let expander = Expander::new(document, options);
    let mut cursor = Cursor::default();
    let mut trace = Trace::default();
    let mut sections = Vec::new();

    'progression: for entry in progression {
        let Some((section_index, section)) = document.section(&entry.section_id) else {
            trace.report(Diagnostic::unresolved_section(&entry.section_id));
            continue;
        };

        for _ in 0..entry.repetitions() {
            let pass = expander.expand_section(section_index, section, cursor);
            cursor = pass.cursor;
            let stop = pass.trace.truncated;
            if !(stop && pass.trace.metadata.is_empty()) {
                sections.push(pass.unit);
            }
            trace.absorb(pass.trace);
            if stop {
                break 'progression;
            }
        }
    }

    normalize_elapsed(&mut trace.metadata);
    if let Some(boundary) = terminal_boundary(&trace.metadata) {
        trace.metadata.push(boundary);
    }

    finish(sections, trace, options)
}

/// Compile one section, subsection or chord sequence on its own.
///
/// The unit keeps its own internal repetitions. Elapsed time and playback indices
/// start at zero, nothing is normalized and no terminal boundary is appended.
/// Locations in the metadata still point into the document, so previews highlight
/// the same elements full playback does.
///
/// An address that does not resolve yields an empty compilation with an
/// `unresolved-location` diagnostic.
///
/// # Example
/// ```rust
/// use tabline::playback::{expand_specific_chord_grouping, GroupingLocation};
/// use tabline::{ChordSequence, ChordSubsection, CompileOptions};
/// use tabline::{Section, Strum, StrummingPattern, TabDocument};
///
/// let pattern = StrummingPattern::new("p1", "eighth", vec![Strum::new("v"), Strum::new("^")]);
/// let sequence =
///     ChordSequence::new("s1", pattern, vec!["G".into(), "".into()]).with_repetitions(2);
/// let chords = ChordSubsection::new("chords", vec![sequence]);
/// let document = TabDocument::new(vec![Section::new("verse", "Verse", vec![chords.into()])])
///     .with_bpm(60.0);
///
/// let preview = expand_specific_chord_grouping(
///     &document,
///     &GroupingLocation::chord_sequence(0, 0, 0),
///     &CompileOptions::default(),
/// );
///
/// let elapsed: Vec<f64> = preview.metadata.iter().map(|m| m.elapsed_seconds).collect();
/// assert_eq!(elapsed, vec![0.0, 0.5, 1.0, 1.5]);
/// ```
pub fn expand_specific_chord_grouping(
    document: &TabDocument,
    location: &GroupingLocation,
    options: &CompileOptions,
) -> Compilation {
    let expander = Expander::new(document, options);
    let cursor = Cursor::default();

    let Some(section) = document.sections.get(location.section_index) else {
        return unresolved(location, options);
    };

    let (subsections, trace) = match (location.subsection_index, location.chord_sequence_index) {
        (None, None) => {
            let pass = expander.expand_section(location.section_index, section, cursor);
            (pass.unit.subsections, pass.trace)
        }
        (Some(subsection_index), None) => {
            let Some(subsection) = section.subsections.get(subsection_index) else {
                return unresolved(location, options);
            };
            let passes = expander.expand_subsection(
                location.section_index,
                subsection_index,
                subsection,
                cursor,
            );
            (passes.unit, passes.trace)
        }
        (Some(subsection_index), Some(sequence_index)) => {
            let Some(Subsection::Chord(chord)) = section.subsections.get(subsection_index) else {
                return unresolved(location, options);
            };
            let Some(sequence) = chord.sequences.get(sequence_index) else {
                return unresolved(location, options);
            };
            let bpm = resolve_bpm(chord.bpm, expander.global_bpm());
            let passes = expander.expand_chord_sequence(
                Location::strum(location.section_index, subsection_index, sequence_index, 0),
                sequence,
                bpm,
                cursor,
            );
            let subsection = PlaybackSubsection::Chord(PlaybackChordSubsection {
                id: chord.id.clone(),
                bpm,
                sequences: passes.unit,
            });
            (vec![subsection], passes.trace)
        }
        (None, Some(_)) => return unresolved(location, options),
    };

    let section = PlaybackSection {
        id: section.id.clone(),
        title: section.title.clone(),
        subsections,
    };
    finish(vec![section], trace, options)
}

/// Shift every entry so the first one starts at zero.
fn normalize_elapsed(metadata: &mut [PlaybackMetadata]) {
    let Some(offset) = metadata.first().map(|entry| entry.elapsed_seconds) else {
        return;
    };
    for entry in metadata.iter_mut() {
        entry.elapsed_seconds -= offset;
    }
}

fn terminal_boundary(metadata: &[PlaybackMetadata]) -> Option<PlaybackMetadata> {
    let last = metadata.last()?;
    Some(PlaybackMetadata {
        location: last.location.next_chord(),
        bpm: last.bpm,
        note_length_multiplier: last.note_length_multiplier.clone(),
        elapsed_seconds: last.elapsed_seconds + (60.0 / last.bpm).ceil() + 1.0,
        playback_index: None,
    })
}

fn unresolved(location: &GroupingLocation, options: &CompileOptions) -> Compilation {
    let mut trace = Trace::default();
    trace.report(Diagnostic::warning(
        DiagnosticKind::UnresolvedLocation,
        format!(
            "Nothing to preview at section {}, subsection {:?}, chord sequence {:?}",
            location.section_index, location.subsection_index, location.chord_sequence_index
        ),
    ));
    finish(Vec::new(), trace, options)
}

fn finish(
    sections: Vec<PlaybackSection>,
    mut trace: Trace,
    options: &CompileOptions,
) -> Compilation {
    if trace.truncated {
        trace.report(Diagnostic::warning(
            DiagnosticKind::Truncated,
            format!(
                "Stopped expanding after {} playable units",
                options.max_playable_units.unwrap_or_default()
            ),
        ));
    }
    for diagnostic in &trace.diagnostics {
        diagnostic.log();
    }
    tracing::debug!(
        sections = sections.len(),
        entries = trace.metadata.len(),
        "compiled playback timeline"
    );

    Compilation {
        sections,
        metadata: trace.metadata,
        diagnostics: trace.diagnostics,
    }
}
