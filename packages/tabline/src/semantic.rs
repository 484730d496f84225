//! # Semantic Lint Module
//!
//! This module looks for content in a tab document that compiles, but probably not
//! the way its author meant.
//!
//! ## Purpose
//! The compiler never rejects a document: a broken reference is skipped, an unknown
//! note length plays as a quarter note. That keeps the editor responsive, but it
//! also hides mistakes. `lint` surfaces them so the editor can underline them.
//!
//! ## Lint Rules
//!
//! ### Tempo
//! - The document, a subsection, a chord sequence or a measure line sets a BPM that
//!   is zero, negative or not a number (it is ignored and the tempo is inherited)
//!
//! ### Note Lengths
//! - A column or strumming pattern uses an unknown note length tag
//! - A strumming pattern uses `measureLine` as its note length
//!
//! ### Chord Sequences
//! - A strum tag is not a known gesture/decoration combination
//! - The number of chord names differs from the number of strums
//!
//! ### Section Progression
//! - An entry references a section id that does not exist
//!
//! ## Entry Point
//! `lint(document: &TabDocument) -> Vec<Diagnostic>`
//!
//! ## Example
//! ```rust
//! use tabline::{lint, parse, DiagnosticKind};
//!
//! let document = parse(r#"{
//!   "sections": [{ "id": "a", "data": [{ "type": "tab", "data": [
//!     ["", "", "", "", "", "", "0", "", "whole", "c1"]
//!   ]}]}],
//!   "sectionProgression": [{ "sectionId": "b", "repetitions": 1 }]
//! }"#)?;
//!
//! let kinds: Vec<DiagnosticKind> = lint(&document).iter().map(|d| d.kind).collect();
//! assert_eq!(kinds, vec![DiagnosticKind::UnresolvedSection, DiagnosticKind::UnknownNoteLength]);
//! # Ok::<(), tabline::TablineError>(())
//! ```
//!
//! ## Related Modules
//! - `document` - Defines the types being checked
//! - `diagnostics` - The `Diagnostic` values returned here

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::document::*;
use crate::playback::{is_usable_bpm, Location, NoteLength};

/// Lint a tab document.
///
/// Diagnostics come in document order, progression problems first.
pub fn lint(document: &TabDocument) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if let Some(bpm) = document.bpm {
        check_bpm(bpm, "The tab", None, &mut diagnostics);
    }
    lint_progression(document, &mut diagnostics);

    for (section_index, section) in document.sections.iter().enumerate() {
        for (subsection_index, subsection) in section.subsections.iter().enumerate() {
            let location = Location::column(section_index, subsection_index, 0);
            if let Some(bpm) = subsection.bpm() {
                check_bpm(bpm, "This subsection", Some(location), &mut diagnostics);
            }
            match subsection {
                Subsection::Tab(tab) => lint_tab(tab, location, &mut diagnostics),
                Subsection::Chord(chord) => lint_chords(chord, location, &mut diagnostics),
            }
        }
    }

    for diagnostic in &diagnostics {
        tracing::debug!(kind = ?diagnostic.kind, "{}", diagnostic.message);
    }
    diagnostics
}

/// Check that every progression entry points at a section
fn lint_progression(document: &TabDocument, diagnostics: &mut Vec<Diagnostic>) {
    for entry in &document.section_progression {
        if document.section(&entry.section_id).is_none() {
            diagnostics.push(Diagnostic::unresolved_section(&entry.section_id));
        }
    }
}

fn lint_tab(tab: &TabSubsection, start: Location, diagnostics: &mut Vec<Diagnostic>) {
    for (column_index, column) in tab.columns.iter().enumerate() {
        let location = Location {
            chord_index: column_index,
            ..start
        };

        if column.is_measure_line() {
            lint_measure_line(column, location, diagnostics);
        } else if NoteLength::from_tag(&column.note_length).is_none() {
            diagnostics.push(Diagnostic::unknown_note_length(&column.note_length).at(location));
        }
    }
}

/// A measure line's tempo slot must be empty, `-1` or a positive number
fn lint_measure_line(column: &Column, location: Location, diagnostics: &mut Vec<Diagnostic>) {
    let slot = column.chord_effects.trim();
    if slot.is_empty() {
        return;
    }
    match slot.parse::<f64>() {
        Ok(bpm) if bpm == BPM_SENTINEL => {}
        Ok(bpm) => check_bpm(bpm, "This measure line", Some(location), diagnostics),
        Err(_) => diagnostics.push(
            Diagnostic::warning(
                DiagnosticKind::InvalidBpm,
                format!("Measure line tempo {:?} is not a number", slot),
            )
            .at(location),
        ),
    }
}

fn lint_chords(chord: &ChordSubsection, start: Location, diagnostics: &mut Vec<Diagnostic>) {
    for (sequence_index, sequence) in chord.sequences.iter().enumerate() {
        let location =
            Location::strum(start.section_index, start.subsection_index, sequence_index, 0);
        let pattern = &sequence.strumming_pattern;

        if let Some(bpm) = sequence.bpm {
            check_bpm(bpm, "This chord sequence", Some(location), diagnostics);
        }

        match NoteLength::from_tag(&pattern.note_length) {
            Some(length) if length.is_playable() => {}
            Some(_) => diagnostics.push(
                Diagnostic::warning(
                    DiagnosticKind::UnknownNoteLength,
                    "A strumming pattern cannot use measureLine as its note length",
                )
                .at(location),
            ),
            None => diagnostics
                .push(Diagnostic::unknown_note_length(&pattern.note_length).at(location)),
        }

        for (strum_index, strum) in pattern.strums.iter().enumerate() {
            if strum.tag().is_none() {
                diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticKind::UnknownStrum,
                        format!("Unknown strum {:?}", strum.strum),
                    )
                    .at(Location {
                        chord_index: strum_index,
                        ..location
                    }),
                );
            }
        }

        if sequence.chords.len() != pattern.strums.len() {
            diagnostics.push(
                Diagnostic::info(
                    DiagnosticKind::ChordCountMismatch,
                    format!(
                        "{} chord names for {} strums",
                        sequence.chords.len(),
                        pattern.strums.len()
                    ),
                )
                .at(location),
            );
        }
    }
}

fn check_bpm(bpm: f64, owner: &str, location: Option<Location>, diagnostics: &mut Vec<Diagnostic>) {
    if is_usable_bpm(bpm) {
        return;
    }
    let diagnostic = Diagnostic::warning(
        DiagnosticKind::InvalidBpm,
        format!("{} sets a tempo of {} BPM, which is ignored", owner, bpm),
    );
    diagnostics.push(match location {
        Some(location) => diagnostic.at(location),
        None => diagnostic,
    });
}
