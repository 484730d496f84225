//! Unit expanders
//!
//! One expander per nesting level: section, subsection, chord sequence and column.
//! Each takes the [`Cursor`] it starts at and returns the unit it built, the
//! timeline entries it produced and the cursor where the next unit starts, so a
//! whole compilation is a fold over the document.

use crate::diagnostics::{report, Diagnostic, DiagnosticKind};
use crate::document::{
    ChordSequence, ChordSubsection, Column, Section, Subsection, TabDocument, TabSubsection,
};
use crate::options::CompileOptions;

use super::note_length::NoteLength;
use super::tempo::{resolve_bpm, TabTempo};
use super::types::{
    Location, PlaybackChordSequence, PlaybackChordSubsection, PlaybackMetadata, PlaybackSection,
    PlaybackSubsection, PlaybackTabSubsection,
};

/// Position on the timeline: seconds elapsed and the next playback index.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Cursor {
    pub elapsed_seconds: f64,
    pub index: usize,
}

impl Cursor {
    /// Cursor after one playable unit of the given length.
    fn after(self, bpm: f64, length: NoteLength) -> Self {
        Self {
            elapsed_seconds: self.elapsed_seconds + length.seconds_at(bpm),
            index: self.index + 1,
        }
    }

    fn entry(&self, location: Location, bpm: f64, length: NoteLength) -> PlaybackMetadata {
        PlaybackMetadata {
            location,
            bpm,
            note_length_multiplier: length.multiplier_label().to_string(),
            elapsed_seconds: self.elapsed_seconds,
            playback_index: length.is_playable().then_some(self.index),
        }
    }
}

/// Timeline entries and diagnostics produced by one expansion.
#[derive(Debug, Default)]
pub(crate) struct Trace {
    pub metadata: Vec<PlaybackMetadata>,
    pub diagnostics: Vec<Diagnostic>,
    /// Expansion stopped early at the playable unit cap
    pub truncated: bool,
}

impl Trace {
    pub fn absorb(&mut self, other: Trace) {
        self.metadata.extend(other.metadata);
        for diagnostic in other.diagnostics {
            report(&mut self.diagnostics, diagnostic);
        }
        self.truncated |= other.truncated;
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        report(&mut self.diagnostics, diagnostic);
    }
}

pub(crate) struct Expanded<T> {
    pub unit: T,
    pub trace: Trace,
    pub cursor: Cursor,
}

/// What a column leaves behind for the next one.
struct ColumnStep {
    tempo: TabTempo,
    index: Option<usize>,
}

pub(crate) struct Expander {
    global_bpm: f64,
    max_playable_units: Option<usize>,
}

impl Expander {
    /// Options built in code skip `from_yaml` validation, so an unusable default
    /// tempo falls back to [`CompileOptions::DEFAULT_BPM`].
    pub fn new(document: &TabDocument, options: &CompileOptions) -> Self {
        let default_bpm = resolve_bpm(Some(options.default_bpm), CompileOptions::DEFAULT_BPM);
        Self {
            global_bpm: resolve_bpm(document.bpm, default_bpm),
            max_playable_units: options.max_playable_units,
        }
    }

    pub fn global_bpm(&self) -> f64 {
        self.global_bpm
    }

    /// True once the playable unit cap is reached.
    ///
    /// Only checked in front of a playable unit: measure lines after the last
    /// allowed unit still play, and `truncated` means playable work was skipped.
    pub fn exhausted(&self, cursor: Cursor) -> bool {
        self.max_playable_units
            .map_or(false, |max| cursor.index >= max)
    }

    pub fn expand_section(
        &self,
        section_index: usize,
        section: &Section,
        cursor: Cursor,
    ) -> Expanded<PlaybackSection> {
        let mut trace = Trace::default();
        let mut cursor = cursor;
        let mut subsections = Vec::new();

        for (subsection_index, subsection) in section.subsections.iter().enumerate() {
            let passes =
                self.expand_subsection(section_index, subsection_index, subsection, cursor);
            cursor = passes.cursor;
            trace.absorb(passes.trace);
            subsections.extend(passes.unit);
            if trace.truncated {
                break;
            }
        }

        Expanded {
            unit: PlaybackSection {
                id: section.id.clone(),
                title: section.title.clone(),
                subsections,
            },
            trace,
            cursor,
        }
    }

    /// Every pass of a subsection, one per repetition.
    pub fn expand_subsection(
        &self,
        section_index: usize,
        subsection_index: usize,
        subsection: &Subsection,
        cursor: Cursor,
    ) -> Expanded<Vec<PlaybackSubsection>> {
        let mut trace = Trace::default();
        let mut cursor = cursor;
        let mut passes = Vec::new();

        for _ in 0..subsection.repetitions() {
            let (pass, pass_trace, next) = match subsection {
                Subsection::Tab(tab) => {
                    let pass =
                        self.expand_tab_subsection(section_index, subsection_index, tab, cursor);
                    (PlaybackSubsection::Tab(pass.unit), pass.trace, pass.cursor)
                }
                Subsection::Chord(chord) => {
                    let pass = self.expand_chord_subsection(
                        section_index,
                        subsection_index,
                        chord,
                        cursor,
                    );
                    (PlaybackSubsection::Chord(pass.unit), pass.trace, pass.cursor)
                }
            };
            cursor = next;
            // A pass cut off before it produced anything is dropped
            let stop = pass_trace.truncated;
            if !(stop && pass_trace.metadata.is_empty()) {
                passes.push(pass);
            }
            trace.absorb(pass_trace);
            if stop {
                break;
            }
        }

        Expanded {
            unit: passes,
            trace,
            cursor,
        }
    }

    fn expand_tab_subsection(
        &self,
        section_index: usize,
        subsection_index: usize,
        subsection: &TabSubsection,
        cursor: Cursor,
    ) -> Expanded<PlaybackTabSubsection> {
        let bpm = resolve_bpm(subsection.bpm, self.global_bpm);
        let mut tempo = TabTempo::new(bpm);
        let mut trace = Trace::default();
        let mut cursor = cursor;
        let mut indices = Vec::new();

        for (column_index, column) in subsection.columns.iter().enumerate() {
            if !column.is_measure_line() && self.exhausted(cursor) {
                trace.truncated = true;
                break;
            }
            let location = Location::column(section_index, subsection_index, column_index);
            let step = self.expand_column(location, column, tempo, cursor);
            tempo = step.unit.tempo;
            indices.extend(step.unit.index);
            cursor = step.cursor;
            trace.absorb(step.trace);
        }

        Expanded {
            unit: PlaybackTabSubsection {
                id: subsection.id.clone(),
                bpm,
                columns: subsection.columns.clone(),
                indices,
            },
            trace,
            cursor,
        }
    }

    fn expand_column(
        &self,
        location: Location,
        column: &Column,
        tempo: TabTempo,
        cursor: Cursor,
    ) -> Expanded<ColumnStep> {
        let mut trace = Trace::default();

        if column.is_measure_line() {
            let tempo = tempo.at_measure_line(column.measure_line_bpm());
            trace
                .metadata
                .push(cursor.entry(location, tempo.current(), NoteLength::MeasureLine));
            return Expanded {
                unit: ColumnStep { tempo, index: None },
                trace,
                cursor,
            };
        }

        let length = playable_length(&column.note_length, location, &mut trace);
        let bpm = tempo.current();
        trace.metadata.push(cursor.entry(location, bpm, length));

        Expanded {
            unit: ColumnStep {
                tempo,
                index: Some(cursor.index),
            },
            trace,
            cursor: cursor.after(bpm, length),
        }
    }

    fn expand_chord_subsection(
        &self,
        section_index: usize,
        subsection_index: usize,
        subsection: &ChordSubsection,
        cursor: Cursor,
    ) -> Expanded<PlaybackChordSubsection> {
        let bpm = resolve_bpm(subsection.bpm, self.global_bpm);
        let mut trace = Trace::default();
        let mut cursor = cursor;
        let mut sequences = Vec::new();

        for (sequence_index, sequence) in subsection.sequences.iter().enumerate() {
            let passes = self.expand_chord_sequence(
                Location::strum(section_index, subsection_index, sequence_index, 0),
                sequence,
                bpm,
                cursor,
            );
            cursor = passes.cursor;
            trace.absorb(passes.trace);
            sequences.extend(passes.unit);
            if trace.truncated {
                break;
            }
        }

        Expanded {
            unit: PlaybackChordSubsection {
                id: subsection.id.clone(),
                bpm,
                sequences,
            },
            trace,
            cursor,
        }
    }

    /// Every pass of a chord sequence, one per repetition.
    ///
    /// `start` is the location of the sequence's first strum.
    pub fn expand_chord_sequence(
        &self,
        start: Location,
        sequence: &ChordSequence,
        subsection_bpm: f64,
        cursor: Cursor,
    ) -> Expanded<Vec<PlaybackChordSequence>> {
        let bpm = resolve_bpm(sequence.bpm, subsection_bpm);
        let pattern = &sequence.strumming_pattern;
        let mut trace = Trace::default();
        let length = playable_length(&pattern.note_length, start, &mut trace);
        let mut cursor = cursor;
        let mut passes = Vec::new();

        'passes: for _ in 0..sequence.repetitions() {
            let mut indices = Vec::with_capacity(pattern.strums.len());
            for strum_index in 0..pattern.strums.len() {
                if self.exhausted(cursor) {
                    trace.truncated = true;
                    if !indices.is_empty() {
                        passes.push(chord_sequence_pass(sequence, bpm, indices));
                    }
                    break 'passes;
                }
                let location = Location {
                    chord_index: strum_index,
                    ..start
                };
                trace.metadata.push(cursor.entry(location, bpm, length));
                indices.push(cursor.index);
                cursor = cursor.after(bpm, length);
            }
            passes.push(chord_sequence_pass(sequence, bpm, indices));
        }

        Expanded {
            unit: passes,
            trace,
            cursor,
        }
    }
}

fn chord_sequence_pass(
    sequence: &ChordSequence,
    bpm: f64,
    indices: Vec<usize>,
) -> PlaybackChordSequence {
    PlaybackChordSequence {
        id: sequence.id.clone(),
        bpm,
        strumming_pattern: sequence.strumming_pattern.clone(),
        chords: sequence.chords.clone(),
        indices,
    }
}

/// Length of a unit that must take time; anything else plays as the default length.
fn playable_length(tag: &str, location: Location, trace: &mut Trace) -> NoteLength {
    match NoteLength::from_tag(tag) {
        Some(length) if length.is_playable() => length,
        Some(_) => {
            trace.report(
                Diagnostic::warning(
                    DiagnosticKind::UnknownNoteLength,
                    format!(
                        "{:?} cannot time a playable unit, playing it as a quarter note",
                        tag
                    ),
                )
                .at(location),
            );
            NoteLength::DEFAULT
        }
        None => {
            trace.report(Diagnostic::unknown_note_length(tag).at(location));
            NoteLength::DEFAULT
        }
    }
}
