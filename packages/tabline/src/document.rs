//! # Tab Document Types
//!
//! This module defines the read-only input model the compiler works on.
//!
//! ## Type Hierarchy
//! ```text
//! TabDocument
//!   ├── bpm: Option<f64> (global tempo, `-1` when persisted as "unset")
//!   ├── Vec<ProgressionEntry> (section playlist: sectionId + repetitions)
//!   └── Vec<Section>
//!         └── Vec<Subsection> (enum)
//!               ├── Tab
//!               │     ├── bpm, repetitions
//!               │     └── Vec<Column> (10 positional slots)
//!               └── Chord
//!                     ├── bpm, repetitions
//!                     └── Vec<ChordSequence>
//!                           ├── bpm, repetitions
//!                           ├── StrummingPattern (noteLength + Vec<Strum>)
//!                           └── Vec<String> (one chord name per strum)
//! ```
//!
//! ## Persisted Shape
//!
//! Documents are JSON (or YAML) with camelCase keys. Every level keeps its payload
//! under `data`, and subsections are tagged by `"type": "tab" | "chord"`.
//!
//! ### Tempo sentinel
//! A persisted BPM of `-1` means "not set, inherit from the enclosing scope". It is
//! read as `None` and written back as `-1`.
//!
//! ### Repetitions
//! A stored `0` (or a missing field) is read as-is but every accessor normalizes it
//! to `1`.
//!
//! ### Columns
//! A column is a positional array of strings:
//!
//! | slot | meaning |
//! |------|---------|
//! | 0 | palm mute flag (`""`, `"-"`, `"start"`, `"end"`) |
//! | 1-6 | fret per string |
//! | 7 | chord effects, or the BPM override of a measure line |
//! | 8 | note length tag, or `measureLine` |
//! | 9 | column id |
//! | 10 | optional: `"true"` when the note length was modified |
//!
//! ## Related Modules
//! - `loader` - Reads documents from JSON/YAML source
//! - `playback` - Compiles documents into playback timelines
//! - `semantic` - Lints documents for suspicious content

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Note length tag that marks a column as a bar line.
pub const MEASURE_LINE: &str = "measureLine";

/// Persisted value meaning "no tempo override".
pub const BPM_SENTINEL: f64 = -1.0;

fn normalize_repetitions(repetitions: u32) -> u32 {
    repetitions.max(1)
}

/// Maps the persisted `-1` sentinel to `None` and back.
mod sentinel_bpm {
    use super::BPM_SENTINEL;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bpm: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        let bpm = bpm.unwrap_or(BPM_SENTINEL);
        if bpm.fract() == 0.0 && bpm.abs() < i64::MAX as f64 {
            serializer.serialize_i64(bpm as i64)
        } else {
            serializer.serialize_f64(bpm)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bpm = Option::<f64>::deserialize(deserializer)?;
        Ok(bpm.filter(|bpm| *bpm != BPM_SENTINEL))
    }
}

/// Palm mute region marker, shared by tab columns and strums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PalmMute {
    #[default]
    #[serde(rename = "")]
    Off,
    /// Inside a palm mute region
    #[serde(rename = "-")]
    Held,
    #[serde(rename = "start")]
    Start,
    #[serde(rename = "end")]
    End,
}

impl PalmMute {
    pub fn from_slot(slot: &str) -> Option<Self> {
        match slot {
            "" => Some(PalmMute::Off),
            "-" => Some(PalmMute::Held),
            "start" => Some(PalmMute::Start),
            "end" => Some(PalmMute::End),
            _ => None,
        }
    }

    pub fn as_slot(&self) -> &'static str {
        match self {
            PalmMute::Off => "",
            PalmMute::Held => "-",
            PalmMute::Start => "start",
            PalmMute::End => "end",
        }
    }
}

/// One vertical slice of a tab subsection.
///
/// Persisted as a positional string array (see the module docs). A column whose
/// note length is [`MEASURE_LINE`] is a bar line: it is never played and its
/// chord effects slot may carry a tempo override for the columns after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Column {
    pub palm_mute: PalmMute,
    pub frets: [String; 6],
    pub chord_effects: String,
    pub note_length: String,
    pub id: String,
    pub length_modified: bool,
}

impl Column {
    /// A playable column with empty strings and the given note length.
    pub fn new(id: impl Into<String>, note_length: impl Into<String>) -> Self {
        Self {
            palm_mute: PalmMute::Off,
            frets: Default::default(),
            chord_effects: String::new(),
            note_length: note_length.into(),
            id: id.into(),
            length_modified: false,
        }
    }

    /// A bar line, optionally changing the tempo from here on.
    pub fn measure_line(id: impl Into<String>, bpm: Option<f64>) -> Self {
        Self {
            palm_mute: PalmMute::Off,
            frets: std::array::from_fn(|_| "|".to_string()),
            chord_effects: bpm.unwrap_or(BPM_SENTINEL).to_string(),
            note_length: MEASURE_LINE.to_string(),
            id: id.into(),
            length_modified: false,
        }
    }

    pub fn with_frets(mut self, frets: [&str; 6]) -> Self {
        self.frets = frets.map(str::to_string);
        self
    }

    pub fn is_measure_line(&self) -> bool {
        self.note_length == MEASURE_LINE
    }

    /// Tempo override carried by a measure line, `None` for the `-1` sentinel,
    /// an empty slot, or text that is not a number.
    pub fn measure_line_bpm(&self) -> Option<f64> {
        if !self.is_measure_line() {
            return None;
        }
        self.chord_effects
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|bpm| *bpm != BPM_SENTINEL)
    }
}

impl TryFrom<Vec<String>> for Column {
    type Error = String;

    fn try_from(slots: Vec<String>) -> Result<Self, Self::Error> {
        if slots.len() != 10 && slots.len() != 11 {
            return Err(format!(
                "a column has 10 positional slots (11 with the length-modified flag), found {}",
                slots.len()
            ));
        }

        let length_modified = match slots.get(10).map(String::as_str) {
            None | Some("") | Some("false") => false,
            Some("true") => true,
            Some(other) => return Err(format!("invalid length-modified flag {:?}", other)),
        };

        let mut slots = slots.into_iter();
        let mut next = || slots.next().unwrap_or_default();

        let palm_mute_slot = next();
        let palm_mute = PalmMute::from_slot(&palm_mute_slot)
            .ok_or_else(|| format!("unknown palm mute flag {:?}", palm_mute_slot))?;
        let frets = [next(), next(), next(), next(), next(), next()];
        let chord_effects = next();
        let note_length = next();
        let id = next();

        Ok(Self {
            palm_mute,
            frets,
            chord_effects,
            note_length,
            id,
            length_modified,
        })
    }
}

impl From<Column> for Vec<String> {
    fn from(column: Column) -> Self {
        let mut slots = Vec::with_capacity(11);
        slots.push(column.palm_mute.as_slot().to_string());
        slots.extend(column.frets);
        slots.push(column.chord_effects);
        slots.push(column.note_length);
        slots.push(column.id);
        if column.length_modified {
            slots.push("true".to_string());
        }
        slots
    }
}

/// Strum direction, without decorations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrumGesture {
    Down,
    Up,
    Slap,
    Rest,
    /// No strum at this position
    Silent,
}

/// A parsed strum tag such as `v`, `^>` or `s.`.
///
/// Accent (`>`) and staccato (`.`) decorate a sounding gesture; rests and silent
/// positions take no decorations.
///
/// # Example
/// ```
/// use tabline::{StrumGesture, StrumTag};
///
/// let tag = StrumTag::parse("v>").unwrap();
/// assert_eq!(tag.gesture, StrumGesture::Down);
/// assert!(tag.accented);
/// assert!(!tag.staccato);
///
/// assert_eq!(StrumTag::parse("").unwrap().gesture, StrumGesture::Silent);
/// assert!(StrumTag::parse("x").is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrumTag {
    pub gesture: StrumGesture,
    pub accented: bool,
    pub staccato: bool,
}

impl StrumTag {
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        let mut chars = tag.chars();
        let gesture = match chars.next() {
            None => StrumGesture::Silent,
            Some('v') => StrumGesture::Down,
            Some('^') => StrumGesture::Up,
            Some('s') => StrumGesture::Slap,
            Some('r') => StrumGesture::Rest,
            Some(_) => return None,
        };

        let mut parsed = Self {
            gesture,
            accented: false,
            staccato: false,
        };
        for decoration in chars {
            match decoration {
                '>' if !parsed.accented => parsed.accented = true,
                '.' if !parsed.staccato => parsed.staccato = true,
                _ => return None,
            }
        }

        let decorated = parsed.accented || parsed.staccato;
        if decorated && matches!(gesture, StrumGesture::Rest | StrumGesture::Silent) {
            return None;
        }
        Some(parsed)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strum {
    #[serde(default)]
    pub palm_mute: PalmMute,
    #[serde(default)]
    pub strum: String,
}

impl Strum {
    pub fn new(strum: impl Into<String>) -> Self {
        Self {
            palm_mute: PalmMute::Off,
            strum: strum.into(),
        }
    }

    pub fn tag(&self) -> Option<StrumTag> {
        StrumTag::parse(&self.strum)
    }
}

/// Strums sharing one note length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrummingPattern {
    #[serde(default)]
    pub id: String,
    pub note_length: String,
    #[serde(default)]
    pub strums: Vec<Strum>,
}

impl StrummingPattern {
    pub fn new(id: impl Into<String>, note_length: impl Into<String>, strums: Vec<Strum>) -> Self {
        Self {
            id: id.into(),
            note_length: note_length.into(),
            strums,
        }
    }
}

/// A run of strums with one chord name per strum (`""` keeps the previous chord).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordSequence {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub repetitions: u32,
    #[serde(default, with = "sentinel_bpm")]
    pub bpm: Option<f64>,
    pub strumming_pattern: StrummingPattern,
    #[serde(default, rename = "data")]
    pub chords: Vec<String>,
}

impl ChordSequence {
    pub fn new(
        id: impl Into<String>,
        strumming_pattern: StrummingPattern,
        chords: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            repetitions: 1,
            bpm: None,
            strumming_pattern,
            chords,
        }
    }

    pub fn with_repetitions(mut self, repetitions: u32) -> Self {
        self.repetitions = repetitions;
        self
    }

    pub fn with_bpm(mut self, bpm: f64) -> Self {
        self.bpm = Some(bpm);
        self
    }

    pub fn repetitions(&self) -> u32 {
        normalize_repetitions(self.repetitions)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSubsection {
    #[serde(default)]
    pub id: String,
    #[serde(default, with = "sentinel_bpm")]
    pub bpm: Option<f64>,
    #[serde(default)]
    pub repetitions: u32,
    #[serde(default, rename = "data")]
    pub columns: Vec<Column>,
}

impl TabSubsection {
    pub fn new(id: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            id: id.into(),
            bpm: None,
            repetitions: 1,
            columns,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordSubsection {
    #[serde(default)]
    pub id: String,
    #[serde(default, with = "sentinel_bpm")]
    pub bpm: Option<f64>,
    #[serde(default)]
    pub repetitions: u32,
    #[serde(default, rename = "data")]
    pub sequences: Vec<ChordSequence>,
}

impl ChordSubsection {
    pub fn new(id: impl Into<String>, sequences: Vec<ChordSequence>) -> Self {
        Self {
            id: id.into(),
            bpm: None,
            repetitions: 1,
            sequences,
        }
    }
}

/// Tab (note by note) or chord (strumming pattern driven) block of a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Subsection {
    Tab(TabSubsection),
    Chord(ChordSubsection),
}

impl Subsection {
    pub fn id(&self) -> &str {
        match self {
            Subsection::Tab(tab) => &tab.id,
            Subsection::Chord(chord) => &chord.id,
        }
    }

    pub fn bpm(&self) -> Option<f64> {
        match self {
            Subsection::Tab(tab) => tab.bpm,
            Subsection::Chord(chord) => chord.bpm,
        }
    }

    pub fn repetitions(&self) -> u32 {
        match self {
            Subsection::Tab(tab) => normalize_repetitions(tab.repetitions),
            Subsection::Chord(chord) => normalize_repetitions(chord.repetitions),
        }
    }

    pub fn with_bpm(mut self, bpm: f64) -> Self {
        match &mut self {
            Subsection::Tab(tab) => tab.bpm = Some(bpm),
            Subsection::Chord(chord) => chord.bpm = Some(bpm),
        }
        self
    }

    pub fn with_repetitions(mut self, repetitions: u32) -> Self {
        match &mut self {
            Subsection::Tab(tab) => tab.repetitions = repetitions,
            Subsection::Chord(chord) => chord.repetitions = repetitions,
        }
        self
    }
}

impl From<TabSubsection> for Subsection {
    fn from(tab: TabSubsection) -> Self {
        Subsection::Tab(tab)
    }
}

impl From<ChordSubsection> for Subsection {
    fn from(chord: ChordSubsection) -> Self {
        Subsection::Chord(chord)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "data")]
    pub subsections: Vec<Subsection>,
}

impl Section {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        subsections: Vec<Subsection>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            subsections,
        }
    }
}

/// One entry of the section playlist.
///
/// Its repetitions are independent of how often the section's own subsections
/// repeat internally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionEntry {
    #[serde(default)]
    pub id: String,
    pub section_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub repetitions: u32,
}

impl ProgressionEntry {
    pub fn new(section_id: impl Into<String>, repetitions: u32) -> Self {
        let section_id = section_id.into();
        Self {
            id: format!("{}-entry", section_id),
            section_id,
            title: String::new(),
            repetitions,
        }
    }

    pub fn repetitions(&self) -> u32 {
        normalize_repetitions(self.repetitions)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabDocument {
    #[serde(default)]
    pub title: String,
    #[serde(default, with = "sentinel_bpm")]
    pub bpm: Option<f64>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub section_progression: Vec<ProgressionEntry>,
}

impl TabDocument {
    pub fn new(sections: Vec<Section>) -> Self {
        Self {
            sections,
            ..Self::default()
        }
    }

    pub fn with_bpm(mut self, bpm: f64) -> Self {
        self.bpm = Some(bpm);
        self
    }

    /// Position and contents of the section with the given id.
    pub fn section(&self, id: &str) -> Option<(usize, &Section)> {
        self.sections
            .iter()
            .enumerate()
            .find(|(_, section)| section.id == id)
    }

    /// The persisted progression, or every section once in document order when
    /// none was saved.
    pub fn effective_progression(&self) -> Cow<'_, [ProgressionEntry]> {
        if !self.section_progression.is_empty() {
            return Cow::Borrowed(&self.section_progression);
        }
        Cow::Owned(
            self.sections
                .iter()
                .map(|section| ProgressionEntry {
                    title: section.title.clone(),
                    ..ProgressionEntry::new(section.id.clone(), 1)
                })
                .collect(),
        )
    }
}
