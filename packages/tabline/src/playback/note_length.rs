//! Note length tags and their duration multipliers
//!
//! A multiplier is the length of a note relative to one beat (a quarter note).
//! Triplet multipliers are kept as the truncated decimals tabs have always been
//! timed with, so long tabs drift by a fraction of a millisecond compared with
//! exact thirds.

use crate::document::MEASURE_LINE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteLength {
    Quarter,
    QuarterTriplet,
    Eighth,
    EighthTriplet,
    Sixteenth,
    SixteenthTriplet,
    /// Bar line: takes no time
    MeasureLine,
}

impl NoteLength {
    /// Length used for tags nobody recognizes.
    pub const DEFAULT: NoteLength = NoteLength::Quarter;

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "quarter" => Some(NoteLength::Quarter),
            "quarterTriplet" => Some(NoteLength::QuarterTriplet),
            "eighth" => Some(NoteLength::Eighth),
            "eighthTriplet" => Some(NoteLength::EighthTriplet),
            "sixteenth" => Some(NoteLength::Sixteenth),
            "sixteenthTriplet" => Some(NoteLength::SixteenthTriplet),
            MEASURE_LINE => Some(NoteLength::MeasureLine),
            _ => None,
        }
    }

    /// Resolve a tag, falling back to [`NoteLength::DEFAULT`].
    ///
    /// # Example
    /// ```
    /// use tabline::playback::NoteLength;
    ///
    /// assert_eq!(NoteLength::resolve("eighthTriplet").multiplier(), 0.3333);
    /// assert_eq!(NoteLength::resolve("whole"), NoteLength::Quarter);
    /// ```
    pub fn resolve(tag: &str) -> Self {
        Self::from_tag(tag).unwrap_or(Self::DEFAULT)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            NoteLength::Quarter => "quarter",
            NoteLength::QuarterTriplet => "quarterTriplet",
            NoteLength::Eighth => "eighth",
            NoteLength::EighthTriplet => "eighthTriplet",
            NoteLength::Sixteenth => "sixteenth",
            NoteLength::SixteenthTriplet => "sixteenthTriplet",
            NoteLength::MeasureLine => MEASURE_LINE,
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            NoteLength::Quarter => 1.0,
            NoteLength::QuarterTriplet => 0.6667,
            NoteLength::Eighth => 0.5,
            NoteLength::EighthTriplet => 0.3333,
            NoteLength::Sixteenth => 0.25,
            NoteLength::SixteenthTriplet => 0.1667,
            NoteLength::MeasureLine => 0.0,
        }
    }

    /// The multiplier as written into playback metadata.
    pub fn multiplier_label(&self) -> &'static str {
        match self {
            NoteLength::Quarter => "1",
            NoteLength::QuarterTriplet => "0.6667",
            NoteLength::Eighth => "0.5",
            NoteLength::EighthTriplet => "0.3333",
            NoteLength::Sixteenth => "0.25",
            NoteLength::SixteenthTriplet => "0.1667",
            NoteLength::MeasureLine => "0",
        }
    }

    pub fn is_playable(&self) -> bool {
        !matches!(self, NoteLength::MeasureLine)
    }

    /// Seconds this note lasts at the given tempo.
    ///
    /// # Example
    /// ```
    /// use tabline::playback::NoteLength;
    ///
    /// assert_eq!(NoteLength::Quarter.seconds_at(120.0), 0.5);
    /// assert_eq!(NoteLength::Sixteenth.seconds_at(60.0), 0.25);
    /// assert_eq!(NoteLength::MeasureLine.seconds_at(120.0), 0.0);
    /// ```
    pub fn seconds_at(&self, bpm: f64) -> f64 {
        60.0 / (bpm / self.multiplier())
    }
}
