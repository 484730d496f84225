//! Timeline queries used by transports and scroll sync.

use super::types::{Compilation, PlaybackMetadata};

/// Index of the last entry starting at or before `seconds`.
///
/// Entries sharing a start time (a measure line and the column after it) resolve to
/// the later one. Returns `None` before the first entry.
///
/// # Example
/// ```
/// use tabline::compile;
/// use tabline::playback::position_at;
///
/// let compiled = compile(r#"{
///   "bpm": 120,
///   "sections": [{ "id": "a", "data": [{ "type": "tab", "data": [
///     ["", "", "", "", "", "", "0", "", "quarter", "c1"],
///     ["", "", "", "", "", "", "2", "", "quarter", "c2"]
///   ]}]}]
/// }"#).unwrap();
///
/// assert_eq!(position_at(&compiled.metadata, 0.0), Some(0));
/// assert_eq!(position_at(&compiled.metadata, 0.7), Some(1));
/// assert_eq!(position_at(&compiled.metadata, -1.0), None);
/// ```
pub fn position_at(metadata: &[PlaybackMetadata], seconds: f64) -> Option<usize> {
    metadata
        .partition_point(|entry| entry.elapsed_seconds <= seconds)
        .checked_sub(1)
}

impl Compilation {
    /// See [`position_at`].
    pub fn position_at(&self, seconds: f64) -> Option<usize> {
        position_at(&self.metadata, seconds)
    }

    /// Start of the last entry; for full-tab compilations that is the terminal boundary.
    pub fn duration_seconds(&self) -> f64 {
        self.metadata
            .last()
            .map_or(0.0, |entry| entry.elapsed_seconds)
    }

    pub fn playable_count(&self) -> usize {
        self.metadata
            .iter()
            .filter(|entry| entry.is_playable())
            .count()
    }
}
