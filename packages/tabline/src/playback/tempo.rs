//! Tempo resolution
//!
//! Tempo cascades chord sequence → subsection → document → compile options. An
//! absent override always defers to the enclosing scope, never to whatever tempo a
//! neighbouring unit happened to set.

/// Effective BPM given an optional override and the enclosing tempo.
///
/// Overrides that are not a positive number count as absent.
///
/// # Example
/// ```
/// use tabline::playback::resolve_bpm;
///
/// assert_eq!(resolve_bpm(Some(90.0), 120.0), 90.0);
/// assert_eq!(resolve_bpm(None, 120.0), 120.0);
/// assert_eq!(resolve_bpm(Some(-1.0), 120.0), 120.0);
/// ```
pub fn resolve_bpm(override_bpm: Option<f64>, enclosing: f64) -> f64 {
    match override_bpm {
        Some(bpm) if is_usable_bpm(bpm) => bpm,
        _ => enclosing,
    }
}

pub fn is_usable_bpm(bpm: f64) -> bool {
    bpm.is_finite() && bpm > 0.0
}

/// Running tempo inside a tab subsection.
///
/// Measure lines either set a new tempo or, without a value, return to the
/// subsection's own tempo (not to the tempo before the last change).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TabTempo {
    declared: f64,
    current: f64,
}

impl TabTempo {
    pub fn new(declared: f64) -> Self {
        Self {
            declared,
            current: declared,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn at_measure_line(self, override_bpm: Option<f64>) -> Self {
        Self {
            current: resolve_bpm(override_bpm, self.declared),
            ..self
        }
    }
}
