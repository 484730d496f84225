//! Compile options.
//!
//! Options are plain data so they can live next to a tab in a YAML (or JSON) file:
//!
//! ```yaml
//! defaultBpm: 90
//! maxPlayableUnits: 20000
//! ```

use serde::{Deserialize, Serialize};

use crate::error::TablineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    /// Tempo used when neither the document nor any nested unit sets one
    pub default_bpm: f64,
    /// Stop expanding once this many playable units were produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_playable_units: Option<usize>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            default_bpm: Self::DEFAULT_BPM,
            max_playable_units: None,
        }
    }
}

impl CompileOptions {
    pub const DEFAULT_BPM: f64 = 120.0;

    /// Parse options from YAML (JSON is accepted as well).
    ///
    /// # Example
    /// ```
    /// use tabline::CompileOptions;
    ///
    /// let options = CompileOptions::from_yaml("defaultBpm: 90").unwrap();
    /// assert_eq!(options.default_bpm, 90.0);
    /// assert_eq!(options.max_playable_units, None);
    ///
    /// assert!(CompileOptions::from_yaml("defaultBpm: 0").is_err());
    /// ```
    pub fn from_yaml(source: &str) -> Result<Self, TablineError> {
        let options: Self = serde_yaml::from_str(source)
            .map_err(|e| TablineError::OptionsError(e.to_string()))?;
        options.validated()
    }

    pub fn with_default_bpm(mut self, bpm: f64) -> Self {
        self.default_bpm = bpm;
        self
    }

    pub fn with_max_playable_units(mut self, max: usize) -> Self {
        self.max_playable_units = Some(max);
        self
    }

    fn validated(self) -> Result<Self, TablineError> {
        if !self.default_bpm.is_finite() || self.default_bpm <= 0.0 {
            return Err(TablineError::OptionsError(format!(
                "defaultBpm must be a positive number, got {}",
                self.default_bpm
            )));
        }
        Ok(self)
    }
}
