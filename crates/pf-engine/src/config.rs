//! Per-run search preferences.

use serde::{Deserialize, Serialize};

/// Per-run preferences for the upgrade search.
///
/// Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerProfileConfig {
    /// Modifier names to favour above tool and class preferences.
    pub preferred_modifiers: Vec<String>,
    /// Modifier names never to offer.
    pub excluded_modifiers: Vec<String>,
    /// Upper bound on upgrades applied in a single stage.
    pub max_iterations: usize,
}

impl Default for PowerProfileConfig {
    fn default() -> Self {
        Self {
            preferred_modifiers: Vec::new(),
            excluded_modifiers: Vec::new(),
            max_iterations: 256,
        }
    }
}

impl PowerProfileConfig {
    /// Favour a modifier by name.
    pub fn with_preferred_modifier(mut self, name: impl Into<String>) -> Self {
        self.preferred_modifiers.push(name.into());
        self
    }

    /// Never offer a modifier by name.
    pub fn with_excluded_modifier(mut self, name: impl Into<String>) -> Self {
        self.excluded_modifiers.push(name.into());
        self
    }

    /// Set the per-stage upgrade cap.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Returns true if the modifier name was excluded.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded_modifiers.iter().any(|n| n == name)
    }
}
