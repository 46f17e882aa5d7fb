//! Budget and complexity envelopes per level and usage.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::profile::Usage;

/// Highest supported power level.
pub const MAX_LEVEL: u32 = 30;

/// The budget envelope for one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerLimits {
    /// Weapon dice available before any modifier is paid for.
    pub initial: f64,
    /// Smallest per-target damage share a power may be left with.
    pub minimum: f64,
    /// Cap on the summed complexity of every modifier.
    pub max_complexity: u32,
}

impl PowerLimits {
    /// Limits for a level between 1 and 30 and a usage frequency.
    ///
    /// Every ten levels form a tier; each tier raises the budget by half
    /// the base amount and allows one more point of complexity.
    pub fn for_level(level: u32, usage: Usage) -> EngineResult<Self> {
        if !(1..=MAX_LEVEL).contains(&level) {
            return Err(EngineError::InvalidLevel(level));
        }
        let tier = (level - 1) / 10;
        let (initial, minimum, base_complexity) = match usage {
            Usage::AtWill => (2.0, 1.0, 1),
            Usage::Encounter => (3.0, 1.0, 2),
            Usage::Daily => (4.5, 1.5, 3),
        };
        let scale = 1.0 + 0.5 * f64::from(tier);
        Ok(Self {
            initial: initial * scale,
            minimum: minimum * scale,
            max_complexity: base_complexity + tier,
        })
    }
}
