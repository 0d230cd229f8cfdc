use serde::{Deserialize, Serialize};

use crate::error::GuideError;

pub const DEFAULT_TRANSITION_MINUTES: u32 = 15;
pub const DEFAULT_DAY_START: &str = "09:00";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub exact: f64,
    pub substring: f64,
    pub category_fallback: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            exact: 2.0,
            substring: 1.0,
            category_fallback: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub transition_minutes: u32,
    /// Minutes after midnight at which the first stop is reached.
    pub day_start_minutes: u32,
    pub max_stops: Option<usize>,
    pub weights: ScoringWeights,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            transition_minutes: DEFAULT_TRANSITION_MINUTES,
            day_start_minutes: 9 * 60,
            max_stops: None,
            weights: ScoringWeights::default(),
        }
    }
}

impl PlannerConfig {
    pub fn with_day_start(mut self, clock: &str) -> Result<Self, GuideError> {
        self.day_start_minutes = parse_clock(clock)
            .ok_or_else(|| GuideError::invalid(format!("day start '{clock}' is not HH:MM")))?;
        Ok(self)
    }
}

pub fn parse_clock(value: &str) -> Option<u32> {
    let (hours, minutes) = value.trim().split_once(':')?;
    let hours = hours.parse::<u32>().ok()?;
    let minutes = minutes.parse::<u32>().ok()?;
    (hours < 24 && minutes < 60).then_some(hours * 60 + minutes)
}

/// Zero-padded `HH:MM`. The hour keeps counting past 23; there is no day
/// rollover.
pub fn format_clock(total_minutes: u32) -> String {
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}
