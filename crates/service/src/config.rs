use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use guide_core::config::DEFAULT_DAY_START;
use guide_core::PlannerConfig;

pub const DEFAULT_DATASET: &str = "data/places.json";
const DEFAULT_PLAN_TIMEOUT_MS: u64 = 2_000;

#[derive(Debug, Clone)]
pub struct GuideSettings {
    pub dataset: PathBuf,
    pub tag_rules: Option<PathBuf>,
    pub planner: PlannerConfig,
    pub plan_timeout: Duration,
}

impl Default for GuideSettings {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from(DEFAULT_DATASET),
            tag_rules: None,
            planner: PlannerConfig::default(),
            plan_timeout: Duration::from_millis(DEFAULT_PLAN_TIMEOUT_MS),
        }
    }
}

impl GuideSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup; unparsable numbers fall back to the
    /// defaults, an unparsable day start is an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let dataset = lookup("GUIDE_DATASET")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.dataset);
        let tag_rules = lookup("GUIDE_TAG_RULES")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let mut planner = defaults.planner;
        planner.transition_minutes = lookup("GUIDE_TRANSITION_MINUTES")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(planner.transition_minutes);
        planner.max_stops = lookup("GUIDE_MAX_STOPS")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|limit| *limit > 0);

        let day_start = lookup("GUIDE_DAY_START").unwrap_or_else(|| DEFAULT_DAY_START.to_string());
        let planner = planner
            .with_day_start(&day_start)
            .context("GUIDE_DAY_START must be HH:MM")?;

        let plan_timeout = lookup("GUIDE_PLAN_TIMEOUT_MS")
            .and_then(|s| s.trim().parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.plan_timeout);

        Ok(Self {
            dataset,
            tag_rules,
            planner,
            plan_timeout,
        })
    }
}
