pub mod config;
pub mod error;
pub mod interests;
pub mod models;
pub mod planner;
pub mod rules;
pub mod scoring;

pub use config::{format_clock, parse_clock, PlannerConfig, ScoringWeights};
pub use error::GuideError;
pub use interests::{
    normalize_interest, normalize_interests, normalize_tag, normalize_text, normalize_token,
};
pub use models::*;
pub use planner::{plan, EmptyCause, ItineraryPlanner, RankedPlace};
pub use rules::TagRules;
pub use scoring::{InterestMatch, MatchKind, Relevance, RelevanceScorer};
