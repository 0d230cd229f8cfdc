use serde::{Deserialize, Serialize};

use crate::config::ScoringWeights;
use crate::interests::{normalize_interests, normalize_tag};
use crate::models::Place;
use crate::rules::TagRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Substring,
    Fallback,
}

impl MatchKind {
    pub fn is_explicit(self) -> bool {
        !matches!(self, Self::Fallback)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestMatch {
    pub interest: String,
    pub kind: MatchKind,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relevance {
    pub score: f64,
    pub reason: String,
    pub matches: Vec<InterestMatch>,
}

impl Relevance {
    fn none() -> Self {
        Self {
            score: 0.0,
            reason: String::new(),
            matches: Vec::new(),
        }
    }

    pub fn is_eligible(&self) -> bool {
        self.score > 0.0
    }

    pub fn is_fallback_only(&self) -> bool {
        !self.matches.is_empty() && self.matches.iter().all(|m| !m.kind.is_explicit())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RelevanceScorer {
    weights: ScoringWeights,
}

impl RelevanceScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Scores raw, user-supplied interests against one place.
    pub fn score<S: AsRef<str>>(&self, place: &Place, interests: &[S], rules: &TagRules) -> Relevance {
        let normalized = normalize_interests(interests);
        self.score_normalized(place, &normalized, rules)
    }

    /// Same as [`RelevanceScorer::score`] for interests that already went through
    /// `normalize_interests`.
    pub fn score_normalized(&self, place: &Place, interests: &[String], rules: &TagRules) -> Relevance {
        let tags = place
            .tags
            .iter()
            .filter_map(|tag| normalize_tag(tag))
            .collect::<Vec<_>>();

        if tags.is_empty() || interests.is_empty() {
            return Relevance::none();
        }

        let category_tags = rules.category_tags(place.category_id);
        let mut matches = Vec::new();

        for interest in interests {
            let Some(kind) = match_kind(interest, &tags, category_tags, rules) else {
                continue;
            };
            let weight = match kind {
                MatchKind::Exact => self.weights.exact,
                MatchKind::Substring => self.weights.substring,
                MatchKind::Fallback => self.weights.category_fallback,
            };
            matches.push(InterestMatch {
                interest: interest.clone(),
                kind,
                weight,
            });
        }

        let score = matches.iter().fold(0.0, |acc, m| acc + m.weight);
        let reason = build_reason(&matches);

        Relevance {
            score,
            reason,
            matches,
        }
    }
}

fn match_kind(
    interest: &str,
    tags: &[String],
    category_tags: &[String],
    rules: &TagRules,
) -> Option<MatchKind> {
    if tags.iter().any(|tag| tag == interest) {
        return Some(MatchKind::Exact);
    }

    if tags
        .iter()
        .any(|tag| tag.contains(interest) || interest.contains(tag.as_str()))
    {
        return Some(MatchKind::Substring);
    }

    let expanded = rules.expand(interest);
    let related = category_tags
        .iter()
        .chain(tags.iter())
        .any(|tag| expanded.contains(tag));

    related.then_some(MatchKind::Fallback)
}

/// Interests are listed in request order. When explicit and fallback matches
/// mix, the fallback ones are marked inline instead of being moved to the end.
fn build_reason(matches: &[InterestMatch]) -> String {
    if matches.is_empty() {
        return String::new();
    }

    let labels = |mark_fallback: bool| {
        matches
            .iter()
            .map(|m| {
                if mark_fallback && !m.kind.is_explicit() {
                    format!("{} (through its category)", m.interest)
                } else {
                    m.interest.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    };

    if matches.iter().all(|m| !m.kind.is_explicit()) {
        format!("related to your interest in {} through its category", labels(false))
    } else {
        format!("matches your interest in {}", labels(true))
    }
}
