use std::cmp::Ordering;

use crate::config::{format_clock, PlannerConfig};
use crate::error::GuideError;
use crate::interests::normalize_interests;
use crate::models::{Catalog, ItineraryRequest, ItineraryResult, Place};
use crate::scoring::{Relevance, RelevanceScorer};

#[derive(Debug, Clone)]
pub struct RankedPlace<'a> {
    pub place: &'a Place,
    pub relevance: Relevance,
}

/// Why an itinerary came back without stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyCause {
    NoMatchingInterests,
    BudgetTooSmall,
}

#[derive(Debug, Default)]
struct Selection<'r, 'a> {
    chosen: Vec<&'r RankedPlace<'a>>,
    skipped_for_budget: usize,
    beyond_stop_limit: usize,
    used_minutes: u32,
}

/// Stateless itinerary builder; every call is a pure function of the catalog
/// snapshot and the request.
#[derive(Debug, Clone, Default)]
pub struct ItineraryPlanner {
    config: PlannerConfig,
    scorer: RelevanceScorer,
}

impl ItineraryPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        let scorer = RelevanceScorer::new(config.weights);
        Self { config, scorer }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Eligible places ordered by score, then shorter visits, then id.
    pub fn rank<'a>(&self, catalog: &'a Catalog, interests: &[String]) -> Vec<RankedPlace<'a>> {
        let mut ranked = catalog
            .places()
            .iter()
            .map(|place| RankedPlace {
                place,
                relevance: self.scorer.score_normalized(place, interests, catalog.rules()),
            })
            .filter(|candidate| candidate.relevance.is_eligible())
            .collect::<Vec<_>>();

        ranked.sort_by(compare_ranked);
        ranked
    }

    pub fn plan(
        &self,
        catalog: &Catalog,
        request: &ItineraryRequest,
    ) -> Result<ItineraryResult, GuideError> {
        let interests = validate(request)?;
        let budget_minutes = budget_minutes(request.available_hours);

        let ranked = self.rank(catalog, &interests);
        let selection = self.select(&ranked, budget_minutes);
        let location = request.location.trim();

        if selection.chosen.is_empty() {
            let cause = if ranked.is_empty() {
                EmptyCause::NoMatchingInterests
            } else {
                EmptyCause::BudgetTooSmall
            };
            return Ok(empty_result(cause, &interests, &ranked, budget_minutes, location));
        }

        let mut clock = self.config.day_start_minutes;
        let mut stops = Vec::with_capacity(selection.chosen.len());
        for candidate in &selection.chosen {
            stops.push(
                candidate
                    .place
                    .to_stop(candidate.relevance.reason.clone(), format_clock(clock)),
            );
            clock = clock
                .saturating_add(candidate.place.estimated_visit_minutes)
                .saturating_add(self.config.transition_minutes);
        }

        let theme = dominant_theme(&interests, &selection.chosen);
        let summary = compose_summary(stops.len(), theme, selection.used_minutes, location);
        let notes = self.advisory_notes(&selection, budget_minutes);

        Ok(ItineraryResult {
            summary,
            total_duration_minutes: selection.used_minutes,
            stops,
            notes: (!notes.is_empty()).then_some(notes),
        })
    }

    fn select<'r, 'a>(&self, ranked: &'r [RankedPlace<'a>], budget_minutes: u32) -> Selection<'r, 'a> {
        let mut selection = Selection::default();

        for (index, candidate) in ranked.iter().enumerate() {
            if self
                .config
                .max_stops
                .is_some_and(|limit| selection.chosen.len() >= limit)
            {
                selection.beyond_stop_limit = ranked.len() - index;
                break;
            }

            let transition = if selection.chosen.is_empty() {
                0
            } else {
                self.config.transition_minutes
            };
            let cost = candidate.place.estimated_visit_minutes.saturating_add(transition);

            if selection.used_minutes.saturating_add(cost) <= budget_minutes {
                selection.used_minutes += cost;
                selection.chosen.push(candidate);
            } else {
                selection.skipped_for_budget += 1;
            }
        }

        selection
    }

    fn advisory_notes(&self, selection: &Selection<'_, '_>, budget_minutes: u32) -> Vec<String> {
        let mut notes = Vec::new();

        if selection.skipped_for_budget > 0 {
            notes.push(format!(
                "{} more matching {} did not fit into the {}-minute budget; allow more time to see them.",
                selection.skipped_for_budget,
                plural(selection.skipped_for_budget, "place", "places"),
                budget_minutes
            ));
        }

        if selection.beyond_stop_limit > 0 {
            notes.push(format!(
                "The itinerary is limited to {} {}; {} more matching {} are available.",
                selection.chosen.len(),
                plural(selection.chosen.len(), "stop", "stops"),
                selection.beyond_stop_limit,
                plural(selection.beyond_stop_limit, "place", "places")
            ));
        }

        let loose = selection
            .chosen
            .iter()
            .filter(|candidate| candidate.relevance.is_fallback_only())
            .map(|candidate| candidate.place.title.as_str())
            .collect::<Vec<_>>();
        if !loose.is_empty() {
            notes.push(format!(
                "Some stops are only loosely related to your interests: {}.",
                loose.join(", ")
            ));
        }

        notes
    }
}

/// Plans with the default configuration.
pub fn plan(catalog: &Catalog, request: &ItineraryRequest) -> Result<ItineraryResult, GuideError> {
    ItineraryPlanner::default().plan(catalog, request)
}

fn validate(request: &ItineraryRequest) -> Result<Vec<String>, GuideError> {
    let interests = normalize_interests(&request.interests);
    if interests.is_empty() {
        return Err(GuideError::invalid("at least one interest is required"));
    }

    if !request.available_hours.is_finite() || request.available_hours <= 0.0 {
        return Err(GuideError::invalid(format!(
            "available_hours must be a positive number, got {}",
            request.available_hours
        )));
    }

    Ok(interests)
}

fn budget_minutes(available_hours: f64) -> u32 {
    (available_hours * 60.0).round() as u32
}

fn compare_ranked(a: &RankedPlace<'_>, b: &RankedPlace<'_>) -> Ordering {
    b.relevance
        .score
        .total_cmp(&a.relevance.score)
        .then_with(|| {
            a.place
                .estimated_visit_minutes
                .cmp(&b.place.estimated_visit_minutes)
        })
        .then_with(|| a.place.id.cmp(&b.place.id))
}

fn dominant_theme<'i>(interests: &'i [String], chosen: &[&RankedPlace<'_>]) -> Option<&'i str> {
    let mut best: Option<(&str, f64)> = None;

    for interest in interests {
        let total = chosen
            .iter()
            .flat_map(|candidate| candidate.relevance.matches.iter())
            .filter(|m| &m.interest == interest)
            .map(|m| m.weight)
            .sum::<f64>();

        if total > 0.0 && best.map_or(true, |(_, top)| total > top) {
            best = Some((interest.as_str(), total));
        }
    }

    best.map(|(interest, _)| interest)
}

fn compose_summary(stop_count: usize, theme: Option<&str>, total_minutes: u32, location: &str) -> String {
    let from = if location.is_empty() {
        String::new()
    } else {
        format!(" starting from {location}")
    };
    let focus = theme
        .map(|theme| format!(" focused on {theme}"))
        .unwrap_or_default();

    format!(
        "A {}-stop itinerary{}{}, taking about {}.",
        stop_count,
        from,
        focus,
        human_duration(total_minutes)
    )
}

fn empty_result(
    cause: EmptyCause,
    interests: &[String],
    ranked: &[RankedPlace<'_>],
    budget_minutes: u32,
    location: &str,
) -> ItineraryResult {
    let note = match cause {
        EmptyCause::NoMatchingInterests => format!(
            "No places match your interests ({}); try broader ones such as museum, park or history.",
            interests.join(", ")
        ),
        EmptyCause::BudgetTooSmall => {
            let shortest = ranked
                .iter()
                .map(|candidate| candidate.place.estimated_visit_minutes)
                .min()
                .unwrap_or_default();
            format!(
                "The available time ({budget_minutes} min) is too short for any matching place; the shortest visit needs {shortest} min."
            )
        }
    };

    let summary = if location.is_empty() {
        "No itinerary could be built.".to_string()
    } else {
        format!("No itinerary could be built starting from {location}.")
    };

    ItineraryResult {
        summary,
        total_duration_minutes: 0,
        stops: Vec::new(),
        notes: Some(vec![note]),
    }
}

fn human_duration(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} h"),
        (h, m) => format!("{h} h {m} min"),
    }
}

fn plural<'s>(count: usize, one: &'s str, many: &'s str) -> &'s str {
    if count == 1 {
        one
    } else {
        many
    }
}
