use std::sync::Arc;

use guide_catalog::{CatalogLoader, InMemorySource, RawPlaceRecord};
use guide_core::{
    plan, Catalog, GuideError, ItineraryPlanner, ItineraryRequest, PlannerConfig,
};

fn record(id: i64, title: &str, tags: &[&str], minutes: i64) -> RawPlaceRecord {
    RawPlaceRecord {
        id: Some(id),
        title: Some(title.to_string()),
        address: Some(format!("{id} Rozhdestvenskaya st.")),
        latitude: Some(56.32 + id as f64 * 0.001),
        longitude: Some(44.0 - id as f64 * 0.001),
        tags: Some(tags.iter().map(|tag| tag.to_string()).collect()),
        estimated_visit_minutes: Some(minutes),
        ..RawPlaceRecord::default()
    }
}

fn catalog(records: Vec<RawPlaceRecord>) -> Arc<Catalog> {
    CatalogLoader::new(Arc::new(InMemorySource::new(records)))
        .load_places()
        .expect("fixture catalog should load")
}

#[test]
fn museum_is_chosen_over_unrelated_park() {
    let catalog = catalog(vec![
        record(1, "City Museum", &["art", "history"], 60),
        record(2, "Riverside Park", &["nature"], 30),
    ]);

    let result = plan(&catalog, &ItineraryRequest::new(["art", "history"], 4.0, "Center")).unwrap();

    assert_eq!(result.stops.len(), 1);
    assert_eq!(result.stops[0].name, "City Museum");
    assert_eq!(result.stops[0].arrival_time, "09:00");
    assert_eq!(result.stops[0].reason, "matches your interest in art, history");
    assert_eq!(result.total_duration_minutes, 60);
    assert!(result.notes.is_none());
}

#[test]
fn tiny_budget_returns_empty_itinerary_with_budget_note() {
    let catalog = catalog(vec![
        record(1, "Philharmonic", &["music"], 30),
        record(2, "Opera House", &["music", "theatre"], 120),
    ]);

    let result = plan(&catalog, &ItineraryRequest::new(["music"], 0.2, "Center")).unwrap();

    assert!(result.stops.is_empty());
    assert_eq!(result.total_duration_minutes, 0);
    let notes = result.notes.expect("empty itinerary carries a note");
    assert!(notes[0].contains("too short"), "unexpected note: {}", notes[0]);
    assert!(notes[0].contains("30 min"));
}

#[test]
fn unknown_interest_returns_empty_itinerary_with_match_note() {
    let catalog = catalog(vec![
        record(1, "City Museum", &["art", "history"], 60),
        record(2, "Riverside Park", &["nature"], 30),
    ]);

    let result = plan(&catalog, &ItineraryRequest::new(["xyz-nonexistent"], 5.0, "")).unwrap();

    assert!(result.stops.is_empty());
    let notes = result.notes.unwrap();
    assert!(notes[0].starts_with("No places match your interests (xyz-nonexistent)"));
}

#[test]
fn score_ties_prefer_shorter_visits_then_lower_ids() {
    let catalog = catalog(vec![
        record(7, "Long Gallery", &["art"], 90),
        record(5, "Small Gallery B", &["art"], 40),
        record(3, "Small Gallery A", &["art"], 40),
    ]);

    let ranked = ItineraryPlanner::default().rank(&catalog, &["art".to_string()]);
    let ids = ranked.iter().map(|r| r.place.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![3, 5, 7]);

    let result = plan(&catalog, &ItineraryRequest::new(["art"], 10.0, "")).unwrap();
    let names = result.stops.iter().map(|s| s.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["Small Gallery A", "Small Gallery B", "Long Gallery"]);
}

#[test]
fn higher_scores_outrank_shorter_visits() {
    let catalog = catalog(vec![
        record(1, "Sketch Corner", &["street_art"], 15),
        record(2, "Fine Arts Hall", &["art", "history"], 90),
    ]);

    let ranked = ItineraryPlanner::default().rank(&catalog, &["art".to_string(), "history".to_string()]);
    assert_eq!(ranked[0].place.id, 2);
    assert!(ranked[0].relevance.score > ranked[1].relevance.score);
}

#[test]
fn fallback_only_stops_are_flagged() {
    let mut museum = record(1, "Regional Exhibition", &["exhibition_hall"], 45);
    museum.category_id = Some(3);
    let catalog = catalog(vec![museum, record(2, "Art Loft", &["art"], 30)]);

    let result = plan(&catalog, &ItineraryRequest::new(["art", "museum"], 3.0, "")).unwrap();

    assert_eq!(result.stops.len(), 2);
    assert_eq!(result.stops[0].name, "Art Loft");
    assert!(result.stops[1].reason.contains("through its category"));
    let notes = result.notes.unwrap();
    assert!(notes
        .iter()
        .any(|note| note.contains("loosely related") && note.contains("Regional Exhibition")));
}

#[test]
fn budget_exclusions_are_reported() {
    let catalog = catalog(vec![
        record(1, "Cathedral", &["history"], 60),
        record(2, "Fortress", &["history"], 90),
        record(3, "Archive", &["history"], 120),
    ]);

    let result = plan(&catalog, &ItineraryRequest::new(["history"], 2.75, "")).unwrap();

    assert_eq!(result.stops.len(), 2);
    assert_eq!(result.total_duration_minutes, 60 + 15 + 90);
    let notes = result.notes.unwrap();
    assert!(notes[0].starts_with("1 more matching place did not fit into the 165-minute budget"));
}

#[test]
fn custom_transition_and_day_start_shift_arrivals() {
    let catalog = catalog(vec![
        record(1, "Cathedral", &["history"], 60),
        record(2, "Fortress", &["history"], 90),
    ]);
    let config = PlannerConfig {
        transition_minutes: 30,
        ..PlannerConfig::default()
    }
    .with_day_start("23:00")
    .unwrap();

    let result = ItineraryPlanner::new(config)
        .plan(&catalog, &ItineraryRequest::new(["history"], 4.0, ""))
        .unwrap();

    let arrivals = result.stops.iter().map(|s| s.arrival_time.as_str()).collect::<Vec<_>>();
    assert_eq!(arrivals, vec!["23:00", "24:30"]);
    assert_eq!(result.total_duration_minutes, 180);
}

#[test]
fn invalid_requests_fail_before_planning() {
    let catalog = catalog(vec![record(1, "Cathedral", &["history"], 60)]);

    let empty = plan(&catalog, &ItineraryRequest::new([" ", "\t"], 2.0, "")).unwrap_err();
    assert!(matches!(empty, GuideError::InvalidRequest(_)));

    let no_time = plan(&catalog, &ItineraryRequest::new(["history"], 0.0, "")).unwrap_err();
    assert!(no_time.is_client_error());
}

#[test]
fn punctuation_only_interest_is_a_valid_request() {
    let catalog = catalog(vec![record(1, "Cathedral", &["history"], 60)]);

    let result = plan(&catalog, &ItineraryRequest::new(["!!"], 2.0, "")).unwrap();

    assert!(result.stops.is_empty());
    let notes = result.notes.unwrap();
    assert!(notes[0].starts_with("No places match your interests (!!)"));
}

#[test]
fn punctuated_tags_match_identical_interests() {
    let catalog = catalog(vec![
        record(1, "Jazz Club", &["rock&roll"], 90),
        record(2, "Hackerspace", &["c++"], 60),
    ]);

    let result = plan(&catalog, &ItineraryRequest::new(["Rock&Roll"], 3.0, "")).unwrap();
    assert_eq!(result.stops.len(), 1);
    assert_eq!(result.stops[0].name, "Jazz Club");
    assert_eq!(result.stops[0].reason, "matches your interest in rock&roll");

    let result = plan(&catalog, &ItineraryRequest::new(["c++"], 3.0, "")).unwrap();
    assert_eq!(result.stops[0].name, "Hackerspace");
    assert_eq!(result.stops[0].reason, "matches your interest in c++");
}
