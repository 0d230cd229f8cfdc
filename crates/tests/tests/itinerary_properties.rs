use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use guide_catalog::CatalogLoader;
use guide_core::{Catalog, ItineraryPlanner, ItineraryRequest, ItineraryResult, PlannerConfig};
use guide_observability::AppMetrics;
use guide_service::{GuideSettings, ItineraryService};

const TRANSITION: u32 = 15;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/places.json")
}

fn fixture_catalog() -> Arc<Catalog> {
    CatalogLoader::from_path(fixture_path())
        .load_places()
        .expect("fixture catalog should load")
}

fn requests() -> Vec<ItineraryRequest> {
    let interest_sets: [&[&str]; 6] = [
        &["history"],
        &["art", "history"],
        &["music", "theatre"],
        &["architecture", "panorama", "nature"],
        &["Art", "art", " ART "],
        &["museum", "religion", "walk"],
    ];
    let hours = [0.25, 0.5, 1.0, 2.0, 3.5, 8.0];

    interest_sets
        .iter()
        .flat_map(|interests| {
            hours
                .iter()
                .map(move |hours| ItineraryRequest::new(interests.iter().copied(), *hours, "Minin Square"))
        })
        .collect()
}

fn minutes(clock: &str) -> u32 {
    let (hours, minutes) = clock.split_once(':').expect("HH:MM");
    hours.parse::<u32>().unwrap() * 60 + minutes.parse::<u32>().unwrap()
}

fn plan(catalog: &Catalog, request: &ItineraryRequest) -> ItineraryResult {
    ItineraryPlanner::default()
        .plan(catalog, request)
        .expect("fixture requests are valid")
}

#[test]
fn duration_never_exceeds_budget() {
    let catalog = fixture_catalog();
    for request in requests() {
        let result = plan(&catalog, &request);
        let budget = (request.available_hours * 60.0).round() as u32;
        let stays = result.stops.iter().map(|s| s.stay_duration_minutes).sum::<u32>();
        let transitions = result.stops.len().saturating_sub(1) as u32 * TRANSITION;

        assert_eq!(result.total_duration_minutes, stays + transitions);
        assert!(
            result.total_duration_minutes <= budget,
            "{:?} took {} of {} minutes",
            request.interests,
            result.total_duration_minutes,
            budget
        );
    }
}

#[test]
fn arrivals_strictly_increase() {
    let catalog = fixture_catalog();
    for request in requests() {
        let result = plan(&catalog, &request);
        let arrivals = result.stops.iter().map(|s| minutes(&s.arrival_time)).collect::<Vec<_>>();
        assert!(arrivals.windows(2).all(|pair| pair[0] < pair[1]), "{arrivals:?}");
        if let Some(first) = result.stops.first() {
            assert_eq!(first.arrival_time, "09:00");
        }
    }
}

#[test]
fn stops_mirror_their_source_places() {
    let catalog = fixture_catalog();
    for request in requests() {
        for stop in plan(&catalog, &request).stops {
            let place = catalog
                .places()
                .iter()
                .find(|place| place.title == stop.name)
                .expect("stop comes from the catalog");
            assert_eq!(stop.address, place.address);
            assert_eq!(stop.latitude, place.latitude);
            assert_eq!(stop.longitude, place.longitude);
            assert_eq!(stop.stay_duration_minutes, place.estimated_visit_minutes);
        }
    }
}

#[test]
fn affordable_budgets_always_yield_a_stop() {
    let catalog = fixture_catalog();
    let planner = ItineraryPlanner::default();
    for request in requests() {
        let interests = guide_core::normalize_interests(&request.interests);
        let shortest = planner
            .rank(&catalog, &interests)
            .iter()
            .map(|ranked| ranked.place.estimated_visit_minutes)
            .min();
        let budget = (request.available_hours * 60.0).round() as u32;

        if shortest.is_some_and(|shortest| shortest <= budget) {
            assert!(!plan(&catalog, &request).stops.is_empty(), "{:?}", request.interests);
        }
    }
}

#[test]
fn untagged_places_are_never_selected() {
    let catalog = fixture_catalog();
    for request in requests() {
        assert!(plan(&catalog, &request)
            .stops
            .iter()
            .all(|stop| stop.name != "Untagged Memorial"));
    }
}

#[test]
fn planning_is_deterministic() {
    let catalog = fixture_catalog();
    for request in requests() {
        assert_eq!(plan(&catalog, &request), plan(&catalog, &request));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_plans_share_one_catalog() {
    let settings = GuideSettings {
        dataset: fixture_path(),
        planner: PlannerConfig::default(),
        ..GuideSettings::default()
    };
    let service = ItineraryService::from_settings(&settings, AppMetrics::shared()).unwrap();
    let request = ItineraryRequest::new(["art", "history"], 3.5, "Minin Square");

    let handles = (0..16)
        .map(|_| {
            let service = service.clone();
            let request = request.clone();
            tokio::spawn(async move {
                service
                    .plan_with_timeout(request, Duration::from_secs(5))
                    .await
            })
        })
        .collect::<Vec<_>>();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap().unwrap());
    }

    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    assert!(!results[0].stops.is_empty());
    assert_eq!(service.metrics().plans_total, 16);
}

#[tokio::test]
async fn missing_dataset_fails_warm_up() {
    let settings = GuideSettings {
        dataset: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/missing.json"),
        ..GuideSettings::default()
    };
    let service = ItineraryService::from_settings(&settings, AppMetrics::shared()).unwrap();

    let err = service.warm_up().await.unwrap_err();
    assert!(format!("{err:#}").contains("dataset unavailable"));
}
