pub mod config;

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use guide_catalog::{load_tag_rules, CatalogLoader, JsonFileSource};
use guide_core::{
    normalize_interests, GuideError, ItineraryPlanner, ItineraryRequest, ItineraryResult,
    PlannerConfig, TagRules,
};
use guide_observability::{AppMetrics, MetricsSnapshot};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub use config::GuideSettings;

#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub source: String,
    pub places: usize,
    pub matchable_places: usize,
    pub categories: Vec<i64>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaceMatch {
    pub id: i64,
    pub title: String,
    pub score: f64,
    pub reason: String,
    pub estimated_visit_minutes: u32,
}

/// Entry point for request handlers: owns the catalog loader, the planner
/// configuration and the metrics, and is cheap to clone across tasks.
#[derive(Clone)]
pub struct ItineraryService {
    loader: Arc<CatalogLoader>,
    planner: Arc<ItineraryPlanner>,
    metrics: Arc<AppMetrics>,
}

impl ItineraryService {
    pub fn new(loader: CatalogLoader, config: PlannerConfig, metrics: Arc<AppMetrics>) -> Self {
        Self {
            loader: Arc::new(loader),
            planner: Arc::new(ItineraryPlanner::new(config)),
            metrics,
        }
    }

    pub fn from_settings(settings: &GuideSettings, metrics: Arc<AppMetrics>) -> Result<Self> {
        let rules = match &settings.tag_rules {
            Some(path) => load_rules(path)?,
            None => TagRules::default(),
        };
        let loader =
            CatalogLoader::new(Arc::new(JsonFileSource::new(&settings.dataset))).with_rules(rules);

        Ok(Self::new(loader, settings.planner.clone(), metrics))
    }

    /// Loads the catalog on the blocking pool so the first request does not pay
    /// for it.
    pub async fn warm_up(&self) -> Result<CatalogStats> {
        let loader = self.loader.clone();
        tokio::task::spawn_blocking(move || loader.load_places())
            .await
            .context("catalog warm-up task panicked")?
            .with_context(|| format!("failed loading catalog from {}", self.loader.source_description()))?;

        self.catalog_stats()
    }

    pub fn catalog_stats(&self) -> Result<CatalogStats> {
        let catalog = self.loader.load_places()?;
        let categories = catalog
            .places()
            .iter()
            .filter_map(|place| place.category_id)
            .collect::<BTreeSet<_>>();

        Ok(CatalogStats {
            source: self.loader.source_description(),
            places: catalog.len(),
            matchable_places: catalog
                .places()
                .iter()
                .filter(|place| place.is_matchable())
                .count(),
            categories: categories.into_iter().collect(),
            generated_at: Utc::now(),
        })
    }

    /// Plans on the blocking pool; a cold catalog is loaded there too.
    #[instrument(skip(self, request), fields(plan_id = %Uuid::new_v4()))]
    pub async fn plan(&self, request: ItineraryRequest) -> Result<ItineraryResult> {
        let loader = self.loader.clone();
        let planner = self.planner.clone();
        let metrics = self.metrics.clone();
        tokio::task::spawn_blocking(move || run_plan(&loader, &planner, &metrics, &request))
            .await
            .context("planning task panicked")?
    }

    /// Runs the planner on the blocking pool and gives up after `limit`. The
    /// abandoned computation only reads the shared catalog.
    #[instrument(skip(self, request), fields(plan_id = %Uuid::new_v4()))]
    pub async fn plan_with_timeout(
        &self,
        request: ItineraryRequest,
        limit: Duration,
    ) -> Result<ItineraryResult> {
        let loader = self.loader.clone();
        let planner = self.planner.clone();
        let metrics = self.metrics.clone();
        let task =
            tokio::task::spawn_blocking(move || run_plan(&loader, &planner, &metrics, &request));

        match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined.context("planning task panicked")?,
            Err(_) => {
                self.metrics.inc_timeout();
                warn!(limit_ms = limit.as_millis() as u64, "itinerary planning timed out");
                Err(anyhow!("itinerary planning exceeded {} ms", limit.as_millis()))
            }
        }
    }

    /// Ranks the whole catalog for the given interests without a time budget.
    pub fn search(&self, interests: &[String], limit: usize) -> Result<Vec<PlaceMatch>> {
        let interests = normalize_interests(interests);
        if interests.is_empty() {
            return Err(GuideError::invalid("at least one interest is required").into());
        }

        let catalog = self.loader.load_places()?;
        let matches = self
            .planner
            .rank(&catalog, &interests)
            .into_iter()
            .take(limit)
            .map(|ranked| PlaceMatch {
                id: ranked.place.id,
                title: ranked.place.title.clone(),
                score: ranked.relevance.score,
                reason: ranked.relevance.reason,
                estimated_visit_minutes: ranked.place.estimated_visit_minutes,
            })
            .collect();

        Ok(matches)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

fn load_rules(path: &Path) -> Result<TagRules> {
    load_tag_rules(path).with_context(|| format!("failed loading tag rules from {}", path.display()))
}

fn run_plan(
    loader: &CatalogLoader,
    planner: &ItineraryPlanner,
    metrics: &AppMetrics,
    request: &ItineraryRequest,
) -> Result<ItineraryResult> {
    let started = Instant::now();
    metrics.inc_plan();

    let catalog = loader.load_places()?;
    let result = match planner.plan(&catalog, request) {
        Ok(result) => result,
        Err(err) => {
            if err.is_client_error() {
                metrics.inc_invalid_request();
            }
            warn!(error = %err, "itinerary request rejected");
            return Err(err.into());
        }
    };

    metrics.add_selected_stops(result.stops.len());
    metrics.observe_latency(started.elapsed());

    if result.stops.is_empty() {
        metrics.inc_empty_result();
        info!(
            interests = request.interests.len(),
            available_hours = request.available_hours,
            note = result.notes.as_ref().and_then(|notes| notes.first()).map(String::as_str),
            "itinerary has no stops"
        );
    } else {
        info!(
            stops = result.stops.len(),
            total_minutes = result.total_duration_minutes,
            available_hours = request.available_hours,
            "itinerary planned"
        );
    }

    Ok(result)
}
