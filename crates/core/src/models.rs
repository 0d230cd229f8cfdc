use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::GuideError;
use crate::rules::TagRules;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub category_id: Option<i64>,
    pub tags: BTreeSet<String>,
    pub estimated_visit_minutes: u32,
    pub source_url: Option<String>,
}

impl Place {
    pub fn is_matchable(&self) -> bool {
        !self.tags.is_empty()
    }

    pub fn to_stop(&self, reason: String, arrival_time: String) -> ItineraryStop {
        ItineraryStop {
            name: self.title.clone(),
            address: self.address.clone(),
            reason,
            arrival_time,
            stay_duration_minutes: self.estimated_visit_minutes,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryRequest {
    pub interests: Vec<String>,
    pub available_hours: f64,
    #[serde(default)]
    pub location: String,
}

impl ItineraryRequest {
    pub fn new(
        interests: impl IntoIterator<Item = impl Into<String>>,
        available_hours: f64,
        location: impl Into<String>,
    ) -> Self {
        Self {
            interests: interests.into_iter().map(Into::into).collect(),
            available_hours,
            location: location.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryStop {
    pub name: String,
    pub address: String,
    pub reason: String,
    pub arrival_time: String,
    pub stay_duration_minutes: u32,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryResult {
    pub summary: String,
    pub total_duration_minutes: u32,
    pub stops: Vec<ItineraryStop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<String>>,
}

/// Immutable snapshot of every known place together with the tag rules that
/// were loaded alongside it. Built once and shared by reference.
#[derive(Debug, Clone)]
pub struct Catalog {
    places: Vec<Place>,
    rules: TagRules,
}

impl Catalog {
    pub fn new(places: Vec<Place>, rules: TagRules) -> Result<Self, GuideError> {
        let mut seen = HashSet::with_capacity(places.len());
        for place in &places {
            if !seen.insert(place.id) {
                return Err(GuideError::dataset(format!(
                    "duplicate place id {}",
                    place.id
                )));
            }
        }

        Ok(Self { places, rules })
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn rules(&self) -> &TagRules {
        &self.rules
    }

    pub fn get(&self, id: i64) -> Option<&Place> {
        self.places.iter().find(|place| place.id == id)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}
