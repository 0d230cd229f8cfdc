use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use guide_core::{normalize_tag, GuideError, Place};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

const DEFAULT_VISIT_MINUTES: i64 = 60;

/// One place exactly as the dataset provider hands it over. Every field is
/// optional here so a missing required field can be reported by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPlaceRecord {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub category_id: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub estimated_visit_minutes: Option<i64>,
    pub source_url: Option<String>,
}

impl RawPlaceRecord {
    pub fn into_place(self) -> Result<Place, GuideError> {
        let id = self
            .id
            .ok_or_else(|| GuideError::dataset("place record without id"))?;
        let title = required(self.title, id, "title")?;
        let latitude = required(self.latitude, id, "latitude")?;
        let longitude = required(self.longitude, id, "longitude")?;

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(GuideError::dataset(format!(
                "place {id} has invalid coordinates ({latitude}, {longitude})"
            )));
        }

        let minutes = self.estimated_visit_minutes.unwrap_or(DEFAULT_VISIT_MINUTES);
        let estimated_visit_minutes = u32::try_from(minutes)
            .ok()
            .filter(|minutes| *minutes > 0)
            .ok_or_else(|| {
                GuideError::dataset(format!(
                    "place {id} has non-positive estimated_visit_minutes {minutes}"
                ))
            })?;

        let tags = self
            .tags
            .unwrap_or_default()
            .iter()
            .filter_map(|tag| normalize_tag(tag))
            .collect::<BTreeSet<_>>();

        Ok(Place {
            id,
            title: title.trim().to_string(),
            description: self.description.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            latitude,
            longitude,
            category_id: self.category_id,
            tags,
            estimated_visit_minutes,
            source_url: self.source_url.filter(|url| !url.trim().is_empty()),
        })
    }
}

fn required<T>(value: Option<T>, id: i64, field: &str) -> Result<T, GuideError> {
    value.ok_or_else(|| GuideError::dataset(format!("place {id} is missing required field '{field}'")))
}

pub trait CatalogSource: Send + Sync {
    fn describe(&self) -> String;
    fn read_raw_catalog(&self) -> Result<Vec<RawPlaceRecord>, GuideError>;
}

/// A JSON array of place records, or a directory tree of such files read in
/// path order.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_raw_catalog(&self) -> Result<Vec<RawPlaceRecord>, GuideError> {
        if !self.path.exists() {
            return Err(GuideError::dataset(format!(
                "prepared dataset not found at {}",
                self.path.display()
            )));
        }

        if self.path.is_file() {
            return read_json_file(&self.path);
        }

        let mut records = Vec::new();
        let mut shards = 0usize;
        for entry in WalkDir::new(&self.path).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|err| {
                GuideError::dataset(format!(
                    "failed walking dataset directory {}: {err}",
                    self.path.display()
                ))
            })?;
            let is_shard = entry.file_type().is_file()
                && entry.path().extension().and_then(|ext| ext.to_str()) == Some("json");
            if !is_shard {
                continue;
            }
            records.extend(read_json_file(entry.path())?);
            shards += 1;
        }

        if shards == 0 {
            return Err(GuideError::dataset(format!(
                "no *.json dataset files under {}",
                self.path.display()
            )));
        }

        Ok(records)
    }
}

fn read_json_file(path: &Path) -> Result<Vec<RawPlaceRecord>, GuideError> {
    let raw = std::fs::read_to_string(path).map_err(|err| {
        GuideError::dataset(format!("failed reading {}: {err}", path.display()))
    })?;

    serde_json::from_str::<Vec<RawPlaceRecord>>(&raw)
        .map_err(|err| GuideError::dataset(format!("malformed dataset {}: {err}", path.display())))
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<RawPlaceRecord>,
}

impl InMemorySource {
    pub fn new(records: Vec<RawPlaceRecord>) -> Self {
        Self { records }
    }
}

impl CatalogSource for InMemorySource {
    fn describe(&self) -> String {
        format!("in-memory ({} records)", self.records.len())
    }

    fn read_raw_catalog(&self) -> Result<Vec<RawPlaceRecord>, GuideError> {
        Ok(self.records.clone())
    }
}
