mod source;

use std::path::Path;
use std::sync::Arc;

use guide_core::{Catalog, GuideError, TagRules};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

pub use source::{CatalogSource, InMemorySource, JsonFileSource, RawPlaceRecord};

/// Reads the catalog from its source at most once and hands out the same
/// immutable snapshot afterwards. Concurrent first callers block on the single
/// in-flight load; a failed load leaves the cell empty.
pub struct CatalogLoader {
    source: Arc<dyn CatalogSource>,
    rules: TagRules,
    cell: OnceCell<Arc<Catalog>>,
}

impl CatalogLoader {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            rules: TagRules::default(),
            cell: OnceCell::new(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::new(Arc::new(JsonFileSource::new(path.as_ref())))
    }

    pub fn with_rules(mut self, rules: TagRules) -> Self {
        self.rules = rules.normalized();
        self
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn load_places(&self) -> Result<Arc<Catalog>, GuideError> {
        self.cell
            .get_or_try_init(|| self.read_and_validate().map(Arc::new))
            .cloned()
    }

    fn read_and_validate(&self) -> Result<Catalog, GuideError> {
        let source = self.source.describe();
        let records = self.source.read_raw_catalog().inspect_err(|err| {
            warn!(source = %source, error = %err, "catalog source unavailable");
        })?;

        let places = records
            .into_iter()
            .map(RawPlaceRecord::into_place)
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|err| {
                warn!(source = %source, error = %err, "catalog failed validation");
            })?;

        let catalog = Catalog::new(places, self.rules.clone())?;
        let untagged = catalog
            .places()
            .iter()
            .filter(|place| !place.is_matchable())
            .count();

        info!(
            source = %source,
            places = catalog.len(),
            untagged,
            categories = self.rules.category_tags.len(),
            "catalog loaded"
        );

        Ok(catalog)
    }
}

/// Reads category/keyword tag rules from a JSON file.
pub fn load_tag_rules(path: impl AsRef<Path>) -> Result<TagRules, GuideError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|err| {
        GuideError::dataset(format!("failed reading tag rules {}: {err}", path.display()))
    })?;

    serde_json::from_str::<TagRules>(&raw)
        .map(TagRules::normalized)
        .map_err(|err| GuideError::dataset(format!("malformed tag rules {}: {err}", path.display())))
}
