use std::collections::HashMap;
use std::future::Future;

use super::entities::{DatasetDocument, Item, Unit};
use super::value_objects::DimensionId;
use crate::domain::errors::{ChartError, ChartResult};

/// Synchronous access to the datasets known to the host.
pub trait DatasetProvider {
    fn get_items(&self, dimension: &DimensionId) -> ChartResult<Vec<Item>>;

    fn get_units(&self, dimension: &DimensionId) -> ChartResult<Vec<Unit>>;

    fn convert(&self, raw_value: f64, unit: &Unit) -> f64 {
        unit.convert(raw_value)
    }
}

/// Asynchronous dataset source (network fetch, storage read).
pub trait DatasetSource {
    fn fetch_dataset(&self, dimension: &DimensionId) -> impl Future<Output = ChartResult<DatasetDocument>>;

    /// Whether an optional image reference resolves.
    fn image_exists(&self, image_ref: &str) -> impl Future<Output = bool>;
}

/// Provider backed by already-parsed documents.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatasetProvider {
    documents: HashMap<DimensionId, DatasetDocument>,
}

impl InMemoryDatasetProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, document: DatasetDocument) {
        self.documents.insert(document.dimension.clone(), document);
    }

    fn document(&self, dimension: &DimensionId) -> ChartResult<&DatasetDocument> {
        self.documents
            .get(dimension)
            .ok_or_else(|| ChartError::EmptyDataset(dimension.to_string()))
    }
}

impl DatasetProvider for InMemoryDatasetProvider {
    fn get_items(&self, dimension: &DimensionId) -> ChartResult<Vec<Item>> {
        Ok(self.document(dimension)?.items.clone())
    }

    fn get_units(&self, dimension: &DimensionId) -> ChartResult<Vec<Unit>> {
        Ok(self.document(dimension)?.units.clone())
    }
}

impl DatasetSource for InMemoryDatasetProvider {
    fn fetch_dataset(&self, dimension: &DimensionId) -> impl Future<Output = ChartResult<DatasetDocument>> {
        let result = self.document(dimension).cloned();
        async move { result }
    }

    fn image_exists(&self, image_ref: &str) -> impl Future<Output = bool> {
        let found = self
            .documents
            .values()
            .flat_map(|document| document.items.iter())
            .any(|item| item.image_ref.as_deref() == Some(image_ref));
        async move { found }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::ingest_items;

    fn provider() -> InMemoryDatasetProvider {
        let mut provider = InMemoryDatasetProvider::new();
        provider.insert(DatasetDocument {
            dimension: DimensionId::from("mass"),
            units: vec![Unit::base("kg"), Unit::new("tonne", "t", 1000.0)],
            items: vec![Item::new("Car", 1500.0), Item::new("Ghost", 0.0)],
        });
        provider
    }

    #[test]
    fn provider_returns_units_and_items() {
        let provider = provider();
        let mass = DimensionId::from("mass");
        let units = provider.get_units(&mass).unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(provider.convert(1500.0, &units[1]), 1.5);

        let items = provider.get_items(&mass).unwrap();
        let plottable = ingest_items(&items, &units[0]);
        assert_eq!(plottable.len(), 1);
        assert_eq!(plottable[0].item.name, "Car");
    }

    #[test]
    fn unknown_dimension_is_empty() {
        let err = provider().get_items(&DimensionId::from("time")).unwrap_err();
        assert!(matches!(err, ChartError::EmptyDataset(_)));
    }
}
