use serde::{Deserialize, Serialize};

use super::value_objects::DimensionId;
use crate::domain::errors::{ChartError, ChartResult};

/// Domain entity - a real-world quantity with provenance.
///
/// `value` is expressed in the dimension's base unit. Items with a
/// non-positive or non-finite value may exist in the catalog but are never
/// plotted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "source", alias = "sourceUrl")]
    pub source_url: String,
    #[serde(default, rename = "image", skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl Item {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            description: String::new(),
            source_url: String::new(),
            image_ref: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_source(mut self, source_url: impl Into<String>) -> Self {
        self.source_url = source_url.into();
        self
    }

    pub fn is_plottable(&self) -> bool {
        self.value.is_finite() && self.value > 0.0
    }
}

/// Domain entity - display unit of a dimension.
///
/// `conversion_factor` is the number of base units in one of this unit, so a
/// base value converts as `raw / conversion_factor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub name: String,
    pub symbol: String,
    #[serde(rename = "factor", alias = "conversionFactor")]
    pub conversion_factor: f64,
    #[serde(default)]
    pub description: String,
}

impl Unit {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, conversion_factor: f64) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            conversion_factor,
            description: String::new(),
        }
    }

    /// Unit with factor 1 used when a dataset declares no units.
    pub fn base(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self::new(symbol.clone(), symbol, 1.0)
    }

    pub fn convert(&self, raw: f64) -> f64 {
        raw / self.conversion_factor
    }
}

/// Serialized dataset as delivered by a dataset source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDocument {
    #[serde(default)]
    pub dimension: DimensionId,
    #[serde(default)]
    pub units: Vec<Unit>,
    pub items: Vec<Item>,
}

impl DatasetDocument {
    pub fn from_json(json: &str) -> ChartResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Where a catalog entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOrigin {
    Loaded,
    UserAdded,
}

/// Catalog slot: the loaded item plus runtime edits.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub item: Item,
    pub origin: EntryOrigin,
    pub overridden: bool,
    pub deleted: bool,
}

/// Partial update applied by the inline editor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub value: Option<f64>,
    pub description: Option<String>,
    #[serde(rename = "source", alias = "sourceUrl")]
    pub source_url: Option<String>,
    #[serde(rename = "image")]
    pub image_ref: Option<String>,
}

/// Aggregate - one dimension's items and units with runtime edits.
#[derive(Debug, Clone)]
pub struct Dataset {
    dimension: DimensionId,
    units: Vec<Unit>,
    entries: Vec<CatalogEntry>,
}

impl Dataset {
    pub fn new(dimension: DimensionId, units: Vec<Unit>, items: Vec<Item>) -> Self {
        let units = if units.is_empty() { vec![Unit::base(dimension.value())] } else { units };
        let entries = items
            .into_iter()
            .map(|item| CatalogEntry {
                item,
                origin: EntryOrigin::Loaded,
                overridden: false,
                deleted: false,
            })
            .collect();
        Self { dimension, units, entries }
    }

    pub fn from_document(document: DatasetDocument) -> Self {
        Self::new(document.dimension, document.units, document.items)
    }

    pub fn dimension(&self) -> &DimensionId {
        &self.dimension
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn unit(&self, symbol: &str) -> ChartResult<&Unit> {
        self.units
            .iter()
            .find(|unit| unit.symbol == symbol)
            .ok_or_else(|| ChartError::UnknownUnit(symbol.to_string()))
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Items that are not soft-deleted, in catalog order.
    pub fn active_items(&self) -> impl Iterator<Item = &Item> {
        self.entries.iter().filter(|entry| !entry.deleted).map(|entry| &entry.item)
    }

    pub fn add_user_item(&mut self, item: Item) -> ChartResult<()> {
        if !item.is_plottable() {
            return Err(ChartError::InvalidValue { name: item.name, value: item.value });
        }
        self.entries.push(CatalogEntry {
            item,
            origin: EntryOrigin::UserAdded,
            overridden: false,
            deleted: false,
        });
        Ok(())
    }

    pub fn override_item(&mut self, name: &str, patch: ItemPatch) -> ChartResult<()> {
        if let Some(value) = patch.value {
            if !(value.is_finite() && value > 0.0) {
                return Err(ChartError::InvalidValue { name: name.to_string(), value });
            }
        }
        let entry = self.entry_mut(name)?;
        let item = &mut entry.item;
        if let Some(new_name) = patch.name {
            item.name = new_name;
        }
        if let Some(value) = patch.value {
            item.value = value;
        }
        if let Some(description) = patch.description {
            item.description = description;
        }
        if let Some(source_url) = patch.source_url {
            item.source_url = source_url;
        }
        if patch.image_ref.is_some() {
            item.image_ref = patch.image_ref;
        }
        entry.overridden = true;
        Ok(())
    }

    pub fn soft_delete(&mut self, name: &str) -> ChartResult<()> {
        self.entry_mut(name)?.deleted = true;
        Ok(())
    }

    pub fn restore(&mut self, name: &str) -> ChartResult<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.item.name == name && entry.deleted)
            .ok_or_else(|| ChartError::UnknownItem(name.to_string()))?;
        entry.deleted = false;
        Ok(())
    }

    fn entry_mut(&mut self, name: &str) -> ChartResult<&mut CatalogEntry> {
        self.entries
            .iter_mut()
            .find(|entry| entry.item.name == name && !entry.deleted)
            .ok_or_else(|| ChartError::UnknownItem(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            DimensionId::from("length"),
            vec![Unit::new("metre", "m", 1.0), Unit::new("kilometre", "km", 1000.0)],
            vec![Item::new("Proton", 1.7e-15), Item::new("Earth", 1.27e7)],
        )
    }

    #[test]
    fn parses_document_with_source_field() {
        let json = r#"{
            "dimension": "length",
            "units": [{"name": "metre", "symbol": "m", "factor": 1.0}],
            "items": [{"name": "Earth", "value": 1.27e7, "source": "https://example.org/earth"}]
        }"#;
        let document = DatasetDocument::from_json(json).unwrap();
        assert_eq!(document.dimension.value(), "length");
        assert_eq!(document.items[0].source_url, "https://example.org/earth");
        assert!(document.items[0].image_ref.is_none());
    }

    #[test]
    fn rejects_malformed_document() {
        let err = DatasetDocument::from_json("{\"items\": 3}").unwrap_err();
        assert!(matches!(err, ChartError::Parse(_)));
    }

    #[test]
    fn soft_delete_and_restore() {
        let mut dataset = sample();
        dataset.soft_delete("Proton").unwrap();
        assert_eq!(dataset.active_items().count(), 1);
        assert!(dataset.soft_delete("Proton").is_err());
        dataset.restore("Proton").unwrap();
        assert_eq!(dataset.active_items().count(), 2);
    }

    #[test]
    fn user_items_must_be_plottable() {
        let mut dataset = sample();
        assert!(dataset.add_user_item(Item::new("Nothing", 0.0)).is_err());
        dataset.add_user_item(Item::new("Moon", 3.47e6)).unwrap();
        assert_eq!(dataset.entries().last().map(|e| e.origin), Some(EntryOrigin::UserAdded));
    }

    #[test]
    fn override_updates_fields() {
        let mut dataset = sample();
        let patch = ItemPatch { value: Some(1.3e7), ..ItemPatch::default() };
        dataset.override_item("Earth", patch).unwrap();
        let earth = dataset.active_items().find(|i| i.name == "Earth").unwrap();
        assert_eq!(earth.value, 1.3e7);
        assert!(dataset.entries()[1].overridden);
        let bad = ItemPatch { value: Some(f64::NAN), ..ItemPatch::default() };
        assert!(dataset.override_item("Earth", bad).is_err());
    }

    #[test]
    fn unit_lookup_and_conversion() {
        let dataset = sample();
        let km = dataset.unit("km").unwrap();
        assert_eq!(km.convert(1.27e7), 1.27e4);
        assert!(matches!(dataset.unit("mi"), Err(ChartError::UnknownUnit(_))));
    }
}
