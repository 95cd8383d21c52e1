use super::entities::{Dataset, Item, Unit};
use super::value_objects::{DimensionId, Magnitude};
use crate::domain::logging::LogComponent;
use crate::log_warn;

/// An item that survived ingestion, with its value in the active unit.
#[derive(Debug, Clone, PartialEq)]
pub struct PlottableItem {
    pub item: Item,
    pub converted: Magnitude,
    /// Dense position among accepted items; the stable tie-breaker.
    pub input_order: usize,
}

/// Converts every active item into `unit` and drops the ones a log axis
/// cannot show. The output keeps input order.
pub fn ingest(dataset: &Dataset, unit: &Unit) -> Vec<PlottableItem> {
    ingest_items(dataset.active_items(), unit)
}

pub fn ingest_items<'a>(items: impl IntoIterator<Item = &'a Item>, unit: &Unit) -> Vec<PlottableItem> {
    let mut accepted = Vec::new();
    for item in items {
        match Magnitude::new(unit.convert(item.value)) {
            Some(converted) => accepted.push(PlottableItem {
                item: item.clone(),
                converted,
                input_order: accepted.len(),
            }),
            None => {
                log_warn!(
                    LogComponent::Domain("Ingest"),
                    "Excluding '{}': value {} in {} is not plottable",
                    item.name,
                    item.value,
                    unit.symbol
                );
            }
        }
    }
    accepted
}

/// Smallest and largest converted value, or `None` for an empty set.
pub fn value_extent(items: &[PlottableItem]) -> Option<(f64, f64)> {
    items.iter().fold(None, |acc, entry| {
        let v = entry.converted.value();
        Some(match acc {
            None => (v, v),
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
        })
    })
}

/// Stable ascending sort by value, the order dataset files are kept in.
pub fn sort_by_value(items: &mut [Item]) {
    items.sort_by(|a, b| a.value.total_cmp(&b.value));
}

/// Image file name derived from the dimension and item name.
///
/// Both parts are lowercased, stripped of anything other than word
/// characters, whitespace and `-`, and runs of whitespace or `-` collapse to
/// a single `_`.
pub fn image_ref_for(dimension: &DimensionId, name: &str) -> String {
    format!("{}_{}.jpg", sanitize(dimension.value()), sanitize(name))
}

fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;
    for ch in raw.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            if pending_separator {
                out.push('_');
                pending_separator = false;
            }
            out.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || ch == '-' {
            pending_separator = true;
        }
    }
    if pending_separator {
        out.push('_');
    }
    out
}

/// Image reference for an item: explicit if present, derived otherwise.
pub fn resolve_image_ref(dimension: &DimensionId, item: &Item) -> String {
    item.image_ref.clone().unwrap_or_else(|| image_ref_for(dimension, &item.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingestion_drops_invalid_values_and_keeps_order() {
        let items = vec![
            Item::new("Zero", 0.0),
            Item::new("Big", 1e10),
            Item::new("Nan", f64::NAN),
            Item::new("Small", 1e-3),
        ];
        let plotted = ingest_items(&items, &Unit::base("m"));
        let names: Vec<_> = plotted.iter().map(|p| p.item.name.as_str()).collect();
        assert_eq!(names, ["Big", "Small"]);
        assert_eq!(plotted[1].input_order, 1);
    }

    #[test]
    fn conversion_that_overflows_is_excluded() {
        let items = vec![Item::new("Huge", 1e300)];
        let plotted = ingest_items(&items, &Unit::new("tiny", "t", 1e-300));
        assert!(plotted.is_empty());
    }

    #[test]
    fn extent_of_converted_values() {
        let items = vec![Item::new("A", 10.0), Item::new("B", 1000.0)];
        let plotted = ingest_items(&items, &Unit::new("deca", "da", 10.0));
        assert_eq!(value_extent(&plotted), Some((1.0, 100.0)));
        assert_eq!(value_extent(&[]), None);
    }

    #[test]
    fn image_names_are_sanitized() {
        let dim = DimensionId::from("Length");
        assert_eq!(image_ref_for(&dim, "Mount Everest"), "length_mount_everest.jpg");
        assert_eq!(image_ref_for(&dim, "Hydrogen atom (Bohr)"), "length_hydrogen_atom_bohr.jpg");
        assert_eq!(image_ref_for(&dim, "A -- B"), "length_a_b.jpg");
    }

    #[test]
    fn sort_is_stable_for_ties() {
        let mut items = vec![Item::new("b", 2.0), Item::new("a1", 1.0), Item::new("a2", 1.0)];
        sort_by_value(&mut items);
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["a1", "a2", "b"]);
    }
}
