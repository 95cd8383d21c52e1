//! Item Layout Engine: vertical slots and left-edge label correction.

use serde::Serialize;

use super::scale::LogScale;
use super::value_objects::ChartConfig;
use crate::domain::catalog::{Item, PlottableItem};

/// An item placed for one layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedItem {
    pub item: Item,
    pub converted_value: f64,
    /// Dense rank by ascending value, ties in input order.
    pub vertical_slot: usize,
    /// Distance from the bottom of the plot.
    pub y_px: f64,
    /// Natural horizontal position on the scale.
    pub x_px: f64,
    /// Shift applied so the label does not overflow the left edge.
    pub horizontal_offset_px: f64,
    pub label_width_px: f64,
}

impl PositionedItem {
    pub fn marker_x(&self) -> f64 {
        self.x_px + self.horizontal_offset_px
    }

    /// Vertical position measured from the top of a plot `plot_height` tall.
    pub fn screen_y(&self, plot_height: f64) -> f64 {
        plot_height - self.y_px
    }
}

/// Estimated pixel width of a label, from its character count.
pub fn label_width(label: &str, config: &ChartConfig) -> f64 {
    label.chars().count() as f64 * config.char_width_px
}

/// Plot height needed for `count` stacked items.
pub fn plot_height(count: usize, config: &ChartConfig) -> f64 {
    let stacked = config.bottom_padding_px
        + count.saturating_sub(1) as f64 * config.item_spacing_px
        + config.top_padding_px;
    stacked.max(config.min_plot_height_px)
}

/// Positions `items` against `scale`. Pure and deterministic.
///
/// Labels sit to the left of their marker. An item closer to the left edge
/// than its label width plus the buffer is pushed right by exactly the
/// overflow. Items are corrected independently; labels of neighbouring
/// items may still overlap each other.
pub fn layout(items: &[PlottableItem], scale: &LogScale, config: &ChartConfig) -> Vec<PositionedItem> {
    let mut order: Vec<&PlottableItem> = items.iter().collect();
    order.sort_by(|a, b| {
        a.converted
            .value()
            .total_cmp(&b.converted.value())
            .then(a.input_order.cmp(&b.input_order))
    });

    order
        .into_iter()
        .enumerate()
        .map(|(slot, entry)| {
            let converted_value = entry.converted.value();
            let x_px = scale.exponent_to_pixel(entry.converted.log10());
            let label_width_px = label_width(&entry.item.name, config);
            let needed = label_width_px + config.label_buffer_px;
            let horizontal_offset_px = if (0.0..=scale.width()).contains(&x_px) && x_px < needed {
                needed - x_px
            } else {
                0.0
            };
            PositionedItem {
                item: entry.item.clone(),
                converted_value,
                vertical_slot: slot,
                y_px: config.bottom_padding_px + slot as f64 * config.item_spacing_px,
                x_px,
                horizontal_offset_px,
                label_width_px,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Unit, ingest_items};

    #[test]
    fn heights_have_a_floor() {
        let config = ChartConfig::default();
        assert_eq!(plot_height(0, &config), 320.0);
        assert_eq!(plot_height(20, &config), 40.0 + 19.0 * 28.0 + 40.0);
    }

    #[test]
    fn left_edge_labels_push_markers_right() {
        let config = ChartConfig::default();
        let items = vec![Item::new("Proton", 1.0), Item::new("Sun", 1000.0)];
        let plotted = ingest_items(&items, &Unit::base("m"));
        let scale = LogScale::from_values(1.0, 1000.0, 600.0);
        let placed = layout(&plotted, &scale, &config);
        // "Proton" is 6 chars: 42px + 12px buffer
        assert_eq!(placed[0].horizontal_offset_px, 54.0);
        assert_eq!(placed[0].marker_x(), 54.0);
        assert_eq!(placed[1].horizontal_offset_px, 0.0);
    }
}
