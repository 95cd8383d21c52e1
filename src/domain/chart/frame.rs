//! Render description: everything a renderer needs, already in pixels.

use serde::Serialize;

use super::format::NumberFormatter;
use super::layout::PositionedItem;
use super::scale::LogScale;
use super::ticks::Tick;
use super::tooltip::TooltipPlacement;
use super::value_objects::LogRange;
use crate::view_state::ViewTransform;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickMark {
    pub exponent: i32,
    pub x_px: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemMark {
    pub slot: usize,
    pub name: String,
    pub value_label: String,
    /// Marker position, label offset already applied.
    pub x_px: f64,
    /// Measured from the top of the plot.
    pub y_px: f64,
    pub label_width_px: f64,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipView {
    pub slot: usize,
    pub title: String,
    pub value_label: String,
    pub description: String,
    pub source_url: Option<String>,
    pub image_ref: Option<String>,
    pub placement: TooltipPlacement,
}

/// A complete, pure description of one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    pub width: f64,
    pub plot_height: f64,
    pub unit_symbol: String,
    pub transform: ViewTransform,
    pub visible_domain: LogRange,
    pub ticks: Vec<TickMark>,
    pub items: Vec<ItemMark>,
    pub tooltip: Option<TooltipView>,
}

impl RenderFrame {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

pub fn tick_marks(ticks: &[Tick], scale: &LogScale, formatter: &NumberFormatter) -> Vec<TickMark> {
    ticks
        .iter()
        .map(|tick| TickMark {
            exponent: tick.exponent,
            x_px: scale.exponent_to_pixel(tick.exponent as f64),
            label: formatter.format_power_of_ten(tick.exponent),
        })
        .collect()
}

pub fn item_marks(
    items: &[PositionedItem],
    plot_height: f64,
    highlighted: Option<usize>,
    formatter: &NumberFormatter,
) -> Vec<ItemMark> {
    items
        .iter()
        .map(|placed| ItemMark {
            slot: placed.vertical_slot,
            name: placed.item.name.clone(),
            value_label: formatter.format(placed.converted_value),
            x_px: placed.marker_x(),
            y_px: placed.screen_y(plot_height),
            label_width_px: placed.label_width_px,
            highlighted: highlighted == Some(placed.vertical_slot),
        })
        .collect()
}
