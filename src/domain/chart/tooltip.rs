use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumString};

use super::value_objects::{Point, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, StrumDisplay, EnumString, AsRefStr, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TooltipSide {
    #[default]
    Above,
    Below,
    Left,
    Right,
}

impl TooltipSide {
    fn opposite(self) -> Self {
        match self {
            TooltipSide::Above => TooltipSide::Below,
            TooltipSide::Below => TooltipSide::Above,
            TooltipSide::Left => TooltipSide::Right,
            TooltipSide::Right => TooltipSide::Left,
        }
    }
}

/// Where a tooltip box ended up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TooltipPlacement {
    /// Top-left corner in container coordinates.
    pub position: Point,
    pub side: TooltipSide,
}

fn origin_for(anchor: Point, size: Size, side: TooltipSide, margin: f64) -> Point {
    match side {
        TooltipSide::Above => Point::new(anchor.x - size.width / 2.0, anchor.y - margin - size.height),
        TooltipSide::Below => Point::new(anchor.x - size.width / 2.0, anchor.y + margin),
        TooltipSide::Left => Point::new(anchor.x - margin - size.width, anchor.y - size.height / 2.0),
        TooltipSide::Right => Point::new(anchor.x + margin, anchor.y - size.height / 2.0),
    }
}

fn fits(origin: Point, size: Size, container: Size, margin: f64) -> bool {
    origin.x >= margin
        && origin.y >= margin
        && origin.x + size.width <= container.width - margin
        && origin.y + size.height <= container.height - margin
}

/// Places a `size` box next to `anchor` on the preferred side, flipping to
/// the opposite side when only that one fits, then clamping into the
/// container inset by `margin`.
pub fn place_tooltip(anchor: Point, size: Size, preferred: TooltipSide, container: Size, margin: f64) -> TooltipPlacement {
    let mut side = preferred;
    let mut origin = origin_for(anchor, size, side, margin);
    if !fits(origin, size, container, margin) {
        let flipped = origin_for(anchor, size, preferred.opposite(), margin);
        if fits(flipped, size, container, margin) {
            side = preferred.opposite();
            origin = flipped;
        }
    }
    let max_x = (container.width - margin - size.width).max(margin);
    let max_y = (container.height - margin - size.height).max(margin);
    TooltipPlacement { position: Point::new(origin.x.clamp(margin, max_x), origin.y.clamp(margin, max_y)), side }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTAINER: Size = Size { width: 400.0, height: 300.0 };
    const BOX: Size = Size { width: 100.0, height: 40.0 };

    #[test]
    fn preferred_side_when_it_fits() {
        let placed = place_tooltip(Point::new(200.0, 150.0), BOX, TooltipSide::Above, CONTAINER, 8.0);
        assert_eq!(placed.side, TooltipSide::Above);
        assert_eq!(placed.position, Point::new(150.0, 102.0));
    }

    #[test]
    fn flips_near_the_top_edge() {
        let placed = place_tooltip(Point::new(200.0, 20.0), BOX, TooltipSide::Above, CONTAINER, 8.0);
        assert_eq!(placed.side, TooltipSide::Below);
        assert_eq!(placed.position, Point::new(150.0, 28.0));
    }

    #[test]
    fn clamps_horizontally() {
        let placed = place_tooltip(Point::new(395.0, 150.0), BOX, TooltipSide::Below, CONTAINER, 8.0);
        assert_eq!(placed.position.x, 292.0);
    }
}
