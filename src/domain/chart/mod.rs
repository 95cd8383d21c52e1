//! Chart aggregate: log scale, viewport, ticks and item layout.

pub mod format;
pub mod frame;
pub mod layout;
pub mod scale;
pub mod ticks;
pub mod tooltip;
pub mod value_objects;
pub mod viewport;

pub use format::NumberFormatter;
pub use frame::{ItemMark, RenderFrame, TickMark, TooltipView};
pub use hit_test::{HitRegion, HitRole, HitShape, HitTarget, hit_regions, hit_test};
pub use layout::{PositionedItem, label_width, layout, plot_height};
pub use scale::LogScale;
pub use ticks::{Tick, TickCache, TickGenerator};
pub use tooltip::{TooltipPlacement, TooltipSide, place_tooltip};
pub use value_objects::*;
pub use viewport::{ViewportCommand, ViewportEngine, ViewportState};
