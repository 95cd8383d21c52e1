//! Viewport state and its reducer.
//!
//! The visible window is derived from a baseline (the padded item extent,
//! in exponents) and a zoom transform:
//!
//! ```text
//! visible_span = baseline.span() / k
//! log_shift    = -(x / width) * visible_span
//! visible      = [baseline.min + log_shift, baseline.min + log_shift + visible_span]
//! ```
//!
//! Every update goes through [`ViewportEngine::reduce`], which clamps the
//! visible window into the baseline and writes the clamped window back into
//! the transform, so the next gesture starts from what is on screen.

use super::scale::LogScale;
use super::value_objects::{ChartConfig, LogRange};
use crate::domain::logging::LogComponent;
use crate::view_state::ViewTransform;
use crate::{log_debug, log_info};

/// Commands accepted by the viewport reducer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportCommand {
    /// Horizontal drag by `dx` pixels.
    PanBy { dx: f64 },
    /// Multiply `k` by `factor`, keeping the value under `anchor_px` fixed.
    ZoomAbout { anchor_px: f64, factor: f64 },
    /// Replace the transform (animation frames).
    SetTransform(ViewTransform),
    /// Back to full zoom-out.
    Reset,
    /// The plot width changed; the visible window is preserved.
    Resize { width: f64 },
}

/// The single viewport state of a chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    baseline: LogRange,
    transform: ViewTransform,
    width: f64,
}

impl ViewportState {
    /// Padded item extent; the full zoom-out window.
    pub fn item_extent(&self) -> LogRange {
        self.baseline
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn visible_span(&self) -> f64 {
        self.baseline.span() / self.transform.k
    }

    pub fn visible_domain(&self) -> LogRange {
        let span = self.visible_span();
        let shift = if self.width > 0.0 { -(self.transform.x / self.width) * span } else { 0.0 };
        let min = self.baseline.min + shift;
        LogRange { min, max: min + span }
    }

    /// Coordinate transform for the visible window.
    pub fn scale(&self) -> LogScale {
        LogScale::new(self.visible_domain(), self.width)
    }
}

/// Owns the tuning constants and produces new viewport states.
#[derive(Debug, Clone)]
pub struct ViewportEngine {
    config: ChartConfig,
}

impl ViewportEngine {
    pub fn new(config: ChartConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Padded baseline for raw item bounds. `None` (no items) gets a window
    /// around 1.
    pub fn baseline_for(&self, extent: Option<(f64, f64)>) -> LogRange {
        let (lo, hi) = extent.unwrap_or((1.0, 1.0));
        LogRange::from_values(lo, hi)
            .with_min_span(self.config.min_log_spread)
            .expand(self.config.lower_pad.log10(), self.config.upper_pad.log10())
    }

    /// Fully zoomed-out state for `extent`.
    pub fn initial(&self, extent: Option<(f64, f64)>, width: f64) -> ViewportState {
        ViewportState { baseline: self.baseline_for(extent), transform: ViewTransform::IDENTITY, width: width.max(0.0) }
    }

    /// Applies a new item extent.
    ///
    /// When the padded upper bound moves by more than the rebaseline
    /// threshold the zoom is discarded. Otherwise the baseline is replaced
    /// and the transform kept, then clamped into the new baseline.
    pub fn set_extent(&self, state: &ViewportState, extent: Option<(f64, f64)>) -> ViewportState {
        let baseline = self.baseline_for(extent);
        let relative_change = (10f64.powf(baseline.max - state.baseline.max) - 1.0).abs();
        if !(relative_change <= self.config.rebaseline_threshold) {
            log_info!(
                LogComponent::Domain("Viewport"),
                "Rebaselining to {} (upper bound moved by {:.1}%)",
                baseline,
                relative_change * 100.0
            );
            return ViewportState { baseline, transform: ViewTransform::IDENTITY, width: state.width };
        }
        self.clamped(ViewportState { baseline, ..*state })
    }

    /// Uniform change of units: every value is multiplied by `ratio`, so the
    /// baseline moves by `log10(ratio)` decades and the transform carries over.
    pub fn rescale(&self, state: &ViewportState, ratio: f64) -> ViewportState {
        if !(ratio.is_finite() && ratio > 0.0) {
            return *state;
        }
        ViewportState { baseline: state.baseline.shifted(ratio.log10()), ..*state }
    }

    pub fn reduce(&self, state: &ViewportState, command: ViewportCommand) -> ViewportState {
        let next = match command {
            ViewportCommand::PanBy { dx } => ViewportState {
                transform: ViewTransform::new(state.transform.k, state.transform.x + dx),
                ..*state
            },
            ViewportCommand::ZoomAbout { anchor_px, factor } => self.zoom_about(state, anchor_px, factor),
            ViewportCommand::SetTransform(transform) => ViewportState { transform, ..*state },
            ViewportCommand::Reset => ViewportState { transform: ViewTransform::IDENTITY, ..*state },
            ViewportCommand::Resize { width } => {
                let width = width.max(0.0);
                let x = if state.width > 0.0 { state.transform.x * width / state.width } else { 0.0 };
                ViewportState { transform: ViewTransform::new(state.transform.k, x), width, ..*state }
            }
        };
        self.clamped(next)
    }

    fn zoom_about(&self, state: &ViewportState, anchor_px: f64, factor: f64) -> ViewportState {
        if !(factor.is_finite() && factor > 0.0) || state.width <= 0.0 {
            return *state;
        }
        let k = self.clamp_k(state.transform.k * factor);
        let ratio = anchor_px / state.width;
        let visible = state.visible_domain();
        let anchor = visible.min + ratio * visible.span();
        let span = state.baseline.span() / k;
        let min = anchor - ratio * span;
        ViewportState { transform: self.transform_for(state, min, span), ..*state }
    }

    fn clamp_k(&self, k: f64) -> f64 {
        if k.is_nan() {
            return self.config.scale_min;
        }
        k.clamp(self.config.scale_min, self.config.scale_max)
    }

    fn transform_for(&self, state: &ViewportState, min: f64, span: f64) -> ViewTransform {
        let k = state.baseline.span() / span;
        let x = if state.width > 0.0 { -(min - state.baseline.min) / span * state.width } else { 0.0 };
        ViewTransform::new(k, x)
    }

    /// Keeps the visible window inside the baseline and resynchronizes the
    /// transform with the clamped window.
    fn clamped(&self, state: ViewportState) -> ViewportState {
        let k = self.clamp_k(state.transform.k).max(1.0);
        let x = if state.transform.x.is_finite() { state.transform.x } else { 0.0 };
        let state = ViewportState { transform: ViewTransform::new(k, x), ..state };
        if state.width <= 0.0 {
            return ViewportState { transform: ViewTransform::new(k, 0.0), ..state };
        }
        let span = state.visible_span();
        let visible = state.visible_domain();
        let lowest = state.baseline.min;
        let highest = state.baseline.max - span;
        let min = if visible.min < lowest {
            lowest
        } else if visible.min > highest {
            highest.max(lowest)
        } else {
            return state;
        };
        let transform = self.transform_for(&state, min, span);
        log_debug!(
            LogComponent::Domain("Viewport"),
            "Clamped window to start at 1e{:.3}; transform resynced to k={:.3} x={:.1}",
            min,
            transform.k,
            transform.x
        );
        ViewportState { transform, ..state }
    }
}
