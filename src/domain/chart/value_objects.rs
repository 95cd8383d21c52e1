use derive_more::{Constructor, Display};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

/// Value Object - screen-space point in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Constructor, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Value Object - width/height pair in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Constructor, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Value Object - closed interval of base-10 exponents.
///
/// The engine works on exponents rather than raw values so that extents
/// spanning hundreds of decades never overflow or lose ordering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Display)]
#[display(fmt = "[1e{:.3}, 1e{:.3}]", min, max)]
pub struct LogRange {
    pub min: f64,
    pub max: f64,
}

impl LogRange {
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max { Self { min, max } } else { Self { min: max, max: min } }
    }

    /// Range covering `[lo, hi]` given as raw positive values.
    pub fn from_values(lo: f64, hi: f64) -> Self {
        Self::new(lo.log10(), hi.log10())
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, exponent: f64) -> bool {
        exponent >= self.min && exponent <= self.max
    }

    /// Grow both ends by `fraction` of the span.
    pub fn padded(&self, fraction: f64) -> Self {
        let pad = self.span() * fraction;
        Self { min: self.min - pad, max: self.max + pad }
    }

    /// Move the ends independently by `lower` and `upper` decades.
    pub fn expand(&self, lower: f64, upper: f64) -> Self {
        Self::new(self.min + lower, self.max + upper)
    }

    /// Ensure a span of at least `min_span` decades, centered on the midpoint.
    pub fn with_min_span(&self, min_span: f64) -> Self {
        if self.span() >= min_span {
            return *self;
        }
        let center = (self.min + self.max) * 0.5;
        Self { min: center - min_span * 0.5, max: center + min_span * 0.5 }
    }

    pub fn shifted(&self, delta: f64) -> Self {
        Self { min: self.min + delta, max: self.max + delta }
    }
}

/// Input modality the controller adapts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay, EnumString, AsRefStr)]
pub enum InputMode {
    /// Hover-capable pointer (desktop).
    #[strum(serialize = "pointer")]
    Pointer,
    /// Touch-primary device (mobile).
    #[strum(serialize = "touch")]
    Touch,
}

/// Device capability hints supplied by the viewport host.
#[derive(Debug, Clone, Copy, PartialEq, Constructor)]
pub struct DeviceProfile {
    pub hover: bool,
    pub touch: bool,
    pub viewport_width: f64,
}

impl DeviceProfile {
    pub fn desktop(viewport_width: f64) -> Self {
        Self::new(true, false, viewport_width)
    }

    pub fn mobile(viewport_width: f64) -> Self {
        Self::new(false, true, viewport_width)
    }

    pub fn input_mode(&self) -> InputMode {
        if self.touch && !self.hover { InputMode::Touch } else { InputMode::Pointer }
    }

    pub fn is_narrow(&self, config: &ChartConfig) -> bool {
        self.viewport_width < config.mobile_breakpoint_px
    }
}

/// Notation used for value and tick labels.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, StrumDisplay, EnumIter, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Notation {
    /// `1.5e-7`
    #[strum(serialize = "scientific")]
    Scientific,
    /// `1.5×10⁻⁷`
    #[default]
    #[strum(serialize = "mathematical")]
    Mathematical,
    /// `1.5M`, falling back to mathematical outside the suffix range.
    #[strum(serialize = "human")]
    Human,
}

/// Immutable tuning constants, handed to every component at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub lower_pad: f64,
    pub upper_pad: f64,
    pub rebaseline_threshold: f64,
    pub min_log_spread: f64,
    pub scale_min: f64,
    pub scale_max: f64,

    pub tick_hysteresis: f64,
    pub min_tick_count: usize,
    pub label_spacing_px: f64,
    pub mobile_label_spacing_px: f64,
    pub mobile_breakpoint_px: f64,
    pub container_pad_fraction: f64,

    pub bottom_padding_px: f64,
    pub top_padding_px: f64,
    pub item_spacing_px: f64,
    pub min_plot_height_px: f64,
    pub char_width_px: f64,
    pub label_buffer_px: f64,

    pub tap_max_distance_px: f64,
    pub tap_max_duration_ms: f64,
    pub double_tap_window_ms: f64,
    pub vertical_scroll_threshold_px: f64,
    pub pointer_hit_radius_px: f64,
    pub touch_hit_radius_px: f64,
    pub wheel_zoom_sensitivity: f64,
    pub reset_duration_ms: f64,
    pub resize_debounce_ms: f64,
    pub tooltip_margin_px: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            lower_pad: 0.1,
            upper_pad: 10.0,
            rebaseline_threshold: 0.10,
            min_log_spread: 1.0,
            scale_min: 1.0,
            scale_max: 1000.0,

            tick_hysteresis: 0.5,
            min_tick_count: 2,
            label_spacing_px: 90.0,
            mobile_label_spacing_px: 130.0,
            mobile_breakpoint_px: 768.0,
            container_pad_fraction: 0.05,

            bottom_padding_px: 40.0,
            top_padding_px: 40.0,
            item_spacing_px: 28.0,
            min_plot_height_px: 320.0,
            char_width_px: 7.0,
            label_buffer_px: 12.0,

            tap_max_distance_px: 8.0,
            tap_max_duration_ms: 300.0,
            double_tap_window_ms: 350.0,
            vertical_scroll_threshold_px: 10.0,
            pointer_hit_radius_px: 6.0,
            touch_hit_radius_px: 22.0,
            wheel_zoom_sensitivity: 0.002,
            reset_duration_ms: 500.0,
            resize_debounce_ms: 150.0,
            tooltip_margin_px: 8.0,
        }
    }
}

impl ChartConfig {
    pub fn label_spacing(&self, device: &DeviceProfile) -> f64 {
        if device.is_narrow(self) { self.mobile_label_spacing_px } else { self.label_spacing_px }
    }

    pub fn hit_radius(&self, mode: InputMode) -> f64 {
        match mode {
            InputMode::Pointer => self.pointer_hit_radius_px,
            InputMode::Touch => self.touch_hit_radius_px,
        }
    }
}
