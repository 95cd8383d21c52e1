//! Power-of-ten gridlines with a hysteresis cache.
//!
//! Ticks are generated once for the whole item extent and thinned by an
//! integer stride, then reused while the zoom level stays within the
//! hysteresis band. Panning only changes which cached ticks are visible.

use serde::Serialize;

use super::value_objects::{ChartConfig, DeviceProfile, LogRange};
use crate::domain::logging::LogComponent;
use crate::log_trace;

/// A gridline at `10^exponent`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tick {
    pub exponent: i32,
    pub value: f64,
}

impl Tick {
    pub fn new(exponent: i32) -> Self {
        Self { exponent, value: 10f64.powi(exponent) }
    }
}

/// Full tick set from the last regeneration.
#[derive(Debug, Clone, PartialEq)]
pub struct TickCache {
    /// Thinned exponents over the whole item extent, ascending.
    pub exponents: Vec<i32>,
    /// Visible log range at generation time.
    pub log_range: f64,
    pub extent: LogRange,
    pub target_count: usize,
}

/// Produces ticks for a visible window, reusing its cache when possible.
#[derive(Debug, Clone)]
pub struct TickGenerator {
    config: ChartConfig,
    cache: Option<TickCache>,
}

impl TickGenerator {
    pub fn new(config: ChartConfig) -> Self {
        Self { config, cache: None }
    }

    pub fn cache(&self) -> Option<&TickCache> {
        self.cache.as_ref()
    }

    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Desired number of visible ticks for a plot `width` pixels wide.
    pub fn target_count(&self, width: f64, device: &DeviceProfile) -> usize {
        let spacing = self.config.label_spacing(device);
        let fit = if spacing > 0.0 { (width / spacing).floor() } else { 0.0 };
        (fit.max(0.0) as usize).max(self.config.min_tick_count)
    }

    /// Ticks to draw for `visible`, given the full `extent`.
    pub fn ticks(&mut self, visible: LogRange, extent: LogRange, width: f64, device: &DeviceProfile) -> Vec<Tick> {
        let target = self.target_count(width, device);
        let span = visible.span();

        if let Some(cache) = self.cache.as_ref().filter(|c| self.is_reusable(c, span, extent, target)) {
            let kept = self.filter_padded(&cache.exponents, visible);
            if kept.len() >= self.config.min_tick_count {
                return kept;
            }
        }

        let exponents = regenerate(extent, span, target);
        log_trace!(
            LogComponent::Domain("Ticks"),
            "Regenerated {} ticks over {} (visible span {:.3}, target {})",
            exponents.len(),
            extent,
            span,
            target
        );
        let kept = self.filter_padded(&exponents, visible);
        self.cache = Some(TickCache { exponents, log_range: span, extent, target_count: target });
        if kept.len() >= self.config.min_tick_count {
            return kept;
        }
        exact_fallback(visible, target)
    }

    fn is_reusable(&self, cache: &TickCache, span: f64, extent: LogRange, target: usize) -> bool {
        if cache.extent != extent || cache.target_count != target || cache.log_range <= 0.0 {
            return false;
        }
        ((span - cache.log_range) / cache.log_range).abs() <= self.config.tick_hysteresis
    }

    fn filter_padded(&self, exponents: &[i32], visible: LogRange) -> Vec<Tick> {
        let bounds = visible.padded(self.config.container_pad_fraction);
        exponents.iter().copied().filter(|&e| bounds.contains(e as f64)).map(Tick::new).collect()
    }
}

/// Every `stride`-th power of ten across `extent`, with the stride chosen so
/// that roughly `target` ticks fall into a window `span` decades wide.
fn regenerate(extent: LogRange, span: f64, target: usize) -> Vec<i32> {
    let stride = (span / target.max(1) as f64).ceil().max(1.0) as i32;
    let first = extent.min.floor() as i32;
    let last = extent.max.ceil() as i32;
    (first..=last).filter(|e| e.rem_euclid(stride) == 0).collect()
}

/// Powers of ten inside the exact visible window, thinned to at most
/// `target`; may be empty.
fn exact_fallback(visible: LogRange, target: usize) -> Vec<Tick> {
    let first = visible.min.ceil() as i32;
    let last = visible.max.floor() as i32;
    let count = (last - first + 1).max(0) as usize;
    let stride = count.div_ceil(target.max(1)).max(1);
    (first..=last).step_by(stride).map(Tick::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> TickGenerator {
        TickGenerator::new(ChartConfig::default())
    }

    #[test]
    fn stride_thins_wide_extents() {
        let mut ticks = generator();
        let extent = LogRange::new(-36.0, 27.0);
        let shown = ticks.ticks(extent, extent, 800.0, &DeviceProfile::desktop(1200.0));
        // 63 decades over 8 labels
        assert!(shown.iter().all(|t| t.exponent % 8 == 0));
        assert!(shown.len() >= 7 && shown.len() <= 9, "{}", shown.len());
    }

    #[test]
    fn reuses_cache_while_panning() {
        let mut ticks = generator();
        let extent = LogRange::new(-10.0, 10.0);
        let device = DeviceProfile::desktop(1200.0);
        ticks.ticks(LogRange::new(-10.0, 0.0), extent, 600.0, &device);
        let cached = ticks.cache().cloned();
        ticks.ticks(LogRange::new(-8.0, 2.0), extent, 600.0, &device);
        assert_eq!(ticks.cache().cloned(), cached);
    }

    #[test]
    fn small_zoom_change_keeps_cache() {
        let mut ticks = generator();
        let extent = LogRange::new(-30.0, 30.0);
        let device = DeviceProfile::desktop(1200.0);
        ticks.ticks(LogRange::new(-10.0, 10.0), extent, 600.0, &device);
        let cached = ticks.cache().cloned().expect("first call fills the cache");

        // 30% narrower
        let shown = ticks.ticks(LogRange::new(-7.0, 7.0), extent, 600.0, &device);
        assert_eq!(ticks.cache(), Some(&cached));
        assert_eq!(shown.iter().map(|t| t.exponent).collect::<Vec<_>>(), [-4, 0, 4]);
    }

    #[test]
    fn large_zoom_change_regenerates() {
        let mut ticks = generator();
        let extent = LogRange::new(-30.0, 30.0);
        let device = DeviceProfile::desktop(1200.0);
        ticks.ticks(LogRange::new(-10.0, 10.0), extent, 600.0, &device);
        let coarse = ticks.cache().map(|c| c.exponents.len()).unwrap_or_default();

        // 60% narrower
        ticks.ticks(LogRange::new(-4.0, 4.0), extent, 600.0, &device);
        let cache = ticks.cache().expect("regenerated cache");
        assert_eq!(cache.log_range, 8.0);
        assert!(cache.exponents.len() > coarse, "{} <= {coarse}", cache.exponents.len());
        assert!(cache.exponents.iter().all(|e| e % 2 == 0));
    }

    #[test]
    fn sub_decade_window_has_no_ticks() {
        let mut ticks = generator();
        let shown = ticks.ticks(LogRange::new(3.3, 3.31), LogRange::new(0.0, 6.0), 600.0, &DeviceProfile::desktop(1200.0));
        assert!(shown.is_empty());
    }

    #[test]
    fn exact_window_is_thinned_to_target() {
        let mut ticks = generator();
        let device = DeviceProfile::desktop(1200.0);
        assert_eq!(ticks.target_count(100.0, &device), 2);
        // stride 2 leaves only 10^6 near the window, so the exact decades are used
        let shown = ticks.ticks(LogRange::new(4.2, 7.2), LogRange::new(0.0, 20.0), 100.0, &device);
        assert_eq!(shown.iter().map(|t| t.exponent).collect::<Vec<_>>(), [5, 7]);
    }

    #[test]
    fn deep_zoom_falls_back_to_exact_window() {
        let mut ticks = generator();
        let extent = LogRange::new(0.0, 6.0);
        let device = DeviceProfile::desktop(1200.0);
        let shown = ticks.ticks(LogRange::new(2.2, 2.4), extent, 600.0, &device);
        assert!(shown.is_empty());
        let shown = ticks.ticks(LogRange::new(2.9, 3.1), extent, 600.0, &device);
        assert_eq!(shown.iter().map(|t| t.exponent).collect::<Vec<_>>(), [3]);
    }

    #[test]
    fn mobile_uses_wider_spacing() {
        let ticks = generator();
        assert_eq!(ticks.target_count(390.0, &DeviceProfile::mobile(390.0)), 3);
        assert_eq!(ticks.target_count(100.0, &DeviceProfile::desktop(1200.0)), 2);
    }
}
