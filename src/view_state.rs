use serde::Serialize;

/// Zoom/pan transform: a scale factor `k` and a horizontal offset `x` in
/// pixels, composed the same way a zoom behavior would compose them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ViewTransform {
    pub k: f64,
    pub x: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform { k: 1.0, x: 0.0 };

    pub fn new(k: f64, x: f64) -> Self {
        Self { k, x }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Linear blend of both components at `t` in `[0, 1]`.
    pub fn lerp(&self, to: ViewTransform, t: f64) -> ViewTransform {
        let t = t.clamp(0.0, 1.0);
        ViewTransform { k: self.k + (to.k - self.k) * t, x: self.x + (to.x - self.x) * t }
    }
}

/// Cubic in-out easing.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 { 4.0 * t * t * t } else { 1.0 - (-2.0 * t + 2.0).powi(3) / 2.0 }
}

/// Animated return of the transform to identity.
#[derive(Clone, Debug, PartialEq)]
pub struct ResetAnimation {
    from: ViewTransform,
    started_ms: f64,
    duration_ms: f64,
}

impl ResetAnimation {
    pub fn new(from: ViewTransform, started_ms: f64, duration_ms: f64) -> Self {
        Self { from, started_ms, duration_ms: duration_ms.max(0.0) }
    }

    /// Transform at `now_ms`, and whether the animation has finished.
    pub fn sample(&self, now_ms: f64) -> (ViewTransform, bool) {
        if self.duration_ms <= 0.0 {
            return (ViewTransform::IDENTITY, true);
        }
        let t = (now_ms - self.started_ms) / self.duration_ms;
        if t >= 1.0 {
            return (ViewTransform::IDENTITY, true);
        }
        (self.from.lerp(ViewTransform::IDENTITY, ease_cubic_in_out(t)), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_endpoints() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(0.5), 0.5);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
    }

    #[test]
    fn reset_animation_lands_on_identity() {
        let anim = ResetAnimation::new(ViewTransform::new(4.0, -300.0), 100.0, 500.0);
        let (mid, done) = anim.sample(350.0);
        assert!(!done);
        assert!((mid.k - 2.5).abs() < 1e-9);
        assert_eq!(anim.sample(600.0), (ViewTransform::IDENTITY, true));
        assert_eq!(anim.sample(10_000.0), (ViewTransform::IDENTITY, true));
    }
}
