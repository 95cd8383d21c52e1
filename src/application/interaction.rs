//! Interaction Controller.
//!
//! Gestures are folded one event at a time by [`reduce`], a pure function of
//! the previous controller state. The outputs are commands for the viewport
//! and requests for the host; nothing here touches the viewport directly, so
//! a clamped viewport can never feed back into the controller.

use strum::{AsRefStr, Display as StrumDisplay, EnumString};

use crate::domain::chart::{ChartConfig, HitTarget, InputMode, Point, ViewportCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum PointerKind {
    Mouse,
    Touch,
    Pen,
}

/// Low-level input, already hit-tested by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Down { pointer_id: i32, position: Point, time_ms: f64, target: HitTarget },
    /// `pressed` is false when no button is held, which for an active
    /// gesture means its release was never delivered.
    Move { pointer_id: i32, position: Point, time_ms: f64, target: HitTarget, pressed: bool },
    Up { pointer_id: i32, position: Point, time_ms: f64 },
    Cancel { pointer_id: i32 },
    /// Pointer left the plot. Ends any gesture in progress.
    Leave,
    Wheel { position: Point, delta_y: f64 },
    /// Two-finger scale change since the previous pinch event.
    Pinch { center: Point, scale_ratio: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    /// Down on an item (or anywhere, for touch); a tap candidate.
    Pressed { pointer_id: i32, slot: Option<usize>, origin: Point, started_ms: f64 },
    Dragging { pointer_id: i32, origin: Point, last: Point, started_ms: f64, travelled: f64, scrolling: bool },
    /// Moved too far from an item; the release is swallowed.
    Cancelled { pointer_id: i32 },
    ShowingTooltip { slot: usize },
}

impl GestureState {
    fn active_pointer(&self) -> Option<i32> {
        match *self {
            GestureState::Pressed { pointer_id, .. }
            | GestureState::Dragging { pointer_id, .. }
            | GestureState::Cancelled { pointer_id } => Some(pointer_id),
            GestureState::Idle | GestureState::ShowingTooltip { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerState {
    pub gesture: GestureState,
    /// Time of the last tap on the background, for double-tap detection.
    pub last_background_tap_ms: Option<f64>,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self { gesture: GestureState::Idle, last_background_tap_ms: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerAction {
    Viewport(ViewportCommand),
    /// Forward vertical motion to the page.
    ScrollPage { dy: f64 },
    ShowTooltip { slot: usize },
    HideTooltip,
    ActivateItem { slot: usize, navigate: bool },
    ResetZoom,
}

/// Folds one input event into the controller state.
pub fn reduce(
    state: &ControllerState,
    event: &InputEvent,
    config: &ChartConfig,
    mode: InputMode,
) -> (ControllerState, Vec<ControllerAction>) {
    let mut next = *state;
    let mut actions = Vec::new();

    match *event {
        InputEvent::Down { pointer_id, position, time_ms, target } => {
            if state.gesture.active_pointer().is_some() {
                return (next, actions);
            }
            next.gesture = match (mode, target.slot()) {
                (InputMode::Pointer, None) => GestureState::Dragging {
                    pointer_id,
                    origin: position,
                    last: position,
                    started_ms: time_ms,
                    travelled: 0.0,
                    scrolling: false,
                },
                (_, slot) => GestureState::Pressed { pointer_id, slot, origin: position, started_ms: time_ms },
            };
        }

        InputEvent::Move { pointer_id, position, target, pressed, .. } => {
            let gesture = match state.gesture.active_pointer() {
                Some(id) if id == pointer_id && !pressed => GestureState::Idle,
                _ => state.gesture,
            };
            next.gesture = gesture;
            match gesture {
                GestureState::Pressed { pointer_id: id, origin, started_ms, .. } if id == pointer_id => {
                    if origin.distance(position) > config.tap_max_distance_px {
                        if mode == InputMode::Touch {
                            actions.push(ControllerAction::HideTooltip);
                            let dragging = GestureState::Dragging {
                                pointer_id,
                                origin,
                                last: origin,
                                started_ms,
                                travelled: 0.0,
                                scrolling: false,
                            };
                            next.gesture = drag_step(dragging, position, config, &mut actions);
                        } else {
                            next.gesture = GestureState::Cancelled { pointer_id };
                        }
                    }
                }
                GestureState::Dragging { pointer_id: id, .. } if id == pointer_id => {
                    next.gesture = drag_step(gesture, position, config, &mut actions);
                }
                GestureState::Idle | GestureState::ShowingTooltip { .. } if mode == InputMode::Pointer => {
                    match (gesture, target.slot()) {
                        (GestureState::ShowingTooltip { slot: shown }, Some(slot)) if shown == slot => {}
                        (_, Some(slot)) => {
                            actions.push(ControllerAction::ShowTooltip { slot });
                            next.gesture = GestureState::ShowingTooltip { slot };
                        }
                        (GestureState::ShowingTooltip { .. }, None) => {
                            actions.push(ControllerAction::HideTooltip);
                            next.gesture = GestureState::Idle;
                        }
                        (_, None) => {}
                    }
                }
                _ => {}
            }
        }

        InputEvent::Up { pointer_id, position, time_ms } => match state.gesture {
            GestureState::Pressed { pointer_id: id, slot, origin, started_ms } if id == pointer_id => {
                next.gesture = GestureState::Idle;
                let is_tap = time_ms - started_ms <= config.tap_max_duration_ms
                    && origin.distance(position) <= config.tap_max_distance_px;
                match (is_tap, slot, mode) {
                    (false, _, _) => {}
                    (true, Some(slot), InputMode::Pointer) => {
                        actions.push(ControllerAction::ActivateItem { slot, navigate: true });
                    }
                    (true, Some(slot), InputMode::Touch) => {
                        actions.push(ControllerAction::ShowTooltip { slot });
                        actions.push(ControllerAction::ActivateItem { slot, navigate: false });
                        next.gesture = GestureState::ShowingTooltip { slot };
                    }
                    (true, None, _) => background_tap(&mut next, time_ms, config, &mut actions),
                }
            }
            GestureState::Dragging { pointer_id: id, travelled, started_ms, .. } if id == pointer_id => {
                next.gesture = GestureState::Idle;
                if travelled <= config.tap_max_distance_px && time_ms - started_ms <= config.tap_max_duration_ms {
                    background_tap(&mut next, time_ms, config, &mut actions);
                }
            }
            GestureState::Cancelled { pointer_id: id } if id == pointer_id => {
                next.gesture = GestureState::Idle;
            }
            _ => {}
        },

        InputEvent::Cancel { pointer_id } => {
            if state.gesture.active_pointer() == Some(pointer_id) {
                next.gesture = GestureState::Idle;
            }
        }

        InputEvent::Leave => match state.gesture {
            GestureState::Pressed { .. } | GestureState::Dragging { .. } | GestureState::Cancelled { .. } => {
                next.gesture = GestureState::Idle;
            }
            GestureState::ShowingTooltip { .. } if mode == InputMode::Pointer => {
                actions.push(ControllerAction::HideTooltip);
                next.gesture = GestureState::Idle;
            }
            _ => {}
        },

        InputEvent::Wheel { position, delta_y } => {
            let factor = (-delta_y * config.wheel_zoom_sensitivity).exp();
            if factor.is_finite() && factor != 1.0 {
                actions.push(ControllerAction::Viewport(ViewportCommand::ZoomAbout { anchor_px: position.x, factor }));
            }
        }

        InputEvent::Pinch { center, scale_ratio } => {
            if scale_ratio.is_finite() && scale_ratio > 0.0 && scale_ratio != 1.0 {
                actions.push(ControllerAction::Viewport(ViewportCommand::ZoomAbout {
                    anchor_px: center.x,
                    factor: scale_ratio,
                }));
            }
        }
    }

    (next, actions)
}

/// Horizontal motion pans; vertical motion past the threshold scrolls the
/// page. Both may happen in the same gesture.
fn drag_step(
    dragging: GestureState,
    position: Point,
    config: &ChartConfig,
    actions: &mut Vec<ControllerAction>,
) -> GestureState {
    let GestureState::Dragging { pointer_id, origin, last, started_ms, travelled, scrolling } = dragging else {
        return dragging;
    };
    let dx = position.x - last.x;
    let dy = position.y - last.y;
    if dx != 0.0 {
        actions.push(ControllerAction::Viewport(ViewportCommand::PanBy { dx }));
    }
    let scrolling = scrolling || (position.y - origin.y).abs() > config.vertical_scroll_threshold_px;
    if scrolling && dy != 0.0 {
        actions.push(ControllerAction::ScrollPage { dy: -dy });
    }
    GestureState::Dragging {
        pointer_id,
        origin,
        last: position,
        started_ms,
        travelled: travelled.max(origin.distance(position)),
        scrolling,
    }
}

fn background_tap(state: &mut ControllerState, time_ms: f64, config: &ChartConfig, actions: &mut Vec<ControllerAction>) {
    actions.push(ControllerAction::HideTooltip);
    match state.last_background_tap_ms {
        Some(previous) if time_ms - previous <= config.double_tap_window_ms => {
            actions.push(ControllerAction::ResetZoom);
            state.last_background_tap_ms = None;
        }
        _ => state.last_background_tap_ms = Some(time_ms),
    }
}

/// Stateful wrapper around [`reduce`] for hosts.
#[derive(Debug, Clone)]
pub struct InteractionController {
    config: ChartConfig,
    mode: InputMode,
    state: ControllerState,
}

impl InteractionController {
    pub fn new(config: ChartConfig, mode: InputMode) -> Self {
        Self { config, mode, state: ControllerState::default() }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Switching modes abandons any gesture in progress.
    pub fn set_mode(&mut self, mode: InputMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        if self.state.gesture.active_pointer().is_some() {
            self.state.gesture = GestureState::Idle;
        }
    }

    pub fn is_gesture_active(&self) -> bool {
        self.state.gesture.active_pointer().is_some()
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn handle(&mut self, event: &InputEvent) -> Vec<ControllerAction> {
        let (next, actions) = reduce(&self.state, event, &self.config, self.mode);
        self.state = next;
        actions
    }

    /// Forget any tooltip state, e.g. after the item set changed.
    pub fn clear_tooltip(&mut self) {
        if matches!(self.state.gesture, GestureState::ShowingTooltip { .. }) {
            self.state.gesture = GestureState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::HitRole;

    const ITEM: HitTarget = HitTarget::Item { slot: 2, role: HitRole::ItemMarker };

    fn down(x: f64, t: f64, target: HitTarget) -> InputEvent {
        InputEvent::Down { pointer_id: 1, position: Point::new(x, 100.0), time_ms: t, target }
    }

    fn mv(x: f64, y: f64) -> InputEvent {
        InputEvent::Move {
            pointer_id: 1,
            position: Point::new(x, y),
            time_ms: 0.0,
            target: HitTarget::Background,
            pressed: true,
        }
    }

    fn hover(x: f64, y: f64) -> InputEvent {
        match mv(x, y) {
            InputEvent::Move { pointer_id, position, time_ms, target, .. } => {
                InputEvent::Move { pointer_id, position, time_ms, target, pressed: false }
            }
            other => other,
        }
    }

    fn up(x: f64, t: f64) -> InputEvent {
        InputEvent::Up { pointer_id: 1, position: Point::new(x, 100.0), time_ms: t }
    }

    #[test]
    fn pointer_click_on_item_navigates() {
        let mut ctl = InteractionController::new(ChartConfig::default(), InputMode::Pointer);
        ctl.handle(&down(50.0, 0.0, ITEM));
        let actions = ctl.handle(&up(52.0, 120.0));
        assert_eq!(actions, [ControllerAction::ActivateItem { slot: 2, navigate: true }]);
    }

    #[test]
    fn pointer_drag_off_item_cancels_click() {
        let mut ctl = InteractionController::new(ChartConfig::default(), InputMode::Pointer);
        ctl.handle(&down(50.0, 0.0, ITEM));
        assert!(ctl.handle(&mv(80.0, 100.0)).is_empty());
        assert_eq!(ctl.state().gesture, GestureState::Cancelled { pointer_id: 1 });
        assert!(ctl.handle(&up(80.0, 100.0)).is_empty());
        assert_eq!(ctl.state().gesture, GestureState::Idle);
    }

    #[test]
    fn touch_drag_may_start_on_item() {
        let mut ctl = InteractionController::new(ChartConfig::default(), InputMode::Touch);
        ctl.handle(&down(50.0, 0.0, ITEM));
        let actions = ctl.handle(&mv(70.0, 100.0));
        assert_eq!(
            actions,
            [ControllerAction::HideTooltip, ControllerAction::Viewport(ViewportCommand::PanBy { dx: 20.0 })]
        );
    }

    #[test]
    fn vertical_motion_scrolls_page() {
        let mut ctl = InteractionController::new(ChartConfig::default(), InputMode::Pointer);
        ctl.handle(&down(50.0, 0.0, HitTarget::Background));
        assert!(ctl.handle(&mv(50.0, 105.0)).is_empty());
        let actions = ctl.handle(&mv(60.0, 120.0));
        assert_eq!(
            actions,
            [
                ControllerAction::Viewport(ViewportCommand::PanBy { dx: 10.0 }),
                ControllerAction::ScrollPage { dy: -15.0 },
            ]
        );
    }

    #[test]
    fn second_pointer_is_ignored() {
        let mut ctl = InteractionController::new(ChartConfig::default(), InputMode::Touch);
        ctl.handle(&down(50.0, 0.0, HitTarget::Background));
        let before = *ctl.state();
        ctl.handle(&InputEvent::Down {
            pointer_id: 2,
            position: Point::new(10.0, 10.0),
            time_ms: 5.0,
            target: ITEM,
        });
        assert_eq!(*ctl.state(), before);
    }

    #[test]
    fn leaving_the_plot_ends_a_drag() {
        let mut ctl = InteractionController::new(ChartConfig::default(), InputMode::Pointer);
        ctl.handle(&down(50.0, 0.0, HitTarget::Background));
        ctl.handle(&mv(70.0, 100.0));
        assert!(ctl.is_gesture_active());
        assert!(ctl.handle(&InputEvent::Leave).is_empty());
        assert_eq!(ctl.state().gesture, GestureState::Idle);
        assert!(ctl.handle(&mv(120.0, 100.0)).is_empty());
    }

    #[test]
    fn unpressed_move_drops_a_lost_release() {
        let mut ctl = InteractionController::new(ChartConfig::default(), InputMode::Pointer);
        ctl.handle(&down(50.0, 0.0, HitTarget::Background));
        ctl.handle(&mv(70.0, 100.0));
        assert!(ctl.handle(&hover(200.0, 100.0)).is_empty());
        assert_eq!(ctl.state().gesture, GestureState::Idle);

        ctl.handle(&down(200.0, 500.0, HitTarget::Background));
        assert_eq!(
            ctl.handle(&mv(230.0, 100.0)),
            [ControllerAction::Viewport(ViewportCommand::PanBy { dx: 30.0 })]
        );
    }

    #[test]
    fn touch_tooltip_survives_leave() {
        let mut ctl = InteractionController::new(ChartConfig::default(), InputMode::Touch);
        ctl.handle(&down(50.0, 0.0, ITEM));
        ctl.handle(&up(50.0, 80.0));
        assert!(ctl.handle(&InputEvent::Leave).is_empty());
        assert_eq!(ctl.state().gesture, GestureState::ShowingTooltip { slot: 2 });
    }
}
