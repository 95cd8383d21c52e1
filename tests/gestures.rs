use std::cell::RefCell;
use std::rc::Rc;

use magnitude_chart_wasm::application::{ChartCoordinator, HostRequest, InputEvent, PointerKind};
use magnitude_chart_wasm::domain::catalog::{DatasetDocument, DimensionId, Item, Unit};
use magnitude_chart_wasm::domain::chart::{
    ChartConfig, DeviceProfile, HitRole, HitTarget, InputMode, Point, Size, ViewportCommand,
};
use magnitude_chart_wasm::domain::events::ChartEvent;

const BACKGROUND: Point = Point { x: 400.0, y: 5.0 };
/// Empty area on a 390px phone plot.
const PHONE_BACKGROUND: Point = Point { x: 200.0, y: 5.0 };

fn chart_on(device: DeviceProfile, width: f64) -> ChartCoordinator {
    let mut chart = ChartCoordinator::new(ChartConfig::default(), device, Size::new(width, 480.0));
    let dimension = DimensionId::from("length");
    let ticket = chart.begin_load(&dimension);
    let items = vec![
        Item::new("Cell", 1e-5).with_source("https://example.org/cell"),
        Item::new("Whale", 30.0),
        Item::new("Moon", 3.4e6).with_description("Diameter"),
    ];
    chart
        .apply_dataset(ticket, DatasetDocument { dimension, units: vec![Unit::base("m")], items })
        .expect("current ticket");
    chart
}

fn marker(chart: &ChartCoordinator, name: &str) -> Point {
    let plot_height = chart.plot_height();
    let placed = chart
        .positioned_items()
        .iter()
        .find(|p| p.item.name == name)
        .expect("item is placed");
    Point::new(placed.marker_x(), placed.screen_y(plot_height))
}

fn activations(chart: &mut ChartCoordinator) -> Rc<RefCell<Vec<(String, bool)>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    chart.events_mut().subscribe_to_chart_events(move |event| {
        if let ChartEvent::ItemActivated { item, navigate } = event {
            sink.borrow_mut().push((item.name.clone(), *navigate));
        }
    });
    seen
}

fn press(chart: &mut ChartCoordinator, kind: PointerKind, at: Point, time_ms: f64) -> Vec<HostRequest> {
    let target = chart.hit_test(at);
    chart.handle_input(InputEvent::Down { pointer_id: 1, position: at, time_ms, target }, kind, time_ms)
}

fn drag(chart: &mut ChartCoordinator, kind: PointerKind, to: Point, time_ms: f64) -> Vec<HostRequest> {
    let target = chart.hit_test(to);
    chart.handle_input(InputEvent::Move { pointer_id: 1, position: to, time_ms, target, pressed: true }, kind, time_ms)
}

/// Move with no button held.
fn hover(chart: &mut ChartCoordinator, kind: PointerKind, to: Point, time_ms: f64) -> Vec<HostRequest> {
    let target = chart.hit_test(to);
    chart.handle_input(InputEvent::Move { pointer_id: 1, position: to, time_ms, target, pressed: false }, kind, time_ms)
}

fn release(chart: &mut ChartCoordinator, kind: PointerKind, at: Point, time_ms: f64) -> Vec<HostRequest> {
    chart.handle_input(InputEvent::Up { pointer_id: 1, position: at, time_ms }, kind, time_ms)
}

#[test]
fn markers_are_hit_tested() {
    let chart = chart_on(DeviceProfile::desktop(1280.0), 800.0);
    let cell = marker(&chart, "Cell");
    assert!(matches!(chart.hit_test(cell), HitTarget::Item { slot: 0, .. }));
    assert_eq!(chart.hit_test(BACKGROUND), HitTarget::Background);
}

#[test]
fn desktop_click_opens_source() {
    let mut chart = chart_on(DeviceProfile::desktop(1280.0), 800.0);
    let seen = activations(&mut chart);
    let cell = marker(&chart, "Cell");

    assert!(press(&mut chart, PointerKind::Mouse, cell, 0.0).is_empty());
    let requests = release(&mut chart, PointerKind::Mouse, cell, 120.0);

    assert_eq!(requests, [HostRequest::OpenUrl { url: "https://example.org/cell".into() }]);
    assert_eq!(*seen.borrow(), [("Cell".to_string(), true)]);
}

#[test]
fn desktop_hover_shows_tooltip() {
    let mut chart = chart_on(DeviceProfile::desktop(1280.0), 800.0);
    let moon = marker(&chart, "Moon");

    hover(&mut chart, PointerKind::Mouse, moon, 0.0);
    assert_eq!(chart.tooltip_slot(), Some(2));
    let tooltip = chart.current_tooltip().expect("tooltip for hovered item");
    assert_eq!(tooltip.title, "Moon");
    assert_eq!(tooltip.description, "Diameter");

    chart.handle_input(InputEvent::Leave, PointerKind::Mouse, 10.0);
    assert_eq!(chart.tooltip_slot(), None);
}

#[test]
fn touch_tap_shows_details_without_navigating() {
    let mut chart = chart_on(DeviceProfile::mobile(390.0), 390.0);
    assert_eq!(chart.input_mode(), InputMode::Touch);
    let seen = activations(&mut chart);
    let cell = marker(&chart, "Cell");

    press(&mut chart, PointerKind::Touch, cell, 0.0);
    let requests = release(&mut chart, PointerKind::Touch, Point::new(cell.x + 3.0, cell.y), 90.0);

    assert!(requests.is_empty());
    assert_eq!(chart.tooltip_slot(), Some(0));
    assert_eq!(*seen.borrow(), [("Cell".to_string(), false)]);
}

#[test]
fn device_change_switches_input_mode() {
    let mut chart = chart_on(DeviceProfile::desktop(1280.0), 800.0);
    assert_eq!(chart.input_mode(), InputMode::Pointer);
    chart.set_device(DeviceProfile::mobile(800.0));
    assert_eq!(chart.input_mode(), InputMode::Touch);
}

#[test]
fn drag_on_background_pans() {
    let mut chart = chart_on(DeviceProfile::desktop(1280.0), 800.0);
    chart.apply_viewport(ViewportCommand::ZoomAbout { anchor_px: 400.0, factor: 3.0 });
    let before = chart.visible_domain();

    press(&mut chart, PointerKind::Mouse, BACKGROUND, 0.0);
    let requests = drag(&mut chart, PointerKind::Mouse, Point::new(500.0, BACKGROUND.y), 50.0);
    release(&mut chart, PointerKind::Mouse, Point::new(500.0, BACKGROUND.y), 400.0);

    assert!(requests.is_empty());
    let after = chart.visible_domain();
    assert!(after.min < before.min, "{before} -> {after}");
    assert!((after.span() - before.span()).abs() < 1e-9);
}

#[test]
fn leaving_mid_drag_stops_panning() {
    let mut chart = chart_on(DeviceProfile::desktop(1280.0), 800.0);
    chart.handle_input(InputEvent::Wheel { position: BACKGROUND, delta_y: -300.0 }, PointerKind::Mouse, 0.0);

    press(&mut chart, PointerKind::Mouse, BACKGROUND, 10.0);
    drag(&mut chart, PointerKind::Mouse, Point::new(440.0, BACKGROUND.y), 20.0);
    chart.handle_input(InputEvent::Leave, PointerKind::Mouse, 30.0);
    let before = chart.visible_domain();

    // button released outside, pointer comes back hovering
    hover(&mut chart, PointerKind::Mouse, Point::new(520.0, BACKGROUND.y), 60.0);
    assert_eq!(chart.visible_domain(), before);

    press(&mut chart, PointerKind::Mouse, Point::new(520.0, BACKGROUND.y), 1000.0);
    drag(&mut chart, PointerKind::Mouse, Point::new(480.0, BACKGROUND.y), 1020.0);
    assert_ne!(chart.visible_domain(), before);
}

#[test]
fn release_outside_without_leave_is_recovered() {
    let mut chart = chart_on(DeviceProfile::desktop(1280.0), 800.0);
    chart.apply_viewport(ViewportCommand::ZoomAbout { anchor_px: 400.0, factor: 3.0 });

    press(&mut chart, PointerKind::Mouse, BACKGROUND, 0.0);
    drag(&mut chart, PointerKind::Mouse, Point::new(430.0, BACKGROUND.y), 20.0);
    let before = chart.visible_domain();

    hover(&mut chart, PointerKind::Mouse, Point::new(300.0, BACKGROUND.y), 900.0);
    assert_eq!(chart.visible_domain(), before);

    let moon = marker(&chart, "Moon");
    hover(&mut chart, PointerKind::Mouse, moon, 950.0);
    assert_eq!(chart.tooltip_slot(), Some(2));
}

#[test]
fn hybrid_device_follows_each_pointer_type() {
    let mut chart = chart_on(DeviceProfile::new(true, true, 1280.0), 800.0);
    assert_eq!(chart.input_mode(), InputMode::Pointer);

    press(&mut chart, PointerKind::Touch, BACKGROUND, 0.0);
    release(&mut chart, PointerKind::Touch, BACKGROUND, 60.0);
    assert_eq!(chart.input_mode(), InputMode::Touch);

    let moon = marker(&chart, "Moon");
    hover(&mut chart, PointerKind::Mouse, moon, 500.0);
    assert_eq!(chart.input_mode(), InputMode::Pointer);
    assert_eq!(chart.tooltip_slot(), Some(2));
}

#[test]
fn touch_on_hybrid_device_uses_touch_radius() {
    let mut chart = chart_on(DeviceProfile::new(true, true, 1280.0), 800.0);
    let whale = marker(&chart, "Whale");
    let near = Point::new(whale.x + 15.0, whale.y);
    assert_eq!(chart.hit_test(near), HitTarget::Background);

    press(&mut chart, PointerKind::Touch, near, 0.0);
    release(&mut chart, PointerKind::Touch, near, 80.0);

    assert_eq!(chart.tooltip_slot(), Some(1));
    assert_eq!(chart.hit_test(near), HitTarget::Item { slot: 1, role: HitRole::TapTarget });
}

#[test]
fn vertical_drag_scrolls_the_page() {
    let mut chart = chart_on(DeviceProfile::mobile(390.0), 390.0);

    press(&mut chart, PointerKind::Touch, PHONE_BACKGROUND, 0.0);
    assert!(drag(&mut chart, PointerKind::Touch, Point::new(PHONE_BACKGROUND.x, 12.0), 20.0).is_empty());
    // the drag starts from the press origin once the tap distance is exceeded
    let requests = drag(&mut chart, PointerKind::Touch, Point::new(PHONE_BACKGROUND.x, 45.0), 40.0);
    assert_eq!(requests, [HostRequest::ScrollPage { dy: -40.0 }]);

    let requests = drag(&mut chart, PointerKind::Touch, Point::new(PHONE_BACKGROUND.x, 50.0), 60.0);
    assert_eq!(requests, [HostRequest::ScrollPage { dy: -5.0 }]);
}

#[test]
fn double_tap_resets_zoom() {
    let mut chart = chart_on(DeviceProfile::mobile(390.0), 390.0);
    chart.apply_viewport(ViewportCommand::ZoomAbout { anchor_px: 200.0, factor: 5.0 });

    press(&mut chart, PointerKind::Touch, PHONE_BACKGROUND, 0.0);
    release(&mut chart, PointerKind::Touch, PHONE_BACKGROUND, 60.0);
    assert!(!chart.is_animating());
    press(&mut chart, PointerKind::Touch, PHONE_BACKGROUND, 200.0);
    release(&mut chart, PointerKind::Touch, PHONE_BACKGROUND, 260.0);
    assert!(chart.is_animating());

    chart.on_animation_frame(1000.0);
    assert!(chart.viewport().transform().is_identity());
}

#[test]
fn wheel_zooms_about_the_cursor() {
    let mut chart = chart_on(DeviceProfile::desktop(1280.0), 800.0);
    let anchor = Point::new(200.0, 100.0);
    let value_before = chart.viewport().scale().domain_value(anchor.x);

    chart.handle_input(InputEvent::Wheel { position: anchor, delta_y: -200.0 }, PointerKind::Mouse, 0.0);

    assert!(chart.viewport().transform().k > 1.0);
    let value_after = chart.viewport().scale().domain_value(anchor.x);
    assert!(((value_after / value_before).log10()).abs() < 1e-9);
}

#[test]
fn gesture_cancels_reset_animation() {
    let mut chart = chart_on(DeviceProfile::desktop(1280.0), 800.0);
    chart.apply_viewport(ViewportCommand::ZoomAbout { anchor_px: 400.0, factor: 4.0 });
    chart.reset_zoom(0.0);
    assert!(chart.is_animating());

    chart.handle_input(InputEvent::Wheel { position: BACKGROUND, delta_y: 50.0 }, PointerKind::Mouse, 16.0);
    assert!(!chart.is_animating());
}

#[test]
fn host_requests_serialize_with_a_kind_tag() {
    let json = serde_json::to_string(&HostRequest::OpenUrl { url: "https://example.org".into() }).unwrap();
    assert_eq!(json, r#"{"kind":"openUrl","url":"https://example.org"}"#);
    let json = serde_json::to_string(&HostRequest::ScrollPage { dy: -4.0 }).unwrap();
    assert_eq!(json, r#"{"kind":"scrollPage","dy":-4.0}"#);
}
