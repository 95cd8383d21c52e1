#![cfg(target_arch = "wasm32")]

use std::time::Duration;

use gloo_timers::future::sleep;
use magnitude_chart_wasm::MagnitudeChartApi;
use magnitude_chart_wasm::application::ChartCoordinator;
use magnitude_chart_wasm::domain::catalog::{DatasetDocument, DimensionId, Item, Unit};
use magnitude_chart_wasm::domain::chart::{ChartConfig, DeviceProfile, Size};
use magnitude_chart_wasm::infrastructure::rendering::{CanvasRenderer, Theme};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlCanvasElement;
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

fn mount_canvas(id: &str) -> HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas: HtmlCanvasElement = document.create_element("canvas").unwrap().dyn_into().unwrap();
    canvas.set_id(id);
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

#[wasm_bindgen_test]
fn draws_a_loaded_frame() {
    let canvas = mount_canvas("renderer-smoke");
    let renderer = CanvasRenderer::new(canvas.clone(), Theme::light()).unwrap();

    let mut chart = ChartCoordinator::new(ChartConfig::default(), DeviceProfile::desktop(800.0), Size::new(800.0, 480.0));
    let dimension = DimensionId::from("length");
    let ticket = chart.begin_load(&dimension);
    chart
        .apply_dataset(
            ticket,
            DatasetDocument {
                dimension,
                units: vec![Unit::base("m")],
                items: vec![Item::new("Ant", 0.004), Item::new("Tower", 330.0)],
            },
        )
        .unwrap();

    let frame = chart.frame();
    assert_eq!(frame.items.len(), 2);
    renderer.render(&frame).unwrap();

    let ratio = web_sys::window().unwrap().device_pixel_ratio();
    assert_eq!(canvas.width(), (800.0 * ratio).round() as u32);
}

#[wasm_bindgen_test]
fn display_height_follows_the_bitmap() {
    let canvas = mount_canvas("renderer-height");
    canvas.style().set_property("height", "480px").unwrap();
    let renderer = CanvasRenderer::new(canvas.clone(), Theme::dark()).unwrap();

    let mut chart = ChartCoordinator::new(ChartConfig::default(), DeviceProfile::desktop(800.0), Size::new(800.0, 480.0));
    let dimension = DimensionId::from("length");
    let ticket = chart.begin_load(&dimension);
    let items = vec![Item::new("Cell", 1e-5), Item::new("Whale", 30.0), Item::new("Moon", 3.4e6)];
    chart.apply_dataset(ticket, DatasetDocument { dimension, units: vec![Unit::base("m")], items }).unwrap();
    renderer.render(&chart.frame()).unwrap();

    // one CSS pixel per plot pixel, so pointer offsets hit what was drawn
    let ratio = web_sys::window().unwrap().device_pixel_ratio();
    let drawn = canvas.height() as f64 / ratio;
    assert!(drawn < 480.0);
    assert!((canvas.client_height() as f64 - drawn).abs() <= 1.0, "{} vs {drawn}", canvas.client_height());
}

#[wasm_bindgen_test]
fn missing_canvas_still_produces_frames() {
    let api = MagnitudeChartApi::new("no-such-canvas".into(), 640.0, 400.0, true, false);
    let frame = api.frame();
    assert_eq!(frame.width, 640.0);
    assert!(frame.items.is_empty());
}

#[wasm_bindgen_test(async)]
async fn resize_applies_after_the_quiet_window() {
    mount_canvas("resize-smoke");
    let api = MagnitudeChartApi::new("resize-smoke".into(), 800.0, 480.0, true, false);

    api.resize(700.0, 480.0);
    api.resize(600.0, 480.0);
    assert_eq!(api.with_chart(|chart| chart.container().width), 800.0);

    sleep(Duration::from_millis(400)).await;
    assert_eq!(api.with_chart(|chart| chart.container().width), 600.0);
    assert_eq!(api.frame().width, 600.0);
}
