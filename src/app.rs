use std::rc::Rc;
use std::str::FromStr;

use leptos::html::Canvas;
use leptos::*;
use strum::IntoEnumIterator;
use wasm_bindgen::JsCast;

use crate::application::{HostRequest, InputEvent, PointerKind};
use crate::domain::chart::{Notation, Point, TooltipView};
use crate::domain::errors::ChartError;
use crate::domain::logging::{LogComponent, get_logger};
use crate::event_utils::{EventOptions, event_listener_with_options, window_event_listener_with_options};
use crate::presentation::MagnitudeChartApi;
use crate::presentation::wasm_api::now_ms;

const CANVAS_ID: &str = "magnitude-canvas";

const STYLE: &str = r#"
.magnitude-app {
    font-family: -apple-system, BlinkMacSystemFont, sans-serif;
    background: #121212;
    min-height: 100vh;
    padding: 20px;
    color: #eeeeee;
}

.controls {
    display: flex;
    gap: 12px;
    align-items: center;
    margin-bottom: 12px;
}

.controls select, .controls button {
    background: #2a2a2a;
    color: #eeeeee;
    border: 1px solid #444444;
    border-radius: 4px;
    padding: 4px 8px;
}

.chart-wrapper {
    position: relative;
    width: 100%;
}

.chart-wrapper canvas {
    display: block;
    width: 100%;
    touch-action: none;
    cursor: grab;
}

.tooltip {
    position: absolute;
    max-width: 260px;
    background: rgba(0, 0, 0, 0.9);
    border: 1px solid #4a5d73;
    border-radius: 6px;
    padding: 8px 12px;
    font-size: 12px;
    line-height: 1.4;
    z-index: 1000;
}

.tooltip img {
    display: block;
    max-width: 100%;
    margin-top: 6px;
}

.tooltip a {
    color: #4fc3f7;
}

.status {
    color: #aaaaaa;
    font-size: 13px;
    margin-top: 8px;
}
"#;

#[derive(Debug, Clone, Copy)]
enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// `(hover, touch)` capability hints from media queries.
fn device_hints() -> (bool, bool) {
    let Some(window) = web_sys::window() else {
        return (true, false);
    };
    let hover = window
        .match_media("(hover: hover)")
        .ok()
        .flatten()
        .map(|query| query.matches())
        .unwrap_or(true);
    let touch = window.navigator().max_touch_points() > 0;
    (hover, touch)
}

fn perform(request: HostRequest) {
    let Some(window) = web_sys::window() else { return };
    match request {
        HostRequest::ScrollPage { dy } => window.scroll_by_with_x_and_y(0.0, dy),
        HostRequest::OpenUrl { url } => {
            if window.open_with_url_and_target(&url, "_blank").is_err() {
                get_logger().warn(LogComponent::Presentation("App"), &format!("Could not open {url}"));
            }
        }
    }
}

fn forward_pointer(chart: &MagnitudeChartApi, ev: &ev::PointerEvent, phase: PointerPhase) {
    let kind = PointerKind::from_str(&ev.pointer_type()).unwrap_or(PointerKind::Mouse);
    let pointer_id = ev.pointer_id();
    let position = Point::new(ev.offset_x() as f64, ev.offset_y() as f64);
    let time_ms = now_ms();
    let event = match phase {
        PointerPhase::Down => {
            // moves and the release keep arriving after the pointer leaves the canvas
            if let Some(canvas) = ev.current_target().and_then(|target| target.dyn_into::<web_sys::Element>().ok()) {
                let _ = canvas.set_pointer_capture(pointer_id);
            }
            let target = chart.with_chart(|chart| chart.hit_test(position));
            InputEvent::Down { pointer_id, position, time_ms, target }
        }
        PointerPhase::Move => {
            let target = chart.with_chart(|chart| chart.hit_test(position));
            InputEvent::Move { pointer_id, position, time_ms, target, pressed: ev.buttons() != 0 }
        }
        PointerPhase::Up => InputEvent::Up { pointer_id, position, time_ms },
        PointerPhase::Cancel => InputEvent::Cancel { pointer_id },
    };
    for request in chart.dispatch(event, kind) {
        perform(request);
    }
}

fn load_dimension(
    chart: Rc<MagnitudeChartApi>,
    dimension: String,
    set_status: WriteSignal<String>,
    set_units: WriteSignal<Vec<String>>,
    set_tooltip: WriteSignal<Option<TooltipView>>,
) {
    spawn_local(async move {
        set_status.set(format!("Loading {dimension}..."));
        match chart.load(dimension.clone()).await {
            Ok(count) => {
                set_units.set(chart.with_chart(|chart| chart.units().iter().map(|unit| unit.symbol.clone()).collect()));
                set_status.set(format!("{dimension}: {count} items"));
                // an open tooltip picks up the image checks that just finished
                set_tooltip.set(chart.with_chart(|chart| chart.current_tooltip()));
            }
            // a newer load owns the status line
            Err(ChartError::StaleContext { .. }) => {}
            Err(err) => {
                get_logger().error(LogComponent::Presentation("App"), &err.to_string());
                set_status.set(err.to_string());
            }
        }
    });
}

#[component]
pub fn App() -> impl IntoView {
    view! {
        <style>{STYLE}</style>
        <div class="magnitude-app">
            <MagnitudeChart dimension="length" />
        </div>
    }
}

/// Canvas chart with unit and notation controls and an item tooltip.
#[component]
fn MagnitudeChart(#[prop(into)] dimension: String) -> impl IntoView {
    let canvas_ref = create_node_ref::<Canvas>();
    let chart = store_value::<Option<Rc<MagnitudeChartApi>>>(None);
    let (status, set_status) = create_signal(String::new());
    let (units, set_units) = create_signal(Vec::<String>::new());
    let (tooltip, set_tooltip) = create_signal::<Option<TooltipView>>(None);

    create_effect(move |_| {
        let Some(canvas) = canvas_ref.get() else { return };
        if chart.with_value(Option::is_some) {
            return;
        }
        let (hover, touch) = device_hints();
        let api = Rc::new(MagnitudeChartApi::new(
            CANVAS_ID.to_string(),
            canvas.client_width() as f64,
            canvas.client_height() as f64,
            hover,
            touch,
        ));
        chart.set_value(Some(Rc::clone(&api)));

        let wheel_target = Rc::clone(&api);
        let wheel = event_listener_with_options(&canvas, ev::wheel, &EventOptions::active(), move |ev| {
            ev.prevent_default();
            let position = Point::new(ev.offset_x() as f64, ev.offset_y() as f64);
            wheel_target.dispatch(InputEvent::Wheel { position, delta_y: ev.delta_y() }, PointerKind::Mouse);
        });
        let resize_target = Rc::clone(&api);
        let resize = window_event_listener_with_options(ev::resize, &EventOptions::default(), move |_| {
            if let Some(canvas) = canvas_ref.get_untracked() {
                resize_target.resize(canvas.client_width() as f64, canvas.client_height() as f64);
            }
        });
        on_cleanup(move || {
            wheel.remove();
            if let Some(resize) = resize {
                resize.remove();
            }
        });

        load_dimension(api, dimension.clone(), set_status, set_units, set_tooltip);
    });

    let pointer = move |phase: PointerPhase| {
        move |ev: ev::PointerEvent| {
            chart.with_value(|chart| {
                if let Some(chart) = chart {
                    forward_pointer(chart, &ev, phase);
                    set_tooltip.set(chart.with_chart(|chart| chart.current_tooltip()));
                }
            });
        }
    };

    let on_unit = move |ev: ev::Event| {
        let symbol = event_target_value(&ev);
        chart.with_value(|chart| {
            if let Some(Err(err)) = chart.as_ref().map(|chart| chart.select_unit(symbol)) {
                set_status.set(err.as_string().unwrap_or_default());
            }
        });
    };

    let on_notation = move |ev: ev::Event| {
        let notation = event_target_value(&ev);
        chart.with_value(|chart| {
            if let Some(chart) = chart {
                let _ = chart.set_notation(notation);
                set_tooltip.set(chart.with_chart(|chart| chart.current_tooltip()));
            }
        });
    };

    let on_reset = move |_| {
        chart.with_value(|chart| {
            if let Some(chart) = chart {
                chart.reset_zoom();
            }
        });
    };

    view! {
        <div class="controls">
            <select on:change=on_unit>
                <For
                    each=move || units.get()
                    key=|symbol| symbol.clone()
                    children=move |symbol| {
                        view! { <option value=symbol.clone()>{symbol}</option> }
                    }
                />
            </select>
            <select on:change=on_notation>
                {Notation::iter()
                    .map(|notation| {
                        let name = notation.to_string();
                        let selected = notation == Notation::default();
                        view! { <option value=name.clone() selected=selected>{name}</option> }
                    })
                    .collect_view()}
            </select>
            <button on:click=on_reset>"Reset zoom"</button>
        </div>
        <div class="chart-wrapper">
            <canvas
                id=CANVAS_ID
                node_ref=canvas_ref
                on:pointerdown=pointer(PointerPhase::Down)
                on:pointermove=pointer(PointerPhase::Move)
                on:pointerup=pointer(PointerPhase::Up)
                on:pointercancel=pointer(PointerPhase::Cancel)
                on:pointerleave=move |ev: ev::PointerEvent| {
                    let kind = PointerKind::from_str(&ev.pointer_type()).unwrap_or(PointerKind::Mouse);
                    chart.with_value(|chart| {
                        if let Some(chart) = chart {
                            chart.dispatch(InputEvent::Leave, kind);
                            set_tooltip.set(chart.with_chart(|chart| chart.current_tooltip()));
                        }
                    });
                }
            />
            {move || {
                tooltip
                    .get()
                    .map(|tip| {
                        let image_src = tip
                            .image_ref
                            .as_deref()
                            .and_then(|image_ref| chart.with_value(|chart| chart.as_ref().map(|chart| chart.image_url(image_ref))));
                        view! {
                            <div
                                class="tooltip"
                                style:left=format!("{}px", tip.placement.position.x)
                                style:top=format!("{}px", tip.placement.position.y)
                            >
                                <strong>{tip.title.clone()}</strong>
                                <div>{tip.value_label.clone()}</div>
                                <p>{tip.description.clone()}</p>
                                {image_src.map(|src| view! { <img src=src alt=tip.title.clone() /> })}
                                {tip
                                    .source_url
                                    .clone()
                                    .map(|url| view! { <a href=url target="_blank">"Source"</a> })}
                            </div>
                        }
                    })
            }}
        </div>
        <div class="status">{move || status.get()}</div>
    }
}
