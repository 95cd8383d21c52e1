use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use std::str::FromStr;

use gloo::utils::format::JsValueSerdeExt;
use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::application::{
    ChartCoordinator, CheckImagesUseCase, HostRequest, InputEvent, LoadDatasetUseCase, PointerKind,
};
use crate::domain::catalog::{DimensionId, Item, ItemPatch};
use crate::domain::chart::{
    ChartConfig, DeviceProfile, Notation, Point, RenderFrame, Size, TooltipSide, place_tooltip,
};
use crate::domain::errors::{ChartError, ChartResult};
use crate::domain::events::ChartEvent;
use crate::domain::logging::{LogComponent, get_logger};
use crate::infrastructure::rendering::{CanvasRenderer, Theme};
use crate::infrastructure::{Debouncer, FrameScheduler, HttpDatasetSource};

fn js_error(err: ChartError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

pub(crate) fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Shared pieces a frame callback needs.
#[derive(Clone)]
struct FrameLoop {
    chart: Rc<RefCell<ChartCoordinator>>,
    renderer: Rc<RefCell<Option<CanvasRenderer>>>,
    frames: FrameScheduler,
}

impl FrameLoop {
    /// Schedules a frame if the chart has pending work.
    fn ensure_frame(&self) {
        if !self.chart.borrow().update_pending() {
            return;
        }
        let this = self.clone();
        self.frames.request(move |timestamp| this.run(timestamp));
    }

    fn run(&self, timestamp: f64) {
        let frame = self.chart.borrow_mut().on_animation_frame(timestamp);
        if let (Some(frame), Some(renderer)) = (frame, self.renderer.borrow().as_ref()) {
            if let Err(err) = renderer.render(&frame) {
                get_logger().error(LogComponent::Presentation("MagnitudeChartApi"), &err.to_string());
            }
        }
        self.ensure_frame();
    }
}

/// JavaScript entry point for embedding a chart.
#[wasm_bindgen]
pub struct MagnitudeChartApi {
    frame_loop: FrameLoop,
    source: HttpDatasetSource,
    resize: Debouncer,
    activations: Rc<RefCell<Vec<(Item, bool)>>>,
    on_activate: Option<Function>,
}

#[wasm_bindgen]
impl MagnitudeChartApi {
    /// Creates a chart bound to the canvas `canvas_id`. Without a canvas the
    /// chart still runs and frames are available through `frameJson`.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: String, width: f64, height: f64, hover: bool, touch: bool) -> Self {
        let config = ChartConfig::default();
        let resize = Debouncer::new(config.resize_debounce_ms as u32);
        let device = DeviceProfile::new(hover, touch, width);
        let mut chart = ChartCoordinator::new(config, device, Size::new(width, height));
        // delivered after the coordinator borrow ends so callbacks may call back in
        let activations = Rc::new(RefCell::new(Vec::new()));
        let queue = Rc::clone(&activations);
        chart.events_mut().subscribe_to_chart_events(move |event| {
            if let ChartEvent::ItemActivated { item, navigate } = event {
                queue.borrow_mut().push((item.clone(), *navigate));
            }
        });
        let renderer = match CanvasRenderer::from_element_id(&canvas_id, Theme::default()) {
            Ok(renderer) => Some(renderer),
            Err(err) => {
                get_logger().warn(LogComponent::Presentation("MagnitudeChartApi"), &err.to_string());
                None
            }
        };
        Self {
            frame_loop: FrameLoop {
                chart: Rc::new(RefCell::new(chart)),
                renderer: Rc::new(RefCell::new(renderer)),
                frames: FrameScheduler::new(),
            },
            source: HttpDatasetSource::default(),
            resize,
            activations,
            on_activate: None,
        }
    }

    /// Overrides where datasets and images are fetched from.
    #[wasm_bindgen(js_name = setSources)]
    pub fn set_sources(&mut self, data_url: String, image_url: String) {
        self.source = HttpDatasetSource::new(data_url, image_url);
    }

    /// Loads a dimension; resolves with the number of plotted items. A load
    /// superseded by a later one rejects with a stale-context error.
    #[wasm_bindgen(js_name = loadDimension)]
    pub fn load_dimension(&self, dimension: String) -> Promise {
        let load = self.load(dimension);
        future_to_promise(async move {
            let count = load.await.map_err(js_error)?;
            Ok(JsValue::from_f64(count as f64))
        })
    }

    #[wasm_bindgen(js_name = selectUnit)]
    pub fn select_unit(&self, symbol: String) -> Result<(), JsValue> {
        self.mutate(|chart| chart.select_unit(&symbol))
    }

    /// `scientific`, `mathematical` or `human`.
    #[wasm_bindgen(js_name = setNotation)]
    pub fn set_notation(&self, notation: String) -> Result<(), JsValue> {
        let notation = Notation::from_str(&notation)
            .map_err(|_| JsValue::from_str(&format!("Unknown notation '{notation}'")))?;
        self.mutate(|chart| {
            chart.set_notation(notation);
            Ok(())
        })
    }

    /// `dark` or `light`.
    #[wasm_bindgen(js_name = setTheme)]
    pub fn set_theme(&self, theme: String) -> Result<(), JsValue> {
        let theme = match theme.as_str() {
            "dark" => Theme::dark(),
            "light" => Theme::light(),
            other => return Err(JsValue::from_str(&format!("Unknown theme '{other}'"))),
        };
        if let Some(renderer) = self.frame_loop.renderer.borrow_mut().as_mut() {
            renderer.set_theme(theme);
        }
        self.mutate(|chart| {
            chart.request_update();
            Ok(())
        })
    }

    /// Capability hints changed, e.g. a tablet keyboard with a trackpad was
    /// attached.
    #[wasm_bindgen(js_name = setDeviceHints)]
    pub fn set_device_hints(&self, hover: bool, touch: bool) -> Result<(), JsValue> {
        self.mutate(|chart| {
            let device = DeviceProfile::new(hover, touch, chart.container().width);
            chart.set_device(device);
            Ok(())
        })
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&self, pointer_id: i32, pointer_type: String, x: f64, y: f64) -> Result<JsValue, JsValue> {
        let position = Point::new(x, y);
        let target = self.frame_loop.chart.borrow().hit_test(position);
        self.input(InputEvent::Down { pointer_id, position, time_ms: now_ms(), target }, &pointer_type)
    }

    /// `buttons` is the event's `PointerEvent.buttons` mask.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(
        &self,
        pointer_id: i32,
        pointer_type: String,
        x: f64,
        y: f64,
        buttons: u16,
    ) -> Result<JsValue, JsValue> {
        let position = Point::new(x, y);
        let target = self.frame_loop.chart.borrow().hit_test(position);
        let event = InputEvent::Move { pointer_id, position, time_ms: now_ms(), target, pressed: buttons != 0 };
        self.input(event, &pointer_type)
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&self, pointer_id: i32, pointer_type: String, x: f64, y: f64) -> Result<JsValue, JsValue> {
        self.input(InputEvent::Up { pointer_id, position: Point::new(x, y), time_ms: now_ms() }, &pointer_type)
    }

    #[wasm_bindgen(js_name = pointerCancel)]
    pub fn pointer_cancel(&self, pointer_id: i32, pointer_type: String) -> Result<JsValue, JsValue> {
        self.input(InputEvent::Cancel { pointer_id }, &pointer_type)
    }

    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&self, pointer_type: String) -> Result<JsValue, JsValue> {
        self.input(InputEvent::Leave, &pointer_type)
    }

    pub fn wheel(&self, x: f64, y: f64, delta_y: f64) -> Result<JsValue, JsValue> {
        self.input(InputEvent::Wheel { position: Point::new(x, y), delta_y }, "mouse")
    }

    pub fn pinch(&self, center_x: f64, center_y: f64, scale_ratio: f64) -> Result<JsValue, JsValue> {
        self.input(InputEvent::Pinch { center: Point::new(center_x, center_y), scale_ratio }, "touch")
    }

    #[wasm_bindgen(js_name = resetZoom)]
    pub fn reset_zoom(&self) {
        let _ = self.mutate(|chart| {
            chart.reset_zoom(now_ms());
            Ok(())
        });
    }

    /// Debounced container resize.
    pub fn resize(&self, width: f64, height: f64) {
        let size = Size::new(width, height);
        let due_ms = self.frame_loop.chart.borrow_mut().on_resize(size, now_ms());
        let frame_loop = self.frame_loop.clone();
        // the timer already waited out the quiet window
        self.resize.submit(move || {
            if frame_loop.chart.borrow_mut().poll_resize(due_ms) {
                frame_loop.ensure_frame();
            }
        });
    }

    #[wasm_bindgen(js_name = setTooltipSize)]
    pub fn set_tooltip_size(&self, width: f64, height: f64) {
        let _ = self.mutate(|chart| {
            chart.set_tooltip_size(Size::new(width, height));
            chart.request_update();
            Ok(())
        });
    }

    /// Clamped tooltip origin for an anchor, as `{ position: {x, y}, side }`.
    #[wasm_bindgen(js_name = placeTooltip)]
    pub fn place_tooltip(&self, x: f64, y: f64, width: f64, height: f64, side: String) -> Result<JsValue, JsValue> {
        let side = TooltipSide::from_str(&side).unwrap_or_default();
        let chart = self.frame_loop.chart.borrow();
        let container = Size::new(chart.container().width, chart.plot_height());
        let placement =
            place_tooltip(Point::new(x, y), Size::new(width, height), side, container, chart.config().tooltip_margin_px);
        JsValue::from_serde(&placement).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Current render description as JSON.
    #[wasm_bindgen(js_name = frameJson)]
    pub fn frame_json(&self) -> Result<String, JsValue> {
        self.frame().to_json().map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Adds a user item from `{ name, value, description?, source?, image? }`.
    #[wasm_bindgen(js_name = addItem)]
    pub fn add_item(&self, json: String) -> Result<(), JsValue> {
        let item: Item = serde_json::from_str(&json).map_err(|e| js_error(e.into()))?;
        self.mutate(|chart| chart.add_item(item))
    }

    #[wasm_bindgen(js_name = overrideItem)]
    pub fn override_item(&self, name: String, patch_json: String) -> Result<(), JsValue> {
        let patch: ItemPatch = serde_json::from_str(&patch_json).map_err(|e| js_error(e.into()))?;
        self.mutate(|chart| chart.override_item(&name, patch))
    }

    #[wasm_bindgen(js_name = deleteItem)]
    pub fn delete_item(&self, name: String) -> Result<(), JsValue> {
        self.mutate(|chart| chart.delete_item(&name))
    }

    #[wasm_bindgen(js_name = restoreItem)]
    pub fn restore_item(&self, name: String) -> Result<(), JsValue> {
        self.mutate(|chart| chart.restore_item(&name))
    }

    /// Registers `callback(item, navigate)` for taps and clicks on items.
    #[wasm_bindgen(js_name = onItemActivated)]
    pub fn on_item_activated(&mut self, callback: Function) {
        self.on_activate = Some(callback);
    }
}

impl MagnitudeChartApi {
    fn mutate(&self, change: impl FnOnce(&mut ChartCoordinator) -> Result<(), ChartError>) -> Result<(), JsValue> {
        let result = change(&mut self.frame_loop.chart.borrow_mut());
        self.frame_loop.ensure_frame();
        result.map_err(js_error)
    }

    /// Fetches a dimension, installs it, then checks its images.
    pub fn load(&self, dimension: String) -> impl Future<Output = ChartResult<usize>> + use<> {
        let frame_loop = self.frame_loop.clone();
        let source = self.source.clone();
        let dimension = DimensionId::new(dimension);
        async move {
            let count = LoadDatasetUseCase::new(source.clone()).execute(&frame_loop.chart, dimension).await?;
            frame_loop.ensure_frame();

            if let Err(err) = CheckImagesUseCase::new(source).execute(&frame_loop.chart).await {
                get_logger().debug(LogComponent::Presentation("MagnitudeChartApi"), &err.to_string());
            }
            frame_loop.ensure_frame();
            Ok(count)
        }
    }

    /// Feeds one input event through the controller and returns what the
    /// host page has to do.
    pub fn dispatch(&self, event: InputEvent, kind: PointerKind) -> Vec<HostRequest> {
        let requests = self.frame_loop.chart.borrow_mut().handle_input(event, kind, now_ms());
        self.frame_loop.ensure_frame();
        self.deliver_activations();
        requests
    }

    /// Where the host loads an image reference from.
    pub fn image_url(&self, image_ref: &str) -> String {
        self.source.image_url(image_ref)
    }

    pub fn frame(&self) -> RenderFrame {
        self.frame_loop.chart.borrow_mut().frame()
    }

    pub fn with_chart<R>(&self, read: impl FnOnce(&ChartCoordinator) -> R) -> R {
        read(&self.frame_loop.chart.borrow())
    }

    fn input(&self, event: InputEvent, pointer_type: &str) -> Result<JsValue, JsValue> {
        let kind = PointerKind::from_str(pointer_type).unwrap_or(PointerKind::Mouse);
        let requests = self.dispatch(event, kind);
        JsValue::from_serde(&requests).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    fn deliver_activations(&self) {
        let pending: Vec<_> = self.activations.borrow_mut().drain(..).collect();
        let Some(callback) = &self.on_activate else { return };
        for (item, navigate) in pending {
            let payload = JsValue::from_serde(&item).unwrap_or(JsValue::NULL);
            if let Err(err) = callback.call2(&JsValue::NULL, &payload, &JsValue::from_bool(navigate)) {
                get_logger().warn(LogComponent::Presentation("MagnitudeChartApi"), &format!("{err:?}"));
            }
        }
    }
}
