use std::collections::HashMap;

use serde::Serialize;

use super::interaction::{ControllerAction, InputEvent, InteractionController, PointerKind};
use crate::domain::catalog::{
    Dataset, DatasetDocument, DimensionId, Item, ItemPatch, LoadTicket, PlottableItem, Unit, ingest,
    resolve_image_ref, sort_by_value, value_extent,
};
use crate::domain::chart::{
    ChartConfig, DeviceProfile, HitRegion, HitTarget, InputMode, LogRange, Notation, NumberFormatter, Point,
    PositionedItem, RenderFrame, Size, TickGenerator, TooltipSide, TooltipView, ViewportCommand, ViewportEngine,
    ViewportState, frame, hit_regions, hit_test, layout, place_tooltip, plot_height,
};
use crate::domain::errors::{ChartError, ChartResult};
use crate::domain::events::{ChartEvent, EventDispatcher, InMemoryEventDispatcher};
use crate::domain::logging::{LogComponent, get_logger};
use crate::view_state::ResetAnimation;
use crate::{log_debug, log_info, log_warn};

/// Requests the coordinator cannot fulfil itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HostRequest {
    ScrollPage { dy: f64 },
    OpenUrl { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingResize {
    size: Size,
    due_ms: f64,
}

/// Owns the single viewport state of a chart and everything derived from it.
///
/// All mutation flows through here: gestures, dataset and unit changes,
/// resizes and async responses. Layout and ticks are recomputed at most once
/// per animation frame.
pub struct ChartCoordinator {
    config: ChartConfig,
    device: DeviceProfile,
    formatter: NumberFormatter,
    engine: ViewportEngine,
    viewport: ViewportState,
    ticks: TickGenerator,
    controller: InteractionController,
    dispatcher: InMemoryEventDispatcher,

    dataset: Option<Dataset>,
    unit_symbol: Option<String>,
    plotted: Vec<PlottableItem>,
    positioned: Vec<PositionedItem>,
    regions: Vec<HitRegion>,

    container: Size,
    tooltip_slot: Option<usize>,
    tooltip_size: Size,
    current_ticket: LoadTicket,
    image_status: HashMap<String, bool>,

    update_pending: bool,
    pending_resize: Option<PendingResize>,
    reset_animation: Option<ResetAnimation>,
}

impl ChartCoordinator {
    pub fn new(config: ChartConfig, device: DeviceProfile, container: Size) -> Self {
        get_logger().info(
            LogComponent::Application("ChartCoordinator"),
            &format!("Creating chart coordinator {}x{} ({})", container.width, container.height, device.input_mode()),
        );
        let engine = ViewportEngine::new(config.clone());
        let viewport = engine.initial(None, container.width);
        Self {
            formatter: NumberFormatter::default(),
            ticks: TickGenerator::new(config.clone()),
            controller: InteractionController::new(config.clone(), device.input_mode()),
            dispatcher: InMemoryEventDispatcher::new(),
            engine,
            viewport,
            config,
            device,
            dataset: None,
            unit_symbol: None,
            plotted: Vec::new(),
            positioned: Vec::new(),
            regions: Vec::new(),
            container,
            tooltip_slot: None,
            tooltip_size: Size::new(180.0, 64.0),
            current_ticket: LoadTicket::default(),
            image_status: HashMap::new(),
            update_pending: false,
            pending_resize: None,
            reset_animation: None,
        }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn events_mut(&mut self) -> &mut InMemoryEventDispatcher {
        &mut self.dispatcher
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn positioned_items(&self) -> &[PositionedItem] {
        &self.positioned
    }

    pub fn plotted_items(&self) -> &[PlottableItem] {
        &self.plotted
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn plot_height(&self) -> f64 {
        plot_height(self.plotted.len(), &self.config)
    }

    // ----- dataset context -----

    /// Starts a new logical context. Responses issued for earlier tickets
    /// are discarded from now on.
    pub fn begin_load(&mut self, dimension: &DimensionId) -> LoadTicket {
        self.current_ticket = self.current_ticket.next();
        log_info!(
            LogComponent::Application("ChartCoordinator"),
            "Loading '{}' as context {}",
            dimension,
            self.current_ticket
        );
        self.current_ticket
    }

    pub fn current_ticket(&self) -> LoadTicket {
        self.current_ticket
    }

    fn ensure_current(&self, ticket: LoadTicket) -> ChartResult<()> {
        if ticket == self.current_ticket {
            return Ok(());
        }
        log_warn!(
            LogComponent::Application("ChartCoordinator"),
            "Discarding response for context {} (current {})",
            ticket,
            self.current_ticket
        );
        self.dispatcher.publish_chart_event(ChartEvent::StaleResponseDiscarded { ticket, current: self.current_ticket });
        Err(ChartError::StaleContext { ticket: ticket.value(), current: self.current_ticket.value() })
    }

    /// Installs a fetched dataset if `ticket` still names the active context.
    pub fn apply_dataset(&mut self, ticket: LoadTicket, mut document: DatasetDocument) -> ChartResult<()> {
        self.ensure_current(ticket)?;
        sort_by_value(&mut document.items);
        let dataset = Dataset::from_document(document);
        let keep_unit = self
            .unit_symbol
            .as_deref()
            .is_some_and(|symbol| dataset.unit(symbol).is_ok());
        if !keep_unit {
            self.unit_symbol = dataset.units().first().map(|unit| unit.symbol.clone());
        }
        let dimension = dataset.dimension().clone();
        self.dataset = Some(dataset);
        self.image_status.clear();
        self.tooltip_slot = None;
        self.controller.clear_tooltip();
        self.refresh_items();

        get_logger().info(
            LogComponent::Application("ChartCoordinator"),
            &format!("Dataset '{}' loaded: {} plottable items", dimension, self.plotted.len()),
        );
        self.dispatcher.publish_chart_event(ChartEvent::DatasetLoaded {
            dimension,
            item_count: self.plotted.len(),
            ticket,
        });
        Ok(())
    }

    pub fn units(&self) -> &[Unit] {
        self.dataset.as_ref().map(|dataset| dataset.units()).unwrap_or(&[])
    }

    pub fn unit_symbol(&self) -> Option<&str> {
        self.unit_symbol.as_deref()
    }

    pub fn select_unit(&mut self, symbol: &str) -> ChartResult<()> {
        let dataset = self.dataset.as_ref().ok_or_else(|| ChartError::UnknownUnit(symbol.to_string()))?;
        let next = dataset.unit(symbol)?;
        let previous = self.unit_symbol.as_deref().and_then(|current| dataset.unit(current).ok());
        if let Some(previous) = previous {
            let ratio = previous.conversion_factor / next.conversion_factor;
            self.viewport = self.engine.rescale(&self.viewport, ratio);
        }
        self.unit_symbol = Some(symbol.to_string());
        self.refresh_items();
        Ok(())
    }

    pub fn notation(&self) -> Notation {
        self.formatter.notation()
    }

    pub fn set_notation(&mut self, notation: Notation) {
        if notation != self.formatter.notation() {
            self.formatter.set_notation(notation);
            self.request_update();
        }
    }

    pub fn formatter(&self) -> &NumberFormatter {
        &self.formatter
    }

    // ----- editing -----

    pub fn add_item(&mut self, item: Item) -> ChartResult<()> {
        self.edit(|dataset| dataset.add_user_item(item))
    }

    pub fn override_item(&mut self, name: &str, patch: ItemPatch) -> ChartResult<()> {
        self.edit(|dataset| dataset.override_item(name, patch))
    }

    pub fn delete_item(&mut self, name: &str) -> ChartResult<()> {
        self.edit(|dataset| dataset.soft_delete(name))
    }

    pub fn restore_item(&mut self, name: &str) -> ChartResult<()> {
        self.edit(|dataset| dataset.restore(name))
    }

    fn edit(&mut self, change: impl FnOnce(&mut Dataset) -> ChartResult<()>) -> ChartResult<()> {
        let dataset = self.dataset.as_mut().ok_or_else(|| ChartError::EmptyDataset(String::new()))?;
        change(dataset)?;
        self.tooltip_slot = None;
        self.controller.clear_tooltip();
        self.refresh_items();
        Ok(())
    }

    /// Re-ingests the active items in the active unit and moves the viewport
    /// onto the new extent.
    fn refresh_items(&mut self) {
        self.plotted = match (&self.dataset, &self.unit_symbol) {
            (Some(dataset), Some(symbol)) => match dataset.unit(symbol) {
                Ok(unit) => ingest(dataset, unit),
                Err(_) => Vec::new(),
            },
            _ => Vec::new(),
        };
        let next = self.engine.set_extent(&self.viewport, value_extent(&self.plotted));
        if next.transform().is_identity() {
            self.reset_animation = None;
        }
        self.replace_viewport(next);
        self.relayout();
        self.request_update();
    }

    // ----- viewport -----

    pub fn apply_viewport(&mut self, command: ViewportCommand) {
        self.reset_animation = None;
        let next = self.engine.reduce(&self.viewport, command);
        self.replace_viewport(next);
    }

    fn replace_viewport(&mut self, next: ViewportState) {
        if next == self.viewport {
            return;
        }
        let old_range = self.viewport.visible_domain();
        self.viewport = next;
        self.request_update();
        self.dispatcher.publish_chart_event(ChartEvent::ViewportChanged {
            old_range,
            new_range: next.visible_domain(),
        });
    }

    /// Animates back to full zoom-out.
    pub fn reset_zoom(&mut self, now_ms: f64) {
        let from = self.viewport.transform();
        if from.is_identity() {
            return;
        }
        if self.config.reset_duration_ms <= 0.0 {
            self.apply_viewport(ViewportCommand::Reset);
            return;
        }
        self.reset_animation = Some(ResetAnimation::new(from, now_ms, self.config.reset_duration_ms));
        self.request_update();
    }

    pub fn is_animating(&self) -> bool {
        self.reset_animation.is_some()
    }

    pub fn visible_domain(&self) -> LogRange {
        self.viewport.visible_domain()
    }

    // ----- input -----

    pub fn set_device(&mut self, device: DeviceProfile) {
        self.device = device;
        self.controller.set_mode(device.input_mode());
        self.ticks.invalidate();
        self.relayout();
        self.request_update();
    }

    pub fn input_mode(&self) -> InputMode {
        self.controller.mode()
    }

    /// Fingers get touch handling and mice get hover handling whatever the
    /// device reports; pens follow the device.
    fn mode_for(&self, kind: PointerKind) -> InputMode {
        match kind {
            PointerKind::Touch => InputMode::Touch,
            PointerKind::Mouse => InputMode::Pointer,
            PointerKind::Pen => self.device.input_mode(),
        }
    }

    /// Switches the controller to the mode of `kind`. Returns `true` when the
    /// mode changed and the hit regions were rebuilt for it.
    fn sync_mode(&mut self, kind: PointerKind) -> bool {
        let mode = self.mode_for(kind);
        if mode == self.controller.mode() {
            return false;
        }
        log_debug!(LogComponent::Application("ChartCoordinator"), "Input mode switched to {}", mode);
        self.controller.set_mode(mode);
        self.regions = hit_regions(&self.positioned, self.plot_height(), mode, &self.config);
        true
    }

    pub fn hit_test(&self, point: Point) -> HitTarget {
        hit_test(&self.regions, point)
    }

    /// Feeds one event through the controller. Between gestures a Down or
    /// Move adopts the mode of its pointer type; its target is then tested
    /// again against the regions of that mode.
    pub fn handle_input(&mut self, mut event: InputEvent, kind: PointerKind, now_ms: f64) -> Vec<HostRequest> {
        if !self.controller.is_gesture_active() {
            if let InputEvent::Down { position, target, .. } | InputEvent::Move { position, target, .. } = &mut event {
                if self.sync_mode(kind) {
                    *target = hit_test(&self.regions, *position);
                }
            }
        }
        let mut requests = Vec::new();
        for action in self.controller.handle(&event) {
            match action {
                ControllerAction::Viewport(command) => self.apply_viewport(command),
                ControllerAction::ScrollPage { dy } => requests.push(HostRequest::ScrollPage { dy }),
                ControllerAction::ShowTooltip { slot } => {
                    self.tooltip_slot = Some(slot);
                    self.request_update();
                }
                ControllerAction::HideTooltip => {
                    if self.tooltip_slot.take().is_some() {
                        self.request_update();
                    }
                }
                ControllerAction::ActivateItem { slot, navigate } => {
                    if let Some(item) = self.item_at(slot).cloned() {
                        log_debug!(
                            LogComponent::Application("ChartCoordinator"),
                            "Item activated: {} (navigate: {})",
                            item.name,
                            navigate
                        );
                        if navigate && !item.source_url.is_empty() {
                            requests.push(HostRequest::OpenUrl { url: item.source_url.clone() });
                        }
                        self.dispatcher.publish_chart_event(ChartEvent::ItemActivated { item, navigate });
                    }
                }
                ControllerAction::ResetZoom => self.reset_zoom(now_ms),
            }
        }
        requests
    }

    fn item_at(&self, slot: usize) -> Option<&Item> {
        self.positioned.iter().find(|placed| placed.vertical_slot == slot).map(|placed| &placed.item)
    }

    pub fn tooltip_slot(&self) -> Option<usize> {
        self.tooltip_slot
    }

    /// Measured tooltip box, used for placement.
    pub fn set_tooltip_size(&mut self, size: Size) {
        self.tooltip_size = size;
    }

    // ----- scheduling -----

    /// Marks the frame dirty. Returns `true` when the caller has to schedule
    /// an animation frame, `false` when one is already pending.
    pub fn request_update(&mut self) -> bool {
        let schedule = !self.update_pending;
        self.update_pending = true;
        schedule
    }

    pub fn update_pending(&self) -> bool {
        self.update_pending
    }

    /// Runs one coalesced update. Returns `None` if nothing was pending.
    ///
    /// While a reset animation runs the update stays pending, so the caller
    /// keeps requesting frames until it finishes.
    pub fn on_animation_frame(&mut self, now_ms: f64) -> Option<RenderFrame> {
        if !self.update_pending {
            return None;
        }
        self.update_pending = false;
        if let Some(animation) = self.reset_animation.clone() {
            let (transform, finished) = animation.sample(now_ms);
            let next = self.engine.reduce(&self.viewport, ViewportCommand::SetTransform(transform));
            self.replace_viewport(next);
            if finished {
                self.reset_animation = None;
            } else {
                self.update_pending = true;
            }
        }
        self.relayout();
        Some(self.frame())
    }

    /// Records a container size; applied once the debounce window elapses.
    /// Returns the time at which [`Self::poll_resize`] should run.
    pub fn on_resize(&mut self, size: Size, now_ms: f64) -> f64 {
        let due_ms = now_ms + self.config.resize_debounce_ms;
        self.pending_resize = Some(PendingResize { size, due_ms });
        due_ms
    }

    /// Applies the last recorded size if its window has elapsed.
    pub fn poll_resize(&mut self, now_ms: f64) -> bool {
        let Some(pending) = self.pending_resize else {
            return false;
        };
        if now_ms < pending.due_ms {
            return false;
        }
        self.pending_resize = None;
        self.resize_now(pending.size);
        true
    }

    pub fn resize_now(&mut self, size: Size) {
        log_debug!(
            LogComponent::Application("ChartCoordinator"),
            "Container resized to {}x{}",
            size.width,
            size.height
        );
        self.container = size;
        self.device.viewport_width = size.width;
        self.apply_viewport(ViewportCommand::Resize { width: size.width });
        self.relayout();
        self.request_update();
    }

    // ----- async side data -----

    /// Image references to check for the current context.
    pub fn image_requests(&self) -> (LoadTicket, Vec<String>) {
        let refs = self
            .dataset
            .as_ref()
            .map(|dataset| {
                dataset
                    .active_items()
                    .map(|item| resolve_image_ref(dataset.dimension(), item))
                    .filter(|image_ref| !self.image_status.contains_key(image_ref))
                    .collect()
            })
            .unwrap_or_default();
        (self.current_ticket, refs)
    }

    pub fn apply_image_status(&mut self, ticket: LoadTicket, image_ref: &str, exists: bool) -> ChartResult<()> {
        self.ensure_current(ticket)?;
        self.image_status.insert(image_ref.to_string(), exists);
        if self.tooltip_slot.is_some() {
            self.request_update();
        }
        Ok(())
    }

    pub fn image_available(&self, image_ref: &str) -> bool {
        self.image_status.get(image_ref).copied().unwrap_or(false)
    }

    // ----- frame -----

    fn relayout(&mut self) {
        let scale = self.viewport.scale();
        self.positioned = layout(&self.plotted, &scale, &self.config);
        self.regions = hit_regions(&self.positioned, self.plot_height(), self.controller.mode(), &self.config);
    }

    /// Describes the current frame.
    pub fn frame(&mut self) -> RenderFrame {
        let scale = self.viewport.scale();
        let visible = self.viewport.visible_domain();
        let ticks = self.ticks.ticks(visible, self.viewport.item_extent(), scale.width(), &self.device);
        let plot_height = self.plot_height();
        RenderFrame {
            width: scale.width(),
            plot_height,
            unit_symbol: self.unit_symbol.clone().unwrap_or_default(),
            transform: self.viewport.transform(),
            visible_domain: visible,
            ticks: frame::tick_marks(&ticks, &scale, &self.formatter),
            items: frame::item_marks(&self.positioned, plot_height, self.tooltip_slot, &self.formatter),
            tooltip: self.tooltip_view(plot_height),
        }
    }

    /// Tooltip for the current selection, if any.
    pub fn current_tooltip(&self) -> Option<TooltipView> {
        self.tooltip_view(self.plot_height())
    }

    fn tooltip_view(&self, plot_height: f64) -> Option<TooltipView> {
        let slot = self.tooltip_slot?;
        let placed = self.positioned.iter().find(|placed| placed.vertical_slot == slot)?;
        let anchor = Point::new(placed.marker_x(), placed.screen_y(plot_height));
        let container = Size::new(self.container.width, plot_height);
        let placement =
            place_tooltip(anchor, self.tooltip_size, TooltipSide::Above, container, self.config.tooltip_margin_px);
        let image_ref = self.dataset.as_ref().map(|dataset| resolve_image_ref(dataset.dimension(), &placed.item));
        Some(TooltipView {
            slot,
            title: placed.item.name.clone(),
            value_label: format!(
                "{} {}",
                self.formatter.format(placed.converted_value),
                self.unit_symbol.as_deref().unwrap_or_default()
            )
            .trim_end()
            .to_string(),
            description: placed.item.description.clone(),
            source_url: Some(placed.item.source_url.clone()).filter(|url| !url.is_empty()),
            image_ref: image_ref.filter(|image_ref| self.image_available(image_ref)),
            placement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::DatasetDocument;

    fn document() -> DatasetDocument {
        DatasetDocument {
            dimension: DimensionId::from("length"),
            units: vec![Unit::base("m"), Unit::new("kilometre", "km", 1000.0)],
            items: vec![
                Item::new("Everest", 8848.0).with_source("https://example.org/everest"),
                Item::new("Proton", 1.7e-15),
                Item::new("Sun", 1.39e9),
            ],
        }
    }

    fn loaded() -> ChartCoordinator {
        let mut chart = ChartCoordinator::new(ChartConfig::default(), DeviceProfile::desktop(1024.0), Size::new(800.0, 400.0));
        let ticket = chart.begin_load(&DimensionId::from("length"));
        chart.apply_dataset(ticket, document()).unwrap();
        chart
    }

    #[test]
    fn stale_dataset_is_discarded() {
        let mut chart = loaded();
        let old = chart.current_ticket();
        let fresh = chart.begin_load(&DimensionId::from("time"));
        assert!(matches!(chart.apply_dataset(old, document()), Err(ChartError::StaleContext { .. })));
        assert_eq!(chart.current_ticket(), fresh);
        assert_eq!(chart.plotted_items().len(), 3);
    }

    #[test]
    fn updates_coalesce_per_frame() {
        let mut chart = loaded();
        chart.on_animation_frame(0.0);
        assert!(chart.request_update());
        assert!(!chart.request_update());
        assert!(chart.on_animation_frame(16.0).is_some());
        assert!(chart.on_animation_frame(32.0).is_none());
    }

    #[test]
    fn resize_is_debounced() {
        let mut chart = loaded();
        chart.on_resize(Size::new(500.0, 400.0), 0.0);
        chart.on_resize(Size::new(600.0, 400.0), 100.0);
        assert!(!chart.poll_resize(200.0));
        assert!(chart.poll_resize(250.0));
        assert_eq!(chart.container().width, 600.0);
        assert_eq!(chart.viewport().width(), 600.0);
    }

    #[test]
    fn unit_switch_keeps_zoom() {
        let mut chart = loaded();
        chart.apply_viewport(ViewportCommand::ZoomAbout { anchor_px: 400.0, factor: 2.0 });
        let before = chart.viewport().transform();
        let domain = chart.visible_domain();
        chart.select_unit("km").unwrap();
        assert_eq!(chart.viewport().transform(), before);
        assert!((chart.visible_domain().min - (domain.min - 3.0)).abs() < 1e-9);
        assert!(matches!(chart.select_unit("ly"), Err(ChartError::UnknownUnit(_))));
    }

    #[test]
    fn image_result_refreshes_open_tooltip() {
        let mut chart = loaded();
        let hover = InputEvent::Move {
            pointer_id: 1,
            position: Point::new(0.0, 0.0),
            time_ms: 0.0,
            target: HitTarget::Item { slot: 1, role: crate::domain::chart::HitRole::ItemMarker },
            pressed: false,
        };
        chart.handle_input(hover, PointerKind::Mouse, 0.0);
        chart.on_animation_frame(16.0);
        let shown = chart.current_tooltip().expect("hovered item has a tooltip");
        assert_eq!(shown.image_ref, None);

        let (ticket, refs) = chart.image_requests();
        for image_ref in &refs {
            chart.apply_image_status(ticket, image_ref, true).unwrap();
        }
        assert!(chart.update_pending());
        let refreshed = chart.on_animation_frame(32.0).and_then(|frame| frame.tooltip).expect("tooltip in frame");
        assert_eq!(refreshed.slot, shown.slot);
        assert!(refreshed.image_ref.is_some());
        assert_eq!(chart.current_tooltip(), Some(refreshed));
    }

    #[test]
    fn reset_animation_runs_to_identity() {
        let mut chart = loaded();
        chart.apply_viewport(ViewportCommand::ZoomAbout { anchor_px: 400.0, factor: 4.0 });
        chart.on_animation_frame(0.0);
        chart.reset_zoom(0.0);
        assert!(chart.is_animating());
        chart.on_animation_frame(250.0);
        assert!(chart.update_pending());
        chart.on_animation_frame(600.0);
        assert!(!chart.is_animating());
        assert!(chart.viewport().transform().is_identity());
    }
}
