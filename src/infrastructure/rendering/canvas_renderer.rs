use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::domain::chart::{ItemMark, RenderFrame, TickMark};
use crate::domain::errors::{ChartError, ChartResult};
use crate::domain::logging::{LogComponent, get_logger};

/// Colors applied by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: String,
    pub grid: String,
    pub axis_text: String,
    pub marker: String,
    pub marker_highlight: String,
    pub label: String,
    pub font: String,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            background: "#1a1a1a".into(),
            grid: "#333333".into(),
            axis_text: "#aaaaaa".into(),
            marker: "#4fc3f7".into(),
            marker_highlight: "#ffb74d".into(),
            label: "#eeeeee".into(),
            font: "12px sans-serif".into(),
        }
    }

    pub fn light() -> Self {
        Self {
            background: "#ffffff".into(),
            grid: "#e0e0e0".into(),
            axis_text: "#555555".into(),
            marker: "#1976d2".into(),
            marker_highlight: "#e65100".into(),
            label: "#212121".into(),
            font: "12px sans-serif".into(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

const MARKER_RADIUS: f64 = 4.0;
const AXIS_BAND_PX: f64 = 24.0;

/// Canvas 2D renderer for a [`RenderFrame`].
pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    theme: Theme,
    pixel_ratio: f64,
}

impl CanvasRenderer {
    pub fn new(canvas: HtmlCanvasElement, theme: Theme) -> ChartResult<Self> {
        let context = canvas
            .get_context("2d")
            .map_err(|_| ChartError::Rendering("Failed to get 2D context".into()))?
            .ok_or_else(|| ChartError::Rendering("2D context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| ChartError::Rendering("Failed to cast to 2D context".into()))?;
        let pixel_ratio = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
        Ok(Self { canvas, context, theme, pixel_ratio })
    }

    /// Looks a canvas up by element id.
    pub fn from_element_id(canvas_id: &str, theme: Theme) -> ChartResult<Self> {
        let canvas = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(canvas_id))
            .ok_or_else(|| ChartError::Rendering(format!("Canvas '{canvas_id}' not found")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| ChartError::Rendering(format!("Element '{canvas_id}' is not a canvas")))?;
        Self::new(canvas, theme)
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn render(&self, frame: &RenderFrame) -> ChartResult<()> {
        let width = frame.width;
        let height = frame.plot_height + AXIS_BAND_PX;
        self.resize_backing_store(width, height);

        let ctx = &self.context;
        ctx.set_transform(self.pixel_ratio, 0.0, 0.0, self.pixel_ratio, 0.0, 0.0)
            .map_err(|_| ChartError::Rendering("Failed to set transform".into()))?;
        ctx.set_fill_style_str(&self.theme.background);
        ctx.fill_rect(0.0, 0.0, width, height);
        ctx.set_font(&self.theme.font);

        self.render_ticks(&frame.ticks, frame.plot_height)?;
        self.render_items(&frame.items)?;

        get_logger().trace(
            LogComponent::Infrastructure("CanvasRenderer"),
            &format!("Frame drawn: {} items, {} ticks", frame.items.len(), frame.ticks.len()),
        );
        Ok(())
    }

    /// Sizes the backing store in device pixels and the element box in CSS
    /// pixels, so pointer offsets land in the same space as the frame.
    fn resize_backing_store(&self, width: f64, height: f64) {
        let css_height = format!("{height}px");
        let style = self.canvas.style();
        if style.get_property_value("height").ok().as_deref() != Some(css_height.as_str()) {
            let _ = style.set_property("height", &css_height);
        }
        let backing_w = (width * self.pixel_ratio).round().max(0.0) as u32;
        let backing_h = (height * self.pixel_ratio).round().max(0.0) as u32;
        if self.canvas.width() != backing_w {
            self.canvas.set_width(backing_w);
        }
        if self.canvas.height() != backing_h {
            self.canvas.set_height(backing_h);
        }
    }

    fn render_ticks(&self, ticks: &[TickMark], plot_height: f64) -> ChartResult<()> {
        let ctx = &self.context;
        ctx.set_stroke_style_str(&self.theme.grid);
        ctx.set_line_width(1.0);
        ctx.set_text_align("center");
        ctx.set_text_baseline("top");
        ctx.set_fill_style_str(&self.theme.axis_text);
        for tick in ticks {
            let x = tick.x_px.round() + 0.5;
            ctx.begin_path();
            ctx.move_to(x, 0.0);
            ctx.line_to(x, plot_height);
            ctx.stroke();
            ctx.fill_text(&tick.label, tick.x_px, plot_height + 6.0)
                .map_err(|_| ChartError::Rendering("Failed to draw tick label".into()))?;
        }
        Ok(())
    }

    fn render_items(&self, items: &[ItemMark]) -> ChartResult<()> {
        let ctx = &self.context;
        ctx.set_text_align("right");
        ctx.set_text_baseline("middle");
        for item in items {
            let color = if item.highlighted { &self.theme.marker_highlight } else { &self.theme.marker };
            ctx.set_fill_style_str(color);
            ctx.begin_path();
            ctx.arc(item.x_px, item.y_px, MARKER_RADIUS, 0.0, std::f64::consts::TAU)
                .map_err(|_| ChartError::Rendering("Failed to draw marker".into()))?;
            ctx.fill();

            ctx.set_fill_style_str(&self.theme.label);
            ctx.fill_text(&item.name, item.x_px - MARKER_RADIUS - 2.0, item.y_px)
                .map_err(|_| ChartError::Rendering("Failed to draw item label".into()))?;
        }
        Ok(())
    }
}
