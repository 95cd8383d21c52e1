use wasm_bindgen::prelude::*;

use crate::domain::logging::{LogComponent, get_logger};

pub mod app;
pub mod application;
pub mod domain;
pub mod event_utils;
pub mod infrastructure;
pub mod presentation;
pub mod view_state;

pub use presentation::MagnitudeChartApi;

/// Installs the browser logger, clock and panic hook.
#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();

    let console_logger = if cfg!(debug_assertions) {
        infrastructure::ConsoleLogger::new_development()
    } else {
        infrastructure::ConsoleLogger::new_production()
    };
    domain::logging::init_logger(Box::new(console_logger));
    domain::logging::init_time_provider(Box::new(infrastructure::BrowserTimeProvider));

    get_logger().info(LogComponent::Presentation("Initialize"), "Magnitude chart initialized");
}

/// Mounts the bundled Leptos page onto `<body>`.
#[wasm_bindgen(js_name = mountApp)]
pub fn mount_app() {
    leptos::mount_to_body(app::App);
}
