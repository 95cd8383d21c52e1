pub mod http;
pub mod rendering;
pub mod scheduling;
pub mod services;

pub use http::HttpDatasetSource;
pub use scheduling::{Debouncer, FrameScheduler};
pub use services::{BrowserTimeProvider, ConsoleLogger};
