use derive_more::Display;

/// Errors raised at the catalog, I/O and rendering boundaries.
///
/// The geometry core never produces these: invalid input is filtered or
/// clamped there instead.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum ChartError {
    #[display(fmt = "Invalid value {} for item '{}'", value, name)]
    InvalidValue { name: String, value: f64 },
    #[display(fmt = "Dataset '{}' has no plottable items", _0)]
    EmptyDataset(String),
    #[display(fmt = "Unknown unit '{}'", _0)]
    UnknownUnit(String),
    #[display(fmt = "Unknown item '{}'", _0)]
    UnknownItem(String),
    #[display(fmt = "Parse Error: {}", _0)]
    Parse(String),
    #[display(fmt = "Network Error: {}", _0)]
    Network(String),
    #[display(fmt = "Rendering Error: {}", _0)]
    Rendering(String),
    #[display(fmt = "Response for load #{} arrived after context moved to #{}", ticket, current)]
    StaleContext { ticket: u64, current: u64 },
}

impl std::error::Error for ChartError {}

impl From<serde_json::Error> for ChartError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

pub type ChartResult<T> = Result<T, ChartError>;
