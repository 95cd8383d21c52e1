use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Value Object - strictly positive, finite magnitude that can be plotted on a log axis.
#[derive(Debug, Clone, Copy, PartialEq, Into, Serialize)]
pub struct Magnitude(f64);

impl Magnitude {
    /// Returns `None` for zero, negative, infinite and NaN values.
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn log10(&self) -> f64 {
        self.0.log10()
    }
}

impl PartialOrd for Magnitude {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.0.total_cmp(&other.0))
    }
}

/// Value Object - dataset key such as `length` or `energy`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, From, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionId(String);

impl DimensionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DimensionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Value Object - monotonically increasing identity of a loaded dataset context.
///
/// Async responses carry the ticket they were issued with; a response whose
/// ticket no longer matches the active one is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Display)]
#[display(fmt = "#{}", _0)]
pub struct LoadTicket(pub(crate) u64);

impl LoadTicket {
    pub fn value(&self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}
