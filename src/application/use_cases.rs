use std::cell::RefCell;

use futures::future::join_all;

use super::coordinator::ChartCoordinator;
use crate::domain::catalog::{DatasetSource, DimensionId};
use crate::domain::errors::{ChartError, ChartResult};
use crate::domain::logging::{LogComponent, get_logger};

/// Use Case: fetch a dimension's dataset and install it.
///
/// The coordinator is borrowed only around the synchronous steps, never
/// across an await, so input keeps flowing while the request is in flight.
pub struct LoadDatasetUseCase<S: DatasetSource> {
    source: S,
}

impl<S: DatasetSource> LoadDatasetUseCase<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Returns the number of plottable items, or `StaleContext` if another
    /// load started while this one was in flight.
    pub async fn execute(&self, chart: &RefCell<ChartCoordinator>, dimension: DimensionId) -> ChartResult<usize> {
        let ticket = chart.borrow_mut().begin_load(&dimension);
        let document = match self.source.fetch_dataset(&dimension).await {
            Ok(document) => document,
            Err(err) => {
                if chart.borrow().current_ticket() == ticket {
                    get_logger().error(
                        LogComponent::Application("LoadDataset"),
                        &format!("Failed to load '{}': {}", dimension, err),
                    );
                }
                return Err(err);
            }
        };
        let mut chart = chart.borrow_mut();
        chart.apply_dataset(ticket, document)?;
        Ok(chart.plotted_items().len())
    }
}

/// Use Case: check optional item images for the current context.
pub struct CheckImagesUseCase<S: DatasetSource> {
    source: S,
}

impl<S: DatasetSource> CheckImagesUseCase<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Checks every image concurrently and returns how many exist. Results
    /// that arrive after the context changed are dropped as a whole.
    pub async fn execute(&self, chart: &RefCell<ChartCoordinator>) -> ChartResult<usize> {
        let (ticket, refs) = chart.borrow().image_requests();
        let checks = refs.iter().map(|image_ref| self.source.image_exists(image_ref));
        let results = join_all(checks).await;

        let mut chart = chart.borrow_mut();
        let mut found = 0;
        for (image_ref, exists) in refs.iter().zip(results) {
            match chart.apply_image_status(ticket, image_ref, exists) {
                Ok(()) => found += usize::from(exists),
                Err(err @ ChartError::StaleContext { .. }) => return Err(err),
                Err(err) => {
                    get_logger().warn(LogComponent::Application("CheckImages"), &err.to_string());
                }
            }
        }
        Ok(found)
    }
}
