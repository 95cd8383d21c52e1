use std::future::Future;

use gloo::net::http::Request;

use crate::domain::catalog::{DatasetDocument, DatasetSource, DimensionId};
use crate::domain::errors::{ChartError, ChartResult};
use crate::domain::logging::{LogComponent, get_logger};

/// Dataset source served as static JSON next to the page.
///
/// Datasets live at `{base_url}/{dimension}.json`, images at
/// `{image_base_url}/{image_ref}`.
#[derive(Debug, Clone)]
pub struct HttpDatasetSource {
    base_url: String,
    image_base_url: String,
}

impl Default for HttpDatasetSource {
    fn default() -> Self {
        Self::new("data", "images")
    }
}

impl HttpDatasetSource {
    pub fn new(base_url: impl Into<String>, image_base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), image_base_url: image_base_url.into() }
    }

    pub fn dataset_url(&self, dimension: &DimensionId) -> String {
        format!("{}/{}.json", self.base_url.trim_end_matches('/'), dimension)
    }

    pub fn image_url(&self, image_ref: &str) -> String {
        format!("{}/{}", self.image_base_url.trim_end_matches('/'), image_ref)
    }

    async fn fetch(&self, dimension: DimensionId) -> ChartResult<DatasetDocument> {
        let url = self.dataset_url(&dimension);
        get_logger().info(LogComponent::Infrastructure("HttpDatasetSource"), &format!("📡 GET {url}"));

        let response = Request::get(&url)
            .send()
            .await
            .map_err(|e| ChartError::Network(format!("Failed to send request: {e:?}")))?;

        if !response.ok() {
            return Err(ChartError::Network(format!(
                "HTTP error: {} - {}",
                response.status(),
                response.status_text()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ChartError::Network(format!("Failed to read body: {e:?}")))?;
        let mut document = DatasetDocument::from_json(&body)?;
        if document.dimension.value().is_empty() {
            document.dimension = dimension;
        }

        get_logger().info(
            LogComponent::Infrastructure("HttpDatasetSource"),
            &format!("✅ {} items, {} units from {url}", document.items.len(), document.units.len()),
        );
        Ok(document)
    }

    async fn check_image(&self, image_ref: String) -> bool {
        let url = self.image_url(&image_ref);
        match Request::get(&url).send().await {
            Ok(response) => response.ok(),
            Err(e) => {
                get_logger().debug(
                    LogComponent::Infrastructure("HttpDatasetSource"),
                    &format!("Image check failed for {url}: {e:?}"),
                );
                false
            }
        }
    }
}

impl DatasetSource for HttpDatasetSource {
    fn fetch_dataset(&self, dimension: &DimensionId) -> impl Future<Output = ChartResult<DatasetDocument>> {
        self.fetch(dimension.clone())
    }

    fn image_exists(&self, image_ref: &str) -> impl Future<Output = bool> {
        self.check_image(image_ref.to_string())
    }
}
