//! Catalog aggregate: items, units and dataset ingestion.

pub mod entities;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use repositories::*;
pub use services::*;
pub use value_objects::*;
