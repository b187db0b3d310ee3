pub mod etl;
pub mod extraction;
pub mod fixture;
pub mod isbn;
pub mod lookup;
pub mod pipeline;
pub mod session;
pub mod strategy;

pub use crate::domain::model::{CatalogTable, LookupResult, Record, TransformResult};
pub use crate::domain::ports::{ConfigProvider, LookupBackend, Pipeline, Storage};
pub use crate::utils::error::Result;
