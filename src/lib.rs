pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::cli::LocalStorage;
pub use crate::config::site_config::SiteConfig;
#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, LookupArgs};

pub use crate::core::{
    etl::EtlEngine,
    fixture::FixtureLookup,
    lookup::{lookup_guarded, LiveLookup},
    pipeline::IsbnPipeline,
};
pub use crate::domain::model::LookupResult;
pub use crate::utils::error::{EtlError, Result};
