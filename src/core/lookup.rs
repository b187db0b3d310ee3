use crate::config::site_config::SiteConfig;
use crate::core::extraction::ContentExtractor;
use crate::core::session::SiteSession;
use crate::core::strategy::{build_strategies, LookupStrategy};
use crate::domain::model::LookupResult;
use crate::domain::ports::LookupBackend;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Queries the live bookstore over HTTP.
pub struct LiveLookup {
    config: SiteConfig,
    extractor: ContentExtractor,
}

impl LiveLookup {
    pub fn new(config: SiteConfig) -> Result<Self> {
        let extractor = ContentExtractor::from_config(&config.extraction)?;
        Ok(Self { config, extractor })
    }
}

#[async_trait]
impl LookupBackend for LiveLookup {
    async fn lookup(&self, isbn: &str) -> Result<LookupResult> {
        tracing::info!("Searching for ISBN: {}", isbn);

        let session = SiteSession::bootstrap(&self.config, self.extractor.clone()).await?;
        let strategies = build_strategies(&self.config);

        Ok(run_strategies(&session, &strategies, isbn).await)
    }
}

/// Tries each strategy in order and returns the first found result.
/// A failing strategy never stops the ones after it.
pub async fn run_strategies(
    session: &SiteSession,
    strategies: &[Box<dyn LookupStrategy>],
    isbn: &str,
) -> LookupResult {
    for strategy in strategies {
        match strategy.attempt(session, isbn).await {
            Ok(Some(result)) => return result,
            Ok(None) => tracing::debug!("No result from {}", strategy.describe()),
            Err(e) if strategy.reports_failures() => {
                tracing::warn!("Error with {}: {}", strategy.describe(), e)
            }
            Err(e) => tracing::debug!("{} failed: {}", strategy.describe(), e),
        }
    }

    LookupResult::error(format!("No book found for ISBN {}", isbn))
}

/// Runs a lookup on its own task so that neither an error nor a panic can
/// escape; both come back as a not-found result.
pub async fn lookup_guarded(backend: Arc<dyn LookupBackend>, isbn: String) -> LookupResult {
    let task = tokio::spawn(async move { backend.lookup(&isbn).await });

    match task.await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            tracing::error!("Lookup failed: {}", e);
            LookupResult::error(format!("Script error: {}", e))
        }
        Err(e) => {
            tracing::error!("Lookup task aborted: {}", e);
            LookupResult::error(format!("Script error: {}", e))
        }
    }
}
