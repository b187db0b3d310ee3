use book_etl::config::site_config::SiteConfig;
use book_etl::core::LookupBackend;
use book_etl::utils::{logger, validation::Validate};
use book_etl::{lookup_guarded, FixtureLookup, LiveLookup, LookupArgs, LookupResult};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

fn build_backend(args: &LookupArgs) -> book_etl::Result<Arc<dyn LookupBackend>> {
    args.validate()?;

    let config = match &args.config {
        Some(path) => {
            tracing::info!("Loading site settings from: {}", path);
            SiteConfig::from_file(path)?
        }
        None => SiteConfig::default(),
    };
    config.validate()?;

    if args.fixture {
        let backend = FixtureLookup::new(config.site.base_url.clone())
            .with_delay(Duration::from_millis(args.fixture_delay_ms));
        return Ok(Arc::new(backend));
    }

    Ok(Arc::new(LiveLookup::new(config)?))
}

#[tokio::main]
async fn main() {
    let args = LookupArgs::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("Starting Libraccio lookup for ISBN: {}", args.isbn);

    let result = match build_backend(&args) {
        Ok(backend) => lookup_guarded(backend, args.isbn.clone()).await,
        Err(e) => {
            tracing::error!("{}", e);
            tracing::error!("Suggestion: {}", e.recovery_suggestion());
            LookupResult::error(format!("Script error: {}", e))
        }
    };

    match result.to_json_pretty() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!("Failed to serialize result: {}", e);
            println!(
                "{}",
                serde_json::json!({
                    "found": false,
                    "html": "",
                    "text": "",
                    "structured_data": { "error": format!("Script error: {}", e) },
                })
            );
        }
    }
}
