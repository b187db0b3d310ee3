use book_etl::utils::{logger, validation::Validate};
use book_etl::{CliConfig, EtlEngine, IsbnPipeline, LocalStorage};
use clap::Parser;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting book-etl");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        println!("{}", e.user_friendly_message());
        std::process::exit(1);
    }

    if config.monitor {
        tracing::info!("System monitoring enabled");
    }

    println!("Reading CSV file: {}", config.input);

    let monitor_enabled = config.monitor;
    let storage = LocalStorage::new(".".to_string());
    let pipeline = IsbnPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(_) => {
            println!("Processing completed successfully!");
        }
        Err(e) => {
            tracing::error!(
                "Processing failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

            println!("{}", e.user_friendly_message());
            std::process::exit(1);
        }
    }
}
