pub mod cli;
pub mod site_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_INPUT_FILE: &str = "mondadoristore-ACTUAL.csv";
pub const DEFAULT_OUTPUT_FILE: &str = "mondadoristore-ACTUAL-with-isbn.csv";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "book-etl")]
#[command(about = "Adds an isbn column, derived from product links, to a catalog CSV")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_INPUT_FILE)]
    pub input: String,

    #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output: String,

    #[arg(long, default_value = "link")]
    pub link_column: String,

    #[arg(long, default_value = "5", help = "Number of sample identifiers to print")]
    pub sample_size: usize,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output
    }

    fn link_column(&self) -> &str {
        &self.link_column
    }

    fn sample_size(&self) -> usize {
        self.sample_size
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        validate_path("output", &self.output)?;
        validate_non_empty_string("link_column", &self.link_column)?;
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "isbn-lookup")]
#[command(about = "Looks up one ISBN on the bookstore site and prints the result as JSON")]
pub struct LookupArgs {
    /// ISBN to search for
    pub isbn: String,

    /// Compatibility flag (ignored)
    #[arg(long)]
    pub headless: bool,

    /// TOML file with site settings; stock settings are used when omitted
    #[arg(short, long)]
    pub config: Option<String>,

    /// Answer from built-in sample data instead of the network
    #[arg(long)]
    pub fixture: bool,

    /// Simulated delay for --fixture, in milliseconds
    #[arg(long, default_value = "0")]
    pub fixture_delay_ms: u64,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl Validate for LookupArgs {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("isbn", &self.isbn)?;
        if let Some(path) = &self.config {
            validate_path("config", path)?;
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_extractor_defaults() {
        let config = CliConfig::parse_from(["book-etl"]);

        assert_eq!(config.input_path(), DEFAULT_INPUT_FILE);
        assert_eq!(config.output_path(), DEFAULT_OUTPUT_FILE);
        assert_eq!(config.link_column(), "link");
        assert_eq!(config.sample_size(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_extractor_rejects_blank_link_column() {
        let config = CliConfig::parse_from(["book-etl", "--link-column", " "]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_lookup_args_accept_headless_flag() {
        let args = LookupArgs::parse_from(["isbn-lookup", "9788804660415", "--headless"]);

        assert_eq!(args.isbn, "9788804660415");
        assert!(args.headless);
        assert!(!args.fixture);
        assert!(args.config.is_none());
        assert!(args.validate().is_ok());
    }
}
