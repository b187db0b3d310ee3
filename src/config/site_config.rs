use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.libraccio.it/";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Everything the lookup helper knows about the bookstore it queries.
///
/// Every field has a default, so an empty TOML document (or no file at all)
/// yields the settings for the stock site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub site: SiteSection,
    pub search: SearchSection,
    pub form: FormSection,
    pub extraction: ExtractionSection,
    pub timeouts: TimeoutSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    pub base_url: String,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_string(),
            accept_language: "it-IT,it;q=0.8,en-US;q=0.5,en;q=0.3".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    /// Pages queried as `<base>/<path>?<query_param>=<isbn>`.
    pub query_paths: Vec<String>,
    pub query_param: String,
    /// Pages guessed as `<base>/<prefix>/<isbn>`.
    pub direct_path_prefixes: Vec<String>,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            query_paths: to_strings(&["ricerca.aspx", "libri.aspx", "search.aspx"]),
            query_param: "q".to_string(),
            direct_path_prefixes: to_strings(&["libro", "libri", "prodotto"]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSection {
    pub name: String,
    pub hidden_fields: Vec<String>,
    pub search_field: String,
    pub submit_field: String,
    pub submit_value: String,
}

impl Default for FormSection {
    fn default() -> Self {
        Self {
            name: "aspnetForm".to_string(),
            hidden_fields: to_strings(&["__VIEWSTATE", "__VIEWSTATEGENERATOR", "__EVENTVALIDATION"]),
            search_field: "ctl00$ctl00$C$Search1$cg2".to_string(),
            submit_field: "ctl00$ctl00$C$Search1$MainSearch".to_string(),
            submit_value: "Search".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSection {
    /// CSS selectors for product containers, most specific first.
    pub selectors: Vec<String>,
    /// Text around the identifier must be strictly longer than this (in chars).
    pub min_text_len: usize,
    /// Lowercase keywords that mark site chrome rather than product content.
    pub nav_keywords: Vec<String>,
}

impl Default for ExtractionSection {
    fn default() -> Self {
        Self {
            selectors: to_strings(&[
                "div.boxproddetail.pdpboxproddetail",
                "div.boxproddetail",
                "div.pdpboxproddetail",
                "div.product-detail",
                "div.book-info",
                "div.libro-dettaglio",
                ".product-info",
                ".book-detail",
                "div.scheda-prodotto",
                "div.dettaglio-libro",
                "section.product-details",
            ]),
            min_text_len: 200,
            nav_keywords: to_strings(&[
                "menu",
                "navigation",
                "navbar",
                "header",
                "footer",
                "sidebar",
                "architettura e urbanistica",
                "arte e fotografia",
                "bambini e ragazzi",
            ]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSection {
    pub request_secs: u64,
    pub direct_secs: u64,
}

impl Default for TimeoutSection {
    fn default() -> Self {
        Self {
            request_secs: 15,
            direct_secs: 10,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl SiteConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex is valid"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// Site with a different root but otherwise stock settings.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.site.base_url = base_url.into();
        config
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.request_secs)
    }

    pub fn direct_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.direct_secs)
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        validate_url("site.base_url", &self.site.base_url)?;
        validate_non_empty_string("site.user_agent", &self.site.user_agent)?;
        validate_non_empty_string("search.query_param", &self.search.query_param)?;
        validate_non_empty_string("form.search_field", &self.form.search_field)?;
        validate_positive_number("extraction.min_text_len", self.extraction.min_text_len, 1)?;
        validate_range("timeouts.request_secs", self.timeouts.request_secs, 1, 120)?;
        validate_range("timeouts.direct_secs", self.timeouts.direct_secs, 1, 120)?;

        if self.extraction.selectors.is_empty() {
            return Err(EtlError::ConfigValidationError {
                field: "extraction.selectors".to_string(),
                message: "at least one selector is required".to_string(),
            });
        }
        for selector in &self.extraction.selectors {
            scraper::Selector::parse(selector).map_err(|e| EtlError::InvalidConfigValueError {
                field: "extraction.selectors".to_string(),
                value: selector.clone(),
                reason: e.to_string(),
            })?;
        }

        Ok(())
    }
}
