use crate::config::site_config::{FormSection, SiteConfig};
use crate::core::session::SiteSession;
use crate::domain::model::LookupResult;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// One way of asking the site for a product page.
#[async_trait]
pub trait LookupStrategy: Send + Sync {
    fn describe(&self) -> String;

    /// Whether a failed attempt is worth a warning. Guesses fail quietly.
    fn reports_failures(&self) -> bool {
        true
    }

    async fn attempt(&self, session: &SiteSession, isbn: &str) -> Result<Option<LookupResult>>;
}

/// `GET <base>/<path>?<param>=<isbn>`
pub struct QuerySearch {
    path: String,
    param: String,
    timeout: Duration,
}

impl QuerySearch {
    pub fn new(path: impl Into<String>, param: impl Into<String>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            param: param.into(),
            timeout,
        }
    }

    pub fn url(&self, base: &Url, isbn: &str) -> Result<Url> {
        let mut url = join(base, &self.path)?;
        url.query_pairs_mut().append_pair(&self.param, isbn);
        Ok(url)
    }
}

#[async_trait]
impl LookupStrategy for QuerySearch {
    fn describe(&self) -> String {
        format!("search {}?{}=", self.path, self.param)
    }

    async fn attempt(&self, session: &SiteSession, isbn: &str) -> Result<Option<LookupResult>> {
        let url = self.url(session.base_url(), isbn)?;
        tracing::info!("Trying search URL: {}", url);

        let request = session.client().get(url).timeout(self.timeout);
        session.fetch_and_extract(request, isbn).await
    }
}

/// Replays the site's search form: hidden state fields plus the identifier,
/// posted to the site root.
pub struct FormSubmission {
    form: FormSection,
    timeout: Duration,
}

impl FormSubmission {
    pub fn new(form: FormSection, timeout: Duration) -> Self {
        Self { form, timeout }
    }

    pub fn form_fields(&self, session: &SiteSession, isbn: &str) -> Option<Vec<(String, String)>> {
        let state = session.form_state()?;

        let mut fields = state.fields.clone();
        fields.push((self.form.search_field.clone(), isbn.to_string()));
        fields.push((self.form.submit_field.clone(), self.form.submit_value.clone()));
        Some(fields)
    }
}

#[async_trait]
impl LookupStrategy for FormSubmission {
    fn describe(&self) -> String {
        format!("form submission '{}'", self.form.name)
    }

    async fn attempt(&self, session: &SiteSession, isbn: &str) -> Result<Option<LookupResult>> {
        let Some(fields) = self.form_fields(session, isbn) else {
            tracing::info!("No form state captured, skipping form submission");
            return Ok(None);
        };

        tracing::info!("Trying form submission approach");
        let request = session
            .client()
            .post(session.base_url().clone())
            .form(&fields)
            .timeout(self.timeout);
        session.fetch_and_extract(request, isbn).await
    }
}

/// `GET <base>/<prefix>/<isbn>`
pub struct DirectPath {
    prefix: String,
    timeout: Duration,
}

impl DirectPath {
    pub fn new(prefix: impl Into<String>, timeout: Duration) -> Self {
        Self {
            prefix: prefix.into(),
            timeout,
        }
    }

    pub fn url(&self, base: &Url, isbn: &str) -> Result<Url> {
        let mut url = join(base, &self.prefix)?;
        url.path_segments_mut()
            .map_err(|_| EtlError::ConfigError {
                message: format!("base URL {} cannot hold a path", base),
            })?
            .pop_if_empty()
            .push(isbn);
        Ok(url)
    }
}

#[async_trait]
impl LookupStrategy for DirectPath {
    fn describe(&self) -> String {
        format!("direct path {}/", self.prefix)
    }

    fn reports_failures(&self) -> bool {
        false
    }

    async fn attempt(&self, session: &SiteSession, isbn: &str) -> Result<Option<LookupResult>> {
        let url = self.url(session.base_url(), isbn)?;
        tracing::debug!("Trying direct URL: {}", url);

        let request = session.client().get(url).timeout(self.timeout);
        session.fetch_and_extract(request, isbn).await
    }
}

fn join(base: &Url, path: &str) -> Result<Url> {
    base.join(path).map_err(|e| EtlError::ConfigError {
        message: format!("cannot join '{}' onto {}: {}", path, base, e),
    })
}

/// Query searches, then the form, then direct path guesses.
pub fn build_strategies(config: &SiteConfig) -> Vec<Box<dyn LookupStrategy>> {
    let mut strategies: Vec<Box<dyn LookupStrategy>> = Vec::new();

    for path in &config.search.query_paths {
        strategies.push(Box::new(QuerySearch::new(
            path.as_str(),
            config.search.query_param.as_str(),
            config.request_timeout(),
        )));
    }

    strategies.push(Box::new(FormSubmission::new(
        config.form.clone(),
        config.request_timeout(),
    )));

    for prefix in &config.search.direct_path_prefixes {
        strategies.push(Box::new(DirectPath::new(prefix.as_str(), config.direct_timeout())));
    }

    strategies
}
