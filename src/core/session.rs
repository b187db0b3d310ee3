use crate::config::site_config::{FormSection, SiteConfig};
use crate::core::extraction::ContentExtractor;
use crate::domain::model::LookupResult;
use crate::utils::error::{EtlError, Result};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, DNT, UPGRADE_INSECURE_REQUESTS,
};
use reqwest::{Client, RequestBuilder};
use scraper::{Html, Selector};
use url::Url;

/// Hidden inputs of the site's search form, in the configured order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub fields: Vec<(String, String)>,
}

/// One HTTP session against the bookstore, used for a single lookup.
pub struct SiteSession {
    client: Client,
    base_url: Url,
    form_state: Option<FormState>,
    extractor: ContentExtractor,
}

impl SiteSession {
    /// Builds the browser-like client and fetches the landing page.
    ///
    /// A landing page that cannot be fetched or has no search form only
    /// disables the form strategy; the session is still usable.
    pub async fn bootstrap(config: &SiteConfig, extractor: ContentExtractor) -> Result<Self> {
        let mut session = Self::new(config, extractor)?;

        tracing::info!("Getting main page...");
        match session.fetch_landing(config).await {
            Ok(Some(state)) => {
                tracing::debug!("Captured {} hidden form fields", state.fields.len());
                session.form_state = Some(state);
            }
            Ok(None) => tracing::warn!("Could not find main form '{}'", config.form.name),
            Err(e) => tracing::warn!("Main page unavailable: {}", e),
        }

        Ok(session)
    }

    /// Session without a landing-page visit.
    pub fn new(config: &SiteConfig, extractor: ContentExtractor) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            base_url: normalize_base_url(&config.site.base_url)?,
            form_state: None,
            extractor,
        })
    }

    async fn fetch_landing(&self, config: &SiteConfig) -> Result<Option<FormState>> {
        let response = self
            .client
            .get(self.base_url.clone())
            .timeout(config.request_timeout())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EtlError::HttpStatus {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let body = response.text().await?;
        Ok(parse_form_state(&body, &config.form))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn form_state(&self) -> Option<&FormState> {
        self.form_state.as_ref()
    }

    pub fn with_form_state(mut self, state: FormState) -> Self {
        self.form_state = Some(state);
        self
    }

    /// Sends `request` and runs extraction on a successful response.
    ///
    /// `Ok(None)` means the page loaded but held no product content.
    pub async fn fetch_and_extract(
        &self,
        request: RequestBuilder,
        isbn: &str,
    ) -> Result<Option<LookupResult>> {
        let response = request.send().await?;
        let status = response.status();
        let resolved_url = response.url().to_string();

        if !status.is_success() {
            return Err(EtlError::HttpStatus {
                status: status.as_u16(),
                url: resolved_url,
            });
        }

        let body = response.text().await?;
        let result = self.extractor.extract(&body, isbn, &resolved_url);
        if result.found {
            Ok(Some(result))
        } else {
            tracing::debug!("No product content at {}", resolved_url);
            Ok(None)
        }
    }
}

fn build_client(config: &SiteConfig) -> Result<Client> {
    let header = |field: &str, value: &str| {
        HeaderValue::from_str(value).map_err(|e| EtlError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
    };

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, header("site.accept", &config.site.accept)?);
    headers.insert(
        ACCEPT_LANGUAGE,
        header("site.accept_language", &config.site.accept_language)?,
    );
    headers.insert(DNT, HeaderValue::from_static("1"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

    let client = Client::builder()
        .user_agent(config.site.user_agent.as_str())
        .default_headers(headers)
        .cookie_store(true)
        .build()?;

    Ok(client)
}

/// Parses the base URL, making sure relative joins stay under it.
pub fn normalize_base_url(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url).map_err(|e| EtlError::InvalidConfigValueError {
        field: "site.base_url".to_string(),
        value: base_url.to_string(),
        reason: e.to_string(),
    })?;

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Reads the form's hidden inputs. `None` when the named form is absent; a
/// missing individual input is captured as an empty value. Inputs are matched
/// page-wide since some pages render them outside the form element.
pub fn parse_form_state(html: &str, form: &FormSection) -> Option<FormState> {
    let document = Html::parse_document(html);

    let form_selector = Selector::parse("form").ok()?;
    let has_form = document
        .select(&form_selector)
        .any(|el| el.value().attr("name") == Some(form.name.as_str()));
    if !has_form {
        return None;
    }

    let input_selector = Selector::parse("input").ok()?;
    let fields = form
        .hidden_fields
        .iter()
        .map(|name| {
            let value = document
                .select(&input_selector)
                .find(|el| el.value().attr("name") == Some(name.as_str()))
                .and_then(|el| el.value().attr("value"))
                .unwrap_or_default();
            (name.clone(), value.to_string())
        })
        .collect();

    Some(FormState { fields })
}
