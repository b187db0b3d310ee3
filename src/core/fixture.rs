use crate::domain::model::LookupResult;
use crate::domain::ports::LookupBackend;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBook {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub pages: String,
    pub edition_year: String,
    pub description: String,
    pub isbn: String,
}

impl SampleBook {
    fn known(isbn: &str) -> Option<Self> {
        let (title, author, publisher, pages, year, description) = match isbn {
            "9788804660415" => (
                "Il Nome della Rosa",
                "Umberto Eco",
                "Bompiani",
                "503",
                "2014",
                "Un romanzo storico ambientato in un monastero medievale, dove avvengono misteriosi omicidi.",
            ),
            "9788817050289" => (
                "Se questo è un uomo",
                "Primo Levi",
                "Einaudi",
                "208",
                "2014",
                "Testimonianza dell'esperienza nei campi di concentramento nazisti.",
            ),
            _ => return None,
        };

        Some(Self {
            title: title.to_string(),
            author: author.to_string(),
            publisher: publisher.to_string(),
            pages: pages.to_string(),
            edition_year: year.to_string(),
            description: description.to_string(),
            isbn: isbn.to_string(),
        })
    }

    fn generic(isbn: &str) -> Self {
        Self {
            title: format!("Sample Book for ISBN {}", isbn),
            author: "Sample Author".to_string(),
            publisher: "Sample Publisher".to_string(),
            pages: "200".to_string(),
            edition_year: "2023".to_string(),
            description: format!(
                "This is a sample book description for ISBN {}. This book contains interesting content about various topics.",
                isbn
            ),
            isbn: isbn.to_string(),
        }
    }

    pub fn for_isbn(isbn: &str) -> Self {
        Self::known(isbn).unwrap_or_else(|| Self::generic(isbn))
    }

    fn to_html(&self) -> String {
        format!(
            r#"<div class="boxproddetail pdpboxproddetail">
    <h1>{}</h1>
    <div class="author">Autore: {}</div>
    <div class="publisher">Editore: {}</div>
    <div class="pages">Pagine: {}</div>
    <div class="year">Anno: {}</div>
    <div class="isbn">ISBN: {}</div>
    <div class="description">
        <p>{}</p>
    </div>
</div>"#,
            self.title,
            self.author,
            self.publisher,
            self.pages,
            self.edition_year,
            self.isbn,
            self.description
        )
    }

    fn summary(&self) -> String {
        format!(
            "{} di {} - {} - {} pagine - {} - {}",
            self.title, self.author, self.publisher, self.pages, self.edition_year, self.description
        )
    }
}

/// Offline backend returning canned product pages, for testing callers
/// without touching the network.
pub struct FixtureLookup {
    base_url: String,
    delay: Duration,
}

impl FixtureLookup {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            delay: Duration::ZERO,
        }
    }

    /// Simulated response time before each result.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn product_url(&self, isbn: &str) -> String {
        match Url::parse(&self.base_url).and_then(|base| base.join(&format!("libro/{}", isbn))) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}/libro/{}", self.base_url.trim_end_matches('/'), isbn),
        }
    }
}

#[async_trait]
impl LookupBackend for FixtureLookup {
    async fn lookup(&self, isbn: &str) -> Result<LookupResult> {
        tracing::info!("Fixture lookup for ISBN: {}", isbn);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let book = SampleBook::for_isbn(isbn);
        let url = self.product_url(isbn);
        let mut result = LookupResult::found(book.to_html(), book.summary(), &url, isbn);

        let fields = [
            ("title", &book.title),
            ("author", &book.author),
            ("publisher", &book.publisher),
            ("pages", &book.pages),
            ("edition_year", &book.edition_year),
            ("description", &book.description),
        ];
        for (key, value) in fields {
            result
                .structured_data
                .insert(key.to_string(), Value::String(value.clone()));
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::site_config::{ExtractionSection, DEFAULT_BASE_URL};
    use crate::core::extraction::ContentExtractor;

    #[tokio::test]
    async fn test_known_book() {
        let backend = FixtureLookup::new(DEFAULT_BASE_URL);

        let result = backend.lookup("9788804660415").await.unwrap();

        assert!(result.found);
        assert_eq!(result.structured_data["title"], "Il Nome della Rosa");
        assert_eq!(result.structured_data["author"], "Umberto Eco");
        assert_eq!(
            result.url(),
            Some("https://www.libraccio.it/libro/9788804660415")
        );
        assert!(result.text.starts_with("Il Nome della Rosa di Umberto Eco - Bompiani"));
    }

    #[tokio::test]
    async fn test_unknown_book_gets_generic_sample() {
        let backend = FixtureLookup::new("http://localhost:8080");

        let result = backend.lookup("9780000000001").await.unwrap();

        assert!(result.found);
        assert_eq!(
            result.structured_data["title"],
            "Sample Book for ISBN 9780000000001"
        );
        assert_eq!(result.structured_data["isbn"], "9780000000001");
        assert_eq!(result.url(), Some("http://localhost:8080/libro/9780000000001"));
    }

    #[tokio::test]
    async fn test_fixture_markup_matches_live_selectors() {
        let backend = FixtureLookup::new(DEFAULT_BASE_URL);
        let result = backend.lookup("9788817050289").await.unwrap();
        let page = format!("<html><body>{}</body></html>", result.html);

        let extractor = ContentExtractor::from_config(&ExtractionSection::default()).unwrap();
        let extracted = extractor.extract(&page, "9788817050289", "https://example.test/");

        assert!(extracted.found);
        assert!(extracted.text.contains("Se questo è un uomo"));
    }
}
