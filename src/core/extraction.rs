use crate::config::site_config::ExtractionSection;
use crate::domain::model::LookupResult;
use crate::utils::error::{EtlError, Result};
use scraper::{ElementRef, Html, Selector};

/// Tags the text-proximity fallback treats as content blocks.
const BLOCK_TAGS: &[&str] = &["div", "section", "article"];

/// Tags whose text never renders.
const HIDDEN_TAGS: &[&str] = &["script", "style", "template"];

/// A compiled CSS selector describing one kind of product container.
#[derive(Debug, Clone)]
pub struct ElementMatcher {
    css: String,
    selector: Selector,
}

impl ElementMatcher {
    pub fn parse(css: &str) -> Result<Self> {
        let selector = Selector::parse(css).map_err(|e| EtlError::InvalidConfigValueError {
            field: "extraction.selectors".to_string(),
            value: css.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            css: css.to_string(),
            selector,
        })
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    /// First matching element in document order.
    pub fn find<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        document.select(&self.selector).next()
    }
}

/// Locates the product-detail fragment of a fetched page.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    matchers: Vec<ElementMatcher>,
    min_text_len: usize,
    nav_keywords: Vec<String>,
}

impl ContentExtractor {
    pub fn from_config(config: &ExtractionSection) -> Result<Self> {
        let matchers = config
            .selectors
            .iter()
            .map(|css| ElementMatcher::parse(css))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            matchers,
            min_text_len: config.min_text_len,
            nav_keywords: config
                .nav_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
        })
    }

    /// Runs the selector cascade, then the text-proximity fallback.
    pub fn extract(&self, html: &str, isbn: &str, url: &str) -> LookupResult {
        let document = Html::parse_document(html);

        for matcher in &self.matchers {
            if let Some(element) = matcher.find(&document) {
                tracing::info!("Found product info with selector: {}", matcher.css());
                return LookupResult::found(element.html(), flatten_text(element), url, isbn);
            }
        }

        if let Some(block) = self.find_block_near_identifier(&document, isbn) {
            tracing::info!("Found ISBN in substantial content, extracting parent element");
            let text = flatten_text(block);
            return LookupResult::found(block.html(), text, url, isbn);
        }

        LookupResult::no_content(url)
    }

    fn find_block_near_identifier<'a>(&self, document: &'a Html, isbn: &str) -> Option<ElementRef<'a>> {
        if isbn.is_empty() {
            return None;
        }

        for node in document.root_element().descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            if !text.contains(isbn) {
                continue;
            }

            // only the nearest block is considered for each occurrence
            let Some(block) = node
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|el| BLOCK_TAGS.contains(&el.value().name()))
            else {
                continue;
            };

            if self.is_product_content(&flatten_text(block)) {
                return Some(block);
            }
        }

        None
    }

    fn is_product_content(&self, text: &str) -> bool {
        if text.chars().count() <= self.min_text_len {
            return false;
        }

        let lowered = text.to_lowercase();
        !self.nav_keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

/// Visible text of an element: every rendered text node trimmed, empty ones
/// dropped, concatenated without separators.
pub fn flatten_text(element: ElementRef<'_>) -> String {
    element
        .descendants()
        .filter(|node| {
            !node
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|el| HIDDEN_TAGS.contains(&el.value().name()))
        })
        .filter_map(|node| node.value().as_text().map(|text| text.trim()))
        .filter(|s| !s.is_empty())
        .collect()
}
