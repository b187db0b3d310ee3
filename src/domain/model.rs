use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::error::Result;

/// One catalog record; values are stored in the owning table's header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub values: Vec<String>,
}

impl Record {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogTable {
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
}

impl CatalogTable {
    pub fn new(headers: Vec<String>, rows: Vec<Record>) -> Self {
        Self { headers, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionStats {
    pub total_rows: usize,
    pub matched: usize,
    pub columns: Vec<String>,
    /// `(isbn, link)` pairs for the first few matching rows.
    pub samples: Vec<(String, String)>,
}

impl ExtractionStats {
    /// Percentage of rows that yielded an identifier; 0.0 for an empty table.
    pub fn match_rate(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            self.matched as f64 / self.total_rows as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub table: CatalogTable,
    pub csv_output: String,
    pub stats: ExtractionStats,
}

/// The single JSON object the lookup helper prints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    pub found: bool,
    pub html: String,
    pub text: String,
    pub structured_data: Map<String, Value>,
}

impl LookupResult {
    pub fn found(html: String, text: String, url: &str, isbn: &str) -> Self {
        let mut structured_data = Map::new();
        structured_data.insert("url".to_string(), Value::String(url.to_string()));
        structured_data.insert("isbn".to_string(), Value::String(isbn.to_string()));
        Self {
            found: true,
            html,
            text,
            structured_data,
        }
    }

    /// A page was fetched but held nothing that looks like a product.
    pub fn no_content(url: &str) -> Self {
        let mut result = Self::error("No book content found");
        result
            .structured_data
            .insert("url".to_string(), Value::String(url.to_string()));
        result
    }

    pub fn error(message: impl Into<String>) -> Self {
        let mut structured_data = Map::new();
        structured_data.insert("error".to_string(), Value::String(message.into()));
        Self {
            found: false,
            html: String::new(),
            text: String::new(),
            structured_data,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.structured_data.get("error").and_then(Value::as_str)
    }

    pub fn url(&self) -> Option<&str> {
        self.structured_data.get("url").and_then(Value::as_str)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
