use crate::core::isbn::{extract_isbn_from_link, ISBN_COLUMN};
use crate::core::{CatalogTable, ConfigProvider, Pipeline, Record, Storage, TransformResult};
use crate::domain::model::ExtractionStats;
use crate::utils::error::{EtlError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads a catalog CSV, prepends an `isbn` column derived from the link column
/// and writes the result back as BOM-prefixed UTF-8.
pub struct IsbnPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> IsbnPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

pub fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(UTF8_BOM).unwrap_or(data)
}

pub fn parse_catalog(data: &[u8]) -> Result<CatalogTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(strip_bom(data));

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > headers.len() {
            return Err(EtlError::MalformedTable {
                row: idx + 1,
                message: format!(
                    "expected at most {} fields, found {}",
                    headers.len(),
                    record.len()
                ),
            });
        }

        let mut values: Vec<String> = record.iter().map(str::to_string).collect();
        values.resize(headers.len(), String::new());
        rows.push(Record::new(values));
    }

    Ok(CatalogTable::new(headers, rows))
}

pub fn render_catalog(table: &CatalogTable) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(&row.values)?;
    }

    let bytes = writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("failed to flush CSV output: {}", e),
    })?;

    String::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}

/// Builds the output table: `isbn` first, then every other column in its
/// original order. An existing `isbn` column is replaced, not duplicated.
pub fn prepend_isbn_column(
    table: &CatalogTable,
    link_column: &str,
    sample_size: usize,
) -> Result<(CatalogTable, ExtractionStats)> {
    let link_idx = table
        .column_index(link_column)
        .ok_or_else(|| EtlError::MissingColumn {
            column: link_column.to_string(),
            available: table.headers.join(", "),
        })?;
    let existing_isbn = table.column_index(ISBN_COLUMN);

    let mut headers = Vec::with_capacity(table.headers.len() + 1);
    headers.push(ISBN_COLUMN.to_string());
    headers.extend(
        table
            .headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| Some(*idx) != existing_isbn)
            .map(|(_, h)| h.clone()),
    );

    let mut stats = ExtractionStats {
        total_rows: table.len(),
        columns: table.headers.clone(),
        ..Default::default()
    };

    let mut rows = Vec::with_capacity(table.len());
    for row in &table.rows {
        let link = row.values.get(link_idx).map(String::as_str);
        let isbn = extract_isbn_from_link(link);

        if !isbn.is_empty() {
            stats.matched += 1;
            if stats.samples.len() < sample_size {
                stats
                    .samples
                    .push((isbn.clone(), link.unwrap_or_default().to_string()));
            }
        }

        let mut values = Vec::with_capacity(headers.len());
        values.push(isbn);
        values.extend(
            row.values
                .iter()
                .enumerate()
                .filter(|(idx, _)| Some(*idx) != existing_isbn)
                .map(|(_, v)| v.clone()),
        );
        rows.push(Record::new(values));
    }

    Ok((CatalogTable::new(headers, rows), stats))
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for IsbnPipeline<S, C> {
    async fn extract(&self) -> Result<CatalogTable> {
        tracing::debug!("Reading catalog from: {}", self.config.input_path());
        let data = self.storage.read_file(self.config.input_path()).await?;
        tracing::debug!("Read {} bytes", data.len());

        parse_catalog(&data)
    }

    async fn transform(&self, table: CatalogTable) -> Result<TransformResult> {
        let (table, stats) =
            prepend_isbn_column(&table, self.config.link_column(), self.config.sample_size())?;

        tracing::debug!(
            "Extracted {} identifiers from {} rows",
            stats.matched,
            stats.total_rows
        );

        let csv_output = render_catalog(&table)?;

        Ok(TransformResult {
            table,
            csv_output,
            stats,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_path = self.config.output_path();

        let mut data = Vec::with_capacity(UTF8_BOM.len() + result.csv_output.len());
        data.extend_from_slice(UTF8_BOM);
        data.extend_from_slice(result.csv_output.as_bytes());

        tracing::debug!("Writing {} bytes to {}", data.len(), output_path);
        self.storage.write_file(output_path, &data).await?;

        Ok(output_path.to_string())
    }
}
