//! Corpus loading: CSV parsing, text-column selection and empty-row filtering.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info};

use ragrank_core::config::PipelineConfig;
use ragrank_core::constants::TEXT_COLUMN_KEYWORDS;
use ragrank_core::errors::{CorpusError, RagResult};
use ragrank_core::models::Document;

/// A parsed CSV file. Short rows are padded with empty fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Picks the column to embed when none is configured.
pub trait ColumnSelector: Send + Sync {
    /// Index into `table.headers`, or `None` when no column qualifies.
    fn select(&self, table: &CsvTable) -> Option<usize>;
}

/// First header containing one of the text keywords (case-insensitive),
/// else the column with the largest mean value length.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordColumnSelector;

impl ColumnSelector for KeywordColumnSelector {
    fn select(&self, table: &CsvTable) -> Option<usize> {
        let by_keyword = table.headers.iter().position(|h| {
            let lower = h.to_lowercase();
            TEXT_COLUMN_KEYWORDS.iter().any(|k| lower.contains(k))
        });
        if by_keyword.is_some() {
            return by_keyword;
        }

        let rows = table.rows.len().max(1) as f64;
        (0..table.headers.len())
            .map(|col| {
                let total: usize = table
                    .rows
                    .iter()
                    .map(|r| r.get(col).map_or(0, |v| v.chars().count()))
                    .sum();
                (col, total as f64 / rows)
            })
            // Strictly greater keeps the first column on ties.
            .fold(None, |best: Option<(usize, f64)>, (col, mean)| match best {
                Some((_, m)) if m >= mean => best,
                _ => Some((col, mean)),
            })
            .map(|(col, _)| col)
    }
}

/// Read a headed CSV file.
pub fn read_csv(path: &Path) -> RagResult<CsvTable> {
    let path_str = path.display().to_string();
    let csv_error = |e: csv::Error| -> CorpusError {
        if e.is_io_error() {
            CorpusError::Io {
                path: path_str.clone(),
                reason: e.to_string(),
            }
        } else {
            CorpusError::Csv {
                path: path_str.clone(),
                reason: e.to_string(),
            }
        }
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }
    debug!(path = %path_str, columns = headers.len(), rows = rows.len(), "CSV read");
    Ok(CsvTable { headers, rows })
}

/// Turn a table into the indexable corpus.
///
/// Rows with empty or whitespace-only text are dropped. `row_id` is the
/// position among the surviving rows, `source_row` the position in the file.
/// Every other column becomes metadata.
pub fn documents_from_table(
    table: &CsvTable,
    text_column: Option<&str>,
    selector: &dyn ColumnSelector,
    max_documents: Option<usize>,
) -> RagResult<Vec<Document>> {
    let column = match text_column {
        Some(name) => table.headers.iter().position(|h| h == name).ok_or_else(|| {
            CorpusError::MissingColumn {
                column: name.to_string(),
                available: table.headers.clone(),
            }
        })?,
        None => selector.select(table).ok_or(CorpusError::Empty)?,
    };

    let limit = max_documents.unwrap_or(usize::MAX);
    let documents: Vec<Document> = table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.get(column).is_some_and(|t| !t.trim().is_empty()))
        .take(limit)
        .enumerate()
        .map(|(row_id, (source_row, row))| {
            let metadata: BTreeMap<String, String> = table
                .headers
                .iter()
                .zip(row)
                .enumerate()
                .filter(|(i, _)| *i != column)
                .map(|(_, (h, v))| (h.clone(), v.clone()))
                .collect();
            Document {
                row_id,
                source_row,
                text: row[column].clone(),
                metadata,
            }
        })
        .collect();

    if documents.is_empty() {
        return Err(CorpusError::Empty.into());
    }
    info!(
        column = %table.headers[column],
        kept = documents.len(),
        dropped = table.rows.len() - documents.len(),
        "corpus loaded"
    );
    Ok(documents)
}

/// Read and filter a CSV corpus according to `config`.
pub fn load_corpus(path: &Path, config: &PipelineConfig, selector: &dyn ColumnSelector) -> RagResult<Vec<Document>> {
    let table = read_csv(path)?;
    documents_from_table(&table, config.text_column.as_deref(), selector, config.max_documents)
}

/// Drop empty documents from an in-memory corpus, renumber row ids and apply
/// the document cap.
pub fn normalize_documents(documents: Vec<Document>, max_documents: Option<usize>) -> RagResult<Vec<Document>> {
    let documents: Vec<Document> = documents
        .into_iter()
        .filter(Document::has_text)
        .take(max_documents.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(row_id, mut doc)| {
            doc.row_id = row_id;
            doc
        })
        .collect();
    if documents.is_empty() {
        return Err(CorpusError::Empty.into());
    }
    Ok(documents)
}
