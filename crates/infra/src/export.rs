//! CSV export of the scored product table.
//!
//! Columns:
//!   id, name, currentInventory, avgSalesPerWeek, daysToReplenish,
//!   serverReorder, prediction, predictionScore
//!
//! `name` is always double-quoted (internal quotes doubled). The prediction
//! columns stay blank until a training cycle has run.

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use reorderlab_inventory::ProductRecord;

pub const HEADER: [&str; 8] = [
    "id",
    "name",
    "currentInventory",
    "avgSalesPerWeek",
    "daysToReplenish",
    "serverReorder",
    "prediction",
    "predictionScore",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parse error at line {line}: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("export is not valid UTF-8: {0}")]
    Encoding(String),
}

/// One parsed CSV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub id: u32,
    pub name: String,
    pub current_inventory: u32,
    pub avg_sales_per_week: u32,
    pub days_to_replenish: u32,
    pub server_reorder: u8,
    pub prediction: Option<u8>,
    pub prediction_score: Option<f64>,
}

impl ExportRow {
    /// Whether this row carries the same identity, inputs and rule label as
    /// `record`.
    pub fn matches(&self, record: &ProductRecord) -> bool {
        self.id == record.id().get()
            && self.current_inventory == record.current_inventory()
            && self.avg_sales_per_week == record.avg_sales_per_week()
            && self.days_to_replenish == record.days_to_replenish()
            && self.server_reorder == record.reorder_label()
    }
}

fn quoted(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Writes the header and one row per record.
pub fn write_csv<W: Write>(writer: W, records: &[ProductRecord]) -> Result<(), ExportError> {
    // Quoting is done by hand so that `name` is always quoted and nothing
    // else ever is.
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);

    wtr.write_record(HEADER)?;
    for r in records {
        wtr.write_record([
            r.id().to_string(),
            quoted(r.name()),
            r.current_inventory().to_string(),
            r.avg_sales_per_week().to_string(),
            r.days_to_replenish().to_string(),
            r.reorder_label().to_string(),
            r.predicted_label().map(|l| l.to_string()).unwrap_or_default(),
            r.prediction_score().map(|s| format!("{s:.4}")).unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Renders the export in memory.
pub fn to_csv_string(records: &[ProductRecord]) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(&mut buf, records)?;
    String::from_utf8(buf).map_err(|e| ExportError::Encoding(e.to_string()))
}

/// Writes the export to `path`, replacing any existing file.
pub fn write_csv_file(path: impl AsRef<Path>, records: &[ProductRecord]) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_csv(std::io::BufWriter::new(file), records)
}

/// Parses an export produced by [`write_csv`].
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<ExportRow>, ExportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        let row: ExportRow = result.map_err(|source| ExportError::Parse {
            line: line_num + 2,
            source,
        })?;
        rows.push(row);
    }
    Ok(rows)
}
