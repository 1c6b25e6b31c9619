//! Tab-separated report parser.
//!
//! The first line is the header. Every later non-empty line is one record
//! with exactly as many fields as the header. Cells follow the Excel tab
//! dialect, so quotes around a cell are removed. Cells are typed one by one:
//! integer, float, date, or text as the fallback. A declared column type
//! takes precedence over inference.

use csv::{ReaderBuilder, StringRecord};
use reporter_core::{ColumnType, Report, ReporterError, Value};
use std::collections::HashMap;
use tracing::debug;

/// What to do with a record whose field count differs from the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowPolicy {
    /// Fail the whole parse with `SchemaMismatch`.
    #[default]
    Strict,
    /// Drop the record and note its index on the report.
    SkipMalformed,
}

/// Configurable TSV parser.
#[derive(Debug, Clone, Default)]
pub struct TabularParser {
    schema: HashMap<String, ColumnType>,
    policy: RowPolicy,
}

impl TabularParser {
    /// Creates a strict parser that infers every column.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the type of one column.
    pub fn with_column_type(mut self, column: impl Into<String>, ty: ColumnType) -> Self {
        self.schema.insert(column.into(), ty);
        self
    }

    /// Sets the row policy.
    pub fn with_policy(mut self, policy: RowPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Parses decoded report text.
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::MalformedResponse` if there is no header line,
    /// and `ReporterError::SchemaMismatch` for a duplicate column name or,
    /// under [`RowPolicy::Strict`], a record with the wrong field count.
    pub fn parse(&self, text: &str) -> Result<Report, ReporterError> {
        let mut reader = ReaderBuilder::new();
        reader.delimiter(b'\t').has_headers(false).flexible(true);
        let mut lines = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .enumerate()
            .map(|(i, line)| (i + 1, line))
            .filter(|(_, line)| !line.is_empty());

        let (header_no, header) = lines
            .next()
            .ok_or_else(|| ReporterError::malformed("report has no header line"))?;

        let columns = split_fields(&reader, header, header_no)?;
        let types: Vec<Option<ColumnType>> =
            columns.iter().map(|c| self.schema.get(c).copied()).collect();
        let mut report = Report::new(columns)?;
        let expected = types.len();

        for (row, (line_no, line)) in lines.enumerate() {
            let fields = split_fields(&reader, line, line_no)?;

            if fields.len() != expected {
                match self.policy {
                    RowPolicy::Strict => {
                        return Err(ReporterError::SchemaMismatch {
                            row,
                            line: line_no,
                            expected,
                            found: fields.len(),
                        });
                    }
                    RowPolicy::SkipMalformed => {
                        debug!(row, line = line_no, found = fields.len(), "Skipping malformed row");
                        report.record_skipped(row);
                        continue;
                    }
                }
            }

            let values = fields
                .iter()
                .zip(&types)
                .map(|(raw, ty)| match ty {
                    Some(ty) => Value::coerce(raw, *ty),
                    None => Value::infer(raw),
                })
                .collect();
            report.push_row(values)?;
        }

        debug!(
            columns = expected,
            rows = report.len(),
            skipped = report.skipped_rows().len(),
            "Parsed report"
        );
        Ok(report)
    }
}

/// Splits one line into cells, removing the quotes around quoted cells.
fn split_fields(
    reader: &ReaderBuilder,
    line: &str,
    line_no: usize,
) -> Result<Vec<String>, ReporterError> {
    let mut record = StringRecord::new();
    reader
        .from_reader(line.as_bytes())
        .read_record(&mut record)
        .map_err(|e| ReporterError::malformed(format!("line {line_no}: {e}")))?;
    Ok(record.iter().map(str::to_string).collect())
}

/// Parses report text with the default strict parser.
///
/// # Errors
///
/// See [`TabularParser::parse`].
pub fn parse(text: &str) -> Result<Report, ReporterError> {
    TabularParser::new().parse(text)
}
