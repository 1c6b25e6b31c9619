//! Report types.
//!
//! This module contains the typed form of a downloaded report:
//! - [`Report`] - Ordered unique columns plus ordered rows
//! - [`Row`] - Borrowed view of one row, addressable by column name
//! - [`Value`] - A coerced cell value
//! - [`ColumnType`] - Declared type for a column

use chrono::NaiveDate;
use serde::ser::{SerializeMap, SerializeSeq, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use crate::error::ReporterError;

/// Date formats the service uses in report cells, tried in order.
const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d", "%Y%m%d"];

/// Format used when a date is written back out.
const DATE_OUTPUT_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Column Type
// ============================================================================

/// Declared type of a report column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Raw text.
    Text,
    /// Signed integer.
    Integer,
    /// Floating point number.
    Float,
    /// Calendar date.
    Date,
}

// ============================================================================
// Value
// ============================================================================

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text that was not coerced.
    Text(String),
    /// Integer cell.
    Integer(i64),
    /// Decimal cell.
    Float(f64),
    /// Date cell.
    Date(NaiveDate),
}

impl Value {
    /// Infers a value from raw cell text.
    ///
    /// Tries integer, then float, then the service's date formats, and falls
    /// back to text. Never fails.
    pub fn infer(raw: &str) -> Self {
        parse_integer(raw)
            .map(Self::Integer)
            .or_else(|| parse_float(raw).map(Self::Float))
            .or_else(|| parse_date(raw).map(Self::Date))
            .unwrap_or_else(|| Self::Text(raw.to_string()))
    }

    /// Coerces raw cell text to a declared type, falling back to text.
    pub fn coerce(raw: &str, ty: ColumnType) -> Self {
        let coerced = match ty {
            ColumnType::Text => None,
            ColumnType::Integer => parse_integer(raw).map(Self::Integer),
            ColumnType::Float => parse_float(raw).map(Self::Float),
            ColumnType::Date => parse_date(raw).map(Self::Date),
        };
        coerced.unwrap_or_else(|| Self::Text(raw.to_string()))
    }

    /// Returns the type of this value.
    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Text(_) => ColumnType::Text,
            Self::Integer(_) => ColumnType::Integer,
            Self::Float(_) => ColumnType::Float,
            Self::Date(_) => ColumnType::Date,
        }
    }

    /// Returns the text, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer, if this is an integer value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as a float (integers are widened).
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the date, if this is a date value.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Date(d) => write!(f, "{}", d.format(DATE_OUTPUT_FORMAT)),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Integer(n) => serializer.serialize_i64(*n),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Date(d) => serializer.collect_str(&d.format(DATE_OUTPUT_FORMAT)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

/// Returns true if `digits` carries a leading zero that integer parsing
/// would drop (identifiers such as `00123`).
fn has_significant_leading_zero(digits: &str) -> bool {
    digits.len() > 1 && digits.starts_with('0')
}

fn parse_integer(raw: &str) -> Option<i64> {
    let digits = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    if digits.is_empty()
        || !digits.bytes().all(|b| b.is_ascii_digit())
        || has_significant_leading_zero(digits)
    {
        return None;
    }
    raw.parse().ok()
}

fn parse_float(raw: &str) -> Option<f64> {
    // Rust accepts "inf" and "NaN"; the service never sends those as numbers.
    let body = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    let looks_numeric = body.bytes().any(|b| b.is_ascii_digit())
        && body
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'-' | b'+'));
    if !looks_numeric {
        return None;
    }
    let int_part = body.split(['.', 'e', 'E']).next().unwrap_or_default();
    if has_significant_leading_zero(int_part) {
        return None;
    }
    raw.parse().ok().filter(|x: &f64| x.is_finite())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

// ============================================================================
// Report
// ============================================================================

/// A parsed report: ordered unique column names and ordered rows.
///
/// Every row holds exactly one value per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Value>>,
    skipped_rows: Vec<usize>,
}

impl Report {
    /// Creates an empty report with the given header.
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::SchemaMismatch` at row 0 if a column name
    /// appears twice.
    pub fn new(columns: Vec<String>) -> Result<Self, ReporterError> {
        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(ReporterError::SchemaMismatch {
                    row: 0,
                    line: 1,
                    expected: columns.len(),
                    found: index.len(),
                });
            }
        }

        Ok(Self {
            columns,
            index,
            rows: Vec::new(),
            skipped_rows: Vec::new(),
        })
    }

    /// Appends a row.
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::SchemaMismatch` if the row does not have one
    /// value per column.
    pub fn push_row(&mut self, values: Vec<Value>) -> Result<(), ReporterError> {
        if values.len() != self.columns.len() {
            let row = self.rows.len() + self.skipped_rows.len();
            return Err(ReporterError::SchemaMismatch {
                row,
                line: row + 2,
                expected: self.columns.len(),
                found: values.len(),
            });
        }
        self.rows.push(values);
        Ok(())
    }

    /// Records a data row that was dropped by a lenient parse.
    pub fn record_skipped(&mut self, row: usize) {
        self.skipped_rows.push(row);
    }

    /// Returns the column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the position of a column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the report has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the data row indices dropped by a lenient parse.
    pub fn skipped_rows(&self) -> &[usize] {
        &self.skipped_rows
    }

    /// Returns a row by position.
    pub fn row(&self, i: usize) -> Option<Row<'_>> {
        self.rows.get(i).map(|values| Row {
            report: self,
            values,
        })
    }

    /// Iterates over the rows in order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = Row<'_>> + '_ {
        self.rows.iter().map(move |values| Row {
            report: self,
            values,
        })
    }

    /// Iterates over every value of one column.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let i = self.column_index(name)?;
        Some(self.rows.iter().filter_map(move |r| r.get(i)))
    }

    /// Renders the report back to tab-separated text.
    pub fn to_tsv(&self) -> String {
        let mut out = self.columns.join("\t");
        out.push('\n');
        for row in &self.rows {
            let line: Vec<String> = row.iter().map(ToString::to_string).collect();
            out.push_str(&line.join("\t"));
            out.push('\n');
        }
        out
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.skipped_rows.is_empty() { 2 } else { 3 };
        let mut state = serializer.serialize_struct("Report", fields)?;
        state.serialize_field("columns", &self.columns)?;
        state.serialize_field("rows", &RowsSer(self))?;
        if !self.skipped_rows.is_empty() {
            state.serialize_field("skipped_rows", &self.skipped_rows)?;
        }
        state.end()
    }
}

struct RowsSer<'a>(&'a Report);

impl Serialize for RowsSer<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for row in self.0.rows() {
            seq.serialize_element(&row)?;
        }
        seq.end()
    }
}

// ============================================================================
// Row
// ============================================================================

/// Borrowed view of one report row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    report: &'a Report,
    values: &'a [Value],
}

impl<'a> Row<'a> {
    /// Returns the value of a column by name.
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.report
            .column_index(column)
            .and_then(|i| self.values.get(i))
    }

    /// Returns the values in column order.
    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    /// Iterates over `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.report
            .columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl Serialize for Row<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_infer_numbers() {
        assert_eq!(Value::infer("42"), Value::Integer(42));
        assert_eq!(Value::infer("-7"), Value::Integer(-7));
        assert_eq!(Value::infer("1.25"), Value::Float(1.25));
        assert_eq!(Value::infer("0.99"), Value::Float(0.99));
        assert_eq!(Value::infer("0"), Value::Integer(0));
    }

    #[test]
    fn test_infer_keeps_identifiers_as_text() {
        assert_eq!(Value::infer("00123"), Value::Text("00123".to_string()));
        assert_eq!(Value::infer("inf"), Value::Text("inf".to_string()));
        assert_eq!(Value::infer("NaN"), Value::Text("NaN".to_string()));
        assert_eq!(Value::infer(""), Value::Text(String::new()));
        assert_eq!(Value::infer("US"), Value::Text("US".to_string()));
    }

    #[test]
    fn test_infer_dates() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(Value::infer("01/31/2024"), Value::Date(d));
        assert_eq!(Value::infer("2024-01-31"), Value::Date(d));
        // Eight digits read as a number before a date.
        assert_eq!(Value::infer("20240131"), Value::Integer(20_240_131));
    }

    #[test]
    fn test_coerce_declared_type() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(Value::coerce("20240131", ColumnType::Date), Value::Date(d));
        assert_eq!(Value::coerce("12", ColumnType::Text), Value::Text("12".to_string()));
        assert_eq!(Value::coerce("12", ColumnType::Float), Value::Float(12.0));
        assert_eq!(
            Value::coerce("abc", ColumnType::Integer),
            Value::Text("abc".to_string())
        );
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let err = Report::new(cols(&["a", "b", "a"])).unwrap_err();
        assert!(matches!(err, ReporterError::SchemaMismatch { row: 0, .. }));
    }

    #[test]
    fn test_push_row_checks_width() {
        let mut report = Report::new(cols(&["a", "b"])).unwrap();
        report.push_row(vec!["x".into(), 1.into()]).unwrap();

        let err = report.push_row(vec!["y".into()]).unwrap_err();
        assert!(matches!(
            err,
            ReporterError::SchemaMismatch { row: 1, expected: 2, found: 1, .. }
        ));
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_row_lookup_by_name() {
        let mut report = Report::new(cols(&["SKU", "Units"])).unwrap();
        report.push_row(vec!["app".into(), 3.into()]).unwrap();

        let row = report.row(0).unwrap();
        assert_eq!(row.get("Units"), Some(&Value::Integer(3)));
        assert_eq!(row.get("Missing"), None);

        let units: Vec<_> = report.column("Units").unwrap().collect();
        assert_eq!(units, vec![&Value::Integer(3)]);
    }

    #[test]
    fn test_serialize_rows_as_maps() {
        let mut report = Report::new(cols(&["SKU", "Units", "Begin Date"])).unwrap();
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        report
            .push_row(vec!["app".into(), 3.into(), d.into()])
            .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["columns"][1], "Units");
        assert_eq!(json["rows"][0]["Units"], 3);
        assert_eq!(json["rows"][0]["Begin Date"], "2024-01-02");
        assert!(json.get("skipped_rows").is_none());
    }

    #[test]
    fn test_to_tsv() {
        let mut report = Report::new(cols(&["a", "b"])).unwrap();
        report.push_row(vec!["x".into(), 1.5.into()]).unwrap();
        assert_eq!(report.to_tsv(), "a\tb\nx\t1.5\n");
    }
}
