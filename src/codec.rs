//! CSV encoding of catalog rows.
//!
//! The layout is fixed: `id,name,category,price,create_date`. On the way in
//! the header is optional and the `id` column is ignored; on the way out the
//! header is always written and `id` carries the store identity.

use std::io::Read;

use chrono::NaiveDate;
use csv::{ErrorKind, ReaderBuilder, StringRecord, Terminator, Trim, WriterBuilder};
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::models::PriceRecord;

pub const COLUMNS: [&str; 5] = ["id", "name", "category", "price", "create_date"];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a CSV stream into records, preserving input order.
///
/// The first invalid record aborts the whole parse; nothing parsed before it
/// is returned. Quoting is strict: a quote may only open a field, and a
/// quoted field must close right before a delimiter or line end.
pub fn parse_rows<R: Read>(mut input: R) -> Result<Vec<PriceRecord>> {
    let mut data = Vec::new();
    input.read_to_end(&mut data)?;
    check_quoting(&data)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .from_reader(data.as_slice());

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(classify_csv_error)?;
        if idx == 0 && is_header(&record) {
            continue;
        }
        rows.push(parse_record(&record)?);
    }

    debug!(rows = rows.len(), "parsed csv rows");
    Ok(rows)
}

/// Whether a record is the column header, compared case-insensitively.
pub fn is_header(record: &StringRecord) -> bool {
    record.len() >= COLUMNS.len()
        && COLUMNS
            .iter()
            .zip(record.iter())
            .all(|(expected, field)| field.trim().eq_ignore_ascii_case(expected))
}

fn parse_record(record: &StringRecord) -> Result<PriceRecord> {
    let line = line_of(record);
    if record.len() < COLUMNS.len() {
        return Err(CatalogError::InvalidRow {
            line,
            reason: format!("expected {} fields, found {}", COLUMNS.len(), record.len()),
        });
    }

    let field = |i: usize| record.get(i).unwrap_or_default().trim();

    let name = field(1);
    let category = field(2);
    if name.is_empty() || category.is_empty() {
        return Err(CatalogError::InvalidRow {
            line,
            reason: "name and category must not be empty".to_string(),
        });
    }

    let price = parse_price(field(3)).ok_or_else(|| CatalogError::InvalidPrice {
        line,
        value: field(3).to_string(),
    })?;
    let create_date = parse_date(field(4)).ok_or_else(|| CatalogError::InvalidDate {
        line,
        value: field(4).to_string(),
    })?;

    Ok(PriceRecord::new(name, category, price, create_date))
}

fn parse_price(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Strict `YYYY-MM-DD`; chrono alone would also accept padding spaces and a
/// signed year.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// A short record shows up as a field-count mismatch against the first
/// record; report it as an invalid row, like a short first record.
fn classify_csv_error(err: csv::Error) -> CatalogError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    let reason = match err.kind() {
        ErrorKind::UnequalLengths { len, .. } if (*len as usize) < COLUMNS.len() => {
            return CatalogError::InvalidRow {
                line,
                reason: format!("expected {} fields, found {}", COLUMNS.len(), len),
            };
        }
        ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {expected_len} fields, found {len}"),
        ErrorKind::Utf8 { err, .. } => format!("invalid utf-8 in field {}", err.field() + 1),
        _ => err.to_string(),
    };
    CatalogError::RowParse { line, reason }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Reject quoting the CSV reader would otherwise accept leniently: a quote
/// inside an unquoted field, text after a closing quote, or a quoted field
/// still open at end of input. A doubled quote is the only escape.
fn check_quoting(data: &[u8]) -> Result<()> {
    let mut state = QuoteState::FieldStart;
    let mut line: u64 = 1;
    let mut opened_at = line;

    for &b in data {
        state = match (state, b) {
            (QuoteState::FieldStart, b'"') => {
                opened_at = line;
                QuoteState::Quoted
            }
            (QuoteState::Quoted, b'"') => QuoteState::QuoteInQuoted,
            (QuoteState::QuoteInQuoted, b'"') => QuoteState::Quoted,
            (QuoteState::Quoted, _) => QuoteState::Quoted,
            (_, b',' | b'\n' | b'\r') => QuoteState::FieldStart,
            (QuoteState::Unquoted, b'"') => {
                return Err(quote_error(line, "bare \" in non-quoted field"));
            }
            (QuoteState::QuoteInQuoted, _) => {
                return Err(quote_error(line, "extraneous \" after quoted field"));
            }
            (QuoteState::FieldStart | QuoteState::Unquoted, _) => QuoteState::Unquoted,
        };
        if b == b'\n' {
            line += 1;
        }
    }

    if state == QuoteState::Quoted {
        return Err(quote_error(opened_at, "quoted field is never closed"));
    }
    Ok(())
}

fn quote_error(line: u64, reason: &str) -> CatalogError {
    CatalogError::RowParse {
        line,
        reason: reason.to_string(),
    }
}

/// Serialize records as CSV with a header row.
///
/// Prices use the shortest representation that round-trips, without
/// exponent notation. Output is byte-identical for identical input.
pub fn serialize_rows(records: &[PriceRecord]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(COLUMNS).map_err(csv_write_error)?;
    for r in records {
        writer
            .write_record([
                r.id.map(|id| id.to_string()).unwrap_or_default(),
                r.name.clone(),
                r.category.clone(),
                r.price.to_string(),
                r.create_date.format(DATE_FORMAT).to_string(),
            ])
            .map_err(csv_write_error)?;
    }

    writer.into_inner().map_err(|e| CatalogError::Io(e.into_error()))
}

fn csv_write_error(err: csv::Error) -> CatalogError {
    CatalogError::Io(err.into())
}
