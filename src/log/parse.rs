use crate::error::FileError;
use crate::log::row::{LogFile, LogRow, Value};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::Path;

const TIMESTAMP: &str = "Timestamp";
const NAME: &str = "Name";
const VALUE: &str = "Value";

/// Column positions of the three required fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    timestamp: usize,
    name: usize,
    value: usize,
}

impl ColumnMap {
    /// Layout assumed when a file has no header line.
    const POSITIONAL: ColumnMap = ColumnMap {
        timestamp: 0,
        name: 1,
        value: 2,
    };

    /// Locate the required columns in a header record. On failure returns the
    /// names of the missing columns.
    fn from_header(header: &StringRecord) -> Result<Self, Vec<&'static str>> {
        let find = |wanted: &str| {
            header
                .iter()
                .position(|h| h.trim().trim_start_matches('\u{feff}') == wanted)
        };

        match (find(TIMESTAMP), find(NAME), find(VALUE)) {
            (Some(timestamp), Some(name), Some(value)) => Ok(Self {
                timestamp,
                name,
                value,
            }),
            (t, n, v) => Err([(TIMESTAMP, t), (NAME, n), (VALUE, v)]
                .into_iter()
                .filter(|(_, idx)| idx.is_none())
                .map(|(col, _)| col)
                .collect()),
        }
    }
}

/// A first record that is plainly a data row: three fields with a numeric
/// timestamp.
fn looks_like_data(record: &StringRecord) -> bool {
    record.len() == 3
        && record
            .get(0)
            .is_some_and(|t| t.trim().parse::<f64>().is_ok())
}

/// Read a `Timestamp,Name,Value` CSV export.
///
/// Column order is free and headers are whitespace-trimmed. A file without a
/// header line is accepted when its first line is clearly data; the columns are
/// then taken positionally.
pub fn read_log_file(path: &Path) -> Result<LogFile, FileError> {
    let rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| FileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let rows = read_rows(rdr, path)?;
    Ok(LogFile {
        path: path.to_path_buf(),
        rows,
    })
}

fn read_rows<R: Read>(mut rdr: csv::Reader<R>, path: &Path) -> Result<Vec<LogRow>, FileError> {
    let read_err = |source| FileError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut records = rdr.records();
    let first = match records.next() {
        Some(rec) => rec.map_err(read_err)?,
        None => return Err(FileError::input_format(path, "file is empty")),
    };

    let mut rows = Vec::new();
    match ColumnMap::from_header(&first) {
        Ok(columns) => {
            for rec in records {
                rows.push(parse_record(&rec.map_err(read_err)?, columns, path)?);
            }
        }
        Err(_) if looks_like_data(&first) => {
            tracing::warn!(
                "{}: no header line, reading columns as Timestamp,Name,Value",
                path.display()
            );
            rows.push(parse_record(&first, ColumnMap::POSITIONAL, path)?);
            for rec in records {
                rows.push(parse_record(
                    &rec.map_err(read_err)?,
                    ColumnMap::POSITIONAL,
                    path,
                )?);
            }
        }
        Err(missing) => {
            return Err(FileError::input_format(
                path,
                format!(
                    "missing required header column(s) {}; found {:?}",
                    missing.join(", "),
                    first.iter().collect::<Vec<_>>()
                ),
            ));
        }
    }

    tracing::debug!("{}: read {} rows", path.display(), rows.len());
    Ok(rows)
}

fn parse_record(record: &StringRecord, columns: ColumnMap, path: &Path) -> Result<LogRow, FileError> {
    let lno = record.position().map(|p| p.line()).unwrap_or_default();
    let field = |idx: usize, col: &'static str| {
        record.get(idx).ok_or_else(|| {
            FileError::input_format(path, format!("line {}: missing {} field", lno, col))
        })
    };

    let ts_str = field(columns.timestamp, TIMESTAMP)?.trim();
    let timestamp = ts_str
        .parse::<f64>()
        .ok()
        .filter(|t| t.is_finite())
        .ok_or_else(|| {
            FileError::input_format(path, format!("line {}: bad timestamp {:?}", lno, ts_str))
        })?;

    Ok(LogRow {
        timestamp,
        name: field(columns.name, NAME)?.trim().to_string(),
        value: Value::parse(field(columns.value, VALUE)?),
    })
}
