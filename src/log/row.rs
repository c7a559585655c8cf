use std::path::PathBuf;

/// A cell from the `Value` column: the text as exported plus its numeric
/// coercion, if it has one. Exponential notation is accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub raw: String,
    pub number: Option<f64>,
}

impl Value {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        Self {
            raw: raw.to_string(),
            number: raw.parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    #[cfg(test)]
    pub fn number(value: f64) -> Self {
        Self {
            raw: value.to_string(),
            number: Some(value),
        }
    }
}

/// A single log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub timestamp: f64,
    pub name: String,
    pub value: Value,
}

impl LogRow {
    pub fn new(timestamp: f64, name: impl Into<String>, value: Value) -> Self {
        Self {
            timestamp,
            name: name.into(),
            value,
        }
    }
}

/// All rows of one input file, in file order.
#[derive(Debug, Clone)]
pub struct LogFile {
    pub path: PathBuf,
    pub rows: Vec<LogRow>,
}

/// Largest timestamp, or None without rows.
pub fn max_timestamp(rows: &[LogRow]) -> Option<f64> {
    rows.iter().map(|r| r.timestamp).reduce(f64::max)
}

/// True when timestamps never decrease.
pub fn is_time_ordered(rows: &[LogRow]) -> bool {
    rows.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
}
