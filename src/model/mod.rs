//! Generation bucketing: filter rows, derive generations from marker rows,
//! assign rows to generations, and pivot into a per-generation table.

pub mod assign;
pub mod filter;
pub mod generation;
pub mod pivot;

pub use assign::{BucketedRow, Bucketing, assign, bucket_rows, locate};
pub use filter::{Filtered, Selection, filter_rows};
pub use generation::{Generation, GenerationKey, Generations};
pub use pivot::{AggregateError, Aggregation, OutputTable, pivot};

use crate::error::UnassignableRow;
use crate::log::LogRow;
use crate::log::row::max_timestamp;

/// Everything derived from one file's rows.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub generations: Generations,
    pub table: OutputTable,
    /// Rows accepted by the selection, before assignment.
    pub retained: usize,
    pub unassignable: Vec<UnassignableRow>,
}

/// Run the whole bucketing pass over one file's rows.
///
/// Generations are computed from the full row set, so the selection does not
/// need to include the marker name.
pub fn build_generation_table(
    rows: &[LogRow],
    selection: &Selection,
    marker_name: &str,
    aggregation: Aggregation,
) -> Result<GenerationReport, AggregateError> {
    let filtered = filter_rows(rows, selection, marker_name);
    let generations = Generations::from_markers(&filtered.markers, max_timestamp(rows));

    let bucketing = bucket_rows(filtered.retained.iter().copied(), &generations);
    let table = pivot(filtered.names(), &bucketing.rows, aggregation)?;

    Ok(GenerationReport {
        generations,
        table,
        retained: filtered.retained.len(),
        unassignable: bucketing.unassignable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::Value;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn exact(names: &[&str]) -> Selection {
        Selection::ExactNames(names.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>())
    }

    #[test]
    fn marker_scenario() {
        let rows = vec![
            LogRow::new(0.0, "/m", Value::parse("0")),
            LogRow::new(5.0, "/x", Value::parse("1.0")),
            LogRow::new(10.0, "/m", Value::parse("0")),
            LogRow::new(12.0, "/x", Value::parse("2.0")),
            LogRow::new(20.0, "/x", Value::parse("3.0")),
        ];
        let report = build_generation_table(&rows, &exact(&["/x"]), "/m", Aggregation::First).unwrap();

        let spans: Vec<(f64, f64)> = report
            .generations
            .as_slice()
            .iter()
            .map(|g| (g.start, g.end))
            .collect();
        assert_eq!(spans, vec![(0.0, 0.0), (0.0, 10.0), (10.0, 20.0)]);

        assert_eq!(report.table.names, vec!["/x".to_string()]);
        assert_eq!(report.table.rows.len(), 2);
        assert_eq!(report.table.cell(GenerationKey(0.0), "/x"), Some("1.0"));
        // 20 sits on the closing boundary, so it joins generation 10 and loses to 12.
        assert_eq!(report.table.cell(GenerationKey(10.0), "/x"), Some("2.0"));
        assert!(report.unassignable.is_empty());
    }

    #[test]
    fn zero_markers_put_everything_in_one_generation() {
        let rows = vec![
            LogRow::new(1.0, "/x", Value::number(1.0)),
            LogRow::new(2.0, "/y", Value::number(2.0)),
            LogRow::new(3.0, "/x", Value::number(3.0)),
        ];
        let report = build_generation_table(&rows, &exact(&["/x", "/y"]), "/m", Aggregation::Last).unwrap();

        assert_eq!(report.generations.len(), 1);
        assert_eq!(report.table.rows.len(), 1);
        assert_eq!(report.table.cell(GenerationKey(0.0), "/x"), Some("3"));
        assert_eq!(report.table.cell(GenerationKey(0.0), "/y"), Some("2"));
    }

    #[test]
    fn columns_are_exactly_the_retained_names() {
        let rows = vec![
            LogRow::new(0.5, "/a", Value::number(1.0)),
            LogRow::new(1.0, "/m", Value::number(0.0)),
            LogRow::new(1.5, "/b", Value::number(1.0)),
            LogRow::new(1.6, "/skip", Value::number(1.0)),
            LogRow::new(2.0, "/a", Value::number(1.0)),
        ];
        let sel = Selection::Pattern(regex::Regex::new("^/[ab]$").unwrap());
        let report = build_generation_table(&rows, &sel, "/m", Aggregation::First).unwrap();

        assert_eq!(report.table.names, vec!["/a".to_string(), "/b".to_string()]);
        assert_eq!(report.retained, 3);
    }

    #[test]
    fn duplicates_keep_first_value() {
        let rows = vec![
            LogRow::new(1.0, "/m", Value::number(0.0)),
            LogRow::new(1.1, "/x", Value::parse("7")),
            LogRow::new(1.2, "/x", Value::parse("8")),
            LogRow::new(2.0, "/m", Value::number(0.0)),
        ];
        let report = build_generation_table(&rows, &exact(&["/x"]), "/m", Aggregation::First).unwrap();
        assert_eq!(report.table.cell(GenerationKey(1.0), "/x"), Some("7"));
    }

    #[test]
    fn marker_at_zero_is_not_a_duplicate_under_error() {
        let rows = vec![
            LogRow::new(0.0, "/m", Value::parse("1")),
            LogRow::new(5.0, "/x", Value::parse("1.0")),
            LogRow::new(10.0, "/m", Value::parse("2")),
            LogRow::new(12.0, "/x", Value::parse("2.0")),
        ];
        let report = build_generation_table(&rows, &exact(&["/m", "/x"]), "/m", Aggregation::Error).unwrap();

        assert_eq!(report.generations.len(), 3);
        assert_eq!(report.table.cell(GenerationKey(0.0), "/m"), Some("1"));
        assert_eq!(report.table.cell(GenerationKey(0.0), "/x"), Some("1.0"));
        assert_eq!(report.table.cell(GenerationKey(10.0), "/x"), Some("2.0"));
    }

    #[test]
    fn marker_can_also_be_a_column() {
        let rows = vec![
            LogRow::new(1.0, "/schedgen", Value::number(1.0)),
            LogRow::new(1.01, "/swerve/txout", Value::number(0.5)),
            LogRow::new(2.0, "/schedgen", Value::number(2.0)),
        ];
        let sel = Selection::Pattern(regex::Regex::new("swerve|schedgen").unwrap());
        let report = build_generation_table(&rows, &sel, "/schedgen", Aggregation::First).unwrap();

        assert_eq!(report.table.names, vec!["/schedgen".to_string(), "/swerve/txout".to_string()]);
        // A marker closes the previous generation.
        assert_eq!(report.table.cell(GenerationKey(0.0), "/schedgen"), Some("1"));
        assert_eq!(report.table.cell(GenerationKey(1.0), "/schedgen"), Some("2"));
        assert_eq!(report.table.cell(GenerationKey(1.0), "/swerve/txout"), Some("0.5"));
    }
}
