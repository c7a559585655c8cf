//! Generation boundaries derived from marker rows.
//!
//! A generation is one run of the logged scheduler loop: the interval from one
//! marker row to the next. Intervals are open on the left and closed on the
//! right (`start < t <= end`), so a row logged exactly at a marker timestamp
//! belongs to the generation that marker closes.

use crate::log::LogRow;
use crate::log::row::max_timestamp;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Generation {
    pub start: f64,
    pub end: f64,
}

impl Generation {
    pub fn contains(&self, timestamp: f64) -> bool {
        self.start < timestamp && timestamp <= self.end
    }

    pub fn period(&self) -> f64 {
        self.end - self.start
    }

    pub fn key(&self) -> GenerationKey {
        GenerationKey(self.start)
    }
}

/// Identifies a generation by its start timestamp.
#[derive(Debug, Clone, Copy)]
pub struct GenerationKey(pub f64);

impl PartialEq for GenerationKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GenerationKey {}

impl PartialOrd for GenerationKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GenerationKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for GenerationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered, contiguous generation intervals for one file.
#[derive(Debug, Clone, PartialEq)]
pub struct Generations {
    intervals: Vec<Generation>,
    marker_count: usize,
}

#[allow(clippy::len_without_is_empty)]
impl Generations {
    /// Build generations from the full (unfiltered) row set.
    pub fn build(rows: &[LogRow], marker_name: &str) -> Self {
        let markers: Vec<&LogRow> = rows.iter().filter(|r| r.name == marker_name).collect();
        Self::from_markers(&markers, max_timestamp(rows))
    }

    /// Build generations from marker rows and the largest timestamp of the file.
    ///
    /// Markers are expected in ascending timestamp order; out-of-order markers
    /// are stable-sorted with a warning. Without markers the whole file is a
    /// single generation `[0, max]`.
    pub fn from_markers(markers: &[&LogRow], max_timestamp: Option<f64>) -> Self {
        let max = max_timestamp.unwrap_or(0.0).max(0.0);

        let mut starts: Vec<f64> = markers.iter().map(|r| r.timestamp).collect();
        if !starts.is_sorted() {
            tracing::warn!("marker rows are not in timestamp order; sorting them");
            starts.sort_by(f64::total_cmp);
        }

        let Some(&first) = starts.first() else {
            return Self {
                intervals: vec![Generation { start: 0.0, end: max }],
                marker_count: 0,
            };
        };

        let mut intervals = Vec::with_capacity(starts.len() + 1);
        // Rows logged before the first marker (robot on, not yet enabled).
        intervals.push(Generation {
            start: 0.0,
            end: first,
        });
        for (i, &start) in starts.iter().enumerate() {
            let end = starts.get(i + 1).copied().unwrap_or(max);
            intervals.push(Generation { start, end });
        }

        Self {
            intervals,
            marker_count: starts.len(),
        }
    }

    pub fn as_slice(&self) -> &[Generation] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn marker_count(&self) -> usize {
        self.marker_count
    }

    pub fn has_markers(&self) -> bool {
        self.marker_count > 0
    }

    /// Marker-delimited generations whose period exceeds `max_period`.
    /// Only spans with a marker at both ends are loops: the leading pre-marker
    /// span and the trailing span up to the last row are never reported.
    pub fn overruns(&self, max_period: f64) -> Vec<Generation> {
        if !self.has_markers() {
            return Vec::new();
        }
        let last = self.intervals.len() - 1;
        self.intervals[1..last]
            .iter()
            .filter(|g| g.period() > max_period)
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::Value;
    use pretty_assertions::assert_eq;

    fn row(t: f64, name: &str) -> LogRow {
        LogRow::new(t, name, Value::number(0.0))
    }

    fn spans(g: &Generations) -> Vec<(f64, f64)> {
        g.as_slice().iter().map(|g| (g.start, g.end)).collect()
    }

    #[test]
    fn one_generation_per_marker_plus_leading() {
        let rows = vec![
            row(0.0, "/m"),
            row(5.0, "/x"),
            row(10.0, "/m"),
            row(12.0, "/x"),
            row(20.0, "/x"),
        ];
        let g = Generations::build(&rows, "/m");

        assert_eq!(g.len(), 3);
        assert_eq!(g.marker_count(), 2);
        assert_eq!(spans(&g), vec![(0.0, 0.0), (0.0, 10.0), (10.0, 20.0)]);
    }

    #[test]
    fn generations_are_contiguous() {
        let rows = vec![
            row(0.3, "/x"),
            row(1.0, "/m"),
            row(1.02, "/m"),
            row(1.04, "/x"),
            row(1.05, "/m"),
            row(1.5, "/x"),
        ];
        let g = Generations::build(&rows, "/m");
        for w in g.as_slice().windows(2) {
            assert_eq!(w[0].end, w[1].start);
        }
        assert_eq!(g.as_slice().last().unwrap().end, 1.5);
    }

    #[test]
    fn no_markers_gives_whole_file() {
        let rows = vec![row(1.0, "/x"), row(2.0, "/x"), row(3.0, "/x")];
        let g = Generations::build(&rows, "/m");
        assert_eq!(spans(&g), vec![(0.0, 3.0)]);
        assert!(!g.has_markers());
    }

    #[test]
    fn empty_input_does_not_panic() {
        let g = Generations::build(&[], "/m");
        assert_eq!(spans(&g), vec![(0.0, 0.0)]);
    }

    #[test]
    fn out_of_order_markers_are_sorted() {
        let rows = vec![row(4.0, "/m"), row(2.0, "/m"), row(6.0, "/x")];
        let g = Generations::build(&rows, "/m");
        assert_eq!(spans(&g), vec![(0.0, 2.0), (2.0, 4.0), (4.0, 6.0)]);
    }

    #[test]
    fn overruns_skip_leading_generation() {
        let rows = vec![
            row(5.0, "/m"),
            row(5.02, "/m"),
            row(5.1, "/m"),
            row(5.11, "/x"),
        ];
        let g = Generations::build(&rows, "/m");
        let over = g.overruns(0.025);
        assert_eq!(over.len(), 1);
        assert_eq!(over[0].start, 5.02);
    }

    #[test]
    fn trailing_span_after_last_marker_is_not_an_overrun() {
        let rows = vec![
            row(1.0, "/m"),
            row(1.01, "/m"),
            row(1.02, "/m"),
            row(5.0, "/x"),
        ];
        let g = Generations::build(&rows, "/m");
        assert_eq!(g.as_slice().last().unwrap().period(), 5.0 - 1.02);
        assert_eq!(g.overruns(0.02), vec![]);
    }

    #[test]
    fn single_marker_has_no_complete_loop() {
        let rows = vec![row(1.0, "/m"), row(3.0, "/x")];
        assert_eq!(Generations::build(&rows, "/m").overruns(0.02), vec![]);
    }

    #[test]
    fn keys_order_totally() {
        let mut keys = vec![GenerationKey(10.0), GenerationKey(0.0), GenerationKey(2.5)];
        keys.sort();
        assert_eq!(keys, vec![GenerationKey(0.0), GenerationKey(2.5), GenerationKey(10.0)]);
        assert_eq!(GenerationKey(2.5).to_string(), "2.5");
        assert_eq!(GenerationKey(10.0).to_string(), "10");
    }
}
