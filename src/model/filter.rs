//! Row selection by log-entry name.

use crate::log::LogRow;
use regex::Regex;
use std::collections::BTreeSet;

/// Which log entries to keep.
#[derive(Debug, Clone)]
pub enum Selection {
    /// Keep rows whose name is exactly one of these.
    ExactNames(BTreeSet<String>),
    /// Keep rows whose name contains a match of this pattern anywhere.
    Pattern(Regex),
}

impl Selection {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Selection::ExactNames(names) => names.contains(name),
            Selection::Pattern(re) => re.is_match(name),
        }
    }
}

/// Result of filtering one file's rows. Both lists keep file order.
#[derive(Debug, Clone, Default)]
pub struct Filtered<'a> {
    /// Rows accepted by the selection.
    pub retained: Vec<&'a LogRow>,
    /// Every marker row, whether or not the selection accepts it.
    pub markers: Vec<&'a LogRow>,
}

impl Filtered<'_> {
    /// Distinct names among the retained rows, sorted.
    pub fn names(&self) -> BTreeSet<String> {
        self.retained.iter().map(|r| r.name.clone()).collect()
    }
}

pub fn filter_rows<'a>(rows: &'a [LogRow], selection: &Selection, marker_name: &str) -> Filtered<'a> {
    let mut out = Filtered::default();
    for row in rows {
        if row.name == marker_name {
            out.markers.push(row);
        }
        if selection.matches(&row.name) {
            out.retained.push(row);
        }
    }
    out
}
