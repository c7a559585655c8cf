//! Pivot bucketed rows into one row per generation and one column per name.

use crate::log::Value;
use crate::model::assign::BucketedRow;
use crate::model::generation::GenerationKey;
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// How several values for the same (generation, name) pair collapse into one
/// cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// First value in file order.
    #[default]
    First,
    /// Last value in file order.
    Last,
    /// Arithmetic mean; values must be numeric.
    Mean,
    /// Largest value; values must be numeric.
    Max,
    /// Smallest value; values must be numeric.
    Min,
    /// Refuse to collapse: more than one value is an error.
    Error,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregateError {
    #[error("{name} in generation {key}: value {raw:?} is not numeric")]
    NonNumeric {
        name: String,
        key: GenerationKey,
        raw: String,
    },
    #[error("{name} in generation {key}: {count} values")]
    Duplicate {
        name: String,
        key: GenerationKey,
        count: usize,
    },
}

impl Aggregation {
    /// `values` are `(generation index, value)` in file order.
    fn apply(self, key: GenerationKey, name: &str, values: &[(usize, &Value)]) -> Result<String, AggregateError> {
        let numbers = || {
            values
                .iter()
                .map(|(_, v)| {
                    v.number.ok_or_else(|| AggregateError::NonNumeric {
                        name: name.to_string(),
                        key,
                        raw: v.raw.clone(),
                    })
                })
                .collect::<Result<Vec<f64>, _>>()
        };

        let cell = match self {
            Aggregation::First => values.first().map(|(_, v)| v.raw.clone()),
            Aggregation::Last => values.last().map(|(_, v)| v.raw.clone()),
            Aggregation::Mean => {
                let nums = numbers()?;
                (!nums.is_empty()).then(|| (nums.iter().sum::<f64>() / nums.len() as f64).to_string())
            }
            Aggregation::Max => numbers()?.into_iter().reduce(f64::max).map(|n| n.to_string()),
            Aggregation::Min => numbers()?.into_iter().reduce(f64::min).map(|n| n.to_string()),
            Aggregation::Error => {
                // Counted per generation: distinct generations sharing a key
                // are not duplicates of each other.
                let mut per_generation: BTreeMap<usize, usize> = BTreeMap::new();
                for (generation, _) in values {
                    *per_generation.entry(*generation).or_default() += 1;
                }
                if let Some(&count) = per_generation.values().find(|&&n| n > 1) {
                    return Err(AggregateError::Duplicate {
                        name: name.to_string(),
                        key,
                        count,
                    });
                }
                values.first().map(|(_, v)| v.raw.clone())
            }
        };

        Ok(cell.unwrap_or_default())
    }
}

/// Wide table: generation rows by name columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputTable {
    /// Column names, sorted.
    pub names: Vec<String>,
    /// Cells per generation. A name absent from a row's map is an empty cell.
    pub rows: BTreeMap<GenerationKey, BTreeMap<String, String>>,
}

impl OutputTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, key: GenerationKey, name: &str) -> Option<&str> {
        self.rows.get(&key)?.get(name).map(String::as_str)
    }
}

/// Build the wide table. `names` become the columns (deduplicated and sorted);
/// only generations holding at least one bucketed row get a table row.
pub fn pivot<I>(names: I, rows: &[BucketedRow<'_>], aggregation: Aggregation) -> Result<OutputTable, AggregateError>
where
    I: IntoIterator<Item = String>,
{
    let mut names: Vec<String> = names.into_iter().collect();
    names.sort();
    names.dedup();

    let mut groups: BTreeMap<GenerationKey, BTreeMap<&str, Vec<(usize, &Value)>>> = BTreeMap::new();
    for b in rows {
        groups
            .entry(b.key)
            .or_default()
            .entry(b.row.name.as_str())
            .or_default()
            .push((b.generation, &b.row.value));
    }

    let mut table = OutputTable {
        names,
        rows: BTreeMap::new(),
    };
    for (key, by_name) in groups {
        let mut cells = BTreeMap::new();
        for (name, values) in by_name {
            cells.insert(name.to_string(), aggregation.apply(key, name, &values)?);
        }
        table.rows.insert(key, cells);
    }

    Ok(table)
}
