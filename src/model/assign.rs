//! Row-to-generation assignment.

use crate::error::UnassignableRow;
use crate::log::LogRow;
use crate::model::generation::{GenerationKey, Generations};

/// A retained row tagged with the generation that owns it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketedRow<'a> {
    pub key: GenerationKey,
    /// Position in [`Generations::as_slice`]. Two generations can share a key
    /// (a marker at 0 after the leading `[0, 0]`); the index cannot.
    pub generation: usize,
    pub row: &'a LogRow,
}

#[derive(Debug, Clone, Default)]
pub struct Bucketing<'a> {
    pub rows: Vec<BucketedRow<'a>>,
    pub unassignable: Vec<UnassignableRow>,
}

/// Index of the generation with `start < timestamp <= end`.
///
/// Generations are sorted by start, so this is a binary search. A timestamp
/// equal to the first generation's start (0) belongs to the first generation.
pub fn locate(generations: &Generations, timestamp: f64) -> Result<usize, UnassignableRow> {
    let gens = generations.as_slice();
    let after = gens.partition_point(|g| g.start < timestamp);

    let owner = match after {
        0 => gens.first().filter(|g| g.start == timestamp).map(|_| 0),
        n => gens.get(n - 1).filter(|g| g.contains(timestamp)).map(|_| n - 1),
    };

    owner.ok_or(UnassignableRow { timestamp })
}

/// Key of the generation owning `timestamp`.
pub fn assign(generations: &Generations, timestamp: f64) -> Result<GenerationKey, UnassignableRow> {
    locate(generations, timestamp).map(|idx| generations.as_slice()[idx].key())
}

/// Assign every row to its generation, collecting rows that match none.
pub fn bucket_rows<'a, I>(rows: I, generations: &Generations) -> Bucketing<'a>
where
    I: IntoIterator<Item = &'a LogRow>,
{
    let mut out = Bucketing::default();
    for row in rows {
        match locate(generations, row.timestamp) {
            Ok(generation) => out.rows.push(BucketedRow {
                key: generations.as_slice()[generation].key(),
                generation,
                row,
            }),
            Err(e) => out.unassignable.push(e),
        }
    }
    out
}
