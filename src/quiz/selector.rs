use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::fmt;

use super::domain::GoodRecord;

/// Outcome of a draw from the good pool.
#[derive(Debug)]
pub struct Selection<'a> {
    pub good: &'a GoodRecord,
    /// True when every good had already been presented, in which case the
    /// draw came from the full pool and the caller should clear its used set.
    pub cycle_exhausted: bool,
}

/// Draw an unseen good uniformly at random.
///
/// Goods whose names appear in `used` are excluded until the pool is
/// exhausted; exhaustion restarts the cycle against the full pool, so the
/// most recently shown good may legitimately reappear. The caller owns the
/// used set and is responsible for clearing it when `cycle_exhausted` is
/// reported.
pub fn select_good<'a, R: Rng + ?Sized>(
    goods: &'a [GoodRecord],
    used: &HashSet<String>,
    rng: &mut R,
) -> Result<Selection<'a>, EmptyDatasetError> {
    if goods.is_empty() {
        return Err(EmptyDatasetError);
    }

    let unseen: Vec<&GoodRecord> = goods
        .iter()
        .filter(|good| !used.contains(&good.name))
        .collect();

    let cycle_exhausted = unseen.is_empty();
    let pool: Vec<&GoodRecord> = if cycle_exhausted {
        goods.iter().collect()
    } else {
        unseen
    };

    let good = pool.choose(rng).copied().ok_or(EmptyDatasetError)?;
    Ok(Selection {
        good,
        cycle_exhausted,
    })
}

/// No goods to quiz on; a session cannot start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyDatasetError;

impl fmt::Display for EmptyDatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the good dataset is empty")
    }
}

impl std::error::Error for EmptyDatasetError {}
