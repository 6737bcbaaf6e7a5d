//! Tournament selection.
//!
//! # References
//!
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use rand::Rng;

use super::individual::Individual;
use super::population::Population;
use crate::error::{Result, TimetableError};

/// Picks the fittest of `size` individuals sampled without replacement.
///
/// The population is shuffled in place and its first `size` members form
/// the tournament, so the caller's population order changes as a side
/// effect. `size` is clamped to the population size.
///
/// # Complexity
/// O(n) for the shuffle, O(size log size) for the ranking.
pub fn tournament<R: Rng + ?Sized>(
    population: &mut Population,
    size: usize,
    rng: &mut R,
) -> Result<Individual> {
    if population.is_empty() {
        return Err(TimetableError::IndexOutOfRange { index: 0, len: 0 });
    }
    population.shuffle(rng);

    let size = size.clamp(1, population.len());
    let mut entrants = Population::with_capacity(size);
    for i in 0..size {
        entrants.set_individual(i, population.individual(i)?.clone())?;
    }
    entrants.fittest(0).cloned()
}
