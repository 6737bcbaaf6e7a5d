//! Block-aware genetic operators.
//!
//! Both operators rely on the block-extent query of [`Chromosome`]: a
//! multi-hour session (a duration block) is never assembled from two
//! sources.
//!
//! # Crossover
//!
//! - [`swap_point`]: resolves a random gene index to the nearest crossover
//!   point at or before it that splits no block of either parent
//! - [`single_point_crossover`]: prefix of one parent, suffix of the other
//!
//! # Mutation
//!
//! - [`adaptive_mutation_rate`]: scales the base rate down for individuals
//!   fitter than average
//! - [`block_preserving_mutation`]: copies donor genes locus by locus,
//!   skipping loci inside multi-hour blocks

use rand::Rng;

use super::chromosome::{Chromosome, GENES_PER_TRIPLE};
use crate::error::{Result, TimetableError};

// ============================================================================
// Crossover
// ============================================================================

/// Resolves a gene index to a block-safe crossover point for `a × b`.
///
/// The index is aligned down to its triple, then walked back one triple at
/// a time until triple `t` satisfies all of:
///
/// 1. `t` starts a block in `a`,
/// 2. `t` starts a block in `b`,
/// 3. `a`'s triple `t - 1` does not chain into `b`'s triple `t`.
///
/// Triple 0 always qualifies, so the walk terminates. The result is a gene
/// index and always a multiple of three.
pub fn swap_point(a: &Chromosome, b: &Chromosome, gene_index: usize) -> usize {
    let triples = a.triple_count().min(b.triple_count());
    let mut t = (gene_index / GENES_PER_TRIPLE).min(triples);
    while t > 0 && !is_crossover_boundary(a, b, t) {
        t -= 1;
    }
    t * GENES_PER_TRIPLE
}

fn is_crossover_boundary(a: &Chromosome, b: &Chromosome, t: usize) -> bool {
    if !a.starts_block(t) || !b.starts_block(t) {
        return false;
    }
    match (a.triple(t - 1), b.triple(t)) {
        (Some(prev), Some(next)) => !prev.chains_into(&next),
        _ => true,
    }
}

/// Writes `a[..point]` followed by `b[point..]` into `offspring`.
///
/// All three chromosomes must have the same length.
pub fn single_point_crossover(
    offspring: &mut Chromosome,
    a: &Chromosome,
    b: &Chromosome,
    point: usize,
) -> Result<()> {
    if a.len() != b.len() || offspring.len() != a.len() {
        return Err(TimetableError::MalformedChromosome(format!(
            "crossover length mismatch: offspring {}, parents {} and {}",
            offspring.len(),
            a.len(),
            b.len()
        )));
    }
    for j in 0..offspring.len() {
        let gene = if j < point { a.gene(j)? } else { b.gene(j)? };
        offspring.set_gene(j, gene)?;
    }
    Ok(())
}

// ============================================================================
// Mutation
// ============================================================================

/// Per-individual mutation rate.
///
/// Individuals fitter than the population average get
/// `base × (best − fitness) / (best − avg)`: the closer to the best, the
/// gentler the mutation. Everyone else, including unevaluated individuals,
/// gets `base`.
pub fn adaptive_mutation_rate(base: f64, fitness: Option<f64>, best: f64, avg: f64) -> f64 {
    match fitness {
        Some(f) if f > avg && best > avg => base * (best - f) / (best - avg),
        _ => base,
    }
}

/// Copies donor genes into `target`, each locus with `probability`.
///
/// A drawn locus is skipped when its triple belongs to a block of two or
/// more triples in either `target` or `donor`; replacing it would leave a
/// session whose hours disagree on room, professor or timeslot order.
///
/// Returns the number of loci overwritten.
pub fn block_preserving_mutation<R: Rng + ?Sized>(
    target: &mut Chromosome,
    donor: &Chromosome,
    probability: f64,
    rng: &mut R,
) -> Result<usize> {
    let mut mutated = 0;
    for j in 0..target.len() {
        if rng.random_range(0.0..1.0) >= probability {
            continue;
        }
        if target.in_multi_hour_block(j) || donor.in_multi_hour_block(j) {
            continue;
        }
        target.set_gene(j, donor.gene(j)?)?;
        mutated += 1;
    }
    Ok(mutated)
}
