//! Flat gene sequence with triple and duration-block views.
//!
//! # Duration blocks
//!
//! A duration block is a maximal run of triples in which every triple
//! [chains into](Triple::chains_into) its successor: one multi-hour session.
//! [`Chromosome::block_start`] and [`Chromosome::block_end`] are the single
//! block-extent query used by both crossover and mutation. They scan
//! outward from a triple until the chain breaks or the chromosome ends, so
//! they always terminate and place no cap on block length.
//!
//! Triples whose genes are not `(timeslot, room, professor)` never chain,
//! so malformed regions degrade to one-triple blocks.

use std::fmt;

use super::types::{Gene, Triple};
use crate::error::{Result, TimetableError};

/// Number of genes per scheduled hour.
pub const GENES_PER_TRIPLE: usize = 3;

/// An ordered gene sequence encoding one candidate timetable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chromosome {
    genes: Vec<Gene>,
}

impl Chromosome {
    /// Wraps a gene vector.
    pub fn from_genes(genes: Vec<Gene>) -> Self {
        Self { genes }
    }

    /// Builds a chromosome from whole triples.
    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Self {
        Self {
            genes: triples.into_iter().flat_map(|t| t.genes()).collect(),
        }
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Whether the chromosome has no genes.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// All genes.
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Gene at `index`.
    pub fn gene(&self, index: usize) -> Result<Gene> {
        self.genes
            .get(index)
            .copied()
            .ok_or(TimetableError::IndexOutOfRange {
                index,
                len: self.genes.len(),
            })
    }

    /// Overwrites the gene at `index`.
    pub fn set_gene(&mut self, index: usize, gene: Gene) -> Result<()> {
        let len = self.genes.len();
        let slot = self
            .genes
            .get_mut(index)
            .ok_or(TimetableError::IndexOutOfRange { index, len })?;
        *slot = gene;
        Ok(())
    }

    /// Number of whole triples.
    pub fn triple_count(&self) -> usize {
        self.genes.len() / GENES_PER_TRIPLE
    }

    /// Typed view of triple `t`, if it exists and is well-formed.
    pub fn triple(&self, t: usize) -> Option<Triple> {
        let start = t.checked_mul(GENES_PER_TRIPLE)?;
        let genes = self.genes.get(start..start + GENES_PER_TRIPLE)?;
        Triple::from_genes(genes)
    }

    /// Iterates over typed triples (`None` for malformed ones).
    pub fn triples(&self) -> impl Iterator<Item = Option<Triple>> + '_ {
        self.genes
            .chunks_exact(GENES_PER_TRIPLE)
            .map(Triple::from_genes)
    }

    /// Whether triple `t - 1` chains into triple `t`.
    pub fn continues_block(&self, t: usize) -> bool {
        if t == 0 {
            return false;
        }
        match (self.triple(t - 1), self.triple(t)) {
            (Some(prev), Some(cur)) => prev.chains_into(&cur),
            _ => false,
        }
    }

    /// Whether triple `t` is the first triple of its block.
    pub fn starts_block(&self, t: usize) -> bool {
        !self.continues_block(t)
    }

    /// First triple of the block containing triple `t`.
    pub fn block_start(&self, t: usize) -> usize {
        let mut start = t;
        while self.continues_block(start) {
            start -= 1;
        }
        start
    }

    /// Last triple (inclusive) of the block containing triple `t`.
    pub fn block_end(&self, t: usize) -> usize {
        let mut end = t;
        while self.continues_block(end + 1) {
            end += 1;
        }
        end
    }

    /// Number of triples in the block containing triple `t`.
    pub fn block_len(&self, t: usize) -> usize {
        self.block_end(t) - self.block_start(t) + 1
    }

    /// Whether gene `index` lies inside a block of two or more triples.
    pub fn in_multi_hour_block(&self, index: usize) -> bool {
        let t = index / GENES_PER_TRIPLE;
        t < self.triple_count() && self.block_len(t) > 1
    }

    /// Triple ranges `[start, end]` of every block, in order.
    pub fn blocks(&self) -> Vec<(usize, usize)> {
        let mut blocks = Vec::new();
        let mut t = 0;
        while t < self.triple_count() {
            let end = self.block_end(t);
            blocks.push((t, end));
            t = end + 1;
        }
        blocks
    }
}

impl From<Vec<Gene>> for Chromosome {
    fn from(genes: Vec<Gene>) -> Self {
        Self::from_genes(genes)
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, gene) in self.genes.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{gene}")?;
        }
        Ok(())
    }
}
