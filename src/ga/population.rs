//! Ordered collection of individuals for one generation.

use rand::Rng;

use super::individual::Individual;
use crate::domain::TimetableDomain;
use crate::error::{Result, TimetableError};
use crate::random::shuffle;

/// A generation's individuals plus their cached fitness sum.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Population {
    individuals: Vec<Individual>,
    population_fitness: f64,
}

impl Population {
    /// Creates an empty population.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty population with room for `size` individuals.
    pub fn with_capacity(size: usize) -> Self {
        Self {
            individuals: Vec::with_capacity(size),
            population_fitness: 0.0,
        }
    }

    /// Seeds `size` individuals from the domain model.
    pub fn from_seed<D: TimetableDomain, R: Rng + ?Sized>(
        size: usize,
        domain: &D,
        rng: &mut R,
    ) -> Result<Self> {
        let individuals = (0..size)
            .map(|_| Individual::from_seed(domain, rng))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            individuals,
            population_fitness: 0.0,
        })
    }

    /// Number of individuals.
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Individuals in their current order.
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub(crate) fn individuals_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }

    /// Consumes the population, returning its individuals.
    pub fn into_individuals(self) -> Vec<Individual> {
        self.individuals
    }

    /// Iterates over individuals in their current order.
    pub fn iter(&self) -> std::slice::Iter<'_, Individual> {
        self.individuals.iter()
    }

    /// Individual at position `index`.
    pub fn individual(&self, index: usize) -> Result<&Individual> {
        self.individuals
            .get(index)
            .ok_or(TimetableError::IndexOutOfRange {
                index,
                len: self.individuals.len(),
            })
    }

    /// Places `individual` at `index`.
    ///
    /// Replaces an existing individual, or appends when `index == len()`.
    pub fn set_individual(&mut self, index: usize, individual: Individual) -> Result<()> {
        let len = self.individuals.len();
        match index.cmp(&len) {
            std::cmp::Ordering::Less => self.individuals[index] = individual,
            std::cmp::Ordering::Equal => self.individuals.push(individual),
            std::cmp::Ordering::Greater => {
                return Err(TimetableError::IndexOutOfRange { index, len })
            }
        }
        Ok(())
    }

    /// Randomly permutes the individuals in place.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        shuffle(&mut self.individuals, rng);
    }

    /// Positions of the individuals sorted by descending fitness.
    ///
    /// The sort is stable: equal fitness keeps the current order.
    /// Unevaluated individuals come last.
    pub fn ranking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.individuals.len()).collect();
        order.sort_by(|&a, &b| {
            self.individuals[b]
                .rank_fitness()
                .partial_cmp(&self.individuals[a].rank_fitness())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        order
    }

    /// The individual with the `rank`-th highest fitness (0 = fittest).
    pub fn fittest(&self, rank: usize) -> Result<&Individual> {
        let order = self.ranking();
        let index = *order.get(rank).ok_or(TimetableError::IndexOutOfRange {
            index: rank,
            len: order.len(),
        })?;
        Ok(&self.individuals[index])
    }

    /// Stores the fitness sum.
    pub fn set_population_fitness(&mut self, fitness: f64) {
        self.population_fitness = fitness;
    }

    /// Cached fitness sum.
    pub fn population_fitness(&self) -> f64 {
        self.population_fitness
    }

    /// Mean fitness (0 for an empty population).
    pub fn avg_fitness(&self) -> f64 {
        if self.individuals.is_empty() {
            return 0.0;
        }
        self.population_fitness / self.individuals.len() as f64
    }
}

impl FromIterator<Individual> for Population {
    fn from_iter<T: IntoIterator<Item = Individual>>(iter: T) -> Self {
        Self {
            individuals: iter.into_iter().collect(),
            population_fitness: 0.0,
        }
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a Individual;
    type IntoIter = std::slice::Iter<'a, Individual>;

    fn into_iter(self) -> Self::IntoIter {
        self.individuals.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample_timetable;
    use crate::ga::{Chromosome, Gene};
    use crate::random::create_rng;

    /// Individuals tagged by a one-gene chromosome so they can be told apart.
    fn tagged(fitnesses: &[Option<f64>]) -> Population {
        fitnesses
            .iter()
            .enumerate()
            .map(|(i, &f)| {
                let mut ind = Individual::new(Chromosome::from_genes(vec![Gene::Filler(i as u8)]));
                if let Some(f) = f {
                    ind.set_fitness(f);
                }
                ind
            })
            .collect()
    }

    fn tag(ind: &Individual) -> u8 {
        match ind.gene(0).unwrap() {
            Gene::Filler(t) => t,
            other => panic!("unexpected gene {other:?}"),
        }
    }

    #[test]
    fn test_fittest_descending() {
        let pop = tagged(&[Some(0.2), Some(1.0), Some(0.5), Some(0.25)]);
        assert_eq!(tag(pop.fittest(0).unwrap()), 1);
        assert_eq!(tag(pop.fittest(1).unwrap()), 2);
        assert_eq!(tag(pop.fittest(2).unwrap()), 3);
        assert_eq!(tag(pop.fittest(3).unwrap()), 0);
        assert!(pop.fittest(4).is_err());
    }

    #[test]
    fn test_fittest_ties_keep_insertion_order() {
        let pop = tagged(&[Some(0.5), Some(0.5), Some(1.0), Some(0.5)]);
        let ranked: Vec<u8> = (0..4).map(|k| tag(pop.fittest(k).unwrap())).collect();
        assert_eq!(ranked, vec![2, 0, 1, 3]);
    }

    #[test]
    fn test_unevaluated_rank_last() {
        let pop = tagged(&[None, Some(0.1), None, Some(0.3)]);
        let ranked: Vec<u8> = (0..4).map(|k| tag(pop.fittest(k).unwrap())).collect();
        assert_eq!(ranked, vec![3, 1, 0, 2]);
    }

    #[test]
    fn test_set_individual_bounds() {
        let mut pop = Population::new();
        let ind = Individual::new(Chromosome::default());
        pop.set_individual(0, ind.clone()).unwrap();
        pop.set_individual(1, ind.clone()).unwrap();
        pop.set_individual(0, ind.clone()).unwrap();
        assert_eq!(pop.len(), 2);
        assert_eq!(
            pop.set_individual(3, ind),
            Err(TimetableError::IndexOutOfRange { index: 3, len: 2 })
        );
        assert!(pop.individual(1).is_ok());
        assert!(pop.individual(2).is_err());
    }

    #[test]
    fn test_avg_fitness() {
        let mut pop = tagged(&[Some(0.5), Some(1.0)]);
        pop.set_population_fitness(1.5);
        assert_eq!(pop.population_fitness(), 1.5);
        assert!((pop.avg_fitness() - 0.75).abs() < 1e-12);
        assert_eq!(Population::new().avg_fitness(), 0.0);
    }

    #[test]
    fn test_shuffle_keeps_members() {
        let mut pop = tagged(&[Some(0.1), Some(0.2), Some(0.3), Some(0.4), Some(0.5)]);
        let mut rng = create_rng(9);
        pop.shuffle(&mut rng);
        let mut tags: Vec<u8> = pop.iter().map(tag).collect();
        tags.sort_unstable();
        assert_eq!(tags, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_shuffle_is_roughly_uniform() {
        let mut rng = create_rng(17);
        let mut first = [0u32; 4];
        for _ in 0..8000 {
            let mut pop = tagged(&[None, None, None, None]);
            pop.shuffle(&mut rng);
            first[tag(pop.individual(0).unwrap()) as usize] += 1;
        }
        for &c in &first {
            assert!(c > 1700 && c < 2300, "biased shuffle: {first:?}");
        }
    }

    #[test]
    fn test_from_seed() {
        let tt = sample_timetable();
        let mut rng = create_rng(4);
        let pop = Population::from_seed(6, &tt, &mut rng).unwrap();
        assert_eq!(pop.len(), 6);
        let len = tt.expected_chromosome_len().unwrap();
        assert!(pop.iter().all(|ind| ind.chromosome_len() == len));
    }
}
