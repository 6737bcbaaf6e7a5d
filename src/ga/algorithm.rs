//! One generation of the timetable GA.
//!
//! [`GeneticAlgorithm`] owns the run configuration and the annealing
//! temperature. Each call to [`GeneticAlgorithm::run_generation`] performs
//! crossover → mutation → evaluation → cooling and returns the next
//! population.
//!
//! Ranks `0..=elitism_count` pass through crossover and mutation
//! unchanged, so the best fitness never decreases from one generation to
//! the next.

use log::{debug, trace};
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::GaConfig;
use super::individual::Individual;
use super::operators::{
    adaptive_mutation_rate, block_preserving_mutation, single_point_crossover, swap_point,
};
use super::population::Population;
use super::selection::tournament;
use crate::domain::TimetableDomain;
use crate::error::Result;

/// Initial annealing temperature.
const INITIAL_TEMPERATURE: f64 = 1.0;

/// Genetic operators plus the run's cooling state.
#[derive(Debug, Clone)]
pub struct GeneticAlgorithm {
    config: GaConfig,
    temperature: f64,
}

impl GeneticAlgorithm {
    /// Creates a GA after validating `config`.
    pub fn new(config: GaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            temperature: INITIAL_TEMPERATURE,
        })
    }

    /// The run configuration.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Current temperature.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Geometric cooling rate.
    pub fn cooling_rate(&self) -> f64 {
        self.config.cooling_rate
    }

    /// Applies one cooling step: `temperature *= 1 - cooling_rate`.
    pub fn cool_temperature(&mut self) {
        self.temperature *= 1.0 - self.config.cooling_rate;
    }

    /// Seeds a population of `population_size` individuals.
    pub fn init_population<D: TimetableDomain, R: Rng + ?Sized>(
        &self,
        seed: &D,
        rng: &mut R,
    ) -> Result<Population> {
        Population::from_seed(self.config.population_size, seed, rng)
    }

    /// Maps a clash count to a fitness in `(0, 1]`.
    ///
    /// ```
    /// use u_timetable::ga::GeneticAlgorithm;
    ///
    /// assert_eq!(GeneticAlgorithm::fitness_from_clashes(0), 1.0);
    /// assert_eq!(GeneticAlgorithm::fitness_from_clashes(3), 0.25);
    /// ```
    pub fn fitness_from_clashes(clashes: usize) -> f64 {
        1.0 / (clashes as f64 + 1.0)
    }

    /// Decodes `individual` against a clone of `seed`, stores and returns
    /// its fitness.
    ///
    /// The seed itself is never mutated, so evaluations are independent.
    pub fn calculate_fitness<D: TimetableDomain>(
        &self,
        individual: &mut Individual,
        seed: &D,
    ) -> Result<f64> {
        let mut timetable = seed.clone();
        timetable.create_classes(individual.chromosome())?;
        let clashes = timetable.calc_clashes()?;
        let fitness = Self::fitness_from_clashes(clashes);
        individual.set_fitness(fitness);
        Ok(fitness)
    }

    /// Evaluates every individual and stores the fitness sum on the
    /// population.
    pub fn evaluate_population<D: TimetableDomain>(
        &self,
        population: &mut Population,
        seed: &D,
    ) -> Result<()> {
        let fitnesses = self.evaluate_all(population.individuals_mut(), seed)?;
        let total: f64 = fitnesses.iter().sum();
        population.set_population_fitness(total);
        trace!(
            "evaluated {} individuals, fitness sum {:.6}",
            fitnesses.len(),
            total
        );
        Ok(())
    }

    fn evaluate_all<D: TimetableDomain>(
        &self,
        individuals: &mut [Individual],
        seed: &D,
    ) -> Result<Vec<f64>> {
        #[cfg(feature = "parallel")]
        {
            if self.config.parallel {
                return individuals
                    .par_iter_mut()
                    .map(|ind| self.calculate_fitness(ind, seed))
                    .collect();
            }
        }
        individuals
            .iter_mut()
            .map(|ind| self.calculate_fitness(ind, seed))
            .collect()
    }

    /// Whether the fittest individual is clash-free (fitness exactly 1.0).
    pub fn is_termination_condition_met(&self, population: &Population) -> bool {
        population
            .fittest(0)
            .ok()
            .and_then(Individual::fitness)
            .is_some_and(|f| f == 1.0)
    }

    /// Whether the generation counter has passed the budget.
    pub fn is_generations_maxed_out(generations: usize, max_generations: usize) -> bool {
        generations > max_generations
    }

    /// Tournament selection with the configured tournament size.
    ///
    /// Shuffles `population` as a side effect.
    pub fn select_parent<R: Rng + ?Sized>(
        &self,
        population: &mut Population,
        rng: &mut R,
    ) -> Result<Individual> {
        tournament(population, self.config.tournament_size, rng)
    }

    /// Builds the crossover population.
    ///
    /// Position `i` of the result holds either the rank-`i` individual
    /// unchanged (elites, and non-elites that lose the crossover draw) or
    /// an offspring of it and a tournament-selected second parent, cut at
    /// a block-safe swap point.
    ///
    /// The ranking is taken once, before tournaments reorder `population`,
    /// so every individual is the first parent of exactly one position even
    /// when fitness values tie.
    pub fn crossover_population<R: Rng + ?Sized>(
        &self,
        population: &mut Population,
        rng: &mut R,
    ) -> Result<Population> {
        let ranked = population
            .ranking()
            .into_iter()
            .map(|index| population.individual(index).cloned())
            .collect::<Result<Vec<_>>>()?;
        let mut next = Population::with_capacity(ranked.len());
        let mut offspring_count = 0usize;

        for (i, parent_a) in ranked.into_iter().enumerate() {
            if i > self.config.elitism_count
                && rng.random_range(0.0..1.0) < self.config.crossover_rate
            {
                let len = parent_a.chromosome_len();
                let mut offspring = Individual::random(len, rng);
                let parent_b = self.select_parent(population, rng)?;

                let gene_index = if len == 0 { 0 } else { rng.random_range(0..len) };
                let point = swap_point(parent_a.chromosome(), parent_b.chromosome(), gene_index);
                single_point_crossover(
                    offspring.chromosome_mut(),
                    parent_a.chromosome(),
                    parent_b.chromosome(),
                    point,
                )?;
                next.set_individual(i, offspring)?;
                offspring_count += 1;
            } else {
                next.set_individual(i, parent_a)?;
            }
        }

        next.set_population_fitness(population.population_fitness());
        trace!("crossover produced {offspring_count} offspring");
        Ok(next)
    }

    /// Builds the mutation population.
    ///
    /// Non-elite individuals receive donor genes from a freshly seeded
    /// individual, locus by locus, with probability
    /// `adaptive rate × temperature`. Fitness values are stale until the
    /// next evaluation.
    pub fn mutate_population<D: TimetableDomain, R: Rng + ?Sized>(
        &self,
        population: &Population,
        seed: &D,
        rng: &mut R,
    ) -> Result<Population> {
        let size = population.len();
        let best = population
            .fittest(0)
            .ok()
            .and_then(Individual::fitness)
            .unwrap_or(0.0);
        let avg = population.avg_fitness();

        let mut next = Population::with_capacity(size);
        let mut mutated_loci = 0usize;

        for i in 0..size {
            let mut individual = population.fittest(i)?.clone();
            if i > self.config.elitism_count {
                let rate = adaptive_mutation_rate(
                    self.config.mutation_rate,
                    individual.fitness(),
                    best,
                    avg,
                );
                let donor = Individual::from_seed(seed, rng)?;
                mutated_loci += block_preserving_mutation(
                    individual.chromosome_mut(),
                    donor.chromosome(),
                    rate * self.temperature,
                    rng,
                )?;
            }
            next.set_individual(i, individual)?;
        }

        next.set_population_fitness(population.population_fitness());
        trace!("mutation replaced {mutated_loci} loci");
        Ok(next)
    }

    /// Runs crossover, mutation, evaluation and one cooling step.
    pub fn run_generation<D: TimetableDomain, R: Rng + ?Sized>(
        &mut self,
        population: &mut Population,
        seed: &D,
        rng: &mut R,
    ) -> Result<Population> {
        let crossed = self.crossover_population(population, rng)?;
        let mut next = self.mutate_population(&crossed, seed, rng)?;
        self.evaluate_population(&mut next, seed)?;
        self.cool_temperature();
        debug!(
            "generation done: avg fitness {:.4}, temperature {:.6}",
            next.avg_fitness(),
            self.temperature
        );
        Ok(next)
    }
}
