//! GA evolutionary loop execution.
//!
//! [`GaRunner`] orchestrates the complete evolutionary process:
//! seeding → evaluation → (crossover → mutation → evaluation → cooling)
//! repeated until the timetable is clash-free, the generation budget is
//! spent, or the run is cancelled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};

use super::algorithm::GeneticAlgorithm;
use super::config::GaConfig;
use super::individual::Individual;
use super::population::Population;
use crate::domain::TimetableDomain;
use crate::error::Result;
use crate::random::create_rng;

/// Result of a GA run.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// The fittest individual of the final population.
    pub best: Individual,

    /// Fitness of `best`.
    pub best_fitness: f64,

    /// Clash count of `best`, recomputed on a fresh copy of the seed.
    pub clashes: usize,

    /// Number of generations executed after the initial population.
    pub generations: usize,

    /// Whether a clash-free timetable was found.
    pub solved: bool,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Temperature after the last cooling step.
    pub final_temperature: f64,

    /// Best fitness of the initial population followed by the best
    /// fitness after each generation.
    pub fitness_history: Vec<f64>,
}

/// Snapshot passed to the observer after each generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    /// 1-based generation number.
    pub generation: usize,
    /// Fitness of the fittest individual.
    pub best_fitness: f64,
    /// Mean fitness of the population.
    pub avg_fitness: f64,
    /// Temperature after this generation's cooling step.
    pub temperature: f64,
}

/// Executes the GA evolutionary loop.
///
/// # Usage
///
/// ```ignore
/// let timetable = load_timetable()?;
/// let config = GaConfig::default().with_seed(42);
/// let result = GaRunner::run(&timetable, &config)?;
/// println!("best fitness {} ({} clashes)", result.best_fitness, result.clashes);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA against `seed` until solved or out of generations.
    pub fn run<D: TimetableDomain>(seed: &D, config: &GaConfig) -> Result<GaResult> {
        Self::run_with_cancel(seed, config, None)
    }

    /// Runs the GA with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the GA stops
    /// before starting the next generation and returns the best timetable
    /// found so far.
    pub fn run_with_cancel<D: TimetableDomain>(
        seed: &D,
        config: &GaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<GaResult> {
        Self::run_with_observer(seed, config, cancel, |_| {})
    }

    /// Runs the GA, calling `observer` after every generation.
    pub fn run_with_observer<D, F>(
        seed: &D,
        config: &GaConfig,
        cancel: Option<Arc<AtomicBool>>,
        mut observer: F,
    ) -> Result<GaResult>
    where
        D: TimetableDomain,
        F: FnMut(&GenerationStats),
    {
        let mut ga = GeneticAlgorithm::new(config.clone())?;

        let mut rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };

        // 1. Seed and evaluate the initial population
        let mut population = ga.init_population(seed, &mut rng)?;
        ga.evaluate_population(&mut population, seed)?;

        let mut fitness_history = Vec::with_capacity(config.max_generations + 1);
        fitness_history.push(best_fitness(&population));
        info!(
            "starting GA: population {}, max generations {}, initial best fitness {:.4}",
            population.len(),
            config.max_generations,
            fitness_history[0]
        );

        // 2. Evolutionary loop
        let mut generation = 1usize;
        let mut cancelled = false;
        while !ga.is_termination_condition_met(&population)
            && !GeneticAlgorithm::is_generations_maxed_out(generation, config.max_generations)
        {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    warn!("GA cancelled before generation {generation}");
                    cancelled = true;
                    break;
                }
            }

            population = ga.run_generation(&mut population, seed, &mut rng)?;

            let stats = GenerationStats {
                generation,
                best_fitness: best_fitness(&population),
                avg_fitness: population.avg_fitness(),
                temperature: ga.temperature(),
            };
            fitness_history.push(stats.best_fitness);
            debug!(
                "generation {}: best {:.4}, avg {:.4}, temperature {:.6}",
                stats.generation, stats.best_fitness, stats.avg_fitness, stats.temperature
            );
            observer(&stats);

            generation += 1;
        }

        // 3. Report the fittest timetable
        let best = population.fittest(0)?.clone();
        let mut timetable = seed.clone();
        timetable.create_classes(best.chromosome())?;
        let clashes = timetable.calc_clashes()?;
        let solved = ga.is_termination_condition_met(&population);
        let generations = generation - 1;

        info!(
            "GA finished after {generations} generations: best fitness {:.4}, {clashes} clashes{}",
            best_fitness(&population),
            if solved { " (solved)" } else { "" }
        );

        Ok(GaResult {
            best_fitness: best.fitness().unwrap_or(0.0),
            best,
            clashes,
            generations,
            solved,
            cancelled,
            final_temperature: ga.temperature(),
            fitness_history,
        })
    }
}

fn best_fitness(population: &Population) -> f64 {
    population
        .fittest(0)
        .ok()
        .and_then(Individual::fitness)
        .unwrap_or(0.0)
}

// ============================================================================
// Tests
// ============================================================================
