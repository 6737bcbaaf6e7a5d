//! Genetic algorithm for university timetables.
//!
//! A candidate timetable is a flat [`Chromosome`] of genes read as
//! `(timeslot, room, professor)` [`Triple`]s, one per scheduled hour.
//! Consecutive triples that chain (same room and professor, next timeslot
//! of the same day) form a duration block: one multi-hour session that the
//! operators never split.
//!
//! # Key Types
//!
//! - [`GaConfig`]: Run parameters (population size, rates, elitism, presets)
//! - [`Individual`] / [`Population`]: Candidate timetables and their fitness
//! - [`GeneticAlgorithm`]: Fitness, selection, crossover, mutation, cooling
//! - [`GaRunner`]: Executes the evolutionary loop
//! - [`GaResult`]: Final result with statistics
//!
//! # Submodules
//!
//! - [`operators`]: Block-safe crossover point, adaptive block-preserving mutation
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Srinivas & Patnaik (1994), "Adaptive Probabilities of Crossover and
//!   Mutation in Genetic Algorithms"

mod algorithm;
mod chromosome;
mod config;
mod individual;
pub mod operators;
mod population;
mod runner;
mod selection;
mod types;

pub use algorithm::GeneticAlgorithm;
pub use chromosome::{Chromosome, GENES_PER_TRIPLE};
pub use config::{GaConfig, DEFAULT_COOLING_RATE};
pub use individual::Individual;
pub use population::Population;
pub use runner::{GaResult, GaRunner, GenerationStats};
pub use selection::tournament;
pub use types::{Gene, Triple};
