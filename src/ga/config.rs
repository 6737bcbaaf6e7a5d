//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that stay fixed for one run. The only
//! state that changes across generations, the annealing temperature, lives
//! on [`GeneticAlgorithm`](super::GeneticAlgorithm).

use crate::error::{Result, TimetableError};

/// Default geometric cooling rate applied once per generation.
pub const DEFAULT_COOLING_RATE: f64 = 0.001;

/// Configuration for the timetable GA.
///
/// # Defaults
///
/// ```
/// use u_timetable::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.elitism_count, 2);
/// assert_eq!(config.tournament_size, 5);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_timetable::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(200)
///     .with_tournament_size(8)
///     .with_elitism_count(4)
///     .with_mutation_rate(0.02)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Number of individuals in the population.
    pub population_size: usize,

    /// Generation budget checked by the driver loop.
    ///
    /// The run stops once the generation counter exceeds this value.
    pub max_generations: usize,

    /// Base probability that a single gene is mutated (0.0–1.0).
    ///
    /// Scaled per individual by the adaptive rate and by the temperature.
    pub mutation_rate: f64,

    /// Probability that a non-elite individual is recombined (0.0–1.0).
    pub crossover_rate: f64,

    /// Highest fitness rank passed through unchanged.
    ///
    /// Ranks `0..=elitism_count` survive crossover and mutation untouched.
    pub elitism_count: usize,

    /// Number of individuals sampled per tournament.
    pub tournament_size: usize,

    /// Geometric cooling rate: `temperature *= 1 - cooling_rate`.
    ///
    /// Defaults to [`DEFAULT_COOLING_RATE`]; keep the default unless a run
    /// deliberately needs faster or slower annealing.
    pub cooling_rate: f64,

    /// Whether to evaluate individuals in parallel using rayon.
    ///
    /// Has no effect unless the `parallel` feature is enabled.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 1000,
            mutation_rate: 0.01,
            crossover_rate: 0.9,
            elitism_count: 2,
            tournament_size: 5,
            cooling_rate: DEFAULT_COOLING_RATE,
            parallel: true,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the generation budget.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the base mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the elitism count.
    pub fn with_elitism_count(mut self, n: usize) -> Self {
        self.elitism_count = n;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the cooling rate.
    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Preset for quick feasibility checks on small timetables.
    ///
    /// - Population: 50, Generations: 200, Tournament: 3, Elitism: 1
    pub fn fast() -> Self {
        Self {
            population_size: 50,
            max_generations: 200,
            tournament_size: 3,
            elitism_count: 1,
            ..Self::default()
        }
    }

    /// Preset matching the defaults.
    ///
    /// - Population: 100, Generations: 1000, Tournament: 5, Elitism: 2
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Preset for large timetables: bigger population, longer run.
    ///
    /// - Population: 200, Generations: 5000, Tournament: 8, Elitism: 4
    pub fn quality() -> Self {
        Self {
            population_size: 200,
            max_generations: 5000,
            tournament_size: 8,
            elitism_count: 4,
            ..Self::default()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(TimetableError::InvalidConfig(msg.into()));
        if self.population_size < 2 {
            return invalid("population_size must be at least 2");
        }
        if self.max_generations == 0 {
            return invalid("max_generations must be at least 1");
        }
        if self.elitism_count >= self.population_size {
            return invalid("elitism_count must be below population_size");
        }
        if self.tournament_size == 0 {
            return invalid("tournament_size must be at least 1");
        }
        if self.tournament_size > self.population_size {
            return invalid("tournament_size must not exceed population_size");
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return invalid("mutation_rate must be within [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return invalid("crossover_rate must be within [0, 1]");
        }
        if !(0.0..1.0).contains(&self.cooling_rate) {
            return invalid("cooling_rate must be within [0, 1)");
        }
        Ok(())
    }
}
