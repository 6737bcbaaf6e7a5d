//! University timetable generation with a block-aware genetic algorithm.
//!
//! - **Domain** ([`domain`]): rooms, professors, student groups, modules and
//!   timeslots, plus the [`TimetableDomain`](domain::TimetableDomain)
//!   collaborator that decodes a chromosome and counts clashes.
//!   [`Timetable`](domain::Timetable) is an in-memory implementation.
//! - **Genetic Algorithm** ([`ga`]): seeded chromosome construction,
//!   tournament selection, block-safe single-point crossover, adaptive
//!   mutation scaled by an annealing temperature, and a driver loop.
//!
//! # Architecture
//!
//! The GA never interprets a timetable itself. Fitness is
//! `1 / (clashes + 1)`, where the clash count comes from the domain
//! collaborator evaluating a private copy of the seed timetable; a run
//! terminates when a clash-free timetable (fitness exactly 1.0) appears.
//!
//! # Features
//!
//! - `parallel` (default): evaluate populations with rayon
//! - `serde`: `Serialize`/`Deserialize` for configuration and solutions

pub mod domain;
pub mod error;
pub mod ga;
pub mod random;

pub use error::{Result, TimetableError};
