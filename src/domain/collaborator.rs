//! The contract between the GA engine and the timetable domain.

use rand::seq::IndexedRandom;
use rand::Rng;

use super::types::{Group, Module, ModuleId, RoomId, Timeslot};
use crate::error::{Result, TimetableError};
use crate::ga::Chromosome;

/// A timetable domain model the GA can seed individuals from and score.
///
/// The engine treats the domain as a read-only seed: before materializing
/// an individual it clones the seed, so [`create_classes`] may freely
/// mutate `self`. Implementations must therefore be cheap enough to clone
/// once per evaluation, and `Send + Sync` so evaluations can run on worker
/// threads.
///
/// Group and module iteration order must be stable: chromosome loci are
/// laid out group by group, module by module, and [`create_classes`] reads
/// them back in the same order.
///
/// [`create_classes`]: TimetableDomain::create_classes
pub trait TimetableDomain: Clone + Send + Sync {
    /// Student groups, in scheduling order.
    fn groups(&self) -> &[Group];

    /// Resolves a module descriptor.
    fn module(&self, id: ModuleId) -> Option<&Module>;

    /// Every timeslot of the week.
    fn timeslots(&self) -> &[Timeslot];

    /// The hour directly after `timeslot`, if the day has one.
    fn next_timeslot(&self, timeslot: Timeslot) -> Option<Timeslot>;

    /// Upper bound on lecture hours emitted as one contiguous block.
    fn max_continuous_slots(&self) -> usize;

    /// A room reserved for a course code, if any.
    fn preferred_room(&self, code: &str) -> Option<RoomId>;

    /// Materializes a chromosome into scheduled classes held by `self`.
    fn create_classes(&mut self, chromosome: &Chromosome) -> Result<()>;

    /// Counts scheduling conflicts among the classes created last.
    fn calc_clashes(&self) -> Result<usize>;

    /// Total number of timeslots.
    fn timeslot_count(&self) -> usize {
        self.timeslots().len()
    }

    /// Draws a timeslot uniformly.
    fn random_timeslot<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Timeslot> {
        self.timeslots()
            .choose(rng)
            .copied()
            .ok_or(TimetableError::NoTimeslots)
    }

    /// Highest slot index on `day`.
    fn last_slot_of_day(&self, day: u8) -> Option<u8> {
        self.timeslots()
            .iter()
            .filter(|t| t.day == day)
            .map(|t| t.slot)
            .max()
    }

    /// Resolves a module or fails with [`TimetableError::UnknownModule`].
    fn require_module(&self, id: ModuleId) -> Result<&Module> {
        self.module(id).ok_or(TimetableError::UnknownModule(id))
    }
}
