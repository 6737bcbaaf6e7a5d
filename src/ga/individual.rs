//! Candidate timetables.

use log::trace;
use rand::Rng;

use super::chromosome::Chromosome;
use super::types::{Gene, Triple};
use crate::domain::{AllocationTracker, Group, Module, RoomId, SessionKind, Timeslot, TimetableDomain};
use crate::error::{Result, TimetableError};

/// One candidate solution: a chromosome and its fitness.
///
/// Fitness is `None` until the individual has been evaluated.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Individual {
    chromosome: Chromosome,
    fitness: Option<f64>,
}

impl Individual {
    /// Wraps a chromosome as an unevaluated individual.
    pub fn new(chromosome: Chromosome) -> Self {
        Self {
            chromosome,
            fitness: None,
        }
    }

    /// Builds a realistic timetable from the domain model.
    ///
    /// Groups and their modules are visited in domain order. Lab modules
    /// emit one contiguous block of `duration_hours` triples per required
    /// session, starting at a timeslot that leaves room for the whole
    /// block before the end of its day. Lecture modules emit one triple per
    /// required hour, extended into short blocks through the next timeslot
    /// while `max_continuous_slots` and the hour quota allow.
    ///
    /// Rooms come from the course's preferred room, otherwise uniformly
    /// from the group's available rooms.
    pub fn from_seed<D: TimetableDomain, R: Rng + ?Sized>(domain: &D, rng: &mut R) -> Result<Self> {
        let mut triples = Vec::new();
        let mut tracker = AllocationTracker::new();

        for group in domain.groups() {
            for &module_id in &group.module_ids {
                let module = domain.require_module(module_id)?;
                match module.kind() {
                    SessionKind::Lab => {
                        seed_lab(domain, group, module, &mut tracker, &mut triples, rng)?
                    }
                    SessionKind::Lecture => {
                        seed_lecture(domain, group, module, &mut tracker, &mut triples, rng)?
                    }
                }
            }
        }

        trace!(
            "seeded individual with {} triples ({} hours allocated)",
            triples.len(),
            tracker.total()
        );
        Ok(Self::new(Chromosome::from_triples(triples)))
    }

    /// Creates an individual of `length` uniform 0/1 filler genes.
    ///
    /// Used as a placeholder for crossover offspring; never a realistic
    /// timetable.
    pub fn random<R: Rng + ?Sized>(length: usize, rng: &mut R) -> Self {
        let genes = (0..length)
            .map(|_| Gene::Filler(rng.random_range(0..=1)))
            .collect();
        Self::new(Chromosome::from_genes(genes))
    }

    /// The chromosome.
    pub fn chromosome(&self) -> &Chromosome {
        &self.chromosome
    }

    /// Mutable access to the chromosome.
    pub fn chromosome_mut(&mut self) -> &mut Chromosome {
        &mut self.chromosome
    }

    /// Number of genes.
    pub fn chromosome_len(&self) -> usize {
        self.chromosome.len()
    }

    /// Gene at `index`.
    pub fn gene(&self, index: usize) -> Result<Gene> {
        self.chromosome.gene(index)
    }

    /// Overwrites the gene at `index`.
    pub fn set_gene(&mut self, index: usize, gene: Gene) -> Result<()> {
        self.chromosome.set_gene(index, gene)
    }

    /// Fitness, once evaluated.
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Stores the fitness.
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Fitness used for ranking: unevaluated individuals rank below every
    /// evaluated one.
    pub(crate) fn rank_fitness(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }
}

impl std::fmt::Display for Individual {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.chromosome, f)
    }
}

fn choose_room<D: TimetableDomain, R: Rng + ?Sized>(
    domain: &D,
    group: &Group,
    module: &Module,
    rng: &mut R,
) -> Result<RoomId> {
    match domain.preferred_room(module.code.as_str()) {
        Some(room) => Ok(room),
        None => group.random_room(rng),
    }
}

/// Last timeslot of a block of `hours` slots starting at `start`, if every
/// slot of the block exists.
fn block_end<D: TimetableDomain>(domain: &D, start: Timeslot, hours: u32) -> Option<Timeslot> {
    (1..hours).try_fold(start, |ts, _| domain.next_timeslot(ts))
}

fn seed_lab<D: TimetableDomain, R: Rng + ?Sized>(
    domain: &D,
    group: &Group,
    module: &Module,
    tracker: &mut AllocationTracker,
    triples: &mut Vec<Triple>,
    rng: &mut R,
) -> Result<()> {
    let hours = module.block_hours();

    // Uniform over the timeslots that start an unbroken run of `hours`
    // slots; same distribution as redrawing until one fits.
    let eligible: Vec<Timeslot> = domain
        .timeslots()
        .iter()
        .copied()
        .filter(|&ts| block_end(domain, ts, hours).is_some())
        .collect();
    if eligible.is_empty() {
        return Err(TimetableError::NoFeasibleLabSlot {
            module: module.id,
            hours,
        });
    }

    for _ in 0..module.required_slots(group.id) {
        let mut timeslot = eligible[rng.random_range(0..eligible.len())];
        let room = choose_room(domain, group, module, rng)?;
        let professor = module.random_professor(rng)?;

        for hour in 0..hours {
            if hour > 0 {
                timeslot = domain
                    .next_timeslot(timeslot)
                    .ok_or(TimetableError::BrokenTimeslotChain(timeslot))?;
            }
            triples.push(Triple {
                timeslot,
                room,
                professor,
            });
            tracker.increase(group.id, module.id);
        }
    }
    Ok(())
}

fn seed_lecture<D: TimetableDomain, R: Rng + ?Sized>(
    domain: &D,
    group: &Group,
    module: &Module,
    tracker: &mut AllocationTracker,
    triples: &mut Vec<Triple>,
    rng: &mut R,
) -> Result<()> {
    let required = module.required_slots(group.id);
    let max_continuous = domain.max_continuous_slots();

    let mut hour = 1usize;
    while hour <= required as usize {
        let timeslot = domain.random_timeslot(rng)?;
        let room = choose_room(domain, group, module, rng)?;
        let professor = module.random_professor(rng)?;
        triples.push(Triple {
            timeslot,
            room,
            professor,
        });
        tracker.increase(group.id, module.id);

        let mut next = domain.next_timeslot(timeslot);
        while let Some(timeslot) = next {
            if hour + 1 > max_continuous || tracker.is_satisfied(group.id, module.id, required) {
                break;
            }
            triples.push(Triple {
                timeslot,
                room,
                professor,
            });
            tracker.increase(group.id, module.id);
            next = domain.next_timeslot(timeslot);
            hour += 1;
        }
        hour += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{sample_timetable, GroupId, ModuleId, ProfessorId, Timetable};
    use crate::random::create_rng;

    #[test]
    fn test_from_seed_length_matches_expected() {
        let tt = sample_timetable();
        let expected = tt.expected_chromosome_len().unwrap();
        let mut rng = create_rng(11);
        for _ in 0..50 {
            let ind = Individual::from_seed(&tt, &mut rng).unwrap();
            assert_eq!(ind.chromosome_len(), expected);
            assert!(ind.fitness().is_none());
            assert!(ind.chromosome().triples().all(|t| t.is_some()));
        }
    }

    #[test]
    fn test_lab_block_is_contiguous() {
        let tt = sample_timetable();
        let mut rng = create_rng(5);
        for _ in 0..100 {
            let ind = Individual::from_seed(&tt, &mut rng).unwrap();
            // group 1: two lecture hours of module 1, then the 2-hour lab
            let c = ind.chromosome();
            let first = c.triple(2).unwrap();
            let second = c.triple(3).unwrap();
            assert!(first.chains_into(&second), "lab block broken: {c}");
            assert!(first.timeslot.slot <= 4);
            assert_eq!(first.professor, ProfessorId(3));
        }
    }

    #[test]
    fn test_rooms_come_from_group() {
        let tt = sample_timetable();
        let mut rng = create_rng(8);
        let ind = Individual::from_seed(&tt, &mut rng).unwrap();
        let c = ind.chromosome();
        for t in 0..4 {
            let room = c.triple(t).unwrap().room;
            assert!(room == RoomId(1) || room == RoomId(2));
        }
        for t in 4..9 {
            let room = c.triple(t).unwrap().room;
            assert!(room == RoomId(1) || room == RoomId(3));
        }
    }

    #[test]
    fn test_preferred_room_wins() {
        let tt = sample_timetable().with_preferred_room("CS102 Lab 2hr", RoomId(3));
        let mut rng = create_rng(2);
        let ind = Individual::from_seed(&tt, &mut rng).unwrap();
        assert_eq!(ind.chromosome().triple(2).unwrap().room, RoomId(3));
        assert_eq!(ind.chromosome().triple(3).unwrap().room, RoomId(3));
    }

    #[test]
    fn test_lecture_hours_match_quota() {
        let tt = Timetable::new()
            .with_room(RoomId(1), 50)
            .with_day(1, 1..=8)
            .with_module(Module::new(ModuleId(1), "HI100", [ProfessorId(1)]).with_slots(5))
            .with_group(
                crate::domain::Group::new(GroupId(1), 10)
                    .with_modules([ModuleId(1)])
                    .with_rooms([RoomId(1)]),
            )
            .with_max_continuous_slots(3);
        let mut rng = create_rng(21);
        for _ in 0..50 {
            let ind = Individual::from_seed(&tt, &mut rng).unwrap();
            assert_eq!(ind.chromosome().triple_count(), 5);
        }
    }

    #[test]
    fn test_seeding_does_not_touch_domain() {
        let tt = sample_timetable();
        let before = format!("{tt:?}");
        let mut rng = create_rng(1);
        Individual::from_seed(&tt, &mut rng).unwrap();
        Individual::from_seed(&tt, &mut rng).unwrap();
        assert_eq!(format!("{tt:?}"), before);
    }

    #[test]
    fn test_empty_room_set_is_an_error() {
        let tt = Timetable::new()
            .with_day(1, 1..=3)
            .with_module(Module::new(ModuleId(1), "X", [ProfessorId(1)]))
            .with_group(crate::domain::Group::new(GroupId(4), 10).with_modules([ModuleId(1)]));
        let mut rng = create_rng(1);
        assert_eq!(
            Individual::from_seed(&tt, &mut rng),
            Err(TimetableError::EmptyRoomSet(GroupId(4)))
        );
    }

    #[test]
    fn test_lab_too_long_for_day() {
        let tt = Timetable::new()
            .with_room(RoomId(1), 10)
            .with_day(1, 1..=3)
            .with_module(Module::new(ModuleId(1), "Lab 4hr", [ProfessorId(1)]))
            .with_group(
                crate::domain::Group::new(GroupId(1), 10)
                    .with_modules([ModuleId(1)])
                    .with_rooms([RoomId(1)]),
            );
        let mut rng = create_rng(1);
        assert_eq!(
            Individual::from_seed(&tt, &mut rng),
            Err(TimetableError::NoFeasibleLabSlot {
                module: ModuleId(1),
                hours: 4
            })
        );
    }

    fn gapped_day(slots: &[u8]) -> Timetable {
        Timetable::new()
            .with_room(RoomId(1), 10)
            .with_day(1, slots.iter().copied())
            .with_module(Module::new(ModuleId(1), "CS Lab 2hr", [ProfessorId(1)]))
            .with_group(
                crate::domain::Group::new(GroupId(1), 10)
                    .with_modules([ModuleId(1)])
                    .with_rooms([RoomId(1)]),
            )
    }

    #[test]
    fn test_lab_skips_starts_before_a_gap() {
        // Lunch break between slots 2 and 4.
        let tt = gapped_day(&[1, 2, 4, 5]);
        let mut rng = create_rng(17);
        for _ in 0..200 {
            let ind = Individual::from_seed(&tt, &mut rng).unwrap();
            let c = ind.chromosome();
            let first = c.triple(0).unwrap();
            assert!(first.chains_into(&c.triple(1).unwrap()), "lab block broken: {c}");
            assert!(first.timeslot.slot == 1 || first.timeslot.slot == 4);
        }
    }

    #[test]
    fn test_lab_with_only_isolated_slots() {
        let tt = gapped_day(&[1, 3, 5]);
        let mut rng = create_rng(1);
        assert_eq!(
            Individual::from_seed(&tt, &mut rng),
            Err(TimetableError::NoFeasibleLabSlot {
                module: ModuleId(1),
                hours: 2
            })
        );
    }

    #[test]
    fn test_unknown_module() {
        let tt = Timetable::new().with_day(1, 1..=3).with_group(
            crate::domain::Group::new(GroupId(1), 10)
                .with_modules([ModuleId(77)])
                .with_rooms([RoomId(1)]),
        );
        let mut rng = create_rng(1);
        assert_eq!(
            Individual::from_seed(&tt, &mut rng),
            Err(TimetableError::UnknownModule(ModuleId(77)))
        );
    }

    #[test]
    fn test_random_individual() {
        let mut rng = create_rng(3);
        let ind = Individual::random(30, &mut rng);
        assert_eq!(ind.chromosome_len(), 30);
        assert!(ind
            .chromosome()
            .genes()
            .iter()
            .all(|g| matches!(g, Gene::Filler(0) | Gene::Filler(1))));
        assert!(ind.gene(30).is_err());
    }

    #[test]
    fn test_fitness_accessors() {
        let mut ind = Individual::new(Chromosome::default());
        assert_eq!(ind.fitness(), None);
        assert_eq!(ind.rank_fitness(), f64::NEG_INFINITY);
        ind.set_fitness(0.5);
        assert_eq!(ind.fitness(), Some(0.5));
    }
}
