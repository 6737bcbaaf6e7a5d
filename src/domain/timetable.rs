//! In-memory timetable collaborator.
//!
//! [`Timetable`] holds rooms, timeslots, modules and groups, turns a
//! chromosome into [`ScheduledClass`]es and counts clashes among them.

use std::collections::{BTreeMap, HashMap};

use super::collaborator::TimetableDomain;
use super::types::{Group, GroupId, Module, ModuleId, ProfessorId, Room, RoomId, Timeslot};
use crate::error::{Result, TimetableError};
use crate::ga::Chromosome;

/// One scheduled hour of one module for one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduledClass {
    pub group: GroupId,
    pub module: ModuleId,
    pub professor: ProfessorId,
    pub timeslot: Timeslot,
    pub room: RoomId,
}

/// Breakdown of the conflicts found by [`Timetable::clash_report`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClashReport {
    /// Classes in a room with fewer seats than the group has students.
    pub room_capacity: usize,
    /// Extra classes sharing a room in the same hour.
    pub room_double_booked: usize,
    /// Extra classes sharing a professor in the same hour.
    pub professor_double_booked: usize,
    /// Extra classes of the same group in the same hour.
    pub group_double_booked: usize,
}

impl ClashReport {
    /// Sum of every conflict category.
    pub fn total(&self) -> usize {
        self.room_capacity
            + self.room_double_booked
            + self.professor_double_booked
            + self.group_double_booked
    }
}

/// Default bound on contiguous lecture hours.
pub const DEFAULT_MAX_CONTINUOUS_SLOTS: usize = 2;

/// An in-memory timetable.
///
/// # Examples
///
/// ```
/// use u_timetable::domain::{Group, GroupId, Module, ModuleId, ProfessorId, RoomId, Timetable};
///
/// let timetable = Timetable::new()
///     .with_room(RoomId(1), 40)
///     .with_day(1, 1..=4)
///     .with_module(Module::new(ModuleId(1), "CS101", [ProfessorId(1)]).with_slots(2))
///     .with_group(Group::new(GroupId(1), 30).with_modules([ModuleId(1)]).with_rooms([RoomId(1)]));
///
/// assert_eq!(timetable.expected_chromosome_len().unwrap(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct Timetable {
    rooms: BTreeMap<RoomId, Room>,
    timeslots: Vec<Timeslot>,
    modules: BTreeMap<ModuleId, Module>,
    groups: Vec<Group>,
    preferred_rooms: HashMap<String, RoomId>,
    max_continuous_slots: usize,
    classes: Vec<ScheduledClass>,
}

impl Default for Timetable {
    fn default() -> Self {
        Self {
            rooms: BTreeMap::new(),
            timeslots: Vec::new(),
            modules: BTreeMap::new(),
            groups: Vec::new(),
            preferred_rooms: HashMap::new(),
            max_continuous_slots: DEFAULT_MAX_CONTINUOUS_SLOTS,
            classes: Vec::new(),
        }
    }
}

impl Timetable {
    /// Creates an empty timetable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a room.
    pub fn with_room(mut self, id: RoomId, capacity: u32) -> Self {
        self.rooms.insert(id, Room { id, capacity });
        self
    }

    /// Adds a timeslot. Duplicates are ignored.
    pub fn with_timeslot(mut self, timeslot: Timeslot) -> Self {
        if let Err(pos) = self.timeslots.binary_search(&timeslot) {
            self.timeslots.insert(pos, timeslot);
        }
        self
    }

    /// Adds a timeslot from its `D<day>T<slot>` token.
    pub fn with_timeslot_token(self, token: &str) -> Result<Self> {
        let timeslot = token.parse()?;
        Ok(self.with_timeslot(timeslot))
    }

    /// Adds every slot of `slots` on `day`.
    pub fn with_day(self, day: u8, slots: impl IntoIterator<Item = u8>) -> Self {
        slots
            .into_iter()
            .fold(self, |tt, slot| tt.with_timeslot(Timeslot::new(day, slot)))
    }

    /// Adds (or replaces) a module.
    pub fn with_module(mut self, module: Module) -> Self {
        self.modules.insert(module.id, module);
        self
    }

    /// Appends a group.
    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    /// Reserves a room for a course code.
    pub fn with_preferred_room(mut self, code: &str, room: RoomId) -> Self {
        self.preferred_rooms.insert(code.to_string(), room);
        self
    }

    /// Sets the bound on contiguous lecture hours.
    pub fn with_max_continuous_slots(mut self, n: usize) -> Self {
        self.max_continuous_slots = n;
        self
    }

    /// Looks up a room.
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    /// Classes produced by the last [`create_classes`](TimetableDomain::create_classes).
    pub fn classes(&self) -> &[ScheduledClass] {
        &self.classes
    }

    /// Chromosome length every seeded individual of this timetable has.
    pub fn expected_chromosome_len(&self) -> Result<usize> {
        let mut hours = 0usize;
        for group in &self.groups {
            for &module_id in &group.module_ids {
                hours += self.require_module(module_id)?.allocated_hours(group.id) as usize;
            }
        }
        Ok(hours * 3)
    }

    /// Counts conflicts by category.
    pub fn clash_report(&self) -> Result<ClashReport> {
        let mut report = ClashReport::default();
        let mut rooms: HashMap<(RoomId, Timeslot), usize> = HashMap::new();
        let mut professors: HashMap<(ProfessorId, Timeslot), usize> = HashMap::new();
        let mut groups: HashMap<(GroupId, Timeslot), usize> = HashMap::new();

        for class in &self.classes {
            let room = self.room(class.room).ok_or_else(|| {
                TimetableError::MalformedChromosome(format!("unknown room {}", class.room))
            })?;
            let group_size = self
                .groups
                .iter()
                .find(|g| g.id == class.group)
                .map_or(0, |g| g.size);
            if room.capacity < group_size {
                report.room_capacity += 1;
            }
            *rooms.entry((class.room, class.timeslot)).or_insert(0) += 1;
            *professors.entry((class.professor, class.timeslot)).or_insert(0) += 1;
            *groups.entry((class.group, class.timeslot)).or_insert(0) += 1;
        }

        fn extra<K>(counts: HashMap<K, usize>) -> usize {
            counts.values().map(|&n| n.saturating_sub(1)).sum()
        }
        report.room_double_booked = extra(rooms);
        report.professor_double_booked = extra(professors);
        report.group_double_booked = extra(groups);
        Ok(report)
    }
}

impl TimetableDomain for Timetable {
    fn groups(&self) -> &[Group] {
        &self.groups
    }

    fn module(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(&id)
    }

    fn timeslots(&self) -> &[Timeslot] {
        &self.timeslots
    }

    fn next_timeslot(&self, timeslot: Timeslot) -> Option<Timeslot> {
        let next = Timeslot::new(timeslot.day, timeslot.slot.checked_add(1)?);
        self.timeslots.binary_search(&next).ok().map(|_| next)
    }

    fn max_continuous_slots(&self) -> usize {
        self.max_continuous_slots
    }

    fn preferred_room(&self, code: &str) -> Option<RoomId> {
        self.preferred_rooms.get(code).copied()
    }

    fn create_classes(&mut self, chromosome: &Chromosome) -> Result<()> {
        let mut classes = Vec::with_capacity(chromosome.triple_count());
        let mut t = 0usize;

        for group in &self.groups {
            for &module_id in &group.module_ids {
                let module = self
                    .modules
                    .get(&module_id)
                    .ok_or(TimetableError::UnknownModule(module_id))?;
                for _ in 0..module.allocated_hours(group.id) {
                    let triple = chromosome.triple(t).ok_or_else(|| {
                        TimetableError::MalformedChromosome(format!(
                            "triple {t} is missing or not (timeslot, room, professor)"
                        ))
                    })?;
                    classes.push(ScheduledClass {
                        group: group.id,
                        module: module_id,
                        professor: triple.professor,
                        timeslot: triple.timeslot,
                        room: triple.room,
                    });
                    t += 1;
                }
            }
        }

        if t * 3 != chromosome.len() {
            return Err(TimetableError::MalformedChromosome(format!(
                "expected {} genes, found {}",
                t * 3,
                chromosome.len()
            )));
        }
        self.classes = classes;
        Ok(())
    }

    fn calc_clashes(&self) -> Result<usize> {
        Ok(self.clash_report()?.total())
    }
}

/// Small fixture shared by unit tests across the crate.
#[cfg(test)]
pub(crate) fn sample_timetable() -> Timetable {
    Timetable::new()
        .with_room(RoomId(1), 40)
        .with_room(RoomId(2), 30)
        .with_room(RoomId(3), 60)
        .with_day(1, 1..=5)
        .with_day(2, 1..=5)
        .with_module(
            Module::new(ModuleId(1), "CS101 Programming", [ProfessorId(1), ProfessorId(2)])
                .with_slots(2),
        )
        .with_module(Module::new(ModuleId(2), "CS102 Lab 2hr", [ProfessorId(3)]).with_slots(1))
        .with_module(Module::new(ModuleId(3), "MA101 Calculus", [ProfessorId(4)]).with_slots(3))
        .with_group(
            Group::new(GroupId(1), 30)
                .with_modules([ModuleId(1), ModuleId(2)])
                .with_rooms([RoomId(1), RoomId(2)]),
        )
        .with_group(
            Group::new(GroupId(2), 25)
                .with_modules([ModuleId(1), ModuleId(3)])
                .with_rooms([RoomId(1), RoomId(3)]),
        )
        .with_max_continuous_slots(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::Gene;

    fn genes(triples: &[(&str, u32, u32)]) -> Chromosome {
        Chromosome::from_genes(
            triples
                .iter()
                .flat_map(|&(ts, room, prof)| {
                    [
                        Gene::Timeslot(ts.parse().unwrap()),
                        Gene::Room(RoomId(room)),
                        Gene::Professor(ProfessorId(prof)),
                    ]
                })
                .collect(),
        )
    }

    fn tiny() -> Timetable {
        Timetable::new()
            .with_room(RoomId(1), 30)
            .with_room(RoomId(2), 10)
            .with_day(1, 1..=3)
            .with_module(Module::new(ModuleId(1), "A", [ProfessorId(1)]).with_slots(1))
            .with_module(Module::new(ModuleId(2), "B", [ProfessorId(2)]).with_slots(1))
            .with_group(
                Group::new(GroupId(1), 20)
                    .with_modules([ModuleId(1), ModuleId(2)])
                    .with_rooms([RoomId(1), RoomId(2)]),
            )
    }

    #[test]
    fn test_expected_len() {
        // group 1: 2 lecture hours + one 2-hour lab; group 2: 2 + 3 lecture hours
        assert_eq!(sample_timetable().expected_chromosome_len().unwrap(), 27);
    }

    #[test]
    fn test_next_timeslot() {
        let tt = sample_timetable();
        assert_eq!(tt.next_timeslot(Timeslot::new(1, 1)), Some(Timeslot::new(1, 2)));
        assert_eq!(tt.next_timeslot(Timeslot::new(1, 5)), None);
        assert_eq!(tt.last_slot_of_day(2), Some(5));
        assert_eq!(tt.last_slot_of_day(3), None);
        assert_eq!(tt.timeslot_count(), 10);
    }

    #[test]
    fn test_timeslot_token_builder() {
        let tt = Timetable::new()
            .with_timeslot_token("D1T2")
            .unwrap()
            .with_timeslot_token("D1T1")
            .unwrap()
            .with_timeslot_token("D1T1")
            .unwrap();
        assert_eq!(tt.timeslots(), &[Timeslot::new(1, 1), Timeslot::new(1, 2)]);
        assert!(Timetable::new().with_timeslot_token("Monday").is_err());
    }

    #[test]
    fn test_clash_free() {
        let mut tt = tiny();
        tt.create_classes(&genes(&[("D1T1", 1, 1), ("D1T2", 1, 2)])).unwrap();
        assert_eq!(tt.classes().len(), 2);
        assert_eq!(tt.calc_clashes().unwrap(), 0);
    }

    #[test]
    fn test_clash_categories() {
        let mut tt = tiny();
        // Same hour for one group, second class in a 10-seat room.
        tt.create_classes(&genes(&[("D1T1", 1, 1), ("D1T1", 2, 2)])).unwrap();
        let report = tt.clash_report().unwrap();
        assert_eq!(report.room_capacity, 1);
        assert_eq!(report.room_double_booked, 0);
        assert_eq!(report.professor_double_booked, 0);
        assert_eq!(report.group_double_booked, 1);
        assert_eq!(report.total(), 2);

        tt.create_classes(&genes(&[("D1T3", 1, 1), ("D1T3", 1, 1)])).unwrap();
        let report = tt.clash_report().unwrap();
        assert_eq!(report.room_double_booked, 1);
        assert_eq!(report.professor_double_booked, 1);
        assert_eq!(report.group_double_booked, 1);
        assert_eq!(tt.calc_clashes().unwrap(), 3);
    }

    #[test]
    fn test_create_classes_rejects_wrong_length() {
        let mut tt = tiny();
        let err = tt.create_classes(&genes(&[("D1T1", 1, 1)])).unwrap_err();
        assert!(matches!(err, TimetableError::MalformedChromosome(_)));

        let err = tt
            .create_classes(&genes(&[("D1T1", 1, 1), ("D1T2", 1, 2), ("D1T3", 1, 2)]))
            .unwrap_err();
        assert!(matches!(err, TimetableError::MalformedChromosome(_)));
    }

    #[test]
    fn test_create_classes_rejects_filler() {
        let mut tt = tiny();
        let chromosome = Chromosome::from_genes(vec![Gene::Filler(0); 6]);
        assert!(matches!(
            tt.create_classes(&chromosome),
            Err(TimetableError::MalformedChromosome(_))
        ));
    }

    #[test]
    fn test_unknown_room_is_an_error() {
        let mut tt = tiny();
        tt.create_classes(&genes(&[("D1T1", 9, 1), ("D1T2", 1, 2)])).unwrap();
        assert!(matches!(
            tt.calc_clashes(),
            Err(TimetableError::MalformedChromosome(_))
        ));
    }

    #[test]
    fn test_preferred_room_lookup() {
        let tt = tiny().with_preferred_room("A", RoomId(2));
        assert_eq!(tt.preferred_room("A"), Some(RoomId(2)));
        assert_eq!(tt.preferred_room("B"), None);
    }
}
