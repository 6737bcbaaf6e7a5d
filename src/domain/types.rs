//! Typed domain descriptors.
//!
//! Timeslot tokens (`D<day>T<slot>`) and module codes (`"... Lab 3hr"`) are
//! parsed once, when the domain is loaded, into plain fields. Operators never
//! re-parse strings.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::error::{Result, TimetableError};

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

id_newtype!(
    /// Identifier of a teaching room.
    RoomId,
    "R"
);
id_newtype!(
    /// Identifier of a professor.
    ProfessorId,
    "P"
);
id_newtype!(
    /// Identifier of a student group (class).
    GroupId,
    "G"
);
id_newtype!(
    /// Identifier of a module (course).
    ModuleId,
    "M"
);

// ============================================================================
// Timeslot
// ============================================================================

/// A teaching hour, identified by day and slot index within the day.
///
/// The textual form is `D<day>T<slot>`. Slots increase monotonically for
/// temporally adjacent hours of the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timeslot {
    /// Day index.
    pub day: u8,
    /// Slot index within the day.
    pub slot: u8,
}

impl Timeslot {
    /// Creates a timeslot.
    pub const fn new(day: u8, slot: u8) -> Self {
        Self { day, slot }
    }

    /// Whether `other` is the hour immediately after `self` on the same day.
    pub fn is_followed_by(self, other: Timeslot) -> bool {
        self.day == other.day && self.slot.checked_add(1) == Some(other.slot)
    }
}

impl fmt::Display for Timeslot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}T{}", self.day, self.slot)
    }
}

impl FromStr for Timeslot {
    type Err = TimetableError;

    fn from_str(token: &str) -> Result<Self> {
        let invalid = || TimetableError::InvalidTimeslotToken(token.to_string());
        let rest = token.strip_prefix('D').ok_or_else(invalid)?;
        let (day, slot) = rest.split_once('T').ok_or_else(invalid)?;
        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(day) || !all_digits(slot) {
            return Err(invalid());
        }
        Ok(Timeslot {
            day: day.parse().map_err(|_| invalid())?,
            slot: slot.parse().map_err(|_| invalid())?,
        })
    }
}

// ============================================================================
// Module code
// ============================================================================

/// Kind of teaching session a module is delivered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionKind {
    /// Hours may be spread across the week in blocks.
    #[default]
    Lecture,
    /// Each session is one contiguous block of `duration_hours`.
    Lab,
}

/// A module's course code with its session kind and duration extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModuleCode {
    raw: String,
    kind: SessionKind,
    duration_hours: u32,
}

impl ModuleCode {
    /// Parses a course code.
    ///
    /// The code is a lab when it contains `"Lab"`; the duration is the
    /// number in front of the first `hr` suffix (`"CS201 Lab 3hr"` → 3),
    /// or 0 when there is none.
    pub fn parse(raw: &str) -> Self {
        let kind = if raw.contains("Lab") {
            SessionKind::Lab
        } else {
            SessionKind::Lecture
        };
        Self {
            raw: raw.to_string(),
            kind,
            duration_hours: extract_hours(raw),
        }
    }

    /// The code as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Session kind.
    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    /// Declared session length in hours (0 when absent).
    pub fn duration_hours(&self) -> u32 {
        self.duration_hours
    }
}

fn extract_hours(code: &str) -> u32 {
    let bytes = code.as_bytes();
    let mut search_from = 0;
    while let Some(offset) = code[search_from..].find("hr") {
        let end = search_from + offset;
        let start = bytes[..end]
            .iter()
            .rposition(|b| !b.is_ascii_digit())
            .map_or(0, |p| p + 1);
        if start < end {
            if let Ok(hours) = code[start..end].parse() {
                return hours;
            }
        }
        search_from = end + 2;
    }
    0
}

// ============================================================================
// Module
// ============================================================================

/// A module descriptor: code, teaching staff and hours required per group.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Module {
    /// Module identifier.
    pub id: ModuleId,
    /// Parsed course code.
    pub code: ModuleCode,
    /// Professors able to teach the module.
    pub professors: Vec<ProfessorId>,
    /// Sessions required when a group has no explicit override.
    pub default_slots: u32,
    /// Per-group session requirements.
    pub group_slots: BTreeMap<GroupId, u32>,
}

impl Module {
    /// Creates a module with one required session per group.
    pub fn new(id: ModuleId, code: &str, professors: impl IntoIterator<Item = ProfessorId>) -> Self {
        Self {
            id,
            code: ModuleCode::parse(code),
            professors: professors.into_iter().collect(),
            default_slots: 1,
            group_slots: BTreeMap::new(),
        }
    }

    /// Sets the default number of required sessions.
    pub fn with_slots(mut self, slots: u32) -> Self {
        self.default_slots = slots;
        self
    }

    /// Overrides the required sessions for one group.
    pub fn with_group_slots(mut self, group: GroupId, slots: u32) -> Self {
        self.group_slots.insert(group, slots);
        self
    }

    /// Session kind from the course code.
    pub fn kind(&self) -> SessionKind {
        self.code.kind()
    }

    /// Whether the module is delivered as lab blocks.
    pub fn is_lab(&self) -> bool {
        self.kind() == SessionKind::Lab
    }

    /// Declared session length in hours.
    pub fn duration_hours(&self) -> u32 {
        self.code.duration_hours()
    }

    /// Hours of a single lab block (never below 1).
    pub fn block_hours(&self) -> u32 {
        self.duration_hours().max(1)
    }

    /// Required sessions for `group`.
    pub fn required_slots(&self, group: GroupId) -> u32 {
        self.group_slots
            .get(&group)
            .copied()
            .unwrap_or(self.default_slots)
    }

    /// Scheduled hours (= chromosome triples) this module takes for `group`.
    ///
    /// Lab sessions expand to full blocks; lecture sessions are one hour each.
    pub fn allocated_hours(&self, group: GroupId) -> u32 {
        match self.kind() {
            SessionKind::Lab => self.required_slots(group) * self.block_hours(),
            SessionKind::Lecture => self.required_slots(group),
        }
    }

    /// Draws one of the module's professors uniformly.
    pub fn random_professor<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ProfessorId> {
        self.professors
            .choose(rng)
            .copied()
            .ok_or(TimetableError::NoProfessor(self.id))
    }
}

// ============================================================================
// Group / Room
// ============================================================================

/// A student group and the modules it takes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Group {
    /// Group identifier.
    pub id: GroupId,
    /// Number of students.
    pub size: u32,
    /// Modules assigned to the group, in scheduling order.
    pub module_ids: Vec<ModuleId>,
    /// Rooms the group may be taught in.
    pub available_rooms: BTreeSet<RoomId>,
}

impl Group {
    /// Creates a group with no modules or rooms.
    pub fn new(id: GroupId, size: u32) -> Self {
        Self {
            id,
            size,
            module_ids: Vec::new(),
            available_rooms: BTreeSet::new(),
        }
    }

    /// Sets the group's modules.
    pub fn with_modules(mut self, modules: impl IntoIterator<Item = ModuleId>) -> Self {
        self.module_ids = modules.into_iter().collect();
        self
    }

    /// Sets the group's available rooms.
    pub fn with_rooms(mut self, rooms: impl IntoIterator<Item = RoomId>) -> Self {
        self.available_rooms = rooms.into_iter().collect();
        self
    }

    /// Draws one of the available rooms uniformly.
    pub fn random_room<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RoomId> {
        if self.available_rooms.is_empty() {
            return Err(TimetableError::EmptyRoomSet(self.id));
        }
        let pick = rng.random_range(0..self.available_rooms.len());
        self.available_rooms
            .iter()
            .nth(pick)
            .copied()
            .ok_or(TimetableError::EmptyRoomSet(self.id))
    }
}

/// A teaching room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Room {
    /// Room identifier.
    pub id: RoomId,
    /// Seat count.
    pub capacity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    #[test]
    fn test_timeslot_token_roundtrip() {
        let ts: Timeslot = "D3T7".parse().unwrap();
        assert_eq!(ts, Timeslot::new(3, 7));
        assert_eq!(ts.to_string(), "D3T7");
    }

    #[test]
    fn test_timeslot_token_rejects_garbage() {
        for token in ["", "D", "DT", "D1", "D1T", "X1T1", "D1X1", "D-1T2", "D1T2x", "5"] {
            assert!(
                token.parse::<Timeslot>().is_err(),
                "{token:?} should not parse"
            );
        }
    }

    #[test]
    fn test_adjacency() {
        let a = Timeslot::new(1, 1);
        assert!(a.is_followed_by(Timeslot::new(1, 2)));
        assert!(!a.is_followed_by(Timeslot::new(1, 3)));
        assert!(!a.is_followed_by(Timeslot::new(2, 2)));
        assert!(!Timeslot::new(1, u8::MAX).is_followed_by(Timeslot::new(1, 0)));
    }

    #[test]
    fn test_module_code_lab() {
        let code = ModuleCode::parse("CS201 Lab 3hr");
        assert_eq!(code.kind(), SessionKind::Lab);
        assert_eq!(code.duration_hours(), 3);
        assert_eq!(code.as_str(), "CS201 Lab 3hr");
    }

    #[test]
    fn test_module_code_lecture_without_hours() {
        let code = ModuleCode::parse("MA101 Calculus");
        assert_eq!(code.kind(), SessionKind::Lecture);
        assert_eq!(code.duration_hours(), 0);
    }

    #[test]
    fn test_module_code_skips_bare_hr() {
        assert_eq!(ModuleCode::parse("hr Lab thr 12hr").duration_hours(), 12);
        assert_eq!(ModuleCode::parse("Lab-2hrs").duration_hours(), 2);
    }

    #[test]
    fn test_allocated_hours() {
        let lab = Module::new(ModuleId(1), "PH110 Lab 3hr", [ProfessorId(1)])
            .with_slots(2)
            .with_group_slots(GroupId(9), 1);
        assert_eq!(lab.allocated_hours(GroupId(1)), 6);
        assert_eq!(lab.allocated_hours(GroupId(9)), 3);

        let lecture = Module::new(ModuleId(2), "PH101 2hr", [ProfessorId(1)]).with_slots(4);
        assert_eq!(lecture.allocated_hours(GroupId(1)), 4);
    }

    #[test]
    fn test_random_professor_empty() {
        let module = Module::new(ModuleId(5), "X", []);
        let mut rng = create_rng(1);
        assert_eq!(
            module.random_professor(&mut rng),
            Err(TimetableError::NoProfessor(ModuleId(5)))
        );
    }

    #[test]
    fn test_random_room() {
        let group = Group::new(GroupId(1), 20).with_rooms([RoomId(4), RoomId(2)]);
        let mut rng = create_rng(3);
        for _ in 0..50 {
            let room = group.random_room(&mut rng).unwrap();
            assert!(room == RoomId(2) || room == RoomId(4));
        }
        let empty = Group::new(GroupId(2), 20);
        assert_eq!(
            empty.random_room(&mut rng),
            Err(TimetableError::EmptyRoomSet(GroupId(2)))
        );
    }
}
