//! Timetable domain model.
//!
//! The GA engine consumes the domain only through [`TimetableDomain`]:
//! groups and their modules, the week's timeslots and their adjacency,
//! room preferences, and the materialize-then-count-clashes facility that
//! defines fitness.
//!
//! # Key Types
//!
//! - [`Timeslot`]: `D<day>T<slot>` parsed into numeric fields
//! - [`Module`] / [`ModuleCode`]: course code with explicit [`SessionKind`]
//!   and duration
//! - [`Group`]: a student group, its modules and available rooms
//! - [`AllocationTracker`]: per-construction allocated-hour counters
//! - [`Timetable`]: in-memory collaborator with clash counting

mod allocation;
mod collaborator;
mod timetable;
mod types;

pub use allocation::AllocationTracker;
pub use collaborator::TimetableDomain;
pub use timetable::{ClashReport, ScheduledClass, Timetable, DEFAULT_MAX_CONTINUOUS_SLOTS};
pub use types::{
    Group, GroupId, Module, ModuleCode, ModuleId, ProfessorId, Room, RoomId, SessionKind,
    Timeslot,
};

#[cfg(test)]
pub(crate) use timetable::sample_timetable;
