//! Error type shared by the domain layer and the GA engine.

use crate::domain::{GroupId, ModuleId, Timeslot};

/// Errors raised while building, evaluating, or evolving timetables.
///
/// Configuration and collaborator failures are fatal to a run: the GA
/// cannot define fitness for an individual it cannot materialize.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimetableError {
    /// A chromosome or population was indexed past its end.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A group has neither a preferred room nor any available room.
    #[error("group {0} has no available rooms")]
    EmptyRoomSet(GroupId),

    /// A group references a module the domain does not know.
    #[error("unknown module {0}")]
    UnknownModule(ModuleId),

    /// A module has no professor to assign.
    #[error("module {0} has no professors")]
    NoProfessor(ModuleId),

    /// The domain defines no timeslots at all.
    #[error("timetable has no timeslots")]
    NoTimeslots,

    /// No timeslot leaves room for a lab block of the given length.
    #[error("no timeslot can host a {hours}-hour block for module {module}")]
    NoFeasibleLabSlot { module: ModuleId, hours: u32 },

    /// A multi-hour block ran past the last timeslot of a day.
    #[error("timeslot {0} has no successor")]
    BrokenTimeslotChain(Timeslot),

    /// A timeslot token did not match `D<day>T<slot>`.
    #[error("invalid timeslot token {0:?}")]
    InvalidTimeslotToken(String),

    /// The collaborator could not turn a chromosome into classes.
    #[error("malformed chromosome: {0}")]
    MalformedChromosome(String),

    /// Run parameters failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Shorthand for results carrying a [`TimetableError`].
pub type Result<T> = std::result::Result<T, TimetableError>;
