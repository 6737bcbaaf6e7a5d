//! Gene and triple types.
//!
//! A chromosome is a flat sequence of [`Gene`]s read three at a time as
//! [`Triple`]s: `(timeslot, room, professor)`, one per scheduled hour.

use std::fmt;

use crate::domain::{ProfessorId, RoomId, Timeslot};

/// One locus of a chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Gene {
    /// Timeslot of a scheduled hour.
    Timeslot(Timeslot),
    /// Room of a scheduled hour.
    Room(RoomId),
    /// Professor of a scheduled hour.
    Professor(ProfessorId),
    /// Uninitialized 0/1 value from [`Individual::random`](super::Individual::random).
    Filler(u8),
}

impl Gene {
    /// The timeslot, if this is a timeslot gene.
    pub fn as_timeslot(self) -> Option<Timeslot> {
        match self {
            Gene::Timeslot(ts) => Some(ts),
            _ => None,
        }
    }

    /// The room, if this is a room gene.
    pub fn as_room(self) -> Option<RoomId> {
        match self {
            Gene::Room(room) => Some(room),
            _ => None,
        }
    }

    /// The professor, if this is a professor gene.
    pub fn as_professor(self) -> Option<ProfessorId> {
        match self {
            Gene::Professor(prof) => Some(prof),
            _ => None,
        }
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gene::Timeslot(ts) => write!(f, "{ts}"),
            Gene::Room(room) => write!(f, "{room}"),
            Gene::Professor(prof) => write!(f, "{prof}"),
            Gene::Filler(bit) => write!(f, "{bit}"),
        }
    }
}

/// A typed view of three consecutive genes: one scheduled hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triple {
    pub timeslot: Timeslot,
    pub room: RoomId,
    pub professor: ProfessorId,
}

impl Triple {
    /// Reads a triple from three genes, if they have the expected variants.
    pub fn from_genes(genes: &[Gene]) -> Option<Self> {
        match genes {
            [Gene::Timeslot(timeslot), Gene::Room(room), Gene::Professor(professor)] => {
                Some(Self {
                    timeslot: *timeslot,
                    room: *room,
                    professor: *professor,
                })
            }
            _ => None,
        }
    }

    /// The three genes of this triple.
    pub fn genes(&self) -> [Gene; 3] {
        [
            Gene::Timeslot(self.timeslot),
            Gene::Room(self.room),
            Gene::Professor(self.professor),
        ]
    }

    /// Whether `next` continues the same session: same room and professor,
    /// and the hour directly after this one.
    pub fn chains_into(&self, next: &Triple) -> bool {
        self.room == next.room
            && self.professor == next.professor
            && self.timeslot.is_followed_by(next.timeslot)
    }
}
