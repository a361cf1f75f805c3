//! Data structures for guild tournaments: matches, rounds, teams, the persisted record.

mod game;
mod rankings;
mod team;
mod tournament;

pub use game::{pair_consecutive, Match, ParticipantId, RoundEntry, RoundIndex, Rounds};
pub use rankings::FinalRankings;
pub use team::{Scores, Team, TeamLabel, TeamOutcome, TeamState};
pub use tournament::{
    ErrorKind, RecordRepr, Tournament, TournamentError, TournamentKind, TournamentMode,
    TournamentRecord,
};
