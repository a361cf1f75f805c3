//! Tournament, TournamentRecord and TournamentError.

use crate::models::game::{ParticipantId, RoundIndex, Rounds};
use crate::models::team::TeamState;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Broad class of a [`TournamentError`], used to pick a user-facing response.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Malformed input.
    Validation,
    /// The record is not in a state that allows the operation.
    Conflict,
    /// The referenced participant or match does not exist.
    NotFound,
}

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    #[error("Bracket requires 4, 8, or 16 players. You provided {0}.")]
    InvalidBracketSize(usize),
    #[error("Participant {0} is listed more than once")]
    DuplicateParticipant(ParticipantId),
    #[error("Tournament name must not be empty")]
    EmptyName,
    #[error("No players have joined the pool yet")]
    EmptyPool,
    #[error("A tournament is already active")]
    AlreadyActive,
    #[error("There is no active tournament")]
    NoActiveTournament,
    #[error("No active {expected} tournament")]
    WrongKind { expected: TournamentKind },
    #[error("Round {0} still has undecided matches")]
    RoundIncomplete(RoundIndex),
    #[error("Teams have already been assigned")]
    TeamsAlreadyAssigned,
    #[error("Teams have not been assigned yet")]
    TeamsNotAssigned,
    #[error("Could not find an open match for participant {0}")]
    NoOpenMatch(ParticipantId),
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        use TournamentError::*;
        match self {
            InvalidBracketSize(_) | DuplicateParticipant(_) | EmptyName | EmptyPool => {
                ErrorKind::Validation
            }
            AlreadyActive | NoActiveTournament | WrongKind { .. } | RoundIncomplete(_)
            | TeamsAlreadyAssigned | TeamsNotAssigned => ErrorKind::Conflict,
            NoOpenMatch(_) => ErrorKind::NotFound,
        }
    }
}

/// Solo bracket or team-vs-team. Fixed for the lifetime of a tournament.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentKind {
    Solo,
    Team,
}

impl fmt::Display for TournamentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TournamentKind::Solo => f.write_str("solo"),
            TournamentKind::Team => f.write_str("team"),
        }
    }
}

/// Mode-specific state. Only the fields relevant to the kind exist.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TournamentMode {
    Solo {
        #[serde(default)]
        bracket: Rounds,
    },
    Team(TeamState),
}

/// An active tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub name: String,
    /// Seed list (solo) or registration pool (team).
    #[serde(default)]
    pub participants: Vec<ParticipantId>,
    #[serde(flatten)]
    pub mode: TournamentMode,
}

impl Tournament {
    pub fn kind(&self) -> TournamentKind {
        match self.mode {
            TournamentMode::Solo { .. } => TournamentKind::Solo,
            TournamentMode::Team(_) => TournamentKind::Team,
        }
    }

    pub fn bracket(&self) -> Option<&Rounds> {
        match &self.mode {
            TournamentMode::Solo { bracket } => Some(bracket),
            TournamentMode::Team(_) => None,
        }
    }

    pub fn team_state(&self) -> Option<&TeamState> {
        match &self.mode {
            TournamentMode::Team(state) => Some(state),
            TournamentMode::Solo { .. } => None,
        }
    }
}

/// The single persisted object. At most one tournament is active at a time.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecordRepr", into = "RecordRepr")]
pub enum TournamentRecord {
    #[default]
    Inactive,
    Active(Tournament),
}

/// On-disk shape: `{"active": false}` or `{"active": true, "tournament": {...}}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordRepr {
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tournament: Option<Tournament>,
}

impl From<RecordRepr> for TournamentRecord {
    fn from(repr: RecordRepr) -> Self {
        match repr {
            RecordRepr {
                active: true,
                tournament: Some(t),
            } => TournamentRecord::Active(t),
            _ => TournamentRecord::Inactive,
        }
    }
}

impl From<TournamentRecord> for RecordRepr {
    fn from(record: TournamentRecord) -> Self {
        match record {
            TournamentRecord::Inactive => RecordRepr {
                active: false,
                tournament: None,
            },
            TournamentRecord::Active(t) => RecordRepr {
                active: true,
                tournament: Some(t),
            },
        }
    }
}

impl TournamentRecord {
    pub fn is_active(&self) -> bool {
        matches!(self, TournamentRecord::Active(_))
    }

    pub fn active(&self) -> Option<&Tournament> {
        match self {
            TournamentRecord::Active(t) => Some(t),
            TournamentRecord::Inactive => None,
        }
    }

    /// Fails with `AlreadyActive` unless the record is inactive (start precondition).
    pub fn require_inactive(&self) -> Result<(), TournamentError> {
        if self.is_active() {
            return Err(TournamentError::AlreadyActive);
        }
        Ok(())
    }

    /// The active tournament, or `NoActiveTournament`.
    pub fn require_active(&self) -> Result<&Tournament, TournamentError> {
        self.active().ok_or(TournamentError::NoActiveTournament)
    }

    /// Solo bracket of the active tournament.
    pub fn solo_bracket_mut(&mut self) -> Result<&mut Rounds, TournamentError> {
        match self {
            TournamentRecord::Active(Tournament {
                mode: TournamentMode::Solo { bracket },
                ..
            }) => Ok(bracket),
            TournamentRecord::Active(_) => Err(TournamentError::WrongKind {
                expected: TournamentKind::Solo,
            }),
            TournamentRecord::Inactive => Err(TournamentError::NoActiveTournament),
        }
    }

    /// Pool and team state of the active team tournament.
    pub fn team_mut(
        &mut self,
    ) -> Result<(&mut Vec<ParticipantId>, &mut TeamState), TournamentError> {
        match self {
            TournamentRecord::Active(Tournament {
                participants,
                mode: TournamentMode::Team(state),
                ..
            }) => Ok((participants, state)),
            TournamentRecord::Active(_) => Err(TournamentError::WrongKind {
                expected: TournamentKind::Team,
            }),
            TournamentRecord::Inactive => Err(TournamentError::NoActiveTournament),
        }
    }

    /// Reset to inactive, returning the tournament that was active.
    pub fn take(&mut self) -> Option<Tournament> {
        match std::mem::take(self) {
            TournamentRecord::Active(t) => Some(t),
            TournamentRecord::Inactive => None,
        }
    }
}
