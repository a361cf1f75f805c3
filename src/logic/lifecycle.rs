//! Explicit end of the active tournament (any kind).

use crate::models::{TeamOutcome, Tournament, TournamentError, TournamentMode, TournamentRecord};

/// The tournament that was just ended, plus the team result when it was a team tournament.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EndedTournament {
    pub tournament: Tournament,
    /// Only for team mode; derived from scores for the closing announcement.
    pub outcome: Option<TeamOutcome>,
}

/// Reset the record to inactive. Fails with `NoActiveTournament` if nothing is running.
pub fn end_tournament(record: &mut TournamentRecord) -> Result<EndedTournament, TournamentError> {
    let tournament = record.take().ok_or(TournamentError::NoActiveTournament)?;
    let outcome = match &tournament.mode {
        TournamentMode::Team(state) => Some(state.scores.outcome()),
        TournamentMode::Solo { .. } => None,
    };
    log::info!("Tournament '{}' ended manually", tournament.name);
    Ok(EndedTournament {
        tournament,
        outcome,
    })
}
