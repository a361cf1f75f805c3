//! Solo single-elimination bracket: seed, record winners, advance, rank.

use crate::logic::shuffle::Shuffler;
use crate::models::{
    pair_consecutive, FinalRankings, Match, ParticipantId, RoundIndex, Rounds, Tournament,
    TournamentError, TournamentMode, TournamentRecord,
};
use std::collections::{BTreeMap, HashSet};

/// Participant counts a bracket can be started with.
pub const BRACKET_SIZES: [usize; 3] = [4, 8, 16];

/// What happened to the bracket after a winner was recorded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SoloProgress {
    /// The latest round still has undecided matches.
    Pending,
    /// The latest round was complete; a new round with this index was generated.
    NextRound(RoundIndex),
    /// The final was decided. The record is now inactive; this is the last state it had.
    Finished {
        tournament: Tournament,
        rankings: FinalRankings,
    },
}

/// Start a solo bracket: shuffle the seed list and pair it into round 1.
pub fn start_bracket(
    record: &mut TournamentRecord,
    name: &str,
    participants: &[ParticipantId],
    shuffler: &mut impl Shuffler,
) -> Result<(), TournamentError> {
    record.require_inactive()?;
    let name = name.trim();
    if name.is_empty() {
        return Err(TournamentError::EmptyName);
    }
    if !BRACKET_SIZES.contains(&participants.len()) {
        return Err(TournamentError::InvalidBracketSize(participants.len()));
    }
    let mut seen = HashSet::with_capacity(participants.len());
    if let Some(&dup) = participants.iter().find(|&&id| !seen.insert(id)) {
        return Err(TournamentError::DuplicateParticipant(dup));
    }

    let mut seeded = participants.to_vec();
    shuffler.shuffle(&mut seeded);
    let mut bracket = Rounds::new();
    bracket.push(pair_consecutive(&seeded));

    log::info!(
        "Solo bracket '{}' started with {} players",
        name,
        seeded.len()
    );
    *record = TournamentRecord::Active(Tournament {
        name: name.to_string(),
        participants: seeded,
        mode: TournamentMode::Solo { bracket },
    });
    Ok(())
}

/// Record `participant` as winner of their first open match, then advance if the round is done.
///
/// Rounds are scanned in creation order and matches in list order. On error the record is
/// left untouched.
pub fn declare_winner(
    record: &mut TournamentRecord,
    participant: ParticipantId,
    shuffler: &mut impl Shuffler,
) -> Result<SoloProgress, TournamentError> {
    let bracket = record.solo_bracket_mut()?;
    let (round, pos) = bracket
        .find_open(participant)
        .ok_or(TournamentError::NoOpenMatch(participant))?;
    if bracket.decide(round, pos, participant).is_none() {
        return Err(TournamentError::NoOpenMatch(participant));
    }
    log::debug!(
        "Round {} match {}: winner {}",
        round,
        pos + 1,
        participant
    );
    advance_if_round_complete(record, shuffler)
}

/// Inspect the latest round. Incomplete: no-op. A decided final: rank and end the
/// tournament. Otherwise: shuffle the winners into the next round.
pub fn advance_if_round_complete(
    record: &mut TournamentRecord,
    shuffler: &mut impl Shuffler,
) -> Result<SoloProgress, TournamentError> {
    let bracket = record.solo_bracket_mut()?;
    if !bracket.latest_complete() {
        return Ok(SoloProgress::Pending);
    }

    if let Some(rankings) = final_rankings(bracket) {
        let tournament = record
            .take()
            .ok_or(TournamentError::NoActiveTournament)?;
        log::info!(
            "Solo bracket '{}' finished, winner {}",
            tournament.name,
            rankings.first
        );
        return Ok(SoloProgress::Finished {
            tournament,
            rankings,
        });
    }

    let mut winners: Vec<ParticipantId> = bracket
        .latest()
        .map(|(_, matches)| matches.iter().filter_map(|m| m.winner).collect())
        .unwrap_or_default();
    shuffler.shuffle(&mut winners);
    let next = bracket.push(pair_consecutive(&winners));
    log::info!("Advanced bracket to round {} ({} matches)", next, winners.len() / 2);
    Ok(SoloProgress::NextRound(next))
}

/// Placement once the single-match final is decided; None before that.
///
/// Bands are keyed on distance from the final: one round back gives semifinalists,
/// two rounds back quarterfinalists, anything earlier is grouped per round.
pub fn final_rankings(bracket: &Rounds) -> Option<FinalRankings> {
    let (final_idx, final_round) = bracket.latest()?;
    let [final_match] = final_round else {
        return None;
    };
    let first = final_match.winner?;
    let second = final_match.loser()?;

    let mut rankings = FinalRankings {
        first,
        second,
        semifinalists: Vec::new(),
        quarterfinalists: Vec::new(),
        earlier_rounds: BTreeMap::new(),
    };
    for (idx, matches) in bracket.iter().rev().skip(1) {
        let losers: Vec<ParticipantId> = matches.iter().filter_map(Match::loser).collect();
        match final_idx - idx {
            1 => rankings.semifinalists = losers,
            2 => rankings.quarterfinalists = losers,
            _ => {
                rankings.earlier_rounds.insert(idx, losers);
            }
        }
    }
    Some(rankings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::shuffle::KeepOrder;

    fn started(ids: &[ParticipantId]) -> TournamentRecord {
        let mut record = TournamentRecord::Inactive;
        start_bracket(&mut record, "Cup", ids, &mut KeepOrder).unwrap();
        record
    }

    #[test]
    fn rejects_sizes_outside_the_allowed_set() {
        for n in [0, 2, 3, 5, 6, 12, 32] {
            let ids: Vec<ParticipantId> = (1..=n).collect();
            let mut record = TournamentRecord::Inactive;
            assert_eq!(
                start_bracket(&mut record, "Cup", &ids, &mut KeepOrder),
                Err(TournamentError::InvalidBracketSize(n as usize))
            );
            assert!(!record.is_active());
        }
    }

    #[test]
    fn rejects_duplicate_participants() {
        let mut record = TournamentRecord::Inactive;
        assert_eq!(
            start_bracket(&mut record, "Cup", &[1, 2, 2, 3], &mut KeepOrder),
            Err(TournamentError::DuplicateParticipant(2))
        );
    }

    #[test]
    fn rejects_start_while_active() {
        let mut record = started(&[1, 2, 3, 4]);
        let before = record.clone();
        assert_eq!(
            start_bracket(&mut record, "Other", &[5, 6, 7, 8], &mut KeepOrder),
            Err(TournamentError::AlreadyActive)
        );
        assert_eq!(record, before);
    }

    #[test]
    fn advance_is_a_noop_while_round_is_open() {
        let mut record = started(&[1, 2, 3, 4]);
        declare_winner(&mut record, 1, &mut KeepOrder).unwrap();
        let snapshot = record.clone();
        for _ in 0..3 {
            assert_eq!(
                advance_if_round_complete(&mut record, &mut KeepOrder),
                Ok(SoloProgress::Pending)
            );
        }
        assert_eq!(record, snapshot);
    }

    #[test]
    fn declared_winner_cannot_be_redeclared_in_same_match() {
        let mut record = started(&[1, 2, 3, 4]);
        declare_winner(&mut record, 1, &mut KeepOrder).unwrap();
        let snapshot = record.clone();
        assert_eq!(
            declare_winner(&mut record, 2, &mut KeepOrder),
            Err(TournamentError::NoOpenMatch(2))
        );
        assert_eq!(record, snapshot);
    }

    #[test]
    fn sixteen_player_bands() {
        let ids: Vec<ParticipantId> = (1..=16).collect();
        let mut record = started(&ids);
        // KeepOrder pairs (1,2),(3,4)...; odd ids always win until only 1 is left.
        for round in [
            vec![1, 3, 5, 7, 9, 11, 13, 15],
            vec![1, 5, 9, 13],
            vec![1, 9],
        ] {
            for id in round {
                declare_winner(&mut record, id, &mut KeepOrder).unwrap();
            }
        }
        let SoloProgress::Finished { rankings, .. } =
            declare_winner(&mut record, 1, &mut KeepOrder).unwrap()
        else {
            panic!("bracket should be finished");
        };
        assert_eq!(rankings.first, 1);
        assert_eq!(rankings.second, 9);
        assert_eq!(rankings.semifinalists, vec![5, 13]);
        assert_eq!(rankings.quarterfinalists, vec![3, 7, 11, 15]);
        assert_eq!(
            rankings.earlier_rounds.get(&1),
            Some(&vec![2, 4, 6, 8, 10, 12, 14, 16])
        );
        assert_eq!(rankings.all().count(), 16);
        assert!(!record.is_active());
    }
}
