//! Team tournament: registration pool, team split, fight-card rounds, scores.

use crate::logic::shuffle::Shuffler;
use crate::models::{
    Match, ParticipantId, RoundIndex, TeamLabel, TeamState, Tournament, TournamentError,
    TournamentMode, TournamentRecord,
};

/// Open a team tournament in registration: empty pool, empty teams, zero scores.
/// Blank team names fall back to "Team A" / "Team B".
pub fn start_registration(
    record: &mut TournamentRecord,
    name: &str,
    team_a_name: &str,
    team_b_name: &str,
) -> Result<(), TournamentError> {
    record.require_inactive()?;
    let name = name.trim();
    if name.is_empty() {
        return Err(TournamentError::EmptyName);
    }
    let team_name = |given: &str, fallback: &str| {
        let given = given.trim();
        if given.is_empty() {
            fallback.to_string()
        } else {
            given.to_string()
        }
    };
    let state = TeamState::new(
        team_name(team_a_name, "Team A"),
        team_name(team_b_name, "Team B"),
    );
    log::info!(
        "Team tournament '{}' open for registration ({} vs {})",
        name,
        state.team_a.display_name,
        state.team_b.display_name
    );
    *record = TournamentRecord::Active(Tournament {
        name: name.to_string(),
        participants: Vec::new(),
        mode: TournamentMode::Team(state),
    });
    Ok(())
}

/// Add `participant` to the pool. Returns false if they were already registered (no-op).
pub fn join_pool(
    record: &mut TournamentRecord,
    participant: ParticipantId,
) -> Result<bool, TournamentError> {
    let (pool, state) = record.team_mut()?;
    if pool.contains(&participant) {
        return Ok(false);
    }
    if state.is_assigned() {
        return Err(TournamentError::TeamsAlreadyAssigned);
    }
    pool.push(participant);
    Ok(true)
}

/// Shuffle the pool and split it at `len / 2`: first half team A, rest team B.
/// Generates the round-1 fight card and returns its index.
pub fn assign_teams(
    record: &mut TournamentRecord,
    shuffler: &mut impl Shuffler,
) -> Result<RoundIndex, TournamentError> {
    let (pool, state) = record.team_mut()?;
    if state.is_assigned() {
        return Err(TournamentError::TeamsAlreadyAssigned);
    }
    if pool.is_empty() {
        return Err(TournamentError::EmptyPool);
    }

    let mut order = pool.clone();
    shuffler.shuffle(&mut order);
    let team_b = order.split_off(order.len() / 2);
    state.team_a.members = order;
    state.team_b.members = team_b;
    log::info!(
        "Teams assigned: {} ({}) vs {} ({})",
        state.team_a.display_name,
        state.team_a.members.len(),
        state.team_b.display_name,
        state.team_b.members.len()
    );
    Ok(generate_fight_card(state, shuffler))
}

/// Schedule the next fight-card round (index `latest + 1`, or 1 for the first).
///
/// Both rosters are shuffled independently and paired positionally; the larger
/// team's surplus sits out this round.
pub fn generate_fight_card(state: &mut TeamState, shuffler: &mut impl Shuffler) -> RoundIndex {
    let mut a = state.team_a.members.clone();
    let mut b = state.team_b.members.clone();
    shuffler.shuffle(&mut a);
    shuffler.shuffle(&mut b);
    let matches: Vec<Match> = a
        .iter()
        .zip(b.iter())
        .map(|(&p1, &p2)| Match::new(p1, p2))
        .collect();
    let sitting_out = a.len().abs_diff(b.len());
    let idx = state.fight_card.push(matches);
    log::debug!("Fight card round {} generated, {} sitting out", idx, sitting_out);
    idx
}

/// Record `participant` as winner of their open match in the latest fight-card round
/// and give their team a point. Returns the scoring team.
pub fn declare_team_winner(
    record: &mut TournamentRecord,
    participant: ParticipantId,
) -> Result<TeamLabel, TournamentError> {
    let (_, state) = record.team_mut()?;
    let (round, pos) = state
        .fight_card
        .find_open_in_latest(participant)
        .ok_or(TournamentError::NoOpenMatch(participant))?;
    let label = state
        .team_of(participant)
        .ok_or(TournamentError::NoOpenMatch(participant))?;
    if state.fight_card.decide(round, pos, participant).is_none() {
        return Err(TournamentError::NoOpenMatch(participant));
    }
    state.scores.add_point(label);
    log::debug!(
        "Fight card round {}: {} wins a point for team {} ({}-{})",
        round,
        participant,
        label,
        state.scores.a,
        state.scores.b
    );
    Ok(label)
}

/// Generate the next fight-card round once every match in the latest one is decided.
pub fn advance_fight_card(
    record: &mut TournamentRecord,
    shuffler: &mut impl Shuffler,
) -> Result<RoundIndex, TournamentError> {
    let (_, state) = record.team_mut()?;
    let latest = state
        .fight_card
        .latest_index()
        .ok_or(TournamentError::TeamsNotAssigned)?;
    if !state.fight_card.latest_complete() {
        return Err(TournamentError::RoundIncomplete(latest));
    }
    Ok(generate_fight_card(state, shuffler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::shuffle::KeepOrder;

    fn registering(pool: &[ParticipantId]) -> TournamentRecord {
        let mut record = TournamentRecord::Inactive;
        start_registration(&mut record, "Clash", "Red", "Blue").unwrap();
        for &id in pool {
            join_pool(&mut record, id).unwrap();
        }
        record
    }

    #[test]
    fn blank_team_names_fall_back() {
        let mut record = TournamentRecord::Inactive;
        start_registration(&mut record, "Clash", "  ", "").unwrap();
        let state = record.active().and_then(Tournament::team_state).unwrap();
        assert_eq!(state.team_a.display_name, "Team A");
        assert_eq!(state.team_b.display_name, "Team B");
    }

    #[test]
    fn assign_requires_a_pool() {
        let mut record = registering(&[]);
        assert_eq!(
            assign_teams(&mut record, &mut KeepOrder),
            Err(TournamentError::EmptyPool)
        );
    }

    #[test]
    fn single_member_pool_goes_to_team_b() {
        let mut record = registering(&[7]);
        assign_teams(&mut record, &mut KeepOrder).unwrap();
        let state = record.active().and_then(Tournament::team_state).unwrap();
        assert!(state.team_a.members.is_empty());
        assert_eq!(state.team_b.members, vec![7]);
        assert_eq!(state.fight_card.get(1), Some(&[][..]));
    }

    #[test]
    fn join_after_assignment_is_rejected() {
        let mut record = registering(&[1, 2]);
        assign_teams(&mut record, &mut KeepOrder).unwrap();
        assert_eq!(
            join_pool(&mut record, 3),
            Err(TournamentError::TeamsAlreadyAssigned)
        );
        assert_eq!(join_pool(&mut record, 1), Ok(false));
    }

    #[test]
    fn advance_requires_complete_round() {
        let mut record = registering(&[1, 2, 3, 4]);
        assign_teams(&mut record, &mut KeepOrder).unwrap();
        declare_team_winner(&mut record, 1).unwrap();
        assert_eq!(
            advance_fight_card(&mut record, &mut KeepOrder),
            Err(TournamentError::RoundIncomplete(1))
        );
        declare_team_winner(&mut record, 4).unwrap();
        assert_eq!(advance_fight_card(&mut record, &mut KeepOrder), Ok(2));
        let state = record.active().and_then(Tournament::team_state).unwrap();
        assert_eq!(state.scores.a, 1);
        assert_eq!(state.scores.b, 1);
    }

    #[test]
    fn team_winner_only_looks_at_latest_round() {
        let mut record = registering(&[1, 2]);
        assign_teams(&mut record, &mut KeepOrder).unwrap();
        declare_team_winner(&mut record, 1).unwrap();
        advance_fight_card(&mut record, &mut KeepOrder).unwrap();
        declare_team_winner(&mut record, 2).unwrap();
        assert_eq!(
            declare_team_winner(&mut record, 1),
            Err(TournamentError::NoOpenMatch(1))
        );
    }
}
