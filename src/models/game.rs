//! Match and Rounds: the 1v1 pairing shared by solo brackets and team fight cards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Chat-platform member id (snowflake).
pub type ParticipantId = u64;

/// Index of a round; the first round is 1.
pub type RoundIndex = u32;

/// A single 1v1 match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub player1: ParticipantId,
    pub player2: ParticipantId,
    /// None until declared; once set it never changes.
    #[serde(default)]
    pub winner: Option<ParticipantId>,
}

impl Match {
    pub fn new(player1: ParticipantId, player2: ParticipantId) -> Self {
        Self {
            player1,
            player2,
            winner: None,
        }
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.player1 == id || self.player2 == id
    }

    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    /// True if the match is still open and `id` plays in it.
    pub fn is_open_for(&self, id: ParticipantId) -> bool {
        !self.is_decided() && self.contains(id)
    }

    /// The other contestant, once a winner is set.
    pub fn loser(&self) -> Option<ParticipantId> {
        self.winner
            .map(|w| if w == self.player1 { self.player2 } else { self.player1 })
    }
}

/// Pair consecutive entries: (0 vs 1), (2 vs 3), ... A trailing odd entry is dropped.
pub fn pair_consecutive(ids: &[ParticipantId]) -> Vec<Match> {
    ids.chunks_exact(2)
        .map(|pair| Match::new(pair[0], pair[1]))
        .collect()
}

/// Rounds keyed by index. Indices are contiguous from 1; a new round is only
/// pushed once the previous one is fully decided.
///
/// Stored as a list of `{round, matches}` entries: integer map keys do not
/// survive the buffering serde does for tagged enums.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<RoundEntry>", into = "Vec<RoundEntry>")]
pub struct Rounds(BTreeMap<RoundIndex, Vec<Match>>);

/// Wire form of one round.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundEntry {
    pub round: RoundIndex,
    pub matches: Vec<Match>,
}

impl From<Vec<RoundEntry>> for Rounds {
    fn from(entries: Vec<RoundEntry>) -> Self {
        Self(entries.into_iter().map(|e| (e.round, e.matches)).collect())
    }
}

impl From<Rounds> for Vec<RoundEntry> {
    fn from(rounds: Rounds) -> Self {
        rounds
            .0
            .into_iter()
            .map(|(round, matches)| RoundEntry { round, matches })
            .collect()
    }
}

impl Rounds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of rounds generated so far.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn latest_index(&self) -> Option<RoundIndex> {
        self.0.keys().next_back().copied()
    }

    pub fn latest(&self) -> Option<(RoundIndex, &[Match])> {
        self.0
            .iter()
            .next_back()
            .map(|(idx, matches)| (*idx, matches.as_slice()))
    }

    pub fn get(&self, index: RoundIndex) -> Option<&[Match]> {
        self.0.get(&index).map(Vec::as_slice)
    }

    /// Rounds in creation order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (RoundIndex, &[Match])> {
        self.0.iter().map(|(idx, matches)| (*idx, matches.as_slice()))
    }

    /// The index the next pushed round will receive.
    pub fn next_index(&self) -> RoundIndex {
        self.latest_index().map_or(1, |idx| idx + 1)
    }

    /// Append a round at `next_index()` and return its index.
    pub fn push(&mut self, matches: Vec<Match>) -> RoundIndex {
        let idx = self.next_index();
        self.0.insert(idx, matches);
        idx
    }

    /// True if a latest round exists and every match in it has a winner.
    pub fn latest_complete(&self) -> bool {
        self.latest()
            .is_some_and(|(_, matches)| matches.iter().all(Match::is_decided))
    }

    /// Locate the first open match for `id`, scanning rounds in creation order.
    pub fn find_open(&self, id: ParticipantId) -> Option<(RoundIndex, usize)> {
        self.iter().find_map(|(idx, matches)| {
            matches
                .iter()
                .position(|m| m.is_open_for(id))
                .map(|pos| (idx, pos))
        })
    }

    /// Locate the first open match for `id` in the latest round only.
    pub fn find_open_in_latest(&self, id: ParticipantId) -> Option<(RoundIndex, usize)> {
        let (idx, matches) = self.latest()?;
        matches
            .iter()
            .position(|m| m.is_open_for(id))
            .map(|pos| (idx, pos))
    }

    /// Set the winner of the match at `(round, pos)`. Returns the decided match.
    /// Callers locate the match with `find_open*` first, so the slot is open and contains `winner`.
    pub(crate) fn decide(
        &mut self,
        round: RoundIndex,
        pos: usize,
        winner: ParticipantId,
    ) -> Option<&Match> {
        let m = self.0.get_mut(&round)?.get_mut(pos)?;
        if !m.is_open_for(winner) {
            return None;
        }
        m.winner = Some(winner);
        Some(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loser_is_the_other_player() {
        let mut m = Match::new(1, 2);
        assert_eq!(m.loser(), None);
        m.winner = Some(2);
        assert_eq!(m.loser(), Some(1));
    }

    #[test]
    fn pair_consecutive_drops_trailing_entry() {
        let matches = pair_consecutive(&[1, 2, 3, 4, 5]);
        assert_eq!(matches, vec![Match::new(1, 2), Match::new(3, 4)]);
    }

    #[test]
    fn rounds_index_from_one() {
        let mut rounds = Rounds::new();
        assert_eq!(rounds.next_index(), 1);
        assert_eq!(rounds.push(vec![Match::new(1, 2)]), 1);
        assert_eq!(rounds.push(vec![Match::new(1, 3)]), 2);
        assert_eq!(rounds.latest_index(), Some(2));
    }

    #[test]
    fn decide_refuses_a_decided_match() {
        let mut rounds = Rounds::new();
        rounds.push(vec![Match::new(1, 2)]);
        assert!(rounds.decide(1, 0, 1).is_some());
        assert!(rounds.decide(1, 0, 2).is_none());
        assert_eq!(rounds.get(1).unwrap()[0].winner, Some(1));
    }

    #[test]
    fn rounds_serialize_with_integer_indices() {
        let mut rounds = Rounds::new();
        rounds.push(vec![Match::new(7, 8)]);
        let json = serde_json::to_string(&rounds).unwrap();
        assert_eq!(
            json,
            r#"[{"round":1,"matches":[{"player1":7,"player2":8,"winner":null}]}]"#
        );
        let back: Rounds = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rounds);
    }
}
