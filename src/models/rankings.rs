//! Final placement of a completed solo bracket.

use crate::models::game::{ParticipantId, RoundIndex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placement bands of a finished bracket.
///
/// Only 1st and 2nd are strictly ordered. Everyone else is grouped by the round
/// they lost in, unordered within the group; this is approximate placement.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FinalRankings {
    pub first: ParticipantId,
    pub second: ParticipantId,
    /// Losers of the round before the final (3rd/4th).
    pub semifinalists: Vec<ParticipantId>,
    /// Losers two rounds before the final.
    pub quarterfinalists: Vec<ParticipantId>,
    /// Losers of every earlier round, by round index.
    pub earlier_rounds: BTreeMap<RoundIndex, Vec<ParticipantId>>,
}

impl FinalRankings {
    /// Every ranked participant, best band first.
    pub fn all(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        [self.first, self.second]
            .into_iter()
            .chain(self.semifinalists.iter().copied())
            .chain(self.quarterfinalists.iter().copied())
            .chain(self.earlier_rounds.values().rev().flatten().copied())
    }
}
