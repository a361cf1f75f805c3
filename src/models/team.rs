//! Team-mode state: the two teams, their scores, and the fight card.

use crate::models::game::{ParticipantId, Rounds};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side a team is on.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamLabel {
    A,
    B,
}

impl TeamLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            TeamLabel::A => "a",
            TeamLabel::B => "b",
        }
    }
}

impl fmt::Display for TeamLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub label: TeamLabel,
    pub display_name: String,
    /// Unique ids; order is the assignment order.
    #[serde(default)]
    pub members: Vec<ParticipantId>,
}

impl Team {
    pub fn new(label: TeamLabel, display_name: impl Into<String>) -> Self {
        Self {
            label,
            display_name: display_name.into(),
            members: Vec::new(),
        }
    }

    pub fn has_member(&self, id: ParticipantId) -> bool {
        self.members.contains(&id)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub a: u32,
    pub b: u32,
}

impl Scores {
    pub fn add_point(&mut self, label: TeamLabel) {
        match label {
            TeamLabel::A => self.a += 1,
            TeamLabel::B => self.b += 1,
        }
    }

    pub fn outcome(&self) -> TeamOutcome {
        use std::cmp::Ordering::*;
        match self.a.cmp(&self.b) {
            Greater => TeamOutcome::Winner(TeamLabel::A),
            Less => TeamOutcome::Winner(TeamLabel::B),
            Equal => TeamOutcome::Draw,
        }
    }
}

/// Result of a team tournament, computed only for the closing announcement.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamOutcome {
    Winner(TeamLabel),
    Draw,
}

/// Everything a team tournament tracks besides name and pool.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamState {
    pub team_a: Team,
    pub team_b: Team,
    #[serde(default)]
    pub scores: Scores,
    /// Empty until teams are assigned.
    #[serde(default)]
    pub fight_card: Rounds,
}

impl TeamState {
    pub fn new(team_a_name: impl Into<String>, team_b_name: impl Into<String>) -> Self {
        Self {
            team_a: Team::new(TeamLabel::A, team_a_name),
            team_b: Team::new(TeamLabel::B, team_b_name),
            scores: Scores::default(),
            fight_card: Rounds::new(),
        }
    }

    pub fn team(&self, label: TeamLabel) -> &Team {
        match label {
            TeamLabel::A => &self.team_a,
            TeamLabel::B => &self.team_b,
        }
    }

    /// Teams count as assigned once either side has members.
    pub fn is_assigned(&self) -> bool {
        !self.team_a.members.is_empty() || !self.team_b.members.is_empty()
    }

    pub fn team_of(&self, id: ParticipantId) -> Option<TeamLabel> {
        if self.team_a.has_member(id) {
            Some(TeamLabel::A)
        } else if self.team_b.has_member(id) {
            Some(TeamLabel::B)
        } else {
            None
        }
    }
}
