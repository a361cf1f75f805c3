//! Presentation: tournament state to announcements. Pure; never mutates state.

use crate::audit::AuditEvent;
use crate::directory::MembershipDirectory;
use crate::logic::{EndedTournament, BRACKET_SIZES};
use crate::models::{
    FinalRankings, Match, ParticipantId, RoundIndex, TeamOutcome, TeamState, Tournament,
    TournamentMode, TournamentRecord,
};
use serde::Serialize;
use std::fmt;

/// A structured message for the channel: title, optional body, named sections.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Announcement {
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<Field>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub value: String,
}

impl Announcement {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn field_named(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "**{}**", self.title)?;
        if let Some(description) = &self.description {
            write!(f, "\n{description}")?;
        }
        for field in &self.fields {
            write!(f, "\n\n__{}__\n{}", field.name, field.value)?;
        }
        Ok(())
    }
}

/// Mention for `id`, or a raw-id placeholder when the directory does not know them.
pub fn mention(dir: &impl MembershipDirectory, id: ParticipantId) -> String {
    dir.resolve(id)
        .map(|identity| identity.mention)
        .unwrap_or_else(|| format!("`ID: {id}`"))
}

fn mention_list(dir: &impl MembershipDirectory, ids: &[ParticipantId], empty: &str) -> String {
    if ids.is_empty() {
        return empty.to_string();
    }
    ids.iter()
        .map(|&id| mention(dir, id))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `Match i: p1 vs p2[ -> Winner: w]`, one line per match.
fn match_lines(dir: &impl MembershipDirectory, matches: &[Match]) -> String {
    if matches.is_empty() {
        return "TBD".to_string();
    }
    matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let line = format!(
                "`Match {}`: {} vs {}",
                i + 1,
                mention(dir, m.player1),
                mention(dir, m.player2)
            );
            match m.winner {
                Some(w) => format!("{line} -> **Winner: {}**", mention(dir, w)),
                None => line,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn round_heading(round: RoundIndex) -> String {
    format!("--- Round {round} ---")
}

/// Solo bracket, every round so far. Before any round exists, the registered players.
pub fn bracket_view(tournament: &Tournament, dir: &impl MembershipDirectory) -> Announcement {
    let title = format!("⚔️ Bracket for {} ⚔️", tournament.name);
    let bracket = match tournament.bracket() {
        Some(bracket) if !bracket.is_empty() => bracket,
        _ => {
            let max = BRACKET_SIZES.iter().max().copied().unwrap_or_default();
            let players = tournament
                .participants
                .iter()
                .map(|&id| mention(dir, id))
                .collect::<Vec<_>>();
            let list = if players.is_empty() {
                "No players yet.".to_string()
            } else {
                players.join("\n")
            };
            return Announcement::new(title).description(format!(
                "**Registration Phase**\n\n**Players ({}/{max}):**\n{list}",
                players.len()
            ));
        }
    };
    bracket
        .iter()
        .fold(Announcement::new(title), |ann, (round, matches)| {
            ann.field(round_heading(round), match_lines(dir, matches))
        })
}

/// Scores, rosters, and the current fight card of a team tournament.
pub fn team_status_view(
    tournament: &Tournament,
    state: &TeamState,
    dir: &impl MembershipDirectory,
) -> Announcement {
    let (a, b) = (&state.team_a, &state.team_b);
    let mut ann = Announcement::new(format!("📊 Status for {}", tournament.name)).description(
        format!(
            "**Score:** `{}` {} - {} `{}`",
            a.display_name, state.scores.a, state.scores.b, b.display_name
        ),
    );
    if !state.is_assigned() {
        ann = ann.field(
            format!("Pool ({})", tournament.participants.len()),
            mention_list(dir, &tournament.participants, "No players yet."),
        );
    }
    ann = ann
        .field(
            format!("Team: {}", a.display_name),
            mention_list(dir, &a.members, "No members yet."),
        )
        .field(
            format!("Team: {}", b.display_name),
            mention_list(dir, &b.members, "No members yet."),
        );
    if let Some((round, matches)) = state.fight_card.latest() {
        ann = ann.field(
            format!("Fight Card - Round {round}"),
            match_lines(dir, matches),
        );
    }
    ann
}

/// Just one fight-card round, posted when it is generated.
pub fn fight_card_view(
    tournament: &Tournament,
    state: &TeamState,
    round: RoundIndex,
    dir: &impl MembershipDirectory,
) -> Announcement {
    let matches = state.fight_card.get(round).unwrap_or_default();
    let sitting_out: Vec<ParticipantId> = state
        .team_a
        .members
        .iter()
        .chain(state.team_b.members.iter())
        .copied()
        .filter(|&id| !matches.iter().any(|m| m.contains(id)))
        .collect();
    let mut ann = Announcement::new(format!("🥊 {} - Fight Card Round {round}", tournament.name))
        .field("Matches", match_lines(dir, matches));
    if !sitting_out.is_empty() {
        ann = ann.field("Sitting Out", mention_list(dir, &sitting_out, ""));
    }
    ann
}

/// Status of whatever is in the record.
pub fn status_view(record: &TournamentRecord, dir: &impl MembershipDirectory) -> Announcement {
    match record {
        TournamentRecord::Inactive => Announcement::new("There is no active tournament."),
        TournamentRecord::Active(t) => match &t.mode {
            TournamentMode::Solo { .. } => bracket_view(t, dir),
            TournamentMode::Team(state) => team_status_view(t, state, dir),
        },
    }
}

/// Placement bands of a finished bracket.
pub fn final_rankings_view(
    name: &str,
    rankings: &FinalRankings,
    dir: &impl MembershipDirectory,
) -> Announcement {
    let mut ann = Announcement::new(format!("🏆 Final Rankings for {name} 🏆"))
        .field("🥇 1st Place", mention(dir, rankings.first))
        .field("🥈 2nd Place", mention(dir, rankings.second));
    if !rankings.semifinalists.is_empty() {
        ann = ann.field(
            "🥉 Semi-Finalists (3rd/4th)",
            mention_list(dir, &rankings.semifinalists, ""),
        );
    }
    if !rankings.quarterfinalists.is_empty() {
        ann = ann.field(
            "🏅 Quarter-Finalists",
            mention_list(dir, &rankings.quarterfinalists, ""),
        );
    }
    for (round, losers) in rankings.earlier_rounds.iter().rev() {
        ann = ann.field(
            format!("⚔️ Eliminated in Round {round}"),
            mention_list(dir, losers, ""),
        );
    }
    ann
}

/// Posted when a team tournament opens registration.
pub fn registration_opened(tournament: &Tournament, state: &TeamState) -> Announcement {
    Announcement::new(format!("🔥 Team Tournament Started: {} 🔥", tournament.name)).description(
        format!(
            "Join the pool with `/team-tournament-join` to fight for **{}** or **{}**!",
            state.team_a.display_name, state.team_b.display_name
        ),
    )
}

/// Closing message for a manually ended tournament.
pub fn ended_view(ended: &EndedTournament) -> Announcement {
    let t = &ended.tournament;
    let mut ann = Announcement::new(format!("The tournament **{}** has been manually ended.", t.name));
    if let (Some(outcome), Some(state)) = (ended.outcome, t.team_state()) {
        let score = format!(
            "`{}` {} - {} `{}`",
            state.team_a.display_name, state.scores.a, state.scores.b, state.team_b.display_name
        );
        let result = match outcome {
            TeamOutcome::Winner(label) => {
                format!("**{}** wins! {score}", state.team(label).display_name)
            }
            TeamOutcome::Draw => format!("It's a draw! {score}"),
        };
        ann = ann.description(result);
    }
    ann
}

/// Audit log entries, newest first.
pub fn audit_log_view(entries: &[AuditEvent], event_type: Option<&str>) -> Announcement {
    if entries.is_empty() {
        return Announcement::new("📜 Audit Log").description(match event_type {
            Some(t) => format!("No logs found for event type: `{t}`."),
            None => "Log file is empty.".to_string(),
        });
    }
    let ann = Announcement::new("📜 Audit Log")
        .description(format!("Showing the last {} entries.", entries.len()));
    entries.iter().fold(ann, |ann, entry| {
        let details = entry
            .details
            .iter()
            .map(|(k, v)| match v {
                serde_json::Value::String(s) => format!("**{k}**: {s}"),
                other => format!("**{k}**: {other}"),
            })
            .collect::<Vec<_>>()
            .join(", ");
        ann.field(
            format!("🔹 {} by {}", entry.event_type, entry.user_name),
            format!(
                "<t:{}:R>\n**Details:** {details}",
                entry.timestamp.timestamp()
            ),
        )
    })
}

/// Tournament command reference.
pub fn help_view() -> Announcement {
    Announcement::new("🤖 Tournament Commands")
        .field(
            "⚔️ Solo Bracket",
            "`/solo-tournament-start`, `/tournament-winner`",
        )
        .field(
            "🔥 Team Tournament",
            "`/team-tournament-start`, `/team-tournament-join`, `/team-tournament-assign`, \
             `/team-tournament-winner`, `/team-tournament-next-round`",
        )
        .field(
            "🌍 General",
            "`/tournament-status`, `/tournament-end`, `/view-logs`, `/help`",
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::StaticDirectory;
    use crate::models::Rounds;

    fn solo(bracket: Rounds, participants: Vec<ParticipantId>) -> Tournament {
        Tournament {
            name: "Cup".into(),
            participants,
            mode: TournamentMode::Solo { bracket },
        }
    }

    #[test]
    fn unknown_members_render_as_placeholders() {
        let dir = StaticDirectory::new().with_member(1, "Ana");
        assert_eq!(mention(&dir, 1), "<@1>");
        assert_eq!(mention(&dir, 99), "`ID: 99`");
    }

    #[test]
    fn bracket_lines_show_winners() {
        let mut bracket = Rounds::new();
        let mut decided = Match::new(1, 2);
        decided.winner = Some(2);
        bracket.push(vec![decided, Match::new(3, 4)]);
        let ann = bracket_view(&solo(bracket, vec![1, 2, 3, 4]), &StaticDirectory::new());
        let round = ann.field_named("--- Round 1 ---").unwrap();
        assert_eq!(
            round,
            "`Match 1`: `ID: 1` vs `ID: 2` -> **Winner: `ID: 2`**\n`Match 2`: `ID: 3` vs `ID: 4`"
        );
    }

    #[test]
    fn empty_bracket_shows_registration() {
        let ann = bracket_view(&solo(Rounds::new(), vec![]), &StaticDirectory::new());
        let text = ann.to_string();
        assert!(text.contains("Players (0/16)"));
        assert!(text.contains("No players yet."));
    }

    #[test]
    fn empty_filtered_log() {
        let ann = audit_log_view(&[], Some("PROMOTION"));
        assert_eq!(
            ann.description.as_deref(),
            Some("No logs found for event type: `PROMOTION`.")
        );
    }

    #[test]
    fn inactive_status() {
        let ann = status_view(&TournamentRecord::Inactive, &StaticDirectory::new());
        assert_eq!(ann.title, "There is no active tournament.");
    }
}
