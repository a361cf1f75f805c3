//! Load → mutate → save orchestration around the engine, with audit events.
//!
//! Every mutating call holds one lock for its whole load-mutate-save sequence, so two
//! concurrent winner declarations cannot both see the same open match.

use crate::audit::{AuditError, AuditEvent, AuditEventType, AuditLog};
use crate::directory::{Actor, MembershipDirectory};
use crate::logic::{self, RandomOrder, Shuffler, SoloProgress};
use crate::models::{
    ErrorKind, ParticipantId, TeamLabel, Tournament, TournamentError, TournamentRecord,
};
use crate::render::{self, Announcement};
use crate::store::{RecordStore, StoreError, DEFAULT_KEY};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Map, Value};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Tournament(#[from] TournamentError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Audit(#[from] AuditError),
}

impl ServiceError {
    /// Engine errors carry a kind; storage and audit failures have none.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ServiceError::Tournament(e) => Some(e.kind()),
            ServiceError::Store(_) | ServiceError::Audit(_) => None,
        }
    }
}

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;

/// One tournament record behind a store, an audit log, and a seeding source.
pub struct TournamentService<S, L, R = RandomOrder<StdRng>> {
    store: S,
    audit: L,
    key: String,
    // Also the lock that serializes record mutations.
    shuffler: Mutex<R>,
}

impl<S: RecordStore, L: AuditLog> TournamentService<S, L> {
    pub fn new(store: S, audit: L) -> Self {
        Self::with_shuffler(store, audit, RandomOrder(StdRng::from_entropy()))
    }
}

impl<S: RecordStore, L: AuditLog, R: Shuffler> TournamentService<S, L, R> {
    pub fn with_shuffler(store: S, audit: L, shuffler: R) -> Self {
        Self {
            store,
            audit,
            key: DEFAULT_KEY.to_string(),
            shuffler: Mutex::new(shuffler),
        }
    }

    /// Use a different record key (default `tournament_data`).
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Run `op` against the stored record and save the result. Nothing is saved if `op` fails.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut TournamentRecord, &mut R) -> Result<T, TournamentError>,
    ) -> Result<T> {
        let mut shuffler = self.shuffler.lock().unwrap_or_else(PoisonError::into_inner);
        let mut record = self.store.load(&self.key)?;
        let out = op(&mut record, &mut *shuffler)?;
        self.store.save(&self.key, &record)?;
        Ok(out)
    }

    fn emit(&self, event_type: AuditEventType, actor: &Actor, details: Value) {
        let details = match details {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if let Err(e) = self
            .audit
            .record(AuditEvent::new(event_type, actor, details))
        {
            log::warn!("Failed to record {} audit event: {}", event_type.as_str(), e);
        }
    }

    /// Current record, read without mutation.
    pub fn record(&self) -> Result<TournamentRecord> {
        Ok(self.store.load(&self.key)?)
    }

    pub fn status(&self, dir: &impl MembershipDirectory) -> Result<Announcement> {
        Ok(render::status_view(&self.record()?, dir))
    }

    pub fn start_solo(
        &self,
        actor: &Actor,
        name: &str,
        participants: &[ParticipantId],
        dir: &impl MembershipDirectory,
    ) -> Result<Announcement> {
        let tournament = self.mutate(|record, shuffler| {
            logic::start_bracket(record, name, participants, shuffler)?;
            record.require_active().cloned()
        })?;
        self.emit(
            AuditEventType::TournamentStart,
            actor,
            json!({ "type": "solo", "name": tournament.name, "players": participants.len() }),
        );
        let mut ann = render::bracket_view(&tournament, dir);
        ann.description =
            Some("**A new 1v1 tournament has started!** The bracket has been generated.".into());
        Ok(ann)
    }

    /// Declare a solo match winner; the bracket advances or finishes on its own.
    pub fn declare_winner(
        &self,
        actor: &Actor,
        winner: ParticipantId,
        dir: &impl MembershipDirectory,
    ) -> Result<Announcement> {
        let (progress, snapshot) = self.mutate(|record, shuffler| {
            let progress = logic::declare_winner(record, winner, shuffler)?;
            Ok((progress, record.active().cloned()))
        })?;
        self.emit(
            AuditEventType::MatchWinner,
            actor,
            json!({ "type": "solo", "winner": winner }),
        );
        Ok(match (progress, snapshot) {
            (SoloProgress::Finished { tournament, rankings }, _) => {
                self.emit(
                    AuditEventType::TournamentComplete,
                    actor,
                    json!({ "name": tournament.name, "winner": rankings.first }),
                );
                render::final_rankings_view(&tournament.name, &rankings, dir)
            }
            (SoloProgress::NextRound(_), Some(t)) => {
                let mut ann = render::bracket_view(&t, dir);
                ann.description = Some(
                    "**All winners recorded! The next round has been generated automatically.**"
                        .into(),
                );
                ann
            }
            (_, snapshot) => {
                let mut ann = Announcement::new("Winner recorded.").description(format!(
                    "{} advances. Waiting for the rest of the round.",
                    render::mention(dir, winner)
                ));
                if let Some(t) = snapshot {
                    ann.fields = render::bracket_view(&t, dir).fields;
                }
                ann
            }
        })
    }

    pub fn start_team(
        &self,
        actor: &Actor,
        name: &str,
        team_a_name: &str,
        team_b_name: &str,
    ) -> Result<Announcement> {
        let tournament = self.mutate(|record, _| {
            logic::start_registration(record, name, team_a_name, team_b_name)?;
            record.require_active().cloned()
        })?;
        self.emit(
            AuditEventType::TournamentStart,
            actor,
            json!({ "type": "team", "name": tournament.name }),
        );
        let state = tournament
            .team_state()
            .ok_or(TournamentError::NoActiveTournament)?;
        Ok(render::registration_opened(&tournament, state))
    }

    /// `actor` joins the pool themselves.
    pub fn join_pool(&self, actor: &Actor) -> Result<Announcement> {
        let (added, tournament) = self.mutate(|record, _| {
            let added = logic::join_pool(record, actor.id)?;
            Ok((added, record.require_active()?.clone()))
        })?;
        if added {
            self.emit(
                AuditEventType::PoolJoin,
                actor,
                json!({ "name": tournament.name }),
            );
            Ok(Announcement::new(format!(
                "✅ You have joined the pool for **{}**! ({} registered)",
                tournament.name,
                tournament.participants.len()
            )))
        } else {
            Ok(Announcement::new(format!(
                "You are already registered for **{}**.",
                tournament.name
            )))
        }
    }

    pub fn assign_teams(
        &self,
        actor: &Actor,
        dir: &impl MembershipDirectory,
    ) -> Result<Announcement> {
        let tournament = self.mutate(|record, shuffler| {
            logic::assign_teams(record, shuffler)?;
            record.require_active().cloned()
        })?;
        let state = tournament
            .team_state()
            .ok_or(TournamentError::NoActiveTournament)?;
        self.emit(
            AuditEventType::TeamsAssigned,
            actor,
            json!({
                "name": tournament.name,
                "team_a": state.team_a.members.len(),
                "team_b": state.team_b.members.len(),
            }),
        );
        Ok(render::team_status_view(&tournament, state, dir))
    }

    pub fn declare_team_winner(
        &self,
        actor: &Actor,
        winner: ParticipantId,
        dir: &impl MembershipDirectory,
    ) -> Result<Announcement> {
        let (label, tournament) = self.mutate(|record, _| {
            let label = logic::declare_team_winner(record, winner)?;
            Ok((label, record.require_active()?.clone()))
        })?;
        self.emit(
            AuditEventType::MatchWinner,
            actor,
            json!({ "type": "team", "winner": winner, "team": label.as_str() }),
        );
        let state = tournament
            .team_state()
            .ok_or(TournamentError::NoActiveTournament)?;
        let mut ann = point_announcement(&tournament, label, winner, dir);
        if state.fight_card.latest_complete() {
            ann = ann.field(
                "Round complete",
                "Use `/team-tournament-next-round` to continue.",
            );
        }
        Ok(ann)
    }

    pub fn advance_fight_card(
        &self,
        actor: &Actor,
        dir: &impl MembershipDirectory,
    ) -> Result<Announcement> {
        let (round, tournament) = self.mutate(|record, shuffler| {
            let round = logic::advance_fight_card(record, shuffler)?;
            Ok((round, record.require_active()?.clone()))
        })?;
        self.emit(
            AuditEventType::FightCardAdvanced,
            actor,
            json!({ "name": tournament.name, "round": round }),
        );
        let state = tournament
            .team_state()
            .ok_or(TournamentError::NoActiveTournament)?;
        Ok(render::fight_card_view(&tournament, state, round, dir))
    }

    pub fn end(&self, actor: &Actor) -> Result<Announcement> {
        let ended = self.mutate(|record, _| logic::end_tournament(record))?;
        self.emit(
            AuditEventType::TournamentEnd,
            actor,
            json!({ "name": ended.tournament.name }),
        );
        Ok(render::ended_view(&ended))
    }

    /// Newest `limit` audit entries, optionally of one type.
    pub fn view_logs(&self, event_type: Option<&str>, limit: usize) -> Result<Announcement> {
        let entries = self.audit.recent(event_type, limit)?;
        Ok(render::audit_log_view(&entries, event_type))
    }
}

fn point_announcement(
    tournament: &Tournament,
    label: TeamLabel,
    winner: ParticipantId,
    dir: &impl MembershipDirectory,
) -> Announcement {
    let Some(state) = tournament.team_state() else {
        return Announcement::new("Winner recorded.");
    };
    Announcement::new(format!(
        "Point for **{}**!",
        state.team(label).display_name
    ))
    .description(format!(
        "{} wins their match. **Score:** `{}` {} - {} `{}`",
        render::mention(dir, winner),
        state.team_a.display_name,
        state.scores.a,
        state.scores.b,
        state.team_b.display_name
    ))
}
