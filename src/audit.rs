//! Append-only audit log of state-changing operations, newest entry first.

use crate::directory::Actor;
use crate::models::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// How many entries the log view shows by default.
pub const DEFAULT_VIEW_LIMIT: usize = 10;

/// Event types emitted by the tournament engine.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AuditEventType {
    TournamentStart,
    TournamentEnd,
    TournamentComplete,
    MatchWinner,
    PoolJoin,
    TeamsAssigned,
    FightCardAdvanced,
}

impl AuditEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditEventType::TournamentStart => "TOURNAMENT_START",
            AuditEventType::TournamentEnd => "TOURNAMENT_END",
            AuditEventType::TournamentComplete => "TOURNAMENT_COMPLETE",
            AuditEventType::MatchWinner => "MATCH_WINNER",
            AuditEventType::PoolJoin => "POOL_JOIN",
            AuditEventType::TeamsAssigned => "TEAMS_ASSIGNED",
            AuditEventType::FightCardAdvanced => "FIGHT_CARD_ADVANCED",
        }
    }
}

/// One recorded fact. `event_type` is a free string so a log shared with other bot
/// features (promotions, announcements) still reads back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_type: String,
    pub user_id: ParticipantId,
    pub user_name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub details: Map<String, Value>,
}

impl AuditEvent {
    pub fn new(event_type: AuditEventType, actor: &Actor, details: Map<String, Value>) -> Self {
        Self {
            event_type: event_type.as_str().to_string(),
            user_id: actor.id,
            user_name: actor.name.clone(),
            timestamp: Utc::now(),
            details,
        }
    }

    pub fn is_type(&self, event_type: &str) -> bool {
        self.event_type.eq_ignore_ascii_case(event_type)
    }
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to access audit log at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode audit log: {0}")]
    Encode(#[from] serde_json::Error),
}

pub trait AuditLog: Send + Sync {
    /// Prepend an event.
    fn record(&self, event: AuditEvent) -> Result<(), AuditError>;

    /// All events, newest first.
    fn entries(&self) -> Result<Vec<AuditEvent>, AuditError>;

    /// Newest `limit` events, optionally only those of `event_type` (case-insensitive).
    fn recent(
        &self,
        event_type: Option<&str>,
        limit: usize,
    ) -> Result<Vec<AuditEvent>, AuditError> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|e| event_type.map_or(true, |t| e.is_type(t)))
            .take(limit)
            .collect())
    }
}

/// The whole log as one JSON array in a file.
#[derive(Debug)]
pub struct JsonFileAuditLog {
    path: PathBuf,
    // Serializes read-modify-write of the file within this process.
    lock: Mutex<()>,
}

impl JsonFileAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read(&self) -> Result<Vec<AuditEvent>, AuditError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(AuditError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!(
                "Audit log at {} is corrupt ({}); starting a new one",
                self.path.display(),
                e
            );
            Vec::new()
        }))
    }
}

impl AuditLog for JsonFileAuditLog {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read()?;
        log::info!("audit: {} by {}", event.event_type, event.user_name);
        entries.insert(0, event);
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| AuditError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, json).map_err(|source| AuditError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn entries(&self) -> Result<Vec<AuditEvent>, AuditError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.read()
    }
}

#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditLog for MemoryAuditLog {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(0, event);
        Ok(())
    }

    fn entries(&self) -> Result<Vec<AuditEvent>, AuditError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
