//! Guild tournament bot: library with the tournament engine and its collaborators.

pub mod audit;
pub mod config;
pub mod directory;
pub mod logic;
pub mod models;
pub mod render;
pub mod service;
pub mod store;

pub use audit::{AuditEvent, AuditEventType, AuditLog, JsonFileAuditLog, MemoryAuditLog};
pub use config::Config;
pub use directory::{Actor, AdminRoles, DisplayIdentity, MembershipDirectory, StaticDirectory};
pub use logic::{
    advance_fight_card, advance_if_round_complete, assign_teams, declare_team_winner,
    declare_winner, end_tournament, final_rankings, generate_fight_card, join_pool,
    start_bracket, start_registration, EndedTournament, KeepOrder, RandomOrder, Shuffler,
    SoloProgress, BRACKET_SIZES,
};
pub use models::{
    ErrorKind, FinalRankings, Match, ParticipantId, RoundIndex, Rounds, Scores, Team, TeamLabel,
    TeamOutcome, TeamState, Tournament, TournamentError, TournamentKind, TournamentMode,
    TournamentRecord,
};
pub use render::Announcement;
pub use service::{ServiceError, TournamentService};
pub use store::{CorruptRecordPolicy, JsonFileStore, MemoryStore, RecordStore, StoreError};
