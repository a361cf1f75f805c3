//! Tournament business logic: solo brackets, team fight cards, ending a tournament.
//!
//! Every operation takes the record by `&mut` and either mutates it or returns an
//! error with the record unchanged.

mod lifecycle;
mod shuffle;
mod solo;
mod team;

pub use lifecycle::{end_tournament, EndedTournament};
pub use shuffle::{KeepOrder, RandomOrder, Shuffler};
pub use solo::{
    advance_if_round_complete, declare_winner, final_rankings, start_bracket, SoloProgress,
    BRACKET_SIZES,
};
pub use team::{
    advance_fight_card, assign_teams, declare_team_winner, generate_fight_card, join_pool,
    start_registration,
};
