//! End-to-end tests of the service layer: persistence between calls, audit events, announcements.

use guild_tournament_bot::{
    Actor, CorruptRecordPolicy, ErrorKind, JsonFileAuditLog, JsonFileStore, KeepOrder,
    MemoryAuditLog, MemoryStore, StaticDirectory, TournamentRecord, TournamentService,
};
use std::sync::Arc;
use std::thread;

fn service() -> TournamentService<MemoryStore, MemoryAuditLog, KeepOrder> {
    TournamentService::with_shuffler(MemoryStore::new(), MemoryAuditLog::new(), KeepOrder)
}

fn admin() -> Actor {
    Actor::new(1, "warden")
}

fn directory() -> StaticDirectory {
    StaticDirectory::new()
        .with_member(11, "Ana")
        .with_member(12, "Bo")
        .with_member(13, "Cy")
        .with_member(14, "Di")
}

#[test]
fn solo_flow_announces_each_step() {
    let svc = service();
    let dir = directory();

    let ann = svc.start_solo(&admin(), "Cup", &[11, 12, 13, 14], &dir).unwrap();
    assert!(ann.title.contains("Cup"));
    assert!(ann.field_named("--- Round 1 ---").is_some());

    let ann = svc.declare_winner(&admin(), 11, &dir).unwrap();
    assert_eq!(ann.title, "Winner recorded.");

    let ann = svc.declare_winner(&admin(), 13, &dir).unwrap();
    assert!(ann.field_named("--- Round 2 ---").is_some());

    let ann = svc.declare_winner(&admin(), 11, &dir).unwrap();
    assert!(ann.title.contains("Final Rankings"));
    assert_eq!(ann.field_named("🥇 1st Place"), Some("<@11>"));
    assert_eq!(ann.field_named("🥈 2nd Place"), Some("<@13>"));
    assert_eq!(svc.record().unwrap(), TournamentRecord::Inactive);

    let logs = svc.view_logs(Some("match_winner"), 10).unwrap();
    assert_eq!(logs.fields.len(), 3);
    let complete = svc.view_logs(Some("TOURNAMENT_COMPLETE"), 10).unwrap();
    assert_eq!(complete.fields.len(), 1);
}

#[test]
fn failed_operation_saves_nothing_and_logs_nothing() {
    let svc = service();
    let dir = directory();
    svc.start_solo(&admin(), "Cup", &[11, 12, 13, 14], &dir).unwrap();
    let before = svc.record().unwrap();

    let err = svc.declare_winner(&admin(), 99, &dir).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    assert_eq!(svc.record().unwrap(), before);
    let logs = svc.view_logs(Some("MATCH_WINNER"), 10).unwrap();
    assert!(logs.fields.is_empty());
}

#[test]
fn error_kinds_follow_the_failure() {
    let svc = service();
    let dir = directory();
    let err = svc.start_solo(&admin(), "Cup", &[11, 12, 13], &dir).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Validation));

    let err = svc.end(&admin()).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Conflict));

    svc.start_team(&admin(), "War", "Wolves", "Ravens").unwrap();
    let err = svc.start_solo(&admin(), "Cup", &[11, 12, 13, 14], &dir).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Conflict));
}

#[test]
fn team_flow_through_the_service() {
    let svc = service();
    let dir = directory();
    svc.start_team(&admin(), "War", "Wolves", "Ravens").unwrap();
    for id in [11, 12, 13, 14] {
        let ann = svc.join_pool(&Actor::new(id, "member")).unwrap();
        assert!(ann.title.contains("joined"));
    }
    let again = svc.join_pool(&Actor::new(11, "member")).unwrap();
    assert!(again.title.contains("already registered"));

    let ann = svc.assign_teams(&admin(), &dir).unwrap();
    assert_eq!(ann.field_named("Team: Wolves"), Some("<@11>, <@12>"));
    assert_eq!(ann.field_named("Team: Ravens"), Some("<@13>, <@14>"));

    let ann = svc.declare_team_winner(&admin(), 11, &dir).unwrap();
    assert_eq!(ann.title, "Point for **Wolves**!");
    assert!(ann.field_named("Round complete").is_none());
    let ann = svc.declare_team_winner(&admin(), 14, &dir).unwrap();
    assert!(ann.field_named("Round complete").is_some());

    let ann = svc.advance_fight_card(&admin(), &dir).unwrap();
    assert!(ann.title.contains("Round 2"));

    let ann = svc.end(&admin()).unwrap();
    assert_eq!(ann.description.as_deref(), Some("It's a draw! `Wolves` 1 - 1 `Ravens`"));
    assert_eq!(svc.view_logs(Some("pool_join"), 10).unwrap().fields.len(), 4);
    assert_eq!(svc.view_logs(None, 3).unwrap().fields.len(), 3);
}

#[test]
fn record_survives_a_restart() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = directory();
    let open = || {
        TournamentService::with_shuffler(
            JsonFileStore::new(tmp.path(), CorruptRecordPolicy::Fail),
            JsonFileAuditLog::new(tmp.path().join("audit_log.json")),
            KeepOrder,
        )
    };

    open()
        .start_solo(&admin(), "Cup", &[11, 12, 13, 14], &dir)
        .unwrap();
    open().declare_winner(&admin(), 12, &dir).unwrap();

    let record = open().record().unwrap();
    let bracket = record.active().and_then(|t| t.bracket()).unwrap();
    assert_eq!(bracket.get(1).unwrap()[0].winner, Some(12));
    assert_eq!(open().view_logs(None, 10).unwrap().fields.len(), 2);
}

#[test]
fn concurrent_declarations_record_one_winner() {
    let svc = Arc::new(service());
    svc.start_solo(&admin(), "Cup", &[11, 12, 13, 14], &directory())
        .unwrap();

    let handles: Vec<_> = [11, 12]
        .into_iter()
        .map(|id| {
            let svc = Arc::clone(&svc);
            thread::spawn(move || svc.declare_winner(&admin(), id, &directory()).is_ok())
        })
        .collect();
    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(successes, 1);
}
