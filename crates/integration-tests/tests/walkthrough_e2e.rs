//! End-to-end walkthrough over SQLite, with and without a forced conflict

use usersdb_core::application::walkthrough::{self, TransactionSummary, WalkthroughOptions};
use usersdb_core::domain::{ConnectionConfig, User};
use usersdb_core::port::{ConnectionProvider, Session, TransactionControl};
use usersdb_infra_sqlite::{SqliteConnectionProvider, SqliteSession};

async fn memory_session() -> SqliteSession {
    SqliteConnectionProvider::new()
        .connect(&ConnectionConfig::new(":memory:", "", "", "testdb"))
        .await
        .unwrap()
}

fn pairs(users: &[User]) -> Vec<(i64, &str, Option<u32>)> {
    users.iter().map(|u| (u.id, u.name.as_str(), u.age)).collect()
}

#[tokio::test]
async fn test_walkthrough_commits() {
    let mut session = memory_session().await;

    let report = walkthrough::run(&mut session, &WalkthroughOptions::new("testdb"))
        .await
        .unwrap();

    assert_eq!(report.cleared_rows, 0);
    assert_eq!(report.inserted.id, 1);
    match &report.transaction {
        TransactionSummary::Committed {
            inserted_ids,
            rows_updated,
        } => {
            assert_eq!(inserted_ids, &vec![2, 3]);
            assert_eq!(*rows_updated, 1);
        }
        other => panic!("expected commit, got {:?}", other),
    }

    assert_eq!(
        pairs(&report.matching),
        vec![(1, "carol", Some(32)), (3, "bob", Some(29)), (2, "alice", Some(25))]
    );
    assert_eq!(report.later_update.rows_affected, 1);
    assert_eq!(
        pairs(&report.final_users),
        vec![(1, "carol", Some(32)), (2, "alice", Some(25)), (3, "bob", Some(31))]
    );

    assert!(session.is_autocommit());
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_walkthrough_with_conflict_rolls_back_and_continues() {
    let mut session = memory_session().await;
    let mut options = WalkthroughOptions::new("testdb");
    options.simulate_conflict = true;

    let report = walkthrough::run(&mut session, &options).await.unwrap();

    match &report.transaction {
        TransactionSummary::RolledBack { failures } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].at, "transaction");
            // SQLITE_CONSTRAINT_UNIQUE
            assert_eq!(failures[0].code.as_deref(), Some("2067"));
        }
        other => panic!("expected rollback, got {:?}", other),
    }

    // Neither batch row survived; bob's later update finds nobody
    assert_eq!(pairs(&report.matching), vec![(1, "carol", Some(32))]);
    assert_eq!(report.later_update.rows_affected, 0);
    assert_eq!(pairs(&report.final_users), vec![(1, "carol", Some(32))]);
    assert!(session.is_autocommit());
}

#[tokio::test]
async fn test_walkthrough_rerun_resets_table() {
    let dir = std::env::temp_dir().join(format!("usersdb_rerun_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let config = ConnectionConfig::new(dir.join("main.db").to_string_lossy(), "", "", "testdb");
    let provider = SqliteConnectionProvider::new();

    for _ in 0..2 {
        let mut session = provider.connect(&config).await.unwrap();
        walkthrough::run(&mut session, &WalkthroughOptions::new("testdb"))
            .await
            .unwrap();
        session.close().await.unwrap();
    }

    let mut session = provider.connect(&config).await.unwrap();
    let report = walkthrough::run(&mut session, &WalkthroughOptions::new("testdb"))
        .await
        .unwrap();
    session.close().await.unwrap();

    // Two earlier runs left three rows each time; ids are never reused
    assert_eq!(report.cleared_rows, 3);
    assert_eq!(report.inserted.id, 7);
    assert_eq!(report.final_users.len(), 3);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn test_walkthrough_report_serializes() {
    let mut session = memory_session().await;
    let report = walkthrough::run(&mut session, &WalkthroughOptions::new("testdb"))
        .await
        .unwrap();

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["transaction"]["outcome"], "committed");
    assert_eq!(value["final_users"][2]["name"], "bob");
    assert_eq!(value["final_users"][2]["age"], 31);
}
