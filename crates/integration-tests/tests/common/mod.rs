//! Store-agnostic checks shared by the SQLite and MySQL suites
//!
//! Each check starts from an empty users table and only asserts on ids
//! relative to each other, so it also holds on a reused MySQL schema.

#![allow(dead_code)]

use usersdb_core::application::run_in_transaction;
use usersdb_core::domain::{NewUser, User};
use usersdb_core::port::Session;
use usersdb_core::AppError;

pub async fn reset<S: Session>(session: &mut S, schema: &str) {
    session.ensure_schema(schema).await.unwrap();
    session.delete_all().await.unwrap();
}

pub fn names(users: &[User]) -> Vec<&str> {
    users.iter().map(|u| u.name.as_str()).collect()
}

/// Repeated schema init succeeds and keeps existing rows
pub async fn check_schema_init_is_idempotent<S: Session>(session: &mut S, schema: &str) {
    reset(session, schema).await;
    session.insert_one(&NewUser::with_age("carol", 32)).await.unwrap();

    session.ensure_schema(schema).await.unwrap();
    session.ensure_schema(schema).await.unwrap();

    assert_eq!(session.count().await.unwrap(), 1);
}

/// A duplicate name is a constraint violation and leaves the row count unchanged
pub async fn check_name_uniqueness<S: Session>(session: &mut S, schema: &str) {
    reset(session, schema).await;
    session.insert_one(&NewUser::with_age("alice", 24)).await.unwrap();
    let before = session.count().await.unwrap();

    let err = session
        .insert_one(&NewUser::with_age("alice", 40))
        .await
        .unwrap_err();

    assert!(err.is_constraint_violation(), "got {:?}", err);
    let store = err.store_error().unwrap();
    assert!(store.code.is_some());
    assert_eq!(session.count().await.unwrap(), before);
}

/// Age descending, then id ascending among equal ages
pub async fn check_select_ordering<S: Session>(session: &mut S, schema: &str) {
    reset(session, schema).await;
    let ids = session
        .insert_many(&[
            NewUser::with_age("carol", 32),
            NewUser::with_age("alice", 25),
            NewUser::with_age("bob", 29),
            NewUser::with_age("dan", 29),
            NewUser::with_age("young", 18),
        ])
        .await
        .unwrap();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));

    let users = session.select_by_min_age(25).await.unwrap();
    assert_eq!(names(&users), vec!["carol", "bob", "dan", "alice"]);
    assert!(users
        .windows(2)
        .all(|w| w[0].age > w[1].age || (w[0].age == w[1].age && w[0].id < w[1].id)));

    assert!(session.select_by_min_age(100).await.unwrap().is_empty());
}

/// A uniqueness failure inside the coordinator rolls back every write of the unit
pub async fn check_transaction_atomicity<S: Session>(session: &mut S, schema: &str) {
    reset(session, schema).await;
    session.insert_one(&NewUser::with_age("carol", 32)).await.unwrap();

    let result = run_in_transaction(session, |s| {
        Box::pin(async move {
            s.insert_many(&[NewUser::with_age("alice", 24), NewUser::with_age("bob", 29)])
                .await?;
            s.update_age_by_name("carol", 33).await?;
            s.insert_one(&NewUser::with_age("alice", 40)).await
        })
    })
    .await;

    let err = result.unwrap_err();
    assert!(matches!(err, AppError::ConstraintViolation(_)), "got {:?}", err);
    assert!(session.is_autocommit());

    let users = session.list_all().await.unwrap();
    assert_eq!(names(&users), vec!["carol"]);
    assert_eq!(users[0].age, Some(32));
}

/// A committed unit is visible afterwards and autocommit is back on
pub async fn check_transaction_commit<S: Session>(session: &mut S, schema: &str) {
    reset(session, schema).await;

    let (ids, updated) = run_in_transaction(session, |s| {
        Box::pin(async move {
            let ids = s
                .insert_many(&[NewUser::with_age("alice", 24), NewUser::with_age("bob", 29)])
                .await?;
            let updated = s.update_age_by_name("alice", 25).await?;
            Ok((ids, updated))
        })
    })
    .await
    .unwrap();

    assert_eq!(ids.len(), 2);
    assert_eq!(updated, 1);
    assert!(session.is_autocommit());

    // Already committed: a stray rollback changes nothing
    session.rollback().await.unwrap();
    let alice = session.find_by_name("alice").await.unwrap().unwrap();
    assert_eq!(alice.age, Some(25));
    assert_eq!(session.count().await.unwrap(), 2);
}

/// NULL age stays distinct from 0
pub async fn check_absent_age<S: Session>(session: &mut S, schema: &str) {
    reset(session, schema).await;
    session.insert_one(&NewUser::without_age("dave")).await.unwrap();
    session.insert_one(&NewUser::with_age("erin", 0)).await.unwrap();

    assert_eq!(session.find_by_name("dave").await.unwrap().unwrap().age, None);
    assert_eq!(session.find_by_name("erin").await.unwrap().unwrap().age, Some(0));
    assert_eq!(names(&session.select_by_min_age(0).await.unwrap()), vec!["erin"]);
}

/// Updating a name that does not exist affects zero rows and is not an error
pub async fn check_update_missing_name<S: Session>(session: &mut S, schema: &str) {
    reset(session, schema).await;
    session.insert_one(&NewUser::with_age("bob", 29)).await.unwrap();

    assert_eq!(session.update_age_by_name("nobody", 40).await.unwrap(), 0);
    assert_eq!(session.update_age_by_name("bob", 31).await.unwrap(), 1);
    assert_eq!(session.find_by_name("bob").await.unwrap().unwrap().age, Some(31));
}

pub async fn check_all<S: Session>(session: &mut S, schema: &str) {
    check_schema_init_is_idempotent(session, schema).await;
    check_name_uniqueness(session, schema).await;
    check_select_ordering(session, schema).await;
    check_transaction_atomicity(session, schema).await;
    check_transaction_commit(session, schema).await;
    check_absent_age(session, schema).await;
    check_update_missing_name(session, schema).await;
}
