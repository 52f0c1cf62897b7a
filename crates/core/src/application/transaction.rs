// Transaction Coordinator
// Runs a unit of work with autocommit disabled and always restores autocommit.

use crate::domain::TransactionState;
use crate::error::{AppError, Result};
use crate::port::TransactionControl;
use futures::future::BoxFuture;
use tracing::{debug, error, info, warn};

/// Run `body` as one atomic unit of work on `session`
///
/// - Autocommit is disabled before `body` runs.
/// - On success the work is committed, then autocommit is restored.
/// - On failure (including a failed commit) the work is rolled back, autocommit
///   is restored, and the original error is returned. If the rollback fails
///   too, `AppError::RollbackFailed` carries both errors.
///
/// After this returns, the session is in autocommit mode unless restoring it
/// failed; on the success path that failure is returned, on the failure path
/// it is logged and the original error wins.
///
/// # Example
/// ```text
/// let ids = run_in_transaction(&mut session, |s| {
///     Box::pin(async move { s.insert_many(&users).await })
/// })
/// .await?;
/// ```
pub async fn run_in_transaction<S, T, F>(session: &mut S, body: F) -> Result<T>
where
    S: TransactionControl,
    T: Send,
    F: for<'s> FnOnce(&'s mut S) -> BoxFuture<'s, Result<T>> + Send,
{
    let mut state = TransactionState::Autocommit;

    session.set_autocommit(false).await?;
    advance(&mut state, TransactionState::InTransaction)?;
    debug!(state = %state, "Transaction started");

    let outcome = match body(&mut *session).await {
        Ok(value) => session.commit().await.map(|()| value),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(value) => {
            advance(&mut state, TransactionState::Committed)?;
            session.set_autocommit(true).await?;
            advance(&mut state, TransactionState::Autocommit)?;
            info!("Transaction committed");
            Ok(value)
        }
        Err(original) => {
            warn!(error = %original, "Transaction failed, rolling back");

            let rollback = session.rollback().await;
            match &rollback {
                Ok(()) => {
                    log_rejected(advance(&mut state, TransactionState::RolledBack));
                    info!("Transaction rolled back");
                }
                Err(e) => error!(error = %e, "Rollback failed"),
            }

            match session.set_autocommit(true).await {
                Ok(()) => log_rejected(advance(&mut state, TransactionState::Autocommit)),
                Err(e) => error!(
                    error = %e,
                    state = %state,
                    "Failed to restore autocommit after aborted transaction"
                ),
            }

            match rollback {
                Ok(()) => Err(original),
                Err(rollback) => Err(AppError::RollbackFailed {
                    original: Box::new(original),
                    rollback: Box::new(rollback),
                }),
            }
        }
    }
}

/// Track the session's transaction state; a rejected edge leaves it unchanged
fn advance(state: &mut TransactionState, next: TransactionState) -> Result<()> {
    state.transition(next).map_err(AppError::from)
}

// On the failure path the original error wins over tracking errors
fn log_rejected(tracked: Result<()>) {
    if let Err(e) = tracked {
        error!(error = %e, "Transaction state tracking out of sync");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewUser;
    use crate::port::mocks::{MockFailures, MockSession};
    use crate::port::UserRepository;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_commit_restores_autocommit() {
        let mut session = MockSession::new();

        let ids = assert_ok!(
            run_in_transaction(&mut session, |s| {
                Box::pin(async move {
                    s.insert_many(&[NewUser::with_age("alice", 24), NewUser::with_age("bob", 29)])
                        .await
                })
            })
            .await
        );

        assert_eq!(ids, vec![1, 2]);
        assert!(session.is_autocommit());
        assert_eq!(session.calls, vec!["autocommit_off", "commit", "autocommit_on"]);
        assert_eq!(session.rows().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_rolls_back_and_reraises() {
        let mut session = MockSession::new();
        session.insert_one(&NewUser::with_age("carol", 32)).await.unwrap();

        let result = run_in_transaction(&mut session, |s| {
            Box::pin(async move {
                s.insert_one(&NewUser::with_age("alice", 24)).await?;
                s.insert_one(&NewUser::with_age("carol", 40)).await
            })
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));
        assert!(session.is_autocommit());
        assert_eq!(
            session.calls,
            vec!["autocommit_off", "rollback", "autocommit_on"]
        );

        // alice was discarded, carol untouched
        assert_eq!(session.rows().len(), 1);
        assert_eq!(session.rows()[0].name, "carol");
    }

    #[tokio::test]
    async fn test_rollback_failure_surfaces_both_errors() {
        let mut session = MockSession::with_failures(MockFailures {
            rollback: true,
            ..Default::default()
        });
        session.insert_one(&NewUser::with_age("alice", 24)).await.unwrap();

        let result = run_in_transaction(&mut session, |s| {
            Box::pin(async move { s.insert_one(&NewUser::with_age("alice", 40)).await })
        })
        .await;

        match result.unwrap_err() {
            AppError::RollbackFailed { original, rollback } => {
                assert!(matches!(*original, AppError::ConstraintViolation(_)));
                assert!(matches!(*rollback, AppError::Connection(_)));
            }
            other => panic!("expected RollbackFailed, got {:?}", other),
        }

        // Autocommit is restored even though the rollback failed
        assert!(session.is_autocommit());
        assert_eq!(
            session.calls,
            vec!["autocommit_off", "rollback", "autocommit_on"]
        );
    }

    #[tokio::test]
    async fn test_commit_failure_triggers_rollback() {
        let mut session = MockSession::with_failures(MockFailures {
            commit: true,
            ..Default::default()
        });

        let result = run_in_transaction(&mut session, |s| {
            Box::pin(async move { s.insert_one(&NewUser::with_age("alice", 24)).await })
        })
        .await;

        let err = assert_err!(result);
        assert!(matches!(err, AppError::Connection(_)));
        assert!(session.is_autocommit());
        assert_eq!(
            session.calls,
            vec!["autocommit_off", "commit", "rollback", "autocommit_on"]
        );
        assert!(session.rows().is_empty());
    }

    #[tokio::test]
    async fn test_restore_failure_does_not_mask_original_error() {
        let mut session = MockSession::with_failures(MockFailures {
            enable_autocommit: true,
            ..Default::default()
        });

        let result = run_in_transaction(&mut session, |s| {
            Box::pin(async move {
                s.insert_one(&NewUser::with_age("alice", 24)).await?;
                s.insert_one(&NewUser::with_age("alice", 25)).await
            })
        })
        .await;

        assert!(matches!(result, Err(AppError::ConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_restore_failure_after_commit_is_returned() {
        let mut session = MockSession::with_failures(MockFailures {
            enable_autocommit: true,
            ..Default::default()
        });

        let result = run_in_transaction(&mut session, |s| {
            Box::pin(async move { s.insert_one(&NewUser::with_age("alice", 24)).await })
        })
        .await;

        assert!(matches!(result, Err(AppError::Connection(_))));
        assert_eq!(session.calls, vec!["autocommit_off", "commit", "autocommit_on"]);
    }

    #[test]
    fn test_advance_rejects_edge_without_forcing_state() {
        let mut state = TransactionState::Committed;

        let err = advance(&mut state, TransactionState::RolledBack).unwrap_err();
        assert!(matches!(err, AppError::Domain(_)));
        assert_eq!(state, TransactionState::Committed);

        assert_ok!(advance(&mut state, TransactionState::Autocommit));
        assert_eq!(state, TransactionState::Autocommit);
    }
}
