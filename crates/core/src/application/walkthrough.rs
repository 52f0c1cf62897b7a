// Demo Walkthrough Use Case
// Schema setup, single insert, a transactional batch, queries and a final listing.

use super::transaction::run_in_transaction;
use crate::domain::{NewUser, User, UserId};
use crate::error::{AppError, Result};
use crate::port::Session;
use serde::Serialize;
use tracing::{info, warn};

/// Minimum age used by the walkthrough query
pub const DEFAULT_MIN_AGE: u32 = 25;

/// Walkthrough settings
#[derive(Debug, Clone)]
pub struct WalkthroughOptions {
    pub schema: String,
    pub min_age: u32,
    /// Insert a duplicate name inside the transaction to force a rollback
    pub simulate_conflict: bool,
}

impl WalkthroughOptions {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            min_age: DEFAULT_MIN_AGE,
            simulate_conflict: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InsertSummary {
    pub name: String,
    pub id: UserId,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateSummary {
    pub name: String,
    pub age: u32,
    pub rows_affected: u64,
}

/// One rendered error, with store diagnostics when present
#[derive(Debug, Clone, Serialize)]
pub struct FailureSummary {
    /// Operation that failed
    pub at: String,
    pub message: String,
    pub code: Option<String>,
    pub sql_state: Option<String>,
}

impl FailureSummary {
    /// Flatten an error into one summary per failure it carries
    ///
    /// A failed rollback yields two entries: the original error at `at`, then
    /// the rollback error at `rollback`.
    pub fn collect(at: &str, err: &AppError) -> Vec<FailureSummary> {
        match err {
            AppError::RollbackFailed { original, rollback } => {
                let mut all = Self::collect(at, original);
                all.extend(Self::collect("rollback", rollback));
                all
            }
            other => {
                let store = other.store_error();
                vec![FailureSummary {
                    at: at.to_string(),
                    // Store errors keep the server's own wording
                    message: store.map_or_else(|| other.to_string(), |s| s.message.clone()),
                    code: store.and_then(|s| s.code.clone()),
                    sql_state: store.and_then(|s| s.sql_state.clone()),
                }]
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransactionSummary {
    Committed {
        inserted_ids: Vec<UserId>,
        rows_updated: u64,
    },
    RolledBack {
        failures: Vec<FailureSummary>,
    },
}

/// Everything the walkthrough observed, ready for rendering
#[derive(Debug, Clone, Serialize)]
pub struct WalkthroughReport {
    pub schema: String,
    pub cleared_rows: u64,
    pub inserted: InsertSummary,
    pub transaction: TransactionSummary,
    pub min_age: u32,
    pub matching: Vec<User>,
    pub later_update: UpdateSummary,
    pub final_users: Vec<User>,
}

/// Steps completed so far, filled in as the walkthrough advances
///
/// When the walkthrough stops on an error this is what already happened.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WalkthroughProgress {
    /// Set once the schema and table are ready
    pub schema: Option<String>,
    pub cleared_rows: Option<u64>,
    pub inserted: Option<InsertSummary>,
    pub transaction: Option<TransactionSummary>,
    pub matching: Option<Vec<User>>,
    pub later_update: Option<UpdateSummary>,
}

impl WalkthroughProgress {
    /// Step that runs next, i.e. the one that failed if the walkthrough stopped
    pub fn pending_step(&self) -> &'static str {
        if self.schema.is_none() {
            "ensure_schema"
        } else if self.cleared_rows.is_none() {
            "delete_all"
        } else if self.inserted.is_none() {
            "insert"
        } else if self.transaction.is_none() {
            "transaction"
        } else if self.matching.is_none() {
            "select"
        } else if self.later_update.is_none() {
            "update"
        } else {
            "list_all"
        }
    }
}

/// Run the walkthrough on an open session
///
/// A failed transaction is recorded in the report and the walkthrough goes on;
/// any other failure stops it and is returned.
pub async fn run<S: Session>(
    session: &mut S,
    options: &WalkthroughOptions,
) -> Result<WalkthroughReport> {
    run_tracked(session, options, &mut WalkthroughProgress::default()).await
}

/// Same as [`run`], recording each completed step in `progress`
pub async fn run_tracked<S: Session>(
    session: &mut S,
    options: &WalkthroughOptions,
    progress: &mut WalkthroughProgress,
) -> Result<WalkthroughReport> {
    session.ensure_schema(&options.schema).await?;
    progress.schema = Some(options.schema.clone());

    // Demo only: start from an empty table
    let cleared_rows = session.delete_all().await?;
    info!(cleared_rows, "Cleared users table");
    progress.cleared_rows = Some(cleared_rows);

    let carol = NewUser::with_age("carol", 32);
    let carol_id = session.insert_one(&carol).await?;
    info!(id = carol_id, "Inserted carol");
    let inserted = InsertSummary {
        name: carol.name,
        id: carol_id,
    };
    progress.inserted = Some(inserted.clone());

    let simulate_conflict = options.simulate_conflict;
    let tx_result = run_in_transaction(session, move |s| {
        Box::pin(async move {
            let batch = [NewUser::with_age("alice", 24), NewUser::with_age("bob", 29)];
            let inserted_ids = s.insert_many(&batch).await?;
            let rows_updated = s.update_age_by_name("alice", 25).await?;

            if simulate_conflict {
                // Violates the unique name key
                s.insert_one(&NewUser::with_age("alice", 40)).await?;
            }

            Ok((inserted_ids, rows_updated))
        })
    })
    .await;

    let transaction = match tx_result {
        Ok((inserted_ids, rows_updated)) => TransactionSummary::Committed {
            inserted_ids,
            rows_updated,
        },
        Err(e) => {
            warn!(error = %e, "Transaction demo failed (rolled back)");
            TransactionSummary::RolledBack {
                failures: FailureSummary::collect("transaction", &e),
            }
        }
    };
    progress.transaction = Some(transaction.clone());

    let matching = session.select_by_min_age(options.min_age).await?;
    progress.matching = Some(matching.clone());

    let later_age = 31;
    let later_rows = session.update_age_by_name("bob", later_age).await?;
    let later_update = UpdateSummary {
        name: "bob".to_string(),
        age: later_age,
        rows_affected: later_rows,
    };
    progress.later_update = Some(later_update.clone());

    let final_users = session.list_all().await?;

    Ok(WalkthroughReport {
        schema: options.schema.clone(),
        cleared_rows,
        inserted,
        transaction,
        min_age: options.min_age,
        matching,
        later_update,
        final_users,
    })
}
