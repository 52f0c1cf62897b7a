// Report Rendering
// Pure formatting of walkthrough results; nothing here touches the store.

use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use usersdb_core::application::walkthrough::{FailureSummary, TransactionSummary, UpdateSummary};
use usersdb_core::application::{WalkthroughProgress, WalkthroughReport};
use usersdb_core::domain::{User, UserId};
use usersdb_core::AppError;

/// Printed for absent ages, in both the table and the listing
const ABSENT_AGE: i64 = -1;

#[derive(Tabled)]
struct UserLine {
    #[tabled(rename = "ID")]
    id: UserId,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Age")]
    age: i64,
}

fn display_age(user: &User) -> i64 {
    user.age.map_or(ABSENT_AGE, i64::from)
}

/// Fixed-width table with ID, Name and Age columns
pub fn users_table(users: &[User]) -> String {
    if users.is_empty() {
        return "(no rows)".to_string();
    }

    let lines = users.iter().map(|u| UserLine {
        id: u.id,
        name: u.name.clone(),
        age: display_age(u),
    });
    Table::new(lines).with(Style::blank()).to_string()
}

/// One `ID=.. | name=.. | age=..` line per row
pub fn final_users(users: &[User]) -> String {
    users
        .iter()
        .map(|u| format!("ID={} | name={} | age={}", u.id, u.name, display_age(u)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn inserted_line(name: &str, id: UserId) -> String {
    format!("Inserted {} with id {}", name, id)
}

pub fn rows_updated_line(label: &str, rows: u64) -> String {
    format!("{}: {} row(s) updated", label, rows)
}

fn failure_line(failure: &FailureSummary) -> String {
    format!(
        "[SQL ERROR @ {}] {} | error code: {} | SQLState: {}",
        failure.at,
        failure.message,
        failure.code.as_deref().unwrap_or("n/a"),
        failure.sql_state.as_deref().unwrap_or("n/a"),
    )
}

/// Operator-facing rendering of a failure, one line per error it carries
pub fn store_error(at: &str, err: &AppError) -> String {
    failure_lines(&FailureSummary::collect(at, err))
}

pub fn failure_lines(failures: &[FailureSummary]) -> String {
    failures
        .iter()
        .map(failure_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn heading(text: &str) -> String {
    text.bold().cyan().to_string()
}

fn transaction_lines(summary: &TransactionSummary) -> Vec<String> {
    match summary {
        TransactionSummary::Committed {
            inserted_ids,
            rows_updated,
        } => {
            let ids = inserted_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            vec![
                format!("{} (inserted ids: {})", "Transaction committed".green(), ids),
                rows_updated_line("Age update in transaction", *rows_updated),
            ]
        }
        // Error lines for a rollback go to stderr with the other SQL errors
        TransactionSummary::RolledBack { .. } => {
            vec![format!("{}", "Transaction rolled back".yellow())]
        }
    }
}

fn later_update_line(update: &UpdateSummary) -> String {
    rows_updated_line(
        &format!("Set {} age to {}", update.name, update.age),
        update.rows_affected,
    )
}

pub fn walkthrough_text(report: &WalkthroughReport) -> String {
    let mut out = Vec::new();

    out.push(heading(&format!("usersdb walkthrough (schema {})", report.schema)));
    out.push(format!("Cleared {} existing row(s)", report.cleared_rows));
    out.push(inserted_line(&report.inserted.name, report.inserted.id));
    out.extend(transaction_lines(&report.transaction));

    out.push(String::new());
    out.push(heading(&format!("Users with age >= {}", report.min_age)));
    out.push(users_table(&report.matching));

    out.push(String::new());
    out.push(later_update_line(&report.later_update));

    out.push(String::new());
    out.push(heading("Final table state"));
    if report.final_users.is_empty() {
        out.push("(no rows)".to_string());
    } else {
        out.push(final_users(&report.final_users));
    }

    out.join("\n")
}

/// Steps of an interrupted walkthrough that did complete
///
/// Empty when not even the schema could be prepared.
pub fn progress_text(progress: &WalkthroughProgress, min_age: u32) -> String {
    let Some(schema) = &progress.schema else {
        return String::new();
    };

    let mut out = vec![heading(&format!("usersdb walkthrough (schema {})", schema))];
    if let Some(cleared_rows) = progress.cleared_rows {
        out.push(format!("Cleared {} existing row(s)", cleared_rows));
    }
    if let Some(inserted) = &progress.inserted {
        out.push(inserted_line(&inserted.name, inserted.id));
    }
    if let Some(transaction) = &progress.transaction {
        out.extend(transaction_lines(transaction));
    }
    if let Some(matching) = &progress.matching {
        out.push(String::new());
        out.push(heading(&format!("Users with age >= {}", min_age)));
        out.push(users_table(matching));
    }
    if let Some(update) = &progress.later_update {
        out.push(String::new());
        out.push(later_update_line(update));
    }

    out.push(String::new());
    out.push(format!("{}", "Walkthrough stopped early".red()));
    out.join("\n")
}

pub fn walkthrough_json(report: &WalkthroughReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

pub fn progress_json(progress: &WalkthroughProgress) -> serde_json::Result<String> {
    serde_json::to_string_pretty(progress)
}
