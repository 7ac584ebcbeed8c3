//! Authenticated dashboard commands.
//!
//! Each command starts from a fresh fetch of the complaint list, then prints
//! a projection of it. A forced logout is reported by the session hook set up
//! in `main`; the error itself propagates as the command's failure.

use std::sync::Arc;

use triage_client::{
    ApiClient, ComplaintStats, Console, DepartmentFilter, FilterState, Session, StatusFilter,
    TableRow, UpdateForm,
};
use triage_core::{AppConfig, ComplaintStatus};

const DEPARTMENTS_WIDTH: usize = 28;

pub(crate) fn open_console(config: &AppConfig, session: Arc<Session>) -> anyhow::Result<Console> {
    let client = ApiClient::new(config, session)?;
    Ok(Console::new(client))
}

fn print_stats(stats: &ComplaintStats) {
    println!(
        "{:<8}{:<10}{:<14}RESOLVED",
        "TOTAL", "PENDING", "IN PROGRESS"
    );
    println!(
        "{:<8}{:<10}{:<14}{}",
        stats.total, stats.pending, stats.in_progress, stats.resolved
    );
    let unknown = stats.unknown();
    if unknown > 0 {
        println!("({unknown} without a recognised status)");
    }
}

fn print_rows(rows: &[TableRow]) {
    if rows.is_empty() {
        println!("no complaints match the current filters");
        return;
    }

    let header = format!(
        "{:<10}{:<12}{:<24}{:<30}STATUS",
        "ID", "PNR", "SUBMITTED", "DEPARTMENTS"
    );
    println!("{header}");
    for row in rows {
        let departments = if row.departments.chars().count() > DEPARTMENTS_WIDTH {
            format!(
                "{}...",
                row.departments
                    .chars()
                    .take(DEPARTMENTS_WIDTH - 3)
                    .collect::<String>()
            )
        } else {
            row.departments.clone()
        };
        println!(
            "{:<10}{:<12}{:<24}{:<30}{}",
            row.id, row.pnr, row.submitted, departments, row.status
        );
    }
}

/// Prints the statistic cards.
///
/// # Errors
///
/// Returns an error if the complaint list cannot be fetched.
pub(crate) async fn run_stats(console: &mut Console) -> anyhow::Result<()> {
    console.reload().await?;
    print_stats(&console.view().await.stats);
    Ok(())
}

/// Prints the department options and the filtered, newest-first table.
///
/// # Errors
///
/// Returns an error if the complaint list cannot be fetched.
pub(crate) async fn run_list(
    console: &mut Console,
    status: StatusFilter,
    department: Option<&str>,
    search: Option<String>,
) -> anyhow::Result<()> {
    console.reload().await?;
    console.set_filter(FilterState {
        status,
        department: department.map_or(DepartmentFilter::All, DepartmentFilter::from),
        search_text: search.unwrap_or_default(),
    });

    let view = console.view().await;
    let options: Vec<&str> = view
        .department_options
        .iter()
        .map(DepartmentFilter::label)
        .collect();
    println!("Departments: {}", options.join(" | "));
    println!();
    print_rows(&view.rows);
    Ok(())
}

/// # Errors
///
/// Returns an error if the list cannot be fetched or `id` is not in it.
pub(crate) async fn run_show(console: &mut Console, id: &str) -> anyhow::Result<()> {
    console.reload().await?;
    let detail = console.open_detail(id).await?;

    println!("{}", detail.title);
    println!();
    println!("Complaint:   {}", detail.complaint);
    println!("Predicted:   {}", detail.predicted);
    println!("Status:      {}", detail.form.status);
    println!("Departments: {}", detail.form.departments);
    Ok(())
}

/// Runs the update-then-refresh cycle for one complaint and prints the
/// refreshed statistics.
///
/// # Errors
///
/// Returns an error if the list cannot be fetched, `id` is not in it, or the
/// backend rejects the update. A failed refresh after a successful update is
/// also an error.
pub(crate) async fn run_update(
    console: &mut Console,
    id: &str,
    status: ComplaintStatus,
    departments: String,
) -> anyhow::Result<()> {
    console.reload().await?;
    console.open_detail(id).await?;
    console
        .submit_update(UpdateForm {
            status,
            departments,
        })
        .await?;

    println!("Complaint updated successfully!");
    println!();
    print_stats(&console.view().await.stats);
    Ok(())
}
