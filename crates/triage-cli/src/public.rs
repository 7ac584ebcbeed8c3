//! Commands against the unauthenticated endpoints.

use triage_client::detail::format_predictions;
use triage_client::views::{format_timestamp, status_label, NOT_AVAILABLE};
use triage_client::PublicClient;
use triage_core::AppConfig;

/// Files a complaint and prints the assigned id and predicted department.
///
/// # Errors
///
/// Returns an error if the backend rejects the complaint or is unreachable.
pub(crate) async fn run_submit(config: &AppConfig, pnr: &str, complaint: &str) -> anyhow::Result<()> {
    let client = PublicClient::new(config)?;
    let receipt = client.submit_complaint(pnr, complaint).await?;

    println!("Complaint ID: {}", receipt.complaint_id);
    println!(
        "Department:   {}",
        receipt.primary_department().unwrap_or(NOT_AVAILABLE)
    );
    Ok(())
}

/// # Errors
///
/// Returns an error if the id is unknown or the backend is unreachable.
pub(crate) async fn run_status(config: &AppConfig, id: &str) -> anyhow::Result<()> {
    let client = PublicClient::new(config)?;
    let record = client.complaint_status(id).await?;

    let departments = if record.assigned_departments.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        record.assigned_departments.join(", ")
    };
    println!("Complaint:   {id}");
    println!("PNR:         {}", record.pnr.as_deref().unwrap_or(NOT_AVAILABLE));
    println!("Status:      {}", status_label(record.status));
    println!("Departments: {departments}");
    println!("Predicted:   {}", format_predictions(&record.predicted));
    println!("Submitted:   {}", format_timestamp(record.submitted_at));
    Ok(())
}
