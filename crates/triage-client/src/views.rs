//! Derived views over a complaint snapshot: statistics, department filter
//! options and the filtered/sorted table.
//!
//! Everything here is a pure function of `(Complaints, FilterState)`.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::DateTime;
use triage_core::{ComplaintRecord, ComplaintStatus, Complaints};

/// Placeholder for any missing display value.
pub const NOT_AVAILABLE: &str = "N/A";
/// Display value for a record with no recognised status.
pub const UNKNOWN_STATUS: &str = "Unknown";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComplaintStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
}

impl ComplaintStats {
    /// Records counted in `total` but in no status bucket.
    #[must_use]
    pub fn unknown(&self) -> usize {
        self.total
            .saturating_sub(self.pending + self.in_progress + self.resolved)
    }
}

/// Counts by status. A record without a known status counts toward `total`
/// only.
#[must_use]
pub fn compute_stats(complaints: &Complaints) -> ComplaintStats {
    complaints
        .values()
        .fold(ComplaintStats::default(), |mut stats, record| {
            stats.total += 1;
            match record.status {
                Some(ComplaintStatus::Pending) => stats.pending += 1,
                Some(ComplaintStatus::InProgress) => stats.in_progress += 1,
                Some(ComplaintStatus::Resolved) => stats.resolved += 1,
                None => {}
            }
            stats
        })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ComplaintStatus),
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum DepartmentFilter {
    #[default]
    All,
    Only(String),
}

impl DepartmentFilter {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            DepartmentFilter::All => "All Departments",
            DepartmentFilter::Only(department) => department,
        }
    }
}

impl From<&str> for DepartmentFilter {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("all") {
            DepartmentFilter::All
        } else {
            DepartmentFilter::Only(s.to_owned())
        }
    }
}

/// `All` followed by every distinct assigned department, sorted.
#[must_use]
pub fn department_options(complaints: &Complaints) -> Vec<DepartmentFilter> {
    let departments: BTreeSet<&str> = complaints
        .values()
        .flat_map(|record| record.assigned_departments.iter().map(String::as_str))
        .collect();

    std::iter::once(DepartmentFilter::All)
        .chain(
            departments
                .into_iter()
                .map(|d| DepartmentFilter::Only(d.to_owned())),
        )
        .collect()
}

/// Current table controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub status: StatusFilter,
    pub department: DepartmentFilter,
    pub search_text: String,
}

impl FilterState {
    #[must_use]
    pub fn matches_status(&self, record: &ComplaintRecord) -> bool {
        match self.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => record.status == Some(status),
        }
    }

    #[must_use]
    pub fn matches_department(&self, record: &ComplaintRecord) -> bool {
        match &self.department {
            DepartmentFilter::All => true,
            DepartmentFilter::Only(department) => record.is_assigned_to(department),
        }
    }

    /// Case-insensitive substring match on the id or the PNR. Empty search
    /// text matches everything.
    #[must_use]
    pub fn matches_search(&self, id: &str, record: &ComplaintRecord) -> bool {
        if self.search_text.is_empty() {
            return true;
        }
        let needle = self.search_text.to_lowercase();
        id.to_lowercase().contains(&needle)
            || record
                .pnr
                .as_deref()
                .is_some_and(|pnr| pnr.to_lowercase().contains(&needle))
    }

    /// All three filters, combined with AND.
    #[must_use]
    pub fn matches(&self, id: &str, record: &ComplaintRecord) -> bool {
        self.matches_status(record)
            && self.matches_department(record)
            && self.matches_search(id, record)
    }
}

/// Filters `complaints` and orders the result newest first. A missing
/// timestamp sorts as 0; equal timestamps keep id order.
#[must_use]
pub fn project<'a>(
    complaints: &'a Complaints,
    filter: &FilterState,
) -> Vec<(&'a str, &'a ComplaintRecord)> {
    let mut rows: Vec<(&str, &ComplaintRecord)> = complaints
        .iter()
        .filter(|(id, record)| filter.matches(id, record))
        .map(|(id, record)| (id.as_str(), record))
        .collect();
    rows.sort_by(|(_, a), (_, b)| {
        b.submitted_at_or_epoch()
            .total_cmp(&a.submitted_at_or_epoch())
    });
    rows
}

/// One table line, ready to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub id: String,
    pub pnr: String,
    pub submitted: String,
    pub departments: String,
    pub status: String,
}

impl TableRow {
    #[must_use]
    pub fn new(id: &str, record: &ComplaintRecord) -> Self {
        Self {
            id: id.to_owned(),
            pnr: record
                .pnr
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            submitted: format_timestamp(record.submitted_at),
            departments: join_or_na(&record.assigned_departments),
            status: status_label(record.status).to_string(),
        }
    }
}

#[must_use]
pub fn table_rows(rows: &[(&str, &ComplaintRecord)]) -> Vec<TableRow> {
    rows.iter()
        .map(|(id, record)| TableRow::new(id, record))
        .collect()
}

#[must_use]
pub fn status_label(status: Option<ComplaintStatus>) -> &'static str {
    status.map_or(UNKNOWN_STATUS, ComplaintStatus::as_str)
}

fn join_or_na(items: &[String]) -> String {
    if items.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        items.join(", ")
    }
}

/// Formats unix seconds as e.g. `05 Apr 2024, 14:30 UTC`. Missing or zero
/// timestamps render as `N/A`.
#[must_use]
pub fn format_timestamp(timestamp: Option<f64>) -> String {
    let Some(ts) = timestamp.filter(|ts| *ts != 0.0 && ts.is_finite()) else {
        return NOT_AVAILABLE.to_string();
    };
    #[allow(clippy::cast_possible_truncation)]
    let secs = ts.floor() as i64;
    DateTime::from_timestamp(secs, 0).map_or_else(
        || NOT_AVAILABLE.to_string(),
        |dt| dt.format("%d %b %Y, %H:%M UTC").to_string(),
    )
}

/// Stats, filter options and table rows computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub stats: ComplaintStats,
    pub department_options: Vec<DepartmentFilter>,
    pub rows: Vec<TableRow>,
}

impl DashboardView {
    #[must_use]
    pub fn build(complaints: &Complaints, filter: &FilterState) -> Self {
        Self {
            stats: compute_stats(complaints),
            department_options: department_options(complaints),
            rows: table_rows(&project(complaints, filter)),
        }
    }
}

#[cfg(test)]
#[path = "views_test.rs"]
mod tests;
