//! Detail/Update Controller: the single complaint open for inspection and
//! its update-then-reload cycle.

use triage_core::{ComplaintRecord, ComplaintStatus, Complaints, Prediction};

use crate::cache::{ComplaintCache, ReloadOutcome};
use crate::client::ApiClient;
use crate::error::ClientError;
use crate::views::NOT_AVAILABLE;

/// Editable part of the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateForm {
    pub status: ComplaintStatus,
    /// Free text, comma-separated.
    pub departments: String,
}

impl UpdateForm {
    /// Form pre-filled from a record. A record without a status starts at
    /// `Pending`, the first choice offered.
    #[must_use]
    pub fn from_record(record: &ComplaintRecord) -> Self {
        Self {
            status: record.status.unwrap_or(ComplaintStatus::Pending),
            departments: record.assigned_departments.join(", "),
        }
    }

    #[must_use]
    pub fn department_list(&self) -> Vec<String> {
        parse_departments(&self.departments)
    }
}

/// Splits on commas and trims each entry. Empty entries are kept.
#[must_use]
pub fn parse_departments(input: &str) -> Vec<String> {
    input.split(',').map(|d| d.trim().to_owned()).collect()
}

/// `"<department> (<score %>)"` joined by `", "`, or `N/A` for none.
#[must_use]
pub fn format_predictions(predictions: &[Prediction]) -> String {
    if predictions.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    predictions
        .iter()
        .map(|p| match p.score {
            Some(score) => format!("{} ({}%)", p.department, one_decimal_percent(score)),
            None => p.department.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `score * 100` to one decimal place, with exact halves rounded away from
/// zero. `{:.1}` rounds the exact binary value correctly but sends exact
/// halves to the even digit; at one decimal the only exactly representable
/// halves are `x.25` and `x.75`, i.e. odd multiples of a quarter.
fn one_decimal_percent(score: f64) -> String {
    let percent = score * 100.0;
    let quarters = percent * 4.0;
    if (quarters.rem_euclid(2.0) - 1.0).abs() < f64::EPSILON {
        return format!("{:.1}", (percent * 10.0).round() / 10.0);
    }
    format!("{percent:.1}")
}

/// Rendered detail of one complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub id: String,
    pub title: String,
    pub complaint: String,
    pub predicted: String,
    pub form: UpdateForm,
}

impl DetailView {
    fn render(id: &str, record: &ComplaintRecord, form: UpdateForm) -> Self {
        Self {
            id: id.to_owned(),
            title: format!("Details for Complaint #{id}"),
            complaint: if record.complaint.is_empty() {
                NOT_AVAILABLE.to_string()
            } else {
                record.complaint.clone()
            },
            predicted: format_predictions(&record.predicted),
            form,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DetailState {
    #[default]
    Closed,
    Open { id: String, form: UpdateForm },
}

#[derive(Debug, Default)]
pub struct DetailController {
    state: DetailState,
}

impl DetailController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &DetailState {
        &self.state
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        match &self.state {
            DetailState::Closed => None,
            DetailState::Open { id, .. } => Some(id.as_str()),
        }
    }

    /// Opens `id` with a form pre-filled from the cached record.
    ///
    /// # Errors
    ///
    /// [`ClientError::UnknownComplaint`] if `id` is not in `complaints`; the
    /// state is left as it was.
    pub fn open(&mut self, id: &str, complaints: &Complaints) -> Result<DetailView, ClientError> {
        let record = complaints
            .get(id)
            .ok_or_else(|| ClientError::UnknownComplaint(id.to_owned()))?;
        let form = UpdateForm::from_record(record);
        self.state = DetailState::Open {
            id: id.to_owned(),
            form: form.clone(),
        };
        Ok(DetailView::render(id, record, form))
    }

    /// Re-renders the open complaint, keeping the form as last edited.
    /// `None` when closed or when the record has left the cache.
    #[must_use]
    pub fn view(&self, complaints: &Complaints) -> Option<DetailView> {
        match &self.state {
            DetailState::Closed => None,
            DetailState::Open { id, form } => complaints
                .get(id)
                .map(|record| DetailView::render(id, record, form.clone())),
        }
    }

    pub fn dismiss(&mut self) {
        self.state = DetailState::Closed;
    }

    /// Sends `form` for the open complaint. On success the view closes and
    /// the cache is reloaded once; on failure the view stays open with `form`
    /// retained and nothing is retried.
    ///
    /// # Errors
    ///
    /// [`ClientError::NothingSelected`] when closed, any error from
    /// [`ApiClient::update_complaint`], or, after a successful update, any
    /// error from [`ComplaintCache::reload`].
    pub async fn submit(
        &mut self,
        form: UpdateForm,
        client: &ApiClient,
        cache: &ComplaintCache,
    ) -> Result<ReloadOutcome, ClientError> {
        let DetailState::Open { id, form: retained } = &mut self.state else {
            return Err(ClientError::NothingSelected);
        };
        *retained = form.clone();
        let id = id.clone();

        client
            .update_complaint(&id, form.status, &form.department_list())
            .await?;

        self.state = DetailState::Closed;
        cache.reload(client).await
    }
}
