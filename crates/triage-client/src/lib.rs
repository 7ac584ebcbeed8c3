//! Session-aware data access and client-side projection for the complaint
//! triage admin console.

pub mod admin;
pub mod cache;
pub mod client;
pub mod console;
pub mod detail;
pub mod error;
mod http;
pub mod public;
pub mod session;
pub mod views;

pub use cache::{ComplaintCache, ReloadOutcome};
pub use client::{ApiClient, ApiRequest};
pub use console::Console;
pub use detail::{DetailController, DetailState, DetailView, UpdateForm};
pub use error::{ClientError, StorageError};
pub use public::{PublicClient, SubmitReceipt};
pub use session::{
    CredentialStore, FileCredentialStore, LogoutReason, MemoryCredentialStore, Session,
};
pub use views::{
    ComplaintStats, DashboardView, DepartmentFilter, FilterState, StatusFilter, TableRow,
};
