use chrono::{DateTime, Utc};

use crate::{
    ApplicationDetail, ApplicationStatus, Counts, Family, JobSummary, SavedJobEntry, SessionState,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub saved_jobs: Vec<SavedJobRow>,
    pub applications: Vec<ApplicationRow>,
    pub notifications: Vec<NotificationRow>,
    pub counts: Counts,
    pub search_results: Vec<JobSummary>,
    pub application_detail: Option<ApplicationDetail>,
    pub saved_job_detail: Option<SavedJobEntry>,
    /// Actions sent but not yet resolved.
    pub pending_actions: usize,
    pub loading: Vec<Family>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedJobRow {
    pub id: String,
    pub job_id: String,
    pub title: String,
    pub employer: String,
    pub is_applied: bool,
    pub pending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationRow {
    pub id: String,
    pub title: String,
    pub employer: String,
    pub applied_at: Option<DateTime<Utc>>,
    pub status: ApplicationStatus,
    pub pending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRow {
    pub id: String,
    pub is_read: bool,
    pub message: String,
    pub pending: bool,
}
