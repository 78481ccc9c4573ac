use chrono::{DateTime, Utc};

use crate::{
    ApplicationDetail, ApplicationEntry, EntryId, JobSummary, NotificationPage, SavedJobEntry,
    SyncError, Ticket,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Credentials resolved for a user; notification loading may start.
    SessionStarted { user_id: String },
    /// User logged out: tear everything down.
    SignedOut,
    /// Reload every family from the backend.
    RefreshRequested,
    SavedJobsLoaded {
        epoch: u64,
        result: Result<Vec<SavedJobEntry>, SyncError>,
    },
    ApplicationsLoaded {
        epoch: u64,
        result: Result<Vec<ApplicationEntry>, SyncError>,
    },
    NotificationsLoaded {
        epoch: u64,
        result: Result<NotificationPage, SyncError>,
    },
    SearchSubmitted {
        query: String,
        location: Option<String>,
    },
    SearchLoaded {
        epoch: u64,
        result: Result<Vec<JobSummary>, SyncError>,
    },
    ApplicationDetailRequested { id: EntryId },
    ApplicationDetailLoaded {
        epoch: u64,
        result: Result<ApplicationDetail, SyncError>,
    },
    SavedJobDetailRequested { id: EntryId },
    SavedJobDetailLoaded {
        epoch: u64,
        result: Result<SavedJobEntry, SyncError>,
    },
    SaveClicked { job: JobSummary },
    UnsaveClicked { entry_id: EntryId },
    /// `applied_at` stamps the optimistic application entry.
    ApplyClicked {
        job: JobSummary,
        cover_letter: String,
        applied_at: DateTime<Utc>,
    },
    RemoveApplicationClicked { entry_id: EntryId },
    MarkReadClicked { id: EntryId },
    MarkUnreadClicked { id: EntryId },
    DeleteNotificationClicked { id: EntryId },
    DeleteAllNotificationsClicked,
    /// A mutating call finished.
    RemoteResolved {
        ticket: Ticket,
        result: Result<RemoteEcho, SyncError>,
    },
    NoOp,
}

/// What the backend sent back for a successful mutating call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoteEcho {
    pub message: Option<String>,
    pub entry: Option<EchoEntry>,
}

impl RemoteEcho {
    pub fn ack() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_entry(mut self, entry: EchoEntry) -> Self {
        self.entry = Some(entry);
        self
    }
}

/// Canonical entry echoed by a create call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EchoEntry {
    SavedJob(SavedJobEntry),
    Application(ApplicationEntry),
}
