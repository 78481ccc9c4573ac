use crate::{EntryId, Family, JobId, Notice, Ticket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch a list or detail; the result comes back tagged with `epoch`.
    Load { epoch: u64, request: LoadRequest },
    /// Send one mutating call; the result comes back as `Msg::RemoteResolved`.
    Call { ticket: Ticket, call: RemoteCall },
    /// Show a toast.
    Notify(Notice),
    /// Abort every in-flight request (session teardown).
    CancelInFlight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    List(Family),
    SearchJobs {
        query: String,
        location: Option<String>,
    },
    ApplicationDetail { id: EntryId },
    SavedJobDetail { id: EntryId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    SaveJob { job_id: JobId },
    RemoveSavedJob { entry_id: EntryId },
    ApplyJob { job_id: JobId, cover_letter: String },
    RemoveApplication { entry_id: EntryId },
    MarkRead { id: EntryId },
    MarkUnread { id: EntryId },
    DeleteNotification { id: EntryId },
    DeleteAllNotifications,
}

impl RemoteCall {
    pub fn action(&self) -> ActionKind {
        match self {
            RemoteCall::SaveJob { .. } => ActionKind::Save,
            RemoteCall::RemoveSavedJob { .. } => ActionKind::Unsave,
            RemoteCall::ApplyJob { .. } => ActionKind::Apply,
            RemoteCall::RemoveApplication { .. } => ActionKind::RemoveApplication,
            RemoteCall::MarkRead { .. } => ActionKind::MarkRead,
            RemoteCall::MarkUnread { .. } => ActionKind::MarkUnread,
            RemoteCall::DeleteNotification { .. } => ActionKind::DeleteNotification,
            RemoteCall::DeleteAllNotifications => ActionKind::DeleteAllNotifications,
        }
    }
}

/// The mutating user actions the synchronization policy tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Save,
    Unsave,
    Apply,
    RemoveApplication,
    MarkRead,
    MarkUnread,
    DeleteNotification,
    DeleteAllNotifications,
}

impl ActionKind {
    /// What the action operates on, for user-facing text.
    pub fn noun(self) -> &'static str {
        match self {
            ActionKind::Save | ActionKind::Unsave => "saved job",
            ActionKind::Apply | ActionKind::RemoveApplication => "application",
            ActionKind::MarkRead
            | ActionKind::MarkUnread
            | ActionKind::DeleteNotification
            | ActionKind::DeleteAllNotifications => "notification",
        }
    }
}
