use jobboard_core::{
    ApplicationDetail, ApplicationEntry, ErrorKind, Family, JobSummary, LoadRequest, Msg,
    NotificationPage, RemoteEcho, SavedJobEntry, SyncError, Ticket,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadedPayload {
    SavedJobs(Vec<SavedJobEntry>),
    Applications(Vec<ApplicationEntry>),
    Notifications(NotificationPage),
    SearchResults(Vec<JobSummary>),
    ApplicationDetail(ApplicationDetail),
    SavedJobDetail(SavedJobEntry),
}

/// Completion reported by the engine thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteEvent {
    Loaded {
        epoch: u64,
        request: LoadRequest,
        result: Result<LoadedPayload, SyncError>,
    },
    Resolved {
        ticket: Ticket,
        result: Result<RemoteEcho, SyncError>,
    },
}

impl RemoteEvent {
    /// Turns the completion into the message the core update expects.
    pub fn into_msg(self) -> Msg {
        match self {
            RemoteEvent::Resolved { ticket, result } => Msg::RemoteResolved { ticket, result },
            RemoteEvent::Loaded {
                epoch,
                request,
                result,
            } => match request {
                LoadRequest::List(Family::SavedJobs) => Msg::SavedJobsLoaded {
                    epoch,
                    result: expect_payload(result, |payload| match payload {
                        LoadedPayload::SavedJobs(entries) => Some(entries),
                        _ => None,
                    }),
                },
                LoadRequest::List(Family::Applications) => Msg::ApplicationsLoaded {
                    epoch,
                    result: expect_payload(result, |payload| match payload {
                        LoadedPayload::Applications(entries) => Some(entries),
                        _ => None,
                    }),
                },
                LoadRequest::List(Family::Notifications) => Msg::NotificationsLoaded {
                    epoch,
                    result: expect_payload(result, |payload| match payload {
                        LoadedPayload::Notifications(page) => Some(page),
                        _ => None,
                    }),
                },
                LoadRequest::SearchJobs { .. } => Msg::SearchLoaded {
                    epoch,
                    result: expect_payload(result, |payload| match payload {
                        LoadedPayload::SearchResults(jobs) => Some(jobs),
                        _ => None,
                    }),
                },
                LoadRequest::ApplicationDetail { .. } => Msg::ApplicationDetailLoaded {
                    epoch,
                    result: expect_payload(result, |payload| match payload {
                        LoadedPayload::ApplicationDetail(detail) => Some(detail),
                        _ => None,
                    }),
                },
                LoadRequest::SavedJobDetail { .. } => Msg::SavedJobDetailLoaded {
                    epoch,
                    result: expect_payload(result, |payload| match payload {
                        LoadedPayload::SavedJobDetail(entry) => Some(entry),
                        _ => None,
                    }),
                },
            },
        }
    }
}

fn expect_payload<T>(
    result: Result<LoadedPayload, SyncError>,
    pick: impl FnOnce(LoadedPayload) -> Option<T>,
) -> Result<T, SyncError> {
    pick(result?).ok_or_else(|| {
        SyncError::new(ErrorKind::Unknown).with_message("payload does not match the request")
    })
}
