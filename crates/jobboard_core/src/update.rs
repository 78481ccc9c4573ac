use jobboard_logging::{board_debug, board_warn};

use crate::{
    report, ActionKind, AppState, Effect, Family, LoadRequest, Msg, Outcome, RemoteCall,
    SyncError, Ticket,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SessionStarted { user_id } => {
            state.start_session(user_id);
            load_all(&mut state)
        }
        Msg::SignedOut => {
            state.end_session();
            vec![Effect::CancelInFlight]
        }
        Msg::RefreshRequested => load_all(&mut state),
        Msg::SavedJobsLoaded { epoch, result } => {
            if is_stale(&state, epoch, Family::SavedJobs) {
                return (state, Vec::new());
            }
            match result {
                Ok(entries) => {
                    state.apply_saved_jobs(entries);
                    Vec::new()
                }
                Err(error) => load_failed(&mut state, Family::SavedJobs, &error),
            }
        }
        Msg::ApplicationsLoaded { epoch, result } => {
            if is_stale(&state, epoch, Family::Applications) {
                return (state, Vec::new());
            }
            match result {
                Ok(entries) => {
                    state.apply_applications(entries);
                    Vec::new()
                }
                Err(error) => load_failed(&mut state, Family::Applications, &error),
            }
        }
        Msg::NotificationsLoaded { epoch, result } => {
            if is_stale(&state, epoch, Family::Notifications) {
                return (state, Vec::new());
            }
            match result {
                Ok(page) => {
                    state.apply_notifications(page.all_list, page.counts);
                    Vec::new()
                }
                Err(error) => load_failed(&mut state, Family::Notifications, &error),
            }
        }
        Msg::SearchSubmitted { query, location } => vec![Effect::Load {
            epoch: state.epoch(),
            request: LoadRequest::SearchJobs {
                query: query.trim().to_string(),
                location: location
                    .map(|loc| loc.trim().to_string())
                    .filter(|loc| !loc.is_empty()),
            },
        }],
        Msg::SearchLoaded { epoch, result } => {
            if epoch != state.epoch() {
                return (state, Vec::new());
            }
            match result {
                Ok(jobs) => {
                    state.set_search_results(jobs);
                    Vec::new()
                }
                Err(error) => vec![Effect::Notify(report(Outcome::LoadFailed {
                    what: "jobs",
                    error: &error,
                }))],
            }
        }
        Msg::ApplicationDetailRequested { id } => vec![Effect::Load {
            epoch: state.epoch(),
            request: LoadRequest::ApplicationDetail { id },
        }],
        Msg::ApplicationDetailLoaded { epoch, result } => {
            if epoch != state.epoch() {
                return (state, Vec::new());
            }
            match result {
                Ok(detail) => {
                    state.set_application_detail(detail);
                    Vec::new()
                }
                Err(error) => vec![Effect::Notify(report(Outcome::LoadFailed {
                    what: "job application detail",
                    error: &error,
                }))],
            }
        }
        Msg::SavedJobDetailRequested { id } => vec![Effect::Load {
            epoch: state.epoch(),
            request: LoadRequest::SavedJobDetail { id },
        }],
        Msg::SavedJobDetailLoaded { epoch, result } => {
            if epoch != state.epoch() {
                return (state, Vec::new());
            }
            match result {
                Ok(entry) => {
                    state.set_saved_job_detail(entry);
                    Vec::new()
                }
                Err(error) => vec![Effect::Notify(report(Outcome::LoadFailed {
                    what: "saved job detail",
                    error: &error,
                }))],
            }
        }
        Msg::SaveClicked { job } => {
            let ticket = state.allocate_ticket();
            let call = RemoteCall::SaveJob {
                job_id: job.id.clone(),
            };
            let started = state.begin_save(ticket, &job);
            start(ticket, call, started)
        }
        Msg::UnsaveClicked { entry_id } => {
            let ticket = state.allocate_ticket();
            let started = state.begin_unsave(ticket, &entry_id);
            start(ticket, RemoteCall::RemoveSavedJob { entry_id }, started)
        }
        Msg::ApplyClicked {
            job,
            cover_letter,
            applied_at,
        } => {
            let ticket = state.allocate_ticket();
            let started = state.begin_apply(ticket, &job, applied_at);
            let call = RemoteCall::ApplyJob {
                job_id: job.id,
                cover_letter,
            };
            start(ticket, call, started)
        }
        Msg::RemoveApplicationClicked { entry_id } => {
            let ticket = state.allocate_ticket();
            let started = state.begin_remove_application(ticket, &entry_id);
            start(ticket, RemoteCall::RemoveApplication { entry_id }, started)
        }
        Msg::MarkReadClicked { id } => {
            let ticket = state.allocate_ticket();
            let started = state.begin_mark(ticket, &id, true);
            start(ticket, RemoteCall::MarkRead { id }, started)
        }
        Msg::MarkUnreadClicked { id } => {
            let ticket = state.allocate_ticket();
            let started = state.begin_mark(ticket, &id, false);
            start(ticket, RemoteCall::MarkUnread { id }, started)
        }
        Msg::DeleteNotificationClicked { id } => {
            let ticket = state.allocate_ticket();
            let started = state.begin_delete_notification(ticket, &id);
            start(ticket, RemoteCall::DeleteNotification { id }, started)
        }
        Msg::DeleteAllNotificationsClicked => {
            let ticket = state.allocate_ticket();
            let started = state.begin_delete_all_notifications(ticket);
            start(ticket, RemoteCall::DeleteAllNotifications, started)
        }
        Msg::RemoteResolved { ticket, result } => match result {
            Ok(echo) => match state.commit(ticket, echo.entry) {
                Some(action) => vec![Effect::Notify(report(Outcome::Committed {
                    action,
                    server_message: echo.message.as_deref(),
                }))],
                None => Vec::new(),
            },
            Err(error) => match state.rollback(ticket) {
                Some(action) => {
                    board_warn!("ticket {} ({:?}) rolled back: {}", ticket, action, error);
                    vec![Effect::Notify(report(Outcome::Failed {
                        action,
                        error: &error,
                    }))]
                }
                None => Vec::new(),
            },
        },
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Idle -> Pending: either the remote call goes out, or the action was
/// refused locally and only its failure notice does.
fn start(ticket: Ticket, call: RemoteCall, started: Result<(), SyncError>) -> Vec<Effect> {
    match started {
        Ok(()) => vec![Effect::Call { ticket, call }],
        Err(error) => {
            let action: ActionKind = call.action();
            board_debug!("{:?} refused locally: {}", action, error);
            vec![Effect::Notify(report(Outcome::Failed {
                action,
                error: &error,
            }))]
        }
    }
}

/// Notifications need a resolved user, so nothing loads while signed out.
fn load_all(state: &mut AppState) -> Vec<Effect> {
    if !state.is_signed_in() {
        return Vec::new();
    }
    let epoch = state.epoch();
    Family::ALL
        .into_iter()
        .map(|family| {
            state.set_loading(family, true);
            Effect::Load {
                epoch,
                request: LoadRequest::List(family),
            }
        })
        .collect()
}

fn is_stale(state: &AppState, epoch: u64, family: Family) -> bool {
    if epoch != state.epoch() {
        board_debug!("dropping {} load from epoch {}", family, epoch);
        return true;
    }
    false
}

fn load_failed(state: &mut AppState, family: Family, error: &SyncError) -> Vec<Effect> {
    state.set_loading(family, false);
    board_warn!("loading {} failed: {}", family, error);
    vec![Effect::Notify(report(Outcome::LoadFailed {
        what: family.label(),
        error,
    }))]
}
