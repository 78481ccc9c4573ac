mod common;

use common::{apply, engineer, has_call, notices, only_call, signed_in};
use jobboard_core::{
    update, ApplicationEntry, ApplicationStatus, ConflictKind, EchoEntry, ErrorKind, Msg,
    NoticeLevel, RemoteCall, RemoteEcho, SyncError, CODE_JOB_CLOSED,
};

#[test]
fn apply_adds_pending_application_and_sends_cover_letter() {
    let state = signed_in();
    let (state, effects) = apply(state, engineer());

    let (_, call) = only_call(&effects);
    assert_eq!(
        call,
        RemoteCall::ApplyJob {
            job_id: "42".to_string(),
            cover_letter: "Hire me".to_string(),
        }
    );
    let view = state.view();
    assert_eq!(view.applications.len(), 1);
    assert_eq!(view.applications[0].status, ApplicationStatus::Pending);
    assert_eq!(view.applications[0].employer, "Acme");
    assert!(view.applications[0].pending);
    assert_eq!(view.pending_actions, 1);
}

#[test]
fn second_apply_while_pending_is_rejected_without_a_call() {
    let state = signed_in();
    let (state, first) = apply(state, engineer());
    assert!(has_call(&first));

    let (state, second) = apply(state, engineer());
    assert!(!has_call(&second));
    let notices = notices(&second);
    assert_eq!(notices.len(), 1);
    assert_eq!(
        notices[0].error,
        Some(ErrorKind::Conflict(ConflictKind::DuplicateInFlight))
    );
    assert_eq!(state.view().applications.len(), 1);
}

#[test]
fn apply_failure_rolls_back_both_families() {
    let state = signed_in();
    let (state, effects) = update(state, Msg::SaveClicked { job: engineer() });
    let (save_ticket, _) = only_call(&effects);
    let (state, _) = update(
        state,
        Msg::RemoteResolved {
            ticket: save_ticket,
            result: Ok(RemoteEcho::ack()),
        },
    );

    let (state, effects) = apply(state, engineer());
    let (ticket, _) = only_call(&effects);
    assert!(state.view().saved_jobs[0].is_applied);

    let error = SyncError::new(ErrorKind::Validation).with_code(CODE_JOB_CLOSED);
    let (state, effects) = update(
        state,
        Msg::RemoteResolved {
            ticket,
            result: Err(error),
        },
    );

    let view = state.view();
    assert!(view.applications.is_empty());
    assert!(!view.saved_jobs[0].is_applied);
    let notices = notices(&effects);
    assert_eq!(notices.len(), 1);
    assert_eq!(
        notices[0].text,
        "This job is no longer accepting applications."
    );
}

#[test]
fn apply_echo_replaces_placeholder_with_server_entry() {
    let state = signed_in();
    let (state, effects) = apply(state, engineer());
    let (ticket, _) = only_call(&effects);

    let server = ApplicationEntry {
        id: "app-1".to_string(),
        job: engineer(),
        applied_at: None,
        status: ApplicationStatus::Pending,
    };
    let (state, effects) = update(
        state,
        Msg::RemoteResolved {
            ticket,
            result: Ok(RemoteEcho::ack().with_entry(EchoEntry::Application(server))),
        },
    );
    let view = state.view();
    assert_eq!(view.applications.len(), 1);
    assert_eq!(view.applications[0].id, "app-1");
    assert_eq!(notices(&effects)[0].level, NoticeLevel::Success);
    assert_eq!(
        notices(&effects)[0].text,
        "Successfully applied for the job!"
    );
}

#[test]
fn save_then_apply_scenario() {
    let state = signed_in();
    assert!(state.view().saved_jobs.is_empty());

    // Save job 42: visible immediately, not applied.
    let (state, effects) = update(state, Msg::SaveClicked { job: engineer() });
    let (ticket, _) = only_call(&effects);
    assert_eq!(state.view().saved_jobs.len(), 1);
    assert!(!state.view().saved_jobs[0].is_applied);

    // Server answers 201; the entry persists.
    let (state, _) = update(
        state,
        Msg::RemoteResolved {
            ticket,
            result: Ok(RemoteEcho::ack()),
        },
    );
    assert_eq!(state.view().saved_jobs.len(), 1);

    // Apply to job 42 and commit.
    let (state, effects) = apply(state, engineer());
    let (ticket, _) = only_call(&effects);
    let (state, _) = update(
        state,
        Msg::RemoteResolved {
            ticket,
            result: Ok(RemoteEcho::ack()),
        },
    );
    assert!(state.view().saved_jobs[0].is_applied);

    // A second apply is refused locally.
    let (state, effects) = apply(state, engineer());
    assert!(!has_call(&effects));
    let notices = notices(&effects);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].text, "You've already applied to this job.");
    assert_eq!(state.view().applications.len(), 1);
}

#[test]
fn remove_application_commits_and_reports() {
    let state = signed_in();
    let epoch = state.epoch();
    let (state, _) = update(
        state,
        Msg::ApplicationsLoaded {
            epoch,
            result: Ok(vec![ApplicationEntry {
                id: "app-1".to_string(),
                job: engineer(),
                applied_at: None,
                status: ApplicationStatus::Reviewed,
            }]),
        },
    );
    let (state, effects) = update(
        state,
        Msg::RemoveApplicationClicked {
            entry_id: "app-1".to_string(),
        },
    );
    let (ticket, _) = only_call(&effects);
    assert!(state.view().applications.is_empty());

    let (state, effects) = update(
        state,
        Msg::RemoteResolved {
            ticket,
            result: Ok(RemoteEcho::ack()),
        },
    );
    assert!(state.view().applications.is_empty());
    assert_eq!(notices(&effects)[0].text, "Application removed!");
    assert_eq!(state.view().pending_actions, 0);
}
