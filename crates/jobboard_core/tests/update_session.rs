mod common;

use common::{apply, engineer, init_logging, load_requests, notices, only_call, signed_in};
use jobboard_core::{
    update, AppState, Effect, Family, JobSummary, LoadRequest, Msg, RemoteEcho, SavedJobEntry,
    SessionState,
};

#[test]
fn nothing_loads_while_signed_out() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::RefreshRequested);
    assert!(effects.is_empty());
    assert_eq!(state.view().session, SessionState::SignedOut);
}

#[test]
fn session_start_loads_every_family() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::SessionStarted {
            user_id: "user-1".to_string(),
        },
    );
    assert_eq!(
        load_requests(&effects),
        vec![
            LoadRequest::List(Family::SavedJobs),
            LoadRequest::List(Family::Applications),
            LoadRequest::List(Family::Notifications),
        ]
    );
    assert_eq!(state.view().loading.len(), 3);
    assert!(state.view().dirty);
}

#[test]
fn sign_out_clears_state_and_cancels_requests() {
    let state = signed_in();
    let (state, effects) = apply(state, engineer());
    let (ticket, _) = only_call(&effects);

    let (state, effects) = update(state, Msg::SignedOut);
    assert_eq!(effects, vec![Effect::CancelInFlight]);
    let view = state.view();
    assert_eq!(view.session, SessionState::SignedOut);
    assert!(view.applications.is_empty());
    assert_eq!(view.pending_actions, 0);

    // A late resolution from the old session changes nothing.
    let before = state.clone();
    let (state, effects) = update(
        state,
        Msg::RemoteResolved {
            ticket,
            result: Ok(RemoteEcho::ack()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);
}

#[test]
fn loads_from_an_old_session_are_dropped() {
    let state = signed_in();
    let old_epoch = state.epoch();
    let (state, _) = update(state, Msg::SignedOut);
    let (state, _) = update(
        state,
        Msg::SessionStarted {
            user_id: "user-2".to_string(),
        },
    );

    let (state, effects) = update(
        state,
        Msg::SavedJobsLoaded {
            epoch: old_epoch,
            result: Ok(vec![SavedJobEntry {
                id: "s1".to_string(),
                job: engineer(),
                is_applied: false,
            }]),
        },
    );
    assert!(effects.is_empty());
    assert!(state.view().saved_jobs.is_empty());
}

#[test]
fn later_load_wins_over_earlier_one() {
    let state = signed_in();
    let epoch = state.epoch();
    let first = vec![SavedJobEntry {
        id: "s1".to_string(),
        job: JobSummary::new("1", "One"),
        is_applied: false,
    }];
    let second = vec![SavedJobEntry {
        id: "s2".to_string(),
        job: JobSummary::new("2", "Two"),
        is_applied: true,
    }];
    let (state, _) = update(
        state,
        Msg::SavedJobsLoaded {
            epoch,
            result: Ok(first),
        },
    );
    let (state, _) = update(
        state,
        Msg::SavedJobsLoaded {
            epoch,
            result: Ok(second.clone()),
        },
    );
    let view = state.view();
    assert_eq!(view.saved_jobs.len(), 1);
    assert_eq!(view.saved_jobs[0].id, "s2");
    assert!(view.saved_jobs[0].is_applied);
}

#[test]
fn search_results_feed_job_lookup() {
    let state = signed_in();
    let (state, effects) = update(
        state,
        Msg::SearchSubmitted {
            query: " rust ".to_string(),
            location: Some("  ".to_string()),
        },
    );
    assert_eq!(
        load_requests(&effects),
        vec![LoadRequest::SearchJobs {
            query: "rust".to_string(),
            location: None,
        }]
    );
    let epoch = state.epoch();
    let (state, _) = update(
        state,
        Msg::SearchLoaded {
            epoch,
            result: Ok(vec![engineer()]),
        },
    );
    assert_eq!(state.find_job("42"), Some(engineer()));
    assert_eq!(state.find_job("nope"), None);
    assert!(notices(&effects).is_empty());
}
