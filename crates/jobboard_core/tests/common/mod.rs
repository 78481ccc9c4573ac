#![allow(dead_code)]

use std::sync::Once;

use chrono::{TimeZone, Utc};
use jobboard_core::{
    update, AppState, Effect, JobSummary, LoadRequest, Msg, Notice, RemoteCall, Ticket,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(jobboard_logging::initialize_for_tests);
}

/// A signed-in state with empty lists loaded for every family.
pub fn signed_in() -> AppState {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::SessionStarted {
            user_id: "user-1".to_string(),
        },
    );
    let epoch = state.epoch();
    let (state, _) = update(
        state,
        Msg::SavedJobsLoaded {
            epoch,
            result: Ok(Vec::new()),
        },
    );
    let (state, _) = update(
        state,
        Msg::ApplicationsLoaded {
            epoch,
            result: Ok(Vec::new()),
        },
    );
    let (state, _) = update(
        state,
        Msg::NotificationsLoaded {
            epoch,
            result: Ok(Default::default()),
        },
    );
    state
}

pub fn engineer() -> JobSummary {
    JobSummary::new("42", "Engineer").with_employer("Acme")
}

pub fn apply(state: AppState, job: JobSummary) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::ApplyClicked {
            job,
            cover_letter: "Hire me".to_string(),
            applied_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
        },
    )
}

/// The single remote call among `effects`, with its ticket.
pub fn only_call(effects: &[Effect]) -> (Ticket, RemoteCall) {
    let calls: Vec<_> = effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Call { ticket, call } => Some((*ticket, call.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(calls.len(), 1, "expected exactly one call in {effects:?}");
    calls.into_iter().next().unwrap()
}

pub fn notices(effects: &[Effect]) -> Vec<Notice> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Notify(notice) => Some(notice.clone()),
            _ => None,
        })
        .collect()
}

pub fn has_call(effects: &[Effect]) -> bool {
    effects.iter().any(|effect| matches!(effect, Effect::Call { .. }))
}

pub fn load_requests(effects: &[Effect]) -> Vec<LoadRequest> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Load { request, .. } => Some(request.clone()),
            _ => None,
        })
        .collect()
}
