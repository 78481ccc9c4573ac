use jobboard_core::{update, AppState, Msg, RemoteEcho, SyncError};

/// Messages that must leave a fresh, signed-out state untouched.
fn idle_messages() -> Vec<Msg> {
    vec![
        Msg::NoOp,
        Msg::RefreshRequested,
        Msg::RemoteResolved {
            ticket: 99,
            result: Ok(RemoteEcho::ack()),
        },
        Msg::RemoteResolved {
            ticket: 100,
            result: Err(SyncError::not_found("gone")),
        },
    ]
}

#[test]
fn idle_messages_change_nothing() {
    for msg in idle_messages() {
        let state = AppState::new();
        let (next, effects) = update(state.clone(), msg.clone());

        assert_eq!(state, next, "{msg:?} changed state");
        assert!(effects.is_empty(), "{msg:?} produced effects");
    }
}

#[test]
fn fresh_state_has_nothing_to_render() {
    let mut state = AppState::new();
    assert!(!state.consume_dirty());
    let view = state.view();
    assert!(view.saved_jobs.is_empty());
    assert_eq!(view.pending_actions, 0);
}
