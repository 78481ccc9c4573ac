use std::io::{self, BufRead, Write};
use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::Context;
use chrono::Utc;
use jobboard_core::{update, AppState, Msg};
use jobboard_logging::{board_info, board_warn};
use jobboard_remote::{CredentialInterceptor, CredentialStore, HttpResourceClient};

use crate::command::{self, Command, CommandError, HELP};
use crate::config::AppConfig;
use crate::effects::EffectRunner;
use crate::logging;
use crate::render::{render, render_notice, status_line};
use crate::session::SessionContext;

/// Everything the main loop reacts to.
pub enum AppEvent {
    Line(String),
    Remote(Msg),
    InputClosed,
}

pub fn run() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    logging::initialize(config.log_destination, jobboard_logging::default_level());
    board_info!("jobboard starting against {}", config.base_url);

    let credentials = CredentialStore::default();
    let interceptor = Arc::new(CredentialInterceptor::new(credentials.clone()));
    let client = HttpResourceClient::new(&config.client_settings(), interceptor)
        .context("building http client")?;

    let (event_tx, event_rx) = mpsc::channel();
    let runner =
        EffectRunner::new(Arc::new(client), event_tx.clone()).context("starting remote engine")?;
    spawn_input(event_tx).context("starting input reader")?;

    // Auth first: notifications only load once a user is known.
    let mut session = SessionContext::new(config.state_dir(), credentials);
    let mut state = AppState::new();
    if let Some(user_id) = session.restore() {
        state = step(state, Msg::SessionStarted { user_id }, &runner);
    }

    println!("{HELP}");
    prompt();

    while let Ok(event) = event_rx.recv() {
        match event {
            AppEvent::Remote(msg) => state = step(state, msg, &runner),
            AppEvent::InputClosed => break,
            AppEvent::Line(line) => {
                match command::parse(&line, &state, Utc::now()) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => println!("{HELP}"),
                    Ok(Command::Show) => print!("{}", render(&state.view())),
                    Ok(Command::Login {
                        user_id,
                        credentials,
                    }) => {
                        if state.is_signed_in() {
                            state = step(state, Msg::SignedOut, &runner);
                        }
                        if let Err(err) = session.sign_in(&user_id, credentials) {
                            board_warn!("Failed to persist session: {}", err);
                            println!("✖ session will not survive a restart: {err}");
                        }
                        state = step(state, Msg::SessionStarted { user_id }, &runner);
                    }
                    Ok(Command::Logout) => {
                        if let Err(err) = session.sign_out() {
                            board_warn!("Failed to remove persisted session: {}", err);
                        }
                        state = step(state, Msg::SignedOut, &runner);
                    }
                    Ok(Command::Dispatch(msg)) => state = step(state, msg, &runner),
                    Err(CommandError::Empty) => {}
                    Err(err) => println!("✖ {err}"),
                }
                prompt();
            }
        }
    }

    if let Err(err) = session.save() {
        board_warn!("Failed to save session on exit: {}", err);
    }
    board_info!("jobboard exiting, signed in as {:?}", session.user_id());
    Ok(())
}

/// Runs one message through the core and performs its effects.
fn step(state: AppState, msg: Msg, runner: &EffectRunner) -> AppState {
    let (mut state, effects) = update(state, msg);
    for notice in runner.run(effects) {
        println!("{}", render_notice(&notice));
    }
    if state.consume_dirty() {
        println!("{}", status_line(&state.view()));
    }
    state
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

fn spawn_input(event_tx: mpsc::Sender<AppEvent>) -> io::Result<()> {
    thread::Builder::new()
        .name("jobboard-input".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if event_tx.send(AppEvent::Line(line)).is_err() {
                    return;
                }
            }
            let _ = event_tx.send(AppEvent::InputClosed);
        })?;
    Ok(())
}
