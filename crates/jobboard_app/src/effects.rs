use std::io;
use std::sync::{mpsc, Arc};
use std::thread;

use jobboard_core::{Effect, Msg, Notice};
use jobboard_logging::{board_debug, board_info};
use jobboard_remote::{EngineHandle, ResourceClient};

use crate::app::AppEvent;

/// Routes core effects to the remote engine and the terminal.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(client: Arc<dyn ResourceClient>, event_tx: mpsc::Sender<AppEvent>) -> io::Result<Self> {
        let (engine, events) = EngineHandle::with_channel(client)?;
        thread::Builder::new()
            .name("jobboard-events".to_string())
            .spawn(move || {
                for event in events {
                    let msg: Msg = event.into_msg();
                    if event_tx.send(AppEvent::Remote(msg)).is_err() {
                        break;
                    }
                }
            })?;
        Ok(Self { engine })
    }

    /// Dispatches the effects in order and returns the notices to show.
    pub fn run(&self, effects: Vec<Effect>) -> Vec<Notice> {
        let mut notices = Vec::new();
        for effect in effects {
            match effect {
                Effect::Load { epoch, request } => {
                    board_debug!("Load epoch={} {:?}", epoch, request);
                    self.engine.load(epoch, request);
                }
                Effect::Call { ticket, call } => {
                    board_info!("Call ticket={} {:?}", ticket, call.action());
                    self.engine.call(ticket, call);
                }
                Effect::CancelInFlight => self.engine.cancel_all(),
                Effect::Notify(notice) => notices.push(notice),
            }
        }
        notices
    }
}
