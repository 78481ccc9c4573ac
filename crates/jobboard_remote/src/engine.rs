use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use jobboard_core::{Family, LoadRequest, RemoteCall, RemoteEcho, SyncError, Ticket};
use jobboard_logging::{board_debug, board_info};
use tokio_util::sync::CancellationToken;

use crate::client::ResourceClient;
use crate::{LoadedPayload, RemoteEvent};

enum EngineCommand {
    Load { epoch: u64, request: LoadRequest },
    Call { ticket: Ticket, call: RemoteCall },
    CancelAll,
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: RemoteEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<RemoteEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<RemoteEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: RemoteEvent) {
        let _ = self.tx.send(event);
    }
}

/// Owns the background thread and tokio runtime that run remote effects.
/// Dropping the handle stops the thread and aborts whatever is in flight.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(client: Arc<dyn ResourceClient>, sink: Arc<dyn EventSink>) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("jobboard-remote")
            .build()?;

        thread::Builder::new()
            .name("jobboard-engine".to_string())
            .spawn(move || {
                let mut cancel = CancellationToken::new();
                while let Ok(command) = cmd_rx.recv() {
                    let client = client.clone();
                    let sink = sink.clone();
                    match command {
                        EngineCommand::CancelAll => {
                            board_info!("cancelling in-flight requests");
                            cancel.cancel();
                            cancel = CancellationToken::new();
                        }
                        EngineCommand::Load { epoch, request } => {
                            let token = cancel.clone();
                            runtime.spawn(async move {
                                tokio::select! {
                                    biased;
                                    _ = token.cancelled() => {
                                        board_debug!("load {:?} cancelled", request);
                                    }
                                    result = execute_load(client.as_ref(), &request) => {
                                        let request = request.clone();
                                        sink.emit(RemoteEvent::Loaded { epoch, request, result });
                                    }
                                }
                            });
                        }
                        EngineCommand::Call { ticket, call } => {
                            let token = cancel.clone();
                            runtime.spawn(async move {
                                tokio::select! {
                                    biased;
                                    _ = token.cancelled() => {
                                        board_debug!("ticket {} cancelled", ticket);
                                    }
                                    result = execute_call(client.as_ref(), &call) => {
                                        sink.emit(RemoteEvent::Resolved { ticket, result });
                                    }
                                }
                            });
                        }
                    }
                }
                cancel.cancel();
                runtime.shutdown_timeout(Duration::from_secs(1));
            })?;

        Ok(Self { cmd_tx })
    }

    /// Engine whose events are polled from the returned receiver.
    pub fn with_channel(
        client: Arc<dyn ResourceClient>,
    ) -> io::Result<(Self, mpsc::Receiver<RemoteEvent>)> {
        let (event_tx, event_rx) = mpsc::channel();
        let handle = Self::new(client, Arc::new(ChannelEventSink::new(event_tx)))?;
        Ok((handle, event_rx))
    }

    pub fn load(&self, epoch: u64, request: LoadRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Load { epoch, request });
    }

    pub fn call(&self, ticket: Ticket, call: RemoteCall) {
        let _ = self.cmd_tx.send(EngineCommand::Call { ticket, call });
    }

    pub fn cancel_all(&self) {
        let _ = self.cmd_tx.send(EngineCommand::CancelAll);
    }
}

pub async fn execute_load(
    client: &dyn ResourceClient,
    request: &LoadRequest,
) -> Result<LoadedPayload, SyncError> {
    match request {
        LoadRequest::List(Family::SavedJobs) => {
            client.list_saved_jobs().await.map(LoadedPayload::SavedJobs)
        }
        LoadRequest::List(Family::Applications) => client
            .list_applications()
            .await
            .map(LoadedPayload::Applications),
        LoadRequest::List(Family::Notifications) => client
            .list_notifications()
            .await
            .map(LoadedPayload::Notifications),
        LoadRequest::SearchJobs { query, location } => client
            .search_jobs(query, location.as_deref())
            .await
            .map(LoadedPayload::SearchResults),
        LoadRequest::ApplicationDetail { id } => client
            .application_detail(id)
            .await
            .map(LoadedPayload::ApplicationDetail),
        LoadRequest::SavedJobDetail { id } => client
            .saved_job_detail(id)
            .await
            .map(LoadedPayload::SavedJobDetail),
    }
}

pub async fn execute_call(
    client: &dyn ResourceClient,
    call: &RemoteCall,
) -> Result<RemoteEcho, SyncError> {
    match call {
        RemoteCall::SaveJob { job_id } => client.save_job(job_id).await,
        RemoteCall::RemoveSavedJob { entry_id } => client.remove_saved_job(entry_id).await,
        RemoteCall::ApplyJob {
            job_id,
            cover_letter,
        } => client.apply(job_id, cover_letter).await,
        RemoteCall::RemoveApplication { entry_id } => client.remove_application(entry_id).await,
        RemoteCall::MarkRead { id } => client.mark_read(id).await,
        RemoteCall::MarkUnread { id } => client.mark_unread(id).await,
        RemoteCall::DeleteNotification { id } => client.delete_notification(id).await,
        RemoteCall::DeleteAllNotifications => client.delete_all_notifications().await,
    }
}
