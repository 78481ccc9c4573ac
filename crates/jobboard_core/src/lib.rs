//! Job board core: pure synchronization state machine and view-model helpers.
//!
//! Nothing in this crate performs IO. User actions and remote results enter
//! through [`update`] as [`Msg`] values; the work the outside world must do
//! (HTTP calls, toasts, cancellation) leaves as [`Effect`] values.
mod effect;
mod error;
mod mirror;
mod model;
mod msg;
mod notice;
mod state;
mod sync;
mod update;
mod view_model;

pub use effect::{ActionKind, Effect, LoadRequest, RemoteCall};
pub use error::{
    ConflictKind, ErrorKind, SyncError, CODE_ALREADY_APPLIED, CODE_ALREADY_SAVED, CODE_JOB_CLOSED,
};
pub use mirror::{MirrorEntry, MirrorStore};
pub use model::{
    ApplicationDetail, ApplicationEntry, ApplicationStatus, Counts, EntryId, Family, JobId,
    JobSearchPage, JobSummary, NotificationEntry, NotificationPage, SavedJobEntry, Ticket,
};
pub use msg::{EchoEntry, Msg, RemoteEcho};
pub use notice::{report, Notice, NoticeLevel, Outcome};
pub use state::{placeholder_id, AppState, SessionState};
pub use sync::{ResourceSync, ALL_KEYS};
pub use update::update;
pub use view_model::{AppViewModel, ApplicationRow, NotificationRow, SavedJobRow};
