use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use jobboard_logging::{board_debug, board_info, board_warn};

use crate::view_model::{AppViewModel, ApplicationRow, NotificationRow, SavedJobRow};
use crate::{
    ActionKind, ApplicationDetail, ApplicationEntry, ApplicationStatus, Counts, EchoEntry, Family,
    JobSummary, NotificationEntry, ResourceSync, SavedJobEntry, SyncError, Ticket,
    CODE_ALREADY_APPLIED, CODE_ALREADY_SAVED,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    SignedOut,
    SignedIn {
        user_id: String,
    },
}

/// Local id for an optimistic entry until the server echo replaces it.
pub fn placeholder_id(ticket: Ticket) -> String {
    format!("local-{ticket}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InFlight {
    action: ActionKind,
    families: Vec<Family>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    session: SessionState,
    epoch: u64,
    next_ticket: Ticket,
    saved: ResourceSync<SavedJobEntry>,
    applications: ResourceSync<ApplicationEntry>,
    notifications: ResourceSync<NotificationEntry>,
    in_flight: BTreeMap<Ticket, InFlight>,
    loading: BTreeSet<Family>,
    search_results: Vec<JobSummary>,
    application_detail: Option<ApplicationDetail>,
    saved_job_detail: Option<SavedJobEntry>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            session: SessionState::SignedOut,
            epoch: 0,
            next_ticket: 1,
            saved: ResourceSync::new(Family::SavedJobs),
            applications: ResourceSync::new(Family::Applications),
            notifications: ResourceSync::new(Family::Notifications),
            in_flight: BTreeMap::new(),
            loading: BTreeSet::new(),
            search_results: Vec::new(),
            application_detail: None,
            saved_job_detail: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self.session, SessionState::SignedIn { .. })
    }

    /// Tag carried by loads; results from an older session are dropped.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn saved_jobs(&self) -> &ResourceSync<SavedJobEntry> {
        &self.saved
    }

    pub fn applications(&self) -> &ResourceSync<ApplicationEntry> {
        &self.applications
    }

    pub fn notifications(&self) -> &ResourceSync<NotificationEntry> {
        &self.notifications
    }

    pub fn counts(&self) -> Counts {
        Counts::from_entries(self.notifications.mirror().iter())
    }

    /// Looks a job up in search results, saved jobs and applications.
    pub fn find_job(&self, job_id: &str) -> Option<JobSummary> {
        self.search_results
            .iter()
            .find(|job| job.id == job_id)
            .or_else(|| {
                self.saved
                    .mirror()
                    .iter()
                    .map(|entry| &entry.job)
                    .find(|job| job.id == job_id)
            })
            .or_else(|| {
                self.applications
                    .mirror()
                    .iter()
                    .map(|entry| &entry.job)
                    .find(|job| job.id == job_id)
            })
            .cloned()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            session: self.session.clone(),
            saved_jobs: self
                .saved
                .mirror()
                .iter()
                .map(|entry| SavedJobRow {
                    id: entry.id.clone(),
                    job_id: entry.job.id.clone(),
                    title: entry.job.title.clone(),
                    employer: entry.job.employer_or_unknown().to_string(),
                    is_applied: entry.is_applied,
                    pending: self.saved.is_entry_pending(&entry.id),
                })
                .collect(),
            applications: self
                .applications
                .mirror()
                .iter()
                .map(|entry| ApplicationRow {
                    id: entry.id.clone(),
                    title: entry.job.title.clone(),
                    employer: entry.job.employer_or_unknown().to_string(),
                    applied_at: entry.applied_at,
                    status: entry.status,
                    pending: self.applications.is_entry_pending(&entry.id),
                })
                .collect(),
            notifications: self
                .notifications
                .mirror()
                .iter()
                .map(|entry| NotificationRow {
                    id: entry.id.clone(),
                    is_read: entry.is_read,
                    message: entry.message().unwrap_or_default().to_string(),
                    pending: self.notifications.is_entry_pending(&entry.id),
                })
                .collect(),
            counts: self.counts(),
            search_results: self.search_results.clone(),
            application_detail: self.application_detail.clone(),
            saved_job_detail: self.saved_job_detail.clone(),
            pending_actions: self.in_flight.len(),
            loading: self.loading.iter().copied().collect(),
            dirty: self.dirty,
        }
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn allocate_ticket(&mut self) -> Ticket {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }

    pub(crate) fn start_session(&mut self, user_id: String) {
        self.reset_collections();
        self.epoch += 1;
        board_info!("session started for user {} (epoch {})", user_id, self.epoch);
        self.session = SessionState::SignedIn { user_id };
        self.dirty = true;
    }

    pub(crate) fn end_session(&mut self) {
        self.reset_collections();
        self.epoch += 1;
        board_info!("session ended (epoch {})", self.epoch);
        self.session = SessionState::SignedOut;
        self.dirty = true;
    }

    fn reset_collections(&mut self) {
        self.saved.reset();
        self.applications.reset();
        self.notifications.reset();
        self.in_flight.clear();
        self.loading.clear();
        self.search_results.clear();
        self.application_detail = None;
        self.saved_job_detail = None;
    }

    pub(crate) fn set_loading(&mut self, family: Family, loading: bool) {
        if loading {
            self.loading.insert(family);
        } else {
            self.loading.remove(&family);
        }
        self.dirty = true;
    }

    pub(crate) fn apply_saved_jobs(&mut self, entries: Vec<SavedJobEntry>) {
        self.saved.load(entries);
        self.set_loading(Family::SavedJobs, false);
    }

    pub(crate) fn apply_applications(&mut self, entries: Vec<ApplicationEntry>) {
        self.applications.load(entries);
        self.set_loading(Family::Applications, false);
    }

    pub(crate) fn apply_notifications(
        &mut self,
        entries: Vec<NotificationEntry>,
        server_counts: Option<Counts>,
    ) {
        self.notifications.load(entries);
        let derived = self.counts();
        if let Some(server) = server_counts {
            if server != derived {
                board_warn!(
                    "server notification counts {:?} differ from list {:?}; using list",
                    server,
                    derived
                );
            }
        }
        self.set_loading(Family::Notifications, false);
    }

    pub(crate) fn set_search_results(&mut self, jobs: Vec<JobSummary>) {
        self.search_results = jobs;
        self.dirty = true;
    }

    pub(crate) fn set_application_detail(&mut self, detail: ApplicationDetail) {
        self.application_detail = Some(detail);
        self.dirty = true;
    }

    pub(crate) fn set_saved_job_detail(&mut self, entry: SavedJobEntry) {
        self.saved_job_detail = Some(entry);
        self.dirty = true;
    }

    fn register(&mut self, ticket: Ticket, action: ActionKind, families: Vec<Family>) {
        self.in_flight.insert(ticket, InFlight { action, families });
        self.dirty = true;
    }

    pub(crate) fn begin_save(&mut self, ticket: Ticket, job: &JobSummary) -> Result<(), SyncError> {
        if self.saved.is_pending(&job.id) {
            return Err(SyncError::duplicate_in_flight());
        }
        if self.saved.mirror().find_by_key(&job.id).is_some() {
            return Err(SyncError::duplicate_resource(
                CODE_ALREADY_SAVED,
                "You have already saved this job",
            ));
        }
        let entry = SavedJobEntry {
            id: placeholder_id(ticket),
            job: job.clone(),
            is_applied: self.applications.mirror().find_by_key(&job.id).is_some(),
        };
        self.saved.begin_add(ticket, entry)?;
        self.register(ticket, ActionKind::Save, vec![Family::SavedJobs]);
        Ok(())
    }

    pub(crate) fn begin_unsave(&mut self, ticket: Ticket, entry_id: &str) -> Result<(), SyncError> {
        self.saved.begin_remove(ticket, entry_id)?;
        self.register(ticket, ActionKind::Unsave, vec![Family::SavedJobs]);
        Ok(())
    }

    /// Adds a Pending application and flips the matching saved job, as one
    /// action that commits or rolls back as a whole.
    pub(crate) fn begin_apply(
        &mut self,
        ticket: Ticket,
        job: &JobSummary,
        applied_at: DateTime<Utc>,
    ) -> Result<(), SyncError> {
        let key = job.id.as_str();
        if self.applications.is_pending(key) || self.saved.is_pending(key) {
            return Err(SyncError::duplicate_in_flight());
        }
        let saved = self.saved.mirror().find_by_key(key);
        if saved.is_some_and(|entry| entry.is_applied)
            || self.applications.mirror().find_by_key(key).is_some()
        {
            return Err(SyncError::duplicate_resource(
                CODE_ALREADY_APPLIED,
                "You have already applied for this job.",
            ));
        }
        let saved_id = saved.map(|entry| entry.id.clone());

        let placeholder = ApplicationEntry {
            id: placeholder_id(ticket),
            job: job.clone(),
            applied_at: Some(applied_at),
            status: ApplicationStatus::Pending,
        };
        self.applications.begin_add(ticket, placeholder)?;
        let mut families = vec![Family::Applications];
        if let Some(saved_id) = saved_id {
            if let Err(err) = self
                .saved
                .begin_patch(ticket, &saved_id, |entry| entry.is_applied = true)
            {
                self.applications.rollback(ticket);
                return Err(err);
            }
            families.push(Family::SavedJobs);
        }
        self.register(ticket, ActionKind::Apply, families);
        Ok(())
    }

    pub(crate) fn begin_remove_application(
        &mut self,
        ticket: Ticket,
        entry_id: &str,
    ) -> Result<(), SyncError> {
        self.applications.begin_remove(ticket, entry_id)?;
        self.register(ticket, ActionKind::RemoveApplication, vec![Family::Applications]);
        Ok(())
    }

    pub(crate) fn begin_mark(
        &mut self,
        ticket: Ticket,
        id: &str,
        is_read: bool,
    ) -> Result<(), SyncError> {
        self.notifications
            .begin_patch(ticket, id, |entry| entry.is_read = is_read)?;
        let action = if is_read {
            ActionKind::MarkRead
        } else {
            ActionKind::MarkUnread
        };
        self.register(ticket, action, vec![Family::Notifications]);
        Ok(())
    }

    pub(crate) fn begin_delete_notification(
        &mut self,
        ticket: Ticket,
        id: &str,
    ) -> Result<(), SyncError> {
        self.notifications.begin_remove(ticket, id)?;
        self.register(ticket, ActionKind::DeleteNotification, vec![Family::Notifications]);
        Ok(())
    }

    pub(crate) fn begin_delete_all_notifications(&mut self, ticket: Ticket) -> Result<(), SyncError> {
        self.notifications.begin_clear(ticket)?;
        self.register(
            ticket,
            ActionKind::DeleteAllNotifications,
            vec![Family::Notifications],
        );
        Ok(())
    }

    /// Pending -> Committed for every family the action touched.
    pub(crate) fn commit(&mut self, ticket: Ticket, echo: Option<EchoEntry>) -> Option<ActionKind> {
        let Some(in_flight) = self.in_flight.remove(&ticket) else {
            board_debug!("ignoring resolution for unknown ticket {}", ticket);
            return None;
        };
        for family in &in_flight.families {
            match family {
                Family::SavedJobs => {
                    let echo = match &echo {
                        Some(EchoEntry::SavedJob(entry)) => {
                            Some(self.merge_saved_echo(ticket, entry.clone()))
                        }
                        _ => None,
                    };
                    self.saved.commit(ticket, echo);
                }
                Family::Applications => {
                    let echo = match &echo {
                        Some(EchoEntry::Application(entry)) => {
                            Some(self.merge_application_echo(ticket, entry.clone()))
                        }
                        _ => None,
                    };
                    self.applications.commit(ticket, echo);
                }
                Family::Notifications => {
                    self.notifications.commit(ticket, None);
                }
            }
        }
        self.dirty = true;
        Some(in_flight.action)
    }

    /// Echoes may omit the nested job or the applied flag; the placeholder
    /// fills those in.
    fn merge_saved_echo(&self, ticket: Ticket, mut echo: SavedJobEntry) -> SavedJobEntry {
        if let Some(local) = self.saved.mirror().get(&placeholder_id(ticket)) {
            if echo.job.id.is_empty() {
                echo.job = local.job.clone();
            }
            echo.is_applied |= local.is_applied;
        }
        echo
    }

    fn merge_application_echo(&self, ticket: Ticket, mut echo: ApplicationEntry) -> ApplicationEntry {
        if let Some(local) = self.applications.mirror().get(&placeholder_id(ticket)) {
            if echo.job.id.is_empty() {
                echo.job = local.job.clone();
            }
            if echo.applied_at.is_none() {
                echo.applied_at = local.applied_at;
            }
        }
        echo
    }

    /// Pending -> RolledBack for every family the action touched.
    pub(crate) fn rollback(&mut self, ticket: Ticket) -> Option<ActionKind> {
        let Some(in_flight) = self.in_flight.remove(&ticket) else {
            board_debug!("ignoring failure for unknown ticket {}", ticket);
            return None;
        };
        for family in &in_flight.families {
            match family {
                Family::SavedJobs => self.saved.rollback(ticket),
                Family::Applications => self.applications.rollback(ticket),
                Family::Notifications => self.notifications.rollback(ticket),
            };
        }
        self.dirty = true;
        Some(in_flight.action)
    }
}
