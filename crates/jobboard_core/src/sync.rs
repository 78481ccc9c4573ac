use std::collections::BTreeMap;

use jobboard_logging::{board_debug, board_warn};

use crate::{Family, MirrorEntry, MirrorStore, SyncError, Ticket};

/// Pending key used by actions that touch the whole collection.
pub const ALL_KEYS: &str = "*";

/// The inverse of one optimistic mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Undo<E> {
    /// Undo an insert.
    Remove { id: String },
    /// Undo a removal.
    Reinsert { index: usize, entry: E },
    /// Undo a flag flip by restoring the earlier snapshot.
    Revert { entry: E },
    /// Undo a clear.
    RestoreAll { entries: Vec<E> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingOp<E> {
    ticket: Ticket,
    undo: Undo<E>,
}

/// One family's mirror plus its Pending journal.
///
/// Every action runs `Idle -> Pending -> {Committed, RolledBack}`. At most
/// one Pending action exists per resource key; a second one is refused with
/// `DuplicateInFlight` before the mirror is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSync<E> {
    family: Family,
    mirror: MirrorStore<E>,
    pending: BTreeMap<String, PendingOp<E>>,
}

impl<E: MirrorEntry> ResourceSync<E> {
    pub fn new(family: Family) -> Self {
        Self {
            family,
            mirror: MirrorStore::new(),
            pending: BTreeMap::new(),
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn mirror(&self) -> &MirrorStore<E> {
        &self.mirror
    }

    /// Last write wins; the Pending journal is kept so late resolutions still
    /// find their ticket.
    pub fn load(&mut self, entries: Vec<E>) {
        self.mirror.load(entries);
    }

    pub fn is_pending(&self, key: &str) -> bool {
        if key == ALL_KEYS {
            return !self.pending.is_empty();
        }
        self.pending.contains_key(key) || self.pending.contains_key(ALL_KEYS)
    }

    /// True when the entry with this id belongs to a Pending action.
    pub fn is_entry_pending(&self, id: &str) -> bool {
        self.mirror
            .get(id)
            .is_some_and(|entry| self.is_pending(entry.resource_key()))
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn ensure_idle(&self, key: &str) -> Result<(), SyncError> {
        if self.is_pending(key) {
            board_debug!("{} key={} refused: already pending", self.family, key);
            return Err(SyncError::duplicate_in_flight());
        }
        Ok(())
    }

    fn track(&mut self, key: String, ticket: Ticket, undo: Undo<E>) {
        board_debug!("{} ticket={} key={} pending", self.family, ticket, key);
        self.pending.insert(key, PendingOp { ticket, undo });
    }

    pub fn begin_add(&mut self, ticket: Ticket, entry: E) -> Result<(), SyncError> {
        let key = entry.resource_key().to_string();
        self.ensure_idle(&key)?;
        let id = entry.entry_id().to_string();
        self.mirror.optimistic_add(entry)?;
        self.track(key, ticket, Undo::Remove { id });
        Ok(())
    }

    pub fn begin_remove(&mut self, ticket: Ticket, id: &str) -> Result<(), SyncError> {
        let key = self.key_of(id)?;
        self.ensure_idle(&key)?;
        let (index, entry) = self
            .mirror
            .optimistic_remove(id)
            .ok_or_else(|| SyncError::not_found(format!("no {} entry {id}", self.family)))?;
        self.track(key, ticket, Undo::Reinsert { index, entry });
        Ok(())
    }

    pub fn begin_patch(
        &mut self,
        ticket: Ticket,
        id: &str,
        patch: impl FnOnce(&mut E),
    ) -> Result<(), SyncError> {
        let key = self.key_of(id)?;
        self.ensure_idle(&key)?;
        let before = self
            .mirror
            .get(id)
            .cloned()
            .ok_or_else(|| SyncError::not_found(format!("no {} entry {id}", self.family)))?;
        self.mirror.reconcile(id, patch);
        self.track(key, ticket, Undo::Revert { entry: before });
        Ok(())
    }

    pub fn begin_clear(&mut self, ticket: Ticket) -> Result<(), SyncError> {
        self.ensure_idle(ALL_KEYS)?;
        let entries = self.mirror.take_all();
        self.track(ALL_KEYS.to_string(), ticket, Undo::RestoreAll { entries });
        Ok(())
    }

    fn key_of(&self, id: &str) -> Result<String, SyncError> {
        self.mirror
            .get(id)
            .map(|entry| entry.resource_key().to_string())
            .ok_or_else(|| SyncError::not_found(format!("no {} entry {id}", self.family)))
    }

    fn take_ticket(&mut self, ticket: Ticket) -> Option<(String, PendingOp<E>)> {
        let key = self
            .pending
            .iter()
            .find(|(_, op)| op.ticket == ticket)
            .map(|(key, _)| key.clone())?;
        self.pending.remove(&key).map(|op| (key, op))
    }

    /// Pending -> Committed. A server echo replaces the optimistic insert in
    /// place; other mutations already show their end state.
    pub fn commit(&mut self, ticket: Ticket, echo: Option<E>) -> bool {
        let Some((key, op)) = self.take_ticket(ticket) else {
            return false;
        };
        if let (Undo::Remove { id }, Some(echo)) = (&op.undo, echo) {
            if !self.mirror.replace(id, echo) {
                board_warn!(
                    "{} ticket={} echo arrived but placeholder {} is gone",
                    self.family,
                    ticket,
                    id
                );
            }
        }
        board_debug!("{} ticket={} key={} committed", self.family, ticket, key);
        true
    }

    /// Pending -> RolledBack: applies the exact inverse of the mutation.
    pub fn rollback(&mut self, ticket: Ticket) -> bool {
        let Some((key, op)) = self.take_ticket(ticket) else {
            return false;
        };
        match op.undo {
            Undo::Remove { id } => {
                self.mirror.optimistic_remove(&id);
            }
            Undo::Reinsert { index, entry } => {
                self.mirror.restore_at(index, entry);
            }
            Undo::Revert { entry } => {
                let id = entry.entry_id().to_string();
                self.mirror.reconcile(&id, |current| *current = entry);
            }
            Undo::RestoreAll { entries } => {
                // A load that landed meanwhile already shows the server truth.
                if self.mirror.is_empty() {
                    self.mirror.load(entries);
                }
            }
        }
        board_debug!("{} ticket={} key={} rolled back", self.family, ticket, key);
        true
    }

    /// Drops the mirror and every Pending action (logout).
    pub fn reset(&mut self) {
        self.mirror.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConflictKind, Counts, ErrorKind, NotificationEntry};

    fn inbox() -> ResourceSync<NotificationEntry> {
        let mut sync = ResourceSync::new(Family::Notifications);
        sync.load(vec![
            NotificationEntry::new("1", false),
            NotificationEntry::new("2", true),
            NotificationEntry::new("3", false),
        ]);
        sync
    }

    fn counts(sync: &ResourceSync<NotificationEntry>) -> Counts {
        Counts::from_entries(sync.mirror().iter())
    }

    #[test]
    fn patch_rollback_restores_flag() {
        let mut sync = inbox();
        sync.begin_patch(1, "1", |entry| entry.is_read = true).unwrap();
        assert!(sync.mirror().get("1").unwrap().is_read);
        assert!(sync.rollback(1));
        assert!(!sync.mirror().get("1").unwrap().is_read);
        assert_eq!(sync.pending_count(), 0);
    }

    #[test]
    fn second_action_on_same_id_is_refused() {
        let mut sync = inbox();
        sync.begin_patch(1, "1", |entry| entry.is_read = true).unwrap();
        let err = sync.begin_remove(2, "1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict(ConflictKind::DuplicateInFlight));
        assert!(sync.mirror().get("1").is_some());
    }

    #[test]
    fn clear_blocks_everything_and_restores_on_failure() {
        let mut sync = inbox();
        sync.begin_clear(5).unwrap();
        assert!(sync.mirror().is_empty());
        assert_eq!(counts(&sync), Counts::default());

        let err = sync.begin_patch(6, "2", |entry| entry.is_read = false).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        assert!(sync.rollback(5));
        assert_eq!(counts(&sync).total, 3);
        assert_eq!(sync.mirror().entries()[0].id, "1");
    }

    #[test]
    fn clear_is_refused_while_anything_is_pending() {
        let mut sync = inbox();
        sync.begin_remove(1, "3").unwrap();
        let err = sync.begin_clear(2).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict(ConflictKind::DuplicateInFlight));
    }

    #[test]
    fn unknown_ticket_is_ignored() {
        let mut sync = inbox();
        assert!(!sync.commit(99, None));
        assert!(!sync.rollback(99));
        assert_eq!(sync.mirror().len(), 3);
    }

    #[test]
    fn counts_hold_through_every_transition() {
        let mut sync = inbox();
        let mut ticket = 0;
        type Inbox = ResourceSync<NotificationEntry>;
        let steps: Vec<fn(&mut Inbox, Ticket)> = vec![
            |s: &mut Inbox, t: Ticket| s.begin_patch(t, "1", |e| e.is_read = true).unwrap(),
            |s: &mut Inbox, t: Ticket| s.begin_patch(t, "2", |e| e.is_read = false).unwrap(),
            |s: &mut Inbox, t: Ticket| s.begin_remove(t, "3").unwrap(),
        ];
        for (index, step) in steps.iter().enumerate() {
            ticket += 1;
            step(&mut sync, ticket);
            let c = counts(&sync);
            assert_eq!(c.total, c.read + c.unread);
            if index % 2 == 0 {
                sync.commit(ticket, None);
            } else {
                sync.rollback(ticket);
            }
            let c = counts(&sync);
            assert_eq!(c.total, c.read + c.unread);
        }
        assert_eq!(counts(&sync), Counts { total: 2, read: 2, unread: 0 });
    }
}
