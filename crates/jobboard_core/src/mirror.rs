use std::collections::HashSet;

use jobboard_logging::board_warn;

use crate::{
    ApplicationEntry, ConflictKind, ErrorKind, NotificationEntry, SavedJobEntry, SyncError,
};

/// An entry the mirror can hold.
pub trait MirrorEntry: Clone {
    /// Stable id of this entry (server-assigned, or a local placeholder).
    fn entry_id(&self) -> &str;

    /// Identity of the underlying resource. Two entries with the same key
    /// describe the same job (or notification) and may not coexist.
    fn resource_key(&self) -> &str;
}

impl MirrorEntry for SavedJobEntry {
    fn entry_id(&self) -> &str {
        &self.id
    }

    fn resource_key(&self) -> &str {
        if self.job.id.is_empty() {
            &self.id
        } else {
            &self.job.id
        }
    }
}

impl MirrorEntry for ApplicationEntry {
    fn entry_id(&self) -> &str {
        &self.id
    }

    fn resource_key(&self) -> &str {
        if self.job.id.is_empty() {
            &self.id
        } else {
            &self.job.id
        }
    }
}

impl MirrorEntry for NotificationEntry {
    fn entry_id(&self) -> &str {
        &self.id
    }

    fn resource_key(&self) -> &str {
        &self.id
    }
}

/// In-memory, most-recent-first copy of one remote list.
///
/// Invariant: no two entries share an id or a resource key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorStore<E> {
    entries: Vec<E>,
}

impl<E> Default for MirrorStore<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<E: MirrorEntry> MirrorStore<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole collection. Later duplicates are dropped; returns
    /// how many were dropped.
    pub fn load(&mut self, entries: Vec<E>) -> usize {
        let mut ids = HashSet::new();
        let mut keys = HashSet::new();
        let incoming = entries.len();
        self.entries = entries
            .into_iter()
            .filter(|entry| {
                let fresh_id = ids.insert(entry.entry_id().to_string());
                let fresh_key = keys.insert(entry.resource_key().to_string());
                fresh_id && fresh_key
            })
            .collect();
        let dropped = incoming - self.entries.len();
        if dropped > 0 {
            board_warn!("mirror load collapsed {} duplicate entries", dropped);
        }
        dropped
    }

    /// Inserts at the head. Rejected when the id or the resource is present.
    pub fn optimistic_add(&mut self, entry: E) -> Result<(), SyncError> {
        if self.get(entry.entry_id()).is_some() || self.find_by_key(entry.resource_key()).is_some()
        {
            return Err(
                SyncError::new(ErrorKind::Conflict(ConflictKind::DuplicateResource))
                    .with_message("entry already present"),
            );
        }
        self.entries.insert(0, entry);
        Ok(())
    }

    /// Removes by id, returning the former position and the entry.
    pub fn optimistic_remove(&mut self, id: &str) -> Option<(usize, E)> {
        let index = self.position(id)?;
        Some((index, self.entries.remove(index)))
    }

    /// Puts an entry back at `index` (clamped). No-op if it is present again.
    pub fn restore_at(&mut self, index: usize, entry: E) -> bool {
        if self.get(entry.entry_id()).is_some() || self.find_by_key(entry.resource_key()).is_some()
        {
            return false;
        }
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
        true
    }

    /// Applies a partial update to the entry with `id`, keeping its position.
    pub fn reconcile(&mut self, id: &str, patch: impl FnOnce(&mut E)) -> bool {
        match self.entries.iter_mut().find(|entry| entry.entry_id() == id) {
            Some(entry) => {
                patch(entry);
                true
            }
            None => false,
        }
    }

    /// Swaps the entry with `id` for `replacement` at the same position.
    ///
    /// Any other entry already carrying the replacement's id or key (for
    /// example one brought in by a load that landed meanwhile) is dropped.
    pub fn replace(&mut self, id: &str, replacement: E) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let new_id = replacement.entry_id().to_string();
        let new_key = replacement.resource_key().to_string();
        self.entries[index] = replacement;
        let mut position = 0;
        self.entries.retain(|entry| {
            let keep = position == index
                || (entry.entry_id() != new_id && entry.resource_key() != new_key);
            position += 1;
            keep
        });
        true
    }

    pub fn take_all(&mut self) -> Vec<E> {
        std::mem::take(&mut self.entries)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, id: &str) -> Option<&E> {
        self.entries.iter().find(|entry| entry.entry_id() == id)
    }

    pub fn find_by_key(&self, key: &str) -> Option<&E> {
        self.entries.iter().find(|entry| entry.resource_key() == key)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.entry_id() == id)
    }

    pub fn entries(&self) -> &[E] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JobSummary;

    fn saved(id: &str, job: &str) -> SavedJobEntry {
        SavedJobEntry {
            id: id.to_string(),
            job: JobSummary::new(job, format!("Job {job}")),
            is_applied: false,
        }
    }

    fn ids(store: &MirrorStore<SavedJobEntry>) -> Vec<&str> {
        store.iter().map(|entry| entry.id.as_str()).collect()
    }

    #[test]
    fn add_inserts_at_head_and_rejects_duplicates() {
        let mut store = MirrorStore::new();
        store.optimistic_add(saved("a", "1")).unwrap();
        store.optimistic_add(saved("b", "2")).unwrap();
        assert_eq!(ids(&store), vec!["b", "a"]);

        let same_id = store.optimistic_add(saved("a", "9")).unwrap_err();
        assert_eq!(
            same_id.kind,
            ErrorKind::Conflict(ConflictKind::DuplicateResource)
        );
        let same_job = store.optimistic_add(saved("c", "1")).unwrap_err();
        assert_eq!(
            same_job.kind,
            ErrorKind::Conflict(ConflictKind::DuplicateResource)
        );
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_then_restore_keeps_original_position() {
        let mut store = MirrorStore::new();
        store.load(vec![saved("a", "1"), saved("b", "2"), saved("c", "3")]);

        let (index, entry) = store.optimistic_remove("b").unwrap();
        assert_eq!(index, 1);
        assert_eq!(ids(&store), vec!["a", "c"]);

        assert!(store.restore_at(index, entry.clone()));
        assert_eq!(ids(&store), vec!["a", "b", "c"]);
        assert!(!store.restore_at(index, entry));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn load_collapses_duplicate_ids_and_jobs() {
        let mut store = MirrorStore::new();
        let dropped = store.load(vec![saved("a", "1"), saved("a", "2"), saved("b", "1")]);
        assert_eq!(dropped, 2);
        assert_eq!(ids(&store), vec!["a"]);
    }

    #[test]
    fn reconcile_touches_one_entry_without_reordering() {
        let mut store = MirrorStore::new();
        store.load(vec![saved("a", "1"), saved("b", "2")]);
        assert!(store.reconcile("b", |entry| entry.is_applied = true));
        assert!(!store.reconcile("zz", |entry| entry.is_applied = true));
        assert_eq!(ids(&store), vec!["a", "b"]);
        assert!(!store.get("a").unwrap().is_applied);
        assert!(store.get("b").unwrap().is_applied);
    }

    #[test]
    fn replace_drops_colliding_entries() {
        let mut store = MirrorStore::new();
        store.load(vec![saved("local-1", "1"), saved("x", "2"), saved("srv", "3")]);
        assert!(store.replace("local-1", saved("srv", "1")));
        assert_eq!(ids(&store), vec!["srv", "x"]);
    }

    #[test]
    fn random_add_remove_sequences_never_duplicate_ids() {
        let mut store = MirrorStore::new();
        // Deterministic pseudo-random walk over a small id space.
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        for _ in 0..2_000 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let id = format!("e{}", seed % 8);
            let job = format!("{}", (seed >> 8) % 8);
            if seed % 3 == 0 {
                store.optimistic_remove(&id);
            } else {
                let _ = store.optimistic_add(saved(&id, &job));
            }
            let mut seen = HashSet::new();
            assert!(store.iter().all(|entry| seen.insert(entry.id.clone())));
        }
    }
}
