//! Roster: Participant tracking with activity-driven ordering.
//!
//! A buffer's roster is two structures kept consistent under one lock:
//! a membership map keyed by nickname, and a recency-ordered name list.
//! Joining places a name at the least-recent end; speaking (a line tagged
//! `nick_<name>`) promotes it to the front. The ordering is therefore
//! driven by activity, not by join time; the presentation layer uses it
//! for "who spoke last" nick completion and roster sorting.
//!
//! The roster has its own lock, distinct from the line log's, so roster
//! reads never serialize behind line-log writes.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One roster participant.
///
/// Keyed by the stable `name` identity; `prefix` and `away` are display
/// attributes the protocol may update in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NickEntry {
    /// Stable nickname identity.
    name: String,
    /// Mode marker rendered before the name (`@`, `+`, or empty).
    prefix: String,
    /// Whether the participant is marked away.
    away: bool,
}

impl NickEntry {
    /// Create an entry with no prefix, present (not away).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: String::new(),
            away: false,
        }
    }

    /// Set the mode prefix (builder pattern).
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the away marker (builder pattern).
    #[must_use]
    pub const fn with_away(mut self, away: bool) -> Self {
        self.away = away;
        self
    }

    /// Get the nickname identity.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the mode prefix.
    #[inline]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Check the away marker.
    #[inline]
    pub const fn is_away(&self) -> bool {
        self.away
    }

    /// Get the prefixed form shown in nicklists (`@alice`).
    pub fn display_name(&self) -> String {
        format!("{}{}", self.prefix, self.name)
    }
}

/// Membership map plus recency order, consistent under one lock.
struct RosterInner {
    /// Entries keyed by nickname.
    entries: HashMap<String, NickEntry>,
    /// Names ordered most-recently-active first.
    order: Vec<String>,
}

/// Internally synchronized participant set with recency ordering.
///
/// Invariant: every name in the recency order has exactly one entry in the
/// membership map, and vice versa. Every mutation below preserves it.
pub struct Roster {
    inner: Mutex<RosterInner>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RosterInner {
                entries: HashMap::new(),
                order: Vec::new(),
            }),
        }
    }

    /// Acquire the inner lock.
    ///
    /// Critical sections never panic; recover from poisoning and continue.
    fn lock(&self) -> MutexGuard<'_, RosterInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a participant.
    ///
    /// A new name joins at the least-recent end of the order; re-adding an
    /// existing name replaces its entry in place without moving it.
    pub fn add(&self, entry: NickEntry) {
        let mut inner = self.lock();
        let name = entry.name().to_string();
        if inner.entries.insert(name.clone(), entry).is_none() {
            inner.order.push(name);
        }
    }

    /// Remove a participant by name.
    ///
    /// Returns the removed entry, or `None` if the name was not present
    /// (absence is a normal outcome, e.g. a quit for an untracked nick).
    pub fn remove(&self, name: &str) -> Option<NickEntry> {
        let mut inner = self.lock();
        let removed = inner.entries.remove(name);
        if removed.is_some() {
            inner.order.retain(|n| n != name);
        }
        removed
    }

    /// Replace a participant's entry without changing its position.
    ///
    /// Returns `false` if the name is not present; nothing is inserted in
    /// that case, keeping the membership/order invariant intact.
    pub fn update(&self, entry: NickEntry) -> bool {
        let mut inner = self.lock();
        match inner.entries.get_mut(entry.name()) {
            Some(slot) => {
                *slot = entry;
                true
            }
            None => false,
        }
    }

    /// Promote a name to most-recently-active.
    ///
    /// Called when a line tagged with this nickname arrives. Returns
    /// `false` for unknown names (the author may already have left).
    pub fn touch(&self, name: &str) -> bool {
        let mut inner = self.lock();
        if !inner.entries.contains_key(name) {
            return false;
        }
        inner.order.retain(|n| n != name);
        inner.order.insert(0, name.to_string());
        true
    }

    /// Look up a participant by name.
    pub fn get(&self, name: &str) -> Option<NickEntry> {
        self.lock().entries.get(name).cloned()
    }

    /// Get all names, most-recently-active first.
    pub fn names(&self) -> Vec<String> {
        self.lock().order.clone()
    }

    /// Get all entries in recency order.
    pub fn entries(&self) -> Vec<NickEntry> {
        let inner = self.lock();
        inner
            .order
            .iter()
            .filter_map(|n| inner.entries.get(n).cloned())
            .collect()
    }

    /// Get the number of participants.
    pub fn len(&self) -> usize {
        let inner = self.lock();
        debug_assert_eq!(inner.entries.len(), inner.order.len());
        inner.entries.len()
    }

    /// Check if the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Remove all participants.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Roster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("Roster")
            .field("len", &inner.entries.len())
            .field("order", &inner.order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster_with(names: &[&str]) -> Roster {
        let roster = Roster::new();
        for name in names {
            roster.add(NickEntry::new(*name));
        }
        roster
    }

    #[test]
    fn test_nick_entry_display_name() {
        let op = NickEntry::new("alice").with_prefix("@");
        assert_eq!(op.display_name(), "@alice");
        assert_eq!(NickEntry::new("bob").display_name(), "bob");
    }

    #[test]
    fn test_roster_add_appends_least_recent() {
        let roster = roster_with(&["alice", "bob", "carol"]);
        assert_eq!(roster.names(), ["alice", "bob", "carol"]);
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn test_roster_re_add_keeps_position() {
        let roster = roster_with(&["alice", "bob"]);
        roster.add(NickEntry::new("alice").with_prefix("@"));
        assert_eq!(roster.names(), ["alice", "bob"]);
        assert_eq!(roster.get("alice").unwrap().prefix(), "@");
    }

    #[test]
    fn test_roster_touch_promotes_to_front() {
        let roster = roster_with(&["alice", "bob", "carol"]);
        assert!(roster.touch("bob"));
        // Promoted entry moves to the front; the rest keep relative order.
        assert_eq!(roster.names(), ["bob", "alice", "carol"]);
    }

    #[test]
    fn test_roster_touch_unknown_is_noop() {
        let roster = roster_with(&["alice"]);
        assert!(!roster.touch("ghost"));
        assert_eq!(roster.names(), ["alice"]);
    }

    #[test]
    fn test_roster_remove_returns_entry() {
        let roster = roster_with(&["alice", "bob"]);
        let removed = roster.remove("alice").unwrap();
        assert_eq!(removed.name(), "alice");
        assert_eq!(roster.names(), ["bob"]);
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_roster_remove_absent_is_none() {
        let roster = roster_with(&["alice"]);
        assert!(roster.remove("ghost").is_none());
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_roster_update_in_place() {
        let roster = roster_with(&["alice", "bob", "carol"]);
        roster.touch("carol");
        let updated = roster.update(NickEntry::new("bob").with_away(true));
        assert!(updated);
        // Position unchanged by update.
        assert_eq!(roster.names(), ["carol", "alice", "bob"]);
        assert!(roster.get("bob").unwrap().is_away());
    }

    #[test]
    fn test_roster_update_absent_does_not_insert() {
        let roster = roster_with(&["alice"]);
        assert!(!roster.update(NickEntry::new("ghost")));
        // Membership and order stay consistent: no half-inserted entry.
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.names(), ["alice"]);
        assert!(roster.get("ghost").is_none());
    }

    #[test]
    fn test_roster_entries_follow_recency_order() {
        let roster = roster_with(&["alice", "bob"]);
        roster.touch("bob");
        let entries = roster.entries();
        assert_eq!(entries[0].name(), "bob");
        assert_eq!(entries[1].name(), "alice");
    }

    #[test]
    fn test_roster_clear() {
        let roster = roster_with(&["alice", "bob"]);
        roster.clear();
        assert!(roster.is_empty());
        assert!(roster.names().is_empty());
    }

    #[test]
    fn test_roster_order_and_membership_stay_consistent() {
        let roster = Roster::new();
        for i in 0..20 {
            roster.add(NickEntry::new(format!("nick{i}")));
        }
        for i in (0..20).step_by(2) {
            roster.remove(&format!("nick{i}"));
        }
        roster.touch("nick7");
        let names = roster.names();
        assert_eq!(names.len(), roster.len());
        for name in &names {
            assert!(roster.get(name).is_some());
        }
        assert_eq!(names[0], "nick7");
    }
}
