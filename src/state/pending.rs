//! Registry of answers that were accepted but still wait for an unlock code.

use dashmap::DashMap;

/// Answer accepted for `order`; the player must now submit `unlock_code`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUnlock {
    /// Question whose answer was accepted.
    pub order: u32,
    /// Code expected from the player, compared case-insensitively.
    pub unlock_code: String,
    /// Clue shown again while the code is outstanding.
    pub clue: String,
}

/// Pending unlocks keyed by player identity; at most one per player.
#[derive(Debug, Default)]
pub struct PendingUnlocks {
    entries: DashMap<String, PendingUnlock>,
}

impl PendingUnlocks {
    /// Remember `pending` for `identity`, replacing any previous entry.
    pub fn remember(&self, identity: &str, pending: PendingUnlock) {
        self.entries.insert(identity.to_owned(), pending);
    }

    /// Pending unlock of `identity`, if any.
    pub fn get(&self, identity: &str) -> Option<PendingUnlock> {
        self.entries.get(identity).map(|entry| entry.value().clone())
    }

    /// Drop the entry of `identity` if it still targets `order`.
    ///
    /// Returns whether an entry was removed.
    pub fn clear(&self, identity: &str, order: u32) -> bool {
        self.entries
            .remove_if(identity, |_, pending| pending.order == order)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(order: u32) -> PendingUnlock {
        PendingUnlock {
            order,
            unlock_code: format!("QR{order}"),
            clue: "look up".into(),
        }
    }

    #[test]
    fn newer_answer_replaces_older_entry() {
        let registry = PendingUnlocks::default();
        registry.remember("p1", pending(1));
        registry.remember("p1", pending(2));

        assert_eq!(registry.get("p1").map(|p| p.order), Some(2));
        assert!(!registry.clear("p1", 1));
    }

    #[test]
    fn clear_only_removes_matching_order() {
        let registry = PendingUnlocks::default();
        registry.remember("p1", pending(3));

        assert!(!registry.clear("p1", 2));
        assert!(registry.get("p1").is_some());
        assert!(registry.clear("p1", 3));
        assert!(registry.get("p1").is_none());
    }
}
