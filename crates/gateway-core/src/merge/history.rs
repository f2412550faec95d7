//! Recency-ordered upsert of a player's server history.

use super::merge_field;
use crate::types::{PlayerHistoryEntry, UserHistory};

impl PlayerHistoryEntry {
    /// Merges a newer report for the same server into this entry.
    fn merge_from(&mut self, newer: &PlayerHistoryEntry) {
        self.player_id = newer.player_id;
        merge_field(&mut self.player_name, &newer.player_name);
        merge_field(&mut self.level, &newer.level);
        merge_field(&mut self.avatar, &newer.avatar);
        merge_field(&mut self.login_time, &newer.login_time);
    }
}

impl UserHistory {
    /// Records a login on the entry's server.
    ///
    /// An existing entry for the same `(cluster_id, game_id)` is merged with the
    /// report and moved to the front; otherwise the report is prepended. The list
    /// keeps at most one entry per server, most recent first.
    ///
    /// # Example
    ///
    /// ```
    /// use gateway_core::{PlayerHistoryEntry, UserHistory};
    ///
    /// let mut history = UserHistory::empty("acc-1");
    /// history.record_login(PlayerHistoryEntry::new(1, 1, 100));
    /// history.record_login(PlayerHistoryEntry::new(1, 2, 200));
    /// history.record_login(PlayerHistoryEntry::new(1, 1, 100));
    ///
    /// let order: Vec<_> = history.player_list.iter().map(|e| e.game_id).collect();
    /// assert_eq!(order, vec![1, 2]);
    /// ```
    pub fn record_login(&mut self, entry: PlayerHistoryEntry) {
        let key = entry.key();
        let merged = match self.player_list.iter().position(|e| e.key() == key) {
            Some(idx) => {
                let mut existing = self.player_list.remove(idx);
                existing.merge_from(&entry);
                existing
            },
            None => entry,
        };
        self.player_list.insert(0, merged);
    }
}
