//! Field-level merge for [`ServerRecord`] updates.

use super::merge_field;
use crate::types::ServerRecord;

impl ServerRecord {
    /// Merges a sparse update into this record.
    ///
    /// The composite key is not touched; callers only merge records that share it.
    /// Returns the number of fields written.
    ///
    /// # Example
    ///
    /// ```
    /// use gateway_core::ServerRecord;
    ///
    /// let mut stored = ServerRecord::new(1, 1).with_state(2);
    /// stored.merge_from(&ServerRecord::new(1, 1).with_addr("1.2.3.4"));
    ///
    /// assert_eq!(stored.state, Some(2));
    /// assert_eq!(stored.addr.as_deref(), Some("1.2.3.4"));
    /// ```
    pub fn merge_from(&mut self, update: &ServerRecord) -> usize {
        debug_assert_eq!(self.key(), update.key());

        [
            merge_field(&mut self.name, &update.name),
            merge_field(&mut self.addr, &update.addr),
            merge_field(&mut self.info, &update.info),
            merge_field(&mut self.port, &update.port),
            merge_field(&mut self.state, &update.state),
            merge_field(&mut self.is_show, &update.is_show),
            merge_field(&mut self.is_new, &update.is_new),
            merge_field(&mut self.desc, &update.desc),
            merge_field(&mut self.cluster_name, &update.cluster_name),
        ]
        .into_iter()
        .filter(|written| *written)
        .count()
    }

    /// Column names of the fields present in this record, in schema order.
    ///
    /// Stores use this to restrict an upsert's conflict update to the reported columns.
    pub fn changed_columns(&self) -> Vec<&'static str> {
        let present = [
            ("name", self.name.is_some()),
            ("addr", self.addr.is_some()),
            ("port", self.port.is_some()),
            ("state", self.state.is_some()),
            ("is_show", self.is_show.is_some()),
            ("is_new", self.is_new.is_some()),
            ("desc", self.desc.is_some()),
            ("info", self.info.is_some()),
            ("cluster_name", self.cluster_name.is_some()),
        ];

        present
            .into_iter()
            .filter_map(|(column, is_present)| is_present.then_some(column))
            .collect()
    }
}
