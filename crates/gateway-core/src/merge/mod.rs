//! Partial-update merge rules.
//!
//! # Rules
//! 1. A field absent (`None`) in the update leaves the stored field untouched,
//!    even when the stored value is the zero value of its type.
//! 2. A field present in the update overwrites the stored field, even when the
//!    new value equals the old one or is the zero value.
//! 3. Present values are cloned into the target; the target never aliases the
//!    caller's update.

pub mod history;
pub mod server;

/// Applies rule 1 and 2 for a single optional field.
///
/// Returns true if the target was written.
pub fn merge_field<T: Clone>(target: &mut Option<T>, update: &Option<T>) -> bool {
    match update {
        Some(value) => {
            *target = Some(value.clone());
            true
        },
        None => false,
    }
}
