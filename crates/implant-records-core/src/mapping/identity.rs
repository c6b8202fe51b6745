//! Identity generation by scanning existing rows.

use std::fmt::Display;

use log::{trace, warn};

use super::layout::identity_of;
use super::DataWindow;

/// Identity handed out when the existing rows cannot be read.
pub const FALLBACK_IDENTITY: &str = "1";

/// One more than the largest numeric identity in the data window.
///
/// Identities that do not parse as base-10 integers (legacy values, blanks)
/// are skipped, as is `u64::MAX`, which has no successor. An empty window
/// yields `"1"`.
pub fn next_identity(rows: &[Vec<String>], window: DataWindow) -> String {
    window
        .data_rows(rows)
        .filter_map(|(offset, cells)| {
            let id = identity_of(cells);
            let next = id.parse::<u64>().ok().and_then(|n| n.checked_add(1));
            if next.is_none() && !id.is_empty() {
                trace!("Skipping unusable identity {:?} at data row {}", id, offset);
            }
            next
        })
        .max()
        .unwrap_or(1)
        .to_string()
}

/// [`next_identity`] over a row read that may have failed.
///
/// A failed read yields [`FALLBACK_IDENTITY`] instead of an error. This can
/// collide with an existing record if the failure was transient.
pub fn next_identity_or_fallback<E: Display>(
    rows: Result<&[Vec<String>], E>,
    window: DataWindow,
) -> String {
    match rows {
        Ok(rows) => next_identity(rows, window),
        Err(e) => {
            warn!(
                "Could not scan identities ({}), falling back to {}",
                e, FALLBACK_IDENTITY
            );
            FALLBACK_IDENTITY.to_string()
        }
    }
}
