//! Write-target resolution for edits, completions, and deletes.
//!
//! A virtual occurrence has no concrete record behind it, so a
//! single-occurrence write must materialize it first; a series write goes to
//! the template instead. The result type makes "write to a virtual id"
//! unrepresentable; callers can only follow one of the two lawful paths.

use serde::{Deserialize, Serialize};

use crate::model::{Task, split_virtual_id};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditScope {
    /// Only this dated instance.
    Occurrence,
    /// The template; affects all future occurrences.
    Series,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteTarget {
    /// The record exists; write straight to this id.
    Direct { id: String },
    /// Materialize `template_id` at `virtual_date` first, then write to the
    /// concrete id the backend returns.
    MaterializeThenWrite {
        template_id: String,
        /// Date string for the materialize call, as encoded in the virtual id
        /// (or the full projected instant when the occurrence carries one).
        virtual_date: String,
    },
}

impl WriteTarget {
    pub fn must_materialize_first(&self) -> bool {
        matches!(self, WriteTarget::MaterializeThenWrite { .. })
    }

    pub fn target_id(&self) -> &str {
        match self {
            WriteTarget::Direct { id } => id,
            WriteTarget::MaterializeThenWrite { template_id, .. } => template_id,
        }
    }
}

/// Decide where a write for `occurrence` must go.
///
/// Virtuality is judged from the id shape, not the `is_virtual` flag, so a
/// task round-tripped through JSON with the flag dropped still resolves
/// correctly.
pub fn resolve_write_target(occurrence: &Task, scope: EditScope) -> WriteTarget {
    let split = split_virtual_id(&occurrence.id);

    match scope {
        EditScope::Occurrence => match split {
            Some((template, date)) => WriteTarget::MaterializeThenWrite {
                template_id: template.to_string(),
                virtual_date: occurrence
                    .virtual_date
                    .map(|dt| dt.to_rfc3339())
                    .unwrap_or_else(|| date.to_string()),
            },
            // Concrete: even a materialized child (parent link set) is
            // edited through its own id.
            None => WriteTarget::Direct {
                id: occurrence.id.clone(),
            },
        },
        EditScope::Series => WriteTarget::Direct {
            id: occurrence.template_id().to_string(),
        },
    }
}

/// Completion never has series-wide effect: it always targets the single
/// occurrence, materializing first when virtual.
pub fn resolve_complete_target(occurrence: &Task) -> WriteTarget {
    resolve_write_target(occurrence, EditScope::Occurrence)
}
