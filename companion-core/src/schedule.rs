//! Unified schedule items: the view model every screen renders.
//!
//! Tasks and medication dose slots both flatten into [`ScheduleItem`]s.
//! Items are rebuilt from the fetched lists on every derivation pass and
//! discarded on the next one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::{Classification, classify};
use crate::model::{DoseStatus, MedicationScheduleEntry, Task, TaskStatus};
use crate::time::epoch_millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    Completed,
    Given,
    Missed,
    Refused,
}

impl ItemStatus {
    /// Terminal items go to the completed bucket regardless of time.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ItemStatus::Pending)
    }
}

impl From<DoseStatus> for ItemStatus {
    fn from(s: DoseStatus) -> Self {
        match s {
            DoseStatus::Pending => ItemStatus::Pending,
            DoseStatus::Given => ItemStatus::Given,
            DoseStatus::Missed => ItemStatus::Missed,
            DoseStatus::Refused => ItemStatus::Refused,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: String,
    pub classification: Classification,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Option<String>,
    pub due: Option<DateTime<Utc>>,
    pub reminder: Option<DateTime<Utc>>,
    pub status: ItemStatus,
}

impl ScheduleItem {
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            classification: classify(task),
            title: task.title.clone(),
            description: task.description.clone(),
            assigned_to: task.assigned_to_id.clone(),
            due: task.due_date.or(task.virtual_date),
            reminder: task.reminder_date,
            status: match task.status {
                TaskStatus::Pending => ItemStatus::Pending,
                TaskStatus::Completed => ItemStatus::Completed,
            },
        }
    }

    pub fn from_dose(entry: &MedicationScheduleEntry) -> Self {
        Self {
            id: dose_item_id(&entry.medication_id, entry.scheduled_time),
            classification: Classification::medication(),
            title: entry.medication_name.clone(),
            description: Some(entry.dosage.clone()),
            assigned_to: entry.given_by.clone(),
            due: Some(entry.scheduled_time),
            reminder: None,
            status: entry.status.into(),
        }
    }

    /// Effective time the item is shown under: due first, else reminder.
    pub fn display_time(&self) -> Option<DateTime<Utc>> {
        self.due.or(self.reminder)
    }
}

/// Stable id for a dose occurrence: same medication + instant always yields
/// the same id, so refetches diff cleanly.
pub fn dose_item_id(medication_id: &str, scheduled: DateTime<Utc>) -> String {
    format!("med-{medication_id}-{}", epoch_millis(scheduled))
}
