//! Care-task and medication models shared by the derivation pipeline.
//!
//! These mirror the backend's JSON shapes (camelCase on the wire). Everything
//! derived from them (schedule items, buckets, classifications) is rebuilt
//! from scratch on every fetch and never persisted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Marker the backend embeds in virtual-occurrence ids:
/// `<templateId>_virtual_<YYYY-MM-DD>`.
pub const VIRTUAL_ID_MARKER: &str = "_virtual_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Recurrence rule carried by a template task.
///
/// Anchored at the template's start date; the time of day comes from the
/// template's `due_date`. Monthly days past a month's end are skipped, not
/// clamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "pattern", rename_all = "camelCase")]
pub enum Recurrence {
    Daily,
    EveryNDays { n: u32 },
    Weekly { weekdays: Vec<chrono::Weekday> },
    Monthly { day: u32 },
}

/// A care task: one-off, recurrence template, materialized occurrence, or
/// in-memory virtual occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reminder_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assigned_to_id: Option<String>,
    /// Set when this is a materialized occurrence of a recurring template.
    #[serde(default)]
    pub parent_task_id: Option<String>,
    #[serde(default)]
    pub is_recurrence_template: bool,
    /// True for a projected occurrence that has not been materialized yet.
    #[serde(default)]
    pub is_virtual: bool,
    #[serde(default)]
    pub virtual_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub recurrence: Option<Recurrence>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            priority: Priority::Medium,
            status: TaskStatus::Pending,
            due_date: None,
            reminder_date: None,
            assigned_to_id: None,
            parent_task_id: None,
            is_recurrence_template: false,
            is_virtual: false,
            virtual_date: None,
            recurrence: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_reminder(mut self, reminder: DateTime<Utc>) -> Self {
        self.reminder_date = Some(reminder);
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.is_recurrence_template = true;
        self.recurrence = Some(recurrence);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Template id for this occurrence: explicit parent link first, else the
    /// prefix of a virtual id, else the task itself (it IS the template).
    pub fn template_id(&self) -> &str {
        if let Some(parent) = &self.parent_task_id {
            return parent;
        }
        match split_virtual_id(&self.id) {
            Some((template, _)) => template,
            None => &self.id,
        }
    }
}

/// Build the id of a virtual occurrence for `date`.
pub fn virtual_task_id(template_id: &str, date: NaiveDate) -> String {
    format!("{template_id}{VIRTUAL_ID_MARKER}{}", date.format("%Y-%m-%d"))
}

/// Split `<templateId>_virtual_<date>` into its parts. Returns `None` for
/// concrete ids.
pub fn split_virtual_id(id: &str) -> Option<(&str, &str)> {
    let idx = id.find(VIRTUAL_ID_MARKER)?;
    let template = &id[..idx];
    let date = &id[idx + VIRTUAL_ID_MARKER.len()..];
    if template.is_empty() || date.is_empty() {
        return None;
    }
    Some((template, date))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoseStatus {
    Pending,
    Given,
    Missed,
    Refused,
}

impl DoseStatus {
    /// Terminal statuses never move between time buckets again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DoseStatus::Pending)
    }
}

/// A medication as stored, with its daily schedule times (`HH:MM`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: String,
    pub name: String,
    pub dosage: String,
    #[serde(default)]
    pub schedule_times: Vec<String>,
    pub is_active: bool,
}

/// One dose slot for one day, derived by the backend (or by
/// [`crate::expand::expand_medication`]), never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationScheduleEntry {
    pub medication_id: String,
    pub medication_name: String,
    pub dosage: String,
    pub scheduled_time: DateTime<Utc>,
    pub status: DoseStatus,
    #[serde(default)]
    pub given_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub given_by: Option<String>,
}
