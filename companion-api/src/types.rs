//! Wire envelopes and request bodies for the CareCompanion REST backend.
//!
//! The backend wraps every list/record in a named envelope (`{"tasks": [..]}`)
//! and takes camelCase request fields.

use chrono::{DateTime, Utc};
use companion_core::{DoseStatus, Medication, MedicationScheduleEntry, Priority, Task};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct TasksEnvelope {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
pub struct TaskEnvelope {
    pub task: Task,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleEnvelope {
    pub schedule: Vec<MedicationScheduleEntry>,
}

#[derive(Debug, Deserialize)]
pub struct MedicationsEnvelope {
    pub medications: Vec<Medication>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterializeRequest {
    pub virtual_date: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update for a task or a whole series. Absent fields are left
/// untouched by the backend.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoseLogRequest {
    /// `HH:MM` slot being logged.
    pub scheduled_time: String,
    pub status: DoseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_patch_omits_absent_fields() {
        let patch = TaskPatch {
            title: Some("Walk earlier".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"title":"Walk earlier"}"#);
    }

    #[test]
    fn dose_log_serializes_backend_field_names() {
        let body = DoseLogRequest {
            scheduled_time: "08:00".to_string(),
            status: DoseStatus::Given,
            notes: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"scheduledTime":"08:00","status":"given"}"#);
    }

    #[test]
    fn tasks_envelope_round_trips_backend_shape() {
        let payload = r#"{"tasks":[{"id":"t1","title":"Call pharmacy","priority":"medium","status":"pending"}]}"#;
        let env: TasksEnvelope = serde_json::from_str(payload).unwrap();
        assert_eq!(env.tasks.len(), 1);
        assert_eq!(env.tasks[0].id, "t1");
    }
}
