//! Heuristic task classification from free-text descriptions.
//!
//! The backend stores no `type` field; caregivers tag descriptions with emoji
//! markers (`🏥` medical, `🧠` therapy, `🔬` lab, `👥`/`👨‍👩‍👧‍👦` social) and the
//! client infers the kind from them. Items that come from the medication
//! schedule never go through this; their source already decides the kind.

use serde::{Deserialize, Serialize};

use crate::model::{Priority, Task};

/// Markers that make an item a social visit.
pub const SOCIAL_MARKERS: [&str; 2] = ["👥", "👨‍👩‍👧‍👦"];

/// Markers that, combined with high priority, make an item an appointment.
pub const MEDICAL_MARKERS: [&str; 3] = ["🏥", "🧠", "🔬"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Medication,
    Task,
    Appointment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub kind: ItemKind,
    pub is_social_visit: bool,
}

impl Classification {
    /// Kind for anything sourced from the medication schedule. The
    /// description is never inspected for these.
    pub fn medication() -> Self {
        Self {
            kind: ItemKind::Medication,
            is_social_visit: false,
        }
    }

    /// Display color for schedule chips. Social visits get their own color
    /// regardless of kind.
    pub fn color(&self) -> &'static str {
        if self.is_social_visit {
            return "#22c55e";
        }
        match self.kind {
            ItemKind::Medication => "#0ea5e9",
            ItemKind::Appointment => "#a855f7",
            ItemKind::Task => "#f59e0b",
        }
    }
}

/// Classify a task from its description and priority.
///
/// Rules, in order: social markers win; then medical markers on a
/// high-priority task mean an appointment; everything else is a plain task.
/// A missing description means "no markers found"; this is total and never
/// errors.
pub fn classify(task: &Task) -> Classification {
    let desc = task.description.as_deref().unwrap_or("");

    if SOCIAL_MARKERS.iter().any(|m| desc.contains(m)) {
        return Classification {
            kind: ItemKind::Appointment,
            is_social_visit: true,
        };
    }

    if task.priority == Priority::High && MEDICAL_MARKERS.iter().any(|m| desc.contains(m)) {
        return Classification {
            kind: ItemKind::Appointment,
            is_social_visit: false,
        };
    }

    Classification {
        kind: ItemKind::Task,
        is_social_visit: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn medical_marker_with_high_priority_is_appointment() {
        let t = Task::new("t1", "Dr. Smith")
            .with_description("🏥 with Dr. Smith\n📍 Clinic\nFollow-up")
            .with_priority(Priority::High);
        let c = classify(&t);
        assert_eq!(c.kind, ItemKind::Appointment);
        assert!(!c.is_social_visit);
    }

    #[test]
    fn medical_marker_without_high_priority_stays_task() {
        let t = Task::new("t1", "lab work").with_description("🔬 routine bloodwork");
        assert_eq!(classify(&t).kind, ItemKind::Task);
    }

    #[test]
    fn social_marker_is_social_appointment_at_any_priority() {
        let t = Task::new("t2", "lunch").with_description("👥 lunch with John");
        let c = classify(&t);
        assert_eq!(c.kind, ItemKind::Appointment);
        assert!(c.is_social_visit);

        let fam = Task::new("t3", "visit")
            .with_description("👨‍👩‍👧‍👦 family visit")
            .with_priority(Priority::High);
        assert!(classify(&fam).is_social_visit);
    }

    #[test]
    fn social_marker_wins_over_medical_marker() {
        let t = Task::new("t4", "group therapy")
            .with_description("👥 group session 🧠")
            .with_priority(Priority::High);
        let c = classify(&t);
        assert_eq!(c.kind, ItemKind::Appointment);
        assert!(c.is_social_visit);
    }

    #[test]
    fn missing_description_never_errors() {
        let t = Task::new("t5", "untagged").with_priority(Priority::High);
        let c = classify(&t);
        assert_eq!(c.kind, ItemKind::Task);
        assert!(!c.is_social_visit);
    }

    #[test]
    fn classify_is_deterministic() {
        let t = Task::new("t6", "walk").with_description("👥 walk in the park");
        assert_eq!(classify(&t), classify(&t));
    }

    #[test]
    fn social_visits_share_one_color() {
        let social = Classification {
            kind: ItemKind::Appointment,
            is_social_visit: true,
        };
        let medical = Classification {
            kind: ItemKind::Appointment,
            is_social_visit: false,
        };
        assert_ne!(social.color(), medical.color());
        assert_ne!(Classification::medication().color(), medical.color());
    }
}
