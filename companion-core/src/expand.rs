//! Occurrence expansion: recurring-task templates and medication schedules
//! projected onto a date window.
//!
//! Both expansions are pure and idempotent: the same inputs and window
//! always produce byte-identical ids and timestamps, which the screens rely
//! on for stable list diffing across refetches.

use chrono::{Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::model::{Medication, Recurrence, Task, TaskStatus, virtual_task_id};
use crate::schedule::{ItemStatus, ScheduleItem, dose_item_id};
use crate::classify::Classification;
use crate::time::{days_inclusive, local_to_utc, parse_schedule_time};

/// Expand an active medication's daily `HH:MM` times over every local
/// calendar day in `[window_start, window_end]`.
///
/// Inactive medications expand to nothing. Unparseable schedule times and
/// local times removed by a DST gap are skipped rather than guessed at.
pub fn expand_medication(
    med: &Medication,
    window_start: NaiveDate,
    window_end: NaiveDate,
    tz: Tz,
) -> Vec<ScheduleItem> {
    if !med.is_active {
        return Vec::new();
    }

    let mut times: Vec<NaiveTime> = med
        .schedule_times
        .iter()
        .filter_map(|s| parse_schedule_time(s).ok())
        .collect();
    times.sort();
    times.dedup();

    let mut out = Vec::new();
    for day in days_inclusive(window_start, window_end) {
        for &t in &times {
            let Some(scheduled) = local_to_utc(day, t, tz) else {
                continue;
            };
            out.push(ScheduleItem {
                id: dose_item_id(&med.id, scheduled),
                classification: Classification::medication(),
                title: med.name.clone(),
                description: Some(med.dosage.clone()),
                assigned_to: None,
                due: Some(scheduled),
                reminder: None,
                status: ItemStatus::Pending,
            });
        }
    }
    out
}

/// Expand a recurrence template into virtual occurrences over the window.
///
/// Each occurrence carries the template's display fields, but its own
/// `due_date`/`virtual_date` is the projected date; the template's original
/// due date only contributes the anchor day and the time of day.
pub fn expand_recurring_task(
    template: &Task,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Vec<Task> {
    let Some(rule) = &template.recurrence else {
        return Vec::new();
    };
    if !template.is_recurrence_template {
        return Vec::new();
    }

    let anchor_dt = template.due_date.or(template.reminder_date);
    let anchor = anchor_dt
        .map(|dt| dt.date_naive())
        .unwrap_or(window_start);
    let time_of_day = anchor_dt
        .map(|dt| dt.time())
        .unwrap_or_else(|| NaiveTime::MIN);

    let first = anchor.max(window_start);
    let mut out = Vec::new();
    for day in days_inclusive(first, window_end) {
        if !rule_matches(rule, anchor, day) {
            continue;
        }
        let occurs_at = Utc.from_utc_datetime(&day.and_time(time_of_day));
        out.push(Task {
            id: virtual_task_id(&template.id, day),
            title: template.title.clone(),
            description: template.description.clone(),
            priority: template.priority,
            status: TaskStatus::Pending,
            due_date: Some(occurs_at),
            reminder_date: None,
            assigned_to_id: template.assigned_to_id.clone(),
            parent_task_id: Some(template.id.clone()),
            is_recurrence_template: false,
            is_virtual: true,
            virtual_date: Some(occurs_at),
            recurrence: None,
        });
    }
    out
}

fn rule_matches(rule: &Recurrence, anchor: NaiveDate, day: NaiveDate) -> bool {
    match rule {
        Recurrence::Daily => true,
        Recurrence::EveryNDays { n } => {
            *n > 0 && (day - anchor).num_days().rem_euclid(i64::from(*n)) == 0
        }
        Recurrence::Weekly { weekdays } => {
            if weekdays.is_empty() {
                day.weekday() == anchor.weekday()
            } else {
                weekdays.contains(&day.weekday())
            }
        }
        Recurrence::Monthly { day: dom } => day.day() == *dom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use chrono_tz::America::Chicago;
    use chrono_tz::UTC;

    fn med(times: &[&str]) -> Medication {
        Medication {
            id: "m1".to_string(),
            name: "Metformin".to_string(),
            dosage: "500mg".to_string(),
            schedule_times: times.iter().map(|s| s.to_string()).collect(),
            is_active: true,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn two_dose_single_day_expansion() {
        let occ = expand_medication(&med(&["08:00", "20:00"]), day(2024, 1, 1), day(2024, 1, 1), UTC);
        assert_eq!(occ.len(), 2);
        assert_eq!(occ[0].id, "med-m1-1704096000000");
        assert_eq!(occ[1].id, "med-m1-1704139200000");
        assert_eq!(occ[0].due.unwrap().to_rfc3339(), "2024-01-01T08:00:00+00:00");
        assert_eq!(occ[1].due.unwrap().to_rfc3339(), "2024-01-01T20:00:00+00:00");
    }

    #[test]
    fn expansion_is_idempotent() {
        let m = med(&["20:00", "08:00"]);
        let a = expand_medication(&m, day(2024, 1, 1), day(2024, 1, 3), Chicago);
        let b = expand_medication(&m, day(2024, 1, 1), day(2024, 1, 3), Chicago);
        assert_eq!(a, b);
        // 2 times x 3 days, chronological.
        assert_eq!(a.len(), 6);
        for w in a.windows(2) {
            assert!(w[0].due.unwrap() < w[1].due.unwrap());
        }
    }

    #[test]
    fn inactive_medication_expands_to_nothing() {
        let mut m = med(&["08:00"]);
        m.is_active = false;
        assert!(expand_medication(&m, day(2024, 1, 1), day(2024, 1, 7), UTC).is_empty());
    }

    #[test]
    fn bad_schedule_times_are_skipped() {
        let occ = expand_medication(&med(&["08:00", "noonish"]), day(2024, 1, 1), day(2024, 1, 1), UTC);
        assert_eq!(occ.len(), 1);
    }

    #[test]
    fn dst_gap_dose_is_skipped_not_shifted() {
        // 02:30 does not exist on 2024-03-10 in Chicago.
        let occ = expand_medication(&med(&["02:30"]), day(2024, 3, 9), day(2024, 3, 11), Chicago);
        assert_eq!(occ.len(), 2);
    }

    fn template(rule: Recurrence, due: &str) -> Task {
        Task::new("tpl1", "Evening walk")
            .with_description("👥 walk with grandpa")
            .with_due(due.parse().unwrap())
            .with_recurrence(rule)
    }

    #[test]
    fn daily_template_fills_the_window() {
        let tpl = template(Recurrence::Daily, "2024-01-01T17:00:00Z");
        let occ = expand_recurring_task(&tpl, day(2024, 1, 3), day(2024, 1, 5));
        assert_eq!(occ.len(), 3);
        assert_eq!(occ[0].id, "tpl1_virtual_2024-01-03");
        assert!(occ.iter().all(|t| t.is_virtual));
        assert!(occ.iter().all(|t| t.parent_task_id.as_deref() == Some("tpl1")));
        // Occurrence due date is the projected date at the template's time.
        assert_eq!(occ[0].due_date.unwrap().to_rfc3339(), "2024-01-03T17:00:00+00:00");
        assert_eq!(occ[0].virtual_date, occ[0].due_date);
    }

    #[test]
    fn occurrences_are_monotonic_and_inside_the_window() {
        let tpl = template(Recurrence::EveryNDays { n: 3 }, "2024-01-01T09:00:00Z");
        let start = day(2024, 1, 2);
        let end = day(2024, 1, 31);
        let occ = expand_recurring_task(&tpl, start, end);
        assert!(!occ.is_empty());
        for w in occ.windows(2) {
            assert!(w[0].virtual_date.unwrap() < w[1].virtual_date.unwrap());
        }
        for t in &occ {
            let d = t.virtual_date.unwrap().date_naive();
            assert!(d >= start && d <= end);
        }
        // Anchored at Jan 1: 4th, 7th, 10th, ...
        assert_eq!(occ[0].id, "tpl1_virtual_2024-01-04");
    }

    #[test]
    fn weekly_rule_honors_listed_weekdays() {
        let tpl = template(
            Recurrence::Weekly { weekdays: vec![Weekday::Mon, Weekday::Thu] },
            "2024-01-01T10:00:00Z",
        );
        let occ = expand_recurring_task(&tpl, day(2024, 1, 1), day(2024, 1, 14));
        assert_eq!(occ.len(), 4);
        for t in &occ {
            let wd = t.virtual_date.unwrap().date_naive().weekday();
            assert!(wd == Weekday::Mon || wd == Weekday::Thu);
        }
    }

    #[test]
    fn monthly_day_31_skips_short_months() {
        let tpl = template(Recurrence::Monthly { day: 31 }, "2024-01-31T08:00:00Z");
        let occ = expand_recurring_task(&tpl, day(2024, 1, 1), day(2024, 4, 30));
        // Jan 31 and Mar 31; February has no 31st and is skipped, not clamped.
        let days: Vec<String> = occ
            .iter()
            .map(|t| t.virtual_date.unwrap().date_naive().to_string())
            .collect();
        assert_eq!(days, vec!["2024-01-31", "2024-03-31"]);
    }

    #[test]
    fn non_template_tasks_expand_to_nothing() {
        let plain = Task::new("t9", "one-off").with_due("2024-01-01T09:00:00Z".parse().unwrap());
        assert!(expand_recurring_task(&plain, day(2024, 1, 1), day(2024, 1, 31)).is_empty());
    }
}
