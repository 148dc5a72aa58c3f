use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use companion_core::{Buckets, ItemStatus, ScheduleItem, minutes_label, parse_description};

/// Print one derived schedule, grouped the way the app's screens group it.
pub fn print_buckets(buckets: &Buckets, now: DateTime<Utc>, tz: Tz) {
    if buckets.is_empty() {
        println!("Nothing on the schedule for this view.");
        return;
    }

    print_group("Due now", &buckets.due_now, now, tz);
    print_group("Coming up", &buckets.upcoming, now, tz);
    print_group("Later", &buckets.later, now, tz);
    print_group("Completed", &buckets.completed, now, tz);
}

fn print_group(heading: &str, items: &[ScheduleItem], now: DateTime<Utc>, tz: Tz) {
    if items.is_empty() {
        return;
    }
    println!("## {heading} ({})\n", items.len());
    for item in items {
        println!("{}", item_line(item, now, tz));
    }
    println!();
}

fn item_line(item: &ScheduleItem, now: DateTime<Utc>, tz: Tz) -> String {
    let when = match item.display_time() {
        Some(t) => format!(
            "{} ({})",
            t.with_timezone(&tz).format("%a %H:%M"),
            minutes_label(t, now)
        ),
        None => "anytime".to_string(),
    };

    let mut line = format!(
        "- [{:?}] {} | {}",
        item.classification.kind, item.title, when
    );

    if item.classification.is_social_visit {
        line.push_str(" | social visit");
    }
    if let Some(desc) = &item.description {
        let meta = parse_description(desc);
        if let Some(with) = meta.companion {
            line.push_str(&format!(" | with {with}"));
        }
        if let Some(loc) = meta.location {
            line.push_str(&format!(" | at {loc}"));
        }
    }
    match item.status {
        ItemStatus::Pending => {}
        other => line.push_str(&format!(" | {other:?}")),
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use chrono_tz::UTC;
    use companion_core::{Classification, ItemKind};

    #[test]
    fn line_includes_kind_label_and_description_meta() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let item = ScheduleItem {
            id: "t1".to_string(),
            classification: Classification {
                kind: ItemKind::Appointment,
                is_social_visit: false,
            },
            title: "Dr. Smith follow-up".to_string(),
            description: Some("🏥 with Dr. Smith\n📍 Clinic".to_string()),
            assigned_to: None,
            due: Some(now + Duration::minutes(5)),
            reminder: None,
            status: ItemStatus::Pending,
        };
        let line = item_line(&item, now, UTC);
        assert!(line.contains("Appointment"));
        assert!(line.contains("in 5 min"));
        assert!(line.contains("with Dr. Smith"));
        assert!(line.contains("at Clinic"));
    }

    #[test]
    fn untimed_item_reads_anytime() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let item = ScheduleItem {
            id: "t2".to_string(),
            classification: Classification {
                kind: ItemKind::Task,
                is_social_visit: false,
            },
            title: "Sort mail".to_string(),
            description: None,
            assigned_to: None,
            due: None,
            reminder: None,
            status: ItemStatus::Pending,
        };
        assert!(item_line(&item, now, UTC).contains("anytime"));
    }
}
