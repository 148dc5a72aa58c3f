//! Time bucketing: partition schedule items into the groups a screen shows.
//!
//! Membership depends on the view mode (today / pending / all); placement
//! within a view depends only on `now`. Terminal status always wins over
//! time-based placement.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::classify::ItemKind;
use crate::schedule::ScheduleItem;
use crate::time::{same_local_day, whole_minutes_between};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Today,
    Pending,
    All,
}

/// Proximity threshold separating "upcoming" from "later".
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BucketPolicy {
    pub proximity_minutes: i64,
}

impl Default for BucketPolicy {
    fn default() -> Self {
        Self { proximity_minutes: 30 }
    }
}

/// Ordered groups, each sorted by display time (ties broken by title).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buckets {
    /// Display time at or before `now`: overdue or due right now.
    pub due_now: Vec<ScheduleItem>,
    /// Display time within `(now, now + proximity]`.
    pub upcoming: Vec<ScheduleItem>,
    /// Beyond the proximity window, or nothing scheduled at all.
    pub later: Vec<ScheduleItem>,
    pub completed: Vec<ScheduleItem>,
}

impl Buckets {
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn total(&self) -> usize {
        self.due_now.len() + self.upcoming.len() + self.later.len() + self.completed.len()
    }
}

/// Partition `items` for one screen.
///
/// `tz` fixes what "the same calendar day as now" means for the today view.
pub fn bucket(
    items: &[ScheduleItem],
    now: DateTime<Utc>,
    view: ViewMode,
    tz: Tz,
    policy: BucketPolicy,
) -> Buckets {
    let mut out = Buckets::default();

    for item in items {
        if !included(item, now, view, tz) {
            continue;
        }
        if item.status.is_terminal() {
            out.completed.push(item.clone());
            continue;
        }
        match item.display_time() {
            // Closed lower bound: due exactly at `now` is due-now, not upcoming.
            Some(t) if t <= now => out.due_now.push(item.clone()),
            Some(t) if t <= now + Duration::minutes(policy.proximity_minutes) => {
                out.upcoming.push(item.clone())
            }
            Some(_) => out.later.push(item.clone()),
            // Open-ended with a past reminder lands in due_now via display_time;
            // an item with no time at all can only wait in later.
            None => out.later.push(item.clone()),
        }
    }

    for group in [
        &mut out.due_now,
        &mut out.upcoming,
        &mut out.later,
        &mut out.completed,
    ] {
        group.sort_by(|a, b| {
            let ka = (a.display_time(), &a.title);
            let kb = (b.display_time(), &b.title);
            match (ka.0, kb.0) {
                (Some(ta), Some(tb)) => ta.cmp(&tb).then_with(|| ka.1.cmp(kb.1)),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => ka.1.cmp(kb.1),
            }
        });
    }

    out
}

fn included(item: &ScheduleItem, now: DateTime<Utc>, view: ViewMode, tz: Tz) -> bool {
    match view {
        ViewMode::All => true,
        ViewMode::Today => {
            if let Some(t) = item.display_time() {
                if same_local_day(t, now, tz) {
                    return true;
                }
            }
            // Open-ended task already ticking: reminder in the past, no due date.
            if item.due.is_none() {
                if let Some(r) = item.reminder {
                    return r <= now;
                }
                return false;
            }
            // A reminder window that spans now keeps the item on today's list.
            match (item.reminder, item.due) {
                (Some(r), Some(d)) => r <= now && now <= d,
                _ => false,
            }
        }
        ViewMode::Pending => {
            if item.classification.kind == ItemKind::Appointment {
                return false;
            }
            if item.status.is_terminal() {
                return false;
            }
            match (item.reminder, item.due) {
                (Some(r), _) if r > now => true,
                (_, None) => true,
                (_, Some(d)) => d > now,
            }
        }
    }
}

/// Human label for how far an item is from `now`: "12 min late", "due now",
/// or "in 5 min". Minutes are the floor of the millisecond delta, never a
/// bare signless "0 min".
pub fn minutes_label(t: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let mins = whole_minutes_between(t, now);
    if t < now && mins > 0 {
        format!("{mins} min late")
    } else if t > now && mins > 0 {
        format!("in {mins} min")
    } else {
        "due now".to_string()
    }
}
