//! Time helpers: schedule-time parsing and timezone-aware day math.

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Parse a medication schedule time like "08:00".
pub fn parse_schedule_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|e| anyhow::anyhow!("invalid schedule time '{s}': {e}"))
}

/// Inclusive run of calendar days from `start` to `end`. Empty when the
/// window is inverted.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut d = start;
    while d <= end {
        out.push(d);
        match d.succ_opt() {
            Some(next) => d = next,
            None => break,
        }
    }
    out
}

/// Resolve a local wall-clock instant to UTC. Returns `None` for times a DST
/// gap removes; ambiguous times resolve to the earlier offset.
pub fn local_to_utc(date: NaiveDate, time: NaiveTime, tz: Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Milliseconds since the Unix epoch, the id component of medication
/// occurrences.
pub fn epoch_millis(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

/// Do two instants fall on the same calendar day in `tz`?
pub fn same_local_day(a: DateTime<Utc>, b: DateTime<Utc>, tz: Tz) -> bool {
    a.with_timezone(&tz).date_naive() == b.with_timezone(&tz).date_naive()
}

/// Whole minutes between two instants, floored toward zero on the
/// millisecond delta.
pub fn whole_minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_milliseconds().abs() / 60_000
}

/// Local calendar day of `now` in `tz`.
pub fn local_day(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Offset `date` by `days`, saturating at the calendar's edge.
pub fn day_offset(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days)).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Chicago;

    #[test]
    fn parses_schedule_times() {
        assert_eq!(
            parse_schedule_time("08:00").unwrap(),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap()
        );
        assert!(parse_schedule_time("8am").is_err());
        assert!(parse_schedule_time("25:00").is_err());
    }

    #[test]
    fn days_inclusive_covers_both_ends() {
        let s = NaiveDate::from_ymd_opt(2024, 1, 30).unwrap();
        let e = NaiveDate::from_ymd_opt(2024, 2, 2).unwrap();
        let days = days_inclusive(s, e);
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], s);
        assert_eq!(days[3], e);

        assert!(days_inclusive(e, s).is_empty());
    }

    #[test]
    fn chicago_morning_resolves_to_utc() {
        // January is CST (UTC-6).
        let dt = local_to_utc(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            Chicago,
        )
        .unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-01T14:00:00+00:00");
    }

    #[test]
    fn dst_gap_time_is_skipped() {
        // 2024-03-10 02:30 does not exist in Chicago.
        let dt = local_to_utc(
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            NaiveTime::from_hms_opt(2, 30, 0).unwrap(),
            Chicago,
        );
        assert!(dt.is_none());
    }

    #[test]
    fn minutes_between_floors_on_milliseconds() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let b = a + Duration::seconds(119);
        assert_eq!(whole_minutes_between(a, b), 1);
        assert_eq!(whole_minutes_between(b, a), 1);
        assert_eq!(whole_minutes_between(a, a), 0);
    }
}
