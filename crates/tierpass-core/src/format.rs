//! Display helpers for event dates.

use chrono::{DateTime, Utc};

const DAY_MS: i64 = 86_400_000;

/// Long form date, e.g. "Sunday, March 1, 2026 at 06:30 PM" (UTC)
pub fn format_event_date(date: DateTime<Utc>) -> String {
    date.format("%A, %B %-d, %Y at %I:%M %p").to_string()
}

/// Whole days from `now` until `date`, rounded up
pub fn days_until(date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let diff_ms = (date - now).num_milliseconds();
    -((-diff_ms).div_euclid(DAY_MS))
}

/// Coarse label for how far away an event is
pub fn relative_time(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = days_until(date, now);
    match days {
        d if d < 0 => "Past event".to_string(),
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        d if d < 7 => format!("In {} days", d),
        d if d < 30 => plural(d / 7, "week"),
        d => plural(d / 30, "month"),
    }
}

fn plural(n: i64, unit: &str) -> String {
    format!("In {} {}{}", n, unit, if n > 1 { "s" } else { "" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_format_event_date() {
        let date = Utc.with_ymd_and_hms(2026, 3, 1, 18, 30, 0).unwrap();
        assert_eq!(format_event_date(date), "Sunday, March 1, 2026 at 06:30 PM");
    }

    #[test]
    fn test_days_until_rounds_up() {
        assert_eq!(days_until(now() + Duration::milliseconds(1), now()), 1);
        assert_eq!(days_until(now(), now()), 0);
        assert_eq!(days_until(now() - Duration::milliseconds(1), now()), 0);
        assert_eq!(days_until(now() - Duration::hours(25), now()), -1);
    }

    #[test]
    fn test_relative_labels() {
        let at = |d: Duration| relative_time(now() + d, now());
        assert_eq!(at(Duration::days(-2)), "Past event");
        assert_eq!(at(Duration::zero()), "Today");
        assert_eq!(at(Duration::hours(3)), "Tomorrow");
        assert_eq!(at(Duration::days(4)), "In 4 days");
        assert_eq!(at(Duration::days(7)), "In 1 week");
        assert_eq!(at(Duration::days(20)), "In 2 weeks");
        assert_eq!(at(Duration::days(30)), "In 1 month");
        assert_eq!(at(Duration::days(95)), "In 3 months");
    }
}
