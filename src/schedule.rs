use crate::models::Settings;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Timelike};

// Inclusive at both ends. A start later than the end wraps past midnight.
pub fn is_within_schedule<T: Timelike>(at: &T, settings: &Settings) -> bool {
    let current = at.hour() * 60 + at.minute();
    let start = settings.wake_start.minutes();
    let end = settings.wake_end.minutes();

    if start <= end {
        current >= start && current <= end
    } else {
        current >= start || current <= end
    }
}

/// Ambiguous times (clocks turned back) take the earlier instant. Times that
/// do not exist (clocks turned forward) move one hour later.
pub fn at_local_time<Tz: TimeZone>(tz: &Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Tz>> {
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
}

pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    at_local_time(&now.timezone(), now.date_naive(), NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeOfDay;

    fn window(start: &str, end: &str) -> Settings {
        Settings {
            wake_start: start.parse().unwrap(),
            wake_end: end.parse().unwrap(),
            ..Settings::default()
        }
    }

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn plain_window_matches_closed_interval() {
        let settings = window("07:00", "22:00");
        for minutes in 0..24 * 60 {
            let time = at(minutes / 60, minutes % 60);
            let expected = (7 * 60..=22 * 60).contains(&minutes);
            assert_eq!(is_within_schedule(&time, &settings), expected, "at {time}");
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let settings = window("07:00", "22:00");
        assert!(is_within_schedule(&at(7, 0), &settings));
        assert!(is_within_schedule(&at(22, 0), &settings));
        assert!(is_within_schedule(&NaiveTime::from_hms_opt(22, 0, 59).unwrap(), &settings));
        assert!(!is_within_schedule(&at(22, 1), &settings));
        assert!(!is_within_schedule(&at(6, 59), &settings));
    }

    #[test]
    fn wrapping_window_spans_midnight() {
        let settings = window("22:00", "06:00");
        assert!(is_within_schedule(&at(23, 0), &settings));
        assert!(is_within_schedule(&at(5, 0), &settings));
        assert!(is_within_schedule(&at(0, 0), &settings));
        assert!(!is_within_schedule(&at(12, 0), &settings));
        assert!(!is_within_schedule(&at(6, 1), &settings));
    }

    #[test]
    fn start_of_day_is_local_midnight() {
        let tz = chrono::FixedOffset::east_opt(7 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2026, 1, 5, 0, 30, 0).unwrap();
        let midnight = start_of_day(&now).unwrap();
        assert_eq!(midnight, tz.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap());
    }

    #[test]
    fn single_minute_window() {
        let mut settings = Settings::default();
        settings.wake_start = TimeOfDay::new(9, 30).unwrap();
        settings.wake_end = TimeOfDay::new(9, 30).unwrap();
        assert!(is_within_schedule(&at(9, 30), &settings));
        assert!(!is_within_schedule(&at(9, 31), &settings));
    }
}
