//! Next-occurrence computation for daily and weekly local-time rules.
//!
//! Both functions return an instant strictly after `now_utc`: a reminder
//! whose local hour equals the current local hour counts as already past
//! and rolls over to the next cycle.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use chrono_tz::Tz;

use super::localtime::{local_date, local_time_to_utc};
use super::{ensure_hour, ensure_weekday, ScheduleError};

/// Next UTC instant at which a "daily at `hour_local`" rule fires in `tz`.
///
/// If the target hour is still ahead on the local calendar day the result
/// falls on that day, otherwise on local-tomorrow (derived by adding 24h
/// in UTC and re-resolving the local calendar date).
pub fn next_daily_utc(
    now_utc: DateTime<Utc>,
    tz: Tz,
    hour_local: u32,
) -> Result<DateTime<Utc>, ScheduleError> {
    ensure_hour("hourLocal", hour_local)?;

    let local_now = now_utc.with_timezone(&tz);
    let target_date = if local_now.hour() >= hour_local {
        local_date(now_utc + Duration::days(1), tz)
    } else {
        local_now.date_naive()
    };

    local_time_to_utc(target_date, hour_local, 0, tz)
}

/// Next UTC instant at which a "weekly at `weekday_local`/`hour_local`"
/// rule fires in `tz`. `weekday_local` is 0 = Sunday through 6 = Saturday.
pub fn next_weekly_utc(
    now_utc: DateTime<Utc>,
    tz: Tz,
    weekday_local: u32,
    hour_local: u32,
) -> Result<DateTime<Utc>, ScheduleError> {
    ensure_weekday(weekday_local)?;
    ensure_hour("hourLocal", hour_local)?;

    let local_now = now_utc.with_timezone(&tz);
    let local_weekday = local_now.weekday().num_days_from_sunday();

    let mut day_delta =
        i64::from(weekday_local as i32 - local_weekday as i32).rem_euclid(7);
    if day_delta == 0 && local_now.hour() >= hour_local {
        day_delta = 7;
    }

    let target_date = local_date(now_utc + Duration::days(day_delta), tz);
    local_time_to_utc(target_date, hour_local, 0, tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::resolve_timezone;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn new_york() -> Tz {
        resolve_timezone("America/New_York").unwrap()
    }

    // -----------------------------------------------------------------------
    // Daily
    // -----------------------------------------------------------------------

    #[test]
    fn daily_same_day_when_hour_still_ahead() {
        // 12:00 UTC = 08:00 EDT; 09:00 local is still ahead today.
        let at = next_daily_utc(utc(2024, 6, 10, 12, 0), new_york(), 9).unwrap();
        assert_eq!(at, utc(2024, 6, 10, 13, 0));
    }

    #[test]
    fn daily_rolls_over_when_hour_already_past() {
        // 08:00 local >= 07:00 target, so the reminder lands tomorrow.
        let at = next_daily_utc(utc(2024, 6, 10, 12, 0), new_york(), 7).unwrap();
        assert_eq!(at, utc(2024, 6, 11, 11, 0));
    }

    #[test]
    fn daily_equal_hour_counts_as_past() {
        // Exactly 08:00 local with an 8 o'clock rule fires tomorrow.
        let at = next_daily_utc(utc(2024, 6, 10, 12, 0), new_york(), 8).unwrap();
        assert_eq!(at, utc(2024, 6, 11, 12, 0));
    }

    #[test]
    fn daily_is_strictly_future_and_bounded() {
        let now = utc(2024, 6, 10, 12, 0);
        for tz_name in ["UTC", "America/New_York", "Asia/Tokyo", "Asia/Kolkata"] {
            let tz = resolve_timezone(tz_name).unwrap();
            for hour in 0..24 {
                let at = next_daily_utc(now, tz, hour).unwrap();
                assert!(at > now, "{tz_name} hour {hour}: not in the future");
                assert!(
                    at <= now + Duration::hours(24),
                    "{tz_name} hour {hour}: more than 24h out"
                );
            }
        }
    }

    #[test]
    fn daily_lands_on_local_hour_across_spring_forward() {
        // Evening before the US spring-forward transition; the next 09:00
        // local is on 2024-03-10, after clocks jumped to EDT.
        let at = next_daily_utc(utc(2024, 3, 10, 1, 0), new_york(), 9).unwrap();
        assert_eq!(at, utc(2024, 3, 10, 13, 0));
    }

    #[test]
    fn daily_lands_on_local_hour_across_fall_back() {
        // 20:00 EDT on 2024-11-02; the next 09:00 local is the following
        // morning, after clocks fell back to EST.
        let at = next_daily_utc(utc(2024, 11, 3, 0, 0), new_york(), 9).unwrap();
        assert_eq!(at, utc(2024, 11, 3, 14, 0));
    }

    #[test]
    fn daily_rejects_invalid_hour() {
        let err = next_daily_utc(utc(2024, 6, 10, 12, 0), new_york(), 24).unwrap_err();
        assert_matches!(err, ScheduleError::InvalidHour { value: 24, .. });
    }

    // -----------------------------------------------------------------------
    // Weekly
    // -----------------------------------------------------------------------

    #[test]
    fn weekly_same_day_when_hour_still_ahead() {
        // 2024-06-10 is a Monday; local now is 08:00, target Monday 18:00.
        let at = next_weekly_utc(utc(2024, 6, 10, 12, 0), new_york(), 1, 18).unwrap();
        assert_eq!(at, utc(2024, 6, 10, 22, 0));
    }

    #[test]
    fn weekly_wraps_to_next_week_when_hour_past() {
        // Monday 08:00 local with a Monday 07:00 rule fires next Monday.
        let at = next_weekly_utc(utc(2024, 6, 10, 12, 0), new_york(), 1, 7).unwrap();
        assert_eq!(at, utc(2024, 6, 17, 11, 0));
    }

    #[test]
    fn weekly_targets_earlier_weekday_of_next_week() {
        // Monday now, Sunday target: six days ahead.
        let at = next_weekly_utc(utc(2024, 6, 10, 12, 0), new_york(), 0, 9).unwrap();
        assert_eq!(at, utc(2024, 6, 16, 13, 0));
    }

    #[test]
    fn weekly_is_strictly_future_and_bounded() {
        let now = utc(2024, 6, 10, 12, 0);
        for tz_name in ["UTC", "America/New_York", "Asia/Tokyo"] {
            let tz = resolve_timezone(tz_name).unwrap();
            for weekday in 0..7 {
                for hour in [0, 9, 23] {
                    let at = next_weekly_utc(now, tz, weekday, hour).unwrap();
                    assert!(at > now, "{tz_name} weekday {weekday} hour {hour}");
                    assert!(
                        at <= now + Duration::days(7),
                        "{tz_name} weekday {weekday} hour {hour}: more than 7d out"
                    );
                }
            }
        }
    }

    #[test]
    fn weekly_rejects_invalid_weekday() {
        let err = next_weekly_utc(utc(2024, 6, 10, 12, 0), new_york(), 7, 9).unwrap_err();
        assert_matches!(err, ScheduleError::InvalidWeekday(7));
    }
}
