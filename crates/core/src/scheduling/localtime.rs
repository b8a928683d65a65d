//! Wall-clock resolution in a named IANA timezone.
//!
//! [`utc_to_local_fields`] observes a UTC instant as local calendar
//! fields; [`local_time_to_utc`] goes the other way. The tz database is
//! the one bundled by `chrono-tz`.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Offset, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use super::ScheduleError;

/// Wall-clock fields for an instant as observed in some timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalFields {
    pub year: i32,
    /// 1-based month.
    pub month: u32,
    /// 1-based day of month.
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// 0 = Sunday through 6 = Saturday.
    pub weekday: u32,
}

/// Resolve an IANA timezone name (e.g. `"America/New_York"`).
pub fn resolve_timezone(name: &str) -> Result<Tz, ScheduleError> {
    name.parse()
        .map_err(|_| ScheduleError::InvalidTimezone(name.to_string()))
}

/// Observe a UTC instant as wall-clock fields in `tz`.
pub fn utc_to_local_fields(instant: DateTime<Utc>, tz: Tz) -> LocalFields {
    let local = instant.with_timezone(&tz);
    LocalFields {
        year: local.year(),
        month: local.month(),
        day: local.day(),
        hour: local.hour(),
        minute: local.minute(),
        second: local.second(),
        weekday: local.weekday().num_days_from_sunday(),
    }
}

/// The local calendar date of a UTC instant as observed in `tz`.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Convert a local wall-clock time in `tz` to the corresponding UTC
/// instant.
///
/// Two-pass approximation: the fields are first treated as UTC to form a
/// guess instant, the timezone's real offset at that guess is looked up,
/// and the offset is then subtracted from the intended local time. Within
/// the hour that a DST transition skips or repeats this can land on the
/// wrong side of the change; at daily/weekly reminder granularity that is
/// tolerated.
pub fn local_time_to_utc(
    date: NaiveDate,
    hour: u32,
    minute: u32,
    tz: Tz,
) -> Result<DateTime<Utc>, ScheduleError> {
    let intended = date
        .and_hms_opt(hour, minute, 0)
        .ok_or(ScheduleError::InvalidHour {
            field: "hour",
            value: hour,
        })?;

    let offset_secs = tz.offset_from_utc_datetime(&intended).fix().local_minus_utc();
    Ok(Utc.from_utc_datetime(&intended) - Duration::seconds(i64::from(offset_secs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn resolve_known_timezone() {
        assert!(resolve_timezone("America/New_York").is_ok());
        assert!(resolve_timezone("UTC").is_ok());
        assert!(resolve_timezone("Asia/Kolkata").is_ok());
    }

    #[test]
    fn resolve_unknown_timezone_fails() {
        let err = resolve_timezone("Not/AZone").unwrap_err();
        assert_matches!(err, ScheduleError::InvalidTimezone(name) if name == "Not/AZone");
    }

    #[test]
    fn observes_new_york_summer_offset() {
        // 12:00 UTC in June is 08:00 EDT (UTC-4).
        let tz = resolve_timezone("America/New_York").unwrap();
        let fields = utc_to_local_fields(utc(2024, 6, 10, 12, 0), tz);
        assert_eq!(fields.year, 2024);
        assert_eq!(fields.month, 6);
        assert_eq!(fields.day, 10);
        assert_eq!(fields.hour, 8);
        assert_eq!(fields.minute, 0);
        // 2024-06-10 is a Monday.
        assert_eq!(fields.weekday, 1);
    }

    #[test]
    fn observes_half_hour_offset() {
        // Asia/Kolkata is UTC+5:30 year-round.
        let tz = resolve_timezone("Asia/Kolkata").unwrap();
        let fields = utc_to_local_fields(utc(2024, 6, 10, 12, 0), tz);
        assert_eq!(fields.hour, 17);
        assert_eq!(fields.minute, 30);
    }

    #[test]
    fn local_midnight_crosses_date_line() {
        // 23:00 UTC on the 10th is already the 11th in Tokyo (UTC+9).
        let tz = resolve_timezone("Asia/Tokyo").unwrap();
        let fields = utc_to_local_fields(utc(2024, 6, 10, 23, 0), tz);
        assert_eq!(fields.day, 11);
        assert_eq!(fields.hour, 8);
    }

    #[test]
    fn converts_local_time_back_to_utc() {
        let tz = resolve_timezone("America/New_York").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let at = local_time_to_utc(date, 9, 0, tz).unwrap();
        assert_eq!(at, utc(2024, 6, 10, 13, 0));
    }

    #[test]
    fn converts_across_spring_forward() {
        // US DST started 2024-03-10 at 02:00 local; 09:00 is past the gap
        // and must resolve against the new EDT offset.
        let tz = resolve_timezone("America/New_York").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let at = local_time_to_utc(date, 9, 0, tz).unwrap();
        assert_eq!(at, utc(2024, 3, 10, 13, 0));
    }

    #[test]
    fn converts_across_fall_back() {
        // US DST ended 2024-11-03 at 02:00 local; 09:00 resolves as EST.
        let tz = resolve_timezone("America/New_York").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 11, 3).unwrap();
        let at = local_time_to_utc(date, 9, 0, tz).unwrap();
        assert_eq!(at, utc(2024, 11, 3, 14, 0));
    }

    #[test]
    fn utc_round_trip_is_identity() {
        let tz = resolve_timezone("UTC").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let at = local_time_to_utc(date, 7, 30, tz).unwrap();
        assert_eq!(at, utc(2024, 6, 10, 7, 30));
    }

    #[test]
    fn rejects_out_of_range_hour() {
        let tz = resolve_timezone("UTC").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let err = local_time_to_utc(date, 24, 0, tz).unwrap_err();
        assert_matches!(err, ScheduleError::InvalidHour { value: 24, .. });
    }
}
