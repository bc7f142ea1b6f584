//! Business-timezone arithmetic and display formatting.
//!
//! Every duration on the dashboard is computed in the fixed business
//! timezone (America/Sao_Paulo). Timestamps arriving from the operational
//! store are either typed (entry dates) or raw text (the two exit columns,
//! which historically carry free-form values); raw cells that fail to parse
//! become `None` for that row only and never abort a batch.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// Fixed business timezone for all yard arithmetic.
pub const BUSINESS_TZ: Tz = chrono_tz::America::Sao_Paulo;

/// Layouts accepted for the text-typed exit columns, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Date-only layouts; these resolve to midnight local time.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Attach the business timezone to a naive local timestamp.
///
/// Ambiguous local times (offset transitions) resolve to their earliest
/// valid interpretation; nonexistent ones become `None`, the same bucket as
/// a parse failure.
pub fn localize(naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    BUSINESS_TZ.from_local_datetime(&naive).earliest()
}

/// Parse a raw timestamp cell into the business timezone.
///
/// Inputs carrying their own offset pass through converted; naive inputs are
/// localized. Anything unparseable is `None` — per-cell, never an error.
pub fn parse_to_business(raw: &str) -> Option<DateTime<Tz>> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(zoned) = DateTime::parse_from_rfc3339(value) {
        return Some(zoned.with_timezone(&BUSINESS_TZ));
    }

    if let Some(naive) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    {
        return localize(naive);
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(localize)
}

/// Render a timestamp the way the dashboard table shows dates.
pub fn display_date(dt: DateTime<Tz>) -> String {
    dt.format("%d/%m/%y %H:%M").to_string()
}

/// Human-readable signed duration: "1h 30min", "2h", "45min", "0min".
///
/// Negative durations keep their sign on the whole rendering, including the
/// sub-minute case ("-0min" means late by less than a minute).
pub fn format_duration(total_secs: i64) -> String {
    let sinal = if total_secs < 0 { "-" } else { "" };
    let abs = total_secs.unsigned_abs();
    let horas = abs / 3600;
    let minutos = (abs % 3600) / 60;

    if horas > 0 && minutos > 0 {
        format!("{sinal}{horas}h {minutos}min")
    } else if horas > 0 {
        format!("{sinal}{horas}h")
    } else if minutos > 0 {
        format!("{sinal}{minutos}min")
    } else {
        format!("{sinal}0min")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parse_iso_datetime() {
        let dt = parse_to_business("2024-08-01 14:30:00").unwrap();
        assert_eq!(dt.hour(), 14);
        assert_eq!(dt.minute(), 30);
        assert_eq!(dt.timezone(), BUSINESS_TZ);
    }

    #[test]
    fn parse_fractional_seconds() {
        let dt = parse_to_business("2024-08-01 14:30:00.123456").unwrap();
        assert_eq!(dt.second(), 0);
    }

    #[test]
    fn parse_brazilian_layout() {
        let dt = parse_to_business("01/08/2024 14:30").unwrap();
        assert_eq!(display_date(dt), "01/08/24 14:30");
    }

    #[test]
    fn parse_date_only_resolves_to_midnight() {
        let dt = parse_to_business("2024-08-01").unwrap();
        assert_eq!(dt.hour(), 0);
        assert_eq!(dt.minute(), 0);
    }

    #[test]
    fn parse_rfc3339_converts_offset() {
        // 12:00 UTC is 09:00 in São Paulo (UTC-3, no DST since 2019).
        let dt = parse_to_business("2024-08-01T12:00:00Z").unwrap();
        assert_eq!(dt.hour(), 9);
    }

    #[test]
    fn parse_garbage_is_none() {
        assert!(parse_to_business("not a date").is_none());
        assert!(parse_to_business("").is_none());
        assert!(parse_to_business("   ").is_none());
        assert!(parse_to_business("32/13/2024 99:99").is_none());
    }

    #[test]
    fn localize_plain_timestamp() {
        let naive = NaiveDate::from_ymd_opt(2024, 8, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let dt = localize(naive).unwrap();
        assert_eq!(dt.naive_local(), naive);
    }

    #[test]
    fn localize_nonexistent_dst_gap_is_none() {
        // DST started 2018-11-04 in São Paulo: clocks jumped from 00:00
        // straight to 01:00, so 00:30 never existed that day.
        let naive = NaiveDate::from_ymd_opt(2018, 11, 4)
            .unwrap()
            .and_hms_opt(0, 30, 0)
            .unwrap();
        assert!(localize(naive).is_none());
    }

    #[test]
    fn localize_ambiguous_dst_end_takes_earliest() {
        // DST ended 2018-02-17/18 at midnight: 23:30 on the 17th happened
        // twice. The earliest interpretation (still on DST, UTC-2) wins.
        let naive = NaiveDate::from_ymd_opt(2018, 2, 17)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap();
        let dt = localize(naive).unwrap();
        assert_eq!(dt.naive_local(), naive);
    }

    #[test]
    fn format_duration_hours_and_minutes() {
        assert_eq!(format_duration(3661), "1h 1min");
        assert_eq!(format_duration(5400), "1h 30min");
    }

    #[test]
    fn format_duration_whole_hours() {
        assert_eq!(format_duration(7200), "2h");
    }

    #[test]
    fn format_duration_minutes_only() {
        assert_eq!(format_duration(2700), "45min");
    }

    #[test]
    fn format_duration_sub_minute() {
        assert_eq!(format_duration(59), "0min");
        assert_eq!(format_duration(0), "0min");
    }

    #[test]
    fn format_duration_negative() {
        assert_eq!(format_duration(-5), "-0min");
        assert_eq!(format_duration(-3661), "-1h 1min");
        assert_eq!(format_duration(-7200), "-2h");
        assert_eq!(format_duration(-120), "-2min");
    }
}
