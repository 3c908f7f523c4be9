//! Scan schedules.
//!
//! Two forms:
//! - `"every N minutes"` / `"every N hours"` (singular units accepted)
//! - 5-field cron `"MIN HOUR DOM MON DOW"`; minute and hour take `*`, `*/N`,
//!   `N`, or `a,b,c`; the day fields must be `*`.

use chrono::{DateTime, Duration, Timelike, Utc};
use std::fmt;

use choresync_core::error::{ChoreSyncError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    /// Fixed period between cycles.
    Every(Duration),
    /// Wall-clock minute/hour matching.
    Cron {
        expression: String,
        minutes: Vec<u32>,
        hours: Vec<u32>,
    },
}

impl Schedule {
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if let Some(rest) = spec.strip_prefix("every ") {
            return parse_every(rest).ok_or_else(|| {
                ChoreSyncError::Config(format!(
                    "Invalid schedule '{spec}' (expected 'every N minutes|hours')"
                ))
            });
        }
        parse_cron(spec)
    }

    /// Hourly, the default reminder cadence.
    pub fn hourly() -> Self {
        Schedule::Every(Duration::hours(1))
    }

    /// Next fire time strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Schedule::Every(period) => after.checked_add_signed(*period),
            Schedule::Cron { minutes, hours, .. } => {
                let mut candidate = after.checked_add_signed(Duration::minutes(1))?;
                candidate = candidate
                    .with_second(0)
                    .and_then(|c| c.with_nanosecond(0))
                    .unwrap_or(candidate);

                // Every minute/hour combination recurs within a day.
                for _ in 0..(48 * 60) {
                    if minutes.contains(&candidate.minute()) && hours.contains(&candidate.hour()) {
                        return Some(candidate);
                    }
                    candidate = candidate.checked_add_signed(Duration::minutes(1))?;
                }
                None
            }
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::Every(period) => {
                let mins = period.num_minutes();
                if mins % 60 == 0 {
                    write!(f, "every {} hours", mins / 60)
                } else {
                    write!(f, "every {mins} minutes")
                }
            }
            Schedule::Cron { expression, .. } => write!(f, "cron '{expression}'"),
        }
    }
}

fn parse_every(rest: &str) -> Option<Schedule> {
    let mut parts = rest.split_whitespace();
    let n: i64 = parts.next()?.parse().ok()?;
    let unit = parts.next()?;
    if parts.next().is_some() || n <= 0 {
        return None;
    }
    let period = match unit {
        "minute" | "minutes" | "min" | "mins" => Duration::try_minutes(n)?,
        "hour" | "hours" => Duration::try_hours(n)?,
        _ => return None,
    };
    Some(Schedule::Every(period))
}

fn parse_cron(expression: &str) -> Result<Schedule> {
    let parts: Vec<&str> = expression.split_whitespace().collect();
    if parts.len() != 5 {
        return Err(ChoreSyncError::Config(format!(
            "Invalid cron expression '{expression}' (need 5 fields: MIN HOUR DOM MON DOW)"
        )));
    }
    if parts[2..].iter().any(|p| *p != "*") {
        return Err(ChoreSyncError::Config(format!(
            "Cron expression '{expression}': day-of-month, month and day-of-week must be '*'"
        )));
    }

    let minutes = parse_field(parts[0], 0, 59).ok_or_else(|| {
        ChoreSyncError::Config(format!("Cron expression '{expression}': bad minute field"))
    })?;
    let hours = parse_field(parts[1], 0, 23).ok_or_else(|| {
        ChoreSyncError::Config(format!("Cron expression '{expression}': bad hour field"))
    })?;

    Ok(Schedule::Cron {
        expression: expression.to_string(),
        minutes,
        hours,
    })
}

/// Parse a cron field into a list of matching values.
fn parse_field(field: &str, min: u32, max: u32) -> Option<Vec<u32>> {
    if field == "*" {
        return Some((min..=max).collect());
    }

    // */N: every N
    if let Some(step) = field.strip_prefix("*/") {
        let n: u32 = step.parse().ok()?;
        if n == 0 {
            return None;
        }
        return Some((min..=max).step_by(n as usize).collect());
    }

    // Comma-separated: "0,15,30,45"; one bad entry rejects the field
    if field.contains(',') {
        let vals: Vec<u32> = field
            .split(',')
            .map(|s| s.trim().parse())
            .collect::<std::result::Result<_, _>>()
            .ok()?;
        if vals.iter().any(|x| *x < min || *x > max) {
            return None;
        }
        return Some(vals);
    }

    // Single number
    let n: u32 = field.parse().ok()?;
    if n >= min && n <= max {
        Some(vec![n])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_every_hours() {
        let s = Schedule::parse("every 1 hours").unwrap();
        assert_eq!(s, Schedule::hourly());
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 10, 30, 0).unwrap();
        assert_eq!(s.next_after(after), Some(after + Duration::hours(1)));
        assert_eq!(s.to_string(), "every 1 hours");
    }

    #[test]
    fn test_every_minutes() {
        let s = Schedule::parse("every 15 minutes").unwrap();
        assert_eq!(s, Schedule::Every(Duration::minutes(15)));
        assert_eq!(s.to_string(), "every 15 minutes");
        assert!(Schedule::parse("every 1 minute").is_ok());
    }

    #[test]
    fn test_every_rejects_bad_forms() {
        for bad in ["every 0 hours", "every -2 hours", "every hours", "every 2 days", "every 2 hours now"] {
            assert!(Schedule::parse(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_cron_top_of_hour() {
        let s = Schedule::parse("0 * * * *").unwrap();
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 10, 30, 0).unwrap();
        let next = s.next_after(after).unwrap();
        assert_eq!((next.hour(), next.minute()), (11, 0));
    }

    #[test]
    fn test_cron_specific_time() {
        let s = Schedule::parse("0 8 * * *").unwrap();
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 7, 0, 0).unwrap();
        let next = s.next_after(after).unwrap();
        assert_eq!((next.hour(), next.minute()), (8, 0));
    }

    #[test]
    fn test_cron_every_15_minutes() {
        let s = Schedule::parse("*/15 * * * *").unwrap();
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 10, 2, 0).unwrap();
        assert_eq!(s.next_after(after).unwrap().minute(), 15);
    }

    #[test]
    fn test_cron_list() {
        let s = Schedule::parse("0,30 9 * * *").unwrap();
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 9, 10, 0).unwrap();
        let next = s.next_after(after).unwrap();
        assert_eq!((next.hour(), next.minute()), (9, 30));
    }

    #[test]
    fn test_invalid_cron() {
        assert!(Schedule::parse("bad").is_err());
        assert!(Schedule::parse("0 8 1 * *").is_err());
        assert!(Schedule::parse("61 * * * *").is_err());
        assert!(Schedule::parse("*/0 * * * *").is_err());
    }

    #[test]
    fn test_cron_list_with_out_of_range_entry() {
        let err = Schedule::parse("0,75 * * * *").unwrap_err();
        assert!(matches!(err, ChoreSyncError::Config(_)));
        assert!(Schedule::parse("0 8,24 * * *").is_err());
    }

    #[test]
    fn test_every_out_of_range_period() {
        let err = Schedule::parse("every 9999999999999 hours").unwrap_err();
        assert!(matches!(err, ChoreSyncError::Config(_)));
        assert!(Schedule::parse("every 9223372036854775807 minutes").is_err());
    }

    #[test]
    fn test_every_next_after_overflow_is_none() {
        let s = Schedule::Every(Duration::days(365 * 1000));
        assert_eq!(s.next_after(DateTime::<Utc>::MAX_UTC), None);
    }
}
