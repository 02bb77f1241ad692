//! Standard 5-field cron expressions.
//!
//! `minute hour day-of-month month day-of-week`, with `*`, `?`, lists, ranges,
//! steps, month and weekday names, and the `@daily`-style descriptors.
//! Day-of-month and day-of-week combine the classic way: when both are
//! restricted a day matches if either does.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Timelike,
};

use crate::error::CronError;

/// How far ahead [`CronSchedule::next_after`] looks before giving up.
const SEARCH_HORIZON_DAYS: i64 = 366 * 5;

const MONTH_NAMES: &[&str] = &[
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];
const DAY_NAMES: &[&str] = &["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

#[derive(Debug, Clone, Copy)]
struct FieldSpec {
    name: &'static str,
    min: u32,
    max: u32,
    /// Names for `min..`, matched case-insensitively.
    names: &'static [&'static str],
    allow_question_mark: bool,
}

const MINUTE: FieldSpec = FieldSpec {
    name: "minute",
    min: 0,
    max: 59,
    names: &[],
    allow_question_mark: false,
};
const HOUR: FieldSpec = FieldSpec {
    name: "hour",
    min: 0,
    max: 23,
    names: &[],
    allow_question_mark: false,
};
const DAY_OF_MONTH: FieldSpec = FieldSpec {
    name: "day-of-month",
    min: 1,
    max: 31,
    names: &[],
    allow_question_mark: true,
};
const MONTH: FieldSpec = FieldSpec {
    name: "month",
    min: 1,
    max: 12,
    names: MONTH_NAMES,
    allow_question_mark: false,
};
// 7 is accepted as a second spelling of Sunday and folded onto 0.
const DAY_OF_WEEK: FieldSpec = FieldSpec {
    name: "day-of-week",
    min: 0,
    max: 7,
    names: DAY_NAMES,
    allow_question_mark: true,
};

/// Set of allowed values for one field, one bit per value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FieldSet {
    bits: u64,
    /// `*` or `?`: matters only for the day-of-month/day-of-week rule.
    wildcard: bool,
}

impl FieldSet {
    fn contains(self, value: u32) -> bool {
        self.bits & (1u64 << value) != 0
    }
}

/// A parsed cron expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    source: String,
    minutes: FieldSet,
    hours: FieldSet,
    days_of_month: FieldSet,
    months: FieldSet,
    days_of_week: FieldSet,
}

impl CronSchedule {
    pub fn parse(expr: &str) -> Result<Self, CronError> {
        let trimmed = expr.trim();
        let expanded = if trimmed.starts_with('@') {
            expand_descriptor(trimmed)?
        } else {
            trimmed
        };

        let fields: Vec<&str> = expanded.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(CronError::FieldCount {
                expr: trimmed.to_string(),
                found: fields.len(),
            });
        }

        let mut days_of_week = parse_field(fields[4], DAY_OF_WEEK)?;
        if days_of_week.contains(7) {
            days_of_week.bits = (days_of_week.bits & !(1u64 << 7)) | 1;
        }

        Ok(Self {
            source: trimmed.to_string(),
            minutes: parse_field(fields[0], MINUTE)?,
            hours: parse_field(fields[1], HOUR)?,
            days_of_month: parse_field(fields[2], DAY_OF_MONTH)?,
            months: parse_field(fields[3], MONTH)?,
            days_of_week,
        })
    }

    /// The expression as written (descriptors are kept unexpanded).
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// First matching minute strictly after `after`, in `after`'s time zone.
    ///
    /// Local times skipped by a DST change are passed over; ambiguous ones
    /// resolve to the earlier instant. `None` when nothing matches within
    /// five years (e.g. `0 0 30 2 *`).
    pub fn next_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = after.timezone();
        let local = after.naive_local();
        let mut t = local.date().and_time(NaiveTime::from_hms_opt(local.hour(), local.minute(), 0)?)
            + Duration::minutes(1);
        let horizon = t + Duration::days(SEARCH_HORIZON_DAYS);

        while t <= horizon {
            if !self.months.contains(t.month()) {
                t = first_of_next_month(t.date())?;
                continue;
            }
            if !self.day_matches(t.date()) {
                t = t.date().succ_opt()?.and_time(NaiveTime::MIN);
                continue;
            }
            if !self.hours.contains(t.hour()) {
                t = t.date().and_time(NaiveTime::from_hms_opt(t.hour(), 0, 0)?) + Duration::hours(1);
                continue;
            }
            if !self.minutes.contains(t.minute()) {
                t += Duration::minutes(1);
                continue;
            }

            let candidate = match tz.from_local_datetime(&t) {
                LocalResult::Single(dt) => Some(dt),
                LocalResult::Ambiguous(earliest, _) => Some(earliest),
                LocalResult::None => None,
            };
            match candidate {
                Some(dt) if dt > *after => return Some(dt),
                _ => t += Duration::minutes(1),
            }
        }
        None
    }

    fn day_matches(&self, date: NaiveDate) -> bool {
        let dom = self.days_of_month.contains(date.day());
        let dow = self
            .days_of_week
            .contains(date.weekday().num_days_from_sunday());
        match (self.days_of_month.wildcard, self.days_of_week.wildcard) {
            (true, true) => true,
            (true, false) => dow,
            (false, true) => dom,
            (false, false) => dom || dow,
        }
    }
}

impl FromStr for CronSchedule {
    type Err = CronError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CronSchedule::parse(s)
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn expand_descriptor(descriptor: &str) -> Result<&'static str, CronError> {
    match descriptor.to_ascii_lowercase().as_str() {
        "@yearly" | "@annually" => Ok("0 0 1 1 *"),
        "@monthly" => Ok("0 0 1 * *"),
        "@weekly" => Ok("0 0 * * 0"),
        "@daily" | "@midnight" => Ok("0 0 * * *"),
        "@hourly" => Ok("0 * * * *"),
        _ => Err(CronError::UnknownDescriptor(descriptor.to_string())),
    }
}

fn parse_field(raw: &str, spec: FieldSpec) -> Result<FieldSet, CronError> {
    let mut set = FieldSet {
        bits: 0,
        wildcard: false,
    };
    for part in raw.split(',') {
        if part.is_empty() {
            return Err(invalid(spec, raw));
        }
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => (range, Some(parse_step(step, spec)?)),
            None => (part, None),
        };

        let is_wildcard = range == "*" || (range == "?" && spec.allow_question_mark);
        let (start, end) = if is_wildcard {
            if step.is_none() {
                set.wildcard = true;
            }
            (spec.min, spec.max)
        } else if let Some((lo, hi)) = range.split_once('-') {
            let (lo, hi) = (parse_value(lo, spec)?, parse_value(hi, spec)?);
            if lo > hi {
                return Err(CronError::InvalidRange {
                    field: spec.name,
                    value: part.to_string(),
                });
            }
            (lo, hi)
        } else {
            let value = parse_value(range, spec)?;
            // `5/15` means "from 5 to the end, every 15".
            (value, if step.is_some() { spec.max } else { value })
        };

        let step = step.unwrap_or(1);
        let mut value = Some(start);
        while let Some(v) = value.filter(|v| *v <= end) {
            set.bits |= 1u64 << v;
            value = v.checked_add(step);
        }
    }
    Ok(set)
}

/// A step must be at least 1 and no wider than the field itself.
fn parse_step(raw: &str, spec: FieldSpec) -> Result<u32, CronError> {
    match raw.parse::<u32>() {
        Ok(step) if step > 0 && step <= spec.max - spec.min => Ok(step),
        _ => Err(CronError::InvalidStep {
            field: spec.name,
            value: raw.to_string(),
        }),
    }
}

fn parse_value(raw: &str, spec: FieldSpec) -> Result<u32, CronError> {
    let value = match raw.parse::<u32>() {
        Ok(value) => value,
        Err(_) => spec
            .names
            .iter()
            .position(|name| name.eq_ignore_ascii_case(raw))
            .map(|idx| idx as u32 + spec.min)
            .ok_or_else(|| invalid(spec, raw))?,
    };
    if value < spec.min || value > spec.max {
        return Err(CronError::OutOfRange {
            field: spec.name,
            value,
            min: spec.min,
            max: spec.max,
        });
    }
    Ok(value)
}

fn invalid(spec: FieldSpec, raw: &str) -> CronError {
    CronError::InvalidValue {
        field: spec.name,
        value: raw.to_string(),
    }
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDateTime> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    Some(NaiveDate::from_ymd_opt(year, month, 1)?.and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .expect("rfc3339")
            .with_timezone(&Utc)
    }

    #[test]
    fn default_daily_four_am() {
        let cron = CronSchedule::parse("0 4 * * *").expect("parse");
        let next = cron.next_after(&utc("2026-03-10T12:00:00Z")).expect("next");
        assert_eq!(next, utc("2026-03-11T04:00:00Z"));

        let next = cron.next_after(&utc("2026-03-10T03:59:59Z")).expect("next");
        assert_eq!(next, utc("2026-03-10T04:00:00Z"));
    }

    #[test]
    fn next_is_strictly_after_an_exact_match() {
        let cron = CronSchedule::parse("0 4 * * *").expect("parse");
        let next = cron.next_after(&utc("2026-03-10T04:00:00Z")).expect("next");
        assert_eq!(next, utc("2026-03-11T04:00:00Z"));
    }

    #[test]
    fn steps_ranges_and_lists() {
        let cron = CronSchedule::parse("*/15 9-17 * * 1-5").expect("parse");
        // Friday 17:50 → Monday 09:00.
        let next = cron.next_after(&utc("2026-10-16T17:50:00Z")).expect("next");
        assert_eq!(next, utc("2026-10-19T09:00:00Z"));

        let cron = CronSchedule::parse("5,35 * * * *").expect("parse");
        let next = cron.next_after(&utc("2026-10-16T10:06:00Z")).expect("next");
        assert_eq!(next, utc("2026-10-16T10:35:00Z"));
    }

    #[test]
    fn names_and_sunday_as_seven() {
        let named = CronSchedule::parse("30 2 * jan-mar sun").expect("parse");
        let numeric = CronSchedule::parse("30 2 * 1-3 7").expect("parse");
        let from = utc("2026-10-16T00:00:00Z");
        assert_eq!(named.next_after(&from), numeric.next_after(&from));
        assert_eq!(
            named.next_after(&from).expect("next"),
            utc("2027-01-03T02:30:00Z")
        );
    }

    #[test]
    fn day_of_month_or_day_of_week_when_both_restricted() {
        // The 13th, or any Friday.
        let cron = CronSchedule::parse("0 0 13 * 5").expect("parse");
        // 2026-10-13 is a Tuesday; next Friday is 2026-10-16.
        let next = cron.next_after(&utc("2026-10-12T00:00:00Z")).expect("next");
        assert_eq!(next, utc("2026-10-13T00:00:00Z"));
        let next = cron.next_after(&next).expect("next");
        assert_eq!(next, utc("2026-10-16T00:00:00Z"));
    }

    #[test]
    fn descriptors_expand() {
        let cron = CronSchedule::parse("@weekly").expect("parse");
        assert_eq!(cron.as_str(), "@weekly");
        let next = cron.next_after(&utc("2026-10-16T00:00:00Z")).expect("next");
        assert_eq!(next, utc("2026-10-18T00:00:00Z"));
        assert!(matches!(
            CronSchedule::parse("@fortnightly"),
            Err(CronError::UnknownDescriptor(_))
        ));
    }

    #[test]
    fn widest_step_keeps_only_the_start_value() {
        let cron = CronSchedule::parse("59/59 * * * *").expect("parse");
        let next = cron.next_after(&utc("2026-10-16T10:00:00Z")).expect("next");
        assert_eq!(next, utc("2026-10-16T10:59:00Z"));
        assert!(matches!(
            CronSchedule::parse("59/4294967295 * * * *"),
            Err(CronError::InvalidStep { field: "minute", .. })
        ));
    }

    #[test]
    fn impossible_date_yields_none() {
        let cron = CronSchedule::parse("0 0 30 2 *").expect("parse");
        assert_eq!(cron.next_after(&utc("2026-01-01T00:00:00Z")), None);
    }

    #[test]
    fn leap_day_is_found_across_years() {
        let cron = CronSchedule::parse("0 12 29 2 *").expect("parse");
        let next = cron.next_after(&utc("2026-03-01T00:00:00Z")).expect("next");
        assert_eq!(next, utc("2028-02-29T12:00:00Z"));
    }

    #[test]
    fn evaluated_in_the_given_offset() {
        let cron = CronSchedule::parse("0 4 * * *").expect("parse");
        let berlin = FixedOffset::east_opt(2 * 3600).expect("offset");
        let from = berlin.with_ymd_and_hms(2026, 10, 16, 5, 0, 0).unwrap();
        let next = cron.next_after(&from).expect("next");
        assert_eq!(next, berlin.with_ymd_and_hms(2026, 10, 17, 4, 0, 0).unwrap());
    }
}
