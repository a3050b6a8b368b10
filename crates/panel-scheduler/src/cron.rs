//! The five cron fields of a schedule and their validation.
//!
//! By default a field only has to be present: the panel is the authority on
//! cron grammar and rejects bad expressions when the schedule is saved.
//! [`CronGrammar::Strict`] additionally checks the classic five-field grammar
//! (`*`, `N`, `A-B`, `X/S`, comma lists) and per-field ranges locally.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use panel_core::types::{CronSpec, DEFAULT_FIELD, DEFAULT_MINUTE};

use crate::error::{FieldError, FieldName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CronField {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

impl CronField {
    /// In cron row order.
    pub const ALL: [CronField; 5] = [
        CronField::Minute,
        CronField::Hour,
        CronField::DayOfMonth,
        CronField::Month,
        CronField::DayOfWeek,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            CronField::Minute => "minute",
            CronField::Hour => "hour",
            CronField::DayOfMonth => "dayOfMonth",
            CronField::Month => "month",
            CronField::DayOfWeek => "dayOfWeek",
        }
    }

    /// Value a new schedule starts with.
    pub fn default_value(&self) -> &'static str {
        match self {
            CronField::Minute => DEFAULT_MINUTE,
            _ => DEFAULT_FIELD,
        }
    }

    /// Inclusive numeric range accepted by the strict grammar.
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            CronField::Minute => (0, 59),
            CronField::Hour => (0, 23),
            CronField::DayOfMonth => (1, 31),
            CronField::Month => (1, 12),
            CronField::DayOfWeek => (0, 7), // 0 and 7 are both Sunday
        }
    }

    pub fn get<'a>(&self, spec: &'a CronSpec) -> &'a str {
        match self {
            CronField::Minute => &spec.minute,
            CronField::Hour => &spec.hour,
            CronField::DayOfMonth => &spec.day_of_month,
            CronField::Month => &spec.month,
            CronField::DayOfWeek => &spec.day_of_week,
        }
    }

    pub fn get_mut<'a>(&self, spec: &'a mut CronSpec) -> &'a mut String {
        match self {
            CronField::Minute => &mut spec.minute,
            CronField::Hour => &mut spec.hour,
            CronField::DayOfMonth => &mut spec.day_of_month,
            CronField::Month => &mut spec.month,
            CronField::DayOfWeek => &mut spec.day_of_week,
        }
    }

    fn is_day(&self) -> bool {
        matches!(self, CronField::DayOfMonth | CronField::DayOfWeek)
    }
}

/// How much of the cron grammar is checked locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CronGrammar {
    /// Presence only.
    #[default]
    Lenient,
    /// Presence, syntax and per-field ranges.
    Strict,
}

/// A field value that passed validation, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedField {
    pub field: CronField,
    pub value: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CronExpression {
    grammar: CronGrammar,
}

impl CronExpression {
    pub fn new(grammar: CronGrammar) -> Self {
        Self { grammar }
    }

    pub fn validate_field(&self, field: CronField, raw: &str) -> Result<ValidatedField, FieldError> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(FieldError::Required {
                field: FieldName::Cron(field),
            });
        }
        if self.grammar == CronGrammar::Strict {
            check_grammar(field, value).map_err(|reason| FieldError::InvalidCron {
                field: FieldName::Cron(field),
                value: value.to_string(),
                reason,
            })?;
        }
        Ok(ValidatedField {
            field,
            value: value.to_string(),
        })
    }
}

fn check_grammar(field: CronField, value: &str) -> Result<(), String> {
    let (min, max) = field.bounds();
    for item in value.split(',') {
        if item.is_empty() {
            return Err("empty list item".to_string());
        }
        let base = match item.split_once('/') {
            Some((base, step)) => {
                let step = parse_number(step).ok_or_else(|| format!("step `{step}` is not a number"))?;
                if step == 0 {
                    return Err("step must be at least 1".to_string());
                }
                base
            }
            None => item,
        };
        match base {
            "*" => {}
            "?" if field.is_day() => {}
            _ => match base.split_once('-') {
                Some((lo, hi)) => {
                    let lo = parse_bounded(lo, min, max)?;
                    let hi = parse_bounded(hi, min, max)?;
                    if lo > hi {
                        return Err(format!("range {lo}-{hi} is reversed"));
                    }
                }
                None => {
                    parse_bounded(base, min, max)?;
                }
            },
        }
    }
    Ok(())
}

fn parse_number(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_bounded(s: &str, min: u32, max: u32) -> Result<u32, String> {
    let v = parse_number(s).ok_or_else(|| format!("`{s}` is not a number"))?;
    if v < min || v > max {
        return Err(format!("value {v} out of [{min}, {max}]"));
    }
    Ok(v)
}

/// Next instant strictly after `from` at which `spec` fires, evaluated in UTC.
///
/// Returns `None` when the expression cannot be evaluated locally; the
/// panel's own `next_run_at` remains authoritative.
pub fn next_run_after(spec: &CronSpec, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let expr = format!(
        "0 {} {} {} {} {}",
        spec.minute.trim(),
        spec.hour.trim(),
        spec.day_of_month.trim(),
        spec.month.trim(),
        day_of_week_names(spec.day_of_week.trim())?
    );
    let schedule = ::cron::Schedule::from_str(&expr).ok()?;
    schedule.after(&from).next()
}

const WEEKDAYS: [&str; 8] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Rewrite numeric day-of-week values (0/7 = Sunday) as names so the
/// evaluator cannot misread the numbering. Step values stay numeric.
///
/// The evaluator orders days Sun..Sat, so a range ending in 7 is split into
/// `<lo>-Sat` plus a separate `Sun` when the step lands on it.
fn day_of_week_names(field: &str) -> Option<String> {
    let name = |s: &str| -> Option<String> {
        match parse_number(s) {
            Some(n) => WEEKDAYS.get(n as usize).map(|d| d.to_string()),
            None => Some(s.to_string()),
        }
    };
    let mut items = Vec::new();
    for item in field.split(',') {
        let (base, step) = match item.split_once('/') {
            Some((b, s)) => (b, Some(s)),
            None => (item, None),
        };
        let with_step = |mut out: String| {
            if let Some(step) = step {
                out.push('/');
                out.push_str(step);
            }
            out
        };
        match base.split_once('-') {
            Some((lo, "7")) if parse_number(lo).is_some() => {
                let lo = parse_number(lo)?;
                let every = match step {
                    Some(s) => parse_number(s).filter(|&n| n > 0)?,
                    None => 1,
                };
                match lo {
                    7 => items.push("Sun".to_string()),
                    0 => items.push(with_step("Sun-Sat".to_string())),
                    _ => {
                        items.push(with_step(format!("{}-Sat", name(&lo.to_string())?)));
                        if (7 - lo) % every == 0 {
                            items.push("Sun".to_string());
                        }
                    }
                }
            }
            Some((lo, hi)) => items.push(with_step(format!("{}-{}", name(lo)?, name(hi)?))),
            None => items.push(with_step(name(base)?)),
        }
    }
    Some(items.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn empty_field_is_required_for_every_field() {
        let cron = CronExpression::default();
        for field in CronField::ALL {
            for raw in ["", "   ", "\t"] {
                let err = cron.validate_field(field, raw).unwrap_err();
                assert_eq!(
                    err,
                    FieldError::Required {
                        field: FieldName::Cron(field)
                    }
                );
            }
        }
    }

    #[test]
    fn lenient_passes_values_through_trimmed() {
        let cron = CronExpression::default();
        let v = cron.validate_field(CronField::Minute, " */5 ").unwrap();
        assert_eq!(v.value, "*/5");
        // grammar is the panel's business in lenient mode
        assert!(cron.validate_field(CronField::Hour, "banana").is_ok());
    }

    #[test]
    fn defaults_per_field() {
        assert_eq!(CronField::Minute.default_value(), "*/5");
        for field in &CronField::ALL[1..] {
            assert_eq!(field.default_value(), "*");
        }
    }

    #[test]
    fn strict_accepts_common_forms() {
        let cron = CronExpression::new(CronGrammar::Strict);
        let ok = [
            (CronField::Minute, "*/5"),
            (CronField::Minute, "0,15,30,45"),
            (CronField::Hour, "9-17"),
            (CronField::Hour, "0-23/2"),
            (CronField::DayOfMonth, "?"),
            (CronField::Month, "1-12"),
            (CronField::DayOfWeek, "7"),
            (CronField::DayOfWeek, "1-5"),
        ];
        for (field, raw) in ok {
            assert!(cron.validate_field(field, raw).is_ok(), "{raw} should pass");
        }
    }

    #[test]
    fn strict_rejects_bad_forms() {
        let cron = CronExpression::new(CronGrammar::Strict);
        let bad = [
            (CronField::Minute, "60"),
            (CronField::Minute, "*/0"),
            (CronField::Minute, "*/x"),
            (CronField::Hour, "24"),
            (CronField::Hour, "5-2"),
            (CronField::DayOfMonth, "0"),
            (CronField::Month, "13"),
            (CronField::Month, "?"),
            (CronField::DayOfWeek, "8"),
            (CronField::Minute, "1,,2"),
            (CronField::Minute, "+5"),
        ];
        for (field, raw) in bad {
            let err = cron.validate_field(field, raw).unwrap_err();
            assert!(
                matches!(err, FieldError::InvalidCron { .. }),
                "{raw} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn day_of_week_numbers_become_names() {
        assert_eq!(day_of_week_names("*").as_deref(), Some("*"));
        assert_eq!(day_of_week_names("0,6").as_deref(), Some("Sun,Sat"));
        assert_eq!(day_of_week_names("7").as_deref(), Some("Sun"));
        assert_eq!(day_of_week_names("1-5/2").as_deref(), Some("Mon-Fri/2"));
        assert_eq!(day_of_week_names("*/2").as_deref(), Some("*/2"));
        assert_eq!(day_of_week_names("Mon").as_deref(), Some("Mon"));
        assert!(day_of_week_names("9").is_none());
    }

    #[test]
    fn day_of_week_ranges_ending_in_sunday_are_split() {
        assert_eq!(day_of_week_names("5-7").as_deref(), Some("Fri-Sat,Sun"));
        assert_eq!(day_of_week_names("1-7").as_deref(), Some("Mon-Sat,Sun"));
        assert_eq!(day_of_week_names("0-7").as_deref(), Some("Sun-Sat"));
        assert_eq!(day_of_week_names("7-7").as_deref(), Some("Sun"));
        assert_eq!(day_of_week_names("2-7/5").as_deref(), Some("Tue-Sat/5,Sun"));
        assert_eq!(day_of_week_names("1-7/2").as_deref(), Some("Mon-Sat/2,Sun"));
        assert_eq!(day_of_week_names("2-7/2").as_deref(), Some("Tue-Sat/2"));
        assert!(day_of_week_names("1-7/0").is_none());
    }

    #[test]
    fn next_run_for_weekday_range_through_sunday() {
        // Sunday 10:03, so today's 09:00 has passed
        let from = Utc.with_ymd_and_hms(2026, 10, 18, 10, 3, 27).unwrap();

        let spec: CronSpec = "0 9 * * 5-7".parse().unwrap();
        let next = next_run_after(&spec, from).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 10, 23, 9, 0, 0).unwrap());

        let spec: CronSpec = "0 9 * * 1-7".parse().unwrap();
        let next = next_run_after(&spec, from).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap());

        // the split range still fires on Sunday itself
        let saturday = Utc.with_ymd_and_hms(2026, 10, 24, 10, 0, 0).unwrap();
        let next = next_run_after(&spec, saturday).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 10, 25, 9, 0, 0).unwrap());
    }

    #[test]
    fn next_run_for_default_is_next_five_minute_mark() {
        let from = Utc.with_ymd_and_hms(2026, 10, 18, 10, 3, 27).unwrap();
        let next = next_run_after(&CronSpec::default(), from).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 10, 18, 10, 5, 0).unwrap());
    }

    #[test]
    fn next_run_honours_numeric_weekday() {
        // 2026-10-18 is a Sunday; "1" is Monday.
        let from = Utc.with_ymd_and_hms(2026, 10, 18, 10, 3, 27).unwrap();
        let spec: CronSpec = "0 9 * * 1".parse().unwrap();
        let next = next_run_after(&spec, from).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap());
    }

    #[test]
    fn next_run_for_unparseable_is_none() {
        let from = Utc.with_ymd_and_hms(2026, 10, 18, 10, 3, 27).unwrap();
        let spec: CronSpec = "banana * * * *".parse().unwrap();
        assert!(next_run_after(&spec, from).is_none());
    }
}
