use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Short identifier of a game server as used in panel API paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerId(pub String);

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ServerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ServerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Panel-assigned schedule identifier. Absent on drafts that were never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleId(pub u64);

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ScheduleId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Panel-assigned task identifier, unique within the owning schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TaskId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

pub const DEFAULT_MINUTE: &str = "*/5";
pub const DEFAULT_FIELD: &str = "*";

/// The five cron fields of a schedule, kept as the strings the user typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronSpec {
    pub minute: String,
    pub hour: String,
    pub day_of_month: String,
    pub month: String,
    pub day_of_week: String,
}

impl Default for CronSpec {
    fn default() -> Self {
        Self {
            minute: DEFAULT_MINUTE.to_string(),
            hour: DEFAULT_FIELD.to_string(),
            day_of_month: DEFAULT_FIELD.to_string(),
            month: DEFAULT_FIELD.to_string(),
            day_of_week: DEFAULT_FIELD.to_string(),
        }
    }
}

/// Cron row form: `minute hour day-of-month month day-of-week`.
impl fmt::Display for CronSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.minute, self.hour, self.day_of_month, self.month, self.day_of_week
        )
    }
}

impl FromStr for CronSpec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        match parts.as_slice() {
            [minute, hour, dom, month, dow] => Ok(Self {
                minute: minute.to_string(),
                hour: hour.to_string(),
                day_of_month: dom.to_string(),
                month: month.to_string(),
                day_of_week: dow.to_string(),
            }),
            _ => Err(format!(
                "cron expression must have exactly 5 fields, got {}: '{s}'",
                parts.len()
            )),
        }
    }
}

/// A schedule as persisted by the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: ScheduleId,
    pub name: String,
    pub cron: CronSpec,
    pub is_active: bool,
    pub is_processing: bool,
    pub only_when_online: bool,
    pub last_run_at: Option<DateTime<Utc>>,
    pub next_run_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Ordered by `sequence_id` as returned by the panel.
    pub tasks: Vec<Task>,
}

impl Schedule {
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }
}

/// A task as persisted by the panel.
///
/// `action` is kept verbatim; the typed form only exists after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub sequence_id: u32,
    pub action: String,
    pub payload: String,
    pub time_offset: u32,
    pub is_queued: bool,
    pub continue_on_failure: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-server limits relevant to schedule editing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureLimits {
    pub databases: u32,
    pub allocations: u32,
    pub backups: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cron_row() {
        assert_eq!(CronSpec::default().to_string(), "*/5 * * * *");
    }

    #[test]
    fn cron_row_parses_back() {
        let spec: CronSpec = "0 4 * * 1-5".parse().expect("parse failed");
        assert_eq!(spec.hour, "4");
        assert_eq!(spec.day_of_week, "1-5");
        assert_eq!(spec.to_string(), "0 4 * * 1-5");
    }

    #[test]
    fn cron_row_extra_whitespace_is_collapsed() {
        let spec: CronSpec = "  */10   *  * *  0 ".parse().expect("parse failed");
        assert_eq!(spec.to_string(), "*/10 * * * 0");
    }

    #[test]
    fn cron_row_wrong_field_count_is_err() {
        assert!("* * * *".parse::<CronSpec>().is_err());
        assert!("0 * * * * *".parse::<CronSpec>().is_err());
    }
}
