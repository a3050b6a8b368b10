use chrono::{DateTime, Utc};
use panel_core::types::{CronSpec, FeatureLimits, Schedule, ScheduleId, Task, TaskId};
use serde::{Deserialize, Serialize};

use crate::envelope::ListEnvelope;
use crate::error::ProtocolError;
use crate::paths::OBJECT_TASK;

/// `server_schedule` attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSchedule {
    pub id: u64,
    pub name: String,
    pub cron: RawCron,
    pub is_active: bool,
    #[serde(default)]
    pub is_processing: bool,
    pub only_when_online: bool,
    pub last_run_at: Option<DateTime<Utc>>,
    pub next_run_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Present only when the request asked for `include=tasks` or on write responses.
    #[serde(default)]
    pub relationships: RawScheduleRelationships,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCron {
    pub day_of_week: String,
    pub day_of_month: String,
    pub month: String,
    pub hour: String,
    pub minute: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawScheduleRelationships {
    #[serde(default)]
    pub tasks: ListEnvelope<RawTask>,
}

/// `schedule_task` attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTask {
    pub id: u64,
    pub sequence_id: u32,
    pub action: String,
    /// Backup tasks may be stored with a null payload.
    #[serde(default)]
    pub payload: Option<String>,
    pub time_offset: u32,
    #[serde(default)]
    pub is_queued: bool,
    #[serde(default)]
    pub continue_on_failure: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `server` attributes: only the part schedule editing cares about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawServer {
    pub identifier: String,
    #[serde(default)]
    pub feature_limits: RawFeatureLimits,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFeatureLimits {
    #[serde(default)]
    pub databases: u32,
    #[serde(default)]
    pub allocations: u32,
    #[serde(default)]
    pub backups: u32,
}

impl From<RawCron> for CronSpec {
    fn from(raw: RawCron) -> Self {
        Self {
            minute: raw.minute,
            hour: raw.hour,
            day_of_month: raw.day_of_month,
            month: raw.month,
            day_of_week: raw.day_of_week,
        }
    }
}

impl From<RawTask> for Task {
    fn from(raw: RawTask) -> Self {
        Self {
            id: TaskId(raw.id),
            sequence_id: raw.sequence_id,
            action: raw.action,
            payload: raw.payload.unwrap_or_default(),
            time_offset: raw.time_offset,
            is_queued: raw.is_queued,
            continue_on_failure: raw.continue_on_failure,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        }
    }
}

impl From<RawFeatureLimits> for FeatureLimits {
    fn from(raw: RawFeatureLimits) -> Self {
        Self {
            databases: raw.databases,
            allocations: raw.allocations,
            backups: raw.backups,
        }
    }
}

impl RawSchedule {
    /// Convert into a core record, unwrapping the embedded task list.
    pub fn into_schedule(self) -> Result<Schedule, ProtocolError> {
        let tasks = self
            .relationships
            .tasks
            .expect_items(OBJECT_TASK)?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(Schedule {
            id: ScheduleId(self.id),
            name: self.name,
            cron: self.cron.into(),
            is_active: self.is_active,
            is_processing: self.is_processing,
            only_when_online: self.only_when_online,
            last_run_at: self.last_run_at,
            next_run_at: self.next_run_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            tasks,
        })
    }
}

/// Request body for creating or updating a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleBody {
    pub name: String,
    pub is_active: bool,
    pub only_when_online: bool,
    pub minute: String,
    pub hour: String,
    pub day_of_month: String,
    pub month: String,
    pub day_of_week: String,
}

impl ScheduleBody {
    pub fn new(name: &str, cron: &CronSpec, is_active: bool, only_when_online: bool) -> Self {
        Self {
            name: name.to_string(),
            is_active,
            only_when_online,
            minute: cron.minute.clone(),
            hour: cron.hour.clone(),
            day_of_month: cron.day_of_month.clone(),
            month: cron.month.clone(),
            day_of_week: cron.day_of_week.clone(),
        }
    }
}

/// Request body for creating or updating a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskBody {
    pub action: String,
    pub payload: String,
    pub time_offset: u32,
    pub continue_on_failure: bool,
}
