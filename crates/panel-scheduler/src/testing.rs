//! Fixtures and an in-memory gateway shared by the unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use panel_core::types::{
    CronSpec, FeatureLimits, Schedule, ScheduleId, ServerId, Task, TaskId,
};

use crate::gateway::{GatewayError, ScheduleRequest, SchedulePersistenceGateway, TaskRequest};

pub(crate) const NEW_SCHEDULE_ID: ScheduleId = ScheduleId(100);
pub(crate) const NEW_TASK_ID: TaskId = TaskId(500);

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap()
}

pub(crate) fn schedule_fixture(id: u64) -> Schedule {
    Schedule {
        id: ScheduleId(id),
        name: format!("Schedule {id}"),
        cron: CronSpec::default(),
        is_active: true,
        is_processing: false,
        only_when_online: true,
        last_run_at: None,
        next_run_at: None,
        created_at: fixed_time(),
        updated_at: fixed_time(),
        tasks: Vec::new(),
    }
}

pub(crate) fn task_fixture(id: u64, action: &str, payload: &str) -> Task {
    Task {
        id: TaskId(id),
        sequence_id: 1,
        action: action.to_string(),
        payload: payload.to_string(),
        time_offset: 15,
        is_queued: false,
        continue_on_failure: false,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    ListSchedules,
    FeatureLimits,
    SaveSchedule(ScheduleRequest),
    SaveTask {
        schedule: ScheduleId,
        task: Option<TaskId>,
        req: TaskRequest,
    },
    DeleteSchedule(ScheduleId),
}

/// Answers every call successfully, or fails every call with one message.
pub(crate) struct MockGateway {
    fail: Option<String>,
    schedules: Vec<Schedule>,
    backups: u32,
    calls: Mutex<Vec<Call>>,
}

impl MockGateway {
    pub(crate) fn ok() -> Self {
        Self {
            fail: None,
            schedules: Vec::new(),
            backups: 3,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            fail: Some(message.to_string()),
            ..Self::ok()
        }
    }

    pub(crate) fn with_schedules(mut self, schedules: Vec<Schedule>) -> Self {
        self.schedules = schedules;
        self
    }

    pub(crate) fn backups(&self) -> u32 {
        self.backups
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(call);
        match &self.fail {
            Some(message) => Err(GatewayError::Api {
                status: 422,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SchedulePersistenceGateway for MockGateway {
    async fn list_schedules(&self, _server: &ServerId) -> Result<Vec<Schedule>, GatewayError> {
        self.record(Call::ListSchedules)?;
        Ok(self.schedules.clone())
    }

    async fn feature_limits(&self, _server: &ServerId) -> Result<FeatureLimits, GatewayError> {
        self.record(Call::FeatureLimits)?;
        Ok(FeatureLimits {
            backups: self.backups,
            ..Default::default()
        })
    }

    async fn create_or_update_schedule(
        &self,
        _server: &ServerId,
        req: &ScheduleRequest,
    ) -> Result<Schedule, GatewayError> {
        self.record(Call::SaveSchedule(req.clone()))?;
        let mut schedule = schedule_fixture(req.id.unwrap_or(NEW_SCHEDULE_ID).0);
        schedule.name = req.name.clone();
        schedule.cron = req.cron.clone();
        schedule.is_active = req.is_active;
        schedule.only_when_online = req.only_when_online;
        Ok(schedule)
    }

    async fn create_or_update_schedule_task(
        &self,
        _server: &ServerId,
        schedule: ScheduleId,
        task: Option<TaskId>,
        req: &TaskRequest,
    ) -> Result<Task, GatewayError> {
        self.record(Call::SaveTask {
            schedule,
            task,
            req: req.clone(),
        })?;
        let mut saved = task_fixture(task.unwrap_or(NEW_TASK_ID).0, &req.action, &req.payload);
        saved.time_offset = req.time_offset;
        saved.continue_on_failure = req.continue_on_failure;
        Ok(saved)
    }

    async fn delete_schedule(
        &self,
        _server: &ServerId,
        schedule: ScheduleId,
    ) -> Result<(), GatewayError> {
        self.record(Call::DeleteSchedule(schedule))
    }
}
