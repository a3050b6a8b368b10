use async_trait::async_trait;
use thiserror::Error;

use panel_core::types::{
    CronSpec, FeatureLimits, Schedule, ScheduleId, ServerId, Task, TaskId,
};

use crate::schedule::ValidSchedule;
use crate::task::ValidTask;

/// Failure reported by the persistence boundary. The message is shown to the
/// user verbatim and is never inspected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The panel answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never got a usable answer.
    #[error("{0}")]
    Transport(String),

    /// The panel answered with a body we could not read.
    #[error("{0}")]
    Parse(String),
}

impl GatewayError {
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Create (no `id`) or update a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRequest {
    pub id: Option<ScheduleId>,
    pub name: String,
    pub cron: CronSpec,
    pub only_when_online: bool,
    pub is_active: bool,
}

impl ScheduleRequest {
    pub fn new(id: Option<ScheduleId>, valid: ValidSchedule) -> Self {
        Self {
            id,
            name: valid.name,
            cron: valid.cron,
            only_when_online: valid.only_when_online,
            is_active: valid.is_active,
        }
    }
}

/// Create or update a task; the task id travels separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    pub action: String,
    pub payload: String,
    pub time_offset: u32,
    pub continue_on_failure: bool,
}

impl From<&ValidTask> for TaskRequest {
    fn from(task: &ValidTask) -> Self {
        Self {
            action: task.action.kind().to_string(),
            payload: task.action.payload().to_string(),
            time_offset: task.time_offset,
            continue_on_failure: task.continue_on_failure,
        }
    }
}

/// The panel API that stores schedules and tasks.
///
/// An absent id means "create", a present one means "update".
#[async_trait]
pub trait SchedulePersistenceGateway: Send + Sync {
    async fn list_schedules(&self, server: &ServerId) -> Result<Vec<Schedule>, GatewayError>;

    async fn feature_limits(&self, server: &ServerId) -> Result<FeatureLimits, GatewayError>;

    async fn create_or_update_schedule(
        &self,
        server: &ServerId,
        req: &ScheduleRequest,
    ) -> Result<Schedule, GatewayError>;

    async fn create_or_update_schedule_task(
        &self,
        server: &ServerId,
        schedule: ScheduleId,
        task: Option<TaskId>,
        req: &TaskRequest,
    ) -> Result<Task, GatewayError>;

    async fn delete_schedule(&self, server: &ServerId, schedule: ScheduleId)
        -> Result<(), GatewayError>;
}
