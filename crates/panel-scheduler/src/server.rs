use panel_core::types::{FeatureLimits, Schedule, ScheduleId, ServerId, Task};
use tracing::{info, warn};

use crate::gateway::{GatewayError, SchedulePersistenceGateway};
use crate::task::TaskContext;

/// Schedules of one server, owned by the server-session context.
///
/// Editors hold their own drafts and only write here on commit; a commit
/// replaces the record with the same id or appends a new one.
#[derive(Debug, Clone)]
pub struct ServerSchedules {
    server: ServerId,
    limits: FeatureLimits,
    schedules: Vec<Schedule>,
}

impl ServerSchedules {
    pub fn new(server: ServerId, limits: FeatureLimits, schedules: Vec<Schedule>) -> Self {
        Self {
            server,
            limits,
            schedules,
        }
    }

    /// Fetch limits and schedules for `server`.
    pub async fn load(
        gateway: &dyn SchedulePersistenceGateway,
        server: ServerId,
    ) -> Result<Self, GatewayError> {
        let limits = gateway.feature_limits(&server).await?;
        let schedules = gateway.list_schedules(&server).await?;
        info!(server = %server, count = schedules.len(), "schedules loaded");
        Ok(Self::new(server, limits, schedules))
    }

    pub fn server(&self) -> &ServerId {
        &self.server
    }

    pub fn limits(&self) -> FeatureLimits {
        self.limits
    }

    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    pub fn get(&self, id: ScheduleId) -> Option<&Schedule> {
        self.schedules.iter().find(|s| s.id == id)
    }

    pub fn task_context(&self) -> TaskContext {
        TaskContext {
            backup_quota_remaining: self.limits.backups,
        }
    }

    /// Replace the schedule with the same id, or append it. Returns `true`
    /// when an existing record was replaced.
    pub fn append_schedule(&mut self, schedule: Schedule) -> bool {
        match self.schedules.iter_mut().find(|s| s.id == schedule.id) {
            Some(existing) => {
                *existing = schedule;
                true
            }
            None => {
                self.schedules.push(schedule);
                false
            }
        }
    }

    /// Merge a saved task into its schedule. `fallback` is used when the
    /// schedule is not (or no longer) in the list.
    pub fn upsert_task(&mut self, fallback: &Schedule, task: Task) {
        let mut schedule = self
            .get(fallback.id)
            .cloned()
            .unwrap_or_else(|| fallback.clone());
        match schedule.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => schedule.tasks.push(task),
        }
        self.append_schedule(schedule);
    }

    pub fn remove_schedule(&mut self, id: ScheduleId) -> bool {
        let before = self.schedules.len();
        self.schedules.retain(|s| s.id != id);
        self.schedules.len() < before
    }

    /// Delete through the gateway, then drop the local record. On failure the
    /// list is left untouched and the gateway message is returned.
    pub async fn delete_schedule(
        &mut self,
        gateway: &dyn SchedulePersistenceGateway,
        id: ScheduleId,
    ) -> Result<(), GatewayError> {
        if let Err(e) = gateway.delete_schedule(&self.server, id).await {
            warn!(server = %self.server, schedule_id = %id, error = %e, "schedule delete failed");
            return Err(e);
        }
        self.remove_schedule(id);
        info!(server = %self.server, schedule_id = %id, "schedule deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{schedule_fixture, task_fixture, MockGateway};
    use panel_core::types::TaskId;

    fn server_with(schedules: Vec<Schedule>) -> ServerSchedules {
        ServerSchedules::new(
            ServerId::from("1a7ce997"),
            FeatureLimits {
                backups: 2,
                ..Default::default()
            },
            schedules,
        )
    }

    #[test]
    fn append_replaces_by_id() {
        let mut server = server_with(vec![schedule_fixture(1), schedule_fixture(2)]);
        let mut updated = schedule_fixture(2);
        updated.name = "Renamed".to_string();

        assert!(server.append_schedule(updated));
        assert_eq!(server.schedules().len(), 2);
        assert_eq!(server.get(ScheduleId(2)).unwrap().name, "Renamed");
        // order preserved
        assert_eq!(server.schedules()[0].id, ScheduleId(1));
    }

    #[test]
    fn append_pushes_new_schedule() {
        let mut server = server_with(vec![schedule_fixture(1)]);
        assert!(!server.append_schedule(schedule_fixture(9)));
        assert_eq!(server.schedules().len(), 2);
        assert_eq!(server.schedules()[1].id, ScheduleId(9));
    }

    #[test]
    fn upsert_task_replaces_or_appends() {
        let mut schedule = schedule_fixture(1);
        schedule.tasks = vec![task_fixture(10, "command", "say a")];
        let mut server = server_with(vec![schedule.clone()]);

        server.upsert_task(&schedule, task_fixture(10, "command", "say b"));
        server.upsert_task(&schedule, task_fixture(11, "power", "stop"));

        let tasks = &server.get(ScheduleId(1)).unwrap().tasks;
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].payload, "say b");
        assert_eq!(tasks[1].id, TaskId(11));
    }

    #[test]
    fn upsert_task_uses_current_list_copy() {
        let captured = schedule_fixture(1);
        let mut server = server_with(vec![captured.clone()]);
        let mut renamed = captured.clone();
        renamed.name = "Renamed meanwhile".to_string();
        server.append_schedule(renamed);

        server.upsert_task(&captured, task_fixture(10, "command", "say a"));
        let current = server.get(ScheduleId(1)).unwrap();
        assert_eq!(current.name, "Renamed meanwhile");
        assert_eq!(current.tasks.len(), 1);
    }

    #[test]
    fn task_context_reflects_backup_limit() {
        let server = server_with(Vec::new());
        assert_eq!(server.task_context().backup_quota_remaining, 2);
    }

    #[tokio::test]
    async fn delete_removes_on_success() {
        let gateway = MockGateway::ok();
        let mut server = server_with(vec![schedule_fixture(1), schedule_fixture(2)]);

        server.delete_schedule(&gateway, ScheduleId(1)).await.unwrap();
        assert!(server.get(ScheduleId(1)).is_none());
        assert_eq!(server.schedules().len(), 1);
    }

    #[tokio::test]
    async fn delete_failure_keeps_list() {
        let gateway = MockGateway::failing("This schedule is currently processing.");
        let mut server = server_with(vec![schedule_fixture(1)]);

        let err = server
            .delete_schedule(&gateway, ScheduleId(1))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "This schedule is currently processing.");
        assert!(server.get(ScheduleId(1)).is_some());
    }

    #[tokio::test]
    async fn load_fetches_limits_and_schedules() {
        let gateway = MockGateway::ok().with_schedules(vec![schedule_fixture(3)]);
        let server = ServerSchedules::load(&gateway, ServerId::from("1a7ce997"))
            .await
            .unwrap();
        assert_eq!(server.schedules().len(), 1);
        assert_eq!(server.limits().backups, gateway.backups());
    }
}
