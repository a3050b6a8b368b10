// Client API paths and object discriminators: must match the panel exactly.

use panel_core::types::{ScheduleId, ServerId, TaskId};

pub const OBJECT_LIST: &str = "list";
pub const OBJECT_SERVER: &str = "server";
pub const OBJECT_SCHEDULE: &str = "server_schedule";
pub const OBJECT_TASK: &str = "schedule_task";

/// `GET /api/client/servers/{server}`
pub fn server(server: &ServerId) -> String {
    format!("/api/client/servers/{server}")
}

/// `GET /api/client/servers/{server}/schedules`
pub fn schedules(server: &ServerId) -> String {
    format!("/api/client/servers/{server}/schedules")
}

/// Create when `id` is `None`, update otherwise.
/// `POST /api/client/servers/{server}/schedules[/{id}]`
pub fn schedule(server: &ServerId, id: Option<ScheduleId>) -> String {
    match id {
        Some(id) => format!("{}/{id}", schedules(server)),
        None => schedules(server),
    }
}

/// Create when `task` is `None`, update otherwise.
/// `POST /api/client/servers/{server}/schedules/{schedule}/tasks[/{task}]`
pub fn schedule_task(server: &ServerId, schedule: ScheduleId, task: Option<TaskId>) -> String {
    let base = format!("{}/{schedule}/tasks", schedules(server));
    match task {
        Some(task) => format!("{base}/{task}"),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_update_paths_differ_only_by_id() {
        let server = ServerId::from("1a7ce997");
        assert_eq!(
            schedule(&server, None),
            "/api/client/servers/1a7ce997/schedules"
        );
        assert_eq!(
            schedule(&server, Some(ScheduleId(4))),
            "/api/client/servers/1a7ce997/schedules/4"
        );
    }

    #[test]
    fn task_paths() {
        let server = ServerId::from("1a7ce997");
        assert_eq!(
            schedule_task(&server, ScheduleId(4), None),
            "/api/client/servers/1a7ce997/schedules/4/tasks"
        );
        assert_eq!(
            schedule_task(&server, ScheduleId(4), Some(TaskId(9))),
            "/api/client/servers/1a7ce997/schedules/4/tasks/9"
        );
    }
}
