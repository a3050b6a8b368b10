//! `panel-scheduler`: schedule and task editing for a game-server panel.
//!
//! # Overview
//!
//! A schedule fires a cron expression on the daemon and runs its tasks in
//! sequence. This crate owns everything that happens before the panel API
//! sees a change:
//!
//! | Module       | Role                                                     |
//! |--------------|----------------------------------------------------------|
//! | [`cron`]     | Per-field cron checks and a next-run preview              |
//! | [`schedule`] | Schedule form validation and drafts                       |
//! | [`task`]     | Task form validation, action/payload reset rules          |
//! | [`editor`]   | Edit sessions with a ticketed submit                      |
//! | [`server`]   | The per-server schedule list that commits merge into      |
//! | [`gateway`]  | The persistence boundary (`SchedulePersistenceGateway`)   |
//!
//! Nothing here performs I/O itself; a gateway implementation (see
//! `panel-client`) does.

pub mod cron;
pub mod editor;
pub mod error;
pub mod gateway;
pub mod schedule;
pub mod server;
pub mod task;

#[cfg(test)]
mod testing;

pub use crate::cron::{next_run_after, CronExpression, CronField, CronGrammar};
pub use editor::{Completion, EditorPhase, ScheduleEditor, SubmitTicket, TaskEditor, TaskSubmission};
pub use error::{EditorError, FieldError, FieldName, QuotaExceeded, Result, ValidationErrors};
pub use gateway::{GatewayError, ScheduleRequest, SchedulePersistenceGateway, TaskRequest};
pub use schedule::{ScheduleDraft, ScheduleInput, ScheduleValidator, ValidSchedule};
pub use server::ServerSchedules;
pub use task::{
    ActionState, ActionTracker, PowerAction, TaskAction, TaskContext, TaskDraft, TaskInput,
    TaskValidator, ValidTask,
};
