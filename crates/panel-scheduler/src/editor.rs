//! Edit sessions for schedules and tasks.
//!
//! ```text
//! Idle ──edit──▶ Editing ──begin_submit──▶ Submitting ──ok──▶ Committed
//!   │               ▲  │                        │
//!   │               │  └──────dismiss────┐      └──gateway error──▶ Editing
//!   └──dismiss──────┼────────────────────┴──▶ Cancelled
//!                   └── invalid input
//! ```
//!
//! A submit is split in two so it can be driven without holding the editor
//! across the network call: [`ScheduleEditor::begin_submit`] validates and
//! hands out a [`SubmitTicket`], and `complete_submit` applies the gateway
//! result for that ticket. Dismissal is refused while a submit is
//! outstanding; `dispose` always succeeds and makes any outstanding ticket
//! stale, so a late result is discarded instead of merged.

use std::collections::BTreeSet;

use panel_core::types::{Schedule, ScheduleId, Task, TaskId};
use tracing::{debug, info, warn};

use crate::cron::CronField;
use crate::error::{EditorError, FieldName, Result, ValidationErrors};
use crate::gateway::{GatewayError, ScheduleRequest, SchedulePersistenceGateway, TaskRequest};
use crate::schedule::{ScheduleDraft, ScheduleValidator};
use crate::server::ServerSchedules;
use crate::task::{ActionState, ActionTracker, TaskContext, TaskDraft, TaskValidator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPhase {
    Idle,
    Editing,
    Submitting,
    Committed,
    Cancelled,
}

/// Proof of an outstanding submit; carries the request for the gateway.
#[derive(Debug)]
#[must_use]
pub struct SubmitTicket<R> {
    generation: u64,
    request: R,
}

impl<R> SubmitTicket<R> {
    pub fn request(&self) -> &R {
        &self.request
    }
}

/// What applying a gateway result did.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion<T> {
    /// Merged into the server list; the editor is closed.
    Committed(T),
    /// Back to editing with the message as the flash error.
    Failed(GatewayError),
    /// The ticket was stale (editor disposed); nothing changed.
    Discarded,
}

impl<T> Completion<T> {
    fn into_result(self) -> Result<T> {
        match self {
            Completion::Committed(v) => Ok(v),
            Completion::Failed(e) => Err(EditorError::Gateway(e)),
            Completion::Discarded => Err(EditorError::Closed),
        }
    }
}

#[derive(Debug, Clone)]
struct Session {
    phase: EditorPhase,
    generation: u64,
    flash: Option<String>,
}

impl Session {
    fn new() -> Self {
        Self {
            phase: EditorPhase::Idle,
            generation: 0,
            flash: None,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        match self.phase {
            EditorPhase::Submitting => Err(EditorError::Busy),
            EditorPhase::Committed | EditorPhase::Cancelled => Err(EditorError::Closed),
            EditorPhase::Idle | EditorPhase::Editing => Ok(()),
        }
    }

    fn edit(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.phase = EditorPhase::Editing;
        Ok(())
    }

    fn begin(&mut self) -> u64 {
        self.flash = None;
        self.phase = EditorPhase::Submitting;
        self.generation += 1;
        self.generation
    }

    fn accepts(&self, generation: u64) -> bool {
        self.phase == EditorPhase::Submitting && self.generation == generation
    }

    fn fail(&mut self, message: String) {
        self.flash = Some(message);
        self.phase = EditorPhase::Editing;
    }

    fn dismiss(&mut self) -> Result<()> {
        match self.phase {
            EditorPhase::Submitting => Err(EditorError::Busy),
            EditorPhase::Committed | EditorPhase::Cancelled => Ok(()),
            EditorPhase::Idle | EditorPhase::Editing => {
                self.phase = EditorPhase::Cancelled;
                Ok(())
            }
        }
    }

    fn dispose(&mut self) {
        if self.phase != EditorPhase::Committed {
            self.phase = EditorPhase::Cancelled;
        }
        self.generation += 1;
    }
}

/// Edits one schedule, new or persisted.
#[derive(Debug, Clone)]
pub struct ScheduleEditor {
    schedule_id: Option<ScheduleId>,
    draft: ScheduleDraft,
    validator: ScheduleValidator,
    session: Session,
    errors: ValidationErrors,
}

impl ScheduleEditor {
    /// Editor for a new schedule with default values.
    pub fn create(validator: ScheduleValidator) -> Self {
        Self {
            schedule_id: None,
            draft: ScheduleDraft::default(),
            validator,
            session: Session::new(),
            errors: ValidationErrors::new(),
        }
    }

    /// Editor for an existing schedule.
    pub fn edit(validator: ScheduleValidator, schedule: &Schedule) -> Self {
        Self {
            schedule_id: Some(schedule.id),
            draft: ScheduleDraft::from_schedule(schedule),
            ..Self::create(validator)
        }
    }

    pub fn is_new(&self) -> bool {
        self.schedule_id.is_none()
    }

    pub fn schedule_id(&self) -> Option<ScheduleId> {
        self.schedule_id
    }

    pub fn draft(&self) -> &ScheduleDraft {
        &self.draft
    }

    pub fn phase(&self) -> EditorPhase {
        self.session.phase
    }

    /// Most recent gateway error, cleared when the next submit starts.
    pub fn flash(&self) -> Option<&str> {
        self.session.flash.as_deref()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        self.session.edit()?;
        self.draft.name = name.into();
        Ok(())
    }

    pub fn set_cron_field(&mut self, field: CronField, value: impl Into<String>) -> Result<()> {
        self.session.edit()?;
        *field.get_mut(&mut self.draft.cron) = value.into();
        Ok(())
    }

    pub fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        self.session.edit()?;
        self.draft.enabled = enabled;
        Ok(())
    }

    pub fn set_only_when_online(&mut self, only_when_online: bool) -> Result<()> {
        self.session.edit()?;
        self.draft.only_when_online = only_when_online;
        Ok(())
    }

    /// Validate and enter `Submitting`. Invalid input keeps the editor in
    /// `Editing` with the errors available from [`errors`](Self::errors).
    pub fn begin_submit(&mut self) -> Result<SubmitTicket<ScheduleRequest>> {
        self.session.ensure_open()?;
        match self.validator.validate(&self.draft.to_input()) {
            Ok(valid) => {
                self.errors = ValidationErrors::new();
                let generation = self.session.begin();
                debug!(schedule_id = ?self.schedule_id, "schedule submit started");
                Ok(SubmitTicket {
                    generation,
                    request: ScheduleRequest::new(self.schedule_id, valid),
                })
            }
            Err(errors) => {
                self.session.phase = EditorPhase::Editing;
                self.errors = errors.clone();
                Err(EditorError::Invalid(errors))
            }
        }
    }

    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket<ScheduleRequest>,
        result: std::result::Result<Schedule, GatewayError>,
        server: &mut ServerSchedules,
    ) -> Completion<Schedule> {
        if !self.session.accepts(ticket.generation) {
            debug!(schedule_id = ?self.schedule_id, "stale schedule submit result discarded");
            return Completion::Discarded;
        }
        match result {
            Ok(schedule) => {
                self.schedule_id = Some(schedule.id);
                server.append_schedule(schedule.clone());
                self.session.phase = EditorPhase::Committed;
                info!(schedule_id = %schedule.id, name = %schedule.name, "schedule saved");
                Completion::Committed(schedule)
            }
            Err(e) => {
                warn!(schedule_id = ?self.schedule_id, error = %e, "schedule save failed");
                self.session.fail(e.message());
                Completion::Failed(e)
            }
        }
    }

    /// Validate, call the gateway and merge the result.
    pub async fn submit(
        &mut self,
        gateway: &dyn SchedulePersistenceGateway,
        server: &mut ServerSchedules,
    ) -> Result<Schedule> {
        let ticket = self.begin_submit()?;
        let result = gateway
            .create_or_update_schedule(server.server(), ticket.request())
            .await;
        self.complete_submit(ticket, result, server).into_result()
    }

    /// Close without saving. Refused while a submit is outstanding.
    pub fn dismiss(&mut self) -> Result<()> {
        self.session.dismiss()
    }

    /// Tear the editor down unconditionally; a pending result will be ignored.
    pub fn dispose(&mut self) {
        self.session.dispose();
    }
}

/// Gateway request produced by a task submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSubmission {
    pub schedule: ScheduleId,
    /// `None` creates a task.
    pub task: Option<TaskId>,
    pub body: TaskRequest,
}

/// Edits one task of a schedule, new or persisted.
#[derive(Debug, Clone)]
pub struct TaskEditor {
    schedule: Schedule,
    task_id: Option<TaskId>,
    draft: TaskDraft,
    tracker: ActionTracker,
    validator: TaskValidator,
    session: Session,
    errors: ValidationErrors,
    touched: BTreeSet<FieldName>,
}

impl TaskEditor {
    /// Editor for a new task in `schedule`.
    pub fn create(schedule: &Schedule) -> Self {
        Self::open(schedule, None, TaskDraft::default())
    }

    /// Editor for an existing task of `schedule`.
    pub fn edit(schedule: &Schedule, task: &Task) -> Self {
        Self::open(schedule, Some(task.id), TaskDraft::from_task(task))
    }

    fn open(schedule: &Schedule, task_id: Option<TaskId>, draft: TaskDraft) -> Self {
        Self {
            schedule: schedule.clone(),
            task_id,
            tracker: ActionTracker::new(&draft),
            draft,
            validator: TaskValidator::new(),
            session: Session::new(),
            errors: ValidationErrors::new(),
            touched: BTreeSet::new(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.task_id.is_none()
    }

    pub fn task_id(&self) -> Option<TaskId> {
        self.task_id
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    pub fn phase(&self) -> EditorPhase {
        self.session.phase
    }

    pub fn flash(&self) -> Option<&str> {
        self.session.flash.as_deref()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn is_touched(&self, field: FieldName) -> bool {
        self.touched.contains(&field)
    }

    /// Change the action and run the payload reset transition.
    pub fn set_action(&mut self, action: impl Into<String>) -> Result<ActionState> {
        self.session.edit()?;
        let action = action.into();
        if action == self.draft.action {
            return Ok(self.tracker.state());
        }
        self.draft.action = action;
        self.touched.insert(FieldName::Action);
        let state = self.tracker.on_action_changed(&mut self.draft);
        self.touched.remove(&FieldName::Payload);
        self.errors.clear_field(FieldName::Payload);
        Ok(state)
    }

    pub fn set_payload(&mut self, payload: impl Into<String>) -> Result<()> {
        self.session.edit()?;
        self.draft.payload = payload.into();
        self.touched.insert(FieldName::Payload);
        Ok(())
    }

    pub fn set_time_offset(&mut self, time_offset: impl Into<String>) -> Result<()> {
        self.session.edit()?;
        self.draft.time_offset = time_offset.into();
        self.touched.insert(FieldName::TimeOffset);
        Ok(())
    }

    pub fn set_continue_on_failure(&mut self, continue_on_failure: bool) -> Result<()> {
        self.session.edit()?;
        self.draft.continue_on_failure = continue_on_failure;
        Ok(())
    }

    /// Validate against `ctx` (including the backup quota) and enter
    /// `Submitting`.
    pub fn begin_submit(&mut self, ctx: TaskContext) -> Result<SubmitTicket<TaskSubmission>> {
        self.session.ensure_open()?;
        match self.validator.validate(&self.draft.to_input(), &ctx) {
            Ok(valid) => {
                self.errors = ValidationErrors::new();
                let generation = self.session.begin();
                debug!(schedule_id = %self.schedule.id, task_id = ?self.task_id, "task submit started");
                Ok(SubmitTicket {
                    generation,
                    request: TaskSubmission {
                        schedule: self.schedule.id,
                        task: self.task_id,
                        body: TaskRequest::from(&valid),
                    },
                })
            }
            Err(errors) => {
                if errors.quota_exceeded().is_some() {
                    warn!(schedule_id = %self.schedule.id, "backup task refused: backup limit is 0");
                }
                self.session.phase = EditorPhase::Editing;
                self.errors = errors.clone();
                Err(EditorError::Invalid(errors))
            }
        }
    }

    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket<TaskSubmission>,
        result: std::result::Result<Task, GatewayError>,
        server: &mut ServerSchedules,
    ) -> Completion<Task> {
        if !self.session.accepts(ticket.generation) {
            debug!(schedule_id = %self.schedule.id, "stale task submit result discarded");
            return Completion::Discarded;
        }
        match result {
            Ok(task) => {
                self.task_id = Some(task.id);
                server.upsert_task(&self.schedule, task.clone());
                self.session.phase = EditorPhase::Committed;
                info!(schedule_id = %self.schedule.id, task_id = %task.id, action = %task.action, "task saved");
                Completion::Committed(task)
            }
            Err(e) => {
                warn!(schedule_id = %self.schedule.id, task_id = ?self.task_id, error = %e, "task save failed");
                self.session.fail(e.message());
                Completion::Failed(e)
            }
        }
    }

    pub async fn submit(
        &mut self,
        gateway: &dyn SchedulePersistenceGateway,
        server: &mut ServerSchedules,
    ) -> Result<Task> {
        let ticket = self.begin_submit(server.task_context())?;
        let sub = ticket.request();
        let result = gateway
            .create_or_update_schedule_task(server.server(), sub.schedule, sub.task, &sub.body)
            .await;
        self.complete_submit(ticket, result, server).into_result()
    }

    pub fn dismiss(&mut self) -> Result<()> {
        self.session.dismiss()
    }

    pub fn dispose(&mut self) {
        self.session.dispose();
    }
}
