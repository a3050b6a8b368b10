//! Task validation and the action-switch transition of the task editor.
//!
//! A task's payload means something different for each action, so the
//! validated form is a [`TaskAction`] union: a command line, a power signal,
//! or a backup ignore list. Raw form values stay strings until then.

use std::fmt;
use std::str::FromStr;

use panel_core::config::MAX_TIME_OFFSET_SECS;
use panel_core::types::Task;

use crate::error::{FieldError, FieldName, RangeBound, ValidationErrors};

pub const ACTIONS: &[&str] = &["command", "power", "backup"];
pub const POWER_SIGNALS: &[&str] = &["start", "restart", "stop", "kill"];

/// Action a new task starts with.
pub const DEFAULT_ACTION: &str = "command";
/// Payload a task gets when switched to `power`.
pub const DEFAULT_POWER_PAYLOAD: &str = "start";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerAction {
    Start,
    Restart,
    Stop,
    Kill,
}

impl PowerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerAction::Start => "start",
            PowerAction::Restart => "restart",
            PowerAction::Stop => "stop",
            PowerAction::Kill => "kill",
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PowerAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(PowerAction::Start),
            "restart" => Ok(PowerAction::Restart),
            "stop" => Ok(PowerAction::Stop),
            "kill" => Ok(PowerAction::Kill),
            other => Err(format!("unknown power action: {other}")),
        }
    }
}

/// What a validated task does, with the payload shape its action requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    /// Console command; never empty.
    Command { command: String },
    Power(PowerAction),
    /// Backup with an optional newline-separated ignore list.
    Backup { ignored_files: String },
}

impl TaskAction {
    /// Wire name of the action.
    pub fn kind(&self) -> &'static str {
        match self {
            TaskAction::Command { .. } => "command",
            TaskAction::Power(_) => "power",
            TaskAction::Backup { .. } => "backup",
        }
    }

    /// Wire payload of the action.
    pub fn payload(&self) -> &str {
        match self {
            TaskAction::Command { command } => command,
            TaskAction::Power(signal) => signal.as_str(),
            TaskAction::Backup { ignored_files } => ignored_files,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionKind {
    Command,
    Power,
    Backup,
}

impl ActionKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "command" => Some(ActionKind::Command),
            "power" => Some(ActionKind::Power),
            "backup" => Some(ActionKind::Backup),
            _ => None,
        }
    }
}

/// Raw task values as collected from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    pub action: String,
    pub payload: String,
    /// Seconds, as typed.
    pub time_offset: String,
    pub continue_on_failure: bool,
}

/// Environment limits a task is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskContext {
    pub backup_quota_remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTask {
    pub action: TaskAction,
    pub time_offset: u32,
    pub continue_on_failure: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TaskValidator;

impl TaskValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate every field and the backup quota, collecting all failures.
    pub fn validate(
        &self,
        input: &TaskInput,
        ctx: &TaskContext,
    ) -> Result<ValidTask, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let payload = input.payload.as_str();
        let kind = ActionKind::parse(input.action.trim());
        if kind.is_none() {
            errors.push(FieldError::InvalidEnum {
                field: FieldName::Action,
                value: input.action.clone(),
                allowed: ACTIONS,
            });
        }

        let action = match kind {
            Some(ActionKind::Backup) => {
                if ctx.backup_quota_remaining == 0 {
                    errors.set_quota_exceeded();
                }
                Some(TaskAction::Backup {
                    ignored_files: payload.to_string(),
                })
            }
            _ if payload.trim().is_empty() => {
                errors.push(FieldError::Required {
                    field: FieldName::Payload,
                });
                None
            }
            Some(ActionKind::Command) => Some(TaskAction::Command {
                command: payload.to_string(),
            }),
            Some(ActionKind::Power) => match payload.trim().parse::<PowerAction>() {
                Ok(signal) => Some(TaskAction::Power(signal)),
                Err(_) => {
                    errors.push(FieldError::InvalidEnum {
                        field: FieldName::Payload,
                        value: payload.to_string(),
                        allowed: POWER_SIGNALS,
                    });
                    None
                }
            },
            None => None,
        };

        let time_offset = match parse_time_offset(&input.time_offset) {
            Ok(v) => v,
            Err(e) => {
                errors.push(e);
                0
            }
        };

        let action = match action {
            Some(action) if errors.is_empty() => action,
            _ => return Err(errors),
        };

        Ok(ValidTask {
            action,
            time_offset,
            continue_on_failure: input.continue_on_failure,
        })
    }
}

fn parse_time_offset(raw: &str) -> Result<u32, FieldError> {
    let field = FieldName::TimeOffset;
    let s = raw.trim();
    if s.is_empty() {
        return Err(FieldError::Required { field });
    }
    let value = match s.parse::<i64>() {
        Ok(v) => v,
        Err(e) => {
            use std::num::IntErrorKind;
            // an integer too large for i64 is still an integer, just out of range
            let bound = match e.kind() {
                IntErrorKind::PosOverflow => RangeBound::Max(MAX_TIME_OFFSET_SECS),
                IntErrorKind::NegOverflow => RangeBound::Min(0),
                _ => {
                    return Err(FieldError::NotANumber {
                        field,
                        value: s.to_string(),
                    })
                }
            };
            let value = if matches!(bound, RangeBound::Min(_)) {
                i64::MIN
            } else {
                i64::MAX
            };
            return Err(FieldError::OutOfRange {
                field,
                value,
                bound,
            });
        }
    };
    if value < 0 {
        return Err(FieldError::OutOfRange {
            field,
            value,
            bound: RangeBound::Min(0),
        });
    }
    if value > MAX_TIME_OFFSET_SECS {
        return Err(FieldError::OutOfRange {
            field,
            value,
            bound: RangeBound::Max(MAX_TIME_OFFSET_SECS),
        });
    }
    Ok(value as u32)
}

/// Editable task values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub action: String,
    pub payload: String,
    pub time_offset: String,
    pub continue_on_failure: bool,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            action: DEFAULT_ACTION.to_string(),
            payload: String::new(),
            time_offset: "0".to_string(),
            continue_on_failure: false,
        }
    }
}

impl TaskDraft {
    pub fn from_task(task: &Task) -> Self {
        Self {
            action: if task.action.is_empty() {
                DEFAULT_ACTION.to_string()
            } else {
                task.action.clone()
            },
            payload: task.payload.clone(),
            time_offset: task.time_offset.to_string(),
            continue_on_failure: task.continue_on_failure,
        }
    }

    pub fn to_input(&self) -> TaskInput {
        TaskInput {
            action: self.action.clone(),
            payload: self.payload.clone(),
            time_offset: self.time_offset.clone(),
            continue_on_failure: self.continue_on_failure,
        }
    }
}

/// Where an edit session stands relative to the action it was opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Unmodified,
    ChangedAway,
    Reverted,
}

/// Resets the payload whenever the action changes, keyed on the action and
/// payload captured when the editor opened.
#[derive(Debug, Clone)]
pub struct ActionTracker {
    initial_action: String,
    initial_payload: String,
    state: ActionState,
}

impl ActionTracker {
    pub fn new(initial: &TaskDraft) -> Self {
        Self {
            initial_action: initial.action.clone(),
            initial_payload: initial.payload.clone(),
            state: ActionState::Unmodified,
        }
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    /// Apply the transition after `draft.action` changed.
    pub fn on_action_changed(&mut self, draft: &mut TaskDraft) -> ActionState {
        if draft.action != self.initial_action {
            draft.payload = if draft.action == "power" {
                DEFAULT_POWER_PAYLOAD.to_string()
            } else {
                String::new()
            };
            self.state = ActionState::ChangedAway;
        } else {
            draft.payload = self.initial_payload.clone();
            if self.state == ActionState::ChangedAway {
                self.state = ActionState::Reverted;
            }
        }
        self.state
    }
}
