use std::fmt;

use thiserror::Error;

use crate::cron::CronField;
use crate::gateway::GatewayError;

/// Editor form field an error is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldName {
    Name,
    Cron(CronField),
    Action,
    Payload,
    TimeOffset,
}

impl FieldName {
    /// Key used when displaying errors inline next to the field.
    pub fn key(&self) -> &'static str {
        match self {
            FieldName::Name => "name",
            FieldName::Cron(field) => field.key(),
            FieldName::Action => "action",
            FieldName::Payload => "payload",
            FieldName::TimeOffset => "timeOffset",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Which end of an inclusive range a value fell off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    Min(i64),
    Max(i64),
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{}", required_message(.field))]
    Required { field: FieldName },

    #[error("{field} must be one of: {}", .allowed.join(", "))]
    InvalidEnum {
        field: FieldName,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("{}", not_a_number_message(.field))]
    NotANumber { field: FieldName, value: String },

    #[error("{}", range_message(.field, .bound))]
    OutOfRange {
        field: FieldName,
        value: i64,
        bound: RangeBound,
    },

    #[error("{field} `{value}` is not a valid cron expression: {reason}")]
    InvalidCron {
        field: FieldName,
        value: String,
        reason: String,
    },
}

impl FieldError {
    pub fn field(&self) -> FieldName {
        match self {
            FieldError::Required { field }
            | FieldError::InvalidEnum { field, .. }
            | FieldError::NotANumber { field, .. }
            | FieldError::OutOfRange { field, .. }
            | FieldError::InvalidCron { field, .. } => *field,
        }
    }
}

fn required_message(field: &FieldName) -> String {
    match field {
        FieldName::Payload => "A task payload must be provided.".to_string(),
        FieldName::TimeOffset => "A time offset value must be provided.".to_string(),
        other => format!("The {other} field is required."),
    }
}

fn not_a_number_message(field: &FieldName) -> String {
    match field {
        FieldName::TimeOffset => {
            "The time offset must be a valid number between 0 and 900.".to_string()
        }
        other => format!("The {other} field must be a whole number."),
    }
}

fn range_message(field: &FieldName, bound: &RangeBound) -> String {
    match (field, bound) {
        (FieldName::TimeOffset, RangeBound::Min(min)) => {
            format!("The time offset must be at least {min} seconds.")
        }
        (FieldName::TimeOffset, RangeBound::Max(max)) => {
            format!("The time offset must be less than {max} seconds.")
        }
        (other, RangeBound::Min(min)) => format!("The {other} field must be at least {min}."),
        (other, RangeBound::Max(max)) => format!("The {other} field must be at most {max}."),
    }
}

/// Raised before persistence when a backup task targets a server whose
/// backup limit is zero. Independent of field validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("A backup task cannot be created when the server's backup limit is set to 0.")]
pub struct QuotaExceeded;

/// Every failure found in one validation pass; never short-circuited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: Vec<FieldError>,
    quota: Option<QuotaExceeded>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.fields.push(error);
    }

    pub fn set_quota_exceeded(&mut self) {
        self.quota = Some(QuotaExceeded);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.quota.is_none()
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.fields
    }

    /// First error reported for `field`, if any.
    pub fn for_field(&self, field: FieldName) -> Option<&FieldError> {
        self.fields.iter().find(|e| e.field() == field)
    }

    pub fn has(&self, field: FieldName) -> bool {
        self.for_field(field).is_some()
    }

    pub fn quota_exceeded(&self) -> Option<QuotaExceeded> {
        self.quota
    }

    /// Drop errors for one field, e.g. after the field was reset.
    pub fn clear_field(&mut self, field: FieldName) {
        self.fields.retain(|e| e.field() != field);
    }

    pub(crate) fn into_result<T>(
        self,
        value: impl FnOnce() -> T,
    ) -> std::result::Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for e in &self.fields {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {e}", e.field())?;
            first = false;
        }
        if let Some(q) = &self.quota {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{q}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Why an editor refused an operation or a submit did not commit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("validation failed: {0}")]
    Invalid(ValidationErrors),

    #[error("a submission is already in progress")]
    Busy,

    #[error("the editor has been closed")]
    Closed,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

pub type Result<T> = std::result::Result<T, EditorError>;
