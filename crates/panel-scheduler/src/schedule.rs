use panel_core::config::SchedulerConfig;
use panel_core::types::{CronSpec, Schedule};

use crate::cron::{CronExpression, CronField, CronGrammar};
use crate::error::{FieldError, FieldName, ValidationErrors};

/// Raw schedule values as collected from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleInput {
    pub name: String,
    pub cron: CronSpec,
    /// `None` means "not provided" and defaults to `true`.
    pub enabled: Option<bool>,
    pub only_when_online: Option<bool>,
}

/// A schedule that passed local validation and may be handed to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSchedule {
    pub name: String,
    pub cron: CronSpec,
    pub is_active: bool,
    pub only_when_online: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleValidator {
    cron: CronExpression,
}

impl ScheduleValidator {
    pub fn new(cron: CronExpression) -> Self {
        Self { cron }
    }

    pub fn from_config(cfg: &SchedulerConfig) -> Self {
        let grammar = if cfg.strict_cron {
            CronGrammar::Strict
        } else {
            CronGrammar::Lenient
        };
        Self::new(CronExpression::new(grammar))
    }

    /// Validate every field, collecting all failures. Pure.
    pub fn validate(&self, input: &ScheduleInput) -> Result<ValidSchedule, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = input.name.trim();
        if name.is_empty() {
            errors.push(FieldError::Required {
                field: FieldName::Name,
            });
        }

        let mut cron = CronSpec::default();
        for field in CronField::ALL {
            match self.cron.validate_field(field, field.get(&input.cron)) {
                Ok(v) => *field.get_mut(&mut cron) = v.value,
                Err(e) => errors.push(e),
            }
        }

        errors.into_result(|| ValidSchedule {
            name: name.to_string(),
            cron,
            is_active: input.enabled.unwrap_or(true),
            only_when_online: input.only_when_online.unwrap_or(true),
        })
    }
}

/// Editable schedule values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDraft {
    pub name: String,
    pub cron: CronSpec,
    pub enabled: bool,
    pub only_when_online: bool,
}

impl Default for ScheduleDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            cron: CronSpec::default(),
            enabled: true,
            only_when_online: true,
        }
    }
}

impl ScheduleDraft {
    /// Start from a persisted schedule; an empty cron field falls back to its
    /// default on its own.
    pub fn from_schedule(schedule: &Schedule) -> Self {
        let mut cron = CronSpec::default();
        for field in CronField::ALL {
            let persisted = field.get(&schedule.cron);
            if !persisted.is_empty() {
                *field.get_mut(&mut cron) = persisted.to_string();
            }
        }
        Self {
            name: schedule.name.clone(),
            cron,
            enabled: schedule.is_active,
            only_when_online: schedule.only_when_online,
        }
    }

    pub fn to_input(&self) -> ScheduleInput {
        ScheduleInput {
            name: self.name.clone(),
            cron: self.cron.clone(),
            enabled: Some(self.enabled),
            only_when_online: Some(self.only_when_online),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::schedule_fixture;

    fn input(name: &str, cron: &str) -> ScheduleInput {
        ScheduleInput {
            name: name.to_string(),
            cron: cron.parse().unwrap(),
            enabled: None,
            only_when_online: None,
        }
    }

    #[test]
    fn daily_restart_with_defaults_is_valid() {
        let draft = ScheduleDraft {
            name: "Daily Restart".to_string(),
            ..ScheduleDraft::default()
        };
        let valid = ScheduleValidator::default()
            .validate(&draft.to_input())
            .unwrap();
        assert_eq!(valid.name, "Daily Restart");
        assert_eq!(valid.cron.to_string(), "*/5 * * * *");
        assert!(valid.is_active);
        assert!(valid.only_when_online);
    }

    #[test]
    fn absent_flags_default_to_true() {
        let valid = ScheduleValidator::default()
            .validate(&input("n", "0 4 * * *"))
            .unwrap();
        assert!(valid.is_active);
        assert!(valid.only_when_online);

        let mut explicit = input("n", "0 4 * * *");
        explicit.enabled = Some(false);
        explicit.only_when_online = Some(false);
        let valid = ScheduleValidator::default().validate(&explicit).unwrap();
        assert!(!valid.is_active);
        assert!(!valid.only_when_online);
    }

    #[test]
    fn empty_name_is_required() {
        let errors = ScheduleValidator::default()
            .validate(&input("  ", "* * * * *"))
            .unwrap_err();
        assert!(errors.has(FieldName::Name));
        assert_eq!(errors.fields().len(), 1);
    }

    #[test]
    fn every_empty_cron_field_is_reported_independently() {
        let validator = ScheduleValidator::default();
        for empty in CronField::ALL {
            let mut i = input("n", "* * * * *");
            field_clear(&mut i.cron, empty);
            let errors = validator.validate(&i).unwrap_err();
            assert_eq!(errors.fields().len(), 1);
            assert!(errors.has(FieldName::Cron(empty)));
        }
    }

    #[test]
    fn all_errors_collected_at_once() {
        let mut i = input("", "* * * * *");
        for field in CronField::ALL {
            field_clear(&mut i.cron, field);
        }
        let errors = ScheduleValidator::default().validate(&i).unwrap_err();
        assert_eq!(errors.fields().len(), 6);
    }

    #[test]
    fn strict_config_checks_grammar() {
        let validator = ScheduleValidator::from_config(&SchedulerConfig { strict_cron: true });
        let errors = validator.validate(&input("n", "61 * * * *")).unwrap_err();
        assert!(matches!(
            errors.for_field(FieldName::Cron(CronField::Minute)),
            Some(FieldError::InvalidCron { .. })
        ));

        let lenient = ScheduleValidator::from_config(&SchedulerConfig::default());
        assert!(lenient.validate(&input("n", "61 * * * *")).is_ok());
    }

    #[test]
    fn draft_from_schedule_fills_empty_fields_with_defaults() {
        let mut schedule = schedule_fixture(4);
        schedule.cron.minute = String::new();
        schedule.cron.hour = "3".to_string();
        schedule.is_active = false;

        let draft = ScheduleDraft::from_schedule(&schedule);
        assert_eq!(draft.cron.minute, "*/5");
        assert_eq!(draft.cron.hour, "3");
        assert_eq!(draft.name, schedule.name);
        assert!(!draft.enabled);
    }

    fn field_clear(spec: &mut CronSpec, field: CronField) {
        field.get_mut(spec).clear();
    }
}
