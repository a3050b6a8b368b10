use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use tracing::info;

use panel_client::HttpGateway;
use panel_core::config::PanelConfig;
use panel_core::types::{CronSpec, Schedule, ScheduleId, ServerId, TaskId};
use panel_scheduler::{
    next_run_after, CronExpression, CronField, CronGrammar, EditorError, ScheduleEditor,
    ScheduleValidator, ServerSchedules, TaskEditor,
};

use crate::cli::{ScheduleCommand, ScheduleFields, TaskCommand};

pub async fn schedules(config: &PanelConfig, cmd: ScheduleCommand) -> anyhow::Result<()> {
    match cmd {
        ScheduleCommand::List { server } => {
            let gateway = HttpGateway::new(&config.api)?;
            let list = ServerSchedules::load(&gateway, ServerId::from(server)).await?;
            println!(
                "{} schedule(s), backup limit {}",
                list.schedules().len(),
                list.limits().backups
            );
            for schedule in list.schedules() {
                print_schedule(schedule);
            }
        }
        ScheduleCommand::Check { cron, strict } => {
            let grammar = if strict || config.scheduler.strict_cron {
                CronGrammar::Strict
            } else {
                CronGrammar::Lenient
            };
            check(&cron, grammar)?;
        }
        ScheduleCommand::Create { server, fields } => {
            let gateway = HttpGateway::new(&config.api)?;
            let mut list = ServerSchedules::load(&gateway, ServerId::from(server)).await?;
            let editor = ScheduleEditor::create(ScheduleValidator::from_config(&config.scheduler));
            save_schedule(editor, fields, &gateway, &mut list).await?;
        }
        ScheduleCommand::Update { server, id, fields } => {
            let gateway = HttpGateway::new(&config.api)?;
            let mut list = ServerSchedules::load(&gateway, ServerId::from(server)).await?;
            let existing = list
                .get(ScheduleId(id))
                .cloned()
                .with_context(|| format!("schedule #{id} not found"))?;
            let editor =
                ScheduleEditor::edit(ScheduleValidator::from_config(&config.scheduler), &existing);
            save_schedule(editor, fields, &gateway, &mut list).await?;
        }
        ScheduleCommand::Delete { server, id } => {
            let gateway = HttpGateway::new(&config.api)?;
            let mut list = ServerSchedules::load(&gateway, ServerId::from(server)).await?;
            if list.get(ScheduleId(id)).is_none() {
                bail!("schedule #{id} not found");
            }
            list.delete_schedule(&gateway, ScheduleId(id)).await?;
            println!("deleted schedule #{id}");
        }
    }
    Ok(())
}

pub async fn tasks(config: &PanelConfig, cmd: TaskCommand) -> anyhow::Result<()> {
    let TaskCommand::Save {
        server,
        schedule,
        task,
        action,
        payload,
        time_offset,
        continue_on_failure,
    } = cmd;

    let gateway = HttpGateway::new(&config.api)?;
    let mut list = ServerSchedules::load(&gateway, ServerId::from(server)).await?;
    let owner = list
        .get(ScheduleId(schedule))
        .cloned()
        .with_context(|| format!("schedule #{schedule} not found"))?;

    let mut editor = match task {
        Some(id) => {
            let existing = owner
                .task(TaskId(id))
                .with_context(|| format!("task #{id} not found in schedule #{schedule}"))?;
            TaskEditor::edit(&owner, existing)
        }
        None => TaskEditor::create(&owner),
    };

    if let Some(action) = action {
        editor.set_action(action)?;
    }
    if let Some(payload) = payload {
        editor.set_payload(payload)?;
    }
    if let Some(offset) = time_offset {
        editor.set_time_offset(offset)?;
    }
    if let Some(flag) = continue_on_failure {
        editor.set_continue_on_failure(flag)?;
    }

    let verb = if editor.is_new() { "created" } else { "updated" };
    let saved = editor.submit(&gateway, &mut list).await.map_err(report)?;
    info!(schedule_id = %schedule, task_id = %saved.id, "task saved");
    println!(
        "{verb} task #{} in schedule #{schedule}: {} {:?} (+{}s)",
        saved.id, saved.action, saved.payload, saved.time_offset
    );
    Ok(())
}

async fn save_schedule(
    mut editor: ScheduleEditor,
    fields: ScheduleFields,
    gateway: &HttpGateway,
    list: &mut ServerSchedules,
) -> anyhow::Result<()> {
    apply_fields(&mut editor, fields)?;
    let verb = if editor.is_new() { "created" } else { "updated" };
    let saved = editor.submit(gateway, list).await.map_err(report)?;
    println!("{verb} schedule #{}", saved.id);
    print_schedule(&saved);
    Ok(())
}

fn apply_fields(editor: &mut ScheduleEditor, fields: ScheduleFields) -> anyhow::Result<()> {
    if let Some(name) = fields.name {
        editor.set_name(name)?;
    }
    if let Some(cron) = fields.cron {
        let spec: CronSpec = cron.parse().map_err(|e: String| anyhow!(e))?;
        for field in CronField::ALL {
            editor.set_cron_field(field, field.get(&spec))?;
        }
    }
    if let Some(enabled) = fields.enabled {
        editor.set_enabled(enabled)?;
    }
    if let Some(only_when_online) = fields.only_when_online {
        editor.set_only_when_online(only_when_online)?;
    }
    Ok(())
}

fn check(cron: &str, grammar: CronGrammar) -> anyhow::Result<()> {
    let spec: CronSpec = cron.parse().map_err(|e: String| anyhow!(e))?;
    let expr = CronExpression::new(grammar);

    let mut failed = false;
    for field in CronField::ALL {
        match expr.validate_field(field, field.get(&spec)) {
            Ok(valid) => println!("  {:<12} {}", field.key(), valid.value),
            Err(e) => {
                failed = true;
                println!("  {:<12} {e}", field.key());
            }
        }
    }
    if failed {
        bail!("cron row '{spec}' is invalid");
    }

    match next_run_after(&spec, Utc::now()) {
        Some(next) => println!("next run: {}", next.to_rfc3339()),
        None => println!("next run: unknown (the panel decides)"),
    }
    Ok(())
}

/// Turn validation failures into one line per field.
fn report(err: EditorError) -> anyhow::Error {
    match err {
        EditorError::Invalid(errors) => {
            let mut lines: Vec<String> = errors
                .fields()
                .iter()
                .map(|e| format!("  {}: {e}", e.field()))
                .collect();
            if let Some(quota) = errors.quota_exceeded() {
                lines.push(format!("  {quota}"));
            }
            anyhow!("input rejected:\n{}", lines.join("\n"))
        }
        other => anyhow!(other),
    }
}

fn print_schedule(schedule: &Schedule) {
    let state = if schedule.is_active { "active" } else { "inactive" };
    let online = if schedule.only_when_online {
        ", only when online"
    } else {
        ""
    };
    println!(
        "#{} {} [{}] {state}{online}",
        schedule.id, schedule.name, schedule.cron
    );
    for task in &schedule.tasks {
        println!(
            "    {}. +{}s {} {:?}",
            task.sequence_id, task.time_offset, task.action, task.payload
        );
    }
}
