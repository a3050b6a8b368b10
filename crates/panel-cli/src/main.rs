use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "panel_cli=info,panel_client=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // load config: --config > PANEL_CONFIG env > ~/.panel/panel.toml
    let config_path = cli.config.clone().or_else(|| std::env::var("PANEL_CONFIG").ok());
    let config = panel_core::config::PanelConfig::load(config_path.as_deref())?;

    match cli.command {
        Command::Schedules(cmd) => commands::schedules(&config, cmd).await,
        Command::Tasks(cmd) => commands::tasks(&config, cmd).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ScheduleCommand, TaskCommand};

    #[test]
    fn parses_schedule_update() {
        let cli = Cli::try_parse_from([
            "panelctl",
            "schedules",
            "update",
            "--server",
            "1a7ce997",
            "--id",
            "4",
            "--cron",
            "0 4 * * *",
            "--enabled",
            "false",
        ])
        .unwrap();
        match cli.command {
            Command::Schedules(ScheduleCommand::Update { server, id, fields }) => {
                assert_eq!(server, "1a7ce997");
                assert_eq!(id, 4);
                assert_eq!(fields.cron.as_deref(), Some("0 4 * * *"));
                assert_eq!(fields.enabled, Some(false));
                assert!(fields.name.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_task_save_with_global_config() {
        let cli = Cli::try_parse_from([
            "panelctl",
            "tasks",
            "save",
            "--server",
            "1a7ce997",
            "--schedule",
            "4",
            "--action",
            "power",
            "--payload",
            "restart",
            "--config",
            "/tmp/panel.toml",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some("/tmp/panel.toml"));
        let Command::Tasks(TaskCommand::Save {
            task,
            action,
            payload,
            ..
        }) = cli.command
        else {
            panic!("expected tasks save");
        };
        assert!(task.is_none());
        assert_eq!(action.as_deref(), Some("power"));
        assert_eq!(payload.as_deref(), Some("restart"));
    }
}
