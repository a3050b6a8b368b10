use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "panelctl", version, about = "Manage server schedules through the panel API")]
pub struct Cli {
    /// Config file (defaults to $PANEL_CONFIG, then ~/.panel/panel.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Schedule operations
    #[command(subcommand)]
    Schedules(ScheduleCommand),
    /// Task operations
    #[command(subcommand)]
    Tasks(TaskCommand),
}

#[derive(Debug, Subcommand)]
pub enum ScheduleCommand {
    /// List a server's schedules and their tasks
    List {
        #[arg(long)]
        server: String,
    },
    /// Validate a cron row locally and preview the next run
    Check {
        /// `minute hour day-of-month month day-of-week`
        cron: String,
        /// Check field grammar and ranges regardless of config
        #[arg(long)]
        strict: bool,
    },
    /// Create a schedule
    Create {
        #[arg(long)]
        server: String,
        #[command(flatten)]
        fields: ScheduleFields,
    },
    /// Update an existing schedule
    Update {
        #[arg(long)]
        server: String,
        #[arg(long)]
        id: u64,
        #[command(flatten)]
        fields: ScheduleFields,
    },
    /// Delete a schedule
    Delete {
        #[arg(long)]
        server: String,
        #[arg(long)]
        id: u64,
    },
}

#[derive(Debug, Args)]
pub struct ScheduleFields {
    #[arg(long)]
    pub name: Option<String>,
    /// `minute hour day-of-month month day-of-week`
    #[arg(long)]
    pub cron: Option<String>,
    #[arg(long)]
    pub enabled: Option<bool>,
    #[arg(long)]
    pub only_when_online: Option<bool>,
}

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Create a task, or update one when `--task` is given
    Save {
        #[arg(long)]
        server: String,
        #[arg(long)]
        schedule: u64,
        #[arg(long)]
        task: Option<u64>,
        /// command, power or backup
        #[arg(long)]
        action: Option<String>,
        #[arg(long)]
        payload: Option<String>,
        /// Seconds after the previous task (0-900)
        #[arg(long)]
        time_offset: Option<String>,
        #[arg(long)]
        continue_on_failure: Option<bool>,
    },
}
