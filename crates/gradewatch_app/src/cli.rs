use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "gradewatch",
    version,
    about = "Watch an exercise portal and mail when a status changes"
)]
pub struct Cli {
    /// Path to the configuration file (default: ~/.gradewatch.json).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Portal username, overriding the config file.
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Portal password, overriding the config file.
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Mail account username, overriding the config file.
    #[arg(long, global = true)]
    pub email_username: Option<String>,

    /// Mail account password, overriding the config file.
    #[arg(long, global = true)]
    pub email_password: Option<String>,

    /// Notification recipient address, overriding the config file.
    #[arg(long, global = true)]
    pub email_recipient: Option<String>,

    /// Notification sender address, overriding the config file.
    #[arg(long, global = true)]
    pub email_sender: Option<String>,

    /// Mail submission host, overriding the config file.
    #[arg(long, global = true)]
    pub email_host: Option<String>,

    /// Mail submission port, overriding the config file.
    #[arg(long, global = true)]
    pub email_port: Option<u16>,

    /// Subject template; `{course_code}` is replaced by the changed courses.
    #[arg(long, global = true)]
    pub email_subject_format: Option<String>,

    /// Poll interval in seconds, overriding the config file.
    #[arg(long, global = true, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Enable verbose (debug) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Force decorated output.
    #[arg(long, global = true, conflicts_with = "plain")]
    pub pretty: bool,

    /// Force undecorated output.
    #[arg(long, global = true)]
    pub plain: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List watched courses; with --all, every exercise's status.
    #[command(alias = "ls")]
    List {
        /// Show the per-exercise status table for every course.
        #[arg(short = 'a', long)]
        all: bool,

        /// Course filters, matched as regular expressions against course
        /// URLs. No filters means all courses.
        filters: Vec<String>,
    },
    /// Poll the portal on an interval and mail on every change.
    Daemon {
        /// Course filters, matched as regular expressions against course
        /// URLs. No filters means all courses.
        filters: Vec<String>,
    },
}
