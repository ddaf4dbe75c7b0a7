use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use gradewatch_engine::MailSettings;
use serde::Deserialize;

use crate::cli::Cli;

pub const DEFAULT_CONFIG_FILENAME: &str = ".gradewatch.json";

const DEFAULT_SUBJECT_FORMAT: &str = "gradewatch: {course_code} changed";
const DEFAULT_MAIL_PORT: u16 = 587;
const DEFAULT_INTERVAL_SECS: u64 = 600;

/// The configuration file as written on disk. Everything is optional here;
/// requiredness is decided per mode when resolving.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub portal: PortalSection,
    #[serde(default)]
    pub mail: MailSection,
    #[serde(default)]
    pub watch: WatchSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortalSection {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MailSection {
    pub username: Option<String>,
    pub password: Option<String>,
    pub recipient: Option<String>,
    pub sender: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub subject_format: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchSection {
    pub interval_secs: Option<u64>,
}

/// Configuration after merging the file with command-line overrides.
/// `mail` is only populated (and validated) when the mode needs it.
#[derive(Debug, Clone)]
pub struct Config {
    pub portal_username: String,
    pub portal_password: String,
    pub mail: Option<MailSettings>,
    pub interval: Duration,
}

pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_CONFIG_FILENAME))
}

pub fn load_file(path: &Path) -> Result<FileConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
}

/// Loads the file named on the command line (which must exist) or the
/// default path (which may be absent when flags supply everything).
pub fn load(cli: &Cli) -> Result<FileConfig> {
    if let Some(path) = &cli.config {
        return load_file(path);
    }
    match default_path() {
        Some(path) if path.exists() => load_file(&path),
        _ => Ok(FileConfig::default()),
    }
}

/// Merges CLI overrides over the file config and validates what the mode
/// requires. Flags always win over the file.
pub fn resolve(cli: &Cli, file: FileConfig, need_mail: bool) -> Result<Config> {
    let portal_username = cli
        .username
        .clone()
        .or(file.portal.username)
        .context("portal username not configured")?;
    let portal_password = cli
        .password
        .clone()
        .or(file.portal.password)
        .context("portal password not configured")?;

    let interval_secs = cli
        .interval
        .or(file.watch.interval_secs)
        .unwrap_or(DEFAULT_INTERVAL_SECS);

    let mail = if need_mail {
        Some(resolve_mail(cli, file.mail)?)
    } else {
        None
    };

    Ok(Config {
        portal_username,
        portal_password,
        mail,
        interval: Duration::from_secs(interval_secs),
    })
}

fn resolve_mail(cli: &Cli, mail: MailSection) -> Result<MailSettings> {
    fn required(
        cli_value: &Option<String>,
        file_value: Option<String>,
        what: &str,
    ) -> Result<String> {
        cli_value
            .clone()
            .or(file_value)
            .with_context(|| format!("mail {what} not configured"))
    }

    Ok(MailSettings {
        username: required(&cli.email_username, mail.username, "username")?,
        password: required(&cli.email_password, mail.password, "password")?,
        recipient: required(&cli.email_recipient, mail.recipient, "recipient")?,
        sender: required(&cli.email_sender, mail.sender, "sender")?,
        host: required(&cli.email_host, mail.host, "host")?,
        port: cli.email_port.or(mail.port).unwrap_or(DEFAULT_MAIL_PORT),
        subject_format: cli
            .email_subject_format
            .clone()
            .or(mail.subject_format)
            .unwrap_or_else(|| DEFAULT_SUBJECT_FORMAT.to_string()),
    })
}
