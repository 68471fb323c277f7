//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{net::SocketAddr, path::PathBuf, str::FromStr};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::chrome::{SiteProfile, SocialLink};

pub use cli::{
    CliArgs, Command, NewPostArgs, NotifyArgs, NotifyCommand, RenderArgs, ServeArgs,
    ServeOverrides,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "folio";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CONTENT_DIR: &str = "content";
const DEFAULT_SITE_TITLE: &str = "Portfolio";
const DEFAULT_GIT_PROGRAM: &str = "git";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub content: ContentSettings,
    pub site: SiteProfile,
    pub notify: NotifySettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub root: PathBuf,
}

#[derive(Debug, Clone)]
pub struct NotifySettings {
    /// Absent means every dispatch fails with a configuration error.
    pub webhook_url: Option<Url>,
    pub commit_base_url: Option<String>,
    pub post_base_url: Option<String>,
    pub git_program: PathBuf,
    pub repository_dir: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("FOLIO").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_cli(cli);

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    content: RawContentSettings,
    site: RawSiteSettings,
    notify: RawNotifySettings,
}

impl RawSettings {
    fn apply_cli(&mut self, cli: &CliArgs) {
        if let Some(url) = cli.webhook_url.as_ref() {
            self.notify.webhook_url = Some(url.clone());
        }

        match cli.command.as_ref() {
            Some(Command::Serve(args)) => self.apply_serve_overrides(&args.overrides),
            Some(Command::Notify(_)) | Some(Command::Render(_)) => {}
            None => self.apply_serve_overrides(&ServeOverrides::default()),
        }
    }

    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(dir) = overrides.content_dir.as_ref() {
            self.content.root = Some(dir.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            content,
            site,
            notify,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            content: build_content_settings(content)?,
            site: build_site_profile(site)?,
            notify: build_notify_settings(notify)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = server.port.unwrap_or(DEFAULT_PORT);
    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    Ok(ServerSettings { addr })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let root = content
        .root
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_DIR));
    if root.as_os_str().is_empty() {
        return Err(LoadError::invalid("content.root", "path must not be empty"));
    }

    Ok(ContentSettings { root })
}

fn build_site_profile(site: RawSiteSettings) -> Result<SiteProfile, LoadError> {
    let title = non_empty(site.title).unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string());
    let owner = non_empty(site.owner).unwrap_or_else(|| title.clone());
    let description = non_empty(site.description).unwrap_or_default();

    let mut social = Vec::with_capacity(site.social.len());
    for link in site.social {
        let label = link.label.trim().to_string();
        let href = link.href.trim().to_string();
        if label.is_empty() || href.is_empty() {
            return Err(LoadError::invalid(
                "site.social",
                "every link needs a label and an href",
            ));
        }
        social.push(SocialLink { label, href });
    }

    Ok(SiteProfile {
        title,
        owner,
        description,
        social,
        source_url: non_empty(site.source_url),
    })
}

fn build_notify_settings(notify: RawNotifySettings) -> Result<NotifySettings, LoadError> {
    let webhook_url = match non_empty(notify.webhook_url) {
        Some(raw) => {
            let url = Url::parse(&raw).map_err(|err| {
                LoadError::invalid("notify.webhook_url", format!("invalid URL: {err}"))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(LoadError::invalid(
                    "notify.webhook_url",
                    format!("unsupported scheme `{}`", url.scheme()),
                ));
            }
            Some(url)
        }
        None => None,
    };

    let git_program = notify
        .git_program
        .unwrap_or_else(|| PathBuf::from(DEFAULT_GIT_PROGRAM));
    if git_program.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "notify.git_program",
            "path must not be empty",
        ));
    }

    Ok(NotifySettings {
        webhook_url,
        commit_base_url: non_empty(notify.commit_base_url),
        post_base_url: non_empty(notify.post_base_url),
        git_program,
        repository_dir: notify.repository_dir,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    root: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    title: Option<String>,
    owner: Option<String>,
    description: Option<String>,
    social: Vec<RawSocialLink>,
    source_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawSocialLink {
    label: String,
    href: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawNotifySettings {
    webhook_url: Option<String>,
    commit_base_url: Option<String>,
    post_base_url: Option<String>,
    git_program: Option<PathBuf>,
    repository_dir: Option<PathBuf>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

#[cfg(test)]
mod tests;
