use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the folio binary.
#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Portfolio and blog server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "FOLIO_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Chat webhook that receives notifications.
    #[arg(
        long = "webhook-url",
        env = "FOLIO_WEBHOOK_URL",
        value_name = "URL",
        global = true
    )]
    pub webhook_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Serve the site over HTTP.
    Serve(Box<ServeArgs>),
    /// Post a notification to the configured webhook.
    Notify(NotifyArgs),
    /// Render a markdown file to HTML on stdout.
    Render(RenderArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the directory holding `posts/` and `pages/`.
    #[arg(long = "content-dir", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub content_dir: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct NotifyArgs {
    #[command(subcommand)]
    pub command: NotifyCommand,
}

#[derive(Debug, Subcommand, Clone)]
pub enum NotifyCommand {
    /// Announce that a deployment has started.
    #[command(name = "deploy-started")]
    DeployStarted,
    /// Announce that a deployment finished successfully.
    #[command(name = "deploy-succeeded")]
    DeploySucceeded,
    /// Announce that a deployment failed.
    #[command(name = "deploy-failed")]
    DeployFailed,
    /// Announce a newly published post.
    #[command(name = "new-post")]
    NewPost(NewPostArgs),
    /// Send a fixed test message to verify the webhook.
    Test,
}

#[derive(Debug, Args, Clone)]
pub struct NewPostArgs {
    #[arg(long, value_name = "TITLE")]
    pub title: String,

    #[arg(long, value_name = "TEXT", default_value = "")]
    pub excerpt: String,

    #[arg(long, value_name = "SLUG")]
    pub slug: String,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    /// Markdown file to render; front matter is ignored.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Wrap the output in a `<div>` with this class.
    #[arg(long = "class", value_name = "CLASS")]
    pub class: Option<String>,
}
