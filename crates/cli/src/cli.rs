//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use contracts::OutputConfig;
use std::path::PathBuf;

/// Event Pub/Sub - publish structured events to Google Cloud Pub/Sub topics
#[derive(Parser, Debug)]
#[command(
    name = "event-pubsub",
    author,
    version,
    about = "Publish structured events to Google Cloud Pub/Sub",
    long_about = "Reads newline-delimited JSON events, renders a topic list and a message\n\
                  body for each one from templates, and publishes the message to every\n\
                  selected topic."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "EVENT_PUBSUB_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "EVENT_PUBSUB_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log level derived from `-v` / `-q`
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish events read from a file or stdin
    Run(RunArgs),

    /// Validate configuration and templates without publishing
    Validate(ValidateArgs),

    /// Render topics and message for a single event without publishing
    Render(RenderArgs),
}

/// Output settings that override the configuration file
#[derive(Args, Debug, Clone, Default)]
pub struct PubSubOverrides {
    /// Service account key file path or inline JSON
    #[arg(long, env = "EVENT_PUBSUB_CREDENTIALS", hide_env_values = true)]
    pub credentials: Option<String>,

    /// Google Cloud project id
    #[arg(long, env = "EVENT_PUBSUB_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Message template (text or file path)
    #[arg(long, env = "EVENT_PUBSUB_MESSAGE")]
    pub message: Option<String>,

    /// Topic selector template (text or file path)
    #[arg(long, env = "EVENT_PUBSUB_TOPIC_SELECTOR")]
    pub topic_selector: Option<String>,

    /// Publish acknowledgment timeout in milliseconds (0 = wait forever)
    #[arg(long, env = "EVENT_PUBSUB_PUBLISH_TIMEOUT_MS")]
    pub publish_timeout_ms: Option<u64>,
}

impl PubSubOverrides {
    /// Apply every provided override to `config`
    pub fn apply(&self, config: &mut OutputConfig) {
        let pubsub = &mut config.pubsub;
        if let Some(ref credentials) = self.credentials {
            pubsub.credentials = credentials.clone();
        }
        if let Some(ref project_id) = self.project_id {
            pubsub.project_id = project_id.clone();
        }
        if let Some(ref message) = self.message {
            pubsub.message = message.clone();
        }
        if let Some(ref topic_selector) = self.topic_selector {
            pubsub.topic_selector = topic_selector.clone();
        }
        if let Some(timeout) = self.publish_timeout_ms {
            pubsub.publish_timeout_ms = timeout;
        }
    }
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "EVENT_PUBSUB_CONFIG"
    )]
    pub config: PathBuf,

    /// NDJSON event file (stdin when omitted)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Log messages instead of publishing them
    #[arg(long)]
    pub dry_publish: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "EVENT_PUBSUB_METRICS_PORT")]
    pub metrics_port: u16,

    #[command(flatten)]
    pub overrides: PubSubOverrides,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub overrides: PubSubOverrides,
}

/// Arguments for the `render` command
#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Event as a single JSON object: {"channel", "type", "time", "data"}
    #[arg(short, long)]
    pub event: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub overrides: PubSubOverrides,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
