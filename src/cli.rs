//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (call, validate, init), and their associated argument
//! structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::client::Verb;

#[derive(Parser)]
#[command(
    name = "courier",
    version,
    about = "HTTP client for logical remotes",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        courier init                              Create a starter config\n  \
        courier validate                          Check ./courier.yaml\n  \
        courier call -r users -p /users/42        GET from the 'users' remote"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Call a remote once and print the normalized response
    Call(Box<CallArgs>),

    /// Validate a config file
    Validate(ValidateArgs),

    /// Generate a starter config file
    Init(InitArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        courier call -r users -p /users/42                        GET\n  \
        courier call -r users -p /users -X post -d name=ada       Form POST\n  \
        courier call -r users -p /users -X post-json --body '{\"name\":\"ada\"}'")]
pub struct CallArgs {
    /// Config file path (.yaml, .json, .toml)
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Logical remote name
    #[arg(short, long)]
    pub remote: String,

    /// Request path, joined to the selected address
    #[arg(short, long, default_value = "/")]
    pub path: String,

    /// Verb to send
    #[arg(short = 'X', long, default_value = "get")]
    pub method: CallVerb,

    /// Parameter as key=value (query for get, form body otherwise); repeatable
    #[arg(short = 'd', long = "data", value_name = "KEY=VALUE")]
    pub data: Vec<String>,

    /// Raw JSON payload for post-json (overrides --data)
    #[arg(long)]
    pub body: Option<String>,

    /// Header as 'Name: value'; repeatable
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
    pub headers: Vec<String>,

    /// Timeout in milliseconds when the config has none for this call
    #[arg(long, env = "REQUEST_TIMEOUT_MS")]
    pub timeout: Option<u64>,

    /// Accept any server certificate
    #[arg(short = 'k', long)]
    pub insecure: bool,

    /// Correlation id to propagate (generated when absent)
    #[arg(long)]
    pub correlation_id: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub output: OutputFormat,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "warn")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Config file to validate
    #[arg(default_value = "courier.yaml")]
    pub config: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        courier init                          Starter config (yaml)\n  \
        courier init -f toml -o config.toml   TOML format")]
pub struct InitArgs {
    /// Output format
    #[arg(short, long, default_value = "yaml")]
    pub format: ConfigFormat,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CallVerb {
    Get,
    Post,
    PostUrlEncode,
    Put,
    PostJson,
    Delete,
}

impl CallVerb {
    #[must_use]
    pub const fn to_verb(self) -> Verb {
        match self {
            Self::Get => Verb::Get,
            Self::Post => Verb::Post,
            Self::PostUrlEncode => Verb::PostUrlEncode,
            Self::Put => Verb::Put,
            Self::PostJson => Verb::PostJson,
            Self::Delete => Verb::Delete,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_call_with_repeated_flags() {
        let cli = Cli::try_parse_from([
            "courier", "call", "-r", "users", "-p", "/users", "-X", "post-json", "-d", "a=1", "-d",
            "b=2", "-H", "x-tenant: acme", "-k",
        ])
        .unwrap();
        let Some(Commands::Call(args)) = cli.command else {
            panic!("expected call");
        };
        assert_eq!(args.remote, "users");
        assert_eq!(args.method.to_verb(), Verb::PostJson);
        assert_eq!(args.data, vec!["a=1", "b=2"]);
        assert_eq!(args.headers, vec!["x-tenant: acme"]);
        assert!(args.insecure);
    }

    #[test]
    fn call_requires_remote() {
        assert!(Cli::try_parse_from(["courier", "call", "-p", "/x"]).is_err());
    }
}
