//! CLI arguments for the `flow-validator` binary.

use {
    crate::domain::rules::ReadyToShipPolicy,
    clap::{Parser, Subcommand},
    std::{path::PathBuf, time::Duration},
    url::Url,
};

/// Validate the captured message flows of a test session
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// The log filter.
    #[arg(long, env, default_value = "warn,flow_validator=info")]
    pub log: String,

    /// Whether to use JSON format for the logs.
    #[arg(long, env)]
    pub log_json: bool,

    /// Path to the reporting configuration file. This file should be in TOML
    /// format.
    #[arg(long, env)]
    pub config: PathBuf,

    /// How long facts recorded while validating a message stay available to
    /// later messages.
    #[arg(long, env, default_value = "1h", value_parser = humantime::parse_duration)]
    pub state_ttl: Duration,

    /// Whether every or any fulfillment flagged ready to ship must carry a
    /// pickup time range.
    #[arg(long, env, default_value = "every")]
    pub ready_to_ship: ReadyToShipPolicy,

    #[command(subcommand)]
    pub command: Command,
}

/// Where the messages come from.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Messages read from a JSON file mapping flow ids to message lists.
    File {
        #[arg(long, env)]
        messages: PathBuf,

        /// The session's domain. Taken from the first message when omitted.
        #[arg(long, env)]
        domain: Option<String>,

        /// The session's protocol version. Taken from the first message when
        /// omitted.
        #[arg(long = "version", env = "PROTOCOL_VERSION")]
        protocol_version: Option<String>,

        #[arg(long, env)]
        session_id: String,
    },
    /// Messages fetched from the storage service.
    Remote {
        #[arg(long, env)]
        storage_url: Url,

        /// Path to a JSON file mapping flow ids to payload ids.
        #[arg(long, env)]
        payload_ids: PathBuf,

        #[arg(long, env)]
        session_id: String,

        #[arg(long, env, default_value = "10s", value_parser = humantime::parse_duration)]
        http_timeout: Duration,
    },
}
