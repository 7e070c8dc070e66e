//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::config::keys::CONFIG_KEYS;

/// voxrelay - resumable voice capture and forwarding with a spoken preamble
#[derive(Parser, Debug)]
#[command(name = "voxrelay")]
#[command(version)]
#[command(about = "Record voice messages and forward them with a spoken preamble")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record from the default microphone until the duration elapses or Ctrl+C
    Record {
        /// Recording duration (e.g., 10s, 1m, 2m30s); capped at 5m
        #[arg(short = 'd', long, value_name = "TIME")]
        duration: Option<String>,

        /// Where to write the assembled recording
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Preferred codecs, comma separated, most preferred first
        #[arg(long, value_name = "MIME,...")]
        codecs: Option<String>,

        /// Encoder timeslice (e.g., 500ms, 1s)
        #[arg(long, value_name = "TIME")]
        timeslice: Option<String>,

        /// Checkpoint directory
        #[arg(long, value_name = "DIR", env = "VOXRELAY_STATE_DIR")]
        state_dir: Option<PathBuf>,
    },
    /// Join a preamble and an original message into one artifact
    Compose {
        /// Preamble recording
        preamble: PathBuf,

        /// Original message
        original: PathBuf,

        /// Output file
        #[arg(short = 'o', long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Compose, validate and hand a message off to the outbox
    Forward {
        /// Preamble recording
        #[arg(long, value_name = "FILE")]
        preamble: PathBuf,

        /// Original message, a path or an http(s) URL
        #[arg(long, value_name = "PATH|URL")]
        original: String,

        /// Outbox directory
        #[arg(long, value_name = "DIR", env = "VOXRELAY_OUTBOX_DIR")]
        outbox: Option<PathBuf>,
    },
    /// Check that an artifact is playable and estimate its duration
    Probe {
        file: PathBuf,
    },
    /// Play an artifact through the default output device
    Play {
        file: PathBuf,
    },
    /// Inspect checkpointed recording sessions
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Session subcommands
#[derive(Subcommand, Debug)]
pub enum SessionsAction {
    /// List checkpointed sessions, newest first
    List {
        #[arg(long, value_name = "DIR", env = "VOXRELAY_STATE_DIR")]
        state_dir: Option<PathBuf>,
    },
    /// Write a session's segments out as one artifact
    Export {
        /// Session id
        id: String,

        #[arg(short = 'o', long, value_name = "FILE")]
        output: PathBuf,

        #[arg(long, value_name = "DIR", env = "VOXRELAY_STATE_DIR")]
        state_dir: Option<PathBuf>,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = CONFIG_KEYS;

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_record_defaults() {
        let cli = Cli::parse_from(["voxrelay", "record"]);
        if let Commands::Record {
            duration, output, ..
        } = cli.command
        {
            assert!(duration.is_none());
            assert!(output.is_none());
        } else {
            panic!("Expected Record command");
        }
    }

    #[test]
    fn cli_parses_record_options() {
        let cli = Cli::parse_from([
            "voxrelay", "record", "-d", "30s", "-o", "msg.wav", "--codecs", "audio/wav",
        ]);
        if let Commands::Record {
            duration,
            output,
            codecs,
            ..
        } = cli.command
        {
            assert_eq!(duration.as_deref(), Some("30s"));
            assert_eq!(output, Some(PathBuf::from("msg.wav")));
            assert_eq!(codecs.as_deref(), Some("audio/wav"));
        } else {
            panic!("Expected Record command");
        }
    }

    #[test]
    fn cli_parses_compose() {
        let cli = Cli::parse_from(["voxrelay", "compose", "a.wav", "b.flac", "-o", "out.flac"]);
        assert!(matches!(cli.command, Commands::Compose { .. }));
    }

    #[test]
    fn compose_requires_output() {
        assert!(Cli::try_parse_from(["voxrelay", "compose", "a.wav", "b.wav"]).is_err());
    }

    #[test]
    fn cli_parses_forward_with_url() {
        let cli = Cli::parse_from([
            "voxrelay",
            "forward",
            "--preamble",
            "intro.wav",
            "--original",
            "https://example.com/m.ogg",
        ]);
        if let Commands::Forward { original, .. } = cli.command {
            assert_eq!(original, "https://example.com/m.ogg");
        } else {
            panic!("Expected Forward command");
        }
    }

    #[test]
    fn cli_parses_sessions_export() {
        let cli = Cli::parse_from(["voxrelay", "sessions", "export", "abc", "-o", "x.wav"]);
        assert!(matches!(
            cli.command,
            Commands::Sessions {
                action: SessionsAction::Export { .. }
            }
        ));
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["voxrelay", "config", "set", "timeslice", "500ms"]);
        if let Commands::Config {
            action: ConfigAction::Set { key, value },
        } = cli.command
        {
            assert_eq!(key, "timeslice");
            assert_eq!(value, "500ms");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["voxrelay"]).is_err());
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("codecs"));
        assert!(is_valid_config_key("compose.sample_rate"));
        assert!(!is_valid_config_key("api_key"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
