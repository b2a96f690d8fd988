use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::probe::DEFAULT_ENDPOINT;

#[derive(Parser, Debug)]
#[command(name = "labdoctor")]
#[command(about = "Read-only diagnostics for stuck lab report extraction", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Log output format on stderr
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect the pipeline stores and print a diagnostic report
    Diagnose {
        /// Config file (JSON, or YAML by extension)
        #[arg(short, long, env = "LABDOCTOR_CONFIG")]
        config: Option<PathBuf>,

        /// Project reference or full database host
        #[arg(long, env = "SUPABASE_PROJECT_REF")]
        project_ref: Option<String>,

        /// Report id to look up (repeatable)
        #[arg(long = "id", value_name = "ID")]
        ids: Vec<String>,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: ReportFormat,

        /// Exit with status 4 when an anomaly or check error was found
        #[arg(long)]
        fail_on_anomaly: bool,
    },

    /// Smoke-test the MCP gateway
    Probe {
        /// Gateway endpoint
        #[arg(long, default_value = DEFAULT_ENDPOINT)]
        endpoint: String,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Cli {
    /// Default filter directive for the verbosity count. `RUST_LOG` wins
    /// when set.
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
