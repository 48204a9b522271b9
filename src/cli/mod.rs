//! CLI command definitions and handlers

mod audit;
mod checks;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Branch go-live readiness auditing
#[derive(Parser, Debug)]
#[command(name = "branch-audit")]
#[command(
    version,
    about = "Audit a hospital branch configuration snapshot for go-live readiness",
    after_help = "\
Examples:
  branch-audit audit snapshot.json                        Full audit, terminal output
  branch-audit audit snapshot.json --format json -o r.json   JSON report to a file
  branch-audit audit snapshot.json --scope pharmacy       Pharmacy checks only
  branch-audit audit snapshot.json --fail-on blocker      Exit code 1 on any blocker (CI mode)
  branch-audit checks                                     List the check catalog"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the check catalog against a branch snapshot
    Audit {
        /// Branch snapshot JSON file
        snapshot: PathBuf,

        /// Config file (default: branch-audit.toml next to the snapshot)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format: text or json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Which checks to run
        #[arg(long, default_value = "all", value_parser = ["all", "infrastructure", "pharmacy"])]
        scope: String,

        /// Run pharmacy and infrastructure checks in parallel
        #[arg(long)]
        split: bool,

        /// Exit with code 1 if issues at or above this severity exist
        #[arg(long, value_parser = ["blocker", "warning"])]
        fail_on: Option<String>,
    },

    /// List every check in the catalog
    Checks {
        /// Output format: text or json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Audit {
            snapshot,
            config,
            format,
            output,
            scope,
            split,
            fail_on,
        } => audit::run(audit::AuditOptions {
            snapshot,
            config,
            format,
            output,
            scope,
            split,
            fail_on,
        }),
        Commands::Checks { format } => checks::run(&format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_defaults() {
        let cli = Cli::try_parse_from(["branch-audit", "audit", "snap.json"]).unwrap();
        assert_eq!(cli.log_level, "warn");
        match cli.command {
            Commands::Audit {
                snapshot,
                format,
                scope,
                split,
                fail_on,
                ..
            } => {
                assert_eq!(snapshot, PathBuf::from("snap.json"));
                assert_eq!(format, "text");
                assert_eq!(scope, "all");
                assert!(!split);
                assert!(fail_on.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_scope() {
        assert!(
            Cli::try_parse_from(["branch-audit", "audit", "s.json", "--scope", "billing"]).is_err()
        );
    }

    #[test]
    fn test_global_log_level() {
        let cli = Cli::try_parse_from(["branch-audit", "checks", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["branch-audit"]).is_err());
    }
}
