//! # envguard CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use envguard_cli::check::{run_check, CheckArgs};
use envguard_cli::types::{run_types, TypesArgs};

/// Validate environment variables against a schema and generate their
/// TypeScript type.
#[derive(Parser, Debug)]
#[command(name = "envguard", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the process environment against a schema document.
    Check(CheckArgs),

    /// Write the TypeScript `Env` declaration for a schema document.
    Types(TypesArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Check(args) => run_check(&args),
        Commands::Types(args) => run_types(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn cli_parse_check_basic() {
        let cli = Cli::try_parse_from(["envguard", "check", "--schema", "env.yaml"]).unwrap();
        if let Commands::Check(args) = cli.command {
            assert_eq!(args.schema, PathBuf::from("env.yaml"));
            assert!(!args.print);
            assert!(!args.strict);
        } else {
            panic!("expected check");
        }
    }

    #[test]
    fn cli_parse_check_with_flags() {
        let cli = Cli::try_parse_from([
            "envguard",
            "check",
            "--schema",
            "env.json",
            "--print",
            "--strict",
        ])
        .unwrap();
        if let Commands::Check(args) = cli.command {
            assert!(args.print);
            assert!(args.strict);
        } else {
            panic!("expected check");
        }
    }

    #[test]
    fn cli_parse_check_requires_schema() {
        assert!(Cli::try_parse_from(["envguard", "check"]).is_err());
    }

    #[test]
    fn cli_parse_types_defaults() {
        let cli = Cli::try_parse_from([
            "envguard", "types", "--schema", "env.yaml", "--out", "env.d.ts",
        ])
        .unwrap();
        if let Commands::Types(args) = cli.command {
            assert_eq!(args.out, PathBuf::from("env.d.ts"));
            assert_eq!(args.type_name, "Env");
            assert!(!args.mark_optional);
        } else {
            panic!("expected types");
        }
    }

    #[test]
    fn cli_parse_types_with_options() {
        let cli = Cli::try_parse_from([
            "envguard",
            "types",
            "--schema",
            "env.yaml",
            "--out",
            "env.d.ts",
            "--type-name",
            "ProcessEnv",
            "--mark-optional",
        ])
        .unwrap();
        if let Commands::Types(args) = cli.command {
            assert_eq!(args.type_name, "ProcessEnv");
            assert!(args.mark_optional);
        } else {
            panic!("expected types");
        }
    }

    #[test]
    fn cli_parse_types_requires_out() {
        assert!(Cli::try_parse_from(["envguard", "types", "--schema", "env.yaml"]).is_err());
    }

    #[test]
    fn cli_parse_verbose_is_global() {
        let cli =
            Cli::try_parse_from(["envguard", "check", "--schema", "env.yaml", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
