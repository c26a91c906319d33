//! # Check Subcommand
//!
//! Validates the process environment against a schema document.
//!
//! ```bash
//! envguard check --schema env.yaml
//! envguard check --schema env.yaml --print --strict
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use envguard_core::{EnvGuardError, EnvSnapshot};
use envguard_schema::{validate_env, CoercionSetting};

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema document (YAML, or JSON with a `.json` extension).
    #[arg(long)]
    pub schema: PathBuf,

    /// Print the validated variables as JSON instead of a summary.
    #[arg(long)]
    pub print: bool,

    /// Use strict coercion for every field: reject non-numeric and
    /// non-boolean strings instead of converting them.
    #[arg(long)]
    pub strict: bool,
}

/// Execute the check subcommand against the process environment.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let env = EnvSnapshot::from_process();
    check_snapshot(args, &env, &mut std::io::stdout(), &mut std::io::stderr())
}

/// Validate `env`; the report goes to `out`, issues go to `err`.
pub fn check_snapshot(
    args: &CheckArgs,
    env: &EnvSnapshot,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<u8> {
    let coercion = args.strict.then_some(CoercionSetting::Strict);
    let schema = crate::load_schema(&args.schema, coercion)?;

    match validate_env(&schema, env) {
        Ok(typed) => {
            if args.print {
                writeln!(out, "{}", serde_json::to_string_pretty(&typed)?)?;
            } else {
                writeln!(out, "ok: {} variables", typed.len())?;
            }
            Ok(0)
        }
        Err(EnvGuardError::Validation(failure)) => {
            writeln!(err, "{failure}")?;
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}
