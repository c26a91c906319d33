//! # Types Subcommand
//!
//! Writes the TypeScript declaration for a schema document.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use envguard_schema::{generate_env_types_with, GenerateOptions};

/// Arguments for the types subcommand.
#[derive(Args, Debug)]
pub struct TypesArgs {
    /// Schema document (YAML, or JSON with a `.json` extension).
    #[arg(long)]
    pub schema: PathBuf,

    /// Declaration file to write; replaced atomically.
    #[arg(long)]
    pub out: PathBuf,

    /// Name of the exported type.
    #[arg(long, default_value = "Env")]
    pub type_name: String,

    /// Emit `name?:` for optional variables.
    #[arg(long)]
    pub mark_optional: bool,
}

impl TypesArgs {
    fn options(&self) -> GenerateOptions {
        GenerateOptions {
            type_name: self.type_name.clone(),
            mark_optional: self.mark_optional,
            ..GenerateOptions::default()
        }
    }
}

/// Execute the types subcommand.
pub fn run_types(args: &TypesArgs) -> Result<u8> {
    write_types(args, &mut std::io::stdout())
}

/// Write the declaration and report the written path to `out`.
pub fn write_types(args: &TypesArgs, out: &mut impl Write) -> Result<u8> {
    let schema = crate::load_schema(&args.schema, None)?;
    generate_env_types_with(&schema, &args.out, &args.options())
        .with_context(|| format!("failed to generate types for {}", args.schema.display()))?;
    writeln!(out, "wrote {}", args.out.display())?;
    Ok(0)
}
