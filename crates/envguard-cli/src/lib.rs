//! # envguard-cli — Environment Checking Command-Line Interface
//!
//! ## Subcommands
//!
//! - `check` — validate the process environment against a schema document
//! - `types` — write the TypeScript `Env` declaration for a schema document
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers live in their own modules
//!   and delegate to `envguard-schema`.
//! - Handlers return an exit code; `0` is success, `1` is an invalid
//!   environment or any other failure.

pub mod check;
pub mod types;

use std::path::Path;

use anyhow::{Context, Result};
use envguard_schema::{CoercionSetting, ObjectSchema, SchemaDocument};

/// Load a schema document, optionally forcing one coercion setting on every
/// field.
pub fn load_schema(path: &Path, coercion: Option<CoercionSetting>) -> Result<ObjectSchema> {
    let mut document = SchemaDocument::from_path(path)
        .with_context(|| format!("failed to load schema document {}", path.display()))?;
    if let Some(setting) = coercion {
        document = document.force_coercion(setting);
    }
    let schema = document.into_schema()?;
    tracing::debug!(path = %path.display(), fields = schema.len(), "loaded schema document");
    Ok(schema)
}
