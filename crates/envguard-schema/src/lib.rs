//! # envguard-schema — Environment Schemas, Validation & Type Generation
//!
//! Declares the shape of a process environment, validates a snapshot of it
//! into typed values, and renders a TypeScript `Env` type from the same
//! schema.
//!
//! ## Building Schemas (`g`, `schema`)
//!
//! The [`g`] module holds the convenience constructors. [`g::number`] and
//! [`g::boolean`] carry the usual environment coercions: numbers parse
//! leniently (garbage and empty become `0`) and are constrained to
//! non-negative integers; booleans are true for any non-empty string. Every
//! field can be refined through the [`FieldSchema`] builder.
//!
//! ```
//! use envguard_schema::{g, validate_env, EnvSnapshot};
//!
//! let schema = g::object([
//!     ("NODE_ENV", g::enum_(["development", "production", "test"])),
//!     ("PORT", g::number()),
//! ]);
//! let env = EnvSnapshot::new()
//!     .with("NODE_ENV", "production")
//!     .with("PORT", "8080");
//! let typed = validate_env(&schema, &env).unwrap();
//! assert_eq!(typed.get("PORT").and_then(|v| v.as_f64()), Some(8080.0));
//! ```
//!
//! ## Validation (`validate`)
//!
//! [`validate_env`] collects every issue before failing and logs each one as
//! a `tracing` error event. The process environment is only read through
//! [`validate_process_env`].
//!
//! ## Type Generation (`codegen`)
//!
//! [`render_env_types`] is pure; [`generate_env_types`] writes the result
//! atomically, so readers never see a half-written declaration file.
//!
//! ## Schema Documents (`document`)
//!
//! [`SchemaDocument`] loads the same schemas from YAML or JSON, checked
//! against the embedded `schemas/envguard.schema.json`.
//!
//! ## Crate Policy
//!
//! - Depends only on `envguard-core` internally.
//! - Field order is declaration order everywhere: validation, error
//!   listings, generated members.
//! - Schema construction never fails; configuration errors surface as
//!   validation issues, except for schema documents which are rejected up
//!   front.

pub mod codegen;
pub mod coerce;
pub mod document;
pub mod g;
pub mod schema;
pub mod validate;

pub use codegen::{generate_env_types, generate_env_types_with, render_env_types, GenerateOptions};
pub use coerce::{parse_number, BooleanCoercion, Coercion, NumericCoercion};
pub use document::{
    load_schema, CoercionSetting, DocumentError, DocumentFormat, DocumentViolations, SchemaDocument,
    Violation,
};
pub use schema::{FieldSchema, Kind, NumberCheck, ObjectSchema, StringCheck, Transform};
pub use validate::{validate_env, validate_env_into, validate_process_env};

pub use envguard_core::{
    DescribeFields, EnvGuardError, EnvSnapshot, Issue, IssueCode, ParseEnv, TypedObject,
    TypedValue, ValidationFailure,
};
