//! # envguard-core — Foundational Types
//!
//! The engine-independent data model shared by the validator and the
//! type-declaration generator. Every other crate in the workspace depends on
//! `envguard-core`; it depends on nothing internal.
//!
//! ## Key Types
//!
//! - [`EnvSnapshot`] — a read-only mapping of variable name to raw string.
//! - [`TypedValue`] / [`TypedObject`] — the coerced, validated result shape.
//! - [`FieldDescriptor`] / [`DescriptorKind`] — introspectable field metadata.
//! - [`Issue`] / [`ValidationFailure`] — every per-field failure of one run.
//!
//! ## Adapter Seams
//!
//! A schema engine plugs into envguard by implementing two traits:
//!
//! - [`ParseEnv`] — validate an [`EnvSnapshot`] into a [`TypedObject`].
//! - [`DescribeFields`] — enumerate [`FieldDescriptor`]s in declaration order.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `envguard-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod descriptor;
pub mod env;
pub mod error;
pub mod value;

pub use descriptor::{DescriptorKind, FieldDescriptor, PrimitiveKind};
pub use env::EnvSnapshot;
pub use error::{EnvGuardError, Issue, IssueCode, ValidationFailure};
pub use value::{TypedObject, TypedValue};

/// The validate facet of a schema.
///
/// Implementations run their full coercion, structural check and transform
/// pipeline for every field and report all failures together. Implementations
/// must not log; diagnostics are the caller's concern.
pub trait ParseEnv {
    /// Validate `env` and return the typed result or every per-field failure.
    fn parse_env(&self, env: &EnvSnapshot) -> Result<TypedObject, ValidationFailure>;
}

/// The introspection facet of a schema.
///
/// Descriptors are produced lazily and in declaration order; generated
/// declarations depend on that order being stable across calls.
pub trait DescribeFields {
    /// Iterate the top-level field descriptors in declaration order.
    fn field_descriptors(&self) -> Box<dyn Iterator<Item = FieldDescriptor> + '_>;
}

impl<T: ParseEnv + ?Sized> ParseEnv for &T {
    fn parse_env(&self, env: &EnvSnapshot) -> Result<TypedObject, ValidationFailure> {
        (**self).parse_env(env)
    }
}

impl<T: DescribeFields + ?Sized> DescribeFields for &T {
    fn field_descriptors(&self) -> Box<dyn Iterator<Item = FieldDescriptor> + '_> {
        (**self).field_descriptors()
    }
}
