//! # Validator
//!
//! Runs a schema over an environment snapshot and treats failure as fatal:
//! every issue is logged through `tracing` before the error is returned, so
//! operators see the offending variables even when the caller only propagates
//! the error. Callers that want the silent form use
//! [`ObjectSchema::safe_parse`](crate::ObjectSchema::safe_parse) or
//! [`ParseEnv::parse_env`] directly.

use serde::de::DeserializeOwned;

use envguard_core::{EnvGuardError, EnvSnapshot, ParseEnv, TypedObject, ValidationFailure};

/// Validate `env` against `schema`.
///
/// # Errors
///
/// Returns [`EnvGuardError::Validation`] carrying every per-field issue when
/// any required variable is missing or any field fails coercion, checks or
/// transforms. The issues are logged at `error` level first.
pub fn validate_env<S>(schema: &S, env: &EnvSnapshot) -> Result<TypedObject, EnvGuardError>
where
    S: ParseEnv + ?Sized,
{
    match schema.parse_env(env) {
        Ok(object) => {
            tracing::debug!(fields = object.len(), "environment validated");
            Ok(object)
        }
        Err(failure) => {
            report(&failure);
            Err(failure.into())
        }
    }
}

/// Validate the live process environment, captured once for this call.
///
/// # Errors
///
/// Same as [`validate_env`].
pub fn validate_process_env<S>(schema: &S) -> Result<TypedObject, EnvGuardError>
where
    S: ParseEnv + ?Sized,
{
    validate_env(schema, &EnvSnapshot::from_process())
}

/// Validate `env` and deserialize the result into `T`.
///
/// # Errors
///
/// Returns [`EnvGuardError::Validation`] as [`validate_env`] does, or
/// [`EnvGuardError::Shape`] when the validated object does not fit `T`.
pub fn validate_env_into<T, S>(schema: &S, env: &EnvSnapshot) -> Result<T, EnvGuardError>
where
    T: DeserializeOwned,
    S: ParseEnv + ?Sized,
{
    let object = validate_env(schema, env)?;
    Ok(object.deserialize_into()?)
}

fn report(failure: &ValidationFailure) {
    for issue in failure.issues() {
        tracing::error!(
            path = %issue.path_string(),
            code = issue.code.name(),
            "{}",
            issue.message
        );
    }
    tracing::error!(
        issues = failure.len(),
        fields = ?failure.fields(),
        "environment variable validation failed"
    );
}
