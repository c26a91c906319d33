//! # `g` — Convenience Schema Builder
//!
//! Shorthand constructors for environment schemas. `object`, `enum_` and
//! `string` map directly onto the engine; `number` and `boolean` pre-wire the
//! coercions environment strings need:
//!
//! - [`number`] — lenient numeric coercion plus an integer, non-negative check.
//! - [`boolean`] — truthy string coercion.
//!
//! ```
//! use envguard_schema::g;
//!
//! let schema = g::object([
//!     ("NODE_ENV", g::enum_(["development", "production", "test"])),
//!     ("PORT", g::number()),
//!     ("DATABASE_URL", g::string().url()),
//!     ("DEBUG", g::boolean()),
//! ]);
//! assert_eq!(schema.len(), 4);
//! ```

use crate::coerce::{BooleanCoercion, Coercion, NumericCoercion};
use crate::schema::{FieldSchema, Kind, NumberCheck, ObjectSchema};

/// An object schema from `(name, field)` pairs, in order.
pub fn object<K, I>(fields: I) -> ObjectSchema
where
    K: Into<String>,
    I: IntoIterator<Item = (K, FieldSchema)>,
{
    fields.into_iter().collect()
}

/// A string field restricted to the given literals.
///
/// An empty literal list is accepted and rejects every value.
pub fn enum_<S, I>(values: I) -> FieldSchema
where
    S: Into<String>,
    I: IntoIterator<Item = S>,
{
    FieldSchema::new(Kind::Enum(values.into_iter().map(Into::into).collect()))
}

pub fn string() -> FieldSchema {
    FieldSchema::new(Kind::String(Vec::new()))
}

/// A non-negative integer read with lenient numeric coercion.
pub fn number() -> FieldSchema {
    FieldSchema::new(Kind::Number(vec![NumberCheck::Int, NumberCheck::Min(0.0)]))
        .coerce(Coercion::Numeric(NumericCoercion::Lenient))
}

/// A boolean read with truthy string coercion.
pub fn boolean() -> FieldSchema {
    FieldSchema::new(Kind::Boolean).coerce(Coercion::Boolean(BooleanCoercion::Truthy))
}
