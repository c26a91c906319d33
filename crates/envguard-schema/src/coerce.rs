//! # Coercion Policies
//!
//! Environment variables are always strings at the source. A coercion step
//! runs before the structural check and turns the raw string (or its absence)
//! into the value the check expects.
//!
//! Two lenient policies are the defaults of the convenience builder:
//!
//! - [`NumericCoercion::Lenient`] — garbage, empty and absent input all become
//!   `0`, which then passes a non-negative integer check.
//! - [`BooleanCoercion::Truthy`] — every non-empty string is `true`, including
//!   the literal `"false"`; only empty or absent input is `false`.
//!
//! Both can mask misconfiguration. The `Strict` variants reject instead: input
//! they cannot convert is passed through unchanged so the structural check
//! reports it, and absence stays absence.

use std::fmt;
use std::sync::Arc;

use envguard_core::TypedValue;

/// How a numeric field converts its raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericCoercion {
    /// Unparseable, empty, zero and absent input coerce to `0`.
    #[default]
    Lenient,
    /// Only parseable numbers are converted.
    Strict,
}

/// How a boolean field converts its raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BooleanCoercion {
    /// String truthiness: non-empty is `true`, empty or absent is `false`.
    #[default]
    Truthy,
    /// `true/1/yes/on` and `false/0/no/off`, case-insensitive.
    Strict,
}

/// Signature of a caller-supplied coercion.
pub type CoerceFn = dyn Fn(Option<TypedValue>) -> Option<TypedValue> + Send + Sync;

/// A preprocessing step attached to a field.
#[derive(Clone)]
pub enum Coercion {
    Numeric(NumericCoercion),
    Boolean(BooleanCoercion),
    /// Parse a JSON document; used to feed nested objects from one variable.
    Json,
    Custom(Arc<CoerceFn>),
}

impl Coercion {
    /// Wrap a closure as a coercion step.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(Option<TypedValue>) -> Option<TypedValue> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// The strict counterpart of a lenient policy. Other steps are unchanged.
    pub fn strict(self) -> Self {
        match self {
            Self::Numeric(_) => Self::Numeric(NumericCoercion::Strict),
            Self::Boolean(_) => Self::Boolean(BooleanCoercion::Strict),
            other => other,
        }
    }

    /// Run the step. `None` in and out means the value is absent.
    pub fn apply(&self, input: Option<TypedValue>) -> Option<TypedValue> {
        match self {
            Self::Numeric(NumericCoercion::Lenient) => Some(lenient_number(input)),
            Self::Numeric(NumericCoercion::Strict) => input.map(strict_number),
            Self::Boolean(BooleanCoercion::Truthy) => Some(TypedValue::Bool(truthy(input.as_ref()))),
            Self::Boolean(BooleanCoercion::Strict) => input.map(strict_boolean),
            Self::Json => input.and_then(parse_json),
            Self::Custom(f) => f(input),
        }
    }
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(policy) => f.debug_tuple("Numeric").field(policy).finish(),
            Self::Boolean(policy) => f.debug_tuple("Boolean").field(policy).finish(),
            Self::Json => f.write_str("Json"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

fn lenient_number(input: Option<TypedValue>) -> TypedValue {
    let n = match input {
        None | Some(TypedValue::Object(_)) => f64::NAN,
        Some(TypedValue::String(s)) => parse_number(&s),
        Some(TypedValue::Number(n)) => n,
        Some(TypedValue::Bool(b)) => f64::from(u8::from(b)),
    };
    // NaN and both zeros are falsy and fall back to 0.
    if n.is_nan() || n == 0.0 {
        TypedValue::Number(0.0)
    } else {
        TypedValue::Number(n)
    }
}

fn strict_number(input: TypedValue) -> TypedValue {
    match input {
        TypedValue::String(s) => {
            let n = parse_number(&s);
            if trim_whitespace(&s).is_empty() || n.is_nan() {
                TypedValue::String(s)
            } else {
                TypedValue::Number(n)
            }
        }
        other => other,
    }
}

fn truthy(input: Option<&TypedValue>) -> bool {
    match input {
        None => false,
        Some(TypedValue::String(s)) => !s.is_empty(),
        Some(TypedValue::Number(n)) => !(n.is_nan() || *n == 0.0),
        Some(TypedValue::Bool(b)) => *b,
        Some(TypedValue::Object(_)) => true,
    }
}

fn strict_boolean(input: TypedValue) -> TypedValue {
    match input {
        TypedValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => TypedValue::Bool(true),
            "false" | "0" | "no" | "off" => TypedValue::Bool(false),
            _ => TypedValue::String(s),
        },
        other => other,
    }
}

fn parse_json(input: TypedValue) -> Option<TypedValue> {
    match input {
        TypedValue::String(s) => match serde_json::from_str::<serde_json::Value>(&s) {
            Ok(value) => TypedValue::from_json(&value),
            Err(_) => Some(TypedValue::String(s)),
        },
        other => Some(other),
    }
}

/// Convert a string to a number with the rules of string-to-number conversion
/// in web runtimes.
///
/// Surrounding whitespace, including a byte-order mark, is ignored and the
/// empty string is `0`. Accepts decimal literals with optional sign, fraction and exponent, unsigned
/// `0x`/`0o`/`0b` integers, and `Infinity` with optional sign. Everything
/// else is NaN.
pub fn parse_number(raw: &str) -> f64 {
    let s = trim_whitespace(raw);
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let prefixed = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)];
    for (prefix, radix) in prefixed {
        if let Some(digits) = s.strip_prefix(prefix) {
            return parse_radix(digits, radix);
        }
    }
    if !is_decimal_literal(s) {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

fn trim_whitespace(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN)
}

/// `[+-]? (digits [. digits?] | . digits) ([eE] [+-]? digits)?`
fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        mantissa_digits += i - frac_start;
    }
    if mantissa_digits == 0 {
        return false;
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }
    i == bytes.len()
}
