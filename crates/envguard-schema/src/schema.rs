//! # Schema Engine
//!
//! An [`ObjectSchema`] is an ordered list of named [`FieldSchema`]s. Each field
//! runs the same pipeline:
//!
//! 1. default substitution, then the optional short-circuit (an absent
//!    optional field is omitted from the result and nothing else runs);
//! 2. the coercion step, if any;
//! 3. the structural check for the declared [`Kind`], collecting every failed
//!    check rather than stopping at the first;
//! 4. transforms, in declaration order, only when all checks passed.
//!
//! Fields are processed independently, so one run reports every failing
//! field. Keys in the input that the schema does not name are ignored.

use std::fmt;
use std::sync::Arc;

use envguard_core::{
    DescribeFields, DescriptorKind, EnvSnapshot, FieldDescriptor, Issue, IssueCode, ParseEnv,
    TypedObject, TypedValue, ValidationFailure,
};

use crate::coerce::Coercion;

/// Checks applied to string values.
#[derive(Debug, Clone, PartialEq)]
pub enum StringCheck {
    /// Parseable as an absolute URL.
    Url,
    /// At least this many characters.
    MinLen(usize),
    /// At most this many characters.
    MaxLen(usize),
}

/// Checks applied to number values.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberCheck {
    Int,
    Min(f64),
    Max(f64),
}

/// Declared kind of a field.
#[derive(Debug, Clone)]
pub enum Kind {
    String(Vec<StringCheck>),
    Number(Vec<NumberCheck>),
    Boolean,
    Enum(Vec<String>),
    Object(ObjectSchema),
}

/// Signature of a caller-supplied transform.
pub type TransformFn = dyn Fn(TypedValue) -> Result<TypedValue, String> + Send + Sync;

/// A post-validation mapping.
#[derive(Clone)]
pub enum Transform {
    Uppercase,
    Lowercase,
    Trim,
    /// A fallible mapping whose result has the declared `output` kind.
    Custom {
        output: DescriptorKind,
        f: Arc<TransformFn>,
    },
}

impl Transform {
    fn apply(&self, value: TypedValue) -> Result<TypedValue, String> {
        match (self, value) {
            (Self::Uppercase, TypedValue::String(s)) => Ok(TypedValue::String(s.to_uppercase())),
            (Self::Lowercase, TypedValue::String(s)) => Ok(TypedValue::String(s.to_lowercase())),
            (Self::Trim, TypedValue::String(s)) => Ok(TypedValue::String(s.trim().to_string())),
            (Self::Custom { f, .. }, value) => f(value),
            (_, value) => Ok(value),
        }
    }

    /// Kind of the value after this transform, given the kind before it.
    fn output_kind(&self, input: &DescriptorKind) -> DescriptorKind {
        match self {
            Self::Custom { output, .. } => output.clone(),
            _ => match input {
                DescriptorKind::Enum(_) => DescriptorKind::string(),
                other => other.clone(),
            },
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uppercase => f.write_str("Uppercase"),
            Self::Lowercase => f.write_str("Lowercase"),
            Self::Trim => f.write_str("Trim"),
            Self::Custom { output, .. } => f
                .debug_struct("Custom")
                .field("output", output)
                .finish_non_exhaustive(),
        }
    }
}

/// One field: kind, optionality, coercion, transforms.
///
/// Check methods (`url`, `int`, ...) apply to the matching kind only and are
/// ignored on any other kind.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    kind: Kind,
    optional: bool,
    default: Option<String>,
    coercion: Option<Coercion>,
    transforms: Vec<Transform>,
    description: Option<String>,
}

impl FieldSchema {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            optional: false,
            default: None,
            coercion: None,
            transforms: Vec::new(),
            description: None,
        }
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn coercion(&self) -> Option<&Coercion> {
        self.coercion.as_ref()
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// True when the field may be absent from the result.
    pub fn is_optional(&self) -> bool {
        self.optional && self.default.is_none()
    }

    /// Allow the variable to be absent; absent values are omitted.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Raw value used when the variable is absent.
    pub fn default_value(mut self, raw: impl Into<String>) -> Self {
        self.default = Some(raw.into());
        self
    }

    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Replace the coercion step.
    pub fn coerce(mut self, coercion: Coercion) -> Self {
        self.coercion = Some(coercion);
        self
    }

    /// Replace the coercion step with a closure.
    pub fn coerce_with<F>(self, f: F) -> Self
    where
        F: Fn(Option<TypedValue>) -> Option<TypedValue> + Send + Sync + 'static,
    {
        self.coerce(Coercion::custom(f))
    }

    /// Parse the raw value as a JSON document before checking.
    pub fn json(self) -> Self {
        self.coerce(Coercion::Json)
    }

    /// Switch lenient numeric or truthy boolean coercion to its strict form.
    pub fn strict(mut self) -> Self {
        self.coercion = self.coercion.map(Coercion::strict);
        self
    }

    fn with_string_check(mut self, check: StringCheck) -> Self {
        if let Kind::String(checks) = &mut self.kind {
            checks.push(check);
        }
        self
    }

    fn with_number_check(mut self, check: NumberCheck) -> Self {
        if let Kind::Number(checks) = &mut self.kind {
            checks.push(check);
        }
        self
    }

    pub fn url(self) -> Self {
        self.with_string_check(StringCheck::Url)
    }

    pub fn min_len(self, n: usize) -> Self {
        self.with_string_check(StringCheck::MinLen(n))
    }

    pub fn max_len(self, n: usize) -> Self {
        self.with_string_check(StringCheck::MaxLen(n))
    }

    pub fn non_empty(self) -> Self {
        self.min_len(1)
    }

    pub fn int(self) -> Self {
        self.with_number_check(NumberCheck::Int)
    }

    pub fn nonnegative(self) -> Self {
        self.min(0.0)
    }

    pub fn min(self, n: f64) -> Self {
        self.with_number_check(NumberCheck::Min(n))
    }

    pub fn max(self, n: f64) -> Self {
        self.with_number_check(NumberCheck::Max(n))
    }

    /// Append a transform.
    pub fn transform(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    pub fn uppercase(self) -> Self {
        self.transform(Transform::Uppercase)
    }

    pub fn lowercase(self) -> Self {
        self.transform(Transform::Lowercase)
    }

    pub fn trim(self) -> Self {
        self.transform(Transform::Trim)
    }

    /// Append a custom transform producing values of kind `output`.
    pub fn transform_with<F>(self, output: DescriptorKind, f: F) -> Self
    where
        F: Fn(TypedValue) -> Result<TypedValue, String> + Send + Sync + 'static,
    {
        self.transform(Transform::Custom {
            output,
            f: Arc::new(f),
        })
    }

    /// Introspected kind: the declared kind, wrapped by transforms and
    /// optionality.
    pub fn descriptor_kind(&self) -> DescriptorKind {
        let base = match &self.kind {
            Kind::String(_) => DescriptorKind::string(),
            Kind::Number(_) => DescriptorKind::number(),
            Kind::Boolean => DescriptorKind::boolean(),
            Kind::Enum(values) => DescriptorKind::Enum(values.clone()),
            Kind::Object(schema) => DescriptorKind::Object(schema.field_descriptors().collect()),
        };
        let kind = if self.transforms.is_empty() {
            base
        } else {
            let output = self
                .transforms
                .iter()
                .fold(base.clone(), |acc, t| t.output_kind(&acc));
            DescriptorKind::transformed(base, output)
        };
        if self.is_optional() {
            DescriptorKind::optional(kind)
        } else {
            kind
        }
    }

    pub fn descriptor(&self, name: &str) -> FieldDescriptor {
        FieldDescriptor {
            name: name.to_string(),
            kind: self.descriptor_kind(),
            is_optional: self.is_optional(),
            description: self.description.clone(),
        }
    }

    /// Run the field pipeline. `None` means the field is omitted from the
    /// result, either because it is an absent optional or because it failed;
    /// failures are pushed onto `issues`.
    fn parse(
        &self,
        input: Option<TypedValue>,
        path: &[String],
        issues: &mut Vec<Issue>,
    ) -> Option<TypedValue> {
        let input = input.or_else(|| self.default.clone().map(TypedValue::String));
        if input.is_none() && self.optional {
            return None;
        }

        let coerced = match &self.coercion {
            Some(coercion) => coercion.apply(input),
            None => input,
        };
        let Some(value) = coerced else {
            issues.push(Issue::new(path.to_vec(), IssueCode::Missing));
            return None;
        };

        let before = issues.len();
        let checked = self.check(value, path, issues);
        if issues.len() > before {
            return None;
        }

        let mut value = checked?;
        for transform in &self.transforms {
            match transform.apply(value) {
                Ok(next) => value = next,
                Err(message) => {
                    issues.push(Issue::new(path.to_vec(), IssueCode::Custom(message)));
                    return None;
                }
            }
        }
        Some(value)
    }

    fn check(
        &self,
        value: TypedValue,
        path: &[String],
        issues: &mut Vec<Issue>,
    ) -> Option<TypedValue> {
        match (&self.kind, value) {
            (Kind::String(checks), TypedValue::String(s)) => {
                for check in checks {
                    match check {
                        StringCheck::Url => {
                            if url::Url::parse(&s).is_err() {
                                reject(issues, path, IssueCode::InvalidUrl);
                            }
                        }
                        StringCheck::MinLen(minimum) => {
                            if s.chars().count() < *minimum {
                                reject(issues, path, IssueCode::TooShort { minimum: *minimum });
                            }
                        }
                        StringCheck::MaxLen(maximum) => {
                            if s.chars().count() > *maximum {
                                reject(issues, path, IssueCode::TooLong { maximum: *maximum });
                            }
                        }
                    }
                }
                Some(TypedValue::String(s))
            }
            (Kind::Number(checks), TypedValue::Number(n)) => {
                if n.is_nan() {
                    reject(issues, path, invalid_type("number", "nan"));
                    return None;
                }
                if n.is_infinite() {
                    reject(issues, path, IssueCode::NotFinite);
                    return None;
                }
                for check in checks {
                    match check {
                        NumberCheck::Int => {
                            if n.fract() != 0.0 {
                                reject(issues, path, IssueCode::NotInteger);
                            }
                        }
                        NumberCheck::Min(minimum) => {
                            if n < *minimum {
                                reject(issues, path, IssueCode::TooSmall { minimum: *minimum });
                            }
                        }
                        NumberCheck::Max(maximum) => {
                            if n > *maximum {
                                reject(issues, path, IssueCode::TooBig { maximum: *maximum });
                            }
                        }
                    }
                }
                Some(TypedValue::Number(n))
            }
            (Kind::Boolean, TypedValue::Bool(b)) => Some(TypedValue::Bool(b)),
            (Kind::Enum(values), TypedValue::String(s)) => {
                if values.contains(&s) {
                    Some(TypedValue::String(s))
                } else {
                    reject(issues, path, IssueCode::InvalidEnumValue {
                        options: values.clone(),
                        received: s,
                    });
                    None
                }
            }
            (Kind::Object(schema), TypedValue::Object(input)) => {
                let parsed = schema.parse_with(|name| input.get(name).cloned(), path, issues);
                Some(TypedValue::Object(parsed))
            }
            (kind, value) => {
                reject(issues, path, invalid_type(kind_name(kind), value.type_name()));
                None
            }
        }
    }
}

fn reject(issues: &mut Vec<Issue>, path: &[String], code: IssueCode) {
    issues.push(Issue::new(path.to_vec(), code));
}

fn invalid_type(expected: &str, received: &str) -> IssueCode {
    IssueCode::InvalidType {
        expected: expected.to_string(),
        received: received.to_string(),
    }
}

fn kind_name(kind: &Kind) -> &'static str {
    match kind {
        Kind::String(_) | Kind::Enum(_) => "string",
        Kind::Number(_) => "number",
        Kind::Boolean => "boolean",
        Kind::Object(_) => "object",
    }
}

impl From<ObjectSchema> for FieldSchema {
    fn from(schema: ObjectSchema) -> Self {
        Self::new(Kind::Object(schema))
    }
}

/// An ordered set of named fields.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    fields: Vec<(String, FieldSchema)>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field. Redefining a name replaces the earlier definition in
    /// place, so declaration order is that of the first definition.
    pub fn field(mut self, name: impl Into<String>, schema: impl Into<FieldSchema>) -> Self {
        self.insert(name.into(), schema.into());
        self
    }

    fn insert(&mut self, name: String, schema: FieldSchema) {
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = schema,
            None => self.fields.push((name, schema)),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSchema)> {
        self.fields.iter().map(|(n, f)| (n.as_str(), f))
    }

    /// Validate without logging; the non-raising form of validation.
    ///
    /// # Errors
    ///
    /// Returns every per-field issue when any field fails.
    pub fn safe_parse(&self, env: &EnvSnapshot) -> Result<TypedObject, ValidationFailure> {
        let mut issues = Vec::new();
        let parsed = self.parse_with(|name| env.get(name).map(TypedValue::from), &[], &mut issues);
        if issues.is_empty() {
            Ok(parsed)
        } else {
            Err(ValidationFailure::new(issues))
        }
    }

    fn parse_with<F>(&self, lookup: F, path: &[String], issues: &mut Vec<Issue>) -> TypedObject
    where
        F: Fn(&str) -> Option<TypedValue>,
    {
        let mut out = TypedObject::new();
        for (name, field) in &self.fields {
            let mut field_path = path.to_vec();
            field_path.push(name.clone());
            if let Some(value) = field.parse(lookup(name), &field_path, issues) {
                out.insert(name.clone(), value);
            }
        }
        out
    }
}

impl<K: Into<String>> FromIterator<(K, FieldSchema)> for ObjectSchema {
    fn from_iter<I: IntoIterator<Item = (K, FieldSchema)>>(iter: I) -> Self {
        let mut schema = Self::new();
        for (name, field) in iter {
            schema.insert(name.into(), field);
        }
        schema
    }
}

impl ParseEnv for ObjectSchema {
    fn parse_env(&self, env: &EnvSnapshot) -> Result<TypedObject, ValidationFailure> {
        self.safe_parse(env)
    }
}

impl DescribeFields for ObjectSchema {
    fn field_descriptors(&self) -> Box<dyn Iterator<Item = FieldDescriptor> + '_> {
        Box::new(self.fields.iter().map(|(name, field)| field.descriptor(name)))
    }
}
