//! # Field Descriptors
//!
//! Engine-independent metadata for one schema field. The generator consumes
//! only these descriptors, so any schema engine that can produce them can
//! drive code generation.
//!
//! Kinds form a tagged tree: [`DescriptorKind::Optional`] and
//! [`DescriptorKind::Transformed`] wrap an inner kind, the rest are leaves
//! (or, for objects, nested descriptor lists).

/// Scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
}

impl PrimitiveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

/// Kind of a field as seen by introspection.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorKind {
    Primitive(PrimitiveKind),
    /// String literals in declaration order.
    Enum(Vec<String>),
    /// Nested fields in declaration order.
    Object(Vec<FieldDescriptor>),
    Optional(Box<DescriptorKind>),
    /// A value validated as `input` and then mapped to `output`.
    Transformed {
        input: Box<DescriptorKind>,
        output: Box<DescriptorKind>,
    },
}

impl DescriptorKind {
    pub fn string() -> Self {
        Self::Primitive(PrimitiveKind::String)
    }

    pub fn number() -> Self {
        Self::Primitive(PrimitiveKind::Number)
    }

    pub fn boolean() -> Self {
        Self::Primitive(PrimitiveKind::Boolean)
    }

    pub fn optional(inner: DescriptorKind) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn transformed(input: DescriptorKind, output: DescriptorKind) -> Self {
        Self::Transformed {
            input: Box::new(input),
            output: Box::new(output),
        }
    }

    /// The kind of the value that ends up in the validated result:
    /// optional wrappers are stripped and transforms resolve to their output.
    pub fn result_kind(&self) -> &DescriptorKind {
        match self {
            Self::Optional(inner) => inner.result_kind(),
            Self::Transformed { output, .. } => output.result_kind(),
            other => other,
        }
    }

    /// True when the outermost wrapper is [`DescriptorKind::Optional`].
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }
}

/// Metadata for one schema field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: DescriptorKind,
    pub is_optional: bool,
    pub description: Option<String>,
}

impl FieldDescriptor {
    /// A descriptor whose optionality is read off `kind`.
    pub fn new(name: impl Into<String>, kind: DescriptorKind) -> Self {
        let is_optional = kind.is_optional();
        Self {
            name: name.into(),
            kind,
            is_optional,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Enum literals of the result kind, if it is an enum.
    pub fn literal_values(&self) -> Option<&[String]> {
        match self.kind.result_kind() {
            DescriptorKind::Enum(values) => Some(values),
            _ => None,
        }
    }
}
