//! # Declarative Schema Documents
//!
//! Loads an environment schema from a YAML or JSON document:
//!
//! ```yaml
//! coercion: lenient
//! fields:
//!   - name: NODE_ENV
//!     type: enum
//!     values: [development, production, test]
//!   - name: PORT
//!     type: number
//!   - name: DATABASE_URL
//!     type: string
//!     format: url
//! ```
//!
//! Fields are a list so declaration order survives parsing. A document is
//! first validated against the embedded `envguard.schema.json` (Draft
//! 2020-12), which reports every structural violation with its instance path;
//! only a conforming document is interpreted.
//!
//! Number fields default to the `g::number()` shape: integer, minimum 0,
//! lenient coercion. Object fields read their variable as a JSON document.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use jsonschema::Validator;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::coerce::{Coercion, NumericCoercion};
use crate::g;
use crate::schema::{FieldSchema, Kind, ObjectSchema};

/// Meta-schema every document must satisfy.
const DOCUMENT_SCHEMA: &str = include_str!("../schemas/envguard.schema.json");

/// Error while loading a schema document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The document file could not be read.
    #[error("cannot read schema document '{path}': {source}")]
    Read {
        /// Path of the document.
        path: String,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML or JSON.
    #[error("cannot parse schema document '{origin}': {reason}")]
    Parse {
        /// Path or label of the document.
        origin: String,
        /// Parser message.
        reason: String,
    },

    /// The document does not conform to the document format.
    #[error("schema document '{origin}' is malformed:\n{violations}")]
    Malformed {
        /// Path or label of the document.
        origin: String,
        /// Every format violation.
        violations: DocumentViolations,
    },

    /// The document conforms structurally but cannot be turned into a schema.
    #[error("invalid schema document '{origin}': {reason}")]
    Invalid {
        /// Path or label of the document.
        origin: String,
        /// What is wrong.
        reason: String,
    },

    /// The embedded meta-schema failed to compile.
    #[error("document meta-schema error: {0}")]
    MetaSchema(String),
}

/// A single format violation.
#[derive(Debug, Clone)]
pub struct Violation {
    /// JSON Pointer to the offending value in the document.
    pub instance_path: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of format violations.
#[derive(Debug, Clone)]
pub struct DocumentViolations {
    violations: Vec<Violation>,
}

impl DocumentViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for DocumentViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Source syntax of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// `.json` files are JSON; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Document-wide or per-field coercion strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoercionSetting {
    #[default]
    Lenient,
    Strict,
}

/// A parsed schema document.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub coercion: CoercionSetting,
    pub fields: Vec<FieldSpec>,
    #[serde(skip)]
    origin: String,
}

/// One declared field.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: KindSpec,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default: Option<DefaultValue>,
    #[serde(default)]
    pub coercion: Option<CoercionSetting>,
    #[serde(default)]
    pub transform: Vec<TransformSpec>,
}

/// Kind-specific keys, selected by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KindSpec {
    String {
        format: Option<StringFormat>,
        min_length: Option<usize>,
        max_length: Option<usize>,
    },
    Number {
        integer: Option<bool>,
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Boolean,
    Enum {
        values: Vec<String>,
    },
    Object {
        fields: Vec<FieldSpec>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringFormat {
    Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformSpec {
    Uppercase,
    Lowercase,
    Trim,
}

/// A default written as a string, number or boolean; used as the raw value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl DefaultValue {
    /// The raw environment string this default stands for.
    pub fn raw(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Flag(b) => b.to_string(),
        }
    }
}

impl SchemaDocument {
    /// Read and parse a document file; the format follows the extension.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Read`] when the file cannot be read, and the
    /// errors of [`SchemaDocument::parse`] otherwise.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, DocumentFormat::from_path(path), &path.display().to_string())
    }

    /// Parse document text. `origin` labels the document in errors.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Parse`] for syntax errors and
    /// [`DocumentError::Malformed`] when the document violates the format.
    pub fn parse(text: &str, format: DocumentFormat, origin: &str) -> Result<Self, DocumentError> {
        let parse_error = |reason: String| DocumentError::Parse {
            origin: origin.to_string(),
            reason,
        };
        let value: Value = match format {
            DocumentFormat::Yaml => serde_yaml::from_str(text).map_err(|e| parse_error(e.to_string()))?,
            DocumentFormat::Json => serde_json::from_str(text).map_err(|e| parse_error(e.to_string()))?,
        };

        let validator = document_validator()?;
        let violations: Vec<Violation> = validator
            .iter_errors(&value)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect();
        if !violations.is_empty() {
            return Err(DocumentError::Malformed {
                origin: origin.to_string(),
                violations: DocumentViolations { violations },
            });
        }

        let mut document: SchemaDocument =
            serde_json::from_value(value).map_err(|e| parse_error(e.to_string()))?;
        document.origin = origin.to_string();
        tracing::debug!(origin, fields = document.fields.len(), "parsed schema document");
        Ok(document)
    }

    /// Path or label the document was read from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Apply `setting` to the whole document, dropping per-field overrides.
    pub fn force_coercion(mut self, setting: CoercionSetting) -> Self {
        fn clear(fields: &mut [FieldSpec]) {
            for field in fields {
                field.coercion = None;
                if let KindSpec::Object { fields } = &mut field.kind {
                    clear(fields);
                }
            }
        }
        self.coercion = setting;
        clear(&mut self.fields);
        self
    }

    /// Build the engine schema.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Invalid`] for duplicate field names, empty
    /// enums and inverted length bounds.
    pub fn into_schema(self) -> Result<ObjectSchema, DocumentError> {
        build_object(&self.fields, self.coercion).map_err(|reason| DocumentError::Invalid {
            origin: self.origin.clone(),
            reason,
        })
    }
}

/// Load a document file straight into a schema.
///
/// # Errors
///
/// Any [`DocumentError`] from reading, parsing or building.
pub fn load_schema(path: impl AsRef<Path>) -> Result<ObjectSchema, DocumentError> {
    SchemaDocument::from_path(path)?.into_schema()
}

fn document_validator() -> Result<&'static Validator, DocumentError> {
    static VALIDATOR: OnceLock<Result<Validator, String>> = OnceLock::new();
    VALIDATOR
        .get_or_init(|| {
            let schema: Value = serde_json::from_str(DOCUMENT_SCHEMA).map_err(|e| e.to_string())?;
            let mut opts = jsonschema::options();
            opts.with_draft(jsonschema::Draft::Draft202012);
            opts.build(&schema).map_err(|e| e.to_string())
        })
        .as_ref()
        .map_err(|reason| DocumentError::MetaSchema(reason.clone()))
}

fn build_object(fields: &[FieldSpec], coercion: CoercionSetting) -> Result<ObjectSchema, String> {
    let mut seen = HashSet::new();
    let mut schema = ObjectSchema::new();
    for spec in fields {
        if !seen.insert(spec.name.as_str()) {
            return Err(format!("duplicate field '{}'", spec.name));
        }
        schema = schema.field(spec.name.clone(), build_field(spec, coercion)?);
    }
    Ok(schema)
}

fn build_field(spec: &FieldSpec, inherited: CoercionSetting) -> Result<FieldSchema, String> {
    let coercion = spec.coercion.unwrap_or(inherited);
    let mut field = match &spec.kind {
        KindSpec::String {
            format,
            min_length,
            max_length,
        } => {
            if let (Some(min), Some(max)) = (min_length, max_length) {
                if min > max {
                    return Err(format!(
                        "field '{}': min_length {min} exceeds max_length {max}",
                        spec.name
                    ));
                }
            }
            let mut field = g::string();
            if *format == Some(StringFormat::Url) {
                field = field.url();
            }
            if let Some(min) = min_length {
                field = field.min_len(*min);
            }
            if let Some(max) = max_length {
                field = field.max_len(*max);
            }
            field
        }
        KindSpec::Number {
            integer,
            minimum,
            maximum,
        } => {
            let mut field = FieldSchema::new(Kind::Number(Vec::new()))
                .coerce(Coercion::Numeric(NumericCoercion::Lenient));
            if integer.unwrap_or(true) {
                field = field.int();
            }
            field = field.min(minimum.unwrap_or(0.0));
            if let Some(max) = maximum {
                field = field.max(*max);
            }
            field
        }
        KindSpec::Boolean => g::boolean(),
        KindSpec::Enum { values } => {
            if values.is_empty() {
                return Err(format!("field '{}': enum has no values", spec.name));
            }
            g::enum_(values.iter().cloned())
        }
        KindSpec::Object { fields } => FieldSchema::from(build_object(fields, coercion)?).json(),
    };

    if coercion == CoercionSetting::Strict {
        field = field.strict();
    }
    for transform in &spec.transform {
        field = match transform {
            TransformSpec::Uppercase => field.uppercase(),
            TransformSpec::Lowercase => field.lowercase(),
            TransformSpec::Trim => field.trim(),
        };
    }
    if spec.optional {
        field = field.optional();
    }
    if let Some(default) = &spec.default {
        field = field.default_value(default.raw());
    }
    if let Some(description) = &spec.description {
        field = field.describe(description.clone());
    }
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use envguard_core::{DescribeFields, EnvSnapshot, TypedValue};

    const SAMPLE: &str = r#"
fields:
  - name: NODE_ENV
    type: enum
    values: [development, production, test]
  - name: PORT
    type: number
  - name: DATABASE_URL
    type: string
    format: url
  - name: TRANSFORMED_VAR
    type: string
    transform: [uppercase]
  - name: OPTIONAL_VAR
    type: string
    optional: true
  - name: BOOLEAN_FLAG
    type: boolean
"#;

    fn parse_yaml(text: &str) -> Result<SchemaDocument, DocumentError> {
        SchemaDocument::parse(text, DocumentFormat::Yaml, "test.yaml")
    }

    #[test]
    fn yaml_document_keeps_field_order() {
        let schema = parse_yaml(SAMPLE).unwrap().into_schema().unwrap();
        let names: Vec<_> = schema.field_descriptors().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![
                "NODE_ENV",
                "PORT",
                "DATABASE_URL",
                "TRANSFORMED_VAR",
                "OPTIONAL_VAR",
                "BOOLEAN_FLAG"
            ]
        );
    }

    #[test]
    fn json_document_is_accepted() {
        let text = r#"{"fields": [{"name": "HOST", "type": "string", "optional": true}]}"#;
        let schema = SchemaDocument::parse(text, DocumentFormat::Json, "test.json")
            .unwrap()
            .into_schema()
            .unwrap();
        assert!(schema.get("HOST").unwrap().is_optional());
    }

    #[test]
    fn format_violations_are_all_reported() {
        let text = r#"
fields:
  - name: A
    type: text
  - type: enum
  - name: C
    type: string
    colour: blue
"#;
        let err = parse_yaml(text).unwrap_err();
        match err {
            DocumentError::Malformed { violations, .. } => {
                assert!(violations.len() >= 3, "got: {violations}");
                assert!(violations
                    .violations()
                    .iter()
                    .any(|v| v.instance_path.starts_with("/fields/1")));
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn enum_without_values_is_malformed() {
        let err = parse_yaml("fields:\n  - name: MODE\n    type: enum\n").unwrap_err();
        assert!(matches!(err, DocumentError::Malformed { .. }));
    }

    #[test]
    fn syntax_error_is_parse_error() {
        let err = parse_yaml("fields: [unclosed").unwrap_err();
        assert!(matches!(err, DocumentError::Parse { .. }));
    }

    #[test]
    fn duplicate_names_are_invalid() {
        let text = "fields:\n  - {name: A, type: string}\n  - {name: A, type: number}\n";
        let err = parse_yaml(text).unwrap().into_schema().unwrap_err();
        match err {
            DocumentError::Invalid { reason, .. } => assert!(reason.contains("duplicate field 'A'")),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn inverted_length_bounds_are_invalid() {
        let text = "fields:\n  - {name: A, type: string, min_length: 5, max_length: 2}\n";
        let err = parse_yaml(text).unwrap().into_schema().unwrap_err();
        assert!(matches!(err, DocumentError::Invalid { .. }));
    }

    #[test]
    fn number_defaults_match_convenience_builder() {
        let text = "fields:\n  - {name: PORT, type: number}\n";
        let schema = parse_yaml(text).unwrap().into_schema().unwrap();
        let env: EnvSnapshot = [("PORT", "garbage")].into_iter().collect();
        let out = schema.safe_parse(&env).unwrap();
        assert_eq!(out.get("PORT").and_then(TypedValue::as_f64), Some(0.0));

        let env: EnvSnapshot = [("PORT", "-2")].into_iter().collect();
        assert!(schema.safe_parse(&env).is_err());
    }

    #[test]
    fn number_bounds_and_fractions() {
        let text = "fields:\n  - {name: RATIO, type: number, integer: false, minimum: -1, maximum: 1}\n";
        let schema = parse_yaml(text).unwrap().into_schema().unwrap();
        let env: EnvSnapshot = [("RATIO", "-0.5")].into_iter().collect();
        assert!(schema.safe_parse(&env).is_ok());
        let env: EnvSnapshot = [("RATIO", "1.5")].into_iter().collect();
        assert!(schema.safe_parse(&env).is_err());
    }

    #[test]
    fn strict_document_rejects_garbage_numbers() {
        let text = "coercion: strict\nfields:\n  - {name: PORT, type: number}\n  - {name: FLAG, type: boolean, coercion: lenient}\n";
        let schema = parse_yaml(text).unwrap().into_schema().unwrap();
        let env: EnvSnapshot = [("PORT", "garbage"), ("FLAG", "false")].into_iter().collect();
        let failure = schema.safe_parse(&env).unwrap_err();
        assert_eq!(failure.fields(), vec!["PORT".to_string()]);
    }

    #[test]
    fn force_coercion_overrides_fields() {
        let text = "fields:\n  - {name: FLAG, type: boolean, coercion: lenient}\n";
        let schema = parse_yaml(text)
            .unwrap()
            .force_coercion(CoercionSetting::Strict)
            .into_schema()
            .unwrap();
        let env: EnvSnapshot = [("FLAG", "false")].into_iter().collect();
        let out = schema.safe_parse(&env).unwrap();
        assert_eq!(out.get("FLAG").and_then(TypedValue::as_bool), Some(false));
    }

    #[test]
    fn defaults_accept_scalars() {
        let text = "fields:\n  - {name: PORT, type: number, default: 8080}\n  - {name: DEBUG, type: boolean, default: true}\n  - {name: MODE, type: string, default: fast}\n";
        let schema = parse_yaml(text).unwrap().into_schema().unwrap();
        let out = schema.safe_parse(&EnvSnapshot::new()).unwrap();
        assert_eq!(out.get("PORT").and_then(TypedValue::as_f64), Some(8080.0));
        assert_eq!(out.get("DEBUG").and_then(TypedValue::as_bool), Some(true));
        assert_eq!(out.get("MODE").and_then(TypedValue::as_str), Some("fast"));
    }

    #[test]
    fn nested_object_reads_json() {
        let text = r#"
fields:
  - name: DB
    type: object
    fields:
      - {name: HOST, type: string}
      - {name: PORT, type: number}
"#;
        let schema = parse_yaml(text).unwrap().into_schema().unwrap();
        let env: EnvSnapshot = [("DB", r#"{"HOST":"db","PORT":"5432"}"#)].into_iter().collect();
        let out = schema.safe_parse(&env).unwrap();
        let db = out.get("DB").and_then(TypedValue::as_object).unwrap();
        assert_eq!(db.get("PORT").and_then(TypedValue::as_f64), Some(5432.0));
    }

    #[test]
    fn load_schema_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env.yaml");
        std::fs::write(&path, SAMPLE).unwrap();
        let schema = load_schema(&path).unwrap();
        assert_eq!(schema.len(), 6);

        let err = load_schema(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, DocumentError::Read { .. }));
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("env.JSON")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("env.yml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("env")), DocumentFormat::Yaml);
    }
}
