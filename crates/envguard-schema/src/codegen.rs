//! # Type-Declaration Generation
//!
//! Renders the validated shape of a schema as a TypeScript declaration:
//!
//! ```text
//! export type Env = {
//!     NODE_ENV: "development" | "production" | "test";
//!     PORT: number;
//! };
//! ```
//!
//! Rendering reads [`FieldDescriptor`]s only, so it works for any
//! [`DescribeFields`] implementation. Members appear in declaration order and
//! the output is a pure function of the descriptors, so regenerating an
//! unchanged schema yields byte-identical text.
//!
//! ## Member types
//!
//! - enums render their literals in order, joined with `|`;
//! - transformed fields render the transform's output kind;
//! - optional fields render their inner kind, with a `?` marker only when
//!   [`GenerateOptions::mark_optional`] is set;
//! - nested objects render as indented type literals.
//!
//! ## Writing
//!
//! [`generate_env_types`] writes to a temporary file next to the target and
//! then renames it over the target. A failed write leaves the previous
//! artifact untouched.

use std::io::Write;
use std::path::Path;

use envguard_core::{DescribeFields, DescriptorKind, EnvGuardError, FieldDescriptor};

/// Rendering options. The default matches the `export type Env` contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Name of the exported type.
    pub type_name: String,
    /// Emit `name?:` for optional members.
    pub mark_optional: bool,
    /// One level of indentation.
    pub indent: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            type_name: "Env".to_string(),
            mark_optional: false,
            indent: "\t".to_string(),
        }
    }
}

/// Render the declaration text for `schema`.
pub fn render_env_types<S>(schema: &S, opts: &GenerateOptions) -> String
where
    S: DescribeFields + ?Sized,
{
    let mut out = format!("export type {} = {{\n", opts.type_name);
    let mut members = 0usize;
    for field in schema.field_descriptors() {
        out.push_str(&member_to_text(&field, opts, 1));
        members += 1;
    }
    out.push_str("};\n");
    tracing::debug!(type_name = %opts.type_name, members, "rendered type declaration");
    out
}

/// Write the declaration for `schema` to `path` with default options.
///
/// # Errors
///
/// Returns [`EnvGuardError::Io`] when the artifact cannot be written, e.g.
/// the parent directory is missing or not writable.
pub fn generate_env_types<S>(schema: &S, path: impl AsRef<Path>) -> Result<(), EnvGuardError>
where
    S: DescribeFields + ?Sized,
{
    generate_env_types_with(schema, path, &GenerateOptions::default())
}

/// Write the declaration for `schema` to `path`.
///
/// # Errors
///
/// Same as [`generate_env_types`].
pub fn generate_env_types_with<S>(
    schema: &S,
    path: impl AsRef<Path>,
    opts: &GenerateOptions,
) -> Result<(), EnvGuardError>
where
    S: DescribeFields + ?Sized,
{
    let path = path.as_ref();
    let text = render_env_types(schema, opts);
    write_atomic(path, text.as_bytes()).map_err(|source| EnvGuardError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), bytes = text.len(), "wrote type declaration");
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let permissions = match std::fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => default_permissions(),
        Err(e) => return Err(e),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    if let Some(permissions) = permissions {
        tmp.as_file().set_permissions(permissions)?;
    }
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Mode for a freshly created artifact; the temp file itself is owner-only.
#[cfg(unix)]
fn default_permissions() -> Option<std::fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<std::fs::Permissions> {
    None
}

fn member_to_text(field: &FieldDescriptor, opts: &GenerateOptions, depth: usize) -> String {
    let indent = opts.indent.repeat(depth);
    let mut out = String::new();
    if let Some(description) = &field.description {
        out.push_str(&format_comment(description, &indent));
    }
    let opt = if opts.mark_optional && field.is_optional {
        "?"
    } else {
        ""
    };
    out.push_str(&format!(
        "{indent}{}{opt}: {};\n",
        normalize_key(&field.name),
        kind_to_text(&field.kind, opts, depth)
    ));
    out
}

fn kind_to_text(kind: &DescriptorKind, opts: &GenerateOptions, depth: usize) -> String {
    match kind {
        DescriptorKind::Primitive(p) => p.as_str().to_string(),
        DescriptorKind::Enum(values) if values.is_empty() => "never".to_string(),
        DescriptorKind::Enum(values) => values
            .iter()
            .map(|v| string_literal(v))
            .collect::<Vec<_>>()
            .join(" | "),
        DescriptorKind::Object(fields) if fields.is_empty() => "{}".to_string(),
        DescriptorKind::Object(fields) => {
            let mut out = "{\n".to_string();
            for field in fields {
                out.push_str(&member_to_text(field, opts, depth + 1));
            }
            out.push_str(&opts.indent.repeat(depth));
            out.push('}');
            out
        }
        DescriptorKind::Optional(inner) => kind_to_text(inner, opts, depth),
        DescriptorKind::Transformed { output, .. } => kind_to_text(output, opts, depth),
    }
}

fn format_comment(comment: &str, indent: &str) -> String {
    let mut out = format!("{indent}/**\n");
    for line in comment.lines() {
        let line = line.replace("*/", "*\\/");
        out.push_str(&format!("{indent} * {line}\n"));
    }
    out.push_str(&format!("{indent} */\n"));
    out
}

fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() || matches!(c, '\u{2028}' | '\u{2029}') => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn needs_quotes(name: &str) -> bool {
    name.is_empty()
        || name
            .chars()
            .any(|c| !c.is_alphanumeric() && c != '_' && c != '$')
        || name.starts_with(|c: char| c.is_ascii_digit())
}

fn normalize_key(name: &str) -> String {
    if needs_quotes(name) {
        string_literal(name)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::g;

    #[test]
    fn renders_primitives_and_enums() {
        let schema = g::object([
            ("NODE_ENV", g::enum_(["development", "production"])),
            ("PORT", g::number()),
            ("DEBUG", g::boolean()),
            ("HOST", g::string()),
        ]);
        let text = render_env_types(&schema, &GenerateOptions::default());
        assert_eq!(
            text,
            "export type Env = {\n\
             \tNODE_ENV: \"development\" | \"production\";\n\
             \tPORT: number;\n\
             \tDEBUG: boolean;\n\
             \tHOST: string;\n\
             };\n"
        );
    }

    #[test]
    fn optional_is_unmarked_by_default() {
        let schema = g::object([("EXTRA", g::string().optional())]);
        let text = render_env_types(&schema, &GenerateOptions::default());
        assert!(text.contains("\tEXTRA: string;\n"));

        let opts = GenerateOptions {
            mark_optional: true,
            ..GenerateOptions::default()
        };
        let text = render_env_types(&schema, &opts);
        assert!(text.contains("\tEXTRA?: string;\n"));
    }

    #[test]
    fn transform_output_kind_is_rendered() {
        let schema = g::object([(
            "COUNT",
            g::string().transform_with(DescriptorKind::number(), |v| Ok(v)),
        )]);
        let text = render_env_types(&schema, &GenerateOptions::default());
        assert!(text.contains("\tCOUNT: number;\n"));
    }

    #[test]
    fn nested_objects_are_indented() {
        let db = g::object([("HOST", g::string()), ("PORT", g::number())]);
        let schema = g::object([("DB", crate::FieldSchema::from(db).json())]);
        let text = render_env_types(&schema, &GenerateOptions::default());
        assert_eq!(
            text,
            "export type Env = {\n\
             \tDB: {\n\
             \t\tHOST: string;\n\
             \t\tPORT: number;\n\
             \t};\n\
             };\n"
        );
    }

    #[test]
    fn descriptions_become_doc_comments() {
        let schema = g::object([("PORT", g::number().describe("Listen port"))]);
        let text = render_env_types(&schema, &GenerateOptions::default());
        assert!(text.contains("\t/**\n\t * Listen port\n\t */\n\tPORT: number;\n"));
    }

    #[test]
    fn literals_and_keys_are_escaped() {
        let schema = g::object([("my-key", g::enum_(["a\"b", "c\\d"]))]);
        let text = render_env_types(&schema, &GenerateOptions::default());
        assert!(text.contains("\t\"my-key\": \"a\\\"b\" | \"c\\\\d\";\n"));
    }

    #[test]
    fn control_characters_are_escaped() {
        let schema = g::object([("M", g::enum_(["a\nb", "c\td\r", "e\u{1}"]))]);
        let text = render_env_types(&schema, &GenerateOptions::default());
        assert!(text.contains("\tM: \"a\\nb\" | \"c\\td\\r\" | \"e\\u0001\";\n"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn comment_terminators_are_broken() {
        let schema = g::object([("A", g::string().describe("ends */ here"))]);
        let text = render_env_types(&schema, &GenerateOptions::default());
        assert!(text.contains("\t * ends *\\/ here\n"));
        assert_eq!(text.matches("*/").count(), 1);
    }

    #[test]
    fn custom_type_name_and_indent() {
        let schema = g::object([("A", g::string())]);
        let opts = GenerateOptions {
            type_name: "ProcessEnv".into(),
            indent: "  ".into(),
            ..GenerateOptions::default()
        };
        assert_eq!(
            render_env_types(&schema, &opts),
            "export type ProcessEnv = {\n  A: string;\n};\n"
        );
    }

    #[test]
    fn empty_schema_and_empty_enum() {
        let text = render_env_types(&g::object(Vec::<(String, _)>::new()), &GenerateOptions::default());
        assert_eq!(text, "export type Env = {\n};\n");
        let text = render_env_types(
            &g::object([("NONE", g::enum_(Vec::<String>::new()))]),
            &GenerateOptions::default(),
        );
        assert!(text.contains("\tNONE: never;\n"));
    }

    #[test]
    fn generate_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env.d.ts");
        std::fs::write(&path, "stale").unwrap();
        generate_env_types(&g::object([("A", g::string())]), &path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "export type Env = {\n\tA: string;\n};\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn generate_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env.d.ts");
        std::fs::write(&path, "old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();
        generate_env_types(&g::object([("A", g::string())]), &path).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn generate_new_file_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env.d.ts");
        generate_env_types(&g::object([("A", g::string())]), &path).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[test]
    fn generate_into_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("env.d.ts");
        let err = generate_env_types(&g::object([("A", g::string())]), &path).unwrap_err();
        match err {
            EnvGuardError::Io { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected Io error, got {other:?}"),
        }
        assert!(!path.exists());
    }
}
