//! Template rendering
//!
//! Templates live in `<templates_dir>/<name>.template` and use `{{ variable }}`
//! placeholders. Substitution is strict: a placeholder naming a variable the
//! context does not define is an error, never an empty string. The whole output
//! is rendered in memory before anything is written, so a failed render leaves
//! no file behind.

use std::fs;
use std::path::{Path, PathBuf};

use super::errors::RenderError;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";
const TEMPLATE_SUFFIX: &str = ".template";

/// Variables available to templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateContext {
    pub fixture_name: String,
    pub compiler_revision: String,
}

impl TemplateContext {
    pub fn new(fixture_name: impl Into<String>, compiler_revision: impl Into<String>) -> Self {
        Self {
            fixture_name: fixture_name.into(),
            compiler_revision: compiler_revision.into(),
        }
    }

    /// Resolve a variable by exact name.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        match name {
            "fixture_name" => Some(&self.fixture_name),
            "compiler_revision" => Some(&self.compiler_revision),
            _ => None,
        }
    }
}

/// Renders named templates from a fixed directory.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    templates_dir: PathBuf,
}

impl TemplateRenderer {
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
        }
    }

    /// File backing the logical template `name`.
    pub fn template_path(&self, name: &str) -> PathBuf {
        self.templates_dir.join(format!("{name}{TEMPLATE_SUFFIX}"))
    }

    /// Render template `name` against `context` into `out_path`, creating parent directories.
    #[tracing::instrument(skip_all, fields(template = name, out = %out_path.display()))]
    pub fn render_to_file(&self, name: &str, context: &TemplateContext, out_path: &Path) -> Result<(), RenderError> {
        let path = self.template_path(name);
        if !path.is_file() {
            return Err(RenderError::TemplateNotFound {
                name: name.to_string(),
                path,
            });
        }
        let source = fs::read_to_string(&path).map_err(|source| RenderError::Read { path, source })?;
        let rendered = render_str(name, &source, context)?;

        let write_err = |source| RenderError::Write {
            path: out_path.to_path_buf(),
            source,
        };
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(out_path, rendered).map_err(write_err)
    }
}

/// Substitute every `{{ variable }}` in `source`.
///
/// `template` is only used to label errors.
pub fn render_str(template: &str, source: &str, context: &TemplateContext) -> Result<String, RenderError> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    let mut offset = 0;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let open_at = offset + start;
        let inner = &rest[start + OPEN.len()..];

        let Some(end) = inner.find(CLOSE) else {
            return Err(parse_error(template, source, open_at, "unterminated placeholder".to_string()));
        };
        let name = inner[..end].trim();
        if name.is_empty() {
            return Err(parse_error(template, source, open_at, "empty placeholder".to_string()));
        }
        if !is_identifier(name) {
            return Err(parse_error(
                template,
                source,
                open_at,
                format!("invalid variable name `{name}`"),
            ));
        }

        match context.lookup(name) {
            Some(value) => out.push_str(value),
            None => {
                return Err(RenderError::UnresolvedVariable {
                    template: template.to_string(),
                    name: name.to_string(),
                    line: location(source, open_at).0,
                });
            }
        }

        let consumed = start + OPEN.len() + end + CLOSE.len();
        rest = &rest[consumed..];
        offset += consumed;
    }

    out.push_str(rest);
    Ok(out)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// 1-based (line, column) of byte offset `at`.
fn location(source: &str, at: usize) -> (usize, usize) {
    let before = &source[..at];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}

fn parse_error(template: &str, source: &str, at: usize, message: String) -> RenderError {
    let (line, column) = location(source, at);
    RenderError::Parse {
        template: template.to_string(),
        line,
        column,
        message,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ctx() -> TemplateContext {
        TemplateContext::new("double", "51aa2bc653454931253c6a396dc160652e458566")
    }

    #[test]
    fn test_substitutes_both_variables() {
        let out = render_str("t", "name = \"{{fixture_name}}\"\nrev = \"{{ compiler_revision }}\"\n", &ctx()).unwrap();
        assert_eq!(
            out,
            "name = \"double\"\nrev = \"51aa2bc653454931253c6a396dc160652e458566\"\n"
        );
    }

    #[test]
    fn test_text_without_placeholders_is_unchanged() {
        let source = "[package]\nversion = \"0.1.0\"\n{ not a placeholder }\n";
        assert_eq!(render_str("t", source, &ctx()).unwrap(), source);
    }

    #[test]
    fn test_unknown_variable_is_an_error() {
        let err = render_str("t", "a\nb = {{ edition }}", &ctx()).unwrap_err();
        match err {
            RenderError::UnresolvedVariable { name, line, .. } => {
                assert_eq!(name, "edition");
                assert_eq!(line, 2);
            }
            other => panic!("expected UnresolvedVariable, got {other:?}"),
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let err = render_str("t", "{{ Fixture_Name }}", &ctx()).unwrap_err();
        assert!(matches!(err, RenderError::UnresolvedVariable { .. }));
    }

    #[test]
    fn test_unterminated_placeholder_reports_position() {
        let err = render_str("t", "x = 1\n  y = {{ fixture_name", &ctx()).unwrap_err();
        match err {
            RenderError::Parse { line, column, message, .. } => {
                assert_eq!((line, column), (2, 7));
                assert_eq!(message, "unterminated placeholder");
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_and_invalid_placeholders() {
        assert!(matches!(
            render_str("t", "{{   }}", &ctx()),
            Err(RenderError::Parse { .. })
        ));
        assert!(matches!(
            render_str("t", "{{ fixture-name }}", &ctx()),
            Err(RenderError::Parse { .. })
        ));
    }

    #[test]
    fn test_render_to_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let templates = dir.path().join("templates");
        fs::create_dir_all(&templates).unwrap();
        fs::write(templates.join("Cargo.toml.template"), "name = \"{{ fixture_name }}\"\n").unwrap();

        let out = dir.path().join("harness/double/Cargo.toml");
        TemplateRenderer::new(&templates)
            .render_to_file("Cargo.toml", &ctx(), &out)
            .unwrap();
        assert_eq!(fs::read_to_string(out).unwrap(), "name = \"double\"\n");
    }

    #[test]
    fn test_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let err = TemplateRenderer::new(dir.path())
            .render_to_file("Cargo.toml", &ctx(), &dir.path().join("out"))
            .unwrap_err();
        assert!(matches!(err, RenderError::TemplateNotFound { .. }));
    }

    #[test]
    fn test_failed_render_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.template"), "ok\n{{ missing }}\n").unwrap();
        let out = dir.path().join("out/Cargo.toml");
        let err = TemplateRenderer::new(dir.path())
            .render_to_file("bad", &ctx(), &out)
            .unwrap_err();
        assert!(matches!(err, RenderError::UnresolvedVariable { .. }));
        assert!(!out.exists());
    }
}
