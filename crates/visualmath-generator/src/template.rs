//! HTML template system for page generation.
//!
//! A lightweight interpolation engine rather than a full template language:
//!
//! - `{{ name }}` inserts a variable, HTML-escaped
//! - `{{ name? }}` renders an absent variable as the empty string
//! - `{{ safe name }}` inserts a variable verbatim
//! - `{{ path "/grade/5" }}` or `{{ path name }}` prefixes the base path
//!
//! Templates come from the built-in theme or from a directory that is read on
//! every render, so edits show up without restarting anything.

use std::{
    borrow::Cow,
    collections::HashMap,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::trace;

use crate::{route::BasePath, theme};

/// Template rendering errors. Every variant names the template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template with this name.
    #[error("template not found: {0}")]
    NotFound(String),

    /// Missing required variable.
    #[error("template {template}: missing required variable `{name}`")]
    MissingVariable { template: String, name: String },

    /// Call to a helper that does not exist.
    #[error("template {template}: undefined helper `{name}`")]
    UndefinedHelper { template: String, name: String },

    /// Invalid template syntax.
    #[error("template {template}: invalid syntax: {message}")]
    InvalidSyntax { template: String, message: String },

    /// Override file exists but could not be read.
    #[error("template {template}: failed to read {}: {source}", path.display())]
    Io {
        template: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Template context with variables for interpolation.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable into the context.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Create context with initial variables.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a variable value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Check if a variable exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }
}

/// Helpers callable from templates.
#[derive(Debug, Clone, Default)]
pub struct Helpers {
    base: BasePath,
}

impl Helpers {
    /// Create helpers for a base path.
    #[must_use]
    pub fn new(base: BasePath) -> Self {
        Self { base }
    }

    /// The base path used by `path`.
    #[must_use]
    pub fn base(&self) -> &BasePath {
        &self.base
    }

    /// The `path` helper.
    #[must_use]
    pub fn path(&self, logical: &str) -> String {
        self.base.apply(logical)
    }

    fn call(&self, template: &str, helper: &str, arg: &str) -> Result<String> {
        match helper {
            "safe" => Ok(arg.to_string()),
            "path" => Ok(escape_html(&self.path(arg))),
            other => Err(TemplateError::UndefinedHelper {
                template: template.to_string(),
                name: other.to_string(),
            }),
        }
    }
}

/// A template that supports variable interpolation and helper calls.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    content: String,
}

impl Template {
    /// Create a new template with the given name and content.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Get the template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the template with the given context and helpers.
    pub fn render(&self, context: &TemplateContext, helpers: &Helpers) -> Result<String> {
        let mut out = String::with_capacity(self.content.len());
        let mut rest = self.content.as_str();

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after
                .find("}}")
                .ok_or_else(|| self.syntax_error("unclosed {{ delimiter"))?;

            let expr = after[..end].trim();
            out.push_str(&self.evaluate(expr, context, helpers)?);
            rest = &after[end + 2..];
        }

        out.push_str(rest);
        Ok(out)
    }

    fn evaluate(&self, expr: &str, context: &TemplateContext, helpers: &Helpers) -> Result<String> {
        if expr.is_empty() {
            return Err(self.syntax_error("empty expression"));
        }

        match expr.split_once(char::is_whitespace) {
            None => Ok(escape_html(&self.lookup(expr, context)?)),
            Some((helper, arg)) => {
                let arg = self.argument(arg.trim(), context)?;
                helpers.call(&self.name, helper, &arg)
            }
        }
    }

    /// A helper argument: a quoted literal or a variable reference.
    fn argument<'a>(&self, arg: &'a str, context: &'a TemplateContext) -> Result<Cow<'a, str>> {
        if let Some(quoted) = arg.strip_prefix('"') {
            let literal = quoted
                .strip_suffix('"')
                .filter(|l| !l.contains('"'))
                .ok_or_else(|| self.syntax_error(format!("malformed string literal {arg}")))?;
            return Ok(Cow::Borrowed(literal));
        }
        if arg.contains(char::is_whitespace) {
            return Err(self.syntax_error(format!("helpers take one argument, got `{arg}`")));
        }
        self.lookup(arg, context)
    }

    fn lookup<'a>(&self, name: &'a str, context: &'a TemplateContext) -> Result<Cow<'a, str>> {
        let (name, optional) = match name.strip_suffix('?') {
            Some(stripped) => (stripped, true),
            None => (name, false),
        };

        match context.get(name) {
            Some(value) => Ok(Cow::Borrowed(value)),
            None if optional => Ok(Cow::Borrowed("")),
            None => Err(TemplateError::MissingVariable {
                template: self.name.clone(),
                name: name.to_string(),
            }),
        }
    }

    fn syntax_error(&self, message: impl Into<String>) -> TemplateError {
        TemplateError::InvalidSyntax {
            template: self.name.clone(),
            message: message.into(),
        }
    }
}

/// Registry of templates.
///
/// Built-in templates are always present. When an override directory is set,
/// `<dir>/<name>` is read on every lookup and wins over the built-in.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Template>,
    override_dir: Option<PathBuf>,
}

impl TemplateRegistry {
    /// Create a new registry with the built-in theme.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::default();
        for (name, content) in theme::TEMPLATES {
            registry.register(Template::new(*name, *content));
        }
        registry
    }

    /// Create a registry that reads overrides from a directory.
    #[must_use]
    pub fn with_directory(dir: impl Into<PathBuf>) -> Self {
        let mut registry = Self::new();
        registry.override_dir = Some(dir.into());
        registry
    }

    /// Override directory, if any.
    #[must_use]
    pub fn directory(&self) -> Option<&Path> {
        self.override_dir.as_deref()
    }

    /// Register a template.
    pub fn register(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    /// Get a registered template by name, ignoring overrides.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Resolve a template: the override file if present, else the built-in.
    pub fn resolve(&self, name: &str) -> Result<Cow<'_, Template>> {
        if let Some(dir) = &self.override_dir {
            let path = dir.join(name);
            if path.is_file() {
                trace!(path = %path.display(), "loading template override");
                let content =
                    std::fs::read_to_string(&path).map_err(|source| TemplateError::Io {
                        template: name.to_string(),
                        path: path.clone(),
                        source,
                    })?;
                return Ok(Cow::Owned(Template::new(name, content)));
            }
        }

        self.get(name)
            .map(Cow::Borrowed)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }

    /// Render a named template with the given context.
    pub fn render(
        &self,
        name: &str,
        context: &TemplateContext,
        helpers: &Helpers,
    ) -> Result<String> {
        self.resolve(name)?.render(context, helpers)
    }
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
