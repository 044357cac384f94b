//! Template rendering for eclipse-gen.
//! Template files use MiniJinja syntax: `{{ IDE_PROJECT_NAME }}` markers and
//! optional `{% if ... %}` blocks.
use crate::error::{Error, Result};
use crate::variables::VariableMap;
use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use std::collections::BTreeSet;

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a template string with the given context.
    ///
    /// # Arguments
    /// * `name` - Name used in error messages, usually the template's relative path
    /// * `template` - Template string to render
    /// * `context` - Context variables for rendering
    fn render(&self, name: &str, template: &str, context: &serde_json::Value) -> Result<String>;

    /// Returns the variables a template reads without defining them itself.
    fn undeclared_variables(&self, name: &str, template: &str) -> Result<BTreeSet<String>>;

    /// Renders a template file, first checking that every variable it
    /// references is defined.
    ///
    /// # Errors
    /// * `Error::UnresolvedVariableError` naming the file and the first unknown variable
    fn render_file(&self, name: &str, template: &str, variables: &VariableMap) -> Result<String> {
        let unknown = self
            .undeclared_variables(name, template)?
            .into_iter()
            .find(|variable| !variables.contains(variable));
        if let Some(variable) = unknown {
            return Err(Error::UnresolvedVariableError { file: name.to_string(), variable });
        }
        self.render(name, template, &variables.to_context()?)
    }
}

/// MiniJinja-based template rendering engine.
///
/// Undefined variables are errors, nothing is auto-escaped and trailing
/// newlines are kept, so a template without markers renders unchanged.
#[derive(Debug, Default)]
pub struct MiniJinjaRenderer;

impl MiniJinjaRenderer {
    pub fn new() -> Self {
        Self
    }

    fn environment<'source>(&self) -> Environment<'source> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        // Project files are XML and properties; values are inserted verbatim.
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(&self, name: &str, template: &str, context: &serde_json::Value) -> Result<String> {
        let env = self.environment();
        let tmpl = env.template_from_named_str(name, template)?;
        Ok(tmpl.render(context)?)
    }

    fn undeclared_variables(&self, name: &str, template: &str) -> Result<BTreeSet<String>> {
        let env = self.environment();
        let tmpl = env.template_from_named_str(name, template)?;
        Ok(tmpl.undeclared_variables(false).into_iter().collect())
    }
}
