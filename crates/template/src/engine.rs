//! Compiled template set
//!
//! Each event compiles two templates once, at pipeline construction:
//!
//! - the document template, read from `outputTemplate`
//! - the destination template, the inline `outputChannel` source
//!
//! Both share one environment and therefore one function namespace. The
//! environment is immutable after construction and is rendered from many
//! tasks at once.
//!
//! # Data context
//!
//! When the data is a mapping its keys are top-level variables, so
//! `{{ action }}` reads the `action` field. The whole value is always
//! reachable as `this` (unless the mapping has its own `this` key), which is
//! how a template iterates a sequence: `{% for e in this %}`.
//!
//! Referencing a field that does not exist fails the render.

use std::path::Path;

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde_json::Value;

use crate::error::{Result, TemplateError};
use crate::namespace::FunctionNamespace;

/// Name under which the destination template is registered
pub const DESTINATION_TEMPLATE: &str = "outputChannel";

/// Variable bound to the whole data value
pub const ROOT_VARIABLE: &str = "this";

/// Document and destination templates compiled against one namespace
#[derive(Debug)]
pub struct TemplateSet {
    env: Environment<'static>,
    document_name: String,
}

impl TemplateSet {
    /// Compile the document template file and the destination source
    ///
    /// # Errors
    /// `TemplateError::Compile` if the file cannot be read or either source
    /// has a syntax error.
    pub fn compile(
        document_path: impl AsRef<Path>,
        destination_source: &str,
        namespace: &FunctionNamespace,
    ) -> Result<Self> {
        let path = document_path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let source = std::fs::read_to_string(path).map_err(|e| {
            TemplateError::compile(&name, format!("cannot read {}: {}", path.display(), e))
        })?;

        Self::from_sources(name, source, destination_source, namespace)
    }

    /// Compile both templates from source text
    pub fn from_sources(
        document_name: impl Into<String>,
        document_source: impl Into<String>,
        destination_source: &str,
        namespace: &FunctionNamespace,
    ) -> Result<Self> {
        let document_name = document_name.into();
        if document_name == DESTINATION_TEMPLATE {
            return Err(TemplateError::compile(
                &document_name,
                "document template name is reserved",
            ));
        }

        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        namespace.install(&mut env);

        env.add_template_owned(document_name.clone(), document_source.into())
            .map_err(|e| TemplateError::compile(&document_name, e.to_string()))?;
        env.add_template_owned(DESTINATION_TEMPLATE, destination_source.to_string())
            .map_err(|e| TemplateError::compile(DESTINATION_TEMPLATE, e.to_string()))?;

        tracing::debug!(template = %document_name, "compiled templates");

        Ok(Self { env, document_name })
    }

    /// Name of the document template
    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    /// Render the document template against `data`
    pub fn render_document(&self, data: &Value) -> Result<Vec<u8>> {
        self.env
            .get_template(&self.document_name)
            .and_then(|t| t.render(context(data)))
            .map(String::into_bytes)
            .map_err(|e| execution(&self.document_name, e))
    }

    /// Render the destination template against `data`
    pub fn render_destination(&self, data: &Value) -> Result<String> {
        self.env
            .get_template(DESTINATION_TEMPLATE)
            .and_then(|t| t.render(context(data)))
            .map_err(|e| execution(DESTINATION_TEMPLATE, e))
    }
}

fn execution(name: &str, source: minijinja::Error) -> TemplateError {
    TemplateError::Execution {
        name: name.to_string(),
        source,
    }
}

/// Build the render context for one data value
fn context(data: &Value) -> minijinja::Value {
    let mut root = match data {
        Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };
    if !root.contains_key(ROOT_VARIABLE) {
        root.insert(ROOT_VARIABLE.to_string(), data.clone());
    }
    minijinja::Value::from_serialize(&root)
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
