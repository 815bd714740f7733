//! Template engine error types

use thiserror::Error;

/// Result type for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Errors raised while building or executing templates
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template source could not be read or has a syntax error
    #[error("failed to compile template '{name}': {message}")]
    Compile { name: String, message: String },

    /// Extension module or one of its symbols could not be loaded
    #[error("failed to load extension module '{module}': {message}")]
    ExtensionLoad { module: String, message: String },

    /// Imported symbol does not have the extension function signature
    #[error(
        "extended function '{symbol}' in module '{module}' has an invalid signature \
         (required signature is fn(args...) -> (value, error))"
    )]
    InvalidExtensionSignature { module: String, symbol: String },

    /// Template raised while rendering (missing field, function error, type mismatch)
    #[error("failed to render template '{name}': {source}")]
    Execution {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

impl TemplateError {
    /// Create a compile error
    pub fn compile(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Compile {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an extension load error
    pub fn extension_load(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExtensionLoad {
            module: module.into(),
            message: message.into(),
        }
    }

    /// Create an invalid signature error
    pub fn invalid_signature(module: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self::InvalidExtensionSignature {
            module: module.into(),
            symbol: symbol.into(),
        }
    }

    /// Whether this error can only happen while a pipeline is being built
    pub fn is_construction_error(&self) -> bool {
        !matches!(self, Self::Execution { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TemplateError::compile("order.tmpl", "unexpected end of input");
        assert!(err.to_string().contains("order.tmpl"));
        assert!(err.is_construction_error());

        let err = TemplateError::extension_load("geo", "unknown module");
        assert!(err.to_string().contains("geo"));

        let err = TemplateError::invalid_signature("username", "Version");
        let msg = err.to_string();
        assert!(msg.contains("Version"));
        assert!(msg.contains("username"));
        assert!(msg.contains("invalid signature"));
    }

    #[test]
    fn test_execution_is_not_construction() {
        let err = TemplateError::Execution {
            name: "outputChannel".into(),
            source: minijinja::Error::new(minijinja::ErrorKind::UndefinedError, "missing"),
        };
        assert!(!err.is_construction_error());
        assert!(err.to_string().contains("outputChannel"));
    }
}
