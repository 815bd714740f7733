//! Template function signature
//!
//! Every function callable from a template, built-in or imported from an
//! extension module, has the same shape: a slice of untyped values in, an
//! untyped value or an error out.

use serde_json::Value;
use thiserror::Error;

/// Result of a template function call
pub type FunctionResult = Result<Value, FunctionError>;

/// Error returned by a template function
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct FunctionError(String);

impl FunctionError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// A function that can be installed into a function namespace
///
/// Implementations must be `Send + Sync`: one compiled template set is
/// rendered from many tasks at once.
pub trait TemplateFunction: Send + Sync {
    fn call(&self, args: &[Value]) -> FunctionResult;
}

impl<F> TemplateFunction for F
where
    F: Fn(&[Value]) -> FunctionResult + Send + Sync,
{
    fn call(&self, args: &[Value]) -> FunctionResult {
        self(args)
    }
}

// =============================================================================
// Argument helpers
// =============================================================================

/// Required string argument
pub fn arg_str<'a>(args: &'a [Value], index: usize, name: &str) -> Result<&'a str, FunctionError> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(FunctionError::new(format!(
            "argument '{}' must be a string, got {}",
            name, other
        ))),
        None => Err(missing(index, name)),
    }
}

/// Required integer argument; numeric strings are accepted
pub fn arg_i64(args: &[Value], index: usize, name: &str) -> Result<i64, FunctionError> {
    match args.get(index) {
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| {
            FunctionError::new(format!("argument '{}' must be an integer, got {}", name, n))
        }),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| {
            FunctionError::new(format!("argument '{}' must be an integer, got {:?}", name, s))
        }),
        Some(other) => Err(FunctionError::new(format!(
            "argument '{}' must be an integer, got {}",
            name, other
        ))),
        None => Err(missing(index, name)),
    }
}

/// Required argument of any type
pub fn arg<'a>(args: &'a [Value], index: usize, name: &str) -> Result<&'a Value, FunctionError> {
    args.get(index).ok_or_else(|| missing(index, name))
}

fn missing(index: usize, name: &str) -> FunctionError {
    FunctionError::new(format!("missing argument {} ('{}')", index + 1, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_closure_is_template_function() {
        let f = |args: &[Value]| -> FunctionResult { Ok(json!(args.len())) };
        assert_eq!(TemplateFunction::call(&f, &[json!(1), json!(2)]).unwrap(), json!(2));
    }

    #[test]
    fn test_arg_str() {
        let args = [json!("a"), json!(1)];
        assert_eq!(arg_str(&args, 0, "s").unwrap(), "a");
        assert!(arg_str(&args, 1, "s").unwrap_err().to_string().contains("string"));
        assert!(arg_str(&args, 2, "s").unwrap_err().to_string().contains("missing"));
    }

    #[test]
    fn test_arg_i64_accepts_numeric_strings() {
        let args = [json!(-1), json!(" 42 "), json!(1.5), json!("x")];
        assert_eq!(arg_i64(&args, 0, "n").unwrap(), -1);
        assert_eq!(arg_i64(&args, 1, "n").unwrap(), 42);
        assert!(arg_i64(&args, 2, "n").is_err());
        assert!(arg_i64(&args, 3, "n").is_err());
    }
}
