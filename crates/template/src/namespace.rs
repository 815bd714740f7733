//! Function namespace
//!
//! The set of functions visible to one event's templates: the built-ins plus
//! whatever the event imports from extension modules. Imported functions
//! replace built-ins with the same name.

use std::collections::BTreeMap;
use std::sync::Arc;

use minijinja::value::Rest;
use minijinja::{Environment, ErrorKind};
use serde_json::Value;

use crate::defaults::default_functions;
use crate::error::Result;
use crate::extension::ExtensionRegistry;
use crate::function::{FunctionError, FunctionResult, TemplateFunction};

/// Functions callable from templates, keyed by name
#[derive(Clone)]
pub struct FunctionNamespace {
    functions: BTreeMap<String, Arc<dyn TemplateFunction>>,
}

impl FunctionNamespace {
    /// Namespace holding only the built-in functions
    pub fn defaults() -> Self {
        let functions = default_functions()
            .into_iter()
            .map(|(name, f)| (name.to_string(), f))
            .collect();
        Self { functions }
    }

    /// Built-ins extended with the imports requested by an event
    ///
    /// `imports` maps module names to the symbols taken from each module.
    ///
    /// # Errors
    /// Any error from `ExtensionRegistry::load`.
    pub fn build(
        registry: &ExtensionRegistry,
        imports: &BTreeMap<String, Vec<String>>,
    ) -> Result<Self> {
        let mut namespace = Self::defaults();
        for (module, symbols) in imports {
            for (name, f) in registry.load(module, symbols)? {
                if namespace.functions.contains_key(&name) {
                    tracing::debug!(module = %module, function = %name, "extension overrides built-in function");
                }
                namespace.functions.insert(name, f);
            }
        }
        Ok(namespace)
    }

    /// Add or replace one function
    pub fn insert<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Value]) -> FunctionResult + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(f));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Function names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.functions.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Call a function outside of a template
    pub fn call(&self, name: &str, args: &[Value]) -> FunctionResult {
        match self.functions.get(name) {
            Some(f) => f.call(args),
            None => Err(FunctionError::new(format!("function '{}' not defined", name))),
        }
    }

    /// Register every function as a global callable in `env`
    pub fn install(&self, env: &mut Environment<'static>) {
        for (name, f) in &self.functions {
            let f = Arc::clone(f);
            let fname = name.clone();
            env.add_function(
                name.clone(),
                move |args: Rest<minijinja::Value>| -> std::result::Result<minijinja::Value, minijinja::Error> {
                    let args = args
                        .iter()
                        .map(to_json)
                        .collect::<std::result::Result<Vec<_>, _>>()?;
                    let out = f.call(&args).map_err(|e| {
                        minijinja::Error::new(
                            ErrorKind::InvalidOperation,
                            format!("{}: {}", fname, e),
                        )
                    })?;
                    Ok(minijinja::Value::from_serialize(&out))
                },
            );
        }
    }
}

impl std::fmt::Debug for FunctionNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionNamespace")
            .field("functions", &self.names())
            .finish()
    }
}

fn to_json(value: &minijinja::Value) -> std::result::Result<Value, minijinja::Error> {
    serde_json::to_value(value).map_err(|e| {
        minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("unsupported function argument: {}", e),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TemplateError;
    use crate::extension::StaticModule;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let ns = FunctionNamespace::defaults();
        assert!(ns.contains("ToUpper"));
        assert!(ns.contains("TimeFormat"));
        assert!(!ns.contains("Username"));
        assert_eq!(ns.len(), 13);
    }

    #[test]
    fn test_build_with_imports() {
        let registry = ExtensionRegistry::with_builtins();
        let mut imports = BTreeMap::new();
        imports.insert("username".to_string(), vec!["Username".to_string()]);

        let ns = FunctionNamespace::build(&registry, &imports).unwrap();
        assert!(ns.contains("Username"));
        assert_eq!(
            ns.call("Username", &[json!("Grace Brewster"), json!("Hopper")]).unwrap(),
            json!("GBHopper")
        );
    }

    #[test]
    fn test_extension_overrides_builtin() {
        let mut registry = ExtensionRegistry::new();
        registry.register(
            StaticModule::new("shout").with_function("ToUpper", |_: &[Value]| Ok(json!("!"))),
        );
        let mut imports = BTreeMap::new();
        imports.insert("shout".to_string(), vec!["ToUpper".to_string()]);

        let ns = FunctionNamespace::build(&registry, &imports).unwrap();
        assert_eq!(ns.call("ToUpper", &[json!("a")]).unwrap(), json!("!"));
        assert_eq!(ns.len(), 13);
    }

    #[test]
    fn test_build_propagates_load_errors() {
        let registry = ExtensionRegistry::with_builtins();
        let mut imports = BTreeMap::new();
        imports.insert("nope".to_string(), vec!["X".to_string()]);

        let err = FunctionNamespace::build(&registry, &imports).unwrap_err();
        assert!(matches!(err, TemplateError::ExtensionLoad { .. }));
    }

    #[test]
    fn test_call_unknown() {
        let err = FunctionNamespace::defaults().call("Nope", &[]).unwrap_err();
        assert!(err.to_string().contains("not defined"));
    }

    #[test]
    fn test_install_makes_functions_callable() {
        let mut env = Environment::new();
        FunctionNamespace::defaults().install(&mut env);
        env.add_template("t", "{{ ToUpper(name) }}-{{ Split('a.b', '.')|length }}")
            .unwrap();

        let out = env
            .get_template("t")
            .unwrap()
            .render(minijinja::context! { name => "ada" })
            .unwrap();
        assert_eq!(out, "ADA-2");
    }

    #[test]
    fn test_install_maps_function_errors() {
        let mut env = Environment::new();
        FunctionNamespace::defaults().install(&mut env);
        env.add_template("t", "{{ MustParseFloat('x') }}").unwrap();

        let err = env
            .get_template("t")
            .unwrap()
            .render(minijinja::context! {})
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        assert!(err.to_string().contains("MustParseFloat"));
    }
}
