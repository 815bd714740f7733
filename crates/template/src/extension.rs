//! Extension Registry - Named modules exporting template functions
//!
//! Events may import extra functions by naming a module and the symbols to
//! take from it:
//!
//! ```toml
//! [events."/users".extendedFunctions]
//! username = ["Username"]
//! ```
//!
//! Modules are registered in-process at startup. A symbol that exists but is
//! not a function cannot be imported and fails pipeline construction.
//!
//! # Example
//!
//! ```
//! use hookbus_template::{ExtensionRegistry, StaticModule};
//! use serde_json::{json, Value};
//!
//! let mut registry = ExtensionRegistry::new();
//! registry.register(
//!     StaticModule::new("math")
//!         .with_function("Double", |args: &[Value]| Ok(json!(args[0].as_i64().unwrap_or(0) * 2))),
//! );
//!
//! let imported = registry.load("math", &["Double".to_string()]).unwrap();
//! assert_eq!(imported[0].0, "Double");
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::Value;

use crate::error::{Result, TemplateError};
use crate::function::{FunctionResult, TemplateFunction, arg_str};

#[cfg(test)]
#[path = "extension_test.rs"]
mod tests;

/// A symbol exported by an extension module
#[derive(Clone)]
pub enum Symbol {
    /// Callable with the template function signature
    Function(Arc<dyn TemplateFunction>),
    /// Any other exported item
    Value(Value),
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Function(_) => f.write_str("Symbol::Function"),
            Self::Value(v) => write!(f, "Symbol::Value({})", v),
        }
    }
}

/// A named set of exported symbols
pub trait ExtensionModule: Send + Sync {
    /// Module name used in `extendedFunctions`
    fn name(&self) -> &str;

    /// Find an exported symbol
    fn lookup(&self, symbol: &str) -> Option<Symbol>;

    /// Names of all exported symbols
    fn symbols(&self) -> Vec<&str>;
}

/// Extension module built from a fixed symbol table
#[derive(Debug, Clone)]
pub struct StaticModule {
    name: String,
    symbols: BTreeMap<String, Symbol>,
}

impl StaticModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbols: BTreeMap::new(),
        }
    }

    /// Export a function
    pub fn with_function<F>(mut self, symbol: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> FunctionResult + Send + Sync + 'static,
    {
        self.symbols
            .insert(symbol.into(), Symbol::Function(Arc::new(f)));
        self
    }

    /// Export a plain value
    pub fn with_value(mut self, symbol: impl Into<String>, value: Value) -> Self {
        self.symbols.insert(symbol.into(), Symbol::Value(value));
        self
    }
}

impl ExtensionModule for StaticModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, symbol: &str) -> Option<Symbol> {
        self.symbols.get(symbol).cloned()
    }

    fn symbols(&self) -> Vec<&str> {
        self.symbols.keys().map(|s| s.as_str()).collect()
    }
}

/// Registry of extension modules available to event definitions
#[derive(Default)]
pub struct ExtensionRegistry {
    modules: HashMap<String, Arc<dyn ExtensionModule>>,
}

impl ExtensionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the bundled modules
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(username_module());
        registry
    }

    /// Register a module
    ///
    /// # Panics
    /// Panics if a module is already registered with this name.
    /// Use `try_register` for fallible registration.
    pub fn register<M: ExtensionModule + 'static>(&mut self, module: M) {
        let name = module.name().to_string();
        if self.modules.contains_key(&name) {
            panic!("Extension module '{}' already registered", name);
        }
        self.modules.insert(name, Arc::new(module));
    }

    /// Try to register a module
    ///
    /// Returns `false` if a module is already registered with this name.
    pub fn try_register<M: ExtensionModule + 'static>(&mut self, module: M) -> bool {
        let name = module.name().to_string();
        if self.modules.contains_key(&name) {
            return false;
        }
        self.modules.insert(name, Arc::new(module));
        true
    }

    /// Check if a module is registered
    pub fn contains(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    /// Names of registered modules, sorted
    pub fn available_modules(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Import `symbols` from `module`
    ///
    /// # Errors
    /// - `TemplateError::ExtensionLoad` if the module or a symbol is unknown
    /// - `TemplateError::InvalidExtensionSignature` if a symbol is not a function
    pub fn load(
        &self,
        module: &str,
        symbols: &[String],
    ) -> Result<Vec<(String, Arc<dyn TemplateFunction>)>> {
        let loaded = self.modules.get(module).ok_or_else(|| {
            TemplateError::extension_load(
                module,
                format!(
                    "unknown module, available: [{}]",
                    self.available_modules().join(", ")
                ),
            )
        })?;

        symbols
            .iter()
            .map(|symbol| match loaded.lookup(symbol) {
                Some(Symbol::Function(f)) => Ok((symbol.clone(), f)),
                Some(Symbol::Value(_)) => Err(TemplateError::invalid_signature(module, symbol)),
                None => Err(TemplateError::extension_load(
                    module,
                    format!("symbol '{}' not found", symbol),
                )),
            })
            .collect()
    }
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("modules", &self.available_modules())
            .finish()
    }
}

// =============================================================================
// Bundled modules
// =============================================================================

/// `username` module: `Username(first, last)`
fn username_module() -> StaticModule {
    StaticModule::new("username").with_function("Username", username)
}

/// Initial of every first name followed by the last name
///
/// `Username("Jean Paul", "Sartre")` is `"JPSartre"`.
fn username(args: &[Value]) -> FunctionResult {
    let first = arg_str(args, 0, "firstname")?;
    let last = arg_str(args, 1, "lastname")?;

    let mut name: String = first
        .split(' ')
        .filter_map(|part| part.chars().next())
        .collect();
    name.push_str(last);
    Ok(Value::from(name))
}
