//! hookbus - Template
//!
//! Compiles the per-event document and destination templates and owns the
//! function namespace they can call.
//!
//! # Flow
//!
//! ```text
//! ExtensionRegistry ──load──→ FunctionNamespace ──install──→ TemplateSet
//!                                  ↑                           │
//!                        default functions          render_document / render_destination
//! ```
//!
//! Templates use Jinja syntax. Every built-in and imported function shares
//! the signature `fn(&[Value]) -> Result<Value, FunctionError>`.
//!
//! # Example
//!
//! ```
//! use hookbus_template::{FunctionNamespace, TemplateSet};
//! use serde_json::json;
//!
//! let templates = TemplateSet::from_sources(
//!     "order.tmpl",
//!     r#"{"id":"{{ id }}","who":"{{ ToUpper(customer) }}"}"#,
//!     "orders.{{ region }}",
//!     &FunctionNamespace::defaults(),
//! ).unwrap();
//!
//! let data = json!({"id": 7, "customer": "ada", "region": "eu"});
//! assert_eq!(templates.render_document(&data).unwrap(), br#"{"id":"7","who":"ADA"}"#);
//! assert_eq!(templates.render_destination(&data).unwrap(), "orders.eu");
//! ```

mod defaults;
mod engine;
mod error;
mod extension;
mod function;
mod namespace;

pub use defaults::default_functions;
pub use engine::{DESTINATION_TEMPLATE, ROOT_VARIABLE, TemplateSet};
pub use error::{Result, TemplateError};
pub use extension::{ExtensionModule, ExtensionRegistry, StaticModule, Symbol};
pub use function::{FunctionError, FunctionResult, TemplateFunction, arg, arg_i64, arg_str};
pub use namespace::FunctionNamespace;
