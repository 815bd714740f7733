//! Render task
//!
//! The unit of concurrent work: one data value in, one `(destination,
//! document)` pair out. The document is rendered first; if it fails the
//! destination is never rendered.

use bytes::Bytes;
use hookbus_template::{Result, TemplateSet};
use serde_json::Value;

/// One rendered record ready for a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub destination: String,
    pub document: Bytes,
}

/// Render both templates against `data`
pub fn render(templates: &TemplateSet, data: &Value) -> Result<Output> {
    let document = templates.render_document(data)?;
    let destination = templates.render_destination(data)?;
    Ok(Output {
        destination,
        document: Bytes::from(document),
    })
}
