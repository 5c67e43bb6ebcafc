//! Extraction records and span helpers
//!
//! Global invariants enforced:
//! - Line numbers are 1-based
//! - Records never hold references into the syntax tree

use serde::{Deserialize, Serialize};
use swc_common::{SourceMap, Span};
use swc_ecma_ast::{Module, ModuleItem, Stmt};

/// A sample method found in a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMethod {
    pub name: String,
    pub source_path: String,
    pub start_line: u32,
    pub end_line: u32,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub region_tags: Vec<String>,
}

impl SourceMethod {
    /// Build a record for the code covered by `span`
    pub fn from_span(name: String, source_path: &str, span: Span, source_map: &SourceMap) -> Self {
        let (start_line, end_line) = line_range(span, source_map);
        SourceMethod {
            name,
            source_path: source_path.to_string(),
            start_line,
            end_line,
            region_tags: Vec::new(),
        }
    }
}

/// First and last line covered by a span
pub fn line_range(span: Span, source_map: &SourceMap) -> (u32, u32) {
    let start = line_number(source_map.lookup_char_pos(span.lo).line);
    let end = line_number(source_map.lookup_char_pos(span.hi).line);
    (start, end.max(start))
}

/// 1-based line number, saturating at `u32::MAX`
pub fn line_number(line: usize) -> u32 {
    u32::try_from(line).unwrap_or(u32::MAX)
}

/// Top-level statements of a module, in source order
///
/// Import and export declarations are module syntax rather than statements
/// and are skipped.
pub fn module_statements(module: &Module) -> impl Iterator<Item = &Stmt> {
    module.body.iter().filter_map(|item| match item {
        ModuleItem::Stmt(stmt) => Some(stmt),
        ModuleItem::ModuleDecl(_) => None,
    })
}
