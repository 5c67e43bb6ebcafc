//! JavaScript and TypeScript parser using SWC
//!
//! Global invariants enforced:
//! - Formatting, comments, and whitespace must not affect the tree
//! - Parsing never panics on user input

use crate::dialect::Dialect;
use anyhow::Result;
use std::path::Path;
use swc_common::{sync::Lrc, FileName, SourceFile, SourceMap};
use swc_ecma_ast::{EsVersion, Module};
use swc_ecma_parser::{lexer::Lexer, Parser, StringInput};

/// Parse a source file into an SWC module
///
/// The dialect is chosen from the file extension; unknown extensions are
/// parsed as plain JavaScript. The file is registered in `source_map` so that
/// spans of the returned module can be mapped back to line numbers.
pub fn parse_source(src: &str, source_map: &Lrc<SourceMap>, filename: &str) -> Result<Module> {
    let dialect = Dialect::from_path(Path::new(filename)).unwrap_or(Dialect::JavaScript);

    let source_file: Lrc<SourceFile> = source_map.new_source_file(
        FileName::Custom(filename.into()).into(),
        src.to_string(),
    );

    let lexer = Lexer::new(
        dialect.syntax(),
        EsVersion::Es2022,
        StringInput::from(&*source_file),
        None,
    );

    Parser::new_from(lexer).parse_module().map_err(|e| {
        anyhow::anyhow!("Parse error: {}", e.kind().msg())
            .context(format!("Failed to parse {} source file: {}", dialect.as_str(), filename))
    })
}
