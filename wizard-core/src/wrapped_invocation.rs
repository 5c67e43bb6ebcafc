//! Wrapped direct invocation
//!
//! Many samples wrap their code in an outer `main` function so that command
//! line arguments can be bound to parameters:
//!
//! ```javascript
//! function main(bucketName = 'my-bucket') {
//!   async function listFiles() { /* ... */ }
//!   listFiles();
//! }
//! main(...process.argv.slice(2));
//! ```
//!
//! Only the first top-level function declaration is unwrapped; its body is
//! handed to the direct invocation extractor.
//!
//! Global invariants enforced:
//! - The module is only read, never modified
//! - The source path reaches the extractor unchanged
//! - Extractor results and errors are returned untouched

use crate::ast::{module_statements, SourceMethod};
use crate::direct_invocation;
use std::convert::Infallible;
use swc_common::SourceMap;
use swc_ecma_ast::{BlockStmt, Decl, FnDecl, Module, Stmt};

/// First function declaration among the top-level statements, with its body
///
/// Body-less declarations (TypeScript overload signatures and `declare
/// function`) are not function definitions and are skipped.
pub fn first_top_level_function(module: &Module) -> Option<(&FnDecl, &BlockStmt)> {
    module_statements(module).find_map(|stmt| match stmt {
        Stmt::Decl(Decl::Fn(decl)) => decl.function.body.as_ref().map(|body| (decl, body)),
        _ => None,
    })
}

/// Hand the body of the first top-level function to `extract`
///
/// Returns an empty list without calling `extract` when the module has no
/// top-level function declaration.
pub fn delegate_first_function<R, E, F>(
    module: &Module,
    source_path: &str,
    extract: F,
) -> Result<Vec<R>, E>
where
    F: FnOnce(&[Stmt], &str) -> Result<Vec<R>, E>,
{
    let Some((decl, body)) = first_top_level_function(module) else {
        return Ok(Vec::new());
    };

    if log::log_enabled!(log::Level::Debug) {
        let ignored = count_defined_functions(module).saturating_sub(1);
        if ignored > 0 {
            log::debug!(
                "{}: using `{}`, ignoring {} later top-level function(s)",
                source_path,
                decl.ident.sym,
                ignored
            );
        }
    }

    extract(&body.stmts, source_path)
}

fn count_defined_functions(module: &Module) -> usize {
    module_statements(module)
        .filter(|stmt| matches!(stmt, Stmt::Decl(Decl::Fn(f)) if f.function.body.is_some()))
        .count()
}

/// Directly invoked methods inside the first top-level function
pub fn parse(module: &Module, source_path: &str, source_map: &SourceMap) -> Vec<SourceMethod> {
    let result: Result<_, Infallible> =
        delegate_first_function(module, source_path, |body, path| {
            Ok(direct_invocation::extract(body, path, source_map))
        });
    match result {
        Ok(methods) => methods,
        Err(never) => match never {},
    }
}
