//! Direct invocation extraction
//!
//! A method is *directly invoked* when it is declared in a statement list and
//! called by name from that same list, outside any nested function body:
//!
//! ```javascript
//! async function quickstart() {
//!   // ...
//! }
//! quickstart().catch(console.error);
//! ```
//!
//! Global invariants enforced:
//! - Records follow declaration order
//! - One record per name; the first declaration of a name wins
//! - Calls inside nested functions, arrows, or classes are not direct invocations

use crate::ast::SourceMethod;
use std::collections::HashSet;
use swc_common::{SourceMap, Span};
use swc_ecma_ast::*;
use swc_ecma_visit::{Visit, VisitWith};

/// Extract the directly invoked methods of a statement list
///
/// `source_path` is copied verbatim into every record.
pub fn extract<'a, I>(stmts: I, source_path: &str, source_map: &SourceMap) -> Vec<SourceMethod>
where
    I: IntoIterator<Item = &'a Stmt>,
{
    let stmts: Vec<&Stmt> = stmts.into_iter().collect();

    let mut collector = InvocationCollector::default();
    for stmt in &stmts {
        stmt.visit_with(&mut collector);
    }
    if collector.invoked.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    stmts
        .iter()
        .flat_map(|stmt| declared_functions(stmt))
        .filter(|(name, _)| seen.insert(name.clone()))
        .filter(|(name, _)| collector.invoked.contains(name))
        .map(|(name, span)| SourceMethod::from_span(name, source_path, span, source_map))
        .collect()
}

/// Functions a single statement declares, with the span of each declaration
fn declared_functions(stmt: &Stmt) -> Vec<(String, Span)> {
    match stmt {
        Stmt::Decl(Decl::Fn(decl)) if decl.function.body.is_some() => {
            vec![(decl.ident.sym.to_string(), decl.function.span)]
        }
        Stmt::Decl(Decl::Var(var)) => var
            .decls
            .iter()
            .filter_map(|declarator| {
                let Pat::Ident(binding) = &declarator.name else {
                    return None;
                };
                let init = declarator.init.as_deref()?;
                is_function_expr(init).then(|| (binding.id.sym.to_string(), declarator.span))
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn is_function_expr(expr: &Expr) -> bool {
    match expr {
        Expr::Fn(_) | Expr::Arrow(_) => true,
        Expr::Paren(paren) => is_function_expr(&paren.expr),
        _ => false,
    }
}

/// Collects the names of identifiers called in the current scope
#[derive(Default)]
struct InvocationCollector {
    invoked: HashSet<String>,
}

impl Visit for InvocationCollector {
    fn visit_call_expr(&mut self, call: &CallExpr) {
        if let Callee::Expr(callee) = &call.callee {
            let mut callee: &Expr = callee;
            while let Expr::Paren(paren) = callee {
                callee = &paren.expr;
            }
            if let Expr::Ident(ident) = callee {
                self.invoked.insert(ident.sym.to_string());
            }
        }

        // Arguments and chained receivers, e.g. `run().catch(...)`
        call.visit_children_with(self);
    }

    // Nested scopes
    fn visit_function(&mut self, _function: &Function) {}

    fn visit_arrow_expr(&mut self, _arrow: &ArrowExpr) {}

    fn visit_class(&mut self, _class: &Class) {}

    // Object literal accessors hold their body directly, not as a `Function`
    fn visit_getter_prop(&mut self, _getter: &GetterProp) {}

    fn visit_setter_prop(&mut self, _setter: &SetterProp) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::module_statements;
    use crate::parser;
    use swc_common::sync::Lrc;

    fn extract_top_level(src: &str, path: &str) -> Vec<SourceMethod> {
        let cm: Lrc<SourceMap> = Default::default();
        let module = parser::parse_source(src, &cm, "sample.js").unwrap();
        extract(module_statements(&module), path, &cm)
    }

    fn names(methods: &[SourceMethod]) -> Vec<&str> {
        methods.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_declared_and_called() {
        let src = "function quickstart() {\n  return 1;\n}\nquickstart();\n";
        let methods = extract_top_level(src, "/samples/quickstart.js");
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name, "quickstart");
        assert_eq!(methods[0].source_path, "/samples/quickstart.js");
        assert_eq!(methods[0].start_line, 1);
        assert_eq!(methods[0].end_line, 3);
        assert!(methods[0].region_tags.is_empty());
    }

    #[test]
    fn test_declared_but_never_called() {
        let src = "function unused() {}\nconsole.log('hi');\n";
        assert!(extract_top_level(src, "a.js").is_empty());
    }

    #[test]
    fn test_called_but_not_declared_here() {
        let src = "main();\n";
        assert!(extract_top_level(src, "a.js").is_empty());
    }

    #[test]
    fn test_async_call_forms() {
        let src = r#"
async function first() {}
async function second() {}
async function third() {}
first().catch(console.error);
await second();
const result = await third();
"#;
        let methods = extract_top_level(src, "a.js");
        assert_eq!(names(&methods), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_function_valued_variables() {
        let src = r#"
const listBuckets = async () => {
  return [];
};
let fetchOne = function () {};
var notAFunction = 42;
listBuckets();
fetchOne();
"#;
        let methods = extract_top_level(src, "a.js");
        assert_eq!(names(&methods), vec!["listBuckets", "fetchOne"]);
        assert_eq!(methods[0].start_line, 2);
        assert_eq!(methods[0].end_line, 4);
    }

    #[test]
    fn test_declaration_order_not_call_order() {
        let src = "function b() {}\nfunction a() {}\na();\nb();\n";
        let methods = extract_top_level(src, "a.js");
        assert_eq!(names(&methods), vec!["b", "a"]);
    }

    #[test]
    fn test_calls_in_nested_functions_are_ignored() {
        let src = r#"
function helper() {}
function caller() {
  helper();
}
const arrow = () => helper();
"#;
        assert!(extract_top_level(src, "a.js").is_empty());
    }

    #[test]
    fn test_calls_in_object_accessors_are_ignored() {
        let src = r#"
function helper() {}
const o = { get x() { return helper(); }, set y(v) { helper(); } };
"#;
        assert!(extract_top_level(src, "a.js").is_empty());
    }

    #[test]
    fn test_calls_in_object_methods_are_ignored() {
        let src = "function helper() {}
const o = { run() { helper(); } };
";
        assert!(extract_top_level(src, "a.js").is_empty());
    }

    #[test]
    fn test_calls_in_control_flow_count() {
        let src = r#"
function retry() {}
if (process.env.RETRY) {
  retry();
}
"#;
        assert_eq!(names(&extract_top_level(src, "a.js")), vec!["retry"]);
    }

    #[test]
    fn test_call_as_argument_counts() {
        let src = "function value() { return 1; }\nconsole.log(value());\n";
        assert_eq!(names(&extract_top_level(src, "a.js")), vec!["value"]);
    }

    #[test]
    fn test_empty_statement_list() {
        let cm: Lrc<SourceMap> = Default::default();
        assert!(extract(std::iter::empty::<&Stmt>(), "a.js", &cm).is_empty());
    }
}
