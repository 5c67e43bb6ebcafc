//! Source dialect detection
//!
//! Maps file extensions to the ECMAScript dialect used to parse them.

use std::path::Path;
use swc_ecma_parser::{EsSyntax, Syntax, TsSyntax};

/// ECMAScript dialects understood by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// TypeScript (.ts, .mts, .cts)
    TypeScript,
    /// TypeScript with JSX (.tsx, .mtsx, .ctsx)
    TypeScriptReact,
    /// JavaScript (.js, .mjs, .cjs)
    JavaScript,
    /// JavaScript with JSX (.jsx, .mjsx, .cjsx)
    JavaScriptReact,
}

impl Dialect {
    /// Detect dialect from a file extension (without the leading dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "ts" | "mts" | "cts" => Some(Dialect::TypeScript),
            "tsx" | "mtsx" | "ctsx" => Some(Dialect::TypeScriptReact),
            "js" | "mjs" | "cjs" => Some(Dialect::JavaScript),
            "jsx" | "mjsx" | "cjsx" => Some(Dialect::JavaScriptReact),
            _ => None,
        }
    }

    /// Detect dialect from a file path
    ///
    /// Declaration files (`.d.ts`) carry no sample code and are never detected.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(".d.ts") {
            return None;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// SWC syntax configuration for this dialect
    pub fn syntax(self) -> Syntax {
        match self {
            Dialect::TypeScript => Syntax::Typescript(TsSyntax {
                tsx: false,
                decorators: false,
                ..Default::default()
            }),
            Dialect::TypeScriptReact => Syntax::Typescript(TsSyntax {
                tsx: true,
                decorators: false,
                ..Default::default()
            }),
            Dialect::JavaScript => Syntax::Es(EsSyntax {
                jsx: false,
                decorators: false,
                ..Default::default()
            }),
            Dialect::JavaScriptReact => Syntax::Es(EsSyntax {
                jsx: true,
                decorators: false,
                ..Default::default()
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::TypeScript => "typescript",
            Dialect::TypeScriptReact => "tsx",
            Dialect::JavaScript => "javascript",
            Dialect::JavaScriptReact => "jsx",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Dialect::from_extension("js"), Some(Dialect::JavaScript));
        assert_eq!(Dialect::from_extension("cjs"), Some(Dialect::JavaScript));
        assert_eq!(Dialect::from_extension("mts"), Some(Dialect::TypeScript));
        assert_eq!(Dialect::from_extension("tsx"), Some(Dialect::TypeScriptReact));
        assert_eq!(Dialect::from_extension("jsx"), Some(Dialect::JavaScriptReact));
        assert_eq!(Dialect::from_extension("py"), None);
    }

    #[test]
    fn test_from_path_skips_declaration_files() {
        assert_eq!(Dialect::from_path(Path::new("src/index.d.ts")), None);
        assert_eq!(
            Dialect::from_path(Path::new("src/index.ts")),
            Some(Dialect::TypeScript)
        );
        assert_eq!(Dialect::from_path(Path::new("Makefile")), None);
    }
}
