//! Source parser selection
//!
//! A sample file is either written as a flat script (`Direct`) or wrapped in an
//! outer function (`Wrapped`). `Auto` tries the wrapped layout first and falls
//! back to the flat one.

use crate::ast::{module_statements, SourceMethod};
use crate::{direct_invocation, wrapped_invocation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use swc_common::SourceMap;
use swc_ecma_ast::Module;

/// Extracts sample methods from a parsed module
pub trait SourceParser {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Extract methods from `module`, stamping each record with `source_path`
    fn parse(&self, module: &Module, source_path: &str, source_map: &SourceMap)
        -> Vec<SourceMethod>;
}

/// Directly invoked methods declared at the top level of the file
pub struct DirectInvocationParser;

impl SourceParser for DirectInvocationParser {
    fn name(&self) -> &'static str {
        "direct-invocation"
    }

    fn parse(
        &self,
        module: &Module,
        source_path: &str,
        source_map: &SourceMap,
    ) -> Vec<SourceMethod> {
        direct_invocation::extract(module_statements(module), source_path, source_map)
    }
}

/// Directly invoked methods inside the first top-level function
pub struct WrappedInvocationParser;

impl SourceParser for WrappedInvocationParser {
    fn name(&self) -> &'static str {
        "wrapped-direct-invocation"
    }

    fn parse(
        &self,
        module: &Module,
        source_path: &str,
        source_map: &SourceMap,
    ) -> Vec<SourceMethod> {
        wrapped_invocation::parse(module, source_path, source_map)
    }
}

/// Which source parsers to run on a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseStrategy {
    /// Wrapped first, direct when the wrapped parser finds nothing
    #[default]
    Auto,
    Direct,
    Wrapped,
}

impl ParseStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseStrategy::Auto => "auto",
            ParseStrategy::Direct => "direct",
            ParseStrategy::Wrapped => "wrapped",
        }
    }

    /// Parsers to try, in order; the first non-empty result is used
    pub fn parsers(&self) -> Vec<Box<dyn SourceParser>> {
        match self {
            ParseStrategy::Auto => vec![
                Box::new(WrappedInvocationParser),
                Box::new(DirectInvocationParser),
            ],
            ParseStrategy::Direct => vec![Box::new(DirectInvocationParser)],
            ParseStrategy::Wrapped => vec![Box::new(WrappedInvocationParser)],
        }
    }

    /// Run the parsers of this strategy and keep the first non-empty result
    pub fn extract(
        &self,
        module: &Module,
        source_path: &str,
        source_map: &SourceMap,
    ) -> Vec<SourceMethod> {
        for parser in self.parsers() {
            let methods = parser.parse(module, source_path, source_map);
            if !methods.is_empty() {
                log::debug!(
                    "{}: {} found {} method(s)",
                    source_path,
                    parser.name(),
                    methods.len()
                );
                return methods;
            }
        }
        Vec::new()
    }
}

impl fmt::Display for ParseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParseStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ParseStrategy::Auto),
            "direct" => Ok(ParseStrategy::Direct),
            "wrapped" => Ok(ParseStrategy::Wrapped),
            other => anyhow::bail!(
                "unknown parse strategy '{}' (expected auto, direct, or wrapped)",
                other
            ),
        }
    }
}
