//! Analysis orchestration - ties together parsing, extraction, and region tags

use crate::ast::SourceMethod;
use crate::parser;
use crate::region_tags;
use crate::strategy::ParseStrategy;
use anyhow::{Context, Result};
use std::path::Path;
use swc_common::{sync::Lrc, SourceMap};

/// Per-file analysis settings
#[derive(Debug, Clone, Copy)]
pub struct FileOptions {
    pub strategy: ParseStrategy,
    pub region_tags: bool,
}

/// Analyze a single JavaScript or TypeScript file
///
/// Records carry the path exactly as given. Methods are returned in line order.
pub fn analyze_file(path: &Path, options: FileOptions) -> Result<Vec<SourceMethod>> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    analyze_source(&src, &path.to_string_lossy(), options)
}

/// Analyze source text that was loaded from `source_path`
pub fn analyze_source(src: &str, source_path: &str, options: FileOptions) -> Result<Vec<SourceMethod>> {
    let source_map: Lrc<SourceMap> = Default::default();
    let module = parser::parse_source(src, &source_map, source_path)?;

    let mut methods = options.strategy.extract(&module, source_path, &source_map);

    if options.region_tags && !methods.is_empty() {
        let regions = region_tags::extract_regions(src);
        region_tags::attach_region_tags(&mut methods, &regions);
    }

    methods.sort_by(|a, b| {
        a.start_line
            .cmp(&b.start_line)
            .then_with(|| a.name.cmp(&b.name))
    });

    log::debug!("{}: {} method(s)", source_path, methods.len());
    Ok(methods)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"'use strict';

function main(projectId = 'my-project') {
  // [START translate_quickstart]
  const {Translate} = require('@google-cloud/translate').v2;

  async function quickstart() {
    const translate = new Translate({projectId});
    const [translation] = await translate.translate('Hello, world!', 'ru');
    console.log(`Translation: ${translation}`);
  }
  // [END translate_quickstart]

  quickstart();
}

main(...process.argv.slice(2));
"#;

    fn options(strategy: ParseStrategy, region_tags: bool) -> FileOptions {
        FileOptions {
            strategy,
            region_tags,
        }
    }

    #[test]
    fn test_analyze_source_with_region_tags() {
        let methods =
            analyze_source(SAMPLE, "translate/quickstart.js", options(ParseStrategy::Auto, true))
                .unwrap();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name, "quickstart");
        assert_eq!(methods[0].start_line, 7);
        assert_eq!(methods[0].end_line, 11);
        assert_eq!(methods[0].region_tags, vec!["translate_quickstart"]);
    }

    #[test]
    fn test_analyze_source_without_region_tags() {
        let methods =
            analyze_source(SAMPLE, "quickstart.js", options(ParseStrategy::Auto, false)).unwrap();
        assert!(methods[0].region_tags.is_empty());
    }

    #[test]
    fn test_analyze_source_direct_strategy_sees_wrapper() {
        let methods =
            analyze_source(SAMPLE, "quickstart.js", options(ParseStrategy::Direct, true)).unwrap();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name, "main");
        // The region sits inside `main`, so it does not enclose it
        assert!(methods[0].region_tags.is_empty());
    }

    #[test]
    fn test_analyze_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quickstart.js");
        std::fs::write(&path, SAMPLE).unwrap();

        let methods = analyze_file(&path, options(ParseStrategy::Wrapped, true)).unwrap();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].source_path, path.to_string_lossy());
    }

    #[test]
    fn test_analyze_file_missing() {
        let result = analyze_file(Path::new("/nonexistent/sample.js"), options(ParseStrategy::Auto, true));
        assert!(result.is_err());
    }

    #[test]
    fn test_analyze_source_parse_error() {
        let result = analyze_source("function (", "broken.js", options(ParseStrategy::Auto, true));
        assert!(result.is_err());
    }
}
