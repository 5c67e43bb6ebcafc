//! Region tag extraction
//!
//! Parses snippet region markers from source comments:
//!
//! ```javascript
//! // [START storage_list_files]
//! async function listFiles() { ... }
//! // [END storage_list_files]
//! ```
//!
//! Global invariants enforced:
//! - Deterministic extraction (pure function of the source text)
//! - An END closes the most recent open START with the same tag
//! - Unmatched markers never produce a region

use crate::ast::{line_number, SourceMethod};

/// A tagged line range delimited by START/END markers (inclusive)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub tag: String,
    pub start_line: u32,
    pub end_line: u32,
}

impl Region {
    /// Whether the region covers every line of `method`
    pub fn encloses(&self, method: &SourceMethod) -> bool {
        self.start_line <= method.start_line && self.end_line >= method.end_line
    }
}

/// Extract all complete regions from a source file
///
/// Regions are ordered by start line, then tag.
pub fn extract_regions(source: &str) -> Vec<Region> {
    let mut open: Vec<(String, u32)> = Vec::new();
    let mut regions = Vec::new();

    for (idx, line) in source.lines().enumerate() {
        let line_no = line_number(idx.saturating_add(1));

        if let Some(tag) = marker(line, "[START ") {
            open.push((tag.to_string(), line_no));
        } else if let Some(tag) = marker(line, "[END ") {
            match open.iter().rposition(|(open_tag, _)| open_tag == tag) {
                Some(pos) => {
                    let (tag, start_line) = open.remove(pos);
                    regions.push(Region {
                        tag,
                        start_line,
                        end_line: line_no,
                    });
                }
                None => log::debug!("line {}: [END {}] without matching START", line_no, tag),
            }
        }
    }

    for (tag, line_no) in &open {
        log::debug!("line {}: [START {}] is never closed", line_no, tag);
    }

    regions.sort_by(|a, b| {
        a.start_line
            .cmp(&b.start_line)
            .then_with(|| a.tag.cmp(&b.tag))
    });
    regions
}

/// Give each method the tags of all regions enclosing it
///
/// Tags are sorted and deduplicated; tags already present are kept.
pub fn attach_region_tags(methods: &mut [SourceMethod], regions: &[Region]) {
    for method in methods.iter_mut() {
        let enclosing = regions
            .iter()
            .filter(|region| region.encloses(method))
            .map(|region| region.tag.clone())
            .collect::<Vec<_>>();
        method.region_tags.extend(enclosing);
        method.region_tags.sort();
        method.region_tags.dedup();
    }
}

/// Tag of a marker comment, e.g. `storage_quickstart` in `// [START storage_quickstart]`
fn marker<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let comment = line.trim_start();
    let is_comment = comment.starts_with("//")
        || comment.starts_with("/*")
        || comment.starts_with('*')
        || comment.starts_with('#');
    if !is_comment {
        return None;
    }

    let rest = &comment[comment.find(prefix)? + prefix.len()..];
    let tag = rest[..rest.find(']')?].trim();
    if tag.is_empty() || tag.contains(char::is_whitespace) {
        return None;
    }
    Some(tag)
}
