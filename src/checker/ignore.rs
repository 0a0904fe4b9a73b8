use regex::Regex;
use std::ops::Range;
use tracing::warn;

/// Regex patterns whose matches are never spellchecked (URLs, emails, ...).
#[derive(Debug, Default)]
pub struct IgnoreRules {
    patterns: Vec<Regex>,
}

impl IgnoreRules {
    /// Compile patterns, warning about and dropping the invalid ones.
    pub fn new(patterns: &[String]) -> Self {
        let mut compiled = Vec::new();
        for pattern in patterns {
            match Regex::new(pattern) {
                Ok(re) => compiled.push(re),
                Err(e) => warn!("Invalid regex pattern '{}': {}", pattern, e),
            }
        }
        Self { patterns: compiled }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Byte ranges of `content` covered by any pattern, sorted by start.
    pub fn regions(&self, content: &str) -> IgnoredRegions {
        let mut ranges: Vec<Range<usize>> = self
            .patterns
            .iter()
            .flat_map(|re| re.find_iter(content).map(|m| m.range()))
            .filter(|r| !r.is_empty())
            .collect();
        ranges.sort_by_key(|r| (r.start, r.end));
        IgnoredRegions { ranges }
    }
}

#[derive(Debug, Default)]
pub struct IgnoredRegions {
    ranges: Vec<Range<usize>>,
}

impl IgnoredRegions {
    /// True when `span` overlaps any ignored region.
    pub fn covers(&self, span: &Range<usize>) -> bool {
        // Regions starting at or after span.end cannot overlap
        let candidates = self.ranges.partition_point(|r| r.start < span.end);
        self.ranges[..candidates].iter().any(|r| r.end > span.start)
    }
}
