//! Parse Orchestrator
//!
//! Runs every matcher over a comment text and resolves the resulting
//! candidate groups into one ordered, non-overlapping fragment set.
//!
//! Matcher order matters only for exact-tie start positions: the stable
//! sort keeps the order in which matchers ran, so inline code (registered
//! first) beats command rules, which beat emphasis (registered last).

use std::sync::Arc;

use crate::fragments::FragmentGroup;
use crate::markup;
use crate::matchers::RuleMatcher;
use crate::patterns::PatternError;
use crate::registry::Registry;

/// One-shot comment classifier over a fixed registry snapshot.
///
/// Holds no per-parse state; every [`parse`](CommentParser::parse) call is
/// independent. Rebuild the parser when the registry snapshot changes.
pub struct CommentParser {
    registry: Arc<Registry>,
    inline_code: RuleMatcher,
    emphasis: Vec<RuleMatcher>,
}

impl CommentParser {
    pub fn new(registry: Arc<Registry>) -> Result<Self, PatternError> {
        let (inline_code, emphasis) = markup::markup_matchers()?;
        Ok(Self {
            registry,
            inline_code,
            emphasis,
        })
    }

    /// Parser over the default registry.
    pub fn with_defaults() -> Result<Self, PatternError> {
        Self::new(Registry::default_registry())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Classify one comment text into an ordered, non-overlapping sequence
    /// of fragment groups. Malformed input degrades to fewer fragments and
    /// never fails.
    pub fn parse(&self, text: &str) -> Vec<FragmentGroup> {
        let text = preprocess(text);
        if text.is_empty() {
            return Vec::new();
        }

        let mut candidates = Vec::new();
        candidates.extend(self.inline_code.find_fragments(text));
        for matcher in self.registry.matchers() {
            candidates.extend(matcher.find_fragments(text));
        }
        for matcher in &self.emphasis {
            candidates.extend(matcher.find_fragments(text));
        }

        resolve_overlaps(candidates)
    }
}

/// Trim trailing whitespace and strip a trailing block-comment terminator,
/// so the terminator never classifies as part of a rest-of-line parameter.
fn preprocess(text: &str) -> &str {
    let text = text.trim_end();
    text.strip_suffix("*/").map_or(text, str::trim_end)
}

/// Stable-sort candidates by start position and sweep left to right,
/// keeping each group only when it starts at or after the end of the last
/// kept group. On overlap the earlier-sorted group wins and the loser is
/// discarded whole, so a command's rest-of-line title is never partially
/// re-classified by an emphasis rule matching inside it.
pub fn resolve_overlaps(mut candidates: Vec<FragmentGroup>) -> Vec<FragmentGroup> {
    candidates.sort_by_key(FragmentGroup::start);

    let mut resolved: Vec<FragmentGroup> = Vec::with_capacity(candidates.len());
    for group in candidates {
        match resolved.last() {
            Some(last) if group.start() < last.end() => {}
            _ => resolved.push(group),
        }
    }
    resolved
}
