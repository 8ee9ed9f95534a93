//! Fragment Data Model
//!
//! Core types for classified text ranges. A [`Fragment`] is one contiguous,
//! labeled range over the input text; a [`FragmentGroup`] is the atomic unit
//! of overlap resolution (a command token together with its parameters, or a
//! single markdown span).

use serde::{Deserialize, Serialize};

/// Semantic label assigned to a fragment.
///
/// This is a closed set known at build time. The three generic command tiers
/// exist so a configuration can color different command families differently;
/// the two parameter tiers play the same role for command arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// Generic command token, first tier.
    Command1,
    /// Generic command token, second tier.
    Command2,
    /// Generic command token, third tier.
    Command3,
    /// Command parameter, first tier (typically names and identifiers).
    Parameter1,
    /// Command parameter, second tier (typically qualifiers and options).
    Parameter2,
    /// Free-text title argument (`\par`, `\mainpage`, section titles).
    Title,
    /// Note-style section indicator (`\note`, `\remark`).
    Note,
    /// Warning-style section indicator (`\warning`, `\attention`).
    Warning,
    /// Thrown-exception indicator (`\throw`, `\exception`).
    Exception,
    /// Minor markdown emphasis (`*italic*`, `_italic_`).
    EmphasisMinor,
    /// Major markdown emphasis (`**bold**`, `__bold__`).
    EmphasisMajor,
    /// Markdown strikethrough (`~~text~~`).
    Strikethrough,
    /// Backtick-delimited inline code span.
    InlineCode,
}

/// One classified, contiguous text range.
///
/// The range is half-open: `[start, start + len)`, in byte offsets of the
/// parsed text. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    start: usize,
    len: usize,
    classification: Classification,
}

impl Fragment {
    pub fn new(start: usize, len: usize, classification: Classification) -> Self {
        Self {
            start,
            len,
            classification,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// The slice of `text` this fragment covers.
    pub fn text<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end()]
    }
}

/// An ordered, non-empty sequence of fragments forming one semantic unit.
///
/// Fragments within a group are in left-to-right text order; the group's
/// overall span is `[first.start, last.end)`. Groups, not individual
/// fragments, are the unit of overlap resolution: a command's parameter is
/// never independently overridden while its command token survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentGroup {
    fragments: Vec<Fragment>,
}

impl FragmentGroup {
    /// Create a group from fragments already in text order.
    pub fn new(fragments: Vec<Fragment>) -> Self {
        debug_assert!(!fragments.is_empty(), "fragment groups must be non-empty");
        debug_assert!(
            fragments.windows(2).all(|w| w[0].end() <= w[1].start()),
            "fragments within a group must be in left-to-right text order"
        );
        Self { fragments }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Start offset of the group's overall span.
    pub fn start(&self) -> usize {
        self.fragments[0].start()
    }

    /// Exclusive end offset of the group's overall span.
    pub fn end(&self) -> usize {
        self.fragments[self.fragments.len() - 1].end()
    }

    /// Length of the overall span (including any uncovered gaps between
    /// member fragments).
    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether the overall spans of two groups intersect.
    pub fn overlaps(&self, other: &FragmentGroup) -> bool {
        self.start() < other.end() && other.start() < self.end()
    }
}
