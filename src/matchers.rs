//! Fragment Matchers
//!
//! A [`RuleMatcher`] applies one compiled matching rule to an input text and
//! yields classified [`FragmentGroup`]s. Capture slots map positionally onto
//! the rule's classification list; an optional [`ValidatorKind`] vets
//! individual captures before they become fragments (used for bracketed
//! option clauses and for the emphasis comment-terminator guard).
//!
//! Matchers never fail on malformed input; they produce fewer or no
//! fragments. The only hard stop is the per-rule wall-clock budget, which
//! drops that rule's contribution for the current call and logs a
//! diagnostic.

use std::time::{Duration, Instant};

use regex::Regex;

use crate::fragments::{Classification, Fragment, FragmentGroup};
use crate::patterns::{PatternError, RulePattern};

/// Wall-clock budget for one rule over one input text. User-controlled
/// comment text combined with pattern evaluation is a latent worst-case
/// performance hazard; exceeding the budget degrades highlighting for that
/// rule only, never the whole parse.
pub const RULE_TIME_BUDGET: Duration = Duration::from_millis(100);

/// Allow-list driven validation for a bracketed options clause.
///
/// The clause body is split on commas and each trimmed option checked;
/// unknown non-empty options reject the clause, while duplicates and empty
/// options are tolerated (mirroring Doxygen's own leniency).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OptionRules {
    /// Bare option names accepted in the clause.
    pub allowed: &'static [&'static str],
    /// Whether name comparison ignores ASCII case.
    pub case_insensitive: bool,
    /// Whether the clause may hold at most one option (`\fileinfo`).
    pub single: bool,
    /// Whether bare names may carry a `:level` suffix in 1..=6
    /// (`\tableofcontents{xml:2}`).
    pub levels: bool,
    /// `key=value` / `key:value` options and how their values are checked.
    pub keyed: &'static [(&'static str, ValueRule)],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueRule {
    /// `raise=N` with N in 1..=5.
    RaiseLevel,
    /// Any non-empty value (`prefix=...`, `anchor:id`).
    FreeText,
}

impl OptionRules {
    fn name_allowed(&self, name: &str) -> bool {
        if self.case_insensitive {
            self.allowed.iter().any(|a| a.eq_ignore_ascii_case(name))
        } else {
            self.allowed.contains(&name)
        }
    }

    fn keyed_value_ok(&self, key: &str, value: &str) -> bool {
        let rule = self.keyed.iter().find(|(k, _)| {
            if self.case_insensitive {
                k.eq_ignore_ascii_case(key)
            } else {
                *k == key
            }
        });
        match rule {
            Some((_, ValueRule::RaiseLevel)) => {
                matches!(value.trim().parse::<u32>(), Ok(n) if (1..=5).contains(&n))
            }
            Some((_, ValueRule::FreeText)) => !value.trim().is_empty(),
            None => false,
        }
    }

    fn option_ok(&self, option: &str) -> bool {
        let option = option.trim();
        if option.is_empty() {
            return true;
        }
        if let Some((key, value)) = option.split_once('=') {
            return self.keyed_value_ok(key.trim(), value);
        }
        if let Some((name, suffix)) = option.split_once(':') {
            let name = name.trim();
            if self.levels && self.name_allowed(name) {
                return matches!(suffix.trim().parse::<u32>(), Ok(n) if (1..=6).contains(&n));
            }
            return self.keyed_value_ok(name, suffix);
        }
        self.name_allowed(option)
    }

    /// Validate a whole clause including its delimiters (`{doc,local}`).
    fn clause_ok(&self, clause: &str) -> bool {
        let body = clause
            .trim_start_matches(['{', '['])
            .trim_end_matches(['}', ']']);
        let options: Vec<&str> = body.split(',').map(str::trim).collect();
        if self.single && options.iter().filter(|o| !o.is_empty()).count() > 1 {
            return false;
        }
        options.into_iter().all(|o| self.option_ok(o))
    }
}

/// The `\include` option set.
const INCLUDE_OPTIONS: OptionRules = OptionRules {
    allowed: &["lineno", "doc", "local", "strip", "nostrip"],
    case_insensitive: false,
    single: false,
    levels: false,
    keyed: &[("raise", ValueRule::RaiseLevel), ("prefix", ValueRule::FreeText)],
};

/// `\snippet` accepts everything `\include` does plus `trimleft`.
const SNIPPET_OPTIONS: OptionRules = OptionRules {
    allowed: &["lineno", "doc", "local", "strip", "nostrip", "trimleft"],
    case_insensitive: false,
    single: false,
    levels: false,
    keyed: &[("raise", ValueRule::RaiseLevel), ("prefix", ValueRule::FreeText)],
};

const EXAMPLE_OPTIONS: OptionRules = OptionRules {
    allowed: &["lineno", "strip", "nostrip"],
    case_insensitive: false,
    single: false,
    levels: false,
    keyed: &[],
};

const BLOCK_OPTION: OptionRules = OptionRules {
    allowed: &["block"],
    case_insensitive: false,
    single: true,
    levels: false,
    keyed: &[],
};

const TOC_OPTIONS: OptionRules = OptionRules {
    allowed: &["html", "latex", "xml", "docbook"],
    case_insensitive: true,
    single: false,
    levels: true,
    keyed: &[],
};

const GRAPH_OPTIONS: OptionRules = OptionRules {
    allowed: &["yes", "no", "text", "graph", "builtin"],
    case_insensitive: true,
    single: true,
    levels: false,
    keyed: &[],
};

const FILEINFO_OPTIONS: OptionRules = OptionRules {
    allowed: &["name", "extension", "filename", "directory", "full"],
    case_insensitive: true,
    single: true,
    levels: false,
    keyed: &[],
};

const IMAGE_OPTIONS: OptionRules = OptionRules {
    allowed: &["inline"],
    case_insensitive: true,
    single: false,
    levels: false,
    keyed: &[("anchor", ValueRule::FreeText)],
};

/// Which validation a matcher applies, if any. Kinds are a closed set so
/// command groups stay plain data that can be compared and regrouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidatorKind {
    IncludeOptions,
    SnippetOptions,
    ExampleOptions,
    BlockOption,
    TocOptions,
    GraphOptions,
    FileinfoOptions,
    ImageOptions,
    /// Rejects spans containing a block-comment terminator; applied to the
    /// markup span itself (capture position 0).
    NoCommentTerminator,
}

impl ValidatorKind {
    /// Accept or reject the capture at classification position `index`.
    /// Positions the validator does not care about are always accepted.
    pub fn accept(&self, index: usize, text: &str) -> bool {
        match self {
            ValidatorKind::NoCommentTerminator => index != 0 || !text.contains("*/"),
            _ => index != 1 || self.rules().clause_ok(text),
        }
    }

    fn rules(&self) -> OptionRules {
        match self {
            ValidatorKind::IncludeOptions => INCLUDE_OPTIONS,
            ValidatorKind::SnippetOptions => SNIPPET_OPTIONS,
            ValidatorKind::ExampleOptions => EXAMPLE_OPTIONS,
            ValidatorKind::BlockOption => BLOCK_OPTION,
            ValidatorKind::TocOptions => TOC_OPTIONS,
            ValidatorKind::GraphOptions => GRAPH_OPTIONS,
            ValidatorKind::FileinfoOptions => FILEINFO_OPTIONS,
            ValidatorKind::ImageOptions => IMAGE_OPTIONS,
            ValidatorKind::NoCommentTerminator => unreachable!("not option based"),
        }
    }
}

/// Applies one compiled rule to input text, yielding fragment groups.
#[derive(Debug)]
pub struct RuleMatcher {
    label: String,
    regex: Regex,
    classifications: Vec<Classification>,
    validator: Option<ValidatorKind>,
    budget: Duration,
}

impl RuleMatcher {
    /// Compile a rule. The classification list must have exactly one entry
    /// per capture slot the pattern declares; a mismatch indicates a
    /// malformed registry entry.
    pub fn new(
        label: impl Into<String>,
        pattern: &RulePattern,
        classifications: Vec<Classification>,
        validator: Option<ValidatorKind>,
    ) -> Result<Self, PatternError> {
        let regex = Regex::new(&pattern.regex).map_err(|e| PatternError(e.to_string()))?;
        debug_assert_eq!(
            pattern.captures,
            classifications.len(),
            "rule declares {} captures but {} classifications were supplied",
            pattern.captures,
            classifications.len()
        );
        Ok(Self {
            label: label.into(),
            regex,
            classifications,
            validator,
            budget: RULE_TIME_BUDGET,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Apply the rule over the whole text, returning all fragment groups in
    /// text order. Never fails; a rule that exceeds its time budget simply
    /// contributes nothing for this call.
    pub fn find_fragments(&self, text: &str) -> Vec<FragmentGroup> {
        let deadline = Instant::now() + self.budget;
        let mut groups = Vec::new();
        let mut pos = 0;

        while pos <= text.len() {
            if Instant::now() > deadline {
                log::warn!(
                    "rule '{}' exceeded its {}ms budget; skipping it for this parse",
                    self.label,
                    self.budget.as_millis()
                );
                return Vec::new();
            }

            let caps = match self.regex.captures_at(text, pos) {
                Some(caps) => caps,
                None => break,
            };
            let full = caps.get(0).expect("capture 0 is the full match");

            debug_assert!(
                caps.len() - 1 <= self.classifications.len(),
                "rule '{}' produced more captures than declared classifications",
                self.label
            );

            let mut fragments = Vec::new();
            let mut span_end = None;
            for slot in 1..caps.len() {
                let m = match caps.get(slot) {
                    Some(m) => m,
                    None => continue,
                };
                // Zero-length captures never become fragments.
                if m.start() == m.end() {
                    continue;
                }
                span_end = Some(span_end.map_or(m.end(), |e: usize| e.max(m.end())));

                let index = slot - 1;
                // Extra captures beyond the classification list are a
                // programmer error; degrade by ignoring them in release.
                let classification = match self.classifications.get(index) {
                    Some(&c) => c,
                    None => continue,
                };
                if let Some(validator) = &self.validator {
                    if !validator.accept(index, m.as_str()) {
                        continue;
                    }
                }
                fragments.push(Fragment::new(m.start(), m.end() - m.start(), classification));
            }

            if !fragments.is_empty() {
                groups.push(FragmentGroup::new(fragments));
            }

            // Resume at the end of the last captured group so a consumed
            // trailing boundary character can open the next match.
            let resume = span_end.unwrap_or(full.end());
            pos = resume.max(full.start() + 1).max(pos + 1);
        }

        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragments::Classification;
    use crate::patterns::{self, RulePattern};

    fn matcher(rule: RulePattern, classifications: Vec<Classification>) -> RuleMatcher {
        RuleMatcher::new("test", &rule, classifications, None).unwrap()
    }

    #[test]
    fn test_single_match_single_fragment() {
        let m = matcher(
            patterns::anywhere_no_param(&["callgraph"]),
            vec![Classification::Command1],
        );
        let groups = m.find_fragments("text \\callgraph more");
        assert_eq!(groups.len(), 1);
        let frag = groups[0].fragments()[0];
        assert_eq!(frag.start(), 5);
        assert_eq!(frag.len(), "\\callgraph".len());
        assert_eq!(frag.classification(), Classification::Command1);
    }

    #[test]
    fn test_adjacent_matches_share_boundary_whitespace() {
        // The first match consumes the separating space as its trailing
        // boundary; resuming at the capture end makes it available again.
        let m = matcher(
            patterns::anywhere_no_param(&["callgraph", "callergraph"]),
            vec![Classification::Command1],
        );
        let groups = m.find_fragments("\\callgraph \\callergraph");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].start(), 11);
    }

    #[test]
    fn test_missing_optional_param_keeps_command() {
        let m = matcher(
            patterns::line_start_word_param(&["param"]),
            vec![Classification::Command1, Classification::Parameter1],
        );
        let groups = m.find_fragments("/// @param");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].fragments().len(), 1);
        assert_eq!(
            groups[0].fragments()[0].classification(),
            Classification::Command1
        );
    }

    #[test]
    fn test_validator_rejects_only_offending_capture() {
        let m = RuleMatcher::new(
            "snippet",
            &patterns::options_clause(&["snippet"], false, true, 2),
            vec![
                Classification::Command1,
                Classification::Parameter1,
                Classification::Parameter2,
                Classification::Title,
            ],
            Some(ValidatorKind::SnippetOptions),
        )
        .unwrap();

        let groups = m.find_fragments("\\snippet{doc,bogus} file.cpp");
        assert_eq!(groups.len(), 1);
        let classifications: Vec<_> = groups[0]
            .fragments()
            .iter()
            .map(|f| f.classification())
            .collect();
        // Options clause rejected; command and file survive.
        assert_eq!(
            classifications,
            vec![Classification::Command1, Classification::Parameter2]
        );
    }

    #[test]
    fn test_option_rules() {
        assert!(INCLUDE_OPTIONS.clause_ok("{doc,local}"));
        assert!(INCLUDE_OPTIONS.clause_ok("{ local, doc }"));
        assert!(INCLUDE_OPTIONS.clause_ok("{local,lineno, }"));
        assert!(INCLUDE_OPTIONS.clause_ok("{raise = 1 }"));
        assert!(INCLUDE_OPTIONS.clause_ok("{prefix = some great.prefix}"));
        assert!(INCLUDE_OPTIONS.clause_ok("{}"));
        assert!(!INCLUDE_OPTIONS.clause_ok("{doc,raise=6}"));
        assert!(!INCLUDE_OPTIONS.clause_ok("{doc,raise=99}"));
        assert!(!INCLUDE_OPTIONS.clause_ok("{local,unknownlocal}"));
        // Options are case-sensitive for the include family.
        assert!(!INCLUDE_OPTIONS.clause_ok("{STRIP}"));

        assert!(SNIPPET_OPTIONS.clause_ok("{trimleft,local}"));

        assert!(TOC_OPTIONS.clause_ok("{xml , html : 2 , latex,docbook:3}"));
        assert!(TOC_OPTIONS.clause_ok("{ XML }"));
        assert!(!TOC_OPTIONS.clause_ok("{xml:0}"));
        assert!(!TOC_OPTIONS.clause_ok("{xml:7}"));
        assert!(!TOC_OPTIONS.clause_ok("{unknown:3}"));

        assert!(GRAPH_OPTIONS.clause_ok("{  YES  }"));
        assert!(GRAPH_OPTIONS.clause_ok("{GRAPH }"));
        assert!(!GRAPH_OPTIONS.clause_ok("{unknown}"));

        assert!(FILEINFO_OPTIONS.clause_ok("{FULL}"));
        assert!(!FILEINFO_OPTIONS.clause_ok("{full,name}"));

        assert!(IMAGE_OPTIONS.clause_ok("{inline,anchor:id}"));
        // Keyed names follow the family's case rule, same as bare names.
        assert!(IMAGE_OPTIONS.clause_ok("{Anchor: some id, inline}"));
        assert!(IMAGE_OPTIONS.clause_ok("{ANCHOR:id}"));
        assert!(!INCLUDE_OPTIONS.clause_ok("{PREFIX=x}"));
        assert!(!IMAGE_OPTIONS.clause_ok("{unknown}"));
    }

    #[test]
    fn test_comment_terminator_validator() {
        assert!(ValidatorKind::NoCommentTerminator.accept(0, "*plain*"));
        assert!(!ValidatorKind::NoCommentTerminator.accept(0, "_has */ inside_"));
    }
}
