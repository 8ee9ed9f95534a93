//! Markdown Span Rules
//!
//! Matching rules for the markdown subset honored inside comments: inline
//! code, star and underscore emphasis, and strikethrough. These are plain
//! [`RuleMatcher`]s built from hand-written patterns rather than the command
//! shape builders, because their boundary rules are about surrounding prose
//! rather than a command sigil.
//!
//! Boundary rules, since the engine has no lookaround, are expressed as
//! consuming groups. The left boundary set is whitespace plus a few
//! punctuation characters; an opening parenthesis is deliberately NOT a
//! valid left boundary, so C declarator soup like `int * (*)(const char*)`
//! never reads as emphasis.

use crate::fragments::Classification;
use crate::matchers::{RuleMatcher, ValidatorKind};
use crate::patterns::{PatternError, RulePattern};

/// Left boundary before an opening emphasis marker (consumed when not at
/// line start).
const OPEN_BEFORE: &str = r#"(?:^|[\s:;,"'])"#;

/// Right boundary after a closing emphasis marker.
const CLOSE_AFTER: &str = r"(?:$|[^\w*])";

fn rule(regex: String, captures: usize) -> RulePattern {
    RulePattern { regex, captures }
}

/// Backtick-delimited inline code, backticks included in the span. Runs
/// before every other rule so markdown markers inside code never classify.
pub fn inline_code() -> RulePattern {
    rule(r"(`[^`\n]+`)".to_string(), 1)
}

/// `**bold**`. The body must not start or end with whitespace or `*`.
pub fn bold_star() -> RulePattern {
    rule(
        format!(
            r"(?m){}(\*\*[^\s*](?:[^*\n]*[^\s*])?\*\*){}",
            OPEN_BEFORE, CLOSE_AFTER
        ),
        1,
    )
}

/// `*italic*`.
pub fn italic_star() -> RulePattern {
    rule(
        format!(
            r"(?m){}(\*[^\s*](?:[^*\n]*[^\s*])?\*){}",
            OPEN_BEFORE, CLOSE_AFTER
        ),
        1,
    )
}

/// `__bold__`. Unlike star bodies, underscore bodies may contain `*`, so a
/// terminator guard keeps a span from swallowing the end of the enclosing
/// block comment.
pub fn bold_underscore() -> RulePattern {
    rule(
        format!(
            r"(?m){}(__[^\s_](?:[^_\n]*[^\s_])?__){}",
            OPEN_BEFORE, CLOSE_AFTER
        ),
        1,
    )
}

/// `_italic_`.
pub fn italic_underscore() -> RulePattern {
    rule(
        format!(
            r"(?m){}(_[^\s_](?:[^_\n]*[^\s_])?_){}",
            OPEN_BEFORE, CLOSE_AFTER
        ),
        1,
    )
}

/// `~~strikethrough~~`.
pub fn strikethrough() -> RulePattern {
    rule(
        format!(
            r"(?m){}(~~[^\s~](?:[^~\n]*[^\s~])?~~){}",
            OPEN_BEFORE, CLOSE_AFTER
        ),
        1,
    )
}

/// All markup matchers, split around the command rules: inline code runs
/// first (highest precedence), emphasis and strikethrough run last so any
/// command match at the same offset wins ties.
pub fn markup_matchers() -> Result<(RuleMatcher, Vec<RuleMatcher>), PatternError> {
    let code = RuleMatcher::new(
        "inline-code",
        &inline_code(),
        vec![Classification::InlineCode],
        None,
    )?;
    let emphasis = vec![
        RuleMatcher::new(
            "bold-star",
            &bold_star(),
            vec![Classification::EmphasisMajor],
            None,
        )?,
        RuleMatcher::new(
            "italic-star",
            &italic_star(),
            vec![Classification::EmphasisMinor],
            None,
        )?,
        RuleMatcher::new(
            "bold-underscore",
            &bold_underscore(),
            vec![Classification::EmphasisMajor],
            Some(ValidatorKind::NoCommentTerminator),
        )?,
        RuleMatcher::new(
            "italic-underscore",
            &italic_underscore(),
            vec![Classification::EmphasisMinor],
            Some(ValidatorKind::NoCommentTerminator),
        )?,
        RuleMatcher::new(
            "strikethrough",
            &strikethrough(),
            vec![Classification::Strikethrough],
            Some(ValidatorKind::NoCommentTerminator),
        )?,
    ];
    Ok((code, emphasis))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(matcher: &RuleMatcher, text: &str) -> Vec<String> {
        matcher
            .find_fragments(text)
            .iter()
            .map(|g| text[g.start()..g.end()].to_string())
            .collect()
    }

    fn single(pattern: RulePattern, classification: Classification) -> RuleMatcher {
        RuleMatcher::new("markup", &pattern, vec![classification], None).unwrap()
    }

    #[test]
    fn test_italic_star_basic() {
        let m = single(italic_star(), Classification::EmphasisMinor);
        assert_eq!(spans(&m, "this is *emphasised* text"), vec!["*emphasised*"]);
    }

    #[test]
    fn test_star_ignores_declarator_soup() {
        let m = single(italic_star(), Classification::EmphasisMinor);
        assert!(spans(&m, "int * (*)(const char*) f").is_empty());
        assert!(spans(&m, "a * b * c").is_empty());
    }

    #[test]
    fn test_adjacent_emphasis_spans() {
        let m = single(italic_star(), Classification::EmphasisMinor);
        assert_eq!(spans(&m, "*a* *b*"), vec!["*a*", "*b*"]);
    }

    #[test]
    fn test_bold_star_not_matched_by_italic() {
        let m = single(italic_star(), Classification::EmphasisMinor);
        // The body class excludes `*`, so `**bold**` cannot half-match.
        assert!(spans(&m, "some **bold** text").is_empty());

        let b = single(bold_star(), Classification::EmphasisMajor);
        assert_eq!(spans(&b, "some **bold** text"), vec!["**bold**"]);
    }

    #[test]
    fn test_emphasis_after_punctuation_boundary() {
        let m = single(italic_star(), Classification::EmphasisMinor);
        assert_eq!(spans(&m, "note: *this*"), vec!["*this*"]);
        assert_eq!(spans(&m, "say '*hi*' now"), vec!["*hi*"]);
        // Mid-word stars are not emphasis.
        assert!(spans(&m, "some*thing* here").is_empty());
    }

    #[test]
    fn test_underscore_rejects_comment_terminator() {
        let (_, emphasis) = markup_matchers().unwrap();
        let italic = emphasis
            .iter()
            .find(|m| m.label() == "italic-underscore")
            .unwrap();
        assert_eq!(spans(italic, "an _italic_ word"), vec!["_italic_"]);
        assert!(spans(italic, "broken _span */ oops_").is_empty());
    }

    #[test]
    fn test_strikethrough() {
        let (_, emphasis) = markup_matchers().unwrap();
        let strike = emphasis
            .iter()
            .find(|m| m.label() == "strikethrough")
            .unwrap();
        assert_eq!(spans(strike, "was ~~wrong~~ once"), vec!["~~wrong~~"]);
        assert!(spans(strike, "approx ~~ nope").is_empty());
    }

    #[test]
    fn test_inline_code_span_includes_backticks() {
        let (code, _) = markup_matchers().unwrap();
        assert_eq!(spans(&code, "use `a * b` here"), vec!["`a * b`"]);
        // Unterminated backtick never matches.
        assert!(spans(&code, "stray ` tick\n").is_empty());
    }
}
