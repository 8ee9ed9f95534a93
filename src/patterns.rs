//! Pattern Builders
//!
//! Each builder is a pure function that turns a list of literal command
//! keywords into the regex text for one syntactic "shape" a Doxygen command
//! can take (no parameter, one word parameter, bracketed options clause, and
//! so on). The registry stores a [`Shape`] per command group and calls
//! [`Shape::build`] to obtain the concrete rule.
//!
//! ## Engine notes
//!
//! The `regex` crate has no lookaround, so boundary context is expressed with
//! consuming non-capturing groups. The matcher compensates by resuming its
//! scan at the end of the last *captured* group instead of the full match, so
//! a consumed trailing boundary character can still serve as the next match's
//! leading boundary (see `matchers`).
//!
//! Parameters that Doxygen requires are kept optional in the generated rule
//! on purpose: the command token must classify while the user is still typing
//! its argument. Zero-length captures are dropped by the matcher.

use std::fmt;

/// Either `@` or `\` introduces a command.
const SIGIL: &str = r"[@\\]";

/// Line-start prefix: optional comment markers (`///`, `//!`, `/**`, `/*!`)
/// and `*` gutter characters before an anchored command.
const LINE_START: &str = r"(?m)^[^\S\n]*(?:/\*[*!]?|//[/!]?)?[^\S\n]*\**[^\S\n]*";

/// A single word parameter (identifiers, `std::out_of_range`, `x,y,z`).
const WORD_PARAM: &str = r"[0-9A-Za-z_]\S*";

/// Rest-of-line parameter, trimmed of trailing whitespace, never empty.
const LINE_PARAM: &str = r"[^\n]*[^\s]";

/// Reference target as it appears in running prose: scoped names with `::`
/// or `.` separators, optional destructor tilde, optional argument list.
/// Trailing punctuation (`,`, `.`, a closing `)`) is deliberately excluded.
const REF_TARGET: &str = r"(?:::)?~?\w+(?:(?:::|\.)~?\w+)*(?:\([^()\n]*\))?";

/// A double-quoted argument, quotes included.
const QUOTED: &str = r#""[^"\n]*""#;

/// `width=`/`height=` size indication tokens.
const SIZE_PARAM: &str = r"(?:width|height)=\S+";

/// Error produced when a generated rule fails to compile.
///
/// Shapes and keyword lists are statically known, so this indicates a defect
/// in a builder rather than bad user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternError(pub String);

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid rule pattern: {}", self.0)
    }
}

impl std::error::Error for PatternError {}

/// A generated matching rule: the regex text plus the number of capture
/// slots it produces. Capture slot 0 is always the command token itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulePattern {
    pub regex: String,
    pub captures: usize,
}

impl RulePattern {
    fn new(regex: String, captures: usize) -> Self {
        Self { regex, captures }
    }
}

/// The parsing shape of a command group.
///
/// Shapes are data: the registry table assigns one to every command, and
/// identical (shape, classification-list) pairs are merged into a single
/// matching rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// No parameter; command must start a comment line.
    LineStartNoParam,
    /// No parameter; anywhere in text, followed by whitespace or EOL.
    AnywhereNoParam,
    /// No parameter and no trailing-whitespace requirement (`\@`, `\---`).
    Punctuation,
    /// Formula environment opener: `\f{eqnarray*}{`.
    FormulaEnvironment,
    /// Keyword directly followed by a bare word: `\~english`.
    LanguageTag,
    /// Keyword with an attached `{.ext}` qualifier consumed as part of the
    /// command token: `\code{.py}`.
    AttachedQualifier,
    /// One single-word parameter, line-start anchored.
    LineStartWordParam,
    /// One rest-of-line parameter, line-start anchored.
    LineStartParamTillEnd,
    /// One optional rest-of-line title; adjacent punctuation (`\par:`)
    /// yields the command token alone.
    LineStartOptionalTitle,
    /// Bare word then rest-of-line, both optional, line-start anchored.
    LineStartTwoParams,
    /// Dedicated `\param` shape: optional `[in]`/`[out]`/`[in,out]`
    /// direction qualifier (duplicates and unknown directions rejected by
    /// the pattern itself), then the parameter name.
    ParamWithDirection,
    /// One single-word parameter anywhere in a line (`\ref`, `\p`, `\a`).
    AnywhereWordParam,
    /// As above, but the parameter may also be a quoted string
    /// (`\qualifier "some text"`), with no separator required.
    AnywhereWordOrQuotedParam,
    /// Word parameter plus optional quoted display title (`\ref t "title"`).
    AnywhereParamQuotedTitle,
    /// Quoted required parameter plus optional free-text tail (`\showdate`).
    QuotedParamFreeTail,
    /// Bracket-delimited options clause directly adjacent to the command
    /// (no whitespace before the opening bracket), then up to two more
    /// parameters. `square` selects `[...]` over `{...}`; `params` is the
    /// number of trailing parameters (0..=2); `anchored` selects line-start
    /// anchoring.
    OptionsClause {
        square: bool,
        anchored: bool,
        params: u8,
    },
    /// UML/diagram commands: optional brace options block, optional quoted
    /// caption, optional `width=`/`height=` tokens.
    UmlDiagram { options: bool },
    /// File-reference commands: optional file (quoted or bare), optional
    /// quoted caption, optional size tokens (`\dotfile`, `\plantumlfile`).
    FileCaptionSize,
    /// `\image`: optional option clause, optional output-format qualifier,
    /// then file + caption + size tail. The tail only participates when a
    /// valid format token is present.
    Image,
}

impl Shape {
    /// Number of parameter captures this shape produces beyond the command
    /// token. A group's classification list must have exactly
    /// `1 + parameter_captures()` entries.
    pub fn parameter_captures(&self) -> usize {
        match self {
            Shape::LineStartNoParam
            | Shape::AnywhereNoParam
            | Shape::Punctuation
            | Shape::FormulaEnvironment
            | Shape::LanguageTag
            | Shape::AttachedQualifier => 0,
            Shape::LineStartWordParam
            | Shape::LineStartParamTillEnd
            | Shape::LineStartOptionalTitle
            | Shape::AnywhereWordParam
            | Shape::AnywhereWordOrQuotedParam => 1,
            Shape::LineStartTwoParams
            | Shape::ParamWithDirection
            | Shape::AnywhereParamQuotedTitle
            | Shape::QuotedParamFreeTail => 2,
            Shape::OptionsClause { params, .. } => 1 + *params as usize,
            Shape::UmlDiagram { options } => {
                if *options {
                    4
                } else {
                    3
                }
            }
            Shape::FileCaptionSize => 4,
            Shape::Image => 6,
        }
    }

    /// Generate the matching rule for this shape over the given keywords.
    pub fn build(&self, keywords: &[&str]) -> RulePattern {
        match self {
            Shape::LineStartNoParam => line_start_no_param(keywords),
            Shape::AnywhereNoParam => anywhere_no_param(keywords),
            Shape::Punctuation => punctuation(keywords),
            Shape::FormulaEnvironment => formula_environment(keywords),
            Shape::LanguageTag => language_tag(keywords),
            Shape::AttachedQualifier => attached_qualifier(keywords),
            Shape::LineStartWordParam => line_start_word_param(keywords),
            Shape::LineStartParamTillEnd => line_start_param_till_end(keywords),
            Shape::LineStartOptionalTitle => line_start_optional_title(keywords),
            Shape::LineStartTwoParams => line_start_two_params(keywords),
            Shape::ParamWithDirection => param_with_direction(keywords),
            Shape::AnywhereWordParam => anywhere_word_param(keywords),
            Shape::AnywhereWordOrQuotedParam => anywhere_word_or_quoted_param(keywords),
            Shape::AnywhereParamQuotedTitle => anywhere_param_quoted_title(keywords),
            Shape::QuotedParamFreeTail => quoted_param_free_tail(keywords),
            Shape::OptionsClause {
                square,
                anchored,
                params,
            } => options_clause(keywords, *square, *anchored, *params),
            Shape::UmlDiagram { options } => uml_diagram(keywords, *options),
            Shape::FileCaptionSize => file_caption_size(keywords),
            Shape::Image => image(keywords),
        }
    }
}

/// Escaped alternation over the keywords, longest first.
///
/// When one keyword is a prefix of another (`--` and `---`), the longer one
/// must be tried first; otherwise the shorter keyword wins spuriously and
/// truncates the match.
fn alternation(keywords: &[&str]) -> String {
    let mut sorted: Vec<&str> = keywords.to_vec();
    sorted.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    let escaped: Vec<String> = sorted.iter().map(|k| regex::escape(k)).collect();
    escaped.join("|")
}

/// Command token capture for word keywords: sigil, keyword, word boundary.
/// The boundary keeps `\par` from matching inside `\parblock`.
fn command(keywords: &[&str]) -> String {
    format!(r"({}(?:{}))\b", SIGIL, alternation(keywords))
}

pub fn line_start_no_param(keywords: &[&str]) -> RulePattern {
    RulePattern::new(format!("{}{}", LINE_START, command(keywords)), 1)
}

pub fn anywhere_no_param(keywords: &[&str]) -> RulePattern {
    RulePattern::new(format!(r"(?m){}(?:\s|$)", command(keywords)), 1)
}

pub fn punctuation(keywords: &[&str]) -> RulePattern {
    RulePattern::new(format!("({}(?:{}))", SIGIL, alternation(keywords)), 1)
}

pub fn formula_environment(keywords: &[&str]) -> RulePattern {
    RulePattern::new(
        format!(
            r"({}(?:{})\{{[^{{}}\n]*\}}\{{?)",
            SIGIL,
            alternation(keywords)
        ),
        1,
    )
}

pub fn language_tag(keywords: &[&str]) -> RulePattern {
    RulePattern::new(
        format!("({}(?:{})[A-Za-z]*)", SIGIL, alternation(keywords)),
        1,
    )
}

pub fn attached_qualifier(keywords: &[&str]) -> RulePattern {
    RulePattern::new(
        format!(
            r"({}(?:{})\b(?:\{{[^{{}}\s]*\}})?)",
            SIGIL,
            alternation(keywords)
        ),
        1,
    )
}

pub fn line_start_word_param(keywords: &[&str]) -> RulePattern {
    RulePattern::new(
        format!(
            r"{}{}(?:[^\S\n]+({}))?",
            LINE_START,
            command(keywords),
            WORD_PARAM
        ),
        2,
    )
}

pub fn line_start_param_till_end(keywords: &[&str]) -> RulePattern {
    RulePattern::new(
        format!(
            r"{}{}(?:[^\S\n]+({}))?",
            LINE_START,
            command(keywords),
            LINE_PARAM
        ),
        2,
    )
}

pub fn line_start_optional_title(keywords: &[&str]) -> RulePattern {
    // Identical matching to the till-end shape; the distinction is that the
    // capture is a free-text title and that `cmd:` (punctuation directly
    // after the keyword) yields the bare command token, which the word
    // boundary plus whitespace separator already guarantee.
    RulePattern::new(
        format!(
            r"{}{}(?:[^\S\n]+({}))?",
            LINE_START,
            command(keywords),
            LINE_PARAM
        ),
        2,
    )
}

pub fn line_start_two_params(keywords: &[&str]) -> RulePattern {
    RulePattern::new(
        format!(
            r"{}{}(?:[^\S\n]+(\S+))?(?:[^\S\n]+({}))?",
            LINE_START,
            command(keywords),
            LINE_PARAM
        ),
        3,
    )
}

pub fn param_with_direction(keywords: &[&str]) -> RulePattern {
    // Valid direction qualifiers, tolerating internal whitespace. Duplicate
    // combinations ([in,in]) and unknown directions fall through to the
    // non-capturing bracket alternative, so the parameter name still
    // classifies; a missing closing bracket fails the whole match.
    let qualifier = r"\[[ \t]*(?:in[ \t]*,[ \t]*out|out[ \t]*,[ \t]*in|in|out)[ \t]*\]";
    RulePattern::new(
        format!(
            r"{}{}(?:[^\S\n]*(?:({})|\[[^\]\n]*\]))?(?:[^\S\n]+(\w+(?:[.,:]\w+)*))?",
            LINE_START,
            command(keywords),
            qualifier
        ),
        3,
    )
}

pub fn anywhere_word_param(keywords: &[&str]) -> RulePattern {
    RulePattern::new(
        format!(r"{}(?:[^\S\n]+({}))?", command(keywords), REF_TARGET),
        2,
    )
}

pub fn anywhere_word_or_quoted_param(keywords: &[&str]) -> RulePattern {
    RulePattern::new(
        format!(r"{}(?:[^\S\n]*({}|\w+))?", command(keywords), QUOTED),
        2,
    )
}

pub fn anywhere_param_quoted_title(keywords: &[&str]) -> RulePattern {
    RulePattern::new(
        format!(
            r"{}(?:[^\S\n]+({})(?:[^\S\n]+({}))?)?",
            command(keywords),
            REF_TARGET,
            QUOTED
        ),
        3,
    )
}

pub fn quoted_param_free_tail(keywords: &[&str]) -> RulePattern {
    RulePattern::new(
        format!(
            r"{}(?:[^\S\n]+({})(?:[^\S\n]+({}))?)?",
            command(keywords),
            QUOTED,
            LINE_PARAM
        ),
        3,
    )
}

pub fn options_clause(keywords: &[&str], square: bool, anchored: bool, params: u8) -> RulePattern {
    let clause = if square {
        r"(\[[^\[\]\n]*\])"
    } else {
        r"(\{[^{}\n]*\})"
    };
    let mut pattern = String::new();
    if anchored {
        pattern.push_str(LINE_START);
    }
    pattern.push_str(&command(keywords));
    pattern.push_str(clause);
    pattern.push('?');
    match params {
        0 => {}
        // Single parameter: a file path that may contain spaces.
        1 => pattern.push_str(&format!(r"(?:[^\S\n]+({}))?", LINE_PARAM)),
        // Two parameters: a bare file word, then a rest-of-line name.
        _ => pattern.push_str(&format!(
            r"(?:[^\S\n]+(\S+))?(?:[^\S\n]+({}))?",
            LINE_PARAM
        )),
    }
    RulePattern::new(pattern, 1 + 1 + params.min(2) as usize)
}

pub fn uml_diagram(keywords: &[&str], options: bool) -> RulePattern {
    let mut pattern = format!("{}{}", LINE_START, command(keywords));
    let mut captures = 1;
    if options {
        pattern.push_str(r"(\{[^{}\n]*\})?");
        captures += 1;
    }
    pattern.push_str(&format!(
        r"(?:[^\S\n]+({}))?(?:[^\S\n]+({}))?(?:[^\S\n]+({}))?",
        QUOTED, SIZE_PARAM, SIZE_PARAM
    ));
    RulePattern::new(pattern, captures + 3)
}

pub fn file_caption_size(keywords: &[&str]) -> RulePattern {
    RulePattern::new(
        format!(
            r#"{}{}(?:[^\S\n]+({}|[^\s"]+))?(?:[^\S\n]+({}))?(?:[^\S\n]+({}))?(?:[^\S\n]+({}))?"#,
            LINE_START,
            command(keywords),
            QUOTED,
            QUOTED,
            SIZE_PARAM,
            SIZE_PARAM
        ),
        5,
    )
}

pub fn image(keywords: &[&str]) -> RulePattern {
    // The file/caption/size tail only participates when a valid output
    // format is present: `\image latexs ...` must not classify `latexs` (or
    // anything after it) as a file argument.
    RulePattern::new(
        format!(
            r#"{}{}(\{{[^{{}}\n]*\}})?(?:[^\S\n]+((?i:html|latex|docbook|rtf|xml))\b(?:[^\S\n]+({}|[^\s"]+))?(?:[^\S\n]+({}))?(?:[^\S\n]+({}))?(?:[^\S\n]+({}))?)?"#,
            LINE_START,
            command(keywords),
            QUOTED,
            QUOTED,
            SIZE_PARAM,
            SIZE_PARAM
        ),
        7,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_alternation_orders_longest_first() {
        assert_eq!(alternation(&["--", "---"]), "\\-\\-\\-|\\-\\-");
        assert_eq!(alternation(&["a", "abc", "ab"]), "abc|ab|a");
    }

    #[test]
    fn test_alternation_escapes_metacharacters() {
        assert_eq!(alternation(&["$"]), "\\$");
        assert_eq!(alternation(&["{"]), "\\{");
        assert_eq!(alternation(&["\\"]), "\\\\");
    }

    #[test]
    fn test_all_shapes_compile() {
        let shapes = [
            Shape::LineStartNoParam,
            Shape::AnywhereNoParam,
            Shape::Punctuation,
            Shape::FormulaEnvironment,
            Shape::LanguageTag,
            Shape::AttachedQualifier,
            Shape::LineStartWordParam,
            Shape::LineStartParamTillEnd,
            Shape::LineStartOptionalTitle,
            Shape::LineStartTwoParams,
            Shape::ParamWithDirection,
            Shape::AnywhereWordParam,
            Shape::AnywhereWordOrQuotedParam,
            Shape::AnywhereParamQuotedTitle,
            Shape::QuotedParamFreeTail,
            Shape::OptionsClause {
                square: false,
                anchored: true,
                params: 2,
            },
            Shape::OptionsClause {
                square: true,
                anchored: false,
                params: 0,
            },
            Shape::UmlDiagram { options: true },
            Shape::UmlDiagram { options: false },
            Shape::FileCaptionSize,
            Shape::Image,
        ];
        for shape in shapes {
            let rule = shape.build(&["brief", "param"]);
            let regex = Regex::new(&rule.regex).expect("shape pattern must compile");
            assert_eq!(
                regex.captures_len() - 1,
                rule.captures,
                "declared capture count must match the compiled pattern for {:?}",
                shape
            );
            assert_eq!(rule.captures, 1 + shape.parameter_captures());
        }
    }

    #[test]
    fn test_longest_keyword_wins_in_punctuation() {
        let rule = punctuation(&["--", "---"]);
        let regex = Regex::new(&rule.regex).unwrap();
        let caps = regex.captures("Some@---word").unwrap();
        assert_eq!(caps.get(1).unwrap().as_str(), "@---");
    }

    #[test]
    fn test_word_boundary_blocks_prefix_keywords() {
        let rule = line_start_optional_title(&["par"]);
        let regex = Regex::new(&rule.regex).unwrap();
        assert!(regex.captures("\\parblock").is_none());
        let caps = regex.captures("\\par Some title").unwrap();
        assert_eq!(caps.get(1).unwrap().as_str(), "\\par");
        assert_eq!(caps.get(2).unwrap().as_str(), "Some title");
    }

    #[test]
    fn test_line_start_tolerates_comment_markers() {
        let rule = line_start_word_param(&["throw"]);
        let regex = Regex::new(&rule.regex).unwrap();
        for text in ["/// @throw std::out_of_range x", " * \\throw err desc"] {
            let caps = regex.captures(text).expect(text);
            assert!(caps.get(1).unwrap().as_str().ends_with("throw"));
        }
    }

    #[test]
    fn test_param_direction_duplicate_falls_through() {
        let rule = param_with_direction(&["param"]);
        let regex = Regex::new(&rule.regex).unwrap();

        let caps = regex.captures("\\param[in] foo").unwrap();
        assert_eq!(caps.get(2).unwrap().as_str(), "[in]");
        assert_eq!(caps.get(3).unwrap().as_str(), "foo");

        let caps = regex.captures("\\param[in,in] foo").unwrap();
        assert!(caps.get(2).is_none());
        assert_eq!(caps.get(3).unwrap().as_str(), "foo");

        // Missing closing bracket: neither qualifier nor name classify.
        let caps = regex.captures("\\param[ out nothing").unwrap();
        assert_eq!(caps.get(1).unwrap().as_str(), "\\param");
        assert!(caps.get(2).is_none());
        assert!(caps.get(3).is_none());
    }

    #[test]
    fn test_ref_target_stops_at_trailing_punctuation() {
        let rule = anywhere_word_param(&["ref"]);
        let regex = Regex::new(&rule.regex).unwrap();

        let caps = regex.captures("see \\ref Class::Func(double,int), bla").unwrap();
        assert_eq!(caps.get(2).unwrap().as_str(), "Class::Func(double,int)");

        let caps = regex.captures("see \\ref subsection2: more").unwrap();
        assert_eq!(caps.get(2).unwrap().as_str(), "subsection2");

        let caps = regex.captures("(cf. \\ref Class.Func()) bla").unwrap();
        assert_eq!(caps.get(2).unwrap().as_str(), "Class.Func()");
    }

    #[test]
    fn test_image_tail_requires_valid_format() {
        let rule = image(&["image"]);
        let regex = Regex::new(&rule.regex).unwrap();

        let caps = regex.captures("\\image HTML application.jpg").unwrap();
        assert_eq!(caps.get(3).unwrap().as_str(), "HTML");
        assert_eq!(caps.get(4).unwrap().as_str(), "application.jpg");

        let caps = regex.captures("\\image latexs not a format").unwrap();
        assert!(caps.get(3).is_none());
        assert!(caps.get(4).is_none());
    }
}
