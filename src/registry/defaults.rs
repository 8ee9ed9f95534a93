//! Default Command Table
//!
//! The static table every registry starts from. Commands sharing an
//! identical (shape, classification list, validator) triple are listed
//! together; the registry may re-split and re-merge them when user overrides
//! change individual classifications.
//!
//! The table is ordered: registration order decides who wins an exact-tie
//! start position during overlap resolution, so more specific rule families
//! come before the generic prose-level ones.

use crate::fragments::Classification::{self, *};
use crate::matchers::ValidatorKind;
use crate::patterns::Shape;

/// One row of the default table: a set of command names with identical
/// parsing shape and classification assignment.
#[derive(Debug, Clone, Copy)]
pub struct DefaultGroup {
    pub names: &'static [&'static str],
    pub shape: Shape,
    pub classifications: &'static [Classification],
    pub validator: Option<ValidatorKind>,
}

const fn group(
    names: &'static [&'static str],
    shape: Shape,
    classifications: &'static [Classification],
) -> DefaultGroup {
    DefaultGroup {
        names,
        shape,
        classifications,
        validator: None,
    }
}

const fn validated(
    names: &'static [&'static str],
    shape: Shape,
    classifications: &'static [Classification],
    validator: ValidatorKind,
) -> DefaultGroup {
    DefaultGroup {
        names,
        shape,
        classifications,
        validator: Some(validator),
    }
}

pub const DEFAULT_GROUPS: &[DefaultGroup] = &[
    // Escaped punctuation and symbol commands. `---` and `--` must both be
    // listed; the builders order alternations longest-first.
    group(
        &[
            "---", "--", "::", "\\", "@", "&", "$", "#", "<", ">", "%", "\"", ".", "=", "|", "{",
            "}",
        ],
        Shape::Punctuation,
        &[Command3],
    ),
    // Inline formula delimiters.
    group(
        &["f$", "f(", "f)", "f[", "f]", "f}"],
        Shape::Punctuation,
        &[Command2],
    ),
    // Formula environment opener: `\f{eqnarray*}{`.
    group(&["f"], Shape::FormulaEnvironment, &[Command2]),
    // Language selector: `\~english`.
    group(&["~"], Shape::LanguageTag, &[Command3]),
    // `\code` with an optional attached language qualifier: `\code{.py}`.
    group(&["code"], Shape::AttachedQualifier, &[Command1]),
    // Dedicated `\param` shape with a bracketed direction qualifier.
    group(
        &["param"],
        Shape::ParamWithDirection,
        &[Command1, Parameter2, Parameter1],
    ),
    // Named-value and template-parameter documentation.
    group(
        &["retval", "tparam"],
        Shape::LineStartWordParam,
        &[Command1, Parameter1],
    ),
    // Thrown exceptions render under their own section classification.
    group(
        &["exception", "throw", "throws"],
        Shape::LineStartWordParam,
        &[Exception, Parameter1],
    ),
    group(&["note", "remark", "remarks"], Shape::LineStartNoParam, &[Note]),
    group(
        &["attention", "important", "raisewarning", "warning"],
        Shape::LineStartNoParam,
        &[Warning],
    ),
    // Entity commands taking one identifier.
    group(
        &[
            "concept",
            "enum",
            "extends",
            "idlexcept",
            "implements",
            "memberof",
            "module",
            "namespace",
            "package",
            "related",
            "relatedalso",
            "relates",
            "relatesalso",
        ],
        Shape::LineStartWordParam,
        &[Command1, Parameter1],
    ),
    // Commands whose single argument runs to the end of the line.
    group(
        &[
            "addindex",
            "cond",
            "def",
            "dir",
            "docbookinclude",
            "elseif",
            "file",
            "fn",
            "if",
            "ifnot",
            "ingroup",
            "latexinclude",
            "line",
            "maninclude",
            "noop",
            "overload",
            "property",
            "rtfinclude",
            "skip",
            "skipline",
            "typedef",
            "until",
            "var",
            "verbinclude",
            "xmlinclude",
        ],
        Shape::LineStartParamTillEnd,
        &[Command1, Parameter1],
    ),
    // Page-level commands whose argument is a display title.
    group(
        &["mainpage", "name"],
        Shape::LineStartParamTillEnd,
        &[Command1, Title],
    ),
    // `\par` takes an optional title; `\par:` yields the bare command.
    group(&["par"], Shape::LineStartOptionalTitle, &[Command1, Title]),
    // Grouping and sectioning commands: label word plus title text.
    group(
        &[
            "addtogroup",
            "defgroup",
            "page",
            "paragraph",
            "section",
            "subparagraph",
            "subsection",
            "subsubparagraph",
            "subsubsection",
            "weakgroup",
        ],
        Shape::LineStartTwoParams,
        &[Command1, Parameter1, Title],
    ),
    // Compound-entity commands: name, then header-file/header-name info.
    group(
        &[
            "category",
            "class",
            "headerfile",
            "interface",
            "protocol",
            "struct",
            "union",
        ],
        Shape::LineStartTwoParams,
        &[Command1, Parameter1, Parameter2],
    ),
    // Include commands with a brace-delimited option clause and a path.
    validated(
        &["dontinclude", "include", "includedoc", "includelineno"],
        Shape::OptionsClause {
            square: false,
            anchored: true,
            params: 1,
        },
        &[Command1, Parameter1, Parameter2],
        ValidatorKind::IncludeOptions,
    ),
    validated(
        &["snippet", "snippetdoc", "snippetlineno"],
        Shape::OptionsClause {
            square: false,
            anchored: true,
            params: 2,
        },
        &[Command1, Parameter1, Parameter2, Title],
        ValidatorKind::SnippetOptions,
    ),
    validated(
        &["example"],
        Shape::OptionsClause {
            square: false,
            anchored: true,
            params: 1,
        },
        &[Command1, Parameter1, Parameter2],
        ValidatorKind::ExampleOptions,
    ),
    validated(
        &["htmlinclude"],
        Shape::OptionsClause {
            square: true,
            anchored: true,
            params: 1,
        },
        &[Command1, Parameter1, Parameter2],
        ValidatorKind::BlockOption,
    ),
    validated(
        &["htmlonly"],
        Shape::OptionsClause {
            square: true,
            anchored: true,
            params: 0,
        },
        &[Command1, Parameter1],
        ValidatorKind::BlockOption,
    ),
    validated(
        &["tableofcontents"],
        Shape::OptionsClause {
            square: false,
            anchored: true,
            params: 0,
        },
        &[Command1, Parameter1],
        ValidatorKind::TocOptions,
    ),
    validated(
        &[
            "collaborationgraph",
            "directorygraph",
            "groupgraph",
            "includedbygraph",
            "includegraph",
            "inheritancegraph",
        ],
        Shape::OptionsClause {
            square: false,
            anchored: true,
            params: 0,
        },
        &[Command1, Parameter1],
        ValidatorKind::GraphOptions,
    ),
    validated(
        &["fileinfo"],
        Shape::OptionsClause {
            square: false,
            anchored: false,
            params: 0,
        },
        &[Command1, Parameter1],
        ValidatorKind::FileinfoOptions,
    ),
    validated(
        &["image"],
        Shape::Image,
        &[Command1, Parameter1, Parameter2, Parameter1, Title, Parameter2, Parameter2],
        ValidatorKind::ImageOptions,
    ),
    group(
        &["startuml"],
        Shape::UmlDiagram { options: true },
        &[Command1, Parameter1, Title, Parameter2, Parameter2],
    ),
    group(
        &["dot", "msc"],
        Shape::UmlDiagram { options: false },
        &[Command1, Title, Parameter2, Parameter2],
    ),
    group(
        &["diafile", "dotfile", "mscfile", "plantumlfile"],
        Shape::FileCaptionSize,
        &[Command1, Parameter1, Title, Parameter2, Parameter2],
    ),
    // Structural markers without parameters, anchored at line start.
    group(
        &[
            "arg",
            "author",
            "authors",
            "brief",
            "bug",
            "copyright",
            "date",
            "deprecated",
            "details",
            "docbookonly",
            "internal",
            "invariant",
            "latexonly",
            "li",
            "manonly",
            "nosubgrouping",
            "parblock",
            "post",
            "pre",
            "private",
            "privatesection",
            "protected",
            "protectedsection",
            "public",
            "publicsection",
            "pure",
            "result",
            "return",
            "returns",
            "rtfonly",
            "sa",
            "secreflist",
            "see",
            "short",
            "since",
            "static",
            "test",
            "todo",
            "verbatim",
            "version",
            "xmlonly",
        ],
        Shape::LineStartNoParam,
        &[Command1],
    ),
    // Toggles, block terminators and the newline command; legal anywhere.
    group(
        &[
            "callergraph",
            "callgraph",
            "else",
            "endcode",
            "endcond",
            "enddocbookonly",
            "enddot",
            "endhtmlonly",
            "endif",
            "endinternal",
            "endlatexonly",
            "endlink",
            "endmanonly",
            "endmsc",
            "endparblock",
            "endrtfonly",
            "endsecreflist",
            "enduml",
            "endverbatim",
            "endxmlonly",
            "hidecallergraph",
            "hidecallgraph",
            "hidecollaborationgraph",
            "hidedirectorygraph",
            "hideenumvalues",
            "hidegroupgraph",
            "hideincludedbygraph",
            "hideincludegraph",
            "hideinheritancegraph",
            "hideinitializer",
            "hideinlinesource",
            "hiderefby",
            "hiderefs",
            "lineinfo",
            "showenumvalues",
            "showinitializer",
            "showinlinesource",
            "showrefby",
            "showrefs",
            "n",
        ],
        Shape::AnywhereNoParam,
        &[Command1],
    ),
    // Prose-embedded commands taking one reference-like word.
    group(
        &[
            "a",
            "anchor",
            "b",
            "c",
            "cite",
            "copybrief",
            "copydetails",
            "copydoc",
            "doxyconfig",
            "e",
            "em",
            "emoji",
            "link",
            "p",
            "refitem",
        ],
        Shape::AnywhereWordParam,
        &[Command1, Parameter1],
    ),
    // Reference commands with an optional quoted display title.
    group(
        &["ref", "subpage"],
        Shape::AnywhereParamQuotedTitle,
        &[Command1, Parameter1, Title],
    ),
    group(
        &["qualifier"],
        Shape::AnywhereWordOrQuotedParam,
        &[Command1, Parameter1],
    ),
    group(
        &["showdate"],
        Shape::QuotedParamFreeTail,
        &[Command1, Parameter1, Parameter2],
    ),
];
