use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static DISPLAY_SPAN: OnceLock<Regex> = OnceLock::new();
static DISPLAY_ENV: OnceLock<Regex> = OnceLock::new();
static INLINE_MATH: OnceLock<Regex> = OnceLock::new();
static MATRIX_ENV: OnceLock<Regex> = OnceLock::new();
static ANY_ENV: OnceLock<Regex> = OnceLock::new();
static SECTION: OnceLock<Regex> = OnceLock::new();
static TABLE: OnceLock<Regex> = OnceLock::new();
static FIGURE: OnceLock<Regex> = OnceLock::new();
static COMMAND: OnceLock<Regex> = OnceLock::new();

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    // Patterns are compile-time constants covered by the tests below.
    cell.get_or_init(|| Regex::new(source).unwrap())
}

fn display_span() -> &'static Regex {
    pattern(&DISPLAY_SPAN, r"\$\$[\s\S]*?\$\$|\\\[[\s\S]*?\\\]")
}

fn display_env() -> &'static Regex {
    pattern(
        &DISPLAY_ENV,
        r"\\begin\{(?:equation|align|gather|multline|eqnarray|displaymath)\*?\}",
    )
}

fn inline_math() -> &'static Regex {
    pattern(&INLINE_MATH, r"\$[^$\n]+?\$|\\\([\s\S]*?\\\)")
}

fn matrix_env() -> &'static Regex {
    pattern(
        &MATRIX_ENV,
        r"\\begin\{(?:[pbvVB]|small)?matrix\*?\}|\\begin\{array\}",
    )
}

fn any_env() -> &'static Regex {
    pattern(&ANY_ENV, r"\\begin\{[^}]+\}")
}

fn section() -> &'static Regex {
    pattern(
        &SECTION,
        r"\\(?:part|chapter|section|subsection|subsubsection|paragraph)\*?\{",
    )
}

fn table() -> &'static Regex {
    pattern(&TABLE, r"\\begin\{(?:table|tabular|tabularx|longtable)\*?\}")
}

fn figure() -> &'static Regex {
    pattern(&FIGURE, r"\\begin\{figure\*?\}|\\includegraphics")
}

fn command() -> &'static Regex {
    pattern(&COMMAND, r"\\[A-Za-z]+")
}

/// Raw structural counts for a LaTeX document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentIndicators {
    /// Inline math spans (`$...$`, `\(...\)`).
    pub equations: usize,
    /// Display math spans and display environments.
    pub display_math: usize,
    pub matrices: usize,
    pub environments: usize,
    pub sections: usize,
    pub tables: usize,
    pub figures: usize,
    pub commands: usize,
    /// Length in characters.
    pub length: usize,
    pub line_count: usize,
}

impl DocumentIndicators {
    pub fn extract(content: &str) -> Self {
        let display_spans = display_span().find_iter(content).count();
        let display_envs = display_env().find_iter(content).count();

        // Inline spans are counted after display spans are blanked out so
        // `$$a$$` never counts as two inline spans.
        let without_display = display_span().replace_all(content, " ");
        let equations = inline_math().find_iter(&without_display).count();

        Self {
            equations,
            display_math: display_spans + display_envs,
            matrices: matrix_env().find_iter(content).count(),
            environments: any_env().find_iter(content).count(),
            sections: section().find_iter(content).count(),
            tables: table().find_iter(content).count(),
            figures: figure().find_iter(content).count(),
            commands: command().find_iter(content).count(),
            length: content.chars().count(),
            line_count: content.lines().count(),
        }
    }

    pub fn as_map(&self) -> BTreeMap<&'static str, usize> {
        BTreeMap::from([
            ("equations", self.equations),
            ("displayMath", self.display_math),
            ("matrices", self.matrices),
            ("environments", self.environments),
            ("sections", self.sections),
            ("tables", self.tables),
            ("figures", self.figures),
            ("commands", self.commands),
            ("length", self.length),
            ("lineCount", self.line_count),
        ])
    }
}
