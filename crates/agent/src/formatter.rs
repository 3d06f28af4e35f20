use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+").expect("heading regex is valid"));
static BOLD_STARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^*\n]+?)\*\*").expect("bold regex is valid"));
static BOLD_UNDERSCORES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__([^_\n]+?)__").expect("underscore bold regex is valid"));
static ITALIC_STAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*([^*\s](?:[^*\n]*[^*\s])?)\*").expect("italic regex is valid")
});
static BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*[-*+•][ \t]+").expect("bullet regex is valid"));
static NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(\d+)[.)][ \t]+").expect("numbered regex is valid"));
static BLANK_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n(?:[ \t]*\n)+").expect("blank-line regex is valid"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]]+)\]\(([^()\s]*)\)").expect("link regex is valid"));

type Transform = fn(&str) -> String;

/// Applied in this order on every pass.
const PIPELINE: &[(&str, Transform)] = &[
    ("normalize_line_endings", normalize_line_endings),
    ("strip_headings", strip_headings),
    ("strip_emphasis", strip_emphasis),
    ("normalize_bullets", normalize_bullets),
    ("normalize_numbering", normalize_numbering),
    ("collapse_blank_lines", collapse_blank_lines),
    ("strip_links", strip_links),
    ("trim", trim),
];

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n")
}

fn strip_headings(text: &str) -> String {
    HEADING.replace_all(text, "").into_owned()
}

fn strip_emphasis(text: &str) -> String {
    let text = BOLD_STARS.replace_all(text, "$1");
    let text = BOLD_UNDERSCORES.replace_all(&text, "$1");
    ITALIC_STAR.replace_all(&text, "$1").into_owned()
}

fn normalize_bullets(text: &str) -> String {
    BULLET.replace_all(text, "• ").into_owned()
}

fn normalize_numbering(text: &str) -> String {
    NUMBERED.replace_all(text, "${1}. ").into_owned()
}

fn collapse_blank_lines(text: &str) -> String {
    BLANK_RUN.replace_all(text, "\n\n").into_owned()
}

fn strip_links(text: &str) -> String {
    LINK.replace_all(text, "$1").into_owned()
}

fn trim(text: &str) -> String {
    text.trim().to_owned()
}

/// Turns model markdown into the plain text the chat widget displays.
#[derive(Clone, Debug, Default)]
pub struct ResponseFormatter;

impl ResponseFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Runs the pipeline until the text stops changing, so formatting an
    /// already formatted reply is a no-op. Every changing pass either shortens
    /// the text or swaps a list marker for its canonical form, which bounds
    /// the number of passes.
    pub fn format(&self, reply: &str) -> String {
        let mut current = reply.to_owned();
        loop {
            let next = Self::single_pass(&current);
            if next == current {
                return next;
            }
            current = next;
        }
    }

    fn single_pass(text: &str) -> String {
        PIPELINE.iter().fold(text.to_owned(), |acc, (_, transform)| transform(&acc))
    }
}
