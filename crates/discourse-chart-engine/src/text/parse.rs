use std::sync::OnceLock;

use regex::Regex;

use super::{Analysis, Paragraph, Segment, Text};

fn paragraph_break() -> &'static Regex {
    static PARAGRAPH_BREAK: OnceLock<Regex> = OnceLock::new();
    PARAGRAPH_BREAK
        .get_or_init(|| Regex::new(r"\n[ \t]*\n").expect("Invalid paragraph break regex"))
}

fn token() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"[\w][\w'-]*|[^\w\s]").expect("Invalid token regex"))
}

fn ends_segment(token: &str) -> bool {
    matches!(token, "." | "!" | "?")
}

impl Text {
    /// Build a text from plain prose.
    ///
    /// Blank lines separate paragraphs, `.`, `!` and `?` close a segment, and every other
    /// non-word character becomes its own punctuation analysis.
    pub fn parse(source: &str) -> Self {
        let normalized = source.replace("\r\n", "\n");
        let paragraphs = paragraph_break()
            .split(&normalized)
            .filter(|p| !p.trim().is_empty())
            .map(parse_paragraph)
            .collect();
        Text::new(paragraphs)
    }
}

fn parse_paragraph(source: &str) -> Paragraph {
    let mut segments = Vec::new();
    let mut current = Segment::default();
    for m in token().find_iter(source) {
        let tok = m.as_str();
        let is_word = tok.chars().next().is_some_and(char::is_alphanumeric) || tok.starts_with('_');
        if is_word {
            current.analyses.push(Analysis::Wordform(tok.to_string()));
        } else {
            current.analyses.push(Analysis::Punctuation(tok.to_string()));
            if ends_segment(tok) {
                segments.push(std::mem::take(&mut current));
            }
        }
    }
    if !current.analyses.is_empty() {
        segments.push(current);
    }
    Paragraph { segments }
}
