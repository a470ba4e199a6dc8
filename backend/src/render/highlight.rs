//! Syntax highlighting adapter
//!
//! Produces class-annotated HTML split into lines. Never fails: when the
//! hinted grammar is missing or errors, automatic detection is tried, and
//! when that fails too the text is HTML-escaped without markup.

use std::sync::OnceLock;

use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use thiserror::Error;
use tracing::debug;

use super::language::LanguageId;

/// Prefix on every CSS class the highlighter emits
pub const CLASS_PREFIX: &str = "hl-";

/// Theme the stylesheet is generated from
const STYLESHEET_THEME: &str = "InspiredGitHub";

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static STYLESHEET: OnceLock<String> = OnceLock::new();

#[derive(Debug, Error)]
enum HighlightError {
    #[error("grammar failed: {0}")]
    Grammar(#[from] syntect::Error),

    #[error("line count changed: expected {expected}, got {actual}")]
    LineCount { expected: usize, actual: usize },
}

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn class_style() -> ClassStyle {
    ClassStyle::SpacedPrefixed {
        prefix: CLASS_PREFIX,
    }
}

/// CSS rules for the classes emitted by [`highlight`]
pub fn stylesheet() -> &'static str {
    STYLESHEET.get_or_init(|| {
        let themes = ThemeSet::load_defaults();
        let Some(theme) = themes
            .themes
            .get(STYLESHEET_THEME)
            .or_else(|| themes.themes.values().next())
        else {
            return String::new();
        };
        css_for_theme_with_class_style(theme, class_style()).unwrap_or_default()
    })
}

/// Escape `&`, `<` and `>`
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Highlight `text`, one markup string per `\n`-separated input line.
pub fn highlight(text: &str, hint: Option<LanguageId>) -> Vec<String> {
    let ss = syntax_set();
    let hinted = hint.and_then(|lang| find_grammar(ss, lang.grammar_token()));
    highlight_with_fallbacks(ss, text, hinted)
}

/// Highlight a fenced block whose info string names the language.
/// Returns the markup joined back into one string.
pub fn highlight_block(text: &str, token: Option<&str>) -> String {
    let ss = syntax_set();
    let hinted = token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .and_then(|t| {
            LanguageId::from_extension(&t.to_ascii_lowercase())
                .and_then(|lang| find_grammar(ss, lang.grammar_token()))
                .or_else(|| find_grammar(ss, t))
        });
    highlight_with_fallbacks(ss, text, hinted).join("\n")
}

fn highlight_with_fallbacks(
    ss: &SyntaxSet,
    text: &str,
    hinted: Option<&SyntaxReference>,
) -> Vec<String> {
    if let Some(syntax) = hinted {
        match highlight_with(ss, syntax, text) {
            Ok(lines) => return lines,
            Err(e) => debug!("Highlighting with {} failed: {e}", syntax.name),
        }
    }

    if let Some(syntax) = detect(ss, text) {
        match highlight_with(ss, syntax, text) {
            Ok(lines) => return lines,
            Err(e) => debug!("Highlighting with detected {} failed: {e}", syntax.name),
        }
    }

    escape_html(text).split('\n').map(str::to_string).collect()
}

fn highlight_with(
    ss: &SyntaxSet,
    syntax: &SyntaxReference,
    text: &str,
) -> Result<Vec<String>, HighlightError> {
    let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, ss, class_style());
    for line in LinesWithEndings::from(text) {
        generator.parse_html_for_line_which_includes_newline(line)?;
    }
    let html = generator.finalize();

    let lines = balance_lines(&html);
    let expected = text.split('\n').count();
    if lines.len() != expected {
        return Err(HighlightError::LineCount {
            expected,
            actual: lines.len(),
        });
    }
    Ok(lines)
}

/// Close the spans still open at the end of each line and reopen them at
/// the start of the next, so every line is well-formed on its own. The
/// generator emits `<span>` as its only tag and escapes all text.
fn balance_lines(html: &str) -> Vec<String> {
    let mut open: Vec<&str> = Vec::new();
    html.split('\n')
        .map(|line| {
            let mut out = String::with_capacity(line.len());
            for tag in &open {
                out.push_str(tag);
            }

            let mut rest = line;
            while let Some(start) = rest.find('<') {
                let Some(len) = rest[start..].find('>') else {
                    break;
                };
                let tag = &rest[start..=start + len];
                if tag.starts_with("</") {
                    open.pop();
                } else {
                    open.push(tag);
                }
                rest = &rest[start + len + 1..];
            }

            out.push_str(line);
            for _ in &open {
                out.push_str("</span>");
            }
            out
        })
        .collect()
}

fn find_grammar<'a>(ss: &'a SyntaxSet, token: &str) -> Option<&'a SyntaxReference> {
    ss.find_syntax_by_token(token)
        .or_else(|| ss.find_syntax_by_name(token))
        .filter(|s| !is_plain_text(ss, s))
}

fn is_plain_text(ss: &SyntaxSet, syntax: &SyntaxReference) -> bool {
    std::ptr::eq(syntax, ss.find_syntax_plain_text())
}

/// Pick a grammar from the content alone
fn detect<'a>(ss: &'a SyntaxSet, text: &str) -> Option<&'a SyntaxReference> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(syntax) = text
        .lines()
        .next()
        .and_then(|first| ss.find_syntax_by_first_line(first))
        .filter(|s| !is_plain_text(ss, s))
    {
        return Some(syntax);
    }

    sniff(trimmed).and_then(|token| find_grammar(ss, token))
}

/// Cheap content heuristics, most specific first
fn sniff(trimmed: &str) -> Option<&'static str> {
    let looks_like_json = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if looks_like_json && serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        return Some("json");
    }

    let sample: String = trimmed.lines().take(24).collect::<Vec<_>>().join("\n");
    let lower = sample.to_ascii_lowercase();

    if lower.starts_with("<!doctype html") || lower.starts_with("<html") {
        return Some("html");
    }
    if lower.starts_with("<?xml") || lower.starts_with("<svg") {
        return Some("xml");
    }

    let rust_hits = ["fn ", "let ", "mod ", "impl ", "use ", "pub "]
        .iter()
        .filter(|k| lower.contains(**k))
        .count();
    if rust_hits >= 2 && sample.contains('{') {
        return Some("rs");
    }

    if (lower.contains("def ") || lower.contains("import ")) && !sample.contains(';') {
        return Some("py");
    }

    if sample.lines().take(3).any(|l| l.trim_start().starts_with("diff --git ")) {
        return Some("diff");
    }

    None
}
