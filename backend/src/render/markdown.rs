//! Markdown and HTML previews
//!
//! Markdown goes through CommonMark with tables and strikethrough. Raw HTML
//! embedded in the source passes through untouched, since content comes from
//! the owner's own repositories; link and image targets using a script
//! scheme are neutralised. Fenced code is highlighted.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};

use super::highlight::highlight_block;

/// Schemes that never survive as link or image targets
const BLOCKED_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:text/html"];

fn options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts
}

fn is_blocked(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    BLOCKED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    if is_blocked(&url) {
        CowStr::Borrowed("#")
    } else {
        url
    }
}

/// Render Markdown source to HTML
pub fn render_markdown(source: &str) -> String {
    let mut events: Vec<Event<'_>> = Vec::new();
    let mut fence: Option<(Option<String>, String)> = None;

    for event in Parser::new_ext(source, options()) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                fence = Some((lang, String::new()));
            }
            Event::Text(text) if fence.is_some() => {
                if let Some((_, buf)) = fence.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                let Some((lang, code)) = fence.take() else {
                    continue;
                };
                let class = lang
                    .as_deref()
                    .map(|l| format!(" class=\"language-{}\"", attribute_escape(l)))
                    .unwrap_or_default();
                let body = highlight_block(&code, lang.as_deref());
                events.push(Event::Html(CowStr::from(format!(
                    "<pre><code{class}>{body}</code></pre>\n"
                ))));
            }
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => events.push(Event::Start(Tag::Link {
                link_type,
                dest_url: safe_url(dest_url),
                title,
                id,
            })),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => events.push(Event::Start(Tag::Image {
                link_type,
                dest_url: safe_url(dest_url),
                title,
                id,
            })),
            other => events.push(other),
        }
    }

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

/// Escape text for use inside a double- or single-quoted attribute
pub fn attribute_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Embed an HTML document in a sandboxed frame.
///
/// Scripts may run, but without `allow-same-origin` the frame gets an
/// opaque origin: no access to the host's cookies or storage.
pub fn render_html_preview(document: &str) -> String {
    format!(
        "<iframe class=\"html-preview\" title=\"HTML Preview\" sandbox=\"allow-scripts\" \
         referrerpolicy=\"no-referrer\" srcdoc=\"{}\"></iframe>",
        attribute_escape(document)
    )
}
