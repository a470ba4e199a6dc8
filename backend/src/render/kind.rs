//! Filename to render kind

use serde::Serialize;

use super::language::base_name;

/// Which renderer handles a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderKind {
    Code,
    Markdown,
    Html,
    Notebook,
}

impl RenderKind {
    /// Whether a preview exists besides the raw code view
    pub fn has_preview(self) -> bool {
        self != Self::Code
    }
}

/// Classify a filename by suffix, case-insensitively. Defaults to `Code`.
pub fn classify(filename: &str) -> RenderKind {
    let lower = base_name(filename).to_ascii_lowercase();
    if lower.ends_with(".md") || lower.ends_with(".mdx") {
        RenderKind::Markdown
    } else if lower.ends_with(".html") || lower.ends_with(".htm") {
        RenderKind::Html
    } else if lower.ends_with(".ipynb") {
        RenderKind::Notebook
    } else {
        RenderKind::Code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_classify_examples() {
        assert_eq!(classify("x.md"), RenderKind::Markdown);
        assert_eq!(classify("x.MD"), RenderKind::Markdown);
        assert_eq!(classify("docs/page.mdx"), RenderKind::Markdown);
        assert_eq!(classify("x.html"), RenderKind::Html);
        assert_eq!(classify("index.HTM"), RenderKind::Html);
        assert_eq!(classify("x.ipynb"), RenderKind::Notebook);
        assert_eq!(classify("x.rs"), RenderKind::Code);
        assert_eq!(classify("README"), RenderKind::Code);
        assert_eq!(classify(".md"), RenderKind::Markdown);
        assert_eq!(classify("notes.md.bak"), RenderKind::Code);
    }

    #[test]
    fn test_has_preview() {
        assert!(!RenderKind::Code.has_preview());
        assert!(RenderKind::Markdown.has_preview());
        assert!(RenderKind::Html.has_preview());
        assert!(RenderKind::Notebook.has_preview());
    }

    proptest! {
        #[test]
        fn classify_is_deterministic(name in "\\PC{0,40}") {
            prop_assert_eq!(classify(&name), classify(&name));
        }

        #[test]
        fn classify_ignores_case(stem in "[a-zA-Z0-9_]{1,12}", ext in "(md|mdx|html|htm|ipynb|rs|txt)") {
            let lower = format!("{stem}.{ext}");
            let upper = format!("{stem}.{}", ext.to_uppercase());
            prop_assert_eq!(classify(&lower), classify(&upper));
        }
    }
}
