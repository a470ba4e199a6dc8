//! Filename extension to highlighting language

use serde::Serialize;

/// Languages the extension table knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageId {
    TypeScript,
    JavaScript,
    Python,
    Ruby,
    Go,
    Rust,
    Java,
    Kotlin,
    Swift,
    C,
    Cpp,
    CSharp,
    Php,
    Html,
    Css,
    Scss,
    Less,
    Json,
    Yaml,
    Xml,
    Markdown,
    Sql,
    Bash,
    Dockerfile,
    Makefile,
    Toml,
    Ini,
    R,
    Dart,
    Lua,
    Perl,
    Elixir,
    Erlang,
    Haskell,
    Clojure,
    Scala,
    Hcl,
}

impl LanguageId {
    /// Look up a lowercased extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        let lang = match ext {
            "ts" | "tsx" => Self::TypeScript,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "py" => Self::Python,
            "rb" => Self::Ruby,
            "go" => Self::Go,
            "rs" => Self::Rust,
            "java" => Self::Java,
            "kt" | "kts" => Self::Kotlin,
            "swift" => Self::Swift,
            "c" | "h" => Self::C,
            "cpp" | "cc" | "cxx" | "hpp" => Self::Cpp,
            "cs" => Self::CSharp,
            "php" => Self::Php,
            "html" | "htm" | "vue" | "svelte" => Self::Html,
            "css" => Self::Css,
            "scss" => Self::Scss,
            "less" => Self::Less,
            "json" => Self::Json,
            "yaml" | "yml" => Self::Yaml,
            "xml" | "svg" => Self::Xml,
            "md" | "mdx" => Self::Markdown,
            "sql" => Self::Sql,
            "sh" | "bash" | "zsh" => Self::Bash,
            "dockerfile" => Self::Dockerfile,
            "makefile" => Self::Makefile,
            "toml" => Self::Toml,
            "ini" => Self::Ini,
            "r" => Self::R,
            "dart" => Self::Dart,
            "lua" => Self::Lua,
            "pl" | "perl" => Self::Perl,
            "ex" | "exs" => Self::Elixir,
            "erl" => Self::Erlang,
            "hs" => Self::Haskell,
            "clj" => Self::Clojure,
            "scala" => Self::Scala,
            "tf" => Self::Hcl,
            _ => return None,
        };
        Some(lang)
    }

    /// Stable identifier, as exposed to clients
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Ruby => "ruby",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::Java => "java",
            Self::Kotlin => "kotlin",
            Self::Swift => "swift",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::CSharp => "csharp",
            Self::Php => "php",
            Self::Html => "html",
            Self::Css => "css",
            Self::Scss => "scss",
            Self::Less => "less",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Xml => "xml",
            Self::Markdown => "markdown",
            Self::Sql => "sql",
            Self::Bash => "bash",
            Self::Dockerfile => "dockerfile",
            Self::Makefile => "makefile",
            Self::Toml => "toml",
            Self::Ini => "ini",
            Self::R => "r",
            Self::Dart => "dart",
            Self::Lua => "lua",
            Self::Perl => "perl",
            Self::Elixir => "elixir",
            Self::Erlang => "erlang",
            Self::Haskell => "haskell",
            Self::Clojure => "clojure",
            Self::Scala => "scala",
            Self::Hcl => "hcl",
        }
    }

    /// Token handed to the grammar lookup (extension or grammar name)
    pub(crate) fn grammar_token(self) -> &'static str {
        match self {
            Self::TypeScript => "ts",
            Self::JavaScript => "js",
            Self::Python => "py",
            Self::Ruby => "rb",
            Self::Rust => "rs",
            Self::Kotlin => "kt",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::CSharp => "cs",
            Self::Yaml => "yaml",
            Self::Markdown => "md",
            Self::Bash => "sh",
            Self::Makefile => "Makefile",
            Self::Haskell => "hs",
            Self::Clojure => "clj",
            Self::Erlang => "erl",
            Self::Perl => "pl",
            Self::Elixir => "ex",
            Self::Hcl => "tf",
            other => other.as_str(),
        }
    }
}

/// Final path segment of `filename`
pub(crate) fn base_name(filename: &str) -> &str {
    filename.rsplit('/').next().unwrap_or(filename)
}

/// Resolve the highlighting language for a filename.
///
/// The text after the last `.` is lowercased and looked up. A name without
/// a dot is looked up whole, so `Dockerfile` and `Makefile` resolve.
/// `None` means no opinion: callers fall back to automatic detection.
pub fn resolve(filename: &str) -> Option<LanguageId> {
    let name = base_name(filename);
    let ext = match name.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => name,
    };
    if ext.is_empty() {
        return None;
    }
    LanguageId::from_extension(&ext.to_ascii_lowercase())
}
