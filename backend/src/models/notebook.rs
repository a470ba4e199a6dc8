//! Jupyter notebook document model
//!
//! Only the fields the renderer needs are read. Multiline text fields may be
//! either a list of strings or a single string, as the nbformat allows both.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Text stored either as a list of line fragments or as one string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MultilineText {
    Lines(Vec<String>),
    Single(String),
}

impl MultilineText {
    /// Concatenate the fragments verbatim
    pub fn joined(&self) -> String {
        match self {
            Self::Lines(lines) => lines.concat(),
            Self::Single(s) => s.clone(),
        }
    }
}

impl Default for MultilineText {
    fn default() -> Self {
        Self::Lines(Vec::new())
    }
}

/// Parsed notebook. `cells` is required; its order is the display order.
#[derive(Debug, Clone, Deserialize)]
pub struct NotebookDocument {
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub metadata: NotebookMetadata,
}

impl NotebookDocument {
    /// Kernel display name, falling back to the kernel name, then `Unknown`
    pub fn kernel_name(&self) -> &str {
        let spec = self.metadata.kernelspec.as_ref();
        spec.and_then(|k| k.display_name.as_deref())
            .filter(|s| !s.is_empty())
            .or_else(|| spec.and_then(|k| k.name.as_deref()).filter(|s| !s.is_empty()))
            .unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotebookMetadata {
    #[serde(default)]
    pub kernelspec: Option<KernelSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KernelSpec {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellType {
    Code,
    Markdown,
    Raw,
}

impl CellType {
    /// Unknown cell types are shown as raw text
    fn from_name(name: &str) -> Self {
        match name {
            "code" => Self::Code,
            "markdown" => Self::Markdown,
            _ => Self::Raw,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Code => "Code",
            Self::Markdown => "Markdown",
            Self::Raw => "Raw",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawCell")]
pub struct Cell {
    pub cell_type: CellType,
    pub source: MultilineText,
    pub outputs: Vec<Output>,
    pub execution_count: Option<i64>,
}

#[derive(Deserialize)]
struct RawCell {
    cell_type: String,
    #[serde(default)]
    source: MultilineText,
    #[serde(default)]
    outputs: Vec<RawOutput>,
    #[serde(default)]
    execution_count: Option<i64>,
}

impl From<RawCell> for Cell {
    fn from(raw: RawCell) -> Self {
        Self {
            cell_type: CellType::from_name(&raw.cell_type),
            source: raw.source,
            outputs: raw.outputs.into_iter().filter_map(Output::from_raw).collect(),
            execution_count: raw.execution_count,
        }
    }
}

/// One cell output, classified by the first field that matches.
///
/// Match order: stream text, then rich data (`text/html`, `image/png`,
/// `text/plain`), then error traceback. Outputs matching none are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stream(String),
    Rich(RichOutput),
    Error(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RichOutput {
    Html(String),
    /// Base64 payload, not yet decoded
    Png(String),
    Plain(String),
}

impl RichOutput {
    fn from_data(data: &Map<String, Value>) -> Option<Self> {
        if let Some(html) = data.get("text/html").and_then(text_of) {
            return Some(Self::Html(html));
        }
        if let Some(png) = data.get("image/png").and_then(text_of) {
            return Some(Self::Png(png));
        }
        data.get("text/plain").and_then(text_of).map(Self::Plain)
    }
}

/// Text content of a MIME bundle entry; non-text payloads yield `None`
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items
            .iter()
            .map(|v| v.as_str())
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.concat()),
        _ => None,
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawOutput {
    #[serde(default)]
    text: Option<MultilineText>,
    #[serde(default)]
    data: Option<Map<String, Value>>,
    #[serde(default)]
    traceback: Option<Vec<String>>,
}

impl Output {
    fn from_raw(raw: RawOutput) -> Option<Self> {
        if let Some(text) = raw.text {
            return Some(Self::Stream(text.joined()));
        }
        if let Some(rich) = raw.data.as_ref().and_then(RichOutput::from_data) {
            return Some(Self::Rich(rich));
        }
        raw.traceback.map(Self::Error)
    }
}
