//! Notebook renderer: notebook JSON to a view model and its markup

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::highlight::escape_html;
use super::markdown::{attribute_escape, render_markdown};
use crate::models::{CellType, NotebookDocument, Output, RichOutput};

/// Message shown in place of a notebook that cannot be parsed
pub const PARSE_FAILURE_MESSAGE: &str = "Unable to parse this notebook.";

#[derive(Debug, Error)]
pub enum NotebookError {
    #[error("invalid notebook JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("notebook has no cells field")]
    MissingCells,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotebookView {
    pub kernel: String,
    pub cells: Vec<CellView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellView {
    pub label: &'static str,
    /// `[n]`, only for code cells with an execution count
    pub execution_marker: Option<String>,
    pub body: CellBody,
    pub outputs: Vec<OutputView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum CellBody {
    /// Rendered Markdown
    Markdown(String),
    /// Source shown verbatim
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum OutputView {
    Text(String),
    Html(String),
    /// `data:` URI of a decoded PNG
    Image(String),
    Error(String),
}

/// Parse and render a notebook
pub fn render(raw: &str) -> Result<NotebookView, NotebookError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if value.get("cells").is_none() {
        return Err(NotebookError::MissingCells);
    }
    let document: NotebookDocument = serde_json::from_value(value)?;

    Ok(NotebookView {
        kernel: document.kernel_name().to_string(),
        cells: document.cells.iter().map(render_cell).collect(),
    })
}

fn render_cell(cell: &crate::models::Cell) -> CellView {
    let source = cell.source.joined();
    let execution_marker = match (cell.cell_type, cell.execution_count) {
        (CellType::Code, Some(n)) => Some(format!("[{n}]")),
        _ => None,
    };
    let body = match cell.cell_type {
        CellType::Markdown => CellBody::Markdown(render_markdown(&source)),
        CellType::Code | CellType::Raw => CellBody::Literal(source),
    };

    CellView {
        label: cell.cell_type.label(),
        execution_marker,
        body,
        outputs: cell.outputs.iter().filter_map(render_output).collect(),
    }
}

fn render_output(output: &Output) -> Option<OutputView> {
    match output {
        Output::Stream(text) => Some(OutputView::Text(text.clone())),
        Output::Rich(RichOutput::Html(html)) => Some(OutputView::Html(html.clone())),
        Output::Rich(RichOutput::Png(encoded)) => {
            let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
            match STANDARD.decode(compact.as_bytes()) {
                Ok(bytes) => Some(OutputView::Image(format!(
                    "data:image/png;base64,{}",
                    STANDARD.encode(bytes)
                ))),
                Err(e) => {
                    debug!("Skipping undecodable notebook image: {e}");
                    None
                }
            }
        }
        Output::Rich(RichOutput::Plain(text)) => Some(OutputView::Text(text.clone())),
        Output::Error(traceback) => Some(OutputView::Error(strip_ansi(&traceback.join("\n")))),
    }
}

/// Remove terminal control sequences (`ESC [` ... final byte). Any other
/// escape character is left in place along with the text after it.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('\x1b') {
        result.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        match csi_len(after) {
            Some(len) => rest = &after[len..],
            None => {
                result.push('\x1b');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

/// Length of a CSI body (`[`, parameter and intermediate bytes, final byte)
/// at the start of `s`
fn csi_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'[') {
        return None;
    }
    for (i, &b) in bytes.iter().enumerate().skip(1) {
        match b {
            0x20..=0x3f => {}
            0x40..=0x7e => return Some(i + 1),
            _ => return None,
        }
    }
    None
}

impl NotebookView {
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        out.push_str("<div class=\"notebook\">\n");
        out.push_str(&format!(
            "<div class=\"notebook-meta\"><span class=\"notebook-kernel\">Kernel: {}</span> \
             <span class=\"notebook-cell-count\">{} cells</span></div>\n",
            escape_html(&self.kernel),
            self.cells.len()
        ));

        for cell in &self.cells {
            out.push_str("<div class=\"notebook-cell\">\n<div class=\"notebook-cell-header\">");
            out.push_str(&format!("<span>{}</span>", cell.label));
            if let Some(marker) = &cell.execution_marker {
                out.push_str(&format!(
                    "<span class=\"notebook-exec\">{}</span>",
                    escape_html(marker)
                ));
            }
            out.push_str("</div>\n<div class=\"notebook-cell-content\">");
            match &cell.body {
                CellBody::Markdown(html) => {
                    out.push_str(&format!("<div class=\"markdown-body\">{html}</div>"));
                }
                CellBody::Literal(text) => {
                    out.push_str(&format!("<pre><code>{}</code></pre>", escape_html(text)));
                }
            }
            out.push_str("</div>\n");

            if !cell.outputs.is_empty() {
                out.push_str("<div class=\"notebook-output\">\n");
                for output in &cell.outputs {
                    match output {
                        OutputView::Text(text) => {
                            out.push_str(&format!("<pre>{}</pre>\n", escape_html(text)));
                        }
                        OutputView::Html(html) => {
                            out.push_str(&format!("<div>{html}</div>\n"));
                        }
                        OutputView::Image(src) => {
                            out.push_str(&format!(
                                "<img src=\"{}\" alt=\"output\">\n",
                                attribute_escape(src)
                            ));
                        }
                        OutputView::Error(text) => {
                            out.push_str(&format!(
                                "<pre class=\"notebook-error\">{}</pre>\n",
                                escape_html(text)
                            ));
                        }
                    }
                }
                out.push_str("</div>\n");
            }
            out.push_str("</div>\n");
        }

        out.push_str("</div>\n");
        out
    }
}

/// Markup shown instead of an unparseable notebook
pub fn parse_failure_html() -> String {
    format!("<div class=\"notebook-parse-error\">{PARSE_FAILURE_MESSAGE}</div>")
}
