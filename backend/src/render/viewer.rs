//! File viewer: picks a renderer for a file and tracks preview/code mode

use serde::{Deserialize, Serialize};

use super::highlight::highlight;
use super::kind::{RenderKind, classify};
use super::language::{LanguageId, resolve};
use super::markdown::{render_html_preview, render_markdown};
use super::notebook::{self, NotebookView, PARSE_FAILURE_MESSAGE, parse_failure_html};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Preview,
    Code,
}

impl ViewMode {
    fn default_for(kind: RenderKind) -> Self {
        if kind.has_preview() {
            Self::Preview
        } else {
            Self::Code
        }
    }
}

/// A file as fetched, ready to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRenderRequest {
    pub filename: String,
    pub content: String,
}

/// Viewer state for the file currently shown.
///
/// Files with a preview start in `Preview` and may switch to `Code`.
/// Plain code files only have `Code`.
#[derive(Debug, Clone)]
pub struct FileViewer {
    file: FileRenderRequest,
    kind: RenderKind,
    mode: ViewMode,
}

impl FileViewer {
    pub fn open(filename: impl Into<String>, content: impl Into<String>) -> Self {
        let file = FileRenderRequest {
            filename: filename.into(),
            content: content.into(),
        };
        let kind = classify(&file.filename);
        Self {
            file,
            kind,
            mode: ViewMode::default_for(kind),
        }
    }

    /// Replace the file; the mode resets to the new kind's default
    pub fn load(&mut self, filename: impl Into<String>, content: impl Into<String>) {
        *self = Self::open(filename, content);
    }

    pub fn kind(&self) -> RenderKind {
        self.kind
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn file(&self) -> &FileRenderRequest {
        &self.file
    }

    pub fn has_toggle(&self) -> bool {
        self.kind.has_preview()
    }

    /// Switch mode. Returns false (and stays in `Code`) when asking for a
    /// preview of a plain code file.
    pub fn set_mode(&mut self, mode: ViewMode) -> bool {
        if mode == ViewMode::Preview && !self.has_toggle() {
            return false;
        }
        self.mode = mode;
        true
    }

    pub fn toggle(&mut self) -> ViewMode {
        if self.has_toggle() {
            self.mode = match self.mode {
                ViewMode::Preview => ViewMode::Code,
                ViewMode::Code => ViewMode::Preview,
            };
        }
        self.mode
    }

    pub fn line_count(&self) -> usize {
        self.file.content.split('\n').count()
    }

    pub fn language(&self) -> Option<LanguageId> {
        resolve(&self.file.filename)
    }

    /// Render the current file in the current mode
    pub fn render(&self) -> RenderedView {
        let body = match (self.mode, self.kind) {
            (ViewMode::Code, _) | (ViewMode::Preview, RenderKind::Code) => ViewBody::Code {
                lines: highlight(&self.file.content, self.language()),
            },
            (ViewMode::Preview, RenderKind::Markdown) => ViewBody::Markdown {
                html: render_markdown(&self.file.content),
            },
            (ViewMode::Preview, RenderKind::Html) => ViewBody::Html {
                html: render_html_preview(&self.file.content),
            },
            (ViewMode::Preview, RenderKind::Notebook) => match notebook::render(&self.file.content) {
                Ok(view) => ViewBody::Notebook {
                    html: view.to_html(),
                    notebook: view,
                },
                Err(e) => {
                    tracing::debug!("Notebook {} failed to parse: {e}", self.file.filename);
                    ViewBody::NotebookError {
                        message: PARSE_FAILURE_MESSAGE.to_string(),
                        html: parse_failure_html(),
                    }
                }
            },
        };

        RenderedView {
            filename: self.file.filename.clone(),
            kind: self.kind,
            mode: self.mode,
            toggle: self.has_toggle(),
            language: self.language(),
            line_count: self.line_count(),
            body,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedView {
    pub filename: String,
    pub kind: RenderKind,
    pub mode: ViewMode,
    /// Whether a preview/code toggle is offered
    pub toggle: bool,
    pub language: Option<LanguageId>,
    pub line_count: usize,
    pub body: ViewBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ViewBody {
    Code { lines: Vec<String> },
    Markdown { html: String },
    Html { html: String },
    Notebook { notebook: NotebookView, html: String },
    NotebookError { message: String, html: String },
}
