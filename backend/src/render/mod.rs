//! File-content rendering pipeline
//!
//! A filename is classified into a [`RenderKind`]; code goes through the
//! syntax highlighter, Markdown and HTML get previews, notebooks are parsed
//! and rendered cell by cell. [`FileViewer`] ties these together.

pub mod highlight;
pub mod kind;
pub mod language;
pub mod markdown;
pub mod notebook;
pub mod viewer;

pub use highlight::{escape_html, highlight, stylesheet};
pub use kind::{RenderKind, classify};
pub use language::{LanguageId, resolve};
pub use markdown::{render_html_preview, render_markdown};
pub use notebook::{NotebookError, NotebookView};
pub use viewer::{FileRenderRequest, FileViewer, RenderedView, ViewBody, ViewMode};
