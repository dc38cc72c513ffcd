//! Content rendering: raw document bytes to a viewer payload.
//!
//! Pure functions. Text documents pass through untouched; markdown becomes
//! an HTML fragment that the boundary wraps in its page layout.

use pulldown_cmark::{Options, Parser, html};

use crate::document::DocumentKind;
use crate::error::RenderError;

/// Declared content type of a rendered payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// Raw text, `text/plain`.
    PlainText,
    /// HTML fragment, `text/html`.
    Html,
}

impl ContentType {
    /// The MIME string.
    #[must_use]
    pub fn as_mime(self) -> &'static str {
        match self {
            Self::PlainText => "text/plain",
            Self::Html => "text/html",
        }
    }
}

/// A rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub body: Vec<u8>,
    pub content_type: ContentType,
}

/// Render document content of a known kind.
#[must_use]
pub fn render(content: &[u8], kind: DocumentKind) -> Rendered {
    let body = match kind {
        DocumentKind::Text => content.to_vec(),
        DocumentKind::Markdown => markdown_to_html(&String::from_utf8_lossy(content)).into_bytes(),
    };
    Rendered {
        body,
        content_type: kind.content_type(),
    }
}

/// Render a document, resolving its kind from the name.
///
/// # Errors
///
/// Returns [`RenderError::UnsupportedType`] when the extension is neither
/// `.txt` nor `.md`.
pub fn render_document(name: &str, content: &[u8]) -> Result<Rendered, RenderError> {
    let kind = DocumentKind::from_name(name).ok_or_else(|| RenderError::UnsupportedType {
        name: name.to_owned(),
    })?;
    Ok(render(content, kind))
}

/// Convert markdown source to an HTML fragment.
#[must_use]
pub fn markdown_to_html(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(source, options);
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
