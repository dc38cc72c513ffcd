//! Document names and kinds.
//!
//! A document is identified by its file name. The extension decides how it
//! is rendered and is resolved once into a [`DocumentKind`].

use crate::error::ValidationError;
use crate::render::ContentType;

/// Extensions accepted when creating or renaming a document.
pub const ALLOWED_EXTENSIONS: [&str; 2] = [".txt", ".md"];

/// How a document is rendered, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// `.txt`, served verbatim as `text/plain`.
    Text,
    /// `.md`, converted to HTML.
    Markdown,
}

impl DocumentKind {
    /// Resolve the kind of a document from its name.
    ///
    /// Returns `None` for any extension other than `.txt` and `.md`
    /// (matching is case-sensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match extension(name) {
            ".txt" => Some(Self::Text),
            ".md" => Some(Self::Markdown),
            _ => None,
        }
    }

    /// The extension, including the leading dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => ".txt",
            Self::Markdown => ".md",
        }
    }

    /// The declared type of the rendered payload.
    #[must_use]
    pub fn content_type(self) -> ContentType {
        match self {
            Self::Text => ContentType::PlainText,
            Self::Markdown => ContentType::Html,
        }
    }
}

/// Return the extension of `name` including its leading dot, or `""`.
///
/// A leading dot alone does not start an extension, so `.txt` has none.
#[must_use]
pub fn extension(name: &str) -> &str {
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match file.rfind('.') {
        Some(0) | None => "",
        Some(dot) => &file[dot..],
    }
}

/// Check a name proposed for creating or renaming a document.
///
/// Returns the first problem found, or `None` when the name is acceptable.
/// This is advisory: callers run it before `create_empty` and `rename`,
/// and content updates of existing documents skip it.
#[must_use]
pub fn validate_name(name: &str) -> Option<ValidationError> {
    if name.trim().is_empty() {
        Some(ValidationError::new("A name is required."))
    } else if !ALLOWED_EXTENSIONS.contains(&extension(name)) {
        Some(ValidationError::new(
            "File name needs to end with .txt or .md",
        ))
    } else {
        None
    }
}

/// Derive the name of a duplicate: `{base}_copy{ext}`.
#[must_use]
pub fn copy_name(name: &str) -> String {
    let ext = extension(name);
    let base = &name[..name.len() - ext.len()];
    format!("{base}_copy{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_is_required() {
        let err = validate_name("").map(|e| e.message().to_owned());
        assert_eq!(err.as_deref(), Some("A name is required."));

        let err = validate_name("   ").map(|e| e.message().to_owned());
        assert_eq!(err.as_deref(), Some("A name is required."));
    }

    #[test]
    fn name_without_allowed_extension_is_rejected() {
        for name in ["foo", "foo.rb", "foo.TXT", ".txt", "foo.txt.bak"] {
            let err = validate_name(name).map(|e| e.message().to_owned());
            assert_eq!(
                err.as_deref(),
                Some("File name needs to end with .txt or .md"),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn allowed_names_pass() {
        assert_eq!(validate_name("foo.txt"), None);
        assert_eq!(validate_name("about.md"), None);
        assert_eq!(validate_name("release.notes.md"), None);
    }

    #[test]
    fn extension_includes_the_dot() {
        assert_eq!(extension("about.md"), ".md");
        assert_eq!(extension("archive.tar.gz"), ".gz");
        assert_eq!(extension("README"), "");
        assert_eq!(extension(".bashrc"), "");
    }

    #[test]
    fn kind_is_resolved_from_the_extension() {
        assert_eq!(DocumentKind::from_name("history.txt"), Some(DocumentKind::Text));
        assert_eq!(DocumentKind::from_name("about.md"), Some(DocumentKind::Markdown));
        assert_eq!(DocumentKind::from_name("logo.png"), None);
        assert_eq!(DocumentKind::Text.content_type().as_mime(), "text/plain");
        assert_eq!(DocumentKind::Markdown.extension(), ".md");
    }

    #[test]
    fn copy_name_keeps_the_extension() {
        assert_eq!(copy_name("about.md"), "about_copy.md");
        assert_eq!(copy_name("history.txt"), "history_copy.txt");
        assert_eq!(copy_name("about_copy.md"), "about_copy_copy.md");
        assert_eq!(copy_name("README"), "README_copy");
    }
}
