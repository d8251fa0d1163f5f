//! Package summarizer hook.

/// Precomputed description of a package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// One-line synopsis.
    pub synopsis: String,
    /// Whether the package appears in listings.
    pub show: bool,
}

impl Summary {
    /// A visible package with the given synopsis.
    pub fn new(synopsis: impl Into<String>) -> Self {
        Self {
            synopsis: synopsis.into(),
            show: true,
        }
    }

    /// A package hidden from listings.
    pub fn hidden(synopsis: impl Into<String>) -> Self {
        Self {
            synopsis: synopsis.into(),
            show: false,
        }
    }
}

/// Fast path that describes a package without reading its files.
///
/// Returning `None` makes the builder fall back to parsing the
/// directory's source files.
pub trait PackageSummarizer: Send + Sync + 'static {
    /// Summarize the package at `import_path`.
    fn summarize(&self, import_path: &str) -> Option<Summary>;
}

impl<F> PackageSummarizer for F
where
    F: Fn(&str) -> Option<Summary> + Send + Sync + 'static,
{
    fn summarize(&self, import_path: &str) -> Option<Summary> {
        self(import_path)
    }
}
