//! Directory entry classification.

use pkgtree_core::FileInfo;

/// Conventional name for directories containing test data; never scanned.
pub const TESTDATA_DIR: &str = "testdata";

/// Prefix stripped from paths to form import paths.
pub const SRC_PREFIX: &str = "/src/";

const SOURCE_EXT: &str = ".go";
const TEST_SUFFIX: &str = "_test.go";

/// A non-hidden file with the source extension.
pub fn is_source_file(fi: &FileInfo) -> bool {
    !fi.is_dir && !fi.name.starts_with('.') && fi.name.ends_with(SOURCE_EXT)
}

/// A source file that is not a test.
pub fn is_pkg_file(fi: &FileInfo) -> bool {
    is_source_file(fi) && !fi.name.ends_with(TEST_SUFFIX)
}

/// A directory that may hold packages: not `_`- or `.`-prefixed.
pub fn is_pkg_dir(fi: &FileInfo) -> bool {
    fi.is_dir && !fi.name.is_empty() && !fi.name.starts_with(['_', '.'])
}

/// Import path for `path`: the source prefix trimmed, then cleaned.
pub fn import_path(path: &str) -> String {
    clean(path.strip_prefix(SRC_PREFIX).unwrap_or(path))
}

/// Lexically clean a slash-separated path.
///
/// Repeated slashes collapse, `.` segments drop and `..` consumes the
/// preceding segment. An empty result becomes `.`.
pub fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            _ => segments.push(segment),
        }
    }
    let joined = segments.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Join a directory path and an entry name.
pub fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}
