use std::io;
use std::sync::Arc;

use pkgtree_scan::{
    DirectoryNode, FileInfo, FileSystem, Gates, PackageSummarizer, RootType, Summary, TreeBuilder,
};
use pkgtree_vfs::MapFs;

fn builder(fs: impl FileSystem, max_depth: Option<u32>) -> Arc<TreeBuilder> {
    Arc::new(TreeBuilder::new(Arc::new(fs), Arc::new(Gates::new())).with_max_depth(max_depth))
}

async fn build(fs: MapFs, root: &str, max_depth: Option<u32>) -> Option<DirectoryNode> {
    builder(fs, max_depth).build(root).await
}

fn names(node: &DirectoryNode) -> Vec<&str> {
    node.children.iter().map(|c| c.name.as_str()).collect()
}

fn example_fs() -> MapFs {
    MapFs::new([
        ("src/a/a.go", "// Pkg A.\npackage a\n"),
        ("src/a/b/b.go", "// Pkg B.\npackage b\n"),
        ("src/a/testdata/junk.go", "// Junk.\npackage junk\n"),
    ])
}

/// A filesystem whose listing fails for one directory.
struct FailingFs {
    inner: MapFs,
    broken: &'static str,
}

impl FileSystem for FailingFs {
    fn stat(&self, path: &str) -> io::Result<FileInfo> {
        self.inner.stat(path)
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<FileInfo>> {
        if path == self.broken {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        self.inner.read_dir(path)
    }

    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        self.inner.read_file(path)
    }

    fn root_type(&self, path: &str) -> RootType {
        self.inner.root_type(path)
    }
}

#[tokio::test]
async fn test_example_scenario() {
    let tree = build(example_fs(), "/src/a", None).await.unwrap();

    assert_eq!(tree.path, "/src/a");
    assert_eq!(tree.import_path, "a");
    assert_eq!(tree.depth, 0);
    assert!(tree.has_pkg);
    assert_eq!(tree.synopsis, "Pkg A.");
    assert_eq!(names(&tree), ["b"]);

    let b = &tree.children[0];
    assert_eq!(b.path, "/src/a/b");
    assert_eq!(b.import_path, "a/b");
    assert_eq!(b.depth, 1);
    assert_eq!(b.synopsis, "Pkg B.");
    assert!(tree.lookup("/src/a/testdata").is_none());
}

#[tokio::test]
async fn test_testdata_excluded_at_any_depth() {
    let fs = MapFs::new([
        ("src/x/x.go", "package x"),
        ("src/x/y/testdata/ok.go", "package ok"),
        ("src/testdata/z/z.go", "package z"),
    ]);
    let tree = build(fs, "/src", None).await.unwrap();

    assert!(tree.iter(false).all(|d| d.name.as_str() != "testdata"));
    assert_eq!(names(&tree), ["x"]);
    assert!(tree.children[0].is_leaf());
}

#[tokio::test]
async fn test_synopsis_priority() {
    let fs = MapFs::new([
        ("src/foo/a.go", "// B.\npackage main\n"),
        ("src/foo/b.go", "// A.\npackage foo\n"),
        ("src/foo/c.go", "// C.\npackage foo\n"),
        ("src/tools/x.go", "// Other.\npackage other\n"),
        ("src/cmd/m.go", "// Other first.\npackage other\n"),
        ("src/cmd/n.go", "// Main second.\npackage main\n"),
    ]);
    let builder = builder(fs, None);
    let tree = Arc::clone(&builder).build("/src").await.unwrap();

    assert_eq!(tree.lookup("/src/foo").unwrap().synopsis, "A.");
    assert_eq!(tree.lookup("/src/tools").unwrap().synopsis, "Other.");
    assert_eq!(tree.lookup("/src/cmd").unwrap().synopsis, "Main second.");

    // c.go is never read once foo has a top-priority synopsis.
    assert_eq!(builder.progress().files_parsed, 5);
}

#[tokio::test]
async fn test_pruning() {
    let fs = MapFs::new([
        ("src/a/a.go", "package a"),
        ("src/docs/readme.txt", "not code"),
        ("src/docs/deep/more.txt", "still not code"),
        ("src/tests/t_test.go", "package tests"),
        ("src/broken/bad.go", "func main() {}"),
        ("src/nav/inner/inner.go", "// Inner.\npackage inner"),
    ]);
    let builder = builder(fs, None);
    let tree = Arc::clone(&builder).build("/src").await.unwrap();

    assert_eq!(names(&tree), ["a", "nav"]);
    assert!(!tree.has_pkg);

    let nav = tree.lookup("/src/nav").unwrap();
    assert!(!nav.has_pkg);
    assert_eq!(nav.synopsis, "");
    assert_eq!(names(nav), ["inner"]);

    assert_eq!(builder.progress().parse_errors, 1);
}

#[tokio::test]
async fn test_hidden_and_underscore_dirs_skipped() {
    let fs = MapFs::new([
        ("src/_obj/x.go", "package x"),
        ("src/.git/y.go", "package y"),
        ("src/ok/ok.go", "package ok"),
        ("src/ok/.hidden.go", "not even go"),
    ]);
    let builder = builder(fs, None);
    let tree = Arc::clone(&builder).build("/src").await.unwrap();

    assert_eq!(names(&tree), ["ok"]);
    assert_eq!(builder.progress().parse_errors, 0);
}

#[tokio::test]
async fn test_depth_bound() {
    let fs = MapFs::new([
        ("src/a/a.go", "package a"),
        ("src/a/b/b.go", "package b"),
        ("src/docs/readme.txt", "no code"),
    ]);
    let tree = build(fs, "/src", Some(1)).await.unwrap();

    assert!(tree.iter(false).all(|d| d.depth <= 1));
    assert_eq!(names(&tree), ["a", "docs"]);
    for child in &tree.children {
        assert!(child.is_leaf());
        assert!(child.has_pkg);
        assert_eq!(child.synopsis, "");
    }
}

#[tokio::test]
async fn test_depth_zero_is_optimistic_root() {
    let tree = build(example_fs(), "/src/a", Some(0)).await.unwrap();
    assert!(tree.is_leaf());
    assert!(tree.has_pkg);
    assert_eq!(tree.import_path, "a");
}

#[tokio::test]
async fn test_root_validation() {
    assert!(build(example_fs(), "/src/missing", None).await.is_none());
    assert!(build(example_fs(), "/src/a/a.go", None).await.is_none());

    let fs = MapFs::new([("src/_private/p.go", "package p")]);
    assert!(build(fs, "/src/_private", None).await.is_none());

    let fs = MapFs::new([("src/_private/p.go", "package p")]);
    assert!(build(fs, "/", None).await.is_none());

    let tree = build(example_fs(), "/", None).await.unwrap();
    assert_eq!(tree.name.as_str(), "/");
    assert_eq!(tree.import_path, "/");
    assert!(tree.lookup("/src/a/b").is_some());
}

#[tokio::test]
async fn test_summarizer_fast_path() {
    let fs = MapFs::new([
        ("src/a/a.go", "// From file.\npackage a"),
        ("src/hidden/h.go", "package hidden"),
        ("src/virtual/README", "no sources"),
        ("src/plain/p.go", "// Plain.\npackage plain"),
    ]);
    let summarizer: Arc<dyn PackageSummarizer> = Arc::new(|path: &str| match path {
        "a" => Some(Summary::new("From hook.")),
        "hidden" => Some(Summary::hidden("Internal.")),
        "virtual" => Some(Summary::new("")),
        _ => None,
    });

    let builder = Arc::new(
        TreeBuilder::new(Arc::new(fs), Arc::new(Gates::new())).with_summarizer(summarizer),
    );
    let tree = Arc::clone(&builder).build("/src").await.unwrap();

    let a = tree.lookup("/src/a").unwrap();
    assert_eq!(a.synopsis, "From hook.");
    assert!(a.has_pkg);

    let hidden = tree.lookup("/src/hidden").unwrap();
    assert!(!hidden.has_pkg);
    assert_eq!(hidden.synopsis, "Internal.");

    let virtual_pkg = tree.lookup("/src/virtual").unwrap();
    assert!(virtual_pkg.has_pkg);

    assert_eq!(tree.lookup("/src/plain").unwrap().synopsis, "Plain.");
    assert_eq!(builder.progress().files_parsed, 1);
}

#[tokio::test]
async fn test_listing_failure_prunes_only_that_branch() {
    let fs = FailingFs {
        inner: MapFs::new([
            ("src/good/g.go", "package good"),
            ("src/locked/l.go", "package locked"),
            ("src/locked/sub/s.go", "package sub"),
        ]),
        broken: "/src/locked",
    };
    let builder = Arc::new(
        TreeBuilder::new(Arc::new(fs), Arc::new(Gates::new())).with_verbose(true),
    );
    let tree = Arc::clone(&builder).build("/src").await.unwrap();

    assert_eq!(names(&tree), ["good"]);
    assert_eq!(builder.progress().read_errors, 1);
}

#[tokio::test]
async fn test_root_type_recorded() {
    let fs = example_fs()
        .with_root_type("/", RootType::Standard)
        .with_root_type("/src/a/b", RootType::External);
    let tree = build(fs, "/src/a", None).await.unwrap();

    assert_eq!(tree.root_type, RootType::Standard);
    assert_eq!(tree.children[0].root_type, RootType::External);
}

#[tokio::test]
async fn test_lookup_matches_iteration() {
    let fs = MapFs::new([
        ("src/a/a.go", "package a"),
        ("src/a/b/c/c.go", "package c"),
        ("src/a/b/d/d.go", "package d"),
        ("src/e/e.go", "package e"),
    ]);
    let tree = build(fs, "/", None).await.unwrap();

    let mut count = 0;
    for node in tree.iter(false) {
        assert_eq!(tree.lookup(&node.path), Some(node));
        count += 1;
    }
    assert_eq!(count, 7);
    assert_eq!(tree.iter(true).count(), 6);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slots_returned_after_failures() {
    let fs = FailingFs {
        inner: MapFs::new([
            ("src/good/g.go", "package good"),
            ("src/locked/l.go", "package locked"),
            ("src/bad/bad.go", "func main() {}"),
            ("src/bad/sub/s.go", "package sub"),
            ("src/open/open.go", "/* never closed\npackage open\n"),
        ]),
        broken: "/src/locked",
    };
    let gates = Arc::new(Gates::with_capacity(2, 2));
    let builder = Arc::new(TreeBuilder::new(Arc::new(fs), Arc::clone(&gates)));
    let tree = Arc::clone(&builder).build("/src").await.unwrap();

    assert_eq!(names(&tree), ["bad", "good"]);
    assert!(!tree.children[0].has_pkg);

    let progress = builder.progress();
    assert_eq!(progress.read_errors, 1);
    assert_eq!(progress.parse_errors, 2);

    assert_eq!(gates.available_io(), 2);
    assert_eq!(gates.available_workers(), 2);
}
