use std::fs;
use std::path::Path;

use dirsift::{
    digest, ContentReader, DigestConfig, DigestError, DigestItem, FinalStatus, ItemType, PathState,
    Results,
};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Create a temporary directory tree for testing.
///
/// Structure:
/// ```text
/// tmp/
///   README.md
///   main.py
///   app.log
///   notes.txt
///   src/
///     lib.py
///     util.rs
///     gen/
///       out.py
///   tests/
///     unit.py
///     other.py
///   node_modules/
///     pkg/
///       index.js
///   build/
///     artifact.txt
///   .git/
///     config
/// ```
fn setup_test_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    fs::write(root.join("README.md"), "# readme").unwrap();
    fs::write(root.join("main.py"), "print('hi')").unwrap();
    fs::write(root.join("app.log"), "log line").unwrap();
    fs::write(root.join("notes.txt"), "some notes").unwrap();

    fs::create_dir_all(root.join("src/gen")).unwrap();
    fs::write(root.join("src/lib.py"), "def f(): pass").unwrap();
    fs::write(root.join("src/util.rs"), "fn util() {}").unwrap();
    fs::write(root.join("src/gen/out.py"), "x = 1").unwrap();

    fs::create_dir(root.join("tests")).unwrap();
    fs::write(root.join("tests/unit.py"), "assert True").unwrap();
    fs::write(root.join("tests/other.py"), "assert 1").unwrap();

    fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
    fs::write(root.join("node_modules/pkg/index.js"), "module.exports = {}").unwrap();

    fs::create_dir(root.join("build")).unwrap();
    fs::write(root.join("build/artifact.txt"), "built").unwrap();

    fs::create_dir(root.join(".git")).unwrap();
    fs::write(root.join(".git/config"), "[core]").unwrap();

    dir
}

fn included_paths(results: &Results) -> Vec<&str> {
    results.included().map(|i| i.event.path.as_str()).collect()
}

fn state(results: &Results, path: &str) -> (PathState, PathState) {
    let item = results.get(path).unwrap_or_else(|| panic!("no event for {path}"));
    (item.event.state, item.event.decided_by)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn default_run_skips_default_ignores() {
    let dir = setup_test_dir();
    let results = digest(dir.path()).run().unwrap();

    assert_eq!(
        included_paths(&results),
        [
            "README.md",
            "main.py",
            "notes.txt",
            "src/gen/out.py",
            "src/lib.py",
            "src/util.rs",
            "tests/other.py",
            "tests/unit.py",
        ]
    );
    assert_eq!(state(&results, "app.log").1, PathState::DefaultExcluded);
    assert_eq!(state(&results, "build").1, PathState::DefaultExcluded);
    assert_eq!(state(&results, "node_modules").1, PathState::DefaultExcluded);

    // Pruned subtrees get no events of their own.
    assert!(results.get("node_modules/pkg").is_none());
    assert!(results.get("build/artifact.txt").is_none());
    assert!(results.errors.is_empty());
}

#[test]
fn hidden_directories_are_default_excluded() {
    let dir = setup_test_dir();
    let results = digest(dir.path()).run().unwrap();

    let git = results.get(".git").unwrap();
    assert_eq!(git.event.state, PathState::FinalExcluded);
    assert_eq!(git.event.decided_by, PathState::DefaultExcluded);
    assert_eq!(git.event.item_type, ItemType::Folder);
    assert!(results.get(".git/config").is_none());
}

#[test]
fn disabling_default_ignores_includes_everything() {
    let dir = setup_test_dir();
    let results = digest(dir.path()).no_default_ignore(true).run().unwrap();

    let included = included_paths(&results);
    assert!(included.contains(&".git/config"));
    assert!(included.contains(&"app.log"));
    assert!(included.contains(&"node_modules/pkg/index.js"));
    assert_eq!(results.stats.excluded_items, 0);
}

#[test]
fn deeper_include_rescues_a_file_in_an_excluded_directory() {
    let dir = setup_test_dir();
    let results = digest(dir.path())
        .includes(["tests/unit.py", "*.py"])
        .exclude("tests/")
        .argv(["dirsift", "-i", "tests/unit.py", "-i", "*.py", "-x", "tests/"])
        .run()
        .unwrap();

    assert_eq!(
        included_paths(&results),
        ["main.py", "src/gen/out.py", "src/lib.py", "tests/unit.py"]
    );
    assert_eq!(
        state(&results, "tests"),
        (PathState::TraverseButExcludeSelf, PathState::UserExcludedDirectly)
    );
    assert_eq!(
        state(&results, "tests/other.py"),
        (PathState::FinalExcluded, PathState::UserExcludedBySpecificity)
    );
    assert_eq!(
        state(&results, "README.md"),
        (PathState::FinalExcluded, PathState::ImplicitlyExcludedFinalStep)
    );
    assert_eq!(
        state(&results, "src"),
        (PathState::TraverseButExcludeSelf, PathState::ImplicitlyExcludedFinalStep)
    );
}

#[test]
fn exclude_only_run_keeps_the_rest() {
    let dir = setup_test_dir();
    let results = digest(dir.path()).exclude("*.txt").run().unwrap();

    let notes = results.get("notes.txt").unwrap();
    assert_eq!(notes.event.decided_by, PathState::UserExcludedDirectly);
    assert!(notes.event.reason.contains("*.txt"));
    assert!(results.get("README.md").unwrap().event.is_included());
}

#[test]
fn include_overrides_a_default_ignore() {
    let dir = setup_test_dir();
    let results = digest(dir.path()).include("build/").run().unwrap();

    assert_eq!(included_paths(&results), ["build", "build/artifact.txt"]);
    assert_eq!(
        state(&results, "build/artifact.txt").1,
        PathState::OverriddenDefaultExcludeByUserInclude
    );
}

#[test]
fn conflicting_patterns_are_reported() {
    let dir = setup_test_dir();
    let results = digest(dir.path())
        .include("notes.txt")
        .exclude("notes.txt")
        .run()
        .unwrap();

    let notes = results.get("notes.txt").unwrap();
    assert_eq!(notes.event.state, PathState::ErrorConflictingPatterns);
    assert_eq!(notes.event.status, FinalStatus::Error);
    assert_eq!(notes.content, None);
}

#[test]
fn max_depth_prunes_deep_directories() {
    let dir = setup_test_dir();
    let results = digest(dir.path()).max_depth(1).run().unwrap();

    assert!(results.get("src").unwrap().event.is_included());
    let nested = results.get("src/gen").unwrap();
    assert_eq!(nested.event.state, PathState::FinalExcluded);
    assert!(nested.event.reason.starts_with("Exceeds max depth"));
    assert!(results.get("src/gen/out.py").is_none());
    assert!(results.get("src/lib.py").unwrap().event.is_included());
}

#[test]
fn oversized_files_are_excluded() {
    let dir = setup_test_dir();
    fs::write(dir.path().join("big.txt"), vec![b'a'; 3 * 1024]).unwrap();

    let results = digest(dir.path()).max_size_kb(2).run().unwrap();
    let big = results.get("big.txt").unwrap();
    assert_eq!(big.event.state, PathState::FinalExcluded);
    assert_eq!(big.event.reason, "Exceeds max size (3.0KB > 2KB)");
    assert_eq!(big.content, None);
}

#[test]
fn undecodable_files_follow_the_read_error_policy() {
    let dir = setup_test_dir();
    fs::write(dir.path().join("blob.txt"), [0xff, 0xfe, 0xfd]).unwrap();

    let results = digest(dir.path()).run().unwrap();
    let blob = results.get("blob.txt").unwrap();
    assert_eq!(blob.event.state, PathState::FinalExcluded);
    assert!(blob.event.reason.starts_with("invalid UTF-8"), "{}", blob.event.reason);

    let results = digest(dir.path()).ignore_read_errors(true).run().unwrap();
    let blob = results.get("blob.txt").unwrap();
    assert_eq!(blob.event.state, PathState::FinalIncluded);
    assert_eq!(blob.content, None);
    assert!(blob.read_error.is_some());
}

#[test]
fn custom_reader_is_used() {
    struct Shouting;
    impl ContentReader for Shouting {
        fn read(&self, path: &Path) -> Result<String, DigestError> {
            let text = fs::read_to_string(path).map_err(|source| DigestError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(text.to_uppercase())
        }
    }

    let dir = setup_test_dir();
    let results = digest(dir.path()).include("notes.txt").reader(Shouting).run().unwrap();
    assert_eq!(
        results.get("notes.txt").unwrap().content.as_deref(),
        Some("SOME NOTES")
    );
}

#[test]
fn output_file_is_never_part_of_the_digest() {
    let dir = setup_test_dir();
    let results = digest(dir.path())
        .output_file(dir.path().join("README.md"))
        .run()
        .unwrap();

    assert_eq!(
        state(&results, "README.md"),
        (PathState::FinalExcluded, PathState::UserExcludedDirectly)
    );
}

#[test]
fn stats_are_populated() {
    let dir = setup_test_dir();
    let results = digest(dir.path()).run().unwrap();

    assert_eq!(results.stats.included_files, 8);
    // app.log, build/, node_modules/, .git/
    assert_eq!(results.stats.excluded_items, 4);
    assert!(results.stats.total_content_size_kb > 0.0);
    assert!(results.stats.duration.as_nanos() > 0);
}

#[test]
fn folder_sizes_when_requested() {
    let dir = setup_test_dir();
    let results = digest(dir.path()).dir_sizes(true).run().unwrap();
    assert!(results.get("src").unwrap().event.size_kb > 0.0);

    let results = digest(dir.path()).run().unwrap();
    assert_eq!(results.get("src").unwrap().event.size_kb, 0.0);
}

// ── Drivers ───────────────────────────────────────────────────────────────────

#[test]
fn sequential_and_parallel_walks_agree() {
    let dir = setup_test_dir();
    let summary = |items: &[DigestItem]| -> Vec<(String, PathState, PathState)> {
        let mut rows: Vec<_> = items
            .iter()
            .map(|i| (i.event.path.clone(), i.event.state, i.event.decided_by))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    };

    let parallel = digest(dir.path()).include("*.py").exclude("src/gen/").threads(4).run().unwrap();
    let walk = digest(dir.path()).include("*.py").exclude("src/gen/").walk().unwrap();
    let sequential: Vec<DigestItem> = walk.map(Result::unwrap).collect();

    assert_eq!(summary(&sequential), summary(&parallel.items));
}

#[test]
fn walk_is_lazy() {
    let dir = setup_test_dir();
    let mut walk = digest(dir.path()).walk().unwrap();

    let first: Vec<_> = walk.by_ref().take(2).collect::<Result<_, _>>().unwrap();
    assert_eq!(first.len(), 2);
    let seen = walk.stats().included_files + walk.stats().excluded_items;
    assert!(seen <= 2, "only pulled entries are counted, saw {seen}");
}

#[test]
fn walk_counts_match_the_parallel_run() {
    let dir = setup_test_dir();
    let mut walk = digest(dir.path()).walk().unwrap();
    for item in walk.by_ref() {
        item.unwrap();
    }
    let results = digest(dir.path()).run().unwrap();

    assert_eq!(walk.stats().included_files, results.stats.included_files);
    assert_eq!(walk.stats().excluded_items, results.stats.excluded_items);
}

#[test]
fn bad_roots_are_rejected() {
    let dir = setup_test_dir();

    let missing = digest(dir.path().join("missing")).run();
    assert!(matches!(missing, Err(DigestError::NotFound(_))));

    let file = digest(dir.path().join("README.md")).walk();
    assert!(matches!(file, Err(DigestError::NotADirectory(_))));
}

#[test]
fn configuration_layer_settings_apply() {
    let config: DigestConfig = serde_json::from_str(
        r#"{ "include": ["*.py"], "exclude": ["tests/"], "max_size_kb": 1 }"#,
    )
    .unwrap();

    let dir = setup_test_dir();
    let results = digest(dir.path()).config(config).run().unwrap();

    // No argument order to go by, so excludes come first and unmatched
    // files stay in.
    assert!(results.get("README.md").unwrap().event.is_included());
    assert!(!results.get("tests/unit.py").unwrap().event.is_included());
}

// ── Output shape ──────────────────────────────────────────────────────────────

#[test]
fn items_serialize_flat() {
    let dir = setup_test_dir();
    let results = digest(dir.path()).run().unwrap();

    let value = serde_json::to_value(results.get("main.py").unwrap()).unwrap();
    assert_eq!(value["path"], "main.py");
    assert_eq!(value["item_type"], "file");
    assert_eq!(value["status"], "included");
    assert_eq!(value["state"], "FINAL_INCLUDED");
    assert_eq!(value["decided_by"], "FINAL_INCLUDED");
    assert_eq!(value["content"], "print('hi')");
    assert!(value["read_error"].is_null());

    let value = serde_json::to_value(results.get("build").unwrap()).unwrap();
    assert_eq!(value["item_type"], "folder");
    assert_eq!(value["decided_by"], "DEFAULT_EXCLUDED");
    assert_eq!(value["exclude_pattern"], "**/build/");
}

#[test]
fn logging_does_not_disturb_results() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("dirsift=trace")
        .with_test_writer()
        .try_init();

    let dir = setup_test_dir();
    let results = digest(dir.path()).include("src/[oops").run().unwrap();
    // A malformed pattern matches nothing, so the include-only run keeps nothing.
    assert!(included_paths(&results).is_empty());
}

// ── Symlinks ──────────────────────────────────────────────────────────────────

#[cfg(unix)]
#[test]
fn symlinks_are_excluded_unless_followed() {
    let dir = setup_test_dir();
    std::os::unix::fs::symlink(dir.path().join("src"), dir.path().join("link")).unwrap();

    let results = digest(dir.path()).run().unwrap();
    let link = results.get("link").unwrap();
    assert_eq!(link.event.state, PathState::FinalExcluded);
    assert_eq!(link.event.item_type, ItemType::Folder);
    assert!(link.event.reason.contains("symlink"));
    assert!(results.get("link/lib.py").is_none());

    let results = digest(dir.path()).follow_symlinks(true).run().unwrap();
    assert!(results.get("link").unwrap().event.is_included());
    assert!(results.get("link/lib.py").unwrap().event.is_included());
}
