use super::*;
use crate::test_support::DirGuard;
use serde_json::json;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

/// Helper to create a directory tree with empty files at the given paths.
fn make_tree(files: &[&str]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for file in files {
        let path = temp.path().join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, "").unwrap();
    }
    temp
}

// =========================================================================
// Partitioning and ordering
// =========================================================================

/// Test: literal path first, glob match next, exclusion drops only the glob match
#[test]
fn test_exclusion_applies_to_glob_matches() {
    let temp = make_tree(&["a.ts", "x.spec.ts", "skip.spec.ts"]);

    let files = expand_files_in(temp.path(), &["a.ts", "*.spec.ts", "!skip.spec.ts"]).unwrap();

    assert_eq!(files, vec!["a.ts", "x.spec.ts"]);
}

/// Test: a literal path is kept even when an exclusion names it
#[test]
fn test_exclusion_never_removes_literal_paths() {
    let temp = make_tree(&["skip.spec.ts"]);

    let files = expand_files_in(temp.path(), &["skip.spec.ts"]).unwrap();
    assert_eq!(files, vec!["skip.spec.ts"]);

    let files = expand_files_in(temp.path(), &["skip.spec.ts", "!skip.spec.ts"]).unwrap();
    assert_eq!(files, vec!["skip.spec.ts"]);
}

#[test]
fn test_no_patterns() {
    let temp = make_tree(&["a.ts"]);
    let none: [&str; 0] = [];

    assert!(expand_files_in(temp.path(), &none).unwrap().is_empty());
    assert!(
        expand_files_in(temp.path(), &patterns_from_value(None))
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_literal_paths_are_not_checked() {
    let temp = make_tree(&[]);

    let files = expand_files_in(temp.path(), &["does/not/exist.ts"]).unwrap();

    assert_eq!(files, vec!["does/not/exist.ts"]);
}

#[test]
fn test_literal_paths_come_before_glob_matches() {
    let temp = make_tree(&["a.ts", "x.spec.ts", "tests/unit/b.ts"]);

    let files = expand_files_in(
        temp.path(),
        &["*.spec.ts", "a.ts", "tests/**/*.ts", "README.md"],
    )
    .unwrap();

    assert_eq!(
        files,
        vec!["a.ts", "README.md", "x.spec.ts", "tests/unit/b.ts"]
    );
}

#[test]
fn test_each_pattern_appends_in_order() {
    let temp = make_tree(&["b/one.ts", "a/two.ts"]);

    let files = expand_files_in(temp.path(), &["b/*.ts", "a/*.ts"]).unwrap();

    assert_eq!(files, vec!["b/one.ts", "a/two.ts"]);
}

#[test]
fn test_only_exclusions_gives_nothing() {
    let temp = make_tree(&["a.ts"]);

    let files = expand_files_in(temp.path(), &["!a.ts", "!*.ts"]).unwrap();

    assert!(files.is_empty());
}

// =========================================================================
// Glob semantics
// =========================================================================

#[test]
fn test_single_star_does_not_cross_directories() {
    let temp = make_tree(&["tests/top.ts", "tests/unit/nested.ts"]);

    let files = expand_files_in(temp.path(), &["tests/*.ts"]).unwrap();

    assert_eq!(files, vec!["tests/top.ts"]);
}

#[test]
fn test_globstar_with_directory_exclusion() {
    let temp = make_tree(&[
        "tests/unit/a.ts",
        "tests/unit/b.ts",
        "tests/fixtures/f.ts",
    ]);

    let files = expand_files_in(temp.path(), &["tests/**/*.ts", "!tests/fixtures/**"]).unwrap();

    assert_eq!(files, vec!["tests/unit/a.ts", "tests/unit/b.ts"]);
}

#[test]
fn test_trailing_globstar_includes_base_directory() {
    let temp = make_tree(&["src/a.ts", "src/sub/b.ts"]);

    let files = expand_files_in(temp.path(), &["src/**"]).unwrap();

    assert_eq!(files, vec!["src", "src/a.ts", "src/sub", "src/sub/b.ts"]);
}

#[test]
fn test_trailing_globstar_base_directory_can_be_excluded() {
    let temp = make_tree(&["src/a.ts"]);

    let files = expand_files_in(temp.path(), &["src/**", "!src"]).unwrap();

    assert_eq!(files, vec!["src/a.ts"]);
}

#[test]
fn test_bare_globstar_does_not_include_root() {
    let temp = make_tree(&["a.ts"]);

    let files = expand_files_in(temp.path(), &["**"]).unwrap();

    assert_eq!(files, vec!["a.ts"]);
}

#[cfg(unix)]
#[test]
fn test_escaped_metacharacter_names_a_literal_directory() {
    let temp = make_tree(&["a*b/x.ts", "a/xb/y.ts"]);

    let files = expand_files_in(temp.path(), &[r"a\*b/*.ts"]).unwrap();

    assert_eq!(files, vec!["a*b/x.ts"]);
}

#[test]
fn test_brace_alternation() {
    let temp = make_tree(&["a.ts", "b.ts", "c.ts"]);

    let files = expand_files_in(temp.path(), &["{a,c}.ts"]).unwrap();

    assert_eq!(files, vec!["a.ts", "c.ts"]);
}

#[test]
fn test_dot_entries_need_explicit_dot() {
    let temp = make_tree(&["visible.ts", ".hidden.ts", ".cache/x.ts"]);

    let files = expand_files_in(temp.path(), &["**/*.ts"]).unwrap();
    assert_eq!(files, vec!["visible.ts"]);

    let files = expand_files_in(temp.path(), &[".*.ts"]).unwrap();
    assert_eq!(files, vec![".hidden.ts"]);
}

#[test]
fn test_missing_base_directory_matches_nothing() {
    let temp = make_tree(&["a.ts"]);

    let files = expand_files_in(temp.path(), &["nope/*.ts"]).unwrap();

    assert!(files.is_empty());
}

#[test]
fn test_absolute_pattern_returns_absolute_paths() {
    let temp = make_tree(&["src/a.ts"]);
    let root = temp.path().to_string_lossy().replace('\\', "/");
    let pattern = format!("{}/src/*.ts", root);

    let files = expand_files_in(Path::new("/unused"), &[pattern]).unwrap();

    assert_eq!(files, vec![format!("{}/src/a.ts", root)]);
}

#[test]
fn test_malformed_glob_is_error() {
    let temp = make_tree(&["a.ts"]);

    let err = expand_files_in(temp.path(), &["*.{ts,js"]).unwrap_err();

    assert!(matches!(err, ResolveError::Pattern(_)));
}

#[test]
fn test_malformed_exclusion_is_error() {
    let temp = make_tree(&["a.ts"]);

    let err = expand_files_in(temp.path(), &["*.ts", "!*.{ts"]).unwrap_err();

    assert!(matches!(err, ResolveError::Pattern(_)));
    assert!(err.to_string().contains("exclusion"));
}

#[test]
#[serial]
fn test_expand_files_uses_working_directory() {
    let temp = make_tree(&["unit/a.ts", "unit/b.ts"]);
    let _guard = DirGuard::new(temp.path());

    let files = expand_files(&["unit/*.ts", "!unit/b.ts"]).unwrap();

    assert_eq!(files, vec!["unit/a.ts"]);
}

// =========================================================================
// Helpers
// =========================================================================

#[test]
fn test_has_glob_magic() {
    assert!(has_glob_magic("*.ts"));
    assert!(has_glob_magic("tests/unit/?.ts"));
    assert!(has_glob_magic("tests/[ab].ts"));
    assert!(has_glob_magic("{a,b}.ts"));
    assert!(has_glob_magic("tests/**"));

    assert!(!has_glob_magic("tests/unit/a.ts"));
    assert!(!has_glob_magic("tests/{a}.ts"));
    assert!(!has_glob_magic("tests/[a.ts"));
    assert!(!has_glob_magic(r"tests/\*.ts"));
    assert!(!has_glob_magic(""));
}

#[test]
fn test_patterns_from_value() {
    assert_eq!(patterns_from_value(None), Vec::<String>::new());
    assert_eq!(patterns_from_value(Some(&json!(null))), Vec::<String>::new());
    assert_eq!(patterns_from_value(Some(&json!("a.ts"))), vec!["a.ts"]);
    assert_eq!(
        patterns_from_value(Some(&json!(["a.ts", 3, "!b.ts"]))),
        vec!["a.ts", "!b.ts"]
    );
}
