//! Source file discovery.
//!
//! Walks the configured include directories and collects every JS/TS file
//! that is not ignored. The result is sorted so extraction order, and with
//! it the generated catalogues, never depends on directory iteration order.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use colored::Colorize;
use glob::{Pattern, glob};
use walkdir::WalkDir;

use crate::config::TEST_FILE_PATTERNS;

const EXTRACTABLE_EXTENSIONS: &[&str] = &["tsx", "ts", "jsx", "js", "mjs", "cjs"];

/// Result of scanning files.
pub struct ScanResult {
    /// Sorted, deduplicated file paths.
    pub files: Vec<String>,
    pub skipped_count: usize,
}

/// Compiled ignore rules. Patterns with wildcards match the full path as a
/// glob; plain patterns are treated as directory prefixes under the base.
struct IgnoreSet {
    prefixes: Vec<PathBuf>,
    patterns: Vec<Pattern>,
}

impl IgnoreSet {
    fn compile(base_dir: &str, raw: &[String], ignore_test_files: bool, verbose: bool) -> Self {
        let mut prefixes = Vec::new();
        let mut patterns = Vec::new();

        for entry in raw {
            if !is_glob_pattern(entry) {
                prefixes.push(Path::new(base_dir).join(entry));
                continue;
            }
            match Pattern::new(entry) {
                Ok(pattern) => patterns.push(pattern),
                Err(e) => warn(verbose, &format!("Invalid ignore pattern '{entry}': {e}")),
            }
        }

        if ignore_test_files {
            // These are fixed strings, so compilation cannot fail.
            patterns.extend(TEST_FILE_PATTERNS.iter().filter_map(|p| Pattern::new(p).ok()));
        }

        Self { prefixes, patterns }
    }

    fn matches(&self, path: &Path) -> bool {
        if self.prefixes.iter().any(|prefix| path.starts_with(prefix)) {
            return true;
        }
        let path_str = path.to_string_lossy();
        self.patterns.iter().any(|p| p.matches(&path_str))
    }
}

pub fn scan_files(
    base_dir: &str,
    includes: &[String],
    ignore_patterns: &[String],
    ignore_test_files: bool,
    verbose: bool,
) -> ScanResult {
    let ignores = IgnoreSet::compile(base_dir, ignore_patterns, ignore_test_files, verbose);

    let mut files: BTreeSet<String> = BTreeSet::new();
    let mut skipped_count = 0;

    for root in resolve_includes(base_dir, includes, verbose) {
        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    skipped_count += 1;
                    warn(verbose, &format!("Cannot access path: {e}"));
                    continue;
                }
            };

            let path = entry.path();
            if ignores.matches(path) {
                continue;
            }
            if entry.file_type().is_file() && is_extractable_file(path) {
                files.insert(path.to_string_lossy().into_owned());
            }
        }
    }

    ScanResult {
        files: files.into_iter().collect(),
        skipped_count,
    }
}

/// Turn the include list into concrete directories to walk. An empty list
/// means the whole base directory; glob includes expand to every matching
/// directory.
fn resolve_includes(base_dir: &str, includes: &[String], verbose: bool) -> Vec<PathBuf> {
    if includes.is_empty() {
        return vec![PathBuf::from(base_dir)];
    }

    let mut roots = Vec::new();
    for include in includes {
        if !is_glob_pattern(include) {
            let path = Path::new(base_dir).join(include);
            if path.exists() {
                roots.push(path);
            } else {
                warn(
                    verbose,
                    &format!("Include path does not exist: {}", path.display()),
                );
            }
            continue;
        }

        let full_pattern = Path::new(base_dir).join(include);
        match glob(&full_pattern.to_string_lossy()) {
            Ok(entries) => roots.extend(entries.flatten().filter(|p| p.is_dir())),
            Err(e) => warn(verbose, &format!("Invalid glob pattern '{include}': {e}")),
        }
    }
    roots
}

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal directory paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

fn is_extractable_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| EXTRACTABLE_EXTENSIONS.contains(&ext))
}

fn warn(verbose: bool, message: &str) {
    if verbose {
        eprintln!("{} {}", "warning:".bold().yellow(), message);
    }
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    fn touch(path: PathBuf) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(path).unwrap();
    }

    fn scan(base: &Path, includes: &[&str], ignores: &[&str], skip_tests: bool) -> ScanResult {
        let includes: Vec<String> = includes.iter().map(|s| s.to_string()).collect();
        let ignores: Vec<String> = ignores.iter().map(|s| s.to_string()).collect();
        scan_files(base.to_str().unwrap(), &includes, &ignores, skip_tests, false)
    }

    #[test]
    fn test_collects_only_extractable_extensions() {
        let dir = tempdir().unwrap();
        touch(dir.path().join("app.tsx"));
        touch(dir.path().join("utils.ts"));
        touch(dir.path().join("legacy.cjs"));
        touch(dir.path().join("style.css"));

        let result = scan(dir.path(), &[], &[], false);

        assert_eq!(result.files.len(), 3);
        assert!(!result.files.iter().any(|f| f.ends_with("style.css")));
    }

    #[test]
    fn test_result_is_sorted() {
        let dir = tempdir().unwrap();
        touch(dir.path().join("zebra.ts"));
        touch(dir.path().join("alpha.ts"));
        touch(dir.path().join("mango.ts"));

        let result = scan(dir.path(), &[], &[], false);

        let names: Vec<&str> = result
            .files
            .iter()
            .map(|f| f.rsplit('/').next().unwrap())
            .collect();
        assert_eq!(names, vec!["alpha.ts", "mango.ts", "zebra.ts"]);
    }

    #[test]
    fn test_glob_ignore_pattern() {
        let dir = tempdir().unwrap();
        touch(dir.path().join("node_modules/lib.ts"));
        touch(dir.path().join("app.tsx"));

        let result = scan(dir.path(), &[], &["**/node_modules/**"], false);

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].ends_with("app.tsx"));
    }

    #[test]
    fn test_literal_include_limits_the_walk() {
        let dir = tempdir().unwrap();
        touch(dir.path().join("src/app.tsx"));
        touch(dir.path().join("lib/utils.ts"));

        let result = scan(dir.path(), &["src"], &[], false);

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].ends_with("src/app.tsx"));
    }

    #[test]
    fn test_glob_include_expands_to_directories() {
        let dir = tempdir().unwrap();
        touch(dir.path().join("src/app/page.tsx"));
        touch(dir.path().join("lib/utils.ts"));

        let result = scan(dir.path(), &["src/*"], &[], false);

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].ends_with("page.tsx"));
    }

    #[test]
    fn test_test_files_are_ignored_when_requested() {
        let dir = tempdir().unwrap();
        touch(dir.path().join("app.tsx"));
        touch(dir.path().join("app.test.tsx"));
        touch(dir.path().join("utils.spec.jsx"));
        touch(dir.path().join("__tests__/helper.test.ts"));

        let result = scan(dir.path(), &[], &[], true);

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].ends_with("app.tsx"));
    }

    #[test]
    fn test_test_files_are_kept_when_not_requested() {
        let dir = tempdir().unwrap();
        touch(dir.path().join("app.tsx"));
        touch(dir.path().join("app.test.tsx"));

        let result = scan(dir.path(), &[], &[], false);

        assert_eq!(result.files.len(), 2);
    }

    #[test]
    fn test_literal_ignore_is_a_directory_prefix() {
        let dir = tempdir().unwrap();
        touch(dir.path().join("src/components/Button.tsx"));
        touch(dir.path().join("src/generated/types.ts"));

        let result = scan(dir.path(), &["src"], &["src/generated"], false);

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].ends_with("Button.tsx"));
    }

    #[test]
    fn test_overlapping_includes_deduplicate() {
        let dir = tempdir().unwrap();
        touch(dir.path().join("src/components/Button.tsx"));

        let result = scan(dir.path(), &["src", "src/components"], &[], false);

        assert_eq!(result.files.len(), 1);
    }

    #[test]
    fn test_missing_include_yields_nothing() {
        let dir = tempdir().unwrap();
        touch(dir.path().join("app.ts"));

        let result = scan(dir.path(), &["does-not-exist"], &[], false);

        assert!(result.files.is_empty());
    }

    #[test]
    fn test_is_glob_pattern() {
        assert!(is_glob_pattern("src/*"));
        assert!(is_glob_pattern("src/**/*.tsx"));
        assert!(is_glob_pattern("file?.ts"));
        assert!(!is_glob_pattern("src"));
        assert!(!is_glob_pattern("app/[locale]"));
    }
}
