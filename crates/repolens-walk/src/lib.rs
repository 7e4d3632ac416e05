//! # repolens-walk
//!
//! **Tier 2 (Utilities)**
//!
//! Shared directory-walker policy for every scanner in repolens. All
//! traversals (the global stats pass and the four ecosystem detectors) must
//! prune identically, otherwise their views of the tree drift apart and the
//! merged result becomes incoherent.
//!
//! ## What belongs here
//! * The prune list for cache/build/VCS directories
//! * Vendored and generated path heuristics
//! * Deterministic manifest-directory search with prune-after-match
//!
//! ## What does NOT belong here
//! * Manifest parsing (ecosystem detector crates)
//! * Language classification (repolens-stats)

use std::fs;
use std::path::{Path, PathBuf};

/// Directory names that are never descended into: version control, IDE
/// metadata, dependency caches, build outputs, bytecode/test caches and CI
/// cache directories. `.github` is deliberately absent - workflow detection
/// needs it.
const PRUNED_DIRS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    ".idea",
    ".vscode",
    "node_modules",
    "vendor",
    "bower_components",
    "dist",
    "build",
    "target",
    "out",
    "__pycache__",
    ".pytest_cache",
    ".tox",
    ".venv",
    "venv",
    ".gradle",
    ".circleci",
];

/// Path segments that mark a vendored / third-party subtree.
const VENDORED_SEGMENTS: &[&str] = &[
    "vendor",
    "node_modules",
    "third_party",
    "thirdparty",
    "bower_components",
    "jspm_packages",
    "extern",
];

/// Exact file names that are machine-written and excluded from language
/// ratios.
const GENERATED_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "cargo.lock",
    "go.sum",
    "poetry.lock",
    "pipfile.lock",
    "composer.lock",
];

/// Whether a directory with this name must be pruned entirely.
pub fn should_prune(dir_name: &str) -> bool {
    PRUNED_DIRS.contains(&dir_name)
}

/// Whether a root-relative path sits inside a vendored / third-party tree,
/// or is a minified asset.
pub fn is_vendored(rel: &Path) -> bool {
    for segment in rel.iter() {
        if let Some(s) = segment.to_str() {
            if VENDORED_SEGMENTS.contains(&s) {
                return true;
            }
        }
    }
    let name = rel
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    name.ends_with(".min.js") || name.ends_with(".min.css")
}

/// Whether a root-relative path points at a generated file (lockfiles,
/// protobuf output and the like).
pub fn is_generated(rel: &Path) -> bool {
    let name = rel
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    GENERATED_FILES.contains(&name.as_str())
        || name.ends_with(".pb.go")
        || name.ends_with("_pb2.py")
        || name.contains(".generated.")
}

/// A manifest file found by [`find_manifest_dirs`].
#[derive(Debug, Clone)]
pub struct ManifestHit {
    /// Absolute path of the directory holding the manifest.
    pub dir: PathBuf,
    /// Absolute path of the manifest file itself.
    pub manifest: PathBuf,
    /// The target file name that matched (first in priority order).
    pub file_name: String,
    /// Path-segment distance of `dir` from the search root (root = 0).
    pub depth: usize,
}

/// Deterministic recursive search for ecosystem manifests.
///
/// Per directory, entries are visited in lexicographic order. When any of
/// `targets` is present (priority follows the `targets` slice), one hit is
/// recorded and the subtree below that directory is not descended into -
/// one module per workspace directory. Otherwise recursion continues into
/// non-pruned, non-vendored subdirectories up to `max_depth` path segments
/// from the root (`None` = unbounded).
///
/// Symlinked directories are never followed, which also rules out symlink
/// cycles without having to track inode identity. Unreadable directories
/// are skipped; the search never fails.
pub fn find_manifest_dirs(
    root: &Path,
    targets: &[&str],
    max_depth: Option<usize>,
) -> Vec<ManifestHit> {
    let mut hits = Vec::new();
    visit(root, root, targets, max_depth, 0, &mut hits);
    hits
}

fn visit(
    root: &Path,
    dir: &Path,
    targets: &[&str],
    max_depth: Option<usize>,
    depth: usize,
    hits: &mut Vec<ManifestHit>,
) {
    let entries = match fs::read_dir(dir) {
        Ok(iter) => iter,
        Err(err) => {
            tracing::debug!(dir = %dir.display(), %err, "skipping unreadable directory");
            return;
        }
    };

    let mut names: Vec<String> = Vec::new();
    for entry in entries.flatten() {
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    names.sort();

    // Manifest check first: a hit claims the whole subtree.
    for target in targets {
        if names.iter().any(|n| n == target) {
            let manifest = dir.join(target);
            if manifest.is_file() {
                hits.push(ManifestHit {
                    dir: dir.to_path_buf(),
                    manifest,
                    file_name: (*target).to_string(),
                    depth,
                });
                return;
            }
        }
    }

    for name in &names {
        if should_prune(name) {
            continue;
        }
        let child = dir.join(name);
        let meta = match fs::symlink_metadata(&child) {
            Ok(meta) => meta,
            Err(_) => continue,
        };
        if !meta.is_dir() || meta.file_type().is_symlink() {
            continue;
        }
        let rel = child.strip_prefix(root).unwrap_or(&child);
        if is_vendored(rel) {
            continue;
        }
        if let Some(limit) = max_depth {
            if depth + 1 > limit {
                continue;
            }
        }
        visit(root, &child, targets, max_depth, depth + 1, hits);
    }
}

/// Root-relative, `/`-separated rendering of `path` for reproducible output.
pub fn relative_slash(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.iter()
        .map(|s| s.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
