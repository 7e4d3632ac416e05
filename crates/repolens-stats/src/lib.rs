//! # repolens-stats
//!
//! Global repository statistics: a single tree pass that computes the
//! per-language byte share and collects infrastructure signals
//! (Docker, Kubernetes, CI systems).
//!
//! Language identification is delegated to `tokei`; this crate isolates that
//! dependency the same way it isolates the `ignore` walker configuration.
//! The scan never fails: unreadable files are skipped and the walk continues.
//!
//! ## What belongs here
//! * The flat tree walk and byte accounting
//! * Infrastructure filename/path patterns
//! * The programming / markup ratio filter
//!
//! ## What does NOT belong here
//! * Module detection (detector crates)
//! * Percentage consumers (repolens-core)

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use ignore::WalkBuilder;
use tokei::{Config, LanguageType};

/// Languages counted toward the byte ratio even though they are markup.
const MARKUP_ALLOWLIST: &[&str] = &["html", "css", "scss", "sass"];

/// tokei language names excluded from the ratio: data and prose formats
/// would otherwise dominate repositories with large configs or docs.
const NON_PROGRAMMING: &[&str] = &[
    "json",
    "json5",
    "yaml",
    "toml",
    "markdown",
    "org",
    "restructuredtext",
    "asciidoc",
    "plain text",
    "text",
    "xml",
    "svg",
    "ini",
];

/// Percentage noise floor: languages at or below this share are dropped.
const NOISE_FLOOR: f64 = 1.0;

/// Output of [`scan`]: owned by the invocation, no process-wide state.
#[derive(Debug, Clone, Default)]
pub struct GlobalStats {
    /// Language name -> percentage of classified source bytes (> 1% only).
    pub languages_percent: BTreeMap<String, f64>,
    /// Sorted, deduplicated infrastructure signal names.
    pub infrastructure: Vec<String>,
}

/// Single depth-first pass over the repository computing language byte
/// shares and infrastructure signals.
pub fn scan(root: &Path) -> GlobalStats {
    let mut lang_bytes: BTreeMap<String, u64> = BTreeMap::new();
    let mut total_bytes: u64 = 0;
    let mut infra: BTreeSet<&'static str> = BTreeSet::new();

    let config = Config::default();

    let mut builder = WalkBuilder::new(root);
    builder.hidden(false);
    builder.ignore(false);
    builder.parents(false);
    builder.git_ignore(false);
    builder.git_exclude(false);
    builder.git_global(false);
    builder.follow_links(false);
    builder.sort_by_file_name(|a, b| a.cmp(b));
    // Same pruning policy as the detector walks: named prunes plus
    // vendored path segments, so no traversal ever sees those subtrees.
    let prune_root = root.to_path_buf();
    builder.filter_entry(move |entry| {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            return true;
        }
        let name = entry.file_name().to_str().unwrap_or("");
        if repolens_walk::should_prune(name) {
            return false;
        }
        let rel = entry.path().strip_prefix(&prune_root).unwrap_or(entry.path());
        !repolens_walk::is_vendored(rel)
    });

    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(%err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }

        let path = entry.path();
        let rel = path.strip_prefix(root).unwrap_or(path);

        if let Some(signal) = infrastructure_signal(rel) {
            infra.insert(signal);
        }

        if repolens_walk::is_vendored(rel) || repolens_walk::is_generated(rel) {
            continue;
        }
        let size = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(_) => continue,
        };
        if size == 0 {
            continue;
        }

        // Extension first, content sniffing (shebang) as the fallback.
        let lang = LanguageType::from_path(path, &config).or_else(|| LanguageType::from_shebang(path));
        let Some(lang) = lang else { continue };
        if !counts_toward_ratio(lang) {
            continue;
        }

        *lang_bytes.entry(lang.name().to_string()).or_insert(0) += size;
        total_bytes += size;
    }

    let mut languages_percent = BTreeMap::new();
    if total_bytes > 0 {
        for (lang, bytes) in lang_bytes {
            let percent = (bytes as f64 / total_bytes as f64) * 100.0;
            if percent > NOISE_FLOOR {
                languages_percent.insert(lang, percent);
            }
        }
    }

    GlobalStats {
        languages_percent,
        infrastructure: infra.into_iter().map(str::to_string).collect(),
    }
}

/// Infrastructure signal for a root-relative file path, if any.
/// Matching is case-insensitive on the file name.
pub fn infrastructure_signal(rel: &Path) -> Option<&'static str> {
    let name = rel
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if name == "dockerfile" || name.starts_with("docker-compose") {
        return Some("Docker");
    }
    if name == "kustomization.yaml" || name.ends_with("chart.yaml") {
        return Some("Kubernetes");
    }
    if under_github_workflows(rel) {
        return Some("GitHub Actions");
    }
    if name == ".gitlab-ci.yml" {
        return Some("GitLab CI");
    }
    if name == "jenkinsfile" {
        return Some("Jenkins");
    }
    None
}

fn under_github_workflows(rel: &Path) -> bool {
    let mut parts = rel.iter().filter_map(|s| s.to_str());
    parts.next() == Some(".github") && parts.next() == Some("workflows")
}

/// Whether a classified language participates in the byte ratio: anything
/// tokei knows that is not a data/prose format, plus the markup allow-list.
fn counts_toward_ratio(lang: LanguageType) -> bool {
    let name = lang.name().to_ascii_lowercase();
    if MARKUP_ALLOWLIST.contains(&name.as_str()) {
        return true;
    }
    !NON_PROGRAMMING.contains(&name.as_str())
}
