//! # repolens-core
//!
//! Orchestration of the repository composition analysis: runs the global
//! stats scanner and the four ecosystem detectors as independent read-only
//! traversals over the same root, merges their outputs in fixed ecosystem
//! order (Go, Java, Node, Python) and resolves the monorepo/standalone
//! classification and primary framework.
//!
//! The only hard failure is an unreadable repository root; everything else
//! degrades to a partial (possibly empty) result.

use std::path::Path;

use anyhow::{Context, Result, bail};

use repolens_types::{AnalysisResult, Module, PipelineStrategy};

/// Monorepo/standalone classification plus the primary framework choice.
///
/// Pure function over the merged module list: iterates in detector run
/// order and takes the first non-empty framework; when none is set, falls
/// back to the first module's (possibly empty) framework so downstream
/// consumers still see a consistent pair of fields.
pub fn resolve_composition(modules: &[Module]) -> (PipelineStrategy, String, String) {
    let strategy = if modules.len() > 1 {
        PipelineStrategy::Monorepo
    } else {
        PipelineStrategy::Standalone
    };

    let primary = modules
        .iter()
        .find(|m| !m.framework.is_empty())
        .or_else(|| modules.first());

    match primary {
        Some(module) => (
            strategy,
            module.framework.clone(),
            module.framework_version.clone(),
        ),
        None => (strategy, String::new(), String::new()),
    }
}

/// Analyze the repository rooted at `root`.
///
/// When `repository_name` is `None` the root directory's basename is used.
/// The scanner and detectors run as independent parallel tasks; their
/// outputs are merged only after each completes, so the result is
/// deterministic regardless of scheduling.
pub fn analyze(root: &Path, repository_name: Option<&str>) -> Result<AnalysisResult> {
    let meta = std::fs::metadata(root)
        .with_context(|| format!("cannot read repository root {}", root.display()))?;
    if !meta.is_dir() {
        bail!("repository root {} is not a directory", root.display());
    }
    // Surface permission errors up front instead of silently producing an
    // empty result from an unreadable tree.
    std::fs::read_dir(root)
        .with_context(|| format!("cannot list repository root {}", root.display()))?;

    let name = match repository_name {
        Some(name) => name.to_string(),
        None => root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("repository")
            .to_string(),
    };

    tracing::debug!(root = %root.display(), repository = %name, "starting analysis");

    let (stats, (go, (jvm, (node, python)))) = rayon::join(
        || repolens_stats::scan(root),
        || {
            rayon::join(
                || repolens_detect_go::detect(root),
                || {
                    rayon::join(
                        || repolens_detect_jvm::detect(root),
                        || {
                            rayon::join(
                                || repolens_detect_node::detect(root),
                                || repolens_detect_python::detect(root),
                            )
                        },
                    )
                },
            )
        },
    );

    // Fixed ecosystem order regardless of scheduling: Go, Java, Node, Python.
    let mut modules = Vec::with_capacity(go.len() + jvm.len() + node.len() + python.len());
    modules.extend(go);
    modules.extend(jvm);
    modules.extend(node);
    modules.extend(python);

    let (pipeline_strategy, main_framework, main_framework_version) =
        resolve_composition(&modules);

    tracing::debug!(
        modules = modules.len(),
        strategy = ?pipeline_strategy,
        "analysis complete"
    );

    Ok(AnalysisResult {
        repository_name: name,
        languages_percent: stats.languages_percent,
        infrastructure: stats.infrastructure,
        modules,
        pipeline_strategy,
        main_framework,
        main_framework_version,
    })
}
