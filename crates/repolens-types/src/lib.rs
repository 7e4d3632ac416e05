//! # repolens-types
//!
//! **Tier 0 (Core Types)**
//!
//! Data structures and the JSON output contract for `repolens`.
//! Downstream template generators key off the serialized field names, so the
//! contract is additive-only: new optional fields may appear, existing fields
//! are never removed or renamed.
//!
//! ## What belongs here
//! * Pure data structs with Serde derive
//! * The `Language` / `BuildTool` / `PipelineStrategy` vocabularies
//!
//! ## What does NOT belong here
//! * Filesystem traversal
//! * Manifest parsing
//! * CLI argument parsing

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Programming language of a detected module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Go,
    Python,
    Java,
    JavaScript,
    TypeScript,
    Kotlin,
    Unknown,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::Python => "python",
            Language::Java => "java",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Kotlin => "kotlin",
            Language::Unknown => "unknown",
        }
    }
}

/// Build tool driving a module's build and test commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildTool {
    Maven,
    Gradle,
    Npm,
    Yarn,
    Pnpm,
    Pip,
    Pipenv,
    Poetry,
    GoModules,
    Unknown,
}

impl BuildTool {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildTool::Maven => "maven",
            BuildTool::Gradle => "gradle",
            BuildTool::Npm => "npm",
            BuildTool::Yarn => "yarn",
            BuildTool::Pnpm => "pnpm",
            BuildTool::Pip => "pip",
            BuildTool::Pipenv => "pipenv",
            BuildTool::Poetry => "poetry",
            BuildTool::GoModules => "go-modules",
            BuildTool::Unknown => "unknown",
        }
    }
}

/// Pipeline strategy derived from the module count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStrategy {
    Monorepo,
    Standalone,
}

/// One buildable unit discovered in the repository, tied to exactly one
/// manifest file. Created once by a detector and never mutated afterwards.
///
/// `framework` and `framework_version` stay empty when nothing was detected;
/// `language`, `build_tool`, `build_command` and `test_command` are always
/// populated with ecosystem defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Module name, from the manifest when it declares one, otherwise the
    /// directory basename.
    pub name: String,

    /// Manifest path relative to the repository root, `/`-separated.
    pub manifest_path: String,

    pub language: Language,
    #[serde(default)]
    pub language_version: String,

    pub build_tool: BuildTool,

    #[serde(default)]
    pub framework: String,
    #[serde(default)]
    pub framework_version: String,

    /// Declared dependency identifiers in manifest order. Duplicates allowed.
    #[serde(default)]
    pub dependencies: Vec<String>,

    pub build_command: String,
    pub test_command: String,

    /// Set only when a Dockerfile sits next to the manifest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile_path: Option<String>,

    pub builder_image: String,
    pub runtime_image: String,
    pub artifact_path: String,
    pub app_port: String,
}

/// The full analysis output: sole contract with template-rendering
/// collaborators. Constructed once per run, then frozen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub repository_name: String,

    /// Language name -> percentage of classified source bytes.
    /// Only entries above the 1% noise floor are kept.
    pub languages_percent: BTreeMap<String, f64>,

    /// Detected infrastructure signals (Docker, Kubernetes, GitHub Actions,
    /// GitLab CI, Jenkins), sorted and deduplicated.
    pub infrastructure: Vec<String>,

    /// Detector run order: Go, Java, Node, Python.
    pub modules: Vec<Module>,

    pub pipeline_strategy: PipelineStrategy,

    #[serde(default)]
    pub main_framework: String,
    #[serde(default)]
    pub main_framework_version: String,
}

impl AnalysisResult {
    /// An empty result for a repository with no recognized ecosystem.
    /// This is a valid outcome, not an error.
    pub fn empty(repository_name: impl Into<String>) -> Self {
        Self {
            repository_name: repository_name.into(),
            languages_percent: BTreeMap::new(),
            infrastructure: Vec::new(),
            modules: Vec::new(),
            pipeline_strategy: PipelineStrategy::Standalone,
            main_framework: String::new(),
            main_framework_version: String::new(),
        }
    }
}
