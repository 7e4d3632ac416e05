//! # repolens-detect-go
//!
//! Go ecosystem detector: finds `go.mod` manifests anywhere in the tree
//! (shared walker policy, no depth cap), parses module path, declared Go
//! version and requirement lines, and maps well-known import paths to a web
//! framework. One module per Go workspace directory - after a `go.mod` hit
//! the subtree below it is not searched again.
//!
//! The parser is best-effort: an unreadable or malformed `go.mod` still
//! registers a module with ecosystem defaults.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use repolens_types::{BuildTool, Language, Module};
use repolens_walk::{find_manifest_dirs, relative_slash};

/// Import-path substring -> canonical framework name, in evaluation order.
/// First match per dependency position wins; the slot is never overwritten.
const FRAMEWORKS: &[(&str, &str)] = &[
    ("gin-gonic/gin", "gin"),
    ("labstack/echo", "echo"),
    ("gofiber/fiber", "fiber"),
];

/// Fields extracted from a `go.mod`, all optional.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GoModInfo {
    pub module_path: Option<String>,
    pub go_version: Option<String>,
    /// `(import path, version)` pairs in file order.
    pub requirements: Vec<(String, String)>,
}

fn module_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^module\s+(\S+)").expect("module regex"))
}

fn version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^go\s+([0-9]+\.[0-9]+)").expect("go version regex"))
}

fn require_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*(?:require\s+)?([A-Za-z0-9.\-_/]+)\s+(v[0-9][0-9A-Za-z.\-+]*)")
            .expect("require regex")
    })
}

/// Best-effort structural parse of a `go.mod`. Never fails; missing pieces
/// stay `None` / empty.
pub fn parse_go_mod(content: &str) -> GoModInfo {
    let module_path = module_re()
        .captures(content)
        .map(|c| c[1].to_string());
    let go_version = version_re()
        .captures(content)
        .map(|c| c[1].to_string());

    let mut requirements = Vec::new();
    for caps in require_re().captures_iter(content) {
        let path = caps[1].to_string();
        // "go 1.22" style lines never carry a v-prefixed version, but a
        // stray match on the module line would: requirements need a slash.
        if !path.contains('/') {
            continue;
        }
        requirements.push((path, caps[2].to_string()));
    }

    GoModInfo {
        module_path,
        go_version,
        requirements,
    }
}

/// Scan the tree for Go modules.
pub fn detect(root: &Path) -> Vec<Module> {
    let mut modules = Vec::new();

    for hit in find_manifest_dirs(root, &["go.mod"], None) {
        let content = std::fs::read_to_string(&hit.manifest).unwrap_or_else(|err| {
            tracing::warn!(manifest = %hit.manifest.display(), %err, "unreadable go.mod, using defaults");
            String::new()
        });
        let info = parse_go_mod(&content);

        let dir_name = hit
            .dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("module")
            .to_string();
        let name = info
            .module_path
            .as_deref()
            .and_then(|p| p.rsplit('/').next())
            .map(str::to_string)
            .unwrap_or(dir_name);

        let mut builder_image = "golang:alpine".to_string();
        let language_version = info.go_version.clone().unwrap_or_default();
        if !language_version.is_empty() {
            builder_image = format!("golang:{language_version}-alpine");
        }

        let mut framework = String::new();
        let mut framework_version = String::new();
        let mut dependencies = Vec::with_capacity(info.requirements.len());
        for (path, version) in &info.requirements {
            dependencies.push(format!("{path}@{version}"));
            if framework.is_empty() {
                for (token, canonical) in FRAMEWORKS {
                    if path.contains(token) {
                        framework = (*canonical).to_string();
                        framework_version = version.clone();
                        break;
                    }
                }
            }
        }

        let dockerfile = hit.dir.join("Dockerfile");
        let dockerfile_path = if dockerfile.is_file() {
            Some(relative_slash(root, &dockerfile))
        } else {
            None
        };

        tracing::debug!(module = %name, dir = %hit.dir.display(), "go module detected");

        modules.push(Module {
            name,
            manifest_path: relative_slash(root, &hit.manifest),
            language: Language::Go,
            language_version,
            build_tool: BuildTool::GoModules,
            framework,
            framework_version,
            dependencies,
            build_command: "go build -o app ./...".to_string(),
            test_command: "go test ./...".to_string(),
            dockerfile_path,
            builder_image,
            runtime_image: "alpine:latest".to_string(),
            artifact_path: "./app".to_string(),
            app_port: "8080".to_string(),
        });
    }

    modules
}
