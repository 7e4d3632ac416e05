//! # repolens-detect-node
//!
//! Node/TypeScript ecosystem detector: one module per `package.json`, no
//! descent into a matched subtree. The manifest is parsed as JSON for name,
//! scripts, dependencies and engine constraints; frameworks are matched by
//! dependency-key substring in a fixed priority order, with React and Vue as
//! deliberate fallback-only entries (a UI library never overrides a detected
//! server framework).
//!
//! The build tool is chosen by the lockfile sitting next to the manifest
//! (pnpm over yarn over npm).

use std::path::Path;

use serde_json::Value;

use repolens_types::{BuildTool, Language, Module};
use repolens_walk::{find_manifest_dirs, relative_slash};

/// Dependency-key substring -> canonical framework name, priority order.
const FRAMEWORKS: &[(&str, &str)] = &[
    ("express", "Express"),
    ("nestjs", "NestJS"),
    ("next", "Next.js"),
];

/// Fallback-only UI libraries: consulted only when nothing above matched.
const FALLBACK_FRAMEWORKS: &[(&str, &str)] = &[("react", "React"), ("vue", "Vue")];

/// Scan the tree for Node modules.
pub fn detect(root: &Path) -> Vec<Module> {
    let mut modules = Vec::new();

    for hit in find_manifest_dirs(root, &["package.json"], None) {
        let content = std::fs::read_to_string(&hit.manifest).unwrap_or_default();
        let pkg: Value = serde_json::from_str(&content).unwrap_or_else(|err| {
            tracing::debug!(manifest = %hit.manifest.display(), %err, "malformed package.json, using defaults");
            Value::Null
        });

        let dir_name = hit
            .dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("module")
            .to_string();
        let name = pkg
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(dir_name);

        let dev_deps = pkg.get("devDependencies").and_then(Value::as_object);
        let language = if dev_deps.is_some_and(|d| d.contains_key("typescript")) {
            Language::TypeScript
        } else {
            Language::JavaScript
        };

        let language_version = pkg
            .get("engines")
            .and_then(|e| e.get("node"))
            .and_then(Value::as_str)
            .unwrap_or("18")
            .to_string();

        let (build_tool, build_command, test_command) = select_build_tool(&hit.dir);

        let mut framework = String::new();
        let mut framework_version = String::new();
        let mut dependencies = Vec::new();
        if let Some(deps) = pkg.get("dependencies").and_then(Value::as_object) {
            for (dep, ver) in deps {
                let ver = ver.as_str().unwrap_or_default();
                dependencies.push(format!("{dep}@{ver}"));
            }
            for table in [FRAMEWORKS, FALLBACK_FRAMEWORKS] {
                for (token, canonical) in table {
                    if !framework.is_empty() {
                        break;
                    }
                    for (dep, ver) in deps {
                        if dep.contains(token) {
                            framework = (*canonical).to_string();
                            framework_version = ver.as_str().unwrap_or_default().to_string();
                            break;
                        }
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

        tracing::debug!(module = %name, dir = %hit.dir.display(), "node module detected");

        modules.push(Module {
            name,
            manifest_path: relative_slash(root, &hit.manifest),
            language,
            language_version,
            build_tool,
            framework,
            framework_version,
            dependencies,
            build_command,
            test_command,
            dockerfile_path,
            builder_image: "node:18-alpine".to_string(),
            runtime_image: "node:18-alpine".to_string(),
            artifact_path: "dist".to_string(),
            app_port: "3000".to_string(),
        });
    }

    modules
}

/// Lockfile-driven build tool selection: pnpm over yarn over npm.
fn select_build_tool(dir: &Path) -> (BuildTool, String, String) {
    if dir.join("pnpm-lock.yaml").is_file() {
        (
            BuildTool::Pnpm,
            "pnpm install && pnpm run build".to_string(),
            "pnpm test".to_string(),
        )
    } else if dir.join("yarn.lock").is_file() {
        (
            BuildTool::Yarn,
            "yarn install && yarn build".to_string(),
            "yarn test".to_string(),
        )
    } else {
        (
            BuildTool::Npm,
            "npm install && npm run build".to_string(),
            "npm test".to_string(),
        )
    }
}
