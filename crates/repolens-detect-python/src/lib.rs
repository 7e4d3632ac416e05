//! # repolens-detect-python
//!
//! Python ecosystem detector: one module per `requirements.txt`, `Pipfile`
//! or `pyproject.toml` within three path segments of the root. The build
//! tool and its install/test commands are selected purely by which manifest
//! filename matched; the framework comes from a line scan shared by all
//! three formats (framework name as a bare token or followed by a version
//! pin operator, version extracted only from exact `==` pins).

use std::path::Path;

use repolens_types::{BuildTool, Language, Module};
use repolens_walk::{find_manifest_dirs, relative_slash};

const MAX_DEPTH: usize = 3;

/// Known Python web frameworks, scanned in order; first hit wins.
const FRAMEWORKS: &[&str] = &[
    "django",
    "flask",
    "fastapi",
    "tornado",
    "pyramid",
    "starlette",
    "sanic",
];

/// Line scan over manifest content for a known framework. Lines are
/// lowercased and trimmed; comments and blanks are skipped. A framework
/// counts when it appears as a bare token or followed by a pin operator
/// (`=`, `>`, `<`, optionally after whitespace, which also covers
/// `flask = "^2.0"` pyproject entries). The version is reported only for
/// exact `==` pins.
pub fn detect_framework(content: &str) -> Option<(String, String)> {
    for raw in content.lines() {
        let line = raw.trim().to_ascii_lowercase();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        for fw in FRAMEWORKS {
            let Some(rest) = line.strip_prefix(fw) else {
                continue;
            };
            let pinned = rest
                .trim_start()
                .starts_with(['=', '>', '<']);
            if !rest.is_empty() && !pinned {
                continue;
            }
            let version = line
                .split_once("==")
                .map(|(_, v)| v.trim().trim_matches(['"', '\'']).to_string())
                .unwrap_or_default();
            return Some((capitalize(fw), version));
        }
    }
    None
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Project name declared in a pyproject.toml (`[project]` or
/// `[tool.poetry]`), if parseable.
pub fn pyproject_name(content: &str) -> Option<String> {
    let value: toml::Value = content.parse().ok()?;
    let project = value
        .get("project")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str());
    let poetry = value
        .get("tool")
        .and_then(|t| t.get("poetry"))
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str());
    project.or(poetry).map(str::to_string)
}

/// Scan the tree for Python modules.
pub fn detect(root: &Path) -> Vec<Module> {
    let mut modules = Vec::new();
    let targets = ["requirements.txt", "Pipfile", "pyproject.toml"];

    for hit in find_manifest_dirs(root, &targets, Some(MAX_DEPTH)) {
        let content = std::fs::read_to_string(&hit.manifest).unwrap_or_else(|err| {
            tracing::warn!(manifest = %hit.manifest.display(), %err, "unreadable python manifest, using defaults");
            String::new()
        });

        let (build_tool, build_command, test_command) = match hit.file_name.as_str() {
            "Pipfile" => (
                BuildTool::Pipenv,
                "pipenv install".to_string(),
                "pipenv run pytest".to_string(),
            ),
            "pyproject.toml" => (
                BuildTool::Poetry,
                "poetry install".to_string(),
                "poetry run pytest".to_string(),
            ),
            _ => (
                BuildTool::Pip,
                "pip install -r requirements.txt".to_string(),
                "pytest".to_string(),
            ),
        };

        let dir_name = hit
            .dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("module")
            .to_string();
        let name = if hit.file_name == "pyproject.toml" {
            pyproject_name(&content).unwrap_or(dir_name)
        } else {
            dir_name
        };

        let (framework, framework_version) = detect_framework(&content).unwrap_or_default();

        let dependencies = if hit.file_name == "requirements.txt" {
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };

        let dockerfile = hit.dir.join("Dockerfile");
        let dockerfile_path = if dockerfile.is_file() {
            Some(relative_slash(root, &dockerfile))
        } else {
            None
        };

        tracing::debug!(module = %name, dir = %hit.dir.display(), "python module detected");

        modules.push(Module {
            name,
            manifest_path: relative_slash(root, &hit.manifest),
            language: Language::Python,
            language_version: String::new(),
            build_tool,
            framework,
            framework_version,
            dependencies,
            build_command,
            test_command,
            dockerfile_path,
            builder_image: "python:3.11-slim".to_string(),
            runtime_image: "python:3.11-slim".to_string(),
            artifact_path: ".".to_string(),
            app_port: "8000".to_string(),
        });
    }

    modules
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    // ---- detect_framework tests ----

    #[test]
    fn exact_pin_carries_a_version() {
        let hit = detect_framework("requests==2.31\nflask==2.3.0\n").unwrap();
        assert_eq!(hit, ("Flask".to_string(), "2.3.0".to_string()));
    }

    #[test]
    fn range_pin_has_empty_version() {
        let hit = detect_framework("flask>=2.0\n").unwrap();
        assert_eq!(hit, ("Flask".to_string(), String::new()));
    }

    #[test]
    fn bare_token_matches() {
        let hit = detect_framework("django\n").unwrap();
        assert_eq!(hit.0, "Django");
        assert!(hit.1.is_empty());
    }

    #[test]
    fn comments_and_similar_names_do_not_match() {
        assert!(detect_framework("# flask==2.3.0\n").is_none());
        assert!(detect_framework("flask-login==0.6.3\n").is_none());
        assert!(detect_framework("apache-airflow==2.8\n").is_none());
    }

    #[test]
    fn pyproject_spaced_assignment_matches() {
        let hit = detect_framework("[tool.poetry.dependencies]\nflask = \"^2.0\"\n").unwrap();
        assert_eq!(hit.0, "Flask");
        assert!(hit.1.is_empty());
    }

    #[test]
    fn first_framework_in_file_order_wins() {
        let hit = detect_framework("fastapi==0.110\ndjango==5.0\n").unwrap();
        assert_eq!(hit.0, "Fastapi");
    }

    proptest! {
        #[test]
        fn scan_never_panics(content in "\\PC*") {
            let _ = detect_framework(&content);
        }

        #[test]
        fn version_only_reported_for_exact_pins(line in "[a-z<>=.0-9 ]{0,40}") {
            if let Some((_, version)) = detect_framework(&line) {
                if !version.is_empty() {
                    prop_assert!(line.contains("=="));
                }
            }
        }
    }

    // ---- pyproject_name tests ----

    #[test]
    fn project_name_preferred_over_poetry() {
        let content = "[project]\nname = \"svc\"\n\n[tool.poetry]\nname = \"legacy\"\n";
        assert_eq!(pyproject_name(content).as_deref(), Some("svc"));
    }

    #[test]
    fn poetry_name_used_when_project_absent() {
        let content = "[tool.poetry]\nname = \"legacy\"\n";
        assert_eq!(pyproject_name(content).as_deref(), Some("legacy"));
    }

    #[test]
    fn invalid_toml_yields_no_name() {
        assert!(pyproject_name("not [ valid").is_none());
    }

    // ---- detect tests ----

    #[test]
    fn requirements_module_with_flask() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "api/requirements.txt", "flask==2.3.0\ngunicorn\n");
        let modules = detect(dir.path());
        assert_eq!(modules.len(), 1);
        let m = &modules[0];
        assert_eq!(m.build_tool, BuildTool::Pip);
        assert_eq!(m.framework, "Flask");
        assert_eq!(m.framework_version, "2.3.0");
        assert_eq!(m.dependencies, vec!["flask==2.3.0", "gunicorn"]);
        assert_eq!(m.app_port, "8000");
    }

    #[test]
    fn build_tool_follows_manifest_kind() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a/requirements.txt", "");
        write(dir.path(), "b/Pipfile", "");
        write(dir.path(), "c/pyproject.toml", "");
        let modules = detect(dir.path());
        assert_eq!(modules.len(), 3);
        assert_eq!(modules[0].build_tool, BuildTool::Pip);
        assert_eq!(modules[1].build_tool, BuildTool::Pipenv);
        assert_eq!(modules[2].build_tool, BuildTool::Poetry);
        assert_eq!(modules[1].build_command, "pipenv install");
        assert_eq!(modules[2].test_command, "poetry run pytest");
    }

    #[test]
    fn requirements_preferred_over_pyproject_in_same_dir() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "requirements.txt", "flask\n");
        write(dir.path(), "pyproject.toml", "[project]\nname = \"x\"\n");
        let modules = detect(dir.path());
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].build_tool, BuildTool::Pip);
    }

    #[test]
    fn pyproject_name_becomes_module_name() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "svc/pyproject.toml",
            "[project]\nname = \"billing-worker\"\n",
        );
        let modules = detect(dir.path());
        assert_eq!(modules[0].name, "billing-worker");
    }

    #[test]
    fn deep_manifests_beyond_cap_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a/b/c/d/requirements.txt", "flask\n");
        assert!(detect(dir.path()).is_empty());
    }

    #[test]
    fn venv_directories_are_pruned() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".venv/lib/requirements.txt", "flask\n");
        assert!(detect(dir.path()).is_empty());
    }
}
