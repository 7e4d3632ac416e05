//! End-to-end analysis over fixture repositories.

use std::fs;
use std::path::Path;

use repolens_types::{BuildTool, Language, PipelineStrategy};

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Go service + TypeScript web app + Python api + GitHub Actions workflow.
fn mixed_fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "svc/go.mod",
        "module example.com/svc\n\ngo 1.22\n\nrequire github.com/gin-gonic/gin v1.9.0\n",
    );
    write(dir.path(), "svc/main.go", "package main\n\nfunc main() {}\n");
    write(
        dir.path(),
        "web/package.json",
        "{\n  \"name\": \"web-app\",\n  \"dependencies\": {\"express\": \"^4.18\"},\n  \"devDependencies\": {\"typescript\": \"^5.0\"}\n}\n",
    );
    write(dir.path(), "api/requirements.txt", "flask==2.3.0\n");
    write(dir.path(), ".github/workflows/ci.yml", "on: push\n");
    dir
}

#[test]
fn mixed_repo_is_a_monorepo_in_detector_order() {
    let dir = mixed_fixture();
    let result = repolens_core::analyze(dir.path(), Some("demo")).unwrap();

    assert_eq!(result.repository_name, "demo");
    assert_eq!(result.pipeline_strategy, PipelineStrategy::Monorepo);
    assert_eq!(result.modules.len(), 3);

    // Fixed ecosystem order: Go, Java, Node, Python.
    assert_eq!(result.modules[0].language, Language::Go);
    assert_eq!(result.modules[1].language, Language::TypeScript);
    assert_eq!(result.modules[2].language, Language::Python);

    // Primary framework comes from the first module with one.
    assert_eq!(result.main_framework, "gin");
    assert_eq!(result.main_framework_version, "v1.9.0");

    assert_eq!(result.infrastructure, vec!["GitHub Actions".to_string()]);
    assert_eq!(
        result.languages_percent.get("Go").copied(),
        Some(100.0)
    );
}

#[test]
fn mixed_repo_snapshot() {
    let dir = mixed_fixture();
    let result = repolens_core::analyze(dir.path(), Some("demo")).unwrap();
    insta::assert_json_snapshot!("mixed_repo", result);
}

#[test]
fn single_module_repo_is_standalone() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "requirements.txt", "flask==2.3.0\n");
    let result = repolens_core::analyze(dir.path(), Some("solo")).unwrap();
    assert_eq!(result.pipeline_strategy, PipelineStrategy::Standalone);
    assert_eq!(result.modules.len(), 1);
    assert_eq!(result.modules[0].build_tool, BuildTool::Pip);
    assert_eq!(result.main_framework, "Flask");
}

#[test]
fn empty_repo_yields_valid_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "README.md", "# nothing to see\n");
    let result = repolens_core::analyze(dir.path(), Some("empty")).unwrap();
    assert_eq!(result.pipeline_strategy, PipelineStrategy::Standalone);
    assert!(result.modules.is_empty());
    assert!(result.main_framework.is_empty());
    assert!(result.languages_percent.is_empty());
}

#[test]
fn missing_root_is_a_hard_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("definitely-not-here");
    let err = repolens_core::analyze(&missing, Some("x")).unwrap_err();
    assert!(err.to_string().contains("repository root"));
}

#[test]
fn file_root_is_a_hard_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("afile");
    fs::write(&file, "x").unwrap();
    let err = repolens_core::analyze(&file, Some("x")).unwrap_err();
    assert!(err.to_string().contains("not a directory"));
}

#[test]
fn repository_name_defaults_to_root_basename() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("my-service");
    fs::create_dir(&root).unwrap();
    let result = repolens_core::analyze(&root, None).unwrap();
    assert_eq!(result.repository_name, "my-service");
}

#[test]
fn jvm_monorepo_noise_filter_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let pom = "<project>\n  <dependencies>\n    <dependency>\n      <groupId>com.google.guava</groupId>\n      <artifactId>guava</artifactId>\n    </dependency>\n  </dependencies>\n</project>\n";
    write(dir.path(), "pom.xml", pom);
    write(dir.path(), "libs/a/pom.xml", pom);
    write(dir.path(), "libs/b/pom.xml", pom);
    write(dir.path(), "libs/c/pom.xml", pom);
    let result = repolens_core::analyze(dir.path(), Some("jvm-mono")).unwrap();
    assert_eq!(result.modules.len(), 1);
    assert_eq!(result.modules[0].manifest_path, "pom.xml");
    assert_eq!(result.pipeline_strategy, PipelineStrategy::Standalone);
}
