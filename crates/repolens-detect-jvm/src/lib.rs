//! # repolens-detect-jvm
//!
//! JVM ecosystem detector: finds `pom.xml`, `build.gradle` and
//! `build.gradle.kts` manifests within four path segments of the root,
//! parses Maven manifests structurally (quick-xml) and Gradle manifests as
//! text, and applies the monorepo **noise filter**: a discovered module is
//! kept only when its manifest sits at the repository root, a framework was
//! positively identified, or its packaging is an explicit web archive.
//! Everything else is assumed to be an internal library of a multi-module
//! build and silently dropped.

use std::path::Path;
use std::sync::OnceLock;

use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;

use repolens_types::{BuildTool, Language, Module};
use repolens_walk::{find_manifest_dirs, relative_slash};

const MAX_DEPTH: usize = 4;

/// A `<dependency>` entry from a pom.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PomDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

/// Fields extracted from a `pom.xml`, all best-effort.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PomInfo {
    pub parent_artifact_id: String,
    pub parent_version: String,
    pub java_version: String,
    pub compiler_source: String,
    pub packaging: String,
    pub dependencies: Vec<PomDependency>,
}

/// Structural parse of a pom. Returns `None` when the XML is unreadable;
/// the caller still registers the module with ecosystem defaults.
pub fn parse_pom(content: &str) -> Option<PomInfo> {
    let mut reader = Reader::from_reader(content.as_bytes());
    let mut buf = Vec::new();

    let mut info = PomInfo::default();
    let mut stack: Vec<String> = Vec::new();
    let mut current_dep = PomDependency::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "dependency" && path_is(&stack, &["project", "dependencies"]) {
                    current_dep = PomDependency::default();
                }
                stack.push(name);
            }
            Ok(Event::End(_)) => {
                if path_is(&stack, &["project", "dependencies", "dependency"]) {
                    info.dependencies.push(std::mem::take(&mut current_dep));
                }
                stack.pop();
            }
            Ok(Event::Text(t)) => {
                let text = reader
                    .decoder()
                    .decode(t.as_ref())
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                if text.is_empty() {
                    continue;
                }
                if path_is(&stack, &["project", "packaging"]) {
                    info.packaging = text;
                } else if path_is(&stack, &["project", "parent", "artifactId"]) {
                    info.parent_artifact_id = text;
                } else if path_is(&stack, &["project", "parent", "version"]) {
                    info.parent_version = text;
                } else if path_is(&stack, &["project", "properties", "java.version"]) {
                    info.java_version = text;
                } else if path_is(&stack, &["project", "properties", "maven.compiler.source"]) {
                    info.compiler_source = text;
                } else if path_is(&stack, &["project", "dependencies", "dependency", "groupId"]) {
                    current_dep.group_id = text;
                } else if path_is(&stack, &["project", "dependencies", "dependency", "artifactId"])
                {
                    current_dep.artifact_id = text;
                } else if path_is(&stack, &["project", "dependencies", "dependency", "version"]) {
                    current_dep.version = text;
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                tracing::debug!(%err, "malformed pom.xml, falling back to defaults");
                return None;
            }
            _ => {}
        }
        buf.clear();
    }

    Some(info)
}

fn path_is(stack: &[String], expected: &[&str]) -> bool {
    stack.len() == expected.len() && stack.iter().zip(expected).all(|(a, b)| a == b)
}

fn source_compat_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"sourceCompatibility\s*=?\s*['"]?(\d+(?:\.\d+)?)['"]?"#)
            .expect("sourceCompatibility regex")
    })
}

fn java_version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"JavaVersion\.VERSION_(\d+)").expect("JavaVersion regex"))
}

/// Compatibility-version declaration from Gradle build-script text, if any.
pub fn gradle_language_version(content: &str) -> Option<String> {
    if let Some(caps) = source_compat_re().captures(content) {
        return Some(caps[1].trim_start_matches("1.").to_string());
    }
    java_version_re()
        .captures(content)
        .map(|caps| caps[1].to_string())
}

/// Scan the tree for JVM modules.
pub fn detect(root: &Path) -> Vec<Module> {
    let mut modules = Vec::new();
    let targets = ["pom.xml", "build.gradle", "build.gradle.kts"];

    for hit in find_manifest_dirs(root, &targets, Some(MAX_DEPTH)) {
        let content = std::fs::read_to_string(&hit.manifest).unwrap_or_else(|err| {
            tracing::warn!(manifest = %hit.manifest.display(), %err, "unreadable JVM manifest, using defaults");
            String::new()
        });

        let name = hit
            .dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("module")
            .to_string();

        let mut module = Module {
            name,
            manifest_path: relative_slash(root, &hit.manifest),
            language: Language::Java,
            language_version: String::new(),
            build_tool: BuildTool::Unknown,
            framework: String::new(),
            framework_version: String::new(),
            dependencies: Vec::new(),
            build_command: String::new(),
            test_command: String::new(),
            dockerfile_path: None,
            builder_image: String::new(),
            runtime_image: "eclipse-temurin:17-jre-alpine".to_string(),
            artifact_path: "./target/*.jar".to_string(),
            app_port: "8080".to_string(),
        };

        let mut is_war = false;
        if hit.file_name == "pom.xml" {
            is_war = apply_maven(&content, &mut module);
        } else {
            apply_gradle(&content, &mut module);
        }

        let dockerfile = hit.dir.join("Dockerfile");
        if dockerfile.is_file() {
            module.dockerfile_path = Some(relative_slash(root, &dockerfile));
        }

        // Noise filter: anything that is neither the root build, nor a
        // recognized framework app, nor a deployable web archive is an
        // internal library of a monorepo.
        let is_root = hit.depth == 0;
        let has_framework = !module.framework.is_empty();
        if is_root || has_framework || is_war {
            tracing::debug!(module = %module.name, "jvm module detected");
            modules.push(module);
        } else {
            tracing::debug!(
                manifest = %module.manifest_path,
                "jvm manifest dropped by noise filter"
            );
        }
    }

    modules
}

/// Fill Maven defaults and parsed metadata; returns whether packaging is a
/// web archive.
fn apply_maven(content: &str, module: &mut Module) -> bool {
    module.build_tool = BuildTool::Maven;
    module.build_command = "mvn clean package -DskipTests".to_string();
    module.test_command = "mvn test".to_string();
    module.builder_image = "maven:3.9-eclipse-temurin-17".to_string();
    module.language_version = "17".to_string();

    let Some(pom) = parse_pom(content) else {
        return content.contains("<packaging>war</packaging>");
    };

    if !pom.java_version.is_empty() {
        module.language_version = pom.java_version.clone();
    } else if !pom.compiler_source.is_empty() {
        module.language_version = pom.compiler_source.clone();
    }

    if pom.parent_artifact_id == "spring-boot-starter-parent" {
        module.framework = "Spring Boot".to_string();
        module.framework_version = pom.parent_version.clone();
    }

    for dep in &pom.dependencies {
        if !dep.group_id.is_empty() {
            let id = if dep.version.is_empty() {
                format!("{}:{}", dep.group_id, dep.artifact_id)
            } else {
                format!("{}:{}@{}", dep.group_id, dep.artifact_id, dep.version)
            };
            module.dependencies.push(id);
        }
        if module.framework.is_empty() && dep.group_id.contains("org.springframework.boot") {
            module.framework = "Spring Boot".to_string();
        }
        if dep.group_id.contains("io.quarkus") {
            module.framework = "Quarkus".to_string();
            if !dep.version.is_empty() {
                module.framework_version = dep.version.clone();
            }
        }
    }

    pom.packaging == "war"
}

fn apply_gradle(content: &str, module: &mut Module) {
    module.build_tool = BuildTool::Gradle;
    module.build_command = "./gradlew build -x test".to_string();
    module.test_command = "./gradlew test".to_string();
    module.builder_image = "gradle:8.5-jdk17".to_string();
    module.language_version = gradle_language_version(content).unwrap_or_else(|| "17".to_string());

    if content.contains("org.springframework.boot") {
        module.framework = "Spring Boot".to_string();
    }
}
