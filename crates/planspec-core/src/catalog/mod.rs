//! Built-in plan definitions.
//!
//! Each definition is a function building its plan from literals, so every
//! call yields a fresh, structurally identical tree.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::model::{Key, Oid, Plan, ProjectRef, Requirement, Task};

pub mod bam2fastx;
pub mod barcoding;

/// Plugin key of the Sonar scanner task.
pub const SONAR_SCANNER_PLUGIN: &str = "ch.mibex.bamboo.sonar4bamboo:sonar4bamboo.sonarscannertask";

/// A catalog entry.
pub struct CatalogEntry {
    pub name: &'static str,
    pub build: fn() -> Result<Plan>,
}

const ENTRIES: &[CatalogEntry] = &[
    CatalogEntry {
        name: "bam2fastx",
        build: bam2fastx::plan,
    },
    CatalogEntry {
        name: "barcoding",
        build: barcoding::plan,
    },
];

/// Names of all built-in plans.
pub fn names() -> impl Iterator<Item = &'static str> {
    ENTRIES.iter().map(|e| e.name)
}

/// Build the named plan, or `None` if the catalog has no such entry.
pub fn lookup(name: &str) -> Option<Result<Plan>> {
    ENTRIES
        .iter()
        .find(|e| e.name == name)
        .map(|e| (e.build)())
}

/// The playground project all catalog plans live in.
fn playground_project() -> Result<ProjectRef> {
    Ok(ProjectRef::new(Key::new("PLAYG")?).with_oid(Oid::new("1jx1kzc2o5xc1")?))
}

fn redhat_host() -> Requirement {
    Requirement::equals("system.dist", "redhat")
}

/// Project-specific values of a Sonar scan.
struct SonarProject<'a> {
    name: &'a str,
    sources: &'a str,
    version: &'a str,
}

/// Static analysis without coverage, using the global Sonar server config.
fn sonar_scan(project: SonarProject<'_>) -> Task {
    let fixed = [
        ("chosenSonarConfigId", "4"),
        ("buildJdk", "JDK 1.8.0_101"),
        ("useGlobalSonarServerConfig", "true"),
        ("executable", "SonarScannerHome"),
        ("illegalBranchCharsReplacement", "_"),
        ("failBuildForTaskErrors", "true"),
        ("incrementalModeNotPossible", "incrementalModeRunFullAnalysis"),
        (
            "additionalProperties",
            "-Dsonar.cfamily.build-wrapper-output.bypass=true",
        ),
        ("autoBranch", "true"),
        ("overrideSonarBuildConfig", "true"),
    ];
    let blank = [
        "incrementalFileForInclusionList",
        "useGradleWrapper",
        "useNewGradleSonarQubePlugin",
        "sonarJavaSource",
        "gradleWrapperLocation",
        "sonarLanguage",
        "incrementalMode",
        "failBuildForBrokenQualityGates",
        "sonarTests",
        "failBuildForSonarErrors",
        "sonarBranch",
        "sonarJavaTarget",
        "environmentVariables",
        "incrementalModeGitBranchPattern",
        "legacyBranching",
        "replaceSpecialBranchChars",
        "incrementalModeBambooUser",
        "workingSubDirectory",
    ];

    let mut config: BTreeMap<String, String> = fixed
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .chain(blank.iter().map(|k| (k.to_string(), String::new())))
        .collect();
    config.insert("sonarProjectName".to_string(), project.name.to_string());
    config.insert("sonarProjectKey".to_string(), project.name.to_string());
    config.insert("sonarSources".to_string(), project.sources.to_string());
    config.insert(
        "sonarProjectVersion".to_string(),
        format!("{}.${{bamboo.buildNumber}}", project.version),
    );

    Task::plugin(SONAR_SCANNER_PLUGIN, config)
}
