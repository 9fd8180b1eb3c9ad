//! Stages, jobs, artifacts and requirements.

use serde::{Deserialize, Serialize};

use super::key::Key;
use super::task::Task;

/// An ordered phase of a plan. Stages run in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Stage waits for a manual start.
    #[serde(default)]
    pub manual: bool,

    /// Stage runs even when an earlier stage failed.
    #[serde(default)]
    pub final_stage: bool,

    pub jobs: Vec<Job>,
}

impl Stage {
    pub fn new(name: impl Into<String>, jobs: Vec<Job>) -> Self {
        Self {
            name: name.into(),
            description: None,
            manual: false,
            final_stage: false,
            jobs,
        }
    }

    pub fn manual(mut self) -> Self {
        self.manual = true;
        self
    }
}

/// Ordered tasks plus the artifacts and host requirements of one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    pub key: Key,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub clean_working_directory: bool,

    /// Executed in this order.
    pub tasks: Vec<Task>,

    /// Set semantics: names are unique within the job.
    #[serde(default)]
    pub artifacts: Vec<Artifact>,

    /// Set semantics: keys are unique within the job.
    #[serde(default)]
    pub requirements: Vec<Requirement>,
}

fn default_true() -> bool {
    true
}

impl Job {
    pub fn new(name: impl Into<String>, key: Key) -> Self {
        Self {
            name: name.into(),
            key,
            description: None,
            enabled: true,
            clean_working_directory: false,
            tasks: Vec::new(),
            artifacts: Vec::new(),
            requirements: Vec::new(),
        }
    }

    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn with_artifacts(mut self, artifacts: Vec<Artifact>) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn with_requirements(mut self, requirements: Vec<Requirement>) -> Self {
        self.requirements = requirements;
        self
    }
}

/// Files a job publishes for later retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,

    /// File name or glob, relative to `location` (or the working directory).
    pub copy_pattern: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Available to later stages and other plans.
    #[serde(default)]
    pub shared: bool,

    /// Job fails when the pattern matches nothing.
    #[serde(default)]
    pub required: bool,
}

impl Artifact {
    pub fn new(name: impl Into<String>, copy_pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            copy_pattern: copy_pattern.into(),
            location: None,
            shared: false,
            required: false,
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Capability predicate used by the server to pick an execution host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub key: String,
    pub match_type: MatchType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Capability is present, any value.
    Exists,
    Equals,
    /// Capability value matches a regular expression.
    Matches,
}

impl Requirement {
    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            match_type: MatchType::Equals,
            match_value: Some(value.into()),
        }
    }

    pub fn matches(key: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            match_type: MatchType::Matches,
            match_value: Some(pattern.into()),
        }
    }

    pub fn exists(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            match_type: MatchType::Exists,
            match_value: None,
        }
    }
}
