//! The plan root and its identity.

use serde::{Deserialize, Serialize};

use super::job::Stage;
use super::key::{Key, Oid};
use super::trigger::{BranchManagement, Trigger};

/// Lookup reference to the project owning a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub key: Key,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oid: Option<Oid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ProjectRef {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            oid: None,
            name: None,
        }
    }

    pub fn with_oid(mut self, oid: Oid) -> Self {
        self.oid = Some(oid);
        self
    }
}

/// A complete CI pipeline definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub project: ProjectRef,
    pub key: Key,
    pub oid: Oid,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Executed in this order.
    pub stages: Vec<Stage>,

    /// Source repositories, by name, linked on the server.
    #[serde(default)]
    pub linked_repositories: Vec<String>,

    #[serde(default)]
    pub triggers: Vec<Trigger>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_management: Option<BranchManagement>,
}

fn default_true() -> bool {
    true
}

impl Plan {
    pub fn new(project: ProjectRef, key: Key, oid: Oid, name: impl Into<String>) -> Self {
        Self {
            project,
            key,
            oid,
            name: name.into(),
            description: None,
            enabled: true,
            stages: Vec::new(),
            linked_repositories: Vec::new(),
            triggers: Vec::new(),
            branch_management: None,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_stages(mut self, stages: Vec<Stage>) -> Self {
        self.stages = stages;
        self
    }

    pub fn with_linked_repository(mut self, name: impl Into<String>) -> Self {
        self.linked_repositories.push(name.into());
        self
    }

    pub fn with_triggers(mut self, triggers: Vec<Trigger>) -> Self {
        self.triggers = triggers;
        self
    }

    pub fn with_branch_management(mut self, policy: BranchManagement) -> Self {
        self.branch_management = Some(policy);
        self
    }

    pub fn identity(&self) -> PlanIdentity {
        PlanIdentity {
            project_key: self.project.key.clone(),
            plan_key: self.key.clone(),
            oid: self.oid.clone(),
        }
    }
}

/// The stable identity of a plan on the server.
///
/// Neither the keys nor the oid may change once published.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlanIdentity {
    pub project_key: Key,
    pub plan_key: Key,
    pub oid: Oid,
}

impl std::fmt::Display for PlanIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.project_key, self.plan_key)
    }
}
