//! Plan validation.
//!
//! A [`Plan`] becomes a [`ValidatedPlan`] only through [`Plan::validate`],
//! and publishers accept nothing else, so every structural check happens
//! before any network call.
//!
//! Checks stop at the first problem. Plugin task and trigger configuration
//! maps are never inspected.

use std::collections::HashSet;

use regex::Regex;
use serde::Serialize;

use crate::digest::definition_digest;
use crate::error::{PublishError, ValidationError};
use crate::model::{
    BranchCreation, BranchManagement, Job, MatchType, Plan, PlanIdentity, Requirement,
    ScriptBody, Task, TaskKind, Trigger, TriggerKind,
};

/// A plan that passed validation, with its definition digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedPlan {
    plan: Plan,
    digest: String,
}

impl ValidatedPlan {
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn identity(&self) -> PlanIdentity {
        self.plan.identity()
    }

    /// SHA-256 of the canonical definition.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn into_inner(self) -> Plan {
        self.plan
    }
}

impl Plan {
    /// Check the whole tree and attach its digest.
    pub fn validate(self) -> Result<ValidatedPlan, PublishError> {
        validate_plan(&self)?;
        let digest = definition_digest(&self)?;
        Ok(ValidatedPlan { plan: self, digest })
    }
}

/// Structural checks only; see the module docs.
pub fn validate_plan(plan: &Plan) -> Result<(), ValidationError> {
    require_non_empty("plan name", &plan.name)?;

    if plan.stages.is_empty() {
        return Err(ValidationError::NoStages);
    }

    let mut job_keys = HashSet::new();
    for stage in &plan.stages {
        require_non_empty("stage name", &stage.name)?;
        if stage.jobs.is_empty() {
            return Err(ValidationError::EmptyStage {
                stage: stage.name.clone(),
            });
        }
        for job in &stage.jobs {
            if !job_keys.insert(job.key.as_str()) {
                return Err(ValidationError::DuplicateJobKey {
                    key: job.key.to_string(),
                });
            }
            validate_job(job)?;
        }
    }

    let mut repositories = HashSet::new();
    for name in &plan.linked_repositories {
        require_non_empty("linked repository name", name)?;
        if !repositories.insert(name.as_str()) {
            return Err(ValidationError::DuplicateRepository { name: name.clone() });
        }
    }

    let mut trigger_names = HashSet::new();
    for trigger in &plan.triggers {
        validate_trigger(trigger)?;
        if !trigger_names.insert(trigger.name.as_str()) {
            return Err(ValidationError::DuplicateTrigger {
                name: trigger.name.clone(),
            });
        }
    }

    if let Some(policy) = &plan.branch_management {
        validate_branch_management(policy)?;
    }

    Ok(())
}

fn validate_job(job: &Job) -> Result<(), ValidationError> {
    require_non_empty("job name", &job.name)?;

    for (index, task) in job.tasks.iter().enumerate() {
        validate_task(job, index, task)?;
    }

    let mut artifact_names = HashSet::new();
    for artifact in &job.artifacts {
        require_non_empty("artifact name", &artifact.name)?;
        require_non_empty("artifact copy pattern", &artifact.copy_pattern)?;
        if !artifact_names.insert(artifact.name.as_str()) {
            return Err(ValidationError::DuplicateArtifact {
                job: job.key.to_string(),
                name: artifact.name.clone(),
            });
        }
    }

    let mut requirement_keys = HashSet::new();
    for requirement in &job.requirements {
        validate_requirement(job, requirement)?;
        if !requirement_keys.insert(requirement.key.as_str()) {
            return Err(ValidationError::DuplicateRequirement {
                job: job.key.to_string(),
                key: requirement.key.clone(),
            });
        }
    }

    Ok(())
}

fn validate_task(job: &Job, index: usize, task: &Task) -> Result<(), ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidTask {
        job: job.key.to_string(),
        index,
        reason: reason.to_string(),
    };

    match &task.kind {
        TaskKind::Checkout { items, .. } if items.is_empty() => {
            Err(invalid("checkout needs at least one repository"))
        }
        TaskKind::Script {
            body: ScriptBody::File { path },
            ..
        } if path.trim().is_empty() => Err(invalid("script file path is empty")),
        TaskKind::Script {
            body: ScriptBody::Inline { text },
            ..
        } if text.trim().is_empty() => Err(invalid("inline script body is empty")),
        TaskKind::TestParser {
            result_directories, ..
        } if result_directories.is_empty()
            || result_directories.iter().any(|p| p.trim().is_empty()) =>
        {
            Err(invalid("test parser needs non-empty result patterns"))
        }
        TaskKind::Plugin { plugin_key, .. } if plugin_key.trim().is_empty() => {
            Err(invalid("plugin key is empty"))
        }
        _ => Ok(()),
    }
}

fn validate_requirement(job: &Job, requirement: &Requirement) -> Result<(), ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidRequirement {
        job: job.key.to_string(),
        key: requirement.key.clone(),
        reason,
    };

    require_non_empty("requirement key", &requirement.key)?;

    match (requirement.match_type, requirement.match_value.as_deref()) {
        (MatchType::Exists, None) => Ok(()),
        (MatchType::Exists, Some(_)) => Err(invalid("exists takes no match value".to_string())),
        (MatchType::Equals, Some(_)) => Ok(()),
        (MatchType::Matches, Some(pattern)) => Regex::new(pattern)
            .map(|_| ())
            .map_err(|e| invalid(format!("bad pattern: {e}"))),
        (_, None) => Err(invalid("match value is required".to_string())),
    }
}

fn validate_trigger(trigger: &Trigger) -> Result<(), ValidationError> {
    require_non_empty("trigger name", &trigger.name)?;
    if let TriggerKind::Plugin { plugin_key } = &trigger.kind {
        require_non_empty("trigger plugin key", plugin_key)?;
    }
    Ok(())
}

fn validate_branch_management(policy: &BranchManagement) -> Result<(), ValidationError> {
    if let BranchCreation::ForNewBranch { pattern } = &policy.creation {
        require_non_empty("branch name pattern", pattern)?;
        Regex::new(pattern).map_err(|e| ValidationError::InvalidPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
    }

    if let Some(cleanup) = &policy.cleanup {
        let thresholds = [
            (
                "removed_from_repository_after_days",
                cleanup.removed_from_repository_after_days,
            ),
            (
                "inactive_in_repository_after_days",
                cleanup.inactive_in_repository_after_days,
            ),
        ];
        for (field, days) in thresholds {
            if days == Some(0) {
                return Err(ValidationError::InvalidCleanupThreshold {
                    field: field.to_string(),
                });
            }
        }
    }

    Ok(())
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: field.to_string(),
        });
    }
    Ok(())
}
