//! Triggers and branch management.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Plugin key of the server's built-in daily scheduled trigger.
pub const DAILY_TRIGGER_PLUGIN: &str =
    "com.atlassian.bamboo.triggers.atlassian-bamboo-triggers:daily";

/// Configuration key holding the daily build time (`HH:MM`).
pub const DAILY_BUILD_TIME: &str = "repository.change.daily.buildTime";

/// An event source that starts the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    pub kind: TriggerKind,

    /// Opaque passthrough; never interpreted locally.
    #[serde(default)]
    pub configuration: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerKind {
    /// Push notification from the linked source repository.
    RepositoryPush,
    /// Invoked externally over HTTP.
    Remote,
    Plugin { plugin_key: String },
}

impl Trigger {
    pub fn new(name: impl Into<String>, kind: TriggerKind) -> Self {
        Self {
            name: name.into(),
            description: None,
            enabled: true,
            kind,
            configuration: BTreeMap::new(),
        }
    }

    pub fn repository_push(name: impl Into<String>) -> Self {
        Self::new(name, TriggerKind::RepositoryPush)
    }

    pub fn remote(name: impl Into<String>) -> Self {
        Self::new(name, TriggerKind::Remote)
    }

    /// Once-a-day build at `build_time` (`HH:MM`, server local time).
    pub fn daily(name: impl Into<String>, build_time: impl Into<String>) -> Self {
        Self::new(
            name,
            TriggerKind::Plugin {
                plugin_key: DAILY_TRIGGER_PLUGIN.to_string(),
            },
        )
        .with_config(DAILY_BUILD_TIME, build_time)
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.configuration.insert(key.into(), value.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Automatic plan-branch creation and cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchManagement {
    pub creation: BranchCreation,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<BranchCleanup>,

    #[serde(default)]
    pub notification: NotificationPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BranchCreation {
    Manually,
    ForPullRequest,
    /// Any new repository branch whose name matches `pattern`.
    ForNewBranch { pattern: String },
}

/// Day thresholds after which a plan branch is deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchCleanup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed_from_repository_after_days: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inactive_in_repository_after_days: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPolicy {
    /// Branches inherit the parent plan's notifications.
    #[default]
    LikeParentPlan,
    /// Branches notify their committers only.
    ForCommitters,
    None,
}

impl BranchManagement {
    pub fn for_pull_requests() -> Self {
        Self {
            creation: BranchCreation::ForPullRequest,
            cleanup: None,
            notification: NotificationPolicy::default(),
        }
    }

    pub fn delete_after(mut self, removed_days: u32, inactive_days: u32) -> Self {
        self.cleanup = Some(BranchCleanup {
            removed_from_repository_after_days: Some(removed_days),
            inactive_in_repository_after_days: Some(inactive_days),
        });
        self
    }

    pub fn notify(mut self, notification: NotificationPolicy) -> Self {
        self.notification = notification;
        self
    }
}
