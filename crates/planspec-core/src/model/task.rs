//! Tasks: the ordered steps of a job.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One step within a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(flatten)]
    pub kind: TaskKind,
}

fn default_true() -> bool {
    true
}

/// What a task does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskKind {
    /// Source checkout of one or more linked repositories.
    Checkout {
        items: Vec<CheckoutItem>,
        #[serde(default)]
        clean_checkout: bool,
    },

    /// Shell script, from a repository file or inline.
    Script {
        body: ScriptBody,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        arguments: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        working_subdirectory: Option<String>,
    },

    /// Parses externally produced test result files.
    TestParser {
        test_type: TestType,
        result_directories: Vec<String>,
    },

    /// Third-party plugin task.
    ///
    /// `configuration` is passed through to the server unvalidated; its
    /// meaning belongs to the plugin identified by `plugin_key`.
    Plugin {
        plugin_key: String,
        #[serde(default)]
        configuration: BTreeMap<String, String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CheckoutItem {
    DefaultRepository,
    Repository {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptBody {
    File { path: String },
    Inline { text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    Junit,
    Testng,
    Nunit,
    Mstest,
    Mocha,
}

impl Task {
    fn of(kind: TaskKind) -> Self {
        Self {
            description: None,
            enabled: true,
            kind,
        }
    }

    /// Checkout of the plan's default repository.
    pub fn checkout_default(clean_checkout: bool) -> Self {
        Self::of(TaskKind::Checkout {
            items: vec![CheckoutItem::DefaultRepository],
            clean_checkout,
        })
    }

    /// Runs a script file at a path relative to the checkout root.
    pub fn script_file(path: impl Into<String>) -> Self {
        Self::of(TaskKind::Script {
            body: ScriptBody::File { path: path.into() },
            arguments: None,
            working_subdirectory: None,
        })
    }

    pub fn script_inline(text: impl Into<String>) -> Self {
        Self::of(TaskKind::Script {
            body: ScriptBody::Inline { text: text.into() },
            arguments: None,
            working_subdirectory: None,
        })
    }

    pub fn test_parser(test_type: TestType, result_pattern: impl Into<String>) -> Self {
        Self::of(TaskKind::TestParser {
            test_type,
            result_directories: vec![result_pattern.into()],
        })
    }

    pub fn plugin(plugin_key: impl Into<String>, configuration: BTreeMap<String, String>) -> Self {
        Self::of(TaskKind::Plugin {
            plugin_key: plugin_key.into(),
            configuration,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Disable this task.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Short label for logs and error messages.
    pub fn label(&self) -> &str {
        match &self.kind {
            TaskKind::Checkout { .. } => "checkout",
            TaskKind::Script { .. } => "script",
            TaskKind::TestParser { .. } => "test_parser",
            TaskKind::Plugin { plugin_key, .. } => plugin_key,
        }
    }
}
