//! Plan definition data model.
//!
//! Plain value records forming a tree rooted at [`Plan`]. The only edge
//! leaving the tree is [`ProjectRef`], a lookup key for a project that
//! already exists on the server.

mod job;
mod key;
mod plan;
mod task;
mod trigger;

pub use job::{Artifact, Job, MatchType, Requirement, Stage};
pub use key::{Key, Oid};
pub use plan::{Plan, PlanIdentity, ProjectRef};
pub use task::{CheckoutItem, ScriptBody, Task, TaskKind, TestType};
pub use trigger::{
    BranchCleanup, BranchCreation, BranchManagement, NotificationPolicy, Trigger, TriggerKind,
    DAILY_BUILD_TIME, DAILY_TRIGGER_PLUGIN,
};
