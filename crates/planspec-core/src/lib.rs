//! planspec-core: CI plan definitions as typed values
//!
//! Builds plan trees (project link, stages, jobs, tasks, artifacts,
//! requirements, triggers, branch management), validates them locally and
//! publishes them to a CI server's plan-import endpoint.
//!
//! ## Flow
//!
//! - Build a [`Plan`] from literals ([`catalog`]) or a file ([`loader`])
//! - [`Plan::validate`] → [`ValidatedPlan`] (no network before this succeeds)
//! - [`PlanServer::publish`] → [`PublishReceipt`] (create or full replace)

pub mod catalog;
pub mod config;
pub mod digest;
mod error;
pub mod loader;
pub mod model;
pub mod publish;
pub mod telemetry;
pub mod validation;
pub mod wire;

// Re-export key types
pub use config::{Credentials, PublisherConfig};
pub use digest::definition_digest;
pub use error::{PublishError, Result, ValidationError};
pub use loader::load_plan_file;
pub use model::{Plan, PlanIdentity};
pub use publish::{
    publish_plan, HttpPlanServer, MemoryPlanServer, PlanServer, PublishOutcome, PublishReceipt,
    StoredPlan,
};
pub use telemetry::init_tracing;
pub use validation::ValidatedPlan;
