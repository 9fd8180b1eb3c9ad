//! Publishing plans to a CI server.
//!
//! [`PlanServer`] is the seam between the model and the server:
//! - [`HttpPlanServer`] talks to a real server's plan-import endpoint.
//! - [`MemoryPlanServer`] keeps records in memory (tests and dry runs).
//!
//! Publish is a full replace keyed by the plan's oid: the first publish
//! creates the record, later ones overwrite it wholesale. Publishing the same
//! value twice leaves the server in the state it had after the first call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::model::{Plan, PlanIdentity};
use crate::validation::ValidatedPlan;

mod http;
mod memory;

pub use http::HttpPlanServer;
pub use memory::MemoryPlanServer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishOutcome {
    Created,
    Updated,
}

/// What the server acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub identity: PlanIdentity,
    pub outcome: PublishOutcome,
    /// Definition digest of the plan now stored.
    pub digest: String,
    pub published_at: DateTime<Utc>,
}

/// A plan record as held by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPlan {
    pub plan: Plan,
    pub digest: String,
    pub updated_at: DateTime<Utc>,
}

/// A CI server accepting plan definitions.
#[async_trait]
pub trait PlanServer: Send + Sync {
    /// Create or fully replace the plan identified by `plan.identity()`.
    async fn publish(&self, plan: &ValidatedPlan) -> Result<PublishReceipt>;

    /// Current record for `identity`, if the server has one.
    async fn fetch(&self, identity: &PlanIdentity) -> Result<Option<StoredPlan>>;
}

/// Validate `plan` and publish it in one call.
pub async fn publish_plan(server: &dyn PlanServer, plan: Plan) -> Result<PublishReceipt> {
    let identity = plan.identity();
    let validated = match plan.validate() {
        Ok(v) => v,
        Err(e) => {
            warn!(plan = %identity, error = %e, "Plan failed validation");
            return Err(e);
        }
    };

    info!(plan = %identity, digest = %validated.digest(), "Publishing plan");
    let receipt = server.publish(&validated).await?;
    info!(
        plan = %receipt.identity,
        outcome = ?receipt.outcome,
        "Plan published"
    );
    Ok(receipt)
}
