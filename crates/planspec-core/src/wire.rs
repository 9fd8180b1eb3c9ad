//! The document sent to the plan-import endpoint.

use serde::{Deserialize, Serialize};

use crate::model::{Plan, PlanIdentity};
use crate::validation::ValidatedPlan;

/// Request body of a publish call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub identity: PlanIdentity,
    pub digest: String,
    pub plan: Plan,
}

/// The single serialization point between the model and the server.
pub fn to_document(plan: &ValidatedPlan) -> PlanDocument {
    PlanDocument {
        identity: plan.identity(),
        digest: plan.digest().to_string(),
        plan: plan.plan().clone(),
    }
}
