//! In-memory plan server.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use super::{PlanServer, PublishOutcome, PublishReceipt, StoredPlan};
use crate::error::{PublishError, Result};
use crate::model::{Oid, PlanIdentity};
use crate::validation::ValidatedPlan;

/// Plan records keyed by oid, with the server's create-or-replace semantics.
///
/// Rejects (HTTP 409) a publish whose oid is bound to another plan key, or
/// whose plan key is bound to another oid.
#[derive(Debug, Default)]
pub struct MemoryPlanServer {
    records: Mutex<BTreeMap<Oid, StoredPlan>>,
}

impl MemoryPlanServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored plans.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<Oid, StoredPlan>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn conflict(message: String) -> PublishError {
    PublishError::Rejected {
        status: 409,
        message,
    }
}

#[async_trait]
impl PlanServer for MemoryPlanServer {
    async fn publish(&self, plan: &ValidatedPlan) -> Result<PublishReceipt> {
        let identity = plan.identity();
        let mut records = self.lock();

        if let Some(existing) = records.get(&identity.oid) {
            let bound = existing.plan.identity();
            if bound != identity {
                return Err(conflict(format!(
                    "oid {} is already bound to plan {}",
                    identity.oid, bound
                )));
            }
        } else if let Some(other) = records.values().find(|r| {
            let bound = r.plan.identity();
            bound.project_key == identity.project_key && bound.plan_key == identity.plan_key
        }) {
            return Err(conflict(format!(
                "plan {} already exists with oid {}",
                identity, other.plan.oid
            )));
        }

        let now = Utc::now();
        let previous = records.insert(
            identity.oid.clone(),
            StoredPlan {
                plan: plan.plan().clone(),
                digest: plan.digest().to_string(),
                updated_at: now,
            },
        );
        let outcome = match previous {
            None => PublishOutcome::Created,
            Some(_) => PublishOutcome::Updated,
        };
        debug!(plan = %identity, ?outcome, "Stored plan in memory");

        Ok(PublishReceipt {
            identity,
            outcome,
            digest: plan.digest().to_string(),
            published_at: now,
        })
    }

    async fn fetch(&self, identity: &PlanIdentity) -> Result<Option<StoredPlan>> {
        Ok(self
            .lock()
            .get(&identity.oid)
            .filter(|r| r.plan.identity() == *identity)
            .cloned())
    }
}
