//! Plan-import client over HTTP.

use std::future::Future;

use tokio::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{RequestBuilder, Response, StatusCode};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{PlanServer, PublishOutcome, PublishReceipt, StoredPlan};
use crate::config::{Credentials, PublisherConfig};
use crate::error::{PublishError, Result};
use crate::model::PlanIdentity;
use crate::validation::ValidatedPlan;
use crate::wire;

const IMPORT_PATH: &str = "rest/api/latest/import/plan";

/// Publishes through the server's plan-import REST endpoint.
///
/// - `PUT {server}/rest/api/latest/import/plan` with a [`wire::PlanDocument`]
/// - `GET {server}/rest/api/latest/import/plan/{PROJECT}-{PLAN}`
pub struct HttpPlanServer {
    config: PublisherConfig,
    http_client: reqwest::Client,
}

impl HttpPlanServer {
    pub fn new(config: PublisherConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("planspec/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PublishError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(HttpPlanServer {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    fn url(&self, suffix: Option<&str>) -> String {
        let base = self.config.server_url.trim_end_matches('/');
        match suffix {
            Some(s) => format!("{base}/{IMPORT_PATH}/{s}"),
            None => format!("{base}/{IMPORT_PATH}"),
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.credentials {
            Some(Credentials::Basic { username, password }) => {
                request.basic_auth(username, Some(password))
            }
            Some(Credentials::Token { token }) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Deadline shared by every step of one call, body reads included.
    fn deadline(&self) -> Instant {
        Instant::now() + self.config.timeout
    }

    /// Run `call` until `deadline`, mapping transport failures.
    async fn bounded<T, F>(&self, url: &str, deadline: Instant, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, reqwest::Error>>,
    {
        match tokio::time::timeout_at(deadline, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) if e.is_timeout() => Err(self.timeout_error(url)),
            Ok(Err(e)) => Err(PublishError::Connectivity {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(self.timeout_error(url)),
        }
    }

    fn timeout_error(&self, url: &str) -> PublishError {
        PublishError::Timeout {
            url: url.to_string(),
            timeout_ms: self.config.timeout.as_millis() as u64,
        }
    }

    /// Read the body of a failed response for verbatim pass-through.
    ///
    /// A body that cannot be read in time is a transport failure, not an
    /// empty server message.
    async fn failure(&self, url: &str, deadline: Instant, response: Response) -> PublishError {
        let status = response.status();
        let message = match self.bounded(url, deadline, response.text()).await {
            Ok(message) => message,
            Err(e) => return e,
        };
        if status == StatusCode::UNAUTHORIZED {
            PublishError::Authentication(message)
        } else {
            PublishError::Rejected {
                status: status.as_u16(),
                message,
            }
        }
    }
}

#[async_trait]
impl PlanServer for HttpPlanServer {
    async fn publish(&self, plan: &ValidatedPlan) -> Result<PublishReceipt> {
        let url = self.url(None);
        let deadline = self.deadline();
        let identity = plan.identity();
        let request_id = Uuid::new_v4();
        let document = wire::to_document(plan);

        debug!(%url, %request_id, plan = %identity, "Sending plan document");
        let request = self
            .authorize(self.http_client.put(&url))
            .header("X-Request-Id", request_id.to_string())
            .json(&document);

        let response = self.bounded(&url, deadline, request.send()).await?;
        let status = response.status();

        let outcome = match status {
            StatusCode::CREATED => PublishOutcome::Created,
            s if s.is_success() => PublishOutcome::Updated,
            _ => {
                let err = self.failure(&url, deadline, response).await;
                warn!(%request_id, plan = %identity, status = status.as_u16(), "Publish refused");
                return Err(err);
            }
        };

        info!(%request_id, plan = %identity, ?outcome, "Server accepted plan");
        Ok(PublishReceipt {
            identity,
            outcome,
            digest: plan.digest().to_string(),
            published_at: Utc::now(),
        })
    }

    async fn fetch(&self, identity: &PlanIdentity) -> Result<Option<StoredPlan>> {
        let url = self.url(Some(&identity.to_string()));
        let deadline = self.deadline();
        let request = self.authorize(self.http_client.get(&url));

        let response = self.bounded(&url, deadline, request.send()).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => {
                let body = self.bounded(&url, deadline, response.text()).await?;
                Ok(Some(serde_json::from_str(&body)?))
            }
            _ => Err(self.failure(&url, deadline, response).await),
        }
    }
}
