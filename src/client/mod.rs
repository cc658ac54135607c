//! WEAPM-LOGSERVER API client.
//!
//! Every operation is one `ApiRequest` pushed through [`WeapmClient::execute`],
//! which owns the retry loop:
//!
//! ```text
//! attempt 0 ─► send ─► transport error / 5xx / 429 ─► sleep(n * backoff) ─► attempt n
//!                 │
//!                 ├─ 4xx ─────────────► Client error (no retry)
//!                 ├─ bad JSON ────────► Decode error (no retry)
//!                 ├─ code != 0 ───────► Api error   (no retry)
//!                 └─ code == 0 ───────► envelope
//! ```
//!
//! After `max_retries` retries the last retryable error is wrapped in
//! `RetriesExhausted`.

pub mod request;
pub mod retry;
pub mod transport;

use reqwest::Method;
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::Config;
use crate::error::{Result, WeapmError};
use crate::model::{
    AddClusterNodeRequest, AddSubsystemRequest, AdjustClusterParams, ApiEnvelope,
    ClusterDetailResult, DashboardResult, LogClusterInfo, LogSubClusterSubSystem,
    SearchSubsystemsRequest, SubSystem, SubsystemDetailResult, SubsystemExistsResult,
    SubsystemStatus,
};

pub use request::ApiRequest;
pub use retry::RetryPolicy;
pub use transport::{HttpTransport, RawResponse, Transport};

const OPERATION: &str = "operation";

/// Client for one configured server.
#[derive(Debug)]
pub struct WeapmClient<T = HttpTransport> {
    base_url: Url,
    policy: RetryPolicy,
    transport: T,
}

impl WeapmClient<HttpTransport> {
    /// Build a client backed by `reqwest`.
    pub fn new(config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        let client = Self::with_transport(config, transport);
        info!(base_url = %client.base_url, "client initialized");
        Ok(client)
    }
}

impl<T: Transport> WeapmClient<T> {
    pub fn with_transport(config: &Config, transport: T) -> Self {
        Self {
            base_url: config.base_url.clone(),
            policy: RetryPolicy::from_config(config),
            transport,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Send `request` with bounded retries and return the success envelope.
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiEnvelope> {
        let url = request.url(&self.base_url)?;
        let attempts = self.policy.attempts();
        let mut last_err: Option<WeapmError> = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.policy.delay_for(attempt);
                warn!(
                    retry = attempt,
                    sleep_duration = ?delay,
                    path = %request.path(),
                    "retrying request"
                );
                sleep(delay).await;
            }

            let outcome = match self.transport.send(request, &url).await {
                Ok(raw) => retry::interpret(raw),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(envelope) => {
                    if attempt > 0 {
                        info!(retries = attempt, path = %request.path(), "request succeeded after retries");
                    }
                    return Ok(envelope);
                }
                Err(e) if e.is_retryable() => {
                    warn!(
                        attempt = attempt + 1,
                        of = attempts,
                        error = %e,
                        "attempt failed"
                    );
                    last_err = Some(e);
                }
                Err(e) => {
                    debug!(error = %e, path = %request.path(), "request rejected");
                    return Err(e);
                }
            }
        }

        let last =
            last_err.unwrap_or_else(|| WeapmError::Transport("no attempt was made".into()));
        error!(
            retries = self.policy.max_retries,
            path = %request.path(),
            error = %last,
            "exceeded max_retries"
        );
        Err(WeapmError::RetriesExhausted {
            retries: self.policy.max_retries,
            last: Box::new(last),
        })
    }

    async fn fetch<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R> {
        let envelope = self.execute(&request).await?;
        match envelope.result {
            Some(value) if !value.is_null() => serde_json::from_value(value).map_err(|e| {
                WeapmError::Decode(format!("unexpected result for {}: {e}", request.path()))
            }),
            _ => Err(WeapmError::Decode(format!(
                "response for {} has no result",
                request.path()
            ))),
        }
    }

    /// Like `fetch` but an absent or null result is an empty list.
    async fn fetch_list<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<Vec<R>> {
        let envelope = self.execute(&request).await?;
        match envelope.result {
            Some(value) if !value.is_null() => serde_json::from_value(value).map_err(|e| {
                WeapmError::Decode(format!("unexpected result for {}: {e}", request.path()))
            }),
            _ => Ok(Vec::new()),
        }
    }

    /* ---- Dashboard ---- */

    pub async fn get_dashboard(&self) -> Result<DashboardResult> {
        self.fetch(ApiRequest::get([OPERATION, "dashboard"])).await
    }

    /* ---- Clusters ---- */

    pub async fn get_clusters(&self) -> Result<Vec<LogClusterInfo>> {
        self.fetch_list(ApiRequest::get([OPERATION, "clusters"]))
            .await
    }

    pub async fn get_cluster_detail(&self, cluster_name: &str) -> Result<ClusterDetailResult> {
        self.fetch(ApiRequest::get([OPERATION, "clusters", cluster_name]))
            .await
    }

    /// Add a node; the body's `clustername` is always set to `cluster_name`.
    pub async fn add_cluster_node(
        &self,
        cluster_name: &str,
        node: &AddClusterNodeRequest,
    ) -> Result<ApiEnvelope> {
        let mut node = node.clone();
        node.cluster_name = cluster_name.to_string();
        let req = ApiRequest::new(Method::POST, [OPERATION, "clusters", cluster_name, "nodes"])
            .with_json(&node)?;
        self.execute(&req).await
    }

    pub async fn delete_cluster_node(&self, ip: &str) -> Result<ApiEnvelope> {
        let req = ApiRequest::new(Method::DELETE, [OPERATION, "clusters", "nodes", ip]);
        self.execute(&req).await
    }

    pub async fn get_cluster_subsystems(
        &self,
        cluster_name: &str,
    ) -> Result<Vec<LogSubClusterSubSystem>> {
        self.fetch_list(ApiRequest::get([
            OPERATION,
            "cluster",
            cluster_name,
            "subsystems",
        ]))
        .await
    }

    /* ---- Subsystems ---- */

    pub async fn check_subsystem_exists(&self, subsystem_id: &str) -> Result<SubsystemExistsResult> {
        self.fetch(ApiRequest::get([
            OPERATION,
            "subsystem",
            "exists",
            subsystem_id,
        ]))
        .await
    }

    pub async fn add_subsystem(&self, req: &AddSubsystemRequest) -> Result<ApiEnvelope> {
        let req = ApiRequest::new(Method::POST, [OPERATION, "subsystem"]).with_json(req)?;
        self.execute(&req).await
    }

    /// Move a subsystem to another cluster. Parameters travel in the query string.
    pub async fn adjust_subsystem_cluster(
        &self,
        subsystem_id: &str,
        params: &AdjustClusterParams,
    ) -> Result<ApiEnvelope> {
        let req = ApiRequest::new(Method::POST, [OPERATION, "subsystem", subsystem_id])
            .with_query(params.query_pairs());
        self.execute(&req).await
    }

    pub async fn adjust_subsystem_status(
        &self,
        subsystem_id: &str,
        status: SubsystemStatus,
    ) -> Result<ApiEnvelope> {
        let req = ApiRequest::new(
            Method::POST,
            [OPERATION, "subsystem", subsystem_id, "status", status.as_str()],
        );
        self.execute(&req).await
    }

    pub async fn enable_subsystem(&self, subsystem_id: &str) -> Result<ApiEnvelope> {
        let req = ApiRequest::new(Method::PUT, [OPERATION, "subsystem", subsystem_id, "enable"]);
        self.execute(&req).await
    }

    pub async fn get_subsystem_detail(&self, subsystem_id: &str) -> Result<SubsystemDetailResult> {
        self.fetch(ApiRequest::get([OPERATION, "subsystem", subsystem_id]))
            .await
    }

    pub async fn get_subsystems(&self) -> Result<Vec<SubSystem>> {
        self.fetch_list(ApiRequest::get([OPERATION, "subsystems"]))
            .await
    }

    pub async fn search_subsystems(&self, req: &SearchSubsystemsRequest) -> Result<Vec<SubSystem>> {
        self.fetch_list(
            ApiRequest::get([OPERATION, "subsystems", "search"]).with_query(req.query_pairs()),
        )
        .await
    }
}
