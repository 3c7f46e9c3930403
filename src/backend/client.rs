use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;

use super::types::{GraphRequest, GraphResponse, HealthInfo, RepositoryList};

const HEALTH_RETRY_LIMIT: usize = 3;
const HEALTH_RETRY_DELAY: Duration = Duration::from_millis(400);

pub struct BackendClient {
    base_url: String,
    agent: ureq::Agent,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(2))
            .timeout(Duration::from_secs(30))
            .build();

        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, request: ureq::Request) -> Result<T> {
        let response = request
            .call()
            .with_context(|| format!("request to {url} failed"))?;
        response
            .into_json()
            .with_context(|| format!("invalid JSON from {url}"))
    }

    /// Health probe gating the whole session, retried a bounded number of
    /// times before the backend is declared unreachable.
    pub fn health(&self) -> Result<HealthInfo> {
        let url = format!("{}/health", self.base_url);
        let mut last_error = None;

        for attempt in 1..=HEALTH_RETRY_LIMIT {
            match self.get_json::<HealthInfo>(&url, self.agent.get(&url)) {
                Ok(info) => return Ok(info),
                Err(error) => {
                    log::warn!("health check attempt {attempt}/{HEALTH_RETRY_LIMIT} failed: {error:#}");
                    last_error = Some(error);
                    if attempt < HEALTH_RETRY_LIMIT {
                        thread::sleep(HEALTH_RETRY_DELAY);
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow!("health check failed for {url}")))
    }

    pub fn repositories(&self) -> Result<Vec<String>> {
        let url = format!("{}/repositories", self.base_url);
        let list: RepositoryList = self.get_json(&url, self.agent.get(&url))?;
        Ok(list.repositories)
    }

    pub fn graph(&self, request: &GraphRequest) -> Result<GraphResponse> {
        let url = format!("{}/graph", self.base_url);
        let mut call = self
            .agent
            .get(&url)
            .query("repo", &request.repository)
            .query("kind", request.view_kind.label())
            .query("depth", &request.depth.to_string());

        if let Some(root) = &request.root {
            call = call.query("root", root);
        }
        if let Some(direction) = request.direction {
            call = call.query("direction", direction.label());
        }

        call = call
            .query("metrics", bool_param(request.include_metrics))
            .query("security", bool_param(request.include_security))
            .query("cluster", request.cluster_by.label());

        self.get_json(&url, call)
    }
}

fn bool_param(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
