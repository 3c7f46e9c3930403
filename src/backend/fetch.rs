use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use super::client::BackendClient;
use super::types::{CodeGraph, GraphRequest, GraphResponse};

pub struct GraphFetchResult {
    pub request: GraphRequest,
    pub outcome: Result<CodeGraph, String>,
}

/// Background graph fetches, keyed by the exact request value.
///
/// Every result carries the request it answers, so the caller can discard
/// anything that no longer matches its most recently issued request. Repeat
/// requests for a known key are answered from the cache without touching the
/// network; a forced refresh invalidates that key first.
pub struct GraphFetcher {
    client: Arc<BackendClient>,
    tx: Sender<GraphFetchResult>,
    rx: Receiver<GraphFetchResult>,
    cache: HashMap<GraphRequest, CodeGraph>,
    pending: Option<GraphRequest>,
    dispatched: u64,
}

impl GraphFetcher {
    pub fn new(client: Arc<BackendClient>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            client,
            tx,
            rx,
            cache: HashMap::new(),
            pending: None,
            dispatched: 0,
        }
    }

    /// Starts a fetch for `request`. A cache hit is answered synchronously
    /// through the return value instead; `None` means a worker will deliver
    /// the result through `poll` later (or that an identical fetch is
    /// already on its way).
    #[must_use]
    pub fn request(&mut self, request: GraphRequest, force: bool) -> Option<GraphFetchResult> {
        if force {
            self.cache.remove(&request);
        } else {
            if let Some(graph) = self.cache.get(&request) {
                return Some(GraphFetchResult {
                    request,
                    outcome: Ok(graph.clone()),
                });
            }
            if self.pending.as_ref() == Some(&request) {
                return None;
            }
        }

        self.pending = Some(request.clone());
        self.dispatched += 1;
        log::debug!(
            "dispatching graph fetch #{} for {}",
            self.dispatched,
            request.repository
        );

        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let outcome = match client.graph(&request) {
                Ok(response) => response_outcome(response),
                Err(error) => Err(format!("{error:#}")),
            };
            let _ = tx.send(GraphFetchResult { request, outcome });
        });

        None
    }

    /// Drains completed fetches in arrival order; successful results are
    /// cached under their request key.
    pub fn poll(&mut self) -> Vec<GraphFetchResult> {
        let mut results = Vec::new();
        while let Ok(result) = self.rx.try_recv() {
            if self.pending.as_ref() == Some(&result.request) {
                self.pending = None;
            }
            if let Ok(graph) = &result.outcome {
                self.cache.insert(result.request.clone(), graph.clone());
            }
            results.push(result);
        }
        results
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[cfg(test)]
    pub(crate) fn dispatched(&self) -> u64 {
        self.dispatched
    }

    #[cfg(test)]
    fn inject(&self, result: GraphFetchResult) {
        let _ = self.tx.send(result);
    }
}

fn response_outcome(response: GraphResponse) -> Result<CodeGraph, String> {
    // A reported error wins even when a graph payload is also present.
    if let Some(message) = response.error {
        return Err(message);
    }
    match response.graph {
        Some(graph) => Ok(graph),
        None => Err("backend returned neither a graph nor an error".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::{ClusterBy, Direction, GraphMetadata, ViewKind};

    fn request_for(repository: &str) -> GraphRequest {
        GraphRequest {
            repository: repository.to_owned(),
            view_kind: ViewKind::Call,
            depth: 2,
            root: None,
            direction: Some(Direction::Both),
            include_metrics: true,
            include_security: false,
            cluster_by: ClusterBy::None,
        }
    }

    fn graph_with_counts(node_count: usize) -> CodeGraph {
        CodeGraph {
            nodes: Vec::new(),
            edges: Vec::new(),
            metadata: GraphMetadata {
                node_count,
                edge_count: 0,
            },
        }
    }

    fn fetcher() -> GraphFetcher {
        // Port 9 is discard; nothing in these tests performs real I/O.
        GraphFetcher::new(Arc::new(BackendClient::new("http://127.0.0.1:9")))
    }

    #[test]
    fn repeat_requests_are_served_from_cache() {
        let mut fetcher = fetcher();
        let request = request_for("repo-a");

        fetcher.inject(GraphFetchResult {
            request: request.clone(),
            outcome: Ok(graph_with_counts(3)),
        });
        let delivered = fetcher.poll();
        assert_eq!(delivered.len(), 1);

        let cached = fetcher.request(request.clone(), false).unwrap();
        assert_eq!(fetcher.dispatched(), 0);
        assert_eq!(cached.request, request);
        assert_eq!(cached.outcome.unwrap().metadata.node_count, 3);
    }

    #[test]
    fn forced_refresh_bypasses_the_cache() {
        let mut fetcher = fetcher();
        let request = request_for("repo-a");

        fetcher.inject(GraphFetchResult {
            request: request.clone(),
            outcome: Ok(graph_with_counts(3)),
        });
        fetcher.poll();

        assert!(fetcher.request(request, true).is_none());
        assert_eq!(fetcher.dispatched(), 1);
        assert!(fetcher.is_pending());
    }

    #[test]
    fn failed_results_are_not_cached() {
        let mut fetcher = fetcher();
        let request = request_for("repo-a");

        fetcher.inject(GraphFetchResult {
            request: request.clone(),
            outcome: Err("boom".to_owned()),
        });
        fetcher.poll();

        // A repeat request must go back to the network, not to a cache entry.
        assert!(fetcher.request(request, false).is_none());
        assert_eq!(fetcher.dispatched(), 1);
    }

    #[test]
    fn reported_error_is_authoritative() {
        let both = GraphResponse {
            graph: Some(graph_with_counts(1)),
            error: Some("index out of date".to_owned()),
        };
        assert_eq!(response_outcome(both).unwrap_err(), "index out of date");

        let empty = GraphResponse {
            graph: None,
            error: None,
        };
        assert!(response_outcome(empty).is_err());
    }
}
