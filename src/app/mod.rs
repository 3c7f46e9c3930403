use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use eframe::egui::{self, Context, Vec2};

use crate::backend::client::BackendClient;
use crate::backend::fetch::{GraphFetchResult, GraphFetcher};
use crate::backend::types::{CodeGraph, GraphRequest, HealthInfo};

mod graph;
mod params;
mod reduce;
mod render_utils;
mod selection;
mod ui;

use self::graph::{GraphLayout, LayoutMode};
use self::params::{RepositoryAutoSelect, ViewParameters};
use self::reduce::BoundedGraphCache;
use self::selection::SelectionState;

pub struct ExplorerApp {
    backend_url: String,
    client: Arc<BackendClient>,
    state: AppState,
}

enum AppState {
    Connecting {
        rx: Receiver<Result<HealthInfo, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    backend_version: String,
    params: ViewParameters,
    auto_select: RepositoryAutoSelect,
    selection: SelectionState,
    repositories: Vec<String>,
    repositories_rx: Option<Receiver<Result<Vec<String>, String>>>,
    repositories_error: Option<String>,
    fetcher: GraphFetcher,
    issued: Option<GraphRequest>,
    refresh_requested: bool,
    raw_graph: Option<CodeGraph>,
    graph_revision: u64,
    fetch_error: Option<String>,
    max_nodes: usize,
    bounded: BoundedGraphCache,
    layout: Option<GraphLayout>,
    layout_mode: LayoutMode,
    search: String,
    search_cache: Option<SearchMatchCache>,
    pan: Vec2,
    zoom: f32,
}

struct SearchMatchCache {
    query: String,
    key: (u64, usize),
    matches: Arc<HashSet<usize>>,
}

impl ExplorerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, backend_url: String) -> Self {
        let client = Arc::new(BackendClient::new(&backend_url));
        let state = Self::start_connect(&client);
        Self {
            backend_url,
            client,
            state,
        }
    }

    fn start_connect(client: &Arc<BackendClient>) -> AppState {
        AppState::Connecting {
            rx: spawn_health(Arc::clone(client)),
        }
    }

    fn health_outcome(
        client: &Arc<BackendClient>,
        result: Result<HealthInfo, String>,
    ) -> AppState {
        match result {
            Ok(health) => {
                log::info!(
                    "backend reachable at {} (version {}, status {})",
                    client.base_url(),
                    health.version,
                    health.status
                );
                AppState::Ready(Box::new(ViewModel::new(Arc::clone(client), health)))
            }
            Err(error) => AppState::Error(error),
        }
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Connecting { rx } => {
                match rx.try_recv() {
                    Ok(result) => {
                        transition = Some(Self::health_outcome(&self.client, result));
                    }
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("health check worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Connecting to the analysis backend...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                let mut reconnect = false;
                let backend_url = self.backend_url.as_str();
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Analysis backend unreachable");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    ui.label(format!("Expected a running backend at {backend_url}."));
                    ui.label("Start it (for example: codegraph-backend serve) and reconnect.");
                    ui.add_space(10.0);
                    if ui.button("Reconnect").clicked() {
                        reconnect = true;
                    }
                });

                if reconnect {
                    transition = Some(Self::start_connect(&self.client));
                }
            }
            AppState::Ready(model) => {
                model.process();
                model.show(ctx, &self.backend_url);

                if model.background_active() {
                    ctx.request_repaint_after(Duration::from_millis(150));
                }
            }
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}

impl ViewModel {
    fn new(client: Arc<BackendClient>, health: HealthInfo) -> Self {
        let mut model = Self::with_client(Arc::clone(&client));
        model.backend_version = health.version;
        model.repositories_rx = Some(spawn_repositories(client));
        model
    }

    fn with_client(client: Arc<BackendClient>) -> Self {
        Self {
            backend_version: String::new(),
            params: ViewParameters::new(),
            auto_select: RepositoryAutoSelect::default(),
            selection: SelectionState::default(),
            repositories: Vec::new(),
            repositories_rx: None,
            repositories_error: None,
            fetcher: GraphFetcher::new(client),
            issued: None,
            refresh_requested: false,
            raw_graph: None,
            graph_revision: 0,
            fetch_error: None,
            max_nodes: 150,
            bounded: BoundedGraphCache::new(),
            layout: None,
            layout_mode: LayoutMode::Force,
            search: String::new(),
            search_cache: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }

    /// Per-frame state pump: drain worker channels, then issue the fetch the
    /// current parameters call for (if any).
    fn process(&mut self) {
        self.poll_repositories();
        for result in self.fetcher.poll() {
            self.apply_fetch_result(result);
        }
        self.issue_fetch_if_needed();
    }

    fn poll_repositories(&mut self) {
        let Some(rx) = &self.repositories_rx else {
            return;
        };

        match rx.try_recv() {
            Ok(result) => {
                self.repositories_rx = None;
                self.apply_repositories(result);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.repositories_rx = None;
                self.repositories_error =
                    Some("repository listing worker disconnected".to_owned());
            }
        }
    }

    fn apply_repositories(&mut self, result: Result<Vec<String>, String>) {
        match result {
            Ok(repositories) => {
                log::info!("backend lists {} repositories", repositories.len());
                self.repositories = repositories;
                self.auto_select.apply(&mut self.params, &self.repositories);
            }
            Err(error) => {
                self.repositories_error = Some(error);
            }
        }
    }

    fn issue_fetch_if_needed(&mut self) {
        let Some(request) = self.params.derive_request() else {
            return;
        };

        let force = self.refresh_requested;
        if !force && self.issued.as_ref() == Some(&request) {
            return;
        }
        self.refresh_requested = false;

        let cached = self.fetcher.request(request.clone(), force);
        self.issued = Some(request);
        if let Some(result) = cached {
            self.apply_fetch_result(result);
        }
    }

    /// A delivered result only counts when it answers the most recently
    /// issued request; anything else is a superseded response.
    fn apply_fetch_result(&mut self, result: GraphFetchResult) {
        if self.issued.as_ref() != Some(&result.request) {
            log::debug!(
                "discarding superseded graph response for {}",
                result.request.repository
            );
            return;
        }

        match result.outcome {
            Ok(graph) => {
                log::info!(
                    "graph received: {} nodes, {} edges",
                    graph.metadata.node_count,
                    graph.metadata.edge_count
                );
                self.fetch_error = None;
                self.graph_revision = self.graph_revision.wrapping_add(1);
                self.raw_graph = Some(graph);
            }
            Err(error) => {
                log::warn!("graph query failed: {error}");
                self.fetch_error = Some(error);
            }
        }
    }

    fn loading(&self) -> bool {
        self.fetcher.is_pending()
    }

    fn background_active(&self) -> bool {
        self.repositories_rx.is_some() || self.fetcher.is_pending()
    }

    pub(in crate::app) fn request_refresh(&mut self) {
        self.refresh_requested = true;
    }

    /// Recenters depth-bounded exploration on `node_id` without touching the
    /// current selection.
    pub(in crate::app) fn focus_as_root(&mut self, node_id: &str) {
        self.params.set_root(Some(node_id.to_owned()));
    }

    /// Recomputes the bounded graph and its layout when their inputs changed;
    /// a no-op on every other frame.
    fn ensure_render_state(&mut self) {
        let Some(raw) = &self.raw_graph else {
            return;
        };

        let key = (self.graph_revision, self.max_nodes);
        let bounded = self.bounded.bounded(raw, key.0, key.1);

        let layout_current = self
            .layout
            .as_ref()
            .is_some_and(|layout| layout.key() == key && layout.mode() == self.layout_mode);
        if !layout_current {
            self.layout = Some(GraphLayout::new(bounded, key, self.layout_mode));
        }
    }

    /// Opens the selected node's source location. Editor integration lives
    /// outside this tool; the default action only reports the target.
    fn navigate_to_source(&self, file: &str, line: u32) {
        log::info!("navigate to {file}:{line}");
    }
}

fn spawn_health(client: Arc<BackendClient>) -> Receiver<Result<HealthInfo, String>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = client.health().map_err(|error| format!("{error:#}"));
        let _ = tx.send(result);
    });
    rx
}

fn spawn_repositories(client: Arc<BackendClient>) -> Receiver<Result<Vec<String>, String>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = client.repositories().map_err(|error| format!("{error:#}"));
        let _ = tx.send(result);
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::{GraphMetadata, GraphNode};

    fn model() -> ViewModel {
        // Nothing here performs real I/O; port 9 only serves as an address.
        ViewModel::with_client(Arc::new(BackendClient::new("http://127.0.0.1:9")))
    }

    fn sample_graph() -> CodeGraph {
        let nodes = vec![GraphNode {
            id: "core::main".to_owned(),
            label: String::new(),
            kind: "function".to_owned(),
            metrics: None,
            security: Vec::new(),
            location: None,
        }];
        CodeGraph {
            metadata: GraphMetadata {
                node_count: nodes.len(),
                edge_count: 0,
            },
            nodes,
            edges: Vec::new(),
        }
    }

    #[test]
    fn health_result_drives_the_gate() {
        let client = Arc::new(BackendClient::new("http://127.0.0.1:9"));

        let failed = ExplorerApp::health_outcome(&client, Err("connection refused".to_owned()));
        assert!(matches!(failed, AppState::Error(message) if message == "connection refused"));

        let healthy = ExplorerApp::health_outcome(
            &client,
            Ok(HealthInfo {
                version: "0.4.1".to_owned(),
                status: "ok".to_owned(),
            }),
        );
        assert!(matches!(healthy, AppState::Ready(_)));
    }

    #[test]
    fn no_fetch_is_issued_without_a_repository() {
        let mut model = model();
        model.process();
        assert!(model.issued.is_none());
        assert!(!model.fetcher.is_pending());
    }

    #[test]
    fn repository_arrival_auto_selects_and_enables_fetching() {
        let mut model = model();
        model.apply_repositories(Ok(vec!["repoX".to_owned(), "repoY".to_owned()]));
        assert_eq!(model.params.repository(), "repoX");

        model.issue_fetch_if_needed();
        let issued = model.issued.clone().unwrap();
        assert_eq!(issued.repository, "repoX");
    }

    #[test]
    fn unchanged_parameters_do_not_reissue() {
        let mut model = model();
        model.params.set_repository("repo-a".to_owned());
        model.issue_fetch_if_needed();
        model.issue_fetch_if_needed();
        assert_eq!(model.fetcher.dispatched(), 1);

        model.params.set_depth(3);
        model.issue_fetch_if_needed();
        assert_eq!(model.fetcher.dispatched(), 2);
        assert_eq!(model.issued.clone().unwrap().depth, 3);
    }

    #[test]
    fn refresh_reissues_with_unchanged_parameters() {
        let mut model = model();
        model.params.set_repository("repo-a".to_owned());
        model.issue_fetch_if_needed();
        let first = model.issued.clone().unwrap();

        model.request_refresh();
        model.issue_fetch_if_needed();
        assert_eq!(model.fetcher.dispatched(), 2);
        assert_eq!(model.issued.clone().unwrap(), first);
    }

    #[test]
    fn superseded_responses_are_discarded() {
        let mut model = model();
        model.params.set_repository("repo-a".to_owned());
        let stale = model.params.derive_request().unwrap();

        model.params.set_repository("repo-b".to_owned());
        let current = model.params.derive_request().unwrap();
        model.issued = Some(current.clone());

        model.apply_fetch_result(GraphFetchResult {
            request: stale,
            outcome: Ok(sample_graph()),
        });
        assert!(model.raw_graph.is_none());
        assert_eq!(model.graph_revision, 0);

        model.apply_fetch_result(GraphFetchResult {
            request: current,
            outcome: Ok(sample_graph()),
        });
        assert!(model.raw_graph.is_some());
        assert_eq!(model.graph_revision, 1);
    }

    #[test]
    fn fetch_errors_leave_parameters_and_selection_alone() {
        let mut model = model();
        model.params.set_repository("repo-a".to_owned());
        model.selection.select(Some("core::main".to_owned()));
        model.issued = Some(model.params.derive_request().unwrap());

        model.apply_fetch_result(GraphFetchResult {
            request: model.issued.clone().unwrap(),
            outcome: Ok(sample_graph()),
        });
        model.apply_fetch_result(GraphFetchResult {
            request: model.issued.clone().unwrap(),
            outcome: Err("index rebuilding".to_owned()),
        });

        assert_eq!(model.fetch_error.as_deref(), Some("index rebuilding"));
        assert_eq!(model.params.repository(), "repo-a");
        assert_eq!(model.selection.selected(), Some("core::main"));
        // The previous graph snapshot stays in place for the next render.
        assert!(model.raw_graph.is_some());
        assert_eq!(model.graph_revision, 1);
    }

    #[test]
    fn re_rooting_keeps_the_selection() {
        let mut model = model();
        model.selection.select(Some("core::m".to_owned()));
        model.focus_as_root("core::n");
        assert_eq!(model.params.root(), Some("core::n"));
        assert_eq!(model.selection.selected(), Some("core::m"));
    }

    #[test]
    fn render_state_is_rebuilt_only_on_input_changes() {
        let mut model = model();
        model.params.set_repository("repo-a".to_owned());
        model.issued = Some(model.params.derive_request().unwrap());
        model.apply_fetch_result(GraphFetchResult {
            request: model.issued.clone().unwrap(),
            outcome: Ok(sample_graph()),
        });

        model.ensure_render_state();
        let first_key = model.layout.as_ref().unwrap().key();

        model.ensure_render_state();
        assert_eq!(model.layout.as_ref().unwrap().key(), first_key);

        model.max_nodes = 42;
        model.ensure_render_state();
        assert_eq!(model.layout.as_ref().unwrap().key(), (1, 42));
    }
}
