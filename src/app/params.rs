use crate::backend::types::{ClusterBy, Direction, GraphRequest, ViewKind};

pub(in crate::app) const MAX_DEPTH: u32 = 6;

/// Single source of truth for what subgraph the backend is asked for.
///
/// Each setter mutates exactly one field. The stored direction persists
/// across view-kind changes but is only carried into the derived request
/// for call graphs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::app) struct ViewParameters {
    repository: String,
    view_kind: ViewKind,
    depth: u32,
    root: Option<String>,
    direction: Direction,
    include_metrics: bool,
    include_security: bool,
    cluster_by: ClusterBy,
}

impl ViewParameters {
    pub(in crate::app) fn new() -> Self {
        Self {
            repository: String::new(),
            view_kind: ViewKind::Call,
            depth: 2,
            root: None,
            direction: Direction::Both,
            include_metrics: true,
            include_security: false,
            cluster_by: ClusterBy::None,
        }
    }

    pub(in crate::app) fn repository(&self) -> &str {
        &self.repository
    }

    pub(in crate::app) fn set_repository(&mut self, repository: String) {
        self.repository = repository;
    }

    pub(in crate::app) fn view_kind(&self) -> ViewKind {
        self.view_kind
    }

    pub(in crate::app) fn set_view_kind(&mut self, view_kind: ViewKind) {
        self.view_kind = view_kind;
    }

    pub(in crate::app) fn depth(&self) -> u32 {
        self.depth
    }

    pub(in crate::app) fn set_depth(&mut self, depth: u32) {
        self.depth = depth.min(MAX_DEPTH);
    }

    pub(in crate::app) fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    pub(in crate::app) fn set_root(&mut self, root: Option<String>) {
        self.root = root;
    }

    pub(in crate::app) fn direction(&self) -> Direction {
        self.direction
    }

    pub(in crate::app) fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub(in crate::app) fn include_metrics(&self) -> bool {
        self.include_metrics
    }

    pub(in crate::app) fn set_include_metrics(&mut self, include: bool) {
        self.include_metrics = include;
    }

    pub(in crate::app) fn include_security(&self) -> bool {
        self.include_security
    }

    pub(in crate::app) fn set_include_security(&mut self, include: bool) {
        self.include_security = include;
    }

    pub(in crate::app) fn cluster_by(&self) -> ClusterBy {
        self.cluster_by
    }

    pub(in crate::app) fn set_cluster_by(&mut self, cluster_by: ClusterBy) {
        self.cluster_by = cluster_by;
    }

    /// The request these parameters stand for, or `None` while no repository
    /// is selected. Fetching is enabled exactly when this returns `Some`.
    pub(in crate::app) fn derive_request(&self) -> Option<GraphRequest> {
        if self.repository.is_empty() {
            return None;
        }

        Some(GraphRequest {
            repository: self.repository.clone(),
            view_kind: self.view_kind,
            depth: self.depth,
            root: self.root.clone(),
            direction: (self.view_kind == ViewKind::Call).then_some(self.direction),
            include_metrics: self.include_metrics,
            include_security: self.include_security,
            cluster_by: self.cluster_by,
        })
    }
}

/// Default-repository rule: reacts once to the repository list turning
/// non-empty, and never overrides a selection the user already made.
#[derive(Default)]
pub(in crate::app) struct RepositoryAutoSelect {
    fired: bool,
}

impl RepositoryAutoSelect {
    pub(in crate::app) fn apply(&mut self, params: &mut ViewParameters, repositories: &[String]) {
        if self.fired || repositories.is_empty() {
            return;
        }
        self.fired = true;

        if params.repository().is_empty()
            && let Some(first) = repositories.first()
        {
            params.set_repository(first.clone());
        }
    }
}
