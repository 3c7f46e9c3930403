use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Call,
    Dependency,
    Import,
}

impl ViewKind {
    pub const ALL: [ViewKind; 3] = [Self::Call, Self::Dependency, Self::Import];

    pub fn label(self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Dependency => "dependency",
            Self::Import => "import",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Call => "Call graph",
            Self::Dependency => "Dependency graph",
            Self::Import => "Import graph",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
    Both,
}

impl Direction {
    pub const ALL: [Direction; 3] = [Self::In, Self::Out, Self::Both];

    pub fn label(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::Both => "both",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClusterBy {
    None,
    File,
}

impl ClusterBy {
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::File => "file",
        }
    }
}

/// The exact query sent to the backend. Derived from view parameters only,
/// so equal parameters always map to the same request value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GraphRequest {
    pub repository: String,
    pub view_kind: ViewKind,
    pub depth: u32,
    pub root: Option<String>,
    pub direction: Option<Direction>,
    pub include_metrics: bool,
    pub include_security: bool,
    pub cluster_by: ClusterBy,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct HealthInfo {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RepositoryList {
    #[serde(default)]
    pub repositories: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
pub struct NodeMetrics {
    #[serde(default)]
    pub complexity: u32,
    #[serde(default, rename = "lineCount")]
    pub line_count: u32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SourceLocation {
    pub file: String,
    #[serde(default)]
    pub line: u32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GraphNode {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metrics: Option<NodeMetrics>,
    #[serde(default)]
    pub security: Vec<String>,
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl GraphNode {
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            crate::util::short_label(&self.id)
        } else {
            &self.label
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub kind: String,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct GraphMetadata {
    #[serde(default, rename = "nodeCount")]
    pub node_count: usize,
    #[serde(default, rename = "edgeCount")]
    pub edge_count: usize,
}

/// Node order is the rendering and tie-break order and must be preserved by
/// every transformation. Metadata always matches the actual set sizes.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct CodeGraph {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
    #[serde(default)]
    pub metadata: GraphMetadata,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphResponse {
    #[serde(default)]
    pub graph: Option<CodeGraph>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_graph_response() {
        let raw = r#"{
            "graph": {
                "nodes": [
                    {"id": "a::f", "kind": "function"},
                    {"id": "a::g", "label": "g", "kind": "function",
                     "metrics": {"complexity": 4, "lineCount": 31},
                     "security": ["taint-source"],
                     "location": {"file": "src/a.rs", "line": 10}}
                ],
                "edges": [{"source": "a::f", "target": "a::g", "kind": "calls"}],
                "metadata": {"nodeCount": 2, "edgeCount": 1}
            }
        }"#;

        let response: GraphResponse = serde_json::from_str(raw).unwrap();
        assert!(response.error.is_none());

        let graph = response.graph.unwrap();
        assert_eq!(graph.metadata.node_count, 2);
        assert_eq!(graph.metadata.edge_count, 1);
        assert_eq!(graph.nodes[0].display_label(), "f");
        assert_eq!(graph.nodes[1].display_label(), "g");
        assert!(graph.nodes[0].metrics.is_none());
        assert_eq!(graph.nodes[1].metrics.unwrap().complexity, 4);
        assert_eq!(graph.nodes[1].security, vec!["taint-source"]);
    }

    #[test]
    fn parses_error_only_response() {
        let response: GraphResponse =
            serde_json::from_str(r#"{"error": "repository not indexed"}"#).unwrap();
        assert!(response.graph.is_none());
        assert_eq!(response.error.as_deref(), Some("repository not indexed"));
    }

    #[test]
    fn missing_optional_fields_default() {
        let response: GraphResponse = serde_json::from_str("{}").unwrap();
        assert!(response.graph.is_none());
        assert!(response.error.is_none());

        let health: HealthInfo = serde_json::from_str(r#"{"version": "0.4.1"}"#).unwrap();
        assert_eq!(health.version, "0.4.1");
        assert!(health.status.is_empty());
    }
}
