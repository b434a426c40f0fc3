//! Proximity graph adjacency.
//!
//! One small neighbor list per node, kept apart from the flat embedding
//! buffer. Lists hold internal indices and are capped at `max_degree`.

/// A node's outgoing neighbor list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphNode {
    /// Internal indices of neighbors.
    pub neighbors: Vec<u32>,
}

impl GraphNode {
    pub fn new(neighbors: Vec<u32>) -> Self {
        Self { neighbors }
    }

    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }
}

/// Single-layer graph over internal indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProximityGraph {
    nodes: Vec<GraphNode>,
    max_degree: usize,
}

impl ProximityGraph {
    /// Create an empty graph whose nodes hold at most `max_degree` edges.
    pub fn new(max_degree: usize) -> Self {
        Self {
            nodes: Vec::new(),
            max_degree,
        }
    }

    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    /// Reserve room for `additional` more nodes.
    pub fn reserve(&mut self, additional: usize) {
        self.nodes.reserve(additional);
    }

    /// Append a node with its initial neighbor list; returns its index.
    pub fn push_node(&mut self, neighbors: Vec<u32>) -> usize {
        debug_assert!(neighbors.len() <= self.max_degree);
        let id = self.nodes.len();
        self.nodes.push(GraphNode::new(neighbors));
        id
    }

    /// Neighbors of `id`, empty if `id` is not a node.
    pub fn neighbors(&self, id: usize) -> &[u32] {
        self.nodes
            .get(id)
            .map(|n| n.neighbors.as_slice())
            .unwrap_or(&[])
    }

    pub fn node(&self, id: usize) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    /// Add the edge `from -> to` if `from` has spare capacity.
    ///
    /// Full nodes keep their existing edges and the new edge is dropped;
    /// there is no replacement of a worse neighbor. Duplicate edges are
    /// ignored. Returns whether the edge was added.
    pub fn try_add_edge(&mut self, from: usize, to: u32) -> bool {
        let max_degree = self.max_degree;
        match self.nodes.get_mut(from) {
            Some(node) if node.neighbors.len() < max_degree && !node.neighbors.contains(&to) => {
                node.neighbors.push(to);
                true
            }
            _ => false,
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get graph statistics.
    pub fn stats(&self) -> GraphStats {
        if self.nodes.is_empty() {
            return GraphStats::default();
        }

        let mut total_edges = 0;
        let mut max_degree = 0;
        let mut saturated_nodes = 0;
        let mut isolated_nodes = 0;

        for node in &self.nodes {
            let degree = node.degree();
            total_edges += degree;
            max_degree = max_degree.max(degree);
            if degree >= self.max_degree {
                saturated_nodes += 1;
            }
            if degree == 0 {
                isolated_nodes += 1;
            }
        }

        GraphStats {
            num_nodes: self.nodes.len(),
            total_edges,
            avg_degree: total_edges as f64 / self.nodes.len() as f64,
            max_degree,
            saturated_nodes,
            isolated_nodes,
        }
    }
}

/// Graph statistics. Edges are directed, so a mutual link counts twice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphStats {
    pub num_nodes: usize,
    pub total_edges: usize,
    pub avg_degree: f64,
    pub max_degree: usize,
    /// Nodes holding `M` edges; further back-edges to them are dropped.
    pub saturated_nodes: usize,
    pub isolated_nodes: usize,
}
