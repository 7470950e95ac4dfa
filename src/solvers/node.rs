//! The search tree of the branch-and-bound, stored as an arena.
//!
//! A node does not own a copy of the problem: it records the single bound change
//! that created it and a link to its parent. The bounds of a node are rebuilt
//! by walking up to the root.
use std::cmp::Ordering;

/// Index of a node in its [NodeArena]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Life cycle of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum NodeState {
    /// Queued, its relaxation has not been solved yet
    Pending,
    /// Relaxation solved, bound known
    Relaxed,
    /// Split into two children
    Branched,
    /// The relaxation solution satisfies every integrality requirement
    FeasibleIntegral,
    /// Relaxation infeasible, or bound unable to beat the incumbent
    Pruned,
    /// Abandoned when the search stopped
    Terminal,
}

/// A tightened bound on one variable
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BoundChange {
    pub column: usize,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub parent: Option<NodeId>,
    pub change: Option<BoundChange>,
    pub depth: u32,
    /// Minimisation cost of the relaxation: the parent's until this node is relaxed
    pub bound: f64,
    pub state: NodeState,
    /// Creation order, used to break ties in the queue
    pub sequence: u64,
}

#[derive(Debug, Default)]
pub(crate) struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn root(&mut self) -> NodeId {
        self.push(Node {
            parent: None,
            change: None,
            depth: 0,
            bound: f64::NEG_INFINITY,
            state: NodeState::Pending,
            sequence: 0,
        })
    }

    pub fn child(&mut self, parent: NodeId, change: BoundChange) -> NodeId {
        let (depth, bound) = {
            let p = &self.nodes[parent.0];
            (p.depth + 1, p.bound)
        };
        let sequence = self.nodes.len() as u64;
        self.push(Node {
            parent: Some(parent),
            change: Some(change),
            depth,
            bound,
            state: NodeState::Pending,
            sequence,
        })
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn set_state(&mut self, id: NodeId, state: NodeState) {
        self.nodes[id.0].state = state;
    }

    pub fn set_bound(&mut self, id: NodeId, bound: f64) {
        self.nodes[id.0].bound = bound;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// The variable bounds in force at a node: the root bounds tightened by every
    /// change on the path to the root
    pub fn bounds(&self, id: NodeId, lower: &[f64], upper: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let mut lower = lower.to_vec();
        let mut upper = upper.to_vec();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id.0];
            if let Some(change) = node.change {
                lower[change.column] = lower[change.column].max(change.lower);
                upper[change.column] = upper[change.column].min(change.upper);
            }
            current = node.parent;
        }
        (lower, upper)
    }

    /// Count the nodes in a given state
    pub fn count(&self, state: NodeState) -> usize {
        self.nodes.iter().filter(|n| n.state == state).count()
    }
}

/// An entry of the best-bound queue: the lowest bound comes out first,
/// and among equal bounds the oldest node
#[derive(Debug, Clone, Copy)]
pub(crate) struct QueueEntry {
    pub bound: f64,
    pub sequence: u64,
    pub node: NodeId,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    // BinaryHeap is a max-heap: reverse both keys
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .bound
            .total_cmp(&self.bound)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}
