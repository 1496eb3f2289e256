//! Bounded-depth cycle enumeration
//!
//! Depth-first search rooted at every token, run on an explicit stack so the
//! depth of the walk never touches the call stack. A cycle is a closed walk
//! with no repeated intermediate token. Walks that are rotations of each other
//! describe the same opportunity and are emitted once, first one wins.

use std::collections::HashSet;
use tracing::{debug, warn};

use cycle_arb_core::{CoreError, CoreResult, ScanConfig, Token};

use crate::graph::{DirectedEdge, EdgeId, PoolGraph, PoolIndex, TokenId};

/// A closed sequence of edges that starts and ends at the same token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cycle {
    edges: Vec<EdgeId>,
}

impl Cycle {
    /// Build a cycle from explicit edges, checking it is closed and simple
    pub fn new(graph: &PoolGraph, edges: Vec<EdgeId>) -> CoreResult<Self> {
        if edges.len() < 2 {
            return Err(CoreError::InvalidCycle(
                "Cycle must have at least 2 swaps".to_string(),
            ));
        }
        if let Some(edge) = edges.iter().find(|e| e.0 >= graph.edge_count()) {
            return Err(CoreError::InvalidCycle(format!("Unknown edge {}", edge.0)));
        }

        let start = graph.edge(edges[0]).token_in;
        let mut seen = HashSet::with_capacity(edges.len());
        for i in 0..edges.len() {
            let next = (i + 1) % edges.len();
            let current = graph.edge(edges[i]);
            let following = graph.edge(edges[next]);
            if current.token_out != following.token_in {
                return Err(CoreError::InvalidCycle(format!(
                    "Swap {} token_out ({}) does not match swap {} token_in ({})",
                    i,
                    graph.token(current.token_out),
                    next,
                    graph.token(following.token_in)
                )));
            }
            if current.token_out != start && !seen.insert(current.token_out) {
                return Err(CoreError::InvalidCycle(format!(
                    "Token {} is visited twice",
                    graph.token(current.token_out)
                )));
            }
        }

        Ok(Self { edges })
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn first_edge<'g>(&self, graph: &'g PoolGraph) -> &'g DirectedEdge {
        graph.edge(self.edges[0])
    }

    pub fn start_token(&self, graph: &PoolGraph) -> TokenId {
        self.first_edge(graph).token_in
    }

    /// Starting token, then the output token of every hop
    pub fn token_path(&self, graph: &PoolGraph) -> Vec<Token> {
        let mut path = Vec::with_capacity(self.edges.len() + 1);
        path.push(graph.token(self.start_token(graph)).clone());
        for edge in &self.edges {
            path.push(graph.token(graph.edge(*edge).token_out).clone());
        }
        path
    }

    pub fn pool_ids(&self, graph: &PoolGraph) -> Vec<String> {
        self.edges
            .iter()
            .map(|edge| graph.pool_id(*edge).to_string())
            .collect()
    }
}

/// Enumeration output
#[derive(Debug, Clone, Default)]
pub struct CycleSet {
    pub cycles: Vec<Cycle>,
    /// The emission cap stopped the search early
    pub truncated: bool,
}

impl CycleSet {
    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }
}

/// Rotation-invariant identity of a cycle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Signature {
    Tokens(Vec<TokenId>),
    Hops(Vec<(TokenId, PoolIndex)>),
}

/// Smallest rotation of a closed sequence, with its first element repeated at the end
fn canonical_rotation<T: Ord + Clone>(items: &[T]) -> Vec<T> {
    let n = items.len();
    let best = (1..n).fold(0, |best, k| {
        let candidate = items[k..].iter().chain(&items[..k]);
        let current = items[best..].iter().chain(&items[..best]);
        if candidate.lt(current) {
            k
        } else {
            best
        }
    });

    let mut rotated = Vec::with_capacity(n + 1);
    rotated.extend_from_slice(&items[best..]);
    rotated.extend_from_slice(&items[..best]);
    if let Some(first) = rotated.first().cloned() {
        rotated.push(first);
    }
    rotated
}

struct Frame {
    token: TokenId,
    next: usize,
}

/// Finds simple cycles up to `max_len` swaps
#[derive(Debug, Clone)]
pub struct CycleEnumerator {
    max_len: usize,
    max_emitted: Option<usize>,
    dedup_by_pools: bool,
    exclude_reciprocal: bool,
}

impl CycleEnumerator {
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len,
            max_emitted: None,
            dedup_by_pools: false,
            exclude_reciprocal: false,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            max_len: config.max_cycle_length,
            max_emitted: config.max_emitted_cycles,
            dedup_by_pools: config.dedup_by_pools,
            exclude_reciprocal: config.exclude_reciprocal,
        }
    }

    pub fn with_max_emitted(mut self, cap: usize) -> Self {
        self.max_emitted = Some(cap);
        self
    }

    pub fn with_pool_dedup(mut self, enabled: bool) -> Self {
        self.dedup_by_pools = enabled;
        self
    }

    pub fn excluding_reciprocal(mut self, enabled: bool) -> Self {
        self.exclude_reciprocal = enabled;
        self
    }

    fn signature(&self, graph: &PoolGraph, edges: &[EdgeId]) -> Signature {
        if self.dedup_by_pools {
            let hops: Vec<(TokenId, PoolIndex)> = edges
                .iter()
                .map(|id| {
                    let edge = graph.edge(*id);
                    (edge.token_in, edge.pool)
                })
                .collect();
            Signature::Hops(canonical_rotation(&hops))
        } else {
            let tokens: Vec<TokenId> = edges.iter().map(|id| graph.edge(*id).token_in).collect();
            Signature::Tokens(canonical_rotation(&tokens))
        }
    }

    pub fn find_cycles(&self, graph: &PoolGraph) -> CycleSet {
        let mut result = CycleSet::default();
        if self.max_len < 2 || graph.is_empty() {
            return result;
        }

        let mut seen: HashSet<Signature> = HashSet::new();
        let mut visited = vec![false; graph.token_count()];
        let mut stack: Vec<Frame> = Vec::with_capacity(self.max_len);
        let mut path: Vec<EdgeId> = Vec::with_capacity(self.max_len);
        let mut candidates = 0usize;

        'roots: for start in graph.token_ids() {
            visited[start.0] = true;
            stack.push(Frame {
                token: start,
                next: 0,
            });

            while let Some(frame) = stack.last_mut() {
                let outgoing = graph.outgoing(frame.token);
                if frame.next >= outgoing.len() {
                    if let Some(done) = stack.pop() {
                        if done.token != start {
                            visited[done.token.0] = false;
                            path.pop();
                        }
                    }
                    continue;
                }

                let edge_id = outgoing[frame.next];
                frame.next += 1;
                let edge = graph.edge(edge_id);

                if self.exclude_reciprocal {
                    if let Some(prev) = path.last() {
                        if graph.edge(*prev).pool == edge.pool {
                            continue;
                        }
                    }
                }

                if edge.token_out == start {
                    if path.is_empty() {
                        continue;
                    }
                    candidates += 1;
                    path.push(edge_id);
                    let signature = self.signature(graph, &path);
                    if !seen.contains(&signature) {
                        if self.max_emitted.is_some_and(|cap| result.cycles.len() >= cap) {
                            result.truncated = true;
                            break 'roots;
                        }
                        seen.insert(signature);
                        result.cycles.push(Cycle {
                            edges: path.clone(),
                        });
                    }
                    path.pop();
                    continue;
                }

                if visited[edge.token_out.0] {
                    continue;
                }

                // A longer path could no longer close within max_len
                if path.len() + 1 < self.max_len {
                    visited[edge.token_out.0] = true;
                    path.push(edge_id);
                    stack.push(Frame {
                        token: edge.token_out,
                        next: 0,
                    });
                }
            }

            visited[start.0] = false;
        }

        if result.truncated {
            warn!(
                "Cycle enumeration stopped at the cap of {} cycles",
                result.cycles.len()
            );
        }
        debug!(
            "Found {} unique cycles from {} closed walks (max length {})",
            result.cycles.len(),
            candidates,
            self.max_len
        );

        result
    }
}

/// Unique simple cycles of 2 to `max_len` swaps
pub fn find_cycles(graph: &PoolGraph, max_len: usize) -> Vec<Cycle> {
    CycleEnumerator::new(max_len).find_cycles(graph).cycles
}
