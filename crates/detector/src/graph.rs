//! Pool graph construction
//!
//! Token strings are interned into dense indices when the graph is built.
//! Edges live in one arena and each token keeps the ids of its outgoing
//! edges in insertion order, so enumeration is deterministic for a given
//! input order. The graph is never mutated after `build` returns.

use std::collections::HashMap;
use tracing::{debug, warn};

use cycle_arb_core::{
    default_fee, Amount, CoreResult, Direction, Pool, PoolRecord, RejectedPool, ScanConfig, Token,
};

/// Dense index of an interned token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub usize);

/// Index of a validated pool in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolIndex(pub usize);

/// Index of a directed edge in the graph's edge arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

/// One swap direction of a pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectedEdge {
    pub pool: PoolIndex,
    pub direction: Direction,
    pub token_in: TokenId,
    pub token_out: TokenId,
    pub reserve_in: Amount,
    pub reserve_out: Amount,
    pub fee: Amount,
}

/// Directed token graph for one snapshot, two edges per pool
#[derive(Debug, Clone, Default)]
pub struct PoolGraph {
    tokens: Vec<Token>,
    token_index: HashMap<Token, TokenId>,
    pools: Vec<Pool>,
    edges: Vec<DirectedEdge>,
    adjacency: Vec<Vec<EdgeId>>,
    rejected: Vec<RejectedPool>,
}

impl PoolGraph {
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Token ids in first-seen order
    pub fn token_ids(&self) -> impl Iterator<Item = TokenId> {
        (0..self.tokens.len()).map(TokenId)
    }

    pub fn token(&self, id: TokenId) -> &Token {
        &self.tokens[id.0]
    }

    pub fn token_id(&self, token: &str) -> Option<TokenId> {
        self.token_index.get(&Token::from(token)).copied()
    }

    pub fn pool(&self, index: PoolIndex) -> &Pool {
        &self.pools[index.0]
    }

    pub fn edge(&self, id: EdgeId) -> &DirectedEdge {
        &self.edges[id.0]
    }

    /// Outgoing edges of a token, in insertion order
    pub fn outgoing(&self, token: TokenId) -> &[EdgeId] {
        &self.adjacency[token.0]
    }

    /// Identifier of the pool an edge trades through
    pub fn pool_id(&self, edge: EdgeId) -> &str {
        self.pool(self.edge(edge).pool).id()
    }

    /// Pools the builder skipped, with the reason
    pub fn rejected(&self) -> &[RejectedPool] {
        &self.rejected
    }

    fn intern(&mut self, token: &Token) -> TokenId {
        if let Some(id) = self.token_index.get(token) {
            return *id;
        }
        let id = TokenId(self.tokens.len());
        self.tokens.push(token.clone());
        self.token_index.insert(token.clone(), id);
        self.adjacency.push(Vec::new());
        id
    }

    fn insert_pool(&mut self, pool: Pool) {
        let index = PoolIndex(self.pools.len());

        for direction in [Direction::AToB, Direction::BToA] {
            let (token_in, token_out) = pool.tokens(direction);
            let token_in = self.intern(token_in);
            let token_out = self.intern(token_out);
            let (reserve_in, reserve_out) = pool.reserves(direction);
            let edge = DirectedEdge {
                pool: index,
                direction,
                token_in,
                token_out,
                reserve_in: reserve_in.clone(),
                reserve_out: reserve_out.clone(),
                fee: pool.fee().clone(),
            };
            let id = EdgeId(self.edges.len());
            self.edges.push(edge);
            self.adjacency[token_in.0].push(id);
        }

        self.pools.push(pool);
    }
}

/// Builds a [`PoolGraph`] from pool records
#[derive(Debug, Clone)]
pub struct PoolGraphBuilder {
    default_fee: Amount,
}

impl PoolGraphBuilder {
    pub fn new(default_fee: Amount) -> Self {
        Self { default_fee }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.default_fee.clone())
    }

    /// Build the graph, skipping invalid pools.
    ///
    /// Each skipped pool is logged and kept in [`PoolGraph::rejected`].
    pub fn build(&self, records: &[PoolRecord]) -> PoolGraph {
        let mut graph = PoolGraph::default();

        for record in records {
            match record.validate(&self.default_fee) {
                Ok(pool) => graph.insert_pool(pool),
                Err(e) => {
                    warn!("Skipping pool {}: {}", record.pool_id, e);
                    graph.rejected.push(RejectedPool {
                        pool_id: record.pool_id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        debug!(
            "Built graph with {} tokens, {} edges from {} pools ({} rejected)",
            graph.token_count(),
            graph.edge_count(),
            graph.pool_count(),
            graph.rejected.len()
        );

        graph
    }

    /// Build the graph, failing on the first invalid pool
    pub fn try_build(&self, records: &[PoolRecord]) -> CoreResult<PoolGraph> {
        let mut graph = PoolGraph::default();
        for record in records {
            let pool = record.validate(&self.default_fee)?;
            graph.insert_pool(pool);
        }
        Ok(graph)
    }
}

impl Default for PoolGraphBuilder {
    fn default() -> Self {
        Self::new(default_fee())
    }
}
