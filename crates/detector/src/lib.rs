//! Cyclic arbitrage detection over constant-product pools
//!
//! Features:
//! - Pool graph with interned tokens and two directed edges per pool
//! - Bounded, rotation-deduplicated cycle enumeration
//! - Exact-decimal swap simulation with in-call slippage
//! - Golden-section trade sizing with an optional per-cycle deadline
//! - Parallel per-cycle sizing with rayon

pub mod cycles;
pub mod graph;
pub mod optimizer;
pub mod scanner;
pub mod simulator;

#[cfg(test)]
mod test_helpers;

pub use cycles::{find_cycles, Cycle, CycleEnumerator, CycleSet};
pub use graph::{DirectedEdge, EdgeId, PoolGraph, PoolGraphBuilder, PoolIndex, TokenId};
pub use optimizer::{OptimizationResult, ProfitOptimizer, SearchParams};
pub use scanner::{scan, ArbitrageScanner};
pub use simulator::SwapSimulator;
