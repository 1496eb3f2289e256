//! Snapshot scanner
//!
//! Builds the graph once, enumerates its cycles once, then sizes every cycle
//! independently. Cycles share nothing mutable, so sizing runs on rayon when
//! enabled.

use chrono::Utc;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, warn, Level};

use cycle_arb_core::{
    Amount, CoreResult, Opportunity, OpportunityFilter, PoolRecord, ScanConfig, ScanReport,
};

use crate::cycles::{Cycle, CycleEnumerator};
use crate::graph::{PoolGraph, PoolGraphBuilder};
use crate::optimizer::{OptimizationResult, ProfitOptimizer, SearchParams};

/// Main arbitrage scanner
#[derive(Debug, Clone)]
pub struct ArbitrageScanner {
    config: ScanConfig,
    builder: PoolGraphBuilder,
    enumerator: CycleEnumerator,
    params: SearchParams,
    filter: OpportunityFilter,
}

impl ArbitrageScanner {
    pub fn new(config: ScanConfig) -> CoreResult<Self> {
        config.validate()?;

        Ok(Self {
            builder: PoolGraphBuilder::from_config(&config),
            enumerator: CycleEnumerator::from_config(&config),
            params: SearchParams::from_config(&config),
            filter: OpportunityFilter::new(config.min_profit_threshold.clone()),
            config,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan one snapshot. Invalid pools are skipped and listed in the report.
    pub fn scan(&self, pools: &[PoolRecord]) -> ScanReport {
        let start = Instant::now();
        let scanned_at = Utc::now();

        let graph = self.builder.build(pools);
        let cycle_set = self.enumerator.find_cycles(&graph);
        let optimizer = ProfitOptimizer::new(&graph);

        let results: Vec<(usize, OptimizationResult)> = if self.config.parallel {
            cycle_set
                .cycles
                .par_iter()
                .enumerate()
                .map(|(index, cycle)| (index, self.size_cycle(&optimizer, cycle)))
                .collect()
        } else {
            cycle_set
                .cycles
                .iter()
                .enumerate()
                .map(|(index, cycle)| (index, self.size_cycle(&optimizer, cycle)))
                .collect()
        };

        let timed_out_cycles = results.iter().filter(|(_, r)| r.timed_out).count();
        if timed_out_cycles > 0 {
            warn!(
                "{} of {} cycles hit the {:?} deadline",
                timed_out_cycles,
                cycle_set.len(),
                self.config.cycle_timeout()
            );
        }

        let mut opportunities: Vec<Opportunity> = results
            .into_iter()
            .filter(|(_, result)| self.filter.accepts(&result.best_profit))
            .map(|(index, result)| opportunity(&graph, index, &cycle_set.cycles[index], result))
            .collect();
        // Completion order on the pool is arbitrary
        opportunities.sort_by_key(|opp| opp.cycle_index);

        if tracing::enabled!(Level::DEBUG) {
            let simulator = optimizer.simulator();
            for opp in &opportunities {
                let cycle = &cycle_set.cycles[opp.cycle_index];
                let quote = simulator.quote(cycle, &opp.best_trade_size);
                for hop in &quote.hops {
                    debug!(
                        "Cycle {} hop {}: {} {} -> {} {}",
                        opp.cycle_index,
                        hop.pool_id,
                        hop.amount_in,
                        hop.token_in,
                        hop.amount_out,
                        hop.token_out
                    );
                }
            }
        }

        let elapsed = start.elapsed();
        info!(
            "Scanned {} pools ({} edges, {} cycles{}) in {:?}: {} opportunities",
            graph.pool_count(),
            graph.edge_count(),
            cycle_set.len(),
            if cycle_set.truncated { ", truncated" } else { "" },
            elapsed,
            opportunities.len()
        );

        ScanReport {
            opportunities,
            cycles_found: cycle_set.len(),
            cycles_truncated: cycle_set.truncated,
            rejected_pools: graph.rejected().to_vec(),
            timed_out_cycles,
            scanned_at,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    fn size_cycle(&self, optimizer: &ProfitOptimizer<'_>, cycle: &Cycle) -> OptimizationResult {
        let deadline = self
            .config
            .cycle_timeout()
            .map(|timeout| Instant::now() + timeout);
        let result = optimizer.maximize_until(cycle, &self.params, deadline);

        debug!(
            "Cycle {} best size={} profit={}{}",
            cycle.pool_ids(optimizer.simulator().graph()).join(">"),
            result.best_trade_size,
            result.best_profit,
            if result.timed_out { " (timed out)" } else { "" }
        );
        result
    }
}

fn opportunity(
    graph: &PoolGraph,
    cycle_index: usize,
    cycle: &Cycle,
    result: OptimizationResult,
) -> Opportunity {
    Opportunity {
        cycle_index,
        token_path: cycle.token_path(graph),
        pool_ids: cycle.pool_ids(graph),
        best_trade_size: result.best_trade_size,
        best_profit: result.best_profit,
    }
}

/// Scan with default settings apart from cycle length and profit threshold
pub fn scan(
    pools: &[PoolRecord],
    max_cycle_len: usize,
    min_profit_threshold: Amount,
) -> CoreResult<Vec<Opportunity>> {
    let config = ScanConfig::default()
        .with_max_cycle_length(max_cycle_len)
        .with_min_profit_threshold(min_profit_threshold);
    let scanner = ArbitrageScanner::new(config)?;
    Ok(scanner.scan(pools).opportunities)
}
