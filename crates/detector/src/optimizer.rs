//! Trade-size optimization for a single cycle
//!
//! Golden-section search over the trade size. It assumes profit is unimodal
//! on the search interval, which holds for constant-product pools in practice
//! but is not proven for every fee/reserve combination.

use bigdecimal::BigDecimal;
use num_traits::Zero;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::debug;

use cycle_arb_core::{round_significant, Amount, ScanConfig};

use crate::cycles::Cycle;
use crate::graph::PoolGraph;
use crate::simulator::SwapSimulator;

/// (√5 - 1) / 2, i.e. 1/φ
fn inverse_golden_ratio() -> &'static Amount {
    static INV_PHI: OnceLock<Amount> = OnceLock::new();
    INV_PHI.get_or_init(|| {
        let sqrt5 = BigDecimal::from(5)
            .sqrt()
            .expect("square root of a positive number");
        round_significant(&((sqrt5 - BigDecimal::from(1)) / BigDecimal::from(2)))
    })
}

/// Smallest upper bound used when none is given
fn min_x_max() -> Amount {
    BigDecimal::new(1.into(), 6)
}

/// Best trade size found for a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizationResult {
    pub best_trade_size: Amount,
    /// In units of the cycle's starting token; may be zero or negative
    pub best_profit: Amount,
    pub iterations: usize,
    /// The deadline passed before the bracket converged
    pub timed_out: bool,
}

impl OptimizationResult {
    fn degenerate() -> Self {
        Self {
            best_trade_size: BigDecimal::zero(),
            best_profit: BigDecimal::zero(),
            iterations: 0,
            timed_out: false,
        }
    }
}

/// Search interval and stopping rules
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub x_min: Amount,
    /// Explicit upper bound. When absent it is derived from the first hop's reserve.
    pub x_max: Option<Amount>,
    pub x_max_fraction: Amount,
    pub tolerance: Amount,
    pub max_iterations: usize,
}

impl SearchParams {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            x_min: config.x_min.clone(),
            x_max: None,
            x_max_fraction: config.x_max_fraction.clone(),
            tolerance: config.tolerance.clone(),
            max_iterations: config.max_iterations,
        }
    }

    pub fn with_x_max(mut self, x_max: Amount) -> Self {
        self.x_max = Some(x_max);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

/// Finds the trade size maximizing round-trip profit
#[derive(Debug, Clone, Copy)]
pub struct ProfitOptimizer<'g> {
    simulator: SwapSimulator<'g>,
}

impl<'g> ProfitOptimizer<'g> {
    pub fn new(graph: &'g PoolGraph) -> Self {
        Self {
            simulator: SwapSimulator::new(graph),
        }
    }

    pub fn simulator(&self) -> &SwapSimulator<'g> {
        &self.simulator
    }

    /// `max(1e-6, reserve_in(first hop) * x_max_fraction)` unless `x_max` is given
    pub fn upper_bound(&self, cycle: &Cycle, params: &SearchParams) -> Amount {
        if let Some(x_max) = &params.x_max {
            return x_max.clone();
        }
        let first = cycle.first_edge(self.simulator.graph());
        let scaled = &first.reserve_in * &params.x_max_fraction;
        scaled.max(min_x_max())
    }

    pub fn maximize(&self, cycle: &Cycle, params: &SearchParams) -> OptimizationResult {
        self.maximize_until(cycle, params, None)
    }

    /// Like [`maximize`](Self::maximize), giving up at `deadline` with the best
    /// point of the current bracket.
    pub fn maximize_until(
        &self,
        cycle: &Cycle,
        params: &SearchParams,
        deadline: Option<Instant>,
    ) -> OptimizationResult {
        let x_max = self.upper_bound(cycle, params);
        if x_max <= params.x_min {
            return OptimizationResult::degenerate();
        }

        let profit = |x: &Amount| self.simulator.profit(cycle, x);
        let inv_phi = inverse_golden_ratio();

        let mut a = params.x_min.clone();
        let mut b = x_max;
        let mut c = round_significant(&(&b - &(&(&b - &a) * inv_phi)));
        let mut d = round_significant(&(&a + &(&(&b - &a) * inv_phi)));
        let mut fc = profit(&c);
        let mut fd = profit(&d);

        let mut iterations = 0;
        let mut timed_out = false;
        while (&b - &a) > params.tolerance && iterations < params.max_iterations {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                timed_out = true;
                break;
            }

            if fc > fd {
                // Maximum lies in [a, d]
                b = d;
                d = c;
                fd = fc;
                c = round_significant(&(&b - &(&(&b - &a) * inv_phi)));
                fc = profit(&c);
            } else {
                // Maximum lies in [c, b]
                a = c;
                c = d;
                fc = fd;
                d = round_significant(&(&a + &(&(&b - &a) * inv_phi)));
                fd = profit(&d);
            }
            iterations += 1;
        }

        // The bracket ends need checking too, the optimum may sit at either edge
        let fa = profit(&a);
        let fb = profit(&b);
        let (best_trade_size, best_profit) = [(b, fb), (c, fc), (d, fd)]
            .into_iter()
            .fold((a, fa), |best, candidate| {
                if candidate.1 > best.1 {
                    candidate
                } else {
                    best
                }
            });

        debug!(
            "Optimized cycle of {} hops in {} iterations: size={} profit={}",
            cycle.len(),
            iterations,
            best_trade_size,
            best_profit
        );

        OptimizationResult {
            best_trade_size,
            best_profit,
            iterations,
            timed_out,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycles::find_cycles;
    use crate::graph::{EdgeId, PoolGraphBuilder};
    use crate::test_helpers::*;

    fn triangle_graph() -> PoolGraph {
        PoolGraphBuilder::default().build(&triangle())
    }

    /// A>B (P1), B>C (P2), C>A (P3)
    fn forward_triangle(graph: &PoolGraph) -> Cycle {
        Cycle::new(graph, vec![EdgeId(0), EdgeId(2), EdgeId(4)]).unwrap()
    }

    #[test]
    fn test_inverse_golden_ratio() {
        let inv_phi = inverse_golden_ratio();
        assert!((inv_phi - dec("0.6180339887498948482")).abs() < dec("1e-18"));
        // 1/φ = φ - 1, so inv_phi² + inv_phi = 1
        let identity = inv_phi * inv_phi + inv_phi;
        assert!((identity - BigDecimal::from(1)).abs() < dec("1e-55"));
    }

    #[test]
    fn test_upper_bound_defaults() {
        let graph = triangle_graph();
        let cycle = forward_triangle(&graph);
        let optimizer = ProfitOptimizer::new(&graph);

        let params = SearchParams::default();
        assert_eq!(optimizer.upper_bound(&cycle, &params), dec("200"));

        let explicit = SearchParams::default().with_x_max(dec("42"));
        assert_eq!(optimizer.upper_bound(&cycle, &explicit), dec("42"));
    }

    #[test]
    fn test_upper_bound_floor() {
        let graph = graph(&[
            ("P1", "A", "B", "0.000000001", "1"),
            ("P2", "B", "A", "1", "1"),
        ]);
        let cycle = Cycle::new(&graph, vec![EdgeId(0), EdgeId(2)]).unwrap();
        let optimizer = ProfitOptimizer::new(&graph);

        assert_eq!(
            optimizer.upper_bound(&cycle, &SearchParams::default()),
            dec("0.000001")
        );
    }

    #[test]
    fn test_matches_brute_force_grid() {
        let graph = triangle_graph();
        let cycle = forward_triangle(&graph);
        let optimizer = ProfitOptimizer::new(&graph);
        let params = SearchParams::default();

        let result = optimizer.maximize(&cycle, &params);
        assert!(!result.timed_out);
        assert!(result.best_profit > BigDecimal::zero());

        let x_max = optimizer.upper_bound(&cycle, &params);
        let steps = 2_000;
        let step = (&x_max - &params.x_min) / BigDecimal::from(steps);
        let grid_best = (0..=steps)
            .map(|i| {
                let x = &params.x_min + &step * BigDecimal::from(i);
                optimizer.simulator().profit(&cycle, &x)
            })
            .max()
            .unwrap();

        assert!(&result.best_profit + &params.tolerance >= grid_best);
        assert!(result.best_trade_size > params.x_min && result.best_trade_size < x_max);
    }

    #[test]
    fn test_unprofitable_direction() {
        let graph = triangle_graph();
        // A>C (P3), C>B (P2), B>A (P1)
        let cycle = Cycle::new(&graph, vec![EdgeId(5), EdgeId(3), EdgeId(1)]).unwrap();
        let result = ProfitOptimizer::new(&graph).maximize(&cycle, &SearchParams::default());

        assert!(result.best_profit <= BigDecimal::zero());
        // Losses shrink with size, so the search runs to the lower end
        assert!(result.best_trade_size < dec("0.001"));
    }

    #[test]
    fn test_degenerate_interval() {
        let graph = triangle_graph();
        let cycle = forward_triangle(&graph);
        let optimizer = ProfitOptimizer::new(&graph);

        let mut params = SearchParams::default().with_x_max(dec("5"));
        params.x_min = dec("5");
        let result = optimizer.maximize(&cycle, &params);
        assert_eq!(result.best_trade_size, BigDecimal::zero());
        assert_eq!(result.best_profit, BigDecimal::zero());
        assert_eq!(result.iterations, 0);

        params.x_min = dec("6");
        assert_eq!(optimizer.maximize(&cycle, &params), OptimizationResult::degenerate());
    }

    #[test]
    fn test_iteration_limit() {
        let graph = triangle_graph();
        let cycle = forward_triangle(&graph);
        let params = SearchParams::default().with_max_iterations(3);

        let result = ProfitOptimizer::new(&graph).maximize(&cycle, &params);
        assert_eq!(result.iterations, 3);
        assert!(!result.timed_out);
    }

    #[test]
    fn test_expired_deadline_returns_initial_bracket() {
        let graph = triangle_graph();
        let cycle = forward_triangle(&graph);
        let optimizer = ProfitOptimizer::new(&graph);

        let result =
            optimizer.maximize_until(&cycle, &SearchParams::default(), Some(Instant::now()));
        assert!(result.timed_out);
        assert_eq!(result.iterations, 0);
        // Still the best of the four starting points
        assert!(result.best_profit > BigDecimal::zero());
    }

    #[test]
    fn test_enumerated_cycles_optimize_independently() {
        let graph = triangle_graph();
        let optimizer = ProfitOptimizer::new(&graph);
        let params = SearchParams::default();

        let profitable: Vec<bool> = find_cycles(&graph, 3)
            .iter()
            .map(|cycle| optimizer.maximize(cycle, &params).best_profit > BigDecimal::zero())
            .collect();
        // Only A>B>C>A makes money
        assert_eq!(profitable, vec![false, true, false, false, false]);
    }
}
