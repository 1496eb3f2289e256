//! Sequential swap simulation along a cycle
//!
//! Every call works on its own copy of the reserves it touches, keyed by pool.
//! A hop through a pool already traded earlier in the same call sees the
//! reserves that earlier hop left behind. Nothing is written back to the graph.
//!
//! Keeping one copy per edge instead would let the return leg of a single-pool
//! round trip (`A>B>A`) trade against untouched reserves. Such cycles lose
//! money under either rule, so only their reported loss differs.

use bigdecimal::BigDecimal;
use num_traits::Zero;

use cycle_arb_core::{get_amount_out, Amount, CycleQuote, Direction, HopQuote};

use crate::cycles::Cycle;
use crate::graph::{DirectedEdge, PoolGraph, PoolIndex};

struct LocalReserves {
    pool: PoolIndex,
    reserve_a: Amount,
    reserve_b: Amount,
}

/// Working copy of pool reserves for one simulation call
#[derive(Default)]
struct ReserveBook {
    entries: Vec<LocalReserves>,
}

impl ReserveBook {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    fn entry(&mut self, edge: &DirectedEdge) -> &mut LocalReserves {
        if let Some(pos) = self.entries.iter().position(|e| e.pool == edge.pool) {
            return &mut self.entries[pos];
        }

        let (reserve_a, reserve_b) = match edge.direction {
            Direction::AToB => (edge.reserve_in.clone(), edge.reserve_out.clone()),
            Direction::BToA => (edge.reserve_out.clone(), edge.reserve_in.clone()),
        };
        let pos = self.entries.len();
        self.entries.push(LocalReserves {
            pool: edge.pool,
            reserve_a,
            reserve_b,
        });
        &mut self.entries[pos]
    }

    /// Swap through one edge and move the local reserves accordingly
    fn swap(&mut self, edge: &DirectedEdge, amount_in: &Amount) -> Amount {
        let entry = self.entry(edge);
        let (reserve_in, reserve_out) = match edge.direction {
            Direction::AToB => (&mut entry.reserve_a, &mut entry.reserve_b),
            Direction::BToA => (&mut entry.reserve_b, &mut entry.reserve_a),
        };

        let amount_out = get_amount_out(amount_in, reserve_in, reserve_out, &edge.fee);
        if amount_out > BigDecimal::zero() {
            *reserve_in = &*reserve_in + amount_in;
            *reserve_out = &*reserve_out - &amount_out;
        }
        amount_out
    }
}

/// Simulates swaps along cycles of one graph
#[derive(Debug, Clone, Copy)]
pub struct SwapSimulator<'g> {
    graph: &'g PoolGraph,
}

impl<'g> SwapSimulator<'g> {
    pub fn new(graph: &'g PoolGraph) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &'g PoolGraph {
        self.graph
    }

    /// Final amount of the starting token after running `amount_in` through every hop.
    /// A hop that yields nothing zeroes the rest of the cycle.
    pub fn simulate(&self, cycle: &Cycle, amount_in: &Amount) -> Amount {
        let mut book = ReserveBook::with_capacity(cycle.len());
        let mut amount = amount_in.clone();

        for edge in cycle.edges() {
            amount = book.swap(self.graph.edge(*edge), &amount);
            if amount.is_zero() {
                break;
            }
        }
        amount
    }

    /// `simulate(cycle, x) - x`
    pub fn profit(&self, cycle: &Cycle, amount_in: &Amount) -> Amount {
        self.simulate(cycle, amount_in) - amount_in
    }

    /// Same walk as [`simulate`](Self::simulate), keeping every hop's amounts
    pub fn quote(&self, cycle: &Cycle, amount_in: &Amount) -> CycleQuote {
        let mut book = ReserveBook::with_capacity(cycle.len());
        let mut hops = Vec::with_capacity(cycle.len());

        cycle.edges().iter().fold(amount_in.clone(), |amount, id| {
            let edge = self.graph.edge(*id);
            let amount_out = book.swap(edge, &amount);
            hops.push(HopQuote {
                pool_id: self.graph.pool_id(*id).to_string(),
                token_in: self.graph.token(edge.token_in).clone(),
                token_out: self.graph.token(edge.token_out).clone(),
                amount_in: amount,
                amount_out: amount_out.clone(),
            });
            amount_out
        });

        CycleQuote { hops }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeId, TokenId};
    use crate::test_helpers::*;
    use cycle_arb_core::default_fee;
    use proptest::prelude::*;

    fn fee_from_bps(bps: u32) -> Amount {
        BigDecimal::new(bps.into(), 4)
    }

    #[test]
    fn test_simulate_chains_hops() {
        let graph = graph(&[
            ("P1", "A", "B", "1000", "2000"),
            ("P2", "B", "A", "3000", "3000"),
        ]);
        // A>B through P1, B>A through P2
        let cycle = Cycle::new(&graph, vec![EdgeId(0), EdgeId(2)]).unwrap();
        let fee = default_fee();

        let x = dec("25");
        let hop1 = get_amount_out(&x, &dec("1000"), &dec("2000"), &fee);
        let hop2 = get_amount_out(&hop1, &dec("3000"), &dec("3000"), &fee);

        let simulator = SwapSimulator::new(&graph);
        assert_eq!(simulator.simulate(&cycle, &x), hop2);
        assert_eq!(simulator.profit(&cycle, &x), &hop2 - &x);
    }

    #[test]
    fn test_same_pool_round_trip_sees_its_own_slippage() {
        let graph = graph(&[("P1", "A", "B", "1000", "2000")]);
        let cycle = Cycle::new(&graph, vec![EdgeId(0), EdgeId(1)]).unwrap();
        let fee = default_fee();

        let x = dec("100");
        let out1 = get_amount_out(&x, &dec("1000"), &dec("2000"), &fee);
        // Second leg trades against the reserves the first leg left behind
        let out2 = get_amount_out(&out1, &(dec("2000") - &out1), &(dec("1000") + &x), &fee);

        let simulator = SwapSimulator::new(&graph);
        let result = simulator.simulate(&cycle, &x);
        assert_eq!(result, out2);
        assert!(result < x);
        // Only the fees are lost, roughly 0.6%
        assert!(result > dec("99"));
    }

    #[test]
    fn test_simulation_leaves_graph_untouched() {
        let graph = graph(&[("P1", "A", "B", "1000", "2000")]);
        let cycle = Cycle::new(&graph, vec![EdgeId(0), EdgeId(1)]).unwrap();
        let simulator = SwapSimulator::new(&graph);

        let first = simulator.simulate(&cycle, &dec("50"));
        let second = simulator.simulate(&cycle, &dec("50"));
        assert_eq!(first, second);
        assert_eq!(graph.edge(EdgeId(0)).reserve_in, dec("1000"));
        assert_eq!(graph.pool(PoolIndex(0)).reserves(Direction::AToB).1, &dec("2000"));
    }

    #[test]
    fn test_non_positive_amount_gives_zero() {
        let graph = graph(&[("P1", "A", "B", "1000", "2000")]);
        let cycle = Cycle::new(&graph, vec![EdgeId(0), EdgeId(1)]).unwrap();
        let simulator = SwapSimulator::new(&graph);

        assert!(simulator.simulate(&cycle, &dec("0")).is_zero());
        assert!(simulator.simulate(&cycle, &dec("-1")).is_zero());
        assert_eq!(simulator.profit(&cycle, &dec("0")), dec("0"));
    }

    #[test]
    fn test_empty_reserve_edge_yields_zero() {
        let drained = DirectedEdge {
            pool: PoolIndex(0),
            direction: Direction::AToB,
            token_in: TokenId(0),
            token_out: TokenId(1),
            reserve_in: dec("1000"),
            reserve_out: dec("0"),
            fee: default_fee(),
        };
        let mut book = ReserveBook::default();
        assert!(book.swap(&drained, &dec("10")).is_zero());
        // Reserves stay as they were
        assert_eq!(book.entries[0].reserve_a, dec("1000"));
    }

    #[test]
    fn test_quote_records_every_hop() {
        let graph = graph(&[
            ("P1", "A", "B", "1000", "2000"),
            ("P2", "B", "C", "1500", "3000"),
            ("P3", "C", "A", "500", "250"),
        ]);
        // A>B (P1), B>C (P2), C>A (P3)
        let cycle = Cycle::new(&graph, vec![EdgeId(0), EdgeId(2), EdgeId(4)]).unwrap();
        let simulator = SwapSimulator::new(&graph);

        let x = dec("10");
        let quote = simulator.quote(&cycle, &x);
        assert_eq!(quote.hop_count(), 3);
        assert_eq!(quote.amount_in(), x);
        assert_eq!(quote.amount_out(), simulator.simulate(&cycle, &x));
        assert_eq!(quote.hops[1].amount_in, quote.hops[0].amount_out);
        assert_eq!(quote.hops[2].pool_id, "P3");

        let tokens = quote.token_path();
        let path: Vec<&str> = tokens.iter().map(|t| t.as_str()).collect();
        assert_eq!(path, vec!["A", "B", "C", "A"]);
        assert!(quote.is_profitable());
    }

    proptest! {
        #[test]
        fn prop_amount_out_is_increasing_and_bounded(
            reserve_in in 1u64..1_000_000_000,
            reserve_out in 1u64..1_000_000_000,
            fee_bps in 0u32..1_000,
            x in 1u64..1_000_000_000,
            dx in 1u64..1_000_000,
        ) {
            let (r_in, r_out) = (BigDecimal::from(reserve_in), BigDecimal::from(reserve_out));
            let fee = fee_from_bps(fee_bps);
            let small = get_amount_out(&BigDecimal::from(x), &r_in, &r_out, &fee);
            let large = get_amount_out(&BigDecimal::from(x + dx), &r_in, &r_out, &fee);

            prop_assert!(small > BigDecimal::zero());
            prop_assert!(small < large);
            prop_assert!(large < r_out);
        }

        #[test]
        fn prop_single_pool_round_trip_never_profits(
            reserve_a in 1u64..1_000_000_000,
            reserve_b in 1u64..1_000_000_000,
            fee_bps in 1u32..1_000,
            x in 1u64..1_000_000_000,
        ) {
            let record = cycle_arb_core::PoolRecord::new(
                "P1",
                "A",
                "B",
                BigDecimal::from(reserve_a),
                BigDecimal::from(reserve_b),
            )
            .with_fee(fee_from_bps(fee_bps));
            let graph = crate::graph::PoolGraphBuilder::default().build(&[record]);
            let cycle = Cycle::new(&graph, vec![EdgeId(0), EdgeId(1)]).unwrap();

            let profit = SwapSimulator::new(&graph).profit(&cycle, &BigDecimal::from(x));
            prop_assert!(profit < BigDecimal::zero());
        }
    }
}
