use cycle_arb_core::{parse_decimal, Amount, PoolRecord};

use crate::graph::{PoolGraph, PoolGraphBuilder};

pub fn dec(s: &str) -> Amount {
    parse_decimal(s).unwrap()
}

pub fn record(id: &str, token_a: &str, token_b: &str, reserve_a: &str, reserve_b: &str) -> PoolRecord {
    PoolRecord::new(id, token_a, token_b, dec(reserve_a), dec(reserve_b))
}

pub fn records(pools: &[(&str, &str, &str, &str, &str)]) -> Vec<PoolRecord> {
    pools
        .iter()
        .map(|(id, a, b, ra, rb)| record(id, a, b, ra, rb))
        .collect()
}

pub fn graph(pools: &[(&str, &str, &str, &str, &str)]) -> PoolGraph {
    PoolGraphBuilder::default().build(&records(pools))
}

/// P1 A/B 1000/2000, P2 B/C 1500/3000, P3 C/A 500/250, all at 0.3%
pub fn triangle() -> Vec<PoolRecord> {
    records(&[
        ("P1", "A", "B", "1000", "2000"),
        ("P2", "B", "C", "1500", "3000"),
        ("P3", "C", "A", "500", "250"),
    ])
}
