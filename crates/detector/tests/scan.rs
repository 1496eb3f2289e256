use bigdecimal::BigDecimal;
use num_traits::Zero;
use std::str::FromStr;

use cycle_arb_core::{Opportunity, PoolRecord, ScanConfig};
use cycle_arb_detector::{
    scan, ArbitrageScanner, PoolGraphBuilder, ProfitOptimizer, SearchParams,
};

const TRIANGLE: &str = include_str!("../../../demos/triangle.json");

fn snapshot() -> Vec<PoolRecord> {
    serde_json::from_str(TRIANGLE).unwrap()
}

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

#[test]
fn demo_snapshot_finds_forward_triangle() {
    let opportunities = scan(&snapshot(), 3, dec("0.000001")).unwrap();

    assert_eq!(opportunities.len(), 1);
    let opp = &opportunities[0];
    let path: Vec<&str> = opp.token_path.iter().map(|t| t.as_str()).collect();
    assert_eq!(path, vec!["A", "B", "C", "A"]);
    assert_eq!(opp.pool_ids, vec!["P1", "P2", "P3"]);
    assert_eq!(opp.hop_count(), 3);
}

#[test]
fn optimum_beats_dense_grid() {
    let pools = snapshot();
    let opp = scan(&pools, 3, BigDecimal::zero()).unwrap().remove(0);

    let graph = PoolGraphBuilder::default().build(&pools);
    let cycle = cycle_arb_detector::find_cycles(&graph, 3)
        .into_iter()
        .nth(opp.cycle_index)
        .unwrap();
    let optimizer = ProfitOptimizer::new(&graph);
    let params = SearchParams::default();

    let x_max = optimizer.upper_bound(&cycle, &params);
    let steps = 1_000;
    let step = (&x_max - &params.x_min) / BigDecimal::from(steps);
    let grid_best = (0..=steps)
        .map(|i| {
            let x = &params.x_min + &step * BigDecimal::from(i);
            optimizer.simulator().profit(&cycle, &x)
        })
        .max()
        .unwrap();

    assert!(&opp.best_profit + &params.tolerance >= grid_best);
}

#[test]
fn repeated_scans_are_identical() {
    let scanner = ArbitrageScanner::new(ScanConfig::default()).unwrap();
    let pools = snapshot();

    let runs: Vec<Vec<Opportunity>> = (0..3).map(|_| scanner.scan(&pools).opportunities).collect();
    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[1], runs[2]);
}

#[test]
fn threshold_filters_everything_above_best() {
    assert!(scan(&snapshot(), 3, dec("1000")).unwrap().is_empty());
}

#[test]
fn parallel_and_sequential_agree() {
    let pools = snapshot();
    let config = ScanConfig::default()
        .with_max_cycle_length(3)
        .with_min_profit_threshold(dec("-1000"));

    let parallel = ArbitrageScanner::new(config.clone().with_parallel(true))
        .unwrap()
        .scan(&pools);
    let sequential = ArbitrageScanner::new(config.with_parallel(false))
        .unwrap()
        .scan(&pools);

    // A negative threshold keeps every cycle
    assert_eq!(parallel.opportunities.len(), parallel.cycles_found);
    assert_eq!(parallel.opportunities, sequential.opportunities);
}

#[test]
fn report_serializes_opportunities_as_decimal_strings() {
    let report = ArbitrageScanner::new(ScanConfig::default())
        .unwrap()
        .scan(&snapshot());
    let json = serde_json::to_value(&report).unwrap();

    let first = &json["opportunities"][0];
    assert_eq!(first["cycle_index"], 1);
    assert_eq!(first["pool_ids"], serde_json::json!(["P1", "P2", "P3"]));
    assert!(first["best_profit"].is_string());
    assert_eq!(json["cycles_found"], 5);
    assert_eq!(json["cycles_truncated"], false);
}
